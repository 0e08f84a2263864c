pub mod check;
mod command_result;
pub mod helper;
pub mod init;
pub mod project;
pub mod sync;

pub use command_result::*;
