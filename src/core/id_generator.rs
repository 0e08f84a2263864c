//! Fragment id generation.

use super::index::SourceFragmentIndex;

const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces candidate fragment ids.
///
/// Implementations should not return the same value twice. The index of ids
/// currently claimed by sources is passed in so generators can skip obvious
/// collisions, but the engine re-checks every candidate against the index
/// and the ids already assigned in the running pass before accepting it.
pub trait IdGenerator {
    fn generate(&mut self, claimed: &SourceFragmentIndex) -> String;
}

/// Default generator: successive integers `0, 1, 2, ...` in base 62
/// (digits, lowercase, uppercase).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Base62IdGenerator {
    next: u64,
}

impl Base62IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for Base62IdGenerator {
    fn generate(&mut self, _claimed: &SourceFragmentIndex) -> String {
        let id = encode_base62(self.next);
        // At u64::MAX the same id repeats, which the engine reports as exhaustion.
        self.next = self.next.saturating_add(1);
        id
    }
}

pub fn encode_base62(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}
