//! Line-based resource files.
//!
//! ```text
//! # comment
//! #@output admin settings
//! greeting = Hello world
//! = Text that has no id yet
//! !old = Disabled, still tracked
//! apples = [One apple | {count} apples]
//! ```
//!
//! Every non-blank line containing `=` that is not a comment is one
//! fragment. Text before the first `=` is the id, a leading `!` disables the
//! fragment, and a value wrapped in `[...]` is plural with forms separated by
//! `|`. An empty value or an unterminated `[` yields an invalid value.

use std::ops::Range;

use crate::core::{fragment::Fragment, source::Source, value::TranslatableValue};

const OUTPUT_DIRECTIVE: &str = "#@output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSource {
    text: String,
    fragments: Vec<Fragment>,
    /// Byte range of each fragment's id annotation, including the
    /// whitespace up to `=`. Empty when the line has no id.
    id_ranges: Vec<Range<usize>>,
    output_names: Vec<String>,
}

impl LineSource {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut fragments = Vec::new();
        let mut id_ranges = Vec::new();
        let mut output_names = Vec::new();

        let mut offset = 0;
        for raw_line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += raw_line.len();
            let line = raw_line.trim_end_matches(['\n', '\r']);
            let line_end = line_start + line.len();

            let trimmed = line.trim_start();
            let directive = trimmed
                .strip_prefix(OUTPUT_DIRECTIVE)
                .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
            if let Some(names) = directive {
                output_names.extend(names.split_whitespace().map(String::from));
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indent = line.len() - trimmed.len();
            let (enabled, body, body_offset) = match trimmed.strip_prefix('!') {
                Some(rest) => (false, rest, line_start + indent + 1),
                None => (true, trimmed, line_start + indent),
            };
            let Some(eq) = body.find('=') else {
                continue;
            };

            let id = body[..eq].trim();
            let id_start = body_offset + (body.len() - body.trim_start().len());
            let id_range = if id.is_empty() {
                id_start..id_start
            } else {
                id_start..body_offset + eq
            };

            fragments.push(Fragment {
                fragment_id: (!id.is_empty()).then(|| id.to_string()),
                value: parse_value(body[eq + 1..].trim()),
                enabled,
                start: line_start,
                end: line_end,
            });
            id_ranges.push(id_range);
        }

        Self {
            text,
            fragments,
            id_ranges,
            output_names,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn parse_value(raw: &str) -> Option<TranslatableValue> {
    if raw.is_empty() {
        return None;
    }
    match raw.strip_prefix('[') {
        Some(inner) => inner
            .strip_suffix(']')
            .map(|forms| TranslatableValue::plural(forms.split('|').map(str::trim))),
        None => Some(TranslatableValue::string(raw)),
    }
}

impl Source for LineSource {
    fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    fn is_rewritable(&self) -> bool {
        true
    }

    fn rewrite(&mut self, resolved_ids: &[Option<String>]) -> Option<String> {
        let mut edits: Vec<(Range<usize>, String)> = self
            .fragments
            .iter()
            .zip(&self.id_ranges)
            .zip(resolved_ids)
            .filter_map(|((fragment, range), resolved)| {
                let resolved = resolved.as_deref()?;
                if fragment.fragment_id.as_deref() == Some(resolved) {
                    return None;
                }
                Some((range.clone(), format!("{} ", resolved)))
            })
            .collect();
        if edits.is_empty() {
            return None;
        }

        // Apply back to front so earlier ranges stay valid.
        edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
        let mut text = self.text.clone();
        for (range, replacement) in edits {
            text.replace_range(range, &replacement);
        }

        *self = Self::parse(text);
        Some(self.text.clone())
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }
}
