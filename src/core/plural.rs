//! Plural form counts per locale.
//!
//! Counts follow the CLDR cardinal categories used by the runtime to pick a
//! form. Region-specific codes fall back to their language (`de-CH` -> `de`).

use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralRule {
    pub form_count: usize,
}

static PLURAL_RULES: LazyLock<HashMap<&'static str, PluralRule>> = LazyLock::new(|| {
    let table: &[(&[&str], usize)] = &[
        (
            &[
                "bm", "bo", "dz", "id", "ig", "ii", "ja", "jbo", "jv", "km", "ko", "lo", "ms",
                "my", "sah", "ses", "sg", "th", "to", "vi", "wo", "yo", "zh",
            ],
            1,
        ),
        (
            &[
                "af", "am", "an", "ast", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo",
                "es", "et", "eu", "fa", "fi", "fil", "fo", "fr", "fur", "fy", "gl", "gu", "ha",
                "hi", "hu", "hy", "ia", "is", "it", "ka", "kk", "kn", "ku", "ky", "lb", "mk",
                "ml", "mn", "mr", "nb", "ne", "nl", "nn", "no", "oc", "or", "pa", "pap", "ps",
                "pt", "rm", "si", "so", "sq", "sv", "sw", "ta", "te", "tk", "tr", "ur", "uz",
                "zu",
            ],
            2,
        ),
        (
            &[
                "be", "bs", "cs", "hr", "lt", "lv", "pl", "ro", "ru", "sk", "sr", "uk",
            ],
            3,
        ),
        (&["gd", "he", "sl"], 4),
        (&["br", "ga", "mt"], 5),
        (&["ar", "cy"], 6),
    ];

    table
        .iter()
        .flat_map(|(locales, form_count)| {
            locales.iter().map(move |locale| {
                (
                    *locale,
                    PluralRule {
                        form_count: *form_count,
                    },
                )
            })
        })
        .collect()
});

/// Plural rule for `locale`, falling back to the language-only code.
pub fn plural_rule(locale: &str) -> Option<PluralRule> {
    PLURAL_RULES.get(locale).copied().or_else(|| {
        let language = locale.split(['-', '_']).next()?;
        PLURAL_RULES.get(language).copied()
    })
}
