//! Recognized language codes
//!
//! Translations are keyed by [`Language`]. Only the fixed set below is
//! recognized, both in spreadsheet headers and when fetching translations
//! from the helpdesk.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A recognized content language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English, the origin language of spreadsheet sources
    #[default]
    En,
    /// French
    Fr,
    /// German
    De,
    /// Italian
    It,
    /// Spanish
    Es,
    /// Catalan
    Ca,
}

impl Language {
    /// Every recognized language, in header-scan order
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Es,
        Language::Ca,
    ];

    /// Lowercase two-letter code, as used in headers and API paths
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Es => "es",
            Language::Ca => "ca",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for codes outside the recognized set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized language code: '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Language::from_code("FR"), Some(Language::Fr));
        assert_eq!(Language::from_code(" en "), Some(Language::En));
        assert_eq!("Ca".parse::<Language>(), Ok(Language::Ca));
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(Language::from_code("pt"), None);
        assert_eq!(Language::from_code(""), None);
        assert!("english".parse::<Language>().is_err());
    }

    #[test]
    fn code_round_trips() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
            assert_eq!(lang.to_string(), lang.code());
        }
    }
}
