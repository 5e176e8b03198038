//! Closed enumerations carried by folders and articles
//!
//! Each enumeration has a numeric wire code. Decoding is total: any code
//! outside the known range maps to the documented default instead of
//! failing, because helpdesk payloads are not trusted to be well-formed.

use serde::{Deserialize, Serialize};

/// Article content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArticleType {
    /// Permanent article (wire code 1, the default)
    #[default]
    Permanent,
    /// Workaround article (wire code 2)
    Workaround,
}

impl ArticleType {
    /// Wire code
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            ArticleType::Permanent => 1,
            ArticleType::Workaround => 2,
        }
    }

    /// Decode a wire code; unknown codes fall back to [`ArticleType::Permanent`]
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(2) => ArticleType::Workaround,
            _ => ArticleType::Permanent,
        }
    }
}

/// Article publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// Draft (wire code 1)
    Draft,
    /// Published (wire code 2, the default)
    #[default]
    Published,
}

impl Status {
    /// Wire code
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Status::Draft => 1,
            Status::Published => 2,
        }
    }

    /// Decode a wire code; unknown codes fall back to [`Status::Published`]
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Status::Draft,
            _ => Status::Published,
        }
    }
}

/// Folder visibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible to everyone (wire code 1, the default)
    #[default]
    AllUsers,
    /// Logged-in users only (wire code 2)
    LoggedIn,
    /// Agents only (wire code 3)
    Agents,
    /// Selected companies (wire code 4)
    SelectedCompanies,
}

impl Visibility {
    /// Wire code
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Visibility::AllUsers => 1,
            Visibility::LoggedIn => 2,
            Visibility::Agents => 3,
            Visibility::SelectedCompanies => 4,
        }
    }

    /// Decode a wire code; unknown codes fall back to [`Visibility::AllUsers`]
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(2) => Visibility::LoggedIn,
            Some(3) => Visibility::Agents,
            Some(4) => Visibility::SelectedCompanies,
            _ => Visibility::AllUsers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_codes_decode() {
        assert_eq!(ArticleType::from_code(Some(2)), ArticleType::Workaround);
        assert_eq!(Status::from_code(Some(1)), Status::Draft);
        assert_eq!(Visibility::from_code(Some(3)), Visibility::Agents);
    }

    #[test]
    fn missing_codes_use_defaults() {
        assert_eq!(ArticleType::from_code(None), ArticleType::Permanent);
        assert_eq!(Status::from_code(None), Status::Published);
        assert_eq!(Visibility::from_code(None), Visibility::AllUsers);
    }

    proptest! {
        #[test]
        fn decode_is_total(code in any::<i64>()) {
            let status = Status::from_code(Some(code));
            let expected = if code == 1 { Status::Draft } else { Status::Published };
            prop_assert_eq!(status, expected);

            let typ = ArticleType::from_code(Some(code));
            prop_assert_eq!(typ == ArticleType::Workaround, code == 2);

            let vis = Visibility::from_code(Some(code));
            if (1..=4).contains(&code) {
                prop_assert_eq!(i64::from(vis.code()), code);
            } else {
                prop_assert_eq!(vis, Visibility::AllUsers);
            }
        }
    }
}
