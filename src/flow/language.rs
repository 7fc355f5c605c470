//! Language variants of the service flow.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the service flow can be conducted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Shona,
    Ndebele,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Shona, Language::Ndebele];

    /// Language used before the customer has chosen one.
    pub const DEFAULT: Language = Language::English;

    /// Map a language-menu option ("1".."3") to a language.
    pub fn from_menu_option(option: u8) -> Option<Self> {
        match option {
            1 => Some(Self::English),
            2 => Some(Self::Shona),
            3 => Some(Self::Ndebele),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Shona => "Shona",
            Self::Ndebele => "Ndebele",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown language: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_options_map_in_order() {
        assert_eq!(Language::from_menu_option(1), Some(Language::English));
        assert_eq!(Language::from_menu_option(2), Some(Language::Shona));
        assert_eq!(Language::from_menu_option(3), Some(Language::Ndebele));
        assert_eq!(Language::from_menu_option(0), None);
        assert_eq!(Language::from_menu_option(4), None);
    }

    #[test]
    fn serializes_as_display_name() {
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"English\"");
        assert_eq!("shona".parse::<Language>().unwrap(), Language::Shona);
    }
}
