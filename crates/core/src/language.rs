//! Practice languages
//!
//! The tutor works with a target language (the one being practiced) and a
//! native language (used for explanations).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Japanese,
    Korean,
    Chinese,
    Hindi,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Japanese,
        Language::Korean,
        Language::Chinese,
        Language::Hindi,
    ];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Chinese => "zh",
            Language::Hindi => "hi",
        }
    }

    /// English display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Chinese => "Chinese",
            Language::Hindi => "Hindi",
        }
    }

    /// Look up by ISO code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl FromStr for Language {
    type Err = Error;

    /// Accepts either the ISO code ("es") or the English name ("Spanish")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(lang) = Self::from_code(s) {
            return Ok(lang);
        }
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidInput(format!("unsupported language: {}", s)))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Target/native pair for one learner and topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Language being practiced
    pub target: Language,
    /// Learner's own language, used for explanations
    pub native: Language,
}

impl LanguagePair {
    pub fn new(target: Language, native: Language) -> Self {
        Self { target, native }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            target: Language::English,
            native: Language::English,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_code_and_name() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("FR".parse::<Language>().unwrap(), Language::French);
        assert_eq!("german".parse::<Language>().unwrap(), Language::German);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Language::ALL.iter().map(|l| l.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Language::Japanese).unwrap();
        assert_eq!(json, "\"japanese\"");
    }
}
