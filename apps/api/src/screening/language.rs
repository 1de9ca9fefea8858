/// Output languages offered for interview questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    French,
    Spanish,
    Arabic,
}

impl Language {
    /// Resolves a two-letter code; anything unrecognised falls back to English.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::to_ascii_lowercase).as_deref() {
            Some("fr") => Language::French,
            Some("es") => Language::Spanish,
            Some("ar") => Language::Arabic,
            _ => Language::English,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Arabic => "Arabic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(Language::from_code(Some("en")), Language::English);
        assert_eq!(Language::from_code(Some("fr")), Language::French);
        assert_eq!(Language::from_code(Some("ES")), Language::Spanish);
        assert_eq!(Language::from_code(Some("ar")).name(), "Arabic");
    }

    #[test]
    fn test_unknown_or_missing_code_is_english() {
        assert_eq!(Language::from_code(Some("xx")), Language::English);
        assert_eq!(Language::from_code(Some("")), Language::English);
        assert_eq!(Language::from_code(None).name(), "English");
    }
}
