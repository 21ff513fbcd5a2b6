//! Closed language table parameterizing provider calls and answer prompts.

/// Per-language search parameters and labels: `gl`/`hl` feed the search
/// providers, `name` and `source_tag` feed the answer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub gl: &'static str,
    pub hl: &'static str,
    pub name: &'static str,
    pub source_tag: &'static str,
}

const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "en", gl: "us", hl: "en", name: "English", source_tag: "Source" },
    LanguageInfo { code: "ko", gl: "kr", hl: "ko", name: "Korean", source_tag: "출처" },
    LanguageInfo { code: "zh", gl: "cn", hl: "zh-cn", name: "Chinese", source_tag: "Source" },
    LanguageInfo { code: "ja", gl: "jp", hl: "ja", name: "Japanese", source_tag: "Source" },
    LanguageInfo { code: "de", gl: "de", hl: "de", name: "German", source_tag: "Source" },
    LanguageInfo { code: "fr", gl: "fr", hl: "fr", name: "French", source_tag: "Source" },
    LanguageInfo { code: "es", gl: "es", hl: "es", name: "Spanish", source_tag: "Source" },
    LanguageInfo { code: "it", gl: "it", hl: "it", name: "Italian", source_tag: "Source" },
    LanguageInfo { code: "nl", gl: "nl", hl: "nl", name: "Dutch", source_tag: "Source" },
    LanguageInfo { code: "pt", gl: "pt", hl: "pt", name: "Portuguese", source_tag: "Source" },
    LanguageInfo { code: "ru", gl: "ru", hl: "ru", name: "Russian", source_tag: "Source" },
    LanguageInfo { code: "pl", gl: "pl", hl: "pl", name: "Polish", source_tag: "Source" },
    LanguageInfo { code: "sv", gl: "se", hl: "sv", name: "Swedish", source_tag: "Source" },
    LanguageInfo { code: "no", gl: "no", hl: "no", name: "Norwegian", source_tag: "Source" },
    LanguageInfo { code: "da", gl: "dk", hl: "da", name: "Danish", source_tag: "Source" },
    LanguageInfo { code: "fi", gl: "fi", hl: "fi", name: "Finnish", source_tag: "Source" },
    LanguageInfo { code: "ar", gl: "ar", hl: "ar", name: "Arabic", source_tag: "Source" },
    LanguageInfo { code: "hi", gl: "in", hl: "hi", name: "Hindi", source_tag: "Source" },
    LanguageInfo { code: "id", gl: "id", hl: "id", name: "Indonesian", source_tag: "Source" },
    LanguageInfo { code: "tr", gl: "tr", hl: "tr", name: "Turkish", source_tag: "Source" },
    LanguageInfo { code: "th", gl: "th", hl: "th", name: "Thai", source_tag: "Source" },
    LanguageInfo { code: "vi", gl: "vn", hl: "vi", name: "Vietnamese", source_tag: "Source" },
];

/// Look up a language by ISO code; unknown codes default to English.
pub fn language_info(code: &str) -> &'static LanguageInfo {
    LANGUAGES
        .iter()
        .find(|l| l.code == code)
        .unwrap_or(&LANGUAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(language_info("ko").gl, "kr");
        assert_eq!(language_info("ko").source_tag, "출처");
        assert_eq!(language_info("zh").hl, "zh-cn");
        assert_eq!(language_info("sv").gl, "se");
    }

    #[test]
    fn unknown_code_defaults_to_english() {
        let info = language_info("xx");
        assert_eq!(info.code, "en");
        assert_eq!(info.name, "English");
        assert_eq!(info.source_tag, "Source");
    }
}
