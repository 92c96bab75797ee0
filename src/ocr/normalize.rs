use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercases and strips accents/diacritics for consistent keyword matching.
///
/// Text is decomposed (NFD) so accented letters split into base letter plus
/// combining mark, and the marks are dropped.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize_text("CRIT Rate"), "crit rate");
    }

    #[test]
    fn test_strips_accents() {
        assert_eq!(normalize_text("Diadème"), "diademe");
        assert_eq!(normalize_text("DÉGÂTS CRIT"), "degats crit");
    }

    #[test]
    fn test_cjk_unchanged() {
        assert_eq!(normalize_text("暴击伤害+12.4"), "暴击伤害+12.4");
    }

    #[test]
    fn test_keyword_and_line_normalize_alike() {
        // Dakuten is a combining mark after decomposition; both sides lose it
        let keyword = normalize_text("会心ダメージ");
        let line = normalize_text("会心ダメージ+14.8");
        assert!(line.contains(&keyword));
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_text(""), "");
    }
}
