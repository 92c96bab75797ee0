//! Multilingual keyword table.
//!
//! Loaded once from languages.json at startup. Each language lists the words
//! that mark a circlet, a CRIT Rate line, and a CRIT DMG line. The table keys
//! are also the language codes players may pick.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use super::normalize::normalize_text;

/// Keywords for one language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageKeywords {
    pub crit_rate: Vec<String>,
    pub crit_dmg: Vec<String>,
    pub circlet: Vec<String>,
}

/// Language code -> keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable {
    languages: BTreeMap<String, LanguageKeywords>,
}

/// Normalized keywords merged across every language in the table.
#[derive(Debug, Clone, Default)]
pub struct KeywordSets {
    pub circlet: HashSet<String>,
    pub crit_rate: HashSet<String>,
    pub crit_dmg: HashSet<String>,
}

impl KeywordSets {
    pub fn is_circlet(&self, line: &str) -> bool {
        contains_any(line, &self.circlet)
    }

    pub fn is_crit_rate(&self, line: &str) -> bool {
        contains_any(line, &self.crit_rate)
    }

    pub fn is_crit_dmg(&self, line: &str) -> bool {
        contains_any(line, &self.crit_dmg)
    }
}

fn contains_any(line: &str, keywords: &HashSet<String>) -> bool {
    keywords.iter().any(|word| line.contains(word.as_str()))
}

fn normalized(words: &[String]) -> impl Iterator<Item = String> + '_ {
    words
        .iter()
        .map(|w| normalize_text(w.trim()))
        .filter(|w| !w.is_empty())
}

impl Default for KeywordTable {
    fn default() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert(
            "en".to_string(),
            LanguageKeywords {
                crit_rate: vec!["crit rate".to_string()],
                crit_dmg: vec!["crit dmg".to_string()],
                circlet: vec!["circlet".to_string()],
            },
        );
        languages.insert(
            "ch_sim".to_string(),
            LanguageKeywords {
                crit_rate: vec!["暴击率".to_string()],
                crit_dmg: vec!["暴击伤害".to_string()],
                circlet: vec!["理之冠".to_string()],
            },
        );
        Self { languages }
    }
}

impl KeywordTable {
    pub fn new(languages: BTreeMap<String, LanguageKeywords>) -> Self {
        Self { languages }
    }

    /// Loads the table from a JSON file, or the built-in English/Chinese table.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<KeywordTable>(&content) {
                    Ok(table) if !table.languages.is_empty() => {
                        crate::log(&format!(
                            "Loaded {} languages from {}",
                            table.languages.len(),
                            path.display()
                        ));
                        return table;
                    }
                    Ok(_) => {
                        crate::log(&format!(
                            "{} has no languages. Using defaults.",
                            path.display()
                        ));
                    }
                    Err(e) => {
                        crate::log(&format!(
                            "Failed to parse {}: {}. Using defaults.",
                            path.display(),
                            e
                        ));
                    }
                },
                Err(e) => {
                    crate::log(&format!(
                        "Failed to read {}: {}. Using defaults.",
                        path.display(),
                        e
                    ));
                }
            }
        } else {
            crate::log(&format!(
                "{} not found. Using default languages.",
                path.display()
            ));
        }
        Self::default()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Comma-separated language codes, for messages.
    pub fn codes_list(&self) -> String {
        self.codes().collect::<Vec<_>>().join(", ")
    }

    /// Union of every language's keywords, normalized.
    ///
    /// OCR language detection is unreliable, so matching is done against all
    /// languages rather than the player's preference.
    pub fn merged(&self) -> KeywordSets {
        let mut sets = KeywordSets::default();
        for lang in self.languages.values() {
            sets.circlet.extend(normalized(&lang.circlet));
            sets.crit_rate.extend(normalized(&lang.crit_rate));
            sets.crit_dmg.extend(normalized(&lang.crit_dmg));
        }
        sets
    }

    /// Every language the OCR service should know about.
    ///
    /// EasyOCR requires English whenever Chinese is requested.
    pub fn ocr_languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self.languages.keys().cloned().collect();
        let has_chinese = langs.iter().any(|l| l == "ch_sim" || l == "ch_tra");
        if has_chinese && !langs.iter().any(|l| l == "en") {
            langs.push("en".to_string());
        }
        langs
    }
}

/// Languages to send with a scan: the player's preference plus English.
pub fn ocr_language_hints(user_language: &str) -> Vec<String> {
    let mut langs = vec![user_language.to_string()];
    if user_language != "en" {
        langs.push("en".to_string());
    }
    langs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_table() {
        let table = KeywordTable::default();
        assert!(table.contains("en"));
        assert!(table.contains("ch_sim"));
        assert!(!table.contains("fr"));
        assert_eq!(table.codes_list(), "ch_sim, en");
    }

    #[test]
    fn test_merged_across_languages() {
        let sets = KeywordTable::default().merged();
        assert!(sets.is_circlet("circlet of logos"));
        assert!(sets.is_circlet("理之冠"));
        assert!(sets.is_crit_rate("暴击率+3.9"));
        assert!(sets.is_crit_dmg("crit dmg+7.8"));
        assert!(!sets.is_crit_dmg("crit rate+3.9"));
    }

    #[test]
    fn test_keywords_normalized_on_merge() {
        let mut languages = BTreeMap::new();
        languages.insert(
            "fr".to_string(),
            LanguageKeywords {
                crit_rate: vec!["Taux CRIT".to_string()],
                crit_dmg: vec!["DGT CRIT".to_string()],
                circlet: vec!["Diadème".to_string()],
            },
        );
        let sets = KeywordTable::new(languages).merged();
        assert!(sets.is_circlet("diademe de la raison"));
        assert!(sets.is_crit_rate("taux crit+3,5"));
    }

    #[test]
    fn test_empty_keyword_ignored() {
        let mut languages = BTreeMap::new();
        languages.insert(
            "xx".to_string(),
            LanguageKeywords {
                circlet: vec!["  ".to_string()],
                ..LanguageKeywords::default()
            },
        );
        let sets = KeywordTable::new(languages).merged();
        // An empty keyword would otherwise match every line
        assert!(!sets.is_circlet("crit rate+3.9"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("languages.json");
        fs::write(
            &path,
            r#"{ "ja": { "crit_rate": ["会心率"], "crit_dmg": ["会心ダメージ"], "circlet": ["理の冠"] } }"#,
        )
        .unwrap();

        let table = KeywordTable::load(&path);
        assert!(table.contains("ja"));
        assert!(!table.contains("en"));
    }

    #[test]
    fn test_load_missing_or_bad_file_uses_default() {
        let dir = tempdir().unwrap();
        let missing = KeywordTable::load(&dir.path().join("nope.json"));
        assert!(missing.contains("en"));

        let bad = dir.path().join("languages.json");
        fs::write(&bad, "{ broken").unwrap();
        assert!(KeywordTable::load(&bad).contains("ch_sim"));
    }

    #[test]
    fn test_ocr_languages_adds_english_for_chinese() {
        let mut languages = BTreeMap::new();
        languages.insert("ch_tra".to_string(), LanguageKeywords::default());
        let table = KeywordTable::new(languages);
        assert_eq!(table.ocr_languages(), vec!["ch_tra", "en"]);
    }

    #[test]
    fn test_ocr_language_hints() {
        assert_eq!(ocr_language_hints("en"), vec!["en"]);
        assert_eq!(ocr_language_hints("ja"), vec!["ja", "en"]);
    }
}
