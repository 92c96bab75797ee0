use regex::Regex;
use std::sync::LazyLock;

use super::keywords::KeywordTable;
use super::normalize::normalize_text;

/// Pattern to match stat-like numbers:
/// - Plain numbers: 12
/// - Decimals with a dot or comma separator: 12.3 or 12,3
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[.,]?\d*").expect("number pattern is valid"));

/// Result of reading an artifact transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpretation {
    /// A circlet keyword was found; circlets are not eligible.
    Circlet,
    /// Stats found on the artifact. Stats that were not found are 0.0.
    Stats { crit_rate: f64, crit_dmg: f64 },
}

/// Reads CRIT Rate and CRIT DMG out of an OCR transcript.
///
/// Keywords from every language in the table are tried on every line. A
/// circlet keyword on any line vetoes the whole artifact immediately. For
/// other lines the rightmost number is the stat value, since icons and
/// bullet glyphs in front of the stat sometimes read as digits.
pub fn parse_artifact_text(ocr_text: &str, languages: &KeywordTable) -> Interpretation {
    let keywords = languages.merged();
    let mut crit_rate = 0.0;
    let mut crit_dmg = 0.0;

    for line in ocr_text.lines() {
        let line_clean = normalize_text(line.replace('%', "").trim());

        if keywords.is_circlet(&line_clean) {
            return Interpretation::Circlet;
        }

        let Some(value) = last_number(&line_clean) else {
            continue;
        };

        if keywords.is_crit_dmg(&line_clean) {
            crit_dmg = value;
        }
        if keywords.is_crit_rate(&line_clean) {
            crit_rate = value;
        }
    }

    Interpretation::Stats {
        crit_rate,
        crit_dmg,
    }
}

/// Parses the last number on a line. `None` if there is none or it does not parse.
fn last_number(line: &str) -> Option<f64> {
    let token = NUMBER_PATTERN.find_iter(line).last()?;
    token.as_str().replace(',', ".").parse::<f64>().ok()
}
