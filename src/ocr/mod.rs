pub mod engine;
pub mod extract;
pub mod keywords;
pub mod normalize;
pub mod preprocess;

pub use engine::{EasyOcrClient, OcrEngine};
pub use extract::{parse_artifact_text, Interpretation};
pub use keywords::{ocr_language_hints, KeywordTable};
pub use normalize::normalize_text;

use anyhow::Result;

/// High-level function: screenshot → transcript.
///
/// Re-encodes the upload as PNG and runs it through the OCR engine with the
/// given language hints.
pub fn ocr_screenshot(
    engine: &dyn OcrEngine,
    image_bytes: &[u8],
    languages: &[String],
) -> Result<String> {
    let png = preprocess::to_png(image_bytes)?;
    engine.recognize(&png, languages)
}
