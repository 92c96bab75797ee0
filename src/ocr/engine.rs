use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use std::time::Duration;

/// Turns an artifact screenshot into a plain-text transcript.
pub trait OcrEngine {
    /// Recognizes text in a PNG image. Lines of the transcript are separated by `\n`.
    fn recognize(&self, png: &[u8], languages: &[String]) -> Result<String>;
}

/// A single recognized word from the EasyOCR response.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrWord {
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    words: Vec<OcrWord>,
}

/// Client for the hosted EasyOCR API.
pub struct EasyOcrClient {
    client: Client,
    api_url: String,
}

impl EasyOcrClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OCR HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

impl OcrEngine for EasyOcrClient {
    fn recognize(&self, png: &[u8], languages: &[String]) -> Result<String> {
        let lang = if languages.is_empty() {
            "en".to_string()
        } else {
            languages.join(",")
        };

        crate::log(&format!(
            "OCR request: {} bytes, languages {}",
            png.len(),
            lang
        ));

        let file = multipart::Part::bytes(png.to_vec())
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new().part("file", file).text("lang", lang);

        let response = self
            .client
            .post(&self.api_url)
            .header("User-Agent", "cv-leaderboard")
            .multipart(form)
            .send()
            .context("OCR request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("OCR API failed: {}, {}", status, body));
        }

        let parsed: OcrResponse = response
            .json()
            .context("Failed to parse OCR response")?;

        let transcript = words_to_text(&parsed.words);
        crate::log(&format!(
            "OCR complete: {} words",
            parsed.words.len()
        ));
        Ok(transcript)
    }
}

/// Joins recognized words into transcript lines, one word entry per line.
fn words_to_text(words: &[OcrWord]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
