// src/ocr.rs

use crate::config::OcrSection;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// The prompt that instructs the vision model to read the receipt and
/// return machine-parseable product rows.
const OCR_PROMPT: &str = r#"You are an expert receipt OCR system. Extract ALL products from this shopping receipt.

CRITICAL RULES:
1. Preserve decimal points EXACTLY (1.2 NOT 12, 1.5 NOT 15, 0.5 NOT 5)
2. Extract quantities from the "Quantity" column only (not prices or totals)
3. Include product name, quantity, and unit for each item
4. Use standard units: kg, L, g, ml, pcs, dozen

Return ONLY a valid JSON array with NO markdown, NO explanation, NO code blocks:
[
  {"name": "Milk", "quantity": 2, "unit": "L"},
  {"name": "Chicken", "quantity": 1.2, "unit": "kg"},
  {"name": "Eggs", "quantity": 12, "unit": "pcs"}
]

Extract ALL products from the receipt now."#;

/// The external text-extraction collaborator. A single await boundary:
/// implementations return the complete ordered line sequence or fail,
/// never partial results. The pipeline core only ever sees the lines.
#[async_trait]
pub trait TextExtractor {
    async fn extract_lines(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// One product row as the vision model reports it.
#[derive(Debug, Deserialize)]
struct ExtractedProduct {
    name: String,
    quantity: f64,
    unit: String,
}

/// Vision-model OCR over an OpenAI-style chat-completions endpoint.
/// The receipt photo goes up as a base64 data URL; the JSON-array reply
/// comes back as `"Name quantity unit"` lines for the matcher.
pub struct VisionOcrClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl VisionOcrClient {
    pub fn new(ocr: &OcrSection) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = std::env::var(&ocr.api_key_env)
            .map_err(|_| format!("{} env var required for the OCR backend", ocr.api_key_env))?;
        Ok(VisionOcrClient {
            client: Client::new(),
            base_url: ocr.base_url.clone(),
            model: ocr.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl TextExtractor for VisionOcrClient {
    async fn extract_lines(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let data_url = format!("data:{};base64,{}", mime_type, BASE64.encode(image_bytes));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: OCR_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 2000,
            // low temperature for extraction accuracy
            temperature: 0.1,
        };

        let url = format!("{}/chat/completions", self.base_url);
        info!(url = %url, model = %self.model, bytes = image_bytes.len(), "Sending receipt to vision OCR");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Vision API error {status}: {body}").into());
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or("Empty response from vision model")?;

        let lines = parse_model_reply(content)?;
        info!(lines = lines.len(), "Vision OCR extracted product lines");
        Ok(lines)
    }
}

/// Parse the model's reply into `"Name quantity unit"` lines. Strips
/// markdown fences the model may add despite instructions and tolerates
/// surrounding prose around the JSON array.
fn parse_model_reply(content: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let stripped = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let json_str = extract_json_array(stripped)?;
    let products: Vec<ExtractedProduct> = serde_json::from_str(json_str)
        .map_err(|e| format!("Failed to parse vision reply as product rows: {e}"))?;

    if products.is_empty() {
        warn!("Vision model returned an empty product array");
    }

    Ok(products
        .iter()
        .map(|p| format!("{} {} {}", p.name, p.quantity, p.unit))
        .collect())
}

/// Extract the outermost JSON array from a string that may contain
/// surrounding text (e.g. reasoning tokens).
fn extract_json_array(s: &str) -> Result<&str, Box<dyn std::error::Error>> {
    let start = s.find('[').ok_or("No '[' found in vision reply")?;
    let end = s.rfind(']').ok_or("No ']' found in vision reply")?;
    if end <= start {
        return Err("Malformed JSON in vision reply".into());
    }
    Ok(&s[start..=end])
}

/// Split raw extracted text into trimmed, non-empty receipt lines.
pub fn parse_receipt_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Guess the MIME type from the image file extension, defaulting to
/// JPEG for unknown ones.
pub fn mime_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_receipt_lines() {
        let lines = parse_receipt_lines("Milk 2 L\n\n  Chicken 1.2 kg  \n");
        assert_eq!(lines, vec!["Milk 2 L", "Chicken 1.2 kg"]);
    }

    #[test]
    fn test_parse_model_reply_clean_json() {
        let reply = r#"[{"name": "Milk", "quantity": 2, "unit": "L"}]"#;
        let lines = parse_model_reply(reply).unwrap();
        assert_eq!(lines, vec!["Milk 2 L"]);
    }

    #[test]
    fn test_parse_model_reply_with_fences_and_prose() {
        let reply = "Here you go:\n```json\n[{\"name\": \"Eggs\", \"quantity\": 12, \"unit\": \"pcs\"}]\n```";
        let lines = parse_model_reply(reply).unwrap();
        assert_eq!(lines, vec!["Eggs 12 pcs"]);
    }

    #[test]
    fn test_parse_model_reply_preserves_decimals() {
        let reply = r#"[{"name": "Chicken", "quantity": 1.2, "unit": "kg"}]"#;
        let lines = parse_model_reply(reply).unwrap();
        assert_eq!(lines, vec!["Chicken 1.2 kg"]);
    }

    #[test]
    fn test_parse_model_reply_without_array_fails() {
        assert!(parse_model_reply("I could not read the receipt").is_err());
    }
}
