//! Wire models for the serial-number recognition service.
//!
//! The recognition endpoint is a hosted generative-vision API that
//! accepts an inline image plus a text instruction and answers with a
//! short text completion. Only the fields this crate needs are modeled.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// MIME type of the uploaded label photo.
const JPEG_MIME: &str = "image/jpeg";

/// Output cap for the extraction answer; a serial number is short.
const MAX_OUTPUT_TOKENS: u32 = 30;

/// Request body for a generate-content call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeRequest {
    /// Conversation contents; a single user turn for this use case.
    pub contents: Vec<Content>,
    /// Decoding configuration.
    pub generation_config: GenerationConfig,
}

/// One content turn, a sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Image and/or text parts making up the turn.
    pub parts: Vec<Part>,
}

/// A single content part: inline image data or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Inline binary payload, if this is an image part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Text payload, if this is a text part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Base64-encoded inline binary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload.
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Decoding configuration for the extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature; zero for a deterministic answer.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

/// Response body of a generate-content call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResponse {
    /// Candidate completions; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when the model produced nothing.
    #[serde(default)]
    pub content: Option<Content>,
}

impl RecognizeRequest {
    /// Builds a deterministic extraction request for a JPEG label photo.
    ///
    /// The image is base64-encoded inline; the instruction asks for the
    /// bare serial string, temperature is pinned to zero, and output is
    /// capped at a handful of tokens.
    #[inline]
    #[must_use]
    pub fn for_jpeg(image: &[u8], instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: JPEG_MIME.to_owned(),
                            data: BASE64.encode(image),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(instruction.to_owned()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0_f32,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

impl RecognizeResponse {
    /// Extracts the trimmed serial string from the first candidate.
    ///
    /// Returns `None` when the response carries no candidates, no text
    /// parts, or only whitespace — the "no match" outcome, which is
    /// distinct from a transport or API failure.
    #[inline]
    #[must_use]
    pub fn serial_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }
}
