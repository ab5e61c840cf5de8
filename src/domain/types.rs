use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque JSON object returned by the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult(Map<String, Value>);

impl ClassificationResult {
    pub fn suggested_reply(&self) -> Option<&str> {
        self.0
            .get("suggested_reply")
            .and_then(Value::as_str)
            .filter(|reply| !reply.is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        self.0.get("category").and_then(Value::as_str)
    }

    pub fn intent(&self) -> Option<&str> {
        self.0.get("intent").and_then(Value::as_str)
    }

    pub fn reply_source(&self) -> Option<&str> {
        self.0.get("reply_source").and_then(Value::as_str)
    }

    pub fn category_score(&self) -> Option<f64> {
        self.0.get("category_score").and_then(Value::as_f64)
    }

    pub fn intent_score(&self) -> Option<f64> {
        self.0.get("intent_score").and_then(Value::as_f64)
    }

    /// Score used for color coding: `category_score`, or a generic
    /// `confidence` field from services that report a single number.
    pub fn confidence(&self) -> Option<f64> {
        self.category_score()
            .or_else(|| self.0.get("confidence").and_then(Value::as_f64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    Good,
    Warn,
    Bad,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceTier::Good
        } else if score >= 0.6 {
            ConfidenceTier::Warn
        } else {
            ConfidenceTier::Bad
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::Good => "good",
            ConfidenceTier::Warn => "warn",
            ConfidenceTier::Bad => "bad",
        }
    }
}

/// File picked by the user for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for(&name).to_string();
        Self { name, bytes, mime }
    }
}

fn mime_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Payload of one POST to the classification endpoint. Never carries both
/// a file and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    File(Upload),
    Text(String),
}

impl Submission {
    /// Picks what to send from the current inputs; the file wins over text.
    pub fn from_inputs(text: &str, file: Option<&Upload>) -> Option<Self> {
        match file {
            Some(upload) => Some(Submission::File(upload.clone())),
            None if !text.is_empty() => Some(Submission::Text(text.to_string())),
            None => None,
        }
    }
}
