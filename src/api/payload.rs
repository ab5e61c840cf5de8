use serde::Deserialize;
use thiserror::Error;

use crate::{
    domain::{ClassificationResult, Submission},
    net::{FetchError, FormField, Response},
};

pub const DEFAULT_ERROR_DETAIL: &str = "Processing error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Network(#[from] FetchError),
    /// Non-2xx answer; `detail` is shown to the user verbatim.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("unexpected response from classifier: {0}")]
    Decode(#[from] serde_json::Error),
}

pub fn build_form(submission: &Submission) -> Vec<FormField> {
    match submission {
        Submission::File(upload) => vec![FormField::File {
            name: "file".to_string(),
            upload: upload.clone(),
        }],
        Submission::Text(text) => vec![FormField::Text {
            name: "text".to_string(),
            value: text.clone(),
        }],
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

pub fn parse_response(response: &Response) -> Result<ClassificationResult, ApiError> {
    if !response.is_ok() {
        let detail = response
            .parse_json::<ErrorBody>()
            .ok()
            .and_then(|body| body.detail.or(body.message))
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_DETAIL.to_string());
        return Err(ApiError::Rejected {
            status: response.status,
            detail,
        });
    }
    Ok(response.parse_json()?)
}
