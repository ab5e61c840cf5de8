use std::sync::Arc;

use url::Url;

use crate::{
    domain::{ClassificationResult, Submission},
    net::{Fetch, Request},
};

use super::payload::{build_form, parse_response, ApiError};

#[derive(Clone)]
pub struct ClassifierClient {
    transport: Arc<dyn Fetch>,
    endpoint: Url,
}

impl ClassifierClient {
    pub fn new(transport: Arc<dyn Fetch>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub async fn classify(&self, submission: &Submission) -> Result<ClassificationResult, ApiError> {
        let request = Request::post_form(self.endpoint.clone(), build_form(submission));
        let response = self.transport.fetch(&request).await?;
        parse_response(&response)
    }
}
