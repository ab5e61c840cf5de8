use futures::future::BoxFuture;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use url::{Origin, Url};

use super::types::{
    Fetch, FetchError, FormField, Request, RequestBody, Response, ResponseKind,
};

/// Sends requests straight to the network with `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Origin,
}

impl HttpFetcher {
    /// `app_url` decides which responses count as same-origin.
    pub fn new(client: Client, app_url: &Url) -> Self {
        Self {
            client,
            origin: app_url.origin(),
        }
    }

    async fn send(&self, request: &Request) -> Result<Response, FetchError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        if let RequestBody::Form(fields) = &request.body {
            builder = builder.multipart(build_form(fields)?);
        }

        let response = builder.send().await.map_err(FetchError::from_transport)?;
        let status = response.status();
        let kind = if response.url().origin() == self.origin {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        };
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(FetchError::from_transport)?
            .to_vec();

        tracing::debug!(
            target: "net",
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            "network response"
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            kind,
            headers,
            body,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, FetchError>> {
        Box::pin(self.send(request))
    }
}

fn build_form(fields: &[FormField]) -> Result<Form, FetchError> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name.clone(), value.clone()),
            FormField::File { name, upload } => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.name.clone())
                    .mime_str(&upload.mime)?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}
