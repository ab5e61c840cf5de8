use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard: Send + Sync {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), ClipboardError>>;
}
