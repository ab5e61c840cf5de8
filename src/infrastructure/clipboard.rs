use std::{io, thread};

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::controller::{Clipboard, ClipboardError};

type Job = (String, oneshot::Sender<Result<(), ClipboardError>>);

/// Something that can hold clipboard text for as long as it stays alive.
trait ClipboardBackend {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError>;
}

impl ClipboardBackend for arboard::Clipboard {
    fn set_text(&mut self, text: String) -> Result<(), ClipboardError> {
        arboard::Clipboard::set_text(self, text).map_err(|err| ClipboardError(err.to_string()))
    }
}

/// System clipboard through `arboard`. One handle lives on a dedicated
/// thread for the whole session: on X11 and Wayland the copied text is only
/// served while that handle exists.
pub struct SystemClipboard {
    jobs: mpsc::UnboundedSender<Job>,
}

impl SystemClipboard {
    pub fn spawn() -> io::Result<Self> {
        Self::with_backend(|| {
            arboard::Clipboard::new().map_err(|err| ClipboardError(err.to_string()))
        })
    }

    /// The backend is opened lazily on the first write and reopened after a
    /// failed one.
    fn with_backend<B, F>(mut open: F) -> io::Result<Self>
    where
        B: ClipboardBackend + 'static,
        F: FnMut() -> Result<B, ClipboardError> + Send + 'static,
    {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || {
                let mut backend: Option<B> = None;
                while let Some((text, reply)) = queue.blocking_recv() {
                    if backend.is_none() {
                        match open() {
                            Ok(opened) => backend = Some(opened),
                            Err(err) => {
                                let _ = reply.send(Err(err));
                                continue;
                            }
                        }
                    }
                    let outcome = match backend.as_mut() {
                        Some(backend) => backend.set_text(text),
                        None => Err(ClipboardError("clipboard unavailable".to_string())),
                    };
                    if outcome.is_err() {
                        backend = None;
                    }
                    let _ = reply.send(outcome);
                }
                tracing::debug!(target: "controller", "clipboard thread stopped");
            })?;
        Ok(Self { jobs })
    }
}

impl Clipboard for SystemClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), ClipboardError>> {
        Box::pin(async move {
            let (reply, outcome) = oneshot::channel();
            self.jobs
                .send((text.to_string(), reply))
                .map_err(|_| ClipboardError("clipboard thread stopped".to_string()))?;
            outcome
                .await
                .map_err(|_| ClipboardError("clipboard thread stopped".to_string()))?
        })
    }
}
