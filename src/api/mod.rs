mod client;
mod payload;

pub use client::ClassifierClient;
pub use payload::ApiError;
