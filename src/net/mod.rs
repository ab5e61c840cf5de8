mod fetcher;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use fetcher::HttpFetcher;
pub use types::{Fetch, FetchError, FormField, Request, Response, ResponseKind};
