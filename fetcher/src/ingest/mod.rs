pub mod http_source;

use crate::model::Page;
use async_trait::async_trait;
use fetcher_core::Result;

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page the given cursor points at
    async fn fetch_page(&self, url: &str) -> Result<Page>;

    /// Get the source identifier
    fn source_id(&self) -> &str;
}

pub use http_source::HttpSource;
