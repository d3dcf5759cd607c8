use super::PageSource;
use crate::model::Page;
use async_trait::async_trait;
use fetcher_core::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    #[instrument(skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<Page> {
        // A malformed cursor surfaces here as a builder error and is retried like any other.
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let page: Page = serde_json::from_slice(&body)?;

        debug!(
            items = page.results.len(),
            next = ?page.next_cursor(),
            bytes = body.len(),
            "Decoded page"
        );

        Ok(page)
    }

    fn source_id(&self) -> &str {
        "http"
    }
}
