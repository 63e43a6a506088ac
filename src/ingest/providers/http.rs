use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::types::MenuSource;
use crate::menu::MenuItem;

/// Menu JSON served over HTTP.
pub struct HttpMenuSource {
    url: String,
    client: reqwest::Client,
}

impl HttpMenuSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MenuSource for HttpMenuSource {
    async fn load(&self) -> Result<Vec<MenuItem>> {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, url = %self.url, "menu http error");
                return Err(e).context("menu http get()");
            }
        };
        let resp = resp.error_for_status().context("menu http status")?;
        let body = resp.text().await.context("menu http .text()")?;
        crate::ingest::parse_menu(&body).context("parsing menu from http")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
