// src/ingest/types.rs
use anyhow::Result;

use crate::menu::MenuItem;

/// Somewhere a menu dataset can be loaded from.
#[async_trait::async_trait]
pub trait MenuSource: Send + Sync {
    async fn load(&self) -> Result<Vec<MenuItem>>;
    fn name(&self) -> &'static str;
}
