use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::ingest::parse_menu;
use crate::ingest::types::MenuSource;
use crate::menu::MenuItem;

/// Menu JSON on the local filesystem.
pub struct FileMenuSource {
    path: PathBuf,
}

impl FileMenuSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MenuSource for FileMenuSource {
    async fn load(&self) -> Result<Vec<MenuItem>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading menu from {}", self.path.display()))?;
        parse_menu(&raw).with_context(|| format!("parsing menu at {}", self.path.display()))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
