use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ingest::parse_menu;
use crate::ingest::types::MenuSource;
use crate::menu::MenuItem;

/// Dataset compiled into the binary; used when nothing else loads.
pub const EMBEDDED_MENU: &str = include_str!("../../../data/menu.json");

#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedMenuSource;

#[async_trait]
impl MenuSource for EmbeddedMenuSource {
    async fn load(&self) -> Result<Vec<MenuItem>> {
        parse_menu(EMBEDDED_MENU).context("parsing embedded menu")
    }

    fn name(&self) -> &'static str {
        "embedded"
    }
}
