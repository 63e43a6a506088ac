// src/ingest/providers/mod.rs
pub mod embedded;
pub mod file;
#[cfg(feature = "http-source")]
pub mod http;

pub use embedded::EmbeddedMenuSource;
pub use file::FileMenuSource;
#[cfg(feature = "http-source")]
pub use http::HttpMenuSource;
