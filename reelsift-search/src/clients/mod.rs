//! HTTP clients for the two consumed services
//!
//! - **catalog** - internal movie catalog search (one POST per cycle)
//! - **omdb** - external metadata provider (one GET per candidate)
//!
//! Each client sits behind an async trait so the session can be driven by test doubles.

pub mod catalog;
pub mod omdb;

pub use catalog::{CatalogClient, CatalogError, CatalogSearch};
pub use omdb::{MetadataProvider, OmdbClient, ProviderError, ProviderMetadata};

const USER_AGENT: &str = concat!("reelsift/", env!("CARGO_PKG_VERSION"));
