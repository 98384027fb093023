//! # Reelsift Common Library
//!
//! Shared code for the reelsift services:
//! - Error type used outside request handling
//! - Configuration loading (CLI → ENV → TOML → compiled defaults)
//! - Event types (ReelsiftEvent enum) and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
