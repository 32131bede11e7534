//! Built-in resource types.
//!
//! - [`colors`] – colour tables merged key by key across every pack
//! - [`assetfile`] – a single file taken from the highest priority pack

pub mod assetfile;
pub mod colors;

pub use assetfile::AssetFileResource;
pub use colors::ColorsResource;
