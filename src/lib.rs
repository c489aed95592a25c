//! store-submit - store submission client
//!
//! Clones the published submission of an app, flight or in-app product,
//! patches caller-selected fields into the clone, replaces it remotely,
//! uploads package and media assets, commits, and monitors certification.

pub mod auth;
pub mod config;
pub mod error;
pub mod monitor;
pub mod resources;
pub mod submit;
pub mod transport;
pub mod types;
pub mod upload;
