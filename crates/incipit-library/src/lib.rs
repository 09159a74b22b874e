//! Library service and catalogue plumbing for incipit.
//!
//! Owns the single-writer service actor that publishes index snapshots, the
//! catalogue reader boundary with its JSON-lines implementation, the media
//! scanner that produces catalogues, and configuration.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalogue;
pub mod config;
pub mod error;
pub mod scan;
pub mod service;

pub use catalogue::{CatalogueReader, JsonCatalogue, MemoryCatalogue};
pub use config::Config;
pub use error::{LibraryError, Result};
pub use scan::Scanner;
pub use service::Library;
