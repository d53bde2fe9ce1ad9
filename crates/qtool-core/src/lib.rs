//! # qtool-core
//!
//! Core functionality for qtool, a command-line client that runs ad-hoc
//! N1QL statements against a Couchbase cluster and prints the rows as a
//! table.
//!
//! ## Architecture
//!
//! - **Configuration**: [`ConfigStore`], an INI file of connection settings
//! - **Flattening**: [`Flattener`], nested rows to single-level mappings
//! - **Client**: the [`Connector`]/[`Session`] boundary and its HTTP
//!   implementation
//! - **Error Handling**: [`Error`] with categories for exit-code mapping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qtool_core::{
//!     ClusterTarget, ConfigStore, Connector, Credentials, Flattener, HttpConnector,
//!     QueryRequest, Session, Timeouts, config::CLUSTER_SECTION,
//! };
//!
//! # async fn run() -> qtool_core::Result<()> {
//! let store = ConfigStore::at_default_location();
//! let address = store.get(CLUSTER_SECTION, "address", "127.0.0.1:8091");
//! let credentials = Credentials::new(
//!     store.get(CLUSTER_SECTION, "username", "Administrator"),
//!     store.get(CLUSTER_SECTION, "password", ""),
//! );
//!
//! let session = HttpConnector::new()
//!     .connect(&ClusterTarget::parse(&address)?, &credentials, Timeouts::default())
//!     .await?;
//! let result = session.query(&QueryRequest::new("SELECT 1 AS one")).await?;
//!
//! for row in Flattener::default().flatten_all(&result.rows) {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```

/// Query boundary traits and the HTTP implementation
pub mod client;
/// File-backed settings store
pub mod config;
/// Error types and result aliases
pub mod error;
/// Nested-row flattening
pub mod flatten;
/// INI document model
pub mod ini;
/// Password wrapper
pub mod secret;
/// Core data types
pub mod types;

pub use client::{Connector, HttpConnector, HttpSession, Session};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use flatten::{Flattener, flatten};
pub use ini::IniDocument;
pub use secret::Secret;
pub use types::*;
