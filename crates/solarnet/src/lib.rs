//! # Solarnet Architecture
//!
//! Solarnet is a **query and dispatch library** for solar-physics data services.
//! The CLI (`solarnet-cli`) is one client of it; nothing in here touches the
//! terminal.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (hek/, dataretriever/, timeseries/)                │
//! │  - HEK search with pagination and dedup                     │
//! │  - URL-template data retriever routed by Fido               │
//! │  - Time-series factory routed by source                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Compilation (attr/walker.rs)                               │
//! │  - Attribute tree → list of request parameter mappings      │
//! │  - One mapping per OR branch                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (attr/, dispatch/)                                    │
//! │  - Attribute algebra: Dummy, Leaf, Not, And, Or             │
//! │  - ConditionalDispatch: ordered (condition, handler) table  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O in the Core
//!
//! The algebra, the walker and the dispatch engine are pure. Network access
//! only happens through the [`hek::Transport`] trait, so every client can be
//! driven by [`hek::MemoryTransport`] in tests.
//!
//! ## Module Overview
//!
//! - [`attr`]: Attribute algebra, relational params and the [`attr::Walker`]
//! - [`dispatch`]: [`dispatch::ConditionalDispatch`] and its signature model
//! - [`hek`]: HEK attributes, client, rows and tables
//! - [`vso`]: Data-service attributes shared by the retriever
//! - [`dataretriever`]: URL-template clients and the [`dataretriever::Fido`] factory
//! - [`timeseries`]: [`timeseries::TimeSeriesFactory`]
//! - [`config`]: Layered configuration
//! - [`time`]: Time parsing and ranges
//! - [`error`]: [`error::SolarnetError`] and the crate `Result`

pub mod attr;
pub mod config;
pub mod dataretriever;
pub mod dispatch;
pub mod error;
pub mod hek;
pub mod time;
pub mod timeseries;
pub mod vso;

pub use attr::{Attr, Leaf};
pub use dispatch::ConditionalDispatch;
pub use error::{Result, SolarnetError};
