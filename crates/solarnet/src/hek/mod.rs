//! # HEK Client
//!
//! Client for the Heliophysics Event Knowledgebase search API.
//!
//! ## Search Flow
//!
//! 1. The query attributes are AND-ed into one [`HekQuery`].
//! 2. The HEK walker compiles it into one parameter mapping per OR branch.
//! 3. Each mapping is merged over the client defaults and downloaded page by
//!    page (`page` from 1 while the response says `overmax`).
//! 4. With more than one mapping, rows are concatenated and deduplicated,
//!    keeping the first occurrence.
//!
//! Compilation errors surface before any request is sent. A failed page
//! aborts the whole search; there are no partial results.
//!
//! ```ignore
//! let client = HekClient::from_config(&config)?;
//! let flares = client.search([
//!     HekQuery::from(FL),
//!     TimeRange::parse("2011/08/09 07:23:56", "2011/08/09 12:40:29")?.into(),
//!     fields::goes_class().gt("M1").into(),
//! ])?;
//! ```

pub mod attrs;
mod client;
mod table;
mod transport;

pub use attrs::{contains, fields, EventType, HekAttr, HekQuery, SpatialRegion};
pub use client::HekClient;
pub use table::{freeze, unique, Frozen, HekRow, HekTable};
pub use transport::{HttpTransport, MemoryTransport, Recorded, Transport};
