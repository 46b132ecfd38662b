//! Data layer: core types, loading, enrichment, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset, check required columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  enrich   │  add duration_s / year when absent
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  year / popularity / duration bounds → new Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  per-year mean duration / track count
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

pub use error::DataError;
