//! # rustscopus
//!
//! Scopus Boolean Search & Bibliometric Aggregation - Rust Microservice
//!
//! ## Modules
//!
//! - [`query`] - Boolean query construction (up to 3 keywords with AND/OR)
//! - [`scopus`] - Scopus Search API client
//! - [`record`] - Publication record model
//! - [`aggregate`] - Document-type, per-year, and citation aggregates
//! - [`export`] - CSV export
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust
//! use rustscopus::query::{build, Connector};
//! use rustscopus::aggregate::{aggregate, YearRange};
//!
//! # fn main() -> anyhow::Result<()> {
//! let q = build(&["deferiprone", "parkinson"], &[Connector::And])?;
//! let report = aggregate(&[], YearRange::default());
//! assert_eq!(report.skipped_records, 0);
//! println!("{}", q);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod query;
pub mod record;
pub mod scopus;

pub use error::{Result, ScopusError, ValidationError};
