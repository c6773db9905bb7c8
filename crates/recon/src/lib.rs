//! `responsa-recon`: locator normalization and multi-source reconciliation
//! for responsa citation catalogs.
//!
//! Pure engine crate: receives pre-loaded tables, returns the merged index,
//! the locator superset, statistics and the unmatched-key log.
//! No CLI or filesystem dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod locator;
pub mod model;
pub mod normalize;
pub mod numeral;
pub mod special_cases;
pub mod stats;

pub use config::IndexConfig;
pub use engine::run;
pub use error::{NumeralError, ReconError};
pub use locator::{Locator, PrefixRule};
pub use model::{IndexResult, IndexTable, SourceTable};
pub use normalize::{KeyLog, Normalizer};
pub use numeral::NumericKey;
pub use special_cases::SpecialCases;
pub use stats::{Statistics, StatsReport};
