//! Battery dataset preparation.
//!
//! Datasets from different test benches and publications describe the same
//! measurements with different column names. This module loads such
//! datasets, detects the columns carrying the standard battery features,
//! and fills missing values so the result can feed SoC/SoH/RUL model
//! training.

pub mod loader;
pub mod mapper;
pub mod missing;
pub mod pipeline;
pub mod table;

pub use loader::{load_dataset, write_csv, LoadOptions};
pub use mapper::{FeatureMapper, FeatureMapping};
pub use missing::{handle_missing_values, MissingStrategy};
pub use pipeline::{DataLoader, ProcessedDataset};
pub use table::{Column, Table, Value};
