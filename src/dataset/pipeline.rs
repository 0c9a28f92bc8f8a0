//! Load a dataset and extract its standard battery features in one step.

use super::loader::{load_dataset, LoadOptions};
use super::mapper::{FeatureMapper, FeatureMapping};
use super::table::Table;
use std::path::Path;

/// The outcome of processing a dataset.
#[derive(Debug, Clone)]
pub struct ProcessedDataset {
    /// The dataset as loaded.
    pub raw_data: Table,
    /// Only the mapped features, under their standard names.
    pub processed_data: Table,
    /// The detected feature mapping.
    pub feature_mapping: FeatureMapping,
    /// Columns of `processed_data`.
    pub available_features: Vec<String>,
}

/// Loads battery datasets and maps them to standard features.
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    /// The mapper used for feature detection.
    pub feature_mapper: FeatureMapper,
}

impl DataLoader {
    /// A loader using the standard feature patterns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader using a custom mapper.
    #[must_use]
    pub const fn with_mapper(feature_mapper: FeatureMapper) -> Self {
        Self { feature_mapper }
    }

    /// Load the dataset at `path` and extract its features.
    ///
    /// # Errors
    /// Errors if the dataset can't be loaded.
    pub fn process_dataset(
        &self,
        path: &Path,
        options: &LoadOptions,
    ) -> anyhow::Result<ProcessedDataset> {
        let raw_data = load_dataset(path, options)?;
        Ok(self.process_table(raw_data))
    }

    /// Extract the features of an already loaded table.
    #[must_use]
    pub fn process_table(&self, raw_data: Table) -> ProcessedDataset {
        tracing::info!(shape = ?raw_data.shape(), "Original dataset");
        tracing::info!(columns = ?raw_data.column_names(), "Original columns");

        let feature_mapping = self
            .feature_mapper
            .find_matching_columns(&raw_data.column_names());
        tracing::info!(mapping = ?feature_mapping, "Detected feature mapping");

        let processed_data = self
            .feature_mapper
            .extract_features(&raw_data, Some(&feature_mapping));
        let available_features: Vec<String> = processed_data
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        tracing::info!(shape = ?processed_data.shape(), "Processed dataset");
        tracing::info!(features = ?available_features, "Available features");

        ProcessedDataset {
            raw_data,
            processed_data,
            feature_mapping,
            available_features,
        }
    }
}
