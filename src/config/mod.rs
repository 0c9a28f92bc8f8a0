//! The config module reads the `.tinybatt/config.toml` file of a workspace.
//!
//! Every key is optional; a missing file or section falls back to the
//! defaults documented on each field.

use crate::dataset::loader::LoadOptions;
use crate::dataset::mapper::FeatureMapper;
use crate::dataset::missing::MissingStrategy;
use crate::utils::workspace::{find_workspace_path, CONFIG_FILE};
use serde_derive::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Catalog lint settings.
    pub lint: LintConfig,
    /// Dataset processing settings.
    pub dataset: DatasetConfig,
}

/// `[lint]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LintConfig {
    /// Number of projects the catalog must list. Defaults to 7.
    pub expected_entries: usize,
    /// URL schemes an entry may use. Defaults to `https` and `http`.
    pub allowed_schemes: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            expected_entries: 7,
            allowed_schemes: vec!["https".to_owned(), "http".to_owned()],
        }
    }
}

/// `[dataset]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Name of the missing value strategy. Unknown names fall back to `mean`.
    pub missing_strategy: String,
    /// Field delimiter for CSV datasets.
    pub delimiter: char,
    /// Extra features to detect, on top of the standard battery features.
    pub features: Vec<CustomFeature>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            missing_strategy: "mean".to_owned(),
            delimiter: ',',
            features: Vec::new(),
        }
    }
}

/// A `[[dataset.features]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomFeature {
    /// Standardized feature name, e.g. `soc`.
    pub name: String,
    /// Case-insensitive regular expressions matched against column names.
    pub patterns: Vec<String>,
}

impl DatasetConfig {
    /// The configured strategy, falling back to `mean` for unknown names.
    #[must_use]
    pub fn strategy(&self) -> MissingStrategy {
        MissingStrategy::parse_or_default(&self.missing_strategy)
    }

    /// Loader options derived from this section.
    ///
    /// # Errors
    /// Errors if the delimiter is not a single ASCII character.
    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        Ok(LoadOptions {
            delimiter: delimiter_byte(self.delimiter)?,
        })
    }

    /// A feature mapper seeded with the standard features plus the ones
    /// configured here.
    ///
    /// # Errors
    /// Errors if a configured pattern is not a valid regular expression.
    pub fn feature_mapper(&self) -> anyhow::Result<FeatureMapper> {
        let mut mapper = FeatureMapper::new();
        for feature in &self.features {
            mapper.add_custom_pattern(&feature.name, &feature.patterns)?;
        }
        Ok(mapper)
    }
}

/// Convert a delimiter character to the byte the CSV reader expects.
///
/// # Errors
/// Errors if `delimiter` is not ASCII.
pub fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("CSV delimiter must be a single ASCII character, got `{delimiter}`");
    }
    u8::try_from(delimiter).map_err(|err| anyhow::anyhow!("Invalid CSV delimiter: {err}"))
}

impl Config {
    /// Read a config file.
    ///
    /// # Errors
    /// Will error if unable to read or parse the file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config_str = read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Couldn't read config {}: {err}", path.display()))?;
        let conf: Self = toml::from_str(&config_str)?;
        Ok(conf)
    }

    /// Find the workspace containing `path` and read its config.
    ///
    /// Outside of a workspace, or in a workspace without a config file,
    /// the defaults are returned.
    ///
    /// # Errors
    /// Will error if `path` can't be resolved, or if a config file exists
    /// but can't be parsed.
    pub fn discover(path: &Path) -> anyhow::Result<Self> {
        let abs_path = path.canonicalize().map_err(|err| {
            anyhow::anyhow!("Couldn't resolve workspace path {}: {err}", path.display())
        })?;
        let Ok(workspace) = find_workspace_path(&abs_path) else {
            tracing::debug!(path = %abs_path.display(), "Not in a workspace, using default config");
            return Ok(Self::default());
        };
        let config_path = workspace.join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Loading config");
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}
