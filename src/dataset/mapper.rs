//! Detects which dataset columns carry the standard battery features and
//! copies them out under standardized names.
//!
//! Battery datasets name the same measurement in many ways (`Voltage_V`,
//! `cell_voltage`, `V_batt`...). Each standard feature owns an ordered list
//! of case-insensitive patterns; a pattern matches when it occurs anywhere
//! in the column name. Features are resolved in order, and a column claimed
//! by an earlier feature is never reused.

#![allow(clippy::expect_used)]

use super::table::{Column, Table};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// Default detection patterns, in resolution order.
const STANDARD_PATTERNS: &[(&str, &[&str])] = &[
    (
        "capacity",
        &[
            "capacity",
            "cap",
            "q",
            "charge_capacity",
            "discharge_capacity",
            "nominal_capacity",
            "ah",
            "ampere_hour",
            "mah",
            "milliampere",
        ],
    ),
    (
        "voltage",
        &[
            "voltage",
            "volt",
            "v",
            "batt_voltage",
            "cell_voltage",
            "terminal_voltage",
            "v_batt",
            "volts",
            "voltage_v",
        ],
    ),
    (
        "current",
        &[
            "current",
            "curr",
            "i",
            "batt_current",
            "cell_current",
            "discharge_current",
            "charge_current",
            "amps",
            "amperes",
            "current_a",
            "ampere",
        ],
    ),
    (
        "temperature",
        &[
            "temperature",
            "temp",
            "tmp",
            "batt_temp",
            "cell_temp",
            "t_batt",
            "thermal",
            "deg",
            "celsius",
            "fahrenheit",
            "temp_c",
            "temp_f",
        ],
    ),
    (
        "discharge_time",
        &[
            "discharge_time",
            "disch_time",
            "t_discharge",
            "t_disch",
            "discharge_duration",
            "duration_discharge",
            "disc_time",
            "time_discharge",
        ],
    ),
    (
        "charge_time",
        &[
            "charge_time",
            "chg_time",
            "t_charge",
            "t_chg",
            "charge_duration",
            "duration_charge",
            "ch_time",
            "time_charge",
        ],
    ),
];

lazy_static! {
    static ref STANDARD_FEATURES: Vec<Feature> = STANDARD_PATTERNS
        .iter()
        .map(|&(name, patterns)| {
            Feature::compile(name, patterns).expect("Failed to compile standard patterns!?!")
        })
        .collect();
}

/// A feature and its compiled detection patterns.
#[derive(Debug, Clone)]
struct Feature {
    name: String,
    patterns: Vec<Regex>,
}

impl Feature {
    fn compile<S: AsRef<str>>(name: &str, patterns: &[S]) -> anyhow::Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| {
                        anyhow::anyhow!(
                            "Invalid pattern '{}' for feature '{name}': {err}",
                            pattern.as_ref()
                        )
                    })
            })
            .collect::<anyhow::Result<Vec<Regex>>>()?;
        Ok(Self {
            name: name.to_owned(),
            patterns,
        })
    }
}

/// Standard feature name to source column name, in feature order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureMapping {
    pairs: Vec<(String, String)>,
}

impl FeatureMapping {
    /// An empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Map `feature` to `column`, replacing any previous column for it.
    pub fn insert(&mut self, feature: impl Into<String>, column: impl Into<String>) {
        let feature = feature.into();
        let column = column.into();
        if let Some(pair) = self.pairs.iter_mut().find(|pair| pair.0 == feature) {
            pair.1 = column;
        } else {
            self.pairs.push((feature, column));
        }
    }

    /// The column mapped to `feature`.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.0 == feature)
            .map(|pair| pair.1.as_str())
    }

    /// Whether `column` is already mapped to some feature.
    #[must_use]
    pub fn contains_column(&self, column: &str) -> bool {
        self.pairs.iter().any(|pair| pair.1 == column)
    }

    /// `(feature, column)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|pair| (pair.0.as_str(), pair.1.as_str()))
    }

    /// Mapped feature names, in order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|pair| pair.0.as_str())
    }

    /// Number of mapped features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Maps dataset columns to standard battery features.
#[derive(Debug, Clone)]
pub struct FeatureMapper {
    features: Vec<Feature>,
}

impl Default for FeatureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureMapper {
    /// A mapper for the six standard features: capacity, voltage, current,
    /// temperature, discharge time and charge time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: STANDARD_FEATURES.clone(),
        }
    }

    /// Feature names in resolution order.
    #[must_use]
    pub fn standard_features(&self) -> Vec<String> {
        self.features.iter().map(|feature| feature.name.clone()).collect()
    }

    /// Detect which columns carry which features.
    ///
    /// For each feature in order, its patterns are tried in order; the first
    /// pattern that matches an unclaimed column (scanning columns in dataset
    /// order) decides the mapping for that feature.
    #[must_use]
    pub fn find_matching_columns<S: AsRef<str>>(&self, columns: &[S]) -> FeatureMapping {
        let mut mapping = FeatureMapping::new();
        for feature in &self.features {
            let found = feature.patterns.iter().find_map(|pattern| {
                columns.iter().map(AsRef::as_ref).find(|column| {
                    pattern.is_match(column) && !mapping.contains_column(column)
                })
            });
            if let Some(column) = found {
                mapping.insert(feature.name.as_str(), column);
            }
        }
        mapping
    }

    /// Copy the mapped columns out of `table` under their standard names.
    ///
    /// Without an explicit `mapping` the columns are detected. Mapped columns
    /// that don't exist in `table` are skipped with a warning.
    #[must_use]
    pub fn extract_features(&self, table: &Table, mapping: Option<&FeatureMapping>) -> Table {
        let detected;
        let mapping = if let Some(mapping) = mapping {
            mapping
        } else {
            detected = self.find_matching_columns(&table.column_names());
            &detected
        };

        let mut columns = Vec::with_capacity(mapping.len());
        for (feature, column_name) in mapping.iter() {
            if let Some(column) = table.column(column_name) {
                columns.push(Column::new(feature, column.values.clone()));
            } else {
                tracing::warn!(column = column_name, "Column not found in dataset");
            }
        }

        let missing: Vec<&str> = self
            .features
            .iter()
            .map(|feature| feature.name.as_str())
            .filter(|name| mapping.get(name).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Missing features");
        }

        Table::from_columns_unchecked(columns)
    }

    /// Names of the features detectable in `columns`.
    #[must_use]
    pub fn get_available_features<S: AsRef<str>>(&self, columns: &[S]) -> BTreeSet<String> {
        self.find_matching_columns(columns)
            .features()
            .map(str::to_owned)
            .collect()
    }

    /// Register patterns for `feature`. An existing feature keeps its place
    /// in the resolution order and has its patterns replaced; a new feature
    /// is resolved after all existing ones.
    ///
    /// # Errors
    /// Errors if a pattern is not a valid regular expression.
    pub fn add_custom_pattern<S: AsRef<str>>(
        &mut self,
        feature: &str,
        patterns: &[S],
    ) -> anyhow::Result<()> {
        let compiled = Feature::compile(feature, patterns)?;
        if let Some(existing) = self.features.iter_mut().find(|f| f.name == feature) {
            *existing = compiled;
        } else {
            self.features.push(compiled);
        }
        Ok(())
    }
}
