//! Strategies for filling or dropping missing cells.

use super::table::{Table, Value};
use std::fmt;
use std::str::FromStr;

/// How to handle missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStrategy {
    /// Fill numeric columns with the column mean.
    Mean,
    /// Fill numeric columns with the column median.
    Median,
    /// Remove every row that has a missing cell.
    Drop,
    /// Carry the last present value forward.
    ForwardFill,
    /// Carry the next present value backward.
    BackwardFill,
}

impl MissingStrategy {
    /// Parse a strategy name, falling back to [`MissingStrategy::Mean`] with
    /// a warning when the name is unknown.
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown strategy '{name}'. Using 'mean' instead.");
            Self::Mean
        })
    }

    /// Name used in config files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Drop => "drop",
            Self::ForwardFill => "forward_fill",
            Self::BackwardFill => "backward_fill",
        }
    }
}

impl FromStr for MissingStrategy {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "drop" => Ok(Self::Drop),
            "forward_fill" | "ffill" => Ok(Self::ForwardFill),
            "backward_fill" | "bfill" => Ok(Self::BackwardFill),
            _ => Err(anyhow::anyhow!("Unknown missing value strategy '{name}'")),
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Return a copy of `table` with missing cells handled by `strategy`.
///
/// Mean and median only touch numeric columns that have at least one
/// present value. Forward and backward fill apply to every column and
/// leave gaps at the edges that have no value to copy from.
#[must_use]
pub fn handle_missing_values(table: &Table, strategy: MissingStrategy) -> Table {
    let mut clean = table.clone();
    match strategy {
        MissingStrategy::Drop => {
            let keep: Vec<bool> = (0..table.row_count())
                .map(|idx| !table.row(idx).iter().any(|value| value.is_missing()))
                .collect();
            clean.retain_rows(|idx| keep[idx]);
        }
        MissingStrategy::Mean | MissingStrategy::Median => {
            for column in clean.columns_mut() {
                if !column.is_numeric() {
                    continue;
                }
                let fill = if strategy == MissingStrategy::Mean {
                    column.mean()
                } else {
                    column.median()
                };
                if let Some(fill) = fill {
                    for value in column.values.iter_mut().filter(|value| value.is_missing()) {
                        *value = Value::Number(fill);
                    }
                }
            }
        }
        MissingStrategy::ForwardFill => {
            for column in clean.columns_mut() {
                propagate(column.values.iter_mut());
            }
        }
        MissingStrategy::BackwardFill => {
            for column in clean.columns_mut() {
                propagate(column.values.iter_mut().rev());
            }
        }
    }

    tracing::info!("Missing values handled using '{strategy}' strategy");
    tracing::info!(
        before = ?table.shape(),
        after = ?clean.shape(),
        "Shape"
    );
    tracing::info!(
        before = table.missing_count(),
        after = clean.missing_count(),
        "Missing values"
    );
    clean
}

/// Copy the most recent present value into each following missing cell.
fn propagate<'a>(values: impl Iterator<Item = &'a mut Value>) {
    let mut last: Option<Value> = None;
    for value in values {
        if value.is_missing() {
            if let Some(ref fill) = last {
                *value = fill.clone();
            }
        } else {
            last = Some(value.clone());
        }
    }
}
