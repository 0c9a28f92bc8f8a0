//! In-memory, column-oriented table of dataset values.

use std::fmt;

/// Cell texts read as missing, the same set pandas treats as NA by default.
/// Compared case-insensitively.
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None",
];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty or explicitly missing (`NA`, `N/A`, `NaN`, `null`, `None`, ...).
    Missing,
    /// Any cell that parses as a float.
    Number(f64),
    /// Everything else, e.g. timestamps or cell identifiers.
    Text(String),
}

impl Value {
    /// Classify a raw text cell.
    #[must_use]
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() || NA_VALUES.iter().any(|na| cell.eq_ignore_ascii_case(na)) {
            return Self::Missing;
        }
        match cell.parse::<f64>() {
            // `+nan`, `-NaN` and friends parse, but must never reach the statistics.
            Ok(number) if number.is_nan() => Self::Missing,
            Ok(number) => Self::Number(number),
            Err(_) => Self::Text(cell.to_owned()),
        }
    }

    /// Whether the cell holds no value.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(*self, Self::Missing)
    }

    /// The numeric value, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Number(number) => Some(number),
            Self::Missing | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Missing => Ok(()),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(ref text) => f.write_str(text),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column header.
    pub name: String,
    /// Cells, top to bottom.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column is numeric when it holds no text cells.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !self.values.iter().any(|value| matches!(*value, Value::Text(_)))
    }

    /// Number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_missing()).count()
    }

    /// The present numeric cells.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }

    /// Mean of the present numeric cells, `None` if there are none.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .numbers()
            .fold((0.0_f64, 0_u32), |(sum, count), number| (sum + number, count + 1));
        (count > 0).then(|| sum / f64::from(count))
    }

    /// Median of the present numeric cells, `None` if there are none.
    #[must_use]
    pub fn median(&self) -> Option<f64> {
        let mut numbers: Vec<f64> = self.numbers().collect();
        if numbers.is_empty() {
            return None;
        }
        numbers.sort_by(f64::total_cmp);
        let mid = numbers.len() / 2;
        if numbers.len() % 2 == 0 {
            Some((numbers[mid - 1] + numbers[mid]) / 2.0)
        } else {
            Some(numbers[mid])
        }
    }
}

/// A rectangular table: every column has the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Build a table from columns.
    ///
    /// # Errors
    /// Errors if the columns don't all have the same length.
    pub fn from_columns(columns: Vec<Column>) -> anyhow::Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Build a table from columns already known to be the same length,
    /// e.g. columns taken from another table.
    pub(crate) fn from_columns_unchecked(columns: Vec<Column>) -> Self {
        debug_assert!(columns
            .windows(2)
            .all(|pair| pair[0].values.len() == pair[1].values.len()));
        Self { columns }
    }

    /// Append a column.
    ///
    /// # Errors
    /// Errors if the column length differs from the table's row count.
    pub fn push_column(&mut self, column: Column) -> anyhow::Result<()> {
        if !self.columns.is_empty() && column.values.len() != self.row_count() {
            anyhow::bail!(
                "Column '{}' has {} rows, table has {}",
                column.name,
                column.values.len(),
                self.row_count()
            );
        }
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.values.len())
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.columns.len())
    }

    /// All columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to the columns. The row count must not change.
    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// The first column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column headers, in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// The cells of row `idx`, left to right.
    #[must_use]
    pub fn row(&self, idx: usize) -> Vec<&Value> {
        self.columns
            .iter()
            .filter_map(|column| column.values.get(idx))
            .collect()
    }

    /// Total number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Keep only the rows for which `keep` returns `true`.
    pub fn retain_rows(&mut self, keep: impl Fn(usize) -> bool) {
        let mask: Vec<bool> = (0..self.row_count()).map(keep).collect();
        for column in &mut self.columns {
            let mut idx = 0;
            column.values.retain(|_| {
                let kept = mask[idx];
                idx += 1;
                kept
            });
        }
    }
}
