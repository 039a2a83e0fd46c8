//! Per-table batch file bookkeeping.

use std::collections::BTreeMap;

use wikitables_core::Table;

/// Position of one table's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCursor {
    /// Index of the file rows are currently appended to.
    pub batch_index: u64,
    /// Rows appended to that file so far.
    pub line_count: u64,
}

/// Tracks which batch file each table appends to.
///
/// Rows are always appended to the current file. Once a file holds at least
/// `rows_per_file` rows the next append for that table opens a new file, so
/// a single large append may overshoot the threshold.
///
/// # Examples
/// ```
/// use wikitables_core::Table;
/// use wikitables_data::BatchRotation;
///
/// let mut rotation = BatchRotation::new(3);
/// assert_eq!(rotation.record(Table::Labels, 2), 0);
/// assert_eq!(rotation.record(Table::Labels, 1), 0);
/// assert_eq!(rotation.record(Table::Labels, 1), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BatchRotation {
    rows_per_file: u64,
    cursors: BTreeMap<Table, TableCursor>,
}

impl BatchRotation {
    /// Rotate files once they hold `rows_per_file` rows (at least one).
    #[must_use]
    pub fn new(rows_per_file: u64) -> Self {
        Self {
            rows_per_file: rows_per_file.max(1),
            cursors: BTreeMap::new(),
        }
    }

    /// Current cursor for `table`.
    #[must_use]
    pub fn cursor(&self, table: Table) -> TableCursor {
        self.cursors.get(&table).copied().unwrap_or_default()
    }

    /// Account for `rows` rows appended to `table`, returning the batch index
    /// they belong to.
    pub fn record(&mut self, table: Table, rows: u64) -> u64 {
        let cursor = self.cursors.entry(table).or_default();
        let index = cursor.batch_index;
        cursor.line_count += rows;
        if cursor.line_count >= self.rows_per_file {
            cursor.line_count = 0;
            cursor.batch_index += 1;
        }
        index
    }
}
