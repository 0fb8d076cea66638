//! Rating sheet: one expert's ratings as an (item x criterion) table
//!
//! Submissions arrive as a rectangular table and are stored as a flat vector
//! indexed by `(item_index, criterion_index)`. Keeping the table explicit
//! makes the "all cells answered" completeness check a size comparison
//! instead of key enumeration, and removes string-key typos as a failure
//! mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Face-validity ratings are binary: 0 = No, 1 = Yes
pub const FACE_VALIDITY_MAX: u8 = 1;

/// Delphi ratings are ordinal 1..=9; 0 marks an unanswered cell
pub const DELPHI_MAX: u8 = 9;

/// Errors constructing or validating a rating sheet
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    /// Wrong number of item rows in the submission
    #[error("Expected {expected} item rows, found {found}")]
    ItemCountMismatch { expected: usize, found: usize },

    /// Wrong number of criterion cells in one item row
    #[error("Item {item}: expected {expected} criterion cells, found {found}")]
    CellCountMismatch {
        item: usize,
        expected: usize,
        found: usize,
    },

    /// A cell value outside the legal range for the project kind
    #[error("Item {item}, criterion {criterion}: value {value} out of range (max {max})")]
    ValueOutOfRange {
        item: usize,
        criterion: usize,
        value: u8,
        max: u8,
    },
}

/// A complete (item x criterion) rating table for one expert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSheet {
    items: usize,
    criteria: usize,
    cells: Vec<u8>,
}

impl RatingSheet {
    /// Create an all-zero sheet with the given dimensions
    pub fn new(items: usize, criteria: usize) -> Self {
        Self {
            items,
            criteria,
            cells: vec![0; items * criteria],
        }
    }

    /// Build a sheet from submitted rows, enforcing completeness and the
    /// per-kind value range. `max_value` is [`FACE_VALIDITY_MAX`] or
    /// [`DELPHI_MAX`].
    pub fn from_rows(
        rows: &[Vec<u8>],
        items: usize,
        criteria: usize,
        max_value: u8,
    ) -> Result<Self, SheetError> {
        if rows.len() != items {
            return Err(SheetError::ItemCountMismatch {
                expected: items,
                found: rows.len(),
            });
        }

        let mut sheet = Self::new(items, criteria);
        for (item, row) in rows.iter().enumerate() {
            if row.len() != criteria {
                return Err(SheetError::CellCountMismatch {
                    item,
                    expected: criteria,
                    found: row.len(),
                });
            }
            for (criterion, &value) in row.iter().enumerate() {
                if value > max_value {
                    return Err(SheetError::ValueOutOfRange {
                        item,
                        criterion,
                        value,
                        max: max_value,
                    });
                }
                sheet.set(item, criterion, value);
            }
        }

        Ok(sheet)
    }

    /// Number of item rows
    pub fn items(&self) -> usize {
        self.items
    }

    /// Number of criterion columns
    pub fn criteria(&self) -> usize {
        self.criteria
    }

    /// Read one cell
    ///
    /// Panics when the index is outside the table; callers index with
    /// `0..items()` / `0..criteria()` loops.
    pub fn get(&self, item: usize, criterion: usize) -> u8 {
        debug_assert!(item < self.items && criterion < self.criteria);
        self.cells[item * self.criteria + criterion]
    }

    /// Write one cell
    pub fn set(&mut self, item: usize, criterion: usize, value: u8) {
        debug_assert!(item < self.items && criterion < self.criteria);
        self.cells[item * self.criteria + criterion] = value;
    }

    /// One item's cells across all criteria
    pub fn row(&self, item: usize) -> &[u8] {
        let start = item * self.criteria;
        &self.cells[start..start + self.criteria]
    }

    /// The table as rows, for JSON output
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.items).map(|i| self.row(i).to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_accepts_complete_table() {
        let rows = vec![vec![1, 0, 1], vec![0, 0, 1]];
        let sheet = RatingSheet::from_rows(&rows, 2, 3, FACE_VALIDITY_MAX).unwrap();
        assert_eq!(sheet.get(0, 0), 1);
        assert_eq!(sheet.get(1, 2), 1);
        assert_eq!(sheet.row(1), &[0, 0, 1]);
        assert_eq!(sheet.to_rows(), rows);
    }

    #[test]
    fn missing_item_row_rejected() {
        let rows = vec![vec![1, 0, 1]];
        let err = RatingSheet::from_rows(&rows, 2, 3, FACE_VALIDITY_MAX).unwrap_err();
        assert_eq!(
            err,
            SheetError::ItemCountMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn short_row_rejected() {
        let rows = vec![vec![1, 0, 1], vec![0, 0]];
        let err = RatingSheet::from_rows(&rows, 2, 3, FACE_VALIDITY_MAX).unwrap_err();
        assert_eq!(
            err,
            SheetError::CellCountMismatch {
                item: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn binary_sheet_rejects_ordinal_value() {
        let rows = vec![vec![1, 2]];
        let err = RatingSheet::from_rows(&rows, 1, 2, FACE_VALIDITY_MAX).unwrap_err();
        assert!(matches!(err, SheetError::ValueOutOfRange { value: 2, .. }));
    }

    #[test]
    fn delphi_sheet_allows_zero_and_nine() {
        let rows = vec![vec![0, 9, 5]];
        let sheet = RatingSheet::from_rows(&rows, 1, 3, DELPHI_MAX).unwrap();
        assert_eq!(sheet.get(0, 0), 0);
        assert_eq!(sheet.get(0, 1), 9);
    }

    #[test]
    fn delphi_sheet_rejects_ten() {
        let rows = vec![vec![10]];
        let err = RatingSheet::from_rows(&rows, 1, 1, DELPHI_MAX).unwrap_err();
        assert!(matches!(err, SheetError::ValueOutOfRange { value: 10, .. }));
    }
}
