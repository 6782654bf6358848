// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanTableError {
    #[error("no table header row found in the plan section")]
    MissingHeader,
    #[error("table separator row is missing or not made of dashes: {0:?}")]
    InvalidSeparator(String),
    #[error("plan table has no usable data rows")]
    NoRows,
}

/// Recoverable problems found while reading data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanWarning {
    /// Row had fewer cells than the header; trailing cells were left blank.
    Padded { row: usize, found: usize, expected: usize },
    /// Row had more cells than the header; extra cells were dropped.
    Truncated { row: usize, found: usize, expected: usize },
    /// Bare `|` line with no cells at all; skipped.
    EmptyRow { line: usize },
    /// No day column, so day labels could not be merged.
    MissingDayColumn { column: String },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::Padded {
                row,
                found,
                expected,
            } => write!(
                f,
                "row {} has {} of {} cells; padded with blanks",
                row + 1,
                found,
                expected
            ),
            PlanWarning::Truncated {
                row,
                found,
                expected,
            } => write!(
                f,
                "row {} has {} cells but the header has {}; extra cells dropped",
                row + 1,
                found,
                expected
            ),
            PlanWarning::EmptyRow { line } => {
                write!(f, "empty table row at line {} skipped", line + 1)
            }
            PlanWarning::MissingDayColumn { column } => {
                write!(f, "no '{}' column; rows are not grouped by day", column)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    cells: Vec<String>,
}

impl PlanRow {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTable {
    pub columns: Vec<String>,
    pub rows: Vec<PlanRow>,
}

impl PlanTable {
    /// Extracts the first pipe table from `plan_text`.
    ///
    /// Prose before the header is skipped. Rows are repaired where possible and
    /// the repairs are returned as warnings. When `day_column` names a header
    /// column, repeated consecutive day labels are blanked.
    pub fn parse(
        plan_text: &str,
        day_column: &str,
    ) -> Result<(PlanTable, Vec<PlanWarning>), PlanTableError> {
        let lines: Vec<&str> = plan_text.lines().collect();

        let header_idx = lines
            .iter()
            .position(|l| is_table_row(l))
            .ok_or(PlanTableError::MissingHeader)?;
        let header_line = lines[header_idx];
        let columns: Vec<String> = header_line
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if header_line.matches('|').count() < 2 || columns.is_empty() {
            return Err(PlanTableError::MissingHeader);
        }

        let separator = lines.get(header_idx + 1).copied().unwrap_or_default();
        if !is_separator(separator) {
            return Err(PlanTableError::InvalidSeparator(separator.trim().to_string()));
        }

        let expected = columns.len();
        let mut warnings = Vec::new();
        let mut rows = Vec::new();

        for (offset, line) in lines[header_idx + 2..].iter().enumerate() {
            if !is_table_row(line) {
                continue;
            }
            let mut cells = split_row(line);
            if cells.is_empty() {
                warnings.push(PlanWarning::EmptyRow {
                    line: header_idx + 2 + offset,
                });
                continue;
            }

            let row = rows.len();
            let found = cells.len();
            if found < expected {
                cells.resize(expected, String::new());
                warnings.push(PlanWarning::Padded {
                    row,
                    found,
                    expected,
                });
            } else if found > expected {
                cells.truncate(expected);
                warnings.push(PlanWarning::Truncated {
                    row,
                    found,
                    expected,
                });
            }
            rows.push(PlanRow { cells });
        }

        if rows.is_empty() {
            return Err(PlanTableError::NoRows);
        }

        let mut table = PlanTable { columns, rows };
        if !table.merge_day_labels(day_column) {
            warnings.push(PlanWarning::MissingDayColumn {
                column: day_column.to_string(),
            });
        }

        for warning in &warnings {
            log::warn!("Plan table issue — {}", warning);
        }

        Ok((table, warnings))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(idx))
            .map(String::as_str)
    }

    /// Rows as column-name → value maps, in row order.
    pub fn records(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(r.cells.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Blanks a day label equal to the previous row's label as it stands after
    /// blanking. Returns false when there is no such column.
    fn merge_day_labels(&mut self, day_column: &str) -> bool {
        let Some(idx) = self.column_index(day_column) else {
            return false;
        };

        let mut previous = String::new();
        for row in &mut self.rows {
            let cell = &mut row.cells[idx];
            if !cell.is_empty() && *cell == previous {
                cell.clear();
            }
            previous.clone_from(cell);
        }
        true
    }
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn is_separator(line: &str) -> bool {
    line.matches('|').count() >= 2
        && line
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .all(|s| s.chars().all(|c| c == '-'))
}

fn split_row(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line
        .trim()
        .split('|')
        .map(|c| c.trim().to_string())
        .collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}
