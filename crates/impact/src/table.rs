//! Labelled column table of aggregated impacts.

use std::collections::BTreeSet;

use crate::error::ImpactError;

/// Rows keyed by an admin unit (or point) label, with named numeric columns
/// kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactTable {
    labels: Vec<String>,
    columns: Vec<(String, Vec<f64>)>,
}

impl ImpactTable {
    /// Creates a table with the given row labels and no columns.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::DuplicateRow`] if a label repeats.
    pub fn new(labels: Vec<String>) -> Result<Self, ImpactError> {
        let mut seen = BTreeSet::new();
        for l in &labels {
            if !seen.insert(l.as_str()) {
                return Err(ImpactError::DuplicateRow { label: l.clone() });
            }
        }
        Ok(Self {
            labels,
            columns: Vec::new(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Adds a column, replacing any existing column of the same name in place.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::ShapeMismatch`] if `values` does not have one
    /// entry per row.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), ImpactError> {
        let name = name.into();
        if values.len() != self.labels.len() {
            return Err(ImpactError::ShapeMismatch {
                what: format!("column '{name}' length"),
                expected: self.labels.len(),
                got: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    /// Values of column `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::MissingColumn`] if absent.
    pub fn column(&self, name: &str) -> Result<&[f64], ImpactError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| ImpactError::MissingColumn {
                name: name.to_string(),
            })
    }

    /// Value at row `label`, column `name`, if both exist.
    pub fn get(&self, label: &str, name: &str) -> Option<f64> {
        let r = self.labels.iter().position(|l| l == label)?;
        self.column(name).ok().map(|c| c[r])
    }

    /// Values of one row in column order.
    pub fn row(&self, label: &str) -> Option<Vec<f64>> {
        let r = self.labels.iter().position(|l| l == label)?;
        Some(self.columns.iter().map(|(_, v)| v[r]).collect())
    }

    /// Appends a row with one value per existing column, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::DuplicateRow`] for a repeated label or
    /// [`ImpactError::ShapeMismatch`] for a wrong number of values.
    pub fn push_row(&mut self, label: impl Into<String>, values: Vec<f64>) -> Result<(), ImpactError> {
        let label = label.into();
        if self.labels.contains(&label) {
            return Err(ImpactError::DuplicateRow { label });
        }
        if values.len() != self.columns.len() {
            return Err(ImpactError::ShapeMismatch {
                what: format!("row '{label}' length"),
                expected: self.columns.len(),
                got: values.len(),
            });
        }
        self.labels.push(label);
        for ((_, col), v) in self.columns.iter_mut().zip(values) {
            col.push(v);
        }
        Ok(())
    }

    /// Stacks tables sharing the same columns. Labels must stay unique.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::MissingColumn`] when a table lacks a column
    /// of the first one, or [`ImpactError::DuplicateRow`].
    pub fn concat(tables: &[ImpactTable]) -> Result<ImpactTable, ImpactError> {
        let Some(first) = tables.first() else {
            return Ok(ImpactTable::default());
        };
        let names: Vec<&str> = first.column_names().collect();
        let mut out = ImpactTable::new(Vec::new())?;
        for n in &names {
            out.add_column(*n, Vec::new())?;
        }
        for t in tables {
            let cols: Vec<&[f64]> = names
                .iter()
                .map(|n| t.column(n))
                .collect::<Result<_, _>>()?;
            for (r, label) in t.labels.iter().enumerate() {
                out.push_row(label.clone(), cols.iter().map(|c| c[r]).collect())?;
            }
        }
        Ok(out)
    }

    /// Places the columns of tables with identical row labels side by side,
    /// in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::ShapeMismatch`] if the row labels differ from
    /// the first table's, or [`ImpactError::DuplicateColumn`] if a column
    /// name appears in more than one table.
    pub fn join_columns(tables: &[ImpactTable]) -> Result<ImpactTable, ImpactError> {
        let Some(first) = tables.first() else {
            return Ok(ImpactTable::default());
        };
        let mut out = ImpactTable::new(first.labels.clone())?;
        for t in tables {
            if t.labels != first.labels {
                return Err(ImpactError::ShapeMismatch {
                    what: "joined table rows".to_string(),
                    expected: first.n_rows(),
                    got: t.n_rows(),
                });
            }
            for (name, values) in &t.columns {
                if out.has_column(name) {
                    return Err(ImpactError::DuplicateColumn { name: name.clone() });
                }
                out.columns.push((name.clone(), values.clone()));
            }
        }
        Ok(out)
    }
}
