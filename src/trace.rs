//! The trace model: columns of field values, and the table they form.
//!
//! A [`Trace`] is the concrete, row-indexed data a [`crate::air::AirSchema`]
//! checks. Reads are always total — out-of-bounds rows return the column's
//! padding value rather than failing — which is what lets constraints with a
//! negative or positive row shift be evaluated uniformly at the first and
//! last rows.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::context::Context;
use crate::field::Field;

/// Whether a column's values are supplied by the user or synthesised by
/// [`crate::checker::expand_trace`] from a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Supplied directly in the input trace.
    Data,
    /// Filled in during expansion from an [`crate::air::Assignment`].
    Computed,
}

/// A single named column of field values.
#[derive(Clone, Debug)]
pub struct Column<F: Field> {
    name: String,
    data: Vec<F>,
    padding: F,
    kind: ColumnKind,
    context: Context,
}

impl<F: Field> Column<F> {
    /// Construct a new column. `padding` is returned for any out-of-bounds
    /// read and is prepended by [`Trace::pad`].
    pub fn new(name: impl Into<String>, data: Vec<F>, padding: F, kind: ColumnKind, context: Context) -> Self {
        Self {
            name: name.into(),
            data,
            padding,
            kind,
            context,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn padding(&self) -> F {
        self.padding
    }

    pub fn height(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[F] {
        &self.data
    }

    /// Append a computed value. Only meaningful for [`ColumnKind::Computed`]
    /// columns during expansion.
    pub fn push(&mut self, value: F) {
        self.data.push(value);
    }

    /// Read the value at `row`. Out-of-bounds reads (negative or `>= height`)
    /// return `padding` and never fail; this is the total-read invariant the
    /// rest of the crate relies on.
    pub fn get(&self, row: i64) -> F {
        if row < 0 {
            return self.padding;
        }
        let row = row as usize;
        self.data.get(row).copied().unwrap_or(self.padding)
    }

    /// Prepend `n` copies of the padding value.
    pub fn pad_front(&mut self, n: usize) {
        let mut padded = Vec::with_capacity(self.data.len() + n);
        padded.resize(n, self.padding);
        padded.extend_from_slice(&self.data);
        self.data = padded;
    }
}

/// An ordered collection of columns sharing a common height (the maximum
/// column length). Column ids are dense and assigned in insertion order,
/// which is also dependency order: a computed column's recipe may only
/// reference columns of strictly lower id (see [`crate::air::Assignment`]).
#[derive(Clone, Debug, Default)]
pub struct Trace<F: Field> {
    columns: Vec<Column<F>>,
}

impl<F: Field> Trace<F> {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }

    /// Build a trace directly from an already-ordered column list. Used by
    /// [`crate::checker::expand_trace`] to re-key a user-supplied trace
    /// (columns in arbitrary order, keyed by name) into schema column-id
    /// order before expansion.
    pub fn from_columns(columns: Vec<Column<F>>) -> Self {
        Self { columns }
    }

    /// Append a column, returning its (dense) id.
    pub fn add_column(&mut self, column: Column<F>) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    pub fn column_by_index(&self, id: usize) -> &Column<F> {
        &self.columns[id]
    }

    pub fn column_by_index_mut(&mut self, id: usize) -> &mut Column<F> {
        &mut self.columns[id]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column<F>> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_id_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[Column<F>] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The height of the trace: the maximum column length. Zero if there are
    /// no columns.
    pub fn height(&self) -> usize {
        self.columns.iter().map(Column::height).max().unwrap_or(0)
    }

    /// Read column `col`'s value at `row` (total — see [`Column::get`]).
    pub fn get(&self, col: usize, row: i64) -> F {
        self.columns[col].get(row)
    }

    /// Prepend `n` rows to every column, using each column's own padding
    /// value. Used by the checker to make room for negative row shifts
    /// before evaluating constraints at row 0.
    pub fn pad(&mut self, n: usize) {
        for column in &mut self.columns {
            column.pad_front(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fp;

    fn col(name: &str, values: &[u64]) -> Column<Fp> {
        Column::new(
            name,
            values.iter().copied().map(Fp::from_u64).collect(),
            Fp::ZERO,
            ColumnKind::Data,
            Context::new(0, 1),
        )
    }

    #[test]
    fn test_out_of_bounds_reads_return_padding() {
        let c = col("X", &[1, 2, 3]);
        assert_eq!(c.get(-1), Fp::ZERO);
        assert_eq!(c.get(3), Fp::ZERO);
        assert_eq!(c.get(100), Fp::ZERO);
        assert_eq!(c.get(0), Fp::from_u64(1));
    }

    #[test]
    fn test_pad_front() {
        let mut c = col("X", &[1, 2, 3]);
        c.pad_front(2);
        assert_eq!(c.height(), 5);
        assert_eq!(c.get(0), Fp::ZERO);
        assert_eq!(c.get(1), Fp::ZERO);
        assert_eq!(c.get(2), Fp::from_u64(1));
    }

    #[test]
    fn test_trace_add_and_lookup() {
        let mut t = Trace::new();
        let id = t.add_column(col("X", &[1, 2, 3]));
        assert_eq!(id, 0);
        assert_eq!(t.column_by_name("X").unwrap().height(), 3);
        assert_eq!(t.column_id_by_name("X"), Some(0));
        assert_eq!(t.column_id_by_name("Y"), None);
        assert_eq!(t.height(), 3);
    }

    #[test]
    fn test_trace_pad_affects_all_columns() {
        let mut t = Trace::new();
        t.add_column(col("X", &[1, 2]));
        t.add_column(col("Y", &[5, 6]));
        t.pad(3);
        assert_eq!(t.height(), 5);
        assert_eq!(t.get(0, 0), Fp::ZERO);
        assert_eq!(t.get(0, 3), Fp::from_u64(1));
        assert_eq!(t.get(1, 4), Fp::from_u64(6));
    }
}
