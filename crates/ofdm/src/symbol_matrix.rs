use std::ops::{Index, IndexMut};
use std::slice::{ChunksExact, ChunksExactMut};

/// A two dimensional array of (sub-channel × OFDM symbol) stored in column major order.
/// Each column holds every sub-channel of one OFDM symbol, so an OFDM symbol is a contiguous slice.
///
/// # Diagram
/// ```text
/// | SYM 0 | SYM 1 | ... | SYM N-1 |
/// | row 0 | row 0 | ... | row 0   |
/// | ...   | ...   | ... | ...     |
/// | row R | row R | ... | row R   |
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMatrix<T> {
    data: Vec<T>,
    nb_rows: usize,
    nb_cols: usize,
}

impl<T> SymbolMatrix<T> {
    /// Wraps a flat buffer whose first `nb_rows` values are column 0, the next `nb_rows` are column 1, etc.
    pub fn from_column_major(data: Vec<T>, nb_rows: usize) -> Self {
        assert!(nb_rows > 0, "Matrix must have at least one row");
        assert!(data.len() % nb_rows == 0, "Buffer of {} values cannot be split into columns of {} rows", data.len(), nb_rows);
        let nb_cols = data.len() / nb_rows;
        Self { data, nb_rows, nb_cols }
    }

    pub fn nb_rows(&self) -> usize {
        self.nb_rows
    }

    pub fn nb_cols(&self) -> usize {
        self.nb_cols
    }

    /// Returns (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.nb_rows, self.nb_cols)
    }

    pub fn column(&self, index: usize) -> &[T] {
        assert!(index < self.nb_cols, "Column {} out of range for {} columns", index, self.nb_cols);
        &self.data[chunk_slice(index, self.nb_rows)]
    }

    pub fn column_mut(&mut self, index: usize) -> &mut [T] {
        assert!(index < self.nb_cols, "Column {} out of range for {} columns", index, self.nb_cols);
        &mut self.data[chunk_slice(index, self.nb_rows)]
    }

    pub fn columns(&self) -> ChunksExact<'_, T> {
        self.data.chunks_exact(self.nb_rows)
    }

    pub fn columns_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.nb_rows)
    }

    /// Returns the matrix flattened in column major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Applies a function to every element while keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> SymbolMatrix<U> {
        SymbolMatrix {
            data: self.data.iter().map(f).collect(),
            nb_rows: self.nb_rows,
            nb_cols: self.nb_cols,
        }
    }
}

impl<T: Default + Clone> SymbolMatrix<T> {
    pub fn new(nb_rows: usize, nb_cols: usize) -> Self {
        assert!(nb_rows > 0, "Matrix must have at least one row");
        Self {
            data: vec![T::default(); nb_rows*nb_cols],
            nb_rows,
            nb_cols,
        }
    }

    /// Creates a matrix by filling in each output column from the matching input column.
    /// The callback receives the column index, the input column and the zeroed output column.
    pub fn from_columns_of<U>(
        input: &SymbolMatrix<U>,
        nb_rows: usize,
        mut fill: impl FnMut(usize, &[U], &mut [T]),
    ) -> Self
    {
        let mut output = Self::new(nb_rows, input.nb_cols());
        for (i, (x, y)) in input.columns().zip(output.columns_mut()).enumerate() {
            fill(i, x, y);
        }
        output
    }
}

impl<T> Index<(usize, usize)> for SymbolMatrix<T> {
    type Output = T;
    /// Indexes by (row, column).
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(row < self.nb_rows);
        &self.column(col)[row]
    }
}

impl<T> IndexMut<(usize, usize)> for SymbolMatrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(row < self.nb_rows);
        &mut self.column_mut(col)[row]
    }
}

#[inline(always)]
pub(crate) fn span_slice(start: usize, length: usize) -> std::ops::Range<usize> {
    start..start+length
}

#[inline(always)]
pub(crate) fn chunk_slice(index: usize, length: usize) -> std::ops::Range<usize> {
    let start_index = index*length;
    span_slice(start_index, length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_layout() {
        let matrix = SymbolMatrix::from_column_major((0..6).collect::<Vec<usize>>(), 3);
        assert_eq!(matrix.shape(), (3, 2));
        assert_eq!(matrix.column(0), &[0, 1, 2]);
        assert_eq!(matrix.column(1), &[3, 4, 5]);
        assert_eq!(matrix[(2, 0)], 2);
        assert_eq!(matrix[(0, 1)], 3);
    }

    #[test]
    fn from_columns_of_changes_row_count() {
        let input = SymbolMatrix::from_column_major(vec![1u8, 2, 3, 4], 2);
        let output = SymbolMatrix::<u32>::from_columns_of(&input, 3, |_, x, y| {
            y[0] = x[0] as u32;
            y[2] = x[1] as u32;
        });
        assert_eq!(output.shape(), (3, 2));
        assert_eq!(output.as_slice(), &[1, 0, 2, 3, 0, 4]);
    }

    #[test]
    #[should_panic]
    fn rejects_ragged_buffer() {
        SymbolMatrix::from_column_major(vec![0u8; 5], 2);
    }
}
