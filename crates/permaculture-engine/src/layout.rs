//! Conversion between 2-D grids and row-major flat sequences.
//!
//! Candidates and environmental maps are stored flat: cell `(row, column)` lives at
//! index `row * width + column`. The helpers here convert at the I/O boundary and
//! look up the orthogonal neighbors of a flat index.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Dimensions of a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of cells in the grid.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of the cell at `(row, column)`.
    #[must_use]
    pub const fn index(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LayoutError {
    #[display("cannot refold {len} cells into {rows}x{columns} grid")]
    SizeMismatch {
        len: usize,
        rows: usize,
        columns: usize,
    },
}

/// Concatenates the rows of a grid into a single row-major sequence.
///
/// # Examples
///
/// ```
/// use permaculture_engine::layout;
///
/// let grid = vec![vec!['a', 'b'], vec!['c', 'd']];
/// assert_eq!(layout::flatten(&grid), vec!['a', 'b', 'c', 'd']);
/// ```
pub fn flatten<T>(grid: &[Vec<T>]) -> Vec<T>
where
    T: Clone,
{
    grid.iter().flatten().cloned().collect()
}

/// Splits a row-major sequence into `rows` rows of `columns` cells.
///
/// Inverse of [`flatten`]. Fails if the sequence does not have exactly
/// `rows * columns` elements.
///
/// # Examples
///
/// ```
/// use permaculture_engine::layout;
///
/// let grid = layout::refold(&[1, 2, 3, 4, 5, 6], 2, 3).unwrap();
/// assert_eq!(grid, vec![vec![1, 2, 3], vec![4, 5, 6]]);
/// assert!(layout::refold(&[1, 2, 3], 2, 2).is_err());
/// ```
pub fn refold<T>(series: &[T], rows: usize, columns: usize) -> Result<Vec<Vec<T>>, LayoutError>
where
    T: Clone,
{
    if series.len() != rows * columns {
        return Err(LayoutError::SizeMismatch {
            len: series.len(),
            rows,
            columns,
        });
    }
    if columns == 0 {
        return Ok(vec![vec![]; rows]);
    }
    Ok(series.chunks(columns).map(<[T]>::to_vec).collect())
}

/// Returns the flat indices of the orthogonal neighbors of `index`.
///
/// Neighbors are listed in the order up, right, down, left. There is no
/// wraparound: cells on an edge have fewer neighbors, and a cell in the last
/// (possibly partial) row has no neighbor below it.
///
/// `width` must be non-zero.
///
/// # Examples
///
/// ```
/// use permaculture_engine::layout::neighbor_indices;
///
/// // 3x3 grid, center cell
/// assert_eq!(neighbor_indices(4, 3, 9).as_slice(), &[1, 5, 7, 3]);
/// // top-left corner
/// assert_eq!(neighbor_indices(0, 3, 9).as_slice(), &[1, 3]);
/// ```
#[must_use]
pub fn neighbor_indices(index: usize, width: usize, len: usize) -> ArrayVec<usize, 4> {
    debug_assert!(width > 0, "grid width must be non-zero");
    let mut neighbors = ArrayVec::new();
    // up
    if index >= width {
        neighbors.push(index - width);
    }
    // right
    if (index + 1) % width != 0 && index + 1 < len {
        neighbors.push(index + 1);
    }
    // down
    if index + width < len {
        neighbors.push(index + width);
    }
    // left
    if index % width != 0 {
        neighbors.push(index - 1);
    }
    neighbors
}
