//! Ragged CSR connectivity (entity -> ordered list of indices).
//!
//! Unlike a sparse matrix, rows keep the order they were given in, which
//! matters for polygonal faces whose vertices must stay cyclic.

/// CSR-style ragged array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connectivity {
    /// CSR offsets into `indices` for each row.
    offsets: Vec<usize>,
    /// Concatenated rows.
    indices: Vec<usize>,
}

impl Connectivity {
    /// Empty connectivity with zero rows.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            indices: Vec::new(),
        }
    }

    /// Build from nested rows.
    pub fn from_rows<R, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = usize>,
    {
        let mut out = Self::new();
        for row in rows {
            out.push_row(row);
        }
        out
    }

    /// Append one row.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = usize>) {
        self.indices.extend(row);
        self.offsets.push(self.indices.len());
    }

    /// Return row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Largest index referenced by any row, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.num_rows()).map(move |i| self.row(i))
    }
}
