//! Small helpers over `nalgebra_sparse` matrices.

use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Column indices and values of row `i`, borrowed from the whole matrix.
#[inline]
pub fn csr_row<T>(m: &CsrMatrix<T>, i: usize) -> (&[usize], &[T]) {
    let offsets = m.row_offsets();
    let range = offsets[i]..offsets[i + 1];
    (&m.col_indices()[range.clone()], &m.values()[range])
}

/// Sum the triplets of `coo` into CSR form; optionally drop entries that sum to zero.
///
/// Duplicates are summed in push order, so identical push sequences give
/// bit-identical matrices.
pub fn coo_to_csr(coo: &CooMatrix<f64>, drop_zeros: bool) -> CsrMatrix<f64> {
    let csr = CsrMatrix::from(coo);
    if !drop_zeros {
        return csr;
    }
    let mut row_offsets = Vec::with_capacity(csr.nrows() + 1);
    let mut col_indices = Vec::with_capacity(csr.nnz());
    let mut values = Vec::with_capacity(csr.nnz());
    row_offsets.push(0);
    for i in 0..csr.nrows() {
        let (cols, vals) = csr_row(&csr, i);
        for (&j, &v) in cols.iter().zip(vals) {
            if v != 0.0 {
                col_indices.push(j);
                values.push(v);
            }
        }
        row_offsets.push(col_indices.len());
    }
    // pattern is a sorted subset of a valid CSR pattern
    CsrMatrix::try_from_csr_data(csr.nrows(), csr.ncols(), row_offsets, col_indices, values)
        .unwrap_or(csr)
}

/// Dense value at `(i, j)`; zero when the entry is not stored.
pub fn csr_value(m: &CsrMatrix<f64>, i: usize, j: usize) -> f64 {
    let (cols, vals) = csr_row(m, i);
    match cols.binary_search(&j) {
        Ok(pos) => vals[pos],
        Err(_) => 0.0,
    }
}
