/// Sparse matrix in triplet (coordinate) format.
///
/// Duplicate entries are allowed and are summed on conversion.
#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    assert!(triplets.iter().all(|&(r, c, _)| r < nrows && c < ncols));
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn nnz(&self) -> usize {
    self.triplets.len()
  }
  pub fn triplets(&self) -> &[(usize, usize, f64)] {
    &self.triplets
  }

  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows() && c < self.ncols());
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  /// Appends all triplets of `other`.
  pub fn extend(&mut self, other: SparseMatrix) {
    assert!(self.nrows == other.nrows && self.ncols == other.ncols);
    self.triplets.extend(other.triplets);
  }

  /// Removes all entries whose position satisfies `predicate`.
  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    self.triplets.retain(|&(r, c, _)| !predicate(r, c));
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<f64> {
    let mut coo = nas::CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  pub fn to_nalgebra_csr(&self) -> nas::CsrMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_csc(&self) -> nas::CscMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> na::DMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  /// Matrix-vector product without conversion.
  pub fn mul_vec(&self, x: &na::DVector<f64>) -> na::DVector<f64> {
    assert_eq!(x.len(), self.ncols);
    let mut y = na::DVector::zeros(self.nrows);
    for &(r, c, v) in &self.triplets {
      y[r] += v * x[c];
    }
    y
  }

  /// Sum of all entries in each row.
  pub fn row_sums(&self) -> na::DVector<f64> {
    let mut sums = na::DVector::zeros(self.nrows);
    for &(r, _, v) in &self.triplets {
      sums[r] += v;
    }
    sums
  }
}

pub type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

#[cfg(test)]
mod test {
  use super::SparseMatrix;

  #[test]
  fn duplicates_are_summed() {
    let mut mat = SparseMatrix::zeros(2, 3);
    mat.push(0, 0, 1.0);
    mat.push(0, 0, 2.0);
    mat.push(1, 2, -1.0);
    mat.push(1, 1, 0.0);
    assert_eq!(mat.nnz(), 3);

    #[rustfmt::skip]
    let expected = na::dmatrix![
      3.0, 0.0,  0.0;
      0.0, 0.0, -1.0;
    ];
    assert_eq!(mat.to_nalgebra_dense(), expected);
    let csr: na::DMatrix<f64> = (&mat.to_nalgebra_csr()).into();
    assert_eq!(csr, expected);
    let csc: na::DMatrix<f64> = (&mat.to_nalgebra_csc()).into();
    assert_eq!(csc, expected);
  }

  #[test]
  fn set_zero_and_products() {
    let mut mat = SparseMatrix::zeros(3, 3);
    for i in 0..3 {
      for j in 0..3 {
        mat.push(i, j, (i * 3 + j + 1) as f64);
      }
    }
    let x = na::DVector::from_element(3, 1.0);
    assert_eq!(mat.mul_vec(&x), mat.row_sums());
    assert_eq!(mat.mul_vec(&x), &mat.to_nalgebra_dense() * &x);

    mat.set_zero(|r, c| r == 1 || c == 1);
    assert_eq!(mat.nnz(), 4);
    let dense = mat.to_nalgebra_dense();
    assert_eq!(dense.row(1).sum(), 0.0);
    assert_eq!(dense.column(1).sum(), 0.0);
    assert_eq!(dense[(2, 2)], 9.0);
  }

  #[test]
  #[should_panic]
  fn push_out_of_bounds() {
    let mut mat = SparseMatrix::zeros(2, 2);
    mat.push(2, 0, 1.0);
  }
}
