//! Sparse direct solvers for the eliminated Galerkin system.

use crate::{
  assemble::LinearSystem,
  config::{SolverConfig, SolverKind},
  sparse::{nalgebra2faer, SparseMatrix},
  FemError, FemResult,
};

use faer::solvers::SpSolver;

/// Solves the linear system of equations $A x = b$.
pub fn solve_lse(
  galmat: &SparseMatrix,
  galvec: &na::DVector<f64>,
  config: &SolverConfig,
) -> FemResult<na::DVector<f64>> {
  if galmat.nrows() != galmat.ncols() || galmat.nrows() != galvec.len() {
    return Err(FemError::SingularSystem(format!(
      "system of shape {}x{} with right-hand side of length {}",
      galmat.nrows(),
      galmat.ncols(),
      galvec.len()
    )));
  }
  let _span = tracing::debug_span!("solve_lse", ndofs = galvec.len(), kind = ?config.kind).entered();

  let csc = galmat.to_nalgebra_csc();
  match config.kind {
    SolverKind::Cholesky => {
      NalgebraCholesky::new(csc, config.pivot_tolerance).map(|chol| chol.solve(galvec))
    }
    SolverKind::Lu => FaerLu::new(csc)?.solve(galmat, galvec),
  }
}

impl LinearSystem {
  pub fn solve(&self, config: &SolverConfig) -> FemResult<na::DVector<f64>> {
    solve_lse(&self.galmat, &self.galvec, config)
  }
}

/// Sparse Cholesky factorization with inspection of the pivots.
pub struct NalgebraCholesky {
  raw: nas::factorization::CscCholesky<f64>,
}
impl NalgebraCholesky {
  /// Fails if some pivot $L_(j j)^2$ is not above `pivot_tolerance * max_i |A_(i i)|`.
  pub fn new(a: nas::CscMatrix<f64>, pivot_tolerance: f64) -> FemResult<Self> {
    let mut diagonal = vec![0.0; a.nrows()];
    for (i, _, &v) in a.diagonal_as_csc().triplet_iter() {
      diagonal[i] += v;
    }
    // a SPD matrix has a positive diagonal
    if let Some(i) = diagonal.iter().position(|&d| !(d > 0.0)) {
      return Err(FemError::SingularSystem(format!(
        "non-positive diagonal entry {} in row {i}",
        diagonal[i]
      )));
    }
    let max_diag = diagonal.iter().copied().fold(0.0, f64::max);

    let raw = nas::factorization::CscCholesky::factor(&a)
      .map_err(|err| FemError::SingularSystem(format!("cholesky factorization failed: {err}")))?;

    let threshold = pivot_tolerance * max_diag;
    let min_pivot = raw
      .l()
      .triplet_iter()
      .filter(|(r, c, _)| r == c)
      .map(|(_, _, &l)| l * l)
      .fold(f64::INFINITY, f64::min);
    if !(min_pivot > threshold) {
      return Err(FemError::SingularSystem(format!(
        "cholesky pivot {min_pivot:e} below threshold {threshold:e}"
      )));
    }
    tracing::trace!(min_pivot, max_diag, "cholesky pivots checked");

    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> na::DVector<f64> {
    let b = na::DMatrix::from_column_slice(b.len(), 1, b.as_slice());
    let x = self.raw.solve(&b);
    x.column(0).into_owned()
  }
}

/// Sparse LU factorization.
pub struct FaerLu {
  raw: faer::sparse::linalg::solvers::Lu<usize, f64>,
}
impl FaerLu {
  pub fn new(a: nas::CscMatrix<f64>) -> FemResult<Self> {
    let raw = nalgebra2faer(a)
      .sp_lu()
      .map_err(|err| FemError::SingularSystem(format!("lu factorization failed: {err:?}")))?;
    Ok(Self { raw })
  }

  /// Rejects solutions that are not finite or do not satisfy the system.
  pub fn solve(&self, a: &SparseMatrix, b: &na::DVector<f64>) -> FemResult<na::DVector<f64>> {
    let rhs = faer::col::from_slice(b.as_slice());
    let x = na::DVector::from_vec(self.raw.solve(rhs).as_slice().to_vec());
    if !x.iter().all(|v| v.is_finite()) {
      return Err(FemError::SingularSystem(
        "lu solve produced non-finite values".into(),
      ));
    }
    let residual = (a.mul_vec(&x) - b).norm();
    if residual > LU_RESIDUAL_TOL * b.norm().max(1.0) {
      return Err(FemError::SingularSystem(format!(
        "lu solve has residual {residual:e}"
      )));
    }
    Ok(x)
  }
}
const LU_RESIDUAL_TOL: f64 = 1e-8;

pub fn assert_mat_eq(a: &na::DMatrix<f64>, b: &na::DMatrix<f64>) {
  const TOL: f64 = 10e-12;
  let diff = a - b;
  let error = diff.norm();
  let equal = error <= TOL;
  if !equal {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}
