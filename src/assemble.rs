//! Assembly of the Galerkin matrix and vector from per-cell contributions.
//!
//! Element contributions are computed independently per cell, optionally on
//! the rayon thread pool, and merged in cell order. The result therefore does
//! not depend on the thread schedule.

use crate::{
  config::AssemblyConfig,
  fe::{self, BasisTable, BilinearForm, CellGeometry, LinearForm},
  mesh::CellIdx,
  space::FeSpace,
  sparse::SparseMatrix,
  FemResult,
};

use rayon::prelude::*;

pub type GalVec = na::DVector<f64>;

/// Galerkin matrix and right-hand side of a discrete variational problem.
#[derive(Debug, Clone)]
pub struct LinearSystem {
  pub galmat: SparseMatrix,
  pub galvec: GalVec,
}
impl LinearSystem {
  pub fn ndofs(&self) -> usize {
    self.galvec.len()
  }
}

/// Basis tabulation for the quadrature strength the config asks for,
/// defaulting to twice the polynomial degree of the space.
pub fn basis_table(space: &FeSpace, config: &AssemblyConfig) -> FemResult<BasisTable> {
  let strength = config
    .quadrature_strength
    .unwrap_or(2 * space.degree().order());
  BasisTable::with_strength(space.degree(), strength)
}

/// Runs `f` on every cell, in parallel if requested, keeping cell order.
fn map_cells<T, F>(ncells: usize, parallel: bool, f: F) -> FemResult<Vec<T>>
where
  T: Send,
  F: Fn(CellIdx) -> FemResult<T> + Sync + Send,
{
  if parallel {
    (0..ncells).into_par_iter().map(f).collect()
  } else {
    (0..ncells).map(f).collect()
  }
}

/// Assembly algorithm for the Galerkin Matrix.
pub fn assemble_galmat(
  space: &FeSpace,
  form: &impl BilinearForm,
  config: &AssemblyConfig,
) -> FemResult<SparseMatrix> {
  let mesh = space.mesh();
  let table = basis_table(space, config)?;

  let cell_triplets = map_cells(mesh.ncells(), config.parallel, |icell| {
    let geo = CellGeometry::new(mesh, icell, config.geometry_tolerance)?;
    let elmat = fe::elmat(&geo, &table, form);
    let dofs = space.local2global(icell);

    let mut local_triplets = Vec::with_capacity(dofs.len() * dofs.len());
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      for (jlocal, &jglobal) in dofs.iter().enumerate() {
        let val = elmat[(ilocal, jlocal)];
        if val != 0.0 {
          local_triplets.push((iglobal, jglobal, val));
        }
      }
    }
    Ok(local_triplets)
  })?;

  let triplets = cell_triplets.into_iter().flatten().collect();
  Ok(SparseMatrix::new(space.ndofs(), space.ndofs(), triplets))
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(
  space: &FeSpace,
  form: &impl LinearForm,
  config: &AssemblyConfig,
) -> FemResult<GalVec> {
  let mesh = space.mesh();
  let table = basis_table(space, config)?;

  let cell_elvecs = map_cells(mesh.ncells(), config.parallel, |icell| {
    let geo = CellGeometry::new(mesh, icell, config.geometry_tolerance)?;
    Ok(fe::elvec(&geo, &table, form))
  })?;

  let mut galvec = GalVec::zeros(space.ndofs());
  for (icell, elvec) in cell_elvecs.iter().enumerate() {
    for (ilocal, &iglobal) in space.local2global(icell).iter().enumerate() {
      galvec[iglobal] += elvec[ilocal];
    }
  }
  Ok(galvec)
}

/// Assembles matrix and vector of a variational problem on the same space.
pub fn assemble_system(
  space: &FeSpace,
  bilinear: &impl BilinearForm,
  linear: &impl LinearForm,
  config: &AssemblyConfig,
) -> FemResult<LinearSystem> {
  let galmat = assemble_galmat(space, bilinear, config)?;
  let galvec = assemble_galvec(space, linear, config)?;
  tracing::debug!(
    ndofs = space.ndofs(),
    nnz = galmat.nnz(),
    parallel = config.parallel,
    "assembled galerkin system"
  );
  Ok(LinearSystem { galmat, galvec })
}
