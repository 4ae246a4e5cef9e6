//! Essential (Dirichlet) boundary conditions and their enforcement by
//! symmetric elimination.

use crate::{
  assemble::LinearSystem,
  function::FeFunction,
  space::{DofIdx, FeSpace},
  Coord, FemError, FemResult,
};

use itertools::Itertools;

/// Prescribed coefficients on a set of DOFs, sorted by DOF index.
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletBc {
  ndofs: usize,
  dof_coeffs: Vec<(DofIdx, f64)>,
}

impl DirichletBc {
  /// Collects `(dof, value)` pairs.
  ///
  /// Repeated DOFs must carry the same value and all values must be finite.
  pub fn new(ndofs: usize, dof_coeffs: impl IntoIterator<Item = (DofIdx, f64)>) -> FemResult<Self> {
    let mut bc = Self {
      ndofs,
      dof_coeffs: Vec::new(),
    };
    bc.insert_all(dof_coeffs)?;
    tracing::debug!(nconstrained = bc.len(), "collected dirichlet dofs");
    Ok(bc)
  }

  /// No constraints at all.
  pub fn empty(space: &FeSpace) -> Self {
    Self {
      ndofs: space.ndofs(),
      dof_coeffs: Vec::new(),
    }
  }

  /// Constant value on all DOFs of the boundary facets selected by `predicate`.
  pub fn from_boundary<P>(space: &FeSpace, predicate: P, value: f64) -> FemResult<Self>
  where
    P: Fn(Coord) -> bool,
  {
    Self::from_boundary_fn(space, predicate, |_| value)
  }

  /// Interpolates `boundary_data` on all DOFs of the boundary facets selected
  /// by `predicate`.
  pub fn from_boundary_fn<P, F>(space: &FeSpace, predicate: P, boundary_data: F) -> FemResult<Self>
  where
    P: Fn(Coord) -> bool,
    F: Fn(Coord) -> f64,
  {
    let dof_coeffs = locate_boundary_dofs(space, predicate)
      .into_iter()
      .map(|idof| (idof, boundary_data(space.dof_coord(idof))));
    Self::new(space.ndofs(), dof_coeffs)
  }

  /// Takes the coefficients of `boundary_data` on all DOFs of the boundary
  /// facets selected by `predicate`.
  pub fn from_function<P>(boundary_data: &FeFunction, predicate: P) -> FemResult<Self>
  where
    P: Fn(Coord) -> bool,
  {
    let space = boundary_data.space();
    let coeffs = boundary_data.coeffs();
    let dof_coeffs = locate_boundary_dofs(space, predicate)
      .into_iter()
      .map(|idof| (idof, coeffs[idof]));
    Self::new(space.ndofs(), dof_coeffs)
  }

  fn insert_all(&mut self, dof_coeffs: impl IntoIterator<Item = (DofIdx, f64)>) -> FemResult<()> {
    let ndofs = self.ndofs;
    let mut all = std::mem::take(&mut self.dof_coeffs);
    for (idof, value) in dof_coeffs {
      if idof >= ndofs {
        return Err(FemError::DofOutOfRange { idof, ndofs });
      }
      if !value.is_finite() {
        return Err(FemError::NonFiniteConstraint { idof, value });
      }
      all.push((idof, value));
    }
    all.sort_by_key(|&(idof, _)| idof);

    let mut merged: Vec<(DofIdx, f64)> = Vec::with_capacity(all.len());
    for (idof, value) in all {
      match merged.last() {
        Some(&(prev, first)) if prev == idof => {
          if first != value {
            return Err(FemError::ConflictingConstraint {
              idof,
              first,
              second: value,
            });
          }
        }
        _ => merged.push((idof, value)),
      }
    }
    self.dof_coeffs = merged;
    Ok(())
  }

  /// Union of two conditions on the same space.
  pub fn merge(mut self, other: DirichletBc) -> FemResult<Self> {
    self.check_ndofs(other.ndofs)?;
    self.insert_all(other.dof_coeffs)?;
    Ok(self)
  }

  /// Fails unless the condition was built for `ndofs` DOFs.
  pub fn check_ndofs(&self, ndofs: usize) -> FemResult<()> {
    if self.ndofs != ndofs {
      return Err(FemError::SpaceMismatch {
        expected: ndofs,
        found: self.ndofs,
      });
    }
    Ok(())
  }

  pub fn ndofs(&self) -> usize {
    self.ndofs
  }
  pub fn dof_coeffs(&self) -> &[(DofIdx, f64)] {
    &self.dof_coeffs
  }
  pub fn dofs(&self) -> impl Iterator<Item = DofIdx> + '_ {
    self.dof_coeffs.iter().map(|&(idof, _)| idof)
  }
  pub fn len(&self) -> usize {
    self.dof_coeffs.len()
  }
  pub fn is_empty(&self) -> bool {
    self.dof_coeffs.is_empty()
  }

  /// Lookup table over all DOFs.
  pub fn to_dense(&self) -> Vec<Option<f64>> {
    let mut dense = vec![None; self.ndofs];
    for &(idof, value) in &self.dof_coeffs {
      dense[idof] = Some(value);
    }
    dense
  }

  /// Fix DOFs of FE solution.
  ///
  /// Modifies the system such that its solution has the prescribed
  /// coefficients while staying symmetric:
  /// $mat(A_0, 0; 0, I) vec(mu_0, mu_diff) = vec(phi - A_(0 diff) gamma, gamma)$
  ///
  /// Applying the same condition twice leaves the system unchanged.
  pub fn apply(&self, system: &mut LinearSystem) -> FemResult<()> {
    let LinearSystem { galmat, galvec } = system;
    self.check_ndofs(galmat.nrows())?;
    self.check_ndofs(galmat.ncols())?;
    self.check_ndofs(galvec.len())?;
    if self.is_empty() {
      return Ok(());
    }

    let dof_coeffs_opt = self.to_dense();
    let dof_coeffs_zeroed =
      na::DVector::from_iterator(self.ndofs, dof_coeffs_opt.iter().map(|v| v.unwrap_or(0.0)));

    // Move the known part to the right-hand side.
    *galvec -= galmat.mul_vec(&dof_coeffs_zeroed);

    // Set galvec to prescribed coefficents.
    for &(idof, value) in &self.dof_coeffs {
      galvec[idof] = value;
    }

    // Set entires zero that share a (row or column) index with a fixed dof.
    galmat.set_zero(|r, c| dof_coeffs_opt[r].is_some() || dof_coeffs_opt[c].is_some());

    // Set galmat diagonal for dofs to one.
    for &(idof, _) in &self.dof_coeffs {
      galmat.push(idof, idof, 1.0);
    }
    Ok(())
  }
}

/// DOFs in the closure of the boundary facets selected by `predicate`, sorted.
pub fn locate_boundary_dofs<P>(space: &FeSpace, predicate: P) -> Vec<DofIdx>
where
  P: Fn(Coord) -> bool,
{
  space
    .mesh()
    .locate_boundary_facets(predicate)
    .into_iter()
    .flat_map(|ifacet| space.facet_dofs(ifacet))
    .sorted_unstable()
    .dedup()
    .collect()
}
