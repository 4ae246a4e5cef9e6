use crate::{mesh::CellIdx, space::DofIdx};

use thiserror::Error;

pub type FemResult<T> = Result<T, FemError>;

/// Everything that can go wrong between mesh generation and error evaluation.
///
/// All variants are terminal for the operation that raised them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FemError {
  #[error("invalid mesh parameters: {0}")]
  InvalidMeshParameters(String),

  #[error("ill-conditioned geometry in cell {icell}: jacobian determinant {det:e}")]
  IllConditionedGeometry { icell: CellIdx, det: f64 },

  #[error("conflicting dirichlet constraint on dof {idof}: {first} vs {second}")]
  ConflictingConstraint {
    idof: DofIdx,
    first: f64,
    second: f64,
  },

  #[error("singular system: {0}")]
  SingularSystem(String),

  #[error("unsupported lagrange degree {0}, expected 1 or 2")]
  UnsupportedDegree(usize),

  #[error("dof {idof} out of range for space with {ndofs} dofs")]
  DofOutOfRange { idof: DofIdx, ndofs: usize },

  #[error("functions live on different meshes")]
  MeshMismatch,

  #[error("expected {expected} dofs, got {found}")]
  SpaceMismatch { expected: usize, found: usize },

  #[error("non-finite dirichlet value {value} on dof {idof}")]
  NonFiniteConstraint { idof: DofIdx, value: f64 },

  #[error("no quadrature rule of strength {requested}, at most {available} available")]
  UnsupportedQuadrature { requested: usize, available: usize },
}
