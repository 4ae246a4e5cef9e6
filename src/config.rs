//! Knobs for assembly and linear solves.
//!
//! All structs are plain data with sensible defaults, adjusted through the
//! `with_*` builder methods.

/// Which factorization is used for the Galerkin system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
  /// Sparse Cholesky with pivot inspection. Requires a SPD system.
  #[default]
  Cholesky,
  /// Sparse LU.
  Lu,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
  /// Polynomial strength of the quadrature rule used on each cell.
  /// `None` means `2 * degree` of the space.
  pub quadrature_strength: Option<usize>,
  /// Cells with `|det J| <= geometry_tolerance * h^2` are rejected,
  /// where `h` is the longest edge of the cell.
  pub geometry_tolerance: f64,
  /// Compute element contributions on the rayon thread pool.
  pub parallel: bool,
}
impl Default for AssemblyConfig {
  fn default() -> Self {
    Self {
      quadrature_strength: None,
      geometry_tolerance: 1e-12,
      parallel: false,
    }
  }
}
impl AssemblyConfig {
  pub fn with_quadrature_strength(mut self, strength: usize) -> Self {
    self.quadrature_strength = Some(strength);
    self
  }
  pub fn with_geometry_tolerance(mut self, tol: f64) -> Self {
    self.geometry_tolerance = tol;
    self
  }
  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
  pub kind: SolverKind,
  /// A Cholesky pivot `L_jj^2` below `pivot_tolerance * max_i |A_ii|`
  /// is reported as a singular system.
  pub pivot_tolerance: f64,
}
impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      kind: SolverKind::default(),
      pivot_tolerance: 1e-12,
    }
  }
}
impl SolverConfig {
  pub fn with_kind(mut self, kind: SolverKind) -> Self {
    self.kind = kind;
    self
  }
  pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
    self.pivot_tolerance = tol;
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FemConfig {
  pub assembly: AssemblyConfig,
  pub solver: SolverConfig,
}
impl FemConfig {
  pub fn with_assembly(mut self, assembly: AssemblyConfig) -> Self {
    self.assembly = assembly;
    self
  }
  pub fn with_solver(mut self, solver: SolverConfig) -> Self {
    self.solver = solver;
    self
  }
}
