//! Module for the Poisson Equation, the prototypical ellipitic PDE.
//!
//! $-Delta u = f$ in $Omega$, $u = g$ on the constrained part of the boundary.

use super::solve_variational;
use crate::{
  bc::DirichletBc,
  config::FemConfig,
  fe::{LaplaceForm, SourceForm},
  function::FeFunction,
  norms,
  space::{FeSpace, LagrangeDegree},
  Coord, FemResult,
};

/// Solves the Poisson equation with source `source` in `space`.
pub fn solve_poisson<'s, F>(
  space: &'s FeSpace,
  source: F,
  bc: &DirichletBc,
  config: &FemConfig,
) -> FemResult<FeFunction<'s>>
where
  F: Fn(Coord) -> f64 + Sync,
{
  solve_variational(space, &LaplaceForm, &SourceForm::new(source), bc, config)
}

/// Accuracy of a discrete solution against a known exact solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
  /// $norm(u_h - I u)_(L^2)$
  pub l2: f64,
  /// $max_v abs(u_h(v) - u(v))$
  pub max_vertex: f64,
}

/// Compares `uh` with the interpolant of `exact` in a space of degree
/// `exact_degree` on the same mesh.
pub fn compare_with_exact<F>(
  uh: &FeFunction,
  exact: F,
  exact_degree: LagrangeDegree,
) -> FemResult<ErrorReport>
where
  F: Fn(Coord) -> f64,
{
  let exact_space = FeSpace::new(uh.space().mesh().clone(), exact_degree);
  let uex = FeFunction::interpolate(&exact_space, exact);
  let report = ErrorReport {
    l2: norms::l2_error(uh, &uex)?,
    max_vertex: norms::max_vertex_error(uh, &uex)?,
  };
  tracing::info!(l2 = report.l2, max_vertex = report.max_vertex, "solution error");
  Ok(report)
}

#[cfg(test)]
mod test {
  use super::{compare_with_exact, solve_poisson};
  use crate::{
    bc::DirichletBc,
    config::FemConfig,
    function::FeFunction,
    mesh::Mesh,
    space::{FeSpace, LagrangeDegree},
    Coord,
  };

  use std::sync::Arc;

  fn exact(x: Coord) -> f64 {
    1.0 + x[0] * x[0] + 2.0 * x[1] * x[1]
  }

  #[test]
  fn manufactured_quadratic() {
    let mesh = Arc::new(Mesh::unit_square(8, 8).unwrap());
    let space = FeSpace::new(mesh, LagrangeDegree::Linear);
    let u_d = FeFunction::interpolate(&space, exact);
    let bc = DirichletBc::from_function(&u_d, |_| true).unwrap();
    let uh = solve_poisson(&space, |_| -6.0, &bc, &FemConfig::default()).unwrap();

    let report = compare_with_exact(&uh, exact, LagrangeDegree::Quadratic).unwrap();
    assert!(report.max_vertex < 1e-12, "{report:?}");
    assert!(report.l2 < 1e-2, "{report:?}");
    assert!(report.l2 > 1e-4, "{report:?}");
  }

  #[test]
  fn quadratic_space_is_exact() {
    let mesh = Arc::new(Mesh::unit_square(4, 4).unwrap());
    let space = FeSpace::new(mesh, LagrangeDegree::Quadratic);
    let bc = DirichletBc::from_boundary_fn(&space, |_| true, exact).unwrap();
    let uh = solve_poisson(&space, |_| -6.0, &bc, &FemConfig::default()).unwrap();
    let report = compare_with_exact(&uh, exact, LagrangeDegree::Quadratic).unwrap();
    assert!(report.l2 < 1e-10, "{report:?}");
    assert!(report.max_vertex < 1e-10, "{report:?}");
  }
}
