//! Error norms and integrals of finite element functions.

use crate::{
  config::AssemblyConfig,
  fe::{BasisTable, CellGeometry},
  function::FeFunction,
  mesh::{CellIdx, Mesh},
  quadrature::QuadRule,
  Coord, FemError, FemResult,
};

/// Sums `integrand` over all quadrature points of all cells.
///
/// The integrand receives the cell, its geometry, the quadrature point index
/// and the physical position.
fn integrate_cellwise<F>(mesh: &Mesh, rule: &QuadRule, mut integrand: F) -> FemResult<f64>
where
  F: FnMut(CellIdx, &CellGeometry, usize, Coord) -> f64,
{
  let tol = AssemblyConfig::default().geometry_tolerance;
  let mut total = 0.0;
  for icell in 0..mesh.ncells() {
    let geo = CellGeometry::new(mesh, icell, tol)?;
    for (iqp, (xi, w)) in rule.iter().enumerate() {
      let x = geo.local2global(xi);
      total += w * geo.det().abs() * integrand(icell, &geo, iqp, x);
    }
  }
  Ok(total)
}

/// $integral_Omega f dif x$ with a rule of the given strength.
///
/// Fails with [`FemError::UnsupportedQuadrature`] if no rule is strong enough.
pub fn integrate<F>(mesh: &Mesh, f: F, strength: usize) -> FemResult<f64>
where
  F: Fn(Coord) -> f64,
{
  integrate_cellwise(mesh, QuadRule::triangle(strength)?, |_, _, _, x| f(x))
}

/// $norm(u)_(L^2)$, exact up to rounding.
pub fn l2_norm(u: &FeFunction) -> FemResult<f64> {
  let table = BasisTable::with_strength(u.space().degree(), 2 * u.space().degree().order())?;
  let sq = integrate_cellwise(u.space().mesh(), table.rule(), |icell, _, iqp, _| {
    u.cell_coeffs(icell).dot(table.values(iqp)).powi(2)
  })?;
  Ok(sq.sqrt())
}

/// $norm(u_h - u)_(L^2)$ between two finite element functions on the same mesh.
///
/// Both functions are evaluated in their own basis, so the spaces may differ
/// in degree. The quadrature is exact for the polynomial integrand.
pub fn l2_error(uh: &FeFunction, uex: &FeFunction) -> FemResult<f64> {
  if !uh.space().shares_mesh(uex.space()) {
    return Err(FemError::MeshMismatch);
  }
  let order = uh.space().degree().order().max(uex.space().degree().order());
  let rule = QuadRule::triangle(2 * order)?;
  let table_h = BasisTable::new(uh.space().degree(), rule);
  let table_ex = BasisTable::new(uex.space().degree(), rule);

  let sq = integrate_cellwise(uh.space().mesh(), rule, |icell, _, iqp, _| {
    let vh = uh.cell_coeffs(icell).dot(table_h.values(iqp));
    let vex = uex.cell_coeffs(icell).dot(table_ex.values(iqp));
    (vh - vex).powi(2)
  })?;
  Ok(sq.sqrt())
}

/// $norm(u_h - u)_(L^2)$ against a closed-form function `u`, integrated with
/// a rule of the given strength.
pub fn l2_error_exact<F>(uh: &FeFunction, u: F, strength: usize) -> FemResult<f64>
where
  F: Fn(Coord) -> f64,
{
  let table = BasisTable::with_strength(uh.space().degree(), strength)?;
  let sq = integrate_cellwise(uh.space().mesh(), table.rule(), |icell, _, iqp, x| {
    let vh = uh.cell_coeffs(icell).dot(table.values(iqp));
    (vh - u(x)).powi(2)
  })?;
  Ok(sq.sqrt())
}

/// $abs(u_h - u)_(H^1)$ against the closed-form gradient `grad_u`, integrated
/// with a rule of the given strength.
pub fn h1_seminorm_error_exact<F>(uh: &FeFunction, grad_u: F, strength: usize) -> FemResult<f64>
where
  F: Fn(Coord) -> Coord,
{
  let table = BasisTable::with_strength(uh.space().degree(), strength)?;
  let sq = integrate_cellwise(uh.space().mesh(), table.rule(), |icell, geo, iqp, x| {
    let grad_h = geo.push_grads(table.ref_grads(iqp)) * uh.cell_coeffs(icell);
    (grad_h - grad_u(x)).norm_squared()
  })?;
  Ok(sq.sqrt())
}

/// $max_v abs(u_h(v) - u(v))$ over the mesh vertices.
pub fn max_vertex_error(uh: &FeFunction, uex: &FeFunction) -> FemResult<f64> {
  if !uh.space().shares_mesh(uex.space()) {
    return Err(FemError::MeshMismatch);
  }
  Ok((uh.vertex_values() - uex.vertex_values()).amax())
}
