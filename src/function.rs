use crate::{
  fe::{self, CellGeometry},
  mesh::CellIdx,
  space::FeSpace,
  Coord, FemError, FemResult,
};

/// Tolerance on barycentric coordinates when locating points in cells.
const LOCATE_TOL: f64 = 1e-12;

/// A finite element function, given by its coefficients in the nodal basis
/// of a space.
#[derive(Debug, Clone)]
pub struct FeFunction<'s> {
  space: &'s FeSpace,
  coeffs: na::DVector<f64>,
}

impl<'s> FeFunction<'s> {
  /// The zero function.
  pub fn new(space: &'s FeSpace) -> Self {
    Self {
      space,
      coeffs: na::DVector::zeros(space.ndofs()),
    }
  }

  /// Fails unless there is one coefficient per DOF of `space`.
  pub fn from_coeffs(space: &'s FeSpace, coeffs: na::DVector<f64>) -> FemResult<Self> {
    if coeffs.len() != space.ndofs() {
      return Err(FemError::SpaceMismatch {
        expected: space.ndofs(),
        found: coeffs.len(),
      });
    }
    Ok(Self { space, coeffs })
  }

  /// Nodal interpolation of `f` into `space`.
  pub fn interpolate<F>(space: &'s FeSpace, f: F) -> Self
  where
    F: Fn(Coord) -> f64,
  {
    let coeffs = na::DVector::from_iterator(
      space.ndofs(),
      space
        .dof_coords()
        .column_iter()
        .map(|coord| f(coord.into_owned())),
    );
    Self { space, coeffs }
  }

  pub fn space(&self) -> &'s FeSpace {
    self.space
  }
  pub fn coeffs(&self) -> &na::DVector<f64> {
    &self.coeffs
  }
  pub fn into_coeffs(self) -> na::DVector<f64> {
    self.coeffs
  }
  pub fn dof_coords(&self) -> &na::Matrix2xX<f64> {
    self.space.dof_coords()
  }

  /// Local coefficients on one cell, in shape function order.
  pub fn cell_coeffs(&self, icell: CellIdx) -> na::DVector<f64> {
    let dofs = self.space.local2global(icell);
    na::DVector::from_iterator(dofs.len(), dofs.iter().map(|&idof| self.coeffs[idof]))
  }

  /// Evaluates the function on cell `icell` at the reference point `xi`.
  pub fn eval_on_cell(&self, icell: CellIdx, xi: &Coord) -> f64 {
    let phi = fe::ref_basis(self.space.degree(), xi);
    self.cell_coeffs(icell).dot(&phi)
  }

  /// Physical gradient on cell `icell` at the reference point `xi`.
  pub fn eval_grad_on_cell(&self, geo: &CellGeometry, icell: CellIdx, xi: &Coord) -> Coord {
    let ref_grads = fe::ref_basis_grads(self.space.degree(), xi);
    geo.push_grads(&ref_grads) * self.cell_coeffs(icell)
  }

  /// Finds a cell containing `point` together with the reference coordinates
  /// of the point in that cell.
  pub fn locate(&self, point: Coord) -> Option<(CellIdx, Coord)> {
    let mesh = self.space.mesh();
    (0..mesh.ncells()).find_map(|icell| {
      let geo = CellGeometry::new(mesh, icell, 0.0).ok()?;
      let xi = geo.global2local(&point);
      let inside = fe::ref_barys(&xi).iter().all(|&l| l >= -LOCATE_TOL);
      inside.then_some((icell, xi))
    })
  }

  /// Point evaluation. `None` outside of the mesh.
  pub fn eval(&self, point: Coord) -> Option<f64> {
    let (icell, xi) = self.locate(point)?;
    Some(self.eval_on_cell(icell, &xi))
  }

  /// Gradient evaluation. `None` outside of the mesh.
  pub fn eval_grad(&self, point: Coord) -> Option<Coord> {
    let (icell, xi) = self.locate(point)?;
    let geo = CellGeometry::new(self.space.mesh(), icell, 0.0).ok()?;
    Some(self.eval_grad_on_cell(&geo, icell, &xi))
  }

  /// Function values at the mesh vertices.
  pub fn vertex_values(&self) -> na::DVector<f64> {
    let mesh = self.space.mesh();
    na::DVector::from_iterator(
      mesh.nvertices(),
      (0..mesh.nvertices()).map(|ivertex| self.coeffs[self.space.vertex_dof(ivertex)]),
    )
  }
}
