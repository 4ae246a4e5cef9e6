//! Reference Lagrange elements, cell geometry and the element matrices and
//! vectors of weak forms.
//!
//! The reference triangle has the vertices $(0,0), (1,0), (0,1)$ and the
//! barycentric coordinates $lambda_0 = 1 - xi - eta, lambda_1 = xi, lambda_2 = eta$.
//! Local shape functions are ordered vertices first, then edges in
//! [`LOCAL_EDGES`] order.

use crate::{
  mesh::{CellIdx, Mesh, LOCAL_EDGES},
  quadrature::QuadRule,
  space::LagrangeDegree,
  Coord, FemError, FemResult,
};

pub type ElMat = na::DMatrix<f64>;
pub type ElVec = na::DVector<f64>;

/// Barycentric coordinates of a reference point.
pub fn ref_barys(xi: &Coord) -> [f64; 3] {
  [1.0 - xi[0] - xi[1], xi[0], xi[1]]
}

/// The constant gradients of the reference barycentric coordinate
/// functions, in the columns of a matrix.
pub fn ref_difbarys() -> na::Matrix2x3<f64> {
  na::Matrix2x3::new(-1.0, 1.0, 0.0, -1.0, 0.0, 1.0)
}

/// Values of all reference shape functions at `xi`.
pub fn ref_basis(degree: LagrangeDegree, xi: &Coord) -> na::DVector<f64> {
  let l = ref_barys(xi);
  match degree {
    LagrangeDegree::Linear => na::DVector::from_column_slice(&l),
    LagrangeDegree::Quadratic => {
      let mut phi = na::DVector::zeros(6);
      for i in 0..3 {
        phi[i] = l[i] * (2.0 * l[i] - 1.0);
      }
      for (iedge, &[a, b]) in LOCAL_EDGES.iter().enumerate() {
        phi[3 + iedge] = 4.0 * l[a] * l[b];
      }
      phi
    }
  }
}

/// Reference gradients of all shape functions at `xi`, one column per
/// shape function.
pub fn ref_basis_grads(degree: LagrangeDegree, xi: &Coord) -> na::Matrix2xX<f64> {
  let difbarys = ref_difbarys();
  match degree {
    LagrangeDegree::Linear => na::Matrix2xX::from_columns(&[
      difbarys.column(0).into_owned(),
      difbarys.column(1).into_owned(),
      difbarys.column(2).into_owned(),
    ]),
    LagrangeDegree::Quadratic => {
      let l = ref_barys(xi);
      let mut grads = na::Matrix2xX::zeros(6);
      for i in 0..3 {
        grads.set_column(i, &((4.0 * l[i] - 1.0) * difbarys.column(i)));
      }
      for (iedge, &[a, b]) in LOCAL_EDGES.iter().enumerate() {
        let grad = 4.0 * (l[b] * difbarys.column(a) + l[a] * difbarys.column(b));
        grads.set_column(3 + iedge, &grad);
      }
      grads
    }
  }
}

/// Shape function values and reference gradients tabulated at the nodes of a
/// quadrature rule.
#[derive(Debug, Clone)]
pub struct BasisTable {
  degree: LagrangeDegree,
  rule: &'static QuadRule,
  values: Vec<na::DVector<f64>>,
  ref_grads: Vec<na::Matrix2xX<f64>>,
}
impl BasisTable {
  pub fn new(degree: LagrangeDegree, rule: &'static QuadRule) -> Self {
    let values = rule.nodes().iter().map(|xi| ref_basis(degree, xi)).collect();
    let ref_grads = rule
      .nodes()
      .iter()
      .map(|xi| ref_basis_grads(degree, xi))
      .collect();
    Self {
      degree,
      rule,
      values,
      ref_grads,
    }
  }
  /// Tabulates on the cheapest rule of the given strength.
  pub fn with_strength(degree: LagrangeDegree, strength: usize) -> FemResult<Self> {
    Ok(Self::new(degree, QuadRule::triangle(strength)?))
  }

  pub fn degree(&self) -> LagrangeDegree {
    self.degree
  }
  pub fn rule(&self) -> &'static QuadRule {
    self.rule
  }
  pub fn nbasis(&self) -> usize {
    self.degree.nlocal_dofs()
  }
  pub fn values(&self, iqp: usize) -> &na::DVector<f64> {
    &self.values[iqp]
  }
  pub fn ref_grads(&self, iqp: usize) -> &na::Matrix2xX<f64> {
    &self.ref_grads[iqp]
  }
}

/// Affine map from the reference triangle onto a mesh cell.
#[derive(Debug, Clone)]
pub struct CellGeometry {
  origin: Coord,
  jacobian: na::Matrix2<f64>,
  det: f64,
  inv_jacobian_t: na::Matrix2<f64>,
}
impl CellGeometry {
  /// Fails for cells with `|det J| <= tol * h^2`, `h` being the longest edge.
  pub fn new(mesh: &Mesh, icell: CellIdx, tol: f64) -> FemResult<Self> {
    let [v0, v1, v2] = mesh.cell_coords(icell);
    let jacobian = na::Matrix2::from_columns(&[v1 - v0, v2 - v0]);
    let det = jacobian.determinant();

    let diameter = [(v1 - v0).norm(), (v2 - v1).norm(), (v2 - v0).norm()]
      .into_iter()
      .fold(0.0, f64::max);
    // negated comparison also rejects NaN
    if !(det.abs() > tol * diameter * diameter) {
      return Err(FemError::IllConditionedGeometry { icell, det });
    }
    let inv_jacobian = jacobian
      .try_inverse()
      .ok_or(FemError::IllConditionedGeometry { icell, det })?;

    Ok(Self {
      origin: v0,
      jacobian,
      det,
      inv_jacobian_t: inv_jacobian.transpose(),
    })
  }

  pub fn jacobian(&self) -> &na::Matrix2<f64> {
    &self.jacobian
  }
  /// Signed determinant of the jacobian.
  pub fn det(&self) -> f64 {
    self.det
  }
  /// Area of the cell.
  pub fn vol(&self) -> f64 {
    0.5 * self.det.abs()
  }

  pub fn local2global(&self, xi: &Coord) -> Coord {
    self.origin + self.jacobian * xi
  }
  pub fn global2local(&self, x: &Coord) -> Coord {
    self.inv_jacobian_t.transpose() * (x - self.origin)
  }
  /// Transforms reference gradients (columns) into physical gradients.
  pub fn push_grads(&self, ref_grads: &na::Matrix2xX<f64>) -> na::Matrix2xX<f64> {
    self.inv_jacobian_t * ref_grads
  }
}

/// Everything a weak-form integrand may depend on at one quadrature point.
pub struct QuadPoint<'a> {
  /// Physical position.
  pub x: Coord,
  /// Quadrature weight including the jacobian determinant.
  pub weight: f64,
  /// Shape function values.
  pub phi: &'a na::DVector<f64>,
  /// Physical shape function gradients, one column per shape function.
  pub grad_phi: &'a na::Matrix2xX<f64>,
}

/// Visits all quadrature points of a cell.
pub fn for_each_quad_point<F>(geo: &CellGeometry, table: &BasisTable, mut f: F)
where
  F: FnMut(&QuadPoint),
{
  for (iqp, (xi, w)) in table.rule().iter().enumerate() {
    let grad_phi = geo.push_grads(table.ref_grads(iqp));
    let qp = QuadPoint {
      x: geo.local2global(xi),
      weight: w * geo.det().abs(),
      phi: table.values(iqp),
      grad_phi: &grad_phi,
    };
    f(&qp);
  }
}

/// Pointwise integrand of a bilinear form $a(u, v)$ for test function `itest`
/// and trial function `jtrial`.
pub trait BilinearForm: Sync {
  fn integrand(&self, qp: &QuadPoint, itest: usize, jtrial: usize) -> f64;
}
impl<F> BilinearForm for F
where
  F: Fn(&QuadPoint, usize, usize) -> f64 + Sync,
{
  fn integrand(&self, qp: &QuadPoint, itest: usize, jtrial: usize) -> f64 {
    self(qp, itest, jtrial)
  }
}

/// Pointwise integrand of a linear form $l(v)$ for test function `itest`.
pub trait LinearForm: Sync {
  fn integrand(&self, qp: &QuadPoint, itest: usize) -> f64;
}
impl<F> LinearForm for F
where
  F: Fn(&QuadPoint, usize) -> f64 + Sync,
{
  fn integrand(&self, qp: &QuadPoint, itest: usize) -> f64 {
    self(qp, itest)
  }
}

/// $a(u, v) = integral grad u dot grad v$
#[derive(Debug, Clone, Copy, Default)]
pub struct LaplaceForm;
impl BilinearForm for LaplaceForm {
  fn integrand(&self, qp: &QuadPoint, itest: usize, jtrial: usize) -> f64 {
    qp.grad_phi.column(itest).dot(&qp.grad_phi.column(jtrial))
  }
}

/// $m(u, v) = integral u v$
#[derive(Debug, Clone, Copy, Default)]
pub struct MassForm;
impl BilinearForm for MassForm {
  fn integrand(&self, qp: &QuadPoint, itest: usize, jtrial: usize) -> f64 {
    qp.phi[itest] * qp.phi[jtrial]
  }
}

/// $l(v) = integral f v$ for a scalar source $f$.
pub struct SourceForm<F> {
  source: F,
}
impl<F> SourceForm<F>
where
  F: Fn(Coord) -> f64 + Sync,
{
  pub fn new(source: F) -> Self {
    Self { source }
  }
}
impl SourceForm<fn(Coord) -> f64> {
  /// A spatially constant source.
  pub fn constant(value: f64) -> SourceForm<impl Fn(Coord) -> f64 + Sync> {
    SourceForm::new(move |_| value)
  }
}
impl<F> LinearForm for SourceForm<F>
where
  F: Fn(Coord) -> f64 + Sync,
{
  fn integrand(&self, qp: &QuadPoint, itest: usize) -> f64 {
    (self.source)(qp.x) * qp.phi[itest]
  }
}

/// Element matrix of `form` computed by quadrature.
pub fn elmat(geo: &CellGeometry, table: &BasisTable, form: &impl BilinearForm) -> ElMat {
  let n = table.nbasis();
  let mut elmat = ElMat::zeros(n, n);
  for_each_quad_point(geo, table, |qp| {
    for i in 0..n {
      for j in 0..n {
        elmat[(i, j)] += qp.weight * form.integrand(qp, i, j);
      }
    }
  });
  elmat
}

/// Element vector of `form` computed by quadrature.
pub fn elvec(geo: &CellGeometry, table: &BasisTable, form: &impl LinearForm) -> ElVec {
  let n = table.nbasis();
  let mut elvec = ElVec::zeros(n);
  for_each_quad_point(geo, table, |qp| {
    for i in 0..n {
      elvec[i] += qp.weight * form.integrand(qp, i);
    }
  });
  elvec
}

/// Exact linear Lagrange element matrix of the Laplacian.
///
/// $A = |K| G^T G$ with the constant barycentric gradients $G$.
pub fn linear_laplace_elmat(geo: &CellGeometry) -> ElMat {
  let difbarys = geo.inv_jacobian_t * ref_difbarys();
  let elmat = geo.vol() * difbarys.transpose() * difbarys;
  ElMat::from_iterator(3, 3, elmat.iter().copied())
}

/// Exact linear Lagrange element matrix of the mass bilinear form.
pub fn linear_mass_elmat(geo: &CellGeometry) -> ElMat {
  let v = geo.vol() / 12.0;
  let mut elmat = ElMat::from_element(3, 3, v);
  elmat.fill_diagonal(2.0 * v);
  elmat
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::linalg::assert_mat_eq;

  use std::sync::Arc;

  fn reference_cell() -> (Arc<Mesh>, CellGeometry) {
    let coords = na::Matrix2xX::from_column_slice(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    let mesh = Arc::new(Mesh::new(coords, vec![[0, 1, 2]]).unwrap());
    let geo = CellGeometry::new(&mesh, 0, 1e-12).unwrap();
    (mesh, geo)
  }

  fn skewed_cell() -> CellGeometry {
    let coords = na::Matrix2xX::from_column_slice(&[0.3, -0.2, 1.7, 0.4, 0.1, 1.3]);
    let mesh = Mesh::new(coords, vec![[0, 1, 2]]).unwrap();
    CellGeometry::new(&mesh, 0, 1e-12).unwrap()
  }

  /// Reference nodes of the Lagrange DOFs in local order.
  fn ref_dof_nodes(degree: LagrangeDegree) -> Vec<Coord> {
    let mut nodes = vec![
      Coord::new(0.0, 0.0),
      Coord::new(1.0, 0.0),
      Coord::new(0.0, 1.0),
    ];
    if degree == LagrangeDegree::Quadratic {
      nodes.extend([
        Coord::new(0.5, 0.0),
        Coord::new(0.5, 0.5),
        Coord::new(0.0, 0.5),
      ]);
    }
    nodes
  }

  #[test]
  fn basis_is_nodal() {
    for degree in [LagrangeDegree::Linear, LagrangeDegree::Quadratic] {
      let nodes = ref_dof_nodes(degree);
      for (j, node) in nodes.iter().enumerate() {
        let phi = ref_basis(degree, node);
        for i in 0..nodes.len() {
          let expected = if i == j { 1.0 } else { 0.0 };
          assert!((phi[i] - expected).abs() < 1e-15);
        }
      }
    }
  }

  #[test]
  fn basis_partition_of_unity() {
    let xi = Coord::new(0.2, 0.3);
    for degree in [LagrangeDegree::Linear, LagrangeDegree::Quadratic] {
      assert!((ref_basis(degree, &xi).sum() - 1.0).abs() < 1e-15);
      let grad_sum = ref_basis_grads(degree, &xi).column_sum();
      assert!(grad_sum.norm() < 1e-14);
    }
  }

  #[test]
  fn gradients_match_finite_differences() {
    let h = 1e-6;
    let xi = Coord::new(0.25, 0.15);
    for degree in [LagrangeDegree::Linear, LagrangeDegree::Quadratic] {
      let grads = ref_basis_grads(degree, &xi);
      for d in 0..2 {
        let mut shift = Coord::zeros();
        shift[d] = h;
        let fd = (ref_basis(degree, &(xi + shift)) - ref_basis(degree, &(xi - shift))) / (2.0 * h);
        for i in 0..degree.nlocal_dofs() {
          assert!((grads[(d, i)] - fd[i]).abs() < 1e-8);
        }
      }
    }
  }

  #[test]
  fn laplace_elmat_reference() {
    let (_, geo) = reference_cell();
    let table = BasisTable::with_strength(LagrangeDegree::Linear, 2).unwrap();
    #[rustfmt::skip]
    let expected = 0.5 * na::dmatrix![
       2.0, -1.0, -1.0;
      -1.0,  1.0,  0.0;
      -1.0,  0.0,  1.0;
    ];
    assert_mat_eq(&elmat(&geo, &table, &LaplaceForm), &expected);
    assert_mat_eq(&linear_laplace_elmat(&geo), &expected);
  }

  #[test]
  fn quadrature_elmats_match_exact() {
    let geo = skewed_cell();
    let table = BasisTable::with_strength(LagrangeDegree::Linear, 2).unwrap();
    assert_mat_eq(&elmat(&geo, &table, &LaplaceForm), &linear_laplace_elmat(&geo));
    assert_mat_eq(&elmat(&geo, &table, &MassForm), &linear_mass_elmat(&geo));
  }

  #[test]
  fn quadratic_elmat_properties() {
    let geo = skewed_cell();
    let table = BasisTable::with_strength(LagrangeDegree::Quadratic, 4).unwrap();
    let laplace = elmat(&geo, &table, &LaplaceForm);
    assert_mat_eq(&laplace, &laplace.transpose());
    assert!(laplace.row_sum().norm() < 1e-13);

    // the mass matrix integrates the constant one to the area
    let mass = elmat(&geo, &table, &MassForm);
    assert!((mass.sum() - geo.vol()).abs() < 1e-14);
  }

  #[test]
  fn source_elvec() {
    let geo = skewed_cell();
    let table = BasisTable::with_strength(LagrangeDegree::Linear, 2).unwrap();
    let elvec = elvec(&geo, &table, &SourceForm::constant(-6.0));
    for i in 0..3 {
      assert!((elvec[i] + 6.0 * geo.vol() / 3.0).abs() < 1e-14);
    }
    fn double_load(qp: &QuadPoint, i: usize) -> f64 {
      2.0 * qp.phi[i]
    }
    let elvec = super::elvec(&geo, &table, &double_load);
    assert!((elvec.sum() - 2.0 * geo.vol()).abs() < 1e-14);
  }

  #[test]
  fn geometry_maps() {
    let geo = skewed_cell();
    let xi = Coord::new(0.3, 0.6);
    let x = geo.local2global(&xi);
    assert!((geo.global2local(&x) - xi).norm() < 1e-14);
    assert!(geo.det() > 0.0);
  }

  #[test]
  fn degenerate_cell() {
    let coords = na::Matrix2xX::from_column_slice(&[0.0, 0.0, 1.0, 0.0, 2.0, 0.0]);
    let mesh = Mesh::new(coords, vec![[0, 1, 2]]).unwrap();
    assert!(matches!(
      CellGeometry::new(&mesh, 0, 1e-12),
      Err(FemError::IllConditionedGeometry { icell: 0, .. })
    ));
  }
}
