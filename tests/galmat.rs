//! Verify Galerkin matrices of the negative Laplacian on structured
//! triangulations of the unit square.
//!
//! Mesh vertices are ordered lexicographically.

extern crate nalgebra as na;

use trifem::{
  assemble::assemble_galmat,
  config::AssemblyConfig,
  fe::{LaplaceForm, MassForm},
  mesh::{rectangle::RectangleMeshInfo, Mesh},
  space::{FeSpace, LagrangeDegree},
};

use std::sync::Arc;

fn laplace_galmat(mesh: &Arc<Mesh>, degree: LagrangeDegree) -> na::DMatrix<f64> {
  let space = FeSpace::new(mesh.clone(), degree);
  assemble_galmat(&space, &LaplaceForm, &AssemblyConfig::default())
    .unwrap()
    .to_nalgebra_dense()
}

#[test]
fn symmetric_with_vanishing_row_sums() {
  for n in [1, 2, 5] {
    let mesh = Arc::new(Mesh::unit_square(n, n + 1).unwrap());
    for degree in [LagrangeDegree::Linear, LagrangeDegree::Quadratic] {
      let galmat = laplace_galmat(&mesh, degree);
      assert_eq!(galmat, galmat.transpose());
      for row in galmat.row_iter() {
        assert!(row.sum().abs() < 1e-12);
      }
      for i in 0..galmat.nrows() {
        assert!(galmat[(i, i)] > 0.0);
      }
    }
  }
}

/// On this triangulation the linear Lagrange stiffness matrix coincides with
/// the five point finite difference stencil in the interior.
#[test]
fn linear_interior_rows_are_five_point_stencil() {
  let n = 4;
  let info = RectangleMeshInfo::new_unit(n, n).unwrap();
  let mesh = Arc::new(info.compute_mesh().unwrap());
  let galmat = laplace_galmat(&mesh, LagrangeDegree::Linear);

  for ivertex in (0..mesh.nvertices()).filter(|&v| !info.is_vertex_on_boundary(v)) {
    let [i, j] = info.vertex_cart_idx(ivertex);
    let mut expected = na::RowDVector::zeros(mesh.nvertices());
    expected[ivertex] = 4.0;
    for [ni, nj] in [[i - 1, j], [i + 1, j], [i, j - 1], [i, j + 1]] {
      expected[info.vertex_idx(ni, nj)] = -1.0;
    }
    let diff = (galmat.row(ivertex) - expected).norm();
    assert!(diff < 1e-12, "row {ivertex}");
  }
}

#[test]
fn scaling_on_rectangles() {
  // the stiffness matrix of the laplacian is invariant under uniform scaling
  let unit = RectangleMeshInfo::new_unit(3, 3).unwrap().compute_mesh().unwrap();
  let scaled = RectangleMeshInfo::new_min_max(
    na::Vector2::new(-2.0, 1.0),
    na::Vector2::new(1.0, 4.0),
    3,
    3,
  )
  .unwrap()
  .compute_mesh()
  .unwrap();

  let a = laplace_galmat(&Arc::new(unit), LagrangeDegree::Quadratic);
  let b = laplace_galmat(&Arc::new(scaled), LagrangeDegree::Quadratic);
  assert!((a - b).norm() < 1e-11);
}

#[test]
fn mass_matrix_sums_to_area() {
  let mesh = Arc::new(
    RectangleMeshInfo::new_min_max(na::Vector2::zeros(), na::Vector2::new(2.0, 0.5), 4, 2)
      .unwrap()
      .compute_mesh()
      .unwrap(),
  );
  for degree in [LagrangeDegree::Linear, LagrangeDegree::Quadratic] {
    let space = FeSpace::new(mesh.clone(), degree);
    let mass = assemble_galmat(&space, &MassForm, &AssemblyConfig::default())
      .unwrap()
      .to_nalgebra_dense();
    assert!((mass.sum() - 1.0).abs() < 1e-13);
    assert_eq!(mass, mass.transpose());
  }
}
