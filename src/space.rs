use crate::{
  mesh::{CellIdx, FacetIdx, Mesh, VertexIdx},
  Coord, FemError, FemResult,
};

use num_integer::binomial;
use std::sync::Arc;

pub type DofIdx = usize;

/// Polynomial degree of a continuous Lagrange space on triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagrangeDegree {
  Linear,
  Quadratic,
}
impl LagrangeDegree {
  pub fn order(self) -> usize {
    match self {
      Self::Linear => 1,
      Self::Quadratic => 2,
    }
  }
  /// Number of shape functions on one triangle.
  pub fn nlocal_dofs(self) -> usize {
    binomial(self.order() + 2, 2)
  }
  /// Number of DOFs attached to each mesh entity.
  pub fn dof_layout(self) -> DofLayout {
    match self {
      Self::Linear => DofLayout {
        per_vertex: 1,
        per_edge: 0,
        per_cell: 0,
      },
      Self::Quadratic => DofLayout {
        per_vertex: 1,
        per_edge: 1,
        per_cell: 0,
      },
    }
  }
}
impl TryFrom<usize> for LagrangeDegree {
  type Error = FemError;
  fn try_from(order: usize) -> FemResult<Self> {
    match order {
      1 => Ok(Self::Linear),
      2 => Ok(Self::Quadratic),
      _ => Err(FemError::UnsupportedDegree(order)),
    }
  }
}

/// DOF-per-entity count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DofLayout {
  pub per_vertex: usize,
  pub per_edge: usize,
  pub per_cell: usize,
}

/// Degrees-of-Freedom handler.
///
/// Vertex DOFs come first and share the vertex numbering,
/// edge DOFs follow in facet order.
#[derive(Debug, Clone)]
pub struct DofHandler {
  ndofs: usize,
  local2global_idx: Vec<Vec<DofIdx>>,
  dof_coords: na::Matrix2xX<f64>,
}
impl DofHandler {
  pub fn new(degree: LagrangeDegree, mesh: &Mesh) -> Self {
    let layout = degree.dof_layout();
    let nvertices = mesh.nvertices();
    let ndofs = layout.per_vertex * nvertices + layout.per_edge * mesh.nfacets();

    let local2global_idx = (0..mesh.ncells())
      .map(|icell| {
        let mut dofs = mesh.cell(icell).to_vec();
        if layout.per_edge > 0 {
          dofs.extend(mesh.cell_facets(icell).iter().map(|&ifacet| nvertices + ifacet));
        }
        dofs
      })
      .collect();

    let mut dof_coords = na::Matrix2xX::zeros(ndofs);
    dof_coords
      .columns_mut(0, nvertices)
      .copy_from(mesh.vertex_coords());
    if layout.per_edge > 0 {
      for ifacet in 0..mesh.nfacets() {
        dof_coords.set_column(nvertices + ifacet, &mesh.facet_midpoint(ifacet));
      }
    }

    Self {
      ndofs,
      local2global_idx,
      dof_coords,
    }
  }

  pub fn ndofs(&self) -> usize {
    self.ndofs
  }
  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx] {
    &self.local2global_idx[icell]
  }
  pub fn dof_coords(&self) -> &na::Matrix2xX<f64> {
    &self.dof_coords
  }
  pub fn dof_coord(&self, idof: DofIdx) -> Coord {
    self.dof_coords.column(idof).into_owned()
  }
}

/// A continuous Lagrange finite element space on a triangle mesh.
#[derive(Debug, Clone)]
pub struct FeSpace {
  /// The underlying mesh of the space.
  mesh: Arc<Mesh>,
  degree: LagrangeDegree,
  dof_handler: DofHandler,
}

impl FeSpace {
  pub fn new(mesh: Arc<Mesh>, degree: LagrangeDegree) -> Self {
    let dof_handler = DofHandler::new(degree, &mesh);
    tracing::debug!(
      degree = degree.order(),
      ndofs = dof_handler.ndofs(),
      "built lagrange space"
    );
    Self {
      mesh,
      degree,
      dof_handler,
    }
  }

  /// Same as [`FeSpace::new`] with the degree given as number.
  pub fn with_order(mesh: Arc<Mesh>, order: usize) -> FemResult<Self> {
    Ok(Self::new(mesh, LagrangeDegree::try_from(order)?))
  }

  pub fn mesh(&self) -> &Arc<Mesh> {
    &self.mesh
  }
  pub fn degree(&self) -> LagrangeDegree {
    self.degree
  }
  pub fn ndofs(&self) -> usize {
    self.dof_handler.ndofs()
  }
  pub fn nlocal_dofs(&self) -> usize {
    self.degree.nlocal_dofs()
  }
  pub fn dof_handler(&self) -> &DofHandler {
    &self.dof_handler
  }
  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx] {
    self.dof_handler.local2global(icell)
  }
  pub fn dof_coords(&self) -> &na::Matrix2xX<f64> {
    self.dof_handler.dof_coords()
  }
  pub fn dof_coord(&self, idof: DofIdx) -> Coord {
    self.dof_handler.dof_coord(idof)
  }

  /// The DOF sitting on a mesh vertex.
  pub fn vertex_dof(&self, ivertex: VertexIdx) -> DofIdx {
    ivertex
  }

  /// All DOFs in the closure of a facet: its two vertices and,
  /// for quadratic spaces, the edge itself.
  pub fn facet_dofs(&self, ifacet: FacetIdx) -> Vec<DofIdx> {
    let mut dofs: Vec<_> = self
      .mesh
      .facet(ifacet)
      .vertices()
      .iter()
      .map(|&ivertex| self.vertex_dof(ivertex))
      .collect();
    if self.degree.dof_layout().per_edge > 0 {
      dofs.push(self.mesh.nvertices() + ifacet);
    }
    dofs
  }

  /// Whether both spaces are built on the very same mesh instance.
  pub fn shares_mesh(&self, other: &FeSpace) -> bool {
    Arc::ptr_eq(&self.mesh, &other.mesh)
  }
}
