//! A mesh is the container of the mesh entities: vertices, cells and facets
//! (the edges of the triangles).
//! It provides a global numbering for all entities, which are stored in
//! contiguous arrays and refer to each other only by index.
//! Incidence between facets and cells is computed once at construction.

pub mod boundary;
pub mod rectangle;

use crate::{Coord, FemError, FemResult};

use indexmap::IndexMap;
use itertools::Itertools as _;

pub type VertexIdx = usize;
pub type CellIdx = usize;
pub type FacetIdx = usize;

/// Number of vertices of a triangle.
pub const NVERTICES_PER_CELL: usize = 3;

/// Local vertex pairs of the three edges of a triangle, in local edge order.
pub const LOCAL_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [0, 2]];

/// Helper struct that ensures that edges don't have an orientation.
/// Always use `Self::new` never construct tuple directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeBetweenVertices(VertexIdx, VertexIdx);
impl EdgeBetweenVertices {
  pub fn new(a: VertexIdx, b: VertexIdx) -> Self {
    if a < b {
      Self(a, b)
    } else {
      Self(b, a)
    }
  }
  pub fn vertices(&self) -> [VertexIdx; 2] {
    [self.0, self.1]
  }
}

/// An edge of the triangulation together with the cells containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
  vertices: EdgeBetweenVertices,
  /// One cell for boundary facets, two for interior facets.
  parent_cells: Vec<CellIdx>,
}
impl Facet {
  pub fn vertices(&self) -> [VertexIdx; 2] {
    self.vertices.vertices()
  }
  pub fn parent_cells(&self) -> &[CellIdx] {
    &self.parent_cells
  }
  pub fn is_boundary(&self) -> bool {
    self.parent_cells.len() == 1
  }
}

/// Triangle mesh in the plane with topological and geometric information.
#[derive(Debug, Clone)]
pub struct Mesh {
  /// The vertex coordinates in the columns of a matrix.
  vertex_coords: na::Matrix2xX<f64>,
  cells: Vec<[VertexIdx; NVERTICES_PER_CELL]>,
  facets: Vec<Facet>,
  /// Facet indices of every cell, in local edge order.
  cell_facets: Vec<[FacetIdx; 3]>,
}

// constructors
impl Mesh {
  /// Builds a mesh from raw vertex coordinates and cell connectivity.
  ///
  /// Facets and their cell adjacency are derived in a single pass over the cells.
  pub fn new(
    vertex_coords: na::Matrix2xX<f64>,
    cells: Vec<[VertexIdx; NVERTICES_PER_CELL]>,
  ) -> FemResult<Self> {
    if cells.is_empty() {
      return Err(FemError::InvalidMeshParameters(
        "mesh must contain at least one cell".into(),
      ));
    }
    let nvertices = vertex_coords.ncols();
    for (icell, cell) in cells.iter().enumerate() {
      if let Some(&ivertex) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(FemError::InvalidMeshParameters(format!(
          "cell {icell} references vertex {ivertex}, but there are only {nvertices} vertices"
        )));
      }
      if !cell.iter().all_unique() {
        return Err(FemError::InvalidMeshParameters(format!(
          "cell {icell} has repeated vertices {cell:?}"
        )));
      }
    }

    let (facets, cell_facets) = compute_facets(&cells)?;

    Ok(Self {
      vertex_coords,
      cells,
      facets,
      cell_facets,
    })
  }

  /// Structured triangulation of $[0,1]^2$ with `nx` times `ny` boxes.
  pub fn unit_square(nx: usize, ny: usize) -> FemResult<Self> {
    rectangle::RectangleMeshInfo::new_unit(nx, ny)?.compute_mesh()
  }
}

/// Edge-to-cell incidence through an insertion-ordered map, so the facet
/// numbering follows the first occurrence in cell order.
fn compute_facets(
  cells: &[[VertexIdx; NVERTICES_PER_CELL]],
) -> FemResult<(Vec<Facet>, Vec<[FacetIdx; 3]>)> {
  let mut incidence: IndexMap<EdgeBetweenVertices, Vec<CellIdx>> = IndexMap::new();
  let mut cell_facets = Vec::with_capacity(cells.len());

  for (icell, cell) in cells.iter().enumerate() {
    let mut facets = [0; 3];
    for (iedge, &[a, b]) in LOCAL_EDGES.iter().enumerate() {
      let entry = incidence.entry(EdgeBetweenVertices::new(cell[a], cell[b]));
      facets[iedge] = entry.index();
      entry.or_default().push(icell);
    }
    cell_facets.push(facets);
  }

  let facets = incidence
    .into_iter()
    .map(|(vertices, parent_cells)| {
      if parent_cells.len() > 2 {
        return Err(FemError::InvalidMeshParameters(format!(
          "edge {:?} is shared by {} cells, mesh is not a manifold",
          vertices.vertices(),
          parent_cells.len()
        )));
      }
      Ok(Facet {
        vertices,
        parent_cells,
      })
    })
    .collect::<FemResult<Vec<_>>>()?;

  Ok((facets, cell_facets))
}

// getters
impl Mesh {
  pub fn nvertices(&self) -> usize {
    self.vertex_coords.ncols()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }
  pub fn nfacets(&self) -> usize {
    self.facets.len()
  }

  pub fn vertex_coords(&self) -> &na::Matrix2xX<f64> {
    &self.vertex_coords
  }
  pub fn coord(&self, ivertex: VertexIdx) -> Coord {
    self.vertex_coords.column(ivertex).into_owned()
  }

  pub fn cells(&self) -> &[[VertexIdx; NVERTICES_PER_CELL]] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &[VertexIdx; NVERTICES_PER_CELL] {
    &self.cells[icell]
  }
  pub fn cell_coords(&self, icell: CellIdx) -> [Coord; NVERTICES_PER_CELL] {
    self.cells[icell].map(|ivertex| self.coord(ivertex))
  }
  pub fn cell_facets(&self, icell: CellIdx) -> &[FacetIdx; 3] {
    &self.cell_facets[icell]
  }

  pub fn facets(&self) -> &[Facet] {
    &self.facets
  }
  pub fn facet(&self, ifacet: FacetIdx) -> &Facet {
    &self.facets[ifacet]
  }
  pub fn facet_midpoint(&self, ifacet: FacetIdx) -> Coord {
    let [a, b] = self.facets[ifacet].vertices();
    0.5 * (self.coord(a) + self.coord(b))
  }
  pub fn facet_length(&self, ifacet: FacetIdx) -> f64 {
    let [a, b] = self.facets[ifacet].vertices();
    (self.coord(b) - self.coord(a)).norm()
  }

  /// The mesh width $h$, which is the largest diameter of all cells.
  ///
  /// The diameter of a triangle is its longest edge.
  pub fn mesh_width(&self) -> f64 {
    (0..self.nfacets())
      .map(|ifacet| self.facet_length(ifacet))
      .fold(0.0, f64::max)
  }

  /// Evaluates a coordinate function at all vertices.
  pub fn eval_coord_fn<F>(&self, f: F) -> na::DVector<f64>
  where
    F: FnMut(Coord) -> f64,
  {
    na::DVector::from_iterator(
      self.nvertices(),
      (0..self.nvertices()).map(|ivertex| self.coord(ivertex)).map(f),
    )
  }
}
