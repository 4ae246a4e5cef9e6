use super::{CellIdx, Mesh, VertexIdx, NVERTICES_PER_CELL};
use crate::{Coord, FemError, FemResult};

/// Structured triangulation of an axis-aligned rectangle.
///
/// Vertices are numbered row-major (`x` fastest). Every box is split into two
/// counter-clockwise triangles along its lower-left to upper-right diagonal.
#[derive(Debug, Clone)]
pub struct RectangleMeshInfo {
  min: Coord,
  max: Coord,
  nx: usize,
  ny: usize,
}

// constructors
impl RectangleMeshInfo {
  pub fn new_min_max(min: Coord, max: Coord, nx: usize, ny: usize) -> FemResult<Self> {
    if nx < 1 || ny < 1 {
      return Err(FemError::InvalidMeshParameters(format!(
        "subdivision counts must be at least 1, got nx={nx}, ny={ny}"
      )));
    }
    let valid_extent = (0..2).all(|d| min[d].is_finite() && max[d].is_finite() && min[d] < max[d]);
    if !valid_extent {
      return Err(FemError::InvalidMeshParameters(format!(
        "empty rectangle [{}, {}] x [{}, {}]",
        min[0], max[0], min[1], max[1]
      )));
    }
    Ok(Self { min, max, nx, ny })
  }
  pub fn new_unit(nx: usize, ny: usize) -> FemResult<Self> {
    Self::new_min_max(Coord::zeros(), Coord::from_element(1.0), nx, ny)
  }
}

// getters
impl RectangleMeshInfo {
  pub fn min(&self) -> Coord {
    self.min
  }
  pub fn max(&self) -> Coord {
    self.max
  }
  pub fn side_lengths(&self) -> Coord {
    self.max - self.min
  }
  pub fn nboxes(&self) -> usize {
    self.nx * self.ny
  }
  pub fn nvertices(&self) -> usize {
    (self.nx + 1) * (self.ny + 1)
  }
  pub fn ncells(&self) -> usize {
    2 * self.nboxes()
  }

  /// converts cartesian vertex index to linear vertex index
  pub fn vertex_idx(&self, i: usize, j: usize) -> VertexIdx {
    j * (self.nx + 1) + i
  }
  /// converts linear vertex index to cartesian vertex index
  pub fn vertex_cart_idx(&self, ivertex: VertexIdx) -> [usize; 2] {
    [ivertex % (self.nx + 1), ivertex / (self.nx + 1)]
  }

  pub fn vertex_pos(&self, ivertex: VertexIdx) -> Coord {
    let [i, j] = self.vertex_cart_idx(ivertex);
    let rel = Coord::new(i as f64 / self.nx as f64, j as f64 / self.ny as f64);
    self.min + rel.component_mul(&self.side_lengths())
  }

  pub fn is_vertex_on_boundary(&self, ivertex: VertexIdx) -> bool {
    let [i, j] = self.vertex_cart_idx(ivertex);
    i == 0 || i == self.nx || j == 0 || j == self.ny
  }

  /// The two cells making up box `(i, j)`, lower one first.
  pub fn box_cells(&self, i: usize, j: usize) -> [CellIdx; 2] {
    let ibox = j * self.nx + i;
    [2 * ibox, 2 * ibox + 1]
  }
}

impl RectangleMeshInfo {
  pub fn compute_vertex_coords(&self) -> na::Matrix2xX<f64> {
    let mut coords = na::Matrix2xX::zeros(self.nvertices());
    for (ivertex, mut coord) in coords.column_iter_mut().enumerate() {
      coord.copy_from(&self.vertex_pos(ivertex));
    }
    coords
  }

  pub fn compute_cells(&self) -> Vec<[VertexIdx; NVERTICES_PER_CELL]> {
    let mut cells = Vec::with_capacity(self.ncells());
    for j in 0..self.ny {
      for i in 0..self.nx {
        let v00 = self.vertex_idx(i, j);
        let v10 = self.vertex_idx(i + 1, j);
        let v01 = self.vertex_idx(i, j + 1);
        let v11 = self.vertex_idx(i + 1, j + 1);
        cells.push([v00, v10, v11]);
        cells.push([v00, v11, v01]);
      }
    }
    cells
  }

  pub fn compute_mesh(&self) -> FemResult<Mesh> {
    let mesh = Mesh::new(self.compute_vertex_coords(), self.compute_cells())?;
    tracing::debug!(
      nvertices = mesh.nvertices(),
      ncells = mesh.ncells(),
      nfacets = mesh.nfacets(),
      "generated rectangle mesh"
    );
    Ok(mesh)
  }
}

#[cfg(test)]
mod test {
  use super::RectangleMeshInfo;
  use crate::{mesh::Mesh, Coord, FemError};

  #[test]
  fn unit_square_mesh() {
    let mesh = Mesh::unit_square(2, 2).unwrap();
    #[rustfmt::skip]
    let expected_coords = na::Matrix2xX::from_column_slice(&[
      0.0, 0.0,
      0.5, 0.0,
      1.0, 0.0,
      0.0, 0.5,
      0.5, 0.5,
      1.0, 0.5,
      0.0, 1.0,
      0.5, 1.0,
      1.0, 1.0,
    ]);
    assert_eq!(*mesh.vertex_coords(), expected_coords);
    let expected_cells = vec![
      [0, 1, 4],
      [0, 4, 3],
      [1, 2, 5],
      [1, 5, 4],
      [3, 4, 7],
      [3, 7, 6],
      [4, 5, 8],
      [4, 8, 7],
    ];
    assert_eq!(mesh.cells(), expected_cells.as_slice());
  }

  #[test]
  fn cells_are_counter_clockwise() {
    let mesh = RectangleMeshInfo::new_min_max(Coord::new(-1.0, 2.0), Coord::new(3.0, 2.5), 4, 3)
      .unwrap()
      .compute_mesh()
      .unwrap();
    for icell in 0..mesh.ncells() {
      let [v0, v1, v2] = mesh.cell_coords(icell);
      let jacobian = na::Matrix2::from_columns(&[v1 - v0, v2 - v0]);
      assert!(jacobian.determinant() > 0.0);
    }
  }

  #[test]
  fn counts_and_boundary() {
    for nx in 1..=5 {
      for ny in 1..=5 {
        let info = RectangleMeshInfo::new_unit(nx, ny).unwrap();
        let mesh = info.compute_mesh().unwrap();
        assert_eq!(mesh.nvertices(), (nx + 1) * (ny + 1));
        assert_eq!(mesh.ncells(), 2 * nx * ny);
        assert_eq!(mesh.boundary_facets().len(), 2 * (nx + ny));
        let boundary_vertices: Vec<_> = (0..info.nvertices())
          .filter(|&v| info.is_vertex_on_boundary(v))
          .collect();
        assert_eq!(mesh.boundary_vertices(), boundary_vertices);
      }
    }
  }

  #[test]
  fn box_cells_numbering() {
    let info = RectangleMeshInfo::new_unit(3, 2).unwrap();
    let cells = info.compute_cells();
    let [lower, upper] = info.box_cells(2, 1);
    let v00 = info.vertex_idx(2, 1);
    assert_eq!(cells[lower][0], v00);
    assert_eq!(cells[upper][0], v00);
    assert_eq!(info.vertex_cart_idx(v00), [2, 1]);
  }

  #[test]
  fn invalid_parameters() {
    assert!(matches!(
      Mesh::unit_square(0, 3),
      Err(FemError::InvalidMeshParameters(_))
    ));
    assert!(matches!(
      Mesh::unit_square(3, 0),
      Err(FemError::InvalidMeshParameters(_))
    ));
    assert!(matches!(
      RectangleMeshInfo::new_min_max(Coord::new(1.0, 0.0), Coord::new(1.0, 1.0), 2, 2),
      Err(FemError::InvalidMeshParameters(_))
    ));
  }
}
