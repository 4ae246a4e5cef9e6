use super::{CellIdx, FacetIdx, Mesh, VertexIdx};
use crate::Coord;

use itertools::Itertools;

impl Mesh {
  pub fn has_boundary(&self) -> bool {
    !self.boundary_facets().is_empty()
  }

  /// The boundary consists of the facets (edges) that have exactly one
  /// cell as parent.
  pub fn boundary_facets(&self) -> Vec<FacetIdx> {
    self
      .facets()
      .iter()
      .enumerate()
      .filter(|(_, facet)| facet.is_boundary())
      .map(|(ifacet, _)| ifacet)
      .collect()
  }

  /// Boundary facets whose both end points satisfy `predicate`.
  pub fn locate_boundary_facets<P>(&self, predicate: P) -> Vec<FacetIdx>
  where
    P: Fn(Coord) -> bool,
  {
    self
      .boundary_facets()
      .into_iter()
      .filter(|&ifacet| {
        self
          .facet(ifacet)
          .vertices()
          .iter()
          .all(|&ivertex| predicate(self.coord(ivertex)))
      })
      .collect()
  }

  /// The vertices that lie on the boundary of the mesh, in increasing order.
  pub fn boundary_vertices(&self) -> Vec<VertexIdx> {
    self
      .boundary_facets()
      .into_iter()
      .flat_map(|ifacet| self.facet(ifacet).vertices())
      .sorted_unstable()
      .dedup()
      .collect()
  }

  pub fn flag_boundary_vertices(&self) -> Vec<bool> {
    let mut flags = vec![false; self.nvertices()];
    self
      .boundary_vertices()
      .into_iter()
      .for_each(|ivertex| flags[ivertex] = true);
    flags
  }

  pub fn boundary_cells(&self) -> Vec<CellIdx> {
    self
      .boundary_facets()
      .into_iter()
      // the boundary has only one parent cell by definition
      .map(|ifacet| self.facet(ifacet).parent_cells()[0])
      .sorted_unstable()
      .dedup()
      .collect()
  }
}

#[cfg(test)]
mod test {
  use crate::mesh::Mesh;

  #[test]
  fn unit_square_boundary() {
    let mesh = Mesh::unit_square(2, 2).unwrap();
    assert!(mesh.has_boundary());
    assert_eq!(mesh.boundary_facets().len(), 8);
    assert_eq!(mesh.boundary_vertices(), vec![0, 1, 2, 3, 5, 6, 7, 8]);

    let flags = mesh.flag_boundary_vertices();
    assert!(!flags[4]);
    assert_eq!(flags.iter().filter(|&&f| f).count(), 8);

    // the two cells along the anti-diagonal only touch the boundary in a vertex
    assert_eq!(mesh.boundary_cells(), vec![0, 1, 2, 5, 6, 7]);
  }

  #[test]
  fn locate_left_boundary() {
    let mesh = Mesh::unit_square(3, 2).unwrap();
    let left = mesh.locate_boundary_facets(|x| x[0].abs() < 1e-12);
    assert_eq!(left.len(), 2);
    for ifacet in left {
      for ivertex in mesh.facet(ifacet).vertices() {
        assert_eq!(mesh.coord(ivertex)[0], 0.0);
      }
    }
    let all = mesh.locate_boundary_facets(|_| true);
    assert_eq!(all, mesh.boundary_facets());
  }
}
