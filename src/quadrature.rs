//! Quadrature rules on the reference triangle with vertices
//! $(0,0), (1,0), (0,1)$.
//!
//! All rules have positive weights that sum to the reference area $1/2$.

use crate::{Coord, FemError, FemResult};

use once_cell::sync::Lazy;

/// A quadrature rule defined on the reference triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadRule {
  /// Highest total polynomial degree that is integrated exactly.
  strength: usize,
  nodes: Vec<Coord>,
  weights: Vec<f64>,
}

/// Rules in increasing strength.
static TRIANGLE_RULES: Lazy<[QuadRule; 4]> = Lazy::new(|| {
  [
    centroid_rule(),
    edge_interior_rule(),
    dunavant_rule4(),
    dunavant_rule5(),
  ]
});

impl QuadRule {
  fn new(strength: usize, nodes: Vec<Coord>, weights: Vec<f64>) -> Self {
    assert_eq!(nodes.len(), weights.len());
    Self {
      strength,
      nodes,
      weights,
    }
  }

  /// The cheapest rule integrating polynomials of total degree `strength`
  /// exactly.
  ///
  /// Fails with [`FemError::UnsupportedQuadrature`] above the strongest
  /// available rule.
  pub fn triangle(strength: usize) -> FemResult<&'static QuadRule> {
    let rules = &*TRIANGLE_RULES;
    rules
      .iter()
      .find(|rule| rule.strength >= strength)
      .ok_or(FemError::UnsupportedQuadrature {
        requested: strength,
        available: Self::max_strength(),
      })
  }

  /// Strength of the strongest available rule.
  pub fn max_strength() -> usize {
    TRIANGLE_RULES[TRIANGLE_RULES.len() - 1].strength
  }

  pub fn strength(&self) -> usize {
    self.strength
  }
  pub fn npoints(&self) -> usize {
    self.nodes.len()
  }
  pub fn nodes(&self) -> &[Coord] {
    &self.nodes
  }
  pub fn weights(&self) -> &[f64] {
    &self.weights
  }
  pub fn iter(&self) -> impl Iterator<Item = (&Coord, f64)> + '_ {
    self.nodes.iter().zip(self.weights.iter().copied())
  }

  /// Integrates `f` over the reference triangle.
  pub fn apply_ref<F>(&self, f: F) -> f64
  where
    F: Fn(&Coord) -> f64,
  {
    self.iter().map(|(node, w)| w * f(node)).sum()
  }
}

fn centroid_rule() -> QuadRule {
  QuadRule::new(1, vec![Coord::new(1.0 / 3.0, 1.0 / 3.0)], vec![0.5])
}

fn edge_interior_rule() -> QuadRule {
  let a = 1.0 / 6.0;
  let b = 2.0 / 3.0;
  QuadRule::new(
    2,
    vec![Coord::new(a, a), Coord::new(b, a), Coord::new(a, b)],
    vec![1.0 / 6.0; 3],
  )
}

/// Orbit of the three points with barycentric coordinates `(1-2a, a, a)`.
fn symmetric_orbit(a: f64) -> [Coord; 3] {
  let b = 1.0 - 2.0 * a;
  [Coord::new(a, a), Coord::new(b, a), Coord::new(a, b)]
}

/// Dunavant's 6 point rule.
fn dunavant_rule4() -> QuadRule {
  let orbits = [
    (0.445_948_490_915_965, 0.223_381_589_678_011),
    (0.091_576_213_509_771, 0.109_951_743_655_322),
  ];
  let mut nodes = Vec::with_capacity(6);
  let mut weights = Vec::with_capacity(6);
  for (a, w) in orbits {
    nodes.extend(symmetric_orbit(a));
    weights.extend([0.5 * w; 3]);
  }
  QuadRule::new(4, nodes, weights)
}

/// Dunavant's 7 point rule.
fn dunavant_rule5() -> QuadRule {
  let orbits = [
    (0.470_142_064_105_115, 0.132_394_152_788_506),
    (0.101_286_507_323_456, 0.125_939_180_544_827),
  ];
  let mut nodes = vec![Coord::new(1.0 / 3.0, 1.0 / 3.0)];
  let mut weights = vec![0.5 * 0.225];
  for (a, w) in orbits {
    nodes.extend(symmetric_orbit(a));
    weights.extend([0.5 * w; 3]);
  }
  QuadRule::new(5, nodes, weights)
}
