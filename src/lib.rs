//! Finite element solver for the Poisson equation on triangulated 2D domains.
//!
//! The pipeline is mesh → function space → assembly → Dirichlet elimination →
//! sparse solve → error evaluation. Every stage lives in its own module and
//! communicates through index-based (arena style) data.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod bc;
pub mod config;
pub mod error;
pub mod fe;
pub mod function;
pub mod linalg;
pub mod mesh;
pub mod norms;
pub mod problems;
pub mod quadrature;
pub mod space;
pub mod sparse;

pub use error::{FemError, FemResult};

/// A point or vector in the plane.
pub type Coord = na::Vector2<f64>;
