//! Entry points solving discrete variational problems end to end.

pub mod poisson;

use crate::{
  assemble,
  bc::DirichletBc,
  config::FemConfig,
  fe::{BilinearForm, LinearForm},
  function::FeFunction,
  space::FeSpace,
  FemResult,
};

/// Solves: find $u_h in V_h$ with $u_h = g$ on the constrained DOFs and
/// $a(u_h, v) = l(v)$ for all $v$ vanishing on them.
pub fn solve_variational<'s>(
  space: &'s FeSpace,
  bilinear: &impl BilinearForm,
  linear: &impl LinearForm,
  bc: &DirichletBc,
  config: &FemConfig,
) -> FemResult<FeFunction<'s>> {
  let _span = tracing::info_span!(
    "solve_variational",
    ncells = space.mesh().ncells(),
    ndofs = space.ndofs()
  )
  .entered();

  bc.check_ndofs(space.ndofs())?;
  let mut system = assemble::assemble_system(space, bilinear, linear, &config.assembly)?;
  bc.apply(&mut system)?;
  tracing::debug!(
    nconstrained = bc.len(),
    nnz = system.galmat.nnz(),
    "enforced dirichlet conditions"
  );

  let coeffs = system.solve(&config.solver)?;
  FeFunction::from_coeffs(space, coeffs)
}
