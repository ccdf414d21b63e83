//! Derivative-free local minimization used by the background fit
//!
//! The fit only ever asks for "the best point near `x0`" of a scalar objective over the
//! currently free parameters. Frozen parameters are handled by the caller, which packs the free
//! values into a dense slice and scatters them back, so minimizers never see masks or bounds.
//! Bounds are part of the objective: points outside the model domain evaluate to a fixed worst
//! statistic.

mod bounds;
pub use bounds::within_bounds;

pub mod minimizer;
pub use minimizer::{MinimizeResult, Minimizer, MinimizerTrait};

pub mod nelder_mead;
pub use nelder_mead::NelderMeadMinimizer;
