use crate::nl_fit::nelder_mead::NelderMeadMinimizer;

use enum_dispatch::enum_dispatch;
use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

macro_const! {
    const MINIMIZER_DOC: &'static str = r"Local minimizer of a scalar objective over free parameters

Implementations must be deterministic, must never return a point with a larger objective value
than the starting point, and must return the starting point unchanged when there are no free
parameters.
";
}

/// Best point found by a [MinimizerTrait] implementation
#[derive(Clone, Debug, PartialEq)]
pub struct MinimizeResult {
    pub x: Vec<f64>,
    pub value: f64,
}

#[doc = MINIMIZER_DOC!()]
#[enum_dispatch]
pub trait MinimizerTrait: Clone + Debug {
    fn minimize<F>(&self, objective: F, x0: &[f64]) -> MinimizeResult
    where
        F: Fn(&[f64]) -> f64;
}

#[doc = MINIMIZER_DOC!()]
#[enum_dispatch(MinimizerTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Minimizer {
    NelderMead(NelderMeadMinimizer),
}

impl Minimizer {
    pub fn nelder_mead() -> Self {
        Self::NelderMead(NelderMeadMinimizer::default())
    }
}

impl Default for Minimizer {
    fn default() -> Self {
        Self::nelder_mead()
    }
}
