use crate::nl_fit::minimizer::{MinimizeResult, MinimizerTrait};

use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use ordered_float::NotNan;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Nelder-Mead downhill simplex minimizer
///
/// Derivative-free. The initial simplex is built around the starting point: each vertex moves
/// one coordinate by `nonzero_delta` times its value, or by `zero_delta` if the coordinate is
/// zero. The search stops when the standard deviation of the simplex costs falls below
/// `sd_tolerance` or after `max_iters` iterations. Both cases are reported the same way: the
/// result is the best vertex found within the budget, not necessarily a local minimum.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "NelderMead")]
pub struct NelderMeadMinimizer {
    pub max_iters: u64,
    pub sd_tolerance: NotNan<f64>,
    pub nonzero_delta: NotNan<f64>,
    pub zero_delta: NotNan<f64>,
}

impl NelderMeadMinimizer {
    /// Create a new [NelderMeadMinimizer].
    ///
    /// # Arguments
    /// - `max_iters`: maximum number of simplex iterations
    /// - `sd_tolerance`: convergence threshold on the spread of the simplex costs
    /// - `nonzero_delta`: relative initial step of non-zero coordinates
    /// - `zero_delta`: absolute initial step of zero coordinates
    pub fn new(max_iters: u64, sd_tolerance: f64, nonzero_delta: f64, zero_delta: f64) -> Self {
        assert!(max_iters > 0, "max_iters must be positive");
        assert!(sd_tolerance >= 0.0, "sd_tolerance must be non-negative");
        assert!(sd_tolerance.is_finite(), "sd_tolerance must be finite");
        assert!(nonzero_delta > 0.0, "nonzero_delta must be positive");
        assert!(zero_delta > 0.0, "zero_delta must be positive");
        Self {
            max_iters,
            sd_tolerance: NotNan::new(sd_tolerance).expect("sd_tolerance must be not NaN"),
            nonzero_delta: NotNan::new(nonzero_delta).expect("nonzero_delta must be not NaN"),
            zero_delta: NotNan::new(zero_delta).expect("zero_delta must be not NaN"),
        }
    }

    #[inline]
    pub fn default_max_iters() -> u64 {
        2000
    }

    #[inline]
    pub fn default_sd_tolerance() -> f64 {
        1e-8
    }

    #[inline]
    pub fn default_nonzero_delta() -> f64 {
        0.05
    }

    #[inline]
    pub fn default_zero_delta() -> f64 {
        0.00025
    }

    fn initial_simplex(&self, x0: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(x0.len() + 1);
        simplex.push(x0.to_vec());
        for i in 0..x0.len() {
            let mut vertex = x0.to_vec();
            vertex[i] = if vertex[i] != 0.0 {
                vertex[i] * (1.0 + self.nonzero_delta.into_inner())
            } else {
                self.zero_delta.into_inner()
            };
            simplex.push(vertex);
        }
        simplex
    }
}

impl Default for NelderMeadMinimizer {
    fn default() -> Self {
        Self::new(
            Self::default_max_iters(),
            Self::default_sd_tolerance(),
            Self::default_nonzero_delta(),
            Self::default_zero_delta(),
        )
    }
}

struct Objective<'a, F> {
    function: &'a F,
}

impl<F> CostFunction for Objective<'_, F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, ArgminError> {
        Ok((self.function)(x))
    }
}

impl MinimizerTrait for NelderMeadMinimizer {
    fn minimize<F>(&self, objective: F, x0: &[f64]) -> MinimizeResult
    where
        F: Fn(&[f64]) -> f64,
    {
        let initial = MinimizeResult {
            x: x0.to_vec(),
            value: objective(x0),
        };
        if x0.is_empty() {
            return initial;
        }

        let solver = match NelderMead::new(self.initial_simplex(x0))
            .with_sd_tolerance(self.sd_tolerance.into_inner())
        {
            Ok(solver) => solver,
            Err(_) => return initial,
        };
        let result = Executor::new(
            Objective {
                function: &objective,
            },
            solver,
        )
        .configure(|state| state.max_iters(self.max_iters))
        .run();

        let best = match result {
            Ok(result) => {
                let state = result.state();
                state.get_best_param().cloned().map(|x| MinimizeResult {
                    value: state.get_best_cost(),
                    x,
                })
            }
            Err(_) => None,
        };
        match best {
            Some(best) if best.value <= initial.value => best,
            _ => initial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    serde_json_test!(
        nelder_mead_serde,
        NelderMeadMinimizer,
        NelderMeadMinimizer::new(100, 1e-6, 0.1, 0.01)
    );

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2)
    }

    #[test]
    fn simple_quadratic() {
        let center = [1.0, -2.0, 0.5];
        let quadratic = |x: &[f64]| {
            x.iter()
                .zip(center.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
        };

        let minimizer = NelderMeadMinimizer::new(5000, 1e-14, 0.05, 0.1);
        let result = minimizer.minimize(quadratic, &[0.0, 0.0, 0.0]);

        assert_abs_diff_eq!(&result.x[..], &center[..], epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn rosenbrock_valley() {
        let minimizer = NelderMeadMinimizer::new(10_000, 1e-16, 0.05, 0.00025);
        let result = minimizer.minimize(rosenbrock, &[-1.2, 1.0]);
        assert_abs_diff_eq!(&result.x[..], &[1.0, 1.0][..], epsilon = 1e-2);
    }

    #[test]
    fn never_worse_than_start() {
        let minimizer = NelderMeadMinimizer::new(3, 1e-8, 0.05, 0.00025);
        let x0 = [-1.2, 1.0];
        let result = minimizer.minimize(rosenbrock, &x0);
        assert!(result.value <= rosenbrock(&x0));
        assert_eq!(result.value, rosenbrock(&result.x));
    }

    #[test]
    fn empty_parameter_vector() {
        let result = NelderMeadMinimizer::default().minimize(|_| 42.0, &[]);
        assert!(result.x.is_empty());
        assert_eq!(result.value, 42.0);
    }

    #[test]
    fn simplex_steps() {
        let minimizer = NelderMeadMinimizer::default();
        let simplex = minimizer.initial_simplex(&[2.0, 0.0]);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0], vec![2.0, 0.0]);
        assert_abs_diff_eq!(simplex[1][0], 2.1, epsilon = 1e-12);
        assert_eq!(simplex[2], vec![2.0, 0.00025]);
    }
}
