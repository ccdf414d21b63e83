use crate::model::{LINE_LOG_SIGMA_MIN, LineParams};

use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

macro_const! {
    const DOC: &str = r#"
Bounds of the greedy model-complexity search

- `regrowth_patience`: how many consecutive basis-coefficient enlargements without an AIC
  improvement are tried before forward regrowth stops
- `max_line_rounds`: maximum number of Gaussian line injection rounds
- `line_init_log_sigma`: decimal logarithm of the width, in channels, every proposed line starts
  from
"#;
}

#[doc = DOC!()]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SelectionSettings {
    pub regrowth_patience: usize,
    pub max_line_rounds: usize,
    pub line_init_log_sigma: f64,
}

impl SelectionSettings {
    pub fn new(regrowth_patience: usize, max_line_rounds: usize, line_init_log_sigma: f64) -> Self {
        assert!(
            line_init_log_sigma.is_finite() && line_init_log_sigma >= LINE_LOG_SIGMA_MIN,
            "line_init_log_sigma must be finite and not below {LINE_LOG_SIGMA_MIN}"
        );
        Self {
            regrowth_patience,
            max_line_rounds,
            line_init_log_sigma,
        }
    }

    #[inline]
    pub fn default_regrowth_patience() -> usize {
        3
    }

    #[inline]
    pub fn default_max_line_rounds() -> usize {
        10
    }

    /// One channel
    #[inline]
    pub fn default_line_init_log_sigma() -> f64 {
        0.0
    }

    pub const fn doc() -> &'static str {
        DOC
    }

    /// Line proposal at `center` carrying `log_norm` counts with the configured initial width
    pub(super) fn line_at(&self, center: f64, log_norm: f64) -> LineParams {
        LineParams {
            center,
            log_sigma: self.line_init_log_sigma,
            log_norm,
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self::new(
            Self::default_regrowth_patience(),
            Self::default_max_line_rounds(),
            Self::default_line_init_log_sigma(),
        )
    }
}
