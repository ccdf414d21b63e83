//! Greedy model-complexity search over basis coefficients and Gaussian lines

mod engine;
pub use engine::{FitResult, ModelSelection, fit_background};

mod search;
pub use search::{Search, propose_line};

mod settings;
pub use settings::SelectionSettings;

mod state;
pub use state::{SearchState, select_min_aic};
