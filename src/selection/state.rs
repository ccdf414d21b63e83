use crate::model::{ActiveMask, ParameterVector};
use crate::statistic::aic;

/// Immutable point of the model-complexity search
///
/// `statistic` is always the statistic of `params`, and `active` marks which entries of `params`
/// were free when it was optimized.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchState {
    pub params: ParameterVector,
    pub active: ActiveMask,
    pub statistic: f64,
}

impl SearchState {
    #[inline]
    pub fn nactive(&self) -> usize {
        self.active.count()
    }

    #[inline]
    pub fn aic(&self) -> f64 {
        aic(self.statistic, self.nactive())
    }
}

/// Candidate of minimum AIC, the one with fewer free parameters on a tie
///
/// Among candidates equal in both, the first one wins. `None` for an empty slice.
pub fn select_min_aic(candidates: &[SearchState]) -> Option<&SearchState> {
    candidates.iter().min_by(|a, b| {
        a.aic()
            .total_cmp(&b.aic())
            .then_with(|| a.nactive().cmp(&b.nactive()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(nactive: usize, statistic: f64) -> SearchState {
        SearchState {
            params: ParameterVector::zero_init(1.0, 4),
            active: ActiveMask::prefix(5, nactive),
            statistic,
        }
    }

    #[test]
    fn minimum_aic_wins() {
        let candidates = [state(5, 100.0), state(4, 101.0), state(3, 110.0)];
        // AIC: 110, 109, 116
        assert_eq!(select_min_aic(&candidates).unwrap().nactive(), 4);
    }

    #[test]
    fn tie_prefers_fewer_parameters() {
        // both have AIC 110
        let candidates = [state(5, 100.0), state(4, 102.0)];
        assert_eq!(select_min_aic(&candidates).unwrap().nactive(), 4);
        let reversed = [state(4, 102.0), state(5, 100.0)];
        assert_eq!(select_min_aic(&reversed).unwrap().nactive(), 4);
    }

    #[test]
    fn empty() {
        assert!(select_min_aic(&[]).is_none());
    }
}
