use crate::array_stats::{argmax_abs, cumulative_difference};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink, SeedSource};
use crate::model::{
    ActiveMask, LINE_LOG_NORM_RANGE, LINE_NPARAMS, LineParams, ParameterVector, Prediction,
    SpectrumModel, decompose,
};
use crate::nl_fit::MinimizerTrait;
use crate::selection::{SearchState, SelectionSettings};
use crate::statistic::prediction_statistic;

/// Stages of the model-complexity search over one spectrum
///
/// Every stage derives new [SearchState]s from the ones it is given. The search itself only keeps
/// the predictions of every optimized state, in the order they were computed.
pub struct Search<'a, M, S: ?Sized> {
    model: SpectrumModel<'a>,
    minimizer: &'a M,
    settings: &'a SelectionSettings,
    sink: &'a mut S,
    history: Vec<Prediction>,
}

impl<'a, M, S> Search<'a, M, S>
where
    M: MinimizerTrait,
    S: DiagnosticsSink + ?Sized,
{
    pub fn new(
        model: SpectrumModel<'a>,
        minimizer: &'a M,
        settings: &'a SelectionSettings,
        sink: &'a mut S,
    ) -> Self {
        Self {
            model,
            minimizer,
            settings,
            sink,
            history: vec![],
        }
    }

    #[inline]
    pub fn model(&self) -> &SpectrumModel<'a> {
        &self.model
    }

    #[inline]
    pub fn history(&self) -> &[Prediction] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Prediction> {
        self.history
    }

    #[inline]
    pub fn record(&mut self, event: DiagnosticEvent) {
        self.sink.record(event);
    }

    /// Minimize the statistic over the free parameters of `params`, frozen ones keep their values
    pub fn optimize(&mut self, params: ParameterVector, active: ActiveMask) -> SearchState {
        assert_eq!(params.len(), active.len());
        let free = active.free_indices();
        let x0 = params.gather(&free);
        let model = &self.model;
        let result = self
            .minimizer
            .minimize(|x| model.statistic(&params.with_free_values(&free, x)), &x0);
        let params = params.with_free_values(&free, &result.x);

        let prediction = self.model.predict(&params);
        let statistic = prediction_statistic(self.model.counts(), &prediction);
        self.history.push(prediction);
        SearchState {
            params,
            active,
            statistic,
        }
    }

    /// Better by raw statistic of the optimized decomposition and the optimized zero start
    ///
    /// Both starts share the decomposed normalization. The decomposition wins a tie.
    pub fn seed(&mut self) -> SearchState {
        let decomposed = decompose(self.model.basis(), self.model.counts());
        let zero = ParameterVector::zero_init(decomposed.log_norm(), decomposed.ncomponents());
        let active = ActiveMask::all(decomposed.len());

        let from_decomposed = self.optimize(decomposed, active.clone());
        self.sink.record(DiagnosticEvent::SeedCandidate {
            source: SeedSource::Decomposed,
            statistic: from_decomposed.statistic,
        });
        let from_zero = self.optimize(zero, active);
        self.sink.record(DiagnosticEvent::SeedCandidate {
            source: SeedSource::ZeroInit,
            statistic: from_zero.statistic,
        });

        let (source, seed) = if from_zero.statistic < from_decomposed.statistic {
            (SeedSource::ZeroInit, from_zero)
        } else {
            (SeedSource::Decomposed, from_decomposed)
        };
        self.sink.record(DiagnosticEvent::SeedSelected {
            source,
            statistic: seed.statistic,
        });
        seed
    }

    /// Freeze trailing parameters one by one, re-optimizing after each
    ///
    /// Returns the seed followed by one candidate per smaller number of free parameters, so an
    /// `N`-parameter seed gives exactly `N` candidates with `N, N - 1, ..., 1` free parameters.
    /// The normalization, parameter zero, is never frozen.
    pub fn backward_elimination(&mut self, seed: &SearchState) -> Vec<SearchState> {
        let n = seed.params.len();
        let mut candidates = Vec::with_capacity(n);
        self.record_eliminated(seed);
        candidates.push(seed.clone());
        for i in (1..n).rev() {
            let previous = &candidates[candidates.len() - 1];
            let (params, active) = (previous.params.with_zeroed(i), previous.active.with_frozen(i));
            let candidate = self.optimize(params, active);
            self.record_eliminated(&candidate);
            candidates.push(candidate);
        }
        candidates
    }

    fn record_eliminated(&mut self, state: &SearchState) {
        self.sink.record(DiagnosticEvent::Eliminated {
            nactive: state.nactive(),
            statistic: state.statistic,
            aic: state.aic(),
        });
    }

    /// Thaw frozen basis parameters in index order while AIC keeps improving
    ///
    /// Each enlargement starts from the previously tried one, with the thawed coefficient at
    /// zero. A larger model replaces the best one only if its AIC is strictly lower. Stops after
    /// `regrowth_patience` consecutive enlargements without improvement or when no basis
    /// parameter is left frozen.
    pub fn forward_regrowth(&mut self, selected: SearchState) -> SearchState {
        let mut best = selected;
        let mut trial = best.clone();
        let mut misses = 0;
        while misses < self.settings.regrowth_patience {
            let Some(next) = (0..trial.params.nbasis()).find(|&i| !trial.active.is_active(i))
            else {
                break;
            };
            let candidate =
                self.optimize(trial.params.with_zeroed(next), trial.active.with_thawed(next));
            let accepted = candidate.aic() < best.aic();
            self.sink.record(DiagnosticEvent::Regrowth {
                nactive: candidate.nactive(),
                aic: candidate.aic(),
                best_aic: best.aic(),
                accepted,
            });
            if accepted {
                best = candidate.clone();
                misses = 0;
            } else {
                misses += 1;
            }
            trial = candidate;
        }
        best
    }

    /// Greedily add Gaussian lines at the largest cumulative residual
    ///
    /// At most `max_line_rounds` rounds. A round is kept only if it strictly lowers AIC, the
    /// first rejected round ends the stage and its line is discarded.
    pub fn inject_lines(&mut self, start: SearchState) -> SearchState {
        let mut best = start;
        for round in 1..=self.settings.max_line_rounds {
            let Some(line) = propose_line(&self.model, &best.params, self.settings) else {
                break;
            };
            self.sink.record(DiagnosticEvent::LineProposed {
                round,
                center: line.center,
                log_norm: line.log_norm,
            });

            let candidate = self.optimize(
                best.params.with_line(line),
                best.active.with_appended(LINE_NPARAMS),
            );
            let accepted = candidate.aic() < best.aic();
            self.sink.record(DiagnosticEvent::LineRound {
                round,
                aic: candidate.aic(),
                best_aic: best.aic(),
                accepted,
            });
            if !accepted {
                break;
            }
            best = candidate;
        }
        best
    }
}

/// New line near the channel where cumulative data and cumulative prediction differ the most
///
/// The cumulative difference peaks either at the excess channel itself or just before it, so
/// the line is centered on whichever of the two has the larger per-channel residual. The line
/// carries the absolute value of the cumulative difference as its counts, clamped into the line
/// normalization domain. `None` if the prediction is undefined or matches the data exactly.
pub fn propose_line(
    model: &SpectrumModel,
    params: &ParameterVector,
    settings: &SelectionSettings,
) -> Option<LineParams> {
    let prediction = model.predict(params);
    let pred = prediction.valid()?;
    let counts = model.counts();
    let difference = cumulative_difference(counts, pred.view());
    let peak = argmax_abs(difference.view())?;
    let excess = difference[peak].abs();
    if !(excess.is_finite() && excess > 0.0) {
        return None;
    }
    let residual = |i: usize| (counts[i] - pred[i]).abs();
    let channel = if peak + 1 < counts.len() && residual(peak + 1) > residual(peak) {
        peak + 1
    } else {
        peak
    };
    let (lower, upper) = LINE_LOG_NORM_RANGE;
    Some(settings.line_at(channel as f64, excess.log10().clamp(lower, upper)))
}
