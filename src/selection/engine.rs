use crate::basis::{BasisLibrary, BasisModel};
use crate::data::{ChannelRange, SpectrumSample};
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};
use crate::error::{BackgroundError, SpectrumError};
use crate::model::{ActiveMask, ParameterVector, Prediction, SpectrumModel};
use crate::nl_fit::{Minimizer, MinimizerTrait};
use crate::selection::{Search, SelectionSettings, select_min_aic};

use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

macro_const! {
    const DOC: &str = r#"
Greedy AIC-guided background fit of one spectrum

The observed counts over the active channel range of the basis are fitted in four stages, each
one driven by the `minimizer` and compared by $\mathrm{AIC} = \mathrm{statistic} + 2k$, where $k$
is the number of free parameters:

1. seed: the linear decomposition and an all-zero start are optimized, the lower statistic wins
2. backward elimination: trailing basis coefficients are frozen at zero one at a time and the
   candidate of minimum AIC is selected, fewer free parameters win a tie
3. forward regrowth: frozen coefficients are thawed again while AIC strictly improves, with a
   patience of `settings.regrowth_patience` failed attempts
4. line injection: Gaussian lines are added at the largest cumulative residual while AIC strictly
   improves, at most `settings.max_line_rounds` times

The fit never fails once the spectrum covers the basis channel range, in the worst case the
result is a line-free model with a single free parameter.
"#;
}

#[doc = DOC!()]
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ModelSelection<M = Minimizer> {
    pub settings: SelectionSettings,
    pub minimizer: M,
}

impl<M> ModelSelection<M>
where
    M: MinimizerTrait,
{
    pub fn new(settings: SelectionSettings, minimizer: M) -> Self {
        Self {
            settings,
            minimizer,
        }
    }

    pub const fn doc() -> &'static str {
        DOC
    }

    /// Fit `sample` with `basis`
    ///
    /// Fails only if the spectrum has fewer channels than the basis range requires.
    pub fn fit<S>(
        &self,
        basis: &BasisModel,
        sample: &SpectrumSample,
        sink: &mut S,
    ) -> Result<FitResult, SpectrumError>
    where
        S: DiagnosticsSink + ?Sized,
    {
        let range = basis.range();
        let counts = sample.active_counts(range.ilo, range.ihi)?;
        let mut search = Search::new(
            SpectrumModel::new(basis, counts),
            &self.minimizer,
            &self.settings,
            sink,
        );

        let seed = search.seed();
        let candidates = search.backward_elimination(&seed);
        let selected = select_min_aic(&candidates)
            .expect("backward elimination always records the seed")
            .clone();
        search.record(DiagnosticEvent::BackwardSelected {
            nactive: selected.nactive(),
            aic: selected.aic(),
        });
        let regrown = search.forward_regrowth(selected);
        let best = search.inject_lines(regrown);

        let prediction = search.model().predict(&best.params);
        search.record(DiagnosticEvent::Finished {
            nactive: best.nactive(),
            nlines: best.params.nlines(),
            statistic: best.statistic,
            aic: best.aic(),
        });

        Ok(FitResult {
            aic: best.aic(),
            params: best.params,
            active: best.active,
            statistic: best.statistic,
            prediction,
            history: search.into_history(),
            range,
        })
    }
}

/// Outcome of [ModelSelection::fit]
#[derive(Clone, Debug)]
pub struct FitResult {
    pub params: ParameterVector,
    pub active: ActiveMask,
    pub statistic: f64,
    pub aic: f64,
    /// Predicted counts over `range` of the final state
    pub prediction: Prediction,
    /// Prediction of every optimized state, in search order
    pub history: Vec<Prediction>,
    pub range: ChannelRange,
}

impl FitResult {
    #[inline]
    pub fn nactive(&self) -> usize {
        self.active.count()
    }

    #[inline]
    pub fn nlines(&self) -> usize {
        self.params.nlines()
    }
}

/// Find the basis matching `sample` in `library` and fit the spectrum with it
///
/// A missing basis is fatal, there is no fallback model.
pub fn fit_background<M, S>(
    library: &BasisLibrary,
    sample: &SpectrumSample,
    selection: &ModelSelection<M>,
    sink: &mut S,
) -> Result<FitResult, BackgroundError>
where
    M: MinimizerTrait,
    S: DiagnosticsSink + ?Sized,
{
    let key = sample.key();
    let basis = library.load(&key)?;
    tracing::debug!(%key, ncomponents = basis.ncomponents(), "fitting background");
    Ok(selection.fit(&basis, sample, sink)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BasisBuilder, BasisKey};
    use crate::data::SpectrumHeader;
    use crate::diagnostics::EventLog;
    use crate::error::LibraryError;
    use crate::statistic::OUT_OF_DOMAIN_STATISTIC;
    use crate::tests::{
        StartingPointMinimizer, synthetic_corpus, synthetic_spectrum, with_gaussian_line,
    };

    serde_json_test!(
        selection_serde,
        ModelSelection,
        ModelSelection::new(
            SelectionSettings::new(1, 5, 0.5),
            Minimizer::NelderMead(crate::nl_fit::NelderMeadMinimizer::new(500, 1e-6, 0.1, 0.01)),
        )
    );

    check_doc_static_method!(selection_doc, ModelSelection);

    fn default_selection() -> ModelSelection {
        ModelSelection::default()
    }

    fn header() -> SpectrumHeader {
        SpectrumHeader::new("Synthetic", Some("Detector".to_owned()))
    }

    #[test]
    fn full_fit_of_synthetic_spectrum() {
        let corpus = synthetic_corpus(60, 48, 0);
        let basis = BasisBuilder::new(4).build(&corpus, &mut ()).unwrap();
        let sample = SpectrumSample::new(synthetic_spectrum(48, 1), header());

        let mut log = EventLog::default();
        let fit = default_selection().fit(&basis, &sample, &mut log).unwrap();

        assert_eq!(fit.range, basis.range());
        let prediction = fit.prediction.valid().unwrap();
        assert_eq!(prediction.len(), basis.nchannels());
        assert!(fit.statistic < OUT_OF_DOMAIN_STATISTIC);
        assert_eq!(fit.aic, fit.statistic + 2.0 * fit.nactive() as f64);
        assert!(fit.nlines() <= 10);
        assert!(!fit.history.is_empty());

        let selected_aic = log
            .events()
            .iter()
            .find_map(|e| match e {
                DiagnosticEvent::BackwardSelected { aic, .. } => Some(*aic),
                _ => None,
            })
            .unwrap();
        assert!(fit.aic <= selected_aic);
        assert!(matches!(
            log.events().last(),
            Some(DiagnosticEvent::Finished { .. })
        ));
    }

    #[test]
    fn strong_line_is_injected() {
        let corpus = synthetic_corpus(60, 64, 10);
        let basis = BasisBuilder::new(3).build(&corpus, &mut ()).unwrap();
        let counts = with_gaussian_line(&synthetic_spectrum(64, 11), 40.0, 1.0, 3000.0);
        let sample = SpectrumSample::new(counts, header());

        let fit = default_selection().fit(&basis, &sample, &mut ()).unwrap();
        assert!(fit.nlines() >= 1);
        let range = fit.range;
        let found = fit
            .params
            .lines()
            .any(|line| (line.center + range.ilo as f64 - 40.0).abs() < 2.0);
        assert!(found, "{:?}", fit.params);
    }

    #[test]
    fn stub_minimizer_fit_is_total() {
        let corpus = synthetic_corpus(30, 32, 2);
        let basis = BasisBuilder::new(3).build(&corpus, &mut ()).unwrap();
        let sample = SpectrumSample::new(vec![0; 32], header());
        let selection = ModelSelection::new(SelectionSettings::default(), StartingPointMinimizer);
        let fit = selection.fit(&basis, &sample, &mut ()).unwrap();
        assert!(fit.statistic.is_finite());
        assert!(fit.nactive() >= 1);
    }

    #[test]
    fn spectrum_shorter_than_range() {
        let corpus = synthetic_corpus(30, 32, 3);
        let basis = BasisBuilder::new(3).build(&corpus, &mut ()).unwrap();
        let sample = SpectrumSample::new(vec![1; 4], header());
        let err = default_selection()
            .fit(&basis, &sample, &mut ())
            .unwrap_err();
        assert!(matches!(err, SpectrumError::OutsideChannelRange { .. }));
    }

    #[test]
    fn missing_basis_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let library = BasisLibrary::with_dirs(vec![dir.path().to_path_buf()]);
        let sample = SpectrumSample::new(vec![1; 16], header());
        let err = fit_background(&library, &sample, &default_selection(), &mut ())
            .unwrap_err();
        match err {
            BackgroundError::Library(LibraryError::ModelNotFound { key, searched }) => {
                assert!(key.contains("synthetic"));
                assert_eq!(searched.len(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn fit_through_library() {
        let corpus = synthetic_corpus(40, 32, 4);
        let basis = BasisBuilder::new(3).build(&corpus, &mut ()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let key = BasisKey::new("Synthetic", Some("Detector"), 32);
        BasisLibrary::save(dir.path(), &key, &basis).unwrap();

        let library = BasisLibrary::with_dirs(vec![dir.path().to_path_buf()]);
        let sample = SpectrumSample::new(synthetic_spectrum(32, 5), header());
        let fit = fit_background(&library, &sample, &default_selection(), &mut ()).unwrap();
        assert_eq!(fit.range, basis.range());
    }
}
