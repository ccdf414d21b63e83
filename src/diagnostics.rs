//! Structured diagnostics emitted while building bases and fitting spectra
//!
//! Every builder and fit call receives an explicit [DiagnosticsSink]. Nothing in the crate keeps
//! a global logger configuration: [TracingSink] forwards the events to whatever `tracing`
//! subscriber the application installed, [EventLog] keeps them for inspection, and `()` drops
//! them.

use serde::{Deserialize, Serialize};

/// Where the seed state of the search comes from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeedSource {
    /// Optimized starting from the linear projection onto the basis
    Decomposed,
    /// Optimized starting from all basis coefficients at zero
    ZeroInit,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum DiagnosticEvent {
    /// Smallest number of components explaining `threshold` of the corpus variance
    ExplainedVariance { threshold: f64, ncomponents: usize },
    BasisBuilt {
        nspectra: usize,
        ilo: usize,
        ihi: usize,
        ncomponents: usize,
    },
    SeedCandidate { source: SeedSource, statistic: f64 },
    SeedSelected { source: SeedSource, statistic: f64 },
    /// One backward-elimination candidate
    Eliminated {
        nactive: usize,
        statistic: f64,
        aic: f64,
    },
    BackwardSelected { nactive: usize, aic: f64 },
    Regrowth {
        nactive: usize,
        aic: f64,
        best_aic: f64,
        accepted: bool,
    },
    LineProposed {
        round: usize,
        center: f64,
        log_norm: f64,
    },
    LineRound {
        round: usize,
        aic: f64,
        best_aic: f64,
        accepted: bool,
    },
    Finished {
        nactive: usize,
        nlines: usize,
        statistic: f64,
        aic: f64,
    },
}

/// Receiver of [DiagnosticEvent]s
pub trait DiagnosticsSink {
    fn record(&mut self, event: DiagnosticEvent);
}

impl DiagnosticsSink for () {
    #[inline]
    fn record(&mut self, _event: DiagnosticEvent) {}
}

impl<S> DiagnosticsSink for &mut S
where
    S: DiagnosticsSink + ?Sized,
{
    #[inline]
    fn record(&mut self, event: DiagnosticEvent) {
        (**self).record(event)
    }
}

/// Keeps every event in memory
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog(Vec<DiagnosticEvent>);

impl EventLog {
    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.0
    }

    pub fn into_events(self) -> Vec<DiagnosticEvent> {
        self.0
    }
}

impl DiagnosticsSink for EventLog {
    fn record(&mut self, event: DiagnosticEvent) {
        self.0.push(event);
    }
}

/// Forwards events to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&mut self, event: DiagnosticEvent) {
        use DiagnosticEvent::*;

        match event {
            ExplainedVariance {
                threshold,
                ncomponents,
            } => tracing::info!(threshold, ncomponents, "explained variance"),
            BasisBuilt {
                nspectra,
                ilo,
                ihi,
                ncomponents,
            } => tracing::info!(nspectra, ilo, ihi, ncomponents, "basis built"),
            SeedCandidate { source, statistic } => {
                tracing::debug!(?source, statistic, "seed candidate")
            }
            SeedSelected { source, statistic } => {
                tracing::debug!(?source, statistic, "seed selected")
            }
            Eliminated {
                nactive,
                statistic,
                aic,
            } => tracing::debug!(nactive, statistic, aic, "backward elimination step"),
            BackwardSelected { nactive, aic } => {
                tracing::debug!(nactive, aic, "backward elimination selected")
            }
            Regrowth {
                nactive,
                aic,
                best_aic,
                accepted,
            } => tracing::debug!(nactive, aic, best_aic, accepted, "regrowth step"),
            LineProposed {
                round,
                center,
                log_norm,
            } => tracing::debug!(round, center, log_norm, "line proposed"),
            LineRound {
                round,
                aic,
                best_aic,
                accepted,
            } => tracing::debug!(round, aic, best_aic, accepted, "line round"),
            Finished {
                nactive,
                nlines,
                statistic,
                aic,
            } => {
                if statistic.is_finite() && statistic < crate::statistic::OUT_OF_DOMAIN_STATISTIC {
                    tracing::info!(nactive, nlines, statistic, aic, "background fit finished");
                } else {
                    tracing::warn!(nactive, nlines, statistic, aic, "background fit has no valid prediction");
                }
            }
        }
    }
}
