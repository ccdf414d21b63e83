use crate::array_stats::informative_columns;
use crate::basis::BasisKey;
use crate::data::SpectrumSample;
use crate::error::{BasisError, SpectrumError};
use crate::types::SpectraMatrix;

use ndarray::{Array2, Axis, s};
use std::collections::BTreeMap;
use std::path::Path;

/// Contiguous range `ilo..ihi` of informative detector channels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRange {
    pub ilo: usize,
    pub ihi: usize,
}

impl ChannelRange {
    pub fn new(ilo: usize, ihi: usize) -> Self {
        assert!(ilo < ihi, "channel range must be non-empty");
        Self { ilo, ihi }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ihi - self.ilo
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ihi == self.ilo
    }
}

/// Counts of many spectra of one detector setup, spectra × channels
#[derive(Clone, Debug)]
pub struct SpectralCorpus {
    key: BasisKey,
    counts: SpectraMatrix,
}

impl SpectralCorpus {
    /// Corpus from an already assembled counts matrix
    pub fn new(key: BasisKey, counts: SpectraMatrix) -> Result<Self, BasisError> {
        if counts.nrows() == 0 {
            return Err(BasisError::EmptyCorpus);
        }
        if counts.ncols() != key.nchannels {
            return Err(BasisError::ShapeMismatch(format!(
                "corpus key declares {} channels, matrix has {}",
                key.nchannels,
                counts.ncols()
            )));
        }
        Ok(Self { key, counts })
    }

    /// Shards samples by their (telescope, instrument, channel count) key
    ///
    /// Every produced corpus has at least one spectrum and a consistent channel count.
    pub fn group(
        samples: impl IntoIterator<Item = SpectrumSample>,
    ) -> BTreeMap<BasisKey, SpectralCorpus> {
        let mut rows: BTreeMap<BasisKey, Vec<Vec<u64>>> = BTreeMap::new();
        for sample in samples {
            rows.entry(sample.key()).or_default().push(sample.counts);
        }
        rows.into_iter()
            .map(|(key, spectra)| {
                let nchannels = key.nchannels;
                let counts = Array2::from_shape_fn((spectra.len(), nchannels), |(i, j)| {
                    spectra[i][j] as f64
                });
                (key.clone(), Self { key, counts })
            })
            .collect()
    }

    /// Reads every file and shards the spectra into corpora
    pub fn load<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
    ) -> Result<BTreeMap<BasisKey, SpectralCorpus>, SpectrumError> {
        let samples = paths
            .into_iter()
            .map(|p| SpectrumSample::from_path(p))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(nspectra = samples.len(), "spectral corpus loaded");
        Ok(Self::group(samples))
    }

    #[inline]
    pub fn key(&self) -> &BasisKey {
        &self.key
    }

    #[inline]
    pub fn counts(&self) -> &SpectraMatrix {
        &self.counts
    }

    #[inline]
    pub fn nspectra(&self) -> usize {
        self.counts.nrows()
    }

    /// Range from the first to the last channel whose counts vary across the corpus
    pub fn channel_range(&self) -> Result<ChannelRange, BasisError> {
        let informative = informative_columns(self.counts.view());
        let ilo = informative.iter().position(|&x| x);
        let ihi = informative.iter().rposition(|&x| x);
        match (ilo, ihi) {
            (Some(ilo), Some(ihi)) => Ok(ChannelRange::new(ilo, ihi + 1)),
            _ => Err(BasisError::DegenerateCorpus),
        }
    }

    /// Shape-only representation of every spectrum over `range`, see [log_ratio]
    pub fn normalized(&self, range: ChannelRange) -> SpectraMatrix {
        let mut active = self.counts.slice(s![.., range.ilo..range.ihi]).to_owned();
        for mut row in active.axis_iter_mut(Axis(0)) {
            let total = row.sum();
            row.mapv_inplace(|c| log_ratio(c, total));
        }
        active
    }
}

/// Stabilised log-ratio `log10(counts / total + 1)`, zero for an empty spectrum
#[inline]
pub fn log_ratio(counts: f64, total: f64) -> f64 {
    if total > 0.0 {
        (counts / total + 1.0).log10()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpectrumHeader;

    use approx::assert_relative_eq;
    use ndarray::arr2;

    fn sample(telescope: &str, counts: Vec<u64>) -> SpectrumSample {
        SpectrumSample::new(counts, SpectrumHeader::new(telescope, None))
    }

    #[test]
    fn group_by_key() {
        let corpora = SpectralCorpus::group(vec![
            sample("a", vec![1, 2, 3]),
            sample("b", vec![1, 2, 3]),
            sample("a", vec![4, 5, 6]),
            sample("a", vec![4, 5]),
        ]);
        assert_eq!(corpora.len(), 3);
        let a3 = &corpora[&BasisKey::new("a", None, 3)];
        assert_eq!(a3.nspectra(), 2);
        assert_eq!(a3.counts(), &arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
    }

    #[test]
    fn channel_range_excludes_degenerate_edges() {
        let corpus = SpectralCorpus::new(
            BasisKey::new("x", None, 6),
            arr2(&[
                [0.0, 0.0, 3.0, 7.0, 1.0, 2.0],
                [0.0, 1.0, 3.0, 5.0, 2.0, 2.0],
                [0.0, 2.0, 3.0, 9.0, 1.0, 2.0],
            ]),
        )
        .unwrap();
        // an inner degenerate channel (index 2) stays inside the contiguous range
        assert_eq!(corpus.channel_range().unwrap(), ChannelRange::new(1, 5));
    }

    #[test]
    fn channel_range_degenerate_corpus() {
        let corpus =
            SpectralCorpus::new(BasisKey::new("x", None, 2), arr2(&[[1.0, 2.0], [1.0, 2.0]]))
                .unwrap();
        assert_eq!(corpus.channel_range(), Err(BasisError::DegenerateCorpus));
    }

    #[test]
    fn empty_corpus() {
        let err = SpectralCorpus::new(BasisKey::new("x", None, 2), Array2::zeros((0, 2)));
        assert_eq!(err.unwrap_err(), BasisError::EmptyCorpus);
    }

    #[test]
    fn normalized_rows() {
        let corpus = SpectralCorpus::new(
            BasisKey::new("x", None, 3),
            arr2(&[[9.0, 1.0, 3.0], [0.0, 0.0, 0.0]]),
        )
        .unwrap();
        let y = corpus.normalized(ChannelRange::new(1, 3));
        assert_relative_eq!(y[[0, 0]], 1.25_f64.log10());
        assert_relative_eq!(y[[0, 1]], 1.75_f64.log10());
        assert_eq!(y[[1, 0]], 0.0);
        assert_eq!(y[[1, 1]], 0.0);
    }
}
