use crate::data::SpectrumHeader;
use crate::error::ExportError;
use crate::selection::FitResult;

use serde::Serialize;

/// `MODLNAME` of exported table models
pub const MODEL_NAME: &str = "pcabkg";

/// Interpolated parameter of a table model, `PARAMETERS` extension row
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TableParameter {
    pub name: String,
    /// 0 for linear interpolation
    pub method: i64,
    pub initial: f64,
    pub delta: f64,
    pub minimum: f64,
    pub bottom: f64,
    pub top: f64,
    pub maximum: f64,
    pub values: Vec<f64>,
}

impl TableParameter {
    /// `SCALE` linearly interpolated between the two spectra rows, 0 is no background
    pub fn scale() -> Self {
        Self {
            name: "SCALE".to_owned(),
            method: 0,
            initial: 1.0,
            delta: 0.01,
            minimum: 0.0,
            bottom: 0.0,
            top: 1.0,
            maximum: 1.0,
            values: vec![0.0, 1.0],
        }
    }
}

/// OGIP additive table model holding one fitted background shape
///
/// Energies are unit-width channel bins `[i, i + 1)` over the whole spectrum. The two spectra
/// are tabulated at `SCALE = 0` (zero everywhere) and `SCALE = 1` (the fitted counts divided by
/// `EXPOSURE * AREASCAL`, zero outside the active range). `ilow`/`ihigh` are the 1-based first and
/// last active channels.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TableModel {
    pub name: String,
    pub parameter: TableParameter,
    pub energy_lo: Vec<f64>,
    pub energy_hi: Vec<f64>,
    pub spectra: Vec<Vec<f64>>,
    pub ilow: usize,
    pub ihigh: usize,
}

impl TableModel {
    pub fn from_fit(
        fit: &FitResult,
        header: &SpectrumHeader,
        nchannels: usize,
    ) -> Result<Self, ExportError> {
        let scaling = header.exposure * header.area_scale;
        if !(scaling.is_finite() && header.exposure > 0.0 && header.area_scale > 0.0) {
            return Err(ExportError::InvalidScaling {
                exposure: header.exposure,
                area_scale: header.area_scale,
            });
        }
        let range = fit.range;
        if range.ihi > nchannels {
            return Err(ExportError::OutsideChannelRange {
                ihi: range.ihi,
                nchannels,
            });
        }
        let prediction = fit
            .prediction
            .valid()
            .ok_or(ExportError::UndefinedPrediction)?;
        if prediction.len() != range.len() {
            return Err(ExportError::PredictionLength {
                expected: range.len(),
                actual: prediction.len(),
            });
        }

        let mut rate = vec![0.0; nchannels];
        for (r, &p) in rate[range.ilo..range.ihi].iter_mut().zip(prediction) {
            *r = p / scaling;
        }

        Ok(Self {
            name: MODEL_NAME.to_owned(),
            parameter: TableParameter::scale(),
            energy_lo: (0..nchannels).map(|i| i as f64).collect(),
            energy_hi: (0..nchannels).map(|i| (i + 1) as f64).collect(),
            spectra: vec![vec![0.0; nchannels], rate],
            ilow: range.ilo + 1,
            ihigh: range.ihi,
        })
    }

    #[inline]
    pub fn nchannels(&self) -> usize {
        self.energy_lo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChannelRange;
    use crate::model::{ActiveMask, ParameterVector, Prediction};

    use ndarray::arr1;

    fn fit(prediction: Prediction, range: ChannelRange) -> FitResult {
        FitResult {
            params: ParameterVector::zero_init(1.0, 2),
            active: ActiveMask::all(3),
            statistic: 10.0,
            aic: 16.0,
            prediction,
            history: vec![],
            range,
        }
    }

    fn header(exposure: f64, area_scale: f64) -> SpectrumHeader {
        SpectrumHeader {
            exposure,
            area_scale,
            ..SpectrumHeader::new("swift", Some("xrt".to_owned()))
        }
    }

    #[test]
    fn rescaled_rows_and_one_based_bounds() {
        let fit = fit(
            Prediction::Valid(arr1(&[10.0, 20.0, 30.0])),
            ChannelRange::new(2, 5),
        );
        let table = TableModel::from_fit(&fit, &header(10.0, 0.5), 8).unwrap();
        assert_eq!(table.nchannels(), 8);
        assert_eq!(table.ilow, 3);
        assert_eq!(table.ihigh, 5);
        assert_eq!(table.spectra.len(), 2);
        assert!(table.spectra[0].iter().all(|&x| x == 0.0));
        assert_eq!(
            table.spectra[1],
            vec![0.0, 0.0, 2.0, 4.0, 6.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(table.energy_lo[3], 3.0);
        assert_eq!(table.energy_hi[3], 4.0);
        assert_eq!(table.parameter.values, vec![0.0, 1.0]);
    }

    #[test]
    fn invalid_scaling() {
        let fit = fit(Prediction::Valid(arr1(&[1.0])), ChannelRange::new(0, 1));
        for (exposure, area_scale) in [(0.0, 1.0), (1.0, -1.0), (f64::NAN, 1.0)] {
            let err = TableModel::from_fit(&fit, &header(exposure, area_scale), 1).unwrap_err();
            assert!(matches!(err, ExportError::InvalidScaling { .. }));
        }
    }

    #[test]
    fn undefined_prediction() {
        let fit = fit(Prediction::OutOfDomain, ChannelRange::new(0, 1));
        let err = TableModel::from_fit(&fit, &header(1.0, 1.0), 1).unwrap_err();
        assert!(matches!(err, ExportError::UndefinedPrediction));
    }

    #[test]
    fn range_beyond_table() {
        let fit = fit(Prediction::Valid(arr1(&[1.0, 1.0])), ChannelRange::new(3, 5));
        let err = TableModel::from_fit(&fit, &header(1.0, 1.0), 4).unwrap_err();
        assert!(matches!(
            err,
            ExportError::OutsideChannelRange {
                ihi: 5,
                nchannels: 4
            }
        ));
    }

    #[test]
    fn serializes_to_json() {
        let fit = fit(Prediction::Valid(arr1(&[1.0, 2.0])), ChannelRange::new(0, 2));
        let table = TableModel::from_fit(&fit, &header(1.0, 1.0), 2).unwrap();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["name"], MODEL_NAME);
        assert_eq!(value["ilow"], 1);
        assert_eq!(value["parameter"]["name"], "SCALE");
    }
}
