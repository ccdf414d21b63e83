use crate::data::{SpectrumHeader, SpectrumSample};
use crate::error::SpectrumError;

use fitsio::FitsFile;
use std::path::Path;

impl SpectrumSample {
    /// Reads an OGIP spectral file
    ///
    /// Counts come from the `COUNTS` column of the `SPECTRUM` extension, the header keys from
    /// the same extension. Missing scaling keys default to unity.
    pub fn from_fits(path: impl AsRef<Path>) -> Result<Self, SpectrumError> {
        let mut fptr = FitsFile::open(path.as_ref())?;
        let hdu = fptr.hdu("SPECTRUM")?;

        let raw: Vec<i64> = hdu.read_col(&mut fptr, "COUNTS")?;
        let counts = raw
            .into_iter()
            .map(|c| {
                u64::try_from(c).map_err(|_| SpectrumError::Invalid(format!("negative counts {c}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let telescope: String = hdu.read_key(&mut fptr, "TELESCOP")?;
        let instrument: Option<String> = hdu.read_key(&mut fptr, "INSTRUME").ok();
        let mut read_scale = |name: &str| -> f64 {
            hdu.read_key::<f64>(&mut fptr, name)
                .unwrap_or_else(|_| SpectrumHeader::default_scale())
        };
        let header = SpectrumHeader {
            exposure: read_scale("EXPOSURE"),
            area_scale: read_scale("AREASCAL"),
            back_scale: read_scale("BACKSCAL"),
            ..SpectrumHeader::new(telescope.trim(), instrument.map(|s| s.trim().to_owned()))
        };

        Ok(Self::new(counts, header))
    }
}
