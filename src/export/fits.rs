use crate::error::ExportError;
use crate::export::TableModel;

use fitsio::FitsFile;
use fitsio::tables::{ColumnDataType, ColumnDescription};
use std::path::Path;

impl TableModel {
    /// Writes the four-HDU OGIP table model file, replacing an existing one
    ///
    /// Logical keys (`ADDMODEL`, `REDSHIFT`) are written as integers, which FITS readers accept
    /// as logical values.
    pub fn write_fits(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let mut fptr = FitsFile::create(path.as_ref()).overwrite().open()?;

        let primary = fptr.primary_hdu()?;
        primary.write_key(&mut fptr, "HDUCLASS", "OGIP")?;
        primary.write_key(&mut fptr, "HDUCLAS1", "XSPEC TABLE MODEL")?;
        primary.write_key(&mut fptr, "HDUVERS", "1.0.0")?;
        primary.write_key(&mut fptr, "MODLNAME", self.name.as_str())?;
        primary.write_key(&mut fptr, "MODLUNIT", "photons/cm^2/s")?;
        primary.write_key(&mut fptr, "ADDMODEL", 1_i64)?;
        primary.write_key(&mut fptr, "REDSHIFT", 0_i64)?;
        primary.write_key(&mut fptr, "ILOW", self.ilow as i64)?;
        primary.write_key(&mut fptr, "IHIGH", self.ihigh as i64)?;

        self.write_parameters(&mut fptr)?;
        self.write_energies(&mut fptr)?;
        self.write_spectra(&mut fptr)?;
        Ok(())
    }

    fn write_parameters(&self, fptr: &mut FitsFile) -> Result<(), ExportError> {
        let p = &self.parameter;
        let nvalues = p.values.len();
        let columns = [
            ColumnDescription::new("NAME")
                .with_type(ColumnDataType::String)
                .that_repeats(12)
                .create()?,
            ColumnDescription::new("METHOD")
                .with_type(ColumnDataType::Long)
                .create()?,
            ColumnDescription::new("INITIAL")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("DELTA")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("MINIMUM")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("BOTTOM")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("TOP")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("MAXIMUM")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("NUMBVALS")
                .with_type(ColumnDataType::Long)
                .create()?,
            ColumnDescription::new("VALUE")
                .with_type(ColumnDataType::Double)
                .that_repeats(nvalues)
                .create()?,
        ];
        let hdu = fptr.create_table("PARAMETERS", &columns)?;
        hdu.write_key(fptr, "HDUCLASS", "OGIP")?;
        hdu.write_key(fptr, "HDUCLAS1", "XSPEC TABLE MODEL")?;
        hdu.write_key(fptr, "HDUCLAS2", "PARAMETERS")?;
        hdu.write_key(fptr, "HDUVERS", "1.0.0")?;
        hdu.write_key(fptr, "NINTPARM", 1_i64)?;
        hdu.write_key(fptr, "NADDPARM", 0_i64)?;

        hdu.write_col(fptr, "NAME", &[p.name.clone()])?;
        hdu.write_col(fptr, "METHOD", &[p.method])?;
        hdu.write_col(fptr, "INITIAL", &[p.initial])?;
        hdu.write_col(fptr, "DELTA", &[p.delta])?;
        hdu.write_col(fptr, "MINIMUM", &[p.minimum])?;
        hdu.write_col(fptr, "BOTTOM", &[p.bottom])?;
        hdu.write_col(fptr, "TOP", &[p.top])?;
        hdu.write_col(fptr, "MAXIMUM", &[p.maximum])?;
        hdu.write_col(fptr, "NUMBVALS", &[nvalues as i64])?;
        hdu.write_col(fptr, "VALUE", &p.values)?;
        Ok(())
    }

    fn write_energies(&self, fptr: &mut FitsFile) -> Result<(), ExportError> {
        let columns = [
            ColumnDescription::new("ENERG_LO")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("ENERG_HI")
                .with_type(ColumnDataType::Double)
                .create()?,
        ];
        let hdu = fptr.create_table("ENERGIES", &columns)?;
        hdu.write_key(fptr, "HDUCLASS", "OGIP")?;
        hdu.write_key(fptr, "HDUCLAS1", "XSPEC TABLE MODEL")?;
        hdu.write_key(fptr, "HDUCLAS2", "ENERGIES")?;
        hdu.write_key(fptr, "HDUVERS", "1.0.0")?;
        hdu.write_col(fptr, "ENERG_LO", &self.energy_lo)?;
        hdu.write_col(fptr, "ENERG_HI", &self.energy_hi)?;
        Ok(())
    }

    fn write_spectra(&self, fptr: &mut FitsFile) -> Result<(), ExportError> {
        let columns = [
            ColumnDescription::new("PARAMVAL")
                .with_type(ColumnDataType::Double)
                .create()?,
            ColumnDescription::new("INTPSPEC")
                .with_type(ColumnDataType::Double)
                .that_repeats(self.nchannels())
                .create()?,
        ];
        let hdu = fptr.create_table("SPECTRA", &columns)?;
        hdu.write_key(fptr, "HDUCLASS", "OGIP")?;
        hdu.write_key(fptr, "HDUCLAS1", "XSPEC TABLE MODEL")?;
        hdu.write_key(fptr, "HDUCLAS2", "MODEL SPECTRA")?;
        hdu.write_key(fptr, "HDUVERS", "1.0.0")?;

        let intpspec: Vec<f64> = self.spectra.concat();
        hdu.write_col(fptr, "PARAMVAL", &self.parameter.values)?;
        hdu.write_col(fptr, "INTPSPEC", &intpspec)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChannelRange, SpectrumHeader};
    use crate::model::{ActiveMask, ParameterVector, Prediction};
    use crate::selection::FitResult;

    use ndarray::arr1;

    #[test]
    fn writes_four_hdus() {
        let fit = FitResult {
            params: ParameterVector::zero_init(1.0, 1),
            active: ActiveMask::all(2),
            statistic: 1.0,
            aic: 5.0,
            prediction: Prediction::Valid(arr1(&[4.0, 8.0])),
            history: vec![],
            range: ChannelRange::new(1, 3),
        };
        let header = SpectrumHeader {
            exposure: 2.0,
            ..SpectrumHeader::new("swift", Some("xrt".to_owned()))
        };
        let table = TableModel::from_fit(&fit, &header, 4).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bkg.mod");
        table.write_fits(&path).unwrap();

        let mut fptr = FitsFile::open(&path).unwrap();
        let spectra = fptr.hdu("SPECTRA").unwrap();
        let intpspec: Vec<f64> = spectra.read_col(&mut fptr, "INTPSPEC").unwrap();
        assert_eq!(intpspec, vec![0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 0.0]);
        let primary = fptr.primary_hdu().unwrap();
        let ilow: i64 = primary.read_key(&mut fptr, "ILOW").unwrap();
        assert_eq!(ilow, 2);
        assert!(fptr.hdu("PARAMETERS").is_ok());
        assert!(fptr.hdu("ENERGIES").is_ok());
    }
}
