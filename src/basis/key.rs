use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a detector setup a [crate::BasisModel] is built for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisKey {
    pub telescope: String,
    pub instrument: Option<String>,
    pub nchannels: usize,
}

impl BasisKey {
    pub fn new(telescope: &str, instrument: Option<&str>, nchannels: usize) -> Self {
        Self {
            telescope: normalize_name(telescope),
            instrument: instrument.map(normalize_name).filter(|s| !s.is_empty()),
            nchannels,
        }
    }

    /// File stems to look for, most specific first
    ///
    /// `telescope_instrument_nchannels` then `telescope_nchannels`.
    pub fn file_stems(&self) -> Vec<String> {
        let generic = format!("{}_{}", self.telescope, self.nchannels);
        match &self.instrument {
            Some(instrument) => vec![
                format!("{}_{}_{}", self.telescope, instrument, self.nchannels),
                generic,
            ],
            None => vec![generic],
        }
    }
}

impl fmt::Display for BasisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instrument {
            Some(instrument) => write!(
                f,
                "telescope={} instrument={} channels={}",
                self.telescope, instrument, self.nchannels
            ),
            None => write!(f, "telescope={} channels={}", self.telescope, self.nchannels),
        }
    }
}

// Lower-cased, with anything that cannot be part of a file name replaced by '-'
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '+' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
