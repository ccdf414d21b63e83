use serde::{Deserialize, Serialize};

/// Number of free parameters of one Gaussian line block
pub const LINE_NPARAMS: usize = 3;

/// Parameters of one Gaussian line, center and width in channels of the active range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LineParams {
    pub center: f64,
    pub log_sigma: f64,
    /// Decimal logarithm of the total line counts
    pub log_norm: f64,
}

impl LineParams {
    #[inline]
    pub fn to_array(self) -> [f64; LINE_NPARAMS] {
        [self.center, self.log_sigma, self.log_norm]
    }

    #[inline]
    fn from_slice(s: &[f64]) -> Self {
        Self {
            center: s[0],
            log_sigma: s[1],
            log_norm: s[2],
        }
    }
}

/// Candidate model state `[logNorm, pc_1, ..., pc_k, (center, logSigma, logNorm)*]`
///
/// Values are never mutated in place: every search step derives a new vector.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParameterVector {
    values: Vec<f64>,
    ncomponents: usize,
}

impl ParameterVector {
    pub fn new(log_norm: f64, components: &[f64]) -> Self {
        let mut values = Vec::with_capacity(1 + components.len());
        values.push(log_norm);
        values.extend_from_slice(components);
        Self {
            values,
            ncomponents: components.len(),
        }
    }

    /// All basis coefficients at zero
    pub fn zero_init(log_norm: f64, ncomponents: usize) -> Self {
        Self::new(log_norm, &vec![0.0; ncomponents])
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn log_norm(&self) -> f64 {
        self.values[0]
    }

    #[inline]
    pub fn ncomponents(&self) -> usize {
        self.ncomponents
    }

    /// Basis coefficients `pc_1..pc_k`
    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.values[1..=self.ncomponents]
    }

    /// Number of leading parameters describing the continuum, `1 + ncomponents`
    #[inline]
    pub fn nbasis(&self) -> usize {
        1 + self.ncomponents
    }

    #[inline]
    pub fn nlines(&self) -> usize {
        (self.values.len() - self.nbasis()) / LINE_NPARAMS
    }

    pub fn lines(&self) -> impl Iterator<Item = LineParams> + '_ {
        self.values[self.nbasis()..]
            .chunks_exact(LINE_NPARAMS)
            .map(LineParams::from_slice)
    }

    /// Copy with one more line block appended
    pub fn with_line(&self, line: LineParams) -> Self {
        let mut values = self.values.clone();
        values.extend_from_slice(&line.to_array());
        Self {
            values,
            ncomponents: self.ncomponents,
        }
    }

    /// Copy with the parameter `index` set to zero
    pub fn with_zeroed(&self, index: usize) -> Self {
        let mut values = self.values.clone();
        values[index] = 0.0;
        Self {
            values,
            ncomponents: self.ncomponents,
        }
    }

    /// Copy with `values[indices[i]] = free[i]`
    pub fn with_free_values(&self, indices: &[usize], free: &[f64]) -> Self {
        assert_eq!(indices.len(), free.len());
        let mut values = self.values.clone();
        for (&i, &x) in indices.iter().zip(free) {
            values[i] = x;
        }
        Self {
            values,
            ncomponents: self.ncomponents,
        }
    }

    pub fn gather(&self, indices: &[usize]) -> Vec<f64> {
        indices.iter().map(|&i| self.values[i]).collect()
    }
}

/// Immutable set of thawed (free) parameters of a [ParameterVector]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ActiveMask(Vec<bool>);

impl ActiveMask {
    /// Every one of `len` parameters is free
    pub fn all(len: usize) -> Self {
        Self(vec![true; len])
    }

    /// The first `nactive` of `len` parameters are free
    pub fn prefix(len: usize, nactive: usize) -> Self {
        assert!(nactive <= len);
        Self((0..len).map(|i| i < nactive).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.0[index]
    }

    /// Number of free parameters, the `k` of the AIC
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&x| x).count()
    }

    pub fn free_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &x)| x.then_some(i))
            .collect()
    }

    pub fn with_frozen(&self, index: usize) -> Self {
        let mut mask = self.0.clone();
        mask[index] = false;
        Self(mask)
    }

    pub fn with_thawed(&self, index: usize) -> Self {
        let mut mask = self.0.clone();
        mask[index] = true;
        Self(mask)
    }

    /// Copy extended by `n` free parameters
    pub fn with_appended(&self, n: usize) -> Self {
        let mut mask = self.0.clone();
        mask.extend(std::iter::repeat_n(true, n));
        Self(mask)
    }
}
