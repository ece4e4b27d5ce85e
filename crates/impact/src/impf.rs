//! Impact (vulnerability) functions.

use std::collections::BTreeMap;

use drisk_stats::interp;

use crate::error::ImpactError;

/// Piecewise-linear damage curve: intensity to mean damage degree (MDD)
/// and percentage of affected assets (PAA).
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactFunc {
    id: u32,
    intensity: Vec<f64>,
    mdd: Vec<f64>,
    paa: Vec<f64>,
}

impl ImpactFunc {
    /// Creates a function from sampled curves.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidImpactFunction`] if the curves are
    /// empty, differ in length, contain non-finite values, or intensity is
    /// not non-decreasing.
    pub fn new(id: u32, intensity: Vec<f64>, mdd: Vec<f64>, paa: Vec<f64>) -> Result<Self, ImpactError> {
        let invalid = |reason: &str| ImpactError::InvalidImpactFunction {
            id,
            reason: reason.to_string(),
        };
        if intensity.is_empty() {
            return Err(invalid("no sample points"));
        }
        if mdd.len() != intensity.len() || paa.len() != intensity.len() {
            return Err(invalid("intensity, mdd and paa lengths differ"));
        }
        if intensity.iter().chain(&mdd).chain(&paa).any(|v| !v.is_finite()) {
            return Err(invalid("non-finite sample"));
        }
        if intensity.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("intensity must be non-decreasing"));
        }
        Ok(Self {
            id,
            intensity,
            mdd,
            paa,
        })
    }

    /// Step function: zero damage below `threshold`, full damage from it up.
    ///
    /// Sampled at `(0, threshold, threshold, 10 * threshold)` with MDD
    /// `(0, 0, 1, 1)` and PAA 1.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidImpactFunction`] if `threshold` is
    /// negative or not finite.
    pub fn step(id: u32, threshold: f64) -> Result<Self, ImpactError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ImpactError::InvalidImpactFunction {
                id,
                reason: format!("step threshold {threshold} must be finite and non-negative"),
            });
        }
        Self::new(
            id,
            vec![0.0, threshold, threshold, threshold * 10.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0; 4],
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    pub fn mdd(&self) -> &[f64] {
        &self.mdd
    }

    pub fn paa(&self) -> &[f64] {
        &self.paa
    }

    /// Mean damage ratio `mdd(i) * paa(i)` at intensity `i`, clamped at the
    /// curve ends.
    pub fn damage_ratio(&self, i: f64) -> f64 {
        let mdd = interp(i, &self.intensity, &self.mdd).unwrap_or(0.0);
        let paa = interp(i, &self.intensity, &self.paa).unwrap_or(0.0);
        mdd * paa
    }

    /// Intensity at which the MDD curve reaches `damage`.
    ///
    /// Inverse lookup by interpolating intensity over MDD; assumes MDD is
    /// non-decreasing along the curve.
    pub fn intensity_at_damage(&self, damage: f64) -> f64 {
        interp(damage, &self.mdd, &self.intensity).unwrap_or(f64::NAN)
    }
}

/// Impact functions keyed by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImpactFuncSet {
    funcs: BTreeMap<u32, ImpactFunc>,
}

impl ImpactFuncSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a function.
    pub fn insert(&mut self, func: ImpactFunc) {
        self.funcs.insert(func.id, func);
    }

    pub fn get(&self, id: u32) -> Option<&ImpactFunc> {
        self.funcs.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.funcs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Step functions at the intensity where each curve reaches `damage`.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidImpactFunction`] if an inverse lookup
    /// yields an unusable threshold.
    pub fn step_thresholds(&self, damage: f64) -> Result<ImpactFuncSet, ImpactError> {
        let mut out = ImpactFuncSet::new();
        for f in self.funcs.values() {
            out.insert(ImpactFunc::step(f.id, f.intensity_at_damage(damage))?);
        }
        Ok(out)
    }
}

impl FromIterator<ImpactFunc> for ImpactFuncSet {
    fn from_iter<T: IntoIterator<Item = ImpactFunc>>(iter: T) -> Self {
        let mut set = ImpactFuncSet::new();
        for f in iter {
            set.insert(f);
        }
        set
    }
}
