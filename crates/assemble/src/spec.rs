//! Metadata attached to assembled hazard sets.

/// Hazard type tag and intensity unit for an assembled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardSpec {
    pub haz_type: String,
    pub units: String,
}

impl HazardSpec {
    pub fn new(haz_type: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            haz_type: haz_type.into(),
            units: units.into(),
        }
    }

    /// Coastal flood depth in metres.
    pub fn coastal_flood() -> Self {
        Self::new("FL", "m")
    }
}

/// Event table for one event per return period: frequency `1/rp`, name `RP{rp}`.
pub(crate) fn return_period_events(rps: &[u32]) -> drisk_hazard::EventTable {
    let mut events =
        drisk_hazard::EventTable::numbered(rps.iter().map(|&rp| 1.0 / f64::from(rp)).collect());
    events.name = rps.iter().map(|rp| format!("RP{rp}")).collect();
    events
}
