//! Battery cell chemistry profiles
//!
//! A profile holds the voltage band and display name of one cell chemistry.
//! The [`ProfileTable`] is seeded once at startup (built-ins plus any
//! configured additions) and only read afterwards.

use crate::error::{CellbenchError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Static voltage band and naming constants for one cell chemistry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChemistryProfile {
    /// Chemistry identifier (e.g. "LFP")
    pub id: String,

    /// Nominal cell voltage in volts
    pub nominal_voltage: f64,

    /// Fully discharged cell voltage in volts
    pub minimum_voltage: f64,

    /// Fully charged cell voltage in volts
    pub maximum_voltage: f64,

    /// Human readable chemistry name
    pub name: String,
}

impl ChemistryProfile {
    pub fn new(id: &str, nominal: f64, minimum: f64, maximum: f64, name: &str) -> Self {
        Self {
            id: id.to_string(),
            nominal_voltage: nominal,
            minimum_voltage: minimum,
            maximum_voltage: maximum,
            name: name.to_string(),
        }
    }

    /// Width of the voltage band (max - min)
    pub fn voltage_span(&self) -> f64 {
        self.maximum_voltage - self.minimum_voltage
    }

    /// Check `minimum < nominal < maximum` and that the id is usable
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CellbenchError::validation(
                "chemistries.id",
                "Chemistry id cannot be empty",
            ));
        }
        let finite = self.minimum_voltage.is_finite()
            && self.nominal_voltage.is_finite()
            && self.maximum_voltage.is_finite();
        if !finite
            || self.minimum_voltage >= self.nominal_voltage
            || self.nominal_voltage >= self.maximum_voltage
        {
            return Err(CellbenchError::validation(
                format!("chemistries.{}", self.id),
                "Voltages must satisfy minimum < nominal < maximum".to_string(),
            ));
        }
        if !self.voltage_span().is_finite() {
            return Err(CellbenchError::validation(
                format!("chemistries.{}", self.id),
                "Voltage band is too wide".to_string(),
            ));
        }
        Ok(())
    }
}

/// The four chemistries every bench knows about
pub fn builtin_profiles() -> Vec<ChemistryProfile> {
    vec![
        ChemistryProfile::new("LFP", 3.2, 2.8, 3.6, "Lithium Iron Phosphate"),
        ChemistryProfile::new("NMC", 3.6, 3.2, 4.0, "Nickel Manganese Cobalt"),
        ChemistryProfile::new("LCO", 3.7, 3.0, 4.2, "Lithium Cobalt Oxide"),
        ChemistryProfile::new("LTO", 2.4, 1.5, 2.8, "Lithium Titanate Oxide"),
    ]
}

/// Ordered lookup table of chemistry profiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileTable {
    profiles: Vec<ChemistryProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }
}

impl ProfileTable {
    /// Build a table from built-ins plus extra profiles.
    ///
    /// An extra profile whose id matches a built-in replaces it in place;
    /// new ids are appended in the order given.
    pub fn with_extra(extra: &[ChemistryProfile]) -> Result<Self> {
        let mut table = Self::default();
        for profile in extra {
            profile.validate()?;
            match table.profiles.iter_mut().find(|p| p.id == profile.id) {
                Some(existing) => *existing = profile.clone(),
                None => table.profiles.push(profile.clone()),
            }
        }
        Ok(table)
    }

    /// Look up a profile, failing with `UnknownChemistry`
    pub fn get(&self, id: &str) -> Result<&ChemistryProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CellbenchError::unknown_chemistry(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.id.as_str())
    }

    pub fn profiles(&self) -> &[ChemistryProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
