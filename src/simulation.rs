//! Demo data generators
//!
//! Bounded uniform draws used to seed and perturb simulated cell readings.
//! The random source is injected, so a seeded [`StdRng`] gives repeatable
//! runs and tests can pin temperatures with [`FixedTemperature`].

use crate::calculator::{CellReading, round_to};
use crate::chemistry::ChemistryProfile;
use crate::config::SimulationConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies synthetic cell temperatures in °C
pub trait TemperatureSource {
    fn sample_temperature(&mut self) -> f64;
}

/// Always reports the same temperature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTemperature(pub f64);

impl TemperatureSource for FixedTemperature {
    fn sample_temperature(&mut self) -> f64 {
        self.0
    }
}

/// Random generator for voltages, currents, temperatures and live jitter
#[derive(Debug, Clone)]
pub struct Simulator<R = StdRng> {
    rng: R,
    settings: SimulationConfig,
}

impl Simulator<StdRng> {
    /// Seeded when `settings.seed` is set, otherwise seeded from OS entropy
    pub fn from_config(settings: &SimulationConfig) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, settings.clone())
    }
}

impl<R: Rng> Simulator<R> {
    pub fn new(rng: R, settings: SimulationConfig) -> Self {
        Self { rng, settings }
    }

    /// Uniform in the chemistry's `[minimum, maximum]` band, 2 decimals
    pub fn random_voltage(&mut self, profile: &ChemistryProfile) -> f64 {
        let v = self
            .rng
            .gen_range(profile.minimum_voltage..=profile.maximum_voltage);
        round_to(v, 2)
    }

    /// Uniform in the configured current range, 2 decimals
    pub fn random_current(&mut self) -> f64 {
        let i = self
            .rng
            .gen_range(self.settings.current_min_a..=self.settings.current_max_a);
        round_to(i, 2)
    }

    /// Uniform in the configured temperature range, 1 decimal
    pub fn random_temperature(&mut self) -> f64 {
        let t = self
            .rng
            .gen_range(self.settings.temperature_min_c..=self.settings.temperature_max_c);
        round_to(t, 1)
    }

    /// One live tick: jitter voltage and current, floor both at zero.
    pub fn perturb(&mut self, reading: &mut CellReading) {
        let dv = self.symmetric(self.settings.voltage_jitter_v);
        let di = self.symmetric(self.settings.current_jitter_a);
        reading.voltage = round_to((reading.voltage + dv).max(0.0), 2);
        reading.current = round_to((reading.current + di).max(0.0), 2);
    }

    fn symmetric(&mut self, half_width: f64) -> f64 {
        self.rng.gen_range(-half_width..=half_width)
    }
}

impl<R: Rng> TemperatureSource for Simulator<R> {
    fn sample_temperature(&mut self) -> f64 {
        self.random_temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::builtin_profiles;

    fn seeded(seed: u64) -> Simulator {
        Simulator::new(StdRng::seed_from_u64(seed), SimulationConfig::default())
    }

    #[test]
    fn voltages_stay_inside_chemistry_band() {
        let mut sim = seeded(7);
        for p in builtin_profiles() {
            for _ in 0..500 {
                let v = sim.random_voltage(&p);
                assert!(v >= p.minimum_voltage && v <= p.maximum_voltage, "{} {}", p.id, v);
            }
        }
    }

    #[test]
    fn currents_and_temperatures_stay_in_range() {
        let mut sim = seeded(11);
        for _ in 0..1000 {
            let i = sim.random_current();
            assert!((0.5..=2.5).contains(&i), "current {}", i);
            let t = sim.random_temperature();
            assert!((20.0..=45.0).contains(&t), "temperature {}", t);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let p = &builtin_profiles()[1];
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..20 {
            assert_eq!(a.random_voltage(p), b.random_voltage(p));
            assert_eq!(a.random_current(), b.random_current());
            assert_eq!(a.sample_temperature(), b.sample_temperature());
        }
    }

    #[test]
    fn perturb_is_bounded() {
        let mut sim = seeded(3);
        for _ in 0..500 {
            let mut r = CellReading::new("LFP", 3.2, 1.0);
            sim.perturb(&mut r);
            assert!((r.voltage - 3.2).abs() <= 0.05 + 1e-9, "voltage {}", r.voltage);
            assert!((r.current - 1.0).abs() <= 0.1 + 1e-9, "current {}", r.current);
        }
    }

    #[test]
    fn perturb_floors_at_zero() {
        let mut sim = seeded(5);
        for _ in 0..200 {
            let mut r = CellReading::new("LTO", 0.0, 0.0);
            sim.perturb(&mut r);
            assert!(r.voltage >= 0.0);
            assert!(r.current >= 0.0);
        }
    }

    #[test]
    fn fixed_temperature_repeats() {
        let mut t = FixedTemperature(31.5);
        assert_eq!(t.sample_temperature(), 31.5);
        assert_eq!(t.sample_temperature(), 31.5);
    }
}
