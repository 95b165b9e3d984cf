use qs_core::Time;
use qs_sim::{Deterministic, Exponential, FixedPeriod, ProcessingTimeProvider, Simulator, SourcePeriod};

use crate::parser::{Mode, RawConfig};

/// Constructs a `Simulator` from a validated `RawConfig`. `seed` drives the
/// exponential providers (ignored entirely in deterministic mode); each
/// device gets a distinct stream derived from it so devices don't share a
/// PRNG sequence.
pub fn build_simulator(raw: &RawConfig, seed: u64) -> Simulator {
    let source_periods: Vec<Box<dyn SourcePeriod>> = raw
        .source_periods
        .iter()
        .map(|&period| Box::new(FixedPeriod::new(Time::from_millis(period))) as Box<dyn SourcePeriod>)
        .collect();

    let device_providers: Vec<Box<dyn ProcessingTimeProvider>> = raw
        .device_coefficients
        .iter()
        .enumerate()
        .map(|(device_id, &coefficient)| -> Box<dyn ProcessingTimeProvider> {
            match raw.mode {
                Mode::Deterministic => {
                    Box::new(Deterministic::new(Time::from_millis(coefficient.round() as u64)))
                }
                Mode::Exponential => {
                    Box::new(Exponential::new(coefficient, seed.wrapping_add(device_id as u64)))
                }
            }
        })
        .collect();

    Simulator::new(
        source_periods,
        device_providers,
        raw.buffer_capacity,
        raw.target_amount_of_requests,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn deterministic_mode_yields_a_simulator_matching_its_coefficients() {
        let raw = parse("Requests: 3\nBuffer: 0\nSources: 10\nDevices: 5\nMode: deterministic").unwrap();
        let mut sim = build_simulator(&raw, 1);
        sim.run_to_completion();
        assert_eq!(sim.device_statistics()[0].time_in_usage, 15.0);
    }

    #[test]
    fn exponential_mode_is_reproducible_given_the_same_seed() {
        let raw = parse("Requests: 5\nBuffer: 1\nSources: 1\nDevices: 2.0").unwrap();
        let mut a = build_simulator(&raw, 7);
        let mut b = build_simulator(&raw, 7);
        a.run_to_completion();
        b.run_to_completion();
        assert_eq!(a.current_simulation_time(), b.current_simulation_time());
    }
}
