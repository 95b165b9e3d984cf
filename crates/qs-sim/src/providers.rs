use qs_core::{Request, Time};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};

/// Reports the interarrival period for a source. Boxed at construction time
/// like `ProcessingTimeProvider`, so the kernel stays agnostic to how a
/// source's period is determined.
pub trait SourcePeriod: std::fmt::Debug + Send {
    fn period(&self, source_id: usize) -> Time;
}

/// A source whose interarrival period never changes. The only
/// `SourcePeriod` implementation backing configuration-driven sources today.
#[derive(Debug, Clone, Copy)]
pub struct FixedPeriod {
    period: Time,
}

impl FixedPeriod {
    pub fn new(period: Time) -> Self {
        Self { period }
    }
}

impl SourcePeriod for FixedPeriod {
    fn period(&self, _source_id: usize) -> Time {
        self.period
    }
}

/// Samples a device's processing time for a request. Two modes are
/// supported by configuration: deterministic, returning
/// the configured coefficient verbatim, and exponential, scaling a draw from
/// the unit-rate exponential distribution by the coefficient.
pub trait ProcessingTimeProvider: std::fmt::Debug + Send {
    fn sample(&mut self, device_id: usize, request: &Request) -> Time;
}

#[derive(Debug, Clone, Copy)]
pub struct Deterministic {
    pub coefficient: Time,
}

impl Deterministic {
    pub fn new(coefficient: Time) -> Self {
        Self { coefficient }
    }
}

impl ProcessingTimeProvider for Deterministic {
    fn sample(&mut self, _device_id: usize, _request: &Request) -> Time {
        self.coefficient
    }
}

#[derive(Debug)]
pub struct Exponential {
    coefficient: f64,
    dist: Exp<f64>,
    rng: StdRng,
}

impl Exponential {
    pub fn new(coefficient: f64, seed: u64) -> Self {
        Self {
            coefficient,
            dist: Exp::new(1.0).expect("rate 1.0 is always a valid Exp parameter"),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ProcessingTimeProvider for Exponential {
    fn sample(&mut self, _device_id: usize, _request: &Request) -> Time {
        let draw = self.dist.sample(&mut self.rng);
        Time::from_millis((self.coefficient * draw).round() as u64)
    }
}
