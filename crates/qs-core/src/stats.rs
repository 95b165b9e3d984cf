use crate::time::Time;
use serde::Serialize;

/// Per-source accumulators. Divisors for the derived quantities below are
/// always `generated`, never `generated - rejected` (see DESIGN.md for why
/// the other convention was rejected).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceStatistics {
    pub generated: u64,
    pub rejected: u64,
    pub time_in_buffer: f64,
    pub time_in_device: f64,
    pub time_squared_in_buffer: f64,
    pub time_squared_in_device: f64,
    #[serde(skip)]
    pub next_request: Time,
}

impl SourceStatistics {
    pub fn new() -> Self {
        Self {
            next_request: Time::NEVER,
            ..Default::default()
        }
    }

    pub fn add_time_in_buffer(&mut self, wait: Time) {
        let t = wait.as_millis_f64();
        self.time_in_buffer += t;
        self.time_squared_in_buffer += t * t;
    }

    pub fn add_time_in_device(&mut self, service: Time) {
        let t = service.as_millis_f64();
        self.time_in_device += t;
        self.time_squared_in_device += t * t;
    }

    pub fn average_buffer_time(&self) -> f64 {
        self.time_in_buffer / self.generated as f64
    }

    pub fn average_device_time(&self) -> f64 {
        self.time_in_device / self.generated as f64
    }

    pub fn buffer_time_variance(&self) -> f64 {
        variance(
            self.time_squared_in_buffer,
            self.average_buffer_time(),
            self.generated,
        )
    }

    pub fn device_time_variance(&self) -> f64 {
        variance(
            self.time_squared_in_device,
            self.average_device_time(),
            self.generated,
        )
    }

    pub fn rejection_probability(&self) -> f64 {
        self.rejected as f64 / self.generated as f64
    }
}

fn variance(squares: f64, average: f64, count: u64) -> f64 {
    squares / count as f64 - average * average
}


/// Per-device accumulators.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatistics {
    #[serde(skip)]
    pub current_request: Option<crate::request::Request>,
    pub time_in_usage: f64,
    #[serde(skip)]
    pub next_request: Time,
}

impl Default for DeviceStatistics {
    fn default() -> Self {
        Self {
            current_request: None,
            time_in_usage: 0.0,
            next_request: Time::NEVER,
        }
    }
}

impl DeviceStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_occupied(&self) -> bool {
        self.current_request.is_some()
    }

    pub fn usage_coefficient(&self, elapsed: Time) -> f64 {
        if elapsed.as_millis() == 0 {
            0.0
        } else {
            self.time_in_usage / elapsed.as_millis_f64()
        }
    }
}
