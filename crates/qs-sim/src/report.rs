use qs_core::Time;
use serde::Serialize;

use crate::kernel::Simulator;

/// Per-source figures derived from `SourceStatistics`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source_id: usize,
    pub generated_requests: u64,
    pub rejection_probability: f64,
    pub average_buffer_time: f64,
    pub average_processing_time: f64,
    pub average_full_time: f64,
    pub buffer_time_variance: f64,
    pub processing_time_variance: f64,
}

/// Per-device figures derived from `DeviceStatistics`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub device_id: usize,
    pub usage_coefficient: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub duration: Time,
    pub rejected_amount: u64,
    pub current_amount_of_requests: u64,
    pub source_reports: Vec<SourceReport>,
    pub device_reports: Vec<DeviceReport>,
}

impl Simulator {
    pub fn generate_report(&self) -> Report {
        let duration = self.current_simulation_time();
        let source_reports = self
            .source_statistics()
            .iter()
            .enumerate()
            .map(|(source_id, s)| {
                let buffer_time = s.average_buffer_time();
                let device_time = s.average_device_time();
                SourceReport {
                    source_id,
                    generated_requests: s.generated,
                    rejection_probability: s.rejection_probability(),
                    average_buffer_time: buffer_time,
                    average_processing_time: device_time,
                    average_full_time: buffer_time + device_time,
                    buffer_time_variance: s.buffer_time_variance(),
                    processing_time_variance: s.device_time_variance(),
                }
            })
            .collect();

        let device_reports = self
            .device_statistics()
            .iter()
            .enumerate()
            .map(|(device_id, d)| DeviceReport {
                device_id,
                usage_coefficient: d.usage_coefficient(duration),
            })
            .collect();

        Report {
            duration,
            rejected_amount: self.rejected_amount(),
            current_amount_of_requests: self.current_amount_of_requests(),
            source_reports,
            device_reports,
        }
    }
}
