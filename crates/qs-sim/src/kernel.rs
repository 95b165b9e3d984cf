use qs_core::{DeviceStatistics, Request, SourceStatistics, Time};
use tracing::debug;

use crate::buffer::Buffer;
use crate::calendar::{Calendar, Event, EventKind};
use crate::dispatcher::DeviceDispatcher;
use crate::providers::{ProcessingTimeProvider, SourcePeriod};

/// What kind of transition `Simulator::step` just processed. `EndOfSimulation`
/// is synthetic — it is never pushed onto the calendar, only returned when
/// the calendar was already empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Generated { source_id: usize },
    Released { device_id: usize },
    EndOfSimulation,
}

/// The event-driven simulation kernel for a queueing system with refusals:
/// `source_count` arrival processes feeding a `buffer_capacity`-bounded
/// shared buffer drained by `device_count` servers.
pub struct Simulator {
    time: Time,
    calendar: Calendar,

    source_periods: Vec<Box<dyn SourcePeriod>>,
    sources: Vec<SourceStatistics>,

    devices: Vec<DeviceStatistics>,
    device_providers: Vec<Box<dyn ProcessingTimeProvider>>,
    dispatcher: DeviceDispatcher,

    buffer: Buffer,

    current_amount_of_requests: u64,
    rejected_amount: u64,
    target_amount_of_requests: u64,
}

impl Simulator {
    pub fn new(
        source_periods: Vec<Box<dyn SourcePeriod>>,
        device_providers: Vec<Box<dyn ProcessingTimeProvider>>,
        buffer_capacity: usize,
        target_amount_of_requests: u64,
    ) -> Self {
        let source_count = source_periods.len();
        let device_count = device_providers.len();

        let mut sim = Self {
            time: Time::ZERO,
            calendar: Calendar::new(),
            source_periods,
            sources: (0..source_count).map(|_| SourceStatistics::new()).collect(),
            devices: (0..device_count).map(|_| DeviceStatistics::new()).collect(),
            device_providers,
            dispatcher: DeviceDispatcher::new(device_count),
            buffer: Buffer::new(source_count, buffer_capacity),
            current_amount_of_requests: 0,
            rejected_amount: 0,
            target_amount_of_requests,
        };
        sim.seed_initial_generations();
        sim
    }

    fn seed_initial_generations(&mut self) {
        for source_id in 0..self.source_periods.len() {
            let period = self.source_periods[source_id].period(source_id);
            self.calendar
                .push(Event::new(period, EventKind::GenerateNewRequest { source_id }));
            self.sources[source_id].next_request = period;
        }
    }

    pub fn current_simulation_time(&self) -> Time {
        self.time
    }

    pub fn current_amount_of_requests(&self) -> u64 {
        self.current_amount_of_requests
    }

    pub fn rejected_amount(&self) -> u64 {
        self.rejected_amount
    }

    pub fn target_amount_of_requests(&self) -> u64 {
        self.target_amount_of_requests
    }

    pub fn is_completed(&self) -> bool {
        self.calendar.is_empty()
    }

    pub fn source_statistics(&self) -> &[SourceStatistics] {
        &self.sources
    }

    pub fn device_statistics(&self) -> &[DeviceStatistics] {
        &self.devices
    }

    pub fn buffer_snapshot(&self) -> Vec<Request> {
        self.buffer.snapshot()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Process the single earliest-scheduled event. A no-op, returning
    /// `EndOfSimulation`, when the calendar is already empty.
    pub fn step(&mut self) -> StepOutcome {
        let Some(event) = self.calendar.pop_top() else {
            return StepOutcome::EndOfSimulation;
        };
        self.time = event.planned_time;

        match event.kind {
            EventKind::GenerateNewRequest { source_id } => {
                self.handle_generate(source_id);
                StepOutcome::Generated { source_id }
            }
            EventKind::DeviceRelease { device_id } => {
                self.handle_release(device_id);
                StepOutcome::Released { device_id }
            }
        }
    }

    pub fn run_to_completion(&mut self) {
        while self.step() != StepOutcome::EndOfSimulation {}
    }

    /// Zero all counters and accumulators, clear sub-queues and the
    /// calendar, and re-seed the initial generation events.
    pub fn reset(&mut self) {
        for source in &mut self.sources {
            *source = SourceStatistics::new();
        }
        for device in &mut self.devices {
            *device = DeviceStatistics::new();
        }
        self.buffer.clear();
        self.calendar.clear();
        self.dispatcher.reset();
        self.current_amount_of_requests = 0;
        self.rejected_amount = 0;
        self.time = Time::ZERO;
        self.seed_initial_generations();
    }

    pub fn reset_with_target(&mut self, target_amount_of_requests: u64) {
        self.reset();
        self.target_amount_of_requests = target_amount_of_requests;
    }

    fn handle_generate(&mut self, source_id: usize) {
        self.sources[source_id].generated += 1;
        let serial_number = self.sources[source_id].generated;
        let request = Request::new(source_id, serial_number, self.time);
        self.current_amount_of_requests += 1;

        if self.occupy_next_device(request).is_none()
            && let Some(victim) = self.buffer.put(request)
        {
            self.handle_buffer_overflow(victim);
        }

        if self.current_amount_of_requests >= self.target_amount_of_requests {
            debug!(
                "target of {} requests reached, draining remaining releases",
                self.target_amount_of_requests
            );
            self.calendar.remove_excess_generations();
            for source in &mut self.sources {
                source.next_request = Time::NEVER;
            }
        } else {
            let next_time = self.time + self.source_periods[source_id].period(source_id);
            self.calendar
                .push(Event::new(next_time, EventKind::GenerateNewRequest { source_id }));
            self.sources[source_id].next_request = next_time;
        }
    }

    fn handle_release(&mut self, device_id: usize) {
        self.devices[device_id].current_request = None;

        match self.buffer.take() {
            Some(request) => {
                let wait = self.time - request.generation_time;
                self.sources[request.source_id].add_time_in_buffer(wait);
                let occupied = self.occupy_next_device(request);
                debug_assert!(
                    occupied.is_some(),
                    "the device that was just released must be idle"
                );
            }
            None => {
                self.devices[device_id].next_request = Time::NEVER;
            }
        }
    }

    fn handle_buffer_overflow(&mut self, victim: Request) {
        let wait = self.time - victim.generation_time;
        let source = &mut self.sources[victim.source_id];
        source.add_time_in_buffer(wait);
        source.rejected += 1;
        self.rejected_amount += 1;
    }

    /// Try to hand `request` to an idle device. Returns the device id on
    /// success.
    fn occupy_next_device(&mut self, request: Request) -> Option<usize> {
        let device_id = self.dispatcher.pick(|i| !self.devices[i].is_occupied())?;

        let processing_time = self.device_providers[device_id].sample(device_id, &request);
        self.sources[request.source_id].add_time_in_device(processing_time);
        self.devices[device_id].time_in_usage += processing_time.as_millis_f64();
        self.devices[device_id].current_request = Some(request);

        let release_time = self.time + processing_time;
        self.calendar
            .push(Event::new(release_time, EventKind::DeviceRelease { device_id }));
        self.devices[device_id].next_request = release_time;

        Some(device_id)
    }
}
