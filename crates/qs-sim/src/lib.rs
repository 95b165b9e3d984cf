pub mod buffer;
pub mod calendar;
pub mod dispatcher;
pub mod kernel;
pub mod providers;
pub mod report;

pub use buffer::Buffer;
pub use calendar::{Calendar, Event, EventKind};
pub use dispatcher::DeviceDispatcher;
pub use kernel::{Simulator, StepOutcome};
pub use providers::{Deterministic, Exponential, FixedPeriod, ProcessingTimeProvider, SourcePeriod};
pub use report::{DeviceReport, Report, SourceReport};
