use qs_core::Time;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The two kinds of scheduled transition. `EndOfSimulation` is a
/// synthetic, observer-only variant returned by `Simulator::step` when the
/// calendar is empty; it is never pushed onto the calendar itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    GenerateNewRequest { source_id: usize },
    DeviceRelease { device_id: usize },
}

impl EventKind {
    /// Ordinal used for the equal-time tie-break: releases drain before new
    /// arrivals contend for the device they just freed.
    fn ordinal(&self) -> u8 {
        match self {
            EventKind::DeviceRelease { .. } => 0,
            EventKind::GenerateNewRequest { .. } => 1,
        }
    }

    fn id(&self) -> usize {
        match self {
            EventKind::DeviceRelease { device_id } => *device_id,
            EventKind::GenerateNewRequest { source_id } => *source_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub planned_time: Time,
    pub kind: EventKind,
}

impl Event {
    pub fn new(planned_time: Time, kind: EventKind) -> Self {
        Self { planned_time, kind }
    }
}

// `BinaryHeap` is a max-heap; every comparison below is reversed so that the
// earliest-time, then release-before-generate, then lowest-id event sorts as
// the maximum and is what `pop()` returns.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .planned_time
            .cmp(&self.planned_time)
            .then_with(|| other.kind.ordinal().cmp(&self.kind.ordinal()))
            .then_with(|| other.kind.id().cmp(&self.kind.id()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The priority-ordered event calendar. Opaque to the kernel beyond the
/// operations below.
#[derive(Debug, Default)]
pub struct Calendar {
    heap: BinaryHeap<Event>,
}

impl Calendar {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(event);
    }

    pub fn pop_top(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove every `GenerateNewRequest` event once the target request count
    /// has been reached. In-flight `DeviceRelease` events must survive so the
    /// simulation can drain.
    pub fn remove_excess_generations(&mut self) {
        let survivors: Vec<Event> = self
            .heap
            .drain()
            .filter(|e| !matches!(e.kind, EventKind::GenerateNewRequest { .. }))
            .collect();
        self.heap = BinaryHeap::from(survivors);
    }
}
