use qs_core::Request;
use std::collections::VecDeque;

/// Bounded holding area between sources and devices, structured as one FIFO
/// sub-queue per source.
#[derive(Debug)]
pub struct Buffer {
    sub_queues: Vec<VecDeque<Request>>,
    capacity: usize,
    size: usize,
    current_packet: usize,
}

impl Buffer {
    pub fn new(source_count: usize, capacity: usize) -> Self {
        Self {
            sub_queues: (0..source_count).map(|_| VecDeque::new()).collect(),
            capacity,
            size: 0,
            current_packet: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        for q in &mut self.sub_queues {
            q.clear();
        }
        self.size = 0;
        self.current_packet = 0;
    }

    /// Admit `request`, evicting the oldest request of the highest-indexed
    /// non-empty sub-queue if the buffer is already full. Returns the
    /// evicted (rejected) request, if any.
    pub fn put(&mut self, request: Request) -> Option<Request> {
        if self.capacity == 0 {
            // Nothing can ever be stored; the arrival is its own victim.
            return Some(request);
        }

        let rejected = if self.size == self.capacity {
            let victim_queue = self
                .sub_queues
                .iter_mut()
                .rev()
                .find(|q| !q.is_empty())
                .expect("buffer at capacity must have a non-empty sub-queue");
            let victim = victim_queue
                .pop_front()
                .expect("just checked non-empty");
            self.size -= 1;
            Some(victim)
        } else {
            None
        };

        self.sub_queues[request.source_id].push_back(request);
        self.size += 1;
        rejected
    }

    /// Remove and return the next request to be serviced, or `None` if the
    /// buffer is empty. `current_packet` only advances when the sub-queue it
    /// points at is found empty, and then by scanning forward from index 0.
    pub fn take(&mut self) -> Option<Request> {
        if self.size == 0 {
            return None;
        }

        if self.sub_queues[self.current_packet].is_empty() {
            self.current_packet = self
                .sub_queues
                .iter()
                .position(|q| !q.is_empty())
                .expect("buffer is non-empty, so some sub-queue must be non-empty");
        }

        let request = self.sub_queues[self.current_packet]
            .pop_front()
            .expect("current_packet always points at a non-empty sub-queue here");
        self.size -= 1;
        Some(request)
    }

    /// Flat, read-only view of the buffer's contents ordered by
    /// `(generation_time, source_id)`. Pure: never mutates state.
    pub fn snapshot(&self) -> Vec<Request> {
        let mut all: Vec<Request> = self.sub_queues.iter().flatten().copied().collect();
        all.sort_by_key(|r| (r.generation_time, r.source_id));
        all
    }
}
