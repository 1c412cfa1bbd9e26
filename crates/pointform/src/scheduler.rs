//! Timers for the render loop.
//!
//! Time is a [`Duration`] since an origin chosen by the host. The core never
//! reads a clock itself: whoever pumps the loop passes `now` in, which keeps
//! the loop single-threaded and lets tests drive it with a virtual clock.

use std::time::Duration;

/// Generation-stamped reference to one scheduled timer. Every call to
/// [`Scheduler::schedule`] hands out a new generation, so a handle kept past
/// its cancellation can never be mistaken for a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    generation: u64,
}

impl TimerHandle {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

pub trait Scheduler {
    /// Arms a timer firing `delay` after `now`.
    fn schedule(&mut self, now: Duration, delay: Duration) -> TimerHandle;

    /// Disarms `handle`. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Removes and returns every timer due at `now`, earliest first.
    fn take_due(&mut self, now: Duration) -> Vec<TimerHandle>;

    fn next_deadline(&self) -> Option<Duration>;
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_generation: u64,
    armed: Vec<(Duration, TimerHandle)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, now: Duration, delay: Duration) -> TimerHandle {
        self.next_generation += 1;
        let handle = TimerHandle {
            generation: self.next_generation,
        };
        self.armed.push((now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.retain(|(_, h)| *h != handle);
    }

    fn take_due(&mut self, now: Duration) -> Vec<TimerHandle> {
        let mut due: Vec<(Duration, TimerHandle)> = Vec::new();
        self.armed.retain(|&(deadline, handle)| {
            if deadline <= now {
                due.push((deadline, handle));
                false
            } else {
                true
            }
        });
        due.sort();
        due.into_iter().map(|(_, h)| h).collect()
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.armed.iter().map(|(deadline, _)| *deadline).min()
    }
}
