use bevy::prelude::*;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ClockHandle(u64);

#[derive(Debug)]
struct Subscription {
    handle: ClockHandle,
    timer: Timer,
}

/// Cancelable periodic tick source for mileage accrual.
///
/// Time is pushed in through [`MileageClock::advance`], so tests drive ticks
/// without waiting on a real clock. Cancelling takes effect immediately: a
/// cancelled subscription never reports another tick.
#[derive(Resource, Debug, Default)]
pub struct MileageClock {
    next_handle: u64,
    active: Option<Subscription>,
}

impl MileageClock {
    /// Replaces any existing subscription.
    pub fn subscribe(&mut self, interval: Duration) -> ClockHandle {
        self.next_handle += 1;
        let handle = ClockHandle(self.next_handle);
        let interval = if interval.is_zero() {
            Duration::from_millis(1)
        } else {
            interval
        };
        self.active = Some(Subscription {
            handle,
            timer: Timer::new(interval, TimerMode::Repeating),
        });
        handle
    }

    /// Stale handles are ignored. Returns whether delivery stopped.
    pub fn cancel(&mut self, handle: ClockHandle) -> bool {
        match &self.active {
            Some(subscription) if subscription.handle == handle => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn handle(&self) -> Option<ClockHandle> {
        self.active.as_ref().map(|subscription| subscription.handle)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of whole intervals completed during `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        match self.active.as_mut() {
            Some(subscription) => {
                subscription.timer.tick(elapsed);
                subscription.timer.times_finished_this_tick()
            }
            None => 0,
        }
    }
}
