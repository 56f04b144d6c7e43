//! Time sources and fixed-cadence tickers.

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant, for tests and `--at` overrides.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A ticker that yields instants at a fixed cadence for a fixed count.
///
/// Models the refresh loop of a caller that re-evaluates the status on a
/// timer, without sleeping.
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Duration, Utc};
/// use offpeak_planner::schedule::clock::Ticker;
///
/// let start = DateTime::<Utc>::UNIX_EPOCH;
/// let mut ticker = Ticker::new(start, Duration::minutes(15), 3);
/// let mut ticks = Vec::new();
///
/// ticker.run(|at| ticks.push(at));
/// assert_eq!(ticks.len(), 3);
/// assert_eq!(ticks[2], start + Duration::minutes(30));
/// ```
#[derive(Debug, Clone)]
pub struct Ticker {
    /// Instant of the next tick
    next: DateTime<Utc>,
    /// Interval between ticks
    step: Duration,
    /// Ticks left to yield
    remaining: usize,
}

impl Ticker {
    /// Creates a ticker starting at `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - Instant of the first tick
    /// * `step` - Interval between ticks
    /// * `count` - Total number of ticks
    pub fn new(start: DateTime<Utc>, step: Duration, count: usize) -> Self {
        Self {
            next: start,
            step,
            remaining: count,
        }
    }

    /// Advances the ticker by one step.
    ///
    /// # Returns
    ///
    /// * `Some(instant)` - The instant of this tick
    /// * `None` - If all ticks have been yielded
    pub fn tick(&mut self) -> Option<DateTime<Utc>> {
        if self.remaining == 0 {
            return None;
        }
        let at = self.next;
        self.next = at + self.step;
        self.remaining -= 1;
        Some(at)
    }

    /// Runs `f` for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(DateTime<Utc>)) {
        while let Some(at) = self.tick() {
            f(at);
        }
    }
}
