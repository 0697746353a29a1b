use futures::Stream;
use log::info;
use std::{
    future::{Future, poll_fn},
    pin::Pin,
    task::{Context, Poll, ready},
    time::Duration,
};
use tokio::time::{self, Instant, Sleep};

/// An endless stream of ticks, one period apart, the first one period after creation.
///
/// Missed ticks are skipped so a slow tick doesn't cause a burst of catch-up
/// ticks afterwards.
pub struct Ticker {
    sleep: Pin<Box<Sleep>>,
    period: Duration,
}

impl Ticker {
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "`period` must be non-zero");

        Self {
            sleep: Box::pin(time::sleep(period)),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cancels the pending tick and arms the next one a full `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn rearm(&mut self, period: Duration) {
        assert!(!period.is_zero(), "`period` must be non-zero");

        self.period = period;
        self.sleep.as_mut().reset(Instant::now() + period);
    }

    /// Waits for the next tick. Cancel-safe.
    pub async fn tick(&mut self) -> Instant {
        poll_fn(|cx| self.poll_tick(cx)).await
    }

    fn poll_tick(&mut self, cx: &mut Context<'_>) -> Poll<Instant> {
        ready!(self.sleep.as_mut().poll(cx));

        let fired = self.sleep.deadline();
        let now = Instant::now();
        let late = now.saturating_duration_since(fired);
        let behind = Duration::from_nanos((late.as_nanos() % self.period.as_nanos()) as u64);
        self.sleep.as_mut().reset(now + self.period - behind);

        Poll::Ready(fired)
    }
}

impl Stream for Ticker {
    type Item = Instant;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_tick(cx).map(Some)
    }
}

/// Periodic timer driving the sampling loop.
///
/// The scheduler is `Stopped` until [`start`](Scheduler::start) and `Running`
/// from then on; [`restart`](Scheduler::restart) only changes the period.
///
/// The timer is owned by whoever awaits [`tick`](Scheduler::tick), so
/// rearming it under `&mut self` can't race with a tick of the old period.
///
/// # Example
///
/// ```no_run
/// use agent::Scheduler;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let mut scheduler = Scheduler::new();
///     scheduler.start(Duration::from_secs(5));
///
///     scheduler.tick().await;
///     scheduler.restart(Duration::from_secs(10));
///
///     // Fires 10 seconds after the restart.
///     scheduler.tick().await;
/// }
/// ```
#[derive(Default)]
pub struct Scheduler {
    ticker: Option<Ticker>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { ticker: None }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Period of the armed timer, if any.
    pub fn period(&self) -> Option<Duration> {
        self.ticker.as_ref().map(Ticker::period)
    }

    /// Arms the timer. The first tick fires one `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if the timer is already armed or `period` is zero.
    pub fn start(&mut self, period: Duration) {
        assert!(self.ticker.is_none(), "scheduler is already running");

        info!("[SCHEDULER] Starting with period {:?}", period);
        self.ticker = Some(Ticker::new(period));
    }

    /// Rearms the timer at `period`.
    ///
    /// No tick of the old period fires after this returns, and the next tick
    /// fires one new `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if the scheduler was never started or `period` is zero.
    pub fn restart(&mut self, period: Duration) {
        let Some(ticker) = self.ticker.as_mut() else {
            panic!("scheduler is not running");
        };

        info!("[SCHEDULER] Restarting with period {:?}", period);
        ticker.rearm(period);
    }

    /// Waits for the next tick. Never completes while stopped.
    ///
    /// Cancel-safe, so it can be used as a `select!` branch.
    pub async fn tick(&mut self) -> Instant {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.tick().await,
            None => std::future::pending().await,
        }
    }
}

/// Converts a frequency in whole seconds to a timer period.
pub fn period_from_secs(seconds: u32) -> Duration {
    Duration::from_secs(u64::from(seconds))
}
