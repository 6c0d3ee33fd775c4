//! Multi-cadence strategy scheduler
//!
//! Each registered strategy owns a [`Timer`]. The session polls the
//! scheduler once per processed inbound message, so timer resolution is
//! bounded below by the exchange's message inter-arrival time: a peer that
//! never sends never fires a timer. A fire that comes late simply runs late;
//! missed intervals are not replayed.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::InvariantViolation;
use crate::ledger::OrderLedger;
use crate::market_state::MarketState;
use crate::messages::ClientMessage;
use crate::strategy::{DecisionContext, Strategy};

/// Fixed-interval timer polled against caller-supplied instants.
///
/// A deadline past the range of `Instant` is never reached, so the timer
/// simply stops firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    interval: Duration,
    next_fire: Option<Instant>,
}

impl Timer {
    /// First fire is due one interval after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_fire: now.checked_add(interval),
        }
    }

    /// Fire if `now` has reached the next fire time, rescheduling to
    /// `now + interval`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(due) if now >= due => {
                self.next_fire = now.checked_add(self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_fire(&self) -> Option<Instant> {
        self.next_fire
    }
}

struct ScheduledStrategy {
    timer: Timer,
    strategy: Box<dyn Strategy>,
    fires: u64,
}

/// Set of independent timers, each bound to a strategy.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<ScheduledStrategy>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `strategy` to a new timer with the given interval.
    pub fn register(&mut self, interval: Duration, strategy: Box<dyn Strategy>, now: Instant) {
        info!(
            strategy = strategy.name(),
            interval_ms = interval.as_millis() as u64,
            "Strategy registered"
        );
        self.entries.push(ScheduledStrategy {
            timer: Timer::new(interval, now),
            strategy,
            fires: 0,
        });
    }

    /// Run every strategy whose timer is due, in registration order.
    ///
    /// Orders they emit are queued on `outbox`. Returns how many fired.
    pub fn poll(
        &mut self,
        now: Instant,
        market: &MarketState,
        ledger: &mut OrderLedger,
        outbox: &mut Vec<ClientMessage>,
    ) -> Result<usize, InvariantViolation> {
        let mut fired = 0;
        for entry in &mut self.entries {
            if !entry.timer.poll(now) {
                continue;
            }
            let before = outbox.len();
            let mut ctx = DecisionContext::new(market, ledger, outbox, now);
            entry.strategy.on_timer(&mut ctx)?;
            entry.fires += 1;
            fired += 1;
            debug!(
                strategy = entry.strategy.name(),
                emitted = outbox.len() - before,
                "Strategy fired"
            );
        }
        Ok(fired)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire counts per strategy name, in registration order.
    pub fn fire_counts(&self) -> Vec<(String, u64)> {
        self.entries
            .iter()
            .map(|e| (e.strategy.name().to_string(), e.fires))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::Symbol;
    use types::order::Side;

    fn at(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn test_timer_fire_and_reset() {
        let base = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(1), base);

        assert!(!timer.poll(at(base, 500)));
        assert!(timer.poll(at(base, 1200)));
        assert_eq!(timer.next_fire(), Some(at(base, 2200)));
        assert!(!timer.poll(at(base, 1500)));
    }

    #[test]
    fn test_timer_fires_on_exact_deadline() {
        let base = Instant::now();
        let mut timer = Timer::new(Duration::from_millis(10), base);
        assert!(timer.poll(base + Duration::from_millis(10)));
    }

    #[test]
    fn test_unreachable_interval_never_fires() {
        let base = Instant::now();
        let mut timer = Timer::new(Duration::MAX, base);
        assert!(timer.next_fire().is_none());
        assert!(!timer.poll(at(base, u32::MAX as u64)));

        let mut scheduler = Scheduler::new();
        scheduler.register(Duration::from_millis(u64::MAX), counter("idle"), base);
        let market = MarketState::new();
        let mut ledger = OrderLedger::new();
        let mut outbox = Vec::new();
        let fired = scheduler
            .poll(at(base, 1_000_000), &market, &mut ledger, &mut outbox)
            .unwrap();
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_late_poll_fires_once() {
        let base = Instant::now();
        let mut timer = Timer::new(Duration::from_secs(1), base);

        // Several intervals elapsed; only one fire, no catch-up.
        assert!(timer.poll(at(base, 5000)));
        assert!(!timer.poll(at(base, 5500)));
        assert!(timer.poll(at(base, 6000)));
    }

    struct Counter {
        name: &'static str,
        symbol: Symbol,
    }

    impl Strategy for Counter {
        fn name(&self) -> &str {
            self.name
        }

        fn on_timer(&mut self, ctx: &mut DecisionContext<'_>) -> Result<(), InvariantViolation> {
            ctx.add(&self.symbol, Side::BUY, 100, 1)?;
            Ok(())
        }
    }

    fn counter(name: &'static str) -> Box<dyn Strategy> {
        Box::new(Counter {
            name,
            symbol: Symbol::new("BOND"),
        })
    }

    #[test]
    fn test_independent_cadences() {
        let base = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.register(Duration::from_millis(100), counter("fast"), base);
        scheduler.register(Duration::from_millis(250), counter("slow"), base);

        let market = MarketState::new();
        let mut ledger = OrderLedger::new();
        let mut outbox = Vec::new();

        for ms in [50, 100, 200, 260, 300, 520] {
            let now = base + Duration::from_millis(ms);
            scheduler.poll(now, &market, &mut ledger, &mut outbox).unwrap();
        }

        // fast fires at 100, 200, 300, 520; slow at 260, 520.
        assert_eq!(
            scheduler.fire_counts(),
            vec![("fast".to_string(), 4), ("slow".to_string(), 2)]
        );
        assert_eq!(outbox.len(), 6);
        assert_eq!(ledger.order_count(), 6);
    }

    #[test]
    fn test_registration_order_within_poll() {
        let base = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.register(Duration::from_millis(10), counter("a"), base);
        scheduler.register(Duration::from_millis(10), counter("b"), base);

        let market = MarketState::new();
        let mut ledger = OrderLedger::new();
        let mut outbox = Vec::new();

        let fired = scheduler
            .poll(base + Duration::from_millis(10), &market, &mut ledger, &mut outbox)
            .unwrap();
        assert_eq!(fired, 2);

        let ids: Vec<u64> = outbox.iter().filter_map(|m| m.order_id()).map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_scheduler() {
        let scheduler = Scheduler::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.len(), 0);
    }
}
