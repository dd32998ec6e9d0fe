//! The round state machine: `Active -> Over -> Active`.
//!
//! The reset back to Active runs on an explicit deadline owned here, so
//! it can be inspected and cancelled; the network loop supplies the clock
//! and fires the reset when [`RoundController::reset_deadline`] elapses.

use log::info;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Active,
    Over { winner_id: Option<u32> },
}

#[derive(Debug)]
pub struct RoundController {
    phase: Phase,
    reset_at: Option<Instant>,
    reset_delay: Duration,
}

impl RoundController {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            phase: Phase::Active,
            reset_at: None,
            reset_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Over { .. })
    }

    /// Ends the round and schedules the reset. Returns false without
    /// effect if the round is already over, so a round-over event is
    /// strictly one-shot.
    pub fn finish(&mut self, winner_id: Option<u32>, now: Instant) -> bool {
        if self.is_over() {
            return false;
        }
        info!("round over, winner: {:?}", winner_id);
        self.phase = Phase::Over { winner_id };
        self.reset_at = Some(now + self.reset_delay);
        true
    }

    /// When the pending reset, if any, should fire.
    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_at
    }

    /// Drops any pending reset without changing phase.
    pub fn cancel_reset(&mut self) {
        self.reset_at = None;
    }

    /// Starts a fresh round, cancelling a pending reset first.
    pub fn begin(&mut self) {
        self.cancel_reset();
        self.phase = Phase::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RoundController {
        RoundController::new(Duration::from_secs(5))
    }

    #[test]
    fn finish_is_one_shot() {
        let mut round = controller();
        let now = Instant::now();

        assert!(round.finish(Some(1), now));
        assert_eq!(round.phase(), Phase::Over { winner_id: Some(1) });
        let deadline = round.reset_deadline().unwrap();
        assert_eq!(deadline, now + Duration::from_secs(5));

        // A second finish neither rewrites the winner nor reschedules.
        assert!(!round.finish(Some(2), now + Duration::from_secs(1)));
        assert_eq!(round.phase(), Phase::Over { winner_id: Some(1) });
        assert_eq!(round.reset_deadline(), Some(deadline));
    }

    #[test]
    fn begin_clears_winner_and_deadline() {
        let mut round = controller();
        round.finish(Some(7), Instant::now());

        round.begin();
        assert_eq!(round.phase(), Phase::Active);
        assert!(round.reset_deadline().is_none());
    }

    #[test]
    fn cancel_keeps_phase() {
        let mut round = controller();
        round.finish(None, Instant::now());

        round.cancel_reset();
        assert!(round.is_over());
        assert!(round.reset_deadline().is_none());
    }
}
