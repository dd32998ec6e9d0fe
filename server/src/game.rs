//! Authoritative game state.
//!
//! One owned struct holds everything a round is made of (the player
//! table, the coin ledger and the round phase) and is mutated only from
//! the network event loop, one message at a time. The server runs no
//! physics of its own: positions arrive from clients and are stored as
//! reported.

use crate::ledger::CoinLedger;
use crate::round::{Phase, RoundController};
use log::{debug, info};
use shared::{initial_coin_layout, reset_coin_layout, PlayerState, Vec2};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Outcome of a coin claim, decided at the instant the claim is
/// processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClaimOutcome {
    Accepted {
        coin_index: u32,
        new_score: u32,
    },
    /// Stale index or unknown claimant. Never surfaced to the claimant.
    Rejected,
}

pub struct GameState {
    pub players: HashMap<u32, PlayerState>,
    pub ledger: CoinLedger,
    pub round: RoundController,
}

impl GameState {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            players: HashMap::new(),
            ledger: CoinLedger::new(&initial_coin_layout()),
            round: RoundController::new(reset_delay),
        }
    }

    pub fn add_player(&mut self, id: u32) {
        info!("added player {} at spawn", id);
        self.players.insert(id, PlayerState::at_spawn());
    }

    pub fn remove_player(&mut self, id: &u32) {
        if self.players.remove(id).is_some() {
            info!("removed player {}", id);
        }
    }

    /// Overwrites the player's stored position with the reported one.
    /// No plausibility check happens here: clients are trusted. Returns
    /// false for unknown ids (a disconnect raced the report).
    pub fn report_movement(&mut self, id: u32, x: f32, y: f32) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.x = x;
                player.y = y;
                true
            }
            None => {
                debug!("movement report for unknown player {}", id);
                false
            }
        }
    }

    /// Processes one coin claim: valid index at this instant removes the
    /// coin and credits the claimant; anything else is silently rejected.
    pub fn claim_coin(&mut self, id: u32, coin_index: u32) -> ClaimOutcome {
        let player = match self.players.get_mut(&id) {
            Some(player) => player,
            None => {
                debug!("coin claim from unknown player {}", id);
                return ClaimOutcome::Rejected;
            }
        };

        match self.ledger.claim(coin_index as usize) {
            Some(coin) => {
                player.score += 1;
                info!(
                    "player {} collected coin {} (score {})",
                    id, coin.id, player.score
                );
                ClaimOutcome::Accepted {
                    coin_index,
                    new_score: player.score,
                }
            }
            None => {
                debug!("rejected stale claim from player {} (index {})", id, coin_index);
                ClaimOutcome::Rejected
            }
        }
    }

    /// The player with the strictly highest score, scanning in join order
    /// (ascending id), so the first player to have reached the maximum
    /// wins ties.
    pub fn compute_winner(&self) -> Option<u32> {
        let mut ids: Vec<u32> = self.players.keys().copied().collect();
        ids.sort_unstable();

        let mut winner = None;
        let mut max_score: Option<u32> = None;
        for id in ids {
            let score = self.players[&id].score;
            if max_score.map_or(true, |max| score > max) {
                max_score = Some(score);
                winner = Some(id);
            }
        }
        winner
    }

    /// Ends the round if it just emptied. Returns the winner when this
    /// call performed the transition.
    pub fn finish_round(&mut self, now: Instant) -> Option<Option<u32>> {
        let winner = self.compute_winner();
        if self.round.finish(winner, now) {
            Some(winner)
        } else {
            None
        }
    }

    /// Starts the next round: restocks the ledger with the reset layout,
    /// zeroes every score and clears the winner. Returns the new coin
    /// positions for broadcasting.
    pub fn begin_round(&mut self) -> Vec<Vec2> {
        self.ledger.reset(&reset_coin_layout());
        for player in self.players.values_mut() {
            player.score = 0;
        }
        self.round.begin();
        info!("round reset: {} coins restocked", self.ledger.len());
        self.ledger.positions()
    }

    pub fn is_round_over(&self) -> bool {
        matches!(self.round.phase(), Phase::Over { .. })
    }

    /// Snapshot of the player table as it travels on the wire.
    pub fn player_snapshot(&self) -> HashMap<u32, PlayerState> {
        self.players.clone()
    }
}
