//! The authoritative coin arena.
//!
//! Coins carry a stable id minted from a monotonic counter; the wire
//! still addresses them by position in the live sequence, so a removal
//! shifts every later index down by one. Claims are only ever applied
//! from the single-threaded event loop, one at a time in arrival order;
//! that serialization, not locking, is what makes a coin impossible to
//! collect twice.

use log::debug;
use shared::Vec2;

/// Stable identity of a coin, unique for the lifetime of the server.
pub type CoinId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub id: CoinId,
    pub position: Vec2,
}

#[derive(Debug)]
pub struct CoinLedger {
    coins: Vec<Coin>,
    next_id: CoinId,
}

impl CoinLedger {
    pub fn new(layout: &[Vec2]) -> Self {
        let mut ledger = Self {
            coins: Vec::new(),
            next_id: 1,
        };
        ledger.mint(layout);
        ledger
    }

    fn mint(&mut self, layout: &[Vec2]) {
        for &position in layout {
            let id = self.next_id;
            self.next_id += 1;
            self.coins.push(Coin { id, position });
        }
    }

    /// Removes and returns the coin at `index`, or `None` when the index
    /// no longer names a live coin (an earlier claim already took it, or
    /// the claimant's view was stale).
    pub fn claim(&mut self, index: usize) -> Option<Coin> {
        if index < self.coins.len() {
            let coin = self.coins.remove(index);
            debug!("coin {} claimed at index {}", coin.id, index);
            Some(coin)
        } else {
            None
        }
    }

    /// Replaces the live coins with a fresh layout. Ids keep counting;
    /// a coin id never comes back.
    pub fn reset(&mut self, layout: &[Vec2]) {
        self.coins.clear();
        self.mint(layout);
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// The remaining coin positions in ledger order, as sent on the wire.
    pub fn positions(&self) -> Vec<Vec2> {
        self.coins.iter().map(|coin| coin.position).collect()
    }
}
