//! The wire contract between client and server.
//!
//! Every message is fire-and-forget: clients never wait for
//! acknowledgment, the server broadcasts at most once, and nothing is
//! retried. Encoding is bincode over the serde derives below.

use crate::physics::Vec2;
use crate::{SPAWN_X, SPAWN_Y};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A player's last reported position and authoritative score. Keyed by
/// player id wherever it travels in a map.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub score: u32,
}

impl PlayerState {
    /// A freshly connected player at the spawn point.
    pub fn at_spawn() -> Self {
        Self {
            x: SPAWN_X,
            y: SPAWN_Y,
            score: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> server
    Connect {
        client_version: u32,
    },
    /// Reports the predicted position. The server stores it unvalidated.
    PlayerMovement {
        x: f32,
        y: f32,
    },
    /// Claims the coin currently at `coin_index` in the claimant's view.
    CollectCoin {
        coin_index: u32,
    },
    Disconnect,

    // server -> client
    Connected {
        player_id: u32,
    },
    /// Snapshot of every connected player, sent once on connect.
    CurrentPlayers {
        players: HashMap<u32, PlayerState>,
    },
    /// Snapshot of the remaining coins in ledger order, sent once on connect.
    CurrentCoins {
        coins: Vec<Vec2>,
    },
    NewPlayer {
        id: u32,
        player: PlayerState,
    },
    PlayerMoved {
        id: u32,
        x: f32,
        y: f32,
    },
    /// An accepted claim: the coin at `coin_index` is gone and the
    /// collector's score is now `new_score`. Broadcast to everyone so all
    /// index spaces shift together.
    CoinCollected {
        coin_index: u32,
        player_id: u32,
        new_score: u32,
    },
    GameOver {
        winner_id: Option<u32>,
        players: HashMap<u32, PlayerState>,
    },
    ResetCoins {
        coins: Vec<Vec2>,
    },
    ResetScores {
        players: HashMap<u32, PlayerState>,
    },
    PlayerDisconnected {
        id: u32,
    },
    /// Terminal notice, e.g. when the server is full.
    Disconnected {
        reason: String,
    },
}
