//! Client-side simulation: local prediction plus the view of everyone
//! else assembled from server broadcasts.
//!
//! Only the local player has physics. Remote players are ghosts: their
//! rectangles sit wherever the last `PlayerMoved` put them, snapping on
//! every update. Coin collection is optimistic: the coin disappears
//! locally the moment we touch it and a claim goes out; if the server
//! rejects the claim nothing is rolled back, and the view heals on the
//! next full coin broadcast.

use crate::input::InputSample;
use log::debug;
use shared::{
    default_platform_layout, Packet, PhysicsBody, PlayerState, Vec2, World, MOVE_SPEED,
    PLAYER_HEIGHT, PLAYER_WIDTH, SPAWN_X, SPAWN_Y,
};
use std::collections::HashMap;

pub struct ClientSimulator {
    pub player_id: Option<u32>,
    pub body: PhysicsBody,
    pub world: World,
    pub remote_players: HashMap<u32, PlayerState>,
    pub score: u32,
    pub winner: Option<u32>,
}

impl ClientSimulator {
    pub fn new() -> Self {
        Self {
            player_id: None,
            body: PhysicsBody::new(
                Vec2::new(SPAWN_X, SPAWN_Y),
                Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            ),
            world: World::new(default_platform_layout()),
            remote_players: HashMap::new(),
            score: 0,
            winner: None,
        }
    }

    /// Advances one frame and returns the packets to fire at the server:
    /// always the movement report, plus one claim per coin collected
    /// this tick. Nothing waits for acknowledgment.
    pub fn tick(&mut self, input: &InputSample) -> Vec<Packet> {
        self.body.velocity.x = 0.0;
        if input.left {
            self.body.velocity.x -= MOVE_SPEED;
        }
        if input.right {
            self.body.velocity.x += MOVE_SPEED;
        }
        if input.jump {
            self.body.jump();
        }

        self.body.integrate();
        self.body.resolve_ground_collision(self.world.platforms());

        let mut outgoing = vec![Packet::PlayerMovement {
            x: self.body.position.x,
            y: self.body.position.y,
        }];

        for index in self.world.collect_overlapping(&self.body.bounds()) {
            self.score += 1;
            debug!("collected local coin at index {} (score {})", index, self.score);
            outgoing.push(Packet::CollectCoin {
                coin_index: index as u32,
            });
        }

        outgoing
    }

    /// Applies one authoritative broadcast to the local view.
    pub fn apply(&mut self, packet: Packet) {
        match packet {
            Packet::CurrentPlayers { players } => {
                for (id, player) in players {
                    if Some(id) != self.player_id {
                        self.remote_players.insert(id, player);
                    }
                }
            }

            Packet::CurrentCoins { coins } => {
                self.world.set_coins(coins);
            }

            Packet::NewPlayer { id, player } => {
                if Some(id) != self.player_id {
                    self.remote_players.insert(id, player);
                }
            }

            Packet::PlayerMoved { id, x, y } => {
                // Positions snap straight to the reported value; ghosts
                // have no interpolation.
                if let Some(ghost) = self.remote_players.get_mut(&id) {
                    ghost.x = x;
                    ghost.y = y;
                }
            }

            Packet::CoinCollected {
                coin_index,
                player_id,
                new_score,
            } => {
                if Some(player_id) == self.player_id {
                    // Our own accepted claim: the coin already left the
                    // local view when we claimed it, so only the score is
                    // news.
                    self.score = new_score;
                } else {
                    self.world.remove_coin(coin_index as usize);
                    if let Some(ghost) = self.remote_players.get_mut(&player_id) {
                        ghost.score = new_score;
                    }
                }
            }

            Packet::GameOver { winner_id, players } => {
                self.winner = winner_id;
                for (id, player) in players {
                    if Some(id) == self.player_id {
                        self.score = player.score;
                    } else if let Some(ghost) = self.remote_players.get_mut(&id) {
                        ghost.score = player.score;
                    }
                }
            }

            Packet::ResetCoins { coins } => {
                self.world.set_coins(coins);
                self.winner = None;
                self.score = 0;
            }

            Packet::ResetScores { players } => {
                for (id, player) in players {
                    if let Some(ghost) = self.remote_players.get_mut(&id) {
                        ghost.score = player.score;
                    }
                }
            }

            Packet::PlayerDisconnected { id } => {
                self.remote_players.remove(&id);
            }

            // Connection management is the network layer's job; the
            // remaining variants are server-bound and never arrive here.
            _ => {}
        }
    }
}

impl Default for ClientSimulator {
    fn default() -> Self {
        Self::new()
    }
}
