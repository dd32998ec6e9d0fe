//! Draws the world, players, score and round banner.

use macroquad::prelude::*;
use shared::{PlayerState, Vec2, World, COIN_SIZE, PLAYER_HEIGHT, PLAYER_WIDTH};
use std::collections::HashMap;

const BACKGROUND: Color = Color::new(0.94, 0.94, 0.94, 1.0);
// Palette: teal local player, red ghosts, brown platforms, gold coins.
const LOCAL_PLAYER: Color = Color::new(0.0, 0.53, 0.62, 1.0);
const REMOTE_PLAYER: Color = Color::new(0.85, 0.25, 0.25, 1.0);
const PLATFORM: Color = Color::new(0.31, 0.29, 0.22, 1.0);
const COIN: Color = Color::new(1.0, 0.81, 0.31, 1.0);

/// Everything one frame needs, borrowed from the simulator.
pub struct Scene<'a> {
    pub world: &'a World,
    pub local_position: Vec2,
    pub score: u32,
    pub remote_players: &'a HashMap<u32, PlayerState>,
    pub winner: Option<u32>,
    pub player_id: Option<u32>,
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn render(&mut self, scene: Scene) {
        clear_background(BACKGROUND);

        for platform in scene.world.platforms() {
            let b = platform.bounds;
            draw_rectangle(b.x, b.y, b.w, b.h, PLATFORM);
        }

        for coin in scene.world.coins() {
            draw_rectangle(coin.x, coin.y, COIN_SIZE, COIN_SIZE, COIN);
        }

        for ghost in scene.remote_players.values() {
            draw_rectangle(ghost.x, ghost.y, PLAYER_WIDTH, PLAYER_HEIGHT, REMOTE_PLAYER);
        }

        draw_rectangle(
            scene.local_position.x,
            scene.local_position.y,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
            LOCAL_PLAYER,
        );

        draw_text(&format!("Score: {}", scene.score), 10.0, 30.0, 24.0, BLACK);

        if let Some(winner) = scene.winner {
            let banner = if scene.player_id == Some(winner) {
                "You win!".to_string()
            } else {
                format!("Player {} wins!", winner)
            };
            draw_text(
                &banner,
                self.width / 2.0 - 100.0,
                self.height / 2.0,
                40.0,
                GOLD,
            );
        }
    }
}
