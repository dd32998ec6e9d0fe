//! Types shared between the game server and client: the wire protocol,
//! the physics/collision primitives both sides simulate with, and the
//! static world layouts.
//!
//! Client and server must agree exactly on the constants below: the
//! client predicts its own motion with them and the server trusts the
//! reported positions.

use std::time::Duration;

pub mod physics;
pub mod protocol;
pub mod world;

pub use physics::{overlaps, PhysicsBody, Rect, Vec2};
pub use protocol::{Packet, PlayerState};
pub use world::{
    default_platform_layout, initial_coin_layout, reset_coin_layout, Platform, World,
};

pub const PROTOCOL_VERSION: u32 = 1;

/// Vertical acceleration added to a body every simulation tick.
/// Positive y points down-screen.
pub const GRAVITY: f32 = 0.5;
/// Horizontal speed while a movement key is held, per tick.
pub const MOVE_SPEED: f32 = 5.0;
/// Impulse applied to vertical velocity on jump.
pub const JUMP_VELOCITY: f32 = -10.0;

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 100.0;
pub const COIN_SIZE: f32 = 20.0;

/// Where newly connected players appear.
pub const SPAWN_X: f32 = 100.0;
pub const SPAWN_Y: f32 = 200.0;

pub const WORLD_WIDTH: f32 = 1600.0;
pub const WORLD_HEIGHT: f32 = 900.0;

/// How long the server waits after a round ends before restocking coins
/// and zeroing scores.
pub const RESET_DELAY: Duration = Duration::from_secs(5);
