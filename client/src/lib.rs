//! # Game Client Library
//!
//! The predicted half of the coin-collection platformer. The client owns
//! exactly one physics body, its own player, and simulates it locally
//! every frame so input feels immediate regardless of latency. Everything
//! else on screen is assembled from server broadcasts: remote players are
//! ghosts snapped to their last reported position, and the coin list is
//! a local mirror of the server's ledger addressed by index.
//!
//! Coin collection is optimistic. The moment the local rectangle overlaps
//! a coin it disappears from view and a claim is fired at the server;
//! acceptance comes back as a broadcast (which also shifts every other
//! client's indices), while rejection is silent and the missing coin
//! reappears at the next full coin broadcast.
//!
//! ## Module organization
//!
//! - [`game`]: the per-frame simulator and broadcast application.
//! - [`input`]: keyboard sampling with edge-detected jump.
//! - [`network`]: UDP handshake and the frame loop.
//! - [`rendering`]: macroquad drawing of the assembled scene.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
