//! # Game Server Library
//!
//! The authoritative half of the coin-collection platformer. The server
//! owns the canonical player table, the coin ledger and the round state
//! machine; clients simulate their own movement and report it, and the
//! server decides everything worth arguing about: who collected which
//! coin, and who won the round.
//!
//! ## Trust model
//!
//! Reported positions are stored as-is: the server runs no physics and
//! performs no plausibility checks on movement. That is a deliberate
//! scope boundary, not an oversight. The only contested resource is the
//! coin ledger, and that is protected by processing every inbound message
//! to completion on a single event loop before the next is taken. A coin
//! can be credited to at most one claimant because claims are decided in
//! arrival order against the live ledger, and the remaining coin count
//! only ever shrinks within a round.
//!
//! ## Module organization
//!
//! - [`session`]: connection bookkeeping, monotonic identity allocation,
//!   address resolution, capacity and timeout sweeping.
//! - [`game`]: the owned authoritative state threaded through every
//!   handler, with the player table, ledger access and winner scan.
//! - [`ledger`]: the coin arena, stable ids internally and positional
//!   indices on the wire, claims applied strictly in arrival order.
//! - [`round`]: the `Active -> Over -> Active` machine with an explicit,
//!   cancellable reset deadline.
//! - [`network`]: UDP IO tasks around the single `select!` event loop
//!   that serializes all of the above.

pub mod game;
pub mod ledger;
pub mod network;
pub mod round;
pub mod session;
