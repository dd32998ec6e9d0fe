//! Static platform geometry and the index-addressed local coin view.

use crate::physics::{overlaps, Rect, Vec2};
use crate::COIN_SIZE;

/// A landing surface. Created at world construction and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub bounds: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            bounds: Rect::new(x, y, w, h),
        }
    }
}

/// The collision rectangle of a coin at `position`.
pub fn coin_bounds(position: Vec2) -> Rect {
    Rect::new(position.x, position.y, COIN_SIZE, COIN_SIZE)
}

/// Platforms plus the locally known coins. The coin list is addressed by
/// position in the sequence: removing one shifts every later index down,
/// mirroring how the server's ledger encodes removals on the wire.
#[derive(Debug, Clone)]
pub struct World {
    platforms: Vec<Platform>,
    coins: Vec<Vec2>,
}

impl World {
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self {
            platforms,
            coins: Vec::new(),
        }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn coins(&self) -> &[Vec2] {
        &self.coins
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    /// Replaces the entire coin view (round seed or reset broadcast).
    pub fn set_coins(&mut self, coins: Vec<Vec2>) {
        self.coins = coins;
    }

    /// Removes the coin at `index` if it exists. Later indices shift down.
    pub fn remove_coin(&mut self, index: usize) -> Option<Vec2> {
        if index < self.coins.len() {
            Some(self.coins.remove(index))
        } else {
            None
        }
    }

    /// Removes every coin overlapping `bounds`, scanning in sequence
    /// order, and reports each one at the index it occupied when removed.
    /// A server applying the reported indices in the same order ends up
    /// removing the same coins.
    pub fn collect_overlapping(&mut self, bounds: &Rect) -> Vec<usize> {
        let mut collected = Vec::new();
        let mut index = 0;

        while index < self.coins.len() {
            if overlaps(bounds, &coin_bounds(self.coins[index])) {
                self.coins.remove(index);
                collected.push(index);
            } else {
                index += 1;
            }
        }

        collected
    }
}

/// The twelve landing surfaces every client simulates against.
pub fn default_platform_layout() -> Vec<Platform> {
    vec![
        Platform::new(0.0, 850.0, 400.0, 20.0),
        Platform::new(500.0, 800.0, 400.0, 20.0),
        Platform::new(1000.0, 750.0, 400.0, 20.0),
        Platform::new(200.0, 650.0, 400.0, 20.0),
        Platform::new(700.0, 600.0, 400.0, 20.0),
        Platform::new(1200.0, 550.0, 400.0, 20.0),
        Platform::new(0.0, 450.0, 400.0, 20.0),
        Platform::new(500.0, 400.0, 400.0, 20.0),
        Platform::new(1000.0, 350.0, 400.0, 20.0),
        Platform::new(300.0, 250.0, 400.0, 20.0),
        Platform::new(800.0, 200.0, 400.0, 20.0),
        Platform::new(1100.0, 150.0, 400.0, 20.0),
    ]
}

/// Coin positions the server mints when it starts.
pub fn initial_coin_layout() -> Vec<Vec2> {
    vec![
        Vec2::new(200.0, 800.0),
        Vec2::new(800.0, 700.0),
        Vec2::new(1400.0, 600.0),
        Vec2::new(400.0, 500.0),
        Vec2::new(1200.0, 450.0),
        Vec2::new(600.0, 350.0),
        Vec2::new(1000.0, 250.0),
        Vec2::new(300.0, 150.0),
        Vec2::new(1100.0, 100.0),
        Vec2::new(750.0, 50.0),
    ]
}

/// Coin positions restocked after each round.
pub fn reset_coin_layout() -> Vec<Vec2> {
    vec![
        Vec2::new(150.0, 150.0),
        Vec2::new(350.0, 200.0),
        Vec2::new(600.0, 100.0),
    ]
}
