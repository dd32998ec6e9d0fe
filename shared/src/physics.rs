//! Axis-aligned collision math and the per-tick body simulation.
//!
//! The simulation is tick-based: one call to [`PhysicsBody::integrate`]
//! advances exactly one frame, with no delta-time scaling. Both the client
//! prediction and any offline simulation of it are therefore bit-identical.

use crate::world::Platform;
use crate::{GRAVITY, JUMP_VELOCITY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Open-interval AABB intersection. All four comparisons are strict, so
/// rectangles that merely touch along an edge do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x + a.w > b.x && b.x + b.w > a.x && a.y + a.h > b.y && b.y + b.h > a.y
}

/// Position, velocity and extent of a simulated entity. One body exists
/// per locally simulated player; remote players are rendered from reported
/// positions and carry no body.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub grounded: bool,
}

impl PhysicsBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::default(),
            size,
            grounded: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    /// Advances one tick: gravity into velocity, velocity into position.
    /// Gravity applies even while grounded; landing resolution zeroes it
    /// again the same tick.
    pub fn integrate(&mut self) {
        self.velocity.y += GRAVITY;
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
    }

    /// Landing-only platform resolution, run after [`integrate`].
    ///
    /// A platform catches the body iff the horizontal spans strictly
    /// overlap, the bottom edge ended up below the platform top this tick,
    /// and the bottom edge sat at or above the top before this tick's
    /// vertical motion. Platforms are checked in their fixed order and a
    /// later match overwrites an earlier one. Sides and undersides of
    /// platforms never collide, and nothing limits horizontal travel.
    ///
    /// [`integrate`]: PhysicsBody::integrate
    pub fn resolve_ground_collision(&mut self, platforms: &[Platform]) -> bool {
        self.grounded = false;

        for platform in platforms {
            let top = platform.bounds.y;
            let bottom = self.position.y + self.size.y;

            let horizontal = self.position.x < platform.bounds.x + platform.bounds.w
                && self.position.x + self.size.x > platform.bounds.x;

            if horizontal && bottom > top && bottom - self.velocity.y <= top {
                self.position.y = top - self.size.y;
                self.velocity.y = 0.0;
                self.grounded = true;
            }
        }

        self.grounded
    }

    /// Applies the jump impulse when grounded; a no-op in the air.
    pub fn jump(&mut self) {
        if self.grounded {
            self.velocity.y = JUMP_VELOCITY;
            self.grounded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PLAYER_HEIGHT, PLAYER_WIDTH};
    use assert_approx_eq::assert_approx_eq;

    fn player_body(x: f32, y: f32) -> PhysicsBody {
        PhysicsBody::new(Vec2::new(x, y), Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        assert!(overlaps(&a, &b));

        let far = Rect::new(100.0, 100.0, 10.0, 10.0);
        assert_eq!(overlaps(&a, &far), overlaps(&far, &a));
        assert!(!overlaps(&a, &far));
    }

    #[test]
    fn rect_overlaps_itself() {
        let a = Rect::new(3.0, -2.0, 7.5, 1.0);
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        let corner = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &right));
        assert!(!overlaps(&a, &below));
        assert!(!overlaps(&a, &corner));
    }

    #[test]
    fn integrate_applies_gravity_then_velocity() {
        let mut body = player_body(100.0, 200.0);
        body.velocity = Vec2::new(5.0, 1.0);

        body.integrate();

        assert_approx_eq!(body.velocity.y, 1.0 + GRAVITY);
        assert_approx_eq!(body.position.x, 105.0);
        assert_approx_eq!(body.position.y, 200.0 + 1.0 + GRAVITY);
    }

    #[test]
    fn falling_body_snaps_to_platform_top() {
        let platform = Platform::new(0.0, 400.0, 400.0, 20.0);
        let mut body = player_body(50.0, 400.0 - PLAYER_HEIGHT - 2.0);
        body.velocity.y = 8.0;

        body.integrate();
        let grounded = body.resolve_ground_collision(std::slice::from_ref(&platform));

        assert!(grounded);
        assert!(body.grounded);
        assert_approx_eq!(body.position.y, 400.0 - PLAYER_HEIGHT);
        assert_approx_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn horizontal_pass_through_side_never_grounds() {
        let platform = Platform::new(200.0, 400.0, 400.0, 20.0);
        // Body already level with the platform, moving purely sideways
        // into it. Its previous bottom edge was below the top, so the
        // landing test must not fire.
        let mut body = player_body(200.0 - PLAYER_WIDTH + 1.0, 405.0 - PLAYER_HEIGHT + 50.0);
        body.velocity.x = crate::MOVE_SPEED;
        let y_before = body.position.y;

        body.integrate();
        // Undo the tick's gravity drop so the body stays side-on.
        body.position.y = y_before;
        body.velocity.y = 0.0;
        let grounded = body.resolve_ground_collision(std::slice::from_ref(&platform));

        assert!(!grounded);
        assert_approx_eq!(body.position.y, y_before);
    }

    #[test]
    fn body_below_platform_is_not_caught() {
        let platform = Platform::new(0.0, 400.0, 400.0, 20.0);
        let mut body = player_body(50.0, 500.0);
        body.velocity.y = 3.0;

        body.integrate();
        let grounded = body.resolve_ground_collision(std::slice::from_ref(&platform));

        assert!(!grounded);
    }

    #[test]
    fn leaving_platform_clears_grounded() {
        let platform = Platform::new(0.0, 400.0, 100.0, 20.0);
        let mut body = player_body(10.0, 400.0 - PLAYER_HEIGHT - 1.0);
        body.velocity.y = 2.0;
        body.integrate();
        assert!(body.resolve_ground_collision(std::slice::from_ref(&platform)));

        // Walk far enough right that the spans no longer overlap.
        body.position.x = 500.0;
        body.integrate();
        assert!(!body.resolve_ground_collision(std::slice::from_ref(&platform)));
        assert!(!body.grounded);
    }

    #[test]
    fn overlapping_platforms_resolve_to_one_snap() {
        // Both platforms share a top edge; the scan keeps going past the
        // first match and the body still ends the tick snapped once.
        let platforms = vec![
            Platform::new(0.0, 400.0, 400.0, 20.0),
            Platform::new(0.0, 400.0, 400.0, 40.0),
        ];
        let mut body = player_body(50.0, 400.0 - PLAYER_HEIGHT - 1.0);
        body.velocity.y = 4.0;

        body.integrate();
        assert!(body.resolve_ground_collision(&platforms));
        assert_approx_eq!(body.position.y, 400.0 - PLAYER_HEIGHT);
    }

    #[test]
    fn jump_only_when_grounded() {
        let mut body = player_body(0.0, 0.0);
        body.velocity.y = 3.0;

        body.jump();
        assert_approx_eq!(body.velocity.y, 3.0);

        body.grounded = true;
        body.jump();
        assert_approx_eq!(body.velocity.y, JUMP_VELOCITY);
        assert!(!body.grounded);

        // No air jump: a second call changes nothing.
        body.jump();
        assert_approx_eq!(body.velocity.y, JUMP_VELOCITY);
    }
}
