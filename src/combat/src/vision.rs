//! Line-of-sight and field-of-view computation.
//!
//! Full recompute every call: every tile inside the radius circle gets its
//! own Bresenham ray. Cost is O(radius²) rays, fine for small boards; switch
//! to shadowcasting if boards grow past a few thousand tiles.
use crate::position::Position;

/// Stateless field-of-view helpers
pub struct VisionSystem;

impl VisionSystem {
    /// Positions visible from `origin` within `radius`, truncated to a
    /// `width`×`height` board. `blocks_vision` is only queried for in-bounds
    /// positions. The origin is always visible.
    pub fn calculate_fov(
        origin: Position,
        radius: u32,
        width: i32,
        height: i32,
        blocks_vision: &dyn Fn(Position) -> bool,
    ) -> Vec<Position> {
        let mut visible = Vec::new();
        let r = radius as i32;
        let radius_sq = r * r;

        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                let target = origin.offset(dx, dy);
                if target.x < 0 || target.y < 0 || target.x >= width || target.y >= height {
                    continue;
                }
                if Self::has_line_of_sight(origin, target, blocks_vision) {
                    visible.push(target);
                }
            }
        }

        visible
    }

    /// True when no tile strictly between `from` and `to` blocks vision.
    /// The endpoints themselves are never tested, so walls are visible.
    pub fn has_line_of_sight(
        from: Position,
        to: Position,
        blocks_vision: &dyn Fn(Position) -> bool,
    ) -> bool {
        Self::bresenham(from, to)
            .into_iter()
            .filter(|p| *p != from && *p != to)
            .all(|p| !blocks_vision(p))
    }

    /// Integer Bresenham line, both endpoints included
    pub fn bresenham(from: Position, to: Position) -> Vec<Position> {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (from.x, from.y);
        let mut line = Vec::with_capacity((dx - dy) as usize + 1);

        loop {
            line.push(Position::new(x, y));
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_blocks_tiles_behind_it() {
        let wall = Position::new(5, 5);
        let blocks = |p: Position| p == wall;

        assert!(VisionSystem::has_line_of_sight(
            Position::new(3, 5),
            wall,
            &blocks
        ));
        assert!(!VisionSystem::has_line_of_sight(
            Position::new(3, 5),
            Position::new(7, 5),
            &blocks
        ));
    }

    #[test]
    fn open_board_fov_is_a_truncated_circle() {
        let blocks = |_: Position| false;
        let visible = VisionSystem::calculate_fov(Position::new(0, 0), 2, 10, 10, &blocks);

        assert!(visible.contains(&Position::new(0, 0)));
        assert!(visible.contains(&Position::new(2, 0)));
        assert!(visible.contains(&Position::new(1, 1)));
        // (2,2) lies outside the radius-2 circle
        assert!(!visible.contains(&Position::new(2, 2)));
        assert!(visible.iter().all(|p| p.x >= 0 && p.y >= 0));
    }

    #[test]
    fn bresenham_includes_both_endpoints() {
        let line = VisionSystem::bresenham(Position::new(0, 0), Position::new(3, 1));
        assert_eq!(line.first(), Some(&Position::new(0, 0)));
        assert_eq!(line.last(), Some(&Position::new(3, 1)));
        assert_eq!(line.len(), 4);
    }
}
