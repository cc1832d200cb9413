//! Built-in level layouts.
//!
//! Both layouts use the full glyph set: `|`/`=` walls, a west/east warp
//! tunnel, a one-way pen door (`^`), pellets and power pellets, the `P` and
//! ghost spawn markers, and `?` fruit candidates. Levels past the built-in
//! set cycle.

pub const LEVEL_A: &str = "\
===================
|*.......?.......*|
|.===.==.=.==.===.|
|.................|
|.==.==.=.=.==.==.|
|......==^==......|
|..==..|pic|..==..|
|......=====......|
|.==.==.....==.==.|
w........b........w
|.==.===.=.===.==.|
|........=........|
|.=.===.=.=.===.=.|
|*...P...?.......*|
===================
";

pub const LEVEL_B: &str = "\
===================
|*.......?.......*|
|.=.==.=====.==.=.|
|.................|
|.===.==.=.==.===.|
|......==^==......|
|..==..|pic|..==..|
|......=====......|
|.==.=.......=.==.|
w........b........w
|.===.==.=.==.===.|
|.................|
|.==.==.===.==.==.|
|*......P?.......*|
===================
";

const ROTATION: [&str; 2] = [LEVEL_A, LEVEL_B];

/// The layout for a 1-indexed level number.
pub fn level_text(level: u32) -> &'static str {
    let idx = (level.max(1) - 1) as usize % ROTATION.len();
    ROTATION[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Maze;

    #[test]
    fn built_in_levels_parse() {
        for text in ROTATION {
            let maze = Maze::parse(text).unwrap();
            assert_eq!(maze.rows(), 15);
            assert_eq!(maze.cols(), 19);
            assert!(maze.pellet_count() > 0);
        }
    }

    #[test]
    fn rotation_cycles() {
        assert_eq!(level_text(1), LEVEL_A);
        assert_eq!(level_text(2), LEVEL_B);
        assert_eq!(level_text(3), LEVEL_A);
        assert_eq!(level_text(0), LEVEL_A);
    }

    #[test]
    fn built_in_levels_initialize() {
        use crate::game::GameState;
        use rand::{rngs::StdRng, SeedableRng};

        for (i, text) in ROTATION.into_iter().enumerate() {
            let state =
                GameState::new(StdRng::seed_from_u64(5), Vec::new(), i as u32 + 1, text).unwrap();
            assert_eq!(state.ghosts.len(), 4);
            assert!(state.pellets_remaining > 100);
        }
    }
}
