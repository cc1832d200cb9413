//! Level-construction and spatial-reasoning core for a terminal maze-chase
//! game.
//!
//! The library turns ASCII level text into a validated [`maze::Maze`],
//! assembles per-level [`game::GameState`] snapshots, and provides the
//! spatial primitives ([`maze::move_from`], [`path::path_between`]) that the
//! interactive shell and its ghost-control glue run on. High scores travel
//! through [`scores`]. Everything here is pure and terminal-free; all
//! randomness is drawn through an explicitly threaded `rand` generator so a
//! fixed seed reproduces a whole run.

pub mod fruit;
pub mod game;
pub mod geometry;
pub mod levels;
pub mod maze;
pub mod path;
pub mod scores;

pub use fruit::{Fruit, FruitKind};
pub use game::{GameState, Ghost, GhostName, GhostState, LoadError, Mode, Placement};
pub use geometry::{Direction, Point};
pub use maze::{move_from, no_walls, Maze, MazeError, Tile};
pub use path::{path_between, NoPathError};
pub use scores::HighScore;
