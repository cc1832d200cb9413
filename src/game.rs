//! Per-level game state: actor placement, counters, and the level
//! transitions that rebuild everything around the persistent fields.
//!
//! A [`GameState`] is assembled wholesale from level text and discarded on
//! level change; only the fields the transition functions copy across
//! survive. The random generator lives inside the state and is moved, never
//! reseeded, so one seed drives a whole run.

use rand::rngs::StdRng;
use thiserror::Error;

use crate::fruit::{self, Fruit};
use crate::geometry::{Direction, Point};
use crate::maze::{Maze, MazeError};
use crate::scores::HighScore;

pub const STARTING_LIVES: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error("level has no player marker 'P'")]
    MissingPlayer,
    #[error("level has more than one player marker 'P'")]
    DuplicatePlayer,
    #[error("level has no spawn marker '{}' for {}", .0.marker(), .0.label())]
    MissingGhost(GhostName),
    #[error("level has more than one spawn marker '{}' for {}", .0.marker(), .0.label())]
    DuplicateGhost(GhostName),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostName {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostName {
    pub const ALL: [GhostName; 4] = [
        GhostName::Blinky,
        GhostName::Pinky,
        GhostName::Inky,
        GhostName::Clyde,
    ];

    /// The spawn character in level text.
    pub fn marker(self) -> char {
        match self {
            GhostName::Blinky => 'b',
            GhostName::Pinky => 'p',
            GhostName::Inky => 'i',
            GhostName::Clyde => 'c',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GhostName::Blinky => "Blinky",
            GhostName::Pinky => "Pinky",
            GhostName::Inky => "Inky",
            GhostName::Clyde => "Clyde",
        }
    }

    /// Fixed, level-independent starting direction.
    pub fn start_dir(self) -> Direction {
        match self {
            GhostName::Blinky => Direction::West,
            GhostName::Pinky => Direction::East,
            GhostName::Inky => Direction::North,
            GhostName::Clyde => Direction::South,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostState {
    Normal,
    Edible,
    Returning,
}

/// Where an actor is, where it faces, and where it respawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub pos: Point,
    pub dir: Direction,
    pub home: (Point, Direction),
}

impl Placement {
    fn at(pos: Point, dir: Direction) -> Self {
        Self {
            pos,
            dir,
            home: (pos, dir),
        }
    }

    /// Returns the actor to its spawn position and direction.
    pub fn respawn(&mut self) {
        let (pos, dir) = self.home;
        self.pos = pos;
        self.dir = dir;
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub name: GhostName,
    pub state: GhostState,
    pub placement: Placement,
}

impl Ghost {
    pub fn respawn(&mut self) {
        self.state = GhostState::Normal;
        self.placement.respawn();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    StartScreen,
    Running,
    GameOver,
}

/// Item counters that persist across level advances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub pellets_eaten: u32,
    pub power_pellets_eaten: u32,
    pub ghost_score: u32,
    pub fruit_score: u32,
}

impl Counters {
    pub fn score(&self) -> u32 {
        self.pellets_eaten * 10 + self.power_pellets_eaten * 50 + self.ghost_score
            + self.fruit_score
    }
}

/// The complete per-level snapshot the shell renders and advances.
#[derive(Debug)]
pub struct GameState {
    pub maze: Maze,
    pub player: Placement,
    pub ghosts: Vec<Ghost>,
    pub fruit: Option<Fruit>,
    pub counters: Counters,
    pub pellets_remaining: usize,
    /// Wall-clock seconds across the whole run.
    pub elapsed: f64,
    /// Seconds since this level started.
    pub level_clock: f64,
    /// Seconds of power mode left, zero when inactive.
    pub power_timer: f64,
    /// Seconds a power pellet lasts on this level.
    pub power_secs: f64,
    /// Doubles with each ghost eaten during one power window.
    pub power_multiplier: u32,
    pub mode: Mode,
    pub level: u32,
    pub lives: u32,
    pub scores: Vec<HighScore>,
    pub rng: StdRng,
}

impl GameState {
    /// Builds a fresh game at `level` from level text.
    ///
    /// Parses the maze, locates the player and all four ghost spawn
    /// markers, draws this level's fruit from the `?` candidates, and
    /// zeroes every counter. The caller's generator and high-score table
    /// move into the state.
    pub fn new(
        mut rng: StdRng,
        scores: Vec<HighScore>,
        level: u32,
        maze_text: &str,
    ) -> Result<GameState, LoadError> {
        let maze = Maze::parse(maze_text)?;
        let markers = Markers::scan(maze_text)?;

        let ghosts = markers
            .ghosts
            .into_iter()
            .zip(GhostName::ALL)
            .map(|(pos, name)| Ghost {
                name,
                state: GhostState::Normal,
                placement: Placement::at(pos, name.start_dir()),
            })
            .collect();

        let fruit = fruit::draw_fruit(&mut rng, level, &markers.fruit_spots);
        let pellets_remaining = maze.pellet_count();

        Ok(GameState {
            maze,
            player: Placement::at(markers.player, Direction::West),
            ghosts,
            fruit,
            counters: Counters::default(),
            pellets_remaining,
            elapsed: 0.0,
            level_clock: 0.0,
            power_timer: 0.0,
            power_secs: power_duration(level),
            power_multiplier: 1,
            mode: Mode::StartScreen,
            level,
            lives: STARTING_LIVES,
            scores,
            rng,
        })
    }

    /// Rebuilds for the next level, carrying counters, lives, and elapsed
    /// time. The new state comes up already running.
    pub fn advance_level(self, next_maze_text: &str) -> Result<GameState, LoadError> {
        let GameState {
            rng,
            scores,
            level,
            counters,
            lives,
            elapsed,
            ..
        } = self;
        let mut next = GameState::new(rng, scores, level + 1, next_maze_text)?;
        next.mode = Mode::Running;
        next.counters = counters;
        next.lives = lives;
        next.elapsed = elapsed;
        Ok(next)
    }

    /// Rebuilds at level 1 after a game over, carrying only elapsed time.
    pub fn restart(self, maze_text: &str) -> Result<GameState, LoadError> {
        let GameState {
            rng,
            scores,
            elapsed,
            ..
        } = self;
        let mut next = GameState::new(rng, scores, 1, maze_text)?;
        next.elapsed = elapsed;
        Ok(next)
    }

    pub fn score(&self) -> u32 {
        self.counters.score()
    }
}

/// Power mode shrinks as levels climb but never below two seconds.
fn power_duration(level: u32) -> f64 {
    8u32.saturating_sub(level).max(2) as f64
}

/// Spawn markers located in the raw level text.
struct Markers {
    player: Point,
    ghosts: [Point; 4],
    fruit_spots: Vec<Point>,
}

impl Markers {
    fn scan(text: &str) -> Result<Markers, LoadError> {
        let mut player = None;
        let mut ghosts: [Option<Point>; 4] = [None; 4];
        let mut fruit_spots = Vec::new();

        for (r, line) in text.lines().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let point = Point::new(r as i32 + 1, c as i32 + 1);
                if ch == 'P' {
                    if player.replace(point).is_some() {
                        return Err(LoadError::DuplicatePlayer);
                    }
                } else if ch == '?' {
                    fruit_spots.push(point);
                } else if let Some(idx) =
                    GhostName::ALL.iter().position(|name| name.marker() == ch)
                {
                    if ghosts[idx].replace(point).is_some() {
                        return Err(LoadError::DuplicateGhost(GhostName::ALL[idx]));
                    }
                }
            }
        }

        let player = player.ok_or(LoadError::MissingPlayer)?;
        let mut located = [Point::new(0, 0); 4];
        for (idx, name) in GhostName::ALL.into_iter().enumerate() {
            located[idx] = ghosts[idx].ok_or(LoadError::MissingGhost(name))?;
        }
        Ok(Markers {
            player,
            ghosts: located,
            fruit_spots,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::maze::Tile;

    const LEVEL: &str = "\
|=======|\n\
|*..?..*|\n\
|.b.p.i.|\n\
w..c..P.w\n\
|=======|\n";

    fn fresh(level: u32) -> GameState {
        GameState::new(StdRng::seed_from_u64(1), Vec::new(), level, LEVEL).unwrap()
    }

    #[test]
    fn new_game_locates_actors() {
        let state = fresh(1);
        assert_eq!(state.player.pos, Point::new(4, 7));
        assert_eq!(state.player.dir, Direction::West);
        assert_eq!(state.player.home, (Point::new(4, 7), Direction::West));
        let blinky = &state.ghosts[0];
        assert_eq!(blinky.name, GhostName::Blinky);
        assert_eq!(blinky.state, GhostState::Normal);
        assert_eq!(blinky.placement.pos, Point::new(3, 3));
        assert_eq!(blinky.placement.dir, Direction::West);
        assert_eq!(state.ghosts[3].placement.pos, Point::new(4, 4));
    }

    #[test]
    fn new_game_zeroes_counters_and_starts_on_the_start_screen() {
        let state = fresh(1);
        assert_eq!(state.mode, Mode::StartScreen);
        assert_eq!(state.counters, Counters::default());
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(state.pellets_remaining, state.maze.pellet_count());
        assert!(state.pellets_remaining > 0);
        assert_eq!(state.power_multiplier, 1);
    }

    #[test]
    fn power_duration_shrinks_with_level() {
        assert_eq!(power_duration(1), 7.0);
        assert_eq!(power_duration(5), 3.0);
        assert_eq!(power_duration(6), 2.0);
        assert_eq!(power_duration(40), 2.0);
    }

    #[test]
    fn markers_become_empty_tiles() {
        let state = fresh(1);
        assert_eq!(state.maze.tile(Point::new(4, 7)), Some(&Tile::Empty));
        assert_eq!(state.maze.tile(Point::new(3, 3)), Some(&Tile::Empty));
        assert_eq!(state.maze.tile(Point::new(2, 5)), Some(&Tile::Empty));
    }

    #[test]
    fn missing_player_fails() {
        let text = LEVEL.replace('P', ".");
        let err = GameState::new(StdRng::seed_from_u64(1), Vec::new(), 1, &text).unwrap_err();
        assert_eq!(err, LoadError::MissingPlayer);
    }

    #[test]
    fn missing_ghost_fails_with_its_name() {
        let text = LEVEL.replace('i', ".");
        let err = GameState::new(StdRng::seed_from_u64(1), Vec::new(), 1, &text).unwrap_err();
        assert_eq!(err, LoadError::MissingGhost(GhostName::Inky));
    }

    #[test]
    fn duplicate_player_fails() {
        let text = LEVEL.replacen('.', "P", 1);
        let err = GameState::new(StdRng::seed_from_u64(1), Vec::new(), 1, &text).unwrap_err();
        assert_eq!(err, LoadError::DuplicatePlayer);
    }

    #[test]
    fn malformed_maze_propagates() {
        let err = GameState::new(StdRng::seed_from_u64(1), Vec::new(), 1, "Pbic\n..\n")
            .unwrap_err();
        assert_eq!(err, LoadError::Maze(MazeError::NotRectangular));
    }

    #[test]
    fn advance_level_carries_the_persistent_fields() {
        let mut state = fresh(1);
        state.mode = Mode::Running;
        state.counters.pellets_eaten = 30;
        state.counters.ghost_score = 400;
        state.lives = 2;
        state.elapsed = 93.5;
        state.level_clock = 40.0;

        let next = state.advance_level(LEVEL).unwrap();
        assert_eq!(next.level, 2);
        assert_eq!(next.mode, Mode::Running);
        assert_eq!(next.counters.pellets_eaten, 30);
        assert_eq!(next.counters.ghost_score, 400);
        assert_eq!(next.lives, 2);
        assert_eq!(next.elapsed, 93.5);
        // Level-scoped fields start over.
        assert_eq!(next.level_clock, 0.0);
        assert_eq!(next.power_timer, 0.0);
        assert_eq!(next.pellets_remaining, next.maze.pellet_count());
    }

    #[test]
    fn restart_carries_only_elapsed_time() {
        let mut state = fresh(3);
        state.counters.pellets_eaten = 50;
        state.lives = 1;
        state.elapsed = 120.0;

        let next = state.restart(LEVEL).unwrap();
        assert_eq!(next.level, 1);
        assert_eq!(next.mode, Mode::StartScreen);
        assert_eq!(next.elapsed, 120.0);
        assert_eq!(next.counters, Counters::default());
        assert_eq!(next.lives, STARTING_LIVES);
    }

    #[test]
    fn score_sums_the_counters() {
        let counters = Counters {
            pellets_eaten: 7,
            power_pellets_eaten: 2,
            ghost_score: 400,
            fruit_score: 100,
        };
        assert_eq!(counters.score(), 70 + 100 + 400 + 100);
    }
}
