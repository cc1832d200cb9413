//! ASCII level parsing and the tile grid it produces.
//!
//! A level is a rectangular block of characters, one row per line. Wall
//! characters (`|` and `=`) are resolved into box-drawing glyphs from their
//! raw neighbors, and `w` markers are resolved into a paired set of boundary
//! warp tiles. Spawn markers (`P`, ghost letters, `?`) are not tiles; the
//! parser maps them to [`Tile::Empty`] and the game initializer locates them
//! in the raw text separately.

use thiserror::Error;

use crate::geometry::{Direction, Point};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze is not rectangular")]
    NotRectangular,
    #[error("warp tile at ({}, {}) is not on the maze boundary", .0.row, .0.col)]
    WarpOffBoundary(Point),
    #[error("expected exactly one pair of warp tiles, found {0} marker(s)")]
    WarpCount(usize),
}

/// One grid cell. Immutable after parsing except for pellet consumption
/// through [`Maze::clear_tile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Empty,
    /// A wall, carrying the box-drawing glyph resolved from its neighbors.
    Wall(char),
    Pellet,
    PowerPellet,
    /// Teleports movement that exits in `dir` to `dest`.
    Warp { dir: Direction, dest: Point },
    /// Passable only when moving in the stored direction.
    OneWay(Direction),
}

impl Tile {
    pub fn is_wall(&self) -> bool {
        matches!(self, Tile::Wall(_))
    }
}

/// An immutable per-level grid of tiles, indexed 1..=rows, 1..=cols.
#[derive(Clone, Debug)]
pub struct Maze {
    rows: i32,
    cols: i32,
    tiles: Vec<Tile>,
}

impl Maze {
    /// Parses a rectangular block of level text into a maze.
    pub fn parse(text: &str) -> Result<Maze, MazeError> {
        let grid: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
        if grid.is_empty() {
            return Err(MazeError::NotRectangular);
        }
        let cols = grid[0].len();
        if grid.iter().any(|row| row.len() != cols) {
            return Err(MazeError::NotRectangular);
        }
        let rows = grid.len();

        let warps: Vec<Point> = grid
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, &c)| c == 'w')
                    .map(move |(c, _)| Point::new(r as i32 + 1, c as i32 + 1))
            })
            .collect();
        // Zero markers means no warp; anything other than a single pair is
        // a structural failure.
        if !warps.is_empty() && warps.len() != 2 {
            return Err(MazeError::WarpCount(warps.len()));
        }

        let mut tiles = Vec::with_capacity(rows * cols);
        for (r, row) in grid.iter().enumerate() {
            for (c, &ch) in row.iter().enumerate() {
                let point = Point::new(r as i32 + 1, c as i32 + 1);
                let tile = match ch {
                    '.' => Tile::Pellet,
                    '*' => Tile::PowerPellet,
                    '^' => Tile::OneWay(Direction::North),
                    'v' => Tile::OneWay(Direction::South),
                    '<' => Tile::OneWay(Direction::West),
                    '>' => Tile::OneWay(Direction::East),
                    'w' => resolve_warp(point, &warps, rows as i32, cols as i32)?,
                    '|' | '=' => Tile::Wall(wall_glyph(&grid, r, c)),
                    _ => Tile::Empty,
                };
                tiles.push(tile);
            }
        }

        Ok(Maze {
            rows: rows as i32,
            cols: cols as i32,
            tiles,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.row >= 1 && p.row <= self.rows && p.col >= 1 && p.col <= self.cols
    }

    /// The tile at `p`, or `None` outside the grid.
    pub fn tile(&self, p: Point) -> Option<&Tile> {
        if !self.in_bounds(p) {
            return None;
        }
        let idx = (p.row - 1) * self.cols + (p.col - 1);
        self.tiles.get(idx as usize)
    }

    /// Consumes a pellet or power pellet at `p`. Other tiles are untouched.
    pub fn clear_tile(&mut self, p: Point) {
        if !self.in_bounds(p) {
            return;
        }
        let idx = ((p.row - 1) * self.cols + (p.col - 1)) as usize;
        if matches!(self.tiles[idx], Tile::Pellet | Tile::PowerPellet) {
            self.tiles[idx] = Tile::Empty;
        }
    }

    /// Number of pellet and power-pellet tiles still on the grid.
    pub fn pellet_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| matches!(t, Tile::Pellet | Tile::PowerPellet))
            .count()
    }

    /// The tiles of one row as a linear slice, for corridor scans.
    pub fn row_tiles(&self, row: i32) -> &[Tile] {
        let start = ((row - 1) * self.cols) as usize;
        &self.tiles[start..start + self.cols as usize]
    }
}

fn resolve_warp(p: Point, warps: &[Point], rows: i32, cols: i32) -> Result<Tile, MazeError> {
    // Boundary rules are checked in priority order; a corner warp takes the
    // row rule before the column rule.
    let dir = if p.row == 1 {
        Direction::North
    } else if p.row == rows {
        Direction::South
    } else if p.col == 1 {
        Direction::West
    } else if p.col == cols {
        Direction::East
    } else {
        return Err(MazeError::WarpOffBoundary(p));
    };
    let dest = warps
        .iter()
        .copied()
        .find(|&other| other != p)
        .ok_or(MazeError::WarpCount(warps.len()))?;
    Ok(Tile::Warp { dir, dest })
}

fn is_wall_char(c: char) -> bool {
    c == '|' || c == '='
}

/// Whether a vertical neighbor joins the wall run at `this`.
fn links_vertical(this: char, neighbor: Option<char>) -> bool {
    match neighbor {
        Some(n) => (n == '|' && this == '|') || (is_wall_char(n) && is_wall_char(this) && n != this),
        None => false,
    }
}

/// Whether a horizontal neighbor joins the wall run at `this`.
fn links_horizontal(this: char, neighbor: Option<char>) -> bool {
    match neighbor {
        Some(n) => (n == '=' && this == '=') || (is_wall_char(n) && is_wall_char(this) && n != this),
        None => false,
    }
}

/// Picks the box-drawing glyph for a wall from its four raw neighbors.
///
/// The arm order is load-bearing: three-way junctions must win over the
/// straight pieces and corners their flags also satisfy.
fn wall_glyph(grid: &[Vec<char>], r: usize, c: usize) -> char {
    let this = grid[r][c];
    let at = |r: Option<usize>, c: Option<usize>| -> Option<char> {
        grid.get(r?)?.get(c?).copied()
    };
    let north = links_vertical(this, at(r.checked_sub(1), Some(c)));
    let south = links_vertical(this, at(Some(r + 1), Some(c)));
    let west = links_horizontal(this, at(Some(r), c.checked_sub(1)));
    let east = links_horizontal(this, at(Some(r), Some(c + 1)));

    match (north, south, west, east) {
        (true, true, true, true) => '┼',
        (true, true, true, _) => '┤',
        (true, true, _, true) => '├',
        (true, _, true, true) => '┴',
        (_, true, true, true) => '┬',
        (true, true, _, _) => '│',
        (_, _, true, true) => '─',
        (true, _, true, _) => '┘',
        (true, _, _, true) => '└',
        (_, true, true, _) => '┐',
        (_, true, _, true) => '┌',
        _ => {
            if this == '=' {
                '─'
            } else {
                '│'
            }
        }
    }
}

/// Resolves one step of movement from `from` in `dir`.
///
/// A warp tile redirects movement leaving in its configured direction to its
/// paired destination; a one-way tile pins movement in every other
/// direction. Walls do not block here — callers gate on [`Tile::is_wall`]
/// before committing a move.
pub fn move_from(maze: &Maze, from: Point, dir: Direction) -> Point {
    match maze.tile(from) {
        Some(&Tile::Warp { dir: d, dest }) if d == dir => dest,
        Some(&Tile::OneWay(d)) if d != dir => from,
        _ => {
            let (dr, dc) = dir.delta();
            Point::new(from.row + dr, from.col + dc)
        }
    }
}

/// True when no wall tile lies strictly between indices `a` and `b` of a
/// linear tile slice. Equal indices yield false.
pub fn no_walls(a: usize, b: usize, tiles: &[Tile]) -> bool {
    if a == b {
        return false;
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    !tiles[lo + 1..hi].iter().any(Tile::is_wall)
}
