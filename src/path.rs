//! Point-to-point pathfinding over the maze grid.
//!
//! The path is built in two phases: a breadth-first sweep that records the
//! order in which points leave the frontier queue, then a backward greedy
//! pass over that discovery order which keeps only a chain of mutually
//! adjacent points. The result is connected end to end but is not a
//! shortest path.

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::geometry::{Direction, Point};
use crate::maze::{Maze, Tile};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no path from ({}, {}) to ({}, {})", start.row, start.col, target.row, target.col)]
pub struct NoPathError {
    pub start: Point,
    pub target: Point,
}

/// Finds a connected sequence of points from `start` to `target`.
///
/// Consecutive points in the result are at Manhattan distance <= 1; the
/// sequence begins with `start` and ends with `target`. `start == target`
/// yields an empty path. When the two points are not connected through
/// non-wall tiles the search fails with [`NoPathError`].
pub fn path_between(maze: &Maze, start: Point, target: Point) -> Result<Vec<Point>, NoPathError> {
    if start == target {
        return Ok(Vec::new());
    }
    let mut discovered =
        discovery_order(maze, start, target).ok_or(NoPathError { start, target })?;
    discovered.reverse();
    Ok(rebuild(&discovered))
}

/// Breadth-first sweep recording dequeue order, terminated by the target.
///
/// Returns the dequeued points in order with `target` appended, or `None`
/// when the frontier empties without reaching it.
fn discovery_order(maze: &Maze, start: Point, target: Point) -> Option<Vec<Point>> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut order = Vec::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(p) = queue.pop_front() {
        order.push(p);
        if p == target {
            return Some(order);
        }
        if maze.tile(p).map_or(true, Tile::is_wall) {
            continue;
        }
        for dir in Direction::ALL {
            let (dr, dc) = dir.delta();
            let next = Point::new(p.row + dr, p.col + dc);
            match maze.tile(next) {
                Some(tile) if !tile.is_wall() => {}
                _ => continue,
            }
            if seen.contains(&next) {
                continue;
            }
            if next == target {
                order.push(target);
                return Some(order);
            }
            seen.insert(next);
            queue.push_back(next);
        }
    }
    None
}

/// Backward greedy reconstruction over the reversed discovery order.
///
/// For the head point, leading elements of the tail are discarded until one
/// is adjacent (or identical); recursing from there and appending the head
/// yields a chain ordered from the original start to the target.
fn rebuild(points: &[Point]) -> Vec<Point> {
    let Some((head, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut chain = match rest.iter().position(|p| p.manhattan(*head) <= 1) {
        Some(i) => rebuild(&rest[i..]),
        None => Vec::new(),
    };
    chain.push(*head);
    chain
}
