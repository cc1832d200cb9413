//! Bonus fruit selection.
//!
//! Fruit is drawn once per level in a fixed order: position first, then a
//! weighted roll against the level-gated rank table, then the appearance
//! delay. The order matters because every draw advances the shared
//! generator, and a fixed seed must reproduce the same level.

use rand::Rng;

use crate::geometry::Point;

/// Ranked bonus fruit, cheapest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FruitKind {
    Cherry,
    Strawberry,
    Orange,
    Apple,
    Melon,
    Galaxian,
    Bell,
    Key,
}

impl FruitKind {
    pub fn label(self) -> &'static str {
        match self {
            FruitKind::Cherry => "cherry",
            FruitKind::Strawberry => "strawberry",
            FruitKind::Orange => "orange",
            FruitKind::Apple => "apple",
            FruitKind::Melon => "melon",
            FruitKind::Galaxian => "galaxian",
            FruitKind::Bell => "bell",
            FruitKind::Key => "key",
        }
    }

    /// Points awarded when the fruit is eaten.
    pub fn score(self) -> u32 {
        match self {
            FruitKind::Cherry => 100,
            FruitKind::Strawberry => 300,
            FruitKind::Orange => 500,
            FruitKind::Apple => 700,
            FruitKind::Melon => 1000,
            FruitKind::Galaxian => 2000,
            FruitKind::Bell => 3000,
            FruitKind::Key => 5000,
        }
    }
}

/// A level-scoped bonus fruit; at most one exists per level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fruit {
    pub kind: FruitKind,
    pub pos: Point,
    /// Seconds of level time before the fruit becomes visible.
    pub appear_after: f64,
    /// Seconds the fruit stays on the grid once visible.
    pub shown_for: f64,
}

pub const FRUIT_VISIBLE_SECS: f64 = 10.0;

const MIN_DELAY_SECS: f64 = 5.0;
const MAX_DELAY_SECS: f64 = 25.0;

/// Cutoff on the 0..=999 roll and minimum level, richest fruit last. The
/// first rule the roll and level both satisfy wins.
const GATES: [(u32, u32, FruitKind); 8] = [
    (480, 0, FruitKind::Cherry),
    (640, 1, FruitKind::Strawberry),
    (736, 2, FruitKind::Orange),
    (805, 3, FruitKind::Apple),
    (843, 4, FruitKind::Melon),
    (877, 5, FruitKind::Galaxian),
    (893, 6, FruitKind::Bell),
    (900, 7, FruitKind::Key),
];

/// Maps a 0..=999 roll to a fruit kind at the given level, if any gate opens.
pub fn gate_fruit(roll: u32, level: u32) -> Option<FruitKind> {
    GATES
        .iter()
        .find(|&&(cutoff, min_level, _)| roll < cutoff && level > min_level)
        .map(|&(_, _, kind)| kind)
}

/// Draws this level's fruit, if any.
///
/// With no candidate positions nothing is drawn at all; otherwise the
/// position index and the rank roll are always consumed, and the delay only
/// when a gate opened.
pub fn draw_fruit(rng: &mut impl Rng, level: u32, candidates: &[Point]) -> Option<Fruit> {
    if candidates.is_empty() {
        return None;
    }
    let pos = candidates[rng.gen_range(0..candidates.len())];
    let roll = rng.gen_range(0..1000);
    let kind = gate_fruit(roll, level)?;
    let appear_after = rng.gen_range(MIN_DELAY_SECS..MAX_DELAY_SECS);
    Some(Fruit {
        kind,
        pos,
        appear_after,
        shown_for: FRUIT_VISIBLE_SECS,
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn gates_follow_the_rank_table() {
        assert_eq!(gate_fruit(0, 1), Some(FruitKind::Cherry));
        assert_eq!(gate_fruit(479, 1), Some(FruitKind::Cherry));
        // The worked example: roll 500 at level 5 skips the cherry gate and
        // lands on strawberry.
        assert_eq!(gate_fruit(500, 5), Some(FruitKind::Strawberry));
        assert_eq!(gate_fruit(899, 8), Some(FruitKind::Key));
        assert_eq!(gate_fruit(900, 50), None);
        assert_eq!(gate_fruit(999, 50), None);
    }

    #[test]
    fn gates_respect_minimum_levels() {
        // Level 0 opens nothing.
        assert_eq!(gate_fruit(0, 0), None);
        // Below the cherry cutoff everything maps to cherry regardless of
        // how high the level is.
        assert_eq!(gate_fruit(100, 40), Some(FruitKind::Cherry));
        // A melon roll before level 5 falls through to no fruit.
        assert_eq!(gate_fruit(820, 3), None);
        assert_eq!(gate_fruit(820, 5), Some(FruitKind::Melon));
    }

    #[test]
    fn no_candidates_means_no_fruit() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(draw_fruit(&mut rng, 9, &[]), None);
    }

    #[test]
    fn drawn_fruit_is_well_formed() {
        let candidates = [Point::new(3, 4), Point::new(7, 7)];
        let mut rng = StdRng::seed_from_u64(11);
        for level in 1..=8 {
            if let Some(fruit) = draw_fruit(&mut rng, level, &candidates) {
                assert!(candidates.contains(&fruit.pos));
                assert!(fruit.appear_after >= MIN_DELAY_SECS);
                assert!(fruit.appear_after < MAX_DELAY_SECS);
                assert_eq!(fruit.shown_for, FRUIT_VISIBLE_SECS);
            }
        }
    }

    #[test]
    fn level_one_only_yields_cherries() {
        let candidates = [Point::new(2, 2)];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..64 {
            if let Some(fruit) = draw_fruit(&mut rng, 1, &candidates) {
                assert_eq!(fruit.kind, FruitKind::Cherry);
            }
        }
    }
}
