//! Seeded dice roller and the `NdM(±K)` expression grammar.
//!
//! Every stochastic call in the engine draws from one [`Dice`] instance, so
//! a fixed seed replays an episode byte-for-byte. There is no global RNG.

use std::sync::LazyLock;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)d(\d+)(?:([+-])(\d+))?").expect("dice grammar"));

/// A parsed dice expression: `count` dice of `sides` sides plus a flat
/// modifier. Plain integers parse as a zero-dice expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpr {
    /// Parses `NdM`, `NdM+K`, `NdM-K`, or a bare integer. Whitespace is
    /// ignored. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(caps) = DICE_RE.captures(&compact) {
            let count = caps[1].parse().ok()?;
            let sides = caps[2].parse().ok()?;
            let mut modifier: i32 = match caps.get(4) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            if caps.get(3).map(|s| s.as_str()) == Some("-") {
                modifier = -modifier;
            }
            return Some(Self { count, sides, modifier });
        }
        compact
            .parse::<i32>()
            .ok()
            .map(|flat| Self { count: 0, sides: 0, modifier: flat })
    }

    /// Statistical mean: `N * (M + 1) / 2 + K`.
    pub fn average(&self) -> f32 {
        self.count as f32 * (self.sides as f32 + 1.0) / 2.0 + self.modifier as f32
    }
}

/// Average damage of an expression, with the conventional 3.5 (one d6)
/// stand-in for unparseable text and 0 for empty strings.
pub fn average_damage(text: &str) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }
    DiceExpr::parse(text).map_or(3.5, |expr| expr.average())
}

/// Seeded dice roller threaded through every resolution call.
#[derive(Clone, Debug)]
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Sum of `count` rolls of a `sides`-sided die, each in `[1, sides]`.
    pub fn roll(&mut self, count: u32, sides: u32) -> i32 {
        if sides == 0 {
            return 0;
        }
        (0..count).map(|_| self.rng.random_range(1..=sides as i32)).sum()
    }

    pub fn d20(&mut self) -> i32 {
        self.roll(1, 20)
    }

    pub fn d6(&mut self) -> i32 {
        self.roll(1, 6)
    }

    /// Uniform draw in `[0, len)`, for choosing among enumerated options.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.random_range(0..len)
    }

    /// Parses and rolls a damage expression. A crit doubles the dice count,
    /// never the modifier. Unparseable text warns and falls back to `1d6`.
    /// The result never goes below zero.
    pub fn damage(&mut self, text: &str, crit: bool) -> i32 {
        if text.trim().is_empty() {
            return 0;
        }
        let Some(expr) = DiceExpr::parse(text) else {
            tracing::warn!(dice = text, "unparseable damage expression, rolling 1d6");
            return self.roll(1, 6);
        };
        let count = if crit { expr.count * 2 } else { expr.count };
        (self.roll(count, expr.sides) + expr.modifier).max(0)
    }
}
