//! Combat grid: tile classification and the dense cell array.

use serde::{Deserialize, Serialize};

use super::Position;

/// Movement cost assigned to impassable tiles. Out-of-bounds lookups report
/// the same cost, so pathfinding treats the map edge as a wall.
pub const BLOCKED_MOVE_COST: i32 = 999;

/// Canonical terrain classes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    #[default]
    Open,
    Wall,
    Difficult,
    Water,
}

impl TileKind {
    /// Cost of entering a square of this terrain.
    pub fn move_cost(self) -> i32 {
        match self {
            TileKind::Open => 1,
            TileKind::Difficult => 2,
            TileKind::Wall | TileKind::Water => BLOCKED_MOVE_COST,
        }
    }

    /// Whether the terrain itself forbids occupation.
    pub fn is_blocked(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Water)
    }
}

/// A single cell: terrain plus an optional hazard tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub tile: TileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard: Option<String>,
}

impl GridCell {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn of(tile: TileKind) -> Self {
        Self { tile, hazard: None }
    }
}

/// The combat grid. `cells` is row-major with shape `height x width`; it is
/// immutable for the lifetime of an episode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub square_size_ft: i32,
    pub biome: String,
    pub cells: Vec<Vec<GridCell>>,
}

impl Grid {
    /// An all-open grid with the default 5 ft squares.
    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            square_size_ft: 5,
            biome: String::new(),
            cells: (0..height)
                .map(|_| (0..width).map(|_| GridCell::open()).collect())
                .collect(),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Cell lookup; `None` outside the map.
    pub fn cell(&self, x: i32, y: i32) -> Option<&GridCell> {
        if !self.contains(x, y) {
            return None;
        }
        self.cells.get(y as usize)?.get(x as usize)
    }

    /// Terrain lookup; out-of-bounds positions read as walls.
    pub fn tile(&self, x: i32, y: i32) -> TileKind {
        self.cell(x, y).map_or(TileKind::Wall, |c| c.tile)
    }

    pub fn tile_at(&self, pos: Position) -> TileKind {
        self.tile(pos.x, pos.y)
    }

    /// Full movement budget in squares for an actor with the given speed.
    pub fn squares_of_speed(&self, speed_ft: i32) -> i32 {
        if self.square_size_ft <= 0 {
            return 0;
        }
        speed_ft / self.square_size_ft
    }
}
