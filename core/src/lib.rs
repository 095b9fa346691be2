#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Turntable merge-puzzle engine.
//!
//! This crate defines the message surface that connects collaborators (UI,
//! scoring, tutorial layers) to the authoritative board. Collaborators submit
//! [`Command`] values describing desired mutations, the board executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and presentation layers to react to deterministically.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer grid coordinate pair used by both the relative and absolute frames.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Origin point.
    pub const ZERO: Point = Point::new(0, 0);
    /// Point with both coordinates set to one.
    pub const ONE: Point = Point::new(1, 1);
    /// Unit vector pointing toward increasing `y`.
    pub const UP: Point = Point::new(0, 1);
    /// Unit vector pointing toward decreasing `y`.
    pub const DOWN: Point = Point::new(0, -1);
    /// Unit vector pointing toward increasing `x`.
    pub const RIGHT: Point = Point::new(1, 0);
    /// Unit vector pointing toward decreasing `x`.
    pub const LEFT: Point = Point::new(-1, 0);

    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Clamps both coordinates into the rectangle spanned by `first` and
    /// `second`; the corners may be provided in any order.
    #[must_use]
    pub fn clamp(self, first: Point, second: Point) -> Self {
        Self {
            x: self.x.clamp(first.x.min(second.x), first.x.max(second.x)),
            y: self.y.clamp(first.y.min(second.y), first.y.max(second.y)),
        }
    }

    /// Reports whether the point lies inside the rectangle spanned by
    /// `first` and `second`, corners inclusive.
    #[must_use]
    pub fn in_range(self, first: Point, second: Point) -> bool {
        self.x >= first.x.min(second.x)
            && self.x <= first.x.max(second.x)
            && self.y >= first.y.min(second.y)
            && self.y <= first.y.max(second.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    fn mul(self, rhs: i32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Cardinal facing of the board relative to the launch axis.
///
/// The variants form a cyclic group: [`Direction::next`] advances one 90°
/// step, and four steps return to the starting value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Launch axis aligned with the storage frame; the identity mapping.
    Up,
    /// Board rotated one step.
    Right,
    /// Board rotated two steps.
    Down,
    /// Board rotated three steps.
    Left,
}

impl Direction {
    /// Advances the facing by one 90° step.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Unit vector associated with the direction.
    #[must_use]
    pub const fn offset(self) -> Point {
        match self {
            Self::Up => Point::UP,
            Self::Right => Point::RIGHT,
            Self::Down => Point::DOWN,
            Self::Left => Point::LEFT,
        }
    }
}

/// Unique identifier assigned to a unit by the board.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Distinguishes the two ways a unit is displaced during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Free travel along the launch axis while cells ahead are empty.
    Slide,
    /// Displacement caused by another unit pushing from below.
    Push,
}

/// Lifecycle of a single table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No table has been initialized yet.
    Inactive,
    /// A table is active and accepting commands.
    Playing,
    /// A unit settled outside the playfield; the table is lost.
    Lost,
    /// A unit reached the win thresholds; the table is complete.
    Won,
}

/// The three cost thresholds a unit must meet simultaneously to win a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinCosts {
    min: u32,
    middle: u32,
    max: u32,
}

impl WinCosts {
    /// Creates a new threshold triple.
    #[must_use]
    pub const fn new(min: u32, middle: u32, max: u32) -> Self {
        Self { min, middle, max }
    }

    /// Lowest threshold.
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Middle threshold.
    #[must_use]
    pub const fn middle(&self) -> u32 {
        self.middle
    }

    /// Highest threshold.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether a unit cost meets or exceeds every threshold.
    #[must_use]
    pub const fn met_by(&self, cost: u32) -> bool {
        cost >= self.min && cost >= self.middle && cost >= self.max
    }
}

/// Read-only configuration describing a single table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableInfo {
    min_cost: u32,
    max_cost: u32,
    win_costs: WinCosts,
    money_reward: u32,
    field_size: i32,
}

impl TableInfo {
    /// Creates a new table configuration.
    #[must_use]
    pub const fn new(
        min_cost: u32,
        max_cost: u32,
        win_costs: WinCosts,
        money_reward: u32,
        field_size: i32,
    ) -> Self {
        Self {
            min_cost,
            max_cost,
            win_costs,
            money_reward,
            field_size,
        }
    }

    /// Smallest cost the spawner may draw.
    #[must_use]
    pub const fn min_cost(&self) -> u32 {
        self.min_cost
    }

    /// Largest cost the spawner may draw.
    #[must_use]
    pub const fn max_cost(&self) -> u32 {
        self.max_cost
    }

    /// Win thresholds for this table.
    #[must_use]
    pub const fn win_costs(&self) -> WinCosts {
        self.win_costs
    }

    /// Money granted to the player when the table is completed.
    #[must_use]
    pub const fn money_reward(&self) -> u32 {
        self.money_reward
    }

    /// Side length of the active playfield band in cells.
    #[must_use]
    pub const fn field_size(&self) -> i32 {
        self.field_size
    }

    /// Side length of the full storage grid, playfield plus overflow margin.
    #[must_use]
    pub const fn table_size(&self) -> i32 {
        self.field_size + 8
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Activates a new table configuration, resetting the board.
    InitTable {
        /// Configuration for the table becoming active.
        info: TableInfo,
    },
    /// Places a fresh unit in the spawn rows of the relative frame.
    SpawnUnit {
        /// Relative column of the spawned unit.
        column: i32,
        /// Cost of the spawned unit; tile value is `2^cost`.
        cost: u32,
        /// Forward travel available to the unit at launch time.
        distance: u32,
    },
    /// Repositions the pending unit horizontally before launch.
    ScrollUnit {
        /// Relative column the unit currently occupies.
        from_column: i32,
        /// Relative column the unit should move to.
        to_column: i32,
    },
    /// Launches the pending unit and resolves the turn to completion.
    Launch {
        /// Relative column at which the unit was released.
        column: i32,
    },
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new table configuration became active.
    TableInstantiated {
        /// Configuration of the activated table.
        info: TableInfo,
    },
    /// A new unit was placed in the spawn rows.
    UnitInstantiated {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Relative column the unit spawned at.
        column: i32,
        /// Cost the unit spawned with.
        cost: u32,
        /// Travel distance the unit spawned with.
        distance: u32,
    },
    /// The pending unit changed columns before launch.
    UnitScrolled {
        /// Identifier of the scrolled unit.
        unit: UnitId,
        /// Column the unit left.
        from_column: i32,
        /// Column the unit now occupies.
        to_column: i32,
    },
    /// Resolution of a launch began.
    UnitLaunched {
        /// Identifier of the launched unit.
        unit: UnitId,
        /// Column the unit was released at.
        column: i32,
    },
    /// A unit was displaced during resolution.
    UnitMoved {
        /// Identifier of the displaced unit.
        unit: UnitId,
        /// Relative-frame anchor cell before the move.
        from: Point,
        /// Relative-frame anchor cell after the move.
        to: Point,
        /// Whether the displacement was a slide or a push.
        kind: MoveKind,
    },
    /// Two equal-cost units merged into one.
    UnitsMerged {
        /// Unit that absorbed its neighbor and doubled in value.
        absorber: UnitId,
        /// Unit that was destroyed by the merge.
        absorbed: UnitId,
        /// Post-merge cost of the absorbing unit.
        cost: u32,
    },
    /// A turn completed without ending the game; the facing advanced.
    BoardRotated {
        /// Facing that became active after the rotation.
        facing: Direction,
    },
    /// A unit settled outside the playfield band; the game is lost.
    GameOver,
    /// A unit reached every win threshold; the table is complete.
    GameWon,
}

/// Reasons the board rejects a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A command other than `InitTable` arrived before any table was active.
    #[error("no table has been initialized")]
    TableNotInitialized,
    /// The active table already ended in a win or a loss.
    #[error("the table has already ended")]
    GameEnded,
    /// The requested field size cannot host a playable board.
    #[error("field size {field_size} is too small; it must be at least 2")]
    FieldTooSmall {
        /// Field size carried by the rejected configuration.
        field_size: i32,
    },
    /// The referenced column lies outside the spawn band.
    #[error("column {column} is outside the spawn band")]
    OutsideSpawnBand {
        /// Offending relative column.
        column: i32,
    },
    /// A spawn target cell is already occupied.
    #[error("cell {at:?} is already occupied")]
    CellOccupied {
        /// Occupied relative-frame cell.
        at: Point,
    },
    /// A unit is already awaiting launch; only one may be pending.
    #[error("a spawned unit is already awaiting launch")]
    UnitPending,
    /// No unit occupies the cell the command expected one at.
    #[error("no unit occupies the spawn cell at column {column}")]
    MissingUnit {
        /// Column the command referenced.
        column: i32,
    },
    /// The grid no longer satisfies the two-cells-per-unit invariant.
    #[error("board corruption detected at {at:?}")]
    CorruptBoard {
        /// Cell at which the invariant violation was detected.
        at: Point,
    },
}
