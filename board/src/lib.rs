#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for the Turntable merge-puzzle engine.
//!
//! Collaborators mutate the board exclusively through [`apply`], which
//! executes a [`Command`], appends the resulting [`Event`] values, and reports
//! precondition violations as [`CommandError`]. Read access goes through the
//! [`query`] module. A [`Command::Launch`] resolves synchronously: the whole
//! slide/push/merge chain, the loss and win scans, and the board rotation
//! complete before `apply` returns.

mod grid;
mod mapper;
mod resolve;

use turntable_core::{Command, CommandError, Direction, Event, Phase, Point, TableInfo, UnitId};

use grid::Grid;

/// Relative row holding the lower cell of a freshly spawned unit.
pub(crate) const SPAWN_BOTTOM_ROW: i32 = 1;
/// Relative row holding the upper cell of a freshly spawned unit; launches
/// address this cell.
pub(crate) const SPAWN_TOP_ROW: i32 = 2;

const OVERFLOW_MARGIN: i32 = 8;

/// Geometry of the active playfield band within the storage grid.
///
/// The playfield occupies the central `field_size × field_size` cells; the
/// surrounding margin is the overflow zone used only for loss detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayfieldBounds {
    margin: i32,
    field_size: i32,
}

impl PlayfieldBounds {
    pub(crate) const fn from_table_size(table_size: i32) -> Self {
        let field_size = table_size - OVERFLOW_MARGIN;
        Self {
            margin: (table_size - field_size) / 2,
            field_size,
        }
    }

    /// Width of the overflow margin on each side of the playfield.
    #[must_use]
    pub const fn margin(&self) -> i32 {
        self.margin
    }

    /// Side length of the playfield band.
    #[must_use]
    pub const fn field_size(&self) -> i32 {
        self.field_size
    }

    /// Side length of the full storage grid.
    #[must_use]
    pub const fn table_size(&self) -> i32 {
        self.field_size + OVERFLOW_MARGIN
    }

    /// Reports whether a cell lies inside the playfield band. The band is
    /// symmetric under 90° rotation, so the answer is identical in the
    /// relative and absolute frames.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        let min = self.margin;
        let max = self.margin + self.field_size;
        point.x() >= min && point.x() < max && point.y() >= min && point.y() < max
    }

    /// First column of the spawn band.
    #[must_use]
    pub const fn spawn_min_column(&self) -> i32 {
        self.margin
    }

    /// One past the last column of the spawn band.
    #[must_use]
    pub const fn spawn_max_column(&self) -> i32 {
        self.margin + self.field_size
    }

    /// Highest relative row from which a unit may still be pushed upward.
    pub(crate) const fn push_ceiling(&self) -> i32 {
        self.margin + self.field_size - 1
    }
}

/// A two-cell tile tracked by the board.
///
/// `first` and `second` are the unit's anchor cells in the absolute storage
/// frame; the grid stores the matching `UnitId` in both.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) cost: u32,
    pub(crate) distance: u32,
    pub(crate) first: Point,
    pub(crate) second: Point,
}

/// Represents the authoritative board state.
#[derive(Debug)]
pub struct Board {
    info: Option<TableInfo>,
    pub(crate) grid: Grid,
    pub(crate) units: Vec<Unit>,
    pub(crate) facing: Direction,
    pub(crate) phase: Phase,
    pub(crate) pending: Option<UnitId>,
    next_unit: u32,
}

impl Board {
    /// Creates a board with no active table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: None,
            grid: Grid::new(0),
            units: Vec::new(),
            facing: Direction::Up,
            phase: Phase::Inactive,
            pending: None,
            next_unit: 0,
        }
    }

    pub(crate) fn bounds(&self) -> PlayfieldBounds {
        PlayfieldBounds::from_table_size(self.grid.size())
    }

    pub(crate) fn to_absolute(&self, point: Point) -> Point {
        mapper::relative_to_absolute(point, self.facing, self.grid.size())
    }

    pub(crate) fn to_relative(&self, point: Point) -> Point {
        mapper::absolute_to_relative(point, self.facing, self.grid.size())
    }

    pub(crate) fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let position = self.units.iter().position(|unit| unit.id == id)?;
        Some(self.units.remove(position))
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_unit);
        self.next_unit = self.next_unit.wrapping_add(1);
        id
    }

    fn ensure_playing(&self) -> Result<TableInfo, CommandError> {
        let info = self.info.ok_or(CommandError::TableNotInitialized)?;
        match self.phase {
            Phase::Playing => Ok(info),
            _ => Err(CommandError::GameEnded),
        }
    }

    fn init_table(
        &mut self,
        info: TableInfo,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if info.field_size() < 2 {
            return Err(CommandError::FieldTooSmall {
                field_size: info.field_size(),
            });
        }

        self.info = Some(info);
        self.grid = Grid::new(info.table_size());
        self.units.clear();
        self.facing = Direction::Up;
        self.phase = Phase::Playing;
        self.pending = None;
        self.next_unit = 0;

        out_events.push(Event::TableInstantiated { info });
        Ok(())
    }

    fn spawn_unit(
        &mut self,
        column: i32,
        cost: u32,
        distance: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let _ = self.ensure_playing()?;
        if self.pending.is_some() {
            return Err(CommandError::UnitPending);
        }

        let bounds = self.bounds();
        if column < bounds.spawn_min_column() || column >= bounds.spawn_max_column() {
            return Err(CommandError::OutsideSpawnBand { column });
        }

        let top = Point::new(column, SPAWN_TOP_ROW);
        let bottom = Point::new(column, SPAWN_BOTTOM_ROW);
        for cell in [top, bottom] {
            if !self.grid.is_empty(self.to_absolute(cell)) {
                return Err(CommandError::CellOccupied { at: cell });
            }
        }

        let id = self.allocate_unit_id();
        let absolute_top = self.to_absolute(top);
        let absolute_bottom = self.to_absolute(bottom);
        self.grid.occupy(id, absolute_top);
        self.grid.occupy(id, absolute_bottom);
        self.units.push(Unit {
            id,
            cost,
            distance,
            first: absolute_top,
            second: absolute_bottom,
        });
        self.pending = Some(id);

        out_events.push(Event::UnitInstantiated {
            unit: id,
            column,
            cost,
            distance,
        });
        Ok(())
    }

    fn scroll_unit(
        &mut self,
        from_column: i32,
        to_column: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let _ = self.ensure_playing()?;

        let old_top = Point::new(from_column, SPAWN_TOP_ROW);
        let id = self
            .grid
            .occupant(self.to_absolute(old_top))
            .ok_or(CommandError::MissingUnit {
                column: from_column,
            })?;

        let bounds = self.bounds();
        if to_column < bounds.spawn_min_column() || to_column >= bounds.spawn_max_column() {
            return Err(CommandError::OutsideSpawnBand { column: to_column });
        }

        if to_column == from_column {
            return Ok(());
        }

        let new_top = Point::new(to_column, SPAWN_TOP_ROW);
        let new_bottom = Point::new(to_column, SPAWN_BOTTOM_ROW);
        for cell in [new_top, new_bottom] {
            if !self.grid.is_empty(self.to_absolute(cell)) {
                return Err(CommandError::CellOccupied { at: cell });
            }
        }

        let old_bottom = Point::new(from_column, SPAWN_BOTTOM_ROW);
        self.grid.vacate(self.to_absolute(old_top));
        self.grid.vacate(self.to_absolute(old_bottom));

        let absolute_top = self.to_absolute(new_top);
        let absolute_bottom = self.to_absolute(new_bottom);
        self.grid.occupy(id, absolute_top);
        self.grid.occupy(id, absolute_bottom);
        if let Some(unit) = self.unit_mut(id) {
            unit.first = absolute_top;
            unit.second = absolute_bottom;
        }

        out_events.push(Event::UnitScrolled {
            unit: id,
            from_column,
            to_column,
        });
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the board, mutating state deterministically
/// and appending the resulting events.
///
/// # Errors
///
/// Returns a [`CommandError`] when a precondition is violated; the board is
/// left unchanged in that case.
pub fn apply(
    board: &mut Board,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    match command {
        Command::InitTable { info } => board.init_table(info, out_events),
        Command::SpawnUnit {
            column,
            cost,
            distance,
        } => board.spawn_unit(column, cost, distance, out_events),
        Command::ScrollUnit {
            from_column,
            to_column,
        } => board.scroll_unit(from_column, to_column, out_events),
        Command::Launch { column } => {
            let _ = board.ensure_playing()?;
            board.resolve_launch(column, out_events)
        }
    }
}

/// Direct board construction helpers for tests.
///
/// Bypasses the spawn flow to arrange arbitrary positions; only compiled when
/// the `unit_scaffolding` feature is enabled.
#[cfg(feature = "unit_scaffolding")]
pub mod scaffolding {
    use turntable_core::{Point, UnitId};

    use super::{Board, Unit};

    /// Places a unit occupying the two relative cells with the given cost and
    /// remaining travel distance, returning its identifier.
    pub fn place_unit(
        board: &mut Board,
        first: Point,
        second: Point,
        cost: u32,
        distance: u32,
    ) -> UnitId {
        let id = board.allocate_unit_id();
        let absolute_first = board.to_absolute(first);
        let absolute_second = board.to_absolute(second);
        board.grid.occupy(id, absolute_first);
        board.grid.occupy(id, absolute_second);
        board.units.push(Unit {
            id,
            cost,
            distance,
            first: absolute_first,
            second: absolute_second,
        });
        id
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use turntable_core::{Direction, Phase, Point, TableInfo, UnitId};

    use super::{Board, PlayfieldBounds};

    /// Current lifecycle phase of the board.
    #[must_use]
    pub fn phase(board: &Board) -> Phase {
        board.phase
    }

    /// Current facing used by the relative-to-absolute mapping.
    #[must_use]
    pub fn facing(board: &Board) -> Direction {
        board.facing
    }

    /// Configuration of the active table, if one has been initialized.
    #[must_use]
    pub fn table_info(board: &Board) -> Option<TableInfo> {
        board.info
    }

    /// Playfield geometry of the active table, if one has been initialized.
    #[must_use]
    pub fn bounds(board: &Board) -> Option<PlayfieldBounds> {
        board.info.map(|info| PlayfieldBounds::from_table_size(info.table_size()))
    }

    /// Identifier of the spawned unit awaiting launch, if any.
    #[must_use]
    pub fn pending_unit(board: &Board) -> Option<UnitId> {
        board.pending
    }

    /// Captures a read-only view of all live units.
    #[must_use]
    pub fn unit_view(board: &Board) -> UnitView {
        let mut snapshots: Vec<UnitSnapshot> = board
            .units
            .iter()
            .map(|unit| UnitSnapshot {
                id: unit.id,
                cost: unit.cost,
                distance: unit.distance,
                first: board.to_relative(unit.first),
                second: board.to_relative(unit.second),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        UnitView { snapshots }
    }

    /// Exposes a read-only, relative-frame view of the cell grid.
    #[must_use]
    pub fn occupancy_view(board: &Board) -> OccupancyView<'_> {
        OccupancyView { board }
    }

    /// Read-only snapshot describing all live units in deterministic order.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct UnitView {
        snapshots: Vec<UnitSnapshot>,
    }

    impl UnitView {
        /// Iterator over the captured unit snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter()
        }

        /// Number of live units.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the board holds no units.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<UnitSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single unit's state used for queries.
    ///
    /// Cell positions are expressed in the relative frame so observers see
    /// the board the way the player does.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UnitSnapshot {
        /// Unique identifier assigned to the unit.
        pub id: UnitId,
        /// Current cost; tile value is `2^cost`.
        pub cost: u32,
        /// Remaining forward travel.
        pub distance: u32,
        /// Anchor cell in the relative frame.
        pub first: Point,
        /// Companion cell in the relative frame.
        pub second: Point,
    }

    /// Read-only view into the cell grid, addressed in the relative frame.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        board: &'a Board,
    }

    impl OccupancyView<'_> {
        /// Returns the unit occupying the provided relative cell, if any.
        #[must_use]
        pub fn occupant(&self, cell: Point) -> Option<UnitId> {
            self.board.grid.occupant(self.board.to_absolute(cell))
        }

        /// Reports whether the relative cell is in bounds and vacant.
        #[must_use]
        pub fn is_free(&self, cell: Point) -> bool {
            self.board.grid.is_empty(self.board.to_absolute(cell))
        }

        /// Side length of the underlying storage grid.
        #[must_use]
        pub fn table_size(&self) -> i32 {
            self.board.grid.size()
        }
    }
}
