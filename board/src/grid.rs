//! Dense cell storage backing the board.

use turntable_core::{Point, UnitId};

/// Square array of `Option<UnitId>` cells addressed by absolute coordinates.
///
/// Both cells of a live unit hold the same identifier; the unit store keeps
/// the authoritative anchor points. Cells outside the array bounds behave as
/// permanently blocked so movement code never needs separate bounds checks.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    size: i32,
    cells: Vec<Option<UnitId>>,
}

impl Grid {
    pub(crate) fn new(size: i32) -> Self {
        let capacity = usize::try_from(size.max(0)).unwrap_or(0);
        Self {
            size,
            cells: vec![None; capacity * capacity],
        }
    }

    pub(crate) fn size(&self) -> i32 {
        self.size
    }

    fn index(&self, point: Point) -> Option<usize> {
        if point.x() < 0 || point.x() >= self.size || point.y() < 0 || point.y() >= self.size {
            return None;
        }
        let x = usize::try_from(point.x()).ok()?;
        let y = usize::try_from(point.y()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(y * width + x)
    }

    /// Unit occupying the cell, if the cell is in bounds and filled.
    pub(crate) fn occupant(&self, point: Point) -> Option<UnitId> {
        self.index(point)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell is in bounds and vacant.
    pub(crate) fn is_empty(&self, point: Point) -> bool {
        self.index(point)
            .map_or(false, |index| self.cells[index].is_none())
    }

    pub(crate) fn occupy(&mut self, unit: UnitId, point: Point) {
        if let Some(index) = self.index(point) {
            self.cells[index] = Some(unit);
        }
    }

    pub(crate) fn vacate(&mut self, point: Point) {
        if let Some(index) = self.index(point) {
            self.cells[index] = None;
        }
    }

    /// Iterates every occupied cell with its occupant, row-major order.
    pub(crate) fn occupied_cells(&self) -> impl Iterator<Item = (Point, UnitId)> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let unit = (*cell)?;
            let index = i32::try_from(i).ok()?;
            Some((Point::new(index % size, index / size), unit))
        })
    }
}
