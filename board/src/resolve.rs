//! Launch resolution: the slide phase, the push/merge chain, and turn
//! completion.
//!
//! The original game relayed these steps through animation callbacks; here
//! the whole resolution runs synchronously inside `apply`. All movement is
//! expressed in the relative frame and converted to absolute storage
//! coordinates at the grid boundary.

use turntable_core::{CommandError, Event, MoveKind, Phase, Point, UnitId};

use crate::{Board, SPAWN_TOP_ROW};

impl Board {
    pub(crate) fn resolve_launch(
        &mut self,
        column: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let top = Point::new(column, SPAWN_TOP_ROW);
        let id = self
            .grid
            .occupant(self.to_absolute(top))
            .ok_or(CommandError::MissingUnit { column })?;
        let second = self.search_second_part(top)?;

        self.pending = None;
        out_events.push(Event::UnitLaunched { unit: id, column });

        self.slide(id, top, second, out_events);

        loop {
            let distance = self.unit(id).map_or(0, |unit| unit.distance);
            if distance == 0 {
                break;
            }
            if !self.can_push(id, 0, out_events)? {
                break;
            }
            self.push_chain(id, 0, out_events)?;
            if let Some(unit) = self.unit_mut(id) {
                unit.distance -= 1;
            }
        }

        self.complete_turn(out_events);
        Ok(())
    }

    /// Advances the unit along the relative up axis while cells ahead are
    /// free, consuming distance per step. No move event is emitted when the
    /// unit never leaves its origin.
    fn slide(&mut self, id: UnitId, top: Point, second: Point, out_events: &mut Vec<Event>) {
        let offset = second - top;
        let mut target = top;

        loop {
            let distance = self.unit(id).map_or(0, |unit| unit.distance);
            if distance == 0 {
                break;
            }
            let next_top = target + Point::UP;
            let next_second = next_top + offset;
            if !self.cell_open_for(id, next_top) || !self.cell_open_for(id, next_second) {
                break;
            }
            target = next_top;
            if let Some(unit) = self.unit_mut(id) {
                unit.distance -= 1;
            }
        }

        if target != top {
            let old_absolute = [self.to_absolute(top), self.to_absolute(second)];
            for cell in old_absolute {
                self.grid.vacate(cell);
            }
            let new_top = self.to_absolute(target);
            let new_second = self.to_absolute(target + offset);
            self.grid.occupy(id, new_top);
            self.grid.occupy(id, new_second);
            if let Some(unit) = self.unit_mut(id) {
                unit.first = new_top;
                unit.second = new_second;
            }
            out_events.push(Event::UnitMoved {
                unit: id,
                from: top,
                to: target,
                kind: MoveKind::Slide,
            });
        }
    }

    /// Reports whether a relative cell is free for the given unit: either
    /// vacant, or one of the unit's own current cells.
    fn cell_open_for(&self, id: UnitId, cell: Point) -> bool {
        match self.grid.occupant(self.to_absolute(cell)) {
            None => self.grid.is_empty(self.to_absolute(cell)),
            Some(occupant) => occupant == id,
        }
    }

    /// Decides whether the chain of units above can make room for one upward
    /// step, merging equal-cost obstructions along the way.
    ///
    /// Merging is a side effect of the decision, exactly as in the original
    /// rules: a successful merge removes the obstruction and counts as
    /// pushable space.
    fn can_push(
        &mut self,
        id: UnitId,
        depth: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, CommandError> {
        let Some((first, second)) = self.relative_points(id) else {
            return Ok(false);
        };
        if depth > self.grid.size() {
            return Err(CommandError::CorruptBoard { at: first });
        }

        let bounds = self.bounds();
        if first.y().max(second.y()) >= bounds.push_ceiling() {
            return Ok(false);
        }

        if first.x() == second.x() {
            let top = if first.y() > second.y() { first } else { second };
            match self.occupant_at(top + Point::UP) {
                None => Ok(true),
                Some(other) => {
                    if self.merge_units(id, other, out_events) {
                        Ok(true)
                    } else {
                        self.can_push(other, depth + 1, out_events)
                    }
                }
            }
        } else {
            let (left, right) = if first.x() < second.x() {
                (first, second)
            } else {
                (second, first)
            };
            let left_occupant = self.occupant_at(left + Point::UP);
            let right_occupant = self.occupant_at(right + Point::UP);

            match (left_occupant, right_occupant) {
                (None, None) => Ok(true),
                (None, Some(other)) | (Some(other), None) => {
                    if self.merge_units(id, other, out_events) {
                        Ok(true)
                    } else {
                        self.can_push(other, depth + 1, out_events)
                    }
                }
                (Some(left_unit), Some(right_unit)) if left_unit != right_unit => {
                    let mut left_merged = self.merge_units(id, left_unit, out_events);
                    let right_merged = self.merge_units(id, right_unit, out_events);
                    // Merging one side can raise this unit's cost enough to
                    // unlock the other; retry the failed side once.
                    if !left_merged {
                        left_merged = self.merge_units(id, left_unit, out_events);
                    }

                    if left_merged && right_merged {
                        Ok(true)
                    } else if left_merged {
                        self.can_push(right_unit, depth + 1, out_events)
                    } else if right_merged {
                        self.can_push(left_unit, depth + 1, out_events)
                    } else {
                        Ok(self.can_push(left_unit, depth + 1, out_events)?
                            && self.can_push(right_unit, depth + 1, out_events)?)
                    }
                }
                (Some(shared), Some(_)) => {
                    if self.merge_units(id, shared, out_events) {
                        Ok(true)
                    } else {
                        self.can_push(shared, depth + 1, out_events)
                    }
                }
            }
        }
    }

    /// Displaces the chain above the unit one step upward, highest units
    /// first, then moves the unit itself into the vacated space.
    fn push_chain(
        &mut self,
        id: UnitId,
        depth: i32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let Some((first, second)) = self.relative_points(id) else {
            return Ok(());
        };
        if depth > self.grid.size() {
            return Err(CommandError::CorruptBoard { at: first });
        }

        let bounds = self.bounds();
        if first.y().max(second.y()) >= bounds.margin() + bounds.field_size() {
            return Ok(());
        }

        if first.x() == second.x() {
            let top = if first.y() > second.y() { first } else { second };
            let above = top + Point::UP;
            if let Some(other) = self.occupant_at(above) {
                self.push_chain(other, depth + 1, out_events)?;
            }
            self.displace(id, [first, second], [above, top], top, above, out_events);
        } else {
            let (left, right) = if first.x() < second.x() {
                (first, second)
            } else {
                (second, first)
            };
            let left_above = left + Point::UP;
            let right_above = right + Point::UP;
            match (self.occupant_at(left_above), self.occupant_at(right_above)) {
                (None, None) => {}
                (Some(other), None) | (None, Some(other)) => {
                    self.push_chain(other, depth + 1, out_events)?;
                }
                (Some(left_unit), Some(right_unit)) if left_unit != right_unit => {
                    self.push_chain(left_unit, depth + 1, out_events)?;
                    self.push_chain(right_unit, depth + 1, out_events)?;
                }
                (Some(shared), Some(_)) => {
                    self.push_chain(shared, depth + 1, out_events)?;
                }
            }
            self.displace(
                id,
                [left, right],
                [left_above, right_above],
                left,
                left_above,
                out_events,
            );
        }

        Ok(())
    }

    /// Moves a unit's two cells from `old` to `new` (relative frame) and
    /// records the displacement.
    fn displace(
        &mut self,
        id: UnitId,
        old: [Point; 2],
        new: [Point; 2],
        from: Point,
        to: Point,
        out_events: &mut Vec<Event>,
    ) {
        for cell in old {
            let absolute = self.to_absolute(cell);
            self.grid.vacate(absolute);
        }
        let new_first = self.to_absolute(new[0]);
        let new_second = self.to_absolute(new[1]);
        self.grid.occupy(id, new_first);
        self.grid.occupy(id, new_second);
        if let Some(unit) = self.unit_mut(id) {
            unit.first = new_first;
            unit.second = new_second;
        }
        out_events.push(Event::UnitMoved {
            unit: id,
            from,
            to,
            kind: MoveKind::Push,
        });
    }

    /// Merges `absorbed` into `absorber` when both exist, are distinct, and
    /// carry equal costs. Invalid inputs are a no-op returning `false`.
    fn merge_units(
        &mut self,
        absorber: UnitId,
        absorbed: UnitId,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if absorber == absorbed {
            return false;
        }
        let (Some(first), Some(second)) = (self.unit(absorber), self.unit(absorbed)) else {
            return false;
        };
        if first.cost != second.cost {
            return false;
        }

        let Some(removed) = self.remove_unit(absorbed) else {
            return false;
        };
        self.grid.vacate(removed.first);
        self.grid.vacate(removed.second);

        let Some(unit) = self.unit_mut(absorber) else {
            return false;
        };
        unit.cost += 1;
        let cost = unit.cost;

        out_events.push(Event::UnitsMerged {
            absorber,
            absorbed,
            cost,
        });
        true
    }

    /// Finds the companion cell of the unit occupying `first` by checking the
    /// four clamped axis-neighbors for the same occupant.
    pub(crate) fn search_second_part(&self, first: Point) -> Result<Point, CommandError> {
        let max = Point::ONE * (self.grid.size() - 1);
        let occupant = self.grid.occupant(self.to_absolute(first));
        let candidates = [
            (first + Point::UP).clamp(Point::ZERO, max),
            (first + Point::DOWN).clamp(Point::ZERO, max),
            (first + Point::RIGHT).clamp(Point::ZERO, max),
            (first + Point::LEFT).clamp(Point::ZERO, max),
        ];

        for candidate in candidates {
            if candidate != first
                && occupant.is_some()
                && self.grid.occupant(self.to_absolute(candidate)) == occupant
            {
                return Ok(candidate);
            }
        }
        Err(CommandError::CorruptBoard { at: first })
    }

    fn occupant_at(&self, cell: Point) -> Option<UnitId> {
        self.grid.occupant(self.to_absolute(cell))
    }

    fn relative_points(&self, id: UnitId) -> Option<(Point, Point)> {
        let unit = self.unit(id)?;
        Some((self.to_relative(unit.first), self.to_relative(unit.second)))
    }

    /// Evaluates loss, then win, then rotates the board and advances the
    /// facing for the next spawn.
    fn complete_turn(&mut self, out_events: &mut Vec<Event>) {
        let bounds = self.bounds();
        let overflowed = self
            .grid
            .occupied_cells()
            .any(|(cell, _)| !bounds.contains(cell));
        if overflowed {
            self.phase = Phase::Lost;
            out_events.push(Event::GameOver);
            return;
        }

        if let Some(info) = crate::query::table_info(self) {
            let won = self
                .units
                .iter()
                .any(|unit| info.win_costs().met_by(unit.cost));
            if won {
                self.phase = Phase::Won;
                out_events.push(Event::GameWon);
                return;
            }
        }

        self.facing = self.facing.next();
        out_events.push(Event::BoardRotated {
            facing: self.facing,
        });
    }
}
