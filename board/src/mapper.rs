//! Coordinate transforms between the relative (launch-axis) frame and the
//! absolute storage frame.
//!
//! The four transforms are the four 90°-multiple rotations of a square grid
//! about its center; composing the `Right` transform four times yields the
//! identity. Points outside `0..size` map to points outside `0..size`, so
//! bounds checks may be performed in either frame.

use turntable_core::{Direction, Point};

/// Maps a relative-frame point into the absolute storage frame under the
/// provided facing.
pub(crate) fn relative_to_absolute(point: Point, facing: Direction, size: i32) -> Point {
    let edge = size - 1;
    match facing {
        Direction::Up => point,
        Direction::Right => Point::new(point.y(), edge - point.x()),
        Direction::Down => Point::new(edge - point.x(), edge - point.y()),
        Direction::Left => Point::new(edge - point.y(), point.x()),
    }
}

/// Maps an absolute storage point back into the relative frame under the
/// provided facing; the exact inverse of [`relative_to_absolute`].
pub(crate) fn absolute_to_relative(point: Point, facing: Direction, size: i32) -> Point {
    relative_to_absolute(point, inverse(facing), size)
}

const fn inverse(facing: Direction) -> Direction {
    match facing {
        Direction::Up => Direction::Up,
        Direction::Right => Direction::Left,
        Direction::Down => Direction::Down,
        Direction::Left => Direction::Right,
    }
}
