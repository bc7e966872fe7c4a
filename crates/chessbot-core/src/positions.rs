//! Calibrated arm positions for every square on the board
//!
//! Each square maps to how far the gripper must travel forward and how far the
//! base must rotate to reach it. The values were measured on a 260mm board with
//! the arm mounted 2cm from the edge of the d file; the rotation per file is
//! fixed, forward travel grows with distance from the base.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::board::Coordinate;
use crate::errors::ChessBotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    /// Forward travel in millimeters.
    pub forward: u32,
    /// Base rotation in degrees; negative turns left, positive turns right.
    pub rotation: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Aligned,
    Left,
    Right,
}

impl PositionEntry {
    pub const fn new(forward: u32, rotation: i32) -> Self {
        Self { forward, rotation }
    }

    pub fn direction(&self) -> Direction {
        match self.rotation {
            0 => Direction::Aligned,
            r if r < 0 => Direction::Left,
            _ => Direction::Right,
        }
    }
}

// Ordered file by file (a..h), rank 8 down to rank 1 within a file.
const POSITION_DATA: [PositionEntry; 64] = [
    // a: 90 degrees left
    PositionEntry::new(30, -90),
    PositionEntry::new(70, -90),
    PositionEntry::new(120, -90),
    PositionEntry::new(150, -90),
    PositionEntry::new(180, -90),
    PositionEntry::new(210, -90),
    PositionEntry::new(240, -90),
    PositionEntry::new(270, -90),
    // b: 45 degrees left
    PositionEntry::new(42, -45),
    PositionEntry::new(98, -45),
    PositionEntry::new(169, -45),
    PositionEntry::new(212, -45),
    PositionEntry::new(254, -45),
    PositionEntry::new(297, -45),
    PositionEntry::new(339, -45),
    PositionEntry::new(382, -45),
    // c: 22 degrees left
    PositionEntry::new(32, -22),
    PositionEntry::new(76, -22),
    PositionEntry::new(130, -22),
    PositionEntry::new(163, -22),
    PositionEntry::new(195, -22),
    PositionEntry::new(228, -22),
    PositionEntry::new(260, -22),
    PositionEntry::new(292, -22),
    // d: aligned with the arm
    PositionEntry::new(30, 0),
    PositionEntry::new(70, 0),
    PositionEntry::new(120, 0),
    PositionEntry::new(150, 0),
    PositionEntry::new(180, 0),
    PositionEntry::new(210, 0),
    PositionEntry::new(240, 0),
    PositionEntry::new(270, 0),
    // e: 22 degrees right
    PositionEntry::new(32, 22),
    PositionEntry::new(76, 22),
    PositionEntry::new(130, 22),
    PositionEntry::new(163, 22),
    PositionEntry::new(195, 22),
    PositionEntry::new(228, 22),
    PositionEntry::new(260, 22),
    PositionEntry::new(292, 22),
    // f: 45 degrees right
    PositionEntry::new(42, 45),
    PositionEntry::new(98, 45),
    PositionEntry::new(169, 45),
    PositionEntry::new(212, 45),
    PositionEntry::new(254, 45),
    PositionEntry::new(297, 45),
    PositionEntry::new(339, 45),
    PositionEntry::new(382, 45),
    // g: 67 degrees right
    PositionEntry::new(78, 67),
    PositionEntry::new(179, 67),
    PositionEntry::new(307, 67),
    PositionEntry::new(384, 67),
    PositionEntry::new(461, 67),
    PositionEntry::new(538, 67),
    PositionEntry::new(614, 67),
    PositionEntry::new(691, 67),
    // h: 90 degrees right
    PositionEntry::new(30, 90),
    PositionEntry::new(70, 90),
    PositionEntry::new(120, 90),
    PositionEntry::new(150, 90),
    PositionEntry::new(180, 90),
    PositionEntry::new(210, 90),
    PositionEntry::new(240, 90),
    PositionEntry::new(270, 90),
];

static GLOBAL_TABLE: OnceLock<PositionTable> = OnceLock::new();

/// Read-only lookup from square to arm position.
#[derive(Debug, Clone)]
pub struct PositionTable {
    entries: HashMap<Coordinate, PositionEntry>,
}

impl PositionTable {
    /// The calibrated table, built on first use and shared for the process lifetime.
    pub fn global() -> &'static PositionTable {
        GLOBAL_TABLE.get_or_init(|| {
            let entries = Coordinate::all()
                .map(|coordinate| (coordinate, POSITION_DATA[coordinate.index()]))
                .collect();
            PositionTable { entries }
        })
    }

    pub fn lookup(&self, coordinate: &Coordinate) -> Result<PositionEntry, ChessBotError> {
        self.entries
            .get(coordinate)
            .copied()
            .ok_or_else(|| ChessBotError::not_found(coordinate.label()))
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries.contains_key(coordinate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convenience lookup against the global table.
pub fn lookup(coordinate: &Coordinate) -> Result<PositionEntry, ChessBotError> {
    PositionTable::global().lookup(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED_ROTATIONS: [i32; 9] = [-90, -67, -45, -22, 0, 22, 45, 67, 90];

    #[test]
    fn test_every_square_has_a_valid_entry() {
        let table = PositionTable::global();
        assert_eq!(table.len(), 64);
        for coordinate in Coordinate::all() {
            let entry = table.lookup(&coordinate).unwrap();
            assert!(entry.forward > 0, "{} has no forward travel", coordinate);
            assert!(
                ALLOWED_ROTATIONS.contains(&entry.rotation),
                "{} has rotation {}",
                coordinate,
                entry.rotation
            );
        }
    }

    #[test]
    fn test_rotation_is_constant_per_file() {
        for column in "abcdefgh".chars() {
            let rotations: Vec<i32> = (1..=8)
                .map(|row| {
                    let coordinate: Coordinate = format!("{}{}", column, row).parse().unwrap();
                    lookup(&coordinate).unwrap().rotation
                })
                .collect();
            assert!(rotations.windows(2).all(|w| w[0] == w[1]), "file {}", column);
        }
    }

    #[test]
    fn test_known_entries() {
        let d7: Coordinate = "d7".parse().unwrap();
        assert_eq!(lookup(&d7).unwrap(), PositionEntry::new(70, 0));

        let a8: Coordinate = "a8".parse().unwrap();
        assert_eq!(lookup(&a8).unwrap(), PositionEntry::new(30, -90));

        let g1: Coordinate = "g1".parse().unwrap();
        assert_eq!(lookup(&g1).unwrap(), PositionEntry::new(691, 67));

        let h1: Coordinate = "h1".parse().unwrap();
        assert_eq!(lookup(&h1).unwrap(), PositionEntry::new(270, 90));
    }

    #[test]
    fn test_direction() {
        assert_eq!(PositionEntry::new(70, 0).direction(), Direction::Aligned);
        assert_eq!(PositionEntry::new(70, -45).direction(), Direction::Left);
        assert_eq!(PositionEntry::new(70, 22).direction(), Direction::Right);
    }
}
