//! Board coordinates and the validator that produces them
//!
//! A [`Coordinate`] can only be obtained through [`validate`] (or `FromStr`,
//! which delegates to it), so holding one means the square exists in the
//! position table.

use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::positions::PositionTable;

pub const COLUMNS: &str = "abcdefgh";
pub const ROWS: &str = "12345678";

/// A square on the board, e.g. `d7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    column: u8,
    row: u8,
}

impl Coordinate {
    /// Zero-based column index, `a` = 0.
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Zero-based row index, rank `1` = 0.
    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column_char(&self) -> char {
        (b'a' + self.column) as char
    }

    pub fn row_char(&self) -> char {
        (b'1' + self.row) as char
    }

    /// Label used for this square in the command store.
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub(crate) fn index(&self) -> usize {
        self.column as usize * 8 + (7 - self.row as usize)
    }

    /// All 64 squares, rank 8 down to rank 1, file a to h within a rank.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..8u8)
            .rev()
            .flat_map(|row| (0..8u8).map(move |column| Coordinate { column, row }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_char(), self.row_char())
    }
}

impl FromStr for Coordinate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

/// Trims and lowercases raw user input before validation.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks `raw` against the coordinate rules in order; the first failing rule wins.
pub fn validate(raw: &str) -> Result<Coordinate, ValidationError> {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() != 2 {
        return Err(ValidationError::InvalidLength(raw.to_string()));
    }

    let column = COLUMNS
        .find(chars[0])
        .ok_or(ValidationError::InvalidColumn(chars[0]))?;
    let row = ROWS
        .find(chars[1])
        .ok_or(ValidationError::InvalidRow(chars[1]))?;

    let coordinate = Coordinate {
        column: column as u8,
        row: row as u8,
    };

    if !PositionTable::global().contains(&coordinate) {
        return Err(ValidationError::UnknownPosition(raw.to_string()));
    }

    Ok(coordinate)
}

/// Validates both ends of a move and rejects a move onto the same square.
pub fn validate_move(from: &str, to: &str) -> Result<(Coordinate, Coordinate), ValidationError> {
    let from = validate(from)?;
    let to = validate(to)?;
    if from == to {
        return Err(ValidationError::SamePosition(from.label()));
    }
    Ok((from, to))
}
