// src/labels.rs - Heading symbols and per-segment label records
//
// Level 1 and level 2 store one `LabelTriple` per step/segment; level 3 stores
// one composite `Level3Label` per segment. Labels are rendered to the classic
// symbol strings only at the edges (display, export).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Terminal symbol appended to each rendered level-1/level-2 axis string.
pub const SEPARATOR: char = '/';

/// Rendered form of the level-3 sentinel.
pub const END_MARKER: &str = "END";

#[derive(Debug, Error, PartialEq)]
pub enum LabelError {
    #[error("Unknown heading symbol '{0}'")]
    UnknownSymbol(char),
    #[error("Symbol '{symbol}' is not valid on the {axis} axis")]
    WrongAxis { symbol: char, axis: Axis },
    #[error("Label triple must have exactly 3 symbols, got '{0}'")]
    TripleLength(String),
    #[error("Level-3 label must not be empty")]
    Empty,
    #[error("Level-3 label '{0}' mixes main-direction and change symbols")]
    MixedCase(String),
    #[error("Level-3 label '{0}' has more than one symbol for an axis")]
    DuplicateAxis(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Movement direction along one axis between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Heading {
    Left,
    Right,
    Forward,
    Backward,
    Up,
    Down,
    /// No movement recorded on this axis.
    Still,
}

impl Heading {
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Heading::Left | Heading::Right => Some(Axis::X),
            Heading::Forward | Heading::Backward => Some(Axis::Y),
            Heading::Up | Heading::Down => Some(Axis::Z),
            Heading::Still => None,
        }
    }

    /// Main-direction (uppercase) symbol.
    pub const fn symbol(self) -> char {
        match self {
            Heading::Left => 'L',
            Heading::Right => 'R',
            Heading::Forward => 'F',
            Heading::Backward => 'B',
            Heading::Up => 'U',
            Heading::Down => 'D',
            Heading::Still => '-',
        }
    }

    /// Change-in-direction (lowercase) symbol.
    pub fn change_symbol(self) -> char {
        self.symbol().to_ascii_lowercase()
    }

    /// Parse either case of a heading symbol, or `-`.
    pub fn from_symbol(symbol: char) -> Result<Self, LabelError> {
        match symbol.to_ascii_uppercase() {
            'L' => Ok(Heading::Left),
            'R' => Ok(Heading::Right),
            'F' => Ok(Heading::Forward),
            'B' => Ok(Heading::Backward),
            'U' => Ok(Heading::Up),
            'D' => Ok(Heading::Down),
            '-' => Ok(Heading::Still),
            _ => Err(LabelError::UnknownSymbol(symbol)),
        }
    }

    pub fn is_still(self) -> bool {
        self == Heading::Still
    }

    /// Whether this heading may be stored on `axis` (`Still` fits every axis).
    pub fn fits(self, axis: Axis) -> bool {
        self.axis().is_none_or(|a| a == axis)
    }
}

/// One heading per axis for a level-1 step or level-2 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LabelTriple {
    x: Heading,
    y: Heading,
    z: Heading,
}

impl LabelTriple {
    pub fn new(x: Heading, y: Heading, z: Heading) -> Result<Self, LabelError> {
        for (heading, axis) in [(x, Axis::X), (y, Axis::Y), (z, Axis::Z)] {
            if !heading.fits(axis) {
                return Err(LabelError::WrongAxis { symbol: heading.symbol(), axis });
            }
        }
        Ok(Self { x, y, z })
    }

    /// Parse a 3-symbol string such as `"L-U"` (X, Y, Z order).
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        let symbols: Vec<char> = text.chars().collect();
        if symbols.len() != 3 {
            return Err(LabelError::TripleLength(text.to_string()));
        }
        let mut headings = [Heading::Still; 3];
        for (slot, symbol) in headings.iter_mut().zip(&symbols) {
            if symbol.is_ascii_lowercase() {
                return Err(LabelError::UnknownSymbol(*symbol));
            }
            *slot = Heading::from_symbol(*symbol)?;
        }
        Self::new(headings[0], headings[1], headings[2])
    }

    pub(crate) const fn from_parts(x: Heading, y: Heading, z: Heading) -> Self {
        Self { x, y, z }
    }

    pub fn x(&self) -> Heading { self.x }
    pub fn y(&self) -> Heading { self.y }
    pub fn z(&self) -> Heading { self.z }

    pub fn get(&self, axis: Axis) -> Heading {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Non-still headings in X, Y, Z order.
    pub fn composite(&self) -> Vec<Heading> {
        [self.x, self.y, self.z].into_iter().filter(|h| !h.is_still()).collect()
    }
}

impl fmt::Display for LabelTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.x.symbol(), self.y.symbol(), self.z.symbol())
    }
}

/// Level-3 segment label.
///
/// A `Main` or `Change` label with no headings is *blank*: it only exists
/// transiently while the classifier's cleanup marks segments for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Level3Label {
    /// Direction held for at least the main-direction threshold (uppercase).
    Main(Vec<Heading>),
    /// Short change in direction (lowercase).
    Change(Vec<Heading>),
    /// Sentinel closing the sequence.
    End,
}

impl Level3Label {
    /// Parse a user-supplied label: 1-3 symbols, one case, at most one per axis.
    /// The sentinel cannot be produced this way.
    pub fn parse(text: &str) -> Result<Self, LabelError> {
        if text.is_empty() {
            return Err(LabelError::Empty);
        }
        let upper = text.chars().all(|c| c.is_ascii_uppercase());
        let lower = text.chars().all(|c| c.is_ascii_lowercase());
        if !upper && !lower {
            // '-' is neither case; report it as an unknown symbol
            if let Some(bad) = text.chars().find(|c| !c.is_ascii_alphabetic()) {
                return Err(LabelError::UnknownSymbol(bad));
            }
            return Err(LabelError::MixedCase(text.to_string()));
        }

        let mut headings = Vec::with_capacity(3);
        for symbol in text.chars() {
            let heading = Heading::from_symbol(symbol)?;
            if headings.iter().any(|h: &Heading| h.axis() == heading.axis()) {
                return Err(LabelError::DuplicateAxis(text.to_string()));
            }
            headings.push(heading);
        }

        Ok(if upper { Level3Label::Main(headings) } else { Level3Label::Change(headings) })
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Level3Label::Main(_))
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Level3Label::Change(_))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Level3Label::End)
    }

    pub fn headings(&self) -> &[Heading] {
        match self {
            Level3Label::Main(h) | Level3Label::Change(h) => h,
            Level3Label::End => &[],
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.is_end() && self.headings().is_empty()
    }

    pub fn has_axis(&self, axis: Axis) -> bool {
        self.headings().iter().any(|h| h.axis() == Some(axis))
    }

    /// Mark for removal by the cleanup pass.
    pub(crate) fn clear(&mut self) {
        if let Level3Label::Main(h) | Level3Label::Change(h) = self {
            h.clear();
        }
    }
}

impl fmt::Display for Level3Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level3Label::Main(headings) => {
                headings.iter().try_for_each(|h| write!(f, "{}", h.symbol()))
            }
            Level3Label::Change(headings) => {
                headings.iter().try_for_each(|h| write!(f, "{}", h.change_symbol()))
            }
            Level3Label::End => f.write_str(END_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_symbols_roundtrip_both_cases() {
        for heading in [Heading::Left, Heading::Right, Heading::Forward, Heading::Backward, Heading::Up, Heading::Down] {
            assert_eq!(Heading::from_symbol(heading.symbol()), Ok(heading));
            assert_eq!(Heading::from_symbol(heading.change_symbol()), Ok(heading));
        }
        assert_eq!(Heading::from_symbol('-'), Ok(Heading::Still));
        assert_eq!(Heading::from_symbol('x'), Err(LabelError::UnknownSymbol('x')));
    }

    #[test]
    fn test_triple_rejects_symbol_on_wrong_axis() {
        assert!(LabelTriple::parse("LB-").is_ok());
        assert_eq!(
            LabelTriple::parse("FL-"),
            Err(LabelError::WrongAxis { symbol: 'F', axis: Axis::X })
        );
        assert_eq!(LabelTriple::parse("L-"), Err(LabelError::TripleLength("L-".to_string())));
        assert_eq!(LabelTriple::parse("l--"), Err(LabelError::UnknownSymbol('l')));
    }

    #[test]
    fn test_triple_composite_drops_still() {
        let triple = LabelTriple::parse("R-D").unwrap();
        assert_eq!(triple.composite(), vec![Heading::Right, Heading::Down]);
        assert_eq!(triple.to_string(), "R-D");
    }

    #[test]
    fn test_level3_parse() {
        assert_eq!(Level3Label::parse("LB"), Ok(Level3Label::Main(vec![Heading::Left, Heading::Backward])));
        assert_eq!(Level3Label::parse("u"), Ok(Level3Label::Change(vec![Heading::Up])));
        assert_eq!(Level3Label::parse("Lb"), Err(LabelError::MixedCase("Lb".to_string())));
        assert_eq!(Level3Label::parse("LR"), Err(LabelError::DuplicateAxis("LR".to_string())));
        assert_eq!(Level3Label::parse("L-"), Err(LabelError::UnknownSymbol('-')));
        assert_eq!(Level3Label::parse(""), Err(LabelError::Empty));
    }

    #[test]
    fn test_level3_display_and_blank() {
        let mut label = Level3Label::Change(vec![Heading::Forward, Heading::Up]);
        assert_eq!(label.to_string(), "fu");
        assert!(label.has_axis(Axis::Y));
        assert!(!label.has_axis(Axis::X));
        label.clear();
        assert!(label.is_blank());
        assert_eq!(Level3Label::End.to_string(), "END");
        assert!(!Level3Label::End.is_blank());
    }
}
