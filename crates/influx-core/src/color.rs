//! Named item colors.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Color tag carried by packets, destinations, generators, flags and
/// color-restricted agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Color {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
    /// Orange.
    Orange,
    /// Magenta.
    Magenta,
    /// Cyan.
    Cyan,
    /// Pink.
    Pink,
    /// Gray.
    Gray,
    /// Black. Default color for flags.
    Black,
    /// White.
    White,
}

impl Color {
    /// Lower-case display name.
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::Pink => "pink",
            Color::Gray => "gray",
            Color::Black => "black",
            Color::White => "white",
        }
    }

    /// Whether an agent restricted to `restriction` may handle this color.
    ///
    /// An unrestricted agent (`None`) handles every color.
    pub fn admits(self, restriction: Option<Color>) -> bool {
        restriction.is_none_or(|c| c == self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "yellow" => Ok(Color::Yellow),
            "orange" => Ok(Color::Orange),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "pink" => Ok(Color::Pink),
            "gray" | "grey" => Ok(Color::Gray),
            "black" => Ok(Color::Black),
            "white" => Ok(Color::White),
            _ => Err(ParseError::UnknownName {
                kind: "color",
                name: s.to_string(),
            }),
        }
    }
}
