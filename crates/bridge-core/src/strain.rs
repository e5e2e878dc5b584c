use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strain {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    NoTrump,
}

impl Strain {
    pub const ALL: [Strain; 5] = [
        Strain::Clubs,
        Strain::Diamonds,
        Strain::Hearts,
        Strain::Spades,
        Strain::NoTrump,
    ];

    pub const SUITS: [Strain; 4] = [
        Strain::Clubs,
        Strain::Diamonds,
        Strain::Hearts,
        Strain::Spades,
    ];

    /// Short form used in notation and description placeholders.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Strain::Clubs => "C",
            Strain::Diamonds => "D",
            Strain::Hearts => "H",
            Strain::Spades => "S",
            Strain::NoTrump => "NT",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Strain::Clubs),
            'D' => Some(Strain::Diamonds),
            'H' => Some(Strain::Hearts),
            'S' => Some(Strain::Spades),
            'N' => Some(Strain::NoTrump),
            _ => None,
        }
    }

    /// The following strain in bidding order. NoTrump wraps to Clubs; the
    /// caller is responsible for raising the level.
    pub fn next(self) -> Strain {
        match self {
            Strain::Clubs => Strain::Diamonds,
            Strain::Diamonds => Strain::Hearts,
            Strain::Hearts => Strain::Spades,
            Strain::Spades => Strain::NoTrump,
            Strain::NoTrump => Strain::Clubs,
        }
    }

    /// The other suit of the same rank class (Hearts <-> Spades, Clubs <-> Diamonds).
    pub fn other_of_class(self) -> Option<Strain> {
        match self {
            Strain::Clubs => Some(Strain::Diamonds),
            Strain::Diamonds => Some(Strain::Clubs),
            Strain::Hearts => Some(Strain::Spades),
            Strain::Spades => Some(Strain::Hearts),
            Strain::NoTrump => None,
        }
    }
}

impl fmt::Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}
