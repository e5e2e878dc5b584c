use crate::strain::Strain;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One action in an auction.
///
/// `Call` deliberately has no `Ord`: contract calls compare by
/// `(level, strain)` through [`Call::contract_cmp`], while Pass, Double and
/// Redouble have no meaningful rank against each other or against bids.
/// Auction legality handles them with dedicated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Call {
    Pass,
    Double,
    Redouble,
    Bid { level: u8, strain: Strain },
}

impl Call {
    /// Pass, Double, Redouble, then every contract call from 1C to 7NT.
    pub const ALL: [Call; 38] = {
        let mut all = [Call::Pass; 38];
        all[1] = Call::Double;
        all[2] = Call::Redouble;
        let mut i = 0;
        while i < 35 {
            all[3 + i] = Call::Bid {
                level: (i / 5) as u8 + 1,
                strain: Strain::ALL[i % 5],
            };
            i += 1;
        }
        all
    };

    /// Builds a contract call, rejecting levels outside 1..=7.
    pub fn bid(level: u8, strain: Strain) -> Option<Call> {
        (1..=7)
            .contains(&level)
            .then_some(Call::Bid { level, strain })
    }

    pub fn is_bid(&self) -> bool {
        matches!(self, Call::Bid { .. })
    }

    /// Returns the strain of this call, if it's a bid.
    pub fn strain(&self) -> Option<Strain> {
        match self {
            Call::Bid { strain, .. } => Some(*strain),
            _ => None,
        }
    }

    /// Orders two contract calls by `(level, strain)`. Any comparison that
    /// involves Pass, Double or Redouble is unspecified and yields `None`.
    pub fn contract_cmp(&self, other: &Call) -> Option<Ordering> {
        match (self, other) {
            (
                Call::Bid { level, strain },
                Call::Bid {
                    level: other_level,
                    strain: other_strain,
                },
            ) => Some((level, strain).cmp(&(other_level, other_strain))),
            _ => None,
        }
    }

    /// True when both calls are bids and `self` outranks `other`.
    pub fn is_higher_than(&self, other: &Call) -> bool {
        self.contract_cmp(other) == Some(Ordering::Greater)
    }

    /// The next contract call in relay order: one strain up, rolling from
    /// NoTrump to the next level's Clubs. `None` past 7NT or for non-bids.
    pub fn next_step(&self) -> Option<Call> {
        match self {
            Call::Bid {
                level,
                strain: Strain::NoTrump,
            } => Call::bid(level + 1, Strain::Clubs),
            Call::Bid { level, strain } => Call::bid(*level, strain.next()),
            _ => None,
        }
    }

    pub fn render(self) -> String {
        match self {
            Call::Pass => "P".to_string(),
            Call::Double => "X".to_string(),
            Call::Redouble => "XX".to_string(),
            Call::Bid { level, strain } => format!("{}{}", level, strain.abbreviation()),
        }
    }
}

impl FromStr for Call {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        if s == "P" || s == "PASS" {
            return Ok(Call::Pass);
        }
        if s == "X" || s == "DBL" || s == "DOUBLE" {
            return Ok(Call::Double);
        }
        if s == "XX" || s == "RDBL" || s == "REDOUBLE" {
            return Ok(Call::Redouble);
        }
        if s.len() >= 2 {
            let level_char = s.chars().next().ok_or(())?;
            let level = level_char.to_digit(10).ok_or(())? as u8;
            let rest = &s[1..];
            let strain = match rest {
                "NT" | "N" => Strain::NoTrump,
                _ if rest.len() == 1 => rest.chars().next().and_then(Strain::from_char).ok_or(())?,
                _ => return Err(()),
            };
            return Call::bid(level, strain).ok_or(());
        }
        Err(())
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
