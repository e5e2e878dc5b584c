//! Parsing of the raw call notation used as keys in a bidding-system document.
//!
//! A raw token is one of:
//! - a concrete call (`"1C"`, `"2NT!"`, `"X!![negative]"`, `"P"`),
//! - a wildcard standing for several suits (`"2M"` major, `"3m"` minor,
//!   `"1X"` any suit),
//! - an alternation of tokens (`"2m|2NT"`),
//! - anything else, kept verbatim as an opaque token.

use bridge_core::{Call, Strain};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static MAJOR_WILDCARD: Lazy<Regex> = Lazy::new(|| Regex::new("([1-7])M").expect("valid regex"));
static MINOR_WILDCARD: Lazy<Regex> = Lazy::new(|| Regex::new("([1-7])m").expect("valid regex"));
static SUIT_WILDCARD: Lazy<Regex> = Lazy::new(|| Regex::new("([1-7])X").expect("valid regex"));

/// An expansion dimension. Every wildcard of the same dimension inside one
/// expansion branch binds to the same suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wildcard {
    Major,
    Minor,
    AnySuit,
}

impl Wildcard {
    pub const ALL: [Wildcard; 3] = [Wildcard::Major, Wildcard::Minor, Wildcard::AnySuit];

    fn pattern(self) -> &'static Regex {
        match self {
            Wildcard::Major => &*MAJOR_WILDCARD,
            Wildcard::Minor => &*MINOR_WILDCARD,
            Wildcard::AnySuit => &*SUIT_WILDCARD,
        }
    }

    /// Suits this wildcard may stand for, in enumeration order.
    pub fn choices(self) -> &'static [Strain] {
        match self {
            Wildcard::Major => &[Strain::Hearts, Strain::Spades],
            Wildcard::Minor => &[Strain::Clubs, Strain::Diamonds],
            Wildcard::AnySuit => &Strain::SUITS,
        }
    }

    pub fn occurs_in(self, raw: &str) -> bool {
        self.pattern().is_match(raw)
    }

    /// Replaces every occurrence of this wildcard in `raw` with `strain`,
    /// keeping the level digit.
    pub fn substitute(self, raw: &str, strain: Strain) -> String {
        let replacement = format!("${{1}}{}", strain.abbreviation());
        self.pattern().replace_all(raw, replacement.as_str()).into_owned()
    }

    fn level_in(self, raw: &str) -> Option<u8> {
        self.pattern()
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationKind {
    Call(Call),
    /// Unresolved until expansion binds every listed dimension.
    Wildcard { level: u8, wildcards: Vec<Wildcard> },
    /// Branches are parsed but not evaluated until expansion.
    Alternation(Vec<Notation>),
    Opaque,
}

/// The parse of one raw textual call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    pub raw: String,
    pub kind: NotationKind,
    pub alert_tag: Option<String>,
    pub alertable: bool,
    pub announceable: bool,
}

impl Notation {
    pub fn parse(raw: &str) -> Notation {
        let branches = split_alternation(raw);
        if branches.len() > 1 {
            let branches = branches
                .into_iter()
                .filter(|branch| !branch.is_empty())
                .map(Notation::parse)
                .collect();
            return Notation::bare(raw, NotationKind::Alternation(branches));
        }

        let (body, alert_tag) = split_alert_tag(raw);
        let announceable = body.contains("!!");
        let alertable = !announceable && body.contains('!');

        let wildcards: Vec<Wildcard> = Wildcard::ALL
            .into_iter()
            .filter(|w| w.occurs_in(&body))
            .collect();

        let kind = match wildcards.first().and_then(|w| w.level_in(&body)) {
            Some(level) => NotationKind::Wildcard { level, wildcards },
            None => parse_call(&body).map_or(NotationKind::Opaque, NotationKind::Call),
        };

        Notation {
            raw: raw.to_string(),
            kind,
            alert_tag,
            alertable,
            announceable,
        }
    }

    fn bare(raw: &str, kind: NotationKind) -> Notation {
        Notation {
            raw: raw.to_string(),
            kind,
            alert_tag: None,
            alertable: false,
            announceable: false,
        }
    }

    pub fn call(&self) -> Option<Call> {
        match self.kind {
            NotationKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, NotationKind::Wildcard { .. })
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, NotationKind::Opaque)
    }

    pub fn alternatives(&self) -> &[Notation] {
        match &self.kind {
            NotationKind::Alternation(branches) => branches,
            _ => &[],
        }
    }

    /// Dimensions that must be bound before this token is concrete.
    pub fn wildcards(&self) -> &[Wildcard] {
        match &self.kind {
            NotationKind::Wildcard { wildcards, .. } => wildcards,
            _ => &[],
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Splits on every `|` outside an alert tag, so `"2D![a|b]|2H!"` has two
/// branches.
fn split_alternation(raw: &str) -> Vec<&str> {
    let mut branches = Vec::new();
    let mut in_tag = false;
    let mut start = 0;
    for (i, c) in raw.char_indices() {
        match c {
            '[' => in_tag = true,
            ']' => in_tag = false,
            '|' if !in_tag => {
                branches.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    branches.push(&raw[start..]);
    branches
}

/// Splits `"2C![Stayman]"` into `("2C!", Some("Stayman"))`. An unterminated
/// bracket runs to the end of the token.
fn split_alert_tag(raw: &str) -> (String, Option<String>) {
    let Some(open) = raw.find('[') else {
        return (raw.to_string(), None);
    };
    let rest = &raw[open + 1..];
    match rest.find(']') {
        Some(close) => {
            let tag = rest[..close].to_string();
            let body = format!("{}{}", &raw[..open], &rest[close + 1..]);
            (body, Some(tag))
        }
        None => (raw[..open].to_string(), Some(rest.to_string())),
    }
}

fn parse_call(body: &str) -> Option<Call> {
    let digits: String = body.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let level = digits.parse().ok()?;
        return Call::bid(level, detect_strain(body)?);
    }

    if body.starts_with("XX") {
        Some(Call::Redouble)
    } else if body.starts_with('X') {
        Some(Call::Double)
    } else if body.starts_with('P') {
        Some(Call::Pass)
    } else {
        None
    }
}

fn detect_strain(body: &str) -> Option<Strain> {
    if body.contains('C') {
        Some(Strain::Clubs)
    } else if body.contains('D') {
        Some(Strain::Diamonds)
    } else if body.contains('H') {
        Some(Strain::Hearts)
    } else if body.contains('S') {
        Some(Strain::Spades)
    } else if body.contains('N') {
        Some(Strain::NoTrump)
    } else {
        None
    }
}
