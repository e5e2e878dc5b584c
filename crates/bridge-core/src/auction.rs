use crate::call::Call;
use serde::{Deserialize, Serialize};

/// Why a call cannot be made at this point of the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalCall {
    #[error("a fourth consecutive pass is not allowed")]
    FourthPass,
    #[error("the auction has already ended")]
    AuctionClosed,
    #[error("there is no contract to double or redouble")]
    NoContract,
    #[error("cannot double partner's call")]
    DoublePartner,
    #[error("the contract is already doubled or redoubled")]
    AlreadyDoubled,
    #[error("redouble requires an opponent's double")]
    RedoubleWithoutDouble,
    #[error("cannot redouble partner's double")]
    RedoublePartner,
    #[error("{call} does not outrank {highest}")]
    InsufficientBid { call: Call, highest: Call },
}

/// The first illegal call found in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("call {index} ({call}) is illegal: {reason}")]
pub struct IllegalAuction {
    pub index: usize,
    pub call: Call,
    pub reason: IllegalCall,
}

/// Running state of the legality check.
///
/// Only three facts matter for the next call: how many passes have been made
/// in a row, the last call that was not a pass, and the highest contract so
/// far. The initial state is the empty auction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuctionState {
    passes_in_a_row: u8,
    last_non_pass: Option<Call>,
    highest_contract: Option<Call>,
}

impl AuctionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes_in_a_row(&self) -> u8 {
        self.passes_in_a_row
    }

    pub fn highest_contract(&self) -> Option<Call> {
        self.highest_contract
    }

    /// Three passes after any action end the auction. Three opening passes
    /// leave fourth seat free to open.
    pub fn is_closed(&self) -> bool {
        self.last_non_pass.is_some() && self.passes_in_a_row >= 3
    }

    // An odd run of passes since the last action means the caller is the
    // partner of whoever made it.
    fn targets_partner(&self) -> bool {
        self.passes_in_a_row % 2 == 1
    }

    pub fn check(&self, call: Call) -> Result<(), IllegalCall> {
        if self.is_closed() {
            return Err(IllegalCall::AuctionClosed);
        }

        match call {
            Call::Pass => {
                if self.passes_in_a_row >= 3 {
                    return Err(IllegalCall::FourthPass);
                }
            }
            Call::Double => {
                if self.highest_contract.is_none() {
                    return Err(IllegalCall::NoContract);
                }
                if self.targets_partner() {
                    return Err(IllegalCall::DoublePartner);
                }
                if matches!(self.last_non_pass, Some(Call::Double | Call::Redouble)) {
                    return Err(IllegalCall::AlreadyDoubled);
                }
            }
            Call::Redouble => {
                if self.highest_contract.is_none() {
                    return Err(IllegalCall::NoContract);
                }
                if self.last_non_pass != Some(Call::Double) {
                    return Err(IllegalCall::RedoubleWithoutDouble);
                }
                if self.targets_partner() {
                    return Err(IllegalCall::RedoublePartner);
                }
            }
            Call::Bid { .. } => {
                if let Some(highest) = self.highest_contract {
                    if !call.is_higher_than(&highest) {
                        return Err(IllegalCall::InsufficientBid { call, highest });
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks `call` and, if legal, advances the state past it.
    pub fn apply(&mut self, call: Call) -> Result<(), IllegalCall> {
        self.check(call)?;
        match call {
            Call::Pass => self.passes_in_a_row += 1,
            Call::Double | Call::Redouble => {
                self.passes_in_a_row = 0;
                self.last_non_pass = Some(call);
            }
            Call::Bid { .. } => {
                self.passes_in_a_row = 0;
                self.last_non_pass = Some(call);
                self.highest_contract = Some(call);
            }
        }
        Ok(())
    }

    /// Every call that `check` accepts from this state: Pass, Double,
    /// Redouble, then the contract calls in ascending order.
    pub fn legal_calls(&self) -> Vec<Call> {
        Call::ALL
            .iter()
            .copied()
            .filter(|call| self.check(*call).is_ok())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Auction {
    pub calls: Vec<Call>,
}

impl Auction {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Add a pre-parsed call.
    pub fn add_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    /// Parse and add a single call from a string like "1C", "P", or "X".
    /// Panics on invalid input; meant for tests and known-good data.
    pub fn bid(&mut self, s: &str) {
        self.add_call(s.parse().expect("invalid call"));
    }

    /// Build an auction from space-separated calls like "1C P P X".
    /// Panics on invalid input; meant for tests and known-good data.
    pub fn bidding(calls: &str) -> Self {
        let mut auction = Self::new();
        for token in calls.split_whitespace() {
            auction.bid(token);
        }
        auction
    }

    pub fn is_valid(&self) -> bool {
        Self::validate_calls(&self.calls)
    }

    pub fn validate_calls(calls: &[Call]) -> bool {
        Self::check_calls(calls).is_ok()
    }

    /// Replays `calls` through the state machine, reporting the first
    /// illegal call.
    pub fn check_calls(calls: &[Call]) -> Result<AuctionState, IllegalAuction> {
        let mut state = AuctionState::new();
        for (index, &call) in calls.iter().enumerate() {
            state
                .apply(call)
                .map_err(|reason| IllegalAuction { index, call, reason })?;
        }
        Ok(state)
    }

    /// Return all calls that would be legal as the next call in this auction.
    /// An auction that is already illegal has no legal continuation.
    pub fn legal_calls(&self) -> Vec<Call> {
        Self::legal_next_calls(&self.calls)
    }

    pub fn legal_next_calls(history: &[Call]) -> Vec<Call> {
        match Self::check_calls(history) {
            Ok(state) => state.legal_calls(),
            Err(_) => Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        Self::check_calls(&self.calls)
            .map(|state| state.is_closed())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strain::Strain;

    fn bid(level: u8, strain: Strain) -> Call {
        Call::Bid { level, strain }
    }

    #[test]
    fn test_opening_position() {
        let calls = Auction::new().legal_calls();
        // Pass + 35 bids (7 levels × 5 strains) = 36
        assert_eq!(calls.len(), 36);
        assert_eq!(calls[0], Call::Pass);
        assert_eq!(calls[1], bid(1, Strain::Clubs));
        assert!(!calls.contains(&Call::Double));
        assert!(!calls.contains(&Call::Redouble));
    }

    #[test]
    fn test_balancing_double() {
        let auction = Auction::bidding("1C P P");
        let calls = auction.legal_calls();
        assert!(calls.contains(&Call::Double));
        assert!(calls.contains(&Call::Pass));
        assert!(!calls.contains(&bid(1, Strain::Clubs)));
        assert!(calls.contains(&bid(1, Strain::Diamonds)));
    }

    #[test]
    fn test_redouble_after_double() {
        let calls = Auction::bidding("1C X").legal_calls();
        assert!(calls.contains(&Call::Redouble));
        assert!(!calls.contains(&Call::Double));
    }

    #[test]
    fn test_cannot_double_partner() {
        let err = Auction::check_calls(&Auction::bidding("1C P X").calls).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.reason, IllegalCall::DoublePartner);
    }

    #[test]
    fn test_cannot_redouble_partners_double() {
        let err = Auction::check_calls(&Auction::bidding("1C X P XX").calls).unwrap_err();
        assert_eq!(err.reason, IllegalCall::RedoublePartner);
        assert!(Auction::bidding("1C X P P XX").is_valid());
    }

    #[test]
    fn test_double_needs_contract() {
        let err = Auction::check_calls(&[Call::Pass, Call::Double]).unwrap_err();
        assert_eq!(err.reason, IllegalCall::NoContract);
    }

    #[test]
    fn test_redouble_needs_double() {
        let err = Auction::check_calls(&Auction::bidding("1C XX").calls).unwrap_err();
        assert_eq!(err.reason, IllegalCall::RedoubleWithoutDouble);
        let err = Auction::check_calls(&Auction::bidding("1C X XX XX").calls).unwrap_err();
        assert_eq!(err.reason, IllegalCall::RedoubleWithoutDouble);
    }

    #[test]
    fn test_already_doubled() {
        let err = Auction::check_calls(&Auction::bidding("1C X XX X").calls).unwrap_err();
        assert_eq!(err.reason, IllegalCall::AlreadyDoubled);
    }

    #[test]
    fn test_insufficient_bid() {
        let err = Auction::check_calls(&Auction::bidding("1D P 1C").calls).unwrap_err();
        assert_eq!(
            err.reason,
            IllegalCall::InsufficientBid {
                call: bid(1, Strain::Clubs),
                highest: bid(1, Strain::Diamonds),
            }
        );
        assert!(Auction::bidding("1D X 1NT 2C").is_valid());
    }

    #[test]
    fn test_auction_closes_after_three_passes() {
        let auction = Auction::bidding("1S P P");
        assert!(!auction.is_finished());
        assert!(auction.legal_calls().contains(&Call::Pass));

        let auction = Auction::bidding("1S P P P");
        assert!(auction.is_valid());
        assert!(auction.is_finished());
        assert!(auction.legal_calls().is_empty());
        assert!(!Auction::bidding("1S P P P 2S").is_valid());
    }

    #[test]
    fn test_passed_out_opening() {
        let auction = Auction::bidding("P P P");
        let calls = auction.legal_calls();
        assert!(!calls.contains(&Call::Pass));
        assert!(calls.contains(&bid(1, Strain::Clubs)));
        assert!(!Auction::bidding("P P P P").is_valid());
    }

    #[test]
    fn test_legal_calls_after_bid() {
        let calls = Auction::bidding("1H").legal_calls();
        assert_eq!(&calls[..2], &[Call::Pass, Call::Double]);
        assert!(!calls.contains(&bid(1, Strain::Clubs)));
        assert!(calls.contains(&bid(1, Strain::Spades)));
    }

    #[test]
    fn test_illegal_history_has_no_continuation() {
        assert!(Auction::legal_next_calls(&[bid(2, Strain::Clubs), bid(1, Strain::Clubs)]).is_empty());
    }

    #[test]
    fn test_seven_notrump_leaves_no_bids() {
        let calls = Auction::bidding("7NT").legal_calls();
        assert_eq!(calls, vec![Call::Pass, Call::Double]);
    }

    #[test]
    #[should_panic(expected = "invalid call")]
    fn test_bid_invalid_panics() {
        let mut auction = Auction::new();
        auction.bid("zzz");
    }
}
