use bridge_core::auction::Auction;
use bridge_core::call::Call;
use proptest::prelude::*;

/// Walks a legal auction by picking, at each step, one of the legal calls
/// selected by the given choice indices.
fn legal_auction(choices: &[usize]) -> Vec<Call> {
    let mut calls = Vec::new();
    for choice in choices {
        let legal = Auction::legal_next_calls(&calls);
        if legal.is_empty() {
            break;
        }
        calls.push(legal[choice % legal.len()]);
    }
    calls
}

proptest! {
    #[test]
    fn enumeration_agrees_with_validator(choices in prop::collection::vec(0usize..64, 0..14)) {
        let history = legal_auction(&choices);
        prop_assert!(Auction::validate_calls(&history));

        let legal = Auction::legal_next_calls(&history);
        for call in Call::ALL {
            let mut extended = history.clone();
            extended.push(call);
            prop_assert_eq!(
                Auction::validate_calls(&extended),
                legal.contains(&call),
                "history {:?} next {}", history, call
            );
        }
    }

    #[test]
    fn prefixes_of_legal_auctions_are_legal(choices in prop::collection::vec(0usize..64, 0..14)) {
        let history = legal_auction(&choices);
        for len in 0..=history.len() {
            prop_assert!(Auction::validate_calls(&history[..len]));
        }
    }

    #[test]
    fn contract_calls_strictly_ascend(choices in prop::collection::vec(0usize..64, 0..14)) {
        let history = legal_auction(&choices);
        let bids: Vec<_> = history.iter().filter(|c| c.is_bid()).collect();
        prop_assert!(bids.windows(2).all(|w| w[1].is_higher_than(w[0])));
    }
}

#[test]
fn test_legal_next_calls_are_ordered() {
    let calls = Auction::legal_next_calls(&Auction::bidding("1C X").calls);
    assert_eq!(&calls[..2], &[Call::Pass, Call::Redouble]);
    let bids: Vec<_> = calls.iter().filter(|c| c.is_bid()).collect();
    assert!(bids.windows(2).all(|w| w[1].is_higher_than(w[0])));
}
