pub mod strain;
pub mod call;
pub mod auction;

pub use strain::Strain;
pub use call::Call;
pub use auction::{Auction, AuctionState, IllegalAuction, IllegalCall};
