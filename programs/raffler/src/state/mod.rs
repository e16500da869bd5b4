pub use escrow::*;
pub use factory::*;
pub use hat::*;
pub use rafflable::*;
pub use raffler::*;
pub use ticket::*;

pub mod escrow;
pub mod factory;
pub mod hat;
pub mod rafflable;
pub mod raffler;
pub mod ticket;
