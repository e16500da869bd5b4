pub use add_entry::*;
pub use configure_cost::*;
pub use configure_prize::*;
pub use create_rafflable::*;
pub use create_raffler::*;
pub use deploy_raffle::*;
pub use draw_round::*;
pub use fund_prize::*;
pub use init_factory::*;
pub use mint_ticket::*;
pub use set_raffler::*;
pub use withdraw_proceeds::*;

pub mod add_entry;
pub mod configure_cost;
pub mod configure_prize;
pub mod create_rafflable;
pub mod create_raffler;
pub mod deploy_raffle;
pub mod draw_round;
pub mod fund_prize;
pub mod init_factory;
pub mod mint_ticket;
pub mod set_raffler;
pub mod withdraw_proceeds;
