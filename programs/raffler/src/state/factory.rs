use anchor_lang::prelude::*;

// 8 discriminator + 8 raffle_counter + 1 bump
pub const FACTORY_ACCOUNT_SIZE: usize = 8 + 8 + 1;

#[account]
pub struct Factory {
    pub raffle_counter: u64,
    pub bump: u8,
}
