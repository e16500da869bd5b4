use anchor_lang::prelude::*;

// 8 discriminator + 32 raffler + 8 id + 32 owner + 8 slot + 1 bump
pub const TICKET_ACCOUNT_SIZE: usize = 8 + 32 + 8 + 32 + 8 + 1;

/// Ownership record of one ticket id, the address a winning id pays out to.
#[account]
#[derive(Debug)]
pub struct Ticket {
    pub raffler: Pubkey,
    pub id: u64,
    pub owner: Pubkey,
    /// Hat slot the id was last placed in
    pub slot: u64,
    pub bump: u8,
}

impl Ticket {
    pub fn owner_of(&self, raffler: &Pubkey, id: u64) -> Option<Pubkey> {
        (self.raffler == *raffler && self.id == id).then_some(self.owner)
    }
}
