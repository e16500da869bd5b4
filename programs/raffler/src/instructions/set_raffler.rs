use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{Rafflable, Raffler},
};

/// Event emitted when a ledger is bound to its engine
#[event]
pub struct RafflerSet {
    pub rafflable: Pubkey,
    pub raffler: Pubkey,
}

/// Instruction to bind a standalone ledger to the raffler created for it
///
/// # Security Considerations
/// 1. Only the ledger authority may wire it
/// 2. A ledger is wired once; a second call fails with `AlreadyWired`
/// 3. The raffler PDA is derived from the ledger key, so only an engine created for this ledger fits
/// 4. The raffler must have been created by the ledger authority, so nobody else can claim the ledger's entries
/// 5. The raffler must hold no entries yet, so hat ids and minted ticket ids never collide
pub fn set_raffler(ctx: Context<SetRaffler>) -> Result<()> {
    let rafflable_key = ctx.accounts.rafflable.key();
    let raffler_key = ctx.accounts.raffler.key();
    let raffler = ctx.accounts.raffler.load()?;

    ctx.accounts.rafflable.set_raffler(
        &ctx.accounts.authority.key(),
        &rafflable_key,
        raffler_key,
        &raffler,
    )?;

    msg!("Ledger {} wired to raffler {}", rafflable_key, raffler_key);

    emit!(RafflerSet {
        rafflable: rafflable_key,
        raffler: raffler_key,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetRaffler<'info> {
    #[account(mut)]
    pub rafflable: Box<Account<'info, Rafflable>>,

    #[account(
        seeds = [
            b"raffler",
            rafflable.key().as_ref(),
        ],
        bump = raffler.load()?.bump,
        constraint = raffler.load()?.authority == rafflable.authority @ RaffleError::NotAuthorized,
    )]
    pub raffler: AccountLoader<'info, Raffler>,

    pub authority: Signer<'info>,
}
