use anchor_lang::prelude::*;

use crate::state::{Rafflable, RaffleParams, RAFFLABLE_ACCOUNT_SIZE};

/// Event emitted when a standalone ticket ledger is created
#[event]
pub struct RafflableCreated {
    pub rafflable: Pubkey,
    pub authority: Pubkey,
    pub cap: u64,
    pub cadence: u64,
    pub timelock: i64,
}

/// Instruction to create a ticket ledger without an engine
///
/// The ledger refuses mints until `set_raffler` binds it to a raffler.
///
/// # Account Validations
/// * Rafflable - New PDA with seeds ["rafflable", authority_key, nonce]
/// * Authority - Becomes the only key allowed to wire the ledger
pub fn create_rafflable(
    ctx: Context<CreateRafflable>,
    _nonce: u64,
    params: RaffleParams,
) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let rafflable = Rafflable::new(authority, params, ctx.bumps.rafflable)?;

    emit!(RafflableCreated {
        rafflable: ctx.accounts.rafflable.key(),
        authority,
        cap: rafflable.cap,
        cadence: rafflable.cadence,
        timelock: rafflable.timelock,
    });

    ctx.accounts.rafflable.set_inner(rafflable);
    Ok(())
}

#[derive(Accounts)]
#[instruction(nonce: u64)]
pub struct CreateRafflable<'info> {
    #[account(
        init,
        payer = authority,
        space = RAFFLABLE_ACCOUNT_SIZE,
        seeds = [
            b"rafflable",
            authority.key().as_ref(),
            nonce.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub rafflable: Box<Account<'info, Rafflable>>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
