use crate::state::{Factory, FACTORY_ACCOUNT_SIZE};
use anchor_lang::prelude::*;

/// Instruction to create the raffle factory
/// This should be called once after the program is deployed
///
/// # Account Validations
/// * Factory - New PDA with seed "factory"; its counter seeds every deployed ticket ledger
/// * Payer - Funds the factory account
pub fn init_factory(ctx: Context<InitFactory>) -> Result<()> {
    ctx.accounts.factory.raffle_counter = 0;
    ctx.accounts.factory.bump = ctx.bumps.factory;

    msg!("Raffle factory initialized at {}", ctx.accounts.factory.key());
    Ok(())
}

#[derive(Accounts)]
pub struct InitFactory<'info> {
    #[account(
        init,
        payer = payer,
        space = FACTORY_ACCOUNT_SIZE,
        seeds = [b"factory"],
        bump
    )]
    pub factory: Account<'info, Factory>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}
