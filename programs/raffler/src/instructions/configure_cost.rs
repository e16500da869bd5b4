use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::state::Escrow;

/// Event emitted when the entry cost changes
#[event]
pub struct CostConfigured {
    pub escrow: Pubkey,
    pub mint: Pubkey,
    /// Cost per ticket in base units, 0 for free entry
    pub amount: u64,
}

/// Instruction to set the token and amount every mint collects
///
/// # Account Validations
/// * Escrow - PDA with seeds ["escrow", raffler_key]; its authority must sign
/// * Cost vault - Token account with seeds ["vault", escrow_key, cost_mint], created if missing
pub fn configure_cost(ctx: Context<ConfigureCost>, amount: u64) -> Result<()> {
    let mint = ctx.accounts.cost_mint.key();
    ctx.accounts
        .escrow
        .configure_cost(&ctx.accounts.authority.key(), mint, amount)?;

    emit!(CostConfigured {
        escrow: ctx.accounts.escrow.key(),
        mint,
        amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ConfigureCost<'info> {
    #[account(
        mut,
        seeds = [
            b"escrow",
            escrow.raffler.as_ref(),
        ],
        bump = escrow.bump,
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(mint::token_program = token_program)]
    pub cost_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = authority,
        seeds = [
            b"vault",
            escrow.key().as_ref(),
            cost_mint.key().as_ref(),
        ],
        bump,
        token::mint = cost_mint,
        token::authority = escrow,
        token::token_program = token_program,
    )]
    pub cost_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}
