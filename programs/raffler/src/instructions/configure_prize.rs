use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::state::Escrow;

/// Event emitted when the prize changes
#[event]
pub struct PrizeConfigured {
    pub escrow: Pubkey,
    pub mint: Pubkey,
    /// Paid to each round's winner, 0 for no payout
    pub amount: u64,
}

/// Instruction to set the token and amount paid to every round's winner
///
/// The escrow must hold at least `amount` of the prize mint when a draw runs,
/// otherwise the draw fails with `PayoutFailed`. Top it up with `fund_prize`.
pub fn configure_prize(ctx: Context<ConfigurePrize>, amount: u64) -> Result<()> {
    let mint = ctx.accounts.prize_mint.key();
    ctx.accounts
        .escrow
        .configure_prize(&ctx.accounts.authority.key(), mint, amount)?;

    emit!(PrizeConfigured {
        escrow: ctx.accounts.escrow.key(),
        mint,
        amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ConfigurePrize<'info> {
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
    pub prize_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = authority,
        seeds = [
            b"vault",
            escrow.key().as_ref(),
            prize_mint.key().as_ref(),
        ],
        bump,
        token::mint = prize_mint,
        token::authority = escrow,
        token::token_program = token_program,
    )]
    pub prize_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}
