use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    error::RaffleError,
    state::{Escrow, Rafflable},
    token::SplToken,
};

/// Event emitted when collected entry costs are withdrawn
#[event]
pub struct ProceedsWithdrawn {
    pub rafflable: Pubkey,
    pub escrow: Pubkey,
    /// Receiver of the proceeds
    pub creator: Pubkey,
    pub amount: u64,
}

/// Instruction to move collected entry costs from the cost vault to the raffle creator
///
/// # Security Considerations
/// 1. Verifies the signer is the escrow authority
/// 2. Proceeds only ever go to a token account of the creator recorded on the ledger
/// 3. Fails with `InsufficientEscrowBalance` when the vault holds less than `amount`
///
/// # Implementation Notes
/// - When cost and prize share a mint, withdrawing eats into the prize reserve
pub fn withdraw_proceeds(ctx: Context<WithdrawProceeds>, amount: u64) -> Result<()> {
    let escrow_key = ctx.accounts.escrow.key();
    let creator = ctx.accounts.rafflable.creator;

    let mut tokens = SplToken::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.escrow.to_account_info(),
        ctx.accounts.escrow.raffler,
        ctx.accounts.escrow.bump,
    )
    .with_mint(Some(ctx.accounts.cost_mint.to_account_info()))
    .with_vault(Some(ctx.accounts.cost_vault.to_account_info()))
    .with_account(Some(ctx.accounts.creator_account.to_account_info()));

    ctx.accounts.escrow.release_proceeds(
        &ctx.accounts.authority.key(),
        &escrow_key,
        &mut tokens,
        &creator,
        amount,
    )?;

    msg!("Withdrew {} from escrow {} to {}", amount, escrow_key, creator);

    emit!(ProceedsWithdrawn {
        rafflable: ctx.accounts.rafflable.key(),
        escrow: escrow_key,
        creator,
        amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct WithdrawProceeds<'info> {
    #[account(
        constraint = rafflable.raffler == Some(escrow.raffler) @ RaffleError::EngineNotWired,
    )]
    pub rafflable: Box<Account<'info, Rafflable>>,

    #[account(
        seeds = [
            b"escrow",
            escrow.raffler.as_ref(),
        ],
        bump = escrow.bump,
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(address = escrow.config.cost_mint @ RaffleError::InvalidMint)]
    pub cost_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [
            b"vault",
            escrow.key().as_ref(),
            cost_mint.key().as_ref(),
        ],
        bump,
    )]
    pub cost_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = cost_mint,
        token::authority = rafflable.creator,
        token::token_program = token_program,
    )]
    pub creator_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}
