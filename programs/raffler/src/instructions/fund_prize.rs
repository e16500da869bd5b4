use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    error::RaffleError,
    state::Escrow,
    token::{FungibleToken, SplToken},
};

/// Event emitted when prize funds are deposited
#[event]
pub struct PrizeFunded {
    pub escrow: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    /// Prize vault balance after the deposit
    pub balance: u64,
}

/// Instruction to deposit prize tokens into the escrow
///
/// Anyone may fund a prize. The vault is created on first deposit.
///
/// # Account Validations
/// * Prize mint - Must be the mint configured on the escrow
/// * Funder account - Token account of the signing funder in the prize mint
pub fn fund_prize(ctx: Context<FundPrize>, amount: u64) -> Result<()> {
    let escrow_key = ctx.accounts.escrow.key();
    let funder = ctx.accounts.funder.key();
    let prize_mint = ctx.accounts.prize_mint.key();

    let mut tokens = SplToken::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.escrow.to_account_info(),
        ctx.accounts.escrow.raffler,
        ctx.accounts.escrow.bump,
    )
    .with_signer(ctx.accounts.funder.to_account_info())
    .with_mint(Some(ctx.accounts.prize_mint.to_account_info()))
    .with_account(Some(ctx.accounts.funder_account.to_account_info()))
    .with_vault(Some(ctx.accounts.prize_vault.to_account_info()));

    tokens.transfer_from(&prize_mint, &funder, &escrow_key, amount)?;

    ctx.accounts.prize_vault.reload()?;
    let balance = ctx.accounts.prize_vault.amount;

    msg!("Escrow {} funded with {} prize tokens", escrow_key, amount);

    emit!(PrizeFunded {
        escrow: escrow_key,
        funder,
        amount,
        balance,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct FundPrize<'info> {
    #[account(
        seeds = [
            b"escrow",
            escrow.raffler.as_ref(),
        ],
        bump = escrow.bump,
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(
        address = escrow.config.prize_mint @ RaffleError::InvalidMint,
        mint::token_program = token_program,
    )]
    pub prize_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = funder,
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

    #[account(
        mut,
        token::mint = prize_mint,
        token::authority = funder,
        token::token_program = token_program,
    )]
    pub funder_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub funder: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}
