use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    error::RaffleError,
    state::{split_raffler, Escrow, Raffler, Round, Ticket},
    token::SplToken,
};

/// Event emitted for every completed round, whether drawn directly or by a mint
#[event]
pub struct RoundDrawn {
    pub raffler: Pubkey,
    /// Zero-based round number
    pub index: u64,
    /// Winning ticket id, removed from the hat
    pub winner: u64,
    /// Address the prize was paid to
    pub payee: Pubkey,
    pub prize: u64,
    pub seed: [u8; 32],
    pub draw_value: u64,
    /// Weight in the hat at draw time
    pub total_weight: u64,
}

pub(crate) fn emit_round(raffler: Pubkey, round: &Round, prize: u64) {
    msg!(
        "Round {} of {} won by ticket {} ({} of {})",
        round.index,
        raffler,
        round.winner,
        round.draw_value,
        round.total_weight
    );

    emit!(RoundDrawn {
        raffler,
        index: round.index,
        winner: round.winner,
        payee: round.payee,
        prize,
        seed: round.seed,
        draw_value: round.draw_value,
        total_weight: round.total_weight,
    });
}

/// Instruction to draw one winner from the hat and pay the configured prize
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `seed` - 32 bytes hashed with the round number into the draw value
///
/// # Security Considerations
/// 1. Only the raffler authority may draw directly; the ledger draws through `mint_ticket`
/// 2. The winner is removed from the hat and the round appended only after the payout succeeded
/// 3. The whole instruction fails when the winner's ticket or token account is not supplied
///
/// # Account Validations
/// * Raffler - Its arena already holds a cell for the round, so nothing grows
/// * Escrow - PDA with seeds ["escrow", raffler_key], must be the raffler's escrow
/// * Prize vault - PDA with seeds ["vault", escrow_key, prize_mint]
/// * Winner ticket - Ticket PDA of the winning id; the client simulates the draw to find it
/// * Winner prize account - Token account of the winner's owner in the prize mint
///
/// # Implementation Notes
/// - With a zero prize no token accounts are needed, only the winner ticket
/// - The seed is the authority's; mint-triggered draws use on-chain entropy instead
pub fn draw_round(ctx: Context<DrawRound>, seed: [u8; 32]) -> Result<()> {
    let raffler_key = ctx.accounts.raffler.key();
    let authority = ctx.accounts.authority.key();
    let winner_ticket = ctx.accounts.winner_ticket.as_deref().cloned();

    let mut tokens = SplToken::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.escrow.to_account_info(),
        raffler_key,
        ctx.accounts.escrow.bump,
    )
    .with_mint(ctx.accounts.prize_mint.as_ref().map(|mint| mint.to_account_info()))
    .with_vault(ctx.accounts.prize_vault.as_ref().map(|vault| vault.to_account_info()))
    .with_account(
        ctx.accounts
            .winner_prize_account
            .as_ref()
            .map(|account| account.to_account_info()),
    );

    let raffler_info = ctx.accounts.raffler.to_account_info();
    let mut data = raffler_info.try_borrow_mut_data()?;
    let (raffler, cells) = split_raffler(&mut data[..])?;

    let round = raffler.draw(
        cells,
        &authority,
        &seed,
        &ctx.accounts.escrow,
        &mut tokens,
        |winner| winner_ticket.and_then(|ticket| ticket.owner_of(&raffler_key, winner)),
    )?;

    emit_round(raffler_key, &round, ctx.accounts.escrow.config.prize_amount);

    Ok(())
}

#[derive(Accounts)]
pub struct DrawRound<'info> {
    #[account(mut)]
    pub raffler: AccountLoader<'info, Raffler>,

    #[account(
        address = raffler.load()?.escrow,
        seeds = [
            b"escrow",
            raffler.key().as_ref(),
        ],
        bump = escrow.bump,
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(address = escrow.config.prize_mint @ RaffleError::InvalidMint)]
    pub prize_mint: Option<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [
            b"vault",
            escrow.key().as_ref(),
            escrow.config.prize_mint.as_ref(),
        ],
        bump,
    )]
    pub prize_vault: Option<InterfaceAccount<'info, TokenAccount>>,

    pub winner_ticket: Option<Account<'info, Ticket>>,

    #[account(mut)]
    pub winner_prize_account: Option<InterfaceAccount<'info, TokenAccount>>,

    pub authority: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}
