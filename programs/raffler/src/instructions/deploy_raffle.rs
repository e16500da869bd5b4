use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    error::RaffleError,
    state::{
        Escrow, Factory, Rafflable, RaffleParams, Raffler, TokenConfig, ESCROW_ACCOUNT_SIZE,
        RAFFLABLE_ACCOUNT_SIZE,
    },
};

/// Event emitted when the factory deploys a raffle
#[event]
pub struct RaffleDeployed {
    /// The ticket ledger
    pub rafflable: Pubkey,
    /// The draw engine wired to the ledger
    pub raffler: Pubkey,
    /// Custodian of costs and prizes
    pub escrow: Pubkey,
    /// Authority over ledger, engine and escrow
    pub authority: Pubkey,
    /// Maximum number of tickets
    pub cap: u64,
    /// Mints between draws
    pub cadence: u64,
    pub cost_mint: Pubkey,
    pub cost_amount: u64,
    pub prize_mint: Pubkey,
    pub prize_amount: u64,
}

/// Instruction to deploy a complete raffle in one step: ticket ledger, draw engine and escrow
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `params` - Ledger parameters (name, symbol, uri, cap, cadence, timelock, creator)
/// * `cost_amount` - Entry cost per ticket in base units of the cost mint, 0 for free entry
/// * `prize_amount` - Prize per round in base units of the prize mint, 0 for no payout
///
/// # Security Considerations
/// 1. Validates the ledger parameters before anything is written
/// 2. Wires the ledger to the engine at creation, so it can never be rewired
/// 3. The cost vault is owned by the escrow PDA; only the program can move funds out
///
/// # Account Validations
/// * Factory - PDA with seed "factory", its counter seeds the ledger address
/// * Rafflable - New PDA with seeds ["rafflable", factory counter]
/// * Raffler - New zero-copy PDA with seeds ["raffler", rafflable_key], header only
/// * Escrow - New PDA with seeds ["escrow", raffler_key]
/// * Cost vault - New token account with seeds ["vault", escrow_key, cost_mint], authority = escrow
///
/// # Implementation Notes
/// - The prize vault is created on first funding, as it may coincide with the cost vault
pub fn deploy_raffle(
    ctx: Context<DeployRaffle>,
    params: RaffleParams,
    cost_amount: u64,
    prize_amount: u64,
) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let rafflable_key = ctx.accounts.rafflable.key();
    let raffler_key = ctx.accounts.raffler.key();
    let escrow_key = ctx.accounts.escrow.key();
    let config = TokenConfig {
        cost_mint: ctx.accounts.cost_mint.key(),
        cost_amount,
        prize_mint: ctx.accounts.prize_mint.key(),
        prize_amount,
    };

    let raffler = Raffler::new(authority, rafflable_key, escrow_key, ctx.bumps.raffler);
    let mut rafflable = Rafflable::new(authority, params, ctx.bumps.rafflable)?;
    rafflable.set_raffler(&authority, &rafflable_key, raffler_key, &raffler)?;
    let (cap, cadence) = (rafflable.cap, rafflable.cadence);

    ctx.accounts.rafflable.set_inner(rafflable);
    *ctx.accounts.raffler.load_init()? = raffler;
    ctx.accounts
        .escrow
        .set_inner(Escrow::new(authority, raffler_key, config, ctx.bumps.escrow));

    ctx.accounts.factory.raffle_counter = ctx
        .accounts
        .factory
        .raffle_counter
        .checked_add(1)
        .ok_or(RaffleError::Overflow)?;

    msg!(
        "Deployed raffle {} (cap {}, cadence {}) with raffler {}",
        rafflable_key,
        cap,
        cadence,
        raffler_key
    );

    emit!(RaffleDeployed {
        rafflable: rafflable_key,
        raffler: raffler_key,
        escrow: escrow_key,
        authority,
        cap,
        cadence,
        cost_mint: config.cost_mint,
        cost_amount,
        prize_mint: config.prize_mint,
        prize_amount,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct DeployRaffle<'info> {
    #[account(
        mut,
        seeds = [b"factory"],
        bump = factory.bump,
    )]
    pub factory: Account<'info, Factory>,

    #[account(
        init,
        payer = authority,
        space = RAFFLABLE_ACCOUNT_SIZE,
        seeds = [
            b"rafflable",
            factory.raffle_counter.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub rafflable: Box<Account<'info, Rafflable>>,

    #[account(
        init,
        payer = authority,
        space = Raffler::space(0),
        seeds = [
            b"raffler",
            rafflable.key().as_ref(),
        ],
        bump
    )]
    pub raffler: AccountLoader<'info, Raffler>,

    #[account(
        init,
        payer = authority,
        space = ESCROW_ACCOUNT_SIZE,
        seeds = [
            b"escrow",
            raffler.key().as_ref(),
        ],
        bump
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(mint::token_program = token_program)]
    pub cost_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program)]
    pub prize_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Receives entry costs
    #[account(
        init,
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
