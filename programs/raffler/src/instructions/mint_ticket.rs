use anchor_lang::{prelude::*, solana_program::sysvar::slot_hashes};
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::{
    draw::environment_seed,
    error::RaffleError,
    instructions::draw_round::emit_round,
    state::{split_raffler, Escrow, Rafflable, Raffler, Ticket, RAFFLER_CELL_SIZE, TICKET_ACCOUNT_SIZE},
    token::SplToken,
};

/// Event emitted when a ticket is minted
#[event]
pub struct TicketMinted {
    pub rafflable: Pubkey,
    pub ticket_id: u64,
    pub owner: Pubkey,
    /// Entry cost collected into the escrow
    pub cost: u64,
    /// Tickets minted so far, this one included
    pub minted: u64,
}

/// Instruction to mint the next ticket of a ledger
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Supply not exhausted and timelock passed
/// 2. Ledger wired to the supplied raffler
/// 3. Buyer holds the full entry cost; nothing is collected before every check passed
/// 4. If a draw is due, the payout must succeed or the whole mint fails
/// 5. The seed of a draw comes from the newest SlotHashes entry and the clock, not from the buyer
///
/// # Account Validations
/// * Rafflable - Must be wired to the supplied raffler
/// * Raffler - PDA with seeds ["raffler", rafflable_key], grown by one cell paid by the buyer
/// * Escrow - Must be the raffler's escrow
/// * Ticket - New PDA with seeds ["ticket", raffler_key, next ticket id]
/// * Vaults - PDAs with seeds ["vault", escrow_key, mint]
/// * Cost accounts - Required when the entry cost is not zero
/// * Prize accounts - Required when this mint draws and the prize is not zero
/// * Recent slothashes - The SlotHashes sysvar
///
/// # Implementation Notes
/// - When cost and prize share a mint, pass the vault and the mint once, in the cost slots
/// - The winner may be the ticket being minted, in which case `winner_ticket` is omitted
pub fn mint_ticket(ctx: Context<MintTicket>) -> Result<()> {
    let clock = Clock::get()?;
    let rafflable_key = ctx.accounts.rafflable.key();
    let raffler_key = ctx.accounts.raffler.key();
    let buyer = ctx.accounts.buyer.key();
    let ticket_id = ctx.accounts.rafflable.next_ticket_id();
    let winner_ticket = ctx.accounts.winner_ticket.as_deref().cloned();

    let seed = if ctx.accounts.rafflable.next_mint_draws() {
        let slot_hashes = ctx.accounts.recent_slothashes.try_borrow_data()?;
        let salt = [rafflable_key.as_ref(), ticket_id.to_le_bytes().as_ref()].concat();
        environment_seed(&slot_hashes[..], &clock, &salt)?
    } else {
        [0u8; 32]
    };

    let mut tokens = SplToken::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.escrow.to_account_info(),
        raffler_key,
        ctx.accounts.escrow.bump,
    )
    .with_signer(ctx.accounts.buyer.to_account_info())
    .with_mint(ctx.accounts.cost_mint.as_ref().map(|mint| mint.to_account_info()))
    .with_mint(ctx.accounts.prize_mint.as_ref().map(|mint| mint.to_account_info()))
    .with_account(
        ctx.accounts
            .buyer_cost_account
            .as_ref()
            .map(|account| account.to_account_info()),
    )
    .with_vault(ctx.accounts.cost_vault.as_ref().map(|vault| vault.to_account_info()))
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

    let minted = ctx.accounts.rafflable.mint(
        &rafflable_key,
        &buyer,
        clock.unix_timestamp,
        &seed,
        raffler,
        cells,
        &ctx.accounts.escrow,
        &mut tokens,
        |winner| {
            if winner == ticket_id {
                Some(buyer)
            } else {
                winner_ticket.and_then(|ticket| ticket.owner_of(&raffler_key, winner))
            }
        },
    )?;

    ctx.accounts.ticket.set_inner(Ticket {
        raffler: raffler_key,
        id: minted.ticket_id,
        owner: buyer,
        slot: minted.slot,
        bump: ctx.bumps.ticket,
    });

    msg!("Ticket {} of {} minted to {}", minted.ticket_id, rafflable_key, buyer);

    emit!(TicketMinted {
        rafflable: rafflable_key,
        ticket_id: minted.ticket_id,
        owner: buyer,
        cost: minted.cost,
        minted: ctx.accounts.rafflable.minted,
    });

    if let Some(round) = &minted.round {
        emit_round(raffler_key, round, ctx.accounts.escrow.config.prize_amount);
    }

    Ok(())
}

#[derive(Accounts)]
pub struct MintTicket<'info> {
    #[account(
        mut,
        constraint = rafflable.raffler == Some(raffler.key()) @ RaffleError::EngineNotWired,
    )]
    pub rafflable: Box<Account<'info, Rafflable>>,

    #[account(
        mut,
        seeds = [
            b"raffler",
            rafflable.key().as_ref(),
        ],
        bump = raffler.load()?.bump,
        realloc = raffler.to_account_info().data_len() + RAFFLER_CELL_SIZE,
        realloc::payer = buyer,
        realloc::zero = true,
    )]
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

    #[account(
        init,
        payer = buyer,
        space = TICKET_ACCOUNT_SIZE,
        seeds = [
            b"ticket",
            raffler.key().as_ref(),
            rafflable.next_ticket_id().to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub ticket: Box<Account<'info, Ticket>>,

    #[account(address = escrow.config.cost_mint @ RaffleError::InvalidMint)]
    pub cost_mint: Option<InterfaceAccount<'info, Mint>>,

    #[account(mut)]
    pub buyer_cost_account: Option<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [
            b"vault",
            escrow.key().as_ref(),
            escrow.config.cost_mint.as_ref(),
        ],
        bump,
    )]
    pub cost_vault: Option<InterfaceAccount<'info, TokenAccount>>,

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

    /// Ticket of the winning id when this mint draws an earlier ticket
    pub winner_ticket: Option<Account<'info, Ticket>>,

    #[account(mut)]
    pub winner_prize_account: Option<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut)]
    pub buyer: Signer<'info>,

    /// CHECK: address checked against the SlotHashes sysvar, read as raw bytes
    #[account(address = slot_hashes::ID @ RaffleError::InvalidSlotHashesAccount)]
    pub recent_slothashes: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}
