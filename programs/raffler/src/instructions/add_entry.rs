use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{split_raffler, Raffler, Ticket, RAFFLER_CELL_SIZE, TICKET_ACCOUNT_SIZE},
};

/// Event emitted when the authority adds weight to the hat
#[event]
pub struct EntryAdded {
    pub raffler: Pubkey,
    pub ticket_id: u64,
    /// Weight added by this call
    pub weight: u64,
    /// Weight the ticket now carries in the hat
    pub ticket_weight: u64,
    pub owner: Pubkey,
}

/// Instruction to put weight for a ticket id into the hat
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `ticket_id` - Id to add; an id already in the hat gets its weight raised
/// * `weight` - Must be greater than zero
///
/// # Security Considerations
/// 1. Only the raffler authority may add entries directly
/// 2. Raffler wired to a ledger: only tickets the ledger already minted can receive weight
/// 3. Raffler without a ledger: a new id gets a Ticket owned by `beneficiary`
///
/// # Account Validations
/// * Raffler - Grown by one cell, paid by the authority
/// * Ledger - Must be the raffler's ledger address, may hold no account
/// * Ticket - PDA with seeds ["ticket", raffler_key, ticket_id], created if missing;
///   its recorded slot locates the id in the hat
pub fn add_entry(ctx: Context<AddEntry>, ticket_id: u64, weight: u64) -> Result<()> {
    let raffler_key = ctx.accounts.raffler.key();
    let authority = ctx.accounts.authority.key();

    let fresh = ctx.accounts.ticket.raffler == Pubkey::default();
    if fresh {
        // ids of a program-owned ledger are issued by minting only
        let ledger = &ctx.accounts.ledger;
        require!(
            ledger.owner != ctx.program_id || ledger.data_is_empty(),
            RaffleError::InvalidTicket
        );
    }

    let raffler_info = ctx.accounts.raffler.to_account_info();
    let mut data = raffler_info.try_borrow_mut_data()?;
    let (raffler, cells) = split_raffler(&mut data[..])?;

    let placed = (!fresh).then_some(ctx.accounts.ticket.slot);
    let placement = raffler.add(cells, &authority, ticket_id, weight, placed)?;

    if fresh {
        ctx.accounts.ticket.set_inner(Ticket {
            raffler: raffler_key,
            id: ticket_id,
            owner: ctx.accounts.beneficiary.key(),
            slot: placement.slot,
            bump: ctx.bumps.ticket,
        });
    } else {
        ctx.accounts.ticket.slot = placement.slot;
    }

    emit!(EntryAdded {
        raffler: raffler_key,
        ticket_id,
        weight,
        ticket_weight: placement.weight,
        owner: ctx.accounts.ticket.owner,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(ticket_id: u64)]
pub struct AddEntry<'info> {
    #[account(
        mut,
        realloc = raffler.to_account_info().data_len() + RAFFLER_CELL_SIZE,
        realloc::payer = authority,
        realloc::zero = true,
    )]
    pub raffler: AccountLoader<'info, Raffler>,

    /// CHECK: only compared against this program's ownership, never deserialized
    #[account(address = raffler.load()?.rafflable)]
    pub ledger: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        space = TICKET_ACCOUNT_SIZE,
        seeds = [
            b"ticket",
            raffler.key().as_ref(),
            ticket_id.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub ticket: Box<Account<'info, Ticket>>,

    /// CHECK: recorded as the owner of a newly created ticket, ignored otherwise
    pub beneficiary: UncheckedAccount<'info>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
