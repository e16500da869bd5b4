use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{Escrow, Rafflable, Raffler, TokenConfig, ESCROW_ACCOUNT_SIZE},
};

/// Event emitted when a standalone draw engine is created
#[event]
pub struct RafflerCreated {
    pub raffler: Pubkey,
    /// The ledger allowed to add entries and trigger draws
    pub rafflable: Pubkey,
    pub escrow: Pubkey,
    pub authority: Pubkey,
}

/// Instruction to create a draw engine and its escrow for an existing or future ledger
///
/// Entry cost and prize start at zero; set them with `configure_cost` and `configure_prize`.
///
/// # Security Considerations
/// 1. When the ledger already exists, only its authority may create its engine
/// 2. Any other ledger address must sign, so nobody can occupy the engine address of a
///    ledger that is still to be created
/// 3. `set_raffler` still requires matching authorities before a ledger takes the engine
///
/// # Account Validations
/// * Ledger - Must be the `rafflable` address; an existing ledger of this program or a signer
/// * Raffler - New zero-copy PDA with seeds ["raffler", rafflable], header only
/// * Escrow - New PDA with seeds ["escrow", raffler_key]
pub fn create_raffler(ctx: Context<CreateRaffler>, rafflable: Pubkey) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let raffler_key = ctx.accounts.raffler.key();
    let escrow_key = ctx.accounts.escrow.key();

    let ledger = &ctx.accounts.ledger;
    if ledger.owner == ctx.program_id && !ledger.data_is_empty() {
        let existing = Rafflable::try_deserialize(&mut &ledger.try_borrow_data()?[..])?;
        require_keys_eq!(existing.authority, authority, RaffleError::NotAuthorized);
    } else {
        require!(ledger.is_signer, RaffleError::NotAuthorized);
    }

    *ctx.accounts.raffler.load_init()? = Raffler::new(
        authority,
        rafflable,
        escrow_key,
        ctx.bumps.raffler,
    );
    ctx.accounts.escrow.set_inner(Escrow::new(
        authority,
        raffler_key,
        TokenConfig::default(),
        ctx.bumps.escrow,
    ));

    emit!(RafflerCreated {
        raffler: raffler_key,
        rafflable,
        escrow: escrow_key,
        authority,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(rafflable: Pubkey)]
pub struct CreateRaffler<'info> {
    /// CHECK: deserialized only when this program already owns it, otherwise it must sign
    #[account(address = rafflable)]
    pub ledger: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        space = Raffler::space(0),
        seeds = [
            b"raffler",
            rafflable.as_ref(),
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

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}
