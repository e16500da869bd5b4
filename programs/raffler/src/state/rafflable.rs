use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{Escrow, Raffler, RafflerCell, Round},
    token::FungibleToken,
};

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_URI_LEN: usize = 200;

const VALID_URI_PREFIXES: [&str; 2] = ["https://", "ipfs://"];

// Space calculation:
// 8 (discriminator) +
// 32 (authority) +
// 32 (creator) +
// 33 (raffler: Option<Pubkey>) +
// 4 + 32 (name) +
// 4 + 10 (symbol) +
// 4 + 200 (uri) +
// 8 (cap) +
// 8 (minted) +
// 8 (cadence) +
// 1 (draw_on_exhaust) +
// 8 (timelock) +
// 1 (bump)
pub const RAFFLABLE_ACCOUNT_SIZE: usize = 8
    + 32
    + 32
    + 33
    + (4 + MAX_NAME_LEN)
    + (4 + MAX_SYMBOL_LEN)
    + (4 + MAX_URI_LEN)
    + 8
    + 8
    + 8
    + 1
    + 8
    + 1;

/// Construction parameters of a ticket ledger.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RaffleParams {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Maximum number of tickets ever mintable
    pub cap: u64,
    /// Mints between automatic draws, 0 disables them
    pub cadence: u64,
    /// Also draw on the mint that exhausts the supply
    pub draw_on_exhaust: bool,
    /// Unix timestamp before which minting is refused, 0 for none
    pub timelock: i64,
    /// Receives withdrawn entry proceeds
    pub creator: Pubkey,
}

impl RaffleParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.cap > 0, RaffleError::InvalidSupply);
        require!(self.name.len() <= MAX_NAME_LEN, RaffleError::NameTooLong);
        require!(self.symbol.len() <= MAX_SYMBOL_LEN, RaffleError::SymbolTooLong);
        require!(self.uri.len() <= MAX_URI_LEN, RaffleError::MetadataUriTooLong);
        require!(
            self.uri.is_empty()
                || VALID_URI_PREFIXES
                    .iter()
                    .any(|prefix| self.uri.starts_with(prefix)),
            RaffleError::InvalidMetadataUri
        );
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaleStatus {
    Open,
    Exhausted,
}

/// Outcome of a successful mint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Minted {
    pub ticket_id: u64,
    pub cost: u64,
    /// Hat slot the ticket was placed in
    pub slot: u64,
    /// Round drawn because this mint hit the cadence
    pub round: Option<Round>,
}

/// The ticket ledger: immutable supply cap, sequential ids and draw cadence.
#[account]
#[derive(Debug)]
pub struct Rafflable {
    pub authority: Pubkey,
    pub creator: Pubkey,
    pub raffler: Option<Pubkey>,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub cap: u64,
    pub minted: u64,
    pub cadence: u64,
    pub draw_on_exhaust: bool,
    pub timelock: i64,
    pub bump: u8,
}

impl Rafflable {
    pub fn new(authority: Pubkey, params: RaffleParams, bump: u8) -> Result<Self> {
        params.validate()?;
        let RaffleParams {
            name,
            symbol,
            uri,
            cap,
            cadence,
            draw_on_exhaust,
            timelock,
            creator,
        } = params;

        Ok(Self {
            authority,
            creator,
            raffler: None,
            name,
            symbol,
            uri,
            cap,
            minted: 0,
            cadence,
            draw_on_exhaust,
            timelock,
            bump,
        })
    }

    pub fn status(&self) -> SaleStatus {
        if self.minted < self.cap {
            SaleStatus::Open
        } else {
            SaleStatus::Exhausted
        }
    }

    /// Id the next mint will issue; ids start at 1.
    pub fn next_ticket_id(&self) -> u64 {
        self.minted.saturating_add(1)
    }

    /// Binds the ledger at `address` to the raffler at `raffler_key`. Rebinding is refused.
    ///
    /// The raffler must be one created for this ledger by the same authority,
    /// and must not hold entries yet.
    pub fn set_raffler(
        &mut self,
        caller: &Pubkey,
        address: &Pubkey,
        raffler_key: Pubkey,
        raffler: &Raffler,
    ) -> Result<()> {
        require_keys_eq!(*caller, self.authority, RaffleError::NotAuthorized);
        require!(self.raffler.is_none(), RaffleError::AlreadyWired);
        require_keys_eq!(raffler.rafflable, *address, RaffleError::NotAuthorized);
        require_keys_eq!(raffler.authority, self.authority, RaffleError::NotAuthorized);
        require!(raffler.is_fresh(), RaffleError::EngineInUse);
        self.raffler = Some(raffler_key);
        Ok(())
    }

    fn draw_due(&self, minted: u64) -> bool {
        (self.cadence > 0 && minted % self.cadence == 0) || (self.draw_on_exhaust && minted == self.cap)
    }

    /// Whether the next mint triggers a draw.
    pub fn next_mint_draws(&self) -> bool {
        self.draw_due(self.next_ticket_id())
    }

    /// Issues the next ticket to `buyer`.
    ///
    /// The ticket enters the hat with weight 1. When the new supply hits the
    /// cadence the raffler draws with `seed`. Every balance and the winner's
    /// payee are checked before the first token moves; a failed check fails
    /// the mint and leaves ledger, raffler and balances as they were.
    #[allow(clippy::too_many_arguments)]
    pub fn mint<T, F>(
        &mut self,
        address: &Pubkey,
        buyer: &Pubkey,
        now: i64,
        seed: &[u8; 32],
        raffler: &mut Raffler,
        cells: &mut [RafflerCell],
        escrow: &Escrow,
        tokens: &mut T,
        payee_of: F,
    ) -> Result<Minted>
    where
        T: FungibleToken,
        F: FnOnce(u64) -> Option<Pubkey>,
    {
        require!(self.minted < self.cap, RaffleError::SupplyExhausted);
        require!(now >= self.timelock, RaffleError::SaleNotStarted);
        require!(self.raffler.is_some(), RaffleError::EngineNotWired);
        require_keys_eq!(raffler.rafflable, *address, RaffleError::NotAuthorized);

        let ticket_id = self.next_ticket_id();
        let minted = self.minted.checked_add(1).ok_or(RaffleError::Overflow)?;

        let cost = escrow.quote_cost(tokens, buyer)?;
        let placement = raffler.add(cells, address, ticket_id, 1, None)?;

        let pending = if self.draw_due(minted) {
            let staged = raffler
                .prepare_draw(cells, address, seed, payee_of)
                .and_then(|pending| {
                    escrow
                        .check_prize(&raffler.escrow, tokens, cost)
                        .map_err(|err| {
                            msg!("Prize for ticket {} not covered: {}", pending.round.winner, err);
                            error!(RaffleError::PayoutFailed)
                        })?;
                    Ok(pending)
                });
            match staged {
                Ok(pending) => Some(pending),
                Err(err) => {
                    raffler.undo_add(cells, placement, 1);
                    return Err(err);
                }
            }
        } else {
            None
        };

        // past the checks, transfers only fail on-chain, where the runtime reverts them
        let settled = escrow.collect_cost(&raffler.escrow, tokens, buyer).and_then(|_| match &pending {
            Some(pending) => escrow
                .pay_prize(&raffler.escrow, tokens, &pending.round.payee)
                .map_err(|err| {
                    msg!("Prize payout for ticket {} failed: {}", pending.round.winner, err);
                    error!(RaffleError::PayoutFailed)
                }),
            None => Ok(0),
        });
        if let Err(err) = settled {
            raffler.undo_add(cells, placement, 1);
            return Err(err);
        }

        let round = pending.map(|pending| raffler.commit_draw(cells, pending));
        self.minted = minted;

        Ok(Minted {
            ticket_id,
            cost,
            slot: placement.slot,
            round,
        })
    }
}
