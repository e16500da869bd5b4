use std::{collections::HashMap, mem::size_of};

use anchor_lang::{error::ErrorCode, prelude::*, Discriminator};

use crate::{
    draw::draw_value,
    error::RaffleError,
    state::{live_entries, slot_at, Escrow, Hat, HatEntry, HatSlot, HatState, Placement, Slots},
    token::FungibleToken,
};

/// Record of one completed draw. Never modified once written.
#[zero_copy]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Round {
    pub index: u64,
    pub winner: u64,
    pub draw_value: u64,
    /// Weight in the hat right before the winner was removed
    pub total_weight: u64,
    /// Number of journal records the drawn hat was built from
    pub hat_snapshot: u64,
    pub seed: [u8; 32],
    pub payee: Pubkey,
}

/// One record of the raffler's arena.
///
/// The arena grows by one cell per `add`. Cell `k` holds the `k`-th journal
/// record, the `k`-th hat slot and the `k`-th round; slots and rounds never
/// outnumber journal records, so all three fit.
#[zero_copy]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RafflerCell {
    pub journal: HatEntry,
    pub slot: HatSlot,
    pub round: Round,
}

impl Slots for [RafflerCell] {
    fn slot(&self, index: usize) -> &HatSlot {
        &self[index].slot
    }

    fn slot_mut(&mut self, index: usize) -> &mut HatSlot {
        &mut self[index].slot
    }

    fn capacity(&self) -> usize {
        self.len()
    }
}

pub const RAFFLER_CELL_SIZE: usize = size_of::<RafflerCell>();

// 8 discriminator + fixed header, cells follow
pub const RAFFLER_HEADER_SIZE: usize = 8 + size_of::<Raffler>();

/// Header of the draw engine. The hat, the add journal and the winner history
/// live in the cell arena after it.
#[account(zero_copy)]
#[derive(Debug)]
pub struct Raffler {
    pub authority: Pubkey,
    /// Ticket ledger allowed to add entries and trigger draws
    pub rafflable: Pubkey,
    pub escrow: Pubkey,
    pub counter: u64,
    pub journal_len: u64,
    pub hat: HatState,
    pub bump: u8,
    pub _padding: [u8; 7],
}

/// A drawn round whose payout has not happened yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRound {
    pub round: Round,
    slot: usize,
}

impl Raffler {
    /// Account size holding `cells` arena records.
    pub fn space(cells: usize) -> usize {
        RAFFLER_HEADER_SIZE + cells * RAFFLER_CELL_SIZE
    }

    pub fn new(authority: Pubkey, rafflable: Pubkey, escrow: Pubkey, bump: u8) -> Self {
        Self {
            authority,
            rafflable,
            escrow,
            counter: 0,
            journal_len: 0,
            hat: HatState::default(),
            bump,
            _padding: [0; 7],
        }
    }

    fn require_operator(&self, caller: &Pubkey) -> Result<()> {
        require!(
            *caller == self.authority || *caller == self.rafflable,
            RaffleError::NotAuthorized
        );
        Ok(())
    }

    /// Puts `weight` more of `ticket_id` into the hat.
    ///
    /// `slot` is where the ticket was last placed; a stale or missing slot puts
    /// the ticket in a new one at the end of the hat.
    pub fn add(
        &mut self,
        cells: &mut [RafflerCell],
        caller: &Pubkey,
        ticket_id: u64,
        weight: u64,
        slot: Option<u64>,
    ) -> Result<Placement> {
        self.require_operator(caller)?;
        let record = self.journal_len as usize;
        require!(record < cells.len(), RaffleError::HatFull);

        let placement = Hat::new(&mut self.hat, cells).add(ticket_id, weight, slot)?;
        cells[record].journal = HatEntry { ticket_id, weight };
        self.journal_len += 1;

        Ok(placement)
    }

    /// Reverts the last `add`, which returned `placement` for `weight`.
    pub(crate) fn undo_add(&mut self, cells: &mut [RafflerCell], placement: Placement, weight: u64) {
        Hat::new(&mut self.hat, cells).undo(placement, weight);
        self.journal_len -= 1;
        cells[self.journal_len as usize].journal = HatEntry::default();
    }

    /// Picks the next winner and its payee without changing anything.
    pub fn prepare_draw<F>(
        &self,
        cells: &[RafflerCell],
        caller: &Pubkey,
        seed: &[u8; 32],
        payee_of: F,
    ) -> Result<PendingRound>
    where
        F: FnOnce(u64) -> Option<Pubkey>,
    {
        self.require_operator(caller)?;

        let total_weight = self.hat.total_weight;
        require!(total_weight > 0, RaffleError::EmptyHat);
        self.counter.checked_add(1).ok_or(RaffleError::Overflow)?;
        require!((self.counter as usize) < cells.len(), RaffleError::HatFull);

        let value = draw_value(seed, self.counter, total_weight)?;
        let slot = slot_at(cells, self.hat.slot_count as usize, value).ok_or(RaffleError::EmptyHat)?;
        let winner = cells[slot].slot.ticket_id;

        let payee = match payee_of(winner) {
            Some(payee) => payee,
            None => {
                msg!("No owner supplied for winning ticket {}", winner);
                return err!(RaffleError::PayoutFailed);
            }
        };

        Ok(PendingRound {
            round: Round {
                index: self.counter,
                winner,
                draw_value: value,
                total_weight,
                hat_snapshot: self.journal_len,
                seed: *seed,
                payee,
            },
            slot,
        })
    }

    /// Removes the winner of `pending` and records its round.
    pub(crate) fn commit_draw(&mut self, cells: &mut [RafflerCell], pending: PendingRound) -> Round {
        Hat::new(&mut self.hat, cells).remove(pending.slot);
        cells[self.counter as usize].round = pending.round;
        self.counter += 1;
        pending.round
    }

    /// Draws one winner without replacement and pays the prize to `payee_of(winner)`.
    ///
    /// The hat, history and counter only change once the payout went through.
    pub fn draw<T, F>(
        &mut self,
        cells: &mut [RafflerCell],
        caller: &Pubkey,
        seed: &[u8; 32],
        escrow: &Escrow,
        tokens: &mut T,
        payee_of: F,
    ) -> Result<Round>
    where
        T: FungibleToken,
        F: FnOnce(u64) -> Option<Pubkey>,
    {
        let pending = self.prepare_draw(cells, caller, seed, payee_of)?;
        escrow
            .pay_prize(&self.escrow, tokens, &pending.round.payee)
            .map_err(|err| {
                msg!("Prize payout for ticket {} failed: {}", pending.round.winner, err);
                error!(RaffleError::PayoutFailed)
            })?;

        Ok(self.commit_draw(cells, pending))
    }

    /// No entry was ever added and no round drawn.
    pub fn is_fresh(&self) -> bool {
        self.journal_len == 0 && self.counter == 0
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Winning ticket ids in round order.
    pub fn winners(&self, cells: &[RafflerCell]) -> Vec<u64> {
        cells[..self.counter as usize]
            .iter()
            .map(|cell| cell.round.winner)
            .collect()
    }

    /// Entries eligible for the next round.
    pub fn hat(&self, cells: &[RafflerCell]) -> Vec<HatEntry> {
        live_entries(cells, self.hat.slot_count as usize)
    }

    pub fn round<'c>(&self, cells: &'c [RafflerCell], index: u64) -> Option<&'c Round> {
        if index >= self.counter {
            return None;
        }
        Some(&cells[index as usize].round)
    }

    /// The hat as it stood right before round `index` was drawn.
    ///
    /// `index == counter()` gives the live hat the next round will draw from.
    pub fn hat_of(&self, cells: &[RafflerCell], index: u64) -> Result<Vec<HatEntry>> {
        require!(index <= self.counter, RaffleError::RoundNotFound);
        if index == self.counter {
            return Ok(self.hat(cells));
        }

        let records = &cells[..self.journal_len as usize];
        let mut state = HatState::default();
        let mut slots = vec![HatSlot::default(); records.len()];
        let mut placed: HashMap<u64, u64> = HashMap::new();
        let mut hat = Hat::new(&mut state, &mut slots[..]);

        let mut replayed = 0usize;
        for round in cells[..=index as usize].iter().map(|cell| &cell.round) {
            let consumed = round.hat_snapshot as usize;
            for record in records[replayed..consumed].iter().map(|cell| &cell.journal) {
                let placement = hat.add(
                    record.ticket_id,
                    record.weight,
                    placed.get(&record.ticket_id).copied(),
                )?;
                placed.insert(record.ticket_id, placement.slot);
            }
            replayed = consumed;

            if round.index == index {
                break;
            }
            if let Some(slot) = hat.live_slot(round.winner, placed.get(&round.winner).copied()) {
                hat.remove(slot);
            }
        }

        Ok(hat.entries())
    }
}

/// Splits the data of a raffler account into its header and cell arena.
pub fn split_raffler(data: &mut [u8]) -> Result<(&mut Raffler, &mut [RafflerCell])> {
    require!(
        data.len() >= RAFFLER_HEADER_SIZE,
        ErrorCode::AccountDidNotDeserialize
    );
    let (header, cells) = data[8..].split_at_mut(size_of::<Raffler>());
    let header = bytemuck::try_from_bytes_mut(header).map_err(|_| ErrorCode::AccountDidNotDeserialize)?;
    let cells = bytemuck::try_cast_slice_mut(cells).map_err(|_| ErrorCode::AccountDidNotDeserialize)?;
    Ok((header, cells))
}

/// Copies a raffler account out of fetched account data, for clients.
pub fn unpack_raffler(data: &[u8]) -> Result<(Raffler, Vec<RafflerCell>)> {
    require!(
        data.len() >= RAFFLER_HEADER_SIZE && data.starts_with(Raffler::DISCRIMINATOR),
        ErrorCode::AccountDiscriminatorMismatch
    );
    let arena = &data[RAFFLER_HEADER_SIZE..];
    require!(
        arena.len() % RAFFLER_CELL_SIZE == 0,
        ErrorCode::AccountDidNotDeserialize
    );

    let header = bytemuck::pod_read_unaligned(&data[8..RAFFLER_HEADER_SIZE]);
    let cells = arena
        .chunks_exact(RAFFLER_CELL_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect();
    Ok((header, cells))
}
