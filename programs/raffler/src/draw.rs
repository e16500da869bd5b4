use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;
use arrayref::array_ref;

use crate::error::RaffleError;

/// Maps a seed and the round number to a value in `[0, total_weight)`.
///
/// The round number is hashed together with the seed, so replaying one seed in a
/// later round lands on a different value. Each 64-bit word of the digest is
/// scaled onto the range; the rare word that would bias the result is skipped
/// and the digest rehashed once all four are used up.
pub fn draw_value(seed: &[u8; 32], round: u64, total_weight: u64) -> Result<u64> {
    require!(total_weight > 0, RaffleError::EmptyHat);

    let mut digest = hashv(&[seed.as_ref(), &round.to_le_bytes()]).to_bytes();
    loop {
        for word in 0..4 {
            let candidate = u64::from_le_bytes(*array_ref![digest, word * 8, 8]);
            if let Some(value) = scale(candidate, total_weight) {
                return Ok(value);
            }
        }
        digest = hashv(&[digest.as_ref()]).to_bytes();
    }
}

/// Multiply-shift of `x` onto `[0, range)`, `None` for inputs in the biased low band.
fn scale(x: u64, range: u64) -> Option<u64> {
    let product = u128::from(x) * u128::from(range);
    let low = product as u64;
    if low < range {
        let threshold = range.wrapping_neg() % range;
        if low < threshold {
            return None;
        }
    }
    Some((product >> 64) as u64)
}

/// Seed for draws no single caller chooses: the newest SlotHashes entry and the
/// clock, hashed with `salt`.
///
/// The current leader still sees these bytes before the transaction lands.
pub fn environment_seed(slot_hashes: &[u8], clock: &Clock, salt: &[u8]) -> Result<[u8; 32]> {
    // u64 entry count, then (slot, hash) pairs newest first
    require!(slot_hashes.len() >= 48, RaffleError::InvalidSlotHashesAccount);
    let recent_hash = array_ref![slot_hashes, 16, 32];

    Ok(hashv(&[
        recent_hash.as_ref(),
        &clock.slot.to_le_bytes(),
        &clock.unix_timestamp.to_le_bytes(),
        salt,
    ])
    .to_bytes())
}
