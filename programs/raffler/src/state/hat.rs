use anchor_lang::prelude::*;

use crate::error::RaffleError;

/// A `(ticket_id, weight)` pair, as journaled by `add` and as listed by hat queries.
#[zero_copy]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HatEntry {
    pub ticket_id: u64,
    pub weight: u64,
}

/// One position of the hat.
///
/// Slots are appended in insertion order and never move. A drawn ticket keeps
/// its slot with weight 0, so cumulative order over live slots is unchanged.
#[zero_copy]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HatSlot {
    pub ticket_id: u64,
    pub weight: u64,
    /// Fenwick node: summed weight of slots `(i - lowbit(i), i]`, 1-based
    pub tree: u64,
}

/// Slot count and live weight, stored in the raffler header.
#[zero_copy]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HatState {
    pub slot_count: u64,
    pub total_weight: u64,
}

/// Indexed storage of hat slots.
pub trait Slots {
    fn slot(&self, index: usize) -> &HatSlot;

    fn slot_mut(&mut self, index: usize) -> &mut HatSlot;

    /// Number of slots the storage can hold.
    fn capacity(&self) -> usize;
}

impl Slots for [HatSlot] {
    fn slot(&self, index: usize) -> &HatSlot {
        &self[index]
    }

    fn slot_mut(&mut self, index: usize) -> &mut HatSlot {
        &mut self[index]
    }

    fn capacity(&self) -> usize {
        self.len()
    }
}

fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

/// Summed weight of slots `[0, end)`.
pub fn prefix_weight<S: Slots + ?Sized>(slots: &S, end: usize) -> u64 {
    let mut sum = 0u64;
    let mut i = end;
    while i > 0 {
        sum += slots.slot(i - 1).tree;
        i -= lowbit(i);
    }
    sum
}

/// Index of the first of `len` slots whose cumulative weight exceeds `value`.
pub fn slot_at<S: Slots + ?Sized>(slots: &S, len: usize, value: u64) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let mut position = 0usize;
    let mut remaining = value;
    let mut step = 1usize << (usize::BITS - 1 - len.leading_zeros());
    while step > 0 {
        let next = position + step;
        if next <= len && slots.slot(next - 1).tree <= remaining {
            position = next;
            remaining -= slots.slot(next - 1).tree;
        }
        step >>= 1;
    }

    (position < len).then_some(position)
}

/// Live entries of the first `len` slots, in insertion order.
pub fn live_entries<S: Slots + ?Sized>(slots: &S, len: usize) -> Vec<HatEntry> {
    (0..len)
        .map(|index| slots.slot(index))
        .filter(|slot| slot.weight > 0)
        .map(|slot| HatEntry {
            ticket_id: slot.ticket_id,
            weight: slot.weight,
        })
        .collect()
}

/// Where an add put its weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub slot: u64,
    /// Weight the ticket carries now
    pub weight: u64,
    /// A new slot was appended rather than an existing one raised
    pub appended: bool,
}

/// Weighted entries eligible for the upcoming round.
///
/// Adding, drawing and removing cost `O(log n)` slot reads. A ticket id has at
/// most one live slot; callers locate it through the slot recorded on its
/// `Ticket`, which `add` verifies before raising.
pub struct Hat<'a, S: Slots + ?Sized> {
    state: &'a mut HatState,
    slots: &'a mut S,
}

impl<'a, S: Slots + ?Sized> Hat<'a, S> {
    pub fn new(state: &'a mut HatState, slots: &'a mut S) -> Self {
        Self { state, slots }
    }

    pub fn len(&self) -> usize {
        self.state.slot_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.state.total_weight == 0
    }

    pub fn total_weight(&self) -> u64 {
        self.state.total_weight
    }

    /// Live slot of `ticket_id` at `hint`, if the hint still points at it.
    pub fn live_slot(&self, ticket_id: u64, hint: Option<u64>) -> Option<usize> {
        let index = usize::try_from(hint?).ok()?;
        if index >= self.len() {
            return None;
        }
        let slot = self.slots.slot(index);
        (slot.ticket_id == ticket_id && slot.weight > 0).then_some(index)
    }

    /// Raises the live slot of `ticket_id` found through `hint`, or appends a new one.
    pub fn add(&mut self, ticket_id: u64, weight: u64, hint: Option<u64>) -> Result<Placement> {
        require!(weight > 0, RaffleError::InvalidWeight);
        let total_weight = self
            .state
            .total_weight
            .checked_add(weight)
            .ok_or(RaffleError::Overflow)?;

        let placement = match self.live_slot(ticket_id, hint) {
            Some(index) => {
                let slot = self.slots.slot_mut(index);
                slot.weight = slot.weight.checked_add(weight).ok_or(RaffleError::Overflow)?;
                let now = slot.weight;
                self.raise(index, weight);
                Placement {
                    slot: index as u64,
                    weight: now,
                    appended: false,
                }
            }
            None => {
                let index = self.len();
                require!(index < self.slots.capacity(), RaffleError::HatFull);
                let i = index + 1;
                let below = prefix_weight(&*self.slots, index) - prefix_weight(&*self.slots, i - lowbit(i));
                *self.slots.slot_mut(index) = HatSlot {
                    ticket_id,
                    weight,
                    tree: below + weight,
                };
                self.state.slot_count += 1;
                Placement {
                    slot: index as u64,
                    weight,
                    appended: true,
                }
            }
        };

        self.state.total_weight = total_weight;
        Ok(placement)
    }

    /// Reverts the most recent `add` that returned `placement`.
    pub fn undo(&mut self, placement: Placement, weight: u64) {
        let index = placement.slot as usize;
        if placement.appended {
            *self.slots.slot_mut(index) = HatSlot::default();
            self.state.slot_count -= 1;
        } else {
            self.slots.slot_mut(index).weight -= weight;
            self.lower(index, weight);
        }
        self.state.total_weight -= weight;
    }

    /// Slot index of the first live slot whose cumulative weight exceeds `value`.
    pub fn position_at(&self, value: u64) -> Option<usize> {
        slot_at(&*self.slots, self.len(), value)
    }

    pub fn slot(&self, index: usize) -> &HatSlot {
        self.slots.slot(index)
    }

    /// Takes the slot at `index` out of the hat with its full weight.
    pub fn remove(&mut self, index: usize) -> HatEntry {
        let slot = self.slots.slot_mut(index);
        let entry = HatEntry {
            ticket_id: slot.ticket_id,
            weight: slot.weight,
        };
        slot.weight = 0;
        self.lower(index, entry.weight);
        self.state.total_weight -= entry.weight;
        entry
    }

    pub fn entries(&self) -> Vec<HatEntry> {
        live_entries(&*self.slots, self.len())
    }

    fn raise(&mut self, index: usize, weight: u64) {
        let mut i = index + 1;
        while i <= self.len() {
            self.slots.slot_mut(i - 1).tree += weight;
            i += lowbit(i);
        }
    }

    fn lower(&mut self, index: usize, weight: u64) {
        let mut i = index + 1;
        while i <= self.len() {
            self.slots.slot_mut(i - 1).tree -= weight;
            i += lowbit(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_name;

    struct Fixture {
        state: HatState,
        slots: Vec<HatSlot>,
        placed: std::collections::HashMap<u64, u64>,
    }

    impl Fixture {
        fn new(capacity: usize) -> Self {
            Self {
                state: HatState::default(),
                slots: vec![HatSlot::default(); capacity],
                placed: Default::default(),
            }
        }

        fn hat(&mut self) -> Hat<'_, [HatSlot]> {
            Hat::new(&mut self.state, &mut self.slots[..])
        }

        fn add(&mut self, ticket_id: u64, weight: u64) -> Result<u64> {
            let hint = self.placed.get(&ticket_id).copied();
            let placement = self.hat().add(ticket_id, weight, hint)?;
            self.placed.insert(ticket_id, placement.slot);
            Ok(placement.weight)
        }
    }

    fn hat(weights: &[(u64, u64)]) -> Fixture {
        let mut fixture = Fixture::new(16);
        for &(ticket_id, weight) in weights {
            fixture.add(ticket_id, weight).unwrap();
        }
        fixture
    }

    #[test]
    fn re_adding_a_ticket_raises_its_weight() {
        let mut f = hat(&[(7, 2), (9, 1)]);
        assert_eq!(f.add(7, 3).unwrap(), 5);

        let hat = f.hat();
        assert_eq!(hat.len(), 2);
        assert_eq!(hat.total_weight(), 6);
        assert_eq!(
            hat.entries(),
            vec![HatEntry { ticket_id: 7, weight: 5 }, HatEntry { ticket_id: 9, weight: 1 }]
        );
    }

    #[test]
    fn zero_weight_is_rejected() {
        let mut f = hat(&[(1, 1)]);
        assert_eq!(error_name(f.add(2, 0)), "InvalidWeight");
        assert_eq!(f.hat().len(), 1);
        assert_eq!(f.hat().total_weight(), 1);
    }

    #[test]
    fn overflowing_weight_leaves_the_hat_untouched() {
        let mut f = hat(&[(1, u64::MAX - 1)]);
        assert_eq!(error_name(f.add(2, 2)), "Overflow");
        assert_eq!(f.hat().len(), 1);
        assert_eq!(f.hat().total_weight(), u64::MAX - 1);
    }

    #[test]
    fn full_storage_refuses_new_tickets() {
        let mut f = Fixture::new(1);
        f.add(1, 1).unwrap();
        assert_eq!(error_name(f.add(2, 1)), "HatFull");
        assert_eq!(f.add(1, 1).unwrap(), 2);
    }

    #[test]
    fn position_follows_cumulative_weight_in_insertion_order() {
        let mut f = hat(&[(10, 1), (20, 3), (30, 2)]);
        let hat = f.hat();

        assert_eq!(hat.position_at(0), Some(0));
        assert_eq!(hat.position_at(1), Some(1));
        assert_eq!(hat.position_at(3), Some(1));
        assert_eq!(hat.position_at(4), Some(2));
        assert_eq!(hat.position_at(5), Some(2));
        assert_eq!(hat.position_at(6), None);
    }

    #[test]
    fn removed_slots_are_skipped() {
        let mut f = hat(&[(10, 1), (20, 3), (30, 2)]);
        let mut hat = f.hat();

        assert_eq!(hat.remove(1), HatEntry { ticket_id: 20, weight: 3 });
        assert_eq!(hat.total_weight(), 3);
        assert_eq!(hat.position_at(0), Some(0));
        assert_eq!(hat.position_at(1), Some(2));
        assert_eq!(hat.position_at(2), Some(2));
        assert_eq!(hat.position_at(3), None);
        assert_eq!(
            hat.entries(),
            vec![HatEntry { ticket_id: 10, weight: 1 }, HatEntry { ticket_id: 30, weight: 2 }]
        );
    }

    #[test]
    fn stale_hint_appends_a_fresh_slot() {
        let mut f = hat(&[(1, 1), (2, 1)]);
        f.hat().remove(0);
        assert_eq!(f.hat().live_slot(1, Some(0)), None);

        f.add(1, 4).unwrap();
        assert_eq!(
            f.hat().entries(),
            vec![HatEntry { ticket_id: 2, weight: 1 }, HatEntry { ticket_id: 1, weight: 4 }]
        );
        assert_eq!(f.placed[&1], 2);
    }

    #[test]
    fn undo_restores_the_previous_tree() {
        let mut f = hat(&[(1, 2), (2, 5), (3, 1)]);
        let slots = f.slots.clone();
        let state = f.state;

        let appended = f.hat().add(4, 7, None).unwrap();
        f.hat().undo(appended, 7);
        let raised = f.hat().add(2, 3, Some(1)).unwrap();
        f.hat().undo(raised, 3);

        assert_eq!(f.slots, slots);
        assert_eq!(f.state, state);
    }

    #[test]
    fn tree_matches_a_linear_walk() {
        let mut f = Fixture::new(64);
        for id in 0..64u64 {
            f.add(id, id % 5 + 1).unwrap();
        }
        for id in (0..64u64).step_by(3) {
            let slot = f.placed[&id] as usize;
            f.hat().remove(slot);
        }

        let entries = f.hat().entries();
        let total: u64 = entries.iter().map(|entry| entry.weight).sum();
        assert_eq!(f.hat().total_weight(), total);

        let mut cumulative = 0;
        for entry in &entries {
            for value in cumulative..cumulative + entry.weight {
                let slot = f.hat().position_at(value).unwrap();
                assert_eq!(f.hat().slot(slot).ticket_id, entry.ticket_id);
            }
            cumulative += entry.weight;
        }
        assert_eq!(f.hat().position_at(total), None);
    }
}
