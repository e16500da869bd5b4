use anchor_lang::prelude::*;

use crate::{error::RaffleError, token::FungibleToken};

// 8 discriminator + 32 authority + 32 raffler + 80 token config + 1 bump
pub const ESCROW_ACCOUNT_SIZE: usize = 8 + 32 + 32 + TOKEN_CONFIG_SIZE + 1;

// 32 cost_mint + 8 cost_amount + 32 prize_mint + 8 prize_amount
pub const TOKEN_CONFIG_SIZE: usize = 32 + 8 + 32 + 8;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenConfig {
    pub cost_mint: Pubkey,
    pub cost_amount: u64,
    pub prize_mint: Pubkey,
    pub prize_amount: u64,
}

/// Custodian of entry costs and prize funds for one raffler.
///
/// Balances live in token accounts owned by this PDA; the account itself only
/// records which mints and amounts apply.
#[account]
#[derive(Debug)]
pub struct Escrow {
    pub authority: Pubkey,
    pub raffler: Pubkey,
    pub config: TokenConfig,
    pub bump: u8,
}

impl Escrow {
    pub fn new(authority: Pubkey, raffler: Pubkey, config: TokenConfig, bump: u8) -> Self {
        Self {
            authority,
            raffler,
            config,
            bump,
        }
    }

    pub fn configure_cost(&mut self, caller: &Pubkey, mint: Pubkey, amount: u64) -> Result<()> {
        require_keys_eq!(*caller, self.authority, RaffleError::NotAuthorized);
        self.config.cost_mint = mint;
        self.config.cost_amount = amount;
        Ok(())
    }

    pub fn configure_prize(&mut self, caller: &Pubkey, mint: Pubkey, amount: u64) -> Result<()> {
        require_keys_eq!(*caller, self.authority, RaffleError::NotAuthorized);
        self.config.prize_mint = mint;
        self.config.prize_amount = amount;
        Ok(())
    }

    /// Entry cost `from` would pay, refused with `InsufficientFunds` when not covered.
    pub fn quote_cost<T: FungibleToken>(&self, tokens: &T, from: &Pubkey) -> Result<u64> {
        let TokenConfig {
            cost_mint,
            cost_amount,
            ..
        } = self.config;
        if cost_amount == 0 {
            return Ok(0);
        }

        let balance = tokens.balance_of(&cost_mint, from)?;
        require!(balance >= cost_amount, RaffleError::InsufficientFunds);
        Ok(cost_amount)
    }

    /// Pulls the entry cost from `from` into the escrow at `address`.
    pub fn collect_cost<T: FungibleToken>(
        &self,
        address: &Pubkey,
        tokens: &mut T,
        from: &Pubkey,
    ) -> Result<u64> {
        let cost_amount = self.quote_cost(tokens, from)?;
        if cost_amount == 0 {
            return Ok(0);
        }

        tokens
            .transfer_from(&self.config.cost_mint, from, address, cost_amount)
            .map_err(|err| {
                msg!("Cost transfer from {} rejected: {}", from, err);
                error!(RaffleError::InsufficientFunds)
            })?;

        Ok(cost_amount)
    }

    /// Checks the escrow at `address` covers one prize once `incoming_cost`
    /// more entry cost has arrived.
    pub fn check_prize<T: FungibleToken>(&self, address: &Pubkey, tokens: &T, incoming_cost: u64) -> Result<u64> {
        let TokenConfig {
            cost_mint,
            prize_mint,
            prize_amount,
            ..
        } = self.config;
        if prize_amount == 0 {
            return Ok(0);
        }

        let mut held = tokens.balance_of(&prize_mint, address)?;
        if prize_mint == cost_mint {
            held = held.saturating_add(incoming_cost);
        }
        require!(held >= prize_amount, RaffleError::InsufficientEscrowBalance);
        Ok(prize_amount)
    }

    /// Sends the configured prize from the escrow at `address` to `to`.
    pub fn pay_prize<T: FungibleToken>(&self, address: &Pubkey, tokens: &mut T, to: &Pubkey) -> Result<u64> {
        let prize_amount = self.check_prize(address, tokens, 0)?;
        if prize_amount == 0 {
            return Ok(0);
        }

        tokens.transfer(&self.config.prize_mint, to, prize_amount)?;
        Ok(prize_amount)
    }

    /// Releases `amount` of collected entry cost to `to`.
    pub fn release_proceeds<T: FungibleToken>(
        &self,
        caller: &Pubkey,
        address: &Pubkey,
        tokens: &mut T,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        require_keys_eq!(*caller, self.authority, RaffleError::NotAuthorized);

        let held = tokens.balance_of(&self.config.cost_mint, address)?;
        require!(held >= amount, RaffleError::InsufficientEscrowBalance);

        tokens.transfer(&self.config.cost_mint, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::error_name, token::memory::MemoryToken};

    struct Fixture {
        authority: Pubkey,
        address: Pubkey,
        mint: Pubkey,
        escrow: Escrow,
        tokens: MemoryToken,
    }

    fn fixture() -> Fixture {
        let authority = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let config = TokenConfig {
            cost_mint: mint,
            cost_amount: 1_000_000,
            prize_mint: mint,
            prize_amount: 500_000_000,
        };
        Fixture {
            authority,
            address,
            mint,
            escrow: Escrow::new(authority, Pubkey::new_unique(), config, 255),
            tokens: MemoryToken::new(address),
        }
    }

    #[test]
    fn only_the_authority_configures() {
        let mut f = fixture();
        let stranger = Pubkey::new_unique();
        let other_mint = Pubkey::new_unique();

        assert_eq!(
            error_name(f.escrow.configure_cost(&stranger, other_mint, 1)),
            "NotAuthorized"
        );
        assert_eq!(
            error_name(f.escrow.configure_prize(&stranger, other_mint, 1)),
            "NotAuthorized"
        );
        assert_eq!(f.escrow.config.cost_mint, f.mint);

        f.escrow.configure_cost(&f.authority, other_mint, 50_000_000).unwrap();
        f.escrow.configure_prize(&f.authority, other_mint, 5_000_000_000).unwrap();
        assert_eq!(
            f.escrow.config,
            TokenConfig {
                cost_mint: other_mint,
                cost_amount: 50_000_000,
                prize_mint: other_mint,
                prize_amount: 5_000_000_000,
            }
        );
    }

    #[test]
    fn collects_cost_into_the_escrow() {
        let mut f = fixture();
        let buyer = Pubkey::new_unique();
        f.tokens.credit(&f.mint, &buyer, 1_500_000);

        let collected = f.escrow.collect_cost(&f.address, &mut f.tokens, &buyer).unwrap();

        assert_eq!(collected, 1_000_000);
        assert_eq!(f.tokens.balance(&f.mint, &buyer), 500_000);
        assert_eq!(f.tokens.balance(&f.mint, &f.address), 1_000_000);
    }

    #[test]
    fn short_buyer_is_refused() {
        let mut f = fixture();
        let buyer = Pubkey::new_unique();
        f.tokens.credit(&f.mint, &buyer, 999_999);

        assert_eq!(
            error_name(f.escrow.collect_cost(&f.address, &mut f.tokens, &buyer)),
            "InsufficientFunds"
        );
        assert_eq!(f.tokens.balance(&f.mint, &buyer), 999_999);
        assert_eq!(f.tokens.transfers(), 0);
    }

    #[test]
    fn free_entry_moves_nothing() {
        let mut f = fixture();
        f.escrow.configure_cost(&f.authority, f.mint, 0).unwrap();

        let collected = f
            .escrow
            .collect_cost(&f.address, &mut f.tokens, &Pubkey::new_unique())
            .unwrap();
        assert_eq!(collected, 0);
        assert_eq!(f.tokens.transfers(), 0);
    }

    #[test]
    fn pays_prize_only_when_covered() {
        let mut f = fixture();
        let winner = Pubkey::new_unique();
        f.tokens.credit(&f.mint, &f.address, 499_999_999);

        assert_eq!(
            error_name(f.escrow.pay_prize(&f.address, &mut f.tokens, &winner)),
            "InsufficientEscrowBalance"
        );

        f.tokens.credit(&f.mint, &f.address, 1);
        assert_eq!(f.escrow.pay_prize(&f.address, &mut f.tokens, &winner).unwrap(), 500_000_000);
        assert_eq!(f.tokens.balance(&f.mint, &winner), 500_000_000);
        assert_eq!(f.tokens.balance(&f.mint, &f.address), 0);
    }

    #[test]
    fn incoming_cost_counts_toward_a_shared_mint_prize() {
        let mut f = fixture();
        f.tokens.credit(&f.mint, &f.address, 499_000_000);

        assert_eq!(
            error_name(f.escrow.check_prize(&f.address, &f.tokens, 999_999)),
            "InsufficientEscrowBalance"
        );
        assert_eq!(f.escrow.check_prize(&f.address, &f.tokens, 1_000_000).unwrap(), 500_000_000);

        f.escrow
            .configure_prize(&f.authority, Pubkey::new_unique(), 500_000_000)
            .unwrap();
        assert_eq!(
            error_name(f.escrow.check_prize(&f.address, &f.tokens, 1_000_000_000)),
            "InsufficientEscrowBalance"
        );
        assert_eq!(f.tokens.transfers(), 0);
    }

    #[test]
    fn quoting_moves_nothing() {
        let mut f = fixture();
        let buyer = Pubkey::new_unique();
        f.tokens.credit(&f.mint, &buyer, 1_000_000);

        assert_eq!(f.escrow.quote_cost(&f.tokens, &buyer).unwrap(), 1_000_000);
        assert_eq!(
            error_name(f.escrow.quote_cost(&f.tokens, &Pubkey::new_unique())),
            "InsufficientFunds"
        );
        assert_eq!(f.tokens.balance(&f.mint, &buyer), 1_000_000);
        assert_eq!(f.tokens.transfers(), 0);
    }

    #[test]
    fn proceeds_go_out_on_authority_request() {
        let mut f = fixture();
        let creator = Pubkey::new_unique();
        f.tokens.credit(&f.mint, &f.address, 3_000_000);

        assert_eq!(
            error_name(f.escrow.release_proceeds(
                &creator,
                &f.address,
                &mut f.tokens,
                &creator,
                1_000_000
            )),
            "NotAuthorized"
        );
        assert_eq!(
            error_name(f.escrow.release_proceeds(
                &f.authority,
                &f.address,
                &mut f.tokens,
                &creator,
                3_000_001
            )),
            "InsufficientEscrowBalance"
        );

        f.escrow
            .release_proceeds(&f.authority, &f.address, &mut f.tokens, &creator, 2_000_000)
            .unwrap();
        assert_eq!(f.tokens.balance(&f.mint, &creator), 2_000_000);
        assert_eq!(f.tokens.balance(&f.mint, &f.address), 1_000_000);
    }
}
