use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount, TransferChecked};

use crate::error::RaffleError;

/// Fungible token surface the escrow moves value through.
///
/// Holders are wallet addresses, not token accounts. `transfer` spends what the
/// escrow itself holds, `transfer_from` pulls from a holder who authorized the
/// move for the current call.
pub trait FungibleToken {
    /// Balance of `holder` in `mint`; a holder without an account holds nothing.
    fn balance_of(&self, mint: &Pubkey, holder: &Pubkey) -> Result<u64>;

    fn transfer_from(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;
}

/// [`FungibleToken`] over SPL Token or Token-2022 accounts handed to the instruction.
///
/// The escrow PDA signs outgoing transfers with seeds `["escrow", raffler, bump]`.
/// Escrow holdings are read from the registered vaults only, other holders
/// from the plain accounts.
pub struct SplToken<'info> {
    token_program: AccountInfo<'info>,
    escrow: AccountInfo<'info>,
    raffler: Pubkey,
    escrow_bump: u8,
    mints: Vec<AccountInfo<'info>>,
    vaults: Vec<AccountInfo<'info>>,
    accounts: Vec<AccountInfo<'info>>,
    signers: Vec<AccountInfo<'info>>,
}

impl<'info> SplToken<'info> {
    pub fn new(
        token_program: AccountInfo<'info>,
        escrow: AccountInfo<'info>,
        raffler: Pubkey,
        escrow_bump: u8,
    ) -> Self {
        Self {
            token_program,
            escrow,
            raffler,
            escrow_bump,
            mints: Vec::new(),
            vaults: Vec::new(),
            accounts: Vec::new(),
            signers: Vec::new(),
        }
    }

    pub fn with_mint(mut self, mint: Option<AccountInfo<'info>>) -> Self {
        self.mints.extend(mint);
        self
    }

    /// Registers an escrow vault. Callers pass only accounts at the
    /// `["vault", escrow, mint]` address.
    pub fn with_vault(mut self, vault: Option<AccountInfo<'info>>) -> Self {
        self.vaults.extend(vault);
        self
    }

    pub fn with_account(mut self, account: Option<AccountInfo<'info>>) -> Self {
        self.accounts.extend(account);
        self
    }

    pub fn with_signer(mut self, signer: AccountInfo<'info>) -> Self {
        self.signers.push(signer);
        self
    }

    fn find_mint(&self, mint: &Pubkey) -> Result<(AccountInfo<'info>, u8)> {
        let info = self
            .mints
            .iter()
            .find(|info| info.key == mint)
            .ok_or(RaffleError::InvalidMint)?;
        let decimals = Mint::try_deserialize(&mut &info.try_borrow_data()?[..])?.decimals;
        Ok((info.clone(), decimals))
    }

    fn find_account(&self, mint: &Pubkey, holder: &Pubkey) -> Result<Option<(AccountInfo<'info>, u64)>> {
        let candidates = if holder == self.escrow.key {
            &self.vaults
        } else {
            &self.accounts
        };
        for info in candidates {
            let account = TokenAccount::try_deserialize(&mut &info.try_borrow_data()?[..])?;
            if account.mint == *mint && account.owner == *holder {
                return Ok(Some((info.clone(), account.amount)));
            }
        }
        Ok(None)
    }

    fn require_account(&self, mint: &Pubkey, holder: &Pubkey) -> Result<AccountInfo<'info>> {
        match self.find_account(mint, holder)? {
            Some((info, _)) => Ok(info),
            None => {
                msg!("No {} token account supplied for {}", mint, holder);
                Err(RaffleError::TokenAccountMissing.into())
            }
        }
    }
}

impl<'info> FungibleToken for SplToken<'info> {
    fn balance_of(&self, mint: &Pubkey, holder: &Pubkey) -> Result<u64> {
        Ok(self.find_account(mint, holder)?.map_or(0, |(_, amount)| amount))
    }

    fn transfer_from(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let (mint_info, decimals) = self.find_mint(mint)?;
        let from_info = self.require_account(mint, from)?;
        let to_info = self.require_account(mint, to)?;
        let authority = self
            .signers
            .iter()
            .find(|signer| signer.key == from && signer.is_signer)
            .cloned()
            .ok_or(RaffleError::NotAuthorized)?;

        transfer_checked(
            CpiContext::new(
                self.token_program.clone(),
                TransferChecked {
                    from: from_info,
                    mint: mint_info,
                    to: to_info,
                    authority,
                },
            ),
            amount,
            decimals,
        )
    }

    fn transfer(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let (mint_info, decimals) = self.find_mint(mint)?;
        let from_info = self.require_account(mint, self.escrow.key)?;
        let to_info = self.require_account(mint, to)?;

        let bump = [self.escrow_bump];
        let signer_seeds: &[&[&[u8]]] = &[&[b"escrow".as_ref(), self.raffler.as_ref(), &bump]];

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                TransferChecked {
                    from: from_info,
                    mint: mint_info,
                    to: to_info,
                    authority: self.escrow.clone(),
                },
                signer_seeds,
            ),
            amount,
            decimals,
        )
    }
}

#[cfg(test)]
mod tests {
    use anchor_lang::solana_program::{program_option::COption, program_pack::Pack};
    use anchor_spl::token::spl_token::{
        self,
        state::{Account as SplAccount, AccountState},
    };

    use super::*;

    fn token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; SplAccount::LEN];
        let account = SplAccount {
            mint,
            owner,
            amount,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        SplAccount::pack(account, &mut data).unwrap();
        data
    }

    #[test]
    fn escrow_balance_comes_from_its_vault_only() {
        let token_program_id = spl_token::ID;
        let system_id = Pubkey::default();
        let mint = Pubkey::new_unique();
        let (escrow_key, vault_key, stray_key, buyer_key, buyer_account_key) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );

        let (mut program_lamports, mut escrow_lamports, mut vault_lamports) = (0u64, 0u64, 0u64);
        let (mut stray_lamports, mut buyer_lamports) = (0u64, 0u64);
        let (mut program_data, mut escrow_data) = (Vec::new(), Vec::new());
        let mut vault_data = token_account(mint, escrow_key, 100);
        let mut stray_data = token_account(mint, escrow_key, 900);
        let mut buyer_data = token_account(mint, buyer_key, 40);

        let token_program = AccountInfo::new(
            &token_program_id,
            false,
            false,
            &mut program_lamports,
            &mut program_data,
            &system_id,
            true,
            0,
        );
        let escrow = AccountInfo::new(
            &escrow_key,
            false,
            false,
            &mut escrow_lamports,
            &mut escrow_data,
            &crate::ID,
            false,
            0,
        );
        let vault = AccountInfo::new(
            &vault_key,
            false,
            true,
            &mut vault_lamports,
            &mut vault_data,
            &token_program_id,
            false,
            0,
        );
        let stray = AccountInfo::new(
            &stray_key,
            false,
            true,
            &mut stray_lamports,
            &mut stray_data,
            &token_program_id,
            false,
            0,
        );
        let buyer_account = AccountInfo::new(
            &buyer_account_key,
            false,
            true,
            &mut buyer_lamports,
            &mut buyer_data,
            &token_program_id,
            false,
            0,
        );

        let unvaulted = SplToken::new(token_program.clone(), escrow.clone(), Pubkey::new_unique(), 255)
            .with_account(Some(stray.clone()))
            .with_account(Some(buyer_account.clone()));
        assert_eq!(unvaulted.balance_of(&mint, &escrow_key).unwrap(), 0);
        assert_eq!(unvaulted.balance_of(&mint, &buyer_key).unwrap(), 40);

        let vaulted = SplToken::new(token_program, escrow, Pubkey::new_unique(), 255)
            .with_account(Some(stray))
            .with_vault(Some(vault))
            .with_account(Some(buyer_account));
        assert_eq!(vaulted.balance_of(&mint, &escrow_key).unwrap(), 100);
        assert_eq!(vaulted.balance_of(&mint, &buyer_key).unwrap(), 40);
        assert_eq!(vaulted.balance_of(&Pubkey::new_unique(), &escrow_key).unwrap(), 0);
    }
}
