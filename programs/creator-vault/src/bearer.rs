use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::VOUCHER_SUPPLY;
use crate::errors::VaultError;

/// The fields of a token account that bearer checks look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterView {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

impl RegisterView {
    pub fn of(address: Pubkey, account: &TokenAccount) -> Self {
        Self {
            address,
            owner: account.owner,
            mint: account.mint,
            amount: account.amount,
        }
    }
}

/// Proof that `holder` currently controls the single unit of `voucher_mint`.
///
/// Not `Clone`/`Copy`: one proof backs exactly one burn, and the redeem
/// path takes it by value.
#[derive(Debug, PartialEq, Eq)]
pub struct BearerVoucher {
    holder: Pubkey,
    voucher_mint: Pubkey,
    register: Pubkey,
}

impl BearerVoucher {
    /// Check that `register` is the holder's account for `voucher_mint` and
    /// holds exactly one unit. Anything else is `NotBearer`.
    pub fn prove(holder: &Pubkey, voucher_mint: &Pubkey, register: &RegisterView) -> Result<Self> {
        require_keys_eq!(register.owner, *holder, VaultError::NotBearer);
        require_keys_eq!(register.mint, *voucher_mint, VaultError::NotBearer);
        require_eq!(register.amount, VOUCHER_SUPPLY, VaultError::NotBearer);

        Ok(Self {
            holder: *holder,
            voucher_mint: *voucher_mint,
            register: register.address,
        })
    }

    pub fn holder(&self) -> &Pubkey {
        &self.holder
    }

    pub fn voucher_mint(&self) -> &Pubkey {
        &self.voucher_mint
    }

    /// Token account the unit will be burned from.
    pub fn register(&self) -> &Pubkey {
        &self.register
    }
}
