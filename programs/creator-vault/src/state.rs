use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Escrow ledger entry for one (creator, asset mint) pair.
///
/// PDA seeds: [b"creator_vault", authority, asset_mint]
///
/// `total_liability` is the sum of `amount_owed` over every voucher issued
/// against this vault that has not been redeemed yet. Outside of an
/// instruction it equals the holding account balance (unsolicited transfers
/// into the holding account can only push the balance above it).
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct CreatorVault {
    /// Creator that opened the vault. Reserved for administration.
    pub authority: Pubkey,
    /// The fungible asset this vault escrows
    pub asset_mint: Pubkey,
    /// Token program the asset mint lives under
    pub token_program: Pubkey,
    /// Associated token account of the vault PDA
    pub holding_account: Pubkey,
    pub total_liability: u64,
    /// Canonical bump, reused for signer seeds
    pub bump: u8,
    pub is_initialized: bool,
}

impl CreatorVault {
    pub const LEN: usize = 8 + // discriminator
        32 + // authority
        32 + // asset_mint
        32 + // token_program
        32 + // holding_account
        8 + // total_liability
        1 + // bump
        1; // is_initialized

    /// Populate a freshly allocated vault. A vault that already went
    /// through here keeps its contents and the call fails.
    pub fn initialize(
        &mut self,
        authority: Pubkey,
        asset_mint: Pubkey,
        token_program: Pubkey,
        holding_account: Pubkey,
        bump: u8,
    ) -> Result<()> {
        require!(!self.is_initialized, VaultError::AlreadyInitialized);

        self.authority = authority;
        self.asset_mint = asset_mint;
        self.token_program = token_program;
        self.holding_account = holding_account;
        self.total_liability = 0;
        self.bump = bump;
        self.is_initialized = true;
        Ok(())
    }

    /// Book a new voucher's amount. Returns the new total.
    pub fn record_deposit(&mut self, amount: u64) -> Result<u64> {
        self.total_liability = self
            .total_liability
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(self.total_liability)
    }

    /// Remove a redeemed voucher's amount. Returns the new total.
    pub fn record_redemption(&mut self, amount: u64) -> Result<u64> {
        self.total_liability = self
            .total_liability
            .checked_sub(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        Ok(self.total_liability)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoucherStatus {
    Active { amount_owed: u64 },
    Redeemed,
}

/// Authoritative claim behind one voucher mint.
///
/// PDA seeds: [b"voucher_record", vault, voucher_mint]
///
/// Records are never closed. Redemption flips `redeemed` and the record
/// stays at its address, so a repeated redemption finds it and fails with
/// `AlreadyRedeemed`.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct VoucherRecord {
    pub vault: Pubkey,
    pub voucher_mint: Pubkey,
    /// Who made the deposit. Informational: the redemption right follows
    /// the voucher token, not this key.
    pub depositor: Pubkey,
    pub amount_owed: u64,
    pub redeemed: bool,
    pub bump: u8,
}

impl VoucherRecord {
    pub const LEN: usize = 8 + // discriminator
        32 + // vault
        32 + // voucher_mint
        32 + // depositor
        8 + // amount_owed
        1 + // redeemed
        1; // bump

    pub fn open(
        vault: Pubkey,
        voucher_mint: Pubkey,
        depositor: Pubkey,
        amount_owed: u64,
        bump: u8,
    ) -> Result<Self> {
        require!(amount_owed > 0, VaultError::InvalidAmount);
        Ok(Self {
            vault,
            voucher_mint,
            depositor,
            amount_owed,
            redeemed: false,
            bump,
        })
    }

    pub fn status(&self) -> VoucherStatus {
        if self.redeemed {
            VoucherStatus::Redeemed
        } else {
            VoucherStatus::Active {
                amount_owed: self.amount_owed,
            }
        }
    }

    /// Amount still claimable, or `AlreadyRedeemed`.
    pub fn claimable(&self) -> Result<u64> {
        match self.status() {
            VoucherStatus::Active { amount_owed } => Ok(amount_owed),
            VoucherStatus::Redeemed => err!(VaultError::AlreadyRedeemed),
        }
    }

    /// Active -> Redeemed. The only transition out of Active.
    pub fn seal(&mut self) -> Result<u64> {
        let amount = self.claimable()?;
        self.redeemed = true;
        Ok(amount)
    }

    /// Decode a record from raw account state.
    ///
    /// An account that is empty or not owned by `program_id` never held a
    /// record, which is reported as `VoucherNotFound` rather than as a
    /// deserialization failure.
    pub fn from_account_data(owner: &Pubkey, program_id: &Pubkey, data: &[u8]) -> Result<Self> {
        if owner != program_id || data.iter().all(|byte| *byte == 0) {
            return err!(VaultError::VoucherNotFound);
        }
        let mut bytes = data;
        VoucherRecord::try_deserialize(&mut bytes)
            .map_err(|_| error!(VaultError::InvalidVoucherRecord))
    }

    pub fn load(info: &AccountInfo) -> Result<Self> {
        let data = info.try_borrow_data()?;
        Self::from_account_data(info.owner, &crate::ID, &data)
    }

    pub fn store(&self, info: &AccountInfo) -> Result<()> {
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        self.try_serialize(&mut writer)
    }

    /// The record must point back at the vault and mint it was looked up by.
    pub fn ensure_belongs_to(&self, vault: &Pubkey, voucher_mint: &Pubkey) -> Result<()> {
        require_keys_eq!(self.vault, *vault, VaultError::InvalidVoucherRecord);
        require_keys_eq!(self.voucher_mint, *voucher_mint, VaultError::InvalidVoucherRecord);
        Ok(())
    }
}
