//! Deposit and redemption settlement.
//!
//! The instruction handlers validate accounts and then hand over to the
//! functions here, which order the token movements and the ledger updates.
//! Token movements go through [`DepositLeg`] / [`RedeemLeg`] so the same
//! sequence runs against SPL Token CPIs on-chain and against an in-memory
//! book in tests. Every step returns early on error; the runtime discards
//! the whole transaction in that case.

use anchor_lang::prelude::*;

use crate::artifact::ArtifactIssuer;
use crate::bearer::BearerVoucher;
use crate::errors::VaultError;
use crate::state::{CreatorVault, VoucherRecord};

/// Token movements performed by a deposit.
pub trait DepositLeg {
    /// Current asset balance of the depositor's token account.
    fn depositor_balance(&self) -> u64;

    /// Move `amount` from the depositor into the vault holding account.
    fn lock(&self, amount: u64) -> Result<()>;

    /// Mint the single voucher unit to the depositor.
    fn mint_voucher(&self) -> Result<()>;
}

/// Token movements performed by a redemption.
pub trait RedeemLeg {
    /// Burn the unit `bearer` proved control of.
    fn burn_voucher(&self, bearer: &BearerVoucher) -> Result<()>;

    /// Move `amount` from the vault holding account to the redeemer.
    fn release(&self, amount: u64) -> Result<()>;
}

#[derive(Clone, Copy, Debug)]
pub struct DepositTerms {
    pub vault: Pubkey,
    pub voucher_mint: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub record_bump: u8,
}

/// Lock the deposit, mint and certify the voucher, and book the liability.
///
/// Returns the record to persist at the voucher record address.
pub fn settle_deposit<L, I>(
    vault: &mut CreatorVault,
    leg: &L,
    issuer: &I,
    terms: &DepositTerms,
) -> Result<VoucherRecord>
where
    L: DepositLeg,
    I: ArtifactIssuer,
{
    require!(terms.amount > 0, VaultError::InvalidAmount);
    require!(
        leg.depositor_balance() >= terms.amount,
        VaultError::InsufficientFunds
    );

    leg.lock(terms.amount)?;
    leg.mint_voucher()?;
    issuer.issue(&terms.voucher_mint)?;

    let record = VoucherRecord::open(
        terms.vault,
        terms.voucher_mint,
        terms.depositor,
        terms.amount,
        terms.record_bump,
    )?;
    vault.record_deposit(terms.amount)?;

    Ok(record)
}

/// Burn the voucher, pay out its amount, and close the claim.
///
/// Consumes the bearer proof. Returns the amount released.
pub fn settle_redeem<L>(
    vault: &mut CreatorVault,
    record: &mut VoucherRecord,
    bearer: BearerVoucher,
    leg: &L,
) -> Result<u64>
where
    L: RedeemLeg,
{
    let amount = record.claimable()?;
    require_keys_eq!(
        *bearer.voucher_mint(),
        record.voucher_mint,
        VaultError::NotBearer
    );

    leg.burn_voucher(&bearer)?;
    leg.release(amount)?;

    vault.record_redemption(amount)?;
    record.seal()?;

    Ok(amount)
}
