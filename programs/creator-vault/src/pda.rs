use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;

use crate::constants::{CREATOR_VAULT_SEED, VOUCHER_RECORD_SEED};
use crate::errors::VaultError;

/// Everything address derivation depends on, passed in explicitly so the
/// derivation functions stay pure.
///
/// Account constraints in `instructions` pin the same addresses with
/// `seeds = [...]` over the same constants. On-chain this type covers what
/// the constraints cannot express: the voucher record lookup in
/// `burn_and_redeem` and the vault signer seeds. `vault` and
/// `holding_account` are for clients assembling instruction accounts, and
/// the handler tests build their fixtures with them so both derivations
/// are checked against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivationConfig {
    pub program_id: Pubkey,
    pub associated_token_program: Pubkey,
    pub vault_seed: &'static [u8],
    pub voucher_record_seed: &'static [u8],
}

/// A derived address together with its canonical bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

impl DerivationConfig {
    /// The wire seeds bound to this program's id.
    pub fn canonical() -> Self {
        Self {
            program_id: crate::ID,
            associated_token_program: AssociatedToken::id(),
            vault_seed: CREATOR_VAULT_SEED,
            voucher_record_seed: VOUCHER_RECORD_SEED,
        }
    }

    /// Vault PDA: [vault_seed, creator, asset_mint]
    pub fn vault(&self, creator: &Pubkey, asset_mint: &Pubkey) -> Result<DerivedAddress> {
        derive(
            &[self.vault_seed, creator.as_ref(), asset_mint.as_ref()],
            &self.program_id,
        )
    }

    /// The vault's holding account is the associated token account of the
    /// vault PDA. The owner is off-curve, so the address can only be
    /// computed, never signed for by a keypair.
    pub fn holding_account(
        &self,
        vault: &Pubkey,
        asset_mint: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<DerivedAddress> {
        derive(
            &[vault.as_ref(), token_program.as_ref(), asset_mint.as_ref()],
            &self.associated_token_program,
        )
    }

    /// Voucher record PDA: [voucher_record_seed, vault, voucher_mint]
    pub fn voucher_record(&self, vault: &Pubkey, voucher_mint: &Pubkey) -> Result<DerivedAddress> {
        derive(
            &[self.voucher_record_seed, vault.as_ref(), voucher_mint.as_ref()],
            &self.program_id,
        )
    }

    /// Seeds the vault PDA signs with. `bump` must be the stored canonical bump.
    pub fn vault_signer_seeds<'a>(
        &self,
        creator: &'a Pubkey,
        asset_mint: &'a Pubkey,
        bump: &'a [u8; 1],
    ) -> [&'a [u8]; 4] {
        [self.vault_seed, creator.as_ref(), asset_mint.as_ref(), bump]
    }
}

fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<DerivedAddress> {
    let (address, bump) = Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(VaultError::AddressDerivationFailed)?;
    Ok(DerivedAddress { address, bump })
}
