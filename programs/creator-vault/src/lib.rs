#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

declare_id!("GzfCdcY959JzTZMp741SF79eX2YkkYdCv4ZjcwNj5imB");

pub mod artifact;
pub mod bearer;
pub mod constants;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod instructions;
pub mod pda;
pub mod state;

#[cfg(test)]
mod test_support;

pub use instructions::*;
pub use state::*;

#[program]
pub mod creator_vault {
    use super::*;

    /// Create the vault for (creator, asset mint) together with its
    /// holding account. Fails if the vault already exists.
    pub fn initialize_vault(ctx: Context<InitializeVault>) -> Result<()> {
        instructions::initialize_vault_handler(ctx)
    }

    /// Lock `amount` base units in the vault and mint a voucher NFT that
    /// is redeemable for exactly that amount.
    pub fn deposit_and_mint_voucher(
        ctx: Context<DepositAndMintVoucher>,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit_and_mint_voucher_handler(ctx, amount)
    }

    /// Burn the voucher held by the signer and release the escrowed amount.
    pub fn burn_and_redeem(ctx: Context<BurnAndRedeem>) -> Result<()> {
        instructions::burn_and_redeem_handler(ctx)
    }
}
