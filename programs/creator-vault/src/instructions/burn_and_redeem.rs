use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::bearer::{BearerVoucher, RegisterView};
use crate::constants::{CREATOR_VAULT_SEED, VOUCHER_SUPPLY};
use crate::errors::VaultError;
use crate::escrow::{settle_redeem, RedeemLeg};
use crate::events::VoucherRedeemed;
use crate::pda::DerivationConfig;
use crate::state::{CreatorVault, VoucherRecord};

/// Burn the signer's voucher and pay out the amount it was minted for.
///
/// Checks run in a fixed order: the record must exist (`VoucherNotFound`),
/// belong to this vault and mint (`InvalidVoucherRecord`), still be active
/// (`AlreadyRedeemed`), and the signer must hold the single voucher unit
/// (`NotBearer`). The record is kept and flagged, never closed.
pub fn burn_and_redeem_handler(ctx: Context<BurnAndRedeem>) -> Result<()> {
    let config = DerivationConfig::canonical();
    let accounts = ctx.accounts;

    let vault_key = accounts.creator_vault.key();
    let voucher_mint = accounts.voucher_mint.key();
    let redeemer = accounts.redeemer.key();

    let expected = config.voucher_record(&vault_key, &voucher_mint)?;
    require_keys_eq!(
        accounts.voucher_record.key(),
        expected.address,
        VaultError::InvalidVoucherRecord
    );

    let record_info = accounts.voucher_record.to_account_info();
    let mut record = VoucherRecord::load(&record_info)?;
    record.ensure_belongs_to(&vault_key, &voucher_mint)?;
    record.claimable()?;

    let register = RegisterView::of(
        accounts.redeemer_voucher_account.key(),
        &accounts.redeemer_voucher_account,
    );
    let bearer = BearerVoucher::prove(&redeemer, &voucher_mint, &register)?;

    msg!("Redeeming voucher {} from vault {}", voucher_mint, vault_key);

    let leg = SplRedeemLeg {
        config,
        token_program: accounts.token_program.to_account_info(),
        redeemer: accounts.redeemer.to_account_info(),
        redeemer_token_account: accounts.redeemer_token_account.to_account_info(),
        redeemer_voucher_account: accounts.redeemer_voucher_account.to_account_info(),
        voucher_mint: accounts.voucher_mint.to_account_info(),
        holding_account: accounts.holding_account.to_account_info(),
        vault: accounts.creator_vault.to_account_info(),
        vault_authority: accounts.creator_vault.authority,
        asset_mint: accounts.creator_vault.asset_mint,
        vault_bump: accounts.creator_vault.bump,
    };

    let amount = settle_redeem(&mut accounts.creator_vault, &mut record, bearer, &leg)?;
    record.store(&record_info)?;

    let total_liability = accounts.creator_vault.total_liability;
    msg!("Released {}, vault liability now {}", amount, total_liability);

    emit!(VoucherRedeemed {
        vault: vault_key,
        redeemer,
        voucher_mint,
        amount,
        total_liability,
    });

    Ok(())
}

/// Redeem-side token movements. The burn is signed by the redeemer, the
/// payout by the vault PDA.
struct SplRedeemLeg<'info> {
    config: DerivationConfig,
    token_program: AccountInfo<'info>,
    redeemer: AccountInfo<'info>,
    redeemer_token_account: AccountInfo<'info>,
    redeemer_voucher_account: AccountInfo<'info>,
    voucher_mint: AccountInfo<'info>,
    holding_account: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    vault_authority: Pubkey,
    asset_mint: Pubkey,
    vault_bump: u8,
}

impl<'info> RedeemLeg for SplRedeemLeg<'info> {
    fn burn_voucher(&self, bearer: &BearerVoucher) -> Result<()> {
        require_keys_eq!(
            *bearer.register(),
            self.redeemer_voucher_account.key(),
            VaultError::NotBearer
        );

        token::burn(
            CpiContext::new(
                self.token_program.clone(),
                Burn {
                    mint: self.voucher_mint.clone(),
                    from: self.redeemer_voucher_account.clone(),
                    authority: self.redeemer.clone(),
                },
            ),
            VOUCHER_SUPPLY,
        )
    }

    fn release(&self, amount: u64) -> Result<()> {
        let bump = [self.vault_bump];
        let seeds = self
            .config
            .vault_signer_seeds(&self.vault_authority, &self.asset_mint, &bump);
        let signer: &[&[&[u8]]] = &[&seeds[..]];

        token::transfer(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Transfer {
                    from: self.holding_account.clone(),
                    to: self.redeemer_token_account.clone(),
                    authority: self.vault.clone(),
                },
                signer,
            ),
            amount,
        )
    }
}

#[derive(Accounts)]
pub struct BurnAndRedeem<'info> {
    #[account(mut)]
    pub redeemer: Signer<'info>,

    #[account(
        mut,
        seeds = [CREATOR_VAULT_SEED, creator_vault.authority.as_ref(), creator_vault.asset_mint.as_ref()],
        bump = creator_vault.bump,
        has_one = asset_mint @ VaultError::AssetMintMismatch,
        has_one = holding_account @ VaultError::HoldingAccountMismatch,
        has_one = token_program @ VaultError::TokenProgramMismatch,
    )]
    pub creator_vault: Box<Account<'info, CreatorVault>>,

    pub asset_mint: Box<Account<'info, Mint>>,

    #[account(mut)]
    pub holding_account: Box<Account<'info, TokenAccount>>,

    /// Redeemer's asset account (destination of the payout)
    #[account(
        mut,
        constraint = redeemer_token_account.owner == redeemer.key() @ VaultError::TokenAccountMismatch,
        constraint = redeemer_token_account.mint == asset_mint.key() @ VaultError::AssetMintMismatch
    )]
    pub redeemer_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub voucher_mint: Box<Account<'info, Mint>>,

    /// Checked in the handler: must hold exactly one voucher unit
    #[account(mut)]
    pub redeemer_voucher_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: address re-derived and contents decoded in the handler, so a
    /// record that was never created reports VoucherNotFound
    #[account(mut)]
    pub voucher_record: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}
