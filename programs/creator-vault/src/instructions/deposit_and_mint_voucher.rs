use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    metadata::Metadata,
    token::{self, Mint, MintTo, Token, TokenAccount, Transfer},
};

use crate::artifact::MetaplexIssuer;
use crate::constants::{CREATOR_VAULT_SEED, VOUCHER_DECIMALS, VOUCHER_RECORD_SEED, VOUCHER_SUPPLY};
use crate::errors::VaultError;
use crate::escrow::{settle_deposit, DepositLeg, DepositTerms};
use crate::events::VoucherMinted;
use crate::state::{CreatorVault, VoucherRecord};

/// Lock `amount` in the vault and mint a voucher NFT for it.
///
/// The voucher mint is a fresh keypair chosen by the caller and signing
/// this transaction. Its address is the only handle for redeeming later;
/// a failed deposit must be retried with a new keypair.
pub fn deposit_and_mint_voucher_handler(ctx: Context<DepositAndMintVoucher>, amount: u64) -> Result<()> {
    let record_bump = ctx.bumps.voucher_record;
    let accounts = ctx.accounts;

    let terms = DepositTerms {
        vault: accounts.creator_vault.key(),
        voucher_mint: accounts.voucher_mint.key(),
        depositor: accounts.depositor.key(),
        amount,
        record_bump,
    };

    msg!("Depositing {} into vault {}", amount, terms.vault);
    msg!("Voucher mint: {}", terms.voucher_mint);

    let leg = SplDepositLeg {
        token_program: accounts.token_program.to_account_info(),
        depositor: accounts.depositor.to_account_info(),
        depositor_token_account: accounts.depositor_token_account.to_account_info(),
        depositor_balance: accounts.depositor_token_account.amount,
        holding_account: accounts.holding_account.to_account_info(),
        voucher_mint: accounts.voucher_mint.to_account_info(),
        depositor_voucher_account: accounts.depositor_voucher_account.to_account_info(),
    };
    let issuer = MetaplexIssuer {
        token_metadata_program: accounts.token_metadata_program.to_account_info(),
        metadata: accounts.metadata.to_account_info(),
        master_edition: accounts.master_edition.to_account_info(),
        voucher_mint: accounts.voucher_mint.to_account_info(),
        authority: accounts.depositor.to_account_info(),
        token_program: accounts.token_program.to_account_info(),
        system_program: accounts.system_program.to_account_info(),
        rent: accounts.rent.to_account_info(),
    };

    let record = settle_deposit(&mut accounts.creator_vault, &leg, &issuer, &terms)?;
    accounts.voucher_record.set_inner(record);

    let total_liability = accounts.creator_vault.total_liability;
    msg!("Voucher minted, vault liability now {}", total_liability);

    emit!(VoucherMinted {
        vault: terms.vault,
        depositor: terms.depositor,
        voucher_mint: terms.voucher_mint,
        amount,
        total_liability,
    });

    Ok(())
}

/// Deposit-side token movements as SPL Token CPIs signed by the depositor.
struct SplDepositLeg<'info> {
    token_program: AccountInfo<'info>,
    depositor: AccountInfo<'info>,
    depositor_token_account: AccountInfo<'info>,
    depositor_balance: u64,
    holding_account: AccountInfo<'info>,
    voucher_mint: AccountInfo<'info>,
    depositor_voucher_account: AccountInfo<'info>,
}

impl<'info> DepositLeg for SplDepositLeg<'info> {
    fn depositor_balance(&self) -> u64 {
        self.depositor_balance
    }

    fn lock(&self, amount: u64) -> Result<()> {
        token::transfer(
            CpiContext::new(
                self.token_program.clone(),
                Transfer {
                    from: self.depositor_token_account.clone(),
                    to: self.holding_account.clone(),
                    authority: self.depositor.clone(),
                },
            ),
            amount,
        )
    }

    fn mint_voucher(&self) -> Result<()> {
        token::mint_to(
            CpiContext::new(
                self.token_program.clone(),
                MintTo {
                    mint: self.voucher_mint.clone(),
                    to: self.depositor_voucher_account.clone(),
                    authority: self.depositor.clone(),
                },
            ),
            VOUCHER_SUPPLY,
        )
    }
}

#[derive(Accounts)]
pub struct DepositAndMintVoucher<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

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

    /// Depositor's asset account (source of the deposit)
    #[account(
        mut,
        constraint = depositor_token_account.owner == depositor.key() @ VaultError::TokenAccountMismatch,
        constraint = depositor_token_account.mint == asset_mint.key() @ VaultError::AssetMintMismatch
    )]
    pub depositor_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub holding_account: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = depositor,
        mint::decimals = VOUCHER_DECIMALS,
        mint::authority = depositor,
        mint::freeze_authority = depositor,
    )]
    pub voucher_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = depositor,
        associated_token::mint = voucher_mint,
        associated_token::authority = depositor,
        associated_token::token_program = token_program,
    )]
    pub depositor_voucher_account: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = depositor,
        space = VoucherRecord::LEN,
        seeds = [VOUCHER_RECORD_SEED, creator_vault.key().as_ref(), voucher_mint.key().as_ref()],
        bump
    )]
    pub voucher_record: Box<Account<'info, VoucherRecord>>,

    /// CHECK: created by the token metadata program, address pinned by seeds
    #[account(
        mut,
        seeds = [b"metadata", token_metadata_program.key().as_ref(), voucher_mint.key().as_ref()],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub metadata: UncheckedAccount<'info>,

    /// CHECK: created by the token metadata program, address pinned by seeds
    #[account(
        mut,
        seeds = [b"metadata", token_metadata_program.key().as_ref(), voucher_mint.key().as_ref(), b"edition"],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub master_edition: UncheckedAccount<'info>,

    pub token_metadata_program: Program<'info, Metadata>,
    pub system_program: Program<'info, System>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}
