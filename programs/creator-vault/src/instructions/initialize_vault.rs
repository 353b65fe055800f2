use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::constants::CREATOR_VAULT_SEED;
use crate::events::VaultInitialized;
use crate::state::CreatorVault;

/// Open the vault for (creator, asset mint).
///
/// The vault PDA is allocated with `init_if_needed` so that a second call
/// reaches the handler and fails on the initialization flag with
/// `AlreadyInitialized`, leaving the existing vault untouched.
pub fn initialize_vault_handler(ctx: Context<InitializeVault>) -> Result<()> {
    let authority = ctx.accounts.creator.key();
    let asset_mint = ctx.accounts.asset_mint.key();
    let token_program = ctx.accounts.token_program.key();
    let holding_account = ctx.accounts.holding_account.key();
    let vault_key = ctx.accounts.creator_vault.key();

    ctx.accounts.creator_vault.initialize(
        authority,
        asset_mint,
        token_program,
        holding_account,
        ctx.bumps.creator_vault,
    )?;

    msg!("Vault initialized: {}", vault_key);
    msg!("Authority: {}", authority);
    msg!("Asset mint: {}", asset_mint);
    msg!("Holding account: {}", holding_account);

    emit!(VaultInitialized {
        vault: vault_key,
        authority,
        asset_mint,
        holding_account,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub asset_mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = creator,
        space = CreatorVault::LEN,
        seeds = [CREATOR_VAULT_SEED, creator.key().as_ref(), asset_mint.key().as_ref()],
        bump
    )]
    pub creator_vault: Account<'info, CreatorVault>,

    /// Associated token account of the vault PDA; custodies every deposit
    #[account(
        init_if_needed,
        payer = creator,
        associated_token::mint = asset_mint,
        associated_token::authority = creator_vault,
        associated_token::token_program = token_program,
    )]
    pub holding_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_program: Program<'info, Token>,
}
