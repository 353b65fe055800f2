use anchor_lang::prelude::*;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub holding_account: Pubkey,
}

#[event]
pub struct VoucherMinted {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub voucher_mint: Pubkey,
    pub amount: u64,
    pub total_liability: u64,
}

#[event]
pub struct VoucherRedeemed {
    pub vault: Pubkey,
    pub redeemer: Pubkey,
    pub voucher_mint: Pubkey,
    pub amount: u64,
    pub total_liability: u64,
}
