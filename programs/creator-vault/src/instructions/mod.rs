pub mod initialize_vault;
pub mod deposit_and_mint_voucher;
pub mod burn_and_redeem;

pub use initialize_vault::*;
pub use deposit_and_mint_voucher::*;
pub use burn_and_redeem::*;
