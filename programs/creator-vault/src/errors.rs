use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Vault is already initialized")]
    AlreadyInitialized,
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Insufficient funds in source token account")]
    InsufficientFunds,
    #[msg("No voucher record exists for this vault and voucher mint")]
    VoucherNotFound,
    #[msg("Voucher has already been redeemed")]
    AlreadyRedeemed,
    #[msg("Signer does not hold the voucher")]
    NotBearer,
    #[msg("Voucher display artifact could not be issued")]
    ExternalArtifactFailure,
    #[msg("Token mint does not match the vault asset")]
    AssetMintMismatch,
    #[msg("Holding account does not match the vault record")]
    HoldingAccountMismatch,
    #[msg("Token program does not match the vault record")]
    TokenProgramMismatch,
    #[msg("Token account is not owned by the signer")]
    TokenAccountMismatch,
    #[msg("Voucher record does not belong to this vault and mint")]
    InvalidVoucherRecord,
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
    #[msg("No valid bump exists for the derived address")]
    AddressDerivationFailed,
}
