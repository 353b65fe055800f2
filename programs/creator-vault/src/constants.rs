/// Seed prefix of the vault PDA: [CREATOR_VAULT_SEED, creator, asset_mint].
/// Part of the wire format, existing vaults break if it changes.
pub const CREATOR_VAULT_SEED: &[u8] = b"creator_vault";

/// Seed prefix of the voucher record PDA: [VOUCHER_RECORD_SEED, vault, voucher_mint].
pub const VOUCHER_RECORD_SEED: &[u8] = b"voucher_record";

/// A voucher is a single indivisible unit.
pub const VOUCHER_DECIMALS: u8 = 0;
pub const VOUCHER_SUPPLY: u64 = 1;

// Display certificate attached to every voucher mint.
pub const VOUCHER_NAME: &str = "Creator Vault Voucher";
pub const VOUCHER_SYMBOL: &str = "CVV";
pub const VOUCHER_URI: &str = "";

// Field limits enforced by the token metadata program.
pub const METADATA_MAX_NAME_LEN: usize = 32;
pub const METADATA_MAX_SYMBOL_LEN: usize = 10;
pub const METADATA_MAX_URI_LEN: usize = 200;
