use anchor_lang::prelude::*;
use anchor_spl::metadata::{
    create_master_edition_v3, create_metadata_accounts_v3,
    mpl_token_metadata::types::DataV2, CreateMasterEditionV3, CreateMetadataAccountsV3,
};

use crate::constants::{
    METADATA_MAX_NAME_LEN, METADATA_MAX_SYMBOL_LEN, METADATA_MAX_URI_LEN, VOUCHER_NAME,
    VOUCHER_SYMBOL, VOUCHER_URI,
};
use crate::errors::VaultError;

/// Issues the display certificate for a freshly minted voucher.
///
/// Called exactly once per voucher inside the deposit, and never retried.
/// Problems detectable before any cross-program call are reported as
/// `ExternalArtifactFailure`. A failure inside the token metadata program
/// aborts the whole transaction with that program's own error code.
pub trait ArtifactIssuer {
    fn issue(&self, voucher_mint: &Pubkey) -> Result<()>;
}

/// Metaplex token-metadata issuer: metadata account plus a master edition
/// with max supply 0. The master edition takes over the mint and freeze
/// authority, so the voucher supply stays capped at the single minted unit.
pub struct MetaplexIssuer<'info> {
    pub token_metadata_program: AccountInfo<'info>,
    pub metadata: AccountInfo<'info>,
    pub master_edition: AccountInfo<'info>,
    pub voucher_mint: AccountInfo<'info>,
    /// Depositor: mint authority, update authority and payer
    pub authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
}

/// Both artifact accounts must still be unallocated. Existing data under
/// either address means the mint already carries a certificate.
pub fn ensure_artifact_slots_free(metadata: &AccountInfo, master_edition: &AccountInfo) -> Result<()> {
    if !metadata.data_is_empty() || !master_edition.data_is_empty() {
        msg!(
            "Artifact accounts already allocated: metadata {}, edition {}",
            metadata.key(),
            master_edition.key()
        );
        return err!(VaultError::ExternalArtifactFailure);
    }
    Ok(())
}

/// Display fields must fit the token metadata program's limits.
pub fn ensure_display_fits(data: &DataV2) -> Result<()> {
    require!(
        data.name.len() <= METADATA_MAX_NAME_LEN
            && data.symbol.len() <= METADATA_MAX_SYMBOL_LEN
            && data.uri.len() <= METADATA_MAX_URI_LEN,
        VaultError::ExternalArtifactFailure
    );
    Ok(())
}

impl<'info> MetaplexIssuer<'info> {
    fn display_data() -> DataV2 {
        DataV2 {
            name: VOUCHER_NAME.to_string(),
            symbol: VOUCHER_SYMBOL.to_string(),
            uri: VOUCHER_URI.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        }
    }
}

impl<'info> ArtifactIssuer for MetaplexIssuer<'info> {
    fn issue(&self, voucher_mint: &Pubkey) -> Result<()> {
        ensure_artifact_slots_free(&self.metadata, &self.master_edition)?;
        let data = Self::display_data();
        ensure_display_fits(&data)?;

        create_metadata_accounts_v3(
            CpiContext::new(
                self.token_metadata_program.clone(),
                CreateMetadataAccountsV3 {
                    metadata: self.metadata.clone(),
                    mint: self.voucher_mint.clone(),
                    mint_authority: self.authority.clone(),
                    payer: self.authority.clone(),
                    update_authority: self.authority.clone(),
                    system_program: self.system_program.clone(),
                    rent: self.rent.clone(),
                },
            ),
            data,
            false, // is_mutable
            true,  // update_authority_is_signer
            None,
        )?;

        create_master_edition_v3(
            CpiContext::new(
                self.token_metadata_program.clone(),
                CreateMasterEditionV3 {
                    edition: self.master_edition.clone(),
                    mint: self.voucher_mint.clone(),
                    update_authority: self.authority.clone(),
                    mint_authority: self.authority.clone(),
                    payer: self.authority.clone(),
                    metadata: self.metadata.clone(),
                    token_program: self.token_program.clone(),
                    system_program: self.system_program.clone(),
                    rent: self.rent.clone(),
                },
            ),
            Some(0),
        )?;

        msg!("Voucher artifact issued for mint: {}", voucher_mint);
        Ok(())
    }
}
