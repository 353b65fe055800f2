//! In-memory token book and escrow driver for host tests.
//!
//! `Escrow` runs the same settlement functions the instruction handlers
//! call, against a `TokenBook` instead of SPL Token CPIs. A failed
//! instruction restores the snapshot taken before it, the way the runtime
//! discards a failed transaction.
//!
//! `AccountFixture` owns the backing storage of one account so tests can
//! hand real `AccountInfo`s to the program entrypoint and read the
//! written state back afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

use anchor_lang::error::Error;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_pack::Pack;
use solana_sysvar::program_stubs::{set_syscall_stubs, SyscallStubs};
use anchor_spl::token::spl_token::state::{
    Account as SplTokenAccount, AccountState, Mint as SplMint,
};
use anchor_spl::token::Token;

use crate::artifact::ArtifactIssuer;
use crate::bearer::{BearerVoucher, RegisterView};
use crate::errors::VaultError;
use crate::escrow::{settle_deposit, settle_redeem, DepositLeg, DepositTerms, RedeemLeg};
use crate::pda::DerivationConfig;
use crate::state::{CreatorVault, VoucherRecord};

pub fn error_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => panic!("expected an anchor error, got {:?}", e),
    }
}

/// Backing storage for one account handed to the program.
#[derive(Clone, Debug)]
pub struct AccountFixture {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
    pub is_signer: bool,
    pub is_writable: bool,
    pub executable: bool,
}

impl AccountFixture {
    pub fn signer(key: Pubkey) -> Self {
        Self {
            key,
            owner: System::id(),
            lamports: 10_000_000_000,
            data: Vec::new(),
            is_signer: true,
            is_writable: true,
            executable: false,
        }
    }

    pub fn program(key: Pubkey) -> Self {
        Self {
            key,
            owner: Pubkey::new_unique(),
            lamports: 1_000_000,
            data: Vec::new(),
            is_signer: false,
            is_writable: false,
            executable: true,
        }
    }

    pub fn readonly(key: Pubkey, owner: Pubkey, data: Vec<u8>) -> Self {
        Self {
            key,
            owner,
            lamports: 1_000_000_000,
            data,
            is_signer: false,
            is_writable: false,
            executable: false,
        }
    }

    pub fn writable(key: Pubkey, owner: Pubkey, data: Vec<u8>) -> Self {
        Self {
            is_writable: true,
            ..Self::readonly(key, owner, data)
        }
    }

    /// An address nothing was ever created at.
    pub fn unallocated(key: Pubkey) -> Self {
        Self {
            lamports: 0,
            ..Self::writable(key, System::id(), Vec::new())
        }
    }

    pub fn info(&mut self) -> AccountInfo<'_> {
        AccountInfo::new(
            &self.key,
            self.is_signer,
            self.is_writable,
            &mut self.lamports,
            &mut self.data,
            &self.owner,
            self.executable,
            0,
        )
    }
}

/// Anchor-serialized account data, discriminator included.
pub fn account_data<T: AccountSerialize>(value: &T) -> Vec<u8> {
    let mut data = Vec::new();
    value.try_serialize(&mut data).unwrap();
    data
}

pub fn mint_data(decimals: u8, supply: u64) -> Vec<u8> {
    let mut data = vec![0u8; SplMint::LEN];
    let mint = SplMint {
        decimals,
        supply,
        is_initialized: true,
        ..SplMint::default()
    };
    SplMint::pack(mint, &mut data).unwrap();
    data
}

pub fn token_account_data(mint: Pubkey, owner: Pubkey, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; SplTokenAccount::LEN];
    let account = SplTokenAccount {
        mint,
        owner,
        amount,
        state: AccountState::Initialized,
        ..SplTokenAccount::default()
    };
    SplTokenAccount::pack(account, &mut data).unwrap();
    data
}

/// Off-chain syscalls with a default `Rent`, which `init_if_needed`
/// reads before touching an account.
struct HostSyscalls;

impl SyscallStubs for HostSyscalls {
    fn sol_get_rent_sysvar(&self, var_addr: *mut u8) -> u64 {
        // SAFETY: `Rent::get` passes a pointer to its own `Rent` value.
        unsafe { *(var_addr as *mut Rent) = Rent::default() };
        0
    }
}

static HOST_SYSCALLS: Once = Once::new();

/// Run one instruction through the program entrypoint. Cross-program
/// calls are no-ops off-chain, so only this program's own state changes.
pub fn process(accounts: &mut [AccountFixture], data: &[u8]) -> std::result::Result<(), ProgramError> {
    HOST_SYSCALLS.call_once(|| {
        set_syscall_stubs(Box::new(HostSyscalls));
    });
    let infos: Vec<AccountInfo> = accounts.iter_mut().map(AccountFixture::info).collect();
    crate::entry(&crate::ID, &infos, data)
}

/// Balances keyed by (owner, mint), plus per-mint supply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBook {
    balances: HashMap<(Pubkey, Pubkey), u64>,
    supply: HashMap<Pubkey, u64>,
}

impl TokenBook {
    pub fn balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        self.balances.get(&(*owner, *mint)).copied().unwrap_or(0)
    }

    pub fn supply(&self, mint: &Pubkey) -> u64 {
        self.supply.get(mint).copied().unwrap_or(0)
    }

    fn credit(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        *self.balances.entry((*owner, *mint)).or_default() += amount;
    }

    fn debit(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Result<()> {
        let balance = self.balances.entry((*owner, *mint)).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or(VaultError::InsufficientFunds)?;
        Ok(())
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, mint: &Pubkey, amount: u64) -> Result<()> {
        self.debit(from, mint, amount)?;
        self.credit(to, mint, amount);
        Ok(())
    }

    fn mint_to(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        self.credit(owner, mint, amount);
        *self.supply.entry(*mint).or_default() += amount;
    }

    fn burn(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Result<()> {
        self.debit(owner, mint, amount)?;
        *self.supply.entry(*mint).or_default() -= amount;
        Ok(())
    }
}

/// Token movements of one instruction, booked against a `TokenBook`.
pub struct BookLeg<'a> {
    book: &'a RefCell<TokenBook>,
    asset_mint: Pubkey,
    vault: Pubkey,
    actor: Pubkey,
    voucher_mint: Pubkey,
}

impl DepositLeg for BookLeg<'_> {
    fn depositor_balance(&self) -> u64 {
        self.book.borrow().balance(&self.actor, &self.asset_mint)
    }

    fn lock(&self, amount: u64) -> Result<()> {
        self.book
            .borrow_mut()
            .transfer(&self.actor, &self.vault, &self.asset_mint, amount)
    }

    fn mint_voucher(&self) -> Result<()> {
        self.book
            .borrow_mut()
            .mint_to(&self.actor, &self.voucher_mint, 1);
        Ok(())
    }
}

impl RedeemLeg for BookLeg<'_> {
    fn burn_voucher(&self, bearer: &BearerVoucher) -> Result<()> {
        self.book
            .borrow_mut()
            .burn(bearer.holder(), bearer.voucher_mint(), 1)
    }

    fn release(&self, amount: u64) -> Result<()> {
        self.book
            .borrow_mut()
            .transfer(&self.vault, &self.actor, &self.asset_mint, amount)
    }
}

pub struct RecordingIssuer {
    issued: Rc<RefCell<Vec<Pubkey>>>,
}

impl ArtifactIssuer for RecordingIssuer {
    fn issue(&self, voucher_mint: &Pubkey) -> Result<()> {
        self.issued.borrow_mut().push(*voucher_mint);
        Ok(())
    }
}

pub struct FailingIssuer;

impl ArtifactIssuer for FailingIssuer {
    fn issue(&self, _voucher_mint: &Pubkey) -> Result<()> {
        err!(VaultError::ExternalArtifactFailure)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    book: TokenBook,
    vault: CreatorVault,
    records: HashMap<Pubkey, VoucherRecord>,
}

/// One initialized vault plus everything around it.
pub struct Escrow {
    pub config: DerivationConfig,
    pub asset_mint: Pubkey,
    pub vault_address: Pubkey,
    pub vault: CreatorVault,
    book: RefCell<TokenBook>,
    records: HashMap<Pubkey, VoucherRecord>,
    issued: Rc<RefCell<Vec<Pubkey>>>,
}

impl Escrow {
    pub fn new() -> Self {
        let config = DerivationConfig::canonical();
        let creator = Pubkey::new_unique();
        let asset_mint = Pubkey::new_unique();
        let token_program = Token::id();

        let derived = config.vault(&creator, &asset_mint).unwrap();
        let holding = config
            .holding_account(&derived.address, &asset_mint, &token_program)
            .unwrap();

        let mut vault = CreatorVault::default();
        vault
            .initialize(creator, asset_mint, token_program, holding.address, derived.bump)
            .unwrap();

        Self {
            config,
            asset_mint,
            vault_address: derived.address,
            vault,
            book: RefCell::new(TokenBook::default()),
            records: HashMap::new(),
            issued: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn funded_user(&mut self, amount: u64) -> Pubkey {
        let user = Pubkey::new_unique();
        self.book.get_mut().mint_to(&user, &self.asset_mint, amount);
        user
    }

    pub fn asset_balance(&self, owner: &Pubkey) -> u64 {
        self.book.borrow().balance(owner, &self.asset_mint)
    }

    pub fn holding_balance(&self) -> u64 {
        self.book.borrow().balance(&self.vault_address, &self.asset_mint)
    }

    pub fn voucher_balance(&self, owner: &Pubkey, voucher_mint: &Pubkey) -> u64 {
        self.book.borrow().balance(owner, voucher_mint)
    }

    pub fn voucher_supply(&self, voucher_mint: &Pubkey) -> u64 {
        self.book.borrow().supply(voucher_mint)
    }

    pub fn record(&self, voucher_mint: &Pubkey) -> Option<VoucherRecord> {
        let address = self
            .config
            .voucher_record(&self.vault_address, voucher_mint)
            .ok()?
            .address;
        self.records.get(&address).cloned()
    }

    pub fn issued(&self) -> Vec<Pubkey> {
        self.issued.borrow().clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            book: self.book.borrow().clone(),
            vault: self.vault.clone(),
            records: self.records.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        *self.book.get_mut() = snapshot.book;
        self.vault = snapshot.vault;
        self.records = snapshot.records;
    }

    pub fn transfer_voucher(&mut self, from: &Pubkey, to: &Pubkey, voucher_mint: &Pubkey) {
        self.book
            .get_mut()
            .transfer(from, to, voucher_mint, 1)
            .unwrap();
    }

    /// A one-unit mint held by `owner` that no vault knows about.
    pub fn mint_loose_voucher(&mut self, owner: &Pubkey) -> Pubkey {
        let mint = Pubkey::new_unique();
        self.book.get_mut().mint_to(owner, &mint, 1);
        mint
    }

    pub fn prove_bearer(&self, holder: &Pubkey, voucher_mint: &Pubkey) -> Result<BearerVoucher> {
        let view = RegisterView {
            address: Pubkey::new_unique(),
            owner: *holder,
            mint: *voucher_mint,
            amount: self.voucher_balance(holder, voucher_mint),
        };
        BearerVoucher::prove(holder, voucher_mint, &view)
    }

    pub fn leg_for(&self, actor: &Pubkey, voucher_mint: &Pubkey) -> BookLeg<'_> {
        BookLeg {
            book: &self.book,
            asset_mint: self.asset_mint,
            vault: self.vault_address,
            actor: *actor,
            voucher_mint: *voucher_mint,
        }
    }

    pub fn deposit(&mut self, depositor: &Pubkey, amount: u64) -> Result<Pubkey> {
        let issuer = RecordingIssuer {
            issued: Rc::clone(&self.issued),
        };
        self.deposit_with(depositor, amount, &issuer)
    }

    pub fn deposit_with<I: ArtifactIssuer>(
        &mut self,
        depositor: &Pubkey,
        amount: u64,
        issuer: &I,
    ) -> Result<Pubkey> {
        let voucher_mint = Pubkey::new_unique();
        let record_address = self.config.voucher_record(&self.vault_address, &voucher_mint)?;
        let terms = DepositTerms {
            vault: self.vault_address,
            voucher_mint,
            depositor: *depositor,
            amount,
            record_bump: record_address.bump,
        };

        let before = self.snapshot();
        let leg = BookLeg {
            book: &self.book,
            asset_mint: self.asset_mint,
            vault: self.vault_address,
            actor: *depositor,
            voucher_mint,
        };
        match settle_deposit(&mut self.vault, &leg, issuer, &terms) {
            Ok(record) => {
                self.records.insert(record_address.address, record);
                Ok(voucher_mint)
            }
            Err(e) => {
                self.restore(before);
                Err(e)
            }
        }
    }

    pub fn redeem(&mut self, redeemer: &Pubkey, voucher_mint: &Pubkey) -> Result<u64> {
        let before = self.snapshot();
        let outcome = self.try_redeem(redeemer, voucher_mint);
        if outcome.is_err() {
            self.restore(before);
        }
        outcome
    }

    fn try_redeem(&mut self, redeemer: &Pubkey, voucher_mint: &Pubkey) -> Result<u64> {
        let address = self
            .config
            .voucher_record(&self.vault_address, voucher_mint)?
            .address;
        let mut record = self
            .records
            .get(&address)
            .cloned()
            .ok_or(VaultError::VoucherNotFound)?;
        record.ensure_belongs_to(&self.vault_address, voucher_mint)?;
        record.claimable()?;

        let bearer = self.prove_bearer(redeemer, voucher_mint)?;
        let leg = BookLeg {
            book: &self.book,
            asset_mint: self.asset_mint,
            vault: self.vault_address,
            actor: *redeemer,
            voucher_mint: *voucher_mint,
        };
        let amount = settle_redeem(&mut self.vault, &mut record, bearer, &leg)?;

        self.records.insert(address, record);
        Ok(amount)
    }
}
