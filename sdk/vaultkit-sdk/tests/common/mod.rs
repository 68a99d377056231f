#![allow(dead_code)]

use anyhow::{anyhow, bail, ensure};
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_program,
    transaction::Transaction,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use vaultkit_sdk::{
    core::constants::LAMPORTS_PER_SOL,
    derive_state_pda, derive_vault_pda,
    interface::{VaultInstruction, VaultState},
    Cluster, KeypairSigner, NotificationSink, SignerError, SolConnection, VaultCache, VaultClient,
    VaultConfig, VaultOperation, VaultView, WalletSigner,
};

/// Rent charged for a vault state account
pub const STATE_RENT: u64 = 1_113_600;

pub const STARTING_BALANCE: u64 = 10 * LAMPORTS_PER_SOL;

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, Account>,
    statuses: HashMap<Signature, Result<(), String>>,
}

/// In-memory ledger that executes vault instructions the way the program does
pub struct MockLedger {
    pub program_id: Pubkey,
    state: Mutex<LedgerState>,
    gates: Mutex<HashMap<Pubkey, Arc<Notify>>>,
    pub account_reads: AtomicUsize,
    pub blockhash_requests: AtomicUsize,
    pub sends: AtomicUsize,
    pub confirms: AtomicUsize,
    failing_reads: AtomicUsize,
    skip_preflight: AtomicBool,
    fail_confirmations: AtomicBool,
}

impl MockLedger {
    pub fn new(program_id: Pubkey) -> Arc<Self> {
        Arc::new(Self {
            program_id,
            state: Mutex::new(LedgerState::default()),
            gates: Mutex::new(HashMap::new()),
            account_reads: AtomicUsize::new(0),
            blockhash_requests: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            confirms: AtomicUsize::new(0),
            failing_reads: AtomicUsize::new(0),
            skip_preflight: AtomicBool::new(false),
            fail_confirmations: AtomicBool::new(false),
        })
    }

    /// Credit a system account, creating it if needed
    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.state.lock();
        credit(&mut state.accounts, address, lamports);
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.state.lock().accounts.insert(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.state.lock().accounts.get(address).cloned()
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.account(address).map(|a| a.lamports).unwrap_or(0)
    }

    /// The next `count` account reads fail with a transport error
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Reads of `address` block until the returned gate is notified
    pub fn hold_reads(&self, address: Pubkey) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(address, Arc::clone(&gate));
        gate
    }

    /// Land failing transactions instead of rejecting them at submission
    pub fn set_skip_preflight(&self, skip: bool) {
        self.skip_preflight.store(skip, Ordering::SeqCst);
    }

    pub fn set_fail_confirmations(&self, fail: bool) {
        self.fail_confirmations.store(fail, Ordering::SeqCst);
    }

    pub fn network_calls(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
            + self.blockhash_requests.load(Ordering::SeqCst)
            + self.sends.load(Ordering::SeqCst)
            + self.confirms.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }

    /// Execute every instruction against a copy of the accounts and commit
    /// only if all of them succeed
    fn process(&self, tx: &Transaction) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        let mut accounts = state.accounts.clone();
        let message = &tx.message;

        for ix in &message.instructions {
            let program = message.account_keys[ix.program_id_index as usize];
            ensure!(program == self.program_id, "unexpected program {}", program);
            let keys: Vec<Pubkey> = ix
                .accounts
                .iter()
                .map(|i| message.account_keys[*i as usize])
                .collect();
            self.execute(&mut accounts, &keys, &ix.data)?;
        }

        state.accounts = accounts;
        Ok(())
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        keys: &[Pubkey],
        data: &[u8],
    ) -> anyhow::Result<()> {
        ensure!(keys.len() == 4, "expected 4 accounts, got {}", keys.len());
        let (user, state_key, vault_key) = (keys[0], keys[1], keys[2]);
        let state_pda = derive_state_pda(&self.program_id, &user)?;
        let vault_pda = derive_vault_pda(&self.program_id, &user)?;
        ensure!(state_key == state_pda.address, "ConstraintSeeds: vault_state");
        ensure!(vault_key == vault_pda.address, "ConstraintSeeds: vault");
        ensure!(keys[3] == system_program::id(), "invalid system program");

        let initialized = accounts.contains_key(&state_key);
        match VaultInstruction::unpack(data)? {
            VaultInstruction::Initialize => {
                ensure!(!initialized, "vault state {} already in use", state_key);
                debit(accounts, &user, STATE_RENT)?;
                let record = VaultState {
                    vault_bump: vault_pda.bump,
                    state_bump: state_pda.bump,
                };
                accounts.insert(
                    state_key,
                    Account {
                        lamports: STATE_RENT,
                        data: record.to_account_data(),
                        owner: self.program_id,
                        executable: false,
                        rent_epoch: 0,
                    },
                );
            },
            VaultInstruction::Deposit { amount } => {
                ensure!(initialized, "AccountNotInitialized: vault_state");
                debit(accounts, &user, amount)?;
                credit(accounts, &vault_key, amount);
            },
            VaultInstruction::Withdraw { amount } => {
                ensure!(initialized, "AccountNotInitialized: vault_state");
                debit(accounts, &vault_key, amount)?;
                credit(accounts, &user, amount);
            },
            VaultInstruction::Close => {
                let state = accounts
                    .remove(&state_key)
                    .ok_or_else(|| anyhow!("AccountNotInitialized: vault_state"))?;
                let drained = accounts
                    .remove(&vault_key)
                    .map(|a| a.lamports)
                    .unwrap_or(0);
                credit(accounts, &user, drained + state.lamports);
            },
        }
        Ok(())
    }
}

fn credit(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, lamports: u64) {
    accounts
        .entry(*address)
        .or_insert_with(|| Account {
            lamports: 0,
            data: Vec::new(),
            owner: system_program::id(),
            executable: false,
            rent_epoch: 0,
        })
        .lamports += lamports;
}

fn debit(
    accounts: &mut HashMap<Pubkey, Account>,
    address: &Pubkey,
    lamports: u64,
) -> anyhow::Result<()> {
    let Some(account) = accounts.get_mut(address) else {
        bail!("insufficient lamports 0, need {}", lamports);
    };
    ensure!(
        account.lamports >= lamports,
        "insufficient lamports {}, need {}",
        account.lamports,
        lamports
    );
    account.lamports -= lamports;
    if account.lamports == 0 {
        accounts.remove(address);
    }
    Ok(())
}

#[async_trait]
impl SolConnection for MockLedger {
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        tx.verify()?;
        let signature = *tx.signatures.first().ok_or("No signature")?;

        match self.process(tx) {
            Ok(()) => {
                self.state.lock().statuses.insert(signature, Ok(()));
                Ok(signature)
            },
            Err(err) if self.skip_preflight.load(Ordering::SeqCst) => {
                self.state
                    .lock()
                    .statuses
                    .insert(signature, Err(err.to_string()));
                Ok(signature)
            },
            Err(err) => {
                let logs = vec![
                    format!("Program {} invoke [1]", self.program_id),
                    format!("Program log: {}", err),
                    format!("Program {} failed", self.program_id),
                ];
                Err(Box::new(
                    SignerError::new(format!("Transaction simulation failed: {}", err))
                        .with_logs(logs),
                ))
            },
        }
    }

    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err("connection reset by peer".into());
        }

        let gate = self.gates.lock().get(pubkey).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.account(pubkey))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn Error + Send + Sync>> {
        self.blockhash_requests.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_unique())
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err("timed out waiting for confirmation".into());
        }
        match self.state.lock().statuses.get(signature) {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(message.clone().into()),
            None => Err(format!("signature {} not found", signature).into()),
        }
    }
}

/// Wraps a wallet and counts sign-and-send calls
pub struct CountingSigner<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> CountingSigner<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: WalletSigner> WalletSigner for CountingSigner<S> {
    fn pubkey(&self) -> Option<Pubkey> {
        self.inner.pubkey()
    }

    async fn sign_and_send(&self, tx: Transaction) -> Result<Signature, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_and_send(tx).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Pending(VaultOperation, Signature),
    Succeeded(VaultOperation, String),
    Failed(VaultOperation, String),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn transaction_pending(&self, operation: VaultOperation, signature: &Signature) {
        self.events.lock().push(Event::Pending(operation, *signature));
    }

    fn operation_succeeded(&self, operation: VaultOperation, message: &str) {
        self.events
            .lock()
            .push(Event::Succeeded(operation, message.to_string()));
    }

    fn operation_failed(&self, operation: VaultOperation, message: &str) {
        self.events
            .lock()
            .push(Event::Failed(operation, message.to_string()));
    }
}

pub type TestSigner = CountingSigner<KeypairSigner<MockLedger>>;

pub struct TestContext {
    pub config: VaultConfig,
    pub ledger: Arc<MockLedger>,
    pub owner: Pubkey,
    pub signer: Arc<TestSigner>,
    pub sink: Arc<RecordingSink>,
    pub cache: Arc<VaultCache>,
    pub client: VaultClient<MockLedger, TestSigner>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let ledger = MockLedger::new(config.program_id);

        let keypair = Keypair::new();
        let owner = keypair.pubkey();
        ledger.fund(&owner, STARTING_BALANCE);

        let signer = Arc::new(CountingSigner::new(KeypairSigner::new(
            keypair,
            Arc::clone(&ledger),
        )));
        let sink = Arc::new(RecordingSink::default());
        let cache = Arc::new(VaultCache::new());
        let client = VaultClient::with_parts(
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&signer),
            sink.clone(),
            Arc::clone(&cache),
        );

        Self {
            config,
            ledger,
            owner,
            signer,
            sink,
            cache,
            client,
        }
    }

    /// Another client on the same ledger and cache, using `signer`
    pub fn client_with<S: WalletSigner>(&self, signer: Arc<S>) -> VaultClient<MockLedger, S> {
        VaultClient::with_parts(
            self.config.clone(),
            Arc::clone(&self.ledger),
            signer,
            self.sink.clone(),
            Arc::clone(&self.cache),
        )
    }

    pub fn vault_address(&self) -> Pubkey {
        derive_vault_pda(&self.config.program_id, &self.owner)
            .unwrap()
            .address
    }

    pub fn state_address(&self) -> Pubkey {
        derive_state_pda(&self.config.program_id, &self.owner)
            .unwrap()
            .address
    }

    /// Read the owner's vault, failing the test if it is not loaded
    pub async fn view(&self) -> VaultView {
        self.client
            .read()
            .await
            .into_view()
            .expect("vault view should be loaded")
    }

    /// Sleep past the settle delay
    pub async fn settle(&self) {
        tokio::time::sleep(self.config.settle_delay() + std::time::Duration::from_millis(1)).await;
    }
}

pub fn test_config() -> VaultConfig {
    VaultConfig::new(Cluster::Localnet).with_program_id(Pubkey::new_unique())
}

pub async fn setup_test_context() -> TestContext {
    TestContext::new()
}
