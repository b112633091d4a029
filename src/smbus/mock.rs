//! Recording SMBus double for unit tests

use super::{Functionality, Smbus};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

/// A transaction seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Functionality,
    SetSlaveAddress { address: u8, force: bool },
    SetPec(bool),
    ReadWord(u8),
    ReadBlock(u8),
}

#[derive(Debug)]
struct MockState {
    functionality: Functionality,
    words: HashMap<u8, u16>,
    blocks: HashMap<u8, Vec<u8>>,
    failing_commands: HashSet<u8>,
    fail_functionality: bool,
    fail_bind: bool,
    fail_pec: bool,
    transactions: Vec<Transaction>,
    opened: usize,
    closed: usize,
}

/// Simulated battery on a simulated adapter.
///
/// Cloning shares the state, so a test keeps one clone for inspection while
/// the channel owns the handle returned by [`MockBus::open`].
#[derive(Debug, Clone)]
pub struct MockBus {
    inner: Arc<Mutex<MockState>>,
}

impl MockBus {
    /// An adapter with full SMBus + PEC support and no registers populated
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Mutex::new(MockState {
                functionality: Functionality::all(),
                words: HashMap::new(),
                blocks: HashMap::new(),
                failing_commands: HashSet::new(),
                fail_functionality: false,
                fail_bind: false,
                fail_pec: false,
                transactions: Vec::new(),
                opened: 0,
                closed: 0,
            })),
        }
    }

    pub fn with_functionality(self, functionality: Functionality) -> Self {
        self.inner.lock().unwrap().functionality = functionality;
        self
    }

    pub fn with_word(self, command: u8, value: u16) -> Self {
        self.inner.lock().unwrap().words.insert(command, value);
        self
    }

    pub fn with_block(self, command: u8, data: &[u8]) -> Self {
        self.inner.lock().unwrap().blocks.insert(command, data.to_vec());
        self
    }

    pub fn failing_command(self, command: u8) -> Self {
        self.inner.lock().unwrap().failing_commands.insert(command);
        self
    }

    pub fn failing_functionality(self) -> Self {
        self.inner.lock().unwrap().fail_functionality = true;
        self
    }

    pub fn failing_bind(self) -> Self {
        self.inner.lock().unwrap().fail_bind = true;
        self
    }

    pub fn failing_pec(self) -> Self {
        self.inner.lock().unwrap().fail_pec = true;
        self
    }

    /// Hand out a new open handle
    pub fn open(&self) -> io::Result<MockSmbus> {
        self.inner.lock().unwrap().opened += 1;
        Ok(MockSmbus { bus: self.clone() })
    }

    pub fn opened(&self) -> usize {
        self.inner.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().unwrap().transactions.clone()
    }

    /// Number of word/block reads issued, ignoring setup ioctls
    pub fn reads(&self) -> usize {
        self.transactions()
            .iter()
            .filter(|t| matches!(t, Transaction::ReadWord(_) | Transaction::ReadBlock(_)))
            .count()
    }

    fn record(&self, transaction: Transaction) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.inner.lock().unwrap();
        state.transactions.push(transaction);
        state
    }
}

const ENXIO: i32 = 6;
const EBUSY: i32 = 16;
const EINVAL: i32 = 22;
const ENOTTY: i32 = 25;

fn nack() -> io::Error {
    io::Error::from_raw_os_error(ENXIO)
}

/// Open handle into a [`MockBus`]; counts as closed once dropped
#[derive(Debug)]
pub struct MockSmbus {
    bus: MockBus,
}

impl Drop for MockSmbus {
    fn drop(&mut self) {
        self.bus.inner.lock().unwrap().closed += 1;
    }
}

impl Smbus for MockSmbus {
    fn functionality(&mut self) -> io::Result<Functionality> {
        let state = self.bus.record(Transaction::Functionality);
        if state.fail_functionality {
            return Err(io::Error::from_raw_os_error(ENOTTY));
        }
        Ok(state.functionality)
    }

    fn set_slave_address(&mut self, address: u8, force: bool) -> io::Result<()> {
        let state = self.bus.record(Transaction::SetSlaveAddress { address, force });
        if state.fail_bind {
            return Err(io::Error::from_raw_os_error(EBUSY));
        }
        Ok(())
    }

    fn set_pec(&mut self, enable: bool) -> io::Result<()> {
        let state = self.bus.record(Transaction::SetPec(enable));
        if state.fail_pec {
            return Err(io::Error::from_raw_os_error(EINVAL));
        }
        Ok(())
    }

    fn read_word_data(&mut self, command: u8) -> io::Result<u16> {
        let state = self.bus.record(Transaction::ReadWord(command));
        if state.failing_commands.contains(&command) {
            return Err(nack());
        }
        state.words.get(&command).copied().ok_or_else(nack)
    }

    fn read_block_data(&mut self, command: u8) -> io::Result<Vec<u8>> {
        let state = self.bus.record(Transaction::ReadBlock(command));
        if state.failing_commands.contains(&command) {
            return Err(nack());
        }
        state.blocks.get(&command).cloned().ok_or_else(nack)
    }
}
