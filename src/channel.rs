use crate::error::{Error, Result};
use crate::smbus::{Functionality, Smbus, BLOCK_MAX};
use log::{debug, error, info, warn};
use std::io;
use std::path::Path;

#[cfg(target_os = "linux")]
use crate::smbus::LinuxSmbus;

/// Lowest usable 7-bit address; 0x00-0x02 are reserved by SMBus
pub const ADDRESS_MIN: u8 = 0x03;
/// Highest usable 7-bit address; 0x78-0x7f are reserved by SMBus
pub const ADDRESS_MAX: u8 = 0x77;

/// Capabilities the SBS reads cannot work without, and how they are reported
const REQUIRED: [(Functionality, &str); 3] = [
    (Functionality::SMBUS_READ_BYTE, "SMBus receive byte"),
    (Functionality::SMBUS_READ_BYTE_DATA, "SMBus read byte"),
    (Functionality::SMBUS_READ_WORD_DATA, "SMBus read word"),
];

/// An open, validated SMBus handle bound to one target address with PEC enabled.
///
/// A `Channel` only exists fully set up. It owns its handle exclusively and
/// closes it exactly once when dropped, including when setup fails half way.
/// All transactions take `&mut self`; share a channel between threads by
/// putting it behind a mutex.
#[derive(Debug)]
pub struct Channel<B> {
    bus: B,
    address: u8,
}

#[cfg(target_os = "linux")]
impl Channel<LinuxSmbus> {
    /// Open the i2c-dev node at `path` and bind it to `address`
    pub fn open(path: impl AsRef<Path>, address: u8) -> Result<Self> {
        Self::connect(path.as_ref(), address, |p| LinuxSmbus::open(p))
    }
}

impl<B: Smbus> Channel<B> {
    /// Set up a channel over a bus handle produced by `open`.
    ///
    /// The address is checked before `open` is called, so an invalid
    /// address never touches the device.
    pub fn connect<F>(path: &Path, address: u8, open: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> io::Result<B>,
    {
        if !(ADDRESS_MIN..=ADDRESS_MAX).contains(&address) {
            error!("Device address {address:#04x} out of range (0x03-0x77)");
            return Err(Error::InvalidAddress(address));
        }

        let mut bus = open(path).map_err(|source| {
            error!("Could not open file {}: {source}", path.display());
            if source.kind() == io::ErrorKind::PermissionDenied {
                warn!("Access problem, maybe run as root");
            }
            Error::DeviceOpenFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        check_capabilities(&mut bus)?;

        bus.set_slave_address(address, false).map_err(|source| {
            error!("Could not set address to {address:#04x}: {source}");
            Error::AddressBindFailed { address, source }
        })?;

        if let Err(source) = bus.set_pec(true) {
            error!("Could not set PEC: {source}");
            // close before reporting
            drop(bus);
            return Err(Error::PecEnableFailed(source));
        }

        info!("Opened smart battery at {address:#04x} on {}", path.display());
        Ok(Self { bus, address })
    }

    /// Target address this channel is bound to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// One SMBus word-data read. Failures are reported as-is, never retried.
    pub fn read_word(&mut self, command: u8) -> Result<u16> {
        match self.bus.read_word_data(command) {
            Ok(word) => {
                debug!("RX word {command:#04x}: {word:#06x}");
                Ok(word)
            }
            Err(source) => {
                warn!("Read of {command:#04x} failed: {source}");
                Err(Error::TransactionFailed { command, source })
            }
        }
    }

    /// One SMBus block-data read returning the device-reported bytes, at most `max_len`.
    pub fn read_block(&mut self, command: u8, max_len: usize) -> Result<Vec<u8>> {
        let mut block = self.bus.read_block_data(command).map_err(|source| {
            warn!("Read of {command:#04x} failed: {source}");
            Error::TransactionFailed { command, source }
        })?;

        debug!("RX block {command:#04x}: 0x{}", hex::encode(&block));

        let max_len = max_len.min(BLOCK_MAX);
        if block.len() > max_len {
            warn!(
                "Block {command:#04x} reported {} bytes, keeping {max_len}",
                block.len()
            );
            block.truncate(max_len);
        }
        Ok(block)
    }

    /// Give up the channel and return the underlying handle
    pub fn into_inner(self) -> B {
        self.bus
    }
}

fn check_capabilities<B: Smbus>(bus: &mut B) -> Result<()> {
    let funcs = bus.functionality().map_err(|source| {
        error!("Could not get the adapter functionality matrix: {source}");
        Error::FunctionalityQueryFailed(source)
    })?;

    for (flag, name) in REQUIRED {
        if !funcs.contains(flag) {
            error!("Adapter does not have {name} capability");
            return Err(Error::UnsupportedAdapter(name));
        }
    }

    if !funcs.intersects(Functionality::SMBUS_PEC | Functionality::I2C) {
        warn!("Adapter does not seem to support PEC");
    }
    if !funcs.contains(Functionality::SMBUS_READ_BLOCK_DATA) {
        warn!("Adapter does not support SMBus block reads, string registers will fail");
    }

    Ok(())
}

#[cfg(test)]
use crate::smbus::mock::{MockBus, Transaction};

#[cfg(test)]
fn connect_mock(bus: &MockBus, address: u8) -> Result<Channel<crate::smbus::mock::MockSmbus>> {
    Channel::connect(Path::new("/dev/i2c-mock"), address, |_| bus.open())
}

#[test]
fn test_setup_sequence() {
    let bus = MockBus::new();
    let channel = connect_mock(&bus, 0x0b).unwrap();
    assert_eq!(channel.address(), 0x0b);
    assert_eq!(
        bus.transactions(),
        vec![
            Transaction::Functionality,
            Transaction::SetSlaveAddress { address: 0x0b, force: false },
            Transaction::SetPec(true),
        ]
    );
    assert_eq!(bus.opened(), 1);
    assert_eq!(bus.closed(), 0);

    drop(channel);
    assert_eq!(bus.closed(), 1);
}

#[test]
fn test_address_range_checked_before_any_io() {
    for address in (0x00..ADDRESS_MIN).chain(ADDRESS_MAX + 1..=u8::MAX) {
        let bus = MockBus::new();
        let err = connect_mock(&bus, address).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(a) if a == address));
        assert_eq!(bus.opened(), 0);
        assert!(bus.transactions().is_empty());
    }
    for address in [ADDRESS_MIN, ADDRESS_MAX] {
        assert!(connect_mock(&MockBus::new(), address).is_ok());
    }
}

#[test]
fn test_open_failure() {
    let err = Channel::<crate::smbus::mock::MockSmbus>::connect(
        Path::new("/dev/i2c-7"),
        0x0b,
        |_| Err(io::Error::from(io::ErrorKind::PermissionDenied)),
    )
    .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(matches!(err, Error::DeviceOpenFailed { ref path, .. } if path == Path::new("/dev/i2c-7")));
}

#[test]
fn test_missing_word_read_is_unsupported() {
    let bus = MockBus::new()
        .with_functionality(Functionality::all() - Functionality::SMBUS_READ_WORD_DATA);
    let err = connect_mock(&bus, 0x0b).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAdapter("SMBus read word")));
    assert_eq!(bus.closed(), 1);
}

#[test]
fn test_missing_pec_support_is_only_a_warning() {
    let bus = MockBus::new().with_functionality(
        Functionality::SMBUS_READ_BYTE
            | Functionality::SMBUS_READ_BYTE_DATA
            | Functionality::SMBUS_READ_WORD_DATA,
    );
    assert!(connect_mock(&bus, 0x0b).is_ok());
}

#[test]
fn test_functionality_query_failure() {
    let bus = MockBus::new().failing_functionality();
    let err = connect_mock(&bus, 0x0b).unwrap_err();
    assert!(matches!(err, Error::FunctionalityQueryFailed(_)));
    assert_eq!(bus.closed(), 1);
}

#[test]
fn test_bind_failure_carries_address() {
    let bus = MockBus::new().failing_bind();
    let err = connect_mock(&bus, 0x16).unwrap_err();
    assert!(matches!(err, Error::AddressBindFailed { address: 0x16, .. }));
    assert_eq!(err.raw_os_error(), Some(16));
}

#[test]
fn test_pec_failure_closes_handle_once() {
    let bus = MockBus::new().failing_pec();
    let err = connect_mock(&bus, 0x0b).unwrap_err();
    assert!(matches!(err, Error::PecEnableFailed(_)));
    assert_eq!(bus.opened(), 1);
    assert_eq!(bus.closed(), 1);
}

#[test]
fn test_failed_read_leaves_channel_usable() {
    let bus = MockBus::new().failing_command(0x0a).with_word(0x09, 12_400);
    let mut channel = connect_mock(&bus, 0x0b).unwrap();

    let err = channel.read_word(0x0a).unwrap_err();
    assert_eq!(err.command(), Some(0x0a));
    assert_eq!(channel.read_word(0x09).unwrap(), 12_400);
    assert_eq!(bus.reads(), 2);
}

#[test]
fn test_block_length_is_device_reported() {
    let bus = MockBus::new().with_block(0x22, &hex::decode("4c494f4e").unwrap());
    let mut channel = connect_mock(&bus, 0x0b).unwrap();
    assert_eq!(channel.read_block(0x22, BLOCK_MAX).unwrap(), b"LION");
}

#[test]
fn test_block_truncated_to_max_len() {
    let bus = MockBus::new().with_block(0x20, b"ACME BATTERIES");
    let mut channel = connect_mock(&bus, 0x0b).unwrap();
    assert_eq!(channel.read_block(0x20, 4).unwrap(), b"ACME");
}

#[cfg(target_os = "linux")]
#[test]
fn test_linux_open_failures() {
    let err = Channel::open("/dev/i2c-does-not-exist", 0x0b).unwrap_err();
    assert!(matches!(err, Error::DeviceOpenFailed { .. }));
    assert!(!err.is_permission_denied());

    // not an i2c adapter, so I2C_FUNCS is rejected before any bind
    let err = Channel::open("/dev/null", 0x0b).unwrap_err();
    assert!(matches!(err, Error::FunctionalityQueryFailed(_)));
    assert_eq!(err.raw_os_error(), Some(25));

    let err = Channel::open("/dev/null", 0x78).unwrap_err();
    assert!(matches!(err, Error::InvalidAddress(0x78)));
}
