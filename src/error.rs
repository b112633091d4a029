//! Error types for sbsread

use std::io;
use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while opening or querying a smart battery
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Address outside the usable 7-bit SMBus range 0x03..=0x77
    #[error("device address {0:#04x} out of range (0x03-0x77)")]
    InvalidAddress(u8),

    /// The bus device node could not be opened for read/write
    #[error("could not open {}: {source}", path.display())]
    DeviceOpenFailed {
        /// Device node that was opened
        path: PathBuf,
        /// Underlying OS error
        source: io::Error,
    },

    /// The adapter functionality matrix could not be read
    #[error("could not get the adapter functionality matrix: {0}")]
    FunctionalityQueryFailed(#[source] io::Error),

    /// The adapter lacks a capability the SBS reads depend on
    #[error("adapter does not have {0} capability")]
    UnsupportedAdapter(&'static str),

    /// Binding the target address to the handle failed
    #[error("could not set address to {address:#04x}: {source}")]
    AddressBindFailed {
        /// Requested target address
        address: u8,
        /// Underlying OS error
        source: io::Error,
    },

    /// Packet error checking could not be enabled
    #[error("could not set PEC: {0}")]
    PecEnableFailed(#[source] io::Error),

    /// A single SMBus transaction failed
    #[error("read of command {command:#04x} failed: {source}")]
    TransactionFailed {
        /// SBS command code of the failed read
        command: u8,
        /// Underlying OS error
        source: io::Error,
    },
}

impl Error {
    /// True when the device node exists but the process lacks permission to open it.
    ///
    /// Usually fixed by running as root or adding the user to the `i2c` group.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Error::DeviceOpenFailed { source, .. } if source.kind() == io::ErrorKind::PermissionDenied
        )
    }

    /// Command code of a failed transaction, if this is one.
    pub fn command(&self) -> Option<u8> {
        match self {
            Error::TransactionFailed { command, .. } => Some(*command),
            _ => None,
        }
    }

    /// OS error number carried by the underlying failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::InvalidAddress(_) | Error::UnsupportedAdapter(_) => None,
            Error::DeviceOpenFailed { source, .. }
            | Error::AddressBindFailed { source, .. }
            | Error::TransactionFailed { source, .. } => source.raw_os_error(),
            Error::FunctionalityQueryFailed(source) | Error::PecEnableFailed(source) => {
                source.raw_os_error()
            }
        }
    }
}

#[test]
fn test_permission_denied_is_distinguishable() {
    let denied = Error::DeviceOpenFailed {
        path: PathBuf::from("/dev/i2c-1"),
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    };
    assert!(denied.is_permission_denied());

    let missing = Error::DeviceOpenFailed {
        path: PathBuf::from("/dev/i2c-9"),
        source: io::Error::from(io::ErrorKind::NotFound),
    };
    assert!(!missing.is_permission_denied());
}

#[test]
fn test_transaction_failure_carries_command_and_status() {
    let err = Error::TransactionFailed {
        command: 0x09,
        source: io::Error::from_raw_os_error(5),
    };
    assert_eq!(err.command(), Some(0x09));
    assert_eq!(err.raw_os_error(), Some(5));
    assert_eq!(Error::InvalidAddress(0x02).command(), None);
}

#[test]
fn test_display() {
    assert_eq!(
        Error::InvalidAddress(0x78).to_string(),
        "device address 0x78 out of range (0x03-0x77)"
    );
    assert_eq!(
        Error::UnsupportedAdapter("SMBus read word").to_string(),
        "adapter does not have SMBus read word capability"
    );
}
