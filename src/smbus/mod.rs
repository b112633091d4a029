//! SMBus transaction primitives
//!
//! The [`Smbus`] trait is the only thing the channel needs from the bus: a functionality
//! query, the address bind, the PEC toggle and the two read transactions SBS uses.
//! Kernel ioctl layouts stay inside the Linux backend.

use std::io;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(test)]
pub(crate) mod mock;

#[cfg(target_os = "linux")]
pub use linux::LinuxSmbus;

/// Largest payload of an SMBus block transfer
pub const BLOCK_MAX: usize = 32;

bitflags::bitflags! {
    /// Adapter functionality matrix as reported by `I2C_FUNCS`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Functionality: u32 {
        const I2C = 0x0000_0001;
        const SMBUS_PEC = 0x0000_0008;
        const SMBUS_READ_BYTE = 0x0002_0000;
        const SMBUS_READ_BYTE_DATA = 0x0008_0000;
        const SMBUS_READ_WORD_DATA = 0x0020_0000;
        const SMBUS_READ_BLOCK_DATA = 0x0100_0000;
    }
}

/// One open SMBus adapter handle.
///
/// Implementors own the handle and release it when dropped.
pub trait Smbus {
    /// Read the adapter functionality matrix
    fn functionality(&mut self) -> io::Result<Functionality>;

    /// Bind subsequent transactions to a 7-bit target address
    fn set_slave_address(&mut self, address: u8, force: bool) -> io::Result<()>;

    /// Turn packet error checking on or off
    fn set_pec(&mut self, enable: bool) -> io::Result<()>;

    /// SMBus "read word data": command byte out, 16-bit little-endian word back
    fn read_word_data(&mut self, command: u8) -> io::Result<u16>;

    /// SMBus "read block data": command byte out, length-prefixed block back.
    ///
    /// Returns exactly the number of bytes the device reported.
    fn read_block_data(&mut self, command: u8) -> io::Result<Vec<u8>>;
}
