//! `/dev/i2c-N` backend built on the i2c-dev ioctls

use super::{Functionality, Smbus, BLOCK_MAX};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

const I2C_SLAVE: u16 = 0x0703;
const I2C_SLAVE_FORCE: u16 = 0x0706;
const I2C_FUNCS: u16 = 0x0705;
const I2C_PEC: u16 = 0x0708;
const I2C_SMBUS: u16 = 0x0720;

const I2C_SMBUS_READ: u8 = 1;
const I2C_SMBUS_WORD_DATA: u32 = 3;
const I2C_SMBUS_BLOCK_DATA: u32 = 5;

#[repr(C)]
union SmbusData {
    word: u16,
    // length byte, payload, and one spare for PEC
    block: [u8; BLOCK_MAX + 2],
}

#[repr(C)]
struct SmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut SmbusData,
}

/// An open i2c-dev character device.
///
/// The file descriptor is closed when this is dropped.
#[derive(Debug)]
pub struct LinuxSmbus {
    file: File,
}

impl LinuxSmbus {
    /// Open a bus device node such as `/dev/i2c-1` for read/write
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    fn ioctl_arg(&self, request: u16, arg: libc::c_ulong) -> io::Result<()> {
        // SAFETY: the fd is owned by `self.file` and the request takes an integer argument.
        let res = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn smbus_read(&self, command: u8, size: u32) -> io::Result<SmbusData> {
        let mut data = SmbusData { block: [0; BLOCK_MAX + 2] };
        let mut args = SmbusIoctlData {
            read_write: I2C_SMBUS_READ,
            command,
            size,
            data: &mut data,
        };
        // SAFETY: `args` and `data` outlive the call and match the kernel's i2c_smbus_ioctl_data layout.
        let res = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SMBUS as _,
                &mut args as *mut SmbusIoctlData,
            )
        };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(data)
    }
}

impl Smbus for LinuxSmbus {
    fn functionality(&mut self) -> io::Result<Functionality> {
        let mut funcs: libc::c_ulong = 0;
        // SAFETY: I2C_FUNCS writes a single unsigned long through the pointer.
        let res = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_FUNCS as _,
                &mut funcs as *mut libc::c_ulong,
            )
        };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Functionality::from_bits_truncate(funcs as u32))
    }

    fn set_slave_address(&mut self, address: u8, force: bool) -> io::Result<()> {
        let request = if force { I2C_SLAVE_FORCE } else { I2C_SLAVE };
        self.ioctl_arg(request, libc::c_ulong::from(address))
    }

    fn set_pec(&mut self, enable: bool) -> io::Result<()> {
        self.ioctl_arg(I2C_PEC, libc::c_ulong::from(enable))
    }

    fn read_word_data(&mut self, command: u8) -> io::Result<u16> {
        let data = self.smbus_read(command, I2C_SMBUS_WORD_DATA)?;
        // SAFETY: the kernel filled the word member for a WORD_DATA transfer.
        Ok(unsafe { data.word })
    }

    fn read_block_data(&mut self, command: u8) -> io::Result<Vec<u8>> {
        let data = self.smbus_read(command, I2C_SMBUS_BLOCK_DATA)?;
        // SAFETY: the block member was initialised above and filled by the kernel.
        let block = unsafe { data.block };
        let len = usize::from(block[0]).min(BLOCK_MAX);
        Ok(block[1..=len].to_vec())
    }
}
