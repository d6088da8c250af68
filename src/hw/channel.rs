//! Register Channel
//!
//! Write path from the tick loop to the peripheral. A publish is a plain
//! fan-out of independent single-register writes: no transaction, no
//! ordering guarantee across registers, torn frames are acceptable.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ChannelConfig, RegisterStride};
use crate::hw::registers::{RegisterSnapshot, REGISTER_COUNT};

/// Register channel errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Device could not be opened. Fatal at startup.
    #[error("failed to open register device {path}: {source}")]
    Open {
        /// Device path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A single register write failed.
    #[error("write to register {addr:#04x} failed: {source}")]
    Write {
        /// Register address
        addr: u8,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A single register read failed.
    #[error("read of register {addr:#04x} failed: {source}")]
    Read {
        /// Register address
        addr: u8,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Address outside the register map.
    #[error("register address {0:#04x} outside the map")]
    AddressOutOfRange(u8),

    /// Some writes of a publish failed; the rest went through.
    #[error("{failed} of {total} register writes failed (first: {first})")]
    Partial {
        /// Failed writes
        failed: usize,
        /// Attempted writes
        total: usize,
        /// First failure
        first: Box<ChannelError>,
    },

    /// Device channels need positioned file I/O.
    #[error("device register channel not supported on this platform")]
    Unsupported,
}

/// Byte-wide register access. Exclusively owned by the tick loop.
pub trait RegisterChannel: Send {
    /// Write one register.
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), ChannelError>;

    /// Read one register back.
    fn read_register(&mut self, addr: u8) -> Result<u8, ChannelError>;

    /// Write every register of the snapshot.
    ///
    /// Every write is attempted even after a failure.
    fn publish(&mut self, snapshot: &RegisterSnapshot) -> Result<(), ChannelError> {
        let regs = snapshot.encode();
        let mut failed = 0;
        let mut first = None;

        for (addr, value) in regs.iter().enumerate() {
            if let Err(e) = self.write_register(addr as u8, *value) {
                failed += 1;
                first.get_or_insert(e);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(ChannelError::Partial {
                failed,
                total: REGISTER_COUNT,
                first: Box::new(first),
            }),
        }
    }

    /// Read the whole register file and decode it.
    fn read_back(&mut self) -> Result<RegisterSnapshot, ChannelError> {
        let mut regs = [0u8; REGISTER_COUNT];
        for (addr, slot) in regs.iter_mut().enumerate() {
            *slot = self.read_register(addr as u8)?;
        }
        Ok(RegisterSnapshot::decode(&regs))
    }
}

impl<C: RegisterChannel + ?Sized> RegisterChannel for Box<C> {
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), ChannelError> {
        (**self).write_register(addr, value)
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, ChannelError> {
        (**self).read_register(addr)
    }
}

#[inline]
fn check_addr(addr: u8) -> Result<usize, ChannelError> {
    let index = addr as usize;
    if index >= REGISTER_COUNT {
        return Err(ChannelError::AddressOutOfRange(addr));
    }
    Ok(index)
}

// =============================================================================
// MEMORY CHANNEL
// =============================================================================

/// In-process register file. Used for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryChannel {
    regs: [u8; REGISTER_COUNT],
    writes: u64,
    failing: Vec<u8>,
}

impl MemoryChannel {
    /// All registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current register file.
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Make every write to `addr` fail until cleared.
    pub fn fail_writes_to(&mut self, addr: u8) {
        if !self.failing.contains(&addr) {
            self.failing.push(addr);
        }
    }

    /// Stop injecting failures.
    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }
}

impl RegisterChannel for MemoryChannel {
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), ChannelError> {
        let index = check_addr(addr)?;
        if self.failing.contains(&addr) {
            return Err(ChannelError::Write {
                addr,
                source: io::Error::new(io::ErrorKind::Other, "injected failure"),
            });
        }
        self.regs[index] = value;
        self.writes += 1;
        Ok(())
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, ChannelError> {
        Ok(self.regs[check_addr(addr)?])
    }
}

// =============================================================================
// DEVICE CHANNEL
// =============================================================================

/// Registers behind a device file, addressed by positioned I/O.
///
/// Register `addr` lives at byte offset `base + addr * stride`. With a word
/// stride each register is written as a little-endian 32-bit word whose low
/// byte carries the value.
#[derive(Debug)]
pub struct DeviceChannel {
    file: File,
    path: PathBuf,
    base: u64,
    stride: RegisterStride,
}

impl DeviceChannel {
    /// Open `path` read-write.
    pub fn open(path: &Path, base: u64, stride: RegisterStride) -> Result<Self, ChannelError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| ChannelError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Opened register device {} at base {:#x}", path.display(), base);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            base,
            stride,
        })
    }

    /// Device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn offset(&self, addr: u8) -> Result<u64, ChannelError> {
        let index = check_addr(addr)? as u64;
        Ok(self.base + index * self.stride.bytes())
    }
}

#[cfg(unix)]
impl RegisterChannel for DeviceChannel {
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), ChannelError> {
        use std::os::unix::fs::FileExt;

        let offset = self.offset(addr)?;
        let result = match self.stride {
            RegisterStride::Byte => self.file.write_all_at(&[value], offset),
            RegisterStride::Word => self.file.write_all_at(&(value as u32).to_le_bytes(), offset),
        };
        result.map_err(|source| ChannelError::Write { addr, source })
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, ChannelError> {
        use std::os::unix::fs::FileExt;

        let offset = self.offset(addr)?;
        let mut word = [0u8; 4];
        let len = self.stride.bytes() as usize;
        self.file
            .read_exact_at(&mut word[..len], offset)
            .map_err(|source| ChannelError::Read { addr, source })?;
        Ok(word[0])
    }
}

/// Open the configured channel.
pub fn open_channel(config: &ChannelConfig) -> Result<Box<dyn RegisterChannel>, ChannelError> {
    match config {
        ChannelConfig::Memory => {
            info!("Using in-memory register channel");
            Ok(Box::new(MemoryChannel::new()))
        }
        ChannelConfig::Device { path, base, stride } => open_device(path, *base, *stride),
    }
}

#[cfg(unix)]
fn open_device(path: &Path, base: u64, stride: RegisterStride) -> Result<Box<dyn RegisterChannel>, ChannelError> {
    let channel = DeviceChannel::open(path, base, stride)?;
    info!("Register channel on {} ({:?} stride)", path.display(), stride);
    Ok(Box::new(channel))
}

#[cfg(not(unix))]
fn open_device(_path: &Path, _base: u64, _stride: RegisterStride) -> Result<Box<dyn RegisterChannel>, ChannelError> {
    Err(ChannelError::Unsupported)
}
