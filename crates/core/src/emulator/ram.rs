//! Flat byte-addressable RAM with ELF or flat-binary loading and a single
//! memory-mapped console output register.

use std::path::Path;

use object::{Object, ObjectSegment};

use crate::common::SimError;
use crate::config::defaults;

/// The simulator's physical memory.
///
/// Addressed starting at `base` (normally [`defaults::START_PC`]); any access
/// outside `[base, base + data.len())` is a configuration error, not a
/// recoverable one, since it means the loaded program or its config disagree
/// with the RAM size.
#[derive(Debug, Clone)]
pub struct Ram {
    data: Vec<u8>,
    base: u32,
}

impl Ram {
    /// Creates a zeroed RAM of `size` bytes, addressed starting at `base`.
    #[must_use]
    pub fn new(size: usize, base: u32) -> Self {
        Self {
            data: vec![0; size],
            base,
        }
    }

    fn offset(&self, addr: u32) -> usize {
        addr.wrapping_sub(self.base) as usize
    }

    /// Reads a byte. The console MMIO address is write-only and always
    /// reads back as zero, mirroring `write8`'s special-case instead of
    /// indexing into backing storage that was never allocated for it.
    #[must_use]
    pub fn read8(&self, addr: u32) -> u8 {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            return 0;
        }
        self.data[self.offset(addr)]
    }

    /// Reads a little-endian halfword.
    #[must_use]
    pub fn read16(&self, addr: u32) -> u16 {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            return 0;
        }
        let off = self.offset(addr);
        u16::from_le_bytes([self.data[off], self.data[off + 1]])
    }

    /// Reads a little-endian word.
    #[must_use]
    pub fn read32(&self, addr: u32) -> u32 {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            return 0;
        }
        let off = self.offset(addr);
        u32::from_le_bytes([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }

    /// Writes a byte. Writes to the console MMIO address print the byte to
    /// stdout as a character instead of storing it.
    pub fn write8(&mut self, addr: u32, val: u8) {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            print!("{}", val as char);
            return;
        }
        let off = self.offset(addr);
        self.data[off] = val;
    }

    /// Writes a little-endian halfword.
    pub fn write16(&mut self, addr: u32, val: u16) {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            self.write8(addr, val as u8);
            return;
        }
        let off = self.offset(addr);
        self.data[off..off + 2].copy_from_slice(&val.to_le_bytes());
    }

    /// Writes a little-endian word.
    pub fn write32(&mut self, addr: u32, val: u32) {
        if addr == defaults::CONSOLE_MMIO_ADDR {
            self.write8(addr, val as u8);
            return;
        }
        let off = self.offset(addr);
        self.data[off..off + 4].copy_from_slice(&val.to_le_bytes());
    }

    /// Loads `bytes` into RAM starting at `base`. If the image parses as ELF,
    /// copies each loadable segment to its virtual address; otherwise treats
    /// it as a flat binary loaded at the RAM's base address.
    pub fn load(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SimError> {
        match object::File::parse(bytes) {
            Ok(file) => self.load_elf_segments(path, &file),
            Err(_) => self.load_flat(path, bytes),
        }
    }

    fn load_elf_segments(&mut self, path: &Path, file: &object::File) -> Result<(), SimError> {
        for segment in file.segments() {
            let addr = segment.address();
            let data = segment
                .data()
                .map_err(|source| SimError::ElfParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            self.copy_in(path, addr as u32, data)?;
        }
        Ok(())
    }

    fn load_flat(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SimError> {
        self.copy_in(path, self.base, bytes)
    }

    fn copy_in(&mut self, path: &Path, addr: u32, bytes: &[u8]) -> Result<(), SimError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let off = self.offset(addr);
        if off.checked_add(bytes.len()).is_none_or(|end| end > self.data.len()) {
            return Err(SimError::SegmentOutOfBounds {
                addr,
                size: bytes.len(),
                ram_size: self.data.len(),
            });
        }
        let _ = path;
        self.data[off..off + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}
