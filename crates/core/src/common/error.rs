//! Ambient error surface.
//!
//! Everything inside a cycle's `tick()` reports back through a `bool` or
//! `Option` — a reservation station is full, a port is empty, commit has
//! nothing to retire. None of that is an `Err`. `SimError` only covers the
//! handful of things that can go wrong before simulation starts: the binary
//! on disk doesn't parse, or the config file doesn't parse.

use std::path::PathBuf;

use thiserror::Error;

/// Recoverable failures surfaced at the simulator's ambient boundary.
///
/// Constructed while loading a program image or a configuration file, never
/// while a `Core` is ticking.
#[derive(Debug, Error)]
pub enum SimError {
    /// The program image could not be read from disk.
    #[error("failed to read program image {path:?}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The program image was not valid ELF and not a recognized flat binary.
    #[error("failed to parse ELF image {path:?}: {source}")]
    ElfParse {
        /// Path to the malformed image.
        path: PathBuf,
        /// Underlying parse failure reported by the `object` crate.
        #[source]
        source: object::Error,
    },

    /// An ELF segment targets an address outside the simulator's flat RAM.
    #[error("segment at {addr:#x} (size {size}) does not fit in a {ram_size}-byte RAM")]
    SegmentOutOfBounds {
        /// Destination address of the out-of-range segment.
        addr: u32,
        /// Size in bytes of the segment.
        size: usize,
        /// Capacity of the simulator's RAM.
        ram_size: usize,
    },

    /// The configuration file was not valid JSON or did not match `Config`'s shape.
    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse {
        /// Path to the malformed config file.
        path: PathBuf,
        /// Underlying `serde_json` failure.
        #[source]
        source: serde_json::Error,
    },
}
