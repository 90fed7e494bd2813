//! Encode messages into coordinate sets recoverable from a subset of points.
//!
//! A message is extended with Reed-Solomon parity and each resulting byte is
//! paired with its 1-based position, yielding `(x, y)` coordinates that can be
//! interpolated into a "message polynomial" over any field with more than 256
//! elements. The first coordinates are the message itself.
//!
//! # Example
//!
//! ```rust
//! use tessera_coding::{decode, encode, Config};
//!
//! let config = Config::default();
//! let coordinates = encode(&config, b"hello").unwrap();
//! assert_eq!((coordinates[0].x, coordinates[0].y), (1, b'h'));
//!
//! // Lose the whole message and recover it from parity.
//! let total = coordinates.len();
//! let survivors = &coordinates[5..];
//! assert_eq!(decode(&config, total, survivors).unwrap(), b"hello");
//! ```

use std::num::NonZeroU16;

mod reed_solomon;
pub use reed_solomon::{decode, encode, Error, SHARD_BYTES};

/// Number of parity bytes appended by [`Config::default`].
pub const DEFAULT_PARITY_SYMBOLS: u16 = 10;

/// Configuration for [`encode`] and [`decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Parity bytes (and so coordinates) appended to the message.
    ///
    /// Must be a multiple of [`SHARD_BYTES`]. Any `parity_symbols / SHARD_BYTES`
    /// coordinates may be lost before the message becomes unrecoverable.
    pub parity_symbols: NonZeroU16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parity_symbols: NonZeroU16::new(DEFAULT_PARITY_SYMBOLS)
                .expect("default parity is non-zero"),
        }
    }
}

/// A point of a coordinate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    /// Position of the byte in the encoding, starting at 1.
    pub x: u32,
    /// Value of the byte at that position.
    pub y: u8,
}
