//! Reed-Solomon coding of messages into byte-valued coordinate sets.
//!
//! The message is zero-padded to a whole number of [`SHARD_BYTES`]-byte
//! original shards and the codec appends `parity_symbols / SHARD_BYTES`
//! recovery shards. Every message byte and every recovery byte becomes one
//! coordinate: `x = 1..=len` carry the message itself and `x = len + 1..=n`
//! carry the parity. Padding is implied by the length and never emitted.
//!
//! The codec erases whole shards, so losing one byte of a shard costs as much
//! as losing both. Any `parity_symbols / SHARD_BYTES` missing coordinates can
//! always be recovered, and up to `parity_symbols` when they fall on whole
//! shards.

use crate::{Config, Coordinate};
use reed_solomon_simd::{Error as RsError, ReedSolomonDecoder, ReedSolomonEncoder};
use thiserror::Error;
use tracing::{debug, trace};

/// Bytes per shard (the codec operates on GF(2^16)).
pub const SHARD_BYTES: usize = 2;

/// Maximum number of shards (originals plus recovery) the codec supports.
const MAX_SHARDS: usize = 1 << 16;

type Shard = [u8; SHARD_BYTES];

/// Errors that can occur when encoding or decoding a message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),
    #[error("invalid parameters")]
    InvalidParameters,
    #[error("not enough shards: need {0}, have {1}")]
    NotEnoughShards(usize, usize),
    #[error("invalid index: {0}")]
    InvalidIndex(u32),
    #[error("duplicate index: {0}")]
    DuplicateIndex(u32),
    #[error("inconsistent symbols")]
    Inconsistent,
    #[error("reed-solomon error: {0}")]
    ReedSolomon(#[from] RsError),
}

/// Number of original shards needed for a message of `len` bytes.
fn original_shards(len: usize) -> usize {
    len.div_ceil(SHARD_BYTES).max(1)
}

/// Number of recovery shards, or `None` if the parity does not fill whole shards.
fn recovery_shards(config: &Config) -> Option<usize> {
    let parity = config.parity_symbols.get() as usize;
    (parity % SHARD_BYTES == 0).then_some(parity / SHARD_BYTES)
}

/// Groups `bytes` into shards, or `None` if any byte is missing.
fn shards(bytes: &[Option<u8>]) -> impl Iterator<Item = Option<Shard>> + '_ {
    bytes
        .chunks_exact(SHARD_BYTES)
        .map(|chunk| Some([chunk[0]?, chunk[1]?]))
}

/// Computes the recovery shards for the provided originals.
fn parity(originals: &[Shard], count: usize) -> Result<Vec<Shard>, Error> {
    let mut encoder = ReedSolomonEncoder::new(originals.len(), count, SHARD_BYTES)?;
    for shard in originals {
        encoder.add_original_shard(shard)?;
    }
    let result = encoder.encode()?;
    Ok(result
        .recovery_iter()
        .map(|shard| [shard[0], shard[1]])
        .collect())
}

/// Encodes `message` into coordinates `(x, y)` with `x` running from 1.
///
/// The first `message.len()` coordinates are the message bytes in order,
/// followed by [`Config::parity_symbols`] parity bytes.
pub fn encode(config: &Config, message: &[u8]) -> Result<Vec<Coordinate>, Error> {
    let recovery_count = recovery_shards(config).ok_or(Error::InvalidParameters)?;
    let original_count = original_shards(message.len());
    if original_count + recovery_count > MAX_SHARDS {
        return Err(Error::MessageTooLong(message.len()));
    }

    // Pad the message to whole shards
    let mut padded = message.to_vec();
    padded.resize(original_count * SHARD_BYTES, 0);
    let originals = padded
        .chunks_exact(SHARD_BYTES)
        .map(|chunk| [chunk[0], chunk[1]])
        .collect::<Vec<_>>();

    let recovery = parity(&originals, recovery_count)?;
    let coordinates = message
        .iter()
        .chain(recovery.iter().flatten())
        .zip(1u32..)
        .map(|(&y, x)| Coordinate { x, y })
        .collect::<Vec<_>>();
    debug!(
        len = message.len(),
        originals = original_count,
        recovery = recovery_count,
        "encoded message"
    );
    Ok(coordinates)
}

/// Recovers a message from a subset of the `total` coordinates produced by
/// [`encode`].
///
/// Coordinates may be supplied in any order. Any supplied byte that disagrees
/// with the recovered encoding fails the decode with [`Error::Inconsistent`].
pub fn decode(config: &Config, total: usize, coordinates: &[Coordinate]) -> Result<Vec<u8>, Error> {
    let recovery_count = recovery_shards(config).ok_or(Error::InvalidParameters)?;
    let parity_bytes = recovery_count * SHARD_BYTES;
    let Some(len) = total.checked_sub(parity_bytes) else {
        return Err(Error::InvalidParameters);
    };
    let original_count = original_shards(len);
    if original_count + recovery_count > MAX_SHARDS {
        return Err(Error::InvalidParameters);
    }

    // Sort the coordinates into their slots, the padding is known
    let mut originals: Vec<Option<u8>> = vec![None; original_count * SHARD_BYTES];
    originals[len..].fill(Some(0));
    let mut recoveries: Vec<Option<u8>> = vec![None; parity_bytes];
    for coordinate in coordinates {
        let index = coordinate.x as usize;
        if index == 0 || index > total {
            return Err(Error::InvalidIndex(coordinate.x));
        }
        let slot = if index <= len {
            &mut originals[index - 1]
        } else {
            &mut recoveries[index - 1 - len]
        };
        if slot.is_some() {
            return Err(Error::DuplicateIndex(coordinate.x));
        }
        *slot = Some(coordinate.y);
    }

    // Restore missing originals
    let mut restored = shards(&originals).collect::<Vec<_>>();
    let recovered = shards(&recoveries).collect::<Vec<_>>();
    let missing = restored.iter().filter(|s| s.is_none()).count();
    let available = restored
        .iter()
        .chain(recovered.iter())
        .filter(|s| s.is_some())
        .count();
    if available < original_count {
        return Err(Error::NotEnoughShards(original_count, available));
    }
    if missing > 0 {
        let mut decoder = ReedSolomonDecoder::new(original_count, recovery_count, SHARD_BYTES)?;
        for (index, shard) in restored.iter().enumerate() {
            if let Some(shard) = shard {
                decoder.add_original_shard(index, shard)?;
            }
        }
        for (index, shard) in recovered.iter().enumerate() {
            if let Some(shard) = shard {
                decoder.add_recovery_shard(index, shard)?;
            }
        }
        let result = decoder.decode()?;
        for (index, shard) in result.restored_original_iter() {
            restored[index] = Some([shard[0], shard[1]]);
        }
        trace!(missing, "restored original shards");
    }
    let restored = restored
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::Inconsistent)?;

    // Every supplied byte (and the padding) must match the encoding
    let computed = parity(&restored, recovery_count)?;
    let supplied = originals.iter().chain(recoveries.iter());
    let expected = restored.iter().chain(computed.iter()).flatten();
    if supplied
        .zip(expected)
        .any(|(supplied, expected)| supplied.is_some_and(|s| s != *expected))
    {
        return Err(Error::Inconsistent);
    }

    let mut message = restored.concat();
    message.truncate(len);
    Ok(message)
}
