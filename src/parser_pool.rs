//! Parallel decoding of independent VCF inputs using Rayon.
//!
//! Decoding one input is sequential, since the header must be read before
//! the records it describes. Independent inputs share no state, so
//! [`decode_many`] hands each one to Rayon's work-stealing pool.
//!
//! # Examples
//!
//! ```
//! use vcfscope::decoder::DecodeOptions;
//! use vcfscope::parser_pool::decode_many;
//!
//! let first = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t1\t.\tA\t.\t.\t.\t.\n";
//! let second = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";
//!
//! let results = decode_many(&[first, second], DecodeOptions::default());
//! assert_eq!(results[0].as_ref().unwrap().data.len(), 1);
//! assert!(results[1].as_ref().unwrap().data.is_empty());
//! ```

use rayon::prelude::*;

use crate::decoder::{DecodeOptions, Decoded, Decoder};
use crate::error::Result;

/// Decode several inputs in parallel.
///
/// Results are returned in input order; a failure in one input does not
/// affect the others.
pub fn decode_many<S>(inputs: &[S], options: DecodeOptions) -> Vec<Result<Decoded>>
where
    S: AsRef<str> + Sync,
{
    let decoder = Decoder::new(options);
    inputs
        .par_iter()
        .map(|input| decoder.decode(input.as_ref()))
        .collect()
}

/// Decode several inputs in parallel, failing on the first error.
///
/// # Errors
///
/// Returns the error of the first input (in input order) that failed.
pub fn decode_all<S>(inputs: &[S], options: DecodeOptions) -> Result<Vec<Decoded>>
where
    S: AsRef<str> + Sync,
{
    decode_many(inputs, options).into_iter().collect()
}

/// Decode several byte inputs in parallel.
///
/// Non-UTF-8 inputs fail individually with [`VcfError::Decode`](crate::VcfError::Decode).
pub fn decode_many_bytes<B>(inputs: &[B], options: DecodeOptions) -> Vec<Result<Decoded>>
where
    B: AsRef<[u8]> + Sync,
{
    let decoder = Decoder::new(options);
    inputs
        .par_iter()
        .map(|input| decoder.decode_bytes(input.as_ref()))
        .collect()
}
