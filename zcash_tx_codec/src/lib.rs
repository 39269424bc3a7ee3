//! *A transaction codec for Zcash-derived chains.*
//!
//! `zcash_tx_codec` decodes and encodes v2 to v5 transactions, computes their
//! identifiers, and computes signature hashes for their transparent inputs.
//!
//! Transparent inputs and outputs are held in full. Shielded content (JoinSplits, Sapling
//! descriptions and Orchard actions) is skipped during decoding, retaining only counts,
//! value balances and lengths. Such transactions can be sized and identified (see
//! [`decode_with_txid`]), but not re-encoded or signed.
//!
//! ## Feature flags
//!
//! - `std` (default): enables `memuse` accounting of decoded transactions.
//! - `test-dependencies`: exposes `proptest` strategies for transactions and their
//!   components.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod encoding;
pub mod transaction;

pub use transaction::Error as CodecError;

use transaction::{
    components::Script,
    hasher::Blake2b256,
    sighash::{signature_hash, SighashType, TransparentInput},
    Transaction, TxId,
};

/// Decodes a transaction, failing if `data` holds anything after it.
pub fn decode(data: &[u8]) -> Result<Transaction, CodecError> {
    Transaction::read(data)
}

/// Decodes a transaction and computes its identifier.
pub fn decode_with_txid(data: &[u8]) -> Result<(Transaction, TxId), CodecError> {
    Transaction::read_with_txid(data)
}

/// Encodes a transaction.
///
/// Only transactions that decode back to themselves are accepted; see
/// [`Transaction::check_encodable`].
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, CodecError> {
    tx.to_bytes()
}

/// Computes the identifier of a transaction: the double-SHA-256 of its encoding before
/// v5, and its [ZIP 244] digest from v5.
///
/// [ZIP 244]: https://zips.z.cash/zip-0244
pub fn tx_hash(tx: &Transaction) -> Result<[u8; 32], CodecError> {
    tx.txid().map(<[u8; 32]>::from)
}

/// Computes the signature hash of the transparent input at `input_index`.
///
/// `prev_values` and `prev_scripts` describe the outputs spent by every input of the
/// transaction, in input order.
pub fn sighash(
    tx: &Transaction,
    input_index: usize,
    hash_type: SighashType,
    prev_values: &[i64],
    prev_scripts: &[Script],
) -> Result<[u8; 32], CodecError> {
    let input = TransparentInput::new(tx, input_index, hash_type, prev_values, prev_scripts)?;
    signature_hash(tx, &input, &Blake2b256).map(<[u8; 32]>::from)
}

/// Returns the length of the encoding of `tx`.
pub fn serialized_size(tx: &Transaction) -> u64 {
    tx.serialized_size()
}
