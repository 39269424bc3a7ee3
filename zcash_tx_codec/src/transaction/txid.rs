//! Transaction identifiers.
//!
//! v2-4 transactions are identified by the double-SHA-256 of their encoding. v5
//! transactions are identified by the [ZIP 244] digest tree, which commits to the
//! header, transparent, Sapling and Orchard parts of the transaction separately.
//!
//! [ZIP 244]: https://zips.z.cash/zip-0244

use std::borrow::Borrow;

use byteorder::{LittleEndian, WriteBytesExt};
use sha2::{Digest, Sha256};

use crate::encoding::Reader;

use super::{
    components::{TxIn, TxOut},
    hasher::{branch_personalization, Blake2b256, HashWriter, PersonalizedHasher},
    Error, Transaction, TxId, TxVersion,
};

/// TxId tree root personalization
const ZCASH_TX_PERSONALIZATION_PREFIX: &[u8; 12] = b"ZcashTxHash_";

// TxId level 1 node personalization
const ZCASH_HEADERS_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdHeadersHash";
pub(crate) const ZCASH_TRANSPARENT_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdTranspaHash";
const ZCASH_SAPLING_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdSaplingHash";
const ZCASH_ORCHARD_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdOrchardHash";

// TxId transparent level 2 node personalization
const ZCASH_PREVOUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdPrevoutHash";
const ZCASH_SEQUENCE_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdSequencHash";
const ZCASH_OUTPUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxIdOutputsHash";

/// The digests of the transparent part of a v5 transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransparentDigests {
    pub prevouts_digest: [u8; 32],
    pub sequence_digest: [u8; 32],
    pub outputs_digest: [u8; 32],
}

/// The level 1 nodes of the v5 txid tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxDigests {
    pub header_digest: [u8; 32],
    /// `None` if the transaction has neither transparent inputs nor outputs.
    pub transparent_digests: Option<TransparentDigests>,
    pub sapling_digest: [u8; 32],
    pub orchard_digest: [u8; 32],
}

/// Sequentially append the serialized value of each transparent input
/// to a hash personalized by ZCASH_PREVOUTS_HASH_PERSONALIZATION.
/// In the case that no inputs are provided, this produces a default
/// hash from just the personalization string.
pub(crate) fn transparent_prevout_hash<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    vin: &[TxIn],
) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_PREVOUTS_HASH_PERSONALIZATION);
    for t_in in vin {
        t_in.prevout.write(&mut h).unwrap();
    }
    h.finalize()
}

/// Hash of the little-endian u32 interpretation of the
/// `sequence` values for each TxIn record passed in vin.
pub(crate) fn transparent_sequence_hash<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    vin: &[TxIn],
) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_SEQUENCE_HASH_PERSONALIZATION);
    for t_in in vin {
        h.update(&t_in.sequence.to_le_bytes());
    }
    h.finalize()
}

/// Sequentially append the full serialized value of each transparent output
/// to a hash personalized by ZCASH_OUTPUTS_HASH_PERSONALIZATION.
/// In the case that no outputs are provided, this produces a default
/// hash from just the personalization string.
pub(crate) fn transparent_outputs_hash<H: PersonalizedHasher + ?Sized, T: Borrow<TxOut>>(
    hasher: &H,
    vout: &[T],
) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_OUTPUTS_HASH_PERSONALIZATION);
    for t_out in vout {
        t_out.borrow().write(&mut h).unwrap();
    }
    h.finalize()
}

/// The txid commits to the hash of all transparent inputs and outputs.
fn transparent_digests<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    tx: &Transaction,
) -> Option<TransparentDigests> {
    if tx.vin.is_empty() && tx.vout.is_empty() {
        None
    } else {
        Some(TransparentDigests {
            prevouts_digest: transparent_prevout_hash(hasher, &tx.vin),
            sequence_digest: transparent_sequence_hash(hasher, &tx.vin),
            outputs_digest: transparent_outputs_hash(hasher, &tx.vout),
        })
    }
}

fn hash_header_txid_data<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    tx: &Transaction,
) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_HEADERS_HASH_PERSONALIZATION);

    h.write_u32::<LittleEndian>(tx.version.header()).unwrap();
    h.write_u32::<LittleEndian>(tx.version_group_id).unwrap();
    // we commit to the consensus branch ID with the header
    h.write_u32::<LittleEndian>(tx.consensus_branch_id).unwrap();
    h.write_u32::<LittleEndian>(tx.lock_time).unwrap();
    h.write_u32::<LittleEndian>(tx.expiry_height).unwrap();

    h.finalize()
}

pub(crate) fn hash_transparent_txid_data<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    t_digests: Option<&TransparentDigests>,
) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_TRANSPARENT_HASH_PERSONALIZATION);
    if let Some(d) = t_digests {
        h.update(&d.prevouts_digest);
        h.update(&d.sequence_digest);
        h.update(&d.outputs_digest);
    }
    h.finalize()
}

/// Computes the level 1 digests of a v5 transaction.
///
/// The Sapling and Orchard digests are those of empty bundles, so this fails with
/// [`Error::UnsupportedReencode`] if the transaction carried shielded content.
pub fn v5_txid_digests<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    tx: &Transaction,
) -> Result<TxDigests, Error> {
    if !tx.shielded.is_empty() {
        tracing::debug!("cannot digest a v5 transaction with discarded shielded data");
        return Err(Error::UnsupportedReencode);
    }

    Ok(TxDigests {
        header_digest: hash_header_txid_data(hasher, tx),
        transparent_digests: transparent_digests(hasher, tx),
        sapling_digest: hasher.hash(ZCASH_SAPLING_HASH_PERSONALIZATION, &[]),
        orchard_digest: hasher.hash(ZCASH_ORCHARD_HASH_PERSONALIZATION, &[]),
    })
}

/// Combines the level 1 nodes of the tree under the root personalization.
pub(crate) fn to_hash<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    consensus_branch_id: u32,
    header_digest: &[u8; 32],
    transparent_digest: &[u8; 32],
    sapling_digest: &[u8; 32],
    orchard_digest: &[u8; 32],
) -> [u8; 32] {
    let personal = branch_personalization(ZCASH_TX_PERSONALIZATION_PREFIX, consensus_branch_id);
    let mut h = HashWriter::new(hasher, &personal);
    h.update(header_digest);
    h.update(transparent_digest);
    h.update(sapling_digest);
    h.update(orchard_digest);
    h.finalize()
}

/// Computes the [ZIP 244] transaction identifier of a v5 transaction.
///
/// [ZIP 244]: https://zips.z.cash/zip-0244
pub fn v5_txid<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    tx: &Transaction,
) -> Result<TxId, Error> {
    let digests = v5_txid_digests(hasher, tx)?;
    Ok(TxId::from_bytes(to_hash(
        hasher,
        tx.consensus_branch_id,
        &digests.header_digest,
        &hash_transparent_txid_data(hasher, digests.transparent_digests.as_ref()),
        &digests.sapling_digest,
        &digests.orchard_digest,
    )))
}

/// The double-SHA-256 identifier of an encoded pre-v5 transaction.
pub fn legacy_txid(encoded: &[u8]) -> TxId {
    let mut txid = [0; 32];
    txid.copy_from_slice(&Sha256::digest(Sha256::digest(encoded)));
    TxId::from_bytes(txid)
}

impl Transaction {
    /// Computes this transaction's identifier.
    ///
    /// Pre-v5 identifiers are computed from the re-encoded transaction, so this fails with
    /// [`Error::UnsupportedReencode`] for transactions whose shielded content was
    /// discarded. [`Transaction::read_with_txid`] does not have this restriction.
    pub fn txid(&self) -> Result<TxId, Error> {
        self.txid_with(&Blake2b256)
    }

    /// Computes this transaction's identifier with the given personalized hash.
    pub fn txid_with<H: PersonalizedHasher + ?Sized>(&self, hasher: &H) -> Result<TxId, Error> {
        match self.version {
            TxVersion::Sprout | TxVersion::Overwinter | TxVersion::Sapling => {
                Ok(legacy_txid(&self.to_bytes()?))
            }
            TxVersion::Zip225 => v5_txid(hasher, self),
        }
    }

    /// Decodes a transaction and computes its identifier.
    ///
    /// For v2-4 transactions the identifier is taken over the input bytes, so it is
    /// available even when shielded content is discarded.
    pub fn read_with_txid(data: &[u8]) -> Result<(Self, TxId), Error> {
        let mut reader = Reader::new(data);
        let tx = Self::read_from(&mut reader)?;
        let txid = match tx.version {
            TxVersion::Sprout | TxVersion::Overwinter | TxVersion::Sapling => {
                legacy_txid(reader.consumed())
            }
            TxVersion::Zip225 => tx.txid()?,
        };
        reader.finish()?;
        Ok((tx, txid))
    }
}
