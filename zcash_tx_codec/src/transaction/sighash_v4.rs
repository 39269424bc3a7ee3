//! The [ZIP 143] and [ZIP 243] signature digests of v3 and v4 transactions.
//!
//! Only transactions without JoinSplits or Sapling descriptions can be signed, so the
//! shielded digests of the preimage are always zero.
//!
//! [ZIP 143]: https://zips.z.cash/zip-0143
//! [ZIP 243]: https://zips.z.cash/zip-0243

use byteorder::{LittleEndian, WriteBytesExt};

use super::{
    components::{TxIn, TxOut},
    hasher::{branch_personalization, HashWriter, PersonalizedHasher},
    sighash::{SignatureHash, TransparentInput},
    Error, Transaction, TxVersion,
};

/// The consensus branch id of Zclassic's "Buttercup" upgrade, under which v4 signature
/// hashes are computed by default.
pub const ZCLASSIC_BRANCH_ID: u32 = 0x930b_540d;

const ZCASH_SIGHASH_PERSONALIZATION_PREFIX: &[u8; 12] = b"ZcashSigHash";
const ZCASH_PREVOUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashPrevoutHash";
const ZCASH_SEQUENCE_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashSequencHash";
const ZCASH_OUTPUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashOutputsHash";

macro_rules! update_hash {
    ($h:expr, $cond:expr, $value:expr) => {
        if $cond {
            $h.update(&$value);
        } else {
            $h.update(&[0; 32]);
        }
    };
}

fn prevout_hash<H: PersonalizedHasher + ?Sized>(hasher: &H, vin: &[TxIn]) -> [u8; 32] {
    let mut data = Vec::with_capacity(vin.len() * 36);
    for t_in in vin {
        t_in.prevout.write(&mut data).unwrap();
    }
    hasher.hash(ZCASH_PREVOUTS_HASH_PERSONALIZATION, &data)
}

fn sequence_hash<H: PersonalizedHasher + ?Sized>(hasher: &H, vin: &[TxIn]) -> [u8; 32] {
    let mut data = Vec::with_capacity(vin.len() * 4);
    for t_in in vin {
        data.extend_from_slice(&t_in.sequence.to_le_bytes());
    }
    hasher.hash(ZCASH_SEQUENCE_HASH_PERSONALIZATION, &data)
}

fn outputs_hash<H: PersonalizedHasher + ?Sized>(hasher: &H, vout: &[TxOut]) -> [u8; 32] {
    let mut data = Vec::with_capacity(vout.len() * (4 + 1));
    for t_out in vout {
        t_out.write(&mut data).unwrap();
    }
    hasher.hash(ZCASH_OUTPUTS_HASH_PERSONALIZATION, &data)
}

/// Computes the signature hash of a transparent input of a v3 or v4 transaction under
/// the given consensus branch.
pub fn v4_signature_hash<H: PersonalizedHasher + ?Sized>(
    tx: &Transaction,
    consensus_branch_id: u32,
    input: &TransparentInput<'_>,
    hasher: &H,
) -> Result<SignatureHash, Error> {
    if !matches!(tx.version, TxVersion::Overwinter | TxVersion::Sapling) {
        return Err(Error::UnsupportedVersion(tx.version.number()));
    }
    if !tx.is_reencodable() {
        tracing::debug!("cannot sign a transaction with discarded shielded data");
        return Err(Error::UnsupportedReencode);
    }
    input.check(tx)?;

    let hash_type = input.hash_type();
    let personal =
        branch_personalization(ZCASH_SIGHASH_PERSONALIZATION_PREFIX, consensus_branch_id);
    let mut h = HashWriter::new(hasher, &personal);

    h.update(&tx.version.header().to_le_bytes());
    h.update(&tx.version_group_id.to_le_bytes());
    update_hash!(
        h,
        !hash_type.is_anyone_can_pay(),
        prevout_hash(hasher, &tx.vin)
    );
    update_hash!(
        h,
        !hash_type.is_anyone_can_pay() && !hash_type.is_single() && !hash_type.is_none(),
        sequence_hash(hasher, &tx.vin)
    );

    if !hash_type.is_single() && !hash_type.is_none() {
        h.update(&outputs_hash(hasher, &tx.vout));
    } else if hash_type.is_single() && input.index() < tx.vout.len() {
        h.update(&outputs_hash(hasher, &tx.vout[input.index()..=input.index()]));
    } else {
        h.update(&[0; 32]);
    }

    // JoinSplits, then Sapling spends and outputs.
    h.update(&[0; 32]);
    if tx.version.has_sapling() {
        h.update(&[0; 32]);
        h.update(&[0; 32]);
    }
    h.update(&tx.lock_time.to_le_bytes());
    h.update(&tx.expiry_height.to_le_bytes());
    if tx.version.has_sapling() {
        h.update(&tx.sapling_value_balance().to_le_bytes());
    }
    h.update(&u32::from(hash_type.encode()).to_le_bytes());

    let txin = &tx.vin[input.index()];
    txin.prevout.write(&mut h).unwrap();
    input.script_code().write(&mut h).unwrap();
    h.write_i64::<LittleEndian>(input.value()).unwrap();
    h.write_u32::<LittleEndian>(txin.sequence).unwrap();

    Ok(SignatureHash::from_bytes(h.finalize()))
}
