use byteorder::{LittleEndian, WriteBytesExt};

use super::{
    components::{Script, TxOut},
    hasher::{HashWriter, PersonalizedHasher},
    sighash::{SignatureHash, TransparentInput},
    txid::{
        to_hash, transparent_outputs_hash, transparent_prevout_hash, transparent_sequence_hash,
        v5_txid_digests, ZCASH_TRANSPARENT_HASH_PERSONALIZATION,
    },
    Error, Transaction, TxVersion,
};

const ZCASH_TRANSPARENT_INPUT_HASH_PERSONALIZATION: &[u8; 16] = b"Zcash___TxInHash";
const ZCASH_TRANSPARENT_AMOUNTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxTrAmountsHash";
const ZCASH_TRANSPARENT_SCRIPTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZTxTrScriptsHash";

fn amounts_hash<H: PersonalizedHasher + ?Sized>(hasher: &H, values: &[i64]) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_TRANSPARENT_AMOUNTS_HASH_PERSONALIZATION);
    for value in values {
        h.write_i64::<LittleEndian>(*value).unwrap();
    }
    h.finalize()
}

fn scripts_hash<H: PersonalizedHasher + ?Sized>(hasher: &H, scripts: &[Script]) -> [u8; 32] {
    let mut h = HashWriter::new(hasher, ZCASH_TRANSPARENT_SCRIPTS_HASH_PERSONALIZATION);
    for script in scripts {
        script.write(&mut h).unwrap();
    }
    h.finalize()
}

/// The transparent part of the signature digest, which takes the place of the
/// transparent part of the txid digest.
fn transparent_sig_digest<H: PersonalizedHasher + ?Sized>(
    hasher: &H,
    tx: &Transaction,
    input: &TransparentInput<'_>,
) -> [u8; 32] {
    let hash_type = input.hash_type();
    let flag_anyonecanpay = hash_type.is_anyone_can_pay();

    let (prevouts_digest, amounts_digest, scripts_digest, sequence_digest) = if flag_anyonecanpay
    {
        (
            transparent_prevout_hash(hasher, &[]),
            amounts_hash(hasher, &[]),
            scripts_hash(hasher, &[]),
            transparent_sequence_hash(hasher, &[]),
        )
    } else {
        (
            transparent_prevout_hash(hasher, &tx.vin),
            amounts_hash(hasher, input.prev_values()),
            scripts_hash(hasher, input.prev_scripts()),
            transparent_sequence_hash(hasher, &tx.vin),
        )
    };

    let outputs_digest = if hash_type.is_single() {
        if input.index() < tx.vout.len() {
            transparent_outputs_hash(hasher, &[&tx.vout[input.index()]])
        } else {
            transparent_outputs_hash::<_, TxOut>(hasher, &[])
        }
    } else if hash_type.is_none() {
        transparent_outputs_hash::<_, TxOut>(hasher, &[])
    } else {
        transparent_outputs_hash(hasher, &tx.vout)
    };

    // The input being signed:
    //   a. outpoint (32-byte hash + 4-byte little endian)
    //   b. value of the output spent by this input (8-byte little endian)
    //   c. scriptPubKey of the output spent by this input
    //   d. nSequence of the input (4-byte little endian)
    let mut ch = HashWriter::new(hasher, ZCASH_TRANSPARENT_INPUT_HASH_PERSONALIZATION);
    let txin = &tx.vin[input.index()];
    txin.prevout.write(&mut ch).unwrap();
    ch.write_i64::<LittleEndian>(input.value()).unwrap();
    input.script_code().write(&mut ch).unwrap();
    ch.write_u32::<LittleEndian>(txin.sequence).unwrap();
    let txin_digest = ch.finalize();

    let mut h = HashWriter::new(hasher, ZCASH_TRANSPARENT_HASH_PERSONALIZATION);
    h.update(&[hash_type.encode()]);
    h.update(&prevouts_digest);
    h.update(&amounts_digest);
    h.update(&scripts_digest);
    h.update(&sequence_digest);
    h.update(&outputs_digest);
    h.update(&txin_digest);
    h.finalize()
}

/// Computes the [ZIP 244] signature hash of a transparent input of a v5 transaction.
///
/// [ZIP 244]: https://zips.z.cash/zip-0244
pub fn v5_signature_hash<H: PersonalizedHasher + ?Sized>(
    tx: &Transaction,
    input: &TransparentInput<'_>,
    hasher: &H,
) -> Result<SignatureHash, Error> {
    if tx.version != TxVersion::Zip225 {
        return Err(Error::UnsupportedVersion(tx.version.number()));
    }
    input.check(tx)?;
    let txid_parts = v5_txid_digests(hasher, tx)?;

    Ok(SignatureHash::from_bytes(to_hash(
        hasher,
        tx.consensus_branch_id,
        &txid_parts.header_digest,
        &transparent_sig_digest(hasher, tx, input),
        &txid_parts.sapling_digest,
        &txid_parts.orchard_digest,
    )))
}
