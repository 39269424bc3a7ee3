//! Sprout JoinSplit descriptions, of which only the public values are retained.

use zcash_encoding::CompactSize;

use crate::encoding::{capacity_hint, Reader};
use crate::transaction::{Error, TxVersion};

/// A JoinSplit description encoded with a PHGR13 proof (v2 and v3 transactions).
pub const JS_DESCRIPTION_PHGR_SIZE: u64 = 1802;
/// A JoinSplit description encoded with a Groth16 proof (v4 transactions).
pub const JS_DESCRIPTION_GROTH_SIZE: u64 = 1698;

const JOINSPLIT_PUBKEY_SIZE: u64 = 32;
const JOINSPLIT_SIG_SIZE: u64 = 64;

/// The public value fields of a JoinSplit description.
///
/// Commitments, nullifiers, ciphertexts and the proof are skipped during decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSplit {
    /// Value removed from the transparent pool.
    pub old: u64,
    /// Value returned to the transparent pool.
    pub new: u64,
}

pub(crate) fn descriptor_size(version: TxVersion) -> u64 {
    if version.sprout_uses_groth_proofs() {
        JS_DESCRIPTION_GROTH_SIZE
    } else {
        JS_DESCRIPTION_PHGR_SIZE
    }
}

/// Reads `vJoinSplit` along with the trailing `joinSplitPubKey` and `joinSplitSig`.
pub(crate) fn read_joinsplits(
    reader: &mut Reader<'_>,
    version: TxVersion,
) -> Result<Vec<JoinSplit>, Error> {
    let count = reader.read_compact_size("nJoinSplit")?;
    let size = descriptor_size(version);

    let mut joinsplits = Vec::with_capacity(capacity_hint(count, reader.remaining(), size));
    for _ in 0..count {
        let old = reader.read_u64_le("JSDescription::vpub_old")?;
        let new = reader.read_u64_le("JSDescription::vpub_new")?;
        reader.skip(size - 16, "JSDescription")?;
        joinsplits.push(JoinSplit { old, new });
    }

    if count > 0 {
        reader.skip(JOINSPLIT_PUBKEY_SIZE, "joinSplitPubKey")?;
        reader.skip(JOINSPLIT_SIG_SIZE, "joinSplitSig")?;
    }

    Ok(joinsplits)
}

/// The encoded size of the JoinSplit section, including its count prefix.
pub(crate) fn joinsplits_size(count: u64, version: TxVersion) -> u64 {
    let mut size = CompactSize::serialized_size(count as usize) as u64;
    if count > 0 {
        size = size
            .saturating_add(count.saturating_mul(descriptor_size(version)))
            .saturating_add(JOINSPLIT_PUBKEY_SIZE + JOINSPLIT_SIG_SIZE);
    }
    size
}
