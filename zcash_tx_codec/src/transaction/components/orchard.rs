//! Length arithmetic for the Orchard bundle of v5 transactions.

use zcash_encoding::CompactSize;

use crate::encoding::Reader;
use crate::transaction::Error;

/// An action without its spend authorization signature: `cv`, `nullifier`, `rk`, `cmx`,
/// `ephemeralKey`, `encCiphertext` and `outCiphertext`.
pub const ACTION_SIZE: u64 = 820;
pub const SPEND_AUTH_SIG_SIZE: u64 = 64;
pub const BINDING_SIG_SIZE: u64 = 64;
pub const ANCHOR_SIZE: u64 = 32;
const FLAGS_SIZE: u64 = 1;
const VALUE_BALANCE_SIZE: u64 = 8;

/// The parts of an Orchard bundle that survive decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrchardSummary {
    pub action_count: u64,
    /// The net value leaving the Orchard pool.
    pub value_balance: i64,
    /// The length of the aggregated Halo 2 proof.
    pub proofs_size: u64,
}

impl OrchardSummary {
    /// Returns `true` if this summary commits to nothing at all.
    pub fn is_empty(&self) -> bool {
        self.action_count == 0 && self.value_balance == 0 && self.proofs_size == 0
    }
}

/// Reads the Orchard bundle of a v5 transaction.
pub(crate) fn read_v5_bundle(reader: &mut Reader<'_>) -> Result<OrchardSummary, Error> {
    let action_count = reader.read_compact_size("nActionsOrchard")?;
    if action_count == 0 {
        return Ok(OrchardSummary::default());
    }

    reader.skip_items(action_count, ACTION_SIZE, "vActionsOrchard")?;
    reader.skip(FLAGS_SIZE, "flagsOrchard")?;
    let value_balance = reader.read_i64_le("valueBalanceOrchard")?;
    reader.skip(ANCHOR_SIZE, "anchorOrchard")?;
    let proofs_size = reader.read_compact_size("sizeProofsOrchard")?;
    reader.skip(proofs_size, "proofsOrchard")?;
    reader.skip_items(action_count, SPEND_AUTH_SIG_SIZE, "vSpendAuthSigsOrchard")?;
    reader.skip(BINDING_SIG_SIZE, "bindingSigOrchard")?;

    Ok(OrchardSummary {
        action_count,
        value_balance,
        proofs_size,
    })
}

/// The encoded size of the Orchard bundle.
pub(crate) fn v5_bundle_size(summary: &OrchardSummary) -> u64 {
    let count = CompactSize::serialized_size(summary.action_count as usize) as u64;
    if summary.action_count == 0 {
        return count;
    }

    count
        .saturating_add(
            summary
                .action_count
                .saturating_mul(ACTION_SIZE + SPEND_AUTH_SIG_SIZE),
        )
        .saturating_add(FLAGS_SIZE + VALUE_BALANCE_SIZE + ANCHOR_SIZE + BINDING_SIG_SIZE)
        .saturating_add(CompactSize::serialized_size(summary.proofs_size as usize) as u64)
        .saturating_add(summary.proofs_size)
}
