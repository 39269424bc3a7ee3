//! Length arithmetic for the Sapling sections of v4 and v5 transactions.
//!
//! Spend and output descriptions are never parsed. The codec reads their counts, skips
//! their bytes, and keeps only what is needed to report balances and sizes.

use zcash_encoding::CompactSize;

use crate::encoding::Reader;
use crate::transaction::Error;

/// A v4 spend description: `cv`, `anchor`, `nullifier`, `rk`, `zkproof`, `spendAuthSig`.
pub const SPEND_V4_SIZE: u64 = 384;
/// A v4 output description: `cv`, `cmu`, `ephemeralKey`, ciphertexts and `zkproof`.
pub const OUTPUT_V4_SIZE: u64 = 948;
/// A v5 spend description without its proof and signature: `cv`, `nullifier`, `rk`.
pub const SPEND_V5_SIZE: u64 = 96;
/// A v5 output description without its proof.
pub const OUTPUT_V5_SIZE: u64 = 756;

pub const GROTH_PROOF_SIZE: u64 = 192;
pub const SPEND_AUTH_SIG_SIZE: u64 = 64;
pub const ANCHOR_SIZE: u64 = 32;
pub const BINDING_SIG_SIZE: u64 = 64;
const VALUE_BALANCE_SIZE: u64 = 8;

/// The parts of a Sapling bundle that survive decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaplingSummary {
    pub spend_count: u64,
    pub output_count: u64,
    /// The net value leaving the Sapling pool.
    pub value_balance: i64,
}

impl SaplingSummary {
    /// Returns `true` if there are no spend or output descriptions.
    pub fn has_no_descriptions(&self) -> bool {
        self.spend_count == 0 && self.output_count == 0
    }

    /// Returns `true` if this summary commits to nothing at all.
    pub fn is_empty(&self) -> bool {
        self.has_no_descriptions() && self.value_balance == 0
    }
}

/// Reads `valueBalanceSapling`, `vShieldedSpend` and `vShieldedOutput` of a v4
/// transaction. The binding signature follows the JoinSplits and is read separately.
pub(crate) fn read_v4_bundle(reader: &mut Reader<'_>) -> Result<SaplingSummary, Error> {
    let value_balance = reader.read_i64_le("valueBalanceSapling")?;
    let spend_count = reader.read_compact_size("nShieldedSpend")?;
    reader.skip_items(spend_count, SPEND_V4_SIZE, "vShieldedSpend")?;
    let output_count = reader.read_compact_size("nShieldedOutput")?;
    reader.skip_items(output_count, OUTPUT_V4_SIZE, "vShieldedOutput")?;

    Ok(SaplingSummary {
        spend_count,
        output_count,
        value_balance,
    })
}

/// Reads the Sapling part of a v5 transaction, including its binding signature.
pub(crate) fn read_v5_bundle(reader: &mut Reader<'_>) -> Result<SaplingSummary, Error> {
    let spend_count = reader.read_compact_size("nSpendsSapling")?;
    reader.skip_items(spend_count, SPEND_V5_SIZE, "vSpendsSapling")?;
    let output_count = reader.read_compact_size("nOutputsSapling")?;
    reader.skip_items(output_count, OUTPUT_V5_SIZE, "vOutputsSapling")?;

    let mut summary = SaplingSummary {
        spend_count,
        output_count,
        value_balance: 0,
    };
    if summary.has_no_descriptions() {
        return Ok(summary);
    }

    summary.value_balance = reader.read_i64_le("valueBalanceSapling")?;
    if spend_count > 0 {
        reader.skip(ANCHOR_SIZE, "anchorSapling")?;
        reader.skip_items(spend_count, GROTH_PROOF_SIZE, "vSpendProofsSapling")?;
        reader.skip_items(spend_count, SPEND_AUTH_SIG_SIZE, "vSpendAuthSigsSapling")?;
    }
    if output_count > 0 {
        reader.skip_items(output_count, GROTH_PROOF_SIZE, "vOutputProofsSapling")?;
    }
    read_binding_sig(reader, &summary)?;

    Ok(summary)
}

/// Skips `bindingSigSapling`, which is present only when there are descriptions.
pub(crate) fn read_binding_sig(
    reader: &mut Reader<'_>,
    summary: &SaplingSummary,
) -> Result<(), Error> {
    if summary.has_no_descriptions() {
        Ok(())
    } else {
        reader.skip(BINDING_SIG_SIZE, "bindingSigSapling")
    }
}

/// The encoded size of the v4 Sapling fields, including the binding signature.
pub(crate) fn v4_bundle_size(summary: &SaplingSummary) -> u64 {
    VALUE_BALANCE_SIZE
        .saturating_add(CompactSize::serialized_size(summary.spend_count as usize) as u64)
        .saturating_add(summary.spend_count.saturating_mul(SPEND_V4_SIZE))
        .saturating_add(CompactSize::serialized_size(summary.output_count as usize) as u64)
        .saturating_add(summary.output_count.saturating_mul(OUTPUT_V4_SIZE))
        .saturating_add(binding_sig_size(summary))
}

/// The encoded size of the v5 Sapling bundle.
pub(crate) fn v5_bundle_size(summary: &SaplingSummary) -> u64 {
    let counts = (CompactSize::serialized_size(summary.spend_count as usize)
        + CompactSize::serialized_size(summary.output_count as usize)) as u64;
    if summary.has_no_descriptions() {
        return counts;
    }

    let spends = summary.spend_count.saturating_mul(
        SPEND_V5_SIZE + GROTH_PROOF_SIZE + SPEND_AUTH_SIG_SIZE,
    );
    let outputs = summary
        .output_count
        .saturating_mul(OUTPUT_V5_SIZE + GROTH_PROOF_SIZE);
    let anchor = if summary.spend_count > 0 { ANCHOR_SIZE } else { 0 };

    counts
        .saturating_add(spends)
        .saturating_add(outputs)
        .saturating_add(VALUE_BALANCE_SIZE + anchor)
        .saturating_add(binding_sig_size(summary))
}

fn binding_sig_size(summary: &SaplingSummary) -> u64 {
    if summary.has_no_descriptions() {
        0
    } else {
        BINDING_SIG_SIZE
    }
}
