//! Transaction sizes, and fees derived from them.

use zcash_encoding::CompactSize;

use super::{
    components::{orchard, sapling, sprout},
    ShieldedSummary, Transaction, TxVersion,
};

impl Transaction {
    /// Returns the length of this transaction's encoding.
    ///
    /// For decoded transactions this is the number of bytes that were consumed, including
    /// any shielded content that was skipped.
    pub fn serialized_size(&self) -> u64 {
        let mut size: u64 = 4;
        if self.version.has_overwinter() {
            size += 4;
        }
        // nConsensusBranchId for v5, then lock_time and nExpiryHeight.
        size += match self.version {
            TxVersion::Sprout => 4,
            TxVersion::Overwinter | TxVersion::Sapling => 8,
            TxVersion::Zip225 => 12,
        };

        size = size
            .saturating_add(CompactSize::serialized_size(self.vin.len()) as u64)
            .saturating_add(self.vin.iter().map(|i| i.serialized_size() as u64).sum())
            .saturating_add(CompactSize::serialized_size(self.vout.len()) as u64)
            .saturating_add(self.vout.iter().map(|o| o.serialized_size() as u64).sum());

        size.saturating_add(self.shielded_size())
    }

    fn shielded_size(&self) -> u64 {
        match self.version {
            TxVersion::Sprout | TxVersion::Overwinter | TxVersion::Sapling => {
                let joinsplits =
                    sprout::joinsplits_size(self.joinsplits().len() as u64, self.version);
                if self.version.has_sapling() {
                    sapling::v4_bundle_size(&self.shielded.sapling()).saturating_add(joinsplits)
                } else {
                    joinsplits
                }
            }
            TxVersion::Zip225 => match &self.shielded {
                ShieldedSummary::Nu5 { sapling, orchard } => sapling::v5_bundle_size(sapling)
                    .saturating_add(orchard::v5_bundle_size(orchard)),
                _ => 3,
            },
        }
    }
}

/// A fee rate in zatoshis per 1000 bytes of encoded transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeRate {
    zats_per_kilobyte: u64,
}

impl FeeRate {
    pub const fn per_kilobyte(zats_per_kilobyte: u64) -> Self {
        FeeRate { zats_per_kilobyte }
    }

    pub fn zats_per_kilobyte(&self) -> u64 {
        self.zats_per_kilobyte
    }

    /// The fee for `size` bytes, rounded up to the next zatoshi.
    pub fn fee_for_size(&self, size: u64) -> u64 {
        let fee = (u128::from(size) * u128::from(self.zats_per_kilobyte)).div_ceil(1000);
        u64::try_from(fee).unwrap_or(u64::MAX)
    }

    /// The fee for the encoding of `tx`.
    pub fn fee_for(&self, tx: &Transaction) -> u64 {
        self.fee_for_size(tx.serialized_size())
    }
}
