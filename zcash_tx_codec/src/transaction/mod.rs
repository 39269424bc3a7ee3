//! Structs and methods for handling Zcash transactions.

use std::fmt;
use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use zcash_encoding::CompactSize;

use crate::encoding::{capacity_hint, Reader};

use self::components::{
    orchard, sapling, sprout, JoinSplit, OrchardSummary, SaplingSummary, TxIn, TxOut,
};

pub mod components;
mod error;
pub mod fees;
pub mod hasher;
pub mod sighash;
pub mod sighash_v4;
pub mod sighash_v5;
pub mod txid;

#[cfg(test)]
mod tests;

pub use self::error::Error;

pub const OVERWINTER_VERSION_GROUP_ID: u32 = 0x03C48270;
pub const OVERWINTER_TX_VERSION: u32 = 3;
pub const SAPLING_VERSION_GROUP_ID: u32 = 0x892F2085;
pub const SAPLING_TX_VERSION: u32 = 4;
pub const V5_VERSION_GROUP_ID: u32 = 0x26A7270A;
pub const V5_TX_VERSION: u32 = 5;

const SPROUT_TX_VERSION: u32 = 2;
const OVERWINTERED_FLAG: u32 = 1 << 31;

// The smallest possible encodings, used to bound preallocation while decoding.
const MIN_TXIN_SIZE: u64 = 41;
const MIN_TXOUT_SIZE: u64 = 9;

/// The identifier for a transaction.
///
/// - For v2-4 transactions, this is a double-SHA-256 hash of the encoded transaction.
/// - For v5 transactions, this is the [ZIP 244] digest of the transaction's effecting
///   data.
///
/// [ZIP 244]: https://zips.z.cash/zip-0244
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct TxId([u8; 32]);

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The (byte-flipped) hex string is more useful than the raw bytes, because we can
        // look that up in RPC methods and block explorers.
        let txid_str = self.to_string();
        f.debug_tuple("TxId").field(&txid_str).finish()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = self.0;
        data.reverse();
        formatter.write_str(&hex::encode(data))
    }
}

impl AsRef<[u8; 32]> for TxId {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<TxId> for [u8; 32] {
    fn from(value: TxId) -> Self {
        value.0
    }
}

impl TxId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }
}

/// The set of supported transaction format versions.
///
/// This is serialized in the first four bytes of the transaction format, with the
/// overwintered flag set in the high bit for every version after Sprout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxVersion {
    /// Version 2, with JoinSplits using PHGR13 proofs.
    Sprout,
    /// Version 3.
    Overwinter,
    /// Version 4.
    Sapling,
    /// Version 5, as defined in [ZIP 225].
    ///
    /// [ZIP 225]: https://zips.z.cash/zip-0225
    Zip225,
}

impl TxVersion {
    /// Parses the transaction header.
    pub fn from_header(header: u32) -> Result<Self, Error> {
        let overwintered = header & OVERWINTERED_FLAG != 0;
        match (overwintered, header & !OVERWINTERED_FLAG) {
            (false, SPROUT_TX_VERSION) => Ok(TxVersion::Sprout),
            (true, OVERWINTER_TX_VERSION) => Ok(TxVersion::Overwinter),
            (true, SAPLING_TX_VERSION) => Ok(TxVersion::Sapling),
            (true, V5_TX_VERSION) => Ok(TxVersion::Zip225),
            _ => Err(Error::UnsupportedVersion(header)),
        }
    }

    /// The logical version number.
    pub fn number(&self) -> u32 {
        match self {
            TxVersion::Sprout => SPROUT_TX_VERSION,
            TxVersion::Overwinter => OVERWINTER_TX_VERSION,
            TxVersion::Sapling => SAPLING_TX_VERSION,
            TxVersion::Zip225 => V5_TX_VERSION,
        }
    }

    pub fn header(&self) -> u32 {
        // After Sprout, the overwintered bit is always set.
        if self.has_overwinter() {
            OVERWINTERED_FLAG | self.number()
        } else {
            self.number()
        }
    }

    /// The version group id defined for this version, or zero for Sprout.
    pub fn version_group_id(&self) -> u32 {
        match self {
            TxVersion::Sprout => 0,
            TxVersion::Overwinter => OVERWINTER_VERSION_GROUP_ID,
            TxVersion::Sapling => SAPLING_VERSION_GROUP_ID,
            TxVersion::Zip225 => V5_VERSION_GROUP_ID,
        }
    }

    pub fn has_overwinter(&self) -> bool {
        !matches!(self, TxVersion::Sprout)
    }

    pub fn has_sprout(&self) -> bool {
        !matches!(self, TxVersion::Zip225)
    }

    pub fn sprout_uses_groth_proofs(&self) -> bool {
        matches!(self, TxVersion::Sapling)
    }

    pub fn has_sapling(&self) -> bool {
        matches!(self, TxVersion::Sapling | TxVersion::Zip225)
    }

    pub fn has_orchard(&self) -> bool {
        matches!(self, TxVersion::Zip225)
    }
}

/// What the codec retains of a transaction's shielded components.
///
/// Shielded content is skipped during decoding; only counts, public values and lengths
/// are kept. A transaction whose summary records any skipped content cannot be
/// re-encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ShieldedSummary {
    /// The transaction has no shielded components.
    #[default]
    None,
    /// Sapling and Sprout fields of a v2, v3 or v4 transaction.
    PreNu5 {
        sapling: SaplingSummary,
        joinsplits: Vec<JoinSplit>,
    },
    /// Sapling and Orchard bundles of a v5 transaction.
    Nu5 {
        sapling: SaplingSummary,
        orchard: OrchardSummary,
    },
}

impl ShieldedSummary {
    pub fn is_empty(&self) -> bool {
        match self {
            ShieldedSummary::None => true,
            ShieldedSummary::PreNu5 {
                sapling,
                joinsplits,
            } => sapling.is_empty() && joinsplits.is_empty(),
            ShieldedSummary::Nu5 { sapling, orchard } => sapling.is_empty() && orchard.is_empty(),
        }
    }

    pub fn sapling(&self) -> SaplingSummary {
        match self {
            ShieldedSummary::None => SaplingSummary::default(),
            ShieldedSummary::PreNu5 { sapling, .. } | ShieldedSummary::Nu5 { sapling, .. } => {
                *sapling
            }
        }
    }

    pub fn orchard(&self) -> OrchardSummary {
        match self {
            ShieldedSummary::Nu5 { orchard, .. } => *orchard,
            _ => OrchardSummary::default(),
        }
    }

    pub fn joinsplits(&self) -> &[JoinSplit] {
        match self {
            ShieldedSummary::PreNu5 { joinsplits, .. } => joinsplits,
            _ => &[],
        }
    }
}

/// A Zcash transaction.
///
/// The transparent fields are held in full. Fields that a version does not encode are
/// zero: `version_group_id` for v2, `consensus_branch_id` before v5, and `expiry_height`
/// for v2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: TxVersion,
    pub version_group_id: u32,
    /// The consensus branch this transaction was built for. Only v5 encodes it.
    pub consensus_branch_id: u32,
    pub lock_time: u32,
    pub expiry_height: u32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub shielded: ShieldedSummary,
}

impl Transaction {
    /// Creates an empty transaction of the given version, using that version's group id.
    pub fn new(version: TxVersion) -> Self {
        Transaction {
            version,
            version_group_id: version.version_group_id(),
            consensus_branch_id: 0,
            lock_time: 0,
            expiry_height: 0,
            vin: vec![],
            vout: vec![],
            shielded: ShieldedSummary::None,
        }
    }

    pub fn sapling_spend_count(&self) -> u64 {
        self.shielded.sapling().spend_count
    }

    pub fn sapling_output_count(&self) -> u64 {
        self.shielded.sapling().output_count
    }

    pub fn sapling_value_balance(&self) -> i64 {
        self.shielded.sapling().value_balance
    }

    pub fn orchard_action_count(&self) -> u64 {
        self.shielded.orchard().action_count
    }

    pub fn orchard_value_balance(&self) -> i64 {
        self.shielded.orchard().value_balance
    }

    pub fn orchard_proofs_size(&self) -> u64 {
        self.shielded.orchard().proofs_size
    }

    pub fn joinsplits(&self) -> &[JoinSplit] {
        self.shielded.joinsplits()
    }

    /// Returns `true` if no shielded content was discarded while decoding this
    /// transaction.
    pub fn is_reencodable(&self) -> bool {
        match &self.shielded {
            ShieldedSummary::None => true,
            ShieldedSummary::PreNu5 {
                sapling,
                joinsplits,
            } => {
                joinsplits.is_empty()
                    && sapling.has_no_descriptions()
                    && (self.version == TxVersion::Sapling || sapling.value_balance == 0)
            }
            ShieldedSummary::Nu5 { .. } => self.shielded.is_empty(),
        }
    }

    /// Decodes a transaction, requiring that `data` contains nothing else.
    pub fn read(data: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(data);
        let tx = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    pub(crate) fn read_from(reader: &mut Reader<'_>) -> Result<Self, Error> {
        let header = reader.read_u32_le("header")?;
        let version = TxVersion::from_header(header)?;
        let version_group_id = if version.has_overwinter() {
            reader.read_u32_le("nVersionGroupId")?
        } else {
            0
        };

        let mut consensus_branch_id = 0;
        let mut lock_time = 0;
        let mut expiry_height = 0;
        if version == TxVersion::Zip225 {
            consensus_branch_id = reader.read_u32_le("nConsensusBranchId")?;
            lock_time = reader.read_u32_le("lock_time")?;
            expiry_height = reader.read_u32_le("nExpiryHeight")?;
        }

        let (vin, vout) = Self::read_transparent(reader)?;

        if version != TxVersion::Zip225 {
            lock_time = reader.read_u32_le("lock_time")?;
            if version.has_overwinter() {
                expiry_height = reader.read_u32_le("nExpiryHeight")?;
            }
        }

        let shielded = match version {
            TxVersion::Sprout | TxVersion::Overwinter | TxVersion::Sapling => {
                let sapling = if version.has_sapling() {
                    sapling::read_v4_bundle(reader)?
                } else {
                    SaplingSummary::default()
                };
                let joinsplits = sprout::read_joinsplits(reader, version)?;
                sapling::read_binding_sig(reader, &sapling)?;
                ShieldedSummary::PreNu5 {
                    sapling,
                    joinsplits,
                }
            }
            TxVersion::Zip225 => {
                let sapling = sapling::read_v5_bundle(reader)?;
                let orchard = orchard::read_v5_bundle(reader)?;
                ShieldedSummary::Nu5 { sapling, orchard }
            }
        };
        let shielded = if shielded.is_empty() {
            ShieldedSummary::None
        } else {
            shielded
        };

        tracing::debug!(
            version = version.number(),
            inputs = vin.len(),
            outputs = vout.len(),
            shielded = ?shielded,
            "decoded transaction"
        );

        Ok(Transaction {
            version,
            version_group_id,
            consensus_branch_id,
            lock_time,
            expiry_height,
            vin,
            vout,
            shielded,
        })
    }

    fn read_transparent(reader: &mut Reader<'_>) -> Result<(Vec<TxIn>, Vec<TxOut>), Error> {
        let count = reader.read_compact_size("tx_in_count")?;
        let mut vin = Vec::with_capacity(capacity_hint(count, reader.remaining(), MIN_TXIN_SIZE));
        for _ in 0..count {
            vin.push(TxIn::read(reader)?);
        }

        let count = reader.read_compact_size("tx_out_count")?;
        let mut vout =
            Vec::with_capacity(capacity_hint(count, reader.remaining(), MIN_TXOUT_SIZE));
        for _ in 0..count {
            vout.push(TxOut::read(reader)?);
        }

        Ok((vin, vout))
    }

    /// Checks that decoding this transaction's encoding would reproduce it exactly.
    ///
    /// Fails with [`Error::UnsupportedReencode`] if shielded content was discarded when
    /// this transaction was decoded, and with [`Error::UnencodableField`] if a field holds
    /// a value that its version does not encode.
    pub fn check_encodable(&self) -> Result<(), Error> {
        if !self.is_reencodable() {
            return Err(Error::UnsupportedReencode);
        }

        let unencodable = |field| Err(Error::UnencodableField { field });
        if !self.version.has_overwinter() {
            if self.version_group_id != 0 {
                return unencodable("nVersionGroupId");
            }
            if self.expiry_height != 0 {
                return unencodable("nExpiryHeight");
            }
        }
        if self.version != TxVersion::Zip225 && self.consensus_branch_id != 0 {
            return unencodable("nConsensusBranchId");
        }

        // Decoding yields `None` for a transaction without shielded fields.
        if self.shielded != ShieldedSummary::None && self.shielded.is_empty() {
            return unencodable("shielded");
        }
        Ok(())
    }

    /// Encodes this transaction.
    ///
    /// Fails if [`Transaction::check_encodable`] does.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        if let Err(e) = self.check_encodable() {
            tracing::debug!(
                version = self.version.number(),
                error = %e,
                "refusing to encode transaction"
            );
            return Err(e);
        }
        let mut data = Vec::with_capacity(self.serialized_size() as usize);
        self.write(&mut data)
            .expect("writing to a Vec cannot fail once the transaction is encodable");
        Ok(data)
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.check_encodable()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        writer.write_u32::<LittleEndian>(self.version.header())?;
        if self.version.has_overwinter() {
            writer.write_u32::<LittleEndian>(self.version_group_id)?;
        }

        if self.version == TxVersion::Zip225 {
            writer.write_u32::<LittleEndian>(self.consensus_branch_id)?;
            writer.write_u32::<LittleEndian>(self.lock_time)?;
            writer.write_u32::<LittleEndian>(self.expiry_height)?;
        }

        self.write_transparent(&mut writer)?;

        if self.version != TxVersion::Zip225 {
            writer.write_u32::<LittleEndian>(self.lock_time)?;
            if self.version.has_overwinter() {
                writer.write_u32::<LittleEndian>(self.expiry_height)?;
            }
        }

        match self.version {
            TxVersion::Sprout | TxVersion::Overwinter | TxVersion::Sapling => {
                if self.version.has_sapling() {
                    writer.write_i64::<LittleEndian>(self.sapling_value_balance())?;
                    CompactSize::write(&mut writer, 0)?;
                    CompactSize::write(&mut writer, 0)?;
                }
                CompactSize::write(&mut writer, 0)?;
            }
            TxVersion::Zip225 => {
                CompactSize::write(&mut writer, 0)?;
                CompactSize::write(&mut writer, 0)?;
                CompactSize::write(&mut writer, 0)?;
            }
        }

        Ok(())
    }

    pub fn write_transparent<W: Write>(&self, mut writer: W) -> io::Result<()> {
        CompactSize::write(&mut writer, self.vin.len())?;
        for txin in &self.vin {
            txin.write(&mut writer)?;
        }
        CompactSize::write(&mut writer, self.vout.len())?;
        for txout in &self.vout {
            txout.write(&mut writer)?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
mod memuse_impls {
    use memuse::DynamicUsage;

    use super::{JoinSplit, Transaction};

    impl DynamicUsage for Transaction {
        fn dynamic_usage(&self) -> usize {
            self.vin.dynamic_usage()
                + self.vout.dynamic_usage()
                + self.joinsplits().len() * std::mem::size_of::<JoinSplit>()
        }

        fn dynamic_usage_bounds(&self) -> (usize, Option<usize>) {
            let usage = self.dynamic_usage();
            (usage, Some(usage))
        }
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::sample::select;

    use super::{
        components::{
            transparent::testing::{arb_txin, arb_txout, MAX_MONEY},
            OrchardSummary, SaplingSummary,
        },
        ShieldedSummary, Transaction, TxVersion,
    };

    pub fn arb_tx_version() -> impl Strategy<Value = TxVersion> {
        select(vec![
            TxVersion::Sprout,
            TxVersion::Overwinter,
            TxVersion::Sapling,
            TxVersion::Zip225,
        ])
    }

    prop_compose! {
        /// Generates transparent-only transactions of the given version.
        ///
        /// v4 transactions may carry a Sapling value balance without any descriptions,
        /// which their encoding preserves.
        pub fn arb_transparent_tx_for_version(version: TxVersion)(
            consensus_branch_id in any::<u32>(),
            lock_time in any::<u32>(),
            expiry_height in any::<u32>(),
            vin in vec(arb_txin(), 0..10),
            vout in vec(arb_txout(), 0..10),
            value_balance in prop_oneof![Just(0i64), -MAX_MONEY..=MAX_MONEY],
        ) -> Transaction {
            let v5 = version == TxVersion::Zip225;
            let shielded = if version == TxVersion::Sapling && value_balance != 0 {
                ShieldedSummary::PreNu5 {
                    sapling: SaplingSummary {
                        value_balance,
                        ..SaplingSummary::default()
                    },
                    joinsplits: vec![],
                }
            } else {
                ShieldedSummary::None
            };
            Transaction {
                version,
                version_group_id: version.version_group_id(),
                consensus_branch_id: if v5 { consensus_branch_id } else { 0 },
                lock_time,
                expiry_height: if version.has_overwinter() { expiry_height } else { 0 },
                vin,
                vout,
                shielded,
            }
        }
    }

    /// Generates transparent-only transactions of any supported version.
    pub fn arb_transparent_tx() -> impl Strategy<Value = Transaction> {
        arb_tx_version().prop_flat_map(arb_transparent_tx_for_version)
    }

    fn arb_empty_summary() -> impl Strategy<Value = ShieldedSummary> {
        prop_oneof![
            Just(ShieldedSummary::None),
            Just(ShieldedSummary::PreNu5 {
                sapling: SaplingSummary::default(),
                joinsplits: vec![],
            }),
            Just(ShieldedSummary::Nu5 {
                sapling: SaplingSummary::default(),
                orchard: OrchardSummary::default(),
            }),
        ]
    }

    prop_compose! {
        /// Generates transparent-only transactions whose header fields and shielded
        /// summary may hold values that their version does not encode.
        pub fn arb_unchecked_tx()(
            tx in arb_transparent_tx(),
            version_group_id in prop::option::of(any::<u32>()),
            consensus_branch_id in prop::option::of(any::<u32>()),
            expiry_height in prop::option::of(any::<u32>()),
            shielded in prop::option::of(arb_empty_summary()),
        ) -> Transaction {
            let mut tx = tx;
            if let Some(version_group_id) = version_group_id {
                tx.version_group_id = version_group_id;
            }
            if let Some(consensus_branch_id) = consensus_branch_id {
                tx.consensus_branch_id = consensus_branch_id;
            }
            if let Some(expiry_height) = expiry_height {
                tx.expiry_height = expiry_height;
            }
            if let Some(shielded) = shielded {
                tx.shielded = shielded;
            }
            tx
        }
    }
}
