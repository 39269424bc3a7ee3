//! Structs representing the transparent components within Zcash transactions.

use std::fmt;
use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use zcash_encoding::{CompactSize, Vector};

use crate::encoding::Reader;
use crate::transaction::{Error, TxId};

/// A serialized script, used inside transparent inputs and outputs of a transaction.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Script(pub Vec<u8>);

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Script").field(&hex::encode(&self.0)).finish()
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Script {
    pub(crate) fn read(reader: &mut Reader<'_>, field: &'static str) -> Result<Self, Error> {
        reader.read_vector(field).map(Script)
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        Vector::write(&mut writer, &self.0, |w, e| w.write_u8(*e))
    }

    /// The length of this script once prefixed with its CompactSize length.
    pub fn serialized_size(&self) -> usize {
        CompactSize::serialized_size(self.0.len()) + self.0.len()
    }
}

/// A reference to a transparent output of a previous transaction.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutPoint {
    hash: TxId,
    n: u32,
}

impl OutPoint {
    pub const SIZE: usize = 36;

    /// Constructs an `OutPoint` for the output at index `n` in the transaction
    /// with txid `hash`.
    pub fn new(hash: [u8; 32], n: u32) -> Self {
        OutPoint {
            hash: TxId::from_bytes(hash),
            n,
        }
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, Error> {
        let hash = reader.read_array("TxIn::prevout_hash")?;
        let n = reader.read_u32_le("TxIn::prevout_index")?;
        Ok(OutPoint::new(hash, n))
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.hash.as_ref())?;
        writer.write_u32::<LittleEndian>(self.n)
    }

    /// Returns the output index of this `OutPoint`.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Returns the byte representation of the txid of the transaction containing this `OutPoint`.
    pub fn hash(&self) -> &[u8; 32] {
        self.hash.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, Error> {
        let prevout = OutPoint::read(reader)?;
        let script_sig = Script::read(reader, "TxIn::script_sig")?;
        let sequence = reader.read_u32_le("TxIn::sequence")?;

        Ok(TxIn {
            prevout,
            script_sig,
            sequence,
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.prevout.write(&mut writer)?;
        self.script_sig.write(&mut writer)?;
        writer.write_u32::<LittleEndian>(self.sequence)
    }

    pub fn serialized_size(&self) -> usize {
        OutPoint::SIZE + self.script_sig.serialized_size() + 4
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self, Error> {
        let value = reader.read_i64_le("TxOut::value")?;
        let script_pubkey = Script::read(reader, "TxOut::script_pubkey")?;

        Ok(TxOut {
            value,
            script_pubkey,
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_i64::<LittleEndian>(self.value)?;
        self.script_pubkey.write(&mut writer)
    }

    pub fn serialized_size(&self) -> usize {
        8 + self.script_pubkey.serialized_size()
    }
}

#[cfg(feature = "std")]
mod memuse_impls {
    use memuse::DynamicUsage;

    use super::{Script, TxIn, TxOut};

    impl DynamicUsage for Script {
        fn dynamic_usage(&self) -> usize {
            self.0.dynamic_usage()
        }

        fn dynamic_usage_bounds(&self) -> (usize, Option<usize>) {
            self.0.dynamic_usage_bounds()
        }
    }

    impl DynamicUsage for TxIn {
        fn dynamic_usage(&self) -> usize {
            self.script_sig.dynamic_usage()
        }

        fn dynamic_usage_bounds(&self) -> (usize, Option<usize>) {
            self.script_sig.dynamic_usage_bounds()
        }
    }

    impl DynamicUsage for TxOut {
        fn dynamic_usage(&self) -> usize {
            self.script_pubkey.dynamic_usage()
        }

        fn dynamic_usage_bounds(&self) -> (usize, Option<usize>) {
            self.script_pubkey.dynamic_usage_bounds()
        }
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::sample::select;

    use super::{OutPoint, Script, TxIn, TxOut};

    pub const VALID_OPCODES: [u8; 8] = [
        0x00, // OP_0,
        0x51, // OP_1,
        0x52, // OP_2,
        0x53, // OP_3,
        0xac, // OP_CHECKSIG,
        0x63, // OP_IF,
        0x65, // OP_VERIF,
        0x6a, // OP_RETURN,
    ];

    /// The maximum number of zatoshis, 21 million ZEC.
    pub const MAX_MONEY: i64 = 21_000_000 * 100_000_000;

    prop_compose! {
        pub fn arb_outpoint()(hash in prop::array::uniform32(0u8..), n in 0..100u32) -> OutPoint {
            OutPoint::new(hash, n)
        }
    }

    prop_compose! {
        pub fn arb_script()(v in vec(select(&VALID_OPCODES[..]), 0..300)) -> Script {
            Script(v)
        }
    }

    prop_compose! {
        pub fn arb_txin()(
            prevout in arb_outpoint(),
            script_sig in arb_script(),
            sequence in any::<u32>()
        ) -> TxIn {
            TxIn { prevout, script_sig, sequence }
        }
    }

    prop_compose! {
        pub fn arb_txout()(value in 0..=MAX_MONEY, script_pubkey in arb_script()) -> TxOut {
            TxOut { value, script_pubkey }
        }
    }
}
