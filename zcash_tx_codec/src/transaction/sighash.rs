//! Signature hashes for transparent inputs.

use super::{
    components::Script,
    hasher::PersonalizedHasher,
    sighash_v4::{v4_signature_hash, ZCLASSIC_BRANCH_ID},
    sighash_v5::v5_signature_hash,
    Error, Transaction, TxVersion,
};

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_MASK: u8 = 0x1f;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// A [ZIP 244] sighash type.
///
/// [ZIP 244]: https://zips.z.cash/zip-0244#s-2a-hash-type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SighashType(u8);

impl SighashType {
    pub const ALL: Self = Self(SIGHASH_ALL);
    pub const NONE: Self = Self(SIGHASH_NONE);
    pub const SINGLE: Self = Self(SIGHASH_SINGLE);
    pub const ALL_ANYONECANPAY: Self = Self(SIGHASH_ALL | SIGHASH_ANYONECANPAY);
    pub const NONE_ANYONECANPAY: Self = Self(SIGHASH_NONE | SIGHASH_ANYONECANPAY);
    pub const SINGLE_ANYONECANPAY: Self = Self(SIGHASH_SINGLE | SIGHASH_ANYONECANPAY);

    /// Parses the given `hash_type` using the [ZIP 244] rules.
    ///
    /// [ZIP 244]: https://zips.z.cash/zip-0244#s-2a-hash-type
    pub fn parse(hash_type: u8) -> Option<Self> {
        match hash_type & !SIGHASH_ANYONECANPAY {
            SIGHASH_ALL | SIGHASH_NONE | SIGHASH_SINGLE => Some(Self(hash_type)),
            _ => None,
        }
    }

    /// Encodes this `SighashType` using the [ZIP 244] rules.
    ///
    /// [ZIP 244]: https://zips.z.cash/zip-0244#s-2a-hash-type
    pub fn encode(&self) -> u8 {
        // Correct by construction.
        self.0
    }

    pub fn is_anyone_can_pay(&self) -> bool {
        self.0 & SIGHASH_ANYONECANPAY != 0
    }

    pub fn is_none(&self) -> bool {
        self.0 & SIGHASH_MASK == SIGHASH_NONE
    }

    pub fn is_single(&self) -> bool {
        self.0 & SIGHASH_MASK == SIGHASH_SINGLE
    }
}

/// The transparent input being signed, along with the previous outputs spent by every
/// input of the transaction.
///
/// The codec has no view of the chain, so the values and scripts of the outputs being
/// spent must be supplied by the caller, one per input and in input order.
#[derive(Clone, Copy, Debug)]
pub struct TransparentInput<'a> {
    index: usize,
    hash_type: SighashType,
    prev_values: &'a [i64],
    prev_scripts: &'a [Script],
}

impl<'a> TransparentInput<'a> {
    /// Checks that `index` names an input of `tx` and that one previous output was
    /// supplied for each of its inputs.
    pub fn new(
        tx: &Transaction,
        index: usize,
        hash_type: SighashType,
        prev_values: &'a [i64],
        prev_scripts: &'a [Script],
    ) -> Result<Self, Error> {
        let input = TransparentInput {
            index,
            hash_type,
            prev_values,
            prev_scripts,
        };
        input.check(tx)?;
        Ok(input)
    }

    pub(crate) fn check(&self, tx: &Transaction) -> Result<(), Error> {
        let inputs = tx.vin.len();
        if self.index >= inputs {
            return Err(Error::InputIndexOutOfRange {
                index: self.index,
                inputs,
            });
        }
        if self.prev_values.len() != inputs || self.prev_scripts.len() != inputs {
            return Err(Error::MismatchedAuxData {
                inputs,
                values: self.prev_values.len(),
                scripts: self.prev_scripts.len(),
            });
        }
        Ok(())
    }

    /// The index of the transparent input being signed.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hash_type(&self) -> SighashType {
        self.hash_type
    }

    /// The script being validated by this input, i.e. the `scriptPubKey` of the output
    /// it spends.
    pub fn script_code(&self) -> &'a Script {
        &self.prev_scripts[self.index]
    }

    /// The value of the output being spent by this input.
    pub fn value(&self) -> i64 {
        self.prev_values[self.index]
    }

    pub fn prev_values(&self) -> &'a [i64] {
        self.prev_values
    }

    pub fn prev_scripts(&self) -> &'a [Script] {
        self.prev_scripts
    }
}

/// A signature hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureHash([u8; 32]);

impl AsRef<[u8; 32]> for SignatureHash {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<SignatureHash> for [u8; 32] {
    fn from(value: SignatureHash) -> Self {
        value.0
    }
}

impl SignatureHash {
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Self {
        SignatureHash(bytes)
    }
}

/// Computes the signature hash for a transparent input.
///
/// v3 and v4 transactions use the [ZIP 143]/[ZIP 243] digest under
/// [`ZCLASSIC_BRANCH_ID`]; use [`v4_signature_hash`] directly for another branch. v5
/// transactions use the [ZIP 244] digest under their own consensus branch id. Sprout
/// transactions have no supported signature digest.
///
/// [ZIP 143]: https://zips.z.cash/zip-0143
/// [ZIP 243]: https://zips.z.cash/zip-0243
/// [ZIP 244]: https://zips.z.cash/zip-0244
pub fn signature_hash<H: PersonalizedHasher + ?Sized>(
    tx: &Transaction,
    input: &TransparentInput<'_>,
    hasher: &H,
) -> Result<SignatureHash, Error> {
    match tx.version {
        TxVersion::Sprout => Err(Error::UnsupportedVersion(tx.version.number())),
        TxVersion::Overwinter | TxVersion::Sapling => {
            v4_signature_hash(tx, ZCLASSIC_BRANCH_ID, input, hasher)
        }
        TxVersion::Zip225 => v5_signature_hash(tx, input, hasher),
    }
}
