use assert_matches::assert_matches;
use proptest::prelude::*;

use super::{
    components::{
        transparent::testing::arb_txin, JoinSplit, OrchardSummary, SaplingSummary, Script,
    },
    hasher::Blake2b256,
    sighash::{SighashType, TransparentInput},
    sighash_v4::v4_signature_hash,
    testing::{arb_transparent_tx, arb_unchecked_tx},
    txid::legacy_txid,
    Error, ShieldedSummary, Transaction, TxVersion, V5_VERSION_GROUP_ID,
};
use crate::{decode, decode_with_txid, encode, serialized_size, sighash, tx_hash};


fn fixture(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).unwrap()
}

proptest! {
    #[test]
    fn tx_read_write(tx in arb_transparent_tx()) {
        let encoded = encode(&tx).unwrap();
        prop_assert_eq!(serialized_size(&tx), encoded.len() as u64);

        let decoded = decode(&encoded).unwrap();
        prop_assert_eq!(&decoded, &tx);
        prop_assert_eq!(encode(&decoded).unwrap(), encoded);
    }

    #[test]
    fn encodable_transactions_roundtrip(tx in arb_unchecked_tx()) {
        match encode(&tx) {
            Ok(encoded) => {
                prop_assert_eq!(decode(&encoded).unwrap(), tx);
            }
            Err(e) => {
                prop_assert!(matches!(e, Error::UnencodableField { .. }), "{}", e);
            }
        }
    }

    #[test]
    fn txid_is_deterministic(tx in arb_transparent_tx()) {
        prop_assert_eq!(tx_hash(&tx).unwrap(), tx_hash(&tx.clone()).unwrap());
    }

    #[test]
    fn anyonecanpay_ignores_other_inputs(other in arb_txin(), other_value in 0..1_000_000i64) {
        let mut tx = decode(&fixture(data::V5_TX)).unwrap();
        tx.vin.push(other);
        let prev_values = [data::V5_PREV_VALUE, other_value];
        let prev_scripts = [data::p2pkh(0x22), Script(vec![0x51])];

        let acp = sighash(&tx, 0, SighashType::ALL_ANYONECANPAY, &prev_values, &prev_scripts)
            .unwrap();
        prop_assert_eq!(hex::encode(acp), data::V5_SIGHASH_ALL_ANYONECANPAY);

        let all = sighash(&tx, 0, SighashType::ALL, &prev_values, &prev_scripts).unwrap();
        prop_assert_ne!(hex::encode(all), data::V5_SIGHASH_ALL);
    }
}

#[test]
fn v5_transparent_fixture() {
    let data = fixture(data::V5_TX);
    let tx = decode(&data).unwrap();

    assert_eq!(tx.version, TxVersion::Zip225);
    assert_eq!(tx.version_group_id, V5_VERSION_GROUP_ID);
    assert_eq!(tx.consensus_branch_id, data::V5_BRANCH_ID);
    assert_eq!(tx.lock_time, 0);
    assert_eq!(tx.expiry_height, 2_000_000);
    assert_eq!(tx.vin.len(), 1);
    assert_eq!(tx.vout.len(), 1);
    assert_eq!(tx.vin[0].prevout.n(), 1);
    assert_eq!(tx.vin[0].sequence, 0xffff_fffe);
    assert_eq!(tx.vout[0].value, 100_000);
    assert_eq!(tx.vout[0].script_pubkey, data::p2pkh(0x11));
    assert_eq!(tx.shielded, ShieldedSummary::None);

    assert_eq!(hex::encode(tx_hash(&tx).unwrap()), data::V5_TXID);
    assert_eq!(tx.txid().unwrap().to_string(), data::V5_TXID_DISPLAY);
    assert_eq!(encode(&tx).unwrap(), data);
    assert_eq!(serialized_size(&tx), data.len() as u64);

    let (decoded, txid) = decode_with_txid(&data).unwrap();
    assert_eq!(decoded, tx);
    assert_eq!(txid.to_string(), data::V5_TXID_DISPLAY);
}

#[test]
fn v5_sighash_vectors() {
    let tx = decode(&fixture(data::V5_TX)).unwrap();
    let prev_values = [data::V5_PREV_VALUE];
    let prev_scripts = [data::p2pkh(0x22)];

    for (hash_type, expected) in [
        (SighashType::ALL, data::V5_SIGHASH_ALL),
        (SighashType::NONE, data::V5_SIGHASH_NONE),
        (SighashType::SINGLE, data::V5_SIGHASH_SINGLE),
        (
            SighashType::ALL_ANYONECANPAY,
            data::V5_SIGHASH_ALL_ANYONECANPAY,
        ),
    ] {
        let digest = sighash(&tx, 0, hash_type, &prev_values, &prev_scripts).unwrap();
        assert_eq!(hex::encode(digest), expected);
        // Digests are pure functions of their inputs.
        assert_eq!(
            sighash(&tx, 0, hash_type, &prev_values, &prev_scripts).unwrap(),
            digest
        );
    }
}

#[test]
fn v4_transparent_fixture() {
    let data = fixture(data::V4_TX);
    let (tx, txid) = decode_with_txid(&data).unwrap();

    assert_eq!(tx.version, TxVersion::Sapling);
    assert_eq!(tx.lock_time, 500);
    assert_eq!(tx.expiry_height, 1000);
    assert_eq!(tx.vin.len(), 2);
    assert_eq!(tx.vout.len(), 2);
    assert_eq!(tx.vin[1].script_sig, Script(vec![0x51]));
    assert_eq!(tx.vout[1].value, 25_000);

    assert_eq!(hex::encode(txid.as_ref()), data::V4_TXID);
    assert_eq!(txid.to_string(), data::V4_TXID_DISPLAY);
    assert_eq!(hex::encode(tx_hash(&tx).unwrap()), data::V4_TXID);
    assert_eq!(encode(&tx).unwrap(), data);
}

#[test]
fn v4_sighash_vectors() {
    let tx = decode(&fixture(data::V4_TX)).unwrap();
    let prev_scripts = data::legacy_prev_scripts();

    let all = sighash(
        &tx,
        1,
        SighashType::ALL,
        &data::LEGACY_PREV_VALUES,
        &prev_scripts,
    )
    .unwrap();
    assert_eq!(hex::encode(all), data::V4_SIGHASH_ALL_INPUT_1);

    let single_acp = sighash(
        &tx,
        0,
        SighashType::SINGLE_ANYONECANPAY,
        &data::LEGACY_PREV_VALUES,
        &prev_scripts,
    )
    .unwrap();
    assert_eq!(
        hex::encode(single_acp),
        data::V4_SIGHASH_SINGLE_ANYONECANPAY_INPUT_0
    );

    let input = TransparentInput::new(
        &tx,
        1,
        SighashType::ALL,
        &data::LEGACY_PREV_VALUES,
        &prev_scripts,
    )
    .unwrap();
    let nu5_branch = v4_signature_hash(&tx, data::V5_BRANCH_ID, &input, &Blake2b256).unwrap();
    assert_eq!(
        hex::encode(nu5_branch.as_ref()),
        data::V4_SIGHASH_ALL_INPUT_1_NU5_BRANCH
    );
}

#[test]
fn v3_sighash_vector() {
    let data = fixture(data::V3_TX);
    let tx = decode(&data).unwrap();
    assert_eq!(tx.version, TxVersion::Overwinter);
    assert_eq!(encode(&tx).unwrap(), data);

    let digest = sighash(
        &tx,
        0,
        SighashType::NONE,
        &data::LEGACY_PREV_VALUES,
        &data::legacy_prev_scripts(),
    )
    .unwrap();
    assert_eq!(hex::encode(digest), data::V3_SIGHASH_NONE_INPUT_0);
}

#[test]
fn sprout_has_no_sighash() {
    let mut tx = decode(&fixture(data::V3_TX)).unwrap();
    tx.version = TxVersion::Sprout;
    tx.version_group_id = 0;
    tx.expiry_height = 0;

    assert_matches!(
        sighash(
            &tx,
            0,
            SighashType::ALL,
            &data::LEGACY_PREV_VALUES,
            &data::legacy_prev_scripts()
        ),
        Err(Error::UnsupportedVersion(2))
    );
}

#[test]
fn sighash_rejects_bad_signing_context() {
    let tx = decode(&fixture(data::V5_TX)).unwrap();
    let prev_scripts = [data::p2pkh(0x22)];

    assert_matches!(
        sighash(&tx, 1, SighashType::ALL, &[data::V5_PREV_VALUE], &prev_scripts),
        Err(Error::InputIndexOutOfRange {
            index: 1,
            inputs: 1
        })
    );
    assert_matches!(
        sighash(&tx, 0, SighashType::ALL, &[], &prev_scripts),
        Err(Error::MismatchedAuxData {
            inputs: 1,
            values: 0,
            scripts: 1
        })
    );
}

#[test]
fn v4_shielded_fixture() {
    let data = data::v4_shielded_tx();
    let tx = decode(&data).unwrap();

    assert_eq!(tx.vin.len(), 0);
    assert_eq!(tx.vout.len(), 1);
    assert_eq!(tx.lock_time, 500);
    assert_eq!(tx.expiry_height, 1000);
    assert_eq!(tx.sapling_spend_count(), 1);
    assert_eq!(tx.sapling_output_count(), 1);
    assert_eq!(tx.sapling_value_balance(), -42);
    assert_eq!(tx.joinsplits(), &[JoinSplit { old: 5, new: 7 }]);
    assert_eq!(serialized_size(&tx), data.len() as u64);

    assert!(!tx.is_reencodable());
    assert_matches!(encode(&tx), Err(Error::UnsupportedReencode));
    assert_matches!(tx_hash(&tx), Err(Error::UnsupportedReencode));

    // The legacy id is taken over the input, so it survives the discarded content.
    let (_, txid) = decode_with_txid(&data).unwrap();
    assert_eq!(txid, legacy_txid(&data));

    assert_matches!(
        decode(&data[..data.len() - 1]),
        Err(Error::UnexpectedEof {
            field: "bindingSigSapling"
        })
    );
}

#[test]
fn shielded_transactions_cannot_be_signed() {
    let mut tx = decode(&data::v4_shielded_tx()).unwrap();
    tx.vin = decode(&fixture(data::V4_TX)).unwrap().vin;

    assert_matches!(
        sighash(
            &tx,
            0,
            SighashType::ALL,
            &data::LEGACY_PREV_VALUES,
            &data::legacy_prev_scripts()
        ),
        Err(Error::UnsupportedReencode)
    );
}

#[test]
fn v5_orchard_fixture() {
    let data = data::v5_orchard_tx();
    let tx = decode(&data).unwrap();

    assert_eq!(tx.sapling_spend_count(), 0);
    assert_eq!(tx.sapling_output_count(), 0);
    assert_eq!(tx.orchard_action_count(), 2);
    assert_eq!(tx.orchard_value_balance(), -10_000);
    assert_eq!(tx.orchard_proofs_size(), 10);
    assert_eq!(serialized_size(&tx), data.len() as u64);

    assert_matches!(encode(&tx), Err(Error::UnsupportedReencode));
    assert_matches!(tx_hash(&tx), Err(Error::UnsupportedReencode));
    assert_matches!(decode_with_txid(&data), Err(Error::UnsupportedReencode));
}

#[test]
fn v5_sapling_fixture() {
    for (spends, outputs) in [(1u8, 2u8), (2, 0), (0, 3)] {
        let data = data::v5_sapling_tx(spends, outputs);
        let tx = decode(&data).unwrap();

        assert_eq!(tx.vout.len(), 1);
        assert_eq!(tx.sapling_spend_count(), u64::from(spends));
        assert_eq!(tx.sapling_output_count(), u64::from(outputs));
        assert_eq!(tx.sapling_value_balance(), -7);
        assert_eq!(tx.orchard_action_count(), 0);
        assert_eq!(serialized_size(&tx), data.len() as u64);

        assert_matches!(encode(&tx), Err(Error::UnsupportedReencode));
        assert_matches!(tx_hash(&tx), Err(Error::UnsupportedReencode));

        // The last byte is nActionsOrchard, preceded by the binding signature.
        assert_matches!(
            decode(&data[..data.len() - 2]),
            Err(Error::UnexpectedEof {
                field: "bindingSigSapling"
            })
        );
    }

    // Without outputs, the spend authorization signatures precede the binding signature.
    let data = data::v5_sapling_tx(2, 0);
    assert_matches!(
        decode(&data[..data.len() - 1 - 64 - 1]),
        Err(Error::UnexpectedEof {
            field: "vSpendAuthSigsSapling"
        })
    );
    // Spends require an anchor.
    let anchor_end = 56 + 1 + 2 * 96 + 1 + 8 + 32;
    assert_matches!(
        decode(&data[..anchor_end - 1]),
        Err(Error::UnexpectedEof {
            field: "anchorSapling"
        })
    );
    assert_matches!(
        decode(&data[..anchor_end]),
        Err(Error::UnexpectedEof {
            field: "vSpendProofsSapling"
        })
    );
}

#[test]
fn sprout_joinsplits_use_phgr_descriptions() {
    let mut data = vec![];
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&[0, 0]);
    data.extend_from_slice(&0u32.to_le_bytes());
    data.push(1);
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&9u64.to_le_bytes());
    data.extend_from_slice(&[0; 1802 - 16]);
    data.extend_from_slice(&[0; 32 + 64]);

    let tx = decode(&data).unwrap();
    assert_eq!(tx.version, TxVersion::Sprout);
    assert_eq!(tx.joinsplits(), &[JoinSplit { old: 0, new: 9 }]);
    assert_eq!(serialized_size(&tx), data.len() as u64);
}

#[test]
fn unsupported_versions() {
    for header in [0x8000_0006u32, 1, 0x8000_0002, 4, 5] {
        let mut data = fixture(data::V5_TX);
        data[..4].copy_from_slice(&header.to_le_bytes());
        assert_matches!(decode(&data), Err(Error::UnsupportedVersion(h)) if h == header);
    }
}

#[test]
fn trailing_data_is_rejected() {
    let mut data = fixture(data::V5_TX);
    data.extend_from_slice(&[0; 10]);
    assert_matches!(decode(&data), Err(Error::TrailingData { remaining: 10 }));
    assert_matches!(
        decode_with_txid(&data),
        Err(Error::TrailingData { remaining: 10 })
    );
}

#[test]
fn truncation_names_the_field() {
    let data = fixture(data::V5_TX);
    for (len, field) in [
        (0, "header"),
        (6, "nVersionGroupId"),
        (18, "nExpiryHeight"),
        (20, "tx_in_count"),
        (30, "TxIn::prevout_hash"),
        (60, "TxIn::script_sig"),
        (data.len() - 1, "nActionsOrchard"),
    ] {
        assert_matches!(
            decode(&data[..len]),
            Err(Error::UnexpectedEof { field: f }) if f == field
        );
    }
}

#[test]
fn malformed_counts_are_rejected() {
    let mut data = fixture(data::V5_TX);
    // A non-canonical encoding of a single input.
    data.splice(20..21, [0xfd, 0x01, 0x00]);
    assert_matches!(
        decode(&data),
        Err(Error::MalformedLength {
            field: "tx_in_count"
        })
    );

    // The largest permitted count of spends does not fit in the remaining input.
    let mut data = fixture(data::V4_TX);
    let sapling_counts = data.len() - 3;
    data.splice(sapling_counts..sapling_counts + 1, [0xfe, 0x00, 0x00, 0x00, 0x02]);
    assert_matches!(
        decode(&data),
        Err(Error::UnexpectedEof {
            field: "vShieldedSpend"
        })
    );
}

#[test]
fn value_balance_without_descriptions_is_reencodable() {
    let mut tx = decode(&fixture(data::V4_TX)).unwrap();
    tx.shielded = ShieldedSummary::PreNu5 {
        sapling: SaplingSummary {
            spend_count: 0,
            output_count: 0,
            value_balance: 5,
        },
        joinsplits: vec![],
    };
    let encoded = encode(&tx).unwrap();
    assert_eq!(serialized_size(&tx), encoded.len() as u64);
    assert_eq!(decode(&encoded).unwrap(), tx);

    // Only v4 encodes a value balance without descriptions.
    let mut v3 = decode(&fixture(data::V3_TX)).unwrap();
    v3.shielded = tx.shielded.clone();
    assert_matches!(encode(&v3), Err(Error::UnsupportedReencode));
}

#[test]
fn fields_outside_the_version_are_rejected() {
    let v4 = decode(&fixture(data::V4_TX)).unwrap();

    let mut tx = v4.clone();
    tx.consensus_branch_id = 7;
    assert_matches!(
        encode(&tx),
        Err(Error::UnencodableField {
            field: "nConsensusBranchId"
        })
    );
    assert_matches!(
        tx_hash(&tx),
        Err(Error::UnencodableField {
            field: "nConsensusBranchId"
        })
    );
    let err = tx.write(Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

    // An empty summary decodes as `ShieldedSummary::None`.
    let mut tx = v4.clone();
    tx.shielded = ShieldedSummary::PreNu5 {
        sapling: SaplingSummary::default(),
        joinsplits: vec![],
    };
    assert_matches!(
        encode(&tx),
        Err(Error::UnencodableField { field: "shielded" })
    );

    let mut tx = decode(&fixture(data::V5_TX)).unwrap();
    tx.shielded = ShieldedSummary::Nu5 {
        sapling: SaplingSummary::default(),
        orchard: OrchardSummary::default(),
    };
    assert_matches!(
        encode(&tx),
        Err(Error::UnencodableField { field: "shielded" })
    );

    let mut tx = Transaction::new(TxVersion::Sprout);
    tx.version_group_id = V5_VERSION_GROUP_ID;
    assert_matches!(
        encode(&tx),
        Err(Error::UnencodableField {
            field: "nVersionGroupId"
        })
    );

    let mut tx = Transaction::new(TxVersion::Sprout);
    tx.expiry_height = 1;
    assert_matches!(
        encode(&tx),
        Err(Error::UnencodableField {
            field: "nExpiryHeight"
        })
    );
}

#[test]
fn empty_transaction_roundtrips() {
    for version in [
        TxVersion::Sprout,
        TxVersion::Overwinter,
        TxVersion::Sapling,
        TxVersion::Zip225,
    ] {
        let tx = Transaction::new(version);
        let encoded = encode(&tx).unwrap();
        assert_eq!(decode(&encoded).unwrap(), tx);
    }
}

#[cfg(feature = "std")]
#[test]
fn dynamic_usage_counts_heap_data() {
    use memuse::DynamicUsage;

    use super::components::{TxIn, TxOut};

    let tx = decode(&fixture(data::V4_TX)).unwrap();
    let scripts: usize = tx
        .vin
        .iter()
        .map(|txin| txin.script_sig.0.capacity())
        .chain(tx.vout.iter().map(|txout| txout.script_pubkey.0.capacity()))
        .sum();
    let expected = tx.vin.capacity() * std::mem::size_of::<TxIn>()
        + tx.vout.capacity() * std::mem::size_of::<TxOut>()
        + scripts;
    assert!(scripts >= 7 + 1 + 25 + 25);
    assert_eq!(tx.dynamic_usage(), expected);
    assert_eq!(tx.dynamic_usage_bounds(), (expected, Some(expected)));

    let tx = decode(&data::v4_shielded_tx()).unwrap();
    assert_eq!(
        tx.dynamic_usage(),
        tx.vout.dynamic_usage() + std::mem::size_of::<JoinSplit>()
    );
}
