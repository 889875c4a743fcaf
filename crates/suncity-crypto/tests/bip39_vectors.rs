//! BIP39 known test vectors and end-to-end account derivation.
//!
//! Test vectors sourced from:
//! - BIP39: <https://github.com/trezor/python-mnemonic/blob/master/vectors.json>
//! - BIP32: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use suncity_crypto::address::AddressCodec;
use suncity_crypto::hd::{derive_keypair, derive_keypair_from_mnemonic};
use suncity_crypto::mnemonic::{
    entropy_to_mnemonic, mnemonic_to_entropy, mnemonic_to_seed, validate_mnemonic,
};
use suncity_crypto::secp256k1::Secp256k1;
use suncity_types::config::{ChainConfig, DEFAULT_HD_PATH};
use suncity_types::{MnemonicError, SuncityError};

// ===================================================================
// Helper
// ===================================================================

fn hex_bytes(hex: &str) -> std::result::Result<Vec<u8>, SuncityError> {
    hex::decode(hex).map_err(|e| SuncityError::InvalidParameter {
        reason: e.to_string(),
    })
}

/// `(entropy, mnemonic, seed with passphrase "TREZOR")`.
const TREZOR_VECTORS: &[(&str, &str, &str)] = &[
    (
        "00000000000000000000000000000000",
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04",
    ),
    (
        "7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f",
        "legal winner thank year wave sausage worth useful legal winner thank yellow",
        "2e8905819b8723fe2c1d161860e5ee1830318dbf49a83bd451cfb8440c28bd6fa457fe1296106559a3c80937a1c1069be3a3a5bd381ee6260e8d9739fce1f607",
    ),
    (
        "80808080808080808080808080808080",
        "letter advice cage absurd amount doctor acoustic avoid letter advice cage above",
        "d71de856f81a8acc65e6fc851a38d4d7ec216fd0796d0a6827a3ad6ed5511a30fa280f12eb2e47ed2ac03b5c462a0358d18d69fe4f985ec81778c1b370b652a8",
    ),
    (
        "ffffffffffffffffffffffffffffffff",
        "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong",
        "ac27495480225222079d7be181583751e86f571027b0497b5b5d11218e0a8a13332572917f0f8e5a589620c6f15b11c61dee327651a14c34e18231052e48c069",
    ),
    (
        "9e885d952ad362caeb4efe34a8e91bd2",
        "ozone drill grab fiber curtain grace pudding thank cruise elder eight picnic",
        "274ddc525802f7c828d8ef7ddbcdc5304e87ac3535913611fbbfa986d0c9e5476c91689f9c8a54fd55bd38606aa6a8595ad213d4c9c9f9aca3fb217069a41028",
    ),
    (
        "000000000000000000000000000000000000000000000000",
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon agent",
        "035895f2f481b1b0f01fcf8c289c794660b289981a78f8106447707fdd9666ca06da5a9a565181599b79f53b844d8a71dd9f439c52a3d7b3e8a79c906ac845fa",
    ),
    (
        "0000000000000000000000000000000000000000000000000000000000000000",
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art",
        "bda85446c68413707090a52022edd26a1c9462295029f2e60cd7c4f2bbd3097170af7a4d73245cafa9c3cca8d561a7c3de6f5d4a10be8ed2a5e608d68f92fcc8",
    ),
    (
        "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote",
        "dd48c104698c30cfe2b6142103248622fb7bb0ff692eebb00089b32d22484e1613912f0a5b694407be899ffd31ed3992c456cdf60f5d4564b8ba3f05a69890ad",
    ),
];

// ===================================================================
// TREZOR vectors
// ===================================================================

#[test]
fn trezor_entropy_to_mnemonic() -> std::result::Result<(), SuncityError> {
    for (entropy, expected, _) in TREZOR_VECTORS {
        let mnemonic = entropy_to_mnemonic(&hex_bytes(entropy)?)?;
        assert_eq!(mnemonic.as_str(), *expected, "entropy {entropy}");
    }
    Ok(())
}

#[test]
fn trezor_mnemonic_to_entropy() -> std::result::Result<(), SuncityError> {
    for (entropy, phrase, _) in TREZOR_VECTORS {
        let decoded = mnemonic_to_entropy(phrase)?;
        assert_eq!(hex::encode(decoded.entropy.as_bytes()), *entropy);
    }
    Ok(())
}

#[test]
fn trezor_validate() {
    for (_, phrase, _) in TREZOR_VECTORS {
        let report = validate_mnemonic(phrase);
        assert!(report.valid, "{phrase}");
        assert!(report.error.is_none());
    }
}

#[test]
fn trezor_seed() -> std::result::Result<(), SuncityError> {
    for (_, phrase, seed) in TREZOR_VECTORS {
        let derived = mnemonic_to_seed(phrase, "TREZOR")?;
        assert_eq!(hex::encode(derived.as_bytes()), *seed, "{phrase}");
    }
    Ok(())
}

#[test]
fn empty_passphrase_seed() -> std::result::Result<(), SuncityError> {
    let seed = mnemonic_to_seed(TREZOR_VECTORS[0].1, "")?;
    assert_eq!(
        hex::encode(seed.as_bytes()),
        "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
    );
    Ok(())
}

// ===================================================================
// Decode failures
// ===================================================================

#[test]
fn wrong_last_word_fails_checksum() {
    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
    let report = validate_mnemonic(phrase);
    assert!(!report.valid);
    assert_eq!(report.error, Some(MnemonicError::InvalidChecksum));
}

#[test]
fn unknown_word_reports_position() {
    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon suncity";
    assert_eq!(
        validate_mnemonic(phrase).error,
        Some(MnemonicError::InvalidWord {
            word: "suncity".into(),
            position: 11,
        })
    );
}

#[test]
fn thirteen_words_rejected() {
    let phrase = format!("{} abandon", TREZOR_VECTORS[0].1);
    assert_eq!(
        validate_mnemonic(&phrase).error,
        Some(MnemonicError::InvalidWordCount { count: 13 })
    );
}

#[test]
fn twenty_four_word_phrase_missing_a_word_rejected() {
    let full = TREZOR_VECTORS
        .iter()
        .map(|(_, phrase, _)| *phrase)
        .find(|phrase| phrase.split_whitespace().count() == 24)
        .expect("a 24-word vector");
    assert!(validate_mnemonic(full).valid);

    let words: Vec<&str> = full.split_whitespace().collect();
    let truncated = words[..23].join(" ");
    let report = validate_mnemonic(&truncated);
    assert!(!report.valid);
    assert_eq!(
        report.error,
        Some(MnemonicError::InvalidWordCount { count: 23 })
    );
    assert!(matches!(
        mnemonic_to_entropy(&truncated),
        Err(SuncityError::Mnemonic(MnemonicError::InvalidWordCount { count: 23 }))
    ));
}

// ===================================================================
// End-to-end: mnemonic → keypair → address
// ===================================================================

#[test]
fn test_mnemonic_derives_known_account() -> std::result::Result<(), SuncityError> {
    let ec = Secp256k1::new();
    let codec = AddressCodec::from_chain(&ChainConfig::default())?;

    let kp = derive_keypair_from_mnemonic(&ec, TREZOR_VECTORS[0].1, DEFAULT_HD_PATH)?;
    let address = codec.derive_address(kp.public_key())?;
    assert_eq!(address.as_str(), "sunc19rl4cm2hmr8afy4kldpxz3fka4jguq0ac0wm7j");
    Ok(())
}

#[test]
fn seed_passphrase_changes_account() -> std::result::Result<(), SuncityError> {
    let ec = Secp256k1::new();
    let phrase = TREZOR_VECTORS[1].1;
    let plain = derive_keypair(&ec, &mnemonic_to_seed(phrase, "")?, DEFAULT_HD_PATH)?;
    let salted = derive_keypair(&ec, &mnemonic_to_seed(phrase, "TREZOR")?, DEFAULT_HD_PATH)?;
    assert_ne!(plain.public_key(), salted.public_key());
    Ok(())
}
