//! Tests for key derivation

use hdkit::crypto::keys::*;
use hdkit::crypto::mnemonic::*;
use hdkit::{Address, Error, SeedStore};

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const SECRET_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

#[test]
fn test_derivation_is_deterministic_across_stores() {
    let first = SeedStore::from_mnemonic(MNEMONIC).unwrap();
    let second = SeedStore::from_mnemonic(MNEMONIC).unwrap();

    for path in [DerivePathParams::default(), DerivePathParams::new(2, 9)] {
        let a = first.derive(&path).unwrap();
        let b = second.derive(&path).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.address(), b.address());
    }
}

#[test]
fn test_known_mnemonic_vector() {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    let store = SeedStore::from_mnemonic(
        "film crazy soon outside stand loop subway crumble thrive popular green nuclear struggle pistol arm wife phrase warfare march wheat nephew ask sunny firm",
    )
    .unwrap();
    let key_pair = store.derive(&DerivePathParams::default()).unwrap();

    assert_eq!(
        BASE64.encode(key_pair.public_key().as_bytes()),
        "ImR/7u82MGC9QgWhZxoV8QoSNnZZGLG19jjYLzPPxGk="
    );
    assert_eq!(
        key_pair.address().to_string(),
        "0xa2d14fad60c56049ecf75246a481934691214ce413e6a8ae2fe6834c173a6133"
    );
}

#[test]
fn test_engine_matches_store() {
    let seed = mnemonic_to_seed(MNEMONIC, None).unwrap();
    let store = SeedStore::from_mnemonic(MNEMONIC).unwrap();
    let path: DerivePathParams = "m/44'/784'/1'/1'/3'".parse().unwrap();

    let direct = derive_key_pair(&seed[..], &path).unwrap();
    assert_eq!(direct.address(), store.derive(&path).unwrap().address());
}

#[test]
fn test_distinct_paths_give_distinct_addresses() {
    let store = SeedStore::from_mnemonic(MNEMONIC).unwrap();
    let mut seen = std::collections::HashSet::new();

    for account in 0..3 {
        for is_external in [true, false] {
            for index in 0..3 {
                let path = DerivePathParams {
                    account_index: account,
                    is_external,
                    address_index: index,
                };
                assert!(seen.insert(store.derive(&path).unwrap().address()), "{}", path);
            }
        }
    }
}

#[test]
fn test_address_format() {
    let store = SeedStore::from_mnemonic(MNEMONIC).unwrap();
    let address = store.derive(&DerivePathParams::default()).unwrap().address();

    let rendered = address.to_string();
    assert!(rendered.starts_with("0x"));
    assert_eq!(rendered.len(), 66);
    assert_eq!(rendered.parse::<Address>().unwrap(), address);
}

#[test]
fn test_secret_key_store_ignores_path() {
    let store = SeedStore::from_secret_key(SECRET_HEX).unwrap();
    let expected = KeyPair::from_encoded_secret(SECRET_HEX).unwrap().address();

    for path in [DerivePathParams::default(), DerivePathParams::new(4, 4)] {
        assert_eq!(store.derive(&path).unwrap().address(), expected);
    }
}

#[test]
fn test_mnemonic_priority() {
    let path = DerivePathParams::default();
    let both = SeedStore::from_parts(Some(MNEMONIC), Some(SECRET_HEX)).unwrap();
    let mnemonic_only = SeedStore::from_parts(Some(MNEMONIC), None).unwrap();
    let secret_only = SeedStore::from_parts(None, Some(SECRET_HEX)).unwrap();

    let address = both.derive(&path).unwrap().address();
    assert_eq!(address, mnemonic_only.derive(&path).unwrap().address());
    assert_ne!(address, secret_only.derive(&path).unwrap().address());
}

#[test]
fn test_construction_errors() {
    assert!(matches!(
        SeedStore::from_mnemonic("abandon abandon abandon"),
        Err(Error::InvalidMnemonic(_))
    ));
    assert!(matches!(
        SeedStore::from_secret_key("0x1234"),
        Err(Error::InvalidSecretKey(_))
    ));
    assert!(Error::InvalidSecretKey(String::new()).is_input_validation());
}
