use crate::error::{CoreError, Result};
use crate::types::Identity;
use bip39::{Language, Mnemonic};
use bitcoin::hashes::{hash160, Hash};
use bitcoin::key::Keypair;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use std::str::FromStr;

pub fn generate_mnemonic() -> Result<String> {
    let mut rng = bip39::rand::thread_rng();
    let mnemonic = Mnemonic::generate_in_with(&mut rng, Language::English, 24)
        .map_err(|e| CoreError::internal(format!("Failed to generate mnemonic: {}", e)))?;
    Ok(mnemonic.to_string())
}

pub fn mnemonic_to_keypair(mnemonic: &str) -> Result<Keypair> {
    let mnemonic = Mnemonic::parse_in(Language::English, mnemonic)
        .map_err(|e| CoreError::key(format!("Invalid mnemonic: {}", e)))?;

    let seed = mnemonic.to_seed("");
    let secp = Secp256k1::new();

    let master_key = bitcoin::bip32::Xpriv::new_master(bitcoin::Network::Regtest, &seed)
        .map_err(|e| CoreError::key(format!("Failed to derive master key: {}", e)))?;

    let path = bitcoin::bip32::DerivationPath::from_str("m/84'/0'/0'/0/0")
        .map_err(|e| CoreError::key(format!("Invalid derivation path: {}", e)))?;

    let child_key = master_key
        .derive_priv(&secp, &path)
        .map_err(|e| CoreError::key(format!("Failed to derive child key: {}", e)))?;

    let secret_key = SecretKey::from_slice(&child_key.private_key.secret_bytes())
        .map_err(|e| CoreError::key(format!("Invalid secret key: {}", e)))?;

    Ok(Keypair::from_secret_key(&secp, &secret_key))
}

/// HASH160 of the compressed public key.
pub fn identity_from_keypair(keypair: &Keypair) -> Identity {
    let digest = hash160::Hash::hash(&keypair.public_key().serialize());
    Identity::from_bytes(digest.to_byte_array())
}

pub fn mnemonic_to_identity(mnemonic: &str) -> Result<Identity> {
    let keypair = mnemonic_to_keypair(mnemonic)?;
    Ok(identity_from_keypair(&keypair))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_same_mnemonic_same_identity() {
        let a = mnemonic_to_identity(PHRASE).unwrap();
        let b = mnemonic_to_identity(PHRASE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let first = generate_mnemonic().unwrap();
        let second = generate_mnemonic().unwrap();
        assert_eq!(first.split_whitespace().count(), 24);
        assert_ne!(
            mnemonic_to_identity(&first).unwrap(),
            mnemonic_to_identity(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_mnemonic() {
        assert!(matches!(
            mnemonic_to_identity("definitely not a mnemonic"),
            Err(CoreError::Key(_))
        ));
    }
}
