//! Transaction signing and verification.
//!
//! Every signer signs `SHA-256(encode_sign_doc(doc))`, where the sign doc
//! binds the canonical body bytes, the canonical auth info bytes, the
//! chain id and the signer's account number. Signatures are attached in
//! `signerInfos` order. The signer performs no network I/O.

use suncity_crypto::address::AddressCodec;
use suncity_crypto::hash::sha256;
use suncity_crypto::secp256k1::{KeyPair, SignOptions, Secp256k1};
use suncity_types::config::ChainConfig;
use suncity_types::{Result, SuncityError};
use tracing::debug;

use crate::canonical::{encode_auth_info, encode_body, encode_sign_doc, encode_signed_tx};
use crate::transaction::{
    AuthInfo, SignDoc, SignMode, SignedTx, SignerData, SignerInfo, TxBody, TxPublicKey,
    TxSignature, UnsignedTx,
};

/// Builds sign docs and signs them for one chain.
#[derive(Clone, Debug)]
pub struct TxSigner {
    ec: Secp256k1,
    codec: AddressCodec,
    chain_id: String,
    options: SignOptions,
}

impl TxSigner {
    /// Signer bound to `chain`'s id and address prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidParameter`] if the chain prefix is
    /// not a usable bech32 prefix.
    pub fn new(chain: &ChainConfig) -> Result<Self> {
        Ok(Self {
            ec: Secp256k1::new(),
            codec: AddressCodec::from_chain(chain)?,
            chain_id: chain.chain_id.clone(),
            options: SignOptions::default(),
        })
    }

    /// Overrides the ECDSA options (low-s normalization).
    pub fn with_options(mut self, options: SignOptions) -> Self {
        self.options = options;
        self
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Serializes `body` and `auth_info` canonically and binds them to
    /// this chain and `account_number`.
    pub fn build_sign_doc(&self, body: &TxBody, auth_info: &AuthInfo, account_number: u64) -> Result<SignDoc> {
        Ok(SignDoc {
            body_bytes: encode_body(body)?,
            auth_info_bytes: encode_auth_info(auth_info)?,
            chain_id: self.chain_id.clone(),
            account_number,
        })
    }

    /// Digest that is signed for `doc`.
    pub fn sign_doc_digest(&self, doc: &SignDoc) -> Result<[u8; 32]> {
        let bytes = encode_sign_doc(doc)?;
        debug!(
            sign_doc_len = bytes.len(),
            account_number = doc.account_number,
            "encoded sign doc"
        );
        Ok(sha256(&bytes))
    }

    /// Signs `doc` and returns the signature with the signer's public key.
    pub fn sign_doc(&self, doc: &SignDoc, keypair: &KeyPair) -> Result<TxSignature> {
        let digest = self.sign_doc_digest(doc)?;
        let der = self.ec.sign_with(&digest, keypair.private_key(), self.options)?;
        Ok(TxSignature {
            public_key: keypair.public_key().to_hex(),
            signature: hex::encode(der),
            account_number: doc.account_number,
        })
    }

    /// Signs a single-signer transaction.
    ///
    /// If the transaction lists no signer infos, one is added for
    /// `keypair` with `signer.sequence`. Otherwise the transaction must
    /// list exactly this key, at the same sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SuncityError::InvalidTransaction`] if the key is not the
    /// listed signer, the sequence disagrees, or a message names a signer
    /// other than the key's address.
    pub fn sign_transaction(&self, tx: UnsignedTx, keypair: &KeyPair, signer: SignerData) -> Result<SignedTx> {
        self.sign_multi(tx, &[(keypair, signer)])
    }

    /// Signs with several keys, attaching signatures in `signerInfos`
    /// order. Missing signer infos are filled in the order of `signers`.
    pub fn sign_multi(&self, mut tx: UnsignedTx, signers: &[(&KeyPair, SignerData)]) -> Result<SignedTx> {
        if signers.is_empty() {
            return Err(SuncityError::InvalidTransaction {
                reason: "no signing keys supplied".into(),
            });
        }

        if tx.auth_info.signer_infos.is_empty() {
            tx.auth_info.signer_infos = signers
                .iter()
                .map(|(keypair, data)| SignerInfo {
                    public_key: TxPublicKey::secp256k1(&keypair.public_key().to_compressed()),
                    sequence: data.sequence,
                    sign_mode: SignMode::Direct,
                })
                .collect();
        }
        let infos = &tx.auth_info.signer_infos;
        if infos.len() != signers.len() {
            return Err(SuncityError::InvalidTransaction {
                reason: format!(
                    "transaction lists {} signers but {} keys were supplied",
                    infos.len(),
                    signers.len()
                ),
            });
        }

        // Pair every listed signer with its key.
        let mut ordered = Vec::with_capacity(infos.len());
        for info in infos {
            let (keypair, data) = signers
                .iter()
                .find(|(keypair, _)| keypair.public_key().to_hex().eq_ignore_ascii_case(&info.public_key.key))
                .ok_or_else(|| SuncityError::InvalidTransaction {
                    reason: format!("no key supplied for signer {}", info.public_key.key),
                })?;
            if data.sequence != info.sequence {
                return Err(SuncityError::InvalidTransaction {
                    reason: format!(
                        "sequence {} does not match signer info sequence {}",
                        data.sequence, info.sequence
                    ),
                });
            }
            ordered.push((*keypair, *data));
        }

        self.check_message_signers(&tx, &ordered)?;

        let body_bytes = encode_body(&tx.body)?;
        let auth_info_bytes = encode_auth_info(&tx.auth_info)?;
        let mut signatures = Vec::with_capacity(ordered.len());
        for (keypair, data) in ordered {
            let doc = SignDoc {
                body_bytes: body_bytes.clone(),
                auth_info_bytes: auth_info_bytes.clone(),
                chain_id: self.chain_id.clone(),
                account_number: data.account_number,
            };
            signatures.push(self.sign_doc(&doc, keypair)?);
        }

        debug!(
            messages = tx.body.messages.len(),
            signatures = signatures.len(),
            "transaction signed"
        );

        Ok(SignedTx {
            body: tx.body,
            auth_info: tx.auth_info,
            signatures,
        })
    }

    /// Every message's signer address must belong to one of the keys.
    fn check_message_signers(&self, tx: &UnsignedTx, signers: &[(&KeyPair, SignerData)]) -> Result<()> {
        let addresses = signers
            .iter()
            .map(|(keypair, _)| self.codec.derive_address(keypair.public_key()))
            .collect::<Result<Vec<_>>>()?;
        for message in &tx.body.messages {
            let expected = message.signer();
            if !addresses.iter().any(|a| a.as_str().eq_ignore_ascii_case(expected)) {
                return Err(SuncityError::InvalidTransaction {
                    reason: format!(
                        "{} must be signed by {expected}, which is not a signing key",
                        message.type_url()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Checks one signature against `doc`. Never fails on malformed
    /// input; it is reported as `false`.
    pub fn verify_signature(&self, doc: &SignDoc, signature: &TxSignature) -> bool {
        let (Ok(der), Ok(public_key)) = (hex::decode(&signature.signature), hex::decode(&signature.public_key)) else {
            return false;
        };
        match self.sign_doc_digest(doc) {
            Ok(digest) => self.ec.verify(&der, &digest, &public_key),
            Err(_) => false,
        }
    }

    /// Verifies that every signer info carries a valid signature from
    /// its listed key, in order.
    pub fn verify_signed(&self, tx: &SignedTx) -> bool {
        let infos = &tx.auth_info.signer_infos;
        if infos.is_empty() || infos.len() != tx.signatures.len() {
            return false;
        }
        let (Ok(body_bytes), Ok(auth_info_bytes)) = (encode_body(&tx.body), encode_auth_info(&tx.auth_info)) else {
            return false;
        };
        infos.iter().zip(&tx.signatures).all(|(info, signature)| {
            if !info.public_key.key.eq_ignore_ascii_case(&signature.public_key) {
                return false;
            }
            let doc = SignDoc {
                body_bytes: body_bytes.clone(),
                auth_info_bytes: auth_info_bytes.clone(),
                chain_id: self.chain_id.clone(),
                account_number: signature.account_number,
            };
            self.verify_signature(&doc, signature)
        })
    }
}

/// Canonical broadcast bytes of a signed transaction.
pub fn encode_tx(tx: &SignedTx) -> Result<Vec<u8>> {
    encode_signed_tx(tx)
}

/// Transaction hash: uppercase hex SHA-256 of the broadcast bytes.
pub fn tx_hash(tx: &SignedTx) -> Result<String> {
    Ok(hex::encode_upper(sha256(&encode_signed_tx(tx)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Coin, TxMessage};
    use crate::transaction::Fee;

    fn keypair(seed: u8) -> KeyPair {
        let ec = Secp256k1::new();
        let private = ec
            .private_key_from_bytes(&sha256(&[b'k', seed]))
            .expect("valid scalar");
        ec.keypair_from_private(private).expect("keypair")
    }

    fn address(signer: &TxSigner, keypair: &KeyPair) -> String {
        signer
            .codec
            .derive_address(keypair.public_key())
            .expect("address")
            .as_str()
            .to_string()
    }

    fn transfer(signer: &TxSigner, from: &KeyPair, to: &KeyPair) -> UnsignedTx {
        UnsignedTx::new(
            vec![TxMessage::send(address(signer, from), address(signer, to), Coin::new("sunc", 1_000_000))],
            Fee::new(Coin::new("sunc", 5_000), 200_000),
            "rent",
        )
    }

    fn signer() -> TxSigner {
        TxSigner::new(&ChainConfig::default()).expect("default chain is valid")
    }

    #[test]
    fn sign_and_verify_single() -> std::result::Result<(), SuncityError> {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let data = SignerData {
            account_number: 12,
            sequence: 3,
        };
        let signed = signer.sign_transaction(transfer(&signer, &alice, &bob), &alice, data)?;

        assert_eq!(signed.auth_info.signer_infos.len(), 1);
        assert_eq!(signed.auth_info.signer_infos[0].sequence, 3);
        assert_eq!(signed.signatures[0].account_number, 12);
        assert_eq!(signed.signatures[0].public_key, alice.public_key().to_hex());
        assert!(signer.verify_signed(&signed));
        Ok(())
    }

    #[test]
    fn signing_is_deterministic() -> std::result::Result<(), SuncityError> {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let a = signer.sign_transaction(transfer(&signer, &alice, &bob), &alice, SignerData::default())?;
        let b = signer.sign_transaction(transfer(&signer, &alice, &bob), &alice, SignerData::default())?;
        assert_eq!(a, b);
        assert_eq!(tx_hash(&a)?, tx_hash(&b)?);
        assert_eq!(tx_hash(&a)?.len(), 64);
        Ok(())
    }

    #[test]
    fn tampering_breaks_verification() -> std::result::Result<(), SuncityError> {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let signed = signer.sign_transaction(transfer(&signer, &alice, &bob), &alice, SignerData::default())?;

        let mut memo = signed.clone();
        memo.body.memo = "rent!".into();
        assert!(!signer.verify_signed(&memo));

        let mut account = signed.clone();
        account.signatures[0].account_number = 1;
        assert!(!signer.verify_signed(&account));

        let mut key = signed.clone();
        key.signatures[0].public_key = bob.public_key().to_hex();
        assert!(!signer.verify_signed(&key));

        let mut garbage = signed;
        garbage.signatures[0].signature = "zz".into();
        assert!(!signer.verify_signed(&garbage));
        Ok(())
    }

    #[test]
    fn other_chain_does_not_verify() -> std::result::Result<(), SuncityError> {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let signed = signer.sign_transaction(transfer(&signer, &alice, &bob), &alice, SignerData::default())?;

        let other = TxSigner::new(&ChainConfig {
            chain_id: "otherchain".into(),
            ..ChainConfig::default()
        })?;
        assert!(!other.verify_signed(&signed));
        Ok(())
    }

    #[test]
    fn wrong_key_is_rejected() {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let result = signer.sign_transaction(transfer(&signer, &alice, &bob), &bob, SignerData::default());
        assert!(matches!(result, Err(SuncityError::InvalidTransaction { .. })));
    }

    #[test]
    fn listed_signer_sequence_must_match() {
        let signer = signer();
        let (alice, bob) = (keypair(1), keypair(2));
        let mut tx = transfer(&signer, &alice, &bob);
        tx.auth_info.signer_infos.push(SignerInfo {
            public_key: TxPublicKey::secp256k1(&alice.public_key().to_compressed()),
            sequence: 4,
            sign_mode: SignMode::Direct,
        });
        let stale = SignerData {
            account_number: 0,
            sequence: 5,
        };
        assert!(signer.sign_transaction(tx, &alice, stale).is_err());
    }

    #[test]
    fn multi_signer_order_follows_signer_infos() -> std::result::Result<(), SuncityError> {
        let signer = signer();
        let (alice, bob, carol) = (keypair(1), keypair(2), keypair(3));
        let mut tx = UnsignedTx::new(
            vec![
                TxMessage::send(address(&signer, &alice), address(&signer, &carol), Coin::new("sunc", 1)),
                TxMessage::vote(address(&signer, &bob), 7, "yes"),
            ],
            Fee::new(Coin::new("sunc", 5_000), 200_000),
            "",
        );
        for (kp, seq) in [(&bob, 9), (&alice, 2)] {
            tx.auth_info.signer_infos.push(SignerInfo {
                public_key: TxPublicKey::secp256k1(&kp.public_key().to_compressed()),
                sequence: seq,
                sign_mode: SignMode::Direct,
            });
        }

        let signed = signer.sign_multi(
            tx,
            &[
                (&alice, SignerData { account_number: 1, sequence: 2 }),
                (&bob, SignerData { account_number: 5, sequence: 9 }),
            ],
        )?;
        assert_eq!(signed.signatures[0].public_key, bob.public_key().to_hex());
        assert_eq!(signed.signatures[0].account_number, 5);
        assert_eq!(signed.signatures[1].public_key, alice.public_key().to_hex());
        assert!(signer.verify_signed(&signed));

        let mut dropped = signed;
        dropped.signatures.pop();
        assert!(!signer.verify_signed(&dropped));
        Ok(())
    }
}
