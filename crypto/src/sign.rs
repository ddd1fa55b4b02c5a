//! Ed25519 signing and verification over transaction hashes.

use accord_types::{PrivateKey, PublicKey, Signature, TxHash};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Sign a transaction hash with a party's private key.
pub fn sign_hash(hash: &TxHash, private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(hash.as_bytes());
    Signature(sig.to_bytes())
}

/// Verify a party's signature over a transaction hash.
///
/// Returns `true` if the signature is valid, `false` otherwise — including
/// when the public key bytes themselves are not a valid curve point.
pub fn verify_hash(hash: &TxHash, signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(hash.as_bytes(), &dalek_sig).is_ok()
}
