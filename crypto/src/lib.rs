//! Cryptographic primitives for the accord protocol.
//!
//! - **Ed25519** for per-party transaction signatures
//! - **Blake2b-256** for transaction hashing
//!
//! This is the signing-service collaborator the flow layer consumes: it
//! produces and verifies per-party signatures over a transaction's hash.

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, hash_transaction};
pub use keys::{generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign_hash, verify_hash};
