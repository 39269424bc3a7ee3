//! The personalized hash used by every transaction digest.
//!
//! Digests are computed against the [`PersonalizedHasher`] trait so that the digest
//! engine can be exercised with known-answer vectors independently of the hash
//! primitive. [`Blake2b256`] is the consensus instantiation.

use std::io::{self, Write};

use blake2b_simd::Params;

/// A hash function keyed by a 16-byte personalization string.
pub trait PersonalizedHasher {
    fn hash(&self, personal: &[u8; 16], data: &[u8]) -> [u8; 32];
}

impl<F> PersonalizedHasher for F
where
    F: Fn(&[u8; 16], &[u8]) -> [u8; 32],
{
    fn hash(&self, personal: &[u8; 16], data: &[u8]) -> [u8; 32] {
        self(personal, data)
    }
}

/// BLAKE2b with a 32-byte output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake2b256;

impl PersonalizedHasher for Blake2b256 {
    fn hash(&self, personal: &[u8; 16], data: &[u8]) -> [u8; 32] {
        let hash = Params::new().hash_length(32).personal(personal).hash(data);
        let mut out = [0; 32];
        out.copy_from_slice(hash.as_bytes());
        out
    }
}

/// Builds a personalization from a 12-byte prefix and a consensus branch id.
pub(crate) fn branch_personalization(prefix: &[u8; 12], consensus_branch_id: u32) -> [u8; 16] {
    let mut personal = [0; 16];
    personal[..12].copy_from_slice(prefix);
    personal[12..].copy_from_slice(&consensus_branch_id.to_le_bytes());
    personal
}

/// Abstraction over a writer which accumulates the preimage of a personalized hash.
pub(crate) struct HashWriter<'a, H: PersonalizedHasher + ?Sized> {
    hasher: &'a H,
    personal: [u8; 16],
    preimage: Vec<u8>,
}

impl<'a, H: PersonalizedHasher + ?Sized> HashWriter<'a, H> {
    pub(crate) fn new(hasher: &'a H, personal: &[u8; 16]) -> Self {
        HashWriter {
            hasher,
            personal: *personal,
            preimage: vec![],
        }
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        self.preimage.extend_from_slice(data);
    }

    pub(crate) fn finalize(&self) -> [u8; 32] {
        self.hasher.hash(&self.personal, &self.preimage)
    }
}

impl<H: PersonalizedHasher + ?Sized> Write for HashWriter<'_, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
