//! The EDHOC cipher-suite registry (component C3): suite identifiers map to
//! the concrete algorithm IDs and the key/IV/tag/MAC lengths the rest of the
//! core needs, so algorithm choice is centralized in one static table
//! instead of scattered through ad-hoc branches (per the "enum over function
//! pointers" design note).

use crate::{AES_CCM_IV_LEN, AES_CCM_KEY_LEN, AES_CCM_TAG_LEN, SHA256_DIGEST_LEN};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AeadAlgorithm {
    AesCcm16_64_128,
    AesCcm16_128_128,
    ChaCha20Poly1305,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HashAlgorithm {
    Sha256,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EcdhCurve {
    X25519,
    P256,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SignatureAlgorithm {
    EdDsa,
    Es256,
}

/// Parameters of one of the five registered EDHOC cipher suites.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CipherSuite {
    pub id: u8,
    pub aead: AeadAlgorithm,
    pub aead_key_len: usize,
    pub aead_iv_len: usize,
    pub aead_tag_len: usize,
    pub hash: HashAlgorithm,
    pub hash_len: usize,
    pub ecdh_curve: EcdhCurve,
    pub signature_alg: SignatureAlgorithm,
    pub mac_len: usize,
}

const SUITE_0: CipherSuite = CipherSuite {
    id: 0,
    aead: AeadAlgorithm::AesCcm16_64_128,
    aead_key_len: AES_CCM_KEY_LEN,
    aead_iv_len: AES_CCM_IV_LEN,
    aead_tag_len: AES_CCM_TAG_LEN,
    hash: HashAlgorithm::Sha256,
    hash_len: SHA256_DIGEST_LEN,
    ecdh_curve: EcdhCurve::X25519,
    signature_alg: SignatureAlgorithm::EdDsa,
    mac_len: AES_CCM_TAG_LEN,
};

const SUITE_1: CipherSuite = CipherSuite {
    id: 1,
    aead: AeadAlgorithm::AesCcm16_128_128,
    aead_key_len: AES_CCM_KEY_LEN,
    aead_iv_len: AES_CCM_IV_LEN,
    aead_tag_len: 16,
    hash: HashAlgorithm::Sha256,
    hash_len: SHA256_DIGEST_LEN,
    ecdh_curve: EcdhCurve::X25519,
    signature_alg: SignatureAlgorithm::EdDsa,
    mac_len: 16,
};

const SUITE_2: CipherSuite = CipherSuite {
    id: 2,
    aead: AeadAlgorithm::AesCcm16_64_128,
    aead_key_len: AES_CCM_KEY_LEN,
    aead_iv_len: AES_CCM_IV_LEN,
    aead_tag_len: AES_CCM_TAG_LEN,
    hash: HashAlgorithm::Sha256,
    hash_len: SHA256_DIGEST_LEN,
    ecdh_curve: EcdhCurve::P256,
    signature_alg: SignatureAlgorithm::Es256,
    mac_len: AES_CCM_TAG_LEN,
};

const SUITE_3: CipherSuite = CipherSuite {
    id: 3,
    aead: AeadAlgorithm::AesCcm16_128_128,
    aead_key_len: AES_CCM_KEY_LEN,
    aead_iv_len: AES_CCM_IV_LEN,
    aead_tag_len: 16,
    hash: HashAlgorithm::Sha256,
    hash_len: SHA256_DIGEST_LEN,
    ecdh_curve: EcdhCurve::P256,
    signature_alg: SignatureAlgorithm::Es256,
    mac_len: 16,
};

const SUITE_4: CipherSuite = CipherSuite {
    id: 4,
    aead: AeadAlgorithm::ChaCha20Poly1305,
    aead_key_len: 32,
    aead_iv_len: 12,
    aead_tag_len: 16,
    hash: HashAlgorithm::Sha256,
    hash_len: SHA256_DIGEST_LEN,
    ecdh_curve: EcdhCurve::X25519,
    signature_alg: SignatureAlgorithm::EdDsa,
    mac_len: 16,
};

/// The five registered EDHOC cipher suites, indexed by their wire ID.
pub const EDHOC_SUITES: [CipherSuite; 5] = [SUITE_0, SUITE_1, SUITE_2, SUITE_3, SUITE_4];

/// Looks up a cipher suite by its wire identifier. EDHOC peers negotiate by
/// sending this ID in `SUITES_I`; a `None` return is the `EdhocSuiteUnsupported`
/// case at the message-1 boundary.
pub fn suite_by_id(id: u8) -> Option<CipherSuite> {
    EDHOC_SUITES.iter().copied().find(|s| s.id == id)
}

/// Cipher suites this core has a working [`crate::Crypto`] implementation
/// for end to end (ECDH + AEAD + signature). Suite 2 mirrors the teacher's
/// own scope, which only ever implements P-256/AES-CCM-16-64-128.
pub const IMPLEMENTED_SUITES: [u8; 1] = [2];

pub fn suite_is_implemented(id: u8) -> bool {
    IMPLEMENTED_SUITES.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_every_registered_suite() {
        for id in 0..=4u8 {
            assert_eq!(suite_by_id(id).unwrap().id, id);
        }
        assert!(suite_by_id(5).is_none());
    }

    #[test]
    fn only_suite_2_is_implemented() {
        assert!(suite_is_implemented(2));
        assert!(!suite_is_implemented(0));
    }
}
