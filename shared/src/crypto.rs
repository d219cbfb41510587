//! The crypto backend SPI (component C2): a capability trait any backend
//! can implement. Every operation is synchronous and allocation-free —
//! callers supply output buffers sized from the suite table — so the core
//! never needs to know whether it is linked against a software or a
//! hardware-accelerated backend.

use crate::error::{EdhocError, OscoreError};
use crate::{BytesCcmIvLen, BytesCcmKeyLen, BytesHashLen, BytesP256ElemLen, BytesP256PublicKey, BytesP256Signature};

/// AEAD decrypt-and-verify failed. Protocol-agnostic so both
/// [`EdhocError::CryptoAuth`] and [`OscoreError::CryptoAuth`] can be built
/// from the same backend call — EDHOC uses AEAD both for message_3's
/// ciphertext and for the static-DH `Signature_or_MAC` construction, OSCORE
/// uses it for the whole CoAP payload.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AeadAuthError;

impl From<AeadAuthError> for EdhocError {
    fn from(_: AeadAuthError) -> Self {
        EdhocError::CryptoAuth
    }
}

impl From<AeadAuthError> for OscoreError {
    fn from(_: AeadAuthError) -> Self {
        OscoreError::CryptoAuth
    }
}

/// `HKDF-Expand` was asked to produce more than `255 * hash_len` bytes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct HkdfExpandTooLargeError;

impl From<HkdfExpandTooLargeError> for EdhocError {
    fn from(_: HkdfExpandTooLargeError) -> Self {
        EdhocError::HkdfExpandTooLarge
    }
}

impl From<HkdfExpandTooLargeError> for OscoreError {
    fn from(_: HkdfExpandTooLargeError) -> Self {
        OscoreError::HkdfExpandTooLarge
    }
}

pub trait Crypto {
    /// Generates a fresh P-256 ephemeral key pair, returning `(private, public_x)`.
    /// EDHOC carries ephemeral P-256 points x-coordinate-only on the wire.
    fn p256_generate_key_pair(&mut self) -> (BytesP256ElemLen, BytesP256ElemLen);

    /// Computes the P-256 ECDH shared secret's x-coordinate from a private
    /// key and a peer's x-coordinate-only public key.
    fn p256_ecdh(
        &mut self,
        sk: &BytesP256ElemLen,
        peer_pk_x: &BytesP256ElemLen,
    ) -> Result<BytesP256ElemLen, EdhocError>;

    /// Signs `message` with a P-256 private key (ECDSA, deterministic per
    /// RFC 6979), returning `r || s`.
    fn p256_sign(
        &mut self,
        sk: &BytesP256ElemLen,
        message: &[u8],
    ) -> Result<BytesP256Signature, EdhocError>;

    /// Verifies an ECDSA P-256 signature against an uncompressed `x || y`
    /// public key.
    fn p256_verify(
        &mut self,
        pk: &BytesP256PublicKey,
        message: &[u8],
        signature: &BytesP256Signature,
    ) -> Result<(), EdhocError>;

    fn sha256(&mut self, input: &[u8]) -> BytesHashLen;

    /// RFC 5869 `HKDF-Extract` with SHA-256.
    fn hkdf_extract(&mut self, salt: &[u8], ikm: &[u8]) -> BytesHashLen;

    /// RFC 5869 `HKDF-Expand` with SHA-256. Fails with
    /// [`HkdfExpandTooLargeError`] if `out.len() > 255 * hash_len`.
    fn hkdf_expand(&mut self, prk: &BytesHashLen, info: &[u8], out: &mut [u8]) -> Result<(), HkdfExpandTooLargeError>;

    /// AES-CCM-16-64-128 encryption. `out` must be `plaintext.len() + 8`
    /// bytes; the authentication tag is appended to the ciphertext.
    fn aes_ccm_encrypt(
        &mut self,
        key: &BytesCcmKeyLen,
        iv: &BytesCcmIvLen,
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    );

    /// AES-CCM-16-64-128 decrypt-and-verify. `ciphertext` includes the
    /// trailing 8-byte tag; `out` must be `ciphertext.len() - 8` bytes.
    /// Fails with [`AeadAuthError`] on a tag mismatch.
    fn aes_ccm_decrypt(
        &mut self,
        key: &BytesCcmKeyLen,
        iv: &BytesCcmIvLen,
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> Result<(), AeadAuthError>;

    fn random_byte(&mut self) -> u8;

    fn random_bytes(&mut self, out: &mut [u8]) {
        for b in out.iter_mut() {
            *b = self.random_byte();
        }
    }
}
