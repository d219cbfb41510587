//! A [`Crypto`] backend built on the RustCrypto stack (`sha2`, `hkdf`,
//! `p256`, `ccm`/`aes`), analogous to `lakers-crypto-rustcrypto` in the
//! teacher workspace: a software-only implementation suitable for host
//! testing and for any target where pulling in a hardware-specific backend
//! isn't worth it.
#![cfg_attr(not(feature = "std"), no_std)]

use aes::Aes128;
use ccm::aead::generic_array::GenericArray;
use ccm::aead::AeadInPlace;
use ccm::consts::{U13, U8};
use ccm::{Ccm, KeyInit};
use hkdf::Hkdf;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use edhoc_oscore_shared::{
    AeadAuthError, BytesCcmIvLen, BytesCcmKeyLen, BytesHashLen, BytesP256ElemLen,
    BytesP256PublicKey, BytesP256Signature, Crypto, EdhocError, HkdfExpandTooLargeError,
    P256_ELEM_LEN,
};

type AesCcm16_64_128 = Ccm<Aes128, U8, U13>;

/// A [`Crypto`] implementation backed entirely by software (RustCrypto)
/// primitives, parameterized over its random source.
pub struct RustCryptoBackend<R: RngCore + CryptoRng> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RustCryptoBackend<R> {
    pub fn new(rng: R) -> Self {
        RustCryptoBackend { rng }
    }
}

#[cfg(feature = "std")]
pub fn default_crypto() -> RustCryptoBackend<rand_core::OsRng> {
    RustCryptoBackend::new(rand_core::OsRng)
}

/// Recovers a P-256 point from its EDHOC x-coordinate-only encoding by
/// prepending the SEC1 "even y" compression tag, per draft-ietf-lake-edhoc's
/// convention for NIST curve ephemeral keys.
fn decompress_x_only(x: &BytesP256ElemLen) -> Result<PublicKey, EdhocError> {
    let mut sec1 = [0u8; 1 + P256_ELEM_LEN];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(x);
    PublicKey::from_sec1_bytes(&sec1).map_err(|_| EdhocError::EcdhFail)
}

impl<R: RngCore + CryptoRng> Crypto for RustCryptoBackend<R> {
    fn p256_generate_key_pair(&mut self) -> (BytesP256ElemLen, BytesP256ElemLen) {
        let sk = SecretKey::random(&mut self.rng);
        let pk_point = sk.public_key().to_encoded_point(false);
        let mut sk_bytes: BytesP256ElemLen = [0u8; P256_ELEM_LEN];
        sk_bytes.copy_from_slice(sk.to_bytes().as_slice());
        let mut pk_x: BytesP256ElemLen = [0u8; P256_ELEM_LEN];
        pk_x.copy_from_slice(pk_point.x().expect("uncompressed point has x"));
        (sk_bytes, pk_x)
    }

    fn p256_ecdh(
        &mut self,
        sk: &BytesP256ElemLen,
        peer_pk_x: &BytesP256ElemLen,
    ) -> Result<BytesP256ElemLen, EdhocError> {
        let secret = SecretKey::from_slice(sk).map_err(|_| EdhocError::EcdhFail)?;
        let peer_pk = decompress_x_only(peer_pk_x)?;
        let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer_pk.as_affine());
        let mut out: BytesP256ElemLen = [0u8; P256_ELEM_LEN];
        out.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(out)
    }

    fn p256_sign(
        &mut self,
        sk: &BytesP256ElemLen,
        message: &[u8],
    ) -> Result<BytesP256Signature, EdhocError> {
        let signing_key = SigningKey::from_bytes(sk.into()).map_err(|_| EdhocError::SignVerifyFail)?;
        let signature: Signature = signing_key.sign(message);
        let mut out: BytesP256Signature = [0u8; 64];
        out.copy_from_slice(&signature.to_bytes());
        Ok(out)
    }

    fn p256_verify(
        &mut self,
        pk: &BytesP256PublicKey,
        message: &[u8],
        signature: &BytesP256Signature,
    ) -> Result<(), EdhocError> {
        let mut sec1 = [0u8; 1 + 2 * P256_ELEM_LEN];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(pk);
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| EdhocError::SignVerifyFail)?;
        let sig = Signature::from_slice(signature).map_err(|_| EdhocError::SignVerifyFail)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| EdhocError::SignVerifyFail)
    }

    fn sha256(&mut self, input: &[u8]) -> BytesHashLen {
        let mut hasher = Sha256::new();
        hasher.update(input);
        let digest = hasher.finalize();
        let mut out: BytesHashLen = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    fn hkdf_extract(&mut self, salt: &[u8], ikm: &[u8]) -> BytesHashLen {
        let (prk, _) = Hkdf::<Sha256>::extract(Some(salt), ikm);
        let mut out: BytesHashLen = [0u8; 32];
        out.copy_from_slice(&prk);
        out
    }

    fn hkdf_expand(
        &mut self,
        prk: &BytesHashLen,
        info: &[u8],
        out: &mut [u8],
    ) -> Result<(), HkdfExpandTooLargeError> {
        let hkdf = Hkdf::<Sha256>::from_prk(prk).map_err(|_| HkdfExpandTooLargeError)?;
        hkdf.expand(info, out).map_err(|_| HkdfExpandTooLargeError)
    }

    fn aes_ccm_encrypt(
        &mut self,
        key: &BytesCcmKeyLen,
        iv: &BytesCcmIvLen,
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) {
        let cipher = AesCcm16_64_128::new(GenericArray::from_slice(key));
        let nonce = GenericArray::from_slice(iv);
        out[..plaintext.len()].copy_from_slice(plaintext);
        let (ciphertext, tag_slot) = out.split_at_mut(plaintext.len());
        let tag = cipher
            .encrypt_in_place_detached(nonce, aad, ciphertext)
            .expect("AES-CCM-16-64-128 encryption is infallible for valid sizes");
        tag_slot.copy_from_slice(&tag);
    }

    fn aes_ccm_decrypt(
        &mut self,
        key: &BytesCcmKeyLen,
        iv: &BytesCcmIvLen,
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> Result<(), AeadAuthError> {
        let tag_len = 8;
        let (ct, tag) = ciphertext.split_at(ciphertext.len() - tag_len);
        let cipher = AesCcm16_64_128::new(GenericArray::from_slice(key));
        let nonce = GenericArray::from_slice(iv);
        out.copy_from_slice(ct);
        cipher
            .decrypt_in_place_detached(nonce, aad, out, GenericArray::from_slice(tag))
            .map_err(|_| AeadAuthError)
    }

    fn random_byte(&mut self) -> u8 {
        (self.rng.next_u32() & 0xFF) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdh_agrees_both_directions() {
        let mut crypto = default_crypto();
        let (x, g_x) = crypto.p256_generate_key_pair();
        let (y, g_y) = crypto.p256_generate_key_pair();

        let g_xy = crypto.p256_ecdh(&x, &g_y).unwrap();
        let g_yx = crypto.p256_ecdh(&y, &g_x).unwrap();
        assert_eq!(g_xy, g_yx);
    }

    #[test]
    fn hkdf_expand_respects_requested_length() {
        let mut crypto = default_crypto();
        let prk = crypto.hkdf_extract(b"salt", b"ikm");
        let mut out16 = [0u8; 16];
        crypto.hkdf_expand(&prk, b"info", &mut out16).unwrap();
        let mut out8 = [0u8; 8];
        crypto.hkdf_expand(&prk, b"info", &mut out8).unwrap();
        assert_ne!(&out16[..8], &out8[..]); // different info-bound expansion length changes T(1..N) chaining position usage
    }

    #[test]
    fn ccm_roundtrip() {
        let mut crypto = default_crypto();
        let key = [0x42u8; 16];
        let iv = [0x24u8; 13];
        let aad = b"aad";
        let plaintext = b"hello oscore";
        let mut ciphertext = [0u8; 12 + 8];
        crypto.aes_ccm_encrypt(&key, &iv, aad, plaintext, &mut ciphertext);

        let mut recovered = [0u8; 12];
        crypto
            .aes_ccm_decrypt(&key, &iv, aad, &ciphertext, &mut recovered)
            .unwrap();
        assert_eq!(&recovered, plaintext);
    }

    #[test]
    fn ccm_rejects_tampered_ciphertext() {
        let mut crypto = default_crypto();
        let key = [0x11u8; 16];
        let iv = [0x22u8; 13];
        let mut ciphertext = [0u8; 4 + 8];
        crypto.aes_ccm_encrypt(&key, &iv, b"", b"abcd", &mut ciphertext);
        ciphertext[0] ^= 0xFF;

        let mut recovered = [0u8; 4];
        assert!(crypto
            .aes_ccm_decrypt(&key, &iv, b"", &ciphertext, &mut recovered)
            .is_err());
    }

    #[test]
    fn signature_roundtrip() {
        let mut crypto = default_crypto();
        let sk = SecretKey::random(&mut rand_core::OsRng);
        let mut sk_bytes: BytesP256ElemLen = [0u8; 32];
        sk_bytes.copy_from_slice(sk.to_bytes().as_slice());
        let pk_point = sk.public_key().to_encoded_point(false);
        let mut pk: BytesP256PublicKey = [0u8; 64];
        pk[..32].copy_from_slice(pk_point.x().unwrap());
        pk[32..].copy_from_slice(pk_point.y().unwrap());

        let sig = crypto.p256_sign(&sk_bytes, b"message").unwrap();
        crypto.p256_verify(&pk, b"message", &sig).unwrap();
        assert!(crypto.p256_verify(&pk, b"tampered", &sig).is_err());
    }
}
