//! Shared types used by [edhoc-oscore] and its crypto backends.
//!
//! This crate carries everything that both the protocol core and a
//! `Crypto` backend need to agree on: fixed-capacity byte buffers, the
//! deterministic CBOR primitives used on the wire, the cipher-suite
//! registry, and the two closed error enums. It is kept separate from
//! the main crate so that a `Crypto` implementation can depend on it
//! without depending on the protocol state machine.
//!
//! [edhoc-oscore]: https://docs.rs/edhoc-oscore/
#![cfg_attr(not(feature = "std"), no_std)]

mod buffer;
mod cbor;
mod crypto;
mod error;
mod suites;

pub use buffer::*;
pub use cbor::*;
pub use crypto::*;
pub use error::*;
pub use suites::*;

/// Length in bytes of a P-256 field element (a coordinate, a scalar, or an
/// x-coordinate-only EDHOC ephemeral public key).
pub const P256_ELEM_LEN: usize = 32;
/// Length of an uncompressed P-256 public key used to verify a static-DH
/// credential's signature (`x || y`).
pub const P256_PUBLIC_KEY_LEN: usize = 2 * P256_ELEM_LEN;
/// Length of a P-256 ECDSA signature (`r || s`).
pub const P256_SIGNATURE_LEN: usize = 2 * P256_ELEM_LEN;
/// Length of a SHA-256 digest, and of every `TH_n` register.
pub const SHA256_DIGEST_LEN: usize = 32;
/// Key length of AES-CCM-16-64-128.
pub const AES_CCM_KEY_LEN: usize = 16;
/// Nonce length of AES-CCM-16-64-128, and of the OSCORE Common IV.
pub const AES_CCM_IV_LEN: usize = 13;
/// Tag length of AES-CCM-16-64-128.
pub const AES_CCM_TAG_LEN: usize = 8;
/// Length of a MAC produced by the static-DH `Signature_or_MAC` construction.
pub const MAC_LENGTH: usize = AES_CCM_TAG_LEN;

/// Maximum length of a single EDHOC message on the wire.
pub const MAX_MESSAGE_LEN: usize = 192;
/// Maximum length of a HKDF `info` structure (dominated by a `TH_n` bstr and
/// a short text label).
pub const MAX_INFO_LEN: usize = 2 + SHA256_DIGEST_LEN + 1 + 24 + 2;
/// Maximum length of the COSE `Encrypt0` external_aad / `A_Xae` structure.
pub const MAX_AAD_LEN: usize = 2 + 1 + SHA256_DIGEST_LEN;
/// Maximum length of a CoAP or OSCORE packet this core will handle.
pub const MAX_COAP_PACKET_LEN: usize = 512;
/// Maximum number of options this core parses out of a single packet.
pub const MAX_OPTIONS: usize = 16;
/// Length of the OSCORE AEAD nonce and Common IV (RFC 8613 §5.2).
pub const OSCORE_NONCE_LEN: usize = 13;
/// Maximum length of a sender/recipient ID this core carries. RFC 8613
/// §5.2 requires `len(ID) <= nonce_length - 6`, which is 7 bytes for the
/// 13-byte AES-CCM-16-64-128 nonce this core implements.
pub const MAX_OSCORE_ID_LEN: usize = OSCORE_NONCE_LEN - 6;
/// Maximum length of an OSCORE ID context (RFC 8613 §3.1 gives no fixed
/// bound; this core caps it at what the Appendix C.3 test vectors use).
pub const MAX_ID_CONTEXT_LEN: usize = 16;
/// Maximum length of a compressed OSCORE option value: flags(1) + PIV(5) +
/// kid_context length byte(1) + kid_context + kid.
pub const MAX_OSCORE_OPTION_LEN: usize = 1 + 5 + 1 + MAX_ID_CONTEXT_LEN + MAX_OSCORE_ID_LEN;
/// Maximum length of the OSCORE COSE `Enc_structure` AAD (component C8).
pub const MAX_OSCORE_AAD_LEN: usize = 64;

pub type BytesP256ElemLen = [u8; P256_ELEM_LEN];
pub type BytesP256PublicKey = [u8; P256_PUBLIC_KEY_LEN];
pub type BytesP256Signature = [u8; P256_SIGNATURE_LEN];
pub type BytesHashLen = [u8; SHA256_DIGEST_LEN];
pub type BytesCcmKeyLen = [u8; AES_CCM_KEY_LEN];
pub type BytesCcmIvLen = [u8; AES_CCM_IV_LEN];
pub type BytesMac = [u8; MAC_LENGTH];

/// An owned EDHOC protocol message (message_1/2/3, or a CBOR-encoded
/// intermediate such as plaintext_2/3).
pub type EdhocMessageBuffer = MessageBuffer<MAX_MESSAGE_LEN>;
/// Scratch buffer for a HKDF `info` structure.
pub type InfoBuffer = MessageBuffer<MAX_INFO_LEN>;
/// Scratch buffer for an `A_Xae` / `Enc_structure` AAD.
pub type AadBuffer = MessageBuffer<MAX_AAD_LEN>;
/// An owned CoAP or OSCORE packet.
pub type CoapMessageBuffer = MessageBuffer<MAX_COAP_PACKET_LEN>;
/// The 13-byte OSCORE AEAD nonce / Common IV.
pub type BytesOscoreNonce = [u8; OSCORE_NONCE_LEN];
/// An owned sender or recipient ID.
pub type OscoreIdBuffer = MessageBuffer<MAX_OSCORE_ID_LEN>;
/// An owned OSCORE ID context.
pub type IdContextBuffer = MessageBuffer<MAX_ID_CONTEXT_LEN>;
/// Scratch buffer for a compressed OSCORE option value.
pub type OscoreOptionBuffer = MessageBuffer<MAX_OSCORE_OPTION_LEN>;
/// Scratch buffer for the OSCORE `Enc_structure` AAD.
pub type OscoreAadBuffer = MessageBuffer<MAX_OSCORE_AAD_LEN>;

/// A view of caller-supplied bytes that distinguishes "no value" (`None`,
/// i.e. Absent) from "a present, possibly zero-length, value" (`Some(&[])`,
/// i.e. Empty). `Option<&[u8]>` already has exactly this shape, so no bespoke
/// sentinel type (the original's `EMPTY_ARRAY`/`NULL_ARRAY` pair) is needed.
pub type OptionalBytes<'a> = Option<&'a [u8]>;
