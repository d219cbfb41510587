//! The two closed error taxonomies of the core, per the spec's error
//! handling design: `EdhocError` and `OscoreError` are disjoint, and every
//! failure mode the core can hit is a named variant — nothing is swallowed.

/// A failure writing into a caller-supplied fixed-capacity buffer. Shared
/// between both protocols' error enums via `From`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferError {
    /// The buffer's capacity was smaller than what needed to be written.
    TooSmall,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(C)]
pub enum EdhocError {
    /// A CBOR item used a non-shortest encoding, or was otherwise malformed.
    CborFormat,
    /// An EDHOC message's structure didn't match what the state machine
    /// expected for the current step.
    EdhocMsgFormat,
    /// AEAD decrypt-and-verify, or static-DH MAC verification, failed.
    CryptoAuth,
    /// `HKDF-Expand` was asked for more output than `255 * hash_len`.
    HkdfExpandTooLarge,
    /// ECDH shared secret computation failed (e.g. a malformed peer point).
    EcdhFail,
    /// Signature generation or verification failed.
    SignVerifyFail,
    /// `SUITES_I`'s selected suite is not one this responder supports.
    EdhocSuiteUnsupported,
    /// The operation requested is not valid for the session's current state.
    EdhocStateUnexpected,
    /// A caller-supplied buffer was too small.
    BufferTooSmall,
}

impl From<BufferError> for EdhocError {
    fn from(_: BufferError) -> Self {
        EdhocError::BufferTooSmall
    }
}

impl core::fmt::Display for EdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            EdhocError::CborFormat => "malformed or non-shortest CBOR item",
            EdhocError::EdhocMsgFormat => "malformed EDHOC message",
            EdhocError::CryptoAuth => "AEAD or MAC verification failed",
            EdhocError::HkdfExpandTooLarge => "HKDF-Expand output length exceeds 255*hash_len",
            EdhocError::EcdhFail => "ECDH shared secret computation failed",
            EdhocError::SignVerifyFail => "signature generation or verification failed",
            EdhocError::EdhocSuiteUnsupported => "selected cipher suite is not supported",
            EdhocError::EdhocStateUnexpected => "operation invalid for the session's current state",
            EdhocError::BufferTooSmall => "output buffer too small",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(C)]
pub enum OscoreError {
    /// A CBOR item used inside an AAD/`info` structure was malformed.
    CborFormat,
    /// The option-delta nibble/extension in a CoAP option was `15` (reserved).
    OscoreInPktInvalidOptionDelta,
    /// The option-length nibble/extension in a CoAP option was `15` (reserved).
    OscoreInPktInvalidOptionLen,
    /// The compressed OSCORE option's `n` field was `6` or `7`.
    OscoreInPktInvalidPiv,
    /// The OSCORE payload was shorter than the AEAD authentication tag.
    OscoreInPktInvalidTag,
    /// AEAD decrypt-and-verify failed.
    CryptoAuth,
    /// `HKDF-Expand` was asked for more output than `255 * hash_len`.
    HkdfExpandTooLarge,
    /// A request's OSCORE option KID didn't match the server's recipient ID.
    OscoreKidRecipentIdMismatch,
    /// An incoming PIV was replayed or fell below the replay window.
    OscoreReplay,
    /// The sender sequence number would exceed `2^40 - 1`.
    OscoreSsnOverflow,
    /// A caller-supplied buffer was too small.
    BufferTooSmall,
}

impl From<BufferError> for OscoreError {
    fn from(_: BufferError) -> Self {
        OscoreError::BufferTooSmall
    }
}

impl core::fmt::Display for OscoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            OscoreError::CborFormat => "malformed CBOR item in AAD/info structure",
            OscoreError::OscoreInPktInvalidOptionDelta => "reserved (15) CoAP option delta",
            OscoreError::OscoreInPktInvalidOptionLen => "reserved (15) CoAP option length",
            OscoreError::OscoreInPktInvalidPiv => "OSCORE option PIV length byte was 6 or 7",
            OscoreError::OscoreInPktInvalidTag => "OSCORE payload shorter than the AEAD tag",
            OscoreError::CryptoAuth => "AEAD verification failed",
            OscoreError::HkdfExpandTooLarge => "HKDF-Expand output length exceeds 255*hash_len",
            OscoreError::OscoreKidRecipentIdMismatch => "request KID does not match recipient ID",
            OscoreError::OscoreReplay => "PIV rejected by the replay window",
            OscoreError::OscoreSsnOverflow => "sender sequence number would overflow",
            OscoreError::BufferTooSmall => "output buffer too small",
        };
        f.write_str(msg)
    }
}
