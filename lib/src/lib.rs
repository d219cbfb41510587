//! EDHOC (draft-ietf-lake-edhoc) key exchange and OSCORE (RFC 8613) CoAP
//! transform for constrained devices: no_std, allocation-free, fixed-buffer
//! throughout.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod coap;
pub mod edhoc;
pub mod oscore;

pub use edhoc_oscore_shared::{
    BytesHashLen, BytesP256ElemLen, BytesP256PublicKey, BytesP256Signature, CipherSuite, Crypto,
    EdhocError, EdhocMessageBuffer, OscoreError,
};

pub use edhoc::{AuthKind, EdhocRole, EdhocSession, EdhocState, PeerCredential};

/// A session still building or parsing messages, paired with its role so
/// callers reaching for the Initiator/Responder convenience names don't have
/// to juggle `EdhocRole` themselves.
pub struct EdhocInitiator(pub EdhocSession);

pub struct EdhocResponder(pub EdhocSession);

impl EdhocInitiator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        crypto: &mut impl Crypto,
        suite: CipherSuite,
        initiator_auth_kind: AuthKind,
        responder_auth_kind: AuthKind,
        c_i: u8,
        own_auth_sk: BytesP256ElemLen,
    ) -> Self {
        EdhocInitiator(EdhocSession::new(
            crypto,
            EdhocRole::Initiator,
            suite,
            initiator_auth_kind,
            responder_auth_kind,
            c_i,
            own_auth_sk,
        ))
    }
}

impl EdhocResponder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        crypto: &mut impl Crypto,
        suite: CipherSuite,
        initiator_auth_kind: AuthKind,
        responder_auth_kind: AuthKind,
        c_r: u8,
        own_auth_sk: BytesP256ElemLen,
    ) -> Self {
        EdhocResponder(EdhocSession::new(
            crypto,
            EdhocRole::Responder,
            suite,
            initiator_auth_kind,
            responder_auth_kind,
            c_r,
            own_auth_sk,
        ))
    }
}
