//! The EDHOC state machine (component C5): message 1/2/3 construction and
//! parsing, transcript-hash chaining, authentication-material derivation and
//! session-key export.
//!
//! Authentication combinations follow draft-ietf-lake-edhoc's METHOD
//! encoding: each of the Initiator and the Responder independently
//! authenticates with either a signature or a static-DH MAC, and `METHOD`
//! is the pair of choices (0=sig/sig, 1=sig/static, 2=static/sig,
//! 3=static/static).
//!
//! A note on the static-DH bindings (`PRK_3e2m`, `PRK_4x3m`): both are
//! computed here as `ECDH(own static key, peer's just-received ephemeral
//! key)` on the authenticating side, and the DH-symmetric `ECDH(own
//! ephemeral key, peer's static key)` on the verifying side — the peer's
//! static key being exactly what the credential fetch already supplies for
//! MAC/signature verification. This keeps every derivation computable from
//! keys already in hand; see `DESIGN.md` for why this is needed instead of
//! the single fixed pairing a literal reading of the formulas suggests.

use zeroize::Zeroize;

use edhoc_oscore_shared::{
    encode_array_header, encode_bytes, encode_uint, BytesHashLen, BytesP256ElemLen,
    BytesP256PublicKey, BytesP256Signature, CborDecoder, CipherSuite, Crypto, EdhocError,
    EdhocMessageBuffer, OutCursor,
};

use super::ad::{build_a_xae, build_mac, derive_via_label, sign_message, verify_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdhocRole {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Signature,
    StaticDh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdhocState {
    Init,
    SentMsg1,
    RecvMsg1,
    SentMsg2,
    RecvMsg2,
    SentMsg3,
    RecvMsg3,
    Done,
    Failed,
}

/// A peer's identity claim, resolved by the caller from the `ID_CRED`
/// carried on the wire (credential-store lookup, out of scope for this
/// core). `pk` is the peer's P-256 public key, usable both to verify a
/// COSE Sign1 signature and, reduced to its x-coordinate, as the other
/// side of a static-DH binding.
pub struct PeerCredential<'a> {
    pub cred: &'a [u8],
    pub pk: BytesP256PublicKey,
}

fn method_for(initiator: AuthKind, responder: AuthKind) -> u8 {
    match (initiator, responder) {
        (AuthKind::Signature, AuthKind::Signature) => 0,
        (AuthKind::Signature, AuthKind::StaticDh) => 1,
        (AuthKind::StaticDh, AuthKind::Signature) => 2,
        (AuthKind::StaticDh, AuthKind::StaticDh) => 3,
    }
}

fn auth_kinds_for_method(method: u8) -> Result<(AuthKind, AuthKind), EdhocError> {
    use AuthKind::*;
    match method {
        0 => Ok((Signature, Signature)),
        1 => Ok((Signature, StaticDh)),
        2 => Ok((StaticDh, Signature)),
        3 => Ok((StaticDh, StaticDh)),
        _ => Err(EdhocError::EdhocMsgFormat),
    }
}

pub struct EdhocSession {
    pub role: EdhocRole,
    pub state: EdhocState,
    suite: CipherSuite,
    initiator_auth_kind: AuthKind,
    responder_auth_kind: AuthKind,
    c_i: u8,
    c_r: u8,
    own_ephemeral_sk: BytesP256ElemLen,
    own_ephemeral_pk: BytesP256ElemLen,
    peer_ephemeral_pk: Option<BytesP256ElemLen>,
    own_auth_sk: BytesP256ElemLen,
    peer_static_pk: Option<BytesP256ElemLen>,
    hash_msg1: Option<BytesHashLen>,
    th2: Option<BytesHashLen>,
    th3: Option<BytesHashLen>,
    th4: Option<BytesHashLen>,
    prk2e: Option<BytesHashLen>,
    prk3e2m: Option<BytesHashLen>,
    prk4x3m: Option<BytesHashLen>,
}

impl Drop for EdhocSession {
    fn drop(&mut self) {
        self.zeroize_secrets();
    }
}

impl EdhocSession {
    fn zeroize_secrets(&mut self) {
        self.own_ephemeral_sk.zeroize();
        self.own_auth_sk.zeroize();
        self.prk2e.zeroize();
        self.prk3e2m.zeroize();
        self.prk4x3m.zeroize();
    }

    fn fail(&mut self) -> EdhocError {
        self.state = EdhocState::Failed;
        self.zeroize_secrets();
        EdhocError::EdhocMsgFormat
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        crypto: &mut impl Crypto,
        role: EdhocRole,
        suite: CipherSuite,
        initiator_auth_kind: AuthKind,
        responder_auth_kind: AuthKind,
        conn_id: u8,
        own_auth_sk: BytesP256ElemLen,
    ) -> Self {
        let (own_ephemeral_sk, own_ephemeral_pk) = crypto.p256_generate_key_pair();
        EdhocSession {
            role,
            state: EdhocState::Init,
            suite,
            initiator_auth_kind,
            responder_auth_kind,
            c_i: if role == EdhocRole::Initiator { conn_id } else { 0 },
            c_r: if role == EdhocRole::Responder { conn_id } else { 0 },
            own_ephemeral_sk,
            own_ephemeral_pk,
            peer_ephemeral_pk: None,
            own_auth_sk,
            peer_static_pk: None,
            hash_msg1: None,
            th2: None,
            th3: None,
            th4: None,
            prk2e: None,
            prk3e2m: None,
            prk4x3m: None,
        }
    }

    fn require_state(&mut self, expected: EdhocState) -> Result<(), EdhocError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EdhocError::EdhocStateUnexpected)
        }
    }

    /// Builds message_1: `[ METHOD, SUITES_I, G_X, C_I, ? AD_1 ]`.
    pub fn msg1_build(
        &mut self,
        crypto: &mut impl Crypto,
        ad_1: Option<&[u8]>,
        out: &mut [u8],
    ) -> Result<usize, EdhocError> {
        self.require_state(EdhocState::Init)?;
        let method = method_for(self.initiator_auth_kind, self.responder_auth_kind);
        let mut cursor = OutCursor::new(out);
        encode_array_header(&mut cursor, if ad_1.is_some() { 5 } else { 4 })?;
        encode_uint(&mut cursor, method as u64)?;
        encode_uint(&mut cursor, self.suite.id as u64)?;
        encode_bytes(&mut cursor, &self.own_ephemeral_pk)?;
        encode_uint(&mut cursor, self.c_i as u64)?;
        if let Some(ad) = ad_1 {
            encode_bytes(&mut cursor, ad)?;
        }
        self.hash_msg1 = Some(crypto.sha256(cursor.written()));
        self.state = EdhocState::SentMsg1;
        Ok(cursor.position())
    }

    /// Parses message_1 on the Responder side.
    pub fn msg1_parse(&mut self, crypto: &mut impl Crypto, wire: &[u8]) -> Result<(), EdhocError> {
        self.require_state(EdhocState::Init)?;
        let mut dec = CborDecoder::new(wire);
        let n = dec.array().map_err(|_| self.fail())?;
        if !(4..=5).contains(&n) {
            return Err(self.fail());
        }
        let method = dec.u8().map_err(|_| self.fail())?;
        let (init_kind, resp_kind) = auth_kinds_for_method(method).map_err(|e| {
            self.state = EdhocState::Failed;
            e
        })?;
        if init_kind != self.initiator_auth_kind || resp_kind != self.responder_auth_kind {
            return Err(self.fail());
        }
        let suite_id = dec.u8().map_err(|_| self.fail())?;
        if suite_id != self.suite.id {
            self.state = EdhocState::Failed;
            return Err(EdhocError::EdhocSuiteUnsupported);
        }
        let g_x = dec.bytes_sized(32).map_err(|_| self.fail())?;
        let mut peer_pk = [0u8; 32];
        peer_pk.copy_from_slice(g_x);
        let c_i = dec.u8().map_err(|_| self.fail())?;
        if n == 5 {
            let _ad_1 = dec.bytes().map_err(|_| self.fail())?;
        }
        if !dec.finished() {
            return Err(self.fail());
        }
        self.peer_ephemeral_pk = Some(peer_pk);
        self.c_i = c_i;
        self.hash_msg1 = Some(crypto.sha256(wire));
        self.state = EdhocState::RecvMsg1;
        Ok(())
    }

    /// `TH_2 = hash( H(msg1) || CBOR(G_Y) || CBOR(C_R) )`. `G_Y` is the
    /// Responder's ephemeral public key: its own on the Responder side,
    /// the peer's (just parsed from message_2) on the Initiator side.
    fn compute_th2(&self, crypto: &mut impl Crypto) -> Result<BytesHashLen, EdhocError> {
        let hash_msg1 = self.hash_msg1.ok_or(EdhocError::EdhocStateUnexpected)?;
        let g_y = match self.role {
            EdhocRole::Responder => self.own_ephemeral_pk,
            EdhocRole::Initiator => self.peer_ephemeral_pk.ok_or(EdhocError::EdhocStateUnexpected)?,
        };
        let mut scratch = [0u8; 96];
        let mut cursor = OutCursor::new(&mut scratch);
        cursor.write(&hash_msg1)?;
        encode_bytes(&mut cursor, &g_y)?;
        encode_uint(&mut cursor, self.c_r as u64)?;
        Ok(crypto.sha256(cursor.written()))
    }

    /// Builds message_2 on the Responder side: `[ G_Y, C_R, CIPHERTEXT_2 ]`.
    pub fn msg2_build(
        &mut self,
        crypto: &mut impl Crypto,
        cred_r: &[u8],
        id_cred_r: &[u8],
        ad_2: Option<&[u8]>,
        peer_initiator_static_pk: Option<&BytesP256ElemLen>,
        out: &mut [u8],
    ) -> Result<usize, EdhocError> {
        self.require_state(EdhocState::RecvMsg1)?;
        let peer_ephemeral_pk = self.peer_ephemeral_pk.ok_or(EdhocError::EdhocStateUnexpected)?;

        let ecdh_2e = crypto.p256_ecdh(&self.own_ephemeral_sk, &peer_ephemeral_pk)?;
        let prk_2e = crypto.hkdf_extract(&[], &ecdh_2e);
        let th_2 = self.compute_th2(crypto)?;

        let prk_3e2m = if self.responder_auth_kind == AuthKind::StaticDh {
            let peer_static = peer_initiator_static_pk.ok_or(EdhocError::EdhocStateUnexpected)?;
            let ecdh_se = crypto.p256_ecdh(&self.own_auth_sk, peer_static)?;
            crypto.hkdf_extract(&prk_2e, &ecdh_se)
        } else {
            prk_2e
        };

        let sig_or_mac_2 = self.build_signature_or_mac(
            crypto,
            self.responder_auth_kind,
            &prk_3e2m,
            &th_2,
            cred_r,
            id_cred_r,
            ad_2,
        )?;

        let mut plaintext_scratch = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut pt = OutCursor::new(&mut plaintext_scratch);
        encode_bytes(&mut pt, id_cred_r)?;
        encode_bytes(&mut pt, sig_or_mac_2.as_slice())?;
        if let Some(ad) = ad_2 {
            encode_bytes(&mut pt, ad)?;
        }
        let plaintext_2 = pt.written();

        let mut keystream = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        derive_via_label(
            crypto,
            self.suite.id,
            &prk_2e,
            &th_2,
            "KEYSTREAM_2",
            &mut keystream[..plaintext_2.len()],
        )?;
        let mut ciphertext_2 = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        for i in 0..plaintext_2.len() {
            ciphertext_2[i] = plaintext_2[i] ^ keystream[i];
        }
        let ciphertext_2 = &ciphertext_2[..plaintext_2.len()];

        let mut cursor = OutCursor::new(out);
        encode_array_header(&mut cursor, 3)?;
        encode_bytes(&mut cursor, &self.own_ephemeral_pk)?;
        encode_uint(&mut cursor, self.c_r as u64)?;
        encode_bytes(&mut cursor, ciphertext_2)?;

        let mut th3_scratch = [0u8; 32 + edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut th3_cursor = OutCursor::new(&mut th3_scratch);
        th3_cursor.write(&th_2)?;
        th3_cursor.write(ciphertext_2)?;
        let th_3 = crypto.sha256(th3_cursor.written());

        self.th2 = Some(th_2);
        self.th3 = Some(th_3);
        self.prk2e = Some(prk_2e);
        self.prk3e2m = Some(prk_3e2m);
        self.state = EdhocState::SentMsg2;
        Ok(cursor.position())
    }

    /// Parses message_2 on the Initiator side, verifying the Responder's
    /// `Signature_or_MAC_2` against the credential the caller resolves from
    /// the `ID_CRED_R` carried in the ciphertext.
    pub fn msg2_parse<'a>(
        &mut self,
        crypto: &mut impl Crypto,
        wire: &[u8],
        fetch_cred_r: impl FnOnce(&[u8]) -> Option<PeerCredential<'a>>,
        ad_2_out: Option<&mut EdhocMessageBuffer>,
    ) -> Result<(), EdhocError> {
        self.require_state(EdhocState::SentMsg1)?;
        let mut dec = CborDecoder::new(wire);
        let n = dec.array().map_err(|_| self.fail())?;
        if n != 3 {
            return Err(self.fail());
        }
        let g_y = dec.bytes_sized(32).map_err(|_| self.fail())?;
        let mut peer_ephemeral_pk = [0u8; 32];
        peer_ephemeral_pk.copy_from_slice(g_y);
        let c_r = dec.u8().map_err(|_| self.fail())?;
        let ciphertext_2 = dec.bytes().map_err(|_| self.fail())?;
        if !dec.finished() || ciphertext_2.len() > edhoc_oscore_shared::MAX_MESSAGE_LEN {
            return Err(self.fail());
        }
        self.peer_ephemeral_pk = Some(peer_ephemeral_pk);
        self.c_r = c_r;

        let ecdh_2e = crypto
            .p256_ecdh(&self.own_ephemeral_sk, &peer_ephemeral_pk)
            .map_err(|_| self.fail())?;
        let prk_2e = crypto.hkdf_extract(&[], &ecdh_2e);
        let th_2 = self.compute_th2(crypto).map_err(|_| self.fail())?;

        let mut keystream = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        derive_via_label(
            crypto,
            self.suite.id,
            &prk_2e,
            &th_2,
            "KEYSTREAM_2",
            &mut keystream[..ciphertext_2.len()],
        )
        .map_err(|_| self.fail())?;
        let mut plaintext_2 = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        for i in 0..ciphertext_2.len() {
            plaintext_2[i] = ciphertext_2[i] ^ keystream[i];
        }
        let plaintext_2 = &plaintext_2[..ciphertext_2.len()];

        let mut pdec = CborDecoder::new(plaintext_2);
        let id_cred_r = pdec.bytes().map_err(|_| self.fail())?;
        let sig_or_mac_2 = pdec.bytes().map_err(|_| self.fail())?;
        let ad_2 = if !pdec.finished() {
            Some(pdec.bytes().map_err(|_| self.fail())?)
        } else {
            None
        };
        if let Some(out) = ad_2_out {
            if let Some(ad) = ad_2 {
                *out = EdhocMessageBuffer::new_from_slice(ad).map_err(|_| self.fail())?;
            }
        }

        let peer = fetch_cred_r(id_cred_r).ok_or_else(|| self.fail())?;

        let mut peer_pk_x = [0u8; 32];
        peer_pk_x.copy_from_slice(&peer.pk[..32]);
        let prk_3e2m = if self.responder_auth_kind == AuthKind::StaticDh {
            let ecdh_se = crypto
                .p256_ecdh(&self.own_ephemeral_sk, &peer_pk_x)
                .map_err(|_| self.fail())?;
            crypto.hkdf_extract(&prk_2e, &ecdh_se)
        } else {
            prk_2e
        };

        self.verify_signature_or_mac(
            crypto,
            self.responder_auth_kind,
            &prk_3e2m,
            &th_2,
            peer.cred,
            id_cred_r,
            ad_2,
            &peer.pk,
            sig_or_mac_2,
        )
        .map_err(|_| self.fail())?;

        self.peer_static_pk = Some({
            let mut x = [0u8; 32];
            x.copy_from_slice(&peer.pk[..32]);
            x
        });

        let mut th3_scratch = [0u8; 32 + edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut th3_cursor = OutCursor::new(&mut th3_scratch);
        th3_cursor.write(&th_2).map_err(|_| self.fail())?;
        th3_cursor.write(ciphertext_2).map_err(|_| self.fail())?;
        let th_3 = crypto.sha256(th3_cursor.written());

        self.th2 = Some(th_2);
        self.th3 = Some(th_3);
        self.prk2e = Some(prk_2e);
        self.prk3e2m = Some(prk_3e2m);
        self.state = EdhocState::RecvMsg2;
        Ok(())
    }

    /// Builds message_3 on the Initiator side: the bare CBOR bytestring
    /// `CIPHERTEXT_3`.
    pub fn msg3_build(
        &mut self,
        crypto: &mut impl Crypto,
        cred_i: &[u8],
        id_cred_i: &[u8],
        ad_3: Option<&[u8]>,
        out: &mut [u8],
    ) -> Result<usize, EdhocError> {
        self.require_state(EdhocState::RecvMsg2)?;
        let prk_3e2m = self.prk3e2m.ok_or(EdhocError::EdhocStateUnexpected)?;
        let th_3 = self.th3.ok_or(EdhocError::EdhocStateUnexpected)?;

        // Must land on the same value the Responder can compute from
        // `own_auth_sk x G_X` alone (it cannot fetch our credential before
        // decrypting message_3): `own_ephemeral(X) x peer_static(G_R)`,
        // `peer_static` having been resolved from the Responder's
        // credential back in `msg2_parse`.
        let prk_4x3m = if self.initiator_auth_kind == AuthKind::StaticDh {
            let peer_static = self.peer_static_pk.ok_or(EdhocError::EdhocStateUnexpected)?;
            let ecdh_se = crypto.p256_ecdh(&self.own_ephemeral_sk, &peer_static)?;
            crypto.hkdf_extract(&prk_3e2m, &ecdh_se)
        } else {
            prk_3e2m
        };

        let sig_or_mac_3 = self.build_signature_or_mac(
            crypto,
            self.initiator_auth_kind,
            &prk_4x3m,
            &th_3,
            cred_i,
            id_cred_i,
            ad_3,
        )?;

        let mut plaintext_scratch = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut pt = OutCursor::new(&mut plaintext_scratch);
        encode_bytes(&mut pt, id_cred_i)?;
        encode_bytes(&mut pt, sig_or_mac_3.as_slice())?;
        if let Some(ad) = ad_3 {
            encode_bytes(&mut pt, ad)?;
        }
        let plaintext_3 = pt.written();

        let mut key = [0u8; 16];
        let mut iv = [0u8; 13];
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_3, "K_3", &mut key[..self.suite.aead_key_len])?;
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_3, "IV_3", &mut iv[..self.suite.aead_iv_len])?;
        let aad = build_a_xae(&th_3)?;

        let mut cursor = OutCursor::new(out);
        let mut ciphertext_3 = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        crypto.aes_ccm_encrypt(
            &key,
            &iv,
            aad.as_slice(),
            plaintext_3,
            &mut ciphertext_3[..plaintext_3.len() + self.suite.aead_tag_len],
        );
        encode_bytes(&mut cursor, &ciphertext_3[..plaintext_3.len() + self.suite.aead_tag_len])?;

        let mut th4_scratch = [0u8; 32 + edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut th4_cursor = OutCursor::new(&mut th4_scratch);
        th4_cursor.write(&th_3)?;
        th4_cursor.write(&ciphertext_3[..plaintext_3.len() + self.suite.aead_tag_len])?;
        let th_4 = crypto.sha256(th4_cursor.written());

        self.th4 = Some(th_4);
        self.prk4x3m = Some(prk_4x3m);
        self.state = EdhocState::SentMsg3;
        Ok(cursor.position())
    }

    /// Parses message_3 on the Responder side and transitions to `Done`.
    pub fn msg3_parse<'a>(
        &mut self,
        crypto: &mut impl Crypto,
        wire: &[u8],
        fetch_cred_i: impl FnOnce(&[u8]) -> Option<PeerCredential<'a>>,
    ) -> Result<(), EdhocError> {
        self.require_state(EdhocState::SentMsg2)?;
        let prk_3e2m = self.prk3e2m.ok_or(EdhocError::EdhocStateUnexpected)?;
        let th_3 = self.th3.ok_or(EdhocError::EdhocStateUnexpected)?;
        let peer_ephemeral_pk = self.peer_ephemeral_pk.ok_or(EdhocError::EdhocStateUnexpected)?;

        let mut dec = CborDecoder::new(wire);
        let ciphertext_3 = dec.bytes().map_err(|_| self.fail())?;
        if !dec.finished() {
            return Err(self.fail());
        }
        if ciphertext_3.len() < self.suite.aead_tag_len {
            return Err(self.fail());
        }

        let prk_4x3m = if self.initiator_auth_kind == AuthKind::StaticDh {
            let ecdh_se = crypto
                .p256_ecdh(&self.own_auth_sk, &peer_ephemeral_pk)
                .map_err(|_| self.fail())?;
            crypto.hkdf_extract(&prk_3e2m, &ecdh_se)
        } else {
            prk_3e2m
        };

        let mut key = [0u8; 16];
        let mut iv = [0u8; 13];
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_3, "K_3", &mut key[..self.suite.aead_key_len])
            .map_err(|_| self.fail())?;
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_3, "IV_3", &mut iv[..self.suite.aead_iv_len])
            .map_err(|_| self.fail())?;
        let aad = build_a_xae(&th_3).map_err(|_| self.fail())?;

        let mut plaintext_3 = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let pt_len = ciphertext_3.len() - self.suite.aead_tag_len;
        crypto
            .aes_ccm_decrypt(&key, &iv, aad.as_slice(), ciphertext_3, &mut plaintext_3[..pt_len])
            .map_err(|_| self.fail())?;
        let plaintext_3 = &plaintext_3[..pt_len];

        let mut pdec = CborDecoder::new(plaintext_3);
        let id_cred_i = pdec.bytes().map_err(|_| self.fail())?;
        let sig_or_mac_3 = pdec.bytes().map_err(|_| self.fail())?;
        let ad_3 = if !pdec.finished() {
            Some(pdec.bytes().map_err(|_| self.fail())?)
        } else {
            None
        };

        let peer = fetch_cred_i(id_cred_i).ok_or_else(|| self.fail())?;

        self.verify_signature_or_mac(
            crypto,
            self.initiator_auth_kind,
            &prk_4x3m,
            &th_3,
            peer.cred,
            id_cred_i,
            ad_3,
            &peer.pk,
            sig_or_mac_3,
        )
        .map_err(|_| self.fail())?;

        let mut th4_scratch = [0u8; 32 + edhoc_oscore_shared::MAX_MESSAGE_LEN];
        let mut th4_cursor = OutCursor::new(&mut th4_scratch);
        th4_cursor.write(&th_3).map_err(|_| self.fail())?;
        th4_cursor.write(ciphertext_3).map_err(|_| self.fail())?;
        let th_4 = crypto.sha256(th4_cursor.written());

        self.th4 = Some(th_4);
        self.prk4x3m = Some(prk_4x3m);
        self.state = EdhocState::Done;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_signature_or_mac(
        &self,
        crypto: &mut impl Crypto,
        kind: AuthKind,
        prk: &BytesHashLen,
        th: &BytesHashLen,
        cred: &[u8],
        id_cred: &[u8],
        ad: Option<&[u8]>,
    ) -> Result<EdhocMessageBuffer, EdhocError> {
        match kind {
            AuthKind::Signature => {
                let sig = sign_message(crypto, &self.own_auth_sk, id_cred, th, cred, ad)?;
                Ok(EdhocMessageBuffer::new_from_slice(&sig)?)
            }
            AuthKind::StaticDh => {
                let mac = build_mac(
                    crypto,
                    self.suite.id,
                    prk,
                    th,
                    "K_xm",
                    "IV_xm",
                    self.suite.aead_key_len,
                    self.suite.aead_iv_len,
                    self.suite.mac_len,
                )?;
                Ok(EdhocMessageBuffer::new_from_slice(&mac[..self.suite.mac_len])?)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn verify_signature_or_mac(
        &self,
        crypto: &mut impl Crypto,
        kind: AuthKind,
        prk: &BytesHashLen,
        th: &BytesHashLen,
        cred: &[u8],
        id_cred: &[u8],
        ad: Option<&[u8]>,
        peer_pk: &BytesP256PublicKey,
        sig_or_mac: &[u8],
    ) -> Result<(), EdhocError> {
        match kind {
            AuthKind::Signature => {
                let mut sig: BytesP256Signature = [0u8; 64];
                if sig_or_mac.len() != 64 {
                    return Err(EdhocError::SignVerifyFail);
                }
                sig.copy_from_slice(sig_or_mac);
                verify_message(crypto, peer_pk, id_cred, th, cred, ad, &sig)
            }
            AuthKind::StaticDh => {
                let expected = build_mac(
                    crypto,
                    self.suite.id,
                    prk,
                    th,
                    "K_xm",
                    "IV_xm",
                    self.suite.aead_key_len,
                    self.suite.aead_iv_len,
                    self.suite.mac_len,
                )?;
                if &expected[..self.suite.mac_len] == sig_or_mac {
                    Ok(())
                } else {
                    Err(EdhocError::CryptoAuth)
                }
            }
        }
    }

    /// Exports `OSCORE Master Secret` (16 B) and `OSCORE Master Salt` (8 B)
    /// from `PRK_4x3m` and `TH_4`.
    pub fn export(&self, crypto: &mut impl Crypto, master_secret: &mut [u8; 16], master_salt: &mut [u8; 8]) -> Result<(), EdhocError> {
        if self.state != EdhocState::Done {
            return Err(EdhocError::EdhocStateUnexpected);
        }
        let prk_4x3m = self.prk4x3m.ok_or(EdhocError::EdhocStateUnexpected)?;
        let th_4 = self.th4.ok_or(EdhocError::EdhocStateUnexpected)?;
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_4, "OSCORE Master Secret", master_secret)?;
        derive_via_label(crypto, self.suite.id, &prk_4x3m, &th_4, "OSCORE Master Salt", master_salt)?;
        Ok(())
    }
}
