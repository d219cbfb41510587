//! The OSCORE security context (component C9): HKDF-derived Sender/Recipient
//! keys and Common IV, the monotonic sender sequence number, and the
//! recipient's replay window. Grounded on `uoscore-uedhoc`'s
//! `security_context.c` derivation loop (not in the retrieved excerpt) and
//! on the `context_update`/`array_equals` calls `oscore2coap.c` makes
//! against it; the `info` structure itself reuses the teacher's
//! CBOR-array-builder idiom already used for EDHOC's `info` in
//! [`crate::edhoc::ad`].

use zeroize::Zeroize;

use edhoc_oscore_shared::{
    encode_array_header, encode_bytes, encode_text, encode_uint, BytesCcmKeyLen, BytesOscoreNonce,
    IdContextBuffer, OscoreError, OscoreIdBuffer, OutCursor,
};

/// Sender sequence numbers and PIVs are carried on 5 bytes; RFC 8613 §3.2.2
/// bounds the SSN at `2^40 - 1` so it never needs a 6th.
pub const MAX_SSN: u64 = (1 << 40) - 1;

const DEFAULT_REPLAY_WINDOW_SIZE: u32 = 32;

/// Derives `Sender Key`, `Recipient Key` or `Common IV` from the master
/// PRK: `HKDF-Expand(PRK, info = [id, id_context, alg, label, L], L)`.
fn derive(
    crypto: &mut impl edhoc_oscore_shared::Crypto,
    prk: &edhoc_oscore_shared::BytesHashLen,
    id: &[u8],
    id_context: Option<&[u8]>,
    alg: u8,
    label: &str,
    out: &mut [u8],
) -> Result<(), OscoreError> {
    let mut scratch = [0u8; 64];
    let mut cursor = OutCursor::new(&mut scratch);
    encode_array_header(&mut cursor, 5)?;
    encode_bytes(&mut cursor, id)?;
    encode_bytes(&mut cursor, id_context.unwrap_or(&[]))?;
    encode_uint(&mut cursor, alg as u64)?;
    encode_text(&mut cursor, label)?;
    encode_uint(&mut cursor, out.len() as u64)?;
    crypto.hkdf_expand(prk, cursor.written(), out)?;
    Ok(())
}

/// Parameters needed to initialize an [`OscoreContext`] (RFC 8613 §3.2).
pub struct OscoreInitParams<'a> {
    pub master_secret: &'a [u8; 16],
    pub master_salt: &'a [u8],
    pub sender_id: &'a [u8],
    pub recipient_id: &'a [u8],
    pub id_context: Option<&'a [u8]>,
    pub aead_id: u8,
}

/// The algorithm-and-key material shared by sender and recipient, plus the
/// per-direction sequence state.
pub struct OscoreContext {
    pub aead_id: u8,
    pub id_context: Option<IdContextBuffer>,
    pub common_iv: BytesOscoreNonce,
    pub sender_id: OscoreIdBuffer,
    pub sender_key: BytesCcmKeyLen,
    pub sender_ssn: u64,
    pub recipient_id: OscoreIdBuffer,
    pub recipient_key: BytesCcmKeyLen,
    replay_high_watermark: Option<u64>,
    replay_window: u64,
}

impl Drop for OscoreContext {
    fn drop(&mut self) {
        self.sender_key.zeroize();
        self.recipient_key.zeroize();
    }
}

impl OscoreContext {
    pub fn new(crypto: &mut impl edhoc_oscore_shared::Crypto, params: &OscoreInitParams<'_>) -> Result<Self, OscoreError> {
        let prk = crypto.hkdf_extract(params.master_salt, params.master_secret);

        let mut sender_key = [0u8; 16];
        derive(crypto, &prk, params.sender_id, params.id_context, params.aead_id, "Key", &mut sender_key)?;
        let mut recipient_key = [0u8; 16];
        derive(crypto, &prk, params.recipient_id, params.id_context, params.aead_id, "Key", &mut recipient_key)?;
        let mut common_iv = [0u8; 13];
        derive(crypto, &prk, &[], params.id_context, params.aead_id, "IV", &mut common_iv)?;

        Ok(OscoreContext {
            aead_id: params.aead_id,
            id_context: match params.id_context {
                Some(ctx) => Some(IdContextBuffer::new_from_slice(ctx)?),
                None => None,
            },
            common_iv,
            sender_id: OscoreIdBuffer::new_from_slice(params.sender_id)?,
            sender_key,
            sender_ssn: 0,
            recipient_id: OscoreIdBuffer::new_from_slice(params.recipient_id)?,
            recipient_key,
            replay_high_watermark: None,
            replay_window: 0,
        })
    }

    /// Reads-then-increments the sender sequence number, returning the PIV
    /// value (shortest big-endian form) to use for the message about to be
    /// protected.
    pub fn next_piv(&mut self, out: &mut [u8; 5]) -> Result<usize, OscoreError> {
        if self.sender_ssn > MAX_SSN {
            return Err(OscoreError::OscoreSsnOverflow);
        }
        let ssn = self.sender_ssn;
        self.sender_ssn += 1;
        let be = ssn.to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(7);
        let len = (8 - first_nonzero).max(1);
        out[..len].copy_from_slice(&be[8 - len..]);
        Ok(len)
    }

    /// Checks an incoming PIV against the replay window and, only once the
    /// caller's AEAD verification has succeeded, commits it via
    /// [`OscoreContext::commit_replay`]. Per the design note in §9, the
    /// window must not advance before authentication succeeds.
    pub fn check_replay(&self, piv: u64) -> Result<(), OscoreError> {
        match self.replay_high_watermark {
            None => Ok(()),
            Some(high) => {
                if piv > high {
                    Ok(())
                } else if high - piv >= DEFAULT_REPLAY_WINDOW_SIZE as u64 {
                    Err(OscoreError::OscoreReplay)
                } else if self.replay_window & (1 << (high - piv)) != 0 {
                    Err(OscoreError::OscoreReplay)
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn commit_replay(&mut self, piv: u64) {
        match self.replay_high_watermark {
            None => {
                self.replay_high_watermark = Some(piv);
                self.replay_window = 1;
            }
            Some(high) if piv > high => {
                let shift = (piv - high).min(64) as u32;
                self.replay_window = self.replay_window.checked_shl(shift).unwrap_or(0) | 1;
                self.replay_high_watermark = Some(piv);
            }
            Some(high) => {
                self.replay_window |= 1 << (high - piv);
            }
        }
    }
}

pub fn piv_to_u64(piv: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[8 - piv.len()..].copy_from_slice(piv);
    u64::from_be_bytes(buf)
}
