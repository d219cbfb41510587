//! The OSCORE nonce and AAD builder (component C8), per RFC 8613 §5.2–5.4.
//! Grounded on `uoscore-uedhoc`'s `nonce.c`/`aad.c` (not present in the
//! retrieved excerpt — only `oscore2coap.c` consumes their output via
//! `c->rrc.nonce`/`c->rrc.aad`) and on the teacher's CBOR-array AAD builder
//! pattern already used for EDHOC's `A_Xae` in [`crate::edhoc`].

use edhoc_oscore_shared::{
    encode_array_header, encode_bytes, encode_text, encode_uint, BytesOscoreNonce, OscoreAadBuffer,
    OscoreError, OutCursor, OSCORE_NONCE_LEN,
};

/// Builds the 13-byte AEAD nonce: `(ID_PIV_length_byte || left-padded ID
/// (7 B) || left-padded PIV (5 B)) XOR Common_IV`. The ID field is
/// `nonce_length - 6` bytes wide (7, for the 13-byte nonce this core uses);
/// the PIV field is always 5 bytes, big-endian right-aligned.
pub fn build_nonce(id: &[u8], piv: &[u8], common_iv: &BytesOscoreNonce) -> BytesOscoreNonce {
    const ID_FIELD_LEN: usize = OSCORE_NONCE_LEN - 6;
    let mut padded = [0u8; OSCORE_NONCE_LEN];
    padded[0] = id.len() as u8;
    let id_start = 1 + (ID_FIELD_LEN - id.len());
    padded[id_start..1 + ID_FIELD_LEN].copy_from_slice(id);
    let piv_start = OSCORE_NONCE_LEN - piv.len();
    padded[piv_start..].copy_from_slice(piv);

    let mut nonce = [0u8; OSCORE_NONCE_LEN];
    for i in 0..OSCORE_NONCE_LEN {
        nonce[i] = padded[i] ^ common_iv[i];
    }
    nonce
}

/// Builds the COSE `Enc_structure = [ "Encrypt0", h'', external_aad ]` used
/// as AEAD AAD, where `external_aad = [ 1, [alg_aead], KID, PIV, h'' ]`
/// (empty options bstr per RFC 8613 §5.4).
pub fn build_aad(alg_aead: u8, kid: &[u8], piv: &[u8]) -> Result<OscoreAadBuffer, OscoreError> {
    let mut inner_scratch = [0u8; 32];
    let mut inner = OutCursor::new(&mut inner_scratch);
    encode_array_header(&mut inner, 5)?;
    encode_uint(&mut inner, 1)?;
    encode_array_header(&mut inner, 1)?;
    encode_uint(&mut inner, alg_aead as u64)?;
    encode_bytes(&mut inner, kid)?;
    encode_bytes(&mut inner, piv)?;
    encode_bytes(&mut inner, &[])?;
    let external_aad = inner.written();

    let mut scratch = [0u8; OscoreAadBuffer::CAPACITY];
    let mut cursor = OutCursor::new(&mut scratch);
    encode_array_header(&mut cursor, 3)?;
    encode_text(&mut cursor, "Encrypt0")?;
    encode_bytes(&mut cursor, &[])?;
    encode_bytes(&mut cursor, external_aad)?;
    Ok(OscoreAadBuffer::new_from_slice(cursor.written())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_common_iv_when_id_and_piv_are_zero() {
        // RFC 8613 Appendix C.4's request nonce: SID = empty, PIV = 00,
        // Common IV = 4622D4DD6D944168EEFB54987C. With ID and PIV both the
        // all-zero case, the padded frame is all zeros, so the nonce is
        // exactly the Common IV.
        let common_iv = [
            0x46, 0x22, 0xD4, 0xDD, 0x6D, 0x94, 0x41, 0x68, 0xEE, 0xFB, 0x54, 0x98, 0x7C,
        ];
        let nonce = build_nonce(&[], &[0x00], &common_iv);
        assert_eq!(nonce, common_iv);
    }

    #[test]
    fn aad_has_expected_shape() {
        let aad = build_aad(10, &[], &[0x00]).unwrap();
        assert_eq!(aad.as_slice()[0], 0x83); // array(3)
    }
}
