//! The EDHOC associated-data builder (component C4): `A_Xae`, HKDF `info`,
//! and the `Signature_or_MAC` message, as laid out in the EDHOC
//! authentication step of the state machine.

use edhoc_oscore_shared::{
    encode_array_header, encode_bytes, encode_text, encode_uint, AadBuffer, BytesHashLen,
    BytesMac, BytesP256ElemLen, BytesP256Signature, Crypto, EdhocError, InfoBuffer, OutCursor,
};

/// Builds the COSE `Encrypt0` `external_aad`, `A_Xae = [ "Encrypt0", h'', TH_x ]`,
/// used as the AAD for the static-DH MAC and for message_3's ciphertext.
pub fn build_a_xae(th: &BytesHashLen) -> Result<AadBuffer, EdhocError> {
    let mut scratch = [0u8; AadBuffer::CAPACITY];
    let mut cursor = OutCursor::new(&mut scratch);
    encode_array_header(&mut cursor, 3)?;
    encode_text(&mut cursor, "Encrypt0")?;
    encode_bytes(&mut cursor, &[])?;
    encode_bytes(&mut cursor, th)?;
    Ok(AadBuffer::new_from_slice(cursor.written())?)
}

/// Builds the HKDF `info = [ AEAD_id, TH_x, label_text, L ]` structure that
/// keys every derivation off the transcript hash and a COSE context label.
pub fn build_info(aead_id: u8, th: &BytesHashLen, label: &str, length: usize) -> Result<InfoBuffer, EdhocError> {
    let mut scratch = [0u8; InfoBuffer::CAPACITY];
    let mut cursor = OutCursor::new(&mut scratch);
    encode_array_header(&mut cursor, 4)?;
    encode_uint(&mut cursor, aead_id as u64)?;
    encode_bytes(&mut cursor, th)?;
    encode_text(&mut cursor, label)?;
    encode_uint(&mut cursor, length as u64)?;
    Ok(InfoBuffer::new_from_slice(cursor.written())?)
}

/// Derives a key or IV of `out.len()` bytes via `HKDF-Expand(prk, info(label, th, out.len()), out.len())`.
pub fn derive_via_label(
    crypto: &mut impl Crypto,
    aead_id: u8,
    prk: &BytesHashLen,
    th: &BytesHashLen,
    label: &str,
    out: &mut [u8],
) -> Result<(), EdhocError> {
    let info = build_info(aead_id, th, label, out.len())?;
    crypto.hkdf_expand(prk, info.as_slice(), out)?;
    Ok(())
}

/// Computes the static-DH authentication MAC:
/// `MAC_x = AEAD-Encrypt(K_xm, IV_xm, aad = A_xae, pt = "")`, the tag being
/// the MAC itself (message_x carries no ciphertext in the static-DH case).
pub fn build_mac(
    crypto: &mut impl Crypto,
    aead_id: u8,
    prk: &BytesHashLen,
    th: &BytesHashLen,
    key_label: &str,
    iv_label: &str,
    key_len: usize,
    iv_len: usize,
    mac_len: usize,
) -> Result<BytesMac, EdhocError> {
    let mut key = [0u8; 16];
    let mut iv = [0u8; 13];
    derive_via_label(crypto, aead_id, prk, th, key_label, &mut key[..key_len])?;
    derive_via_label(crypto, aead_id, prk, th, iv_label, &mut iv[..iv_len])?;
    let aad = build_a_xae(th)?;
    let mut mac: BytesMac = [0u8; 8];
    crypto.aes_ccm_encrypt(&key, &iv, aad.as_slice(), &[], &mut mac[..mac_len]);
    Ok(mac)
}

/// Builds the COSE `Sig_structure`-like `M_x` that gets signed or verified:
/// `M_x = [ "Signature1", << ID_CRED_x >>, << TH_x, CRED_x, ? AD_x >>, bstr ]`.
pub fn build_sig_structure(
    id_cred_x: &[u8],
    th: &BytesHashLen,
    cred_x: &[u8],
    ad_x: Option<&[u8]>,
    out: &mut [u8; edhoc_oscore_shared::MAX_MESSAGE_LEN],
) -> Result<usize, EdhocError> {
    let mut inner_scratch = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
    let mut inner = OutCursor::new(&mut inner_scratch);
    encode_array_header(&mut inner, if ad_x.is_some() { 3 } else { 2 })?;
    encode_bytes(&mut inner, th)?;
    encode_bytes(&mut inner, cred_x)?;
    if let Some(ad) = ad_x {
        encode_bytes(&mut inner, ad)?;
    }
    let external_aad = inner.written();

    let mut body_scratch = [0u8; 64];
    let mut body = OutCursor::new(&mut body_scratch);
    encode_bytes(&mut body, id_cred_x)?;
    let body_protected = body.written();

    let mut cursor = OutCursor::new(out);
    encode_array_header(&mut cursor, 4)?;
    encode_text(&mut cursor, "Signature1")?;
    encode_bytes(&mut cursor, body_protected)?;
    encode_bytes(&mut cursor, external_aad)?;
    encode_bytes(&mut cursor, &[])?;
    Ok(cursor.position())
}

pub fn sign_message(
    crypto: &mut impl Crypto,
    sk: &BytesP256ElemLen,
    id_cred_x: &[u8],
    th: &BytesHashLen,
    cred_x: &[u8],
    ad_x: Option<&[u8]>,
) -> Result<BytesP256Signature, EdhocError> {
    let mut buf = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
    let len = build_sig_structure(id_cred_x, th, cred_x, ad_x, &mut buf)?;
    crypto.p256_sign(sk, &buf[..len])
}

pub fn verify_message(
    crypto: &mut impl Crypto,
    pk: &edhoc_oscore_shared::BytesP256PublicKey,
    id_cred_x: &[u8],
    th: &BytesHashLen,
    cred_x: &[u8],
    ad_x: Option<&[u8]>,
    signature: &BytesP256Signature,
) -> Result<(), EdhocError> {
    let mut buf = [0u8; edhoc_oscore_shared::MAX_MESSAGE_LEN];
    let len = build_sig_structure(id_cred_x, th, cred_x, ad_x, &mut buf)?;
    crypto.p256_verify(pk, &buf[..len], signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_xae_has_expected_shape() {
        let th = [0x11u8; 32];
        let aad = build_a_xae(&th).unwrap();
        assert_eq!(aad.as_slice()[0], 0x83); // array(3)
        assert_eq!(&aad.as_slice()[aad.len() - 32..], &th);
    }

    #[test]
    fn info_carries_requested_length() {
        let th = [0x22u8; 32];
        let info = build_info(10, &th, "K_2m", 16).unwrap();
        assert_eq!(*info.as_slice().last().unwrap(), 16);
    }
}
