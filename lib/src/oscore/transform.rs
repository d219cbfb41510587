//! The CoAP↔OSCORE transform (component C10): splits options into E/U
//! classes, drives AEAD protect/unprotect through the nonce/AAD builder
//! (C8) and security context (C9), and reassembles the opposite packet
//! kind. Grounded on `uoscore-uedhoc`'s `oscore2coap.c` —
//! `oscore_option_parser`, `options_from_oscore_reorder` and
//! `oscore_decrypted_payload_parser` are the direct model for
//! `split_options`, `merge_options` and `parse_inner_payload` below, kept in
//! the same order: classify, transform, merge-by-ascending-number.

use edhoc_oscore_shared::{Crypto, OscoreAadBuffer, OscoreError, OSCORE_NONCE_LEN};

use crate::coap::{self, CoapHeader, CoapOption, CoapPacket, OptionList};
use crate::oscore::aad::{build_aad, build_nonce};
use crate::oscore::context::{piv_to_u64, OscoreContext};
use crate::oscore::option;

const OPT_URI_HOST: u16 = 3;
const OPT_OBSERVE: u16 = 6;
const OPT_URI_PORT: u16 = 7;
const OPT_MAX_AGE: u16 = 14;
const OPT_OSCORE: u16 = coap::OPTION_OSCORE;
const OPT_PROXY_URI: u16 = 35;
const OPT_PROXY_SCHEME: u16 = 39;

/// Outer code CoAP/OSCORE uses to carry a protected request: the real
/// method lives inside the ciphertext, so the outer code is just POST.
const OUTER_REQUEST_CODE: u8 = 0x02;
/// Outer code used for a protected response: `2.04 Changed`, for the same
/// reason.
const OUTER_RESPONSE_CODE: u8 = 0x44;

/// `true` if `number` is a U-class (unprotected, outer) option; all other
/// option numbers are E-class (protected, carried inside the ciphertext).
pub fn is_u_class(number: u16) -> bool {
    matches!(
        number,
        OPT_URI_HOST | OPT_URI_PORT | OPT_PROXY_URI | OPT_PROXY_SCHEME | OPT_MAX_AGE | OPT_OBSERVE | OPT_OSCORE
    )
}

fn split_options<'a>(options: &OptionList<'a>) -> Result<(OptionList<'a>, OptionList<'a>), OscoreError> {
    let mut u_opts = OptionList::new();
    let mut e_opts = OptionList::new();
    for opt in options.iter() {
        if opt.number == OPT_OSCORE {
            continue;
        }
        if is_u_class(opt.number) {
            u_opts.push(opt)?;
        } else {
            e_opts.push(opt)?;
        }
    }
    Ok((u_opts, e_opts))
}

/// Merges U- and E-options by ascending option number. When both contain
/// the same number, U is emitted before E (the tie-break this design pins,
/// per the spec's open question on the source's ambiguous reorder).
fn merge_options<'a>(u_opts: &OptionList<'a>, e_opts: &OptionList<'a>) -> Result<OptionList<'a>, OscoreError> {
    let mut merged = OptionList::new();
    let mut ui = u_opts.iter().peekable();
    let mut ei = e_opts.iter().peekable();
    loop {
        match (ui.peek().copied(), ei.peek().copied()) {
            (Some(u), Some(e)) => {
                if u.number <= e.number {
                    merged.push(u)?;
                    ui.next();
                } else {
                    merged.push(e)?;
                    ei.next();
                }
            }
            (Some(u), None) => {
                merged.push(u)?;
                ui.next();
            }
            (None, Some(e)) => {
                merged.push(e)?;
                ei.next();
            }
            (None, None) => break,
        }
    }
    Ok(merged)
}

/// The per-exchange nonce/AAD binding a request to its paired response
/// (data model's `RequestResponseContext`). Populated when a request is
/// sent (client) or received (server); consumed by the matching response.
#[derive(Clone, Copy)]
pub struct ExchangeContext {
    id: edhoc_oscore_shared::OscoreIdBuffer,
    nonce: [u8; OSCORE_NONCE_LEN],
    aad: OscoreAadBuffer,
}

fn build_inner_plaintext(
    code: u8,
    e_opts: &OptionList<'_>,
    payload: Option<&[u8]>,
    out: &mut edhoc_oscore_shared::CoapMessageBuffer,
) -> Result<(), OscoreError> {
    out.push(code)?;
    coap::write_options_and_payload(out, e_opts.iter(), payload)
}

/// Encrypts a plaintext CoAP packet into its OSCORE-protected form
/// (`coap2oscore`). `own_piv`, when building a response, lets the responder
/// include its own Partial IV instead of reusing the paired request's nonce.
pub fn coap2oscore(
    crypto: &mut impl Crypto,
    ctx: &mut OscoreContext,
    exchange: &mut Option<ExchangeContext>,
    own_piv: Option<&[u8]>,
    packet: &CoapPacket<'_>,
    out: &mut edhoc_oscore_shared::CoapMessageBuffer,
) -> Result<(), OscoreError> {
    let (u_opts, e_opts) = split_options(&packet.options)?;

    let mut plaintext = edhoc_oscore_shared::CoapMessageBuffer::new();
    build_inner_plaintext(packet.header.code, &e_opts, packet.payload, &mut plaintext)?;

    let is_request = packet.header.is_request();

    let mut piv_buf = [0u8; 5];
    let (nonce, aad, piv_slice): (_, _, Option<&[u8]>) = if is_request {
        let piv_len = ctx.next_piv(&mut piv_buf)?;
        let piv = &piv_buf[..piv_len];
        let nonce = build_nonce(ctx.sender_id.as_slice(), piv, &ctx.common_iv);
        let aad = build_aad(ctx.aead_id, ctx.sender_id.as_slice(), piv)?;
        *exchange = Some(ExchangeContext {
            id: ctx.sender_id,
            nonce,
            aad,
        });
        (nonce, aad, Some(piv))
    } else if let Some(piv) = own_piv {
        // RFC 8613 §5.4: the AAD's request_kid/request_piv are always the
        // paired request's, even when the response carries its own Partial
        // IV — only the nonce is rederived from that PIV.
        let ex = exchange.take().ok_or(OscoreError::OscoreInPktInvalidTag)?;
        let nonce = build_nonce(ex.id.as_slice(), piv, &ctx.common_iv);
        (nonce, ex.aad, Some(piv))
    } else {
        let ex = exchange.take().ok_or(OscoreError::OscoreInPktInvalidTag)?;
        (ex.nonce, ex.aad, None)
    };

    let tag_len = edhoc_oscore_shared::AES_CCM_TAG_LEN;
    let mut ciphertext = edhoc_oscore_shared::CoapMessageBuffer::new();
    let mut ciphertext_scratch = [0u8; edhoc_oscore_shared::MAX_COAP_PACKET_LEN];
    crypto.aes_ccm_encrypt(
        &ctx.sender_key,
        &nonce,
        aad.as_slice(),
        plaintext.as_slice(),
        &mut ciphertext_scratch[..plaintext.len() + tag_len],
    );
    ciphertext.extend_from_slice(&ciphertext_scratch[..plaintext.len() + tag_len])?;

    let mut option_value = edhoc_oscore_shared::OscoreOptionBuffer::new();
    let kid = if is_request { Some(ctx.sender_id.as_slice()) } else { None };
    let kid_context = if is_request { ctx.id_context.as_ref().map(|b| b.as_slice()) } else { None };
    option::build(&mut option_value, piv_slice, kid_context, kid)?;

    let mut all_opts = u_opts;
    all_opts.push(CoapOption { number: OPT_OSCORE, value: option_value.as_slice() })?;
    // Re-sort: the OSCORE option (9) may need to move relative to other
    // U-options depending on which numbers those are.
    let mut sorted = OptionList::new();
    {
        let mut items: [Option<CoapOption<'_>>; edhoc_oscore_shared::MAX_OPTIONS] = [None; edhoc_oscore_shared::MAX_OPTIONS];
        let mut n = 0;
        for o in all_opts.iter() {
            items[n] = Some(o);
            n += 1;
        }
        for i in 1..n {
            let mut j = i;
            while j > 0 && items[j - 1].unwrap().number > items[j].unwrap().number {
                items.swap(j - 1, j);
                j -= 1;
            }
        }
        for o in items[..n].iter().flatten() {
            sorted.push(*o)?;
        }
    }

    let outer_code = if is_request { OUTER_REQUEST_CODE } else { OUTER_RESPONSE_CODE };
    let outer = CoapPacket {
        header: CoapHeader { code: outer_code, ..packet.header },
        token: packet.token,
        options: sorted,
        payload: Some(ciphertext.as_slice()),
    };
    coap::write(&outer, out)
}

/// Decrypts an OSCORE-protected packet back into plaintext CoAP
/// (`oscore2coap`). Returns `is_oscore = false` and a verbatim copy of the
/// input when no OSCORE option is present.
pub fn oscore2coap(
    crypto: &mut impl Crypto,
    ctx: &mut OscoreContext,
    exchange: &mut Option<ExchangeContext>,
    wire: &[u8],
    out: &mut edhoc_oscore_shared::CoapMessageBuffer,
) -> Result<bool, OscoreError> {
    let packet = coap::parse(wire).map_err(|_| OscoreError::CborFormat)?;
    let oscore_opt = packet.options.get(OPT_OSCORE);
    let Some(oscore_opt) = oscore_opt else {
        coap::write(&packet, out)?;
        return Ok(false);
    };

    let compressed = option::parse(oscore_opt.value)?;
    let is_request = packet.header.is_request();

    let (nonce, aad, piv_u64) = if is_request {
        let kid = compressed.kid.unwrap_or(&[]);
        if kid != ctx.recipient_id.as_slice() {
            return Err(OscoreError::OscoreKidRecipentIdMismatch);
        }
        let piv = compressed.piv.ok_or(OscoreError::OscoreInPktInvalidPiv)?;
        let piv_u64 = piv_to_u64(piv);
        ctx.check_replay(piv_u64)?;
        let nonce = build_nonce(kid, piv, &ctx.common_iv);
        let aad = build_aad(ctx.aead_id, kid, piv)?;
        *exchange = Some(ExchangeContext {
            id: edhoc_oscore_shared::OscoreIdBuffer::new_from_slice(kid)?,
            nonce,
            aad,
        });
        (nonce, aad, Some(piv_u64))
    } else if let Some(piv) = compressed.piv {
        // Mirror of the encode side: the AAD stays bound to the paired
        // request's kid/piv; only the nonce is rederived from the
        // response's own Partial IV.
        let ex = exchange.take().ok_or(OscoreError::OscoreInPktInvalidTag)?;
        let nonce = build_nonce(ex.id.as_slice(), piv, &ctx.common_iv);
        (nonce, ex.aad, None)
    } else {
        let ex = exchange.take().ok_or(OscoreError::OscoreInPktInvalidTag)?;
        (ex.nonce, ex.aad, None)
    };

    let tag_len = edhoc_oscore_shared::AES_CCM_TAG_LEN;
    let ciphertext = packet.payload.unwrap_or(&[]);
    if ciphertext.len() < tag_len {
        return Err(OscoreError::OscoreInPktInvalidTag);
    }
    let pt_len = ciphertext.len() - tag_len;
    let mut plaintext = [0u8; edhoc_oscore_shared::MAX_COAP_PACKET_LEN];
    crypto.aes_ccm_decrypt(&ctx.recipient_key, &nonce, aad.as_slice(), ciphertext, &mut plaintext[..pt_len])?;
    let plaintext = &plaintext[..pt_len];

    if let (true, Some(piv_u64)) = (is_request, piv_u64) {
        ctx.commit_replay(piv_u64);
    }

    let inner_code = *plaintext.first().ok_or(OscoreError::CborFormat)?;
    let (e_opts, inner_payload) = coap::parse_options_and_payload(&plaintext[1..])?;

    let (u_opts, _) = split_options(&packet.options)?;
    let merged = merge_options(&u_opts, &e_opts)?;

    let inner_packet = CoapPacket {
        header: CoapHeader { code: inner_code, ..packet.header },
        token: packet.token,
        options: merged,
        payload: inner_payload,
    };
    coap::write(&inner_packet, out)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscore::context::{OscoreContext, OscoreInitParams};
    use edhoc_oscore_crypto::default_crypto;

    fn ctx_pair() -> (OscoreContext, OscoreContext) {
        let mut crypto = default_crypto();
        let master_secret: [u8; 16] = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
        ];
        let master_salt = [0x9E, 0x7C, 0xA9, 0x22, 0x23, 0x78, 0x63, 0x40];
        let client = OscoreContext::new(
            &mut crypto,
            &OscoreInitParams {
                master_secret: &master_secret,
                master_salt: &master_salt,
                sender_id: &[],
                recipient_id: &[0x01],
                id_context: None,
                aead_id: 10,
            },
        )
        .unwrap();
        let server = OscoreContext::new(
            &mut crypto,
            &OscoreInitParams {
                master_secret: &master_secret,
                master_salt: &master_salt,
                sender_id: &[0x01],
                recipient_id: &[],
                id_context: None,
                aead_id: 10,
            },
        )
        .unwrap();
        (client, server)
    }

    #[test]
    fn request_roundtrips_client_to_server() {
        let mut crypto = default_crypto();
        let (mut client, mut server) = ctx_pair();

        let req_wire = [
            0x44, 0x01, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74, 0x83,
            0x74, 0x76, 0x31,
        ];
        let packet = coap::parse(&req_wire).unwrap();

        let mut client_exchange = None;
        let mut protected = edhoc_oscore_shared::CoapMessageBuffer::new();
        coap2oscore(&mut crypto, &mut client, &mut client_exchange, None, &packet, &mut protected).unwrap();

        let mut server_exchange = None;
        let mut recovered = edhoc_oscore_shared::CoapMessageBuffer::new();
        let is_oscore = oscore2coap(&mut crypto, &mut server, &mut server_exchange, protected.as_slice(), &mut recovered).unwrap();
        assert!(is_oscore);

        let recovered_packet = coap::parse(recovered.as_slice()).unwrap();
        assert_eq!(recovered_packet.header.code, packet.header.code);
        assert_eq!(recovered_packet.token, packet.token);
        assert_eq!(recovered_packet.payload, packet.payload);
        assert!(server_exchange.is_some());
    }

    #[test]
    fn response_without_piv_reuses_request_nonce() {
        let mut crypto = default_crypto();
        let (mut client, mut server) = ctx_pair();

        let req_wire = [0x44u8, 0x01, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74];
        let req_packet = coap::parse(&req_wire).unwrap();
        let mut client_exchange = None;
        let mut protected_req = edhoc_oscore_shared::CoapMessageBuffer::new();
        coap2oscore(&mut crypto, &mut client, &mut client_exchange, None, &req_packet, &mut protected_req).unwrap();

        let mut server_exchange = None;
        let mut recovered_req = edhoc_oscore_shared::CoapMessageBuffer::new();
        oscore2coap(&mut crypto, &mut server, &mut server_exchange, protected_req.as_slice(), &mut recovered_req).unwrap();

        let resp_wire = [0x64u8, 0x45, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0xFF, b'H', b'i'];
        let resp_packet = coap::parse(&resp_wire).unwrap();
        let mut protected_resp = edhoc_oscore_shared::CoapMessageBuffer::new();
        coap2oscore(&mut crypto, &mut server, &mut server_exchange, None, &resp_packet, &mut protected_resp).unwrap();
        assert!(server_exchange.is_none());

        let mut recovered_resp = edhoc_oscore_shared::CoapMessageBuffer::new();
        oscore2coap(&mut crypto, &mut client, &mut client_exchange, protected_resp.as_slice(), &mut recovered_resp).unwrap();
        assert!(client_exchange.is_none());

        let final_packet = coap::parse(recovered_resp.as_slice()).unwrap();
        assert_eq!(final_packet.payload, Some(&b"Hi"[..]));
        assert_eq!(final_packet.header.code, 0x45);
    }

    #[test]
    fn passthrough_when_no_oscore_option() {
        let mut crypto = default_crypto();
        let (_, mut server) = ctx_pair();
        let wire = [0x40u8, 0x01, 0x00, 0x01];
        let mut out = edhoc_oscore_shared::CoapMessageBuffer::new();
        let mut exchange = None;
        let is_oscore = oscore2coap(&mut crypto, &mut server, &mut exchange, &wire, &mut out).unwrap();
        assert!(!is_oscore);
        assert_eq!(out.as_slice(), &wire);
    }
}
