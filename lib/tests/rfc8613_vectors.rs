//! Whole-packet checks against RFC 8613 Appendix C's worked examples: a
//! client protecting a request with (T1) and without (T3) a master salt, a
//! client protecting a request under a non-empty ID context (T5), a server
//! protecting the matching response with and without its own Partial IV
//! (T2, T7), and a server deriving its security context under a non-empty
//! ID context (T6).

use edhoc_oscore::coap;
use edhoc_oscore::oscore::{coap2oscore, oscore2coap, OscoreContext, OscoreInitParams};
use edhoc_oscore_crypto::default_crypto;
use edhoc_oscore_shared::CoapMessageBuffer;

const MASTER_SECRET: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
];
const MASTER_SALT: [u8; 8] = [0x9E, 0x7C, 0xA9, 0x22, 0x23, 0x78, 0x63, 0x40];

fn client_context() -> OscoreContext {
    let mut crypto = default_crypto();
    OscoreContext::new(
        &mut crypto,
        &OscoreInitParams {
            master_secret: &MASTER_SECRET,
            master_salt: &MASTER_SALT,
            sender_id: &[],
            recipient_id: &[0x01],
            id_context: None,
            aead_id: 10,
        },
    )
    .unwrap()
}

fn server_context() -> OscoreContext {
    let mut crypto = default_crypto();
    OscoreContext::new(
        &mut crypto,
        &OscoreInitParams {
            master_secret: &MASTER_SECRET,
            master_salt: &MASTER_SALT,
            sender_id: &[0x01],
            recipient_id: &[],
            id_context: None,
            aead_id: 10,
        },
    )
    .unwrap()
}

/// RFC 8613 C.1.1 + C.4: the client's key derivation and its first
/// protected request, at SSN 20 (0x14).
#[test]
fn t1_client_protects_request() {
    let mut crypto = default_crypto();
    let mut client = client_context();
    assert_eq!(
        client.sender_key,
        [0xF0, 0x91, 0x0E, 0xD7, 0x29, 0x5E, 0x6A, 0xD4, 0xB5, 0x4F, 0xC7, 0x93, 0x15, 0x43, 0x02, 0xFF]
    );
    assert_eq!(
        client.recipient_key,
        [0xFF, 0xB1, 0x4E, 0x09, 0x3C, 0x94, 0xC9, 0xCA, 0xC9, 0x47, 0x16, 0x48, 0xB4, 0xF9, 0x87, 0x10]
    );
    assert_eq!(
        client.common_iv,
        [0x46, 0x22, 0xD4, 0xDD, 0x6D, 0x94, 0x41, 0x68, 0xEE, 0xFB, 0x54, 0x98, 0x7C]
    );

    client.sender_ssn = 20;
    let request = [
        0x44, 0x01, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x83, 0x74, 0x76, 0x31,
    ];
    let packet = coap::parse(&request).unwrap();

    let mut exchange = None;
    let mut protected = CoapMessageBuffer::new();
    coap2oscore(&mut crypto, &mut client, &mut exchange, None, &packet, &mut protected).unwrap();

    let expected = [
        0x44, 0x02, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x62, 0x09, 0x14, 0xFF, 0x61, 0x2F, 0x10, 0x92, 0xF1, 0x77, 0x6F, 0x1C, 0x16, 0x68, 0xB3, 0x82, 0x5E,
    ];
    assert_eq!(protected.as_slice(), &expected);
}

/// RFC 8613 C.2.1 + C.5: the same derivation and request, but with no
/// master salt at all (an empty salt, not an all-zero one).
#[test]
fn t3_client_protects_request_without_master_salt() {
    let mut crypto = default_crypto();
    let mut client = OscoreContext::new(
        &mut crypto,
        &OscoreInitParams {
            master_secret: &MASTER_SECRET,
            master_salt: &[],
            sender_id: &[0x00],
            recipient_id: &[0x01],
            id_context: None,
            aead_id: 10,
        },
    )
    .unwrap();

    client.sender_ssn = 20;
    let request = [
        0x44, 0x01, 0x71, 0xC3, 0x00, 0x00, 0xB9, 0x32, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x83, 0x74, 0x76, 0x31,
    ];
    let packet = coap::parse(&request).unwrap();

    let mut exchange = None;
    let mut protected = CoapMessageBuffer::new();
    coap2oscore(&mut crypto, &mut client, &mut exchange, None, &packet, &mut protected).unwrap();

    let expected = [
        0x44, 0x02, 0x71, 0xC3, 0x00, 0x00, 0xB9, 0x32, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x63, 0x09, 0x14, 0x00, 0xFF, 0x4E, 0xD3, 0x39, 0xA5, 0xA3, 0x79, 0xB0, 0xB8, 0xBC, 0x73, 0x1F, 0xFF, 0xB0,
    ];
    assert_eq!(protected.as_slice(), &expected);
}

/// RFC 8613 C.3.1 + C.6: a client request protected under a non-empty ID
/// context, whose compressed OSCORE option carries the context inline
/// (the `h` bit and the ID context length+bytes) alongside an empty KID.
#[test]
fn t5_client_protects_request_with_id_context() {
    let mut crypto = default_crypto();
    let id_context = [0x37, 0xCB, 0xF3, 0x21, 0x00, 0x17, 0xA2, 0xD3];
    let mut client = OscoreContext::new(
        &mut crypto,
        &OscoreInitParams {
            master_secret: &MASTER_SECRET,
            master_salt: &MASTER_SALT,
            sender_id: &[],
            recipient_id: &[0x01],
            id_context: Some(&id_context),
            aead_id: 10,
        },
    )
    .unwrap();

    client.sender_ssn = 20;
    let request = [
        0x44, 0x01, 0x2F, 0x8E, 0xEF, 0x9B, 0xBF, 0x7A, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x83, 0x74, 0x76, 0x31,
    ];
    let packet = coap::parse(&request).unwrap();

    let mut exchange = None;
    let mut protected = CoapMessageBuffer::new();
    coap2oscore(&mut crypto, &mut client, &mut exchange, None, &packet, &mut protected).unwrap();

    let expected = [
        0x44, 0x02, 0x2F, 0x8E, 0xEF, 0x9B, 0xBF, 0x7A, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x6B, 0x19, 0x14, 0x08, 0x37, 0xCB, 0xF3, 0x21, 0x00, 0x17, 0xA2, 0xD3, 0xFF, 0x72, 0xCD, 0x72, 0x73, 0xFD,
        0x33, 0x1A, 0xC4, 0x5C, 0xFF, 0xBE, 0x55, 0xC3,
    ];
    assert_eq!(protected.as_slice(), &expected);
}

/// RFC 8613 C.1.2 + C.7: the server decrypts T1's request, then protects
/// the matching response without its own Partial IV (reusing the request
/// nonce).
#[test]
fn t2_server_protects_response_without_own_piv() {
    let mut crypto = default_crypto();
    let mut server = server_context();

    let protected_request = [
        0x44, 0x02, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x62, 0x09, 0x14, 0xFF, 0x61, 0x2F, 0x10, 0x92, 0xF1, 0x77, 0x6F, 0x1C, 0x16, 0x68, 0xB3, 0x82, 0x5E,
    ];
    let mut exchange = None;
    let mut recovered_request = CoapMessageBuffer::new();
    let is_oscore = oscore2coap(&mut crypto, &mut server, &mut exchange, &protected_request, &mut recovered_request).unwrap();
    assert!(is_oscore);
    assert!(exchange.is_some());

    let response = [0x64u8, 0x45, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0xFF];
    let mut response_buf = CoapMessageBuffer::new();
    response_buf.extend_from_slice(&response).unwrap();
    response_buf.extend_from_slice(b"Hello World!").unwrap();
    let response_packet = coap::parse(response_buf.as_slice()).unwrap();

    let mut protected_response = CoapMessageBuffer::new();
    coap2oscore(&mut crypto, &mut server, &mut exchange, None, &response_packet, &mut protected_response).unwrap();
    assert!(exchange.is_none());

    let expected = [
        0x64, 0x44, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x90, 0xFF, 0xDB, 0xAA, 0xD1, 0xE9, 0xA7, 0xE7, 0xB2, 0xA8,
        0x13, 0xD3, 0xC3, 0x15, 0x24, 0x37, 0x83, 0x03, 0xCD, 0xAF, 0xAE, 0x11, 0x91, 0x06,
    ];
    assert_eq!(protected_response.as_slice(), &expected);
}

/// RFC 8613 C.8: the same response, but the server includes its own
/// Partial IV (SSN 0) instead of reusing the request nonce.
#[test]
fn t7_server_protects_response_with_own_piv() {
    let mut crypto = default_crypto();
    let mut server = server_context();

    let protected_request = [
        0x44, 0x02, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x39, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
        0x62, 0x09, 0x14, 0xFF, 0x61, 0x2F, 0x10, 0x92, 0xF1, 0x77, 0x6F, 0x1C, 0x16, 0x68, 0xB3, 0x82, 0x5E,
    ];
    let mut exchange = None;
    let mut recovered_request = CoapMessageBuffer::new();
    oscore2coap(&mut crypto, &mut server, &mut exchange, &protected_request, &mut recovered_request).unwrap();

    let mut response_buf = CoapMessageBuffer::new();
    response_buf.extend_from_slice(&[0x64, 0x45, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0xFF]).unwrap();
    response_buf.extend_from_slice(b"Hello World!").unwrap();
    let response_packet = coap::parse(response_buf.as_slice()).unwrap();

    let own_piv = [0x00u8];
    let mut protected_response = CoapMessageBuffer::new();
    coap2oscore(&mut crypto, &mut server, &mut exchange, Some(&own_piv), &response_packet, &mut protected_response).unwrap();

    let expected = [
        0x64, 0x44, 0x5D, 0x1F, 0x00, 0x00, 0x39, 0x74, 0x92, 0x01, 0x00, 0xFF, 0x4D, 0x4C, 0x13, 0x66, 0x93, 0x84,
        0xB6, 0x73, 0x54, 0xB2, 0xB6, 0x17, 0x5F, 0xF4, 0xB8, 0x65, 0x8C, 0x66, 0x6A, 0x6C, 0xF8, 0x8E,
    ];
    assert_eq!(protected_response.as_slice(), &expected);
}

/// RFC 8613 C.3.2: key derivation under a non-empty ID context.
#[test]
fn t6_server_derives_keys_with_id_context() {
    let mut crypto = default_crypto();
    let id_context = [0x37, 0xCB, 0xF3, 0x21, 0x00, 0x17, 0xA2, 0xD3];
    let ctx = OscoreContext::new(
        &mut crypto,
        &OscoreInitParams {
            master_secret: &MASTER_SECRET,
            master_salt: &MASTER_SALT,
            sender_id: &[0x01],
            recipient_id: &[],
            id_context: Some(&id_context),
            aead_id: 10,
        },
    )
    .unwrap();
    assert_eq!(
        ctx.sender_key,
        [0xE3, 0x9A, 0x0C, 0x7C, 0x77, 0xB4, 0x3F, 0x03, 0xB4, 0xB3, 0x9A, 0xB9, 0xA2, 0x68, 0x69, 0x9F]
    );
    assert_eq!(
        ctx.recipient_key,
        [0xAF, 0x2A, 0x13, 0x00, 0xA5, 0xE9, 0x57, 0x88, 0xB3, 0x56, 0x33, 0x6E, 0xEE, 0xCD, 0x2B, 0x92]
    );
    assert_eq!(
        ctx.common_iv,
        [0x2C, 0xA5, 0x8F, 0xB8, 0x5F, 0xF1, 0xB8, 0x1C, 0x0B, 0x71, 0x81, 0xB8, 0x5E]
    );
}
