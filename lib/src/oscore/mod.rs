//! OSCORE (RFC 8613): the compressed option codec (C7), the nonce/AAD
//! builder (C8), the security context (C9) and the CoAP↔OSCORE transform
//! (C10).

pub mod aad;
pub mod context;
pub mod option;
pub mod transform;

pub use aad::{build_aad, build_nonce};
pub use context::{piv_to_u64, OscoreContext, OscoreInitParams, MAX_SSN};
pub use option::{build as build_option, parse as parse_option, CompressedOscoreOption};
pub use transform::{coap2oscore, is_u_class, oscore2coap, ExchangeContext};
