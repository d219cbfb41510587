//! The compressed OSCORE option codec (component C7), grounded on
//! `uoscore-uedhoc`'s `oscore_option_parser`: the flag-byte layout and the
//! PIV/KID-context/KID field order are carried over, expressed as an
//! explicit `n ∈ {6,7}` rejection instead of a `switch` fallthrough.

use edhoc_oscore_shared::OscoreError;

const H_MASK: u8 = 0b0001_0000;
const K_MASK: u8 = 0b0000_1000;
const N_MASK: u8 = 0b0000_0111;

/// A parsed compressed OSCORE option (RFC 8613 §6.1). `piv`, `kid_context`
/// and `kid` borrow directly from the option value they were parsed out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedOscoreOption<'a> {
    pub piv: Option<&'a [u8]>,
    pub kid_context: Option<&'a [u8]>,
    pub kid: Option<&'a [u8]>,
}

/// Parses an OSCORE option value. An empty value is the all-flags-zero case
/// (RFC 8613 §8.1): present option, no PIV/KID-context/KID.
pub fn parse(value: &[u8]) -> Result<CompressedOscoreOption<'_>, OscoreError> {
    if value.is_empty() {
        return Ok(CompressedOscoreOption { piv: None, kid_context: None, kid: None });
    }
    let flags = value[0];
    let h = flags & H_MASK != 0;
    let k = flags & K_MASK != 0;
    let n = (flags & N_MASK) as usize;

    if n == 6 || n == 7 {
        return Err(OscoreError::OscoreInPktInvalidPiv);
    }

    let mut pos = 1usize;
    let piv = if n == 0 {
        None
    } else {
        let p = value.get(pos..pos + n).ok_or(OscoreError::OscoreInPktInvalidOptionLen)?;
        pos += n;
        Some(p)
    };

    let kid_context = if h {
        let len = *value.get(pos).ok_or(OscoreError::OscoreInPktInvalidOptionLen)? as usize;
        pos += 1;
        let kc = value.get(pos..pos + len).ok_or(OscoreError::OscoreInPktInvalidOptionLen)?;
        pos += len;
        Some(kc)
    } else {
        None
    };

    let kid = if k {
        Some(value.get(pos..).ok_or(OscoreError::OscoreInPktInvalidOptionLen)?)
    } else {
        None
    };

    Ok(CompressedOscoreOption { piv, kid_context, kid })
}

/// Builds the compressed OSCORE option value into `out` (a
/// `MessageBuffer`-backed cursor), returning the number of bytes written.
pub fn build(
    out: &mut edhoc_oscore_shared::OscoreOptionBuffer,
    piv: Option<&[u8]>,
    kid_context: Option<&[u8]>,
    kid: Option<&[u8]>,
) -> Result<(), OscoreError> {
    if piv.is_none() && kid_context.is_none() && kid.is_none() {
        return Ok(());
    }
    let n = piv.map_or(0, |p| p.len());
    if n == 6 || n == 7 {
        return Err(OscoreError::OscoreInPktInvalidPiv);
    }
    let h = kid_context.is_some();
    let k = kid.is_some();
    let flags = (h as u8) << 4 | (k as u8) << 3 | n as u8;
    out.push(flags)?;
    if let Some(p) = piv {
        out.extend_from_slice(p)?;
    }
    if let Some(kc) = kid_context {
        out.push(kc.len() as u8)?;
        out.extend_from_slice(kc)?;
    }
    if let Some(k) = kid {
        out.extend_from_slice(k)?;
    }
    Ok(())
}
