//! Signed session-cookie parsing and verification.
//!
//! The HTTP layer signs its session cookie in the classic `s:<id>.<sig>`
//! shape, where `<sig>` is the base64 HMAC-SHA256 of the session id under
//! the shared secret, with trailing `=` padding stripped. Browsers send the
//! value back percent-encoded, so it is decoded before unsigning.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Find a cookie's raw value in a `Cookie` header.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Verify a signed cookie value and return the embedded session id.
///
/// `None` on a missing `s:` prefix, malformed signature encoding, or MAC
/// mismatch.
pub fn unsign(value: &str, secret: &str) -> Option<String> {
    let decoded = urlencoding::decode(value).ok()?;
    let signed = decoded.strip_prefix("s:")?;
    let (session_id, sig_b64) = signed.rsplit_once('.')?;
    let sig = STANDARD_NO_PAD
        .decode(sig_b64.trim_end_matches('='))
        .ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(session_id.as_bytes());
    mac.verify_slice(&sig).ok()?;

    Some(session_id.to_string())
}

/// Sign a session id into the cookie value the HTTP layer produces.
///
/// The inverse of [`unsign`]; lets tests and local tooling mint cookies
/// against the shared secret.
pub fn sign(session_id: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(session_id.as_bytes());
    let sig = STANDARD_NO_PAD.encode(mac.finalize().into_bytes());
    format!("s:{session_id}.{sig}")
}
