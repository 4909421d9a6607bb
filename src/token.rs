//! Access token inspection for the admission gate. The client never verifies
//! token signatures; real access control lives on the API. This module only
//! decodes the payload segment to answer "who is this" and "has it expired",
//! and treats anything it cannot parse as expired.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;

use crate::session::Role;

/// Claims the admission gate cares about, decoded from the payload segment
/// of a three-part bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Decode the payload segment of a bearer token without verifying it.
///
/// Returns `None` when the token does not have exactly three segments or the
/// payload is not valid base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Option<AccessTokenClaims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let bytes = Base64UrlUnpadded::decode_vec(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Fail-closed expiry check: an absent, malformed, or `exp`-less token is
/// expired, as is one whose expiry is at or before `now_unix_seconds`.
#[must_use]
pub fn is_expired(token: &str, now_unix_seconds: i64) -> bool {
    match decode_claims(token).and_then(|claims| claims.exp) {
        Some(exp) => exp <= now_unix_seconds,
        None => true,
    }
}
