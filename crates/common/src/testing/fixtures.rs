//! JWT fixtures.
//!
//! Tokens are unsigned; only the payload matters to the client.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};

/// A JWT whose payload is `claims`.
pub fn jwt_with_claims(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.fixture")
}

/// A JWT expiring at the given unix timestamp.
pub fn jwt_with_exp(exp: i64) -> String {
    jwt_with_claims(&json!({"exp": exp, "sub": "fixture-app"}))
}

/// A JWT expiring `secs` seconds from now (wall clock).
pub fn jwt_expiring_in(secs: i64) -> String {
    jwt_with_exp(Utc::now().timestamp() + secs)
}
