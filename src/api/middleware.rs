//! Signed session cookie middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::models::SessionId;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "emotion_canvas_session";

/// Signs and verifies session cookie values of the form `<uuid>.<signature>`.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Arc<str>,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    fn signature(&self, id: &SessionId) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(id.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Cookie value for `id`.
    pub fn sign(&self, id: &SessionId) -> String {
        format!("{}.{}", id, self.signature(id))
    }

    /// The session id in `value`, if the signature matches.
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (raw_id, signature) = value.split_once('.')?;
        let id = SessionId::parse(raw_id)?;
        constant_time_eq(self.signature(&id).as_bytes(), signature.as_bytes()).then_some(id)
    }

    pub fn set_cookie_header(&self, id: &SessionId) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            self.sign(id)
        )
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Find a cookie by name across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Resolve the caller's [`SessionId`] from its cookie, minting a new one when
/// the cookie is missing or forged. The id is stored in request extensions.
pub async fn session_middleware(
    State(signer): State<SessionSigner>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let existing = match cookie_value(request.headers(), SESSION_COOKIE) {
        Some(value) => {
            let verified = signer.verify(value);
            if verified.is_none() {
                tracing::warn!("Rejected session cookie with invalid signature");
            }
            verified
        }
        None => None,
    };

    let (id, minted) = match existing {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;

    if minted {
        match HeaderValue::from_str(&signer.set_cookie_header(&id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_value_verifies() {
        let signer = SessionSigner::new("secret");
        let id = SessionId::new();
        assert_eq!(signer.verify(&signer.sign(&id)), Some(id));
    }

    #[test]
    fn other_secret_does_not_verify() {
        let id = SessionId::new();
        let value = SessionSigner::new("one").sign(&id);
        assert_eq!(SessionSigner::new("two").verify(&value), None);
    }

    #[test]
    fn tampered_id_does_not_verify() {
        let signer = SessionSigner::new("secret");
        let value = signer.sign(&SessionId::new());
        let (_, signature) = value.split_once('.').unwrap();
        let forged = format!("{}.{}", SessionId::new(), signature);
        assert_eq!(signer.verify(&forged), None);
        assert_eq!(signer.verify("garbage"), None);
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; emotion_canvas_session=abc.def"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn set_cookie_header_is_http_only() {
        let signer = SessionSigner::new("secret");
        let header = signer.set_cookie_header(&SessionId::new());
        assert!(header.starts_with("emotion_canvas_session="));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
    }
}
