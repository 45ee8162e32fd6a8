use std::{fmt::Debug, ops::Deref};

use base64::{DecodeError, Engine};
use recipes::Storage;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

#[derive(Clone)]
pub struct CookieKey(pub tower_cookies::Key);

impl Deref for CookieKey {
    type Target = tower_cookies::Key;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Shortest `COOKIE_KEY` material a key is derived from.
const MIN_KEY_MATERIAL: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CookieKeyError {
    #[error("COOKIE_KEY is not valid base64")]
    Decode(#[from] DecodeError),
    #[error("COOKIE_KEY must decode to at least {MIN_KEY_MATERIAL} bytes, got {0}")]
    TooShort(usize),
}

impl CookieKey {
    /// Reads a base64 key from `COOKIE_KEY`, or generates one. A generated
    /// key means every browser's settings become unreadable on restart.
    pub fn from_env_or_generate() -> Result<Self, CookieKeyError> {
        if let Ok(cookie_key) = std::env::var("COOKIE_KEY") {
            Self::from_base64(&cookie_key)
        } else {
            tracing::info!("Generating new cookie key");
            Ok(Self::generate())
        }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CookieKeyError> {
        let material = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        if material.len() < MIN_KEY_MATERIAL {
            return Err(CookieKeyError::TooShort(material.len()));
        }

        Ok(Self(tower_cookies::Key::derive_from(&material)))
    }

    pub fn generate() -> Self {
        Self(tower_cookies::Key::generate())
    }
}

impl Debug for CookieKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieKey")
            .field("value", &"[omitted]")
            .finish()
    }
}

/// Browser-persistent storage: each entry is an encrypted cookie that
/// outlives the browser session. Used for the provider settings.
#[derive(Clone)]
pub(crate) struct CookieStorage {
    cookies: Cookies,
    key: CookieKey,
    secure: bool,
}

impl CookieStorage {
    pub(crate) fn new(cookies: Cookies, key: CookieKey, secure: bool) -> Self {
        Self {
            cookies,
            key,
            secure,
        }
    }
}

impl Storage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cookies
            .private(&self.key)
            .get(key)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&self, key: &str, value: String) {
        let cookie = Cookie::build((key.to_string(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .permanent();

        self.cookies.private(&self.key).add(cookie.into());
    }

    fn remove(&self, key: &str) {
        let cookie = Cookie::build((key.to_string(), "")).path("/");

        self.cookies.private(&self.key).remove(cookie.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn configured_key_is_stable_across_restarts() {
        let configured = encode(&[7u8; 32]);

        let first = CookieKey::from_base64(&configured).unwrap();
        let second = CookieKey::from_base64(&configured).unwrap();

        assert_eq!(first.master(), second.master());
    }

    #[test]
    fn short_or_garbled_key_is_an_error() {
        assert!(matches!(
            CookieKey::from_base64(&encode(&[7u8; 16])),
            Err(CookieKeyError::TooShort(16))
        ));
        assert!(matches!(
            CookieKey::from_base64("not base64!"),
            Err(CookieKeyError::Decode(_))
        ));
    }
}
