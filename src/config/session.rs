use std::env;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};
use time::Duration;
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::warn;

pub type SessionLayer = SessionManagerLayer<SqliteStore, SignedCookie>;

/// Cookie/session settings, keyed off `ENVIRONMENT`. Production tightens
/// the cookie and shortens the inactivity window.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub expiry: Duration,
    pub name: String,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        if is_production() {
            SessionConfig {
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                expiry: Duration::hours(2),
                name: "__Host-session".to_string(),
            }
        } else {
            SessionConfig {
                secure: false,
                http_only: true,
                same_site: SameSite::Lax,
                expiry: Duration::days(7),
                name: "feedesk_session".to_string(),
            }
        }
    }

    pub fn create_layer(&self, store: SqliteStore) -> SessionLayer {
        let key = load_session_key();

        SessionManagerLayer::new(store)
            .with_secure(self.secure)
            .with_http_only(self.http_only)
            .with_same_site(self.same_site)
            .with_name(self.name.clone())
            .with_expiry(Expiry::OnInactivity(self.expiry))
            .with_signed(key)
    }
}

fn is_production() -> bool {
    env::var("ENVIRONMENT").map(|v| v == "production").unwrap_or(false)
}

fn load_session_key() -> Key {
    match env::var("SESSION_SECRET") {
        Ok(secret) if !secret.is_empty() => {
            if is_production() {
                let lowered = secret.to_ascii_lowercase();
                if lowered.contains("example") || lowered.contains("changeme") {
                    panic!("SESSION_SECRET appears to be a placeholder. Generate a real secret.");
                }
            }
            key_from_secret(&secret)
        }
        _ => {
            if is_production() {
                panic!("SESSION_SECRET must be set in production");
            }
            warn!("SESSION_SECRET not set; generating ephemeral key (development only)");
            Key::generate()
        }
    }
}

fn key_from_secret(secret: &str) -> Key {
    let bytes = STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec());

    if bytes.len() >= 64 {
        Key::from(&bytes[..64])
    } else {
        // Stretch short secrets to the 64 bytes the signing key needs
        let digest = Sha512::digest(&bytes);
        Key::from(digest.as_slice())
    }
}
