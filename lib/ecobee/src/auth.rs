use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::Result;

/// PIN the user has to register under My Apps on the ecobee portal.
#[derive(Clone, Debug, Deserialize)]
pub struct EcobeePin {
    #[serde(rename = "ecobeePin")]
    pub pin: String,
    pub code: String,
    /// Validity of the PIN in minutes.
    pub expires_in: i64,
    #[serde(default)]
    pub interval: i64,
    #[serde(default)]
    pub scope: String,
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    pub refresh_token: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Tokens {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct PendingPin {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingPin {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct StoredAuth {
    tokens: Option<Tokens>,
    pending: Option<PendingPin>,
}

/// Tokens and any pending PIN authorization, persisted as JSON so the user
/// doesn't have to re-register the application on every start.
pub(crate) struct TokenStore {
    path: PathBuf,
    state: StoredAuth,
}

impl TokenStore {
    pub fn load(path: PathBuf) -> Result<TokenStore> {
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no stored authentication at {}", path.display());
                StoredAuth::default()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(TokenStore { path, state })
    }

    pub fn is_authorized(&self) -> bool {
        self.state.tokens.is_some()
    }

    pub fn tokens(&self) -> Option<&Tokens> {
        self.state.tokens.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingPin> {
        self.state.pending.as_ref()
    }

    pub fn store_pending(&mut self, code: String, expires_in_minutes: i64) -> Result<()> {
        self.state.pending = Some(PendingPin {
            code,
            expires_at: Utc::now() + Duration::minutes(expires_in_minutes),
        });
        self.save()
    }

    pub fn store_tokens(&mut self, response: TokenResponse) -> Result<()> {
        self.state.pending = None;
        self.state.tokens = Some(Tokens {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        });
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.state = StoredAuth::default();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(&self.state)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ecobee-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_unauthorized() {
        let store = TokenStore::load(temp_path("missing")).unwrap();

        assert!(!store.is_authorized());
        assert!(store.pending().is_none());
    }

    #[test]
    fn test_store_and_reload_tokens() {
        let path = temp_path("roundtrip");

        let mut store = TokenStore::load(path.clone()).unwrap();
        store
            .store_tokens(TokenResponse {
                access_token: "access".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                refresh_token: "refresh".to_string(),
            })
            .unwrap();

        let store = TokenStore::load(path.clone()).unwrap();
        let tokens = store.tokens().unwrap();

        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.refresh_token, "refresh");
        assert!(!tokens.is_expired());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_pending_replaced_by_tokens() {
        let path = temp_path("pending");

        let mut store = TokenStore::load(path.clone()).unwrap();
        store.store_pending("code".to_string(), 9).unwrap();
        assert!(store.pending().is_some());
        assert!(!store.pending().unwrap().is_expired());

        store
            .store_tokens(TokenResponse {
                access_token: "access".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                refresh_token: "refresh".to_string(),
            })
            .unwrap();

        assert!(store.pending().is_none());
        assert!(store.is_authorized());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_expiry() {
        let tokens = Tokens {
            access_token: "access".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(tokens.is_expired());

        let tokens = Tokens {
            expires_at: Utc::now() + Duration::seconds(60),
            ..tokens
        };
        assert!(!tokens.is_expired());
    }
}
