use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::{EcobeePin, TokenResponse, TokenStore};
use crate::report::{self, RuntimeReport};
use crate::selection::{Selection, SelectionBody};
use crate::summary::{changed_identifiers, Summary};
use crate::{Error, Result, Sensor, Thermostat};

const BASE_URL: &str = "https://api.ecobee.com";
const API_VERSION: &str = "1";
const SCOPE: &str = "smartWrite";

/// The vendor refreshes thermostat data every ~3 minutes; polling faster
/// only burns the rate limit.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(180);

/// Client for the ecobee remote-monitoring API. Keeps the last fetched state
/// of the tracked thermostats; the caller decides when to `poll` and when to
/// `update`, there is no internal scheduling or retry.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    thermostat_ids: Vec<String>,
    last_seen: HashMap<String, String>,
    thermostats: HashMap<String, Thermostat>,
    auth: TokenStore,
}

impl Client {
    /// `api_key` comes from the Developer panel on ecobee.com, `auth_path` is
    /// where tokens are persisted between runs.
    pub fn new(api_key: String, thermostat_ids: Vec<String>, auth_path: PathBuf) -> Result<Client> {
        Ok(Client {
            http: reqwest::Client::new(),
            api_key,
            thermostat_ids,
            last_seen: HashMap::new(),
            thermostats: HashMap::new(),
            auth: TokenStore::load(auth_path)?,
        })
    }

    pub fn is_authorized(&self) -> bool {
        self.auth.is_authorized()
    }
}

impl Client {
    /// Requests an ecobee PIN. The caller has to show the PIN to the user and
    /// call [`Client::authorize_finish`] once the user has registered it
    /// under My Apps on the ecobee portal.
    pub async fn authorize_start(&mut self) -> Result<EcobeePin> {
        let url = format!("{BASE_URL}/authorize");
        let response = self
            .http
            .get(url)
            .query(&[
                ("response_type", "ecobeePin"),
                ("client_id", self.api_key.as_str()),
                ("scope", SCOPE),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(Error::UnexpectedResponse { status, body });
        }

        let pin: EcobeePin = response.json().await?;
        self.auth.store_pending(pin.code.clone(), pin.expires_in)?;

        info!("requested ecobee PIN, valid for {} minutes", pin.expires_in);

        Ok(pin)
    }

    /// Exchanges the pending authorization code for tokens. Fails with
    /// [`Error::AuthorizationPending`] while the user has not confirmed the
    /// PIN yet.
    pub async fn authorize_finish(&mut self) -> Result<()> {
        let pending = self.auth.pending().ok_or(Error::NotAuthorized)?;

        if pending.is_expired() {
            return Err(Error::PinExpired);
        }

        let code = pending.code.clone();
        let response = self.token_request("ecobeePin", &code).await?;
        self.auth.store_tokens(response)?;

        info!("authorized");

        Ok(())
    }

    async fn ensure_fresh_tokens(&mut self) -> Result<(String, String)> {
        let refresh_token = {
            let tokens = self.auth.tokens().ok_or(Error::NotAuthorized)?;

            if !tokens.is_expired() {
                return Ok((tokens.token_type.clone(), tokens.access_token.clone()));
            }

            tokens.refresh_token.clone()
        };

        debug!("access token expired, refreshing");

        let response = self.token_request("refresh_token", &refresh_token).await?;
        self.auth.store_tokens(response)?;

        let tokens = self.auth.tokens().ok_or(Error::NotAuthorized)?;
        Ok((tokens.token_type.clone(), tokens.access_token.clone()))
    }

    async fn token_request(&self, grant_type: &str, code: &str) -> Result<TokenResponse> {
        let url = format!("{BASE_URL}/token");
        let response = self
            .http
            .post(url)
            .query(&[
                ("grant_type", grant_type),
                ("code", code),
                ("client_id", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        #[derive(Deserialize)]
        struct TokenError {
            #[serde(default)]
            error: String,
            #[serde(default)]
            error_description: String,
        }

        let status = response.status().as_u16();
        let body = response.text().await?;

        match serde_json::from_str::<TokenError>(&body) {
            Ok(err) if err.error == "authorization_pending" => Err(Error::AuthorizationPending),
            Ok(err) if err.error_description.is_empty() => Err(Error::Auth(err.error)),
            Ok(err) => Err(Error::Auth(err.error_description)),
            Err(_) => Err(Error::UnexpectedResponse { status, body }),
        }
    }
}

impl Client {
    /// Cheap differential check: returns the identifiers of thermostats whose
    /// data changed since the last poll. Don't call more often than
    /// [`MIN_POLL_INTERVAL`].
    pub async fn poll(&mut self) -> Result<Vec<String>> {
        let summary = self.thermostat_summary().await?;
        changed_identifiers(&summary, &mut self.last_seen)
    }

    /// Fetches full state for all tracked thermostats and replaces the local
    /// objects.
    pub async fn update(&mut self) -> Result<()> {
        let ids = self.thermostat_ids.clone();
        self.fetch_thermostats(&ids).await
    }

    /// Fetches full state for a single thermostat.
    pub async fn refresh(&mut self, id: &str) -> Result<()> {
        self.fetch_thermostats(&[id.to_string()]).await
    }

    pub async fn thermostat_summary(&mut self) -> Result<Summary> {
        self.api_get("thermostatSummary", &SelectionBody::new(Selection::registered()))
            .await
    }

    /// Historical runtime data for the tracked thermostats,
    /// see [`crate::REPORT_COLUMNS`]. `start_date` defaults to one day ago.
    pub async fn runtime_report(
        &mut self,
        start_date: Option<NaiveDate>,
        include_sensors: bool,
    ) -> Result<RuntimeReport> {
        let body = report::request(&self.thermostat_ids, start_date, include_sensors);
        self.api_get("runtimeReport", &body).await
    }

    async fn fetch_thermostats(&mut self, ids: &[String]) -> Result<()> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ThermostatList {
            #[serde(default)]
            thermostat_list: Vec<Thermostat>,
        }

        let body = SelectionBody::new(Selection::thermostats(ids).with_full_state());
        let response: ThermostatList = self.api_get("thermostat", &body).await?;

        for thermostat in response.thermostat_list {
            debug!(
                "fetched thermostat {} ({})",
                thermostat.identifier, thermostat.name
            );
            self.thermostats
                .insert(thermostat.identifier.clone(), thermostat);
        }

        Ok(())
    }
}

impl Client {
    pub fn get_thermostat(&self, id: &str) -> Result<&Thermostat> {
        self.thermostats
            .get(id)
            .ok_or_else(|| Error::UnknownThermostat(id.to_string()))
    }

    /// Looks the sensor up across all cached thermostats.
    pub fn get_sensor(&self, id: &str) -> Result<&Sensor> {
        self.thermostats
            .values()
            .find_map(|thermostat| thermostat.sensor(id))
            .ok_or_else(|| Error::UnknownSensor(id.to_string()))
    }

    pub fn thermostats(&self) -> impl Iterator<Item = &Thermostat> {
        self.thermostats.values()
    }
}

impl Client {
    async fn api_get<B, T>(&mut self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let (token_type, access_token) = self.ensure_fresh_tokens().await?;

        let url = format!("{BASE_URL}/{API_VERSION}/{endpoint}");
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(AUTHORIZATION, format!("{token_type} {access_token}"))
            .query(&[("json", serde_json::to_string(body)?)])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        Err(self.api_error(response).await)
    }

    async fn api_error(&mut self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return err.into(),
        };

        debug!("API error response: {body}");

        #[derive(Deserialize)]
        struct StatusBody {
            status: ApiStatus,
        }

        #[derive(Deserialize)]
        struct ApiStatus {
            code: u16,
            message: String,
        }

        match serde_json::from_str::<StatusBody>(&body) {
            // code 16: authentication revoked on the portal side, the stored
            // tokens are useless now
            Ok(StatusBody {
                status: ApiStatus { code: 16, .. },
            }) => {
                if let Err(err) = self.auth.clear() {
                    return err;
                }
                Error::AuthRevoked
            }
            Ok(StatusBody { status }) => Error::Api {
                code: status.code,
                message: status.message,
            },
            Err(_) => Error::UnexpectedResponse { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_state() -> Client {
        let mut client = Client::new(
            "key".to_string(),
            vec!["123456789".to_string()],
            std::env::temp_dir().join("ecobee-test-client.json"),
        )
        .unwrap();

        let thermostat: Thermostat = serde_json::from_str(
            r#"{
                "identifier": "123456789",
                "name": "Main Floor",
                "settings": {"hvacMode": "heat"},
                "remoteSensors": [{
                    "id": "rs:100",
                    "name": "Bedroom",
                    "capability": [{"id": "1", "type": "temperature", "value": "718"}]
                }]
            }"#,
        )
        .unwrap();

        client
            .thermostats
            .insert(thermostat.identifier.clone(), thermostat);
        client
    }

    #[test]
    fn test_get_thermostat() {
        let client = client_with_state();

        let thermostat = client.get_thermostat("123456789").unwrap();
        assert_eq!(thermostat.name, "Main Floor");
        assert_eq!(
            thermostat.settings.hvac_mode,
            Some(crate::HvacMode::Heat)
        );

        assert!(matches!(
            client.get_thermostat("987654321"),
            Err(Error::UnknownThermostat(_))
        ));
    }

    #[test]
    fn test_get_sensor() {
        let client = client_with_state();

        let sensor = client.get_sensor("rs:100").unwrap();
        assert_eq!(sensor.name, "Bedroom");
        assert_eq!(sensor.temperature(), Some(71.8));

        assert!(matches!(
            client.get_sensor("rs:999"),
            Err(Error::UnknownSensor(_))
        ));
    }

    #[test]
    fn test_fresh_client_is_unauthorized() {
        let client = Client::new(
            "key".to_string(),
            vec![],
            std::env::temp_dir().join("ecobee-test-unauthorized.json"),
        )
        .unwrap();

        assert!(!client.is_authorized());
        assert_eq!(client.thermostats().count(), 0);
    }
}
