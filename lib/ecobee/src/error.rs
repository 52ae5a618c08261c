use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
    Api { code: u16, message: String },
    UnexpectedResponse { status: u16, body: String },
    NotAuthorized,
    AuthorizationPending,
    PinExpired,
    AuthRevoked,
    Auth(String),
    MalformedRevision(String),
    UnknownThermostat(String),
    UnknownSensor(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Api { code, message } => write!(f, "ecobee API error {code}: {message}"),
            Self::UnexpectedResponse { status, body } => {
                write!(f, "unexpected response {status}: {body}")
            }
            Self::NotAuthorized => write!(f, "not authorized"),
            Self::AuthorizationPending => write!(f, "authorization pending"),
            Self::PinExpired => write!(f, "PIN expired, restart authorization"),
            Self::AuthRevoked => write!(f, "authorization revoked"),
            Self::Auth(message) => write!(f, "authorization error: {message}"),
            Self::MalformedRevision(entry) => write!(f, "malformed revision entry: {entry}"),
            Self::UnknownThermostat(id) => write!(f, "unknown thermostat: {id}"),
            Self::UnknownSensor(id) => write!(f, "unknown sensor: {id}"),
        }
    }
}

impl std::error::Error for Error {}
