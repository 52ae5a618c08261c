mod auth;
pub use auth::EcobeePin;

mod client;
pub use client::{Client, MIN_POLL_INTERVAL};

mod error;
pub use error::Error;

mod report;
pub use report::{ReportRow, RuntimeReport, REPORT_COLUMNS};

mod selection;

mod sensor;
pub use sensor::{Sensor, SensorCapability};

mod summary;
pub use summary::{Revision, Summary};

mod thermostat;
pub use thermostat::{HvacMode, Runtime, Settings, Thermostat};

pub type Result<T> = std::result::Result<T, Error>;
