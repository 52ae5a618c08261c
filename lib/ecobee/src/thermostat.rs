use std::fmt;

use serde::{de::value, de::IntoDeserializer, Deserialize, Serialize};

use crate::Sensor;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub runtime: Option<Runtime>,
    #[serde(default)]
    pub equipment_status: String,
    #[serde(default)]
    pub remote_sensors: Vec<Sensor>,
}

impl Thermostat {
    pub fn sensor(&self, id: &str) -> Option<&Sensor> {
        self.remote_sensors.iter().find(|sensor| sensor.id == id)
    }

    /// Equipment currently running, e.g. `auxHeat1` or `fan`.
    pub fn running(&self) -> impl Iterator<Item = &str> {
        self.equipment_status.split(',').filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hvac_mode: Option<HvacMode>,
    pub heat_range_low: Option<i32>,
    pub heat_range_high: Option<i32>,
    pub cool_range_low: Option<i32>,
    pub cool_range_high: Option<i32>,
}

/// Runtime readings. The vendor reports temperatures in tenths of a degree
/// Fahrenheit and humidity in whole percent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Runtime {
    pub connected: bool,
    pub last_status_modified: String,
    pub actual_temperature: i32,
    pub actual_humidity: i32,
    pub desired_heat: i32,
    pub desired_cool: i32,
    pub desired_humidity: i32,
}

impl Runtime {
    pub fn temperature(&self) -> f32 {
        tenths(self.actual_temperature)
    }

    pub fn humidity(&self) -> i32 {
        self.actual_humidity
    }

    pub fn heat_setpoint(&self) -> f32 {
        tenths(self.desired_heat)
    }

    pub fn cool_setpoint(&self) -> f32 {
        tenths(self.desired_cool)
    }
}

pub(crate) fn tenths(raw: i32) -> f32 {
    raw as f32 / 10.0
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum HvacMode {
    Heat,
    Cool,
    Auto,
    AuxHeatOnly,
    Off,
}

impl std::str::FromStr for HvacMode {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s.into_deserializer())
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.serialize(f)
    }
}
