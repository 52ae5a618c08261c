use serde::Deserialize;

use crate::thermostat::tenths;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub in_use: bool,
    #[serde(default)]
    pub capability: Vec<SensorCapability>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorCapability {
    #[serde(default)]
    pub id: String,
    pub r#type: String,
    #[serde(default)]
    pub value: String,
}

impl Sensor {
    /// Temperature in °F, or `None` if the sensor has no temperature probe.
    pub fn temperature(&self) -> Option<f32> {
        self.capability("temperature")?.parse::<i32>().ok().map(tenths)
    }

    /// Relative humidity in percent, or `None` if not supported.
    pub fn humidity(&self) -> Option<f32> {
        self.capability("humidity")?.parse().ok()
    }

    pub fn occupancy(&self) -> Option<bool> {
        match self.capability("occupancy") {
            Some("") | None => None,
            Some(value) => Some(value == "true"),
        }
    }

    fn capability(&self, kind: &str) -> Option<&str> {
        self.capability
            .iter()
            .find(|capability| capability.r#type == kind)
            .map(|capability| capability.value.as_str())
    }
}
