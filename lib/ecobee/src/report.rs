use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selection::Selection;

/// Columns requested from `/1/runtimeReport`. The server aggregates report
/// data in 5-minute intervals and refreshes it every 15 minutes.
pub const REPORT_COLUMNS: &[&str] = &[
    "auxHeat1",
    "auxHeat2",
    "auxHeat3",
    "compCool1",
    "compCool2",
    "compHeat1",
    "compHeat2",
    "dehumidifier",
    "dmOffset",
    "economizer",
    "fan",
    "humidifier",
    "outdoorHumidity",
    "outdoorTemp",
    "sky",
    "ventilator",
    "wind",
    "zoneAveTemp",
    "zoneCalendarEvent",
    "zoneCoolTemp",
    "zoneHeatTemp",
    "zoneHumidity",
    "zoneHumidityHigh",
    "zoneHumidityLow",
    "zoneHvacMode",
    "zoneOccupancy",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportRequest {
    start_date: String,
    end_date: String,
    columns: String,
    include_sensors: bool,
    selection: Selection,
}

pub(crate) fn request(
    ids: &[String],
    start_date: Option<NaiveDate>,
    include_sensors: bool,
) -> ReportRequest {
    // report timestamps are in thermostat time, so use the local date
    let end_date = Local::now().date_naive();
    let start_date = start_date.unwrap_or_else(|| end_date - Duration::days(1));

    ReportRequest {
        start_date: start_date.format("%Y-%m-%d").to_string(),
        end_date: end_date.format("%Y-%m-%d").to_string(),
        columns: REPORT_COLUMNS.join(","),
        include_sensors,
        selection: Selection::thermostats(ids),
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeReport {
    pub start_date: String,
    pub start_interval: i32,
    pub end_date: String,
    pub end_interval: i32,
    pub columns: String,
    pub report_list: Vec<ReportRow>,
    pub sensor_list: Value,
}

/// Report rows for one thermostat. Each row is a CSV record matching the
/// requested columns, prefixed with date and time.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRow {
    pub thermostat_identifier: String,
    pub row_count: u32,
    pub rows: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_explicit_start() {
        let ids = vec!["123".to_string()];
        let start = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();

        let request = request(&ids, Some(start), true);

        assert_eq!(request.start_date, "2023-07-01");
        assert!(request.include_sensors);
        assert!(request.columns.starts_with("auxHeat1,"));
        assert!(request.columns.ends_with(",zoneOccupancy"));
    }

    #[test]
    fn test_request_defaults_to_one_day() {
        let ids = vec!["123".to_string()];

        let request = request(&ids, None, false);

        // ISO dates compare lexicographically
        assert!(request.start_date < request.end_date);
        assert_eq!(
            request.end_date,
            Local::now().date_naive().format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn test_deserialize_report() {
        let report: RuntimeReport = serde_json::from_str(
            r#"{
                "startDate": "2023-07-01",
                "startInterval": 0,
                "endDate": "2023-07-02",
                "endInterval": 287,
                "columns": "zoneAveTemp,zoneHumidity",
                "reportList": [{
                    "thermostatIdentifier": "123456789",
                    "rowCount": 2,
                    "rows": [
                        "2023-07-01,00:00:00,71.8,38",
                        "2023-07-01,00:05:00,71.6,38"
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(report.report_list.len(), 1);
        assert_eq!(report.report_list[0].thermostat_identifier, "123456789");
        assert_eq!(report.report_list[0].rows.len(), 2);
        assert!(report.sensor_list.is_null());
    }
}
