use ecobee::{Client, Error, Thermostat, MIN_POLL_INTERVAL};

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info};
use tokio::time;

#[tokio::main]
async fn main() -> ecobee::Result<()> {
    pretty_env_logger::init();

    let api_key = std::env::var("ECOBEE_API_KEY").expect("set ENV variable ECOBEE_API_KEY");

    let ids = std::env::var("ECOBEE_THERMOSTATS").expect("set ENV variable ECOBEE_THERMOSTATS");
    let ids: Vec<String> = ids.split(',').map(|id| id.trim().to_string()).collect();

    let auth_path = std::env::var("ECOBEE_AUTH_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").expect("set ENV variable HOME");
            PathBuf::from(home).join(".config").join("ecobee.json")
        });

    let mut client = Client::new(api_key, ids, auth_path)?;

    if !client.is_authorized() {
        authorize(&mut client).await?;
    }

    client.update().await?;

    for thermostat in client.thermostats() {
        log_thermostat(thermostat);
    }

    loop {
        time::sleep(MIN_POLL_INTERVAL).await;

        let updated = match client.poll().await {
            Ok(updated) => updated,
            Err(err) => {
                error!("poll failed: {err}");
                continue;
            }
        };

        for id in updated {
            info!("thermostat {id} changed");

            if let Err(err) = client.refresh(&id).await {
                error!("refresh failed for {id}: {err}");
                continue;
            }

            if let Ok(thermostat) = client.get_thermostat(&id) {
                log_thermostat(thermostat);
            }
        }
    }
}

async fn authorize(client: &mut Client) -> ecobee::Result<()> {
    let pin = client.authorize_start().await?;

    info!(
        "log onto the ecobee portal, open My Apps, click Add Application \
         and enter PIN {}. You have {} minutes",
        pin.pin, pin.expires_in
    );

    loop {
        time::sleep(Duration::from_secs(30)).await;

        match client.authorize_finish().await {
            Ok(()) => return Ok(()),
            Err(Error::AuthorizationPending) => debug!("authorization still pending"),
            Err(err) => return Err(err),
        }
    }
}

fn log_thermostat(thermostat: &Thermostat) {
    let mode = thermostat
        .settings
        .hvac_mode
        .map(|mode| mode.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match &thermostat.runtime {
        Some(runtime) => info!(
            "{} ({}): mode {mode}, {:.1}°F at {}% humidity, heat to {:.1}, cool to {:.1}",
            thermostat.name,
            thermostat.identifier,
            runtime.temperature(),
            runtime.humidity(),
            runtime.heat_setpoint(),
            runtime.cool_setpoint()
        ),
        None => info!("{} ({}): mode {mode}", thermostat.name, thermostat.identifier),
    }

    for sensor in &thermostat.remote_sensors {
        match (sensor.temperature(), sensor.humidity(), sensor.occupancy()) {
            (Some(temperature), Some(humidity), _) => {
                info!("  {}: {temperature:.1}°F, {humidity}% humidity", sensor.name)
            }
            (Some(temperature), None, occupancy) => info!(
                "  {}: {temperature:.1}°F, occupied: {}",
                sensor.name,
                occupancy.unwrap_or(false)
            ),
            _ => debug!("  {}: no readings", sensor.name),
        }
    }
}
