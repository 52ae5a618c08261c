use std::collections::HashMap;
use std::str::FromStr;

use log::warn;
use serde::Deserialize;

use crate::{Error, Result};

/// Response of `/1/thermostatSummary`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub thermostat_count: u32,
    pub revision_list: Vec<String>,
    pub status_list: Vec<String>,
}

/// One `revisionList` entry, a colon-separated record of per-section
/// revision markers.
#[derive(Clone, Debug, PartialEq)]
pub struct Revision {
    pub identifier: String,
    pub name: String,
    pub connected: bool,
    pub thermostat_revision: String,
    pub alerts_revision: String,
    pub runtime_revision: String,
    pub interval_revision: String,
}

impl FromStr for Revision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();

        if parts.len() < 7 {
            return Err(Error::MalformedRevision(s.to_string()));
        }

        Ok(Revision {
            identifier: parts[0].to_string(),
            name: parts[1].to_string(),
            connected: parts[2] == "true",
            thermostat_revision: parts[3].to_string(),
            alerts_revision: parts[4].to_string(),
            runtime_revision: parts[5].to_string(),
            interval_revision: parts[6].to_string(),
        })
    }
}

/// Compares interval revisions against `last_seen`, records the new values
/// and returns the identifiers that changed. A thermostat seen for the first
/// time counts as changed.
pub(crate) fn changed_identifiers(
    summary: &Summary,
    last_seen: &mut HashMap<String, String>,
) -> Result<Vec<String>> {
    if summary.revision_list.is_empty() {
        warn!("no revision list in the thermostat summary");
    }

    // parse everything up front: a malformed entry must not leave changes
    // recorded in last_seen that the caller never received
    let revisions = summary
        .revision_list
        .iter()
        .map(|entry| entry.parse())
        .collect::<Result<Vec<Revision>>>()?;

    let mut updated = Vec::new();

    for revision in revisions {
        if last_seen.get(&revision.identifier) != Some(&revision.interval_revision) {
            last_seen.insert(revision.identifier.clone(), revision.interval_revision);
            updated.push(revision.identifier);
        }
    }

    Ok(updated)
}
