use serde::Serialize;

/// Selection object shared by all API requests, see
/// <https://www.ecobee.com/home/developer/api/documentation/v1/objects/Selection.shtml>
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Selection {
    selection_type: &'static str,
    selection_match: String,
    #[serde(skip_serializing_if = "is_false")]
    include_runtime: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_settings: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_sensors: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_equipment_status: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Selection {
    pub fn registered() -> Selection {
        Selection {
            selection_type: "registered",
            ..Selection::default()
        }
    }

    pub fn thermostats(ids: &[String]) -> Selection {
        Selection {
            selection_type: "thermostats",
            selection_match: ids.join(":"),
            ..Selection::default()
        }
    }

    pub fn with_full_state(mut self) -> Selection {
        self.include_runtime = true;
        self.include_settings = true;
        self.include_sensors = true;
        self.include_equipment_status = true;
        self
    }
}

#[derive(Serialize)]
pub(crate) struct SelectionBody {
    selection: Selection,
}

impl SelectionBody {
    pub fn new(selection: Selection) -> SelectionBody {
        SelectionBody { selection }
    }
}
