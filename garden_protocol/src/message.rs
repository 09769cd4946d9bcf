// Requests and responses exchanged with the garden endpoint.
//
// `GardenRequest` is internally tagged by `action` with camelCase field
// names, matching the endpoint's flat parameter set:
//
//   {"action":"addPlant","gardenId":"main","plantJson":"{...}","secret":"..."}
//
// `addPlant` carries the plant as a JSON *string* (`plantJson`), because the
// request travels as URL query parameters. `PlantPayload` is the shape of
// that embedded object.
//
// Responses are `{ok, plants?, message?}`. Plants written by other clients
// (or by hand into the backing sheet) may lack any field, so every
// `RemotePlant` field is optional and decoded leniently: numbers may arrive
// as numeric strings, and a field of the wrong type becomes `None` instead of
// failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The four endpoint actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestAction {
    AddPlant,
    GetPlants,
    RegisterEmail,
    SaveScreenshot,
}

impl RequestAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestAction::AddPlant => "addPlant",
            RequestAction::GetPlants => "getPlants",
            RequestAction::RegisterEmail => "registerEmail",
            RequestAction::SaveScreenshot => "saveScreenshot",
        }
    }
}

/// A request to the garden endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GardenRequest {
    /// Publish one locally sprouted plant.
    #[serde(rename_all = "camelCase")]
    AddPlant {
        garden_id: String,
        /// `PlantPayload` serialized as JSON.
        plant_json: String,
        secret: String,
    },
    /// Fetch every plant of a garden.
    #[serde(rename_all = "camelCase")]
    GetPlants { garden_id: String, secret: String },
    /// Store a visitor's email address.
    RegisterEmail {
        email: String,
        /// ISO-8601 timestamp.
        ts: String,
        secret: String,
    },
    /// Upload a canvas snapshot as a data URL.
    SaveScreenshot {
        image: String,
        ts: String,
        secret: String,
    },
}

impl GardenRequest {
    /// Build an `addPlant` request around a payload.
    pub fn add_plant(
        garden_id: &str,
        payload: &PlantPayload,
        secret: &str,
    ) -> Result<Self, serde_json::Error> {
        Ok(GardenRequest::AddPlant {
            garden_id: garden_id.to_string(),
            plant_json: serde_json::to_string(payload)?,
            secret: secret.to_string(),
        })
    }

    pub fn action(&self) -> RequestAction {
        match self {
            GardenRequest::AddPlant { .. } => RequestAction::AddPlant,
            GardenRequest::GetPlants { .. } => RequestAction::GetPlants,
            GardenRequest::RegisterEmail { .. } => RequestAction::RegisterEmail,
            GardenRequest::SaveScreenshot { .. } => RequestAction::SaveScreenshot,
        }
    }
}

/// The plant object embedded in `addPlant` as `plantJson`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPayload {
    pub id: String,
    pub text: String,
    pub confidence: f64,
    pub mood: String,
    pub energy: f64,
    pub height: f64,
    pub complexity: u8,
    pub x: f64,
    pub y: f64,
    /// Epoch milliseconds at publish time.
    pub created_at: u64,
}

/// Endpoint reply. `ok == false` means the request was refused or failed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient_list")]
    pub plants: Vec<RemotePlant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A plant as returned by `getPlants`. Any field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlant {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub complexity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy: Option<f64>,
}

impl RemotePlant {
    /// The id this plant is known by: `id`, else `createdAt`. Blank values
    /// do not count.
    pub fn identity(&self) -> Option<&str> {
        [self.id.as_deref(), self.created_at.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// `null`, a missing key, or a non-array all decode to an empty list; array
/// entries that are not objects are dropped.
fn lenient_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<RemotePlant>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
