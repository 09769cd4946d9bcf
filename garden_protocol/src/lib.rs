// garden_protocol — wire types for the shared-garden endpoint.
//
// Every client of a garden talks to one HTTP endpoint (a spreadsheet-backed
// web app in the original installation). This crate defines what goes over
// that wire and nothing else; it has no dependency on the garden core, so the
// endpoint's loose data model (every plant field optional, numbers sometimes
// sent as strings) stays out of `garden_core`.
//
// Module overview:
// - `message.rs`: `GardenRequest` (action-tagged), `PlantPayload`,
//                 `GardenResponse`, `RemotePlant`, `RequestAction`.
// - `query.rs`:   turning a request into a GET URL (flattened query pairs
//                 plus an optional JSONP `callback`) or a POST JSON body, and
//                 unwrapping JSONP responses.
//
// Design decisions:
// - **The secret is opaque.** It is passed through on every request and
//   never inspected.
// - **Lenient decoding.** A response that decodes at all yields every plant
//   it can; malformed fields become `None` and the caller applies defaults.

pub mod message;
pub mod query;

pub use message::{GardenRequest, GardenResponse, PlantPayload, RemotePlant, RequestAction};
pub use query::{Transport, encode_get_url, parse_response, unwrap_jsonp};

use thiserror::Error;

/// Failure to encode a request or decode a response.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed JSONP wrapper: {0}")]
    Jsonp(String),
}
