// Request encoding and response decoding for the endpoint's HTTP surface.
//
// Three of the four actions travel as a GET whose query string is the
// request's flattened fields (`action=getPlants&gardenId=main&secret=...`).
// When a `callback` name is given the endpoint answers with JSONP,
// `callback({...})`, which `unwrap_jsonp` strips back to plain JSON.
// `saveScreenshot` carries a whole image, so it is POSTed as a JSON body
// instead.

use crate::ProtocolError;
use crate::message::{GardenRequest, GardenResponse};
use serde_json::Value;
use url::Url;

/// How a request goes over HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// GET with the fields as query parameters.
    Query,
    /// POST with the request as a JSON body.
    JsonBody,
}

impl GardenRequest {
    pub fn transport(&self) -> Transport {
        match self {
            GardenRequest::SaveScreenshot { .. } => Transport::JsonBody,
            _ => Transport::Query,
        }
    }

    /// The request's fields as `(name, value)` string pairs, `action` first.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>, ProtocolError> {
        let Value::Object(map) = serde_json::to_value(self)? else {
            return Ok(Vec::new());
        };
        let mut pairs: Vec<(String, String)> = map
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        pairs.sort_by_key(|(key, _)| key != "action");
        Ok(pairs)
    }
}

/// Build the GET URL for a request. `callback` asks for a JSONP reply.
pub fn encode_get_url(
    endpoint: &str,
    request: &GardenRequest,
    callback: Option<&str>,
) -> Result<Url, ProtocolError> {
    let mut url = Url::parse(endpoint)?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in request.query_pairs()? {
            query.append_pair(&key, &value);
        }
        if let Some(callback) = callback {
            query.append_pair("callback", callback);
        }
    }
    Ok(url)
}

/// Strip a JSONP wrapper (`name(...)` with an optional trailing `;`).
/// Bare JSON is returned unchanged.
pub fn unwrap_jsonp(body: &str) -> Result<&str, ProtocolError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }
    let open = trimmed
        .find('(')
        .ok_or_else(|| ProtocolError::Jsonp("no opening parenthesis".into()))?;
    let name = trimmed[..open].trim();
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.');
    if !valid_name {
        return Err(ProtocolError::Jsonp(format!("bad callback name {name:?}")));
    }
    let without_semicolon = trimmed.trim_end_matches(';').trim_end();
    let inner = without_semicolon
        .strip_suffix(')')
        .ok_or_else(|| ProtocolError::Jsonp("no closing parenthesis".into()))?;
    Ok(inner[open + 1..].trim())
}

/// Decode a response body, JSONP-wrapped or not.
pub fn parse_response(body: &str) -> Result<GardenResponse, ProtocolError> {
    let json = unwrap_jsonp(body)?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_plants() -> GardenRequest {
        GardenRequest::GetPlants {
            garden_id: "main".into(),
            secret: "a b&c".into(),
        }
    }

    #[test]
    fn query_pairs_put_action_first() {
        let pairs = get_plants().query_pairs().unwrap();
        assert_eq!(pairs[0], ("action".to_string(), "getPlants".to_string()));
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("gardenId".to_string(), "main".to_string())));
    }

    #[test]
    fn get_url_escapes_values_and_appends_callback() {
        let url = encode_get_url("https://example.test/exec", &get_plants(), Some("cb_1")).unwrap();
        let query = url.query().unwrap();
        assert!(query.starts_with("action=getPlants"), "{query}");
        assert!(query.contains("secret=a+b%26c"), "{query}");
        assert!(query.ends_with("callback=cb_1"), "{query}");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("secret".to_string(), "a b&c".to_string())));
    }

    #[test]
    fn bad_endpoint_is_a_url_error() {
        let err = encode_get_url("not a url", &get_plants(), None).unwrap_err();
        assert!(matches!(err, ProtocolError::Url(_)));
    }

    #[test]
    fn transports() {
        assert_eq!(get_plants().transport(), Transport::Query);
        let shot = GardenRequest::SaveScreenshot {
            image: String::new(),
            ts: String::new(),
            secret: String::new(),
        };
        assert_eq!(shot.transport(), Transport::JsonBody);
    }

    #[test]
    fn jsonp_is_unwrapped() {
        assert_eq!(unwrap_jsonp(r#"cb_x({"ok":true})"#).unwrap(), r#"{"ok":true}"#);
        assert_eq!(unwrap_jsonp(" cb_x( {\"ok\":true} );\n").unwrap(), r#"{"ok":true}"#);
        assert_eq!(unwrap_jsonp(r#"{"ok":false}"#).unwrap(), r#"{"ok":false}"#);
        assert!(unwrap_jsonp("<html>").is_err());
        assert!(unwrap_jsonp("alert(1) + x(").is_err());
    }

    #[test]
    fn parse_response_handles_both_forms() {
        let r = parse_response(r#"garden_cb({"ok":true,"plants":[{"id":"p"}]})"#).unwrap();
        assert!(r.ok);
        assert_eq!(r.plants.len(), 1);
        let r = parse_response(r#"{"ok":false}"#).unwrap();
        assert!(!r.ok);
        assert!(matches!(parse_response("cb(nope)"), Err(ProtocolError::Json(_))));
    }
}
