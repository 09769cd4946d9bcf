// RemoteClient against a local fake endpoint.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use garden_protocol::{GardenRequest, RequestAction};
use garden_remote::{ClientError, RemoteClient, RemoteConfig};
use url::Url;

const WAIT: Duration = Duration::from_secs(10);

/// What the fake endpoint saw.
struct Seen {
    method: String,
    url: Url,
    body: String,
}

/// Serve `replies.len()` requests, answering each with the next
/// `(status, body)`; `{cb}` in a body is replaced by the JSONP callback name.
fn fake_endpoint(replies: Vec<(u16, String)>) -> (String, mpsc::Receiver<Seen>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for (status, body) in replies {
            let mut request = server.recv().unwrap();
            let url = Url::parse(&format!("http://127.0.0.1:{port}{}", request.url())).unwrap();
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            let callback = url
                .query_pairs()
                .find(|(k, _)| k == "callback")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            tx.send(Seen {
                method: request.method().to_string(),
                url,
                body: received,
            })
            .unwrap();
            let reply = tiny_http::Response::from_string(body.replace("{cb}", &callback))
                .with_status_code(status);
            request.respond(reply).unwrap();
        }
    });
    (format!("http://127.0.0.1:{port}/exec"), rx)
}

fn get_plants() -> GardenRequest {
    GardenRequest::GetPlants {
        garden_id: "main".into(),
        secret: "shh".into(),
    }
}

#[test]
fn jsonp_poll_round_trip() {
    let (endpoint, seen) = fake_endpoint(vec![(
        200,
        r#"{cb}({"ok":true,"plants":[{"id":"p1","mood":"calm"},{"createdAt":17}]});"#.into(),
    )]);
    let client = RemoteClient::spawn(RemoteConfig::new(endpoint)).unwrap();
    client.send(get_plants()).unwrap();

    let done = client.wait(WAIT).expect("no completion");
    assert_eq!(done.action, RequestAction::GetPlants);
    let reply = done.result.unwrap();
    assert!(reply.ok);
    assert_eq!(reply.plants.len(), 2);
    assert_eq!(reply.plants[1].identity(), Some("17"));

    let request = seen.recv_timeout(WAIT).unwrap();
    assert_eq!(request.method, "GET");
    let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
    assert_eq!(pairs[0], ("action".into(), "getPlants".into()));
    assert!(pairs.contains(&("gardenId".into(), "main".into())));
    assert!(pairs.iter().any(|(k, v)| k == "callback" && v.starts_with("garden_cb_")));
}

#[test]
fn screenshot_is_posted_as_json() {
    let (endpoint, seen) = fake_endpoint(vec![(200, "<html>Moved</html>".into())]);
    let client = RemoteClient::spawn(RemoteConfig::new(endpoint)).unwrap();
    client
        .send(GardenRequest::SaveScreenshot {
            image: "data:image/svg+xml;base64,AAAA".into(),
            ts: "2023-11-15T00:00:05.000Z".into(),
            secret: "shh".into(),
        })
        .unwrap();

    let done = client.wait(WAIT).expect("no completion");
    assert_eq!(done.action, RequestAction::SaveScreenshot);
    assert!(done.result.unwrap().ok);

    let request = seen.recv_timeout(WAIT).unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url.query(), None);
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["action"], "saveScreenshot");
    assert_eq!(body["image"], "data:image/svg+xml;base64,AAAA");
}

#[test]
fn error_status_and_refusals_are_reported() {
    let (endpoint, _seen) = fake_endpoint(vec![
        (500, "oops".into()),
        (200, r#"{"ok":false,"message":"bad secret"}"#.into()),
    ]);
    let mut config = RemoteConfig::new(endpoint);
    config.use_jsonp = false;
    let client = RemoteClient::spawn(config).unwrap();
    client.send(get_plants()).unwrap();
    client.send(get_plants()).unwrap();

    let first = client.wait(WAIT).expect("no completion");
    assert!(matches!(first.result, Err(ClientError::Status(500))));
    let second = client.wait(WAIT).expect("no completion");
    let reply = second.result.unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.message.as_deref(), Some("bad secret"));
    assert!(client.poll().is_empty());
}

#[test]
fn unreachable_endpoint_fails_without_blocking_the_caller() {
    // Bind and drop a listener so the port is very likely closed.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = RemoteClient::spawn(RemoteConfig::new(format!("http://127.0.0.1:{port}/exec"))).unwrap();
    client.send(get_plants()).unwrap();
    let done = client.wait(WAIT).expect("no completion");
    assert!(matches!(done.result, Err(ClientError::Http(_))));
    assert!(client.shutdown().is_empty());
}
