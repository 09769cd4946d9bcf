// HTTP client for the garden endpoint.
//
// Gives the host a non-blocking interface to a blocking HTTP stack:
// - `spawn()` checks the endpoint URL, builds a `reqwest` blocking client and
//   starts one worker thread.
// - `send()` pushes a request into an `mpsc` channel and returns at once.
// - The worker takes requests in order, performs each one, and pushes a
//   `Completion` (the action plus the decoded reply or the error) back.
// - `poll()` drains finished completions without blocking.
//
// Query-style requests are sent as GETs. With `use_jsonp` each gets a fresh
// callback name and the JSONP wrapper is stripped from the reply; without it
// the endpoint is expected to answer with bare JSON. `saveScreenshot` is a
// JSON POST; since the endpoint may answer it with an HTML redirect page, any
// 2xx reply whose body is not JSON still counts as delivered.
//
// Failures are logged and reported once. Nothing is retried: polls recur on
// their own, and a lost `addPlant` just means the plant stays local.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use garden_protocol::{
    GardenRequest, GardenResponse, ProtocolError, RequestAction, Transport, encode_get_url,
    parse_response,
};
use reqwest::blocking::Client;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint answered with status {0}")]
    Status(u16),
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("worker thread is gone")]
    Disconnected,
}

/// Where and how to reach the endpoint.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub endpoint: String,
    /// Ask for JSONP replies on GET requests.
    pub use_jsonp: bool,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            use_jsonp: true,
            timeout: Duration::from_secs(15),
        }
    }
}

/// The outcome of one request.
#[derive(Debug)]
pub struct Completion {
    pub action: RequestAction,
    pub result: Result<GardenResponse, ClientError>,
}

impl Completion {
    /// The reply in the shape `GardenSession::handle_response` takes.
    pub fn into_response(self) -> (RequestAction, Option<GardenResponse>) {
        (self.action, self.result.ok())
    }
}

pub struct RemoteClient {
    outbox: Option<Sender<GardenRequest>>,
    inbox: Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
}

impl RemoteClient {
    /// Validate the endpoint and start the worker thread.
    pub fn spawn(config: RemoteConfig) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let http = Client::builder().timeout(config.timeout).build()?;

        let (request_tx, request_rx) = mpsc::channel::<GardenRequest>();
        let (completion_tx, completion_rx) = mpsc::channel();
        let mut worker = Worker {
            http,
            endpoint,
            use_jsonp: config.use_jsonp,
            next_callback: 0,
        };
        let handle = thread::Builder::new()
            .name("garden-remote".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let completion = worker.perform(request);
                    if completion_tx.send(completion).is_err() {
                        break; // Client dropped
                    }
                }
            })
            .map_err(|_| ClientError::Disconnected)?;

        tracing::info!(endpoint = %config.endpoint, jsonp = config.use_jsonp, "remote client started");
        Ok(Self {
            outbox: Some(request_tx),
            inbox: completion_rx,
            worker: Some(handle),
        })
    }

    /// Queue a request. Only fails if the worker has died.
    pub fn send(&self, request: GardenRequest) -> Result<(), ClientError> {
        let outbox = self.outbox.as_ref().ok_or(ClientError::Disconnected)?;
        outbox.send(request).map_err(|_| ClientError::Disconnected)
    }

    /// Drain finished requests (non-blocking).
    pub fn poll(&self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.inbox.try_recv() {
            done.push(completion);
        }
        done
    }

    /// Wait up to `timeout` for the next finished request.
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        self.inbox.recv_timeout(timeout).ok()
    }

    /// Finish the queued requests, then stop the worker.
    pub fn shutdown(mut self) -> Vec<Completion> {
        self.outbox = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("remote worker panicked");
            }
        }
        self.poll()
    }
}

impl Drop for RemoteClient {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop; the thread is left to
        // finish its current request on its own.
        self.outbox = None;
    }
}

struct Worker {
    http: Client,
    endpoint: Url,
    use_jsonp: bool,
    next_callback: u64,
}

impl Worker {
    fn perform(&mut self, request: GardenRequest) -> Completion {
        let action = request.action();
        let result = match request.transport() {
            Transport::Query => self.get(&request),
            Transport::JsonBody => self.post(&request),
        };
        match &result {
            Ok(reply) if !reply.ok => {
                tracing::warn!(action = action.as_str(), message = ?reply.message, "endpoint refused request");
            }
            Ok(_) => tracing::debug!(action = action.as_str(), "request done"),
            Err(e) => tracing::warn!(action = action.as_str(), error = %e, "request failed"),
        }
        Completion { action, result }
    }

    fn get(&mut self, request: &GardenRequest) -> Result<GardenResponse, ClientError> {
        let callback = self.use_jsonp.then(|| self.callback_name());
        let url = encode_get_url(self.endpoint.as_str(), request, callback.as_deref())?;
        let body = self.fetch(self.http.get(url))?;
        Ok(parse_response(&body)?)
    }

    fn post(&mut self, request: &GardenRequest) -> Result<GardenResponse, ClientError> {
        let body = serde_json::to_string(request)?;
        let builder = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let reply = self.fetch(builder)?;
        Ok(parse_response(&reply).unwrap_or_else(|_| GardenResponse {
            ok: true,
            ..GardenResponse::default()
        }))
    }

    fn fetch(&self, builder: reqwest::blocking::RequestBuilder) -> Result<String, ClientError> {
        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.text()?)
    }

    fn callback_name(&mut self) -> String {
        let n = self.next_callback;
        self.next_callback += 1;
        format!("garden_cb_{n}")
    }
}
