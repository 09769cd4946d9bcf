// garden_remote — talks to the shared garden endpoint off the main thread.
//
// The garden session never does I/O; it hands `GardenRequest`s to its host.
// `RemoteClient` is how a host delivers them: requests go to a worker thread
// that performs the HTTP calls one at a time, and replies come back through
// `poll()` as `Completion`s to feed into `GardenSession::handle_response`.
//
// See also: `garden_protocol` for the wire format, `garden_cli` for a host
// that owns a `RemoteClient`.

pub mod client;

pub use client::{ClientError, Completion, RemoteClient, RemoteConfig};
