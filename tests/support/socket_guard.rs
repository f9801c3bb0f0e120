//! Localhost socket availability for tests that bind ports.
//!
//! Sandboxed runners sometimes forbid binding even loopback sockets. Tests
//! that need a port return early there, unless
//! `MURASAKI_REQUIRE_SOCKET_TESTS` is set, which turns the skip into a failure.

use std::net::{SocketAddr, TcpListener};
use std::panic::Location;
use std::sync::OnceLock;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "MURASAKI_REQUIRE_SOCKET_TESTS";

/// Result of binding an ephemeral loopback port, probed once per test binary.
fn probe() -> Option<SocketAddr> {
    static PROBE: OnceLock<Option<SocketAddr>> = OnceLock::new();
    *PROBE.get_or_init(|| {
        TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .ok()
    })
}

/// Returns true (after logging why) when the calling test must not run.
///
/// # Panics
///
/// Panics instead of skipping when `MURASAKI_REQUIRE_SOCKET_TESTS` is truthy.
#[track_caller]
pub fn localhost_unavailable() -> bool {
    if probe().is_some() {
        return false;
    }
    let caller = Location::caller();
    let required = std::env::var(REQUIRE_ENV).is_ok_and(|value| {
        let value = value.trim().to_ascii_lowercase();
        ["1", "true", "yes"].contains(&value.as_str())
    });
    assert!(
        !required,
        "{caller}: localhost sockets unavailable but {REQUIRE_ENV} demands socket tests"
    );
    eprintln!("{caller}: skipping, localhost sockets unavailable (set {REQUIRE_ENV}=1 to fail)");
    true
}

/// Starts a wiremock server, or `None` when sockets are unavailable.
#[track_caller]
pub fn start_mock_server() -> impl Future<Output = Option<MockServer>> {
    let skip = localhost_unavailable();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}

/// Base address of a loopback port nothing is listening on.
pub fn closed_local_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{address}")
}
