use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use murasaki_remote::{ConnectionProfile, RemoteClient, Sleeper};
use serde_json::{Value, json};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn delays_ms(&self) -> Vec<u128> {
        self.delays().iter().map(Duration::as_millis).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Responds with each template in turn, repeating the last one forever.
pub struct Sequence {
    responses: Vec<ResponseTemplate>,
    next: AtomicUsize,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(!responses.is_empty(), "sequence needs at least one response");
        Self {
            responses,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.responses[index.min(self.responses.len() - 1)].clone()
    }
}

/// Client pointed at `server` with an instant, recording sleeper.
pub fn client_for(server: &MockServer) -> (RemoteClient, Arc<RecordingSleeper>) {
    client_with_profile(ConnectionProfile::new(server.uri()).unwrap())
}

pub fn client_with_profile(profile: ConnectionProfile) -> (RemoteClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = RemoteClient::new(profile)
        .unwrap()
        .with_sleeper(sleeper.clone());
    (client, sleeper)
}

/// Task status payload in the server's wire format.
pub fn task_json(task_id: &str, status: &str, progress: f64, logs: &[&str]) -> Value {
    json!({
        "task_id": task_id,
        "status": status,
        "progress": progress,
        "current_block": (progress * 4.0) as u32,
        "total_blocks": 4,
        "logs": logs,
    })
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |requests| requests.len())
}
