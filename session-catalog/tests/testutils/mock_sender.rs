//! In-memory requests sender

use session_catalog::sender::RemoteError;
use session_catalog::{AsyncRequestsSender, Document, Request, Response, SenderOptions, ShardId};
use std::collections::{HashSet, VecDeque};

/// Answers dispatched requests in a fixed order
///
/// Responses come back in reverse dispatch order so tests can tell response
/// order apart from request order.
pub struct ScriptedSender {
    pub options: SenderOptions,
    pub dispatched: Vec<Request>,
    pending: VecDeque<Request>,
    unreachable: HashSet<ShardId>,
    pub stopped: bool,
}

impl ScriptedSender {
    pub fn new(options: SenderOptions, requests: Vec<Request>) -> Self {
        Self {
            options,
            pending: requests.iter().rev().cloned().collect(),
            dispatched: requests,
            unreachable: HashSet::new(),
            stopped: false,
        }
    }

    /// Fail every request to `shard`
    pub fn with_unreachable(mut self, shard: &str) -> Self {
        self.unreachable.insert(ShardId::new(shard));
        self
    }
}

impl AsyncRequestsSender for ScriptedSender {
    fn done(&mut self) -> bool {
        self.pending.is_empty()
    }

    fn next(&mut self) -> Response {
        let Some(request) = self.pending.pop_front() else {
            panic!("next() called on a finished sender");
        };

        let sw_response = if self.unreachable.contains(&request.shard_id) {
            Err(RemoteError::HostUnreachable(request.shard_id.clone()))
        } else {
            let mut reply = Document::new();
            reply.insert("ok".to_string(), serde_json::json!(1));
            Ok(reply)
        };
        Response {
            shard_id: request.shard_id,
            sw_response,
        }
    }

    fn stop_retrying(&mut self) {
        self.stopped = true;
    }
}

/// Build a command document from a JSON object literal
pub fn doc(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {}", other),
    }
}
