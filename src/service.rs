//! JSON request surface over the PvP coordinator.
//!
//! Requests carry an already-authenticated actor id, an HTTP-style method and path, and an
//! optional JSON body. Every response is an envelope: `{"ok": true, "data": ...}` on success or
//! `{"ok": false, "status": ..., "error": {"kind": ..., "message": ...}}` on failure.

use crate::errors::{BattleError, BattleResult, ValidationError};
use crate::pvp::coordinator::PvpCoordinator;
use crate::pvp::record::SubmittedAction;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// One line of the wire protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub actor: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeBody {
    opponent_id: String,
}

pub struct BattleService {
    coordinator: Arc<PvpCoordinator>,
}

fn ok(data: impl Serialize) -> BattleResult<Value> {
    serde_json::to_value(data).map_err(|err| ValidationError::MalformedAction(err.to_string()).into())
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &Value) -> BattleResult<T> {
    serde_json::from_value(body.clone()).map_err(|err| ValidationError::MalformedAction(err.to_string()).into())
}

fn parse_battle_id(raw: &str) -> BattleResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::MalformedAction(format!("bad battle id: {raw}")).into())
}

pub fn error_envelope(err: &BattleError) -> Value {
    let kind = err.kind();
    json!({
        "ok": false,
        "status": kind.status(),
        "error": { "kind": kind, "message": err.to_string() },
    })
}

fn route_not_found(method: &str, path: &str) -> Value {
    json!({
        "ok": false,
        "status": 404,
        "error": { "kind": "not_found", "message": format!("no route for {method} {path}") },
    })
}

impl BattleService {
    pub fn new(coordinator: Arc<PvpCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &PvpCoordinator {
        &self.coordinator
    }

    pub fn handle_request(&self, request: &ServiceRequest) -> Value {
        self.handle(&request.actor, &request.method, &request.path, &request.body)
    }

    /// Parse one line of line-delimited JSON and answer it.
    pub fn handle_line(&self, line: &str) -> Value {
        match serde_json::from_str::<ServiceRequest>(line) {
            Ok(request) => self.handle_request(&request),
            Err(err) => error_envelope(&ValidationError::MalformedAction(err.to_string()).into()),
        }
    }

    pub fn handle(&self, actor: &str, method: &str, path: &str, body: &Value) -> Value {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let method = method.to_ascii_uppercase();
        debug!(actor, %method, path, "request");

        let result = match (method.as_str(), segments.as_slice()) {
            ("POST", ["battle", "challenge"]) => self.challenge(actor, body),
            ("GET", ["battle", "pending"]) => ok(self.coordinator.pending(actor)),
            ("GET", ["battle", "my-stuck"]) => ok(self.coordinator.my_stuck(actor)),
            ("POST", ["battle", "cleanup-stuck"]) => {
                ok(json!({ "cancelled": self.coordinator.cleanup_stuck(actor) }))
            }
            ("POST", ["presence", "heartbeat"]) => ok(json!({ "at": self.coordinator.heartbeat(actor) })),
            ("GET", ["battle", id, "state"]) => {
                parse_battle_id(id).and_then(|id| self.coordinator.state(actor, id)).and_then(ok)
            }
            ("POST", ["battle", id, verb]) => match *verb {
                "accept" => parse_battle_id(id).and_then(|id| self.coordinator.accept(actor, id)).and_then(ok),
                "reject" => parse_battle_id(id).and_then(|id| self.coordinator.reject(actor, id)).and_then(ok),
                "cancel" => parse_battle_id(id).and_then(|id| self.coordinator.cancel(actor, id)).and_then(ok),
                "surrender" => parse_battle_id(id).and_then(|id| self.coordinator.surrender(actor, id)).and_then(ok),
                "action" => self.action(actor, id, body),
                _ => return route_not_found(&method, path),
            },
            _ => return route_not_found(&method, path),
        };

        match result {
            Ok(data) => json!({ "ok": true, "data": data }),
            Err(err) => {
                warn!(actor, %method, path, error = %err, "request failed");
                error_envelope(&err)
            }
        }
    }

    fn challenge(&self, actor: &str, body: &Value) -> BattleResult<Value> {
        let ChallengeBody { opponent_id } = parse_body(body)?;
        let battle_id = self.coordinator.challenge(actor, &opponent_id)?;
        ok(json!({ "battleId": battle_id }))
    }

    fn action(&self, actor: &str, id: &str, body: &Value) -> BattleResult<Value> {
        let battle_id = parse_battle_id(id)?;
        let action: SubmittedAction = parse_body(body)?;
        ok(self.coordinator.submit_action(actor, battle_id, action)?)
    }
}
