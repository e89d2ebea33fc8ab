//! Line-delimited JSON transport over a Unix socket.
//!
//! Each request line is a command tagged by `op`; each command produces
//! exactly one response line, `{"ok":true,"data":...}` on success or
//! `{"ok":false,"error":"..."}` on failure. Failures carry a generic code
//! only. Client identities are masked before they leave the agent.

use crate::agent::{AiGuardAgent, ChallengeSubmission};
use crate::detectors::RequestDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

/// Error code for lines that are not a valid command.
pub const INVALID_REQUEST: &str = "invalid_request";
/// Error code for everything else.
pub const INTERNAL_ERROR: &str = "internal_error";

/// A header given as a single value or a list of values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

/// Transport command.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AnalyzeRequest {
        client: String,
        #[serde(default)]
        user_agent: Option<String>,
        #[serde(default)]
        headers: HashMap<String, HeaderValue>,
    },
    ThreatSummary {
        client: String,
    },
    IssueChallenge,
    VerifyChallenge {
        client: String,
        challenge_id: String,
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        expected_solution: Option<String>,
    },
    Stats,
    Ping,
}

#[derive(Serialize)]
struct Response<T: Serialize> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

fn success<T: Serialize>(data: T) -> String {
    let response = Response {
        ok: true,
        data: Some(data),
        error: None,
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize response");
        failure(INTERNAL_ERROR)
    })
}

fn failure(code: &'static str) -> String {
    json!({ "ok": false, "error": code }).to_string()
}

/// Build a request descriptor from transport headers.
///
/// A `user-agent` header is used when no explicit user agent is given.
fn descriptor(user_agent: Option<String>, headers: HashMap<String, HeaderValue>) -> RequestDescriptor {
    let pairs = headers.into_iter().flat_map(|(name, value)| {
        let values = match value {
            HeaderValue::One(v) => vec![v],
            HeaderValue::Many(vs) => vs,
        };
        values.into_iter().map(move |v| (name.clone(), v))
    });
    let mut request = RequestDescriptor::from_headers(String::new(), pairs);
    request.user_agent = match user_agent {
        Some(ua) => ua,
        None => request.header("user-agent").unwrap_or_default().to_string(),
    };
    request
}

/// Handle one command line and produce one response line.
pub fn handle_line(agent: &AiGuardAgent, line: &str) -> String {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => {
            debug!(error = %e, "Rejected malformed command");
            return failure(INVALID_REQUEST);
        }
    };

    match command {
        Command::AnalyzeRequest {
            client,
            user_agent,
            headers,
        } => {
            let request = descriptor(user_agent, headers);
            let report = agent.analyze_request(&client, &request);
            match serde_json::to_value(&report) {
                Ok(mut data) => {
                    data["client"] = Value::String(agent.mask(&client));
                    success(data)
                }
                Err(e) => {
                    error!(error = %e, "Failed to serialize analysis");
                    failure(INTERNAL_ERROR)
                }
            }
        }
        Command::ThreatSummary { client } => {
            let summary = agent.threat_summary(&client);
            match serde_json::to_value(&summary) {
                Ok(mut data) => {
                    data["client"] = Value::String(agent.mask(&client));
                    success(data)
                }
                Err(e) => {
                    error!(error = %e, "Failed to serialize summary");
                    failure(INTERNAL_ERROR)
                }
            }
        }
        Command::IssueChallenge => success(agent.issue_challenge()),
        Command::VerifyChallenge {
            client,
            challenge_id,
            answer,
            expected_solution,
        } => {
            let submission = ChallengeSubmission {
                challenge_id,
                answer,
                expected_solution,
            };
            success(agent.verify_challenge(&client, &submission))
        }
        Command::Stats => success(agent.stats()),
        Command::Ping => success("pong"),
    }
}

/// Serve commands on a Unix socket until the listener fails.
pub async fn serve(socket_path: &Path, agent: Arc<AiGuardAgent>) -> std::io::Result<()> {
    // Remove existing socket file if it exists
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }

    let listener = UnixListener::bind(socket_path)?;
    info!(socket = %socket_path.display(), "AI guard transport listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let agent = Arc::clone(&agent);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, agent).await {
                warn!(error = %e, "Connection ended with error");
            }
        });
    }
}

async fn handle_connection(stream: UnixStream, agent: Arc<AiGuardAgent>) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut response = handle_line(&agent, &line);
        response.push('\n');
        write_half.write_all(response.as_bytes()).await?;
    }

    debug!("Client disconnected");
    Ok(())
}
