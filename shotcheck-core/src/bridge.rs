//! Line-delimited JSON bridge transport
//!
//! The same [`Assess`] contract carried over a process boundary: the
//! client spawns a child running the serving loop and relays one JSON
//! object per line in each direction. Transport failures are surfaced
//! distinctly from upstream (vision) failures, since they indicate
//! infrastructure trouble rather than model trouble.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::assessor::{Assess, AssessRequest, AssessResponse};
use crate::error::{AssessError, BridgeError, VisionError};
use crate::session::ShootSession;

/// Requests carried over the bridge, one JSON object per line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeRequest {
    Assess(AssessRequest),
    Session { shoot_id: String, room_type: String },
    DeleteShoot { shoot_id: String },
}

/// Responses carried over the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeResponse {
    Assessed(AssessResponse),
    Session { session: Option<ShootSession> },
    Deleted { removed: usize },
    Error(ErrorPayload),
}

/// Error kinds as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingField,
    InvalidField,
    Upstream,
    Timeout,
    Transport,
}

/// Structured error as carried on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    pub message: String,
}

impl From<&AssessError> for ErrorPayload {
    fn from(error: &AssessError) -> Self {
        match error {
            AssessError::MissingField(field) => Self {
                kind: ErrorKind::MissingField,
                field: Some(field.clone()),
                seconds: None,
                message: error.to_string(),
            },
            AssessError::InvalidField { field, reason } => Self {
                kind: ErrorKind::InvalidField,
                field: Some(field.clone()),
                seconds: None,
                message: reason.clone(),
            },
            AssessError::Upstream(e) => Self {
                kind: ErrorKind::Upstream,
                field: None,
                seconds: None,
                message: e.to_string(),
            },
            AssessError::Timeout { seconds } => Self {
                kind: ErrorKind::Timeout,
                field: None,
                seconds: Some(*seconds),
                message: error.to_string(),
            },
            AssessError::Transport(e) => Self {
                kind: ErrorKind::Transport,
                field: None,
                seconds: None,
                message: e.to_string(),
            },
        }
    }
}

impl From<ErrorPayload> for AssessError {
    fn from(payload: ErrorPayload) -> Self {
        match payload.kind {
            ErrorKind::MissingField => AssessError::MissingField(
                payload.field.unwrap_or_else(|| "unknown".to_string()),
            ),
            ErrorKind::InvalidField => AssessError::InvalidField {
                field: payload.field.unwrap_or_else(|| "request".to_string()),
                reason: payload.message,
            },
            ErrorKind::Upstream => AssessError::Upstream(VisionError::Failed(payload.message)),
            ErrorKind::Timeout => AssessError::Timeout {
                seconds: payload.seconds.unwrap_or_default(),
            },
            ErrorKind::Transport => AssessError::Transport(BridgeError::Remote(payload.message)),
        }
    }
}

/// Dispatch one bridge request against an engine
///
/// Factored out of the serving loop so protocol behavior is testable
/// without pipes.
pub async fn handle_request(engine: &dyn Assess, request: BridgeRequest) -> BridgeResponse {
    match request {
        BridgeRequest::Assess(req) => match engine.assess(req).await {
            Ok(response) => BridgeResponse::Assessed(response),
            Err(e) => BridgeResponse::Error((&e).into()),
        },
        BridgeRequest::Session {
            shoot_id,
            room_type,
        } => match engine.session(&shoot_id, &room_type).await {
            Ok(session) => BridgeResponse::Session { session },
            Err(e) => BridgeResponse::Error((&e).into()),
        },
        BridgeRequest::DeleteShoot { shoot_id } => match engine.delete_shoot(&shoot_id).await {
            Ok(removed) => BridgeResponse::Deleted { removed },
            Err(e) => BridgeResponse::Error((&e).into()),
        },
    }
}

/// Serve the bridge protocol over a line-oriented reader/writer pair
///
/// Blank lines are skipped. An unparseable line produces an error
/// response rather than terminating the loop, so one malformed request
/// cannot take the relay down. Returns when the reader reaches EOF.
pub async fn serve<R, W>(engine: Arc<dyn Assess>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<BridgeRequest>(line) {
            Ok(request) => handle_request(engine.as_ref(), request).await,
            Err(e) => BridgeResponse::Error(ErrorPayload {
                kind: ErrorKind::Transport,
                field: None,
                seconds: None,
                message: format!("unparseable request: {e}"),
            }),
        };

        let encoded = serde_json::to_string(&response)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Configuration for the bridge child process
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Path to the shotcheck binary (defaults to "shotcheck").
    pub program: Option<String>,
    /// Extra arguments placed before the `bridge` subcommand, e.g.
    /// `--config <path>`.
    pub args: Vec<String>,
}

struct BridgeIo {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

/// Process-boundary adapter for the `assess` contract
///
/// Spawns `shotcheck bridge` as a child and relays requests over its
/// stdio. From a caller's perspective it is interchangeable with the
/// direct [`crate::Assessor`].
pub struct BridgeClient {
    io: Mutex<BridgeIo>,
}

impl BridgeClient {
    /// Build the child command without spawning
    ///
    /// Extracted for testability, so command construction can be
    /// verified without launching processes.
    pub fn build_command(config: &BridgeConfig) -> Command {
        let program = config.program.as_deref().unwrap_or("shotcheck");

        let mut cmd = Command::new(program);
        cmd.args(&config.args);
        cmd.arg("bridge");

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        // The child logs to stderr; let those lines reach our stderr.
        cmd.stderr(Stdio::inherit());
        cmd.kill_on_drop(true);

        cmd
    }

    /// Spawn the child process and wire up the relay
    pub fn spawn(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let mut cmd = Self::build_command(config);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::BinaryNotFound
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;

        let stdin = child.stdin.take().ok_or(BridgeError::Closed)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Closed)?;

        Ok(Self {
            io: Mutex::new(BridgeIo {
                child,
                stdin,
                lines: BufReader::new(stdout).lines(),
            }),
        })
    }

    /// Send one request line and wait for its response line
    async fn round_trip(&self, request: &BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        let mut io = self.io.lock().await;

        let encoded =
            serde_json::to_string(request).map_err(|e| BridgeError::Parse(e.to_string()))?;
        io.stdin.write_all(encoded.as_bytes()).await?;
        io.stdin.write_all(b"\n").await?;
        io.stdin.flush().await?;

        loop {
            match io.lines.next_line().await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    return serde_json::from_str(&line)
                        .map_err(|e| BridgeError::Parse(format!("{e}: {line}")));
                }
                None => {
                    let code = io.child.try_wait().ok().flatten().and_then(|s| s.code());
                    return Err(BridgeError::ProcessExited { code });
                }
            }
        }
    }
}

#[async_trait]
impl Assess for BridgeClient {
    async fn assess(&self, request: AssessRequest) -> Result<AssessResponse, AssessError> {
        match self.round_trip(&BridgeRequest::Assess(request)).await? {
            BridgeResponse::Assessed(response) => Ok(response),
            BridgeResponse::Error(payload) => Err(payload.into()),
            other => Err(AssessError::Transport(BridgeError::Parse(format!(
                "unexpected response: {other:?}"
            )))),
        }
    }

    async fn session(
        &self,
        shoot_id: &str,
        room_type: &str,
    ) -> Result<Option<ShootSession>, AssessError> {
        let request = BridgeRequest::Session {
            shoot_id: shoot_id.to_string(),
            room_type: room_type.to_string(),
        };
        match self.round_trip(&request).await? {
            BridgeResponse::Session { session } => Ok(session),
            BridgeResponse::Error(payload) => Err(payload.into()),
            other => Err(AssessError::Transport(BridgeError::Parse(format!(
                "unexpected response: {other:?}"
            )))),
        }
    }

    async fn delete_shoot(&self, shoot_id: &str) -> Result<usize, AssessError> {
        let request = BridgeRequest::DeleteShoot {
            shoot_id: shoot_id.to_string(),
        };
        match self.round_trip(&request).await? {
            BridgeResponse::Deleted { removed } => Ok(removed),
            BridgeResponse::Error(payload) => Err(payload.into()),
            other => Err(AssessError::Transport(BridgeError::Parse(format!(
                "unexpected response: {other:?}"
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessor::Assessor;
    use crate::config::AssessConfig;
    use crate::vision::{ImagePayload, MockVision};

    fn test_engine(vision: Arc<MockVision>) -> Arc<dyn Assess> {
        Arc::new(Assessor::with_memory_store(vision, AssessConfig::default()))
    }

    fn assess_request(shoot: &str, room: &str) -> AssessRequest {
        AssessRequest {
            image: ImagePayload::new("aGVsbG8="),
            room_type: room.to_string(),
            shoot_id: shoot.to_string(),
            stack_index: None,
            orientation: None,
        }
    }

    // ==================== Wire Format Tests ====================

    #[test]
    fn request_wire_format_is_tagged_snake_case() {
        let request = BridgeRequest::DeleteShoot {
            shoot_id: "shoot-1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["op"], "delete_shoot");
        assert_eq!(json["shoot_id"], "shoot-1");
    }

    #[test]
    fn request_roundtrips_through_json() {
        let request = BridgeRequest::Assess(assess_request("shoot-1", "kitchen"));
        let json = serde_json::to_string(&request).unwrap();
        let parsed: BridgeRequest = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, BridgeRequest::Assess(r) if r.shoot_id == "shoot-1"));
    }

    #[test]
    fn error_payload_roundtrips_validation_errors() {
        let error = AssessError::MissingField("room_type".to_string());
        let payload = ErrorPayload::from(&error);
        assert_eq!(payload.kind, ErrorKind::MissingField);

        let back: AssessError = payload.into();
        assert!(matches!(back, AssessError::MissingField(field) if field == "room_type"));
    }

    #[test]
    fn error_payload_roundtrips_timeouts_with_bound() {
        let error = AssessError::Timeout { seconds: 30 };
        let payload = ErrorPayload::from(&error);
        let back: AssessError = payload.into();
        assert!(matches!(back, AssessError::Timeout { seconds: 30 }));
    }

    #[test]
    fn error_payload_carries_upstream_detail() {
        let error = AssessError::Upstream(VisionError::Failed("quota exceeded".to_string()));
        let payload = ErrorPayload::from(&error);
        assert_eq!(payload.kind, ErrorKind::Upstream);
        assert!(payload.message.contains("quota exceeded"));
    }

    // ==================== Dispatch Tests ====================

    #[tokio::test]
    async fn handle_request_runs_assessments() {
        let vision = Arc::new(MockVision::new());
        vision.queue_feedback("Nice framing.");
        let engine = test_engine(vision);

        let response = handle_request(
            engine.as_ref(),
            BridgeRequest::Assess(assess_request("shoot-1", "kitchen")),
        )
        .await;

        match response {
            BridgeResponse::Assessed(r) => {
                assert_eq!(r.attempt_number, 1);
                assert_eq!(r.feedback, "Nice framing.");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handle_request_relays_validation_errors() {
        let engine = test_engine(Arc::new(MockVision::new()));

        let response = handle_request(
            engine.as_ref(),
            BridgeRequest::Assess(assess_request("shoot-1", "")),
        )
        .await;

        match response {
            BridgeResponse::Error(payload) => {
                assert_eq!(payload.kind, ErrorKind::MissingField);
                assert_eq!(payload.field.as_deref(), Some("room_type"));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handle_request_reports_missing_sessions_as_none() {
        let engine = test_engine(Arc::new(MockVision::new()));

        let response = handle_request(
            engine.as_ref(),
            BridgeRequest::Session {
                shoot_id: "ghost".to_string(),
                room_type: "kitchen".to_string(),
            },
        )
        .await;

        assert!(matches!(
            response,
            BridgeResponse::Session { session: None }
        ));
    }

    // ==================== Serving Loop Tests ====================

    #[tokio::test]
    async fn serve_answers_one_line_per_request() {
        let vision = Arc::new(MockVision::new());
        vision.queue_feedback("Looks good already.");
        let engine = test_engine(vision);

        let request = BridgeRequest::Assess(assess_request("shoot-1", "kitchen"));
        let input = format!(
            "{}\n{}\n",
            serde_json::to_string(&request).unwrap(),
            serde_json::to_string(&BridgeRequest::DeleteShoot {
                shoot_id: "shoot-1".to_string()
            })
            .unwrap()
        );

        let mut output = Vec::new();
        serve(engine, input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(lines.len(), 2);

        let first: BridgeResponse = serde_json::from_str(lines[0]).unwrap();
        assert!(matches!(first, BridgeResponse::Assessed(_)));
        let second: BridgeResponse = serde_json::from_str(lines[1]).unwrap();
        assert!(matches!(second, BridgeResponse::Deleted { removed: 1 }));
    }

    #[tokio::test]
    async fn serve_skips_blank_lines_and_survives_garbage() {
        let engine = test_engine(Arc::new(MockVision::new()));

        let input = "\nnot json at all\n";
        let mut output = Vec::new();
        serve(engine, input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(lines.len(), 1);

        let response: BridgeResponse = serde_json::from_str(lines[0]).unwrap();
        assert!(
            matches!(response, BridgeResponse::Error(payload) if payload.kind == ErrorKind::Transport)
        );
    }

    // ==================== Command Construction Tests ====================

    #[test]
    fn build_command_defaults_to_shotcheck() {
        let cmd = BridgeClient::build_command(&BridgeConfig::default());
        assert_eq!(cmd.as_std().get_program(), "shotcheck");
    }

    #[test]
    fn build_command_ends_with_bridge_subcommand() {
        let config = BridgeConfig {
            program: Some("/opt/shotcheck".to_string()),
            args: vec!["--config".to_string(), "/etc/shotcheck.toml".to_string()],
        };
        let cmd = BridgeClient::build_command(&config);

        assert_eq!(cmd.as_std().get_program(), "/opt/shotcheck");
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(
            args,
            vec![
                std::ffi::OsStr::new("--config"),
                std::ffi::OsStr::new("/etc/shotcheck.toml"),
                std::ffi::OsStr::new("bridge"),
            ]
        );
    }
}
