//! Integration tests for prompt-synchronized execution and decoding,
//! driven by a scripted transport double.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use cbackup_shell_core::{
    ClientConfig, DecodedResult, Error, SchedulerCommand, SchedulerSettings, SessionConfig,
    TimeoutSettings,
};
use cbackup_shell_session::{Dialer, SchedulerClient, ShellSession, Transport};

/// One scripted transport event.
enum Step {
    /// Return these bytes from the next read
    Chunk(&'static [u8]),
    /// Sleep out the caller's timeout and fail the read
    Starve,
}

/// Scripted transport double; records writes, replays reads.
struct MockTransport {
    steps: VecDeque<Step>,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<AtomicUsize>,
}

impl MockTransport {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            writes: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn writes_handle(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.writes)
    }

    fn closed_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> cbackup_shell_core::Result<()> {
        self.writes.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    fn read_chunk(&mut self, timeout: Duration) -> cbackup_shell_core::Result<Vec<u8>> {
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => Ok(bytes.to_vec()),
            Some(Step::Starve) | None => {
                std::thread::sleep(timeout);
                Err(Error::Transport(format!(
                    "timed out after {}s",
                    timeout.as_secs_f64()
                )))
            }
        }
    }

    fn exec(&mut self, _command: &str) -> cbackup_shell_core::Result<String> {
        Ok("exec output".to_string())
    }

    fn close(&mut self) -> cbackup_shell_core::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Dialer double that counts connection attempts.
struct CountingDialer {
    dials: Arc<AtomicUsize>,
}

impl CountingDialer {
    fn new() -> Self {
        Self {
            dials: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Dialer for CountingDialer {
    fn dial(&self, _config: &SessionConfig) -> cbackup_shell_core::Result<Box<dyn Transport>> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransport::new(vec![])))
    }
}

/// Session config with millisecond timeouts so starvation tests stay fast.
fn test_config(command_timeout: Duration) -> SessionConfig {
    SessionConfig {
        host: "worker".to_string(),
        port: 8437,
        username: "cbadmin".to_string(),
        password: "secret".to_string(),
        connect_timeout: Duration::from_millis(100),
        greeting_timeout: Duration::from_millis(50),
        command_timeout,
    }
}

fn session_with(steps: Vec<Step>) -> (ShellSession, Arc<Mutex<Vec<Vec<u8>>>>) {
    let transport = MockTransport::new(steps);
    let writes = transport.writes_handle();
    let session = ShellSession::with_transport(
        test_config(Duration::from_millis(100)),
        Box::new(transport),
    );
    (session, writes)
}

const GREETING: &[u8] = b"cBackup Shell - Type 'help' for available commands\r\ncbackup> ";

#[test]
fn test_end_to_end_json_reply() {
    // The example scenario: ANSI-decorated OK line, a one-line JSON payload,
    // then the prompt.
    let (session, writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"\x1b[32mOK\x1b[0m\r\n{\"status\":\"ok\",\"count\":3}\r\ncbackup> "),
    ]);

    let mut client = SchedulerClient::from_session(session);
    let result = client
        .execute(&SchedulerCommand::Raw("list".to_string()))
        .unwrap();

    let map = result.as_map().expect("expected success mapping").clone();
    assert_eq!(map.get("status"), Some(&Value::String("ok".to_string())));
    assert_eq!(map.get("count"), Some(&Value::Number(3.into())));

    let written = writes.lock().unwrap();
    assert_eq!(written.as_slice(), [b"list\n".to_vec()]);
}

#[test]
fn test_greeting_timeout_still_yields_usable_session() {
    // No greeting ever arrives; the session must degrade to a warning and
    // run the command anyway.
    let (mut session, _writes) = session_with(vec![
        Step::Starve,
        Step::Chunk(b"{\"status\":\"ok\"}\r\ncbackup> "),
    ]);

    let frame = session.run("status -json").unwrap();
    assert_eq!(frame, "{\"status\":\"ok\"}");
}

#[test]
fn test_frame_without_trailing_space_is_accepted() {
    let (mut session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"{\"ok\":true}\r\ncbackup>"),
    ]);

    let frame = session.run("status -json").unwrap();
    assert_eq!(frame, "{\"ok\":true}");
}

#[test]
fn test_frame_with_trailing_newline_is_accepted() {
    // The strict end-of-capture pattern misses "cbackup> \n"; the multiline
    // fallback must pick it up.
    let (mut session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"{\"ok\":true}\r\ncbackup> \n"),
    ]);

    let frame = session.run("status -json").unwrap();
    assert_eq!(frame, "{\"ok\":true}");
}

#[test]
fn test_chunked_frame_is_reassembled() {
    let (mut session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"{\"status\":"),
        Step::Chunk(b"\"ok\"}"),
        Step::Chunk(b"\r\ncbackup> "),
    ]);

    let frame = session.run("status -json").unwrap();
    assert_eq!(frame, "{\"status\":\"ok\"}");
}

#[test]
fn test_missing_prompt_times_out_with_frame_read_error() {
    let timeout = Duration::from_millis(80);
    let transport = MockTransport::new(vec![Step::Chunk(GREETING)]);
    let mut session = ShellSession::with_transport(test_config(timeout), Box::new(transport));

    let started = Instant::now();
    let err = session.run("status -json").unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::FrameRead(_)));
    // Every pattern attempt gets the full operation timeout, so the command
    // cannot fail before one timeout has elapsed.
    assert!(
        elapsed >= timeout,
        "failed after {elapsed:?}, before the {timeout:?} timeout"
    );
}

#[test]
fn test_remote_banner_decodes_to_failure_message() {
    let (session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"\x1b[31mError\x1b[0m\r\nUnknown command: frobnicate. Type 'help' for available commands.\r\ncbackup> "),
    ]);

    let mut client = SchedulerClient::from_session(session);
    let result = client
        .execute(&SchedulerCommand::Raw("frobnicate".to_string()))
        .unwrap();

    assert_eq!(
        result,
        DecodedResult::Failure {
            message: "Unknown command: frobnicate. Type 'help' for available commands.".to_string()
        }
    );
}

#[test]
fn test_typed_helper_maps_banner_to_remote_rejected() {
    let (session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"Error\r\nTask not found\r\ncbackup> "),
    ]);

    let mut client = SchedulerClient::from_session(session);
    let err = client.run_task("nightly").unwrap_err();
    assert!(matches!(err, Error::RemoteRejected(msg) if msg == "Task not found"));
}

#[test]
fn test_empty_frame_decodes_to_empty_failure() {
    let (session, _writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"cbackup> "),
    ]);

    let mut client = SchedulerClient::from_session(session);
    let result = client
        .execute(&SchedulerCommand::Raw("noop".to_string()))
        .unwrap();

    assert_eq!(
        result,
        DecodedResult::Failure {
            message: String::new()
        }
    );
}

#[test]
fn test_command_with_embedded_newline_is_rejected_before_io() {
    let (mut session, writes) = session_with(vec![Step::Chunk(GREETING)]);

    let err = session.run("status\nstop").unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(writes.lock().unwrap().is_empty());
}

#[test]
fn test_missing_password_fails_without_dialing() {
    let settings = ClientConfig {
        scheduler: SchedulerSettings {
            host: "worker".to_string(),
            port: 8437,
            username: "cbadmin".to_string(),
            password: String::new(),
        },
        timeouts: TimeoutSettings::default(),
    };

    let dialer = CountingDialer::new();
    let err = ShellSession::connect_with(&settings, &dialer).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(dialer.dials.load(Ordering::SeqCst), 0);
}

#[test]
fn test_valid_settings_dial_exactly_once() {
    let settings = ClientConfig {
        scheduler: SchedulerSettings {
            host: "worker".to_string(),
            port: 8437,
            username: "cbadmin".to_string(),
            password: "secret".to_string(),
        },
        timeouts: TimeoutSettings::default(),
    };

    let dialer = CountingDialer::new();
    let session = ShellSession::connect_with(&settings, &dialer).unwrap();

    assert!(session.is_open());
    assert_eq!(dialer.dials.load(Ordering::SeqCst), 1);
}

#[test]
fn test_close_is_idempotent_and_drop_releases_once() {
    let transport = MockTransport::new(vec![]);
    let closed = transport.closed_handle();
    let mut session = ShellSession::with_transport(
        test_config(Duration::from_millis(100)),
        Box::new(transport),
    );

    session.close().unwrap();
    session.close().unwrap();
    assert!(!session.is_open());
    drop(session);

    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_closes_open_session() {
    let transport = MockTransport::new(vec![]);
    let closed = transport.closed_handle();
    let session = ShellSession::with_transport(
        test_config(Duration::from_millis(100)),
        Box::new(transport),
    );

    drop(session);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_exec_once_bypasses_prompt_framing() {
    let (mut session, writes) = session_with(vec![]);

    let output = session.exec_once("version").unwrap();
    assert_eq!(output, "exec output");
    // The interactive shell saw no traffic.
    assert!(writes.lock().unwrap().is_empty());
}

#[test]
fn test_greeting_is_awaited_only_once_per_session() {
    let (mut session, writes) = session_with(vec![
        Step::Chunk(GREETING),
        Step::Chunk(b"{\"n\":1}\r\ncbackup> "),
        // Second command: no greeting chunk scripted, reply comes directly.
        Step::Chunk(b"{\"n\":2}\r\ncbackup> "),
    ]);

    assert_eq!(session.run("status -json").unwrap(), "{\"n\":1}");
    assert_eq!(session.run("status -json").unwrap(), "{\"n\":2}");
    assert_eq!(writes.lock().unwrap().len(), 2);
}
