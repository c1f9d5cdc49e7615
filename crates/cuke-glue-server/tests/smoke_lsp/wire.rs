//! A small LSP client for driving `cuke-glue-lsp` over stdio.
//!
//! Frames are read on a background thread so a stalled server fails the test
//! after [`WAIT`] instead of hanging it. Notifications that arrive while a
//! response is awaited are kept for later diagnostic lookups.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

const WAIT: Duration = Duration::from_secs(10);
const EXIT_WAIT: Duration = Duration::from_secs(5);
const RECALCULATE_COMMAND: &str = "cuke-glue.recalculateSteps";

/// A running server plus the client end of its JSON-RPC stream.
pub struct Session {
    child: Child,
    stdin: ChildStdin,
    inbox: Receiver<Value>,
    held: VecDeque<Value>,
    next_id: u64,
}

impl Session {
    /// Start the server rooted at `root` and complete the handshake.
    ///
    /// Returns the session and the `initialize` result.
    pub fn start(root: &Path) -> (Self, Value) {
        let mut child = Command::new(env!("CARGO_BIN_EXE_cuke-glue-lsp"))
            .args(["--log-level", "error"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap_or_else(|err| panic!("cuke-glue-lsp should start: {err}"));
        let stdin = child
            .stdin
            .take()
            .unwrap_or_else(|| panic!("server stdin is piped"));
        let stdout = child
            .stdout
            .take()
            .unwrap_or_else(|| panic!("server stdout is piped"));
        let mut session = Self {
            child,
            stdin,
            inbox: spawn_reader(BufReader::new(stdout)),
            held: VecDeque::new(),
            next_id: 1,
        };

        let root_uri = lsp_types::Url::from_directory_path(root)
            .unwrap_or_else(|()| panic!("{} should be absolute", root.display()));
        let result = session.request(
            "initialize",
            json!({ "processId": null, "capabilities": {}, "rootUri": root_uri.as_str() }),
        );
        assert_eq!(
            result.pointer("/capabilities/executeCommandProvider/commands/0"),
            Some(&json!(RECALCULATE_COMMAND)),
            "server should advertise the recalculate command"
        );
        session.notify("initialized", json!({}));
        (session, result)
    }

    /// Send a request and return its `result`, panicking on an error reply.
    pub fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        self.write(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }));
        loop {
            let message = self.next_message();
            if message.get("id").and_then(Value::as_u64) != Some(id) {
                self.held.push_back(message);
                continue;
            }
            if let Some(error) = message.get("error") {
                panic!("{method} failed: {error}");
            }
            return message.get("result").cloned().unwrap_or(Value::Null);
        }
    }

    /// Send a notification.
    pub fn notify(&mut self, method: &str, params: Value) {
        self.write(&json!({ "jsonrpc": "2.0", "method": method, "params": params }));
    }

    /// Report a save of `path`, optionally carrying the saved text.
    pub fn save(&mut self, path: &Path, text: Option<&str>) {
        self.notify(
            "textDocument/didSave",
            json!({ "textDocument": { "uri": file_uri(path) }, "text": text }),
        );
    }

    /// Run the recalculate command on `path` and return the build report.
    pub fn recalculate(&mut self, path: &Path) -> Value {
        self.request(
            "workspace/executeCommand",
            json!({ "command": RECALCULATE_COMMAND, "arguments": [file_uri(path)] }),
        )
    }

    /// Wait for diagnostics on a file ending in `suffix` that include one
    /// with `code`, and return that diagnostic.
    pub fn diagnostic_with_code(&mut self, suffix: &str, code: &str) -> Value {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            let message = match self.held.pop_front() {
                Some(message) => message,
                None => self.next_message(),
            };
            if let Some(found) = find_diagnostic(&message, suffix, code) {
                return found;
            }
        }
        panic!("no {code} diagnostic published for *{suffix}");
    }

    /// Shut the server down and check it exits cleanly.
    pub fn shutdown(mut self) {
        self.request("shutdown", Value::Null);
        self.notify("exit", Value::Null);
        let deadline = Instant::now() + EXIT_WAIT;
        loop {
            let status = self
                .child
                .try_wait()
                .unwrap_or_else(|err| panic!("server status should be readable: {err}"));
            match status {
                Some(status) => {
                    assert!(status.success(), "server exited with {status}");
                    return;
                }
                None if Instant::now() >= deadline => panic!("server ignored exit"),
                None => std::thread::sleep(Duration::from_millis(25)),
            }
        }
    }

    fn write(&mut self, body: &Value) {
        let bytes = body.to_string();
        write!(self.stdin, "Content-Length: {}\r\n\r\n{bytes}", bytes.len())
            .and_then(|()| self.stdin.flush())
            .unwrap_or_else(|err| panic!("server stdin closed: {err}"));
    }

    fn next_message(&self) -> Value {
        self.inbox
            .recv_timeout(WAIT)
            .unwrap_or_else(|err| panic!("no message from the server: {err}"))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Both fail harmlessly once the server has exited.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_reader(mut reader: BufReader<impl Read + Send + 'static>) -> Receiver<Value> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        while let Some(message) = read_frame(&mut reader) {
            if tx.send(message).is_err() {
                break;
            }
        }
    });
    rx
}

/// One framed message, or `None` once the stream ends.
fn read_frame(reader: &mut impl BufRead) -> Option<Value> {
    let mut length = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 {
            return None;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((_, value)) = header
            .split_once(':')
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        {
            length = value.trim().parse::<usize>().ok();
        }
    }
    let mut body = vec![0; length?];
    reader.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

fn find_diagnostic(message: &Value, suffix: &str, code: &str) -> Option<Value> {
    if message.get("method")?.as_str()? != "textDocument/publishDiagnostics" {
        return None;
    }
    let params = message.get("params")?;
    if !params.get("uri")?.as_str()?.ends_with(suffix) {
        return None;
    }
    params
        .get("diagnostics")?
        .as_array()?
        .iter()
        .find(|diagnostic| diagnostic.get("code").is_some_and(|c| c == code))
        .cloned()
}

fn file_uri(path: &Path) -> String {
    lsp_types::Url::from_file_path(path)
        .unwrap_or_else(|()| panic!("{} should be absolute", path.display()))
        .to_string()
}
