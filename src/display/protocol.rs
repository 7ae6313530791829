//! Message protocol between the controller and the rendering worker.
//!
//! The worker is an independent execution context that owns the rendering
//! surface once it has been handed over. Communication is one-way and
//! fire-and-forget: the controller posts [`WorkerMessage`]s and never waits
//! for, or receives, anything back.
//!
//! On the wire every message is one JSON object with a `type` tag:
//!
//! ```text
//! {"type":"canvas","canvas":{"id":"tty","width":120,"height":40}}
//! {"type":"start"}
//! {"type":"stop"}
//! {"type":"resize","window":{"innerWidth":120,"innerHeight":40}}
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::Sender;

/// Current size of the page viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub inner_width: u32,
    pub inner_height: u32,
}

impl Viewport {
    pub const fn new(inner_width: u32, inner_height: u32) -> Self {
        Self {
            inner_width,
            inner_height,
        }
    }
}

/// Opaque rendering surface.
///
/// Neither `Clone` nor `Copy`: moving it into a
/// [`WorkerMessage::Canvas`] hands it to the worker for good.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSurface {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

/// The four messages the controller sends.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// One-time transfer of the rendering surface. Always the first message.
    Canvas { canvas: RenderSurface },
    Start,
    Stop,
    Resize { window: Viewport },
}

impl WorkerMessage {
    pub fn resize(viewport: Viewport) -> Self {
        WorkerMessage::Resize { window: viewport }
    }

    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Canvas { .. } => "canvas",
            WorkerMessage::Start => "start",
            WorkerMessage::Stop => "stop",
            WorkerMessage::Resize { .. } => "resize",
        }
    }
}

/// Sending side of the worker channel.
pub trait WorkerPort: Send {
    /// Post a message without waiting for it to be processed.
    fn post(&mut self, message: WorkerMessage) -> Result<()>;
}

/// Posts messages into an in-process channel.
pub struct ChannelWorker {
    tx: Sender<WorkerMessage>,
}

impl ChannelWorker {
    pub fn new(tx: Sender<WorkerMessage>) -> Self {
        Self { tx }
    }
}

impl WorkerPort for ChannelWorker {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| anyhow::anyhow!("Worker channel disconnected"))
    }
}

/// Writes each message as one line of JSON.
pub struct JsonLinesWorker<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesWorker<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> WorkerPort for JsonLinesWorker<W> {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        let line = serde_json::to_string(&message).context("Failed to encode worker message")?;
        writeln!(self.writer, "{line}").context("Failed to write worker message")?;
        self.writer.flush().context("Failed to flush worker message")?;
        Ok(())
    }
}

/// Runs an external renderer and feeds it JSON lines on stdin.
pub struct ChildProcessWorker {
    child: Child,
    port: Option<JsonLinesWorker<ChildStdin>>,
}

impl ChildProcessWorker {
    /// Spawn `command` through `sh -c`.
    pub fn spawn(command: &str) -> Result<Self> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start worker command '{command}'"))?;

        let stdin = child
            .stdin
            .take()
            .context("Worker process has no stdin pipe")?;

        Ok(Self {
            child,
            port: Some(JsonLinesWorker::new(stdin)),
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl WorkerPort for ChildProcessWorker {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        match self.port.as_mut() {
            Some(port) => port.post(message),
            None => anyhow::bail!("Worker process stdin already closed"),
        }
    }
}

impl Drop for ChildProcessWorker {
    fn drop(&mut self) {
        // Closing stdin is the worker's cue to exit
        self.port.take();
        if let Ok(None) = self.child.try_wait() {
            std::thread::sleep(std::time::Duration::from_millis(100));
            if let Ok(None) = self.child.try_wait() {
                let _ = self.child.kill();
            }
        }
        let _ = self.child.wait();
    }
}

/// Prints messages to the log instead of delivering them anywhere.
///
/// Used when no worker command is configured.
pub struct LogWorker;

impl WorkerPort for LogWorker {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        let line = serde_json::to_string(&message).context("Failed to encode worker message")?;
        log_decorated!("Worker ← {}", line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let canvas = WorkerMessage::Canvas {
            canvas: RenderSurface {
                id: "tty".to_string(),
                width: 80,
                height: 24,
            },
        };
        assert_eq!(
            serde_json::to_string(&canvas).unwrap(),
            r#"{"type":"canvas","canvas":{"id":"tty","width":80,"height":24}}"#
        );
        assert_eq!(
            serde_json::to_string(&WorkerMessage::Start).unwrap(),
            r#"{"type":"start"}"#
        );
        assert_eq!(
            serde_json::to_string(&WorkerMessage::Stop).unwrap(),
            r#"{"type":"stop"}"#
        );
        assert_eq!(
            serde_json::to_string(&WorkerMessage::resize(Viewport::new(1280, 720))).unwrap(),
            r#"{"type":"resize","window":{"innerWidth":1280,"innerHeight":720}}"#
        );
    }

    #[test]
    fn test_json_lines_worker_writes_one_line_per_message() {
        let mut worker = JsonLinesWorker::new(Vec::new());
        worker.post(WorkerMessage::Start).unwrap();
        worker.post(WorkerMessage::Stop).unwrap();

        let output = String::from_utf8(worker.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec![r#"{"type":"start"}"#, r#"{"type":"stop"}"#]);
    }

    #[test]
    fn test_channel_worker_reports_disconnect() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut worker = ChannelWorker::new(tx);
        worker.post(WorkerMessage::Start).unwrap();
        assert_eq!(rx.recv().unwrap(), WorkerMessage::Start);

        drop(rx);
        assert!(worker.post(WorkerMessage::Stop).is_err());
    }

    #[test]
    fn test_child_process_worker_receives_lines() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("received.jsonl");
        let command = format!("cat > '{}'", out.display());

        let mut worker = ChildProcessWorker::spawn(&command).unwrap();
        worker.post(WorkerMessage::Start).unwrap();
        worker
            .post(WorkerMessage::resize(Viewport::new(10, 5)))
            .unwrap();
        drop(worker);

        let received = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            received,
            "{\"type\":\"start\"}\n{\"type\":\"resize\",\"window\":{\"innerWidth\":10,\"innerHeight\":5}}\n"
        );
    }
}
