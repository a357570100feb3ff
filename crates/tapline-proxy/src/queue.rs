//! One strictly serialized queue per traffic direction.
//!
//! Every payload and every programmatic line becomes one unit of work on
//! the queue's channel. A single actor task takes the units in order and
//! finishes each one, including every handler it awaits and the final
//! write, before looking at the next. That is the only thing keeping
//! lines in wire order, so nothing here may process units concurrently.

use std::sync::Arc;

use tapline_plugin::{Direction, MessageContext, PluginRegistry};
use tapline_protocol::ServerCommand;
use tapline_protocol::text::{bytes_to_text, text_to_bytes};
use tapline_transport::{Frame, FrameKind};
use tokio::sync::{mpsc, oneshot};

use crate::{FrameSink, LineFramer, ProxyError};

/// Units a queue can hold before `push_*` starts waiting.
const QUEUE_CAPACITY: usize = 256;

/// Provenance attached to programmatic lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub source_id: Option<String>,
    pub tag: Option<String>,
}

impl Origin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

enum QueueCommand {
    /// A payload read from the socket.
    Frame(Frame),
    /// Complete lines originated by the proxy or a plugin.
    Text {
        text: String,
        origin: Origin,
        bypass: bool,
    },
    /// Answered once every earlier unit is done.
    Flush(oneshot::Sender<()>),
}

/// Handle to a running queue actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    direction: Direction,
    sender: mpsc::Sender<QueueCommand>,
}

impl QueueHandle {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Queues a payload read from the wire. Its lines go through the
    /// direction's framer, so a line split across payloads is processed
    /// once the payload carrying its newline arrives.
    pub async fn push_frame(&self, frame: Frame) -> Result<(), ProxyError> {
        self.push(QueueCommand::Frame(frame)).await
    }

    /// Queues complete lines. With `bypass` set they skip the handler
    /// chain.
    ///
    /// # Errors
    /// [`ProxyError::UnterminatedText`] if `text` does not end in a
    /// newline; nothing is queued.
    pub async fn push_text(
        &self,
        text: String,
        origin: Origin,
        bypass: bool,
    ) -> Result<(), ProxyError> {
        if !text.ends_with('\n') {
            return Err(ProxyError::UnterminatedText);
        }
        self.push(QueueCommand::Text {
            text,
            origin,
            bypass,
        })
        .await
    }

    /// Waits until every unit queued before this call has been written.
    pub async fn flush(&self) -> Result<(), ProxyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.push(QueueCommand::Flush(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| ProxyError::QueueClosed(self.direction))
    }

    async fn push(&self, cmd: QueueCommand) -> Result<(), ProxyError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| ProxyError::QueueClosed(self.direction))
    }
}

/// The actor state. Runs inside a Tokio task.
struct QueueActor<S> {
    direction: Direction,
    registry: Arc<PluginRegistry>,
    sink: S,
    framer: LineFramer,
    /// Representation of the most recent wire payload; output follows it.
    kind: FrameKind,
    receiver: mpsc::Receiver<QueueCommand>,
}

impl<S: FrameSink> QueueActor<S> {
    async fn run(mut self) {
        tracing::debug!(direction = %self.direction, "queue started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                QueueCommand::Frame(frame) => {
                    self.kind = frame.kind();
                    let text = match frame {
                        Frame::Text(text) => text,
                        Frame::Binary(data) => bytes_to_text(&data),
                    };
                    let lines = self.framer.append(&text);
                    self.forward(lines, Origin::default(), false).await;
                }
                QueueCommand::Text {
                    text,
                    origin,
                    bypass,
                } => {
                    // Programmatic text is always whole lines; framing it
                    // separately keeps it out of a half-received wire line.
                    let lines = LineFramer::new().append(&text);
                    self.forward(lines, origin, bypass).await;
                }
                QueueCommand::Flush(reply) => {
                    let _ = reply.send(());
                }
            }
        }

        tracing::debug!(
            direction = %self.direction,
            pending = self.framer.pending().len(),
            "queue stopped"
        );
    }

    /// Runs `lines` through the chain and writes the survivors as one
    /// payload. Failures are logged; the queue carries on with the next
    /// unit.
    async fn forward(&mut self, lines: Vec<String>, origin: Origin, bypass: bool) {
        if lines.is_empty() {
            return;
        }
        let ctx = MessageContext {
            direction: self.direction,
            source_id: origin.source_id,
            tag: origin.tag,
        };

        let mut survivors = Vec::with_capacity(lines.len());
        for line in lines {
            if self.direction == Direction::Incoming {
                self.detect_login(&line);
            }
            if bypass {
                survivors.push(line);
                continue;
            }
            tracing::trace!(direction = %self.direction, %line, "line in");
            if let Some(line) = self.registry.process(line, &ctx).await {
                self.registry.observe(&line, &ctx);
                survivors.push(line);
            }
        }
        if survivors.is_empty() {
            return;
        }

        let frame = match self.kind {
            FrameKind::Text => {
                let mut payload = survivors.join("\n");
                payload.push('\n');
                Frame::Text(payload)
            }
            FrameKind::Binary => match self.encode_lines(&survivors, &ctx) {
                Some(payload) => Frame::Binary(payload),
                None => return,
            },
        };
        if let Err(error) = self.sink.deliver(frame).await {
            tracing::warn!(direction = %self.direction, %error, "write failed");
        }
    }

    fn detect_login(&self, line: &str) {
        let command = ServerCommand::decode(line);
        if let Some((name, uid)) = command.login() {
            self.registry.notify_logged_in(name, uid);
        }
    }

    /// Converts each line to bytes on its own. A line holding a char above
    /// U+00FF is dropped; the rest of the payload still goes out.
    fn encode_lines(&self, lines: &[String], ctx: &MessageContext) -> Option<Vec<u8>> {
        let mut payload = Vec::new();
        for line in lines {
            match text_to_bytes(line) {
                Ok(bytes) => {
                    payload.extend_from_slice(&bytes);
                    payload.push(b'\n');
                }
                Err(error) => tracing::warn!(
                    direction = %self.direction,
                    source = ?ctx.source_id,
                    %line,
                    %error,
                    "line dropped, not representable as bytes"
                ),
            }
        }
        (!payload.is_empty()).then_some(payload)
    }
}

/// Spawns a queue actor for `direction` that writes into `sink`.
pub fn spawn_queue<S: FrameSink>(
    direction: Direction,
    registry: Arc<PluginRegistry>,
    sink: S,
) -> QueueHandle {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

    let actor = QueueActor {
        direction,
        registry,
        sink,
        framer: LineFramer::new(),
        kind: FrameKind::default(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    QueueHandle {
        direction,
        sender: tx,
    }
}
