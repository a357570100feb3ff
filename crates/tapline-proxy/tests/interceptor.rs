//! Integration tests for the interception queues, driven through channel
//! sinks instead of sockets.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tapline_plugin::{
    Direction, Handler, HandlerResult, LifecycleEvent, MessageContext, PluginMetadata,
    PluginRegistry,
};
use tapline_proxy::{Interceptor, Origin, ProxyError, spawn_queue};
use tapline_transport::Frame;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

struct Harness {
    proxy: Interceptor,
    to_client: mpsc::UnboundedReceiver<Frame>,
    to_server: mpsc::UnboundedReceiver<Frame>,
}

impl Harness {
    fn new(registry: PluginRegistry) -> Self {
        let (client_tx, to_client) = mpsc::unbounded_channel();
        let (server_tx, to_server) = mpsc::unbounded_channel();
        Self {
            proxy: Interceptor::new(Arc::new(registry), client_tx, server_tx),
            to_client,
            to_server,
        }
    }

    async fn client_frames(&mut self) -> Vec<Frame> {
        self.proxy.flush().await.unwrap();
        drain(&mut self.to_client)
    }

    async fn server_frames(&mut self) -> Vec<Frame> {
        self.proxy.flush().await.unwrap();
        drain(&mut self.to_server)
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Frame>) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

fn text(s: &str) -> Frame {
    Frame::Text(s.to_owned())
}

fn meta(id: &str) -> PluginMetadata {
    PluginMetadata::new(id, id, "0.1.0")
}

/// Drops every line starting with `prefix`.
struct DropPrefix(&'static str);

#[async_trait]
impl Handler for DropPrefix {
    async fn handle(&self, line: String, _ctx: &MessageContext) -> HandlerResult {
        Ok((!line.starts_with(self.0)).then_some(line))
    }
}

struct Append(&'static str);

#[async_trait]
impl Handler for Append {
    async fn handle(&self, line: String, _ctx: &MessageContext) -> HandlerResult {
        Ok(Some(format!("{line}{}", self.0)))
    }
}

/// Yields a number of times that depends on the line, so later lines would
/// finish first if the queue let them run concurrently.
struct Jitter;

#[async_trait]
impl Handler for Jitter {
    async fn handle(&self, line: String, _ctx: &MessageContext) -> HandlerResult {
        let n: usize = line.trim_start_matches('n').parse().unwrap_or(0);
        for _ in 0..(40 - n) {
            tokio::task::yield_now().await;
        }
        Ok(Some(line))
    }
}

/// Records the payload of every `Frame::Text` as a list of lines.
fn lines(frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .flat_map(|f| match f {
            Frame::Text(t) => t.lines().map(str::to_owned).collect::<Vec<_>>(),
            Frame::Binary(_) => panic!("expected text frames, got {f:?}"),
        })
        .collect()
}

// =========================================================================
// Incoming path
// =========================================================================

#[tokio::test]
async fn test_incoming_chunk_without_plugins_and_login() {
    let registry = PluginRegistry::new();
    let logins = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&logins);
    registry
        .register_plugin(meta("watch"), move |ctx| {
            ctx.on(move |event| {
                if let LifecycleEvent::Login { name, uid } = event {
                    seen.lock().unwrap().push((name.clone(), *uid));
                }
            });
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy.server_frame(text("]B100 Foo\n(Hi\n")).await.unwrap();

    let frames = h.client_frames().await;
    assert_eq!(frames, vec![text("]B100 Foo\n(Hi\n")]);
    assert_eq!(lines(&frames), ["]B100 Foo", "(Hi"]);
    assert_eq!(*logins.lock().unwrap(), vec![("Foo".to_owned(), 100)]);
}

#[tokio::test]
async fn test_lines_split_across_payloads_wait_for_newline() {
    let mut h = Harness::new(PluginRegistry::new());

    h.proxy.server_frame(text("]B1")).await.unwrap();
    assert!(h.client_frames().await.is_empty());

    h.proxy.server_frame(text("00 Foo\n(H")).await.unwrap();
    h.proxy.server_frame(text("i\n")).await.unwrap();
    assert_eq!(
        h.client_frames().await,
        vec![text("]B100 Foo\n"), text("(Hi\n")]
    );
}

#[tokio::test]
async fn test_binary_payload_is_byte_exact() {
    let registry = PluginRegistry::new();
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    registry
        .register_plugin(meta("observer"), move |ctx| {
            ctx.observe_incoming(move |line, _| sink.lock().unwrap().push(line.to_owned()));
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    let payload = b"@!\xfe\xfe##\xfe\xfdRat\n".to_vec();
    h.proxy.server_frame(Frame::Binary(payload.clone())).await.unwrap();

    assert_eq!(h.client_frames().await, vec![Frame::Binary(payload)]);
    assert_eq!(
        *observed.lock().unwrap(),
        vec!["@!\u{fe}\u{fe}##\u{fe}\u{fd}Rat".to_owned()]
    );
}

#[tokio::test]
async fn test_dropped_lines_are_omitted() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("filter"), |ctx| {
            ctx.on_incoming(0, DropPrefix("("));
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy
        .server_frame(text("]E!!\n(spam\n]G   !\n"))
        .await
        .unwrap();
    h.proxy.server_frame(text("(only spam\n")).await.unwrap();

    assert_eq!(h.client_frames().await, vec![text("]E!!\n]G   !\n")]);
}

#[tokio::test]
async fn test_order_survives_suspending_handlers() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("jitter"), |ctx| {
            ctx.on_incoming(0, Jitter);
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    for i in 0..20 {
        h.proxy.server_frame(text(&format!("n{i}\n"))).await.unwrap();
    }

    let expected: Vec<String> = (0..20).map(|i| format!("n{i}")).collect();
    assert_eq!(lines(&h.client_frames().await), expected);
}

#[tokio::test]
async fn test_failed_write_does_not_stop_the_queue() {
    let mut h = Harness::new(PluginRegistry::new());
    h.to_client.close();

    h.proxy.server_frame(text("(lost\n")).await.unwrap();
    h.proxy.flush().await.unwrap();

    // The outgoing side and the incoming queue itself are still alive.
    h.proxy.client_frame(text("p\n")).await.unwrap();
    assert_eq!(h.server_frames().await, vec![text("p\n")]);
    h.proxy.server_frame(text("(again\n")).await.unwrap();
    h.proxy.flush().await.unwrap();
}

// =========================================================================
// Programmatic traffic
// =========================================================================

#[tokio::test]
async fn test_send_runs_outgoing_chain_with_origin() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("stamp"), |ctx| {
            ctx.on_outgoing(0, |line: String, ctx: MessageContext| async move {
                let source = ctx.source_id.unwrap_or_default();
                let tag = ctx.tag.unwrap_or_default();
                Ok::<_, tapline_plugin::HandlerError>(Some(format!("{line}[{source}/{tag}]")))
            });
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy
        .send("(hello", Origin::new().source("bot").tag("t1"))
        .await
        .unwrap();
    h.proxy.client_frame(text("p\n")).await.unwrap();

    assert_eq!(
        h.server_frames().await,
        vec![text("(hello[bot/t1]\n"), text("p[/]\n")]
    );
}

#[tokio::test]
async fn test_raw_lines_bypass_the_chain() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("mute"), |ctx| {
            ctx.on_outgoing(0, DropPrefix("")).on_incoming(0, DropPrefix(""));
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy.send("(dropped", Origin::new()).await.unwrap();
    h.proxy.send_raw("]Q").await.unwrap();
    h.proxy.inject("!dropped", Origin::new()).await.unwrap();
    h.proxy.inject_raw("!Kept").await.unwrap();

    assert_eq!(h.server_frames().await, vec![text("]Q\n")]);
    assert_eq!(h.client_frames().await, vec![text("!Kept\n")]);
}

#[tokio::test]
async fn test_trailing_newline_is_rejected() {
    let h = Harness::new(PluginRegistry::new());
    assert!(matches!(
        h.proxy.send("(hi\n", Origin::new()).await,
        Err(ProxyError::TrailingNewline)
    ));
    assert!(matches!(
        h.proxy.inject_raw("!x\n").await,
        Err(ProxyError::TrailingNewline)
    ));
}

#[tokio::test]
async fn test_multi_line_inject_is_framed() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("bang"), |ctx| {
            ctx.on_incoming(0, Append("!"));
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy.inject("(a\n(b", Origin::new()).await.unwrap();
    assert_eq!(h.client_frames().await, vec![text("(a!\n(b!\n")]);
}

#[tokio::test]
async fn test_inject_does_not_split_a_pending_wire_line() {
    let mut h = Harness::new(PluginRegistry::new());

    h.proxy.server_frame(text("]B1")).await.unwrap();
    h.proxy.inject("!Notice", Origin::new()).await.unwrap();
    h.proxy.server_frame(text("00 Foo\n")).await.unwrap();

    assert_eq!(
        h.client_frames().await,
        vec![text("!Notice\n"), text("]B100 Foo\n")]
    );
}

#[tokio::test]
async fn test_output_follows_last_input_representation() {
    let mut h = Harness::new(PluginRegistry::new());

    h.proxy.inject("(a", Origin::new()).await.unwrap();
    h.proxy
        .server_frame(Frame::Binary(b"(b\n".to_vec()))
        .await
        .unwrap();
    h.proxy.inject("(c", Origin::new()).await.unwrap();
    h.proxy.server_frame(text("(d\n")).await.unwrap();

    assert_eq!(
        h.client_frames().await,
        vec![
            text("(a\n"),
            Frame::Binary(b"(b\n".to_vec()),
            Frame::Binary(b"(c\n".to_vec()),
            text("(d\n"),
        ]
    );
}

#[tokio::test]
async fn test_unencodable_line_is_dropped_alone() {
    let registry = PluginRegistry::new();
    registry
        .register_plugin(meta("smiley"), |ctx| {
            ctx.on_incoming(0, |line: String, _ctx: MessageContext| async move {
                let out = if line == "(smile" { "(\u{263a}".to_owned() } else { line };
                Ok::<_, tapline_plugin::HandlerError>(Some(out))
            });
            Ok(())
        })
        .unwrap();
    let mut h = Harness::new(registry);

    h.proxy
        .server_frame(Frame::Binary(b"]B100 Foo\n(smile\n(ok\n".to_vec()))
        .await
        .unwrap();
    assert_eq!(
        h.client_frames().await,
        vec![Frame::Binary(b"]B100 Foo\n(ok\n".to_vec())]
    );

    // A payload whose only line cannot be written produces no frame.
    h.proxy
        .server_frame(Frame::Binary(b"(smile\n".to_vec()))
        .await
        .unwrap();
    h.proxy
        .server_frame(Frame::Binary(b"(next\n".to_vec()))
        .await
        .unwrap();
    assert_eq!(
        h.client_frames().await,
        vec![Frame::Binary(b"(next\n".to_vec())]
    );
}

#[tokio::test]
async fn test_push_text_requires_whole_lines() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let queue = spawn_queue(Direction::Outgoing, Arc::new(PluginRegistry::new()), tx);

    let err = queue
        .push_text("(half".into(), Origin::new(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, ProxyError::UnterminatedText));

    queue
        .push_text("(one\n(two\n".into(), Origin::new(), false)
        .await
        .unwrap();
    queue.flush().await.unwrap();
    assert_eq!(drain(&mut rx), vec![text("(one\n(two\n")]);
}
