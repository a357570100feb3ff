use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use tapline::ConfigError;
use tapline::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoConfig {
    #[serde(flatten)]
    proxy: ProxyConfig,
    /// Players whose speech and whispers never reach the client.
    muted: Vec<String>,
    /// How many chat lines the history service keeps.
    history: Option<usize>,
}

impl DemoConfig {
    fn load(path: &str) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&source)?;
        config.proxy.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

struct MuteList(Mutex<HashSet<String>>);

impl MuteList {
    fn contains(&self, name: &str) -> bool {
        self.0.lock().contains(name)
    }

    fn set(&self, name: &str, muted: bool) {
        let mut names = self.0.lock();
        if muted {
            names.insert(name.to_string());
        } else {
            names.remove(name);
        }
    }
}

struct ChatHistory {
    lines: Mutex<VecDeque<String>>,
    cap: usize,
}

impl ChatHistory {
    fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() == self.cap {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// Renders the chat-shaped server commands as one log line.
fn describe(cmd: &ServerCommand) -> Option<String> {
    Some(match cmd {
        ServerCommand::SelfSpeech { name, text } | ServerCommand::OtherSpeech { name, text } => {
            format!("{name}: {text}")
        }
        ServerCommand::WhisperIn { name, text } => format!("{name} whispers: {text}"),
        ServerCommand::Emote { name, action } => format!("* {name} {action}"),
        ServerCommand::Chat { text } => text.clone(),
        ServerCommand::Notice { text } => format!("[notice] {text}"),
        _ => return None,
    })
}

/// Logs every chat line that reaches the client and keeps the most recent
/// ones in a `chat-history` service.
fn chat_log(registry: &PluginRegistry, cap: usize) -> Result<(), PluginError> {
    let meta = PluginMetadata::new("chat-log", "Chat log", env!("CARGO_PKG_VERSION"))
        .with_description("Logs chat lines that reach the client");
    registry.register_plugin(meta, move |ctx| {
        let history = Arc::new(ChatHistory {
            lines: Mutex::new(VecDeque::new()),
            cap: cap.max(1),
        });
        ctx.provide_service("chat-history", "1", Arc::clone(&history));
        ctx.observe_incoming(move |line, _| {
            if let Some(entry) = describe(&ServerCommand::decode(line)) {
                tracing::info!(target: "chat", "{entry}");
                history.push(entry);
            }
        });
        ctx.on(|event| match event {
            LifecycleEvent::Login { name, uid } => tracing::info!(name, uid, "logged in"),
            LifecycleEvent::Disconnect => tracing::info!("session closed"),
            _ => {}
        });
        Ok(())
    })
}

/// Drops speech and whispers from muted players. Runs before everything
/// else so that no other plugin sees them.
fn mute(registry: &PluginRegistry, initial: &[String]) -> Result<(), PluginError> {
    let list = Arc::new(MuteList(Mutex::new(initial.iter().cloned().collect())));
    let meta = PluginMetadata::new("mute", "Mute", env!("CARGO_PKG_VERSION"));
    registry.register_plugin(meta, move |ctx| {
        ctx.provide_service("mute-list", "1", Arc::clone(&list));
        ctx.on_incoming(100, move |line: String, _ctx: MessageContext| {
            let list = Arc::clone(&list);
            async move {
                let muted = match ServerCommand::decode(&line) {
                    ServerCommand::OtherSpeech { name, .. }
                    | ServerCommand::WhisperIn { name, .. } => list.contains(&name),
                    _ => false,
                };
                Ok::<_, HandlerError>((!muted).then_some(line))
            }
        });
        Ok(())
    })
}

/// Handles `/mute NAME` and `/unmute NAME` locally instead of sending them
/// to the server.
fn mute_commands(registry: &PluginRegistry) -> Result<(), PluginError> {
    let meta = PluginMetadata::new("mute-commands", "Mute commands", env!("CARGO_PKG_VERSION"));
    registry.register_plugin(meta, |ctx| {
        let list = ctx
            .services()
            .get::<MuteList>("mute-list")
            .ok_or("the mute plugin is not loaded")?;
        ctx.on_outgoing(100, move |line: String, _ctx: MessageContext| {
            let list = Arc::clone(&list);
            async move {
                let ClientCommand::SlashCommand { command } = ClientCommand::decode(&line) else {
                    return Ok::<_, HandlerError>(Some(line));
                };
                let (verb, name) = command.split_once(' ').unwrap_or((command.as_str(), ""));
                match verb {
                    "mute" | "unmute" if !name.is_empty() => {
                        list.set(name.trim(), verb == "mute");
                        tracing::info!(verb, name, "mute list updated");
                        Ok(None)
                    }
                    _ => Ok(Some(line)),
                }
            }
        });
        Ok(())
    })
}

fn install(registry: &PluginRegistry, config: &DemoConfig) -> Result<(), PluginError> {
    chat_log(registry, config.history.unwrap_or(200))?;
    mute(registry, &config.muted)?;
    mute_commands(registry)
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load(&path)?,
        None => DemoConfig::default(),
    };
    init_tracing(&config.proxy.log_filter);

    let registry = Arc::new(PluginRegistry::new());
    install(&registry, &config)?;

    let server = TaplineServerBuilder::from_config(&config.proxy)
        .registry(registry)
        .build()
        .await?;
    tracing::info!(
        addr = %server.local_addr()?,
        upstream = %config.proxy.upstream,
        "chat-log proxy listening"
    );

    server.run().await?;
    Ok(())
}
