//! Chat lines sent by the server are HTML fragments. Four of them have a
//! fixed shape and are recognised by template; anything else is generic
//! chat.

use std::sync::LazyLock;

use regex::Regex;

use crate::ServerCommand;

static SELF_SPEECH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<span class="me">(?P<name>.*?)</span>: (?P<text>.*)$"#)
        .expect("self speech template")
});

static OTHER_SPEECH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<span class="pl">(?P<name>.*?)</span>: (?P<text>.*)$"#)
        .expect("other speech template")
});

static EMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<i>\* (?P<name>.*?) (?P<action>.*)</i>$"#)
        .expect("emote template")
});

static WHISPER_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^<span class="wh">(?P<name>.*?) whispers:</span> (?P<text>.*)$"#,
    )
    .expect("whisper template")
});

/// Classifies the body of a `(` line.
pub(crate) fn classify(text: String) -> ServerCommand {
    if let Some(c) = SELF_SPEECH.captures(&text) {
        return ServerCommand::SelfSpeech {
            name: c["name"].to_owned(),
            text: c["text"].to_owned(),
        };
    }
    if let Some(c) = OTHER_SPEECH.captures(&text) {
        return ServerCommand::OtherSpeech {
            name: c["name"].to_owned(),
            text: c["text"].to_owned(),
        };
    }
    if let Some(c) = EMOTE.captures(&text) {
        return ServerCommand::Emote {
            name: c["name"].to_owned(),
            action: c["action"].to_owned(),
        };
    }
    if let Some(c) = WHISPER_IN.captures(&text) {
        return ServerCommand::WhisperIn {
            name: c["name"].to_owned(),
            text: c["text"].to_owned(),
        };
    }
    ServerCommand::Chat { text }
}

pub(crate) fn self_speech(name: &str, text: &str) -> String {
    format!(r#"<span class="me">{name}</span>: {text}"#)
}

pub(crate) fn other_speech(name: &str, text: &str) -> String {
    format!(r#"<span class="pl">{name}</span>: {text}"#)
}

pub(crate) fn emote(name: &str, action: &str) -> String {
    format!("<i>* {name} {action}</i>")
}

pub(crate) fn whisper_in(name: &str, text: &str) -> String {
    format!(r#"<span class="wh">{name} whispers:</span> {text}"#)
}
