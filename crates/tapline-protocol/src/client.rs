//! Commands the game client sends to the server.

use serde::{Deserialize, Serialize};

use crate::fields::{Decode, Writer, decode_line};
use crate::types::PackedId;

/// One client → server line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    // -- Session --
    Login { version: u16, name: String, password: String },
    Options { flags: u16 },
    Quit,
    Pong { stamp: u32 },

    // -- Movement --
    /// Step one tile. Directions are small decimal numbers.
    Move { direction: u8 },
    MoveTo { x: u8, y: u8 },
    Face { direction: u8 },
    Look { x: u8, y: u8 },

    // -- Talking --
    Say { text: String },
    Whisper { target: String, text: String },
    Emote { action: String },
    SlashCommand { command: String },

    // -- Items --
    UseItem { slot: u8 },
    DropItem { slot: u8, count: u16 },
    PickUp,
    Equip { slot: u8 },

    // -- Combat --
    Target { entity: u16 },
    Attack { entity: u16 },
    Cast { spell: u8, entity: u16 },

    // -- Trade --
    Buy { shop: u16, item: PackedId, count: u16 },
    Sell { slot: u8, count: u16 },
    CloseShop,
    Answer { prompt: u8, answer: String },
    TradeAccept { name: String },

    /// Any line this table does not recognise. Encodes back to `raw`.
    Unknown { raw: String },
}

/// Prefix table in match order (`mt` and `m ` share their first char).
static TABLE: &[(&str, Decode<ClientCommand>)] = &[
    ("]L", |r| {
        Ok(ClientCommand::Login {
            version: r.r95(2)?,
            name: r.lp()?,
            password: r.rest(),
        })
    }),
    ("]O", |r| Ok(ClientCommand::Options { flags: r.r95(2)? })),
    ("]Q", |_| Ok(ClientCommand::Quit)),
    ("mt", |r| {
        Ok(ClientCommand::MoveTo {
            x: r.r220(1)?,
            y: r.r220(1)?,
        })
    }),
    ("m ", |r| Ok(ClientCommand::Move { direction: r.decimal()? })),
    ("f", |r| Ok(ClientCommand::Face { direction: r.r95(1)? })),
    ("(", |r| Ok(ClientCommand::Say { text: r.rest() })),
    (")", |r| {
        Ok(ClientCommand::Whisper {
            target: r.lp()?,
            text: r.rest(),
        })
    }),
    ("*", |r| Ok(ClientCommand::Emote { action: r.rest() })),
    ("/", |r| Ok(ClientCommand::SlashCommand { command: r.rest() })),
    ("u", |r| Ok(ClientCommand::UseItem { slot: r.r95(1)? })),
    ("d", |r| {
        Ok(ClientCommand::DropItem {
            slot: r.r95(1)?,
            count: r.r95(2)?,
        })
    }),
    ("p", |_| Ok(ClientCommand::PickUp)),
    ("e", |r| Ok(ClientCommand::Equip { slot: r.r95(1)? })),
    ("t", |r| Ok(ClientCommand::Target { entity: r.r220(2)? })),
    ("a", |r| Ok(ClientCommand::Attack { entity: r.r220(2)? })),
    ("c", |r| {
        Ok(ClientCommand::Cast {
            spell: r.r95(1)?,
            entity: r.r220(2)?,
        })
    }),
    ("l", |r| {
        Ok(ClientCommand::Look {
            x: r.r220(1)?,
            y: r.r220(1)?,
        })
    }),
    ("b", |r| {
        Ok(ClientCommand::Buy {
            shop: r.r95(2)?,
            item: r.packed()?,
            count: r.r95(2)?,
        })
    }),
    ("s", |r| {
        Ok(ClientCommand::Sell {
            slot: r.r95(1)?,
            count: r.r95(2)?,
        })
    }),
    ("x", |_| Ok(ClientCommand::CloseShop)),
    ("?", |r| {
        Ok(ClientCommand::Answer {
            prompt: r.r95(1)?,
            answer: r.rest(),
        })
    }),
    ("[", |r| Ok(ClientCommand::TradeAccept { name: r.rest() })),
    (",", |r| Ok(ClientCommand::Pong { stamp: r.r95(3)? })),
];

impl ClientCommand {
    /// Decodes one line (without its newline). Never fails: a line with
    /// an unknown prefix or a malformed field becomes [`Self::Unknown`].
    ///
    /// A line that ends before its fixed-width fields are complete still
    /// decodes, with the missing digits read as zero and missing text as
    /// empty. Such a line does not re-encode to itself; use
    /// [`decode_complete`](Self::decode_complete) to tell it apart.
    pub fn decode(line: &str) -> Self {
        decode_line(line, TABLE, |raw| ClientCommand::Unknown { raw }).0
    }

    /// Decodes one line, or returns `None` if it matched a prefix but ended
    /// early. Every command this returns encodes back to `line` exactly.
    pub fn decode_complete(line: &str) -> Option<Self> {
        let (cmd, truncated) = decode_line(line, TABLE, |raw| ClientCommand::Unknown { raw });
        (!truncated).then_some(cmd)
    }

    /// Encodes this command as one line (without its newline).
    pub fn encode(&self) -> String {
        use ClientCommand::*;
        match self {
            Login {
                version,
                name,
                password,
            } => Writer::new("]L")
                .r95(*version, 2)
                .lp(name)
                .text(password)
                .finish(),
            Options { flags } => Writer::new("]O").r95(*flags, 2).finish(),
            Quit => "]Q".to_owned(),
            Pong { stamp } => Writer::new(",").r95(*stamp, 3).finish(),
            Move { direction } => Writer::new("m ").decimal(*direction).finish(),
            MoveTo { x, y } => {
                Writer::new("mt").r220(*x, 1).r220(*y, 1).finish()
            }
            Face { direction } => Writer::new("f").r95(*direction, 1).finish(),
            Look { x, y } => Writer::new("l").r220(*x, 1).r220(*y, 1).finish(),
            Say { text } => Writer::new("(").text(text).finish(),
            Whisper { target, text } => {
                Writer::new(")").lp(target).text(text).finish()
            }
            Emote { action } => Writer::new("*").text(action).finish(),
            SlashCommand { command } => Writer::new("/").text(command).finish(),
            UseItem { slot } => Writer::new("u").r95(*slot, 1).finish(),
            DropItem { slot, count } => {
                Writer::new("d").r95(*slot, 1).r95(*count, 2).finish()
            }
            PickUp => "p".to_owned(),
            Equip { slot } => Writer::new("e").r95(*slot, 1).finish(),
            Target { entity } => Writer::new("t").r220(*entity, 2).finish(),
            Attack { entity } => Writer::new("a").r220(*entity, 2).finish(),
            Cast { spell, entity } => {
                Writer::new("c").r95(*spell, 1).r220(*entity, 2).finish()
            }
            Buy { shop, item, count } => Writer::new("b")
                .r95(*shop, 2)
                .packed(*item)
                .r95(*count, 2)
                .finish(),
            Sell { slot, count } => {
                Writer::new("s").r95(*slot, 1).r95(*count, 2).finish()
            }
            CloseShop => "x".to_owned(),
            Answer { prompt, answer } => {
                Writer::new("?").r95(*prompt, 1).text(answer).finish()
            }
            TradeAccept { name } => Writer::new("[").text(name).finish(),
            Unknown { raw } => raw.clone(),
        }
    }

    /// Returns `true` for [`Self::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, ClientCommand::Unknown { .. })
    }
}
