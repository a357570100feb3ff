//! Commands the game server sends to the client.

use serde::{Deserialize, Serialize};

use crate::chat;
use crate::fields::{Decode, Writer, decode_line};
use crate::types::{InventoryItem, PackedId, Tile};

/// One server → client line.
///
/// `#[serde(tag = "type")]` gives the shape plugins and logs see:
/// `{"type":"set-user-info","uid":12345,"name":"TestUser"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerCommand {
    // -- Account --
    /// The logged-in user's id and name. Seeing this means login finished.
    SetUserInfo { uid: u64, name: String },
    SetEnergy { energy: u16 },
    SetGold { gold: u32 },
    SetLevel { level: u8, experience: u32 },
    MapChange { map_id: u16, width: u8, height: u8, name: String },
    Permissions { flags: u16 },
    ServerTime { ticks: u64 },
    SessionToken { token: String },

    // -- Entities --
    EntityAdd { entity: u16, x: u8, y: u8, sprite: PackedId, name: String },
    EntityRemove { entity: u16 },
    EntityMove { entity: u16, x: u8, y: u8, facing: u8 },
    Effect { entity: u16, effect: u16 },
    EntitySpeech { entity: u16, text: String },

    // -- Map --
    TileUpdate { x: u8, y: u8, tile: PackedId },
    MapTiles { tiles: Vec<Tile> },

    // -- Items and stats --
    Inventory { items: Vec<InventoryItem> },
    ItemAdd { slot: u8, item: PackedId, count: u16 },
    ItemRemove { slot: u8 },
    Stats { hp: u16, max_hp: u16, mp: u16, max_mp: u16 },

    // -- Social --
    PlayerList { names: Vec<String> },
    BuddyOnline { name: String, status: String },
    BuddyOffline { name: String },
    TradeRequest { name: String },

    // -- Ambience --
    Sound { sound: u16 },
    Music { track: String },
    Weather { kind: u8, intensity: u8 },

    // -- Interaction --
    ShopOpen { shop: u16, title: String },
    ShopClose,
    Prompt { prompt: u8, question: String, default: String },
    Ping { stamp: u32 },
    Kick { reason: String },
    Notice { text: String },

    // -- Chat --
    /// Chat that matched none of the fixed templates.
    Chat { text: String },
    SelfSpeech { name: String, text: String },
    OtherSpeech { name: String, text: String },
    Emote { name: String, action: String },
    WhisperIn { name: String, text: String },

    /// Any line this table does not recognise. Encodes back to `raw`.
    Unknown { raw: String },
}


const TILE_WIDTH: usize = 4;
const ITEM_WIDTH: usize = 5;

/// Prefix table in match order. A prefix that extends another one must
/// come before it (`@!` and `@"` before `@`). Characters a decoder leaves
/// behind, such as a partial record, make the line unknown.
static TABLE: &[(&str, Decode<ServerCommand>)] = &[
    ("]B", |r| {
        let uid = r.decimal_until(' ')?;
        Ok(ServerCommand::SetUserInfo { uid, name: r.rest() })
    }),
    ("]E", |r| Ok(ServerCommand::SetEnergy { energy: r.r95(2)? })),
    ("]G", |r| Ok(ServerCommand::SetGold { gold: r.r95(4)? })),
    ("]L", |r| {
        Ok(ServerCommand::SetLevel {
            level: r.r95(1)?,
            experience: r.r95(4)?,
        })
    }),
    ("]M", |r| {
        Ok(ServerCommand::MapChange {
            map_id: r.r95(2)?,
            width: r.r95(1)?,
            height: r.r95(1)?,
            name: r.rest(),
        })
    }),
    ("]P", |r| Ok(ServerCommand::Permissions { flags: r.r95(2)? })),
    ("]T", |r| Ok(ServerCommand::ServerTime { ticks: r.r95(5)? })),
    ("]Z", |r| Ok(ServerCommand::SessionToken { token: r.rest() })),
    ("@!", |r| {
        Ok(ServerCommand::EntityAdd {
            entity: r.r220(2)?,
            x: r.r220(1)?,
            y: r.r220(1)?,
            sprite: r.packed()?,
            name: r.rest(),
        })
    }),
    ("@\"", |r| Ok(ServerCommand::EntityRemove { entity: r.r220(2)? })),
    ("@", |r| {
        Ok(ServerCommand::EntityMove {
            entity: r.r220(2)?,
            x: r.r220(1)?,
            y: r.r220(1)?,
            facing: r.r95(1)?,
        })
    }),
    (":", |r| {
        Ok(ServerCommand::Effect {
            entity: r.r220(2)?,
            effect: r.r95(2)?,
        })
    }),
    (";", |r| {
        Ok(ServerCommand::EntitySpeech {
            entity: r.r220(2)?,
            text: r.rest(),
        })
    }),
    ("$", |r| {
        Ok(ServerCommand::TileUpdate {
            x: r.r220(1)?,
            y: r.r220(1)?,
            tile: r.packed()?,
        })
    }),
    ("&", |r| {
        let mut tiles = Vec::new();
        while r.remaining() >= TILE_WIDTH {
            tiles.push(Tile {
                x: r.r220(1)?,
                y: r.r220(1)?,
                tile: r.packed()?,
            });
        }
        Ok(ServerCommand::MapTiles { tiles })
    }),
    ("*", |r| {
        let mut items = Vec::new();
        while r.remaining() >= ITEM_WIDTH {
            items.push(InventoryItem {
                slot: r.r95(1)?,
                item: r.packed()?,
                count: r.r95(2)?,
            });
        }
        Ok(ServerCommand::Inventory { items })
    }),
    ("+", |r| {
        Ok(ServerCommand::ItemAdd {
            slot: r.r95(1)?,
            item: r.packed()?,
            count: r.r95(2)?,
        })
    }),
    ("-", |r| Ok(ServerCommand::ItemRemove { slot: r.r95(1)? })),
    ("=", |r| {
        Ok(ServerCommand::Stats {
            hp: r.r95(2)?,
            max_hp: r.r95(2)?,
            mp: r.r95(2)?,
            max_mp: r.r95(2)?,
        })
    }),
    ("/", |r| {
        let mut names = Vec::new();
        while !r.is_empty() {
            names.push(r.lp()?);
        }
        Ok(ServerCommand::PlayerList { names })
    }),
    ("<", |r| {
        Ok(ServerCommand::BuddyOnline {
            name: r.lp()?,
            status: r.rest(),
        })
    }),
    (">", |r| Ok(ServerCommand::BuddyOffline { name: r.rest() })),
    ("^", |r| Ok(ServerCommand::Sound { sound: r.r95(2)? })),
    ("~", |r| Ok(ServerCommand::Music { track: r.rest() })),
    ("'", |r| {
        Ok(ServerCommand::Weather {
            kind: r.r95(1)?,
            intensity: r.r95(1)?,
        })
    }),
    ("{", |r| {
        Ok(ServerCommand::ShopOpen {
            shop: r.r95(2)?,
            title: r.rest(),
        })
    }),
    ("}", |_| Ok(ServerCommand::ShopClose)),
    (",", |r| Ok(ServerCommand::Ping { stamp: r.r95(3)? })),
    (".", |r| Ok(ServerCommand::Kick { reason: r.rest() })),
    ("?", |r| {
        Ok(ServerCommand::Prompt {
            prompt: r.r95(1)?,
            question: r.lp()?,
            default: r.rest(),
        })
    }),
    ("[", |r| Ok(ServerCommand::TradeRequest { name: r.rest() })),
    ("!", |r| Ok(ServerCommand::Notice { text: r.rest() })),
    ("(", |r| Ok(chat::classify(r.rest()))),
];

impl ServerCommand {
    /// Decodes one line (without its newline). Never fails: a line with
    /// an unknown prefix or a malformed field becomes [`Self::Unknown`].
    ///
    /// A line that ends before its fixed-width fields are complete still
    /// decodes, with the missing digits read as zero and missing text as
    /// empty. Such a line does not re-encode to itself; use
    /// [`decode_complete`](Self::decode_complete) to tell it apart.
    pub fn decode(line: &str) -> Self {
        decode_line(line, TABLE, |raw| ServerCommand::Unknown { raw }).0
    }

    /// Decodes one line, or returns `None` if it matched a prefix but ended
    /// early. Every command this returns encodes back to `line` exactly.
    pub fn decode_complete(line: &str) -> Option<Self> {
        let (cmd, truncated) = decode_line(line, TABLE, |raw| ServerCommand::Unknown { raw });
        (!truncated).then_some(cmd)
    }

    /// Encodes this command as one line (without its newline).
    pub fn encode(&self) -> String {
        use ServerCommand::*;
        match self {
            SetUserInfo { uid, name } => Writer::new("]B")
                .decimal(*uid)
                .text(" ")
                .text(name)
                .finish(),
            SetEnergy { energy } => Writer::new("]E").r95(*energy, 2).finish(),
            SetGold { gold } => Writer::new("]G").r95(*gold, 4).finish(),
            SetLevel { level, experience } => Writer::new("]L")
                .r95(*level, 1)
                .r95(*experience, 4)
                .finish(),
            MapChange {
                map_id,
                width,
                height,
                name,
            } => Writer::new("]M")
                .r95(*map_id, 2)
                .r95(*width, 1)
                .r95(*height, 1)
                .text(name)
                .finish(),
            Permissions { flags } => Writer::new("]P").r95(*flags, 2).finish(),
            ServerTime { ticks } => Writer::new("]T").r95(*ticks, 5).finish(),
            SessionToken { token } => Writer::new("]Z").text(token).finish(),
            EntityAdd {
                entity,
                x,
                y,
                sprite,
                name,
            } => Writer::new("@!")
                .r220(*entity, 2)
                .r220(*x, 1)
                .r220(*y, 1)
                .packed(*sprite)
                .text(name)
                .finish(),
            EntityRemove { entity } => {
                Writer::new("@\"").r220(*entity, 2).finish()
            }
            EntityMove {
                entity,
                x,
                y,
                facing,
            } => Writer::new("@")
                .r220(*entity, 2)
                .r220(*x, 1)
                .r220(*y, 1)
                .r95(*facing, 1)
                .finish(),
            Effect { entity, effect } => Writer::new(":")
                .r220(*entity, 2)
                .r95(*effect, 2)
                .finish(),
            EntitySpeech { entity, text } => {
                Writer::new(";").r220(*entity, 2).text(text).finish()
            }
            TileUpdate { x, y, tile } => Writer::new("$")
                .r220(*x, 1)
                .r220(*y, 1)
                .packed(*tile)
                .finish(),
            MapTiles { tiles } => tiles
                .iter()
                .fold(Writer::new("&"), |w, t| {
                    w.r220(t.x, 1).r220(t.y, 1).packed(t.tile)
                })
                .finish(),
            Inventory { items } => items
                .iter()
                .fold(Writer::new("*"), |w, i| {
                    w.r95(i.slot, 1).packed(i.item).r95(i.count, 2)
                })
                .finish(),
            ItemAdd { slot, item, count } => Writer::new("+")
                .r95(*slot, 1)
                .packed(*item)
                .r95(*count, 2)
                .finish(),
            ItemRemove { slot } => Writer::new("-").r95(*slot, 1).finish(),
            Stats {
                hp,
                max_hp,
                mp,
                max_mp,
            } => Writer::new("=")
                .r95(*hp, 2)
                .r95(*max_hp, 2)
                .r95(*mp, 2)
                .r95(*max_mp, 2)
                .finish(),
            PlayerList { names } => names
                .iter()
                .fold(Writer::new("/"), |w, name| w.lp(name))
                .finish(),
            BuddyOnline { name, status } => {
                Writer::new("<").lp(name).text(status).finish()
            }
            BuddyOffline { name } => Writer::new(">").text(name).finish(),
            TradeRequest { name } => Writer::new("[").text(name).finish(),
            Sound { sound } => Writer::new("^").r95(*sound, 2).finish(),
            Music { track } => Writer::new("~").text(track).finish(),
            Weather { kind, intensity } => Writer::new("'")
                .r95(*kind, 1)
                .r95(*intensity, 1)
                .finish(),
            ShopOpen { shop, title } => {
                Writer::new("{").r95(*shop, 2).text(title).finish()
            }
            ShopClose => "}".to_owned(),
            Prompt {
                prompt,
                question,
                default,
            } => Writer::new("?")
                .r95(*prompt, 1)
                .lp(question)
                .text(default)
                .finish(),
            Ping { stamp } => Writer::new(",").r95(*stamp, 3).finish(),
            Kick { reason } => Writer::new(".").text(reason).finish(),
            Notice { text } => Writer::new("!").text(text).finish(),
            Chat { text } => Writer::new("(").text(text).finish(),
            SelfSpeech { name, text } => {
                Writer::new("(").text(&chat::self_speech(name, text)).finish()
            }
            OtherSpeech { name, text } => Writer::new("(")
                .text(&chat::other_speech(name, text))
                .finish(),
            Emote { name, action } => {
                Writer::new("(").text(&chat::emote(name, action)).finish()
            }
            WhisperIn { name, text } => {
                Writer::new("(").text(&chat::whisper_in(name, text)).finish()
            }
            Unknown { raw } => raw.clone(),
        }
    }

    /// Returns `(name, uid)` when this command completes a login.
    pub fn login(&self) -> Option<(&str, u64)> {
        match self {
            ServerCommand::SetUserInfo { uid, name } => Some((name, *uid)),
            _ => None,
        }
    }

    /// Returns `true` for [`Self::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, ServerCommand::Unknown { .. })
    }
}
