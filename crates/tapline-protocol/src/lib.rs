//! Wire protocol for Tapline.
//!
//! This crate defines the "language" the game client and the game server
//! speak, and how each line of it maps to a typed command:
//!
//! - **Numerals** ([`radix`]): the radix-95 and radix-220 encodings used
//!   for compact integer fields.
//! - **Text** ([`text`]): the one-byte-per-char bridge between binary
//!   payloads and protocol text.
//! - **Commands** ([`ServerCommand`], [`ClientCommand`]): one closed enum
//!   per direction, each with a total `decode` and an exact `encode`.
//! - **Errors** ([`ProtocolError`]): what the field parsers and the text
//!   bridge report.
//!
//! # Architecture
//!
//! The protocol layer is pure. It never touches sockets and never logs;
//! the proxy layer feeds it one complete line at a time.
//!
//! ```text
//! Transport (frames) → Framer (lines) → Protocol (commands) → Plugins
//! ```
//!
//! # Example
//!
//! ```rust
//! use tapline_protocol::ServerCommand;
//!
//! let cmd = ServerCommand::decode("]B12345 TestUser");
//! assert_eq!(cmd.login(), Some(("TestUser", 12345)));
//! assert_eq!(cmd.encode(), "]B12345 TestUser");
//! ```

mod chat;
mod client;
mod codec;
mod error;
mod fields;
pub mod radix;
mod server;
pub mod text;
mod types;

pub use client::ClientCommand;
pub use codec::WireCommand;
pub use error::ProtocolError;
pub use server::ServerCommand;
pub use types::{InventoryItem, PackedId, Tile};
