//! The [`WireCommand`] trait ties a command enum to its line format.
//!
//! Both directions implement it, so code that only needs "some command
//! that can round-trip through a line" (tests, logging taps) can stay
//! generic over the direction.

use crate::{ClientCommand, ServerCommand};

/// A closed command set with a total, byte-exact line codec.
///
/// Laws every implementation keeps:
/// - `decode(&cmd.encode()) == cmd` for every known command whose fields
///   fit their wire widths;
/// - `decode(line).encode() == line` for every line that does not decode
///   as unknown, except a line that ends before its fixed-width fields or
///   length-prefixed text are complete. Those decode best-effort and
///   re-encode padded. [`decode_complete`](Self::decode_complete) refuses
///   them, so the law is exact for everything it returns.
pub trait WireCommand: Sized {
    /// Decodes one line without its trailing newline.
    fn decode(line: &str) -> Self;

    /// Decodes one line, or `None` if it ended early.
    fn decode_complete(line: &str) -> Option<Self>;

    /// Encodes the command as one line without a trailing newline.
    fn encode(&self) -> String;

    /// Returns `true` if the line was not recognised.
    fn is_unknown(&self) -> bool;
}

impl WireCommand for ServerCommand {
    fn decode(line: &str) -> Self {
        ServerCommand::decode(line)
    }

    fn decode_complete(line: &str) -> Option<Self> {
        ServerCommand::decode_complete(line)
    }

    fn encode(&self) -> String {
        ServerCommand::encode(self)
    }

    fn is_unknown(&self) -> bool {
        ServerCommand::is_unknown(self)
    }
}

impl WireCommand for ClientCommand {
    fn decode(line: &str) -> Self {
        ClientCommand::decode(line)
    }

    fn decode_complete(line: &str) -> Option<Self> {
        ClientCommand::decode_complete(line)
    }

    fn encode(&self) -> String {
        ClientCommand::encode(self)
    }

    fn is_unknown(&self) -> bool {
        ClientCommand::is_unknown(self)
    }
}
