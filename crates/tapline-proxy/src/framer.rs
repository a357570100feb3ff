//! Turns an arbitrarily chunked stream into complete lines.

/// Buffers text until a newline completes a line.
///
/// ```
/// use tapline_proxy::LineFramer;
///
/// let mut framer = LineFramer::new();
/// assert!(framer.append("ab").is_empty());
/// assert_eq!(framer.append("c\nde\nf"), vec!["abc", "de"]);
/// assert_eq!(framer.pending(), "f");
/// ```
#[derive(Debug, Default, Clone)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, without their
    /// newlines. Text after the last newline stays buffered.
    pub fn append(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let Some(end) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(end + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete[..end].split('\n').map(str::to_owned).collect()
    }

    /// The unterminated tail.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Removes and returns the unterminated tail.
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_without_newline_wait() {
        let mut framer = LineFramer::new();
        assert!(framer.append("]B100").is_empty());
        assert!(framer.append(" Foo").is_empty());
        assert_eq!(framer.append("\n"), vec!["]B100 Foo"]);
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.append("\n\na\n"), vec!["", "", "a"]);
    }

    #[test]
    fn test_high_code_units_pass_through() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.append("@!\u{fe}\u{fe}\n\u{80}"), vec!["@!\u{fe}\u{fe}"]);
        assert_eq!(framer.take_pending(), "\u{80}");
        assert_eq!(framer.pending(), "");
    }

    mod laws {
        use super::super::LineFramer;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chunking_never_changes_the_stream(
                stream in "[ab\n\u{fe}]{0,64}",
                cuts in prop::collection::vec(0usize..=64, 0..8),
            ) {
                let chars: Vec<char> = stream.chars().collect();
                let mut cuts: Vec<usize> =
                    cuts.into_iter().map(|c| c.min(chars.len())).collect();
                cuts.sort_unstable();

                let mut framer = LineFramer::new();
                let mut rebuilt = String::new();
                let mut start = 0;
                for end in cuts.into_iter().chain([chars.len()]) {
                    let chunk: String = chars[start..end].iter().collect();
                    for line in framer.append(&chunk) {
                        prop_assert!(!line.contains('\n'));
                        rebuilt.push_str(&line);
                        rebuilt.push('\n');
                    }
                    start = end;
                }
                rebuilt.push_str(framer.pending());
                prop_assert_eq!(rebuilt, stream);
            }
        }
    }
}
