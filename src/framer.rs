//! Incremental JSON object framer for the firehose byte stream
//!
//! The feed delivers concatenated JSON objects split at arbitrary byte
//! offsets. `MessageFramer` buffers the bytes and cuts out each object as
//! soon as its braces balance.
//!
//! # Framing modes
//!
//! - `BraceCount` (default): every `{` and `}` byte is counted, including
//!   those inside string values. A tweet whose text contains an unbalanced
//!   brace corrupts framing of that object; the decoder then drops the
//!   garbage block and framing resynchronises on the next `{`.
//! - `StringAware`: braces inside JSON string literals (with `\` escapes)
//!   are ignored. Opt-in only, because it diverges from `BraceCount` on
//!   exactly those inputs.
//!
//! Scan state (depth, string state, cursor) is kept across `append` calls so
//! a large object arriving in many chunks is scanned once.

/// Strategy used to find the end of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    #[default]
    BraceCount,
    StringAware,
}

impl FramingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FramingMode::BraceCount => "brace",
            FramingMode::StringAware => "string-aware",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "brace" | "brace-count" => Some(FramingMode::BraceCount),
            "string-aware" | "string_aware" | "strict" => Some(FramingMode::StringAware),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct MessageFramer {
    mode: FramingMode,
    /// Unconsumed bytes. When `in_object` is set, `buffer[0]` is the opening `{`.
    buffer: Vec<u8>,
    /// Objects cut out but not yet drained
    complete: Vec<Vec<u8>>,
    in_object: bool,
    /// Next byte to scan
    cursor: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl MessageFramer {
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            buffer: Vec::with_capacity(8 * 1024),
            complete: Vec::new(),
            in_object: false,
            cursor: 0,
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Buffer `chunk` and cut out every object it completes.
    pub fn append(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        self.extract();
    }

    /// Take every complete object found so far, oldest first.
    pub fn drain_complete(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.complete)
    }

    /// Bytes held back waiting for the rest of an object
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Forget the partial object, e.g. after the upstream connection dropped.
    /// Already-complete objects stay available to `drain_complete`.
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            log::debug!("Discarding {} buffered bytes on framer reset", self.buffer.len());
        }
        self.buffer.clear();
        self.restart_scan();
    }

    fn restart_scan(&mut self) {
        self.in_object = false;
        self.cursor = 0;
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }

    /// Cut every complete object out of the buffer, then compact once.
    fn extract(&mut self) {
        // Everything before this index has been framed or discarded
        let mut consumed = 0;

        loop {
            if !self.in_object {
                match self.buffer[consumed..].iter().position(|&b| b == b'{') {
                    Some(offset) => {
                        // Bytes ahead of the object (keep-alive newlines) are never part of a frame
                        consumed += offset;
                        self.in_object = true;
                        self.cursor = consumed + 1;
                        self.depth = 1;
                        self.in_string = false;
                        self.escaped = false;
                    }
                    None => {
                        consumed = self.buffer.len();
                        break;
                    }
                }
            }

            match self.scan() {
                Some(end) => {
                    self.complete.push(self.buffer[consumed..=end].to_vec());
                    consumed = end + 1;
                    self.restart_scan();
                }
                None => {
                    self.cursor = self.buffer.len();
                    break;
                }
            }
        }

        self.buffer.drain(..consumed);
        if self.in_object {
            self.cursor -= consumed;
        }
    }

    /// Advance from `cursor`; returns the index of the closing brace once depth hits zero.
    fn scan(&mut self) -> Option<usize> {
        let string_aware = self.mode == FramingMode::StringAware;

        for i in self.cursor..self.buffer.len() {
            let byte = self.buffer[i];

            if string_aware {
                if self.in_string {
                    if self.escaped {
                        self.escaped = false;
                    } else if byte == b'\\' {
                        self.escaped = true;
                    } else if byte == b'"' {
                        self.in_string = false;
                    }
                    continue;
                }
                if byte == b'"' {
                    self.in_string = true;
                    continue;
                }
            }

            match byte {
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }

        None
    }
}

impl Default for MessageFramer {
    fn default() -> Self {
        Self::new(FramingMode::default())
    }
}
