/// A single line of the configuration file.
///
/// `remove` is a soft delete: the line stays in place (so stored indices keep
/// pointing at the right slot) and is skipped only when the file is written.
///
/// A line that is not valid UTF-8 is kept opaque: `raw` holds its exact bytes,
/// which are written back untouched, and `content` is a lossy rendering for
/// display only. Opaque lines are never matched against setting patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub content: String,
    pub remove: bool,
    pub raw: Option<Vec<u8>>,
}

impl Line {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            remove: false,
            raw: None,
        }
    }

    /// A line whose bytes are not valid UTF-8.
    pub fn opaque(raw: Vec<u8>) -> Self {
        Self {
            content: String::from_utf8_lossy(&raw).into_owned(),
            remove: false,
            raw: Some(raw),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.raw.is_some()
    }

    /// The bytes written for this line, without the trailing newline.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.raw {
            Some(raw) => raw,
            None => self.content.as_bytes(),
        }
    }

    /// Replace the text of this line; an opaque line becomes a normal one.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.raw = None;
    }
}

/// The most recent line matching a tunable setting's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunableParseResult {
    /// Position in the line collection, `None` when the setting is missing.
    pub index: Option<usize>,
    /// The match was preceded by one or more `#`.
    pub commented: bool,
    pub missing: bool,
    pub key: String,
    pub value: String,
    /// Trailing whitespace and comment, re-emitted verbatim on rewrite.
    pub extra: String,
}

impl TunableParseResult {
    /// Placeholder for a setting with no line in the file.
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            index: None,
            commented: false,
            missing: true,
            key: key.into(),
            value: String::new(),
            extra: String::new(),
        }
    }

    /// Render the line for this setting with `value`, uncommented.
    pub fn render(&self, value: &str) -> String {
        format!("{} = {}{}", self.key, value, self.extra)
    }
}

/// The `shared_preload_libraries` line, if the file has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLibResult {
    pub index: usize,
    pub commented: bool,
    pub has_timescale: bool,
    /// Exact `#`/whitespace run preceding the key, empty when uncommented.
    pub comment_group: String,
    /// Raw comma-separated library list between the quotes.
    pub libs: String,
    /// Everything after the closing quote.
    pub extra: String,
}
