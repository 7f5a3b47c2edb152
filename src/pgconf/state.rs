use super::error::ConfError;
use super::line::{Line, SharedLibResult, TunableParseResult};
use super::parse::{parse_shared_lib_line, parse_tunable_line};
use super::patterns::PatternRegistry;
use super::processors::{LineProcessor, process_lines};
use indexmap::IndexMap;
use std::io::BufRead;

/// In-memory view of a Postgres configuration file.
///
/// Holds every input line in order plus what the scan found: the
/// `shared_preload_libraries` line and the last match for each registered key.
/// Keys absent from `tunables` were not found in the file.
///
/// Indices stored in the parse results stay valid as long as lines are only
/// appended; inserting before an existing line is not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFileState {
    pub lines: Vec<Line>,
    pub shared_lib: Option<SharedLibResult>,
    pub tunables: IndexMap<String, TunableParseResult>,
}

impl ConfigFileState {
    /// Scan `reader` line by line.
    ///
    /// A line matching the shared library pattern is recorded as such and not
    /// tested against the tunable patterns. Otherwise every registered key is
    /// tried; a later match for the same key overwrites the earlier one.
    ///
    /// Lines are split on `\n` only, so any `\r` stays part of the line. A line
    /// that is not valid UTF-8 is kept as an opaque [`Line`] and not scanned.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        registry: &PatternRegistry,
    ) -> Result<Self, ConfError> {
        let mut state = Self::default();
        let mut buf = Vec::new();

        loop {
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }

            let index = state.lines.len();
            let line = match String::from_utf8(std::mem::take(&mut buf)) {
                Ok(content) => {
                    state.scan_line(index, &content, registry)?;
                    Line::new(content)
                }
                Err(err) => Line::opaque(err.into_bytes()),
            };
            state.lines.push(line);
        }

        Ok(state)
    }

    fn scan_line(
        &mut self,
        index: usize,
        content: &str,
        registry: &PatternRegistry,
    ) -> Result<(), ConfError> {
        if let Some(mut shared) = parse_shared_lib_line(content, registry.shared_lib())? {
            shared.index = index;
            self.shared_lib = Some(shared);
            return Ok(());
        }

        for (key, pattern) in registry.tunables() {
            if let Some(mut result) = parse_tunable_line(content, pattern)? {
                result.index = Some(index);
                self.tunables.insert(key.to_string(), result);
            }
        }
        Ok(())
    }

    /// Scan an in-memory string.
    pub fn parse(text: &str, registry: &PatternRegistry) -> Result<Self, ConfError> {
        Self::from_reader(text.as_bytes(), registry)
    }

    /// Append a line at the end and return its index.
    pub fn append_line(&mut self, content: impl Into<String>) -> usize {
        self.lines.push(Line::new(content));
        self.lines.len() - 1
    }

    /// Replace the content of the line at `index`.
    pub fn replace_line(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), ConfError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(ConfError::LineOutOfRange { index, len })?;
        line.set_content(content);
        Ok(())
    }

    /// Write `key = value` for a tunable setting.
    ///
    /// An existing line (commented or not) is rewritten in place, keeping its
    /// trailing comment; a missing setting is appended. The parse result is
    /// updated to match. Returns the line index.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<usize, ConfError> {
        let existing = self
            .tunables
            .get(key)
            .filter(|r| !r.missing)
            .and_then(|r| r.index.map(|index| (index, r.render(value))));

        let index = match existing {
            Some((index, content)) => {
                self.replace_line(index, content)?;
                index
            }
            None => self.append_line(format!("{} = {}", key, value)),
        };

        let result = self
            .tunables
            .entry(key.to_string())
            .or_insert_with(|| TunableParseResult::missing(key));
        result.index = Some(index);
        result.commented = false;
        result.missing = false;
        result.value = value.to_string();

        Ok(index)
    }

    /// Run `processors` over every line, see [`process_lines`].
    pub fn process_lines(
        &mut self,
        processors: &mut [&mut dyn LineProcessor],
    ) -> Result<(), ConfError> {
        process_lines(&mut self.lines, processors)
    }

    /// Lines that will be written, in order.
    pub fn retained_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|line| !line.remove)
    }
}
