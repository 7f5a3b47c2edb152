use super::error::ConfError;
use indexmap::IndexMap;
use regex::Regex;

/// Key of the server extension preload list.
pub const SHARED_LIB_KEY: &str = "shared_preload_libraries";

/// Extension that must appear in the preload list.
pub const EXTENSION_NAME: &str = "timescaledb";

/// Capture groups every line pattern yields, not counting group 0:
/// comment prefix, key, value, trailing text.
pub const PATTERN_GROUPS: usize = 4;

const SHARED_LIB_REGEX: &str = r"^\s*(#+\s*)?(shared_preload_libraries) = '(.*?)'(.*)$";

/// Build the pattern for `key = value [# comment]` where the value is a single
/// whitespace-free token.
pub fn tunable_pattern(key: &str) -> Result<Regex, ConfError> {
    let pattern = format!(
        r"^\s*(#+\s*)?({}) = (\S+?)(\s*(?:#.*)?)$",
        regex::escape(key)
    );
    Ok(Regex::new(&pattern)?)
}

/// Like [`tunable_pattern`], but the value is a single-quoted string that may
/// contain anything. The captured value keeps its quotes.
pub fn quoted_tunable_pattern(key: &str) -> Result<Regex, ConfError> {
    let pattern = format!(
        r"^\s*(#+\s*)?({}) = ('.*?')(\s*(?:#.*)?)$",
        regex::escape(key)
    );
    Ok(Regex::new(&pattern)?)
}

/// Fixed pattern for the `shared_preload_libraries` line.
pub fn shared_lib_pattern() -> Result<Regex, ConfError> {
    Ok(Regex::new(SHARED_LIB_REGEX)?)
}

/// Compiled patterns for every setting a scan should recognize.
///
/// Built once and handed to [`ConfigFileState::from_reader`](super::ConfigFileState::from_reader);
/// iteration order is insertion order.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    tunables: IndexMap<String, Regex>,
    shared_lib: Regex,
}

impl PatternRegistry {
    /// Registry containing only the shared library pattern.
    pub fn new() -> Result<Self, ConfError> {
        Ok(Self {
            tunables: IndexMap::new(),
            shared_lib: shared_lib_pattern()?,
        })
    }

    /// Registry for `plain` keys plus `quoted` keys.
    pub fn from_keys<P, Q>(plain: P, quoted: Q) -> Result<Self, ConfError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        Q: IntoIterator,
        Q::Item: AsRef<str>,
    {
        let mut registry = Self::new()?;
        for key in plain {
            registry.insert(key.as_ref())?;
        }
        for key in quoted {
            registry.insert_quoted(key.as_ref())?;
        }
        Ok(registry)
    }

    /// Register a plain-valued key, replacing any previous pattern for it.
    pub fn insert(&mut self, key: &str) -> Result<(), ConfError> {
        self.tunables.insert(key.to_string(), tunable_pattern(key)?);
        Ok(())
    }

    /// Register a quoted-valued key, replacing any previous pattern for it.
    pub fn insert_quoted(&mut self, key: &str) -> Result<(), ConfError> {
        self.tunables
            .insert(key.to_string(), quoted_tunable_pattern(key)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Regex> {
        self.tunables.get(key)
    }

    pub fn tunables(&self) -> impl Iterator<Item = (&str, &Regex)> {
        self.tunables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn shared_lib(&self) -> &Regex {
        &self.shared_lib
    }

    pub fn len(&self) -> usize {
        self.tunables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tunables.is_empty()
    }
}
