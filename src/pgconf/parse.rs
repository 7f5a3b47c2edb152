use super::error::ConfError;
use super::line::{SharedLibResult, TunableParseResult};
use super::patterns::{EXTENSION_NAME, PATTERN_GROUPS};
use regex::{Captures, Regex};

/// Match `line` against a tunable pattern.
///
/// Returns `Ok(None)` when the line does not match. The result's `index` is
/// left unset for the caller to assign.
pub fn parse_tunable_line(
    line: &str,
    pattern: &Regex,
) -> Result<Option<TunableParseResult>, ConfError> {
    let Some(caps) = pattern.captures(line) else {
        return Ok(None);
    };
    check_groups(pattern, &caps)?;

    Ok(Some(TunableParseResult {
        index: None,
        commented: !group(&caps, 1).is_empty(),
        missing: false,
        key: group(&caps, 2).to_string(),
        value: group(&caps, 3).to_string(),
        extra: group(&caps, 4).to_string(),
    }))
}

/// Match `line` against the shared library pattern.
///
/// The returned index is 0; the caller assigns the real position.
pub fn parse_shared_lib_line(
    line: &str,
    pattern: &Regex,
) -> Result<Option<SharedLibResult>, ConfError> {
    let Some(caps) = pattern.captures(line) else {
        return Ok(None);
    };
    check_groups(pattern, &caps)?;

    let comment_group = group(&caps, 1);
    let libs = group(&caps, 3);
    Ok(Some(SharedLibResult {
        index: 0,
        commented: !comment_group.is_empty(),
        has_timescale: libs.contains(EXTENSION_NAME),
        comment_group: comment_group.to_string(),
        libs: libs.to_string(),
        extra: group(&caps, 4).to_string(),
    }))
}

fn check_groups(pattern: &Regex, caps: &Captures<'_>) -> Result<(), ConfError> {
    let groups = caps.len() - 1;
    if groups != PATTERN_GROUPS {
        return Err(ConfError::PatternGroups {
            pattern: pattern.as_str().to_string(),
            groups,
        });
    }
    Ok(())
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}
