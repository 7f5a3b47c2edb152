use super::error::ConfError;
use super::line::Line;
use super::parse::parse_tunable_line;
use super::patterns::quoted_tunable_pattern;
use regex::Regex;

/// A stateful pass over the configuration lines.
///
/// Called once per line in order with the full slice, so a processor may flag
/// a line it saw earlier.
pub trait LineProcessor {
    fn process(&mut self, lines: &mut [Line], index: usize) -> Result<(), ConfError>;
}

/// Apply every processor to every line: for each line in order, each processor
/// in order. Stops at the first error.
pub fn process_lines(
    lines: &mut [Line],
    processors: &mut [&mut dyn LineProcessor],
) -> Result<(), ConfError> {
    for index in 0..lines.len() {
        for processor in processors.iter_mut() {
            processor.process(lines, index)?;
        }
    }
    Ok(())
}

/// Keeps only the last line setting a given key; earlier ones are flagged for
/// removal.
///
/// A pass starts whenever line 0 is processed, so one instance can be reused
/// for repeated passes.
#[derive(Debug, Clone)]
pub struct DuplicateRemover {
    pattern: Regex,
    last_match: Option<usize>,
}

impl DuplicateRemover {
    /// Remover for a quoted-valued key.
    pub fn new(key: &str) -> Result<Self, ConfError> {
        Ok(Self::with_pattern(quoted_tunable_pattern(key)?))
    }

    pub fn with_pattern(pattern: Regex) -> Self {
        Self {
            pattern,
            last_match: None,
        }
    }
}

impl LineProcessor for DuplicateRemover {
    fn process(&mut self, lines: &mut [Line], index: usize) -> Result<(), ConfError> {
        if index == 0 {
            self.last_match = None;
        }
        let Some(line) = lines.get(index).filter(|l| !l.is_opaque()) else {
            return Ok(());
        };
        if parse_tunable_line(&line.content, &self.pattern)?.is_none() {
            return Ok(());
        }

        if let Some(previous) = self.last_match.replace(index) {
            if let Some(previous) = lines.get_mut(previous) {
                previous.remove = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<Line> {
        text.iter().map(|l| Line::new(*l)).collect()
    }

    fn removed(lines: &[Line]) -> Vec<usize> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.remove)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_keeps_last_occurrence() {
        let mut lines = lines(&[
            "timescaledb.last_tuned = 'a'",
            "work_mem = 4MB",
            "timescaledb.last_tuned = 'b'",
            "timescaledb.last_tuned = 'c'",
        ]);
        let mut remover = DuplicateRemover::new("timescaledb.last_tuned").unwrap();

        process_lines(&mut lines, &mut [&mut remover]).unwrap();

        assert_eq!(removed(&lines), vec![0, 2]);
    }

    #[test]
    fn test_reused_remover_keeps_last_line() {
        let mut lines = lines(&[
            "timescaledb.last_tuned = 'a'",
            "timescaledb.last_tuned = 'b'",
        ]);
        let mut remover = DuplicateRemover::new("timescaledb.last_tuned").unwrap();

        process_lines(&mut lines, &mut [&mut remover]).unwrap();
        process_lines(&mut lines, &mut [&mut remover]).unwrap();

        assert_eq!(removed(&lines), vec![0]);
    }

    #[test]
    fn test_single_occurrence_untouched() {
        let mut lines = lines(&["timescaledb.last_tuned = 'a'", "work_mem = 4MB"]);
        let mut remover = DuplicateRemover::new("timescaledb.last_tuned").unwrap();

        process_lines(&mut lines, &mut [&mut remover]).unwrap();

        assert!(removed(&lines).is_empty());
    }

    #[test]
    fn test_processors_are_independent_per_key() {
        let mut lines = lines(&[
            "timescaledb.last_tuned = 'a'",
            "timescaledb.last_tuned_version = '0.1'",
            "timescaledb.last_tuned = 'b'",
            "timescaledb.last_tuned_version = '0.2'",
        ]);
        let mut tuned = DuplicateRemover::new("timescaledb.last_tuned").unwrap();
        let mut version = DuplicateRemover::new("timescaledb.last_tuned_version").unwrap();

        process_lines(&mut lines, &mut [&mut tuned, &mut version]).unwrap();

        assert_eq!(removed(&lines), vec![0, 1]);
    }

    struct FailAt(usize);

    impl LineProcessor for FailAt {
        fn process(&mut self, _lines: &mut [Line], index: usize) -> Result<(), ConfError> {
            if index == self.0 {
                return Err(ConfError::LineOutOfRange { index, len: 0 });
            }
            Ok(())
        }
    }

    #[test]
    fn test_error_short_circuits() {
        let mut lines = lines(&[
            "timescaledb.last_tuned = 'a'",
            "timescaledb.last_tuned = 'b'",
            "timescaledb.last_tuned = 'c'",
        ]);
        let mut fail = FailAt(1);
        let mut remover = DuplicateRemover::new("timescaledb.last_tuned").unwrap();

        let result = process_lines(&mut lines, &mut [&mut fail, &mut remover]);

        assert!(result.is_err());
        // The remover saw line 0 only, so nothing was flagged.
        assert!(removed(&lines).is_empty());
    }
}
