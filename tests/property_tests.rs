//! Property-based tests for the configuration-state engine
//!
//! Tests invariants that should hold for ALL inputs:
//! - Unmodified files are written back byte for byte
//! - The last matching line for a key wins
//! - Duplicate removal keeps exactly one line and is idempotent
//! - Values within tolerance of the recommendation are never shown

use pgconf_tune::pgconf::{
    ConfigFileState, DuplicateRemover, LineProcessor, PatternRegistry, Recommender, ValueParser,
    compute_visible_keys,
};
use proptest::prelude::*;

fn registry() -> PatternRegistry {
    PatternRegistry::from_keys(["work_mem", "shared_buffers"], ["timescaledb.last_tuned"]).unwrap()
}

/// Printable ASCII lines without line breaks.
fn any_line() -> impl Strategy<Value = String> {
    "[ -~\t]{0,40}"
}

/// Lines mixing noise with settings of `work_mem`.
fn conf_line() -> impl Strategy<Value = String> {
    prop_oneof![
        any_line().prop_filter("no work_mem", |l| !l.contains("work_mem")),
        (1u32..4096).prop_map(|v| format!("work_mem = {}kB", v)),
        (1u32..4096).prop_map(|v| format!("#work_mem = {}MB\t# comment", v)),
        "[a-z_]{1,12}".prop_map(|k| format!("{} = on", k)),
    ]
}

struct Fixed(String);

impl Recommender for Fixed {
    fn is_available(&self) -> bool {
        true
    }

    fn recommend(&self, _key: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

proptest! {
    /// Property: parsing then writing without changes reproduces the input
    #[test]
    fn unmodified_round_trip(lines in prop::collection::vec(any_line(), 0..30)) {
        let text: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let state = ConfigFileState::parse(&text, &registry()).unwrap();

        let mut out = Vec::new();
        let written = state.write_to(&mut out).unwrap();

        prop_assert_eq!(written as usize, text.len());
        prop_assert_eq!(String::from_utf8(out).unwrap(), text);
    }

    /// Property: the recorded index is the last line matching the key
    #[test]
    fn last_match_wins(lines in prop::collection::vec(conf_line(), 1..30)) {
        let text: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let state = ConfigFileState::parse(&text, &registry()).unwrap();

        let expected = lines
            .iter()
            .rposition(|l| l.starts_with("work_mem = ") || l.starts_with("#work_mem = "));
        let actual = state.tunables.get("work_mem").and_then(|r| r.index);

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(state.lines.len(), lines.len());
    }

    /// Property: N matching lines leave exactly one, the last, and a second
    /// pass removes nothing more
    #[test]
    fn duplicate_removal_keeps_last(
        values in prop::collection::vec("[a-z0-9]{1,8}", 1..10),
        noise in prop::collection::vec("[a-z ]{0,10}", 1..10),
    ) {
        let mut text = String::new();
        for (i, value) in values.iter().enumerate() {
            text.push_str(&noise[i % noise.len()]);
            text.push('\n');
            text.push_str(&format!("timescaledb.last_tuned = '{}'\n", value));
        }
        let mut state = ConfigFileState::parse(&text, &registry()).unwrap();

        let mut remover = DuplicateRemover::new("timescaledb.last_tuned").unwrap();
        state.process_lines(&mut [&mut remover as &mut dyn LineProcessor]).unwrap();
        let removed: Vec<bool> = state.lines.iter().map(|l| l.remove).collect();

        prop_assert_eq!(removed.iter().filter(|r| **r).count(), values.len() - 1);
        let kept: Vec<&str> = state
            .retained_lines()
            .map(|l| l.content.as_str())
            .filter(|c| c.starts_with("timescaledb.last_tuned"))
            .collect();
        let last = format!("timescaledb.last_tuned = '{}'", values[values.len() - 1]);
        prop_assert_eq!(kept, vec![last.as_str()]);

        let mut again = DuplicateRemover::new("timescaledb.last_tuned").unwrap();
        state.process_lines(&mut [&mut again as &mut dyn LineProcessor]).unwrap();
        let removed_again: Vec<bool> = state.lines.iter().map(|l| l.remove).collect();
        prop_assert_eq!(removed_again, removed);
    }

    /// Property: values within 4% of the recommendation stay hidden, values
    /// more than 6% away are shown
    #[test]
    fn tolerance_band(target_mb in 64u64..65536, permille in 0u64..200) {
        let actual_kb = target_mb * 1024 * (1000 + permille) / 1000;
        let text = format!("shared_buffers = {}kB\n", actual_kb);
        let state = ConfigFileState::parse(&text, &registry()).unwrap();
        let recommender = Fixed(format!("{}MB", target_mb));

        let visible = compute_visible_keys(
            &["shared_buffers"],
            &state.tunables,
            &recommender,
            ValueParser::Bytes,
        )
        .unwrap();

        if permille <= 40 {
            prop_assert!(visible.is_empty());
        } else if permille > 60 {
            prop_assert!(visible.contains("shared_buffers"));
        }
    }

    /// Property: visibility is deterministic for the same inputs
    #[test]
    fn visibility_is_deterministic(lines in prop::collection::vec(conf_line(), 0..20)) {
        let state = ConfigFileState::parse(&lines.join("\n"), &registry()).unwrap();
        let recommender = Fixed("64MB".to_string());
        let keys = ["work_mem", "shared_buffers"];

        let visible = || {
            compute_visible_keys(&keys, &state.tunables, &recommender, ValueParser::Bytes).unwrap()
        };
        let first = visible();
        let second = visible();

        prop_assert_eq!(first, second);
    }
}
