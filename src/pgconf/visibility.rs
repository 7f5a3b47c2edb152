//! Decides which settings differ enough from their recommendation to be shown
//! to the operator.

use super::error::ConfError;
use super::line::TunableParseResult;
use super::units::{parse_bytes, parse_decimal};
use indexmap::{IndexMap, IndexSet};

/// Relative tolerance under which an existing value counts as already tuned.
pub const FUDGE_FACTOR: f64 = 0.05;

/// Source of recommended values for a group of settings.
#[cfg_attr(test, mockall::automock)]
pub trait Recommender {
    /// Whether this recommender applies to the current system at all.
    fn is_available(&self) -> bool;

    /// Recommended value for `key`, or `None` when there is no recommendation.
    fn recommend(&self, key: &str) -> Option<String>;
}

/// How a setting's textual value is turned into a comparable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueParser {
    /// Postgres byte notation such as `2GB`.
    Bytes,
    /// Plain decimal.
    Decimal,
}

impl ValueParser {
    pub fn parse(self, value: &str) -> Option<f64> {
        match self {
            ValueParser::Bytes => parse_bytes(value),
            ValueParser::Decimal => parse_decimal(value),
        }
    }
}

/// Keys among `keys` whose on-disk state should be surfaced for change, in
/// `keys` order.
///
/// A key with no recommendation is never returned. Otherwise a key is returned
/// when it is missing or commented out, or when its value is neither textually
/// equal to nor within [`FUDGE_FACTOR`] of the recommendation. A value that
/// cannot be parsed is returned for the operator to decide, whatever the
/// recommendation; otherwise a recommendation that cannot be parsed is an error.
pub fn compute_visible_keys<K: AsRef<str>>(
    keys: &[K],
    tunables: &IndexMap<String, TunableParseResult>,
    recommender: &dyn Recommender,
    parser: ValueParser,
) -> Result<IndexSet<String>, ConfError> {
    let mut visible = IndexSet::new();

    for key in keys {
        let key = key.as_ref();
        let Some(target) = recommender.recommend(key) else {
            continue;
        };

        let existing = match tunables.get(key) {
            Some(existing) if !existing.missing => existing,
            _ => {
                visible.insert(key.to_string());
                continue;
            }
        };

        if existing.commented {
            visible.insert(key.to_string());
            continue;
        }
        if existing.value == target {
            continue;
        }

        let Some(actual_num) = parser.parse(&existing.value) else {
            visible.insert(key.to_string());
            continue;
        };
        let target_num =
            parser
                .parse(&target)
                .ok_or_else(|| ConfError::UnparseableRecommendation {
                    key: key.to_string(),
                    value: target.clone(),
                })?;

        if !within_tolerance(target_num, actual_num) {
            visible.insert(key.to_string());
        }
    }

    Ok(visible)
}

fn within_tolerance(target: f64, actual: f64) -> bool {
    if target == 0.0 {
        return actual == 0.0;
    }
    (target - actual).abs() / target.abs() <= FUDGE_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(value: &str, commented: bool) -> TunableParseResult {
        TunableParseResult {
            index: Some(0),
            commented,
            missing: false,
            key: "shared_buffers".to_string(),
            value: value.to_string(),
            extra: String::new(),
        }
    }

    fn tunables(value: &str, commented: bool) -> IndexMap<String, TunableParseResult> {
        IndexMap::from([("shared_buffers".to_string(), result(value, commented))])
    }

    fn recommending(value: &'static str) -> MockRecommender {
        let mut recommender = MockRecommender::new();
        recommender
            .expect_recommend()
            .returning(move |_| Some(value.to_string()));
        recommender
    }

    fn visible(map: &IndexMap<String, TunableParseResult>, recommender: &MockRecommender) -> bool {
        compute_visible_keys(&["shared_buffers"], map, recommender, ValueParser::Bytes)
            .unwrap()
            .contains("shared_buffers")
    }

    #[test]
    fn test_exact_match_hidden() {
        assert!(!visible(&tunables("2GB", false), &recommending("2GB")));
    }

    #[test]
    fn test_commented_exact_match_visible() {
        assert!(visible(&tunables("2GB", true), &recommending("2GB")));
    }

    #[test]
    fn test_missing_visible() {
        assert!(visible(&IndexMap::new(), &recommending("2GB")));
    }

    #[test]
    fn test_missing_placeholder_visible() {
        let map = IndexMap::from([(
            "shared_buffers".to_string(),
            TunableParseResult::missing("shared_buffers"),
        )]);
        assert!(visible(&map, &recommending("2GB")));
    }

    #[test]
    fn test_within_tolerance_hidden() {
        assert!(!visible(&tunables("1.95GB", false), &recommending("2GB")));
        assert!(!visible(&tunables("2048MB", false), &recommending("2GB")));
    }

    #[test]
    fn test_outside_tolerance_visible() {
        assert!(visible(&tunables("1.8GB", false), &recommending("2GB")));
        assert!(visible(&tunables("128MB", false), &recommending("2GB")));
    }

    #[test]
    fn test_unparseable_existing_visible() {
        assert!(visible(&tunables("lots", false), &recommending("2GB")));
    }

    #[test]
    fn test_unparseable_recommendation_is_error() {
        let err = compute_visible_keys(
            &["shared_buffers"],
            &tunables("1GB", false),
            &recommending("two gigs"),
            ValueParser::Bytes,
        )
        .unwrap_err();

        assert!(matches!(err, ConfError::UnparseableRecommendation { .. }));
    }

    #[test]
    fn test_unparseable_existing_wins_over_bad_recommendation() {
        let result = compute_visible_keys(
            &["shared_buffers"],
            &tunables("lots", false),
            &recommending("two gigs"),
            ValueParser::Bytes,
        )
        .unwrap();

        assert!(result.contains("shared_buffers"));
    }

    #[test]
    fn test_no_recommendation_skips_even_missing() {
        let mut recommender = MockRecommender::new();
        recommender.expect_recommend().returning(|_| None);

        let keys = ["shared_buffers", "work_mem"];
        let result =
            compute_visible_keys(&keys, &tunables("1MB", true), &recommender, ValueParser::Bytes)
                .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_zero_target() {
        assert!(within_tolerance(0.0, 0.0));
        assert!(!within_tolerance(0.0, 0.01));
    }

    #[test]
    fn test_results_follow_key_order() {
        let mut recommender = MockRecommender::new();
        recommender
            .expect_recommend()
            .returning(|_| Some("10".to_string()));

        let keys = ["b", "a", "c"];
        let result =
            compute_visible_keys(&keys, &IndexMap::new(), &recommender, ValueParser::Decimal)
                .unwrap();

        let order: Vec<&str> = result.iter().map(String::as_str).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
