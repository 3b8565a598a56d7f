//! Segment keys, the enumeration of a run's segment values, and the segment membership test.

use crate::{natural_order::NaturalKey, HistogramCfg, HistogramError, Sample};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::{collections::BTreeSet, fmt::Display};

/// Label of the segment that collects samples to which no other segment applies.
pub const NO_SEGMENT: &str = "__NoSegmentParamSet__";

/// Suffix that turns a literal segment value into a prefix match.
pub const WILDCARD: &str = ".*";

pub const CACHED: &str = "cached";
pub const UNCACHED: &str = "uncached";
pub const TIMED_OUT: &str = "timed out";
pub const COMPLETE: &str = "complete";

/// Naturally ordered set of segment values.
pub type SegmentSet = BTreeSet<NaturalKey>;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W+").expect("`\\W+` is a valid regex by construction"));

//=================
// SegmentKey

/// The attribute by which samples are partitioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKey {
    /// `"cached"` when the response has a positive cache age, `"uncached"` otherwise.
    Cached,
    /// `"timed out"` or `"complete"`.
    Timeout,
    /// Number of query parameters whose name starts with the filter prefix.
    NumFilters,
    /// Number of words in the decoded search text.
    NumWordsInQuery,
    /// Literal value of the named query parameter.
    Param(String),
}

/// Fieldless discriminant of [`SegmentKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Cached,
    Timeout,
    NumFilters,
    NumWordsInQuery,
    Param,
}

/// How segments are ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrder {
    /// Natural order of the segment labels.
    Natural,
    /// Descending total frequency, ties in natural order of the labels.
    ByFrequency,
}

impl SegmentKind {
    pub fn display_order(self) -> DisplayOrder {
        match self {
            Self::NumFilters | Self::NumWordsInQuery => DisplayOrder::Natural,
            Self::Cached | Self::Timeout | Self::Param => DisplayOrder::ByFrequency,
        }
    }
}

impl SegmentKey {
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Cached => SegmentKind::Cached,
            Self::Timeout => SegmentKind::Timeout,
            Self::NumFilters => SegmentKind::NumFilters,
            Self::NumWordsInQuery => SegmentKind::NumWordsInQuery,
            Self::Param(_) => SegmentKind::Param,
        }
    }

    /// Whether the segment values are counts, to be shown in their natural order.
    pub fn is_ordered(&self) -> bool {
        self.kind().display_order() == DisplayOrder::Natural
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Cached => "cached",
            Self::Timeout => "timeout",
            Self::NumFilters => "numFilters",
            Self::NumWordsInQuery => "numWordsInQuery",
            Self::Param(name) => name,
        }
    }
}

impl From<&str> for SegmentKey {
    /// Maps the reserved names `cached`, `timeout`, `numFilters` and `numWordsInQuery` to their kinds; any
    /// other name designates a query parameter.
    fn from(name: &str) -> Self {
        match name {
            "cached" => Self::Cached,
            "timeout" => Self::Timeout,
            "numFilters" => Self::NumFilters,
            "numWordsInQuery" => Self::NumWordsInQuery,
            other => Self::Param(other.to_owned()),
        }
    }
}

impl From<String> for SegmentKey {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl Display for SegmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//=================
// SegmentClassifier

/// Derives segment values from samples and decides segment membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentClassifier {
    key: Option<SegmentKey>,
    filter_prefix: String,
    query_param: String,
}

impl SegmentClassifier {
    pub fn new(
        key: Option<SegmentKey>,
        filter_prefix: impl Into<String>,
        query_param: impl Into<String>,
    ) -> Self {
        Self {
            key,
            filter_prefix: filter_prefix.into(),
            query_param: query_param.into(),
        }
    }

    pub fn from_cfg(cfg: &HistogramCfg) -> Self {
        Self::new(
            cfg.segment_key.clone(),
            cfg.filter_prefix.as_str(),
            cfg.query_param.as_str(),
        )
    }

    pub fn key(&self) -> Option<&SegmentKey> {
        self.key.as_ref()
    }

    /// The values `sample` contributes to the segment universe. A sample can contribute several values when
    /// a query parameter is repeated, and none when it has no query.
    ///
    /// # Errors
    /// [`HistogramError::Decode`] if the search text cannot be URL-decoded.
    pub fn sample_values(&self, sample: &Sample) -> Result<Vec<String>, HistogramError> {
        let key = match &self.key {
            None => return Ok(Vec::new()),
            Some(key) => key,
        };
        let values = match key {
            SegmentKey::Cached => {
                let value = if sample.cache_age > 0 { CACHED } else { UNCACHED };
                vec![value.to_owned()]
            }
            SegmentKey::Timeout => {
                let value = if sample.timed_out { TIMED_OUT } else { COMPLETE };
                vec![value.to_owned()]
            }
            SegmentKey::NumFilters if sample.has_query() => {
                vec![self.num_filters(sample).to_string()]
            }
            SegmentKey::NumFilters => Vec::new(),
            SegmentKey::NumWordsInQuery => sample
                .query_params
                .iter()
                .filter(|(k, _)| *k == self.query_param)
                .map(|(_, v)| count_query_words(v).map(|n| n.to_string()))
                .collect::<Result<_, _>>()?,
            SegmentKey::Param(name) => sample
                .query_params
                .iter()
                .filter(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .collect(),
        };
        Ok(values)
    }

    /// Collects the distinct segment values of all `samples`, naturally ordered. Empty when no segment key is
    /// configured. A sample whose value cannot be derived is skipped with a warning.
    pub fn universe(&self, samples: &[Sample]) -> SegmentSet {
        log::trace!("entering `SegmentClassifier::universe`");
        let mut universe = SegmentSet::new();
        if self.key.is_none() {
            return universe;
        }
        for sample in samples {
            match self.sample_values(sample) {
                Ok(values) => universe.extend(values.into_iter().map(NaturalKey)),
                Err(err) => log::warn!("skipping sample in segment enumeration: {err}"),
            }
        }
        universe
    }

    /// Prepares the membership test for segment `value`, so that it is decoded once rather than per sample.
    ///
    /// # Errors
    /// [`HistogramError::Decode`] if `value` is not an integer for a counting key.
    pub fn matcher<'a>(&'a self, value: &'a str) -> Result<SegmentMatcher<'a>, HistogramError> {
        if value == NO_SEGMENT {
            return Ok(SegmentMatcher::Always);
        }
        let key = match &self.key {
            None => return Ok(SegmentMatcher::Never),
            Some(key) => key,
        };
        let matcher = match key {
            SegmentKey::Cached => SegmentMatcher::Cached(match value {
                CACHED => Some(true),
                UNCACHED => Some(false),
                _ => None,
            }),
            SegmentKey::Timeout => SegmentMatcher::TimedOut(match value {
                TIMED_OUT => Some(true),
                COMPLETE => Some(false),
                _ => None,
            }),
            SegmentKey::NumFilters => SegmentMatcher::NumFilters {
                prefix: &self.filter_prefix,
                count: parse_count(value)?,
            },
            SegmentKey::NumWordsInQuery => SegmentMatcher::NumWords {
                param: &self.query_param,
                count: parse_count(value)?,
            },
            SegmentKey::Param(name) => match value.strip_suffix(WILDCARD) {
                Some(prefix) => SegmentMatcher::Prefix { name, prefix },
                None => SegmentMatcher::Exact { name, value },
            },
        };
        Ok(matcher)
    }

    /// Whether segment `value` applies to `sample`. The reserved [`NO_SEGMENT`] label applies to every sample.
    ///
    /// # Errors
    /// [`HistogramError::Decode`] if `value` is not an integer for a counting key, or the sample's search text
    /// cannot be URL-decoded.
    pub fn applies(&self, value: &str, sample: &Sample) -> Result<bool, HistogramError> {
        self.matcher(value)?.applies(sample)
    }

    /// Like [`Self::applies`], with a decode failure logged and treated as "does not apply".
    pub fn matches(&self, value: &str, sample: &Sample) -> bool {
        self.applies(value, sample).unwrap_or_else(|err| {
            log::warn!("segment `{value}` treated as not applying: {err}");
            false
        })
    }

    fn num_filters(&self, sample: &Sample) -> usize {
        count_filters(sample, &self.filter_prefix)
    }
}

//=================
// SegmentMatcher

/// Membership test for one segment value, produced by [`SegmentClassifier::matcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentMatcher<'a> {
    Always,
    Never,
    /// `None` for a value that is neither `cached` nor `uncached`.
    Cached(Option<bool>),
    TimedOut(Option<bool>),
    NumFilters { prefix: &'a str, count: usize },
    NumWords { param: &'a str, count: usize },
    Exact { name: &'a str, value: &'a str },
    Prefix { name: &'a str, prefix: &'a str },
}

impl SegmentMatcher<'_> {
    /// # Errors
    /// [`HistogramError::Decode`] if the sample's search text cannot be URL-decoded.
    pub fn applies(&self, sample: &Sample) -> Result<bool, HistogramError> {
        let applies = match *self {
            Self::Always => true,
            Self::Never => false,
            Self::Cached(expected) => expected == Some(sample.cache_age > 0),
            Self::TimedOut(expected) => expected == Some(sample.timed_out),
            Self::NumFilters { prefix, count } => {
                sample.has_query() && count_filters(sample, prefix) == count
            }
            Self::NumWords { param, count } => {
                for (_, v) in sample.query_params.iter().filter(|(k, _)| k == param) {
                    if count_query_words(v)? == count {
                        return Ok(true);
                    }
                }
                false
            }
            Self::Exact { name, value } => sample
                .query_params
                .iter()
                .any(|(k, v)| k == name && v == value),
            Self::Prefix { name, prefix } => sample
                .query_params
                .iter()
                .any(|(k, v)| k == name && v.starts_with(prefix)),
        };
        Ok(applies)
    }
}

//=================
// Query text helpers

fn count_filters(sample: &Sample, prefix: &str) -> usize {
    sample
        .query_params
        .iter()
        .filter(|(k, _)| k.starts_with(prefix))
        .count()
}

fn parse_count(value: &str) -> Result<usize, HistogramError> {
    value
        .parse::<usize>()
        .map_err(|err| HistogramError::decode(value, err))
}

/// Decodes a form-encoded query value: `+` is a space and `%XX` is a percent-encoded byte of UTF-8 text.
///
/// # Errors
/// [`HistogramError::Decode`] for a `%` not followed by two hex digits, or for bytes that are not UTF-8.
pub fn url_decode(raw: &str) -> Result<String, HistogramError> {
    let spaced = raw.replace('+', " ");
    let bytes = spaced.as_bytes();
    for (i, _) in spaced.match_indices('%') {
        let escape_ok = bytes
            .get(i + 1..i + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !escape_ok {
            return Err(HistogramError::decode(
                raw,
                format!("incomplete escape sequence at offset {i}"),
            ));
        }
    }
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|text| text.into_owned())
        .map_err(|err| HistogramError::decode(raw, err))
}

/// Number of words in the raw search text `raw`: the decoded, trimmed text split on runs of non-word
/// characters, not counting empty pieces.
///
/// # Errors
/// See [`url_decode`].
pub fn count_query_words(raw: &str) -> Result<usize, HistogramError> {
    let text = url_decode(raw)?;
    Ok(NON_WORD
        .split(text.trim())
        .filter(|word| !word.is_empty())
        .count())
}

#[cfg(test)]
mod test {
    use super::*;

    fn classifier(key: &str) -> SegmentClassifier {
        SegmentClassifier::new(Some(SegmentKey::from(key)), "filter", "query")
    }

    fn keys(set: &SegmentSet) -> Vec<&str> {
        set.iter().map(|k| k.as_str()).collect()
    }

    #[test]
    fn test_segment_key_names() {
        assert_eq!(SegmentKey::from("cached"), SegmentKey::Cached);
        assert_eq!(SegmentKey::from("numFilters"), SegmentKey::NumFilters);
        assert_eq!(
            SegmentKey::from("channel"),
            SegmentKey::Param("channel".to_owned())
        );
        assert!(SegmentKey::NumWordsInQuery.is_ordered());
        assert!(!SegmentKey::Timeout.is_ordered());
        assert_eq!(SegmentKey::Param("channel".to_owned()).to_string(), "channel");
    }

    #[test]
    fn test_cached_universe_and_membership() {
        let samples = vec![
            Sample::new(10, 0).with_cache_age(5),
            Sample::new(20, 0),
            Sample::new(30, 0),
        ];
        let c = classifier("cached");
        assert_eq!(keys(&c.universe(&samples)), vec!["cached", "uncached"]);
        assert_eq!(samples.iter().filter(|s| c.matches(CACHED, s)).count(), 1);
        assert_eq!(samples.iter().filter(|s| c.matches(UNCACHED, s)).count(), 2);
        assert!(!c.matches("bogus", &samples[0]));
    }

    #[test]
    fn test_timeout_membership() {
        let c = classifier("timeout");
        let timed_out = Sample::new(10, 0).with_timed_out(true);
        assert_eq!(c.applies(TIMED_OUT, &timed_out), Ok(true));
        assert_eq!(c.applies(COMPLETE, &timed_out), Ok(false));
        assert_eq!(c.applies(NO_SEGMENT, &timed_out), Ok(true));
    }

    #[test]
    fn test_num_filters() {
        let c = classifier("numFilters");
        let samples = vec![
            Sample::new(10, 0).with_query("query=a&filterColor=red&filterSize=42"),
            Sample::new(10, 0).with_query("query=a"),
            Sample::new(10, 0),
        ];
        assert_eq!(keys(&c.universe(&samples)), vec!["0", "2"]);
        assert_eq!(c.applies("2", &samples[0]), Ok(true));
        assert_eq!(c.applies("0", &samples[1]), Ok(true));
        assert_eq!(c.applies("0", &samples[2]), Ok(false));
        assert!(matches!(
            c.applies("two", &samples[0]),
            Err(HistogramError::Decode { .. })
        ));
        assert!(!c.matches("two", &samples[0]));
    }

    #[test]
    fn test_num_words_in_query() {
        let c = classifier("numWordsInQuery");
        let samples = vec![
            Sample::new(10, 0).with_query("query=red+shoes"),
            Sample::new(10, 0).with_query("query=%20blue%2C%20suede+shoes%20"),
            Sample::new(10, 0).with_query("query=dress&query=long+red+dress"),
            Sample::new(10, 0).with_query("channel=de"),
        ];
        assert_eq!(keys(&c.universe(&samples)), vec!["1", "2", "3"]);
        assert_eq!(c.applies("2", &samples[0]), Ok(true));
        assert_eq!(c.applies("3", &samples[1]), Ok(true));
        assert_eq!(c.applies("3", &samples[2]), Ok(true));
        assert_eq!(c.applies("1", &samples[3]), Ok(false));
    }

    #[test]
    fn test_malformed_search_text() {
        let c = classifier("numWordsInQuery");
        let broken = Sample::new(10, 0).with_query("query=100%");
        assert!(matches!(
            c.applies("1", &broken),
            Err(HistogramError::Decode { .. })
        ));
        assert!(!c.matches("1", &broken));
        assert!(c.universe(&[broken]).is_empty());
    }

    #[test]
    fn test_param_exact_and_wildcard() {
        let c = classifier("channel");
        let samples = vec![
            Sample::new(10, 0).with_query("channel=de"),
            Sample::new(10, 0).with_query("channel=de_ch"),
            Sample::new(10, 0).with_query("channel=en"),
        ];
        assert_eq!(keys(&c.universe(&samples)), vec!["de", "de_ch", "en"]);
        assert_eq!(samples.iter().filter(|s| c.matches("de", s)).count(), 1);
        assert_eq!(samples.iter().filter(|s| c.matches("de.*", s)).count(), 2);
        assert_eq!(samples.iter().filter(|s| c.matches(".*", s)).count(), 3);
    }

    #[test]
    fn test_unsegmented_classifier() {
        let c = SegmentClassifier::new(None, "filter", "query");
        let sample = Sample::new(10, 0).with_query("channel=de");
        assert!(c.universe(&[sample.clone()]).is_empty());
        assert!(c.matches(NO_SEGMENT, &sample));
        assert!(!c.matches("de", &sample));
    }

    #[test]
    fn test_count_query_words() {
        assert_eq!(count_query_words("red+shoes"), Ok(2));
        assert_eq!(count_query_words("+++"), Ok(0));
        assert_eq!(count_query_words("gr%C3%B6%C3%9Fe+42"), Ok(2));
        assert_eq!(url_decode("a%2Bb+c"), Ok("a+b c".to_owned()));
        assert!(url_decode("%zz").is_err());
        assert!(url_decode("%C3").is_err());
    }
}
