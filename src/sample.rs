//! The request records consumed by the engine.

/// Ordered query parameters of a request URL, as `(key, value)` pairs in URL order.
///
/// Values are kept exactly as they appear in the URL; rules that need decoded text decode them on demand.
/// Duplicate keys are allowed.
pub type QueryParams = Vec<(String, String)>;

/// One recorded request/response measurement from a load-test run.
///
/// Samples are immutable once produced by the log reader. The `with_*` methods exist so that readers and tests
/// can assemble a sample field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sample {
    /// Request URL or sampler label.
    pub label: String,
    pub response_code: String,
    pub response_time_ms: u32,
    /// Epoch milliseconds.
    pub start_of_request: i64,
    pub success: bool,
    pub query_params: QueryParams,
    /// `-1` when the server did not report a result count.
    pub result_count: i32,
    /// `0` for uncached responses.
    pub cache_age: u32,
    pub timed_out: bool,
}

impl Sample {
    /// Creates a successful sample with no query parameters and no server-side annotations.
    pub fn new(response_time_ms: u32, start_of_request: i64) -> Self {
        Self {
            label: String::new(),
            response_code: "200".to_owned(),
            response_time_ms,
            start_of_request,
            success: true,
            query_params: QueryParams::new(),
            result_count: -1,
            cache_age: 0,
            timed_out: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_response_code(mut self, response_code: impl Into<String>) -> Self {
        self.response_code = response_code.into();
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Replaces the query parameters with those parsed from the raw URL `query` (the part after `?`).
    pub fn with_query(mut self, query: &str) -> Self {
        self.query_params = parse_query(query);
        self
    }

    pub fn with_query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn with_result_count(mut self, result_count: i32) -> Self {
        self.result_count = result_count;
        self
    }

    pub fn with_cache_age(mut self, cache_age: u32) -> Self {
        self.cache_age = cache_age;
        self
    }

    pub fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    /// Epoch milliseconds at which the response was complete.
    pub fn end_of_request(&self) -> i64 {
        self.start_of_request + i64::from(self.response_time_ms)
    }

    /// Returns the first value of query parameter `key`, if any.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_query(&self) -> bool {
        !self.query_params.is_empty()
    }
}

/// Splits a raw URL query string into its `key=value` pairs.
///
/// Pairs without a value (`key` or `key=`) are dropped. For `a=b=c` the value is `b`.
pub fn parse_query(query: &str) -> QueryParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|param| {
            let mut parts = param.split('=');
            let key = parts.next()?;
            let value = parts.next()?;
            if value.is_empty() {
                return None;
            }
            Some((key.to_owned(), value.to_owned()))
        })
        .collect()
}

/// Returns references to `samples` ordered ascending by response time. Ties keep their input order.
pub fn sorted_by_response_time(samples: &[Sample]) -> Vec<&Sample> {
    let mut sorted: Vec<&Sample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.response_time_ms);
    sorted
}
