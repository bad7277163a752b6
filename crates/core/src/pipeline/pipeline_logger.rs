use std::time::Instant;

/// Observer for per-request pipeline events.
///
/// Keeps the use case independent of where diagnostics end up.
pub trait PipelineLogger: Send {
    /// Called before each request so per-request state starts empty.
    fn begin_request(&mut self) {}

    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. candidate count).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-request summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Forwards events to the `log` facade and summarizes the request at the end.
///
/// Stages and metrics are reported in the order they were recorded.
pub struct LogPipelineLogger {
    timings: Vec<(String, f64)>,
    metrics: Vec<(String, f64)>,
    start_time: Instant,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: Vec::new(),
            metrics: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!("Request summary ({elapsed_ms:.1}ms total):")];

        for (stage, ms) in &self.timings {
            lines.push(format!("  {stage:10}: {ms:8.1}ms"));
        }
        for (name, value) in &self.metrics {
            lines.push(format!("  {name}: {value}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, ms)| *ms)
    }

    pub fn metric_for(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn begin_request(&mut self) {
        self.timings.clear();
        self.metrics.clear();
        self.start_time = Instant::now();
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::debug!("{stage} took {duration_ms:.1}ms");
        self.timings.push((stage.to_string(), duration_ms));
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.push((name.to_string(), value));
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.timing("detect", 5.0);
        logger.metric("faces", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = LogPipelineLogger::new();
        logger.timing("acquire", 20.0);
        logger.timing("detect", 5.0);

        assert_eq!(logger.timing_for("acquire"), Some(20.0));
        assert_eq!(logger.timing_for("detect"), Some(5.0));
        assert_eq!(logger.timing_for("render"), None);
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = LogPipelineLogger::new();
        logger.metric("faces", 2.0);
        assert_eq!(logger.metric_for("faces"), Some(2.0));
    }

    #[test]
    fn test_summary_lists_stages_in_order() {
        let mut logger = LogPipelineLogger::new();
        logger.timing("stage", 1.0);
        logger.timing("detect", 30.0);
        logger.metric("detections", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Request summary"));
        let stage_at = summary.find("stage").unwrap();
        let detect_at = summary.find("detect").unwrap();
        assert!(stage_at < detect_at);
        assert!(summary.contains("detections: 4"));
    }

    #[test]
    fn test_begin_request_discards_previous_request() {
        let mut logger = LogPipelineLogger::new();
        logger.timing("render", 12.0);
        logger.metric("faces", 3.0);

        logger.begin_request();
        logger.timing("acquire", 4.0);

        assert_eq!(logger.timing_for("render"), None);
        assert_eq!(logger.metric_for("faces"), None);
        assert_eq!(logger.timing_for("acquire"), Some(4.0));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogPipelineLogger::new().summary_string().is_none());
    }
}
