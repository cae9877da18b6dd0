//! Failure logging for step pipelines
//!
//! A failure is logged in full exactly once per logger: the first time it is
//! observed and only when it originates at the reporting step. Failures that
//! wrap a nested pipeline's error, or that were already seen, produce a
//! single summary line.

use std::collections::HashSet;
use std::sync::Arc;

use action_flow::{FailureId, FailureReport, PipelineOptions};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{error, warn};

/// What a logger emitted for one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Error text plus the full, re-indented step description
    Full(String),

    /// First line of the step description only
    Summary(String),
}

impl LogEntry {
    pub fn is_full(&self) -> bool {
        matches!(self, LogEntry::Full(_))
    }

    pub fn text(&self) -> &str {
        match self {
            LogEntry::Full(text) | LogEntry::Summary(text) => text,
        }
    }
}

/// Tagged failure logger with its own set of already-seen failures
#[derive(Debug)]
pub struct ErrorLogger {
    tag: String,
    seen: Mutex<HashSet<FailureId>>,
}

impl ErrorLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of distinct failures observed so far
    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Log one failed-step report.
    pub fn observe(&self, report: &FailureReport<'_>) -> LogEntry {
        let first_sight = self.seen.lock().insert(report.failure_id);

        if first_sight && report.cause.is_none() {
            let text = format!(
                "[{}] {} step {} failed: {}\n{}",
                self.tag,
                report.pipeline,
                report.index,
                report.error,
                normalize_indent(report.step)
            );
            error!(
                tag = %self.tag,
                pipeline = report.pipeline,
                step = report.index,
                failure = %report.failure_id,
                "{}",
                text
            );
            return LogEntry::Full(text);
        }

        let text = format!(
            "[{}] {} step {}: {}",
            self.tag,
            report.pipeline,
            report.index,
            summary_line(report.step)
        );
        warn!(
            tag = %self.tag,
            pipeline = report.pipeline,
            step = report.index,
            failure = %report.failure_id,
            cause = ?report.cause,
            "{}",
            text
        );
        LogEntry::Summary(text)
    }

    /// Install this logger as the error hook, ahead of any hook already set.
    pub fn wrap(self: &Arc<Self>, options: PipelineOptions) -> PipelineOptions {
        let logger = Arc::clone(self);
        let previous = options.on_error.clone();
        options.with_error_hook(Arc::new(move |report: &FailureReport<'_>| {
            logger.observe(report);
            if let Some(previous) = previous.as_ref() {
                previous(report);
            }
        }))
    }
}

/// Shared loggers keyed by tag
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: DashMap<String, Arc<ErrorLogger>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger for `tag`, created on first request
    pub fn for_tag(&self, tag: &str) -> Arc<ErrorLogger> {
        self.loggers
            .entry(tag.to_string())
            .or_insert_with(|| Arc::new(ErrorLogger::new(tag)))
            .clone()
    }

    pub fn remove(&self, tag: &str) -> Option<Arc<ErrorLogger>> {
        self.loggers.remove(tag).map(|(_, logger)| logger)
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

/// Strip the common leading indentation and surrounding blank lines.
pub fn normalize_indent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let end = lines.iter().rposition(|line| !line.trim().is_empty());
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return String::new(),
    };
    let body = &lines[start..=end];

    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                let cut = line
                    .char_indices()
                    .nth(indent)
                    .map(|(offset, _)| offset)
                    .unwrap_or(line.len());
                line[cut..].trim_end()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn summary_line(step: &str) -> String {
    let mut lines = step.lines().map(str::trim).filter(|line| !line.is_empty());
    let first = lines.next().unwrap_or("");
    if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}
