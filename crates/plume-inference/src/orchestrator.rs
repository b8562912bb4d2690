//! Caller-facing entry point: one submission in, one validated result out.
//!
//! Per request the pipeline is
//! normalize → configuration check → quota reservation → encode → assemble →
//! invoke → parse → record → commit. Everything before the reservation fails
//! without touching the quota; everything after it drops the permit on
//! failure, which refunds the unit.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use plume_core::defaults;
use plume_core::{
    CritiqueRequest, CritiqueResult, Error, GenerationBackend, GenerationRequest,
    GenerationResult, HistoryEntry, HistoryOutcome, ParseError, ParsedResult, QuotaState,
    QuotaTracker, Result, SessionHistory, Submission,
};

use crate::{attachments, invoker, normalize, parser, prompt, schema};

/// Maximum characters of key points kept as a history headline.
const HEADLINE_CHARS: usize = 30;

/// Session-scoped orchestrator.
///
/// Cheap to share behind an `Arc`; concurrent submissions share only the
/// quota and the history.
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    quota: QuotaTracker,
    history: SessionHistory,
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", name, value))),
        _ => Ok(default),
    }
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        daily_limit: u32,
        history_capacity: usize,
    ) -> Self {
        Self {
            backend,
            quota: QuotaTracker::new(daily_limit),
            history: SessionHistory::new(history_capacity),
        }
    }

    /// Build with the given backend and limits from the environment
    /// (`PLUME_DAILY_LIMIT`, `PLUME_HISTORY_CAPACITY`).
    pub fn with_env_limits(backend: Arc<dyn GenerationBackend>) -> Result<Self> {
        let daily_limit = env_or(defaults::ENV_DAILY_LIMIT, defaults::DAILY_LIMIT)?;
        let history_capacity = env_or(defaults::ENV_HISTORY_CAPACITY, defaults::HISTORY_CAPACITY)?;
        Ok(Self::new(backend, daily_limit, history_capacity))
    }

    /// Gemini backend and limits, all from the environment.
    #[cfg(feature = "gemini")]
    pub fn from_env() -> Result<Self> {
        let backend = crate::gemini::GeminiBackend::from_env()?;
        Self::with_env_limits(Arc::new(backend))
    }

    /// Produce two alternative notes.
    pub async fn submit_generation(&self, request: GenerationRequest) -> Result<GenerationResult> {
        match self.submit(Submission::Generate(request)).await? {
            ParsedResult::Generation(result) => Ok(result),
            ParsedResult::Critique(_) => Err(mode_mismatch()),
        }
    }

    /// Score and rewrite a note.
    pub async fn submit_critique(&self, request: CritiqueRequest) -> Result<CritiqueResult> {
        match self.submit(Submission::Critique(request)).await? {
            ParsedResult::Critique(result) => Ok(result),
            ParsedResult::Generation(_) => Err(mode_mismatch()),
        }
    }

    /// Run one submission of either mode.
    ///
    /// Each submission gets a UUIDv7 `request_id`. It tags every log line of
    /// the submission and becomes the id of its history entry.
    pub async fn submit(&self, submission: Submission) -> Result<ParsedResult> {
        self.process(Uuid::now_v7(), submission).await
    }

    #[instrument(skip_all, fields(subsystem = "orchestrator", component = "orchestrator", op = "submit", request_id = %request_id, mode = %submission.mode()))]
    async fn process(&self, request_id: Uuid, submission: Submission) -> Result<ParsedResult> {
        let start = Instant::now();
        let result = self.run(request_id, submission).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(
                duration_ms,
                quota_remaining = self.quota.remaining(),
                success = true,
                "Submission complete"
            ),
            Err(e) => warn!(
                duration_ms,
                error_kind = e.kind(),
                error = %e,
                success = false,
                "Submission failed"
            ),
        }
        result
    }

    async fn run(&self, request_id: Uuid, submission: Submission) -> Result<ParsedResult> {
        let submission = normalize::normalize(submission)?;
        self.backend.ensure_configured()?;
        let permit = self.quota.reserve()?;

        let mode = submission.mode();
        let parts = match &submission {
            Submission::Generate(request) => attachments::encode(&request.attachments).await?,
            Submission::Critique(_) => Vec::new(),
        };
        let request = invoker::build_request(
            prompt::system_instruction(mode),
            prompt::assemble(&submission),
            parts,
            schema::response_schema(mode),
        );

        let raw = invoker::invoke(self.backend.as_ref(), &request).await?;
        let parsed = parser::parse(&raw, mode)?;

        let outcome = match &parsed {
            ParsedResult::Generation(r) => HistoryOutcome::Generation(r.clone()),
            ParsedResult::Critique(r) => HistoryOutcome::Critique(r.clone()),
        };
        self.history
            .record(HistoryEntry::with_id(request_id, headline(&submission), outcome));
        permit.commit();

        Ok(parsed)
    }

    pub fn remaining_quota(&self) -> u32 {
        self.quota.remaining()
    }

    pub fn quota_state(&self) -> QuotaState {
        self.quota.state()
    }

    pub fn quota_limit(&self) -> u32 {
        self.quota.limit()
    }

    /// Start a new session: full quota, empty history.
    pub fn reset_session(&self) {
        self.quota.reset();
        self.history.clear();
    }

    /// Session history, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.entries()
    }

    /// Look up one history entry by its request id.
    pub fn history_entry(&self, id: Uuid) -> Option<HistoryEntry> {
        self.history.get(id)
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn backend(&self) -> &dyn GenerationBackend {
        self.backend.as_ref()
    }
}

fn headline(submission: &Submission) -> String {
    match submission {
        Submission::Critique(request) => request.title.clone(),
        Submission::Generate(request) => request.key_points.chars().take(HEADLINE_CHARS).collect(),
    }
}

fn mode_mismatch() -> Error {
    Error::Parse(ParseError::violation("$", "result does not match the requested mode"))
}
