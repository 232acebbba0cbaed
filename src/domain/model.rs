use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The closed Declare template vocabulary. Constraint lines outside this
/// set are rejected by the grammar and skipped by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateType {
    Absence,
    Absence2,
    Absence3,
    Exactly1,
    Exactly2,
    Existence,
    Existence2,
    Existence3,
    Init,
    AlternatePrecedence,
    AlternateResponse,
    AlternateSuccession,
    ChainPrecedence,
    ChainResponse,
    ChainSuccession,
    Choice,
    CoExistence,
    ExclusiveChoice,
    Precedence,
    RespondedExistence,
    Response,
    Succession,
    NotChainPrecedence,
    NotChainResponse,
    NotChainSuccession,
    NotCoExistence,
    NotPrecedence,
    NotRespondedExistence,
    NotResponse,
    NotSuccession,
}

impl TemplateType {
    /// Size of the template vocabulary; the log base for constraint
    /// variability (SN3).
    pub const VOCABULARY_SIZE: usize = 30;

    pub const ALL: [TemplateType; Self::VOCABULARY_SIZE] = [
        TemplateType::Absence,
        TemplateType::Absence2,
        TemplateType::Absence3,
        TemplateType::Exactly1,
        TemplateType::Exactly2,
        TemplateType::Existence,
        TemplateType::Existence2,
        TemplateType::Existence3,
        TemplateType::Init,
        TemplateType::AlternatePrecedence,
        TemplateType::AlternateResponse,
        TemplateType::AlternateSuccession,
        TemplateType::ChainPrecedence,
        TemplateType::ChainResponse,
        TemplateType::ChainSuccession,
        TemplateType::Choice,
        TemplateType::CoExistence,
        TemplateType::ExclusiveChoice,
        TemplateType::Precedence,
        TemplateType::RespondedExistence,
        TemplateType::Response,
        TemplateType::Succession,
        TemplateType::NotChainPrecedence,
        TemplateType::NotChainResponse,
        TemplateType::NotChainSuccession,
        TemplateType::NotCoExistence,
        TemplateType::NotPrecedence,
        TemplateType::NotRespondedExistence,
        TemplateType::NotResponse,
        TemplateType::NotSuccession,
    ];

    /// The name as it appears in model text (space-separated).
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Absence => "Absence",
            TemplateType::Absence2 => "Absence2",
            TemplateType::Absence3 => "Absence3",
            TemplateType::Exactly1 => "Exactly1",
            TemplateType::Exactly2 => "Exactly2",
            TemplateType::Existence => "Existence",
            TemplateType::Existence2 => "Existence2",
            TemplateType::Existence3 => "Existence3",
            TemplateType::Init => "Init",
            TemplateType::AlternatePrecedence => "Alternate Precedence",
            TemplateType::AlternateResponse => "Alternate Response",
            TemplateType::AlternateSuccession => "Alternate Succession",
            TemplateType::ChainPrecedence => "Chain Precedence",
            TemplateType::ChainResponse => "Chain Response",
            TemplateType::ChainSuccession => "Chain Succession",
            TemplateType::Choice => "Choice",
            TemplateType::CoExistence => "Co-Existence",
            TemplateType::ExclusiveChoice => "Exclusive Choice",
            TemplateType::Precedence => "Precedence",
            TemplateType::RespondedExistence => "Responded Existence",
            TemplateType::Response => "Response",
            TemplateType::Succession => "Succession",
            TemplateType::NotChainPrecedence => "Not Chain Precedence",
            TemplateType::NotChainResponse => "Not Chain Response",
            TemplateType::NotChainSuccession => "Not Chain Succession",
            TemplateType::NotCoExistence => "Not Co-Existence",
            TemplateType::NotPrecedence => "Not Precedence",
            TemplateType::NotRespondedExistence => "Not Responded Existence",
            TemplateType::NotResponse => "Not Response",
            TemplateType::NotSuccession => "Not Succession",
        }
    }

    pub fn from_name(name: &str) -> Option<TemplateType> {
        TemplateType::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A temporal rule over one or more activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub template: TemplateType,
    pub activities: Vec<String>,
}

impl Constraint {
    pub fn new(template: TemplateType, activities: Vec<String>) -> Self {
        Self {
            template,
            activities,
        }
    }
}

/// A parsed Declare model: activities in declaration order plus the
/// constraint list. Immutable after parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclareModel {
    activities: Vec<String>,
    constraints: Vec<Constraint>,
}

impl DeclareModel {
    pub fn new(activities: Vec<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            activities,
            constraints,
        }
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.constraints.is_empty()
    }
}

/// A weakly connected component: activities transitively linked by shared
/// constraints, plus the constraints attributed to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub activities: Vec<String>,
    pub constraints: Vec<Constraint>,
}

impl Component {
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Occurrences per template type, for the entropy calculation.
    pub fn template_counts(&self) -> HashMap<TemplateType, usize> {
        let mut counts = HashMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.template).or_insert(0) += 1;
        }
        counts
    }
}

/// One value in the metric mapping. Serialized untagged so the persistence
/// collaborator stores plain numbers, strings, or the structured verdicts
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Consistency(ConsistencyVerdict),
    Redundancy(RedundancyVerdict),
}

/// BH2: existence of at least one trace satisfying all constraints.
/// `satisfiable` is absent when verification failed or timed out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyVerdict {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfiable: Option<bool>,
}

/// Outcome classification for BH1. `TooComplex` means the remote checker
/// never reached a terminal state within the polling budget; `TimedOut`
/// means the orchestrator's overall deadline pre-empted the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RedundancyStatus {
    None,
    Detected,
    TooComplex,
    TimedOut,
    Failed,
}

/// BH1: constraints whose removal does not change the model's language.
/// `redundant_count` is populated only for the `None`/`Detected` states and
/// is never overloaded with sentinel values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyVerdict {
    pub message: String,
    pub status: RedundancyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundant_count: Option<usize>,
}

/// Status reported by the remote command channel for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn from_remote(status: &str) -> JobStatus {
        match status {
            "Pending" => JobStatus::Pending,
            "InProgress" => JobStatus::InProgress,
            "Success" => JobStatus::Success,
            "Failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::InProgress)
    }
}

/// One observation of a remote job.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    pub status: JobStatus,
    pub output: Option<String>,
}

/// Ephemeral handle for a dispatched verification command. Never persisted;
/// discarded once the result is normalized.
#[derive(Debug, Clone)]
pub struct VerificationJob {
    pub job_id: String,
    pub model_path: String,
    pub submitted_at: DateTime<Utc>,
}

impl VerificationJob {
    pub fn new(job_id: String, model_path: String) -> Self {
        Self {
            job_id,
            model_path,
            submitted_at: Utc::now(),
        }
    }
}

/// Terminal result of one submit-and-poll round, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Succeeded { output: String },
    Failed { message: String },
    /// Polling attempts exhausted while the job was still running.
    ExhaustedAttempts,
    /// The overall deadline pre-empted the poll loop.
    TimedOut,
}
