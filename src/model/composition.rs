use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::analysis::AnalysisData;

/// Number of prompt characters used for a generated title.
const TITLE_CHARS: usize = 30;

/// What kind of change an edit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditKind {
    Creation,
    Refinement,
    Extension,
    Fix,
    Rectification,
    Orchestration,
    Analysis,
    WorkflowStage,
    Import,
    Variation,
    Annotation,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditKind::Creation => "CREATION",
            EditKind::Refinement => "REFINEMENT",
            EditKind::Extension => "EXTENSION",
            EditKind::Fix => "FIX",
            EditKind::Rectification => "RECTIFICATION",
            EditKind::Orchestration => "ORCHESTRATION",
            EditKind::Analysis => "ANALYSIS",
            EditKind::WorkflowStage => "WORKFLOW_STAGE",
            EditKind::Import => "IMPORT",
            EditKind::Variation => "VARIATION",
            EditKind::Annotation => "ANNOTATION",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a composition's audit trail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EditKind,
    pub description: String,
    /// e.g. "Rev 3", "Stage 0", "Import"
    pub version_label: String,
    /// Content right after the edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

impl EditEvent {
    pub fn new(
        kind: EditKind,
        description: impl Into<String>,
        version_label: impl Into<String>,
        snapshot: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        EditEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: now,
            kind,
            description: description.into(),
            version_label: version_label.into(),
            snapshot,
        }
    }
}

/// A piece of music being worked on, with its full edit history.
///
/// The history is append-only: events can be recorded but never removed or
/// rewritten, so it is only reachable through [`Composition::history`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: String,
    pub title: String,
    pub prompt: String,
    /// ABC notation.
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisData>,
    #[serde(default)]
    pub is_analyzed: bool,
    /// Markdown musicology commentary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_report: Option<String>,
    edit_history: Vec<EditEvent>,
}

impl Composition {
    /// Starts a composition whose history opens with `first`.
    pub fn start(
        title: impl Into<String>,
        prompt: impl Into<String>,
        content: impl Into<String>,
        first: EditEvent,
    ) -> Self {
        Composition {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            prompt: prompt.into(),
            content: content.into(),
            created_at: first.timestamp,
            analysis: None,
            is_analyzed: false,
            full_report: None,
            edit_history: vec![first],
        }
    }

    pub fn history(&self) -> &[EditEvent] {
        &self.edit_history
    }

    pub fn last_event(&self) -> Option<&EditEvent> {
        self.edit_history.last()
    }

    /// Label for the next recorded event.
    pub fn next_version_label(&self) -> String {
        format!("Rev {}", self.edit_history.len() + 1)
    }

    /// Replaces the content and records the change with a snapshot.
    ///
    /// Any earlier analysis described the old content and is dropped.
    pub fn revise(
        &mut self,
        kind: EditKind,
        description: impl Into<String>,
        content: String,
        now: DateTime<Utc>,
    ) -> &EditEvent {
        let event = EditEvent::new(
            kind,
            description,
            self.next_version_label(),
            Some(content.clone()),
            now,
        );
        self.content = content;
        self.analysis = None;
        self.is_analyzed = false;
        self.edit_history.push(event);
        &self.edit_history[self.edit_history.len() - 1]
    }

    /// Attaches an analysis and records it; the content gains the summary log.
    pub fn record_analysis(
        &mut self,
        analysis: AnalysisData,
        description: impl Into<String>,
        content: String,
        now: DateTime<Utc>,
    ) -> &EditEvent {
        self.revise(EditKind::Analysis, description, content, now);
        self.analysis = Some(analysis);
        self.is_analyzed = true;
        &self.edit_history[self.edit_history.len() - 1]
    }
}

/// Title derived from a free-text prompt.
pub fn title_from_prompt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
