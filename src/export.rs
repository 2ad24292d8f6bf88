//! File names and contents of everything written to the output directory.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::Composition;

pub const LIBRARY_FILE_NAME: &str = "Opus_Infinite_Full_Library_Export.md";

/// Snapshot file names keep at most this many title characters.
const SNAPSHOT_TITLE_CHARS: usize = 40;

const RULE: &str = "==================================================";

/// A file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub contents: String,
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn slug(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn commentary_file_name(title: &str) -> String {
    format!("{}_Commentary.md", slug(title))
}

pub fn music_xml_file_name(title: &str) -> String {
    format!("{}.musicxml", slug(title).to_lowercase())
}

/// `<title>_v<N>_<KIND>[_ANALYZED].txt`, where N is the number of history
/// events and KIND the latest event's kind with dashes.
pub fn snapshot_file_name(comp: &Composition) -> String {
    let title: String = slug(&comp.title).chars().take(SNAPSHOT_TITLE_CHARS).collect();
    let process = comp
        .last_event()
        .map(|event| event.kind.as_str().replace('_', "-"))
        .unwrap_or_default();
    let analyzed = if comp.analysis.is_some() { "_ANALYZED" } else { "" };

    format!(
        "{}_v{}_{}{}.txt",
        title,
        comp.history().len(),
        process,
        analyzed
    )
}

/// Versioned plain-text snapshot: metadata block, optional analysis JSON,
/// then the score.
pub fn snapshot(comp: &Composition, now: DateTime<Utc>) -> anyhow::Result<Export> {
    let version = comp.history().len();
    let process = comp
        .last_event()
        .map(|event| format!("{} - {}", event.kind, event.description))
        .unwrap_or_default();

    let mut contents = String::new();
    contents.push_str("METADATA\n");
    contents.push_str(&format!("TITLE: {}\n", comp.title));
    contents.push_str(&format!("VERSION: v{}\n", version));
    contents.push_str(&format!(
        "TIMESTAMP: {}\n",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    contents.push_str(&format!("PROCESS: {}\n", process));
    contents.push_str(&format!("PROMPT: {}\n", comp.prompt));
    contents.push_str(RULE);
    contents.push_str("\n\n");

    if let Some(analysis) = &comp.analysis {
        contents.push_str("[ANALYSIS DATA]\n");
        contents.push_str(&serde_json::to_string_pretty(analysis)?);
        contents.push_str("\n\n");
        contents.push_str(RULE);
        contents.push_str("\n\n");
    }

    contents.push_str("[ABC NOTATION]\n");
    contents.push_str(&comp.content);

    Ok(Export {
        file_name: snapshot_file_name(comp),
        contents,
    })
}

/// The whole library as one Markdown report.
pub fn library_markdown(compositions: &[Composition], now: DateTime<Utc>) -> Export {
    let mut out = String::new();
    out.push_str("# OPUS INFINITE LIBRARY EXPORT\n");
    out.push_str(&format!("Generated: {}\n", format_date_time(now)));
    out.push_str(&format!("Total Compositions: {}\n\n", compositions.len()));
    out.push_str("---\n\n");

    for (index, comp) in compositions.iter().enumerate() {
        out.push_str(&format!("# {}. {}\n", index + 1, comp.title));
        out.push_str(&format!("**Date:** {}\n", format_date_time(comp.created_at)));
        out.push_str(&format!("**Prompt:** {}\n\n", comp.prompt));

        match &comp.full_report {
            Some(report) => {
                out.push_str("## FULL COMPOSITION COMMENTARY & ANALYSIS\n");
                out.push_str(&format!("{}\n\n", report));
            }
            None => out.push_str("*No detailed commentary generated for this piece.*\n\n"),
        }

        out.push_str("## ABC NOTATION SOURCE\n");
        out.push_str(&format!("```abc\n{}\n```\n\n", comp.content));

        out.push_str("## EDIT HISTORY (AUDIT LOG)\n");
        if comp.history().is_empty() {
            out.push_str("No history available.\n");
        }
        for event in comp.history() {
            out.push_str(&format!(
                "- [{}] **{}**: {}\n",
                event.timestamp.format("%H:%M:%S"),
                event.kind,
                event.description
            ));
        }

        out.push_str("\n---\n\n");
    }

    Export {
        file_name: LIBRARY_FILE_NAME.to_string(),
        contents: out,
    }
}

fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
