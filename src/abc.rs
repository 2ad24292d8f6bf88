//! Cleanup and light post-processing of ABC text returned by the model.
//!
//! Nothing here parses ABC. These are line and regex substitutions that keep
//! model output safe for line-oriented ABC tooling, where a blank line ends a
//! tune.

use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

/// Spacer comment written in place of blank lines.
pub const PLACEHOLDER: &str = "%";

/// Maximum number of commentary characters copied into the analysis log line.
const ANALYSIS_LOG_CHARS: usize = 300;

const FENCE: &str = "```";

static FENCE_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:abc|musicxml|xml|json)\s+").expect("valid fence language regex")
});

static SCORE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^%%score[ \t]+(.*)$").expect("valid score regex"));

static COMPOSER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^C:.*$").expect("valid composer regex"));

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(T:.*)$").expect("valid title regex"));

static TITLE_WITH_STAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^T:(.*?)(?:[ \t]*\(Stage \d+:[^)\n]*\))?[ \t]*$").expect("valid stage regex")
});

static REFERENCE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*X:\s*[0-9]+").expect("valid X: regex"));

static TITLE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*T:").expect("valid T: regex"));

static KEY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*K:").expect("valid K: regex"));

/// Cleans raw model output into ABC text.
///
/// Strips surrounding code fences, turns every blank or whitespace-only line
/// into a `%` spacer, collapses runs of spacers into one and trims the result.
/// Applying it twice gives the same result as applying it once.
pub fn clean_output(text: &str) -> String {
    let body = strip_fences(text);

    let mut lines: Vec<&str> = Vec::new();
    for line in body.lines() {
        let line = if line.trim().is_empty() {
            PLACEHOLDER
        } else {
            line
        };

        if line == PLACEHOLDER && lines.last() == Some(&PLACEHOLDER) {
            continue;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

/// Removes code fences around non-ABC payloads (MusicXML, JSON) without
/// touching blank lines.
pub fn unfence(text: &str) -> String {
    strip_fences(text).to_string()
}

/// Strips leading and trailing fence markers until none are left.
fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    loop {
        let before = body.len();

        if let Some(rest) = body.strip_prefix(FENCE) {
            let info_end = rest.find('\n').unwrap_or(rest.len());
            let info = rest[..info_end].trim();
            body = if is_info_string(info) {
                rest[info_end..].trim()
            } else {
                let rest = rest.trim();
                match FENCE_LANGUAGE.find(rest) {
                    Some(tag) => &rest[tag.end()..],
                    None => rest,
                }
            };
        }

        if let Some(rest) = body.strip_suffix(FENCE) {
            body = rest.trim();
        }

        if body.len() == before {
            return body;
        }
    }
}

/// A fence info string is a single language word such as `abc` or `xml`.
fn is_info_string(info: &str) -> bool {
    info.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}

/// Rewrites `%%score` groupings to use square brackets.
pub fn normalize_score_directive(text: &str) -> String {
    SCORE_DIRECTIVE
        .replace_all(text, |caps: &Captures| {
            format!("%%score {}", caps[1].replace('(', "[").replace(')', "]"))
        })
        .into_owned()
}

/// Makes sure a `C:` header credits `composer`.
///
/// An existing `C:` line naming someone else is replaced. Without any `C:`
/// line, one is inserted after the first `T:` line. Text with neither header
/// is returned unchanged.
pub fn ensure_composer(text: &str, composer: &str) -> String {
    let credited = text
        .lines()
        .any(|line| line.starts_with("C:") && line.contains(composer));
    if credited {
        return text.to_string();
    }

    let header = format!("C:{}", composer);
    if COMPOSER_LINE.is_match(text) {
        return COMPOSER_LINE
            .replacen(text, 1, NoExpand(&header))
            .into_owned();
    }

    TITLE_LINE
        .replacen(text, 1, |caps: &Captures| format!("{}\n{}", &caps[1], header))
        .into_owned()
}

/// Rewrites the first `T:` line as `T:<title> <label>`, dropping any earlier
/// `(Stage N: ...)` suffix.
pub fn apply_stage_label(text: &str, label: &str) -> String {
    TITLE_WITH_STAGE
        .replacen(text, 1, |caps: &Captures| {
            format!("T:{} {}", caps[1].trim(), label)
        })
        .into_owned()
}

/// The "clean" view of a score: comment lines and blank lines removed.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('%') && !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heuristic used to treat user input as ABC instead of a prompt.
pub fn looks_like_abc(input: &str) -> bool {
    REFERENCE_HEADER.is_match(input) || (TITLE_HEADER.is_match(input) && KEY_HEADER.is_match(input))
}

/// Appends the one-line analysis summary comment to the score.
pub fn append_analysis_log(content: &str, commentary: Option<&str>, time_label: &str) -> String {
    let summary: String = commentary
        .unwrap_or_default()
        .chars()
        .take(ANALYSIS_LOG_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();

    format!("{}\n% ANALYSIS [{}]: {}...", content, time_label, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output_strips_abc_fence() {
        let raw = "```abc\nX:1\nT:Tune\nK:C\nCDEF|\n```";
        assert_eq!(clean_output(raw), "X:1\nT:Tune\nK:C\nCDEF|");
    }

    #[test]
    fn test_clean_output_strips_bare_fence() {
        let raw = "```\nX:1\nK:G\n```\n";
        assert_eq!(clean_output(raw), "X:1\nK:G");
    }

    #[test]
    fn test_clean_output_fence_is_case_insensitive() {
        let raw = "```ABC\nX:1\nK:D\n```";
        assert_eq!(clean_output(raw), "X:1\nK:D");
    }

    #[test]
    fn test_clean_output_fence_tag_on_content_line() {
        assert_eq!(clean_output("```abc X:1\nK:C\nCDEF|\n```"), "X:1\nK:C\nCDEF|");
        assert_eq!(clean_output("```ABC X:1 K:C```"), "X:1 K:C");
        assert_eq!(unfence("```xml <score-partwise/>```"), "<score-partwise/>");
    }

    #[test]
    fn test_clean_output_keeps_untagged_content_line() {
        assert_eq!(clean_output("```X:1\nK:C\n```"), "X:1\nK:C");
        assert_eq!(clean_output("```abcdef X:1```"), "abcdef X:1");
    }

    #[test]
    fn test_clean_output_replaces_blank_lines() {
        let raw = "X:1\nK:C\n\nV:1\n   \nCDEF|";
        assert_eq!(clean_output(raw), "X:1\nK:C\n%\nV:1\n%\nCDEF|");
    }

    #[test]
    fn test_clean_output_collapses_placeholder_runs() {
        for n in 1..=6 {
            let gap = vec![""; n].join("\n");
            let raw = format!("X:1\n{}\nK:C", gap);
            assert_eq!(clean_output(&raw), "X:1\n%\nK:C", "run of {} blank lines", n);

            let spacers = vec!["%"; n].join("\n");
            let raw = format!("X:1\n{}\nK:C", spacers);
            assert_eq!(clean_output(&raw), "X:1\n%\nK:C", "run of {} spacer lines", n);
        }
    }

    #[test]
    fn test_clean_output_mixed_blank_and_spacer_run() {
        let raw = "T:A\n%\n\n  \n%\nK:C";
        assert_eq!(clean_output(raw), "T:A\n%\nK:C");
    }

    #[test]
    fn test_clean_output_keeps_real_comments() {
        let raw = "T:A\n% STAGE PLANNING: C minor\n%\nK:C";
        assert_eq!(clean_output(raw), raw);
    }

    #[test]
    fn test_clean_output_handles_crlf() {
        let raw = "X:1\r\n\r\nK:C\r\n";
        assert_eq!(clean_output(raw), "X:1\n%\nK:C");
    }

    #[test]
    fn test_clean_output_empty() {
        assert_eq!(clean_output(""), "");
        assert_eq!(clean_output("  \n\n "), "");
        assert_eq!(clean_output("```abc\n```"), "");
    }

    #[test]
    fn test_clean_output_is_idempotent() {
        let samples = [
            "```abc\nX:1\n\n\nT:A\n  \nK:C\n```",
            "```abc\n```abc\nX:1\n```\n```",
            "\n\n%\n\nX:1\n%\n%\nK:C   \n\n",
            "   leading\n\t\ntrailing   ",
            "```\n\n\n```",
            "plain text with no newline",
            "%\n%\n%",
        ];
        for raw in samples {
            let once = clean_output(raw);
            assert_eq!(clean_output(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_unfence_keeps_blank_lines() {
        let raw = "```xml\n<score-partwise>\n\n</score-partwise>\n```";
        assert_eq!(unfence(raw), "<score-partwise>\n\n</score-partwise>");
        assert_eq!(unfence("<a/>"), "<a/>");
    }

    #[test]
    fn test_normalize_score_directive() {
        let text = "%%score (V1 V2) (V3 V4)\nV:1\n(3abc";
        assert_eq!(
            normalize_score_directive(text),
            "%%score [V1 V2] [V3 V4]\nV:1\n(3abc"
        );
    }

    #[test]
    fn test_normalize_score_directive_every_line() {
        let text = "%%score (A B)\nK:C\n%%score {(C D)}";
        assert_eq!(
            normalize_score_directive(text),
            "%%score [A B]\nK:C\n%%score {[C D]}"
        );
    }

    #[test]
    fn test_ensure_composer_already_credited() {
        let text = "X:1\nT:Song\nC:Trad. arr. Jane Roe\nK:C";
        assert_eq!(ensure_composer(text, "Jane Roe"), text);
    }

    #[test]
    fn test_ensure_composer_replaces_other_credit() {
        let text = "X:1\nT:Song\nC:Somebody Else\nK:C";
        assert_eq!(
            ensure_composer(text, "Jane Roe"),
            "X:1\nT:Song\nC:Jane Roe\nK:C"
        );
    }

    #[test]
    fn test_ensure_composer_inserts_after_title() {
        let text = "X:1\nT:Song\nT:Subtitle\nK:C";
        assert_eq!(
            ensure_composer(text, "Jane Roe"),
            "X:1\nT:Song\nC:Jane Roe\nT:Subtitle\nK:C"
        );
    }

    #[test]
    fn test_ensure_composer_without_headers() {
        let text = "% STAGE PLANNING: only comments";
        assert_eq!(ensure_composer(text, "Jane Roe"), text);
    }

    #[test]
    fn test_ensure_composer_name_with_dollar() {
        let text = "T:Song\nC:Other";
        assert_eq!(ensure_composer(text, "$1 Band"), "T:Song\nC:$1 Band");
    }

    #[test]
    fn test_apply_stage_label_plain_title() {
        let text = "X:1\nT:Night Music\nK:Am";
        assert_eq!(
            apply_stage_label(text, "(Stage 2: Thematic Definition)"),
            "X:1\nT:Night Music (Stage 2: Thematic Definition)\nK:Am"
        );
    }

    #[test]
    fn test_apply_stage_label_replaces_previous_stage() {
        let text = "X:1\nT:Night Music (Stage 1: Piano Sketch)  \nK:Am";
        assert_eq!(
            apply_stage_label(text, "(Stage 3: Harmonic Structure)"),
            "X:1\nT:Night Music (Stage 3: Harmonic Structure)\nK:Am"
        );
    }

    #[test]
    fn test_apply_stage_label_only_first_title() {
        let text = "T:Main\nT:Sub\nK:C";
        assert_eq!(
            apply_stage_label(text, "(Stage 10: Final Check)"),
            "T:Main (Stage 10: Final Check)\nT:Sub\nK:C"
        );
    }

    #[test]
    fn test_apply_stage_label_without_title() {
        let text = "% plan only";
        assert_eq!(apply_stage_label(text, "(Stage 0: Planning)"), text);
    }

    #[test]
    fn test_strip_comments() {
        let text = "X:1\n% STAGE: note\n%%score [V1]\n\nT:A\n   \nK:C";
        assert_eq!(strip_comments(text), "X:1\nT:A\nK:C");
    }

    #[test]
    fn test_looks_like_abc() {
        assert!(looks_like_abc("X:1\nT:Tune\nK:C"));
        assert!(looks_like_abc("  X: 12\nabc"));
        assert!(looks_like_abc("T:Tune\nM:4/4\nK:G"));
        assert!(!looks_like_abc("T:Tune only"));
        assert!(!looks_like_abc("A sad waltz for strings in D minor"));
        assert!(!looks_like_abc("X: is not a number"));
    }

    #[test]
    fn test_append_analysis_log() {
        let out = append_analysis_log("K:C\nCDEF|", Some("Bright\nand clear"), "14:05");
        assert_eq!(out, "K:C\nCDEF|\n% ANALYSIS [14:05]: Bright and clear...");
    }

    #[test]
    fn test_append_analysis_log_truncates() {
        let long = "x".repeat(500);
        let out = append_analysis_log("K:C", Some(&long), "09:00");
        let line = out.lines().last().unwrap();
        assert_eq!(line, format!("% ANALYSIS [09:00]: {}...", "x".repeat(300)));
    }

    #[test]
    fn test_append_analysis_log_without_commentary() {
        let out = append_analysis_log("K:C", None, "09:00");
        assert_eq!(out, "K:C\n% ANALYSIS [09:00]: ...");
    }
}
