use anyhow::{Result, bail};
use log::info;
use std::path::Path;

use crate::{abc, gemini::GenerateContent, model::WorkflowStage, runtime::Runtime};

use super::config::Config;
use super::{Options, finish, print_composition, read_score, studio};

/// Composes from a prompt, or through the staged workflow when `workflow`
/// names a stage range. Input that already is ABC gets analyzed instead.
#[tracing::instrument(skip(runtime, options))]
pub async fn compose<R: Runtime + 'static>(
    runtime: R,
    options: &Options,
    prompt: &str,
    workflow: Option<(WorkflowStage, WorkflowStage)>,
) -> Result<()> {
    let config = options.config(runtime)?;
    run_compose(config, options, prompt, workflow).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_compose<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    prompt: &str,
    workflow: Option<(WorkflowStage, WorkflowStage)>,
) -> Result<()> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        bail!("The prompt is empty");
    }

    let mut studio = studio(config, options);

    if abc::looks_like_abc(prompt) {
        info!("Input looks like ABC notation; analyzing it instead");
        let comp = studio.import(prompt).await?;
        print_composition(comp);
        return finish(&studio, options);
    }

    match workflow {
        Some((from, to)) => {
            let stages = WorkflowStage::range(from, to);
            if stages.is_empty() {
                bail!("Stage {} comes after stage {}", from, to);
            }
            studio.set_stage(from);
            for (i, stage) in stages.iter().enumerate() {
                if i > 0 {
                    studio.advance_stage();
                }
                info!(
                    "Running stage {}/{}: {} ({})",
                    i + 1,
                    stages.len(),
                    stage.label(),
                    stage.description()
                );
                studio.run_stage(prompt).await?;
            }
        }
        None => {
            studio.generate(prompt).await?;
            studio.save()?;
            for source in studio.sources() {
                eprintln!("Source: {}", source);
            }
        }
    }

    print_composition(studio.current()?);
    finish(&studio, options)
}

/// Imports a score file and runs a deep analysis over it.
#[tracing::instrument(skip(runtime, options))]
pub async fn analyze<R: Runtime + 'static>(runtime: R, options: &Options, path: &Path) -> Result<()> {
    let config = options.config(runtime)?;
    run_analyze(config, options, path).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_analyze<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
) -> Result<()> {
    let abc = read_score(&config.runtime, path)?;
    let mut studio = studio(config, options);

    let comp = studio.import(&abc).await?;
    if let Some(analysis) = &comp.analysis {
        eprintln!("Genre fit: {}", analysis.genre_fit);
        for suggestion in &analysis.suggestions {
            eprintln!("Suggestion: {}", suggestion);
        }
    }
    print_composition(comp);
    finish(&studio, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_utils::{config, file_names};
    use crate::gemini::{Generated, MockGenerateContent};
    use crate::model::EditKind;

    const ANALYSIS_JSON: &str = r#"{"musicalAttributes": {"complexity": 0.3}, "genreFit": "Reel", "suggestions": ["Vary the B part"]}"#;

    #[tokio::test]
    async fn test_run_compose_generates_and_saves() {
        let mut gemini = MockGenerateContent::new();
        gemini
            .expect_generate()
            .withf(|req| req.google_search)
            .times(1)
            .returning(|_| Ok(Generated::text("X:1\nT:Reel\nK:D\n|:DFA:|")));
        let (config, written) = config(gemini, vec![]);
        let options = Options {
            library: true,
            ..Default::default()
        };

        run_compose(config, &options, "a lively reel", None).await.unwrap();

        assert_eq!(
            file_names(&written),
            vec![
                "a_lively_reel_v1_CREATION.txt",
                "Opus_Infinite_Full_Library_Export.md"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_compose_workflow_range() {
        let mut gemini = MockGenerateContent::new();
        gemini
            .expect_generate()
            .withf(|req| req.temperature == Some(0.5))
            .times(3)
            .returning(|_| Ok(Generated::text("X:1\nT:Suite\nK:G")));
        let (config, written) = config(gemini, vec![]);

        run_compose(
            config,
            &Options::default(),
            "a pastoral suite",
            Some((WorkflowStage::Planning, WorkflowStage::Motif)),
        )
        .await
        .unwrap();

        assert_eq!(
            file_names(&written),
            vec![
                "a_pastoral_suite_v1_WORKFLOW-STAGE.txt",
                "a_pastoral_suite_v2_WORKFLOW-STAGE.txt",
                "a_pastoral_suite_v3_WORKFLOW-STAGE.txt",
            ]
        );
        let last = &written.lock().unwrap()[2].1;
        assert!(last.contains("PROCESS: WORKFLOW_STAGE - Completed Stage: Themes"));
        assert!(last.contains("T:Suite (Stage 2: Thematic Definition)"));
    }

    #[tokio::test]
    async fn test_run_compose_rejects_reversed_range() {
        let (config, _) = config(MockGenerateContent::new(), vec![]);
        let err = run_compose(
            config,
            &Options::default(),
            "a suite",
            Some((WorkflowStage::Form, WorkflowStage::Motif)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Stage FORM comes after stage MOTIF");
    }

    #[tokio::test]
    async fn test_run_compose_treats_abc_as_import() {
        let mut gemini = MockGenerateContent::new();
        gemini
            .expect_generate()
            .withf(|req| req.response_mime_type.is_some())
            .times(1)
            .returning(|_| Ok(Generated::text(ANALYSIS_JSON)));
        let (config, written) = config(gemini, vec![]);

        run_compose(config, &Options::default(), "X:1\nT:Reel\nK:D\nDFA|", None)
            .await
            .unwrap();

        assert_eq!(
            file_names(&written),
            vec!["Imported_Analysis_v2_ANALYSIS_ANALYZED.txt"]
        );
    }

    #[tokio::test]
    async fn test_run_compose_empty_prompt() {
        let (config, _) = config(MockGenerateContent::new(), vec![]);
        assert!(run_compose(config, &Options::default(), "   ", None).await.is_err());
    }

    #[tokio::test]
    async fn test_run_analyze_reads_file() {
        let mut gemini = MockGenerateContent::new();
        gemini
            .expect_generate()
            .withf(|req| req.contents == "Analyze this ABC notation:\nX:1\nK:D")
            .times(1)
            .returning(|_| Ok(Generated::text(ANALYSIS_JSON)));
        let (config, written) = config(gemini, vec![("/in/reel.abc", "X:1\nK:D")]);

        run_analyze(config, &Options::default(), Path::new("/in/reel.abc"))
            .await
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].1.contains(&format!("PROCESS: {} - Performed Deep Analysis", EditKind::Analysis)));
        assert!(written[0].1.contains("\"genreFit\": \"Reel\""));
    }
}
