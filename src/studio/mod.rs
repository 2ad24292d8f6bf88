//! One composing session: the score being worked on, its workflow position,
//! status and the library of saved pieces.
//!
//! Every action that changes the score records an edit event and writes a
//! versioned snapshot into the output directory. All actions except plain
//! generation also save the composition into the library.

mod status;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::abc;
use crate::composer::Composer;
use crate::export::{self, Export};
use crate::gemini::GenerateContent;
use crate::library::Library;
use crate::model::{Composition, EditEvent, EditKind, WorkflowStage, title_from_prompt};
use crate::prompts;
use crate::runtime::Runtime;

pub use status::{ERROR_DISPLAY, Status, StatusTracker};

/// Title given to scores pasted in for analysis.
pub const IMPORTED_TITLE: &str = "Imported Analysis";

const IMPORTED_PROMPT: &str = "Imported ABC Notation";

/// Workflow compositions take this many prompt characters as their title.
const WORKFLOW_TITLE_CHARS: usize = 30;

/// Characters of an expert instruction quoted in the history.
const EXPERT_SUMMARY_CHARS: usize = 50;

/// One-click revisions of the current score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EditAction {
    Upgrade,
    Fix,
    Extend,
    Variation,
    Annotate,
    Rectify,
}

impl EditAction {
    pub fn kind(self) -> EditKind {
        match self {
            EditAction::Upgrade => EditKind::Refinement,
            EditAction::Fix => EditKind::Fix,
            EditAction::Extend => EditKind::Extension,
            EditAction::Variation => EditKind::Variation,
            EditAction::Annotate => EditKind::Annotation,
            EditAction::Rectify => EditKind::Rectification,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            EditAction::Upgrade => prompts::UPGRADE_INSTRUCTION,
            EditAction::Fix => prompts::FIX_INSTRUCTION,
            EditAction::Extend => prompts::EXTEND_INSTRUCTION,
            EditAction::Variation => prompts::VARIATION_INSTRUCTION,
            EditAction::Annotate => prompts::ANNOTATE_INSTRUCTION,
            EditAction::Rectify => prompts::RECTIFY_INSTRUCTION,
        }
    }

    /// History description for the event the action records.
    pub fn description(self) -> &'static str {
        match self {
            EditAction::Upgrade => "Applied Iterative Upgrade",
            EditAction::Fix => "Fixed rhythm/syntax errors",
            EditAction::Extend => "Extended composition (Section B/Variation)",
            EditAction::Variation => "Created Thematic Variation",
            EditAction::Annotate => "Generated Full Educational Study Score",
            EditAction::Rectify => "Rigorous Instrument Range Rectification",
        }
    }
}

pub struct Studio<G: GenerateContent, R: Runtime> {
    composer: Composer<G>,
    runtime: R,
    out_dir: PathBuf,
    composition: Option<Composition>,
    stage: WorkflowStage,
    status: StatusTracker,
    library: Library,
    sources: Vec<String>,
}

impl<G: GenerateContent, R: Runtime> Studio<G, R> {
    pub fn new(composer: Composer<G>, runtime: R, out_dir: PathBuf) -> Self {
        Self {
            composer,
            runtime,
            out_dir,
            composition: None,
            stage: WorkflowStage::default(),
            status: StatusTracker::default(),
            library: Library::new(),
            sources: Vec::new(),
        }
    }

    pub fn current(&self) -> Result<&Composition> {
        self.composition.as_ref().context("No composition loaded")
    }

    fn current_mut(&mut self) -> Result<&mut Composition> {
        self.composition.as_mut().context("No composition loaded")
    }

    /// The current score without comment or blank lines.
    pub fn clean_view(&self) -> Result<String> {
        Ok(abc::strip_comments(&self.current()?.content))
    }

    pub fn status(&self) -> Status {
        self.status.current()
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: WorkflowStage) {
        self.stage = stage;
    }

    /// Moves to the next workflow stage. Returns `false` at the last stage.
    pub fn advance_stage(&mut self) -> bool {
        match self.stage.next() {
            Some(next) => {
                debug!("Advancing workflow from {} to {}", self.stage, next);
                self.stage = next;
                true
            }
            None => false,
        }
    }

    /// Web pages that grounded the last generation.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Composer credited in workflow scores.
    pub fn composer(&self) -> &str {
        self.composer.composer()
    }

    /// Composes a new piece from `prompt`. It is not saved to the library.
    #[tracing::instrument(skip(self))]
    pub async fn generate(&mut self, prompt: &str) -> Result<&Composition> {
        self.status.begin(Status::Generating);
        let result = self.create(prompt).await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    async fn create(&mut self, prompt: &str) -> Result<()> {
        self.sources.clear();
        let generated = self.composer.generate_composition(prompt).await?;

        let first = EditEvent::new(
            EditKind::Creation,
            format!("Initial Generation: {}", prompt),
            "Rev 1",
            Some(generated.text.clone()),
            self.runtime.now(),
        );
        let comp = Composition::start(title_from_prompt(prompt), prompt, generated.text, first);
        info!("Created composition {} ({})", comp.id, comp.title);

        self.composition = Some(comp);
        self.sources = generated.sources;
        self.write_snapshot()?;
        Ok(())
    }

    /// Runs the current workflow stage over the current score, starting a
    /// new composition when there is none.
    #[tracing::instrument(skip(self))]
    pub async fn run_stage(&mut self, prompt: &str) -> Result<&Composition> {
        self.status.begin(Status::Generating);
        let result = self.workflow_step(prompt).await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    async fn workflow_step(&mut self, prompt: &str) -> Result<()> {
        let stage = self.stage;
        let content = self
            .composition
            .as_ref()
            .map(|comp| comp.content.clone())
            .unwrap_or_default();

        let text = self
            .composer
            .execute_workflow_stage(stage, &content, prompt)
            .await?;
        let now = self.runtime.now();

        match self.composition.as_mut() {
            Some(comp) => {
                comp.prompt = prompt.to_string();
                comp.revise(
                    EditKind::WorkflowStage,
                    format!("Completed Stage: {}", stage.label()),
                    text,
                    now,
                );
            }
            None => {
                let first = EditEvent::new(
                    EditKind::WorkflowStage,
                    format!("Started Workflow at {}: {}", stage.label(), prompt),
                    "Stage 0",
                    Some(text.clone()),
                    now,
                );
                let title: String = prompt.chars().take(WORKFLOW_TITLE_CHARS).collect();
                self.composition = Some(Composition::start(title, prompt, text, first));
            }
        }

        self.commit()
    }

    /// Loads an existing score as the current composition without calling
    /// the model.
    pub fn open(&mut self, abc: &str, title: &str) -> &Composition {
        let first = EditEvent::new(
            EditKind::Import,
            IMPORTED_PROMPT,
            "Import",
            Some(abc.to_string()),
            self.runtime.now(),
        );
        self.sources.clear();
        self.composition.insert(Composition::start(title, IMPORTED_PROMPT, abc, first))
    }

    /// Loads a pasted score and runs a deep analysis over it.
    #[tracing::instrument(skip(self, abc))]
    pub async fn import(&mut self, abc: &str) -> Result<&Composition> {
        self.open(abc, IMPORTED_TITLE);
        self.status.begin(Status::Analyzing);
        let result = self.analysis_step("Performed Deep Analysis").await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    #[tracing::instrument(skip(self))]
    pub async fn analyze(&mut self) -> Result<&Composition> {
        self.status.begin(Status::Analyzing);
        let result = self.analysis_step("Re-analyzed composition").await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    async fn analysis_step(&mut self, description: &str) -> Result<()> {
        let content = self.current()?.content.clone();
        let analysis = self.composer.analyze_composition(&content).await?;

        let now = self.runtime.now();
        let logged = abc::append_analysis_log(
            &content,
            analysis.expert_commentary(),
            &now.format("%H:%M").to_string(),
        );
        self.current_mut()?
            .record_analysis(analysis, description, logged, now);

        self.commit()
    }

    #[tracing::instrument(skip(self))]
    pub async fn apply(&mut self, action: EditAction) -> Result<&Composition> {
        self.revise(action.kind(), action.instruction(), action.description().to_string())
            .await
    }

    /// Fixes an issue described by the user in their own words.
    #[tracing::instrument(skip(self))]
    pub async fn custom_fix(&mut self, issue: &str) -> Result<&Composition> {
        let issue = issue.trim();
        if issue.is_empty() {
            return self.reject(anyhow!("Describe the issue to fix"));
        }
        self.revise(EditKind::Fix, issue, format!("User Reported Issue: {}", issue))
            .await
    }

    /// Applies a fix suggested by the analysis.
    #[tracing::instrument(skip(self))]
    pub async fn expert_apply(&mut self, instruction: &str) -> Result<&Composition> {
        let summary: String = instruction.chars().take(EXPERT_SUMMARY_CHARS).collect();
        self.revise(
            EditKind::Rectification,
            instruction,
            format!("Applied Expert Fix: {}...", summary),
        )
        .await
    }

    async fn revise(
        &mut self,
        kind: EditKind,
        instruction: &str,
        description: String,
    ) -> Result<&Composition> {
        self.status.begin(Status::Generating);
        let result = async {
            let (content, prompt) = self.score_and_prompt()?;
            let text = self
                .composer
                .enhance_composition(&content, instruction, &prompt)
                .await?;
            self.record(kind, description, text)
        }
        .await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_instruments(&mut self, instruments: &str) -> Result<&Composition> {
        let instruments = instruments.trim();
        if instruments.is_empty() {
            return self.reject(anyhow!("Name at least one instrument to add"));
        }

        self.status.begin(Status::Generating);
        let result = async {
            let (content, prompt) = self.score_and_prompt()?;
            let text = self
                .composer
                .add_instruments(&content, instruments, &prompt)
                .await?;
            self.record(
                EditKind::Orchestration,
                format!("Added Instruments: {}", instruments),
                text,
            )
        }
        .await;
        self.status.finish(&result);
        result?;
        self.current()
    }

    fn score_and_prompt(&self) -> Result<(String, String)> {
        let comp = self.current()?;
        Ok((comp.content.clone(), comp.prompt.clone()))
    }

    /// Fails an action before it starts, leaving the session in `Error`.
    fn reject<T>(&mut self, err: anyhow::Error) -> Result<T> {
        let result: Result<T> = Err(err);
        self.status.finish(&result);
        result
    }

    fn record(&mut self, kind: EditKind, description: String, text: String) -> Result<()> {
        let now = self.runtime.now();
        let event = self.current_mut()?.revise(kind, description, text, now);
        info!("Recorded {} as {}", event.kind, event.version_label);
        self.commit()
    }

    /// Saves the current composition and writes its snapshot.
    fn commit(&mut self) -> Result<()> {
        self.save()?;
        self.write_snapshot()?;
        Ok(())
    }

    /// Saves the current composition into the library.
    pub fn save(&mut self) -> Result<()> {
        let comp = self.current()?.clone();
        self.library.save(comp);
        Ok(())
    }

    /// Asks the model for a commentary on a saved composition.
    #[tracing::instrument(skip(self))]
    pub async fn generate_report(&mut self, id: &str) -> Result<&Composition> {
        let comp = self
            .library
            .get(id)
            .with_context(|| format!("Composition {} is not in the library", id))?;
        let report = self
            .composer
            .generate_report(&comp.content, &comp.title)
            .await?;

        if let Some(current) = self.composition.as_mut().filter(|c| c.id == id) {
            current.full_report = Some(report.clone());
        }
        self.library.attach_report(id, report)
    }

    /// Writes the commentary of a saved composition as Markdown.
    pub fn export_commentary(&self, id: &str) -> Result<PathBuf> {
        let comp = self
            .library
            .get(id)
            .with_context(|| format!("Composition {} is not in the library", id))?;
        let report = comp
            .full_report
            .as_ref()
            .with_context(|| format!("No commentary generated for {}", comp.title))?;
        self.write_export(&Export {
            file_name: export::commentary_file_name(&comp.title),
            contents: report.clone(),
        })
    }

    /// Converts the current score to MusicXML and writes it.
    #[tracing::instrument(skip(self))]
    pub async fn export_music_xml(&mut self) -> Result<PathBuf> {
        self.status.begin(Status::Generating);
        let result = async {
            let (content, title) = {
                let comp = self.current()?;
                (comp.content.clone(), comp.title.clone())
            };
            let xml = self.composer.convert_to_music_xml(&content).await?;
            Ok::<_, anyhow::Error>((title, xml))
        }
        .await;
        self.status.finish(&result);

        let (title, xml) = result?;
        self.write_export(&Export {
            file_name: export::music_xml_file_name(&title),
            contents: xml,
        })
    }

    /// Writes the whole library as one Markdown report.
    pub fn export_library(&self) -> Result<PathBuf> {
        if self.library.is_empty() {
            bail!("The library is empty");
        }
        let export = export::library_markdown(self.library.compositions(), self.runtime.now());
        self.write_export(&export)
    }

    fn write_snapshot(&self) -> Result<PathBuf> {
        let export = export::snapshot(self.current()?, self.runtime.now())?;
        self.write_export(&export)
    }

    fn write_export(&self, export: &Export) -> Result<PathBuf> {
        self.runtime.create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(&export.file_name);
        self.runtime
            .write(&path, export.contents.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}
