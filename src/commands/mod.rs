//! Entry points behind each CLI subcommand.
//!
//! Every command has a thin public function that builds a [`Config`] from the
//! real environment and a `run_*` counterpart that takes the config, so the
//! flow can be tested against mocks.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::{
    composer::Composer,
    dictionary::Dictionary,
    gemini::GenerateContent,
    model::{Composition, WorkflowStage},
    prompts,
    runtime::Runtime,
    studio::Studio,
};

pub mod config;
mod compose;
mod edit;
mod publish;

pub use compose::{analyze, compose, run_analyze, run_compose};
pub use edit::{Revision, edit, orchestrate, run_edit, run_orchestrate};
pub use publish::{music_xml, report, run_music_xml, run_report};

use config::Config;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub out_dir: Option<PathBuf>,
    /// Overrides the composer credited in workflow scores.
    pub composer: Option<String>,
    /// Export the library Markdown when the command finishes.
    pub library: bool,
}

impl Options {
    fn config<R: Runtime>(&self, runtime: R) -> Result<Config<R, crate::gemini::GeminiClient>> {
        Config::new(
            runtime,
            self.api_url.clone(),
            self.model.clone(),
            self.out_dir.clone(),
        )
    }
}

fn studio<R: Runtime, G: GenerateContent>(config: Config<R, G>, options: &Options) -> Studio<G, R> {
    let mut composer = Composer::new(config.gemini);
    if let Some(name) = &options.composer {
        composer = composer.with_composer(name.as_str());
    }
    Studio::new(composer, config.runtime, config.out_dir)
}

/// Reads a score file through the runtime.
fn read_score<R: Runtime>(runtime: &R, path: &Path) -> Result<String> {
    let abc = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to read score {}", path.display()))?;
    if abc.trim().is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(abc)
}

/// Title for a score loaded from `path`: the file name without extension.
fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Reads `path` and makes it the session's current composition.
fn open_score<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
) -> Result<Studio<G, R>> {
    let abc = read_score(&config.runtime, path)?;
    let mut studio = studio(config, options);
    studio.open(&abc, &title_from_path(path));
    Ok(studio)
}

fn print_composition(comp: &Composition) {
    println!("{}", comp.content);
}

/// Writes the library report when requested.
fn finish<R: Runtime, G: GenerateContent>(studio: &Studio<G, R>, options: &Options) -> Result<()> {
    if options.library && !studio.library().is_empty() {
        let path = studio.export_library()?;
        info!("Exported {} compositions", studio.library().len());
        eprintln!("Library written to {}", path.display());
    }
    Ok(())
}

/// Lists the workflow stages in order.
pub fn stages() {
    for stage in WorkflowStage::ALL {
        println!(
            "{:>2}  {:<12} {:<10} {}",
            stage.index(),
            stage.id(),
            stage.label(),
            stage.description()
        );
    }
}

/// Prints the ABC+ command dictionary, as Markdown or as JSON tables.
pub fn spec(json: bool) -> Result<()> {
    if !json {
        println!("{}", prompts::ABC_PLUS_DICTIONARY);
        return Ok(());
    }

    let dictionary = Dictionary::parse(prompts::ABC_PLUS_DICTIONARY);
    info!("Exporting {} ABC+ commands", dictionary.len());
    let text = serde_json::to_string_pretty(&dictionary)
        .context("Failed to serialize the ABC+ dictionary")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::gemini::MockGenerateContent;
    use crate::runtime::MockRuntime;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    pub type Written = Arc<Mutex<Vec<(PathBuf, String)>>>;

    /// A config over mocks whose runtime reads `files` and records writes.
    pub fn config(
        gemini: MockGenerateContent,
        files: Vec<(&'static str, &'static str)>,
    ) -> (Config<MockRuntime, MockGenerateContent>, Written) {
        let written: Written = Arc::default();
        let sink = written.clone();

        let mut runtime = MockRuntime::new();
        runtime
            .expect_now()
            .returning(|| Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime.expect_write().returning(move |path, contents| {
            sink.lock()
                .unwrap()
                .push((path.to_path_buf(), String::from_utf8_lossy(contents).into_owned()));
            Ok(())
        });
        runtime.expect_read_to_string().returning(move |path| {
            files
                .iter()
                .find(|(name, _)| Path::new(name) == path)
                .map(|(_, contents)| contents.to_string())
                .ok_or_else(|| anyhow::anyhow!("No such file: {}", path.display()))
        });

        let config = Config {
            runtime,
            gemini,
            out_dir: PathBuf::from("/out"),
        };
        (config, written)
    }

    pub fn file_names(written: &Written) -> Vec<String> {
        written
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}
