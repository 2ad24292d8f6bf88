use anyhow::Result;
use std::path::Path;

use crate::{gemini::GenerateContent, runtime::Runtime, studio::EditAction};

use super::config::Config;
use super::{Options, finish, open_score, print_composition};

/// How a score should be revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Action(EditAction),
    /// Fix an issue described in free text.
    Custom(String),
    /// Apply an instruction taken from an analysis.
    Expert(String),
}

#[tracing::instrument(skip(runtime, options))]
pub async fn edit<R: Runtime + 'static>(
    runtime: R,
    options: &Options,
    path: &Path,
    revision: Revision,
) -> Result<()> {
    let config = options.config(runtime)?;
    run_edit(config, options, path, revision).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_edit<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
    revision: Revision,
) -> Result<()> {
    let mut studio = open_score(config, options, path)?;

    let comp = match &revision {
        Revision::Action(action) => studio.apply(*action).await?,
        Revision::Custom(issue) => studio.custom_fix(issue).await?,
        Revision::Expert(instruction) => studio.expert_apply(instruction).await?,
    };
    print_composition(comp);
    finish(&studio, options)
}

#[tracing::instrument(skip(runtime, options))]
pub async fn orchestrate<R: Runtime + 'static>(
    runtime: R,
    options: &Options,
    path: &Path,
    instruments: &str,
) -> Result<()> {
    let config = options.config(runtime)?;
    run_orchestrate(config, options, path, instruments).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_orchestrate<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
    instruments: &str,
) -> Result<()> {
    let mut studio = open_score(config, options, path)?;
    let comp = studio.add_instruments(instruments).await?;
    print_composition(comp);
    finish(&studio, options)
}
