use anyhow::Result;
use std::path::Path;

use crate::{gemini::GenerateContent, runtime::Runtime};

use super::config::Config;
use super::{Options, finish, open_score, read_score, studio};

/// Converts a score file to MusicXML.
#[tracing::instrument(skip(runtime, options))]
pub async fn music_xml<R: Runtime + 'static>(runtime: R, options: &Options, path: &Path) -> Result<()> {
    let config = options.config(runtime)?;
    run_music_xml(config, options, path).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_music_xml<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
) -> Result<()> {
    let mut studio = open_score(config, options, path)?;
    let written = studio.export_music_xml().await?;
    println!("{}", written.display());
    finish(&studio, options)
}

/// Writes a musicology commentary for a score file.
#[tracing::instrument(skip(runtime, options))]
pub async fn report<R: Runtime + 'static>(
    runtime: R,
    options: &Options,
    path: &Path,
    title: Option<&str>,
) -> Result<()> {
    let config = options.config(runtime)?;
    run_report(config, options, path, title).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run_report<R: Runtime, G: GenerateContent>(
    config: Config<R, G>,
    options: &Options,
    path: &Path,
    title: Option<&str>,
) -> Result<()> {
    let mut studio = match title {
        Some(title) => {
            let abc = read_score(&config.runtime, path)?;
            let mut studio = studio(config, options);
            studio.open(&abc, title);
            studio
        }
        None => open_score(config, options, path)?,
    };
    studio.save()?;

    let id = studio.current()?.id.clone();
    studio.generate_report(&id).await?;
    let written = studio.export_commentary(&id)?;
    println!("{}", written.display());
    finish(&studio, options)
}
