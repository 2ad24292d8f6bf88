use anyhow::Result;
use clap::Parser;
use opus::commands::{self, Options, Revision};
use opus::model::WorkflowStage;
use opus::studio::EditAction;
use std::path::PathBuf;

/// opus - AI music composer
///
/// Compose, analyze and revise music in ABC notation with Gemini.
///
/// The API key is read from GEMINI_API_KEY, or API_KEY when that is unset.
/// Every change to a score writes a versioned snapshot into the output
/// directory.
///
/// Examples:
///   opus compose "A melancholic waltz for solo cello"
///   opus compose --workflow --to form "A pastoral suite for winds"
///   opus edit tune.abc variation
#[derive(Parser, Debug)]
#[command(author, version = env!("OPUS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory exports are written to (defaults to the download directory)
    #[arg(
        long = "out",
        short = 'o',
        env = "OPUS_OUT_DIR",
        value_name = "PATH",
        global = true
    )]
    pub out_dir: Option<PathBuf>,

    /// Gemini API URL (defaults to https://generativelanguage.googleapis.com)
    #[arg(long = "api-url", env = "OPUS_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Model used for every call (defaults to gemini-3-pro-preview)
    #[arg(long, env = "OPUS_MODEL", value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Composer credited in workflow scores
    #[arg(long, env = "OPUS_COMPOSER", value_name = "NAME", global = true)]
    pub composer: Option<String>,

    /// Also export the whole library as Markdown
    #[arg(long, global = true)]
    pub library: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compose a new piece from a prompt
    Compose(ComposeArgs),

    /// Analyze an ABC score
    Analyze(FileArgs),

    /// Revise an ABC score
    Edit(EditArgs),

    /// Add instruments to an ABC score
    Orchestrate(OrchestrateArgs),

    /// Convert an ABC score to MusicXML
    #[command(name = "musicxml")]
    MusicXml(FileArgs),

    /// Write a musicology commentary for an ABC score
    Report(ReportArgs),

    /// List the workflow stages
    Stages,

    /// Print the ABC+ command dictionary
    Spec(SpecArgs),
}

#[derive(clap::Args, Debug)]
pub struct ComposeArgs {
    /// What to compose; ABC notation is analyzed instead
    #[arg(value_name = "PROMPT")]
    pub prompt: String,

    /// Run the staged workflow instead of a single generation
    #[arg(long)]
    pub workflow: bool,

    /// First workflow stage
    #[arg(long, value_name = "STAGE", default_value = "planning", requires = "workflow")]
    pub from: WorkflowStage,

    /// Last workflow stage
    #[arg(long, value_name = "STAGE", default_value = "final-check", requires = "workflow")]
    pub to: WorkflowStage,
}

#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// ABC score file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// ABC score file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Revision to apply
    #[arg(value_enum, required_unless_present_any = ["instruction", "expert"])]
    pub action: Option<EditAction>,

    /// Fix an issue described in your own words
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["action", "expert"])]
    pub instruction: Option<String>,

    /// Apply an expert recommendation from an analysis
    #[arg(long, value_name = "TEXT", conflicts_with = "action")]
    pub expert: Option<String>,
}

impl EditArgs {
    fn revision(self) -> Option<Revision> {
        match (self.action, self.instruction, self.expert) {
            (Some(action), _, _) => Some(Revision::Action(action)),
            (None, Some(text), _) => Some(Revision::Custom(text)),
            (None, None, Some(text)) => Some(Revision::Expert(text)),
            (None, None, None) => None,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct OrchestrateArgs {
    /// ABC score file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Instruments to add, e.g. "Harp, Celesta"
    #[arg(long, short = 'i', value_name = "TEXT")]
    pub instruments: String,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// ABC score file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Title used in the commentary (defaults to the file name)
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SpecArgs {
    /// Print the tables as JSON keyed by section
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = opus::runtime::RealRuntime;
    let options = Options {
        api_url: cli.api_url,
        model: cli.model,
        out_dir: cli.out_dir,
        composer: cli.composer,
        library: cli.library,
    };

    match cli.command {
        Commands::Compose(args) => {
            let workflow = args.workflow.then_some((args.from, args.to));
            commands::compose(runtime, &options, &args.prompt, workflow).await?
        }
        Commands::Analyze(args) => commands::analyze(runtime, &options, &args.file).await?,
        Commands::Edit(args) => {
            let file = args.file.clone();
            match args.revision() {
                Some(revision) => commands::edit(runtime, &options, &file, revision).await?,
                None => anyhow::bail!("Choose an action, --instruction or --expert"),
            }
        }
        Commands::Orchestrate(args) => {
            commands::orchestrate(runtime, &options, &args.file, &args.instruments).await?
        }
        Commands::MusicXml(args) => commands::music_xml(runtime, &options, &args.file).await?,
        Commands::Report(args) => {
            commands::report(runtime, &options, &args.file, args.title.as_deref()).await?
        }
        Commands::Stages => commands::stages(),
        Commands::Spec(args) => commands::spec(args.json)?,
    }
    Ok(())
}
