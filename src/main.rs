use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use project_seed::{
    logging, resolve_parameter, HttpTransfer, LocalPlatform, MacroConfig, ParameterRequest,
    PipelineConfig, ProjectCreationMacro,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Seed new projects with downloaded files")]
struct Cli {
    /// Root directory of the local platform (projects and connections.json)
    #[arg(long, env = "PROJECT_SEED_PLATFORM_ROOT", default_value = ".")]
    platform_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the project creation macro and print its result
    RunMacro {
        /// JSON file with projectName, _projectFolderId, and optionally managedFolderName
        /// and fileUrls
        #[arg(long)]
        config: PathBuf,

        /// User who will own the new project
        #[arg(long, env = "USER", default_value = "admin")]
        user: String,
    },
    /// Resolve the choices of a plugin form parameter and print them
    ResolveParam {
        /// JSON file with parameterName, config, pluginConfig and inputs
        #[arg(long)]
        payload: PathBuf,
    },
}

async fn run_macro(platform_root: PathBuf, config: PathBuf, user: String) -> Result<()> {
    let config = MacroConfig::from_file(&config)?;
    let pipeline = PipelineConfig::from_env()?;
    let transfer = HttpTransfer::new(pipeline.retry, pipeline.timeout)?;
    let platform = LocalPlatform::new(platform_root, user);

    let m = ProjectCreationMacro::new(config, pipeline.scratch_root, &platform, &transfer);
    let target = m.progress_target();
    let result = m
        .run(&mut |step: u32| log::info!("progress {}/{}", step, target))
        .await?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

async fn resolve_param(platform_root: PathBuf, payload: PathBuf) -> Result<()> {
    let data = std::fs::read(&payload)
        .with_context(|| format!("reading payload {}", payload.display()))?;
    let request: ParameterRequest = serde_json::from_slice(&data)
        .with_context(|| format!("parsing payload {}", payload.display()))?;
    let platform = LocalPlatform::new(platform_root, "");

    let choices = resolve_parameter(&request, &platform).await?;
    println!("{}", serde_json::to_string(&choices)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::RunMacro { config, user } => run_macro(cli.platform_root, config, user).await,
        Command::ResolveParam { payload } => resolve_param(cli.platform_root, payload).await,
    }
}
