use anyhow::{bail, Context, Result};
use clap::Parser;
use copytrace::config::ScanConfig;
use copytrace::github::{
    clone::cleanup_registered_dirs, is_valid_github_url, repo_id_from_url, RepoCloner,
    SearchClient,
};
use copytrace::pipeline::{
    preliminary_scores, run_deep_evaluation, run_discovery, top_n_repos, NoopReporter,
    ProgressReporter, TerminalReporter,
};
use copytrace::repo::{collect_files, read_all};
use copytrace::report::render_scores;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copytrace")]
#[command(about = "Ranks external GitHub repositories by the likelihood that a candidate repository was copied from them")]
#[command(version)]
struct Cli {
    /// Path to a local candidate repository
    #[arg(long)]
    dir: Option<std::path::PathBuf>,

    /// GitHub URL of the candidate repository
    #[arg(long)]
    url: Option<String>,

    /// Skip the confirmation prompt before the deep comparison
    #[arg(long)]
    yes: bool,

    /// Suppress progress bars
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    spawn_signal_handler();

    let config = ScanConfig::default();

    match (cli.dir, cli.url) {
        (Some(_), Some(_)) => bail!("pass exactly one of --dir or --url, not both"),
        (None, None) => bail!("pass one of --dir <PATH> or --url <GITHUB_URL>"),
        (Some(dir), None) => {
            let root = dir
                .canonicalize()
                .with_context(|| format!("cannot resolve {}", dir.display()))?;
            let repo_id = root.display().to_string();
            tracing::info!("analyzing local directory {repo_id}");
            run(&config, &root, &repo_id, cli.yes, cli.quiet).await
        }
        (None, Some(url)) => {
            if !is_valid_github_url(&url) {
                bail!("{url} is not a valid GitHub repository URL");
            }
            let repo_id = repo_id_from_url(&url)?;
            let clone = RepoCloner::clone_to_temp(&url)?;
            run(&config, &clone.root, &repo_id, cli.yes, cli.quiet).await
        }
    }
}

async fn run(
    config: &ScanConfig,
    root: &Path,
    repo_id: &str,
    assume_yes: bool,
    quiet: bool,
) -> Result<()> {
    let client = SearchClient::from_env(config)?;

    let paths = collect_files(root);
    if paths.is_empty() {
        bail!("no analyzable files under {}", root.display());
    }
    let files = read_all(&paths)?;
    tracing::info!("candidate: {} files loaded from {}", files.len(), root.display());

    let reporter = make_reporter(quiet);
    let outcome =
        run_discovery(config, &client, repo_id, root, &files, reporter.as_ref()).await?;
    tracing::info!(
        "discovery: {} hits examined, {} repositories accumulated evidence",
        outcome.hits_examined,
        outcome.evidence.len()
    );

    let chosen = top_n_repos(&outcome.evidence, config.top_n_repos);
    if chosen.is_empty() {
        println!("No external repository collected more than one piece of evidence.");
        return Ok(());
    }

    let prelim = preliminary_scores(&outcome.evidence, &chosen, files.len());
    println!(
        "{}",
        render_scores(
            "Preliminary ranking (discovery evidence)",
            repo_id,
            &prelim,
            config
        )
    );

    if !assume_yes && !confirm("Run the deep repo-to-repo comparison?")? {
        return Ok(());
    }

    let reporter = make_reporter(quiet);
    let deep = run_deep_evaluation(config, &files, root, &chosen, reporter.as_ref()).await?;
    println!(
        "{}",
        render_scores(
            &format!("Top {} repositories (deep comparison)", deep.len()),
            repo_id,
            &deep,
            config
        )
    );
    Ok(())
}

fn make_reporter(quiet: bool) -> Box<dyn ProgressReporter> {
    if quiet {
        Box::new(NoopReporter)
    } else {
        Box::new(TerminalReporter::new())
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

/// On SIGINT/SIGTERM: sweep live clone directories, then exit 0. In-flight
/// work is not interrupted mid-task; the process ends here.
fn spawn_signal_handler() {
    tokio::spawn(async {
        let interrupted = wait_for_signal().await;
        if interrupted {
            tracing::info!("interrupted; removing clone directories");
            cleanup_registered_dirs();
            std::process::exit(0);
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> bool {
    use tokio::signal::unix::{signal, SignalKind};
    let Ok(mut term) = signal(SignalKind::terminate()) else {
        return tokio::signal::ctrl_c().await.is_ok();
    };
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.is_ok(),
        _ = term.recv() => true,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}
