// # dpf-solver - DNS-01 Challenge Solver
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add reconciliation, DNS, or retry logic here
// - All solver logic MUST be in dpf-solver-core
// - Configuration is via environment variables and the action argument ONLY
//
// The dpf-solver binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Reading one challenge request (JSON) from a file or stdin
// 3. Wiring the secret store and the DPF record store factory
// 4. Running `present` or `cleanup` once and mapping the outcome to an exit code
//
// ## Configuration
//
// - `DPF_SECRETS_DIR`: Root of the mounted secrets (`<root>/<namespace>/<name>/<key>`), required
// - `DPF_CHALLENGE_FILE`: Path to the challenge JSON (stdin when unset)
// - `DPF_JOB_POLL_INTERVAL_MS`: Delay between DPF job status polls (100-60000, default 1000)
// - `DPF_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DPF_SECRETS_DIR=/var/run/secrets/dpf
// dpf-solver present < challenge.json
// dpf-solver cleanup < challenge.json
// ```

use anyhow::{Context, Result};
use dpf_provider_iij::DpfStoreFactory;
use dpf_solver_core::{ChallengeRequest, DirSecretStore, DpfSolver, Solver, StoreResolver};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Challenge operation succeeded
/// - 1: Configuration or usage error
/// - 2: Solver error (credentials, zone, provider)
#[derive(Debug, Clone, Copy)]
enum SolverExitCode {
    Success = 0,
    ConfigError = 1,
    SolverError = 2,
}

impl From<SolverExitCode> for ExitCode {
    fn from(code: SolverExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// The challenge operation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Present,
    CleanUp,
}

impl Action {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some("present") => Ok(Action::Present),
            Some("cleanup") => Ok(Action::CleanUp),
            Some(other) => anyhow::bail!(
                "Unknown action '{}'. Usage: dpf-solver <present|cleanup>",
                other
            ),
            None => anyhow::bail!("Missing action. Usage: dpf-solver <present|cleanup>"),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    action: Action,
    secrets_dir: PathBuf,
    challenge_file: Option<PathBuf>,
    poll_interval_ms: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from the process environment and arguments
    fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_lookup(|key| std::env::var(key).ok(), &args)
    }

    /// Load configuration through a variable lookup function
    fn from_lookup<F>(lookup: F, args: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let action = Action::parse(args.first().map(String::as_str))?;

        let secrets_dir = lookup("DPF_SECRETS_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .context(
                "DPF_SECRETS_DIR is required. \
                Set it via: export DPF_SECRETS_DIR=/var/run/secrets/dpf",
            )?;

        let poll_interval_ms = match lookup("DPF_JOB_POLL_INTERVAL_MS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("DPF_JOB_POLL_INTERVAL_MS must be a number. Got: {}", raw)
            })?,
            None => 1000,
        };

        Ok(Self {
            action,
            secrets_dir,
            challenge_file: lookup("DPF_CHALLENGE_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            poll_interval_ms,
            log_level: lookup("DPF_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.poll_interval_ms) {
            anyhow::bail!(
                "DPF_JOB_POLL_INTERVAL_MS must be between 100 and 60000. Got: {}",
                self.poll_interval_ms
            );
        }

        if !self.secrets_dir.is_dir() {
            anyhow::bail!(
                "DPF_SECRETS_DIR is not a directory: {}",
                self.secrets_dir.display()
            );
        }

        if let Some(ref path) = self.challenge_file
            && !path.is_file()
        {
            anyhow::bail!("DPF_CHALLENGE_FILE does not exist: {}", path.display());
        }

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DPF_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SolverExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SolverExitCode::ConfigError.into();
    }

    // stdout is left untouched; all logs go to stderr
    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SolverExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SolverExitCode::SolverError.into();
        }
    };

    rt.block_on(async {
        let challenge = match read_challenge(config.challenge_file.as_ref()).await {
            Ok(challenge) => challenge,
            Err(e) => {
                error!("Invalid challenge request: {:#}", e);
                return SolverExitCode::ConfigError;
            }
        };

        match run(&config, &challenge).await {
            Ok(()) => SolverExitCode::Success,
            Err(e) => {
                error!("Solver error: {:#}", e);
                SolverExitCode::SolverError
            }
        }
    })
    .into()
}

/// Read and decode the challenge request
async fn read_challenge(path: Option<&PathBuf>) -> Result<ChallengeRequest> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read challenge from stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("Failed to decode challenge JSON")
}

/// Run one challenge operation
async fn run(config: &Config, challenge: &ChallengeRequest) -> Result<()> {
    let factory = DpfStoreFactory::new()?
        .with_poll_interval(Duration::from_millis(config.poll_interval_ms));
    let secrets = DirSecretStore::new(&config.secrets_dir);
    let solver = DpfSolver::new(StoreResolver::new(Arc::new(secrets), Arc::new(factory)));

    info!(
        solver = solver.name(),
        action = ?config.action,
        zone = %challenge.zone_name(),
        name = %challenge.target_name(),
        "Running challenge operation"
    );

    match config.action {
        Action::Present => solver.present(challenge).await?,
        Action::CleanUp => solver.clean_up(challenge).await?,
    }

    info!("Challenge operation completed");
    Ok(())
}
