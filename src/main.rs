use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use toolsdir_core::aggregator::{ACTIVATION_FAILED, FAILURE_EXIT_CODE};
use toolsdir_core::config::resolve_config_path;
use toolsdir_core::replay::render_replay;
use toolsdir_core::{
    ActivationRequest, AnyExecutor, Config, Dialect, EnvironmentScope, InvocationMetadata,
    Launcher, ProcessGenerator, Reporter, StatusBlock, TempScriptNamer,
};

/// Environment filter variable for diagnostics.
const LOG_ENV: &str = "TOOLSDIR_LOG";

#[derive(Parser)]
#[command(
    name = "toolsdir",
    version,
    about = "Activate a directory of tools in the invoking shell"
)]
struct Cli {
    /// Config file (default: $TOOLSDIR_CONFIG, then the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log debugging detail to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Disable colored status output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activate tools; prints the replay script for the entry point to evaluate
    Activate(ActivateArgs),
    /// Print the entry point script for a shell
    Init {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Write this process's environment as JSON
    #[command(hide = true)]
    EnvSnapshot {
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Print the version
    Version,
}

#[derive(Args)]
struct ActivateArgs {
    #[arg(value_enum)]
    shell: Shell,

    /// How the entry point was invoked (`$0`, `$MyInvocation.InvocationName`)
    #[arg(long, allow_hyphen_values = true)]
    invocation_name: Option<String>,

    /// Path of the entry point script (`${BASH_SOURCE[0]}`)
    #[arg(long, allow_hyphen_values = true)]
    script_path: Option<String>,

    /// PowerShell `$MyInvocation.CommandOrigin`
    #[arg(long)]
    command_origin: Option<String>,

    /// PowerShell major version
    #[arg(long)]
    shell_version: Option<u32>,

    /// Directory for the temp script (default: current directory)
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Arguments forwarded to the generator unchanged
    #[arg(last = true)]
    forwarded: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shell {
    Batch,
    Bash,
    Powershell,
}

impl From<Shell> for Dialect {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Batch => Self::Batch,
            Shell::Bash => Self::PosixShell,
            Shell::Powershell => Self::PowerShell,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_subscriber(cli.verbose, cli.debug);

    match &cli.command {
        Commands::Activate(args) => Ok(activate_or_report(&cli, args).await),
        Commands::Init { shell } => {
            let exe = std::env::current_exe().context("failed to locate the toolsdir executable")?;
            print!(
                "{}",
                toolsdir_core::adapter::render_adapter((*shell).into(), &exe)
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::EnvSnapshot { output } => {
            EnvironmentScope::capture()
                .write_snapshot(output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("toolsdir {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Setup errors are reported like any other failed activation so that the
/// entry point still receives a replay script and an exit code.
async fn activate_or_report(cli: &Cli, args: &ActivateArgs) -> ExitCode {
    match activate(cli, args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("activation setup failed: {e:?}");
            let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty());
            Reporter::new(std::io::stderr(), color).emit(
                &StatusBlock::error(ACTIVATION_FAILED).with_detail(format!("{e:#}")),
            );
            let replay = render_replay(args.shell.into(), &[], FAILURE_EXIT_CODE);
            print!("{replay}");
            ExitCode::FAILURE
        }
    }
}

async fn activate(cli: &Cli, args: &ActivateArgs) -> anyhow::Result<ExitCode> {
    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)?;
    if cli.no_color {
        config.activation.color = false;
    }
    config.validate()?;

    let dialect: Dialect = args.shell.into();
    // The generator runs inside this directory and is handed the temp path,
    // so a relative path would be resolved twice.
    let working_directory = match &args.working_dir {
        Some(dir) => std::path::absolute(dir)
            .with_context(|| format!("failed to resolve {}", dir.display()))?,
        None => std::env::current_dir().context("failed to read the current directory")?,
    };
    let exe = std::env::current_exe().context("failed to locate the toolsdir executable")?;

    let generator =
        ProcessGenerator::from_config(&config.generator)?.with_working_directory(&working_directory);
    let executor = AnyExecutor::for_dialect(
        dialect,
        config.interpreters.program(dialect),
        snapshot_command(&exe),
        TempScriptNamer::new(config.activation.temp_prefix.as_str()),
    );
    let reporter = Reporter::new(std::io::stderr(), config.activation.color);
    let mut launcher = Launcher::new(
        generator,
        executor,
        TempScriptNamer::new(config.activation.temp_prefix.as_str()),
        reporter,
    );

    let request = ActivationRequest::new(dialect, args.forwarded.clone(), working_directory);
    let metadata = InvocationMetadata {
        invocation_name: args.invocation_name.clone(),
        script_path: args.script_path.clone(),
        command_origin: args.command_origin.clone(),
        shell_version: args.shell_version,
    };

    let mut scope = EnvironmentScope::capture();
    let baseline = scope.clone();
    let report = launcher.activate(&request, &metadata, &mut scope).await;

    let changes = scope.changes_since(&baseline, &config.activation.ignored_variables);
    tracing::debug!(changes = changes.len(), code = report.exit_code, "activation finished");

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(render_replay(dialect, &changes, report.exit_code).as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write the replay script")?;

    Ok(ExitCode::from(u8::try_from(report.exit_code).unwrap_or(1)))
}

fn snapshot_command(exe: &Path) -> Vec<String> {
    vec![exe.to_string_lossy().into_owned(), "env-snapshot".into()]
}

/// Diagnostics go to stderr; stdout is reserved for the replay script.
fn init_subscriber(verbose: bool, debug: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
