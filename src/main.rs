use anyhow::Result;
use clap::Parser;
use infpm::acquire::AcquireMode;
use infpm::commands::{InstallOptions, install};
use std::io::IsTerminal;
use std::path::PathBuf;

/// infpm - rootless package installer
///
/// Installs release archives into a private store and links their
/// executables and libraries into a user-writable prefix.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for authentication
/// when resolving GitHub repositories. This helps avoid API rate limits.
///
/// Examples:
///   infpm install https://github.com/owner/repo
///   infpm install https://example.com/tool.tar.gz --name tool --version 1.0
///   infpm install --file ./tool.tar.gz -n tool -v 1.0
#[derive(Parser, Debug)]
#[command(author, version = env!("INFPM_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store directory for extracted packages (default: ~/.infpm/store)
    #[arg(long = "store", env = "INFPM_STORE", value_name = "PATH", global = true)]
    pub store_root: Option<PathBuf>,

    /// Prefix that receives the links (default: ~/.local)
    #[arg(
        long = "root",
        short = 'r',
        env = "INFPM_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub link_root: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", env = "INFPM_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package from a GitHub repository, an archive URL or a local archive
    #[command(alias = "i")]
    Install(InstallArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// GitHub repository URL, archive URL, or archive path with --file
    #[arg(value_name = "LOCATOR")]
    pub locator: String,

    /// Treat LOCATOR as a local archive file (it is never deleted)
    #[arg(long, short = 'f')]
    pub file: bool,

    /// Package name (defaults to the repository name)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Package version (defaults to the release tag)
    #[arg(long = "version", short = 'v')]
    pub pkg_version: Option<String>,

    /// Buffer the download in a temporary file instead of memory
    #[arg(long)]
    pub disk: bool,

    /// Keep the downloaded archive after installing (implies --disk)
    #[arg(long)]
    pub keep: bool,

    /// Never prompt; fail unless exactly one release asset matches
    #[arg(long)]
    pub non_interactive: bool,
}

impl InstallArgs {
    fn into_options(self, stdin_is_terminal: bool) -> InstallOptions {
        let mode = if self.disk || self.keep {
            AcquireMode::Disk
        } else {
            AcquireMode::Memory
        };
        InstallOptions {
            locator: self.locator,
            is_file: self.file,
            name: self.name,
            version: self.pkg_version,
            mode,
            keep: self.keep,
            interactive: stdin_is_terminal && !self.non_interactive,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = infpm::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            let options = args.into_options(std::io::stdin().is_terminal());
            install(runtime, options, cli.store_root, cli.link_root, cli.api_url).await?
        }
    }
    Ok(())
}
