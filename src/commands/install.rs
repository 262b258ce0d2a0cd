use anyhow::Result;
use log::debug;
use reqwest::Url;
use std::fmt;
use std::path::PathBuf;

use crate::{
    acquire::{AcquireMode, Acquirer},
    archive::Extractor,
    asset::{AssetResolver, DEFAULT_ALIASES, Platform},
    cleanup::{self, SharedCleanupContext},
    config::Config,
    error::InstallError,
    http::HttpClient,
    manager::PackageManager,
    package::{InstalledPackage, PackageIdentity},
    runtime::Runtime,
    source::{ReleaseSource, RepoId},
};

/// What the operator asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLocator {
    /// `https://github.com/{owner}/{repo}`: resolved through the latest release.
    Repository(RepoId),
    /// Any other http(s) URL, taken as the archive itself.
    Remote(String),
    Local(PathBuf),
}

impl PackageLocator {
    pub fn parse(locator: &str, is_file: bool) -> Result<Self, InstallError> {
        if is_file {
            return Ok(PackageLocator::Local(PathBuf::from(locator)));
        }

        let invalid = |reason: &str| InstallError::InvalidLocator {
            locator: locator.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(locator)
            .map_err(|_| invalid("not a URL; pass --file to install a local archive"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("only http and https URLs can be downloaded"));
        }

        Ok(match RepoId::from_url(&url) {
            Some(repo) => PackageLocator::Repository(repo),
            None => PackageLocator::Remote(locator.to_string()),
        })
    }
}

impl fmt::Display for PackageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageLocator::Repository(repo) => write!(f, "https://github.com/{}", repo),
            PackageLocator::Remote(url) => write!(f, "{}", url),
            PackageLocator::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub locator: String,
    pub is_file: bool,
    /// Required unless the locator is a repository.
    pub name: Option<String>,
    /// Required unless the locator is a repository.
    pub version: Option<String>,
    pub mode: AcquireMode,
    /// Keep the downloaded archive instead of deleting it after the install.
    pub keep: bool,
    pub interactive: bool,
    /// Platform release assets are matched against; the host by default.
    pub platform: Platform,
}

/// Where the archive comes from once any repository has been resolved.
enum ArchiveSource {
    Remote(String),
    Local(PathBuf),
}

#[tracing::instrument(skip(runtime, store_root, link_root, api_url))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    options: InstallOptions,
    store_root: Option<PathBuf>,
    link_root: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<()> {
    let config = Config::new(runtime, store_root, link_root, api_url)?;
    let manager = PackageManager::new(
        config.runtime,
        config.extractor,
        &config.store_root,
        &config.link_root,
        options.interactive,
    )?;

    let cleanup_ctx = cleanup::new_shared();
    let cleanup_ctx_clone = cleanup_ctx.clone();

    // Temporary downloads are the only state removed on Ctrl-C.
    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            if let Ok(ctx) = cleanup_ctx_clone.lock() {
                ctx.cleanup();
            }
            std::process::exit(130);
        }
    });

    let result = run(&manager, &config.source, &config.http, &options, cleanup_ctx).await;
    ctrl_c_handler.abort();

    let installed = result?;
    print_install_summary(&installed);
    Ok(())
}

/// Resolve, identify, acquire and install one package.
#[tracing::instrument(skip(manager, source, http, cleanup_ctx))]
pub async fn run<R: Runtime, S: ReleaseSource, E: Extractor>(
    manager: &PackageManager<R, E>,
    source: &S,
    http: &HttpClient,
    options: &InstallOptions,
    cleanup_ctx: SharedCleanupContext,
) -> Result<InstalledPackage, InstallError> {
    let locator = PackageLocator::parse(&options.locator, options.is_file)?;
    debug!("Installing from {:?}", locator);

    let (name, version, archive_source) = match locator {
        PackageLocator::Repository(repo) => {
            let resolver = AssetResolver::with_platform(
                manager.runtime(),
                source,
                options.platform.clone(),
                DEFAULT_ALIASES,
                manager.is_interactive(),
            );
            let resolved = resolver.resolve(&repo).await?;
            (
                options.name.clone().unwrap_or(resolved.name),
                options.version.clone().unwrap_or(resolved.version),
                ArchiveSource::Remote(resolved.download_url),
            )
        }
        PackageLocator::Remote(url) => (
            options.name.clone().unwrap_or_default(),
            options.version.clone().unwrap_or_default(),
            ArchiveSource::Remote(url),
        ),
        PackageLocator::Local(path) => (
            options.name.clone().unwrap_or_default(),
            options.version.clone().unwrap_or_default(),
            ArchiveSource::Local(path),
        ),
    };

    // Checked before anything is downloaded or written.
    let identity = PackageIdentity::new(name, version)?;

    let acquirer = Acquirer::new(manager.runtime(), http).with_cleanup(cleanup_ctx);
    let archive = match &archive_source {
        ArchiveSource::Local(path) => acquirer.from_local(path, true)?,
        ArchiveSource::Remote(url) => acquirer.from_remote(url, options.mode, options.keep).await?,
    };

    manager.install(archive, &identity)
}

fn print_install_summary(installed: &InstalledPackage) {
    println!(
        "   installed {} {}",
        installed.identity,
        installed.store_path.display()
    );
    if !installed.warnings.is_empty() {
        println!(
            "   {} link(s) under {} could not be created:",
            installed.warnings.len(),
            installed.link_root.display()
        );
        for warning in &installed.warnings {
            println!("     {}", warning);
        }
    }
}
