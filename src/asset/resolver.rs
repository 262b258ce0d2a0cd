use log::{debug, info};

use super::picker::KeywordMatcher;
use super::platform::{AliasTable, DEFAULT_ALIASES, Platform};
use crate::error::{InstallError, ResolutionFailure};
use crate::runtime::Runtime;
use crate::source::{ReleaseAsset, ReleaseSource, RepoId};

/// The outcome of resolving a repository: what to download and how to name it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    /// Repository segment of the URL
    pub name: String,
    /// Release tag
    pub version: String,
    pub download_url: String,
}

/// Turns a repository reference into a single downloadable asset.
pub struct AssetResolver<'a, R: Runtime, S: ReleaseSource> {
    runtime: &'a R,
    source: &'a S,
    platform: Platform,
    matcher: KeywordMatcher,
    interactive: bool,
}

impl<'a, R: Runtime, S: ReleaseSource> AssetResolver<'a, R, S> {
    pub fn new(runtime: &'a R, source: &'a S, interactive: bool) -> Self {
        Self::with_platform(runtime, source, Platform::detect(), DEFAULT_ALIASES, interactive)
    }

    pub fn with_platform(
        runtime: &'a R,
        source: &'a S,
        platform: Platform,
        aliases: AliasTable,
        interactive: bool,
    ) -> Self {
        let matcher = KeywordMatcher::new(&platform, aliases);
        Self {
            runtime,
            source,
            platform,
            matcher,
            interactive,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, repo: &RepoId) -> Result<ResolvedAsset, InstallError> {
        let locator = format!("https://github.com/{}", repo);
        let fail = |source: ResolutionFailure| InstallError::Resolution {
            locator: locator.clone(),
            source,
        };

        let release = self.source.latest_release(repo).await.map_err(fail)?;

        println!(
            "Found latest release: {}. Read about this release: {}",
            release.display_name(),
            release.web_url
        );

        debug!("Matching assets with keywords {:?}", self.matcher.keywords());
        let candidates = self.matcher.candidates(&release.assets);
        let chosen = self.choose(&candidates, &release.assets).map_err(fail)?;

        info!("Selected asset {} from release {}", chosen.name, release.tag);

        Ok(ResolvedAsset {
            name: repo.repo.clone(),
            version: release.tag.clone(),
            download_url: chosen.download_url.clone(),
        })
    }

    fn choose<'c>(
        &self,
        candidates: &[&'c ReleaseAsset],
        all_assets: &[ReleaseAsset],
    ) -> Result<&'c ReleaseAsset, ResolutionFailure> {
        if candidates.is_empty() {
            let mut available: Vec<&str> = all_assets.iter().map(|a| a.name.as_str()).collect();
            available.sort();
            return Err(ResolutionFailure::NoCandidates {
                platform: self.platform.to_string(),
                available: available.join("\n  "),
            });
        }

        if !self.interactive {
            // Repeated entries of one asset leave nothing to choose between
            let mut distinct: Vec<&'c ReleaseAsset> = Vec::new();
            for candidate in candidates {
                if !distinct.iter().any(|seen| std::ptr::eq(*seen, *candidate)) {
                    distinct.push(*candidate);
                }
            }
            return match distinct[..] {
                [only] => Ok(only),
                _ => Err(ResolutionFailure::Ambiguous {
                    count: distinct.len(),
                    platform: self.platform.to_string(),
                }),
            };
        }

        println!("The following assets were found that match your operating system and architecture:");
        for (i, asset) in candidates.iter().enumerate() {
            println!("{}) {}", i, asset.name);
        }

        let index = self
            .runtime
            .select("Please choose an asset to install:", candidates.len())
            .map_err(ResolutionFailure::Selection)?;

        Ok(candidates[index])
    }
}
