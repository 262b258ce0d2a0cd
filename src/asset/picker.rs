use super::platform::{AliasTable, Platform, alias_of};
use crate::source::ReleaseAsset;

/// Keyword heuristic that guesses which release assets fit a platform.
///
/// There are always four keyword slots: the OS token, the architecture token,
/// then the alias of each. A slot whose token has no alias is empty, and an
/// empty keyword is contained in every name, so it always counts as a match.
/// An asset becomes a candidate once two keywords have matched, but the count
/// is checked *before* each keyword is tested. Consequences that callers see:
///
/// - the last keyword can never push an asset over the threshold;
/// - an asset that reaches two matches early is pushed again for every
///   remaining keyword, so the candidate list may hold duplicates;
/// - on platforms without aliases a single real match is enough.
///
/// All of these are kept so candidate indices stay stable for operators.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

/// Matches needed before an asset counts as a candidate.
const MATCH_THRESHOLD: usize = 2;

impl KeywordMatcher {
    pub fn new(platform: &Platform, aliases: AliasTable) -> Self {
        let os = platform.os.to_lowercase();
        let arch = platform.arch.to_lowercase();

        let os_alias = alias_of(aliases, &os).unwrap_or_default().to_string();
        let arch_alias = alias_of(aliases, &arch).unwrap_or_default().to_string();

        Self {
            keywords: vec![os, arch, os_alias, arch_alias],
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Candidate assets in release order, duplicates included.
    pub fn candidates<'a>(&self, assets: &'a [ReleaseAsset]) -> Vec<&'a ReleaseAsset> {
        let mut candidates = Vec::new();

        for asset in assets {
            let name = asset.name.to_lowercase();
            let mut matched = 0;
            for keyword in &self.keywords {
                if matched >= MATCH_THRESHOLD {
                    candidates.push(asset);
                }
                if name.contains(keyword.as_str()) {
                    matched += 1;
                }
            }
        }

        candidates
    }
}
