use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;

use crate::{archive::ArchiveExtractor, http::HttpClient, runtime::Runtime, source::GitHubSource};

pub const USER_AGENT: &str = concat!("infpm/", env!("INFPM_VERSION"));

/// Everything an install command needs, built once per invocation.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub http: HttpClient,
    pub source: GitHubSource,
    pub extractor: ArchiveExtractor,
    pub store_root: PathBuf,
    pub link_root: PathBuf,
}

impl<R: Runtime> Config<R> {
    pub fn new(
        runtime: R,
        store_root: Option<PathBuf>,
        link_root: Option<PathBuf>,
        api_url: Option<String>,
    ) -> Result<Self> {
        if runtime.is_privileged() {
            warn!("Running with elevated privileges; infpm does not need them");
        }

        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var("GITHUB_TOKEN") {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication: {}", mask_token(&token));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        let http = HttpClient::new(client);

        let source = match api_url {
            Some(url) => GitHubSource::with_api_url(http.clone(), &url),
            None => GitHubSource::new(http.clone()),
        };

        let store_root = match store_root {
            Some(path) => path,
            None => default_store_root(&runtime)?,
        };
        let link_root = match link_root {
            Some(path) => path,
            None => default_link_root(&runtime)?,
        };

        Ok(Self {
            runtime,
            http,
            source,
            extractor: ArchiveExtractor::new(),
            store_root,
            link_root,
        })
    }
}

/// `~/.infpm/store`
pub fn default_store_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime.home_dir().context("Could not find home directory")?;
    Ok(home.join(".infpm").join("store"))
}

/// `~/.local`, so executables land in `~/.local/bin`.
pub fn default_link_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home = runtime.home_dir().context("Could not find home directory")?;
    Ok(home.join(".local"))
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
