use std::fmt;

/// OS and architecture, spelled the way release assets usually spell them
/// (`linux`, `darwin`, `amd64`, `arm64`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

/// Alternative spellings of OS/architecture tokens, keyed by the canonical token.
pub type AliasTable = &'static [(&'static str, &'static str)];

pub const DEFAULT_ALIASES: AliasTable = &[("darwin", "macos"), ("amd64", "x86")];

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the current platform
    pub fn detect() -> Self {
        Self::from_target(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust target names onto release-asset tokens.
    pub fn from_target(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Look up the alias of `token`, if the table has one.
pub fn alias_of(aliases: AliasTable, token: &str) -> Option<&'static str> {
    aliases
        .iter()
        .find(|(canonical, _)| *canonical == token)
        .map(|(_, alias)| *alias)
}
