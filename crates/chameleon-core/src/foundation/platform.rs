//! Platform identity and command platform filters.

use std::collections::BTreeSet;
use std::fmt;

/// Broad category of a host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    /// A game server that owns worlds and players.
    Server,
    /// A proxy routing players between servers.
    Proxy,
}

/// Description of the host the core is embedded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    id: String,
    name: String,
    version: String,
    kind: PlatformKind,
}

impl Platform {
    /// Creates a platform description. `id` is compared case-insensitively.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        kind: PlatformKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            kind,
        }
    }

    /// Returns the stable platform identifier (e.g. `"velocity"`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable platform name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the platform version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the platform category.
    pub fn kind(&self) -> PlatformKind {
        self.kind
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// The set of platforms a command applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformTarget {
    /// Every platform.
    #[default]
    All,
    /// Only the platforms with these (lowercased) ids.
    Only(BTreeSet<String>),
}

impl PlatformTarget {
    /// Targets every platform.
    pub fn all() -> Self {
        Self::All
    }

    /// Targets only the given platform ids.
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Only(
            ids.into_iter()
                .map(|id| id.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Returns whether `platform` is covered by this target.
    pub fn matches(&self, platform: &Platform) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&platform.id().to_lowercase()),
        }
    }
}
