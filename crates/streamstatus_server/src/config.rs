//! Server configuration.
//!
//! Everything is read once at startup. `from_env` reads the process
//! environment; `from_lookup` takes any lookup function so tests never touch
//! global state.

use crate::auth::VerifierConfig;
use crate::dispatch::DispatchMode;
use crate::error::{ServerError, ServerResult};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use streamstatus_core::AbsentEntityPolicy;
use std::path::Path;
use streamstatus_repo::{normalize_document_path, RepoConfig};
use tracing::warn;

/// Repository synced when `SS_GH_REPO` is unset.
pub const DEFAULT_REPO_URL: &str = "https://github.com/infosecstreams/infosecstreams.github.io";

/// Port used when neither `PORT` nor `SS_PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Default replay window for deliveries.
pub const DEFAULT_MAX_MESSAGE_AGE: Duration = Duration::from_secs(600);

/// Everything a sync cycle needs, without the webhook side.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Working copy configuration.
    pub repo: RepoConfig,
    /// What to do when the document has no row for an entity.
    pub absent_policy: AbsentEntityPolicy,
}

impl SyncSettings {
    /// Creates settings with the default policy.
    pub fn new(repo: RepoConfig) -> Self {
        Self {
            repo,
            absent_policy: AbsentEntityPolicy::default(),
        }
    }

    /// Sets the absent-entity policy.
    pub fn with_absent_policy(mut self, policy: AbsentEntityPolicy) -> Self {
        self.absent_policy = policy;
        self
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] if `SS_USERNAME` or `SS_TOKEN` is missing, or
    /// a value is present but invalid.
    pub fn from_lookup<L>(lookup: L) -> ServerResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        env.require(&["SS_USERNAME", "SS_TOKEN"])?;
        env.sync_settings()
    }
}

/// Configuration for the webhook server.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Shared webhook secret.
    pub secret: Vec<u8>,
    /// Replay window; `None` disables the check.
    pub max_message_age: Option<Duration>,
    /// How accepted events reach the sync cycle.
    pub dispatch: DispatchMode,
    /// Repository and update settings.
    pub sync: SyncSettings,
}

impl ServerConfig {
    /// Creates a configuration listening on all interfaces at the default port.
    pub fn new(secret: impl Into<Vec<u8>>, sync: SyncSettings) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            secret: secret.into(),
            max_message_age: Some(DEFAULT_MAX_MESSAGE_AGE),
            dispatch: DispatchMode::default(),
            sync,
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the replay window.
    pub fn with_max_message_age(mut self, age: Option<Duration>) -> Self {
        self.max_message_age = age;
        self
    }

    /// Sets the dispatch strategy.
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Verifier settings derived from this configuration.
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig::new(self.secret.clone()).with_max_message_age(self.max_message_age)
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] naming every missing credential, or the first
    /// value that is present but invalid.
    pub fn from_lookup<L>(lookup: L) -> ServerResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        env.require(&["SS_USERNAME", "SS_TOKEN", "SS_SECRETKEY"])?;

        let secret = env.string("SS_SECRETKEY").unwrap_or_default();
        let mut config = Self::new(secret.into_bytes(), env.sync_settings()?);

        let port = match env.string("PORT") {
            Some(_) => env.u16("PORT")?,
            None => env.u16("SS_PORT")?,
        };
        if let Some(port) = port {
            config.bind_addr.set_port(port);
        }
        if let Some(secs) = env.u64("SS_MAX_MESSAGE_AGE_SECS")? {
            config.max_message_age = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(mode) = env.string("SS_DISPATCH") {
            config.dispatch = mode.parse()?;
        }
        if let Some(capacity) = env.usize("SS_QUEUE_CAPACITY")? {
            if capacity == 0 {
                return Err(ServerError::Config(
                    "SS_QUEUE_CAPACITY must be at least 1".into(),
                ));
            }
            config.dispatch = config.dispatch.with_capacity(capacity);
        }
        Ok(config)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("secret", &"[REDACTED]")
            .field("max_message_age", &self.max_message_age)
            .field("dispatch", &self.dispatch)
            .field("sync", &self.sync)
            .finish()
    }
}

struct Env<'a, L>(&'a L);

impl<L> Env<'_, L>
where
    L: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parsed<T>(&self, name: &str, kind: &str) -> ServerResult<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<T>()
            .map(Some)
            .map_err(|e| ServerError::Config(format!("{name} must be a {kind}: {e}")))
    }

    fn u16(&self, name: &str) -> ServerResult<Option<u16>> {
        self.parsed(name, "u16")
    }

    fn u64(&self, name: &str) -> ServerResult<Option<u64>> {
        self.parsed(name, "u64")
    }

    fn usize(&self, name: &str) -> ServerResult<Option<usize>> {
        self.parsed(name, "usize")
    }

    fn require(&self, names: &[&str]) -> ServerResult<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| self.string(name).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }

    fn sync_settings(&self) -> ServerResult<SyncSettings> {
        let remote_url = self.string("SS_GH_REPO").unwrap_or_else(|| {
            warn!(default = DEFAULT_REPO_URL, "SS_GH_REPO not set, using default");
            DEFAULT_REPO_URL.to_string()
        });
        let mut repo = RepoConfig::new(
            remote_url,
            self.string("SS_USERNAME").unwrap_or_default(),
            self.string("SS_TOKEN").unwrap_or_default(),
        );
        if let Some(path) = self.string("SS_DOCUMENT") {
            let path = normalize_document_path(Path::new(&path))
                .map_err(|e| ServerError::Config(format!("SS_DOCUMENT: {e}")))?;
            repo = repo.with_document_path(path);
        }
        if let Some(branch) = self.string("SS_BRANCH") {
            repo = repo.with_branch(branch);
        }
        if let Some(workdir) = self.string("SS_WORKDIR") {
            repo = repo.with_workdir(workdir);
        }
        // Fail at startup rather than on the first delivery.
        repo.checkout_path()
            .map_err(|e| ServerError::Config(format!("SS_GH_REPO: {e}")))?;

        let mut settings = SyncSettings::new(repo);
        if let Some(policy) = self.string("SS_ABSENT_ENTITY") {
            settings.absent_policy = policy
                .parse()
                .map_err(|e| ServerError::Config(format!("SS_ABSENT_ENTITY: {e}")))?;
        }
        Ok(settings)
    }
}
