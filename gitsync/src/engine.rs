//! Per-mapping mirroring engine.
//!
//! Each mapping gets one engine instance owning a bare repository over
//! its chosen backing store. A sync pass fetches the selected refs from
//! the source, matches branch and tag names against the mapping's
//! selectors, and force-pushes the survivors to every target, isolating
//! failures per target. The loop form repeats the pass on the mapping's
//! interval until cancelled.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use git2::{AutotagOption, BranchType, Direction, ErrorCode, FetchOptions, PushOptions, Repository as GitRepository, RepositoryInitOptions};
use gitsync_common::config::{Config, Repository, SyncMapping, SyncSpec};
use gitsync_common::matcher::match_any;
use gitsync_common::retry::{self, Failure, RetryError};
use gitsync_common::APP_NAME;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::auth::RepoAuth;

const REF_PREFIX_BRANCH: &str = "refs/heads/";
const REF_PREFIX_TAG: &str = "refs/tags/";
const FETCH_REFSPEC: &str = "+refs/heads/*:refs/heads/*";
const MIRROR_REFSPEC: &str = "+refs/*:refs/*";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(3_600);

/// Transient pass failures are retried with backoff before the loop
/// gives up on the tick.
const PASS_MAX_RETRIES: u32 = 2;
const PASS_BACKOFF_MIN: Duration = Duration::from_secs(5);
const PASS_BACKOFF_MAX: Duration = Duration::from_secs(60);
const PASS_MAX_JITTER: Duration = Duration::from_secs(5);

/// Canonical per-repository error for engine operations.
#[derive(Debug)]
pub struct GitRepoError {
    pub repo_id: String,
    pub url: String,
    pub reason: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GitRepoError {
    fn new(
        repo_id: &str,
        url: &str,
        reason: impl Into<String>,
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        GitRepoError {
            repo_id: repo_id.to_string(),
            url: url.to_string(),
            reason: reason.into(),
            cause,
        }
    }
}

impl fmt::Display for GitRepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(
                f,
                "{} in git repo '{}' (url: {}): {}",
                self.reason, self.repo_id, self.url, cause
            ),
            None => write!(f, "{} in '{}' (url: {})", self.reason, self.repo_id, self.url),
        }
    }
}

impl std::error::Error for GitRepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Aggregated failures from one sync pass. A pass keeps going after a
/// target fails, so several errors can accumulate.
#[derive(Debug)]
pub struct SyncError {
    pub errors: Vec<GitRepoError>,
}

impl From<GitRepoError> for SyncError {
    fn from(err: GitRepoError) -> Self {
        SyncError { errors: vec![err] }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for SyncError {}

/// Push destination prepared at init time.
#[derive(Debug)]
struct PushTarget {
    id: String,
    url: String,
    auth: RepoAuth,
}

/// Backing store chosen for the mapping's bare repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    /// Transient storage, removed at cleanup.
    Ephemeral,
    /// Caller-provided path that outlives the engine.
    Persistent,
}

/// One mapping's engine state.
///
/// The repository handle is reopened per operation from `repo_path`,
/// which keeps the engine shareable across the blocking pool.
#[derive(Debug)]
pub struct GitSync {
    source_id: String,
    source: Repository,
    spec: SyncSpec,
    repo_path: PathBuf,
    backing: Backing,
    source_auth: RepoAuth,
    targets: Vec<PushTarget>,
    temp_dir: Mutex<Option<PathBuf>>,
}

impl GitSync {
    /// Initialize the engine for one mapping: resolve configs, build
    /// authentication, choose and initialize the backing store, and
    /// reconcile the source and target remotes.
    pub fn init(config: &Config, mapping: &SyncMapping) -> Result<GitSync, GitRepoError> {
        match Self::try_init(config, mapping) {
            Ok(engine) => Ok(engine),
            Err(err) => {
                error!(source_id = %mapping.source, error = %err, "init failed");
                Err(err)
            }
        }
    }

    fn try_init(config: &Config, mapping: &SyncMapping) -> Result<GitSync, GitRepoError> {
        let source_id = mapping.source.clone();
        let source = config
            .repositories
            .get(&source_id)
            .cloned()
            .ok_or_else(|| {
                GitRepoError::new(
                    &source_id,
                    "",
                    format!("no configuration found for repo '{source_id}'"),
                    None,
                )
            })?;
        let source_err = |reason: &str, cause: Box<dyn std::error::Error + Send + Sync>| {
            GitRepoError::new(source_id.as_str(), source.url.as_str(), reason, Some(cause))
        };

        let source_auth = RepoAuth::from_repository(&source)
            .map_err(|e| source_err("failed to configure auth", e.into()))?;

        // Backing store: a transient directory for in-memory mode, the
        // configured path when set, and an owned temp directory otherwise.
        let mut temp_dir = None;
        let (repo_path, backing) = if source.in_memory || source.local_path.is_empty() {
            debug!(source_id = %source_id, "preparing temp directory");
            let dir = tempfile::Builder::new()
                .prefix(&format!("{APP_NAME}-{source_id}-"))
                .tempdir()
                .map_err(|e| source_err("failed to create temporary directory", e.into()))?;
            let path = dir.into_path();
            temp_dir = Some(path.clone());
            (path, Backing::Ephemeral)
        } else {
            (PathBuf::from(&source.local_path), Backing::Persistent)
        };

        let mut engine = GitSync {
            source_id: source_id.clone(),
            source: source.clone(),
            spec: mapping.spec.clone(),
            repo_path,
            backing,
            source_auth,
            targets: Vec::new(),
            temp_dir: Mutex::new(temp_dir),
        };

        // From here on, failing must still release the temp directory.
        // The engine owns it now, so clean up before surfacing errors.
        if let Err(err) = engine.prepare(config, mapping) {
            engine.clean_logged();
            return Err(err);
        }
        Ok(engine)
    }

    fn prepare(&mut self, config: &Config, mapping: &SyncMapping) -> Result<(), GitRepoError> {
        debug!(
            source_id = %self.source_id,
            git_path = %self.repo_path.display(),
            backing = ?self.backing,
            "initializing repository"
        );
        let repo = self.open_or_init_repo()?;

        if self.source.url.is_empty() {
            info!(
                source_id = %self.source_id,
                "no remote specified, fetch will be skipped"
            );
        } else {
            prepare_remote(&repo, &self.source_id, &self.source.url)
                .map_err(|e| self.source_error("failed to prepare remote", Some(e.into())))?;
        }

        let mut targets = Vec::with_capacity(mapping.targets.len());
        for target_id in &mapping.targets {
            let target = config.repositories.get(target_id).ok_or_else(|| {
                GitRepoError::new(
                    target_id,
                    "",
                    format!("no configuration found for repo '{target_id}'"),
                    None,
                )
            })?;
            let auth = RepoAuth::from_repository(target).map_err(|e| {
                GitRepoError::new(target_id, &target.url, "failed to configure auth", Some(e.into()))
            })?;
            prepare_remote(&repo, target_id, &target.url).map_err(|e| {
                GitRepoError::new(target_id, &target.url, "failed to set up remote", Some(e.into()))
            })?;
            targets.push(PushTarget {
                id: target_id.clone(),
                url: target.url.clone(),
                auth,
            });
        }
        self.targets = targets;
        Ok(())
    }

    /// Initialize a bare repository at the backing path, or open the
    /// one that is already there.
    fn open_or_init_repo(&self) -> Result<GitRepository, GitRepoError> {
        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).no_reinit(true);
        match GitRepository::init_opts(&self.repo_path, &opts) {
            Ok(repo) => Ok(repo),
            Err(e) if e.code() == ErrorCode::Exists => {
                debug!(
                    source_id = %self.source_id,
                    git_path = %self.repo_path.display(),
                    "opening existing repository"
                );
                GitRepository::open(&self.repo_path).map_err(|e| {
                    self.source_error(
                        &format!("failed to open path {}", self.repo_path.display()),
                        Some(e.into()),
                    )
                })
            }
            Err(e) => Err(self.source_error("failed to initialize repo", Some(e.into()))),
        }
    }

    fn source_error(
        &self,
        reason: &str,
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> GitRepoError {
        GitRepoError::new(&self.source_id, &self.source.url, reason, cause)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// One sync pass: refresh the view of the source, select refs, and
    /// push to every target. Per-target failures are collected; a
    /// failing target never stops the others.
    pub fn run_once(&self) -> Result<(), SyncError> {
        let repo = self.open_or_init_repo().map_err(SyncError::from)?;

        let (branches, tags) = if self.source.url.is_empty() {
            self.local_branches_and_tags(&repo)
                .map_err(|e| self.source_error("failed to query local", Some(e.into())))?
        } else {
            self.fetch_source(&repo)?;
            self.remote_branches_and_tags(&repo)?
        };

        if branches.is_empty() && tags.is_empty() {
            debug!(source_id = %self.source_id, "no refs selected, nothing to push");
            return Ok(());
        }

        let refspecs: Vec<String> = branches
            .iter()
            .map(|b| branch_update_refspec(b))
            .chain(tags.iter().map(|t| tag_update_refspec(t)))
            .collect();

        let mut errors = Vec::new();
        for target in &self.targets {
            debug!(
                source_id = %self.source_id,
                target_id = %target.id,
                target_url = %target.url,
                "push to remote target"
            );
            match self.push_target(&repo, target, &refspecs) {
                Ok(()) => {
                    info!(
                        source_id = %self.source_id,
                        target_id = %target.id,
                        target_url = %target.url,
                        "remote update succeeded"
                    );
                }
                Err(e) => {
                    error!(
                        source_id = %self.source_id,
                        source_url = %self.source.url,
                        target_id = %target.id,
                        target_url = %target.url,
                        error = %e,
                        "failed to push to remote"
                    );
                    errors.push(GitRepoError::new(
                        &target.id,
                        &target.url,
                        "failed to push to remote",
                        Some(e.into()),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError { errors })
        }
    }

    fn fetch_source(&self, repo: &GitRepository) -> Result<(), SyncError> {
        let mut remote = repo
            .find_remote(&self.source_id)
            .map_err(|e| self.source_error("failed to query remote", Some(e.into())))?;

        debug!(source_id = %self.source_id, "fetching from source remote");
        let mut options = FetchOptions::new();
        options.remote_callbacks(self.source_auth.callbacks());
        options.download_tags(AutotagOption::All);
        remote
            .fetch(&[FETCH_REFSPEC], Some(&mut options), None)
            .map_err(|e| self.source_error("failed to fetch from remote", Some(e.into())))?;
        Ok(())
    }

    /// List the source remote's refs and filter them through the
    /// mapping's matchers. An empty remote yields empty lists.
    fn remote_branches_and_tags(
        &self,
        repo: &GitRepository,
    ) -> Result<(Vec<String>, Vec<String>), SyncError> {
        let mut remote = repo
            .find_remote(&self.source_id)
            .map_err(|e| self.source_error("failed to query remote", Some(e.into())))?;

        debug!(source_id = %self.source_id, "listing refs");
        let connection = remote
            .connect_auth(Direction::Fetch, Some(self.source_auth.callbacks()), None)
            .map_err(|e| self.source_error("failed to connect to remote", Some(e.into())))?;
        let heads = connection
            .list()
            .map_err(|e| self.source_error("failed to fetch branches and tags", Some(e.into())))?;

        let mut branches = Vec::new();
        let mut tags = Vec::new();
        for head in heads {
            let name = head.name();
            if let Some(branch) = name.strip_prefix(REF_PREFIX_BRANCH) {
                if match_any(&self.spec.branches, branch) {
                    branches.push(branch.to_string());
                }
            } else if let Some(tag) = name.strip_prefix(REF_PREFIX_TAG) {
                if match_any(&self.spec.tags, tag) {
                    tags.push(tag.to_string());
                }
            }
        }

        debug!(
            source_id = %self.source_id,
            branches = branches.len(),
            tags = tags.len(),
            "selected refs from remote"
        );
        Ok((branches, tags))
    }

    /// Enumerate refs straight from the local store for URL-less
    /// sources.
    fn local_branches_and_tags(
        &self,
        repo: &GitRepository,
    ) -> Result<(Vec<String>, Vec<String>), git2::Error> {
        let mut branches = Vec::new();
        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                if match_any(&self.spec.branches, name) {
                    branches.push(name.to_string());
                }
            }
        }

        let mut tags = Vec::new();
        for name in repo.tag_names(None)?.iter().flatten() {
            if match_any(&self.spec.tags, name) {
                tags.push(name.to_string());
            }
        }
        Ok((branches, tags))
    }

    fn push_target(
        &self,
        repo: &GitRepository,
        target: &PushTarget,
        refspecs: &[String],
    ) -> Result<(), git2::Error> {
        let mut remote = repo.find_remote(&target.id)?;
        let mut callbacks = target.auth.callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "failed to update ref '{refname}': {message}"
            ))),
            None => Ok(()),
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote.push(&specs, Some(&mut options))
    }

    /// Repeat [`GitSync::run_once`] on the mapping's interval until
    /// the token cancels. The first pass runs immediately; transient
    /// pass failures are retried with backoff, then logged.
    pub async fn run_in_loop(self: Arc<Self>, cancel: &CancellationToken) -> Result<(), SyncError> {
        let delay = retry::with_jitter(
            retry::exponential_backoff(PASS_BACKOFF_MIN, PASS_BACKOFF_MAX),
            PASS_MAX_JITTER,
        );
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let pass = retry::retry(cancel, PASS_MAX_RETRIES, &delay, || {
                let engine = Arc::clone(&self);
                async move {
                    match tokio::task::spawn_blocking(move || engine.run_once()).await {
                        Ok(result) => result.map_err(Failure::Retry),
                        // A lost blocking task will not recover by retrying.
                        Err(join_err) => Err(Failure::Cancel(SyncError::from(GitRepoError::new(
                            "",
                            "",
                            format!("sync pass panicked: {join_err}"),
                            None,
                        )))),
                    }
                }
            })
            .await;

            match pass {
                Ok(()) => {}
                Err(RetryError::ContextCanceled) => return Ok(()),
                Err(RetryError::Canceled(err)) | Err(RetryError::Exhausted(err)) => {
                    error!(
                        source_id = %self.source_id,
                        source_url = %self.source.url,
                        error = %err,
                        "sync failed"
                    );
                }
            }

            let interval = if self.spec.interval.is_zero() {
                DEFAULT_INTERVAL
            } else {
                self.spec.interval.duration()
            };
            debug!(source_id = %self.source_id, next_sync_in = ?interval, "waiting for next sync");
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Remove the owned temporary directory, when one was allocated.
    /// Safe to call after a partially completed init, and more than
    /// once.
    pub fn clean(&self) -> std::io::Result<()> {
        let taken = self
            .temp_dir
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(path) = taken {
            debug!(source_id = %self.source_id, path = %path.display(), "removing temp directory");
            std::fs::remove_dir_all(&path)?;
        }
        Ok(())
    }

    /// [`GitSync::clean`] for paths where the error can only be logged.
    pub fn clean_logged(&self) {
        if let Err(err) = self.clean() {
            error!(source_id = %self.source_id, error = %err, "cleanup failed");
        }
    }
}

impl Drop for GitSync {
    fn drop(&mut self) {
        // Last-resort release for error paths that skipped clean().
        let slot = self
            .temp_dir
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(path) = slot.take() {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

/// Make the named remote point at `url`, deleting and recreating it
/// when it exists with a different URL. No-op when already configured.
fn prepare_remote(repo: &GitRepository, remote_id: &str, url: &str) -> Result<(), git2::Error> {
    debug!(remote_id, "querying remote");
    let existing_url = match repo.find_remote(remote_id) {
        Ok(remote) => remote.url().map(str::to_string),
        Err(e) if e.code() == ErrorCode::NotFound => {
            debug!(remote_id, "creating remote");
            repo.remote_with_fetch(remote_id, url, MIRROR_REFSPEC)?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if existing_url.as_deref() == Some(url) {
        debug!(remote_id, "remote configured already");
        return Ok(());
    }

    debug!(remote_id, "reconfiguring remote");
    repo.remote_delete(remote_id)?;
    repo.remote_with_fetch(remote_id, url, MIRROR_REFSPEC)?;
    Ok(())
}

fn branch_update_refspec(branch: &str) -> String {
    format!("+{REF_PREFIX_BRANCH}{branch}:{REF_PREFIX_BRANCH}{branch}")
}

fn tag_update_refspec(tag: &str) -> String {
    format!("+{REF_PREFIX_TAG}{tag}:{REF_PREFIX_TAG}{tag}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitsync_common::config::AuthMethod;
    use gitsync_common::matcher::Matcher;
    use std::collections::BTreeMap;

    fn local_repo(path: &str) -> Repository {
        Repository {
            local_path: path.to_string(),
            auth_method: AuthMethod::None,
            ..Repository::default()
        }
    }

    fn config_with(repos: &[(&str, Repository)], mapping: SyncMapping) -> Config {
        Config {
            repositories: repos
                .iter()
                .map(|(id, repo)| (id.to_string(), repo.clone()))
                .collect::<BTreeMap<_, _>>(),
            mappings: vec![mapping],
        }
    }

    fn mapping(source: &str, targets: &[&str], branches: &[&str], tags: &[&str]) -> SyncMapping {
        SyncMapping {
            source: source.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            spec: SyncSpec {
                branches: branches.iter().map(|b| b.parse::<Matcher>().unwrap()).collect(),
                tags: tags.iter().map(|t| t.parse::<Matcher>().unwrap()).collect(),
                ..SyncSpec::default()
            },
        }
    }

    #[test]
    fn branch_and_tag_refspecs_are_exact() {
        assert_eq!("+refs/heads/b:refs/heads/b", branch_update_refspec("b"));
        assert_eq!("+refs/tags/t:refs/tags/t", tag_update_refspec("t"));
    }

    #[test]
    fn prepare_remote_creates_and_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::init_bare(dir.path()).unwrap();

        prepare_remote(&repo, "origin", "https://h/a.git").unwrap();
        assert_eq!(
            Some("https://h/a.git"),
            repo.find_remote("origin").unwrap().url(),
        );

        // Same URL: untouched. New URL: recreated.
        prepare_remote(&repo, "origin", "https://h/a.git").unwrap();
        prepare_remote(&repo, "origin", "https://h/b.git").unwrap();
        assert_eq!(
            Some("https://h/b.git"),
            repo.find_remote("origin").unwrap().url(),
        );
        assert_eq!(1, repo.remotes().unwrap().len());
    }

    #[test]
    fn init_is_idempotent_for_remotes() {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        GitRepository::init_bare(target_dir.path()).unwrap();

        let target_url = target_dir.path().to_string_lossy().into_owned();
        let config = config_with(
            &[
                ("src", local_repo(&source_dir.path().to_string_lossy())),
                (
                    "dst",
                    Repository {
                        url: target_url.clone(),
                        auth_method: AuthMethod::None,
                        ..Repository::default()
                    },
                ),
            ],
            mapping("src", &["dst"], &["main"], &[]),
        );

        let first = GitSync::init(&config, &config.mappings[0]).unwrap();
        let second = GitSync::init(&config, &config.mappings[0]).unwrap();

        let repo = GitRepository::open(source_dir.path()).unwrap();
        let remotes = repo.remotes().unwrap();
        assert_eq!(1, remotes.len());
        assert_eq!(
            Some(target_url.as_str()),
            repo.find_remote("dst").unwrap().url(),
        );

        first.clean().unwrap();
        second.clean().unwrap();
    }

    #[test]
    fn init_fails_for_unknown_source() {
        let config = Config::default();
        let err = GitSync::init(
            &config,
            &mapping("ghost", &["also-ghost"], &["main"], &[]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no configuration found"));
    }

    #[test]
    fn temp_dir_is_removed_on_clean() {
        let target_dir = tempfile::tempdir().unwrap();
        GitRepository::init_bare(target_dir.path()).unwrap();

        let config = config_with(
            &[
                // No local path: the engine allocates a temp directory.
                (
                    "src",
                    Repository {
                        in_memory: true,
                        auth_method: AuthMethod::None,
                        ..Repository::default()
                    },
                ),
                (
                    "dst",
                    Repository {
                        url: target_dir.path().to_string_lossy().into_owned(),
                        auth_method: AuthMethod::None,
                        ..Repository::default()
                    },
                ),
            ],
            mapping("src", &["dst"], &["main"], &[]),
        );

        let engine = GitSync::init(&config, &config.mappings[0]).unwrap();
        let temp_path = engine
            .temp_dir
            .lock()
            .unwrap()
            .clone()
            .expect("temp dir allocated");
        assert!(temp_path.exists());

        engine.clean().unwrap();
        assert!(!temp_path.exists());
        // Second clean is a no-op.
        engine.clean().unwrap();
    }

    #[test]
    fn local_refs_are_filtered_by_matchers() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::init_bare(dir.path()).unwrap();
        let commit = {
            let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::new("t", "t@example.org", &git2::Time::new(0, 0)).unwrap();
            let id = repo
                .commit(Some("refs/heads/main"), &sig, &sig, "init", &tree, &[])
                .unwrap();
            repo.find_commit(id).unwrap()
        };
        repo.reference("refs/heads/dev", commit.id(), true, "dev").unwrap();
        repo.reference("refs/tags/v1", commit.id(), true, "v1").unwrap();
        repo.reference("refs/tags/other", commit.id(), true, "other").unwrap();

        let config = config_with(
            &[("src", local_repo(&dir.path().to_string_lossy()))],
            mapping("src", &[], &["main"], &["/^v/"]),
        );
        let engine = GitSync {
            source_id: "src".to_string(),
            source: config.repositories["src"].clone(),
            spec: config.mappings[0].spec.clone(),
            repo_path: dir.path().to_path_buf(),
            backing: Backing::Persistent,
            source_auth: RepoAuth::from_repository(&config.repositories["src"]).unwrap(),
            targets: Vec::new(),
            temp_dir: Mutex::new(None),
        };

        let repo = engine.open_or_init_repo().unwrap();
        let (branches, tags) = engine.local_branches_and_tags(&repo).unwrap();
        assert_eq!(vec!["main".to_string()], branches);
        assert_eq!(vec!["v1".to_string()], tags);
    }
}
