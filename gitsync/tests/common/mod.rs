//! Shared fixtures: bare repositories populated with commits and tags.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use git2::{BranchType, Commit, Oid, Repository, Signature};
use gitsync_common::config::{AuthMethod, Config, Repository as RepoConfig, SyncMapping, SyncSpec};
use gitsync_common::matcher::Matcher;

pub const GIT_AUTHOR_NAME: &str = "Git Sync";
pub const GIT_AUTHOR_EMAIL: &str = "gitsync@example.org";

pub fn init_bare(path: &Path) -> Repository {
    Repository::init_bare(path).expect("bare repository initializes")
}

/// Commit a single file onto a branch, creating the branch when it
/// does not exist yet. Returns the new commit id.
pub fn commit_file(
    repo: &Repository,
    branch: &str,
    file: &str,
    content: &str,
    message: &str,
) -> Oid {
    let signature =
        Signature::now(GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL).expect("signature builds");

    let parent = repo
        .find_branch(branch, BranchType::Local)
        .ok()
        .map(|b| b.get().peel_to_commit().expect("branch points to a commit"));

    let mut builder = match &parent {
        Some(commit) => repo
            .treebuilder(Some(&commit.tree().expect("commit has a tree")))
            .expect("tree builder"),
        None => repo.treebuilder(None).expect("tree builder"),
    };
    let blob = repo.blob(content.as_bytes()).expect("blob writes");
    builder.insert(file, blob, 0o100_644).expect("tree entry inserts");
    let tree = repo
        .find_tree(builder.write().expect("tree writes"))
        .expect("tree exists");

    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    repo.commit(
        Some(&format!("refs/heads/{branch}")),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .expect("commit writes")
}

/// Create a lightweight tag pointing at a commit.
pub fn tag(repo: &Repository, name: &str, target: Oid) {
    repo.reference(&format!("refs/tags/{name}"), target, true, name)
        .expect("tag reference writes");
}

/// The commit a branch points to, when the branch exists.
pub fn branch_tip(repo: &Repository, branch: &str) -> Option<Oid> {
    repo.find_branch(branch, BranchType::Local)
        .ok()
        .and_then(|b| b.get().target())
}

/// The object a tag points to, when the tag exists.
pub fn tag_target(repo: &Repository, name: &str) -> Option<Oid> {
    repo.find_reference(&format!("refs/tags/{name}"))
        .ok()
        .and_then(|r| r.target())
}

pub fn local_repo_config(url: &str) -> RepoConfig {
    RepoConfig {
        url: url.to_string(),
        auth_method: AuthMethod::None,
        ..RepoConfig::default()
    }
}

pub fn matcher(form: &str) -> Matcher {
    form.parse().expect("matcher parses")
}

/// A one-mapping configuration over the given repositories.
pub fn config_for(
    repos: Vec<(&str, RepoConfig)>,
    source: &str,
    targets: &[&str],
    branches: &[&str],
    tags: &[&str],
) -> Config {
    Config {
        repositories: repos
            .into_iter()
            .map(|(id, repo)| (id.to_string(), repo))
            .collect::<BTreeMap<_, _>>(),
        mappings: vec![SyncMapping {
            source: source.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            spec: SyncSpec {
                branches: branches.iter().map(|b| matcher(b)).collect(),
                tags: tags.iter().map(|t| matcher(t)).collect(),
                ..SyncSpec::default()
            },
        }],
    }
}
