//! Dry-run report: what would be synced, without touching the network.

use std::io::Write;

use gitsync_common::config::{AuthMethod, Config};

const SYNC_HEADER: &str = "sync:";
const SYNC_SUB_HEADER: &str = "     ";

/// Write the plan for every mapping in the configuration.
pub fn write_dry_run(out: &mut impl Write, config: &Config) -> std::io::Result<()> {
    writeln!(
        out,
        "!! DRY RUN !! Use flag --run to sync the following Git repos"
    )?;

    for mapping in &config.mappings {
        writeln!(
            out,
            "\n{} {} --> {}",
            SYNC_HEADER,
            mapping.source,
            mapping.targets.join(", "),
        )?;

        write_repo_line(out, config, &mapping.source)?;
        for target in &mapping.targets {
            write_repo_line(out, config, target)?;
        }

        if !mapping.spec.branches.is_empty() {
            let branches: Vec<String> =
                mapping.spec.branches.iter().map(|m| m.to_string()).collect();
            writeln!(out, "{} branches = {}", SYNC_SUB_HEADER, branches.join(","))?;
        }
        if !mapping.spec.tags.is_empty() {
            let tags: Vec<String> = mapping.spec.tags.iter().map(|m| m.to_string()).collect();
            writeln!(out, "{} tags = {}", SYNC_SUB_HEADER, tags.join(","))?;
        }
    }
    Ok(())
}

fn write_repo_line(out: &mut impl Write, config: &Config, repo_id: &str) -> std::io::Result<()> {
    let (url, auth) = match config.repositories.get(repo_id) {
        Some(repo) => (repo.url.as_str(), auth_label(repo.auth())),
        None => ("", auth_label(AuthMethod::Undefined)),
    };
    writeln!(out, "{SYNC_SUB_HEADER} {repo_id} = {url} (auth: {auth})")
}

/// Resolved method name. `Repository::auth()` never yields
/// `Undefined`, so `auto` only appears for repositories missing from
/// the configuration entirely.
fn auth_label(method: AuthMethod) -> &'static str {
    match method {
        AuthMethod::Undefined => "auto",
        method => method.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitsync_common::config::{Repository, SyncMapping, SyncSpec};
    use gitsync_common::matcher::Matcher;
    use std::collections::BTreeMap;

    fn sample_config() -> Config {
        let repositories = BTreeMap::from([
            (
                "github".to_string(),
                Repository {
                    url: "https://github.com/x/y.git".to_string(),
                    ..Repository::default()
                },
            ),
            (
                "gitlab".to_string(),
                Repository {
                    url: "https://gitlab.com/x/y.git".to_string(),
                    auth_method: AuthMethod::HttpToken,
                    ..Repository::default()
                },
            ),
            (
                "backup".to_string(),
                Repository {
                    url: "ssh://backup.example.org/y.git".to_string(),
                    auth_method: AuthMethod::SshKey,
                    ..Repository::default()
                },
            ),
        ]);
        Config {
            repositories,
            mappings: vec![SyncMapping {
                source: "github".to_string(),
                targets: vec!["gitlab".to_string(), "backup".to_string()],
                spec: SyncSpec {
                    branches: vec!["main".parse::<Matcher>().unwrap()],
                    tags: vec!["/v.*/".parse::<Matcher>().unwrap(), "latest".parse().unwrap()],
                    ..SyncSpec::default()
                },
            }],
        }
    }

    #[test]
    fn renders_the_sync_plan() {
        let mut out = Vec::new();
        write_dry_run(&mut out, &sample_config()).unwrap();

        let expected = concat!(
            "!! DRY RUN !! Use flag --run to sync the following Git repos\n",
            "\n",
            "sync: github --> gitlab, backup\n",
            "      github = https://github.com/x/y.git (auth: none)\n",
            "      gitlab = https://gitlab.com/x/y.git (auth: http-token)\n",
            "      backup = ssh://backup.example.org/y.git (auth: ssh-key)\n",
            "      branches = main\n",
            "      tags = /v.*/,latest\n",
        );
        assert_eq!(expected, String::from_utf8(out).unwrap());
    }

    #[test]
    fn omits_empty_matcher_lines() {
        let mut config = sample_config();
        config.mappings[0].spec.tags.clear();

        let mut out = Vec::new();
        write_dry_run(&mut out, &config).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("branches = main"));
        assert!(!rendered.contains("tags ="));
    }
}
