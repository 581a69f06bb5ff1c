//! Configuration loading through the CLI surface.

use std::io::Write;

use gitsync::cli::{load_config, CliFlags};
use gitsync::core::Core;
use gitsync_common::config::AuthMethod;
use gitsync_common::envvar::EnvVars;
use gitsync_common::interval::Interval;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn flags(config: &str, credentials: Option<&str>, run: bool, once: bool) -> CliFlags {
    CliFlags {
        config: config.to_string(),
        credentials: credentials.map(str::to_string),
        run,
        once,
    }
}

const CONFIG: &str = r#"
{
  "repositories": {
    "upstream": { "url": "https://h/up.git" },
    "mirror": { "url": "https://h/mirror.git" }
  },
  "mappings": [
    {
      "source": "upstream",
      "targets": ["mirror"],
      "interval": "30m",
      "branches": ["main", "/^release-/"],
      "tags": ["/v.*/"]
    }
  ]
}
"#;

#[test]
fn loads_config_and_credentials_from_files() {
    let config_file = write_temp(CONFIG);
    let creds_file = write_temp(r#"{ "mirror": { "httpToken": "sekrit" } }"#);

    let flags = flags(
        &config_file.path().to_string_lossy(),
        Some(&creds_file.path().to_string_lossy()),
        false,
        false,
    );
    let config = load_config(&flags, &EnvVars::default()).unwrap();

    assert_eq!(Interval::from_secs(1_800), config.mappings[0].spec.interval);
    assert_eq!("sekrit", config.repositories["mirror"].credentials.http_token);
    assert_eq!(AuthMethod::HttpToken, config.repositories["mirror"].auth());
    assert_eq!(AuthMethod::None, config.repositories["upstream"].auth());
}

#[test]
fn invalid_config_is_rejected_with_a_report() {
    let config_file = write_temp(
        r#"
        {
          "mappings": [
            { "source": "nowhere", "targets": ["nothing"], "branches": [] }
          ]
        }
        "#,
    );
    let flags = flags(&config_file.path().to_string_lossy(), None, false, false);

    let err = load_config(&flags, &EnvVars::default()).unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("at least one repository"), "{rendered}");
    assert!(rendered.contains("repository 'nowhere' does not exist"), "{rendered}");
    assert!(rendered.contains("at least one branch or tag matcher"), "{rendered}");
}

#[tokio::test]
async fn dry_run_mode_writes_the_plan_and_exits() {
    let config_file = write_temp(CONFIG);
    let flags = flags(&config_file.path().to_string_lossy(), None, false, false);

    let core = Core::init(&EnvVars::default(), flags).unwrap();
    let mut out = Vec::new();
    core.run(&mut out).await.unwrap();

    let rendered = String::from_utf8(out).unwrap();
    assert!(rendered.starts_with("!! DRY RUN !!"), "{rendered}");
    assert!(rendered.contains("sync: upstream --> mirror"), "{rendered}");
    assert!(
        rendered.contains("upstream = https://h/up.git (auth: none)"),
        "{rendered}"
    );
    assert!(rendered.contains("branches = main,/^release-/"), "{rendered}");
    assert!(rendered.contains("tags = /v.*/"), "{rendered}");
}

#[test]
fn stdin_collision_fails_at_init() {
    let flags = flags("-", Some("-"), true, true);
    assert!(flags.validate().is_err());
}
