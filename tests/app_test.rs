mod support;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use ssh_fanout_lib::app::App;
use ssh_fanout_lib::cli::Cli;
use ssh_fanout_lib::error::ConfigError;
use ssh_fanout_lib::Action;
use support::{FakeSession, SharedBuf};
use tempfile::NamedTempFile;

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn no_config() -> PathBuf {
    PathBuf::from("/nonexistent/ssh-fanout/config.toml")
}

fn cli(args: &[&str]) -> Cli {
    let mut cli = Cli::try_parse_from(std::iter::once("ssh-fanout").chain(args.iter().copied()))
        .expect("valid command line");
    if cli.config.is_none() {
        cli.config = Some(no_config());
    }
    cli
}

fn no_prompt(_: &str) -> io::Result<String> {
    panic!("unexpected prompt")
}

#[test]
fn test_missing_key_aborts_before_any_host() {
    let err = App::new(
        cli(&["-i", "/nonexistent/id_rsa", "-u", "bob", "h1", "h2"]),
        no_prompt,
    )
    .err()
    .expect("startup must fail");

    assert!(matches!(err, ConfigError::UnreadableKey { .. }), "{err:?}");
}

#[test]
fn test_missing_identity_is_fatal() {
    let err = App::new(cli(&["h1"]), no_prompt).err().expect("startup must fail");
    assert!(matches!(err, ConfigError::MissingIdentity));
}

#[test]
fn test_command_and_upload_conflict() {
    let source = NamedTempFile::new().expect("Failed to create temporary file");
    let upload = format!("{}:/tmp/a.txt", source.path().display());
    let key = fixture("id_ed25519");

    let err = App::new(
        cli(&["-c", "uptime", "--upload", &upload, "-i", &key, "h1"]),
        no_prompt,
    )
    .err()
    .expect("startup must fail");
    assert!(matches!(err, ConfigError::ConflictingAction));
}

#[test]
fn test_hosts_from_args_and_file_are_merged() {
    let mut hosts_file = NamedTempFile::new().expect("Failed to create temporary file");
    writeln!(hosts_file, "  h3  \n\ncarol@h4:2200\n:bad").unwrap();
    let hosts_path = hosts_file.path().display().to_string();
    let key = fixture("id_ed25519");

    let app = App::new(
        cli(&["-i", &key, "-u", "bob", "-f", &hosts_path, "alice@h1:2222", "h2"]),
        no_prompt,
    )
    .unwrap();

    let targets: Vec<(Option<&str>, String)> = app
        .targets()
        .iter()
        .map(|t| (t.user.as_deref(), t.to_string()))
        .collect();
    assert_eq!(
        targets,
        vec![
            (Some("alice"), "h1:2222".to_string()),
            (Some("bob"), "h2:22".to_string()),
            (Some("bob"), "h3:22".to_string()),
            (Some("carol"), "h4:2200".to_string()),
        ]
    );
    assert_eq!(app.action(), &Action::RunCommand("w".into()));
    assert_eq!(app.connect_timeout(), Duration::from_secs(10));
}

#[test]
fn test_config_file_supplies_defaults() {
    let mut config = NamedTempFile::new().expect("Failed to create temporary file");
    writeln!(
        config,
        "user = \"deploy\"\nidentity_file = \"{}\"\ntimeout = \"3s\"",
        fixture("id_ed25519")
    )
    .unwrap();
    let config_path = config.path().display().to_string();

    let app = App::new(cli(&["--config", &config_path, "h1"]), no_prompt).unwrap();
    assert_eq!(app.targets()[0].user.as_deref(), Some("deploy"));
    assert_eq!(app.connect_timeout(), Duration::from_secs(3));

    let app = App::new(
        cli(&["--config", &config_path, "-u", "ops", "-t", "750ms", "h1"]),
        no_prompt,
    )
    .unwrap();
    assert_eq!(app.targets()[0].user.as_deref(), Some("ops"));
    assert_eq!(app.connect_timeout(), Duration::from_millis(750));
}

#[test]
fn test_passphrase_prompt_for_encrypted_key() {
    let key = fixture("id_ed25519_encrypted");
    let app = App::new(cli(&["-p", "-i", &key, "-u", "bob", "h1"]), |_: &str| {
        Ok("hunter2".to_string())
    });
    assert!(app.is_ok());
}

#[tokio::test]
async fn test_run_reports_every_host() {
    let key = fixture("id_ed25519");
    let app = App::new(
        cli(&["-i", &key, "-u", "bob", "-c", "uptime", "h1", "refuse2", "alice@h3:2222"]),
        no_prompt,
    )
    .unwrap();

    let console = SharedBuf::default();
    let summary = app.run::<FakeSession>(console.printer()).await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 1);
    let text = console.text();
    for header in ["h1:22 ❭❭❭ uptime", "refuse2:22 ❭❭❭ uptime", "h3:2222 ❭❭❭ uptime"] {
        assert!(text.contains(header), "missing {header:?} in\n{text}");
    }
}
