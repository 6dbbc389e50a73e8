//! Integration tests driving the glossa binary.
//!
//! Each test gets its own app data directory through `GLOSSA_HOME`, so
//! config and indexes never touch the user's real data.

mod common;

use common::Repo;
use std::process::{Command, Output};

fn glossa(repo: &Repo, args: &[&str]) -> Output {
    let root = repo.root();
    Command::new(env!("CARGO_BIN_EXE_glossa"))
        .arg("--root")
        .arg(&root)
        .arg("--no-color")
        .args(args)
        .env("GLOSSA_HOME", repo.path().join("home"))
        .env_remove("GLOSSA_LOG")
        .output()
        .expect("Failed to run glossa")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn lookup_json(repo: &Repo, args: &[&str]) -> Vec<serde_json::Value> {
    let mut full = vec!["lookup", "--json"];
    full.extend_from_slice(args);
    let output = glossa(repo, &full);
    assert!(output.status.success(), "lookup failed: {}", stderr(&output));
    serde_json::from_slice(&output.stdout).expect("lookup did not print JSON")
}

#[test]
fn lookup_before_index_fails() {
    let repo = Repo::new();
    let output = glossa(&repo, &["user"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("error: "), "unexpected stderr: {err}");
    assert!(err.contains("glossa index"));
    assert_eq!(err.trim_end().lines().count(), 1);
}

#[test]
fn index_then_lookup() {
    let repo = Repo::new();
    repo.write(
        "docs",
        "spec.en.ja.yml",
        "- source_term: user\n  target_term: ユーザ\n  note: ユーザーではない\n",
    );

    let output = glossa(&repo, &["index"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = glossa(&repo, &["user"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "spec (en -> ja)  user => ユーザ  # ユーザーではない\n"
    );

    let hits = lookup_json(&repo, &["user", "--target-lang", "ja"]);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["glossary_name"], "spec");
    assert_eq!(hits[0]["match_kind"], "exact");
}

#[test]
fn mutations_reindex() {
    let repo = Repo::new();

    let output = glossa(&repo, &["new", "docs", "spec.en.ja", "--format", "tsv"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(
        repo.root()
            .join("projects/docs/glossary/spec.en.ja.tsv")
            .exists()
    );

    for (source, target) in [("user", "ユーザ"), ("user", "ユーザー"), ("server", "サーバー")] {
        let output = glossa(&repo, &["add", "spec.en.ja", source, target]);
        assert!(output.status.success(), "{}", stderr(&output));
    }
    assert_eq!(lookup_json(&repo, &["user"]).len(), 2);

    // Duplicate pair
    let output = glossa(&repo, &["add", "spec.en.ja", "user", "ユーザ"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already exists"));

    let output = glossa(
        &repo,
        &["update", "spec.en.ja", "server", "サーバー", "--note", "backend"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(lookup_json(&repo, &["server"])[0]["note"], "backend");

    let output = glossa(&repo, &["delete", "spec.en.ja", "user"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));

    let output = glossa(&repo, &["delete", "spec.en.ja", "user", "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(lookup_json(&repo, &["user"]).is_empty());
    assert_eq!(lookup_json(&repo, &["server"]).len(), 1);
}

#[test]
fn no_index_leaves_index_stale() {
    let repo = Repo::new();
    repo.write("docs", "spec.en.ja.csv", "user,ユーザ\n");
    assert!(glossa(&repo, &["index"]).status.success());

    let output = glossa(&repo, &["--no-index", "add", "spec.en.ja", "server", "サーバー"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(lookup_json(&repo, &["server"]).is_empty());

    assert!(glossa(&repo, &["index"]).status.success());
    assert_eq!(lookup_json(&repo, &["server"]).len(), 1);
}

#[test]
fn register_and_unregister() {
    let repo = Repo::new();
    let outside = repo.path().join("shared.en.fr.csv");
    std::fs::write(&outside, "user,utilisateur\n").unwrap();

    let output = glossa(&repo, &["register", "web", outside.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(lookup_json(&repo, &["user", "-t", "fr"]).len(), 1);

    let output = glossa(&repo, &["list"]);
    assert!(stdout(&output).contains("shared.en.fr.csv"));

    let output = glossa(&repo, &["unregister", "web", "shared.en.fr"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(lookup_json(&repo, &["user"]).is_empty());
    assert!(
        !repo
            .root()
            .join("projects/web/glossary/shared.en.fr.csv")
            .exists()
    );
}

#[test]
fn config_defaults_apply_to_lookup() {
    let repo = Repo::new();
    repo.write("docs", "spec.en.ja.csv", "user,ユーザ\n");
    repo.write("docs", "spec.en.fr.csv", "user,utilisateur\n");
    assert!(glossa(&repo, &["index"]).status.success());
    assert_eq!(lookup_json(&repo, &["user"]).len(), 2);

    let output = glossa(&repo, &["config", "target_language", "fr"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&glossa(&repo, &["config", "target_language"])).trim(), "fr");

    let hits = lookup_json(&repo, &["user"]);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["target_language"], "fr");

    // Flags override config
    let hits = lookup_json(&repo, &["user", "--target-lang", "ja"]);
    assert_eq!(hits[0]["target_language"], "ja");
}

#[test]
fn stats_and_remove() {
    let repo = Repo::new();
    repo.write("docs", "spec.en.ja.csv", "user,ユーザ\nserver,サーバー\n");
    assert!(glossa(&repo, &["index"]).status.success());

    let output = glossa(&repo, &["stats"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Record count:     2"));

    let output = glossa(&repo, &["remove"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Removed index"));
    assert!(!glossa(&repo, &["user"]).status.success());
}
