use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn satchel(workspace: &TempDir) -> Command {
    satchel_on(workspace, "main")
}

fn satchel_on(workspace: &TempDir, branch: &str) -> Command {
    let root = workspace.path().join("proj");
    fs::create_dir_all(&root).expect("create project dir");

    let root = fs::canonicalize(root).expect("canonical project dir");

    let mut cmd = Command::cargo_bin("satchel").expect("binary exists");
    cmd.current_dir(&root)
        .env("SATCHEL_CONFIG", workspace.path().join("no-config.toml"))
        .env_remove("SATCHEL_STORAGE_DIR")
        .env_remove("RUST_LOG")
        .arg("--storage-dir")
        .arg(workspace.path().join("store"))
        .arg("--root")
        .arg(&root)
        .arg("--branch")
        .arg(branch);
    cmd
}

fn proj(workspace: &TempDir, name: &str) -> String {
    let root = fs::canonicalize(workspace.path().join("proj")).expect("canonical project dir");
    root.join(name).display().to_string()
}

#[test]
fn help_displays_usage() {
    Command::cargo_bin("satchel")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn place_then_list_keeps_order() {
    let workspace = tempfile::tempdir().unwrap();

    satchel(&workspace)
        .args(["place", "b.txt", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("placed"));

    satchel(&workspace)
        .args(["place", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in satchel"));

    let expected = format!("{}\n{}\n", proj(&workspace, "b.txt"), proj(&workspace, "a.txt"));
    satchel(&workspace)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}

#[test]
fn promote_then_lucky_prints_front() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace)
        .args(["place", "a.txt", "b.txt"])
        .assert()
        .success();

    satchel(&workspace)
        .args(["promote", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("promoted"));

    satchel(&workspace)
        .args(["lucky", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", proj(&workspace, "b.txt"))));

    satchel(&workspace)
        .args(["pick", "2", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", proj(&workspace, "a.txt"))));
}

#[test]
fn pick_prompts_when_selector_missing() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace)
        .args(["place", "a.txt", "b.txt"])
        .assert()
        .success();

    satchel(&workspace)
        .args(["pick", "--print"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("1) "))
        .stdout(predicate::str::diff(format!("{}\n", proj(&workspace, "b.txt"))));
}

#[test]
fn empty_satchel_is_rejected() {
    let workspace = tempfile::tempdir().unwrap();
    for args in [&["lucky", "--print"][..], &["drop", "1"], &["pick", "1"]] {
        satchel(&workspace)
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("satchel is empty"));
    }
}

#[test]
fn burn_clears_only_current_branch() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace).args(["place", "a.txt"]).assert().success();
    satchel_on(&workspace, "dev")
        .args(["place", "dev.txt"])
        .assert()
        .success();

    satchel(&workspace).arg("burn").assert().success();
    satchel(&workspace).arg("burn").assert().success();

    satchel(&workspace).arg("list").assert().success().stdout("");
    satchel_on(&workspace, "dev")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", proj(&workspace, "dev.txt"))));
}

#[test]
fn corrupt_store_is_reported() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace).args(["place", "a.txt"]).assert().success();

    let store = workspace.path().join("store");
    let file = fs::read_dir(&store)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| path.extension().is_some_and(|ext| ext == "eld"))
        .expect("satchel file written");
    fs::write(&file, "((\"unterminated").unwrap();

    satchel(&workspace)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt satchel store"));
}

#[test]
fn set_default_directory_scopes_later_commands() {
    let workspace = tempfile::tempdir().unwrap();
    let store = workspace.path().join("store");
    let elsewhere = workspace.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();

    let base = |dir: &Path| {
        let mut cmd = Command::cargo_bin("satchel").expect("binary exists");
        cmd.current_dir(dir)
            .env("SATCHEL_CONFIG", workspace.path().join("no-config.toml"))
            .arg("--storage-dir")
            .arg(&store)
            .arg("--branch")
            .arg("main");
        cmd
    };

    base(workspace.path())
        .args(["set-default-directory"])
        .arg(&elsewhere)
        .assert()
        .success()
        .stdout(predicate::str::contains("default directory set to"));

    base(workspace.path())
        .arg("scope")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("root: {}", elsewhere.display())));

    base(workspace.path())
        .args(["set-default-directory", "--project-root"])
        .assert()
        .success();

    base(workspace.path())
        .arg("scope")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("root: {}", elsewhere.display())).not());
}

#[test]
fn list_json_reports_scope_and_entries() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace).args(["place", "a.txt"]).assert().success();

    let output = satchel(&workspace).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["branch"], "main");
    assert_eq!(value["entries"][0], proj(&workspace, "a.txt"));
}

#[cfg(unix)]
#[test]
fn open_command_comes_from_resolved_project_config() {
    let workspace = tempfile::tempdir().unwrap();
    let elsewhere = workspace.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    let settings = workspace.path().join("proj/.satchel");
    fs::create_dir_all(&settings).unwrap();
    fs::write(
        settings.join("config.toml"),
        "[open]\ncommand = [\"sh\", \"-c\", \"echo opened-with-project-config $0\"]\n",
    )
    .unwrap();

    let file = proj(&workspace, "a.txt");
    satchel(&workspace).args(["place", &file]).assert().success();

    satchel(&workspace)
        .current_dir(&elsewhere)
        .env_remove("VISUAL")
        .env_remove("EDITOR")
        .arg("lucky")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("opened-with-project-config {file}\n")));
}

#[test]
fn place_reports_each_path_once_per_call() {
    let workspace = tempfile::tempdir().unwrap();
    satchel(&workspace)
        .args(["place", "a.txt", "b.txt", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "placed {}\nplaced {}\nalready in satchel: {}\n",
            proj(&workspace, "a.txt"),
            proj(&workspace, "b.txt"),
            proj(&workspace, "a.txt"),
        )));
}

#[test]
fn completions_are_generated() {
    Command::cargo_bin("satchel")
        .expect("binary exists")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("satchel"));
}
