//! End-to-end tests driving the `protopull` binary against local source trees.
//!
//! Every source is a `path` source so nothing touches the network.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn protopull(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("protopull").unwrap();
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// Two local checkouts shaped like tensorflow / tensorflow_serving, plus a
/// `protopull.toml` pointing at them.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write(
            root,
            "serving/tensorflow_serving/apis/predict.proto",
            "syntax = \"proto3\";\n\
             import \"tensorflow/core/framework/tensor.proto\";\n\
             import \"tensorflow_serving/apis/model.proto\";\n",
        );
        write(
            root,
            "serving/tensorflow_serving/apis/model.proto",
            "syntax = \"proto3\";\nimport \"google/protobuf/wrappers.proto\";\n",
        );
        write(
            root,
            "tensorflow/tensorflow/core/framework/tensor.proto",
            "syntax = \"proto3\";\nimport \"tensorflow/core/framework/tensor_shape.proto\";\n",
        );
        write(
            root,
            "tensorflow/tensorflow/core/framework/tensor_shape.proto",
            "syntax = \"proto3\";\n",
        );
        write(
            root,
            "tensorflow/tensorflow/core/framework/unrelated.proto",
            "syntax = \"proto3\";\n",
        );

        let config = format!(
            r#"
destination = "out"

[[sources]]
name = "tensorflow"
path = '{}'

[[sources]]
name = "tensorflow_serving"
path = '{}'
"#,
            root.join("tensorflow").display(),
            root.join("serving").display(),
        );
        fs::write(root.join("protopull.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn out(&self) -> PathBuf {
        self.path().join("out")
    }
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_copies_exactly_the_closure() {
    let project = Project::new();
    let output = protopull(project.path()).output().unwrap();
    assert!(output.status.success(), "{}", stderr_of(&output));

    let out = project.out();
    assert!(out.join("tensorflow_serving/apis/predict.proto").is_file());
    assert!(out.join("tensorflow_serving/apis/model.proto").is_file());
    assert!(out.join("tensorflow/core/framework/tensor.proto").is_file());
    assert!(out.join("tensorflow/core/framework/tensor_shape.proto").is_file());
    assert!(!out.join("tensorflow/core/framework/unrelated.proto").exists());
    assert!(!out.join("google").exists());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("found 4 valid protos"), "{stdout}");
    assert!(stdout.contains("copying proto file:"), "{stdout}");
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = Project::new();
    let output = protopull(project.path())
        .arg("--dry-run")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(!project.out().exists());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("would copy proto file:"), "{stdout}");
    assert!(!stdout.contains("copying proto file:"), "{stdout}");
    assert!(stdout.contains("would copy 4 proto files"), "{stdout}");
}

#[test]
fn test_dry_run_trace_matches_real_run() {
    let project = Project::new();
    let dry = protopull(project.path())
        .arg("--dry-run")
        .output()
        .unwrap();
    let real = protopull(project.path()).output().unwrap();

    let pairs = |out: &std::process::Output| -> Vec<String> {
        stdout_of(out)
            .lines()
            .filter(|l| l.starts_with("  src:  ") || l.starts_with("  dest: "))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(pairs(&dry), pairs(&real));
    assert_eq!(pairs(&dry).len(), 8);
}

#[test]
fn test_trace_lists_files_and_imports() {
    let project = Project::new();
    let output = protopull(project.path())
        .arg("--dry-run")
        .output()
        .unwrap();
    let stdout = stdout_of(&output);

    let predict = project
        .path()
        .join("serving/tensorflow_serving/apis/predict.proto");
    let tensor = project
        .path()
        .join("tensorflow/tensorflow/core/framework/tensor.proto");
    assert!(
        stdout
            .lines()
            .any(|l| l == predict.display().to_string()),
        "{stdout}"
    );
    assert!(
        stdout.contains(&format!("  > {}", tensor.display())),
        "{stdout}"
    );
    assert!(
        stdout.contains("  > google/protobuf/wrappers.proto (external)"),
        "{stdout}"
    );
}

#[test]
fn test_unknown_root_exits_nonzero_without_writing() {
    let project = Project::new();
    write(
        project.path(),
        "serving/tensorflow_serving/apis/bad.proto",
        "import \"unknownroot/x.proto\";\n",
    );
    let output = protopull(project.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("unknown root `unknownroot`"), "{stderr}");
    assert!(stderr.contains("unknownroot/x.proto"), "{stderr}");
    assert!(!project.out().exists());
}

#[test]
fn test_missing_import_target_exits_nonzero() {
    let project = Project::new();
    write(
        project.path(),
        "serving/tensorflow_serving/apis/dangling.proto",
        "import \"tensorflow/core/gone.proto\";\n",
    );
    let output = protopull(project.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("required file does not exist"), "{stderr}");
    assert!(stderr.contains("tensorflow/core/gone.proto"), "{stderr}");
    assert!(!project.out().exists());
}

#[test]
fn test_dest_flag_overrides_config() {
    let project = Project::new();
    let output = protopull(project.path())
        .args(["--dest", "elsewhere"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(
        project
            .path()
            .join("elsewhere/tensorflow_serving/apis/predict.proto")
            .is_file()
    );
    assert!(!project.out().exists());
}

#[test]
fn test_tag_flag_repairs_empty_file_tag() {
    let project = Project::new();
    let config_path = project.path().join("protopull.toml");
    let config = fs::read_to_string(&config_path).unwrap();
    fs::write(&config_path, format!("tag = \"\"\n{config}")).unwrap();

    let rejected = protopull(project.path())
        .arg("--dry-run")
        .output()
        .unwrap();
    assert_eq!(rejected.status.code(), Some(1));
    assert!(stderr_of(&rejected).contains("`tag` must not be empty"));

    let output = protopull(project.path())
        .args(["--dry-run", "--tag", "r2.8"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr_of(&output));
}

#[test]
fn test_missing_local_source_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("protopull.toml"),
        r#"
[seeds]
source = "api"
pattern = "*.proto"

[[sources]]
name = "api"
path = "does-not-exist"
"#,
    )
    .unwrap();
    let output = protopull(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("acquiring source `api`"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("protopull.toml"), "sources = 3\n").unwrap();
    let output = protopull(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("failed to parse"));
}

#[test]
fn test_help_lists_options() {
    let output = protopull(Path::new("."))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    for flag in ["--tag", "--dry-run", "--config", "--working-dir", "--dest"] {
        assert!(stdout.contains(flag), "missing {flag} in:\n{stdout}");
    }
}
