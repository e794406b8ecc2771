//! End-to-end activation through the bash entry point.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const TOOLSDIR: &str = env!("CARGO_BIN_EXE_toolsdir");

/// Overrides that would replace the sandbox config.
const OVERRIDES: [&str; 7] = [
    "TOOLSDIR_GENERATOR",
    "TOOLSDIR_BASH",
    "TOOLSDIR_CMD",
    "TOOLSDIR_POWERSHELL",
    "TOOLSDIR_TEMP_PREFIX",
    "TOOLSDIR_COLOR",
    "TOOLSDIR_LOG",
];

/// A generator script, a config pointing at it, and a rendered entry point.
struct Sandbox {
    _dir: tempfile::TempDir,
    work: PathBuf,
    adapter: PathBuf,
    config: PathBuf,
}

impl Sandbox {
    /// `body` runs inside the generator with `$1` = temp path, `$2` = tag.
    fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();

        let generator = dir.path().join("generate.sh");
        std::fs::write(
            &generator,
            format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$1\")/generator-args.txt\"\n{body}\n"
            ),
        )
        .unwrap();
        std::fs::set_permissions(&generator, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!("[generator]\ncommand = [\"{}\"]\n", generator.display()),
        )
        .unwrap();

        let init = Command::new(TOOLSDIR).args(["init", "bash"]).output().unwrap();
        assert!(init.status.success());
        let adapter = dir.path().join("Activate.sh");
        std::fs::write(&adapter, &init.stdout).unwrap();

        Self {
            _dir: dir,
            work,
            adapter,
            config,
        }
    }

    /// `program` run from the work directory against the sandbox config only.
    fn command(&self, program: &str) -> Command {
        let mut command = Command::new(program);
        command
            .current_dir(&self.work)
            .env("TOOLSDIR_CONFIG", &self.config)
            .env("NO_COLOR", "1")
            .env_remove("FOO");
        for name in OVERRIDES {
            command.env_remove(name);
        }
        command
    }

    fn bash(&self, script: &str) -> Output {
        self.command("bash")
            .args(["--noprofile", "--norc", "-c", script])
            .output()
            .unwrap()
    }

    fn source(&self, args: &str, after: &str) -> (String, String) {
        let output = self.bash(&format!(
            "source '{}' {args}\necho \"rc=$?\"\n{after}",
            self.adapter.display()
        ));
        (
            String::from_utf8(output.stdout).unwrap(),
            String::from_utf8(output.stderr).unwrap(),
        )
    }

    fn temp_scripts(&self) -> Vec<PathBuf> {
        temp_scripts_in(&self.work)
    }

    fn generator_args(&self) -> Option<Vec<String>> {
        generator_args_in(&self.work)
    }
}

fn temp_scripts_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("ExecuteImpl"))
        })
        .collect()
}

fn generator_args_in(dir: &Path) -> Option<Vec<String>> {
    let text = std::fs::read_to_string(dir.join("generator-args.txt")).ok()?;
    Some(text.lines().map(String::from).collect())
}

fn has_line(text: &str, line: &str) -> bool {
    text.lines().any(|l| l == line)
}

#[test]
fn exported_variable_reaches_caller() {
    let sandbox = Sandbox::new(r#"printf 'export FOO=bar\n' > "$1""#);
    let (stdout, stderr) = sandbox.source(
        "/opt/tools --flag",
        "echo \"FOO=${FOO-unset}\"\necho \"helpers=${_toolsdir_rc-unset},${_toolsdir_replay-unset}\"",
    );

    assert!(has_line(&stdout, "rc=0"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "FOO=bar"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "helpers=unset,unset"), "{stdout}");
    assert!(stderr.contains("SUCCESS: Tools have been activated."), "{stderr}");
    assert!(sandbox.temp_scripts().is_empty());

    let args = sandbox.generator_args().unwrap();
    let temp = Path::new(&args[0]);
    assert_eq!(temp.parent(), Some(sandbox.work.as_path()));
    assert!(args[0].ends_with(".sh"));
    assert_eq!(&args[1..], ["bash", "/opt/tools", "--flag"]);
}

#[test]
fn generator_failure_is_reported_and_nothing_runs() {
    let sandbox = Sandbox::new(r#"printf 'export FOO=bar\n' > "$1"; exit 2"#);
    let (stdout, stderr) = sandbox.source("", "echo \"FOO=${FOO-unset}\"");

    assert!(has_line(&stdout, "rc=1"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "FOO=unset"), "{stdout}");
    assert!(stderr.contains("ERROR: Unable to activate tools."), "{stderr}");
    assert!(stderr.contains("ERROR:     [generator failed]"), "{stderr}");
    // kept for inspection, never executed
    assert_eq!(sandbox.temp_scripts().len(), 1);
}

#[test]
fn no_script_is_success() {
    let sandbox = Sandbox::new("exit 0");
    let (stdout, stderr) = sandbox.source("", "");

    assert!(has_line(&stdout, "rc=0"), "{stdout}\n{stderr}");
    assert!(stderr.contains("SUCCESS:"), "{stderr}");
    assert!(sandbox.temp_scripts().is_empty());
}

#[test]
fn failing_script_keeps_file_and_partial_changes() {
    let sandbox = Sandbox::new(r#"printf 'export FOO=partial\nfalse\n' > "$1""#);
    let (stdout, stderr) = sandbox.source("", "echo \"FOO=${FOO-unset}\"");

    assert!(has_line(&stdout, "rc=1"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "FOO=partial"), "{stdout}");
    let left = sandbox.temp_scripts();
    assert_eq!(left.len(), 1, "{left:?}");
    assert!(
        stderr.contains(&format!("ERROR:     [{} failed]", left[0].display())),
        "{stderr}"
    );
}

#[test]
fn executing_entry_point_is_refused() {
    let sandbox = Sandbox::new(r#"printf 'export FOO=bar\n' > "$1""#);
    let output = sandbox.bash(&format!("bash '{}'", sandbox.adapter.display()));
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("ERROR: Unable to activate tools."), "{stderr}");
    assert!(stderr.contains("must be sourced"), "{stderr}");
    assert!(sandbox.generator_args().is_none());
    assert!(sandbox.temp_scripts().is_empty());
}

#[test]
fn repeated_activation_does_not_duplicate_path_entries() {
    let sandbox = Sandbox::new(
        r#"printf 'if [[ ":${PATH}:" != *":/opt/demo/bin:"* ]]; then export PATH="/opt/demo/bin${PATH:+:${PATH}}"; fi\n' > "$1""#,
    );
    let (stdout, stderr) = sandbox.source(
        "",
        &format!(
            "source '{}'\necho \"rc2=$?\"\necho \"count=$(echo \"$PATH\" | tr ':' '\\n' | grep -c '^/opt/demo/bin$')\"",
            sandbox.adapter.display()
        ),
    );

    assert!(has_line(&stdout, "rc=0"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "rc2=0"), "{stdout}\n{stderr}");
    assert!(has_line(&stdout, "count=1"), "{stdout}");
}

#[test]
fn relative_working_dir_is_resolved_once() {
    let sandbox = Sandbox::new(r#"printf 'export FOO=bar\n' > "$1""#);
    let sub = sandbox.work.join("sub");
    std::fs::create_dir(&sub).unwrap();

    let output = sandbox
        .command(TOOLSDIR)
        .args(["activate", "bash", "--working-dir", "sub", "--"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert_eq!(output.status.code(), Some(0), "{stderr}");
    assert!(has_line(&stdout, r#"export FOO="bar""#), "{stdout}");
    let args = generator_args_in(&sub).unwrap();
    assert_eq!(Path::new(&args[0]).parent(), Some(sub.as_path()));
    assert!(temp_scripts_in(&sub).is_empty());
}

#[test]
fn unset_is_replayed() {
    let sandbox = Sandbox::new(r#"printf 'unset REMOVE_ME\n' > "$1""#);
    let output = sandbox.bash(&format!(
        "export REMOVE_ME=1\nsource '{}'\necho \"REMOVE_ME=${{REMOVE_ME-unset}}\"",
        sandbox.adapter.display()
    ));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(has_line(&stdout, "REMOVE_ME=unset"), "{stdout}");
}

#[test]
fn env_snapshot_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("env.json");
    let status = Command::new(TOOLSDIR)
        .args(["env-snapshot", "--output"])
        .arg(&out)
        .env("TOOLSDIR_SNAPSHOT_PROBE", "a \"quoted\" value")
        .status()
        .unwrap();
    assert!(status.success());
    let json = std::fs::read_to_string(&out).unwrap();
    assert!(json.contains(r#""TOOLSDIR_SNAPSHOT_PROBE":"a \"quoted\" value""#), "{json}");
}

#[test]
fn version_and_init_print_to_stdout() {
    let output = Command::new(TOOLSDIR).arg("version").output().unwrap();
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("toolsdir "));

    for (shell, needle) in [
        ("bash", "activate bash"),
        ("batch", "activate batch"),
        ("powershell", "activate powershell"),
    ] {
        let output = Command::new(TOOLSDIR).args(["init", shell]).output().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8(output.stdout).unwrap().contains(needle));
    }
}
