use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

struct Sandbox {
    home: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn database(&self) -> PathBuf {
        self.home.path().join("data").join("school.db")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_schoolbase"));
        cmd.arg("--database")
            .arg(self.database())
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("SCHOOLBASE_CONFIG")
            .env_remove("SCHOOLBASE_DATABASE")
            .env_remove("SCHOOLBASE_ADMIN_PASSWORD")
            .env_remove("SCHOOLBASE_DEMO_PASSWORD")
            .env_remove("SCHOOLBASE_USER_PASSWORD")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("run schoolbase")
    }

    fn run_with_secrets(&self, args: &[&str]) -> Output {
        self.command(args)
            .env("SCHOOLBASE_ADMIN_PASSWORD", "admin-secret-value")
            .env("SCHOOLBASE_DEMO_PASSWORD", "demo-secret-value")
            .output()
            .expect("run schoolbase")
    }

    fn write_config(&self, body: &str) -> PathBuf {
        let path = self.home.path().join("schoolbase.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

#[test]
fn help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_schoolbase"))
        .arg("--help")
        .output()
        .expect("run help");
    assert_ok(&output);
    let text = stdout(&output);
    for command in ["migrate", "status", "rollback", "schema", "seed", "cleanup-demo", "check", "create-user"] {
        assert!(text.contains(command), "missing {command}");
    }
}

#[test]
fn schema_prints_postgres_ddl_without_a_database() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["schema", "--dialect", "postgres"]);
    assert_ok(&output);
    let text = stdout(&output);
    assert!(text.contains("-- 0001_create_subscriptions (postgres)"));
    assert!(text.contains(r#"CREATE TABLE "complaint_updates""#));
    assert!(!sandbox.database().exists());

    let down = stdout(&sandbox.run(&["schema", "--down"]));
    let newest = down.find("0015_add_lookup_indexes").expect("newest migration");
    let oldest = down.find("0001_create_subscriptions").expect("oldest migration");
    assert!(newest < oldest);

    let bad = sandbox.run(&["schema", "--dialect", "mysql"]);
    assert!(!bad.status.success());
}

#[test]
fn migrate_status_check_and_rollback() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["migrate"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("Applied 15 migration(s)"));
    assert!(stdout(&sandbox.run(&["migrate"])).contains("up to date"));

    let status = stdout(&sandbox.run(&["status"]));
    assert!(status.contains("15 applied, 0 pending"));

    let check = sandbox.run(&["check"]);
    assert_ok(&check);
    let report = stdout(&check);
    assert!(report.contains("Foreign keys: on"));
    assert!(report.contains("15/15 applied"));

    let rollback = sandbox.run(&["rollback", "--steps", "2"]);
    assert_ok(&rollback);
    assert!(stdout(&rollback).contains("reverted  0014_add_scholarship_details"));
    assert!(stdout(&sandbox.run(&["status"])).contains("13 applied, 2 pending"));
}

#[test]
fn check_reports_unreachable_database() {
    let sandbox = Sandbox::new();
    let blocker = sandbox.home.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_schoolbase"))
        .arg("--database")
        .arg(blocker.join("school.db"))
        .arg("check")
        .env("HOME", sandbox.home.path())
        .env_remove("SCHOOLBASE_CONFIG")
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot connect to database"));
}

#[test]
fn seed_requires_a_secret_and_is_idempotent() {
    let sandbox = Sandbox::new();
    assert_ok(&sandbox.run(&["migrate"]));

    let missing = sandbox.run(&["seed"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(stderr(&missing).contains("SCHOOLBASE_ADMIN_PASSWORD"));

    let first = sandbox.run_with_secrets(&["seed"]);
    assert_ok(&first);
    assert!(stdout(&first).contains("subscription_plans"));
    assert!(stdout(&first).contains("5 created"));

    let second = sandbox.run_with_secrets(&["seed"]);
    assert_ok(&second);
    assert!(stdout(&second).contains("0 created, 5 already present"));
    assert!(stdout(&second).contains("0 created, 1 already present"));
}

#[test]
fn seed_reads_password_file_from_config() {
    let sandbox = Sandbox::new();
    let secret = sandbox.home.path().join("admin.secret");
    std::fs::write(&secret, "from-a-secret-file\n").unwrap();
    let config = sandbox.write_config(&format!(
        "[seed]\nadmin_email = \"ops@platform.example.com\"\npassword_file = {:?}\n",
        secret.to_string_lossy()
    ));

    assert_ok(&sandbox.run(&["migrate"]));
    let output = sandbox.run(&["--config", config.to_str().unwrap(), "seed"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("super_admin"));
}

#[test]
fn seed_refuses_pending_migrations() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_secrets(&["seed"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("schoolbase migrate"));
}

#[test]
fn demo_seed_and_cleanup() {
    let sandbox = Sandbox::new();
    assert_ok(&sandbox.run(&["migrate"]));
    let seeded = sandbox.run_with_secrets(&["seed", "--demo"]);
    assert_ok(&seeded);
    assert!(stdout(&seeded).contains("demo_school"));

    let refused = sandbox.run(&["cleanup-demo"]);
    assert_eq!(refused.status.code(), Some(1));
    assert!(stderr(&refused).contains("--yes"));

    let cleaned = sandbox.run(&["cleanup-demo", "--yes"]);
    assert_ok(&cleaned);
    assert!(stdout(&cleaned).contains("Removed 1 school(s) and 4 user(s)"));

    let again = sandbox.run(&["cleanup-demo", "--yes"]);
    assert!(stdout(&again).contains("Removed 0 school(s) and 0 user(s)"));
}

#[test]
fn create_user_needs_school_for_school_roles() {
    let sandbox = Sandbox::new();
    assert_ok(&sandbox.run(&["migrate"]));
    assert_ok(&sandbox.run_with_secrets(&["seed", "--demo"]));

    let base = [
        "create-user",
        "--email",
        "librarian@demo.schoolbase.local",
        "--first-name",
        "Lata",
        "--last-name",
        "Rao",
        "--role",
        "teacher",
    ];
    let without_school = sandbox
        .command(&base)
        .env("SCHOOLBASE_USER_PASSWORD", "teacher-secret")
        .output()
        .unwrap();
    assert_eq!(without_school.status.code(), Some(1));
    assert!(stderr(&without_school).contains("--school-email"));

    let mut args = base.to_vec();
    args.extend(["--school-email", "school@demo.schoolbase.local"]);
    let created = sandbox
        .command(&args)
        .env("SCHOOLBASE_USER_PASSWORD", "teacher-secret")
        .output()
        .unwrap();
    assert_ok(&created);
    assert!(stdout(&created).contains("Created teacher librarian@demo.schoolbase.local"));

    let duplicate = sandbox
        .command(&args)
        .env("SCHOOLBASE_USER_PASSWORD", "teacher-secret")
        .output()
        .unwrap();
    assert_eq!(duplicate.status.code(), Some(1));
    assert!(stderr(&duplicate).contains("unique"));
}

#[test]
fn unknown_role_is_rejected_by_the_parser() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&[
        "create-user",
        "--email",
        "x@example.com",
        "--first-name",
        "X",
        "--last-name",
        "Y",
        "--role",
        "janitor",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("janitor"));
}
