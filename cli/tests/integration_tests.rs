use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("closetly_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const FIXTURE: &str = r#"
users:
  - { username: ada, name: Ada Lovelace, password: pw }
  - { username: bob, name: Bob, password: pw }
  - { username: thrift, name: Thrift Town, role: storeowner, password: pw }
  - { username: vera, name: Vera, role: stylist, password: pw }
clothes:
  - { clothing_id: 1, clothing_type: shirt }
  - { clothing_id: 2, clothing_type: jeans }
  - { clothing_id: 3, clothing_type: coat, store_name: thrift }
personal:
  - { username: ada, clothing_id: 1 }
  - { username: ada, clothing_id: 2 }
collab:
  - { username: ada, clothing_id: 1 }
store:
  - { store_name: thrift, clothing_id: 3, price: 2000 }
"#;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_closetly")
}

fn closetly(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .output()
        .expect("failed to run closetly")
}

/// Creates a database at `dir/closet.db` seeded with [`FIXTURE`].
fn seeded_db(dir: &TempDir) -> PathBuf {
    let db = dir.join("closet.db");
    let source = dir.join("closet.yaml");
    fs::write(&source, FIXTURE).expect("failed to write fixture");

    let db_arg = db.to_str().unwrap();
    assert!(closetly(&["migrate", "up", "--db", db_arg]).status.success());
    let seed = closetly(&["migrate", "seed", "--db", db_arg, "--source", source.to_str().unwrap()]);
    assert!(seed.status.success(), "seed failed: {}", String::from_utf8_lossy(&seed.stderr));
    db
}

/// Runs an interactive session with `input` piped to stdin.
fn interact(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn closetly");
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }
    child.wait_with_output().expect("failed to wait for closetly")
}

// ---------------------------------------------------------------------------
// Migrate tests
// ---------------------------------------------------------------------------

#[test]
fn migrate_up_creates_tables() {
    let dir = TempDir::new("migrate_up");
    let db = dir.join("closet.db");
    let db_arg = db.to_str().unwrap();

    assert!(closetly(&["migrate", "up", "--db", db_arg]).status.success());
    assert!(db.exists());

    let out = closetly(&["migrate", "status", "--db", db_arg]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Tables exist: yes"), "got: {stdout}");
    assert!(stdout.contains("Users: 0"));
}

#[test]
fn migrate_seed_populates_database() {
    let dir = TempDir::new("migrate_seed");
    let db = seeded_db(&dir);

    let out = closetly(&["migrate", "status", "--db", db.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Users: 4"), "got: {stdout}");
    assert!(stdout.contains("Clothing items: 3"));
    assert!(stdout.contains("Store listings: 1"));
}

#[test]
fn migrate_refresh_clears_and_reseeds() {
    let dir = TempDir::new("migrate_refresh");
    let db = seeded_db(&dir);
    let db_arg = db.to_str().unwrap();

    let out = interact(&["--db", db_arg], "zed\ny\nZed\nc\npw\nq\n");
    assert!(out.status.success());

    let source = dir.join("closet.yaml");
    let out = closetly(&["migrate", "refresh", "--db", db_arg, "--source", source.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Users inserted: 4"));
}

#[test]
fn migrate_down_removes_tables() {
    let dir = TempDir::new("migrate_down");
    let db = seeded_db(&dir);
    let db_arg = db.to_str().unwrap();

    assert!(closetly(&["migrate", "down", "--db", db_arg]).status.success());
    let out = closetly(&["migrate", "status", "--db", db_arg]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("Tables exist: no"));
}

#[test]
fn migrate_seed_rejects_unknown_format() {
    let dir = TempDir::new("migrate_seed_format");
    let db = dir.join("closet.db");
    let source = dir.join("closet.toml");
    fs::write(&source, "users = []").unwrap();
    let db_arg = db.to_str().unwrap();

    closetly(&["migrate", "up", "--db", db_arg]);
    let out = closetly(&["migrate", "seed", "--db", db_arg, "--source", source.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("seed failed"));
}

// ---------------------------------------------------------------------------
// Interactive session tests
// ---------------------------------------------------------------------------

#[test]
fn missing_database_fails_quietly() {
    let dir = TempDir::new("missing_db");
    let db = dir.join("absent.db");

    let out = interact(&["run", "--db", db.to_str().unwrap()], "");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("An error occurred, please contact the administrator."));
    assert!(!stderr.contains("absent.db"));
}

#[test]
fn missing_database_details_in_debug_mode() {
    let dir = TempDir::new("missing_db_debug");
    let db = dir.join("absent.db");

    let out = interact(&["run", "--db", db.to_str().unwrap(), "--debug"], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Database does not exist"));
}

#[test]
fn config_file_supplies_database() {
    let dir = TempDir::new("config_file");
    let db = seeded_db(&dir);
    let config = dir.join("closetly.yml");
    fs::write(&config, format!("database: {}\n", db.display())).unwrap();

    let out = interact(&["run", "--config", config.to_str().unwrap()], "ada\npw\nq\n");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Client options:"));
}

#[test]
fn wrong_password_exits_cleanly() {
    let dir = TempDir::new("wrong_password");
    let db = seeded_db(&dir);

    let out = interact(&["--db", db.to_str().unwrap()], "ada\nwrong\n");
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Incorrect login"));
    assert!(stdout.trim_end().ends_with("Good bye!"));
}

#[test]
fn borrow_persists_between_sessions() {
    let dir = TempDir::new("borrow_persists");
    let db = seeded_db(&dir);
    let db_arg = db.to_str().unwrap();

    let out = interact(&["--db", db_arg], "bob\npw\nc\n1\nq\n");
    assert!(String::from_utf8_lossy(&out.stdout).contains("Item successfully borrowed!"));

    let out = interact(&["--db", db_arg], "bob\npw\nc\n1\nq\n");
    assert!(String::from_utf8_lossy(&out.stdout).contains("Sorry, you cannot borrow this item :("));
}

#[test]
fn store_owner_discount_session() {
    let dir = TempDir::new("store_discount");
    let db = seeded_db(&dir);

    let out = interact(&["--db", db.to_str().unwrap()], "thrift\npw\ne\n3\n50\na\n\nq\n");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Store Owner options:"));
    assert!(stdout.contains("Item 3 now sells for $10.00 (50% off)."));
    assert!(stdout.contains("This is all the clothing items currently being sold at thrift:"));
}

#[test]
fn sign_up_then_sign_in() {
    let dir = TempDir::new("sign_up");
    let db = seeded_db(&dir);
    let db_arg = db.to_str().unwrap();

    let out = interact(&["--db", db_arg], "newbie\nY\nNew Bie\nb\nsecret\nq\n");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Account created. Welcome, New Bie!"));
    assert!(stdout.contains("Stylist options:"));

    let out = interact(&["--db", db_arg], "newbie\nsecret\nq\n");
    assert!(String::from_utf8_lossy(&out.stdout).contains("Welcome back, New Bie!"));
}

#[test]
fn demo_fixture_seeds() {
    let dir = TempDir::new("demo_fixture");
    let db = dir.join("closet.db");
    let db_arg = db.to_str().unwrap();
    let demo = concat!(env!("CARGO_MANIFEST_DIR"), "/../demos/closet.yaml");

    closetly(&["migrate", "up", "--db", db_arg]);
    let out = closetly(&["migrate", "seed", "--db", db_arg, "--source", demo]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
}
