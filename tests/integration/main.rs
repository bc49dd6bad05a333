//! Integration tests for Kiko

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn kiko() -> Command {
        cargo_bin_cmd!("kiko")
    }

    #[test]
    fn help_displays() {
        kiko()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("incremental builds"));
    }

    #[test]
    fn version_displays() {
        kiko()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("kiko"));
    }

    #[test]
    fn missing_config_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        kiko()
            .current_dir(temp.path())
            .env_remove("KIKO_CONFIG")
            .arg("build")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Configuration file not found"));
    }
}

mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// A project whose "compiler" copies main.src to main and whose
    /// "archiver" copies main to archive.zip
    const CONFIG: &str = r#"
[build]
compile = ["sh", "-c", "cat {path}/main.src > {path}/main"]
archive = ["sh", "-c", "cp {path}/main {path}/archive.zip"]

[[functions]]
name = "fn-a"
path = "units/a"

[[functions]]
name = "fn-b"
path = "units/b"
"#;

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("kiko.toml"), CONFIG).unwrap();
        write_source(temp.path(), "units/a", "package a v1");
        write_source(temp.path(), "units/b", "package b v1");
        temp
    }

    fn write_source(root: &Path, unit: &str, content: &str) {
        let dir = root.join(unit);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.src"), content).unwrap();
    }

    fn kiko(root: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("kiko");
        cmd.current_dir(root).env_remove("KIKO_CONFIG");
        cmd
    }

    fn cache_json(root: &Path) -> serde_json::Value {
        let content = fs::read_to_string(root.join(".hashCache.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn first_build_packages_everything() {
        let temp = project();

        kiko(temp.path())
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 re-packaged, 0 unchanged, 0 failed"));

        assert!(temp.path().join("units/a/archive.zip").exists());
        assert!(temp.path().join("units/b/archive.zip").exists());

        let cache = cache_json(temp.path());
        let records = cache.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["path"], "units/a");
        assert!(records[0]["hash"].is_string());
    }

    #[test]
    fn unchanged_build_skips_packaging() {
        let temp = project();
        kiko(temp.path()).arg("build").assert().success();
        let first = cache_json(temp.path());

        fs::remove_file(temp.path().join("units/a/archive.zip")).unwrap();
        kiko(temp.path())
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("0 re-packaged, 2 unchanged"));

        assert!(!temp.path().join("units/a/archive.zip").exists());
        assert_eq!(cache_json(temp.path()), first);
    }

    #[test]
    fn changed_source_repackages_only_that_unit() {
        let temp = project();
        kiko(temp.path()).arg("build").assert().success();

        write_source(temp.path(), "units/b", "package b v2");
        kiko(temp.path())
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 re-packaged, 1 unchanged"));
    }

    #[test]
    fn failed_unit_exits_two_and_keeps_others() {
        let temp = project();
        fs::remove_file(temp.path().join("units/b/main.src")).unwrap();

        kiko(temp.path())
            .arg("build")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Error compiling - fn-b"))
            .stderr(predicate::str::contains("1 of 2 unit(s) failed"));

        let cache = cache_json(temp.path());
        let records = cache.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["path"], "units/a");
    }

    #[test]
    fn cache_show_lists_records() {
        let temp = project();
        kiko(temp.path()).arg("build").assert().success();

        kiko(temp.path())
            .args(["cache", "show", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"path\": \"units/b\""))
            .stdout(predicate::str::contains("sha256"));
    }

    #[test]
    fn cache_show_empty() {
        let temp = project();
        kiko(temp.path())
            .args(["cache", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache records found."));
    }

    #[test]
    fn cache_clear_forces_repackage() {
        let temp = project();
        kiko(temp.path()).arg("build").assert().success();

        kiko(temp.path())
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 2 record(s)"));
        assert_eq!(cache_json(temp.path()), serde_json::json!([]));

        kiko(temp.path())
            .arg("build")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 re-packaged"));
    }

    #[test]
    fn cache_clear_resets_corrupt_cache() {
        let temp = project();
        fs::write(temp.path().join(".hashCache.json"), "[{\"path\": ").unwrap();

        kiko(temp.path())
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("reset cache at .hashCache.json"));
        assert_eq!(cache_json(temp.path()), serde_json::json!([]));
    }
}
