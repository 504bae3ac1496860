//! Integration tests for volby

mod results;
mod support;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use volby::cache::CacheStore;
    use volby::model::unix_now;

    fn volby() -> Command {
        cargo_bin_cmd!("volby")
    }

    /// Write a config pointing the cache at `dir` and the upstream at `base_url`
    fn write_config(temp: &TempDir, base_url: &str) -> std::path::PathBuf {
        let path = temp.path().join("config.toml");
        let cache_dir = temp.path().join("cache");
        fs::write(
            &path,
            format!(
                "[source]\nbase_url = \"{}\"\ntimeout_secs = 2\n\n[cache]\ndir = \"{}\"\n",
                base_url,
                cache_dir.display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();
        path
    }

    fn cache_dir(temp: &TempDir) -> std::path::PathBuf {
        temp.path().join("cache")
    }

    fn seed_snapshot(dir: &Path) {
        let store = CacheStore::new(dir);
        let dataset: volby::Dataset = serde_json::from_value(serde_json::json!({
            "metadata": {
                "year": 2021,
                "lang": "EN",
                "fetched_at": 1_633_000_000.0,
                "source": "https://www.volby.cz/pls/ps2021/ps2?xjazyk=EN"
            },
            "summary": { "wards_processed_percent": 100.0 },
            "parties": [{"number": 13, "name": "SPOLU", "votes": 1493905, "vote_share": 27.79}]
        }))
        .unwrap();
        store
            .store(2021, "EN", &dataset, Some("\"seed\""), unix_now())
            .unwrap();
    }

    #[test]
    fn help_displays() {
        volby()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Czech parliamentary election results"));
    }

    #[test]
    fn version_displays() {
        volby()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("volby"));
    }

    #[test]
    fn config_path_honours_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        volby()
            .env("VOLBY_CONFIG", &path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        volby()
            .env("VOLBY_CONFIG", temp.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[election]").and(predicate::str::contains("year = 2025")));
    }

    #[test]
    fn config_init_repairs_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[source\n").unwrap();

        volby()
            .env("VOLBY_CONFIG", &path)
            .args(["cache", "path"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));

        volby()
            .env("VOLBY_CONFIG", &path)
            .args(["config", "init", "--force"])
            .assert()
            .success();

        assert!(fs::read_to_string(&path).unwrap().contains("[cache]"));
    }

    #[test]
    fn cache_path_uses_configured_dir() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, "http://127.0.0.1:9/ps{year}/");
        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cache"));
    }

    #[test]
    fn cache_list_and_clear() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, "http://127.0.0.1:9/ps{year}/");
        seed_snapshot(&cache_dir(&temp));

        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("ps2021_en.json")
                    .and(predicate::str::contains("\"state\": \"fresh\""))
                    .and(predicate::str::contains("\"is_final\": true")),
            );

        // without --yes a non-interactive run keeps the files
        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
        assert!(cache_dir(&temp).join("ps2021_en.json").exists());

        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 1 snapshot(s)"));
        assert!(!cache_dir(&temp).join("ps2021_en.json").exists());
    }

    #[test]
    fn fetch_serves_fresh_cache_without_network() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, "http://127.0.0.1:9/ps{year}/");
        seed_snapshot(&cache_dir(&temp));

        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["fetch", "--year", "2021", "--no-fallback", "--format", "json"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("\"hit\": true")
                    .and(predicate::str::contains("\"effective_year\": 2021"))
                    .and(predicate::str::contains("SPOLU")),
            );
    }

    #[test]
    fn fetch_reports_unreachable_upstream() {
        let temp = TempDir::new().unwrap();
        let config = write_config(&temp, "http://127.0.0.1:9/ps{year}/");

        volby()
            .env("VOLBY_CONFIG", &config)
            .args(["fetch", "--year", "2025", "--format", "plain"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:").and(predicate::str::contains("Hint:")));
    }
}
