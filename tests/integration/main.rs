//! Integration tests for cachemule
//!
//! Everything here runs without a container engine: these tests cover the
//! CLI surface and the failure paths that abort before docker is touched.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn cachemule() -> Command {
        cargo_bin_cmd!("cachemule")
    }

    #[test]
    fn help_displays() {
        cachemule()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("BuildKit"));
    }

    #[test]
    fn version_displays() {
        cachemule()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cachemule"));
    }

    #[test]
    fn extract_skip_short_circuits() {
        // --skip must succeed without a cache map, a Dockerfile, or docker
        cachemule()
            .args(["extract", "--skip"])
            .assert()
            .success()
            .stdout(predicate::str::contains("skipped"));
    }

    #[test]
    fn invalid_cache_map_fails() {
        cachemule()
            .args(["inject", "--cache-map", "not json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache map"));
    }

    #[test]
    fn missing_target_fails() {
        cachemule()
            .args(["inject", "--cache-map", r#"{"go-mod":{"id":"go-mod"}}"#])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing the required 'target'"));
    }

    #[test]
    fn traversal_key_fails() {
        cachemule()
            .args(["inject", "--cache-map", r#"{"../../etc":"/x"}"#])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsafe path"));
    }

    #[test]
    fn missing_build_file_fails() {
        cachemule()
            .args(["extract", "--dockerfile", "/nonexistent/Dockerfile"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to read build file"));
    }

    #[test]
    fn completions_generate() {
        cachemule()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cachemule"));
    }

    #[test]
    fn inject_help_shows_flags() {
        cachemule()
            .args(["inject", "--help"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("--cache-map")
                    .and(predicate::str::contains("--sync"))
                    .and(predicate::str::contains("--builder")),
            );
    }
}
