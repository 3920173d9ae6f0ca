use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    pools_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pools_path = dir.path().join("pools.json");
        let ctx = Self { dir, pools_path };

        let out = ctx.run(&[
            "synth",
            "-o",
            ctx.pools_path.to_str().unwrap(),
            "--weapons",
            "4",
            "--armor",
            "7",
            "--emblems",
            "3",
            "--accessories",
            "5",
        ]);
        assert!(out.status.success(), "synth failed: {:?}", out);
        ctx
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_runeforge"))
            .args(args)
            .output()
            .expect("Failed to execute binary")
    }
}

#[test]
fn test_cli_search_json_report() {
    let ctx = TestContext::new();
    let out = ctx.run(&[
        "search",
        "-p",
        ctx.pools_path.to_str().unwrap(),
        "--strategy",
        "single-phase",
        "--threads",
        "2",
        "--json",
    ]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("report is JSON");
    assert!(report["bestScore"].is_number());
    assert_eq!(report["summary"]["armor"].as_array().unwrap().len(), 5);
    assert_eq!(report["total"], 4 * 21 * 3 * 10);
}

#[test]
fn test_cli_search_table_and_rank() {
    let ctx = TestContext::new();
    let out = ctx.run(&["search", "-p", ctx.pools_path.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("weapon-"));

    let out = ctx.run(&["rank", "-p", ctx.pools_path.to_str().unwrap(), "-l", "3"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("accessory-"));
}

#[test]
fn test_cli_weights_file_and_flag_override() {
    let ctx = TestContext::new();
    let weights = ctx.dir.path().join("weights.json");
    std::fs::write(&weights, r#"{"trigger_weight": 0.5}"#).unwrap();

    let out = ctx.run(&[
        "search",
        "-p",
        ctx.pools_path.to_str().unwrap(),
        "--weights",
        weights.to_str().unwrap(),
        "--synergy-multiplier",
        "1.2",
        "--json",
    ]);
    assert!(out.status.success());

    // A flag that breaks validation fails the run.
    let out = ctx.run(&[
        "search",
        "-p",
        ctx.pools_path.to_str().unwrap(),
        "--weights",
        weights.to_str().unwrap(),
        "--synergy-multiplier",
        "0.5",
    ]);
    assert!(!out.status.success());
}

#[test]
fn test_cli_empty_pool_fails() {
    let ctx = TestContext::new();
    let sparse = ctx.dir.path().join("sparse.json");
    std::fs::write(
        &sparse,
        r#"{"weapons": [{"id": "w", "name": "w"}], "armor": [{"id": "a", "name": "a"}]}"#,
    )
    .unwrap();
    let out = ctx.run(&["search", "-p", sparse.to_str().unwrap()]);
    assert!(!out.status.success());
}

#[test]
fn test_cli_distinct_accessory_skills() {
    let ctx = TestContext::new();
    let pools = ctx.dir.path().join("skills.json");
    std::fs::write(
        &pools,
        r#"{
            "weapons": [{"id": "w", "name": "w"}],
            "armor": [
                {"id": "a1", "name": "a1"}, {"id": "a2", "name": "a2"},
                {"id": "a3", "name": "a3"}, {"id": "a4", "name": "a4"},
                {"id": "a5", "name": "a5"}
            ],
            "emblems": [{"id": "e", "name": "e"}],
            "accessories": [
                {"id": "c1", "name": "c1", "skill": "nova"},
                {"id": "c2", "name": "c2", "skill": "nova"},
                {"id": "c3", "name": "c3", "skill": "dash"},
                {"id": "c4", "name": "c4", "skill": "slash"}
            ]
        }"#,
    )
    .unwrap();

    let out = ctx.run(&[
        "search",
        "-p",
        pools.to_str().unwrap(),
        "--strategy",
        "single-phase",
        "--distinct-accessory-skills",
        "--json",
    ]);
    assert!(out.status.success(), "search failed: {:?}", out);
    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("report is JSON");
    assert_eq!(report["total"], 2);

    // There is no separate recommend flag.
    let out = ctx.run(&["search", "-p", pools.to_str().unwrap(), "--recommend"]);
    assert!(!out.status.success());
}
