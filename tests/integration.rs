use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    return Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
}

/// Run `jumptocode resolve` from an empty directory so no config file leaks in.
fn resolve(fixture_name: &str, element: &str, extra: &[&str]) -> Output {
    let cwd = tempfile::tempdir().unwrap();
    return Command::new(env!("CARGO_BIN_EXE_jumptocode"))
        .current_dir(cwd.path())
        .env("RUST_LOG", "warn")
        .arg("resolve")
        .arg(fixture(fixture_name))
        .arg(element)
        .args(extra)
        .output()
        .unwrap();
}

#[test]
fn resolves_nested_element_to_source_line() {
    let output = resolve("cart_page.json", "3", &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Found: /home/dev/shop/src/components/CheckoutButton.tsx:27"), "{stdout}");
    assert!(stdout.contains("Display:   src/components/CheckoutButton.tsx:27"), "{stdout}");
    assert!(stdout.contains("Component: CheckoutButton"), "{stdout}");
    assert!(stdout.contains("Element:   #2"), "{stdout}");
}

#[test]
fn json_report_carries_outcome_and_route() {
    let output = resolve("cart_page.json", "2", &["--json", "--variant", "basic"]);
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "found");
    assert_eq!(report["location"]["file"], "/home/dev/shop/src/components/CheckoutButton.tsx");
    assert_eq!(report["location"]["line"], 27);
    assert_eq!(report["origin"], 2);
    assert_eq!(report["route"]["handle"]["kind"], "fiber");
    assert!(report.get("open").is_none());
}

#[test]
fn devtools_hook_finds_element_without_handles() {
    let output = resolve("registry_page.json", "2", &["--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["location"]["file"], "/home/dev/shop/src/Banner.tsx");
    assert_eq!(report["location"]["line"], 14);
    assert_eq!(report["route"]["registry"]["exact"], true);
    assert_eq!(report["component"], "Banner");

    let output = resolve("registry_page.json", "2", &["--variant", "basic"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn container_without_source_exits_one() {
    let output = resolve("cart_page.json", "1", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("# No Debug Source Found"));

    let output = resolve("production_page.json", "1", &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn page_without_handles_exits_two() {
    let output = resolve("plain_page.json", "2", &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).contains("# No Handle Found"));
}

#[test]
fn corrupt_snapshot_and_bad_index_exit_three() {
    let output = resolve("corrupt_page.json", "0", &[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Snapshot Corrupt"));

    let output = resolve("plain_page.json", "42", &[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown Element"));
}

#[test]
fn info_json_lists_handle_keys_in_priority_order() {
    let cwd = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_jumptocode"))
        .current_dir(cwd.path())
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let prefixes: Vec<&str> = info["handle_keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["prefix"].as_str().unwrap())
        .collect();
    assert_eq!(prefixes, ["__reactFiber$", "__reactInternalInstance$", "__reactProps$", "__reactContainer$"]);
    assert_eq!(info["budgets"]["ancestor"], 100);
    assert_eq!(info["config"]["port"], 5123);
}

#[test]
fn info_markdown_keeps_blank_line_before_budgets() {
    let cwd = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_jumptocode")).current_dir(cwd.path()).arg("info").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("|\n\n## Budgets\n"), "{stdout}");
}
