//! Integration Test: Workspace Layering
//!
//! **Policy**: `policybot-core` is headless and owns all backend I/O. The
//! TUI only draws and routes keys. Inside core, views and surfaces never
//! touch the backend directly; they emit `Request`s and consume
//! `Completion`s.

use std::fs;

use architectural_enforcement::{find_violations, production_lines, rust_files, workspace_root, CodeLine};

fn report(title: &str, violations: &[CodeLine], fix: &str) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{title}\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    eprintln!("\nFix: {fix}");
    panic!("\nFound {} violation(s)", violations.len());
}

/// Core must build without any terminal crate
#[test]
fn test_core_has_no_ui_dependencies() {
    let violations = find_violations("core/src", &["ratatui", "crossterm"]);
    report(
        "Core imports a UI framework",
        &violations,
        "move drawing code into the tui crate",
    );

    let manifest = fs::read_to_string(workspace_root().join("core/Cargo.toml"))
        .expect("core/Cargo.toml should be readable");
    for forbidden in ["ratatui", "crossterm"] {
        assert!(
            !manifest
                .lines()
                .any(|line| line.trim_start().starts_with(forbidden)),
            "core/Cargo.toml depends on {forbidden}"
        );
    }
}

/// Only the HTTP client layer may name reqwest
#[test]
fn test_reqwest_confined_to_client_layer() {
    let allowed = ["api.rs", "error.rs", "config.rs"];
    let violations: Vec<CodeLine> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| find_violations(dir, &["reqwest"]))
        .filter(|line| {
            let in_core = line.path.starts_with(workspace_root().join("core/src"));
            let name = line.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            !(in_core && allowed.contains(&name))
        })
        .collect();

    report(
        "reqwest used outside core api/error/config",
        &violations,
        "go through DocsBackend / DocsService instead",
    );
}

/// Blocking HTTP and sleeps would stall the event loop
#[test]
fn test_no_blocking_calls() {
    let needles = ["reqwest::blocking", "thread::sleep", "block_on("];
    let violations: Vec<CodeLine> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| find_violations(dir, &needles))
        .collect();

    report(
        "Blocking call in production code",
        &violations,
        "use async I/O and tokio::time instead",
    );
}

/// Views and surfaces are plain state machines
#[test]
fn test_views_and_surfaces_never_touch_the_backend() {
    let needles = [
        "DocsService",
        "DocsBackend",
        "HttpBackend",
        "tokio::spawn",
        "tokio::fs",
    ];
    let violations: Vec<CodeLine> = ["core/src/views", "core/src/surfaces"]
        .iter()
        .flat_map(|dir| find_violations(dir, &needles))
        .collect();

    report(
        "View or surface reaches the backend directly",
        &violations,
        "return a Request and handle the matching Completion",
    );
}

/// The default origin is defined once, in config
#[test]
fn test_default_origin_defined_once() {
    let mut hits: Vec<CodeLine> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| rust_files(dir))
        .flat_map(|path| production_lines(&path))
        .filter(|line| line.code.contains("localhost:8080"))
        .collect();

    let config = workspace_root().join("core/src/config.rs");
    assert!(
        hits.iter().any(|line| line.path == config),
        "core/src/config.rs should define the default origin"
    );

    hits.retain(|line| line.path != config);
    report(
        "Backend origin hard-coded outside config",
        &hits,
        "read BackendSettings::base_url",
    );
}
