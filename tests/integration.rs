use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const FEED: &str = "tests/fixtures/feed.json";

fn simgraph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_simgraph"))
        .args(args)
        .output()
        .expect("Failed to execute simgraph")
}

fn render(output_dir: &Path, extra: &[&str]) -> Output {
    let mut args = vec!["render", "--input", FEED, "--output", output_dir.to_str().unwrap()];
    args.extend_from_slice(extra);
    simgraph(&args)
}

#[test]
fn renders_hierarchical_graph_from_feed() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("site");

    let result = render(&out, &["--mode", "hierarchical"]);
    assert!(result.status.success(), "simgraph exited with error");

    let svg = fs::read_to_string(out.join("graph.svg")).expect("graph.svg was not generated");
    // Duplicate, self-loop, dangling, weak and out-of-range records are gone
    assert_eq!(svg.matches("<circle").count(), 6);
    assert_eq!(svg.matches("<line").count(), 4);
    assert!(svg.contains("Quantum computing br..."), "Missing truncated label");

    let html = fs::read_to_string(out.join("index.html")).expect("index.html was not generated");
    assert!(html.contains("Mode: hierarchical"));
    assert!(html.contains("Nodes: 6"));
    assert!(html.contains("Edges: 4"));
    assert!(html.contains("Density: 0.267"));
    assert!(html.contains("<svg"), "Graph not embedded in page");

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Rendered 6 nodes and 4 edges (hierarchical layout)"));
}

#[test]
fn renders_force_layout_fitted_to_view() {
    let dir = tempfile::tempdir().unwrap();

    let result = render(dir.path(), &["--fit", "--width", "640", "--height", "480"]);
    assert!(result.status.success(), "simgraph exited with error");

    let svg = fs::read_to_string(dir.path().join("graph.svg")).unwrap();
    assert!(svg.contains(r#"width="640" height="480""#));
    assert_eq!(svg.matches("<circle").count(), 6);
    assert!(!svg.contains("NaN"), "Layout produced non-finite coordinates");
}

#[test]
fn config_file_sets_viewport() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("engine.yaml");
    fs::write(&config, "viewport:\n  width: 1000\n  height: 700\n").unwrap();
    let out = dir.path().join("site");

    let result = render(&out, &["--mode", "radial", "--config", config.to_str().unwrap()]);
    assert!(result.status.success(), "simgraph exited with error");

    let svg = fs::read_to_string(out.join("graph.svg")).unwrap();
    assert!(svg.contains(r#"width="1000" height="700""#));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("engine.yaml");
    fs::write(&config, "viewport:\n  zoom_step: 0.5\n").unwrap();

    let result = render(dir.path(), &["--config", config.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("zoom_step"));
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = simgraph(&[
        "render",
        "--input",
        "tests/fixtures/does-not-exist.json",
        "--output",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert!(!dir.path().join("graph.svg").exists());
}

#[test]
fn stats_reports_metrics_as_json() {
    let result = simgraph(&["stats", "--input", FEED]);
    assert!(result.status.success(), "simgraph exited with error");

    let stats: serde_json::Value =
        serde_json::from_slice(&result.stdout).expect("stats output is not JSON");
    assert_eq!(stats["node_count"], 6);
    assert_eq!(stats["edge_count"], 4);
    // Reverse duplicate, self-loop, dangling 5 -> 42, out-of-range similarity
    assert_eq!(stats["dropped_edges"], 4);
    assert_eq!(stats["duplicate_nodes"], 0);
    let density = stats["density"].as_f64().unwrap();
    assert!((density - 8.0 / 30.0).abs() < 1e-9);
}
