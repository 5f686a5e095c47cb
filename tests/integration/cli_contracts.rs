use adkmap::tooling::cli::{CliContext, Commands};

use crate::integration::support::source_tree;

const PROJECT: &[(&str, &str)] = &[
    (
        "app/agent.py",
        "root_agent = Agent(name='root', sub_agents=[worker], tools=[AgentTool(agent=critic)])\n",
    ),
    ("app/worker.py", "worker = LlmAgent(name='worker', tools=[search])\nsearch = FunctionTool(func=search_fn)\n"),
    ("app/critic.py", "critic = Agent(name='critic')\norphan = Agent(name='orphan')\n"),
    ("app/bad.py", "broken = Agent(\n"),
];

#[test]
fn registry_json_contract_has_required_fields() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Registry {
            format: "json".to_string(),
            report: false,
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let agents = parsed
        .get("agents")
        .and_then(|v| v.as_object())
        .expect("agents object should exist");
    assert_eq!(agents.len(), 4);
    let tools = parsed
        .get("tools")
        .and_then(|v| v.as_object())
        .expect("tools object should exist");
    assert!(tools.contains_key("search"));

    let worker = &agents["worker"];
    assert_eq!(worker.get("kind").and_then(|v| v.as_str()), Some("agent"));
    assert_eq!(worker.get("constructor").and_then(|v| v.as_str()), Some("LlmAgent"));
    let origin = worker.get("origin").expect("origin should exist");
    assert!(origin.get("file").and_then(|v| v.as_str()).is_some());
    assert_eq!(origin.get("line_start").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(origin.get("line_end").and_then(|v| v.as_u64()), Some(1));
}

#[test]
fn registry_report_lists_skipped_files() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Registry {
            format: "json".to_string(),
            report: true,
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let report = parsed.get("report").expect("report should exist");
    assert_eq!(report.get("files_scanned").and_then(|v| v.as_u64()), Some(4));
    let skipped = report
        .get("skipped")
        .and_then(|v| v.as_array())
        .expect("skipped array should exist");
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0]
        .get("path")
        .and_then(|v| v.as_str())
        .is_some_and(|p| p.ends_with("bad.py")));
    assert!(report.get("collisions").and_then(|v| v.as_array()).is_some());
}

#[test]
fn tree_json_contract_nests_resolved_references() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Tree {
            root: None,
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["id"], "root_agent");
    let worker = &parsed["arguments"]["sub_agents"][0];
    assert_eq!(worker["id"], "worker");
    assert_eq!(worker["arguments"]["tools"][0]["id"], "search");
    assert_eq!(
        worker["arguments"]["tools"][0]["arguments"]["func"],
        serde_json::json!({ "ref": "search_fn", "resolved": false })
    );
    assert_eq!(parsed["arguments"]["tools"][0]["id"], "critic");
}

#[test]
fn roots_json_contract() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::Roots {
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("total").and_then(|v| v.as_u64()), Some(2));
    let roots = parsed
        .get("roots")
        .and_then(|v| v.as_array())
        .expect("roots array should exist");
    assert_eq!(roots[0]["id"], "root_agent");
    assert_eq!(roots[0]["reason"], "preferred");
    assert_eq!(roots[1]["id"], "orphan");
    assert_eq!(roots[1]["reason"], "unreferenced");
}

#[test]
fn scan_file_json_contract() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    let output = cli
        .execute(&Commands::ScanFile {
            path: temp.path().join("app/critic.py"),
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("encoding").and_then(|v| v.as_str()), Some("utf-8"));
    let agents = parsed
        .get("agents")
        .and_then(|v| v.as_array())
        .expect("agents array should exist");
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[1]["id"], "orphan");
    assert_eq!(agents[1]["origin"]["line_start"], 2);
    assert!(parsed.get("tools").and_then(|v| v.as_array()).is_some_and(|t| t.is_empty()));
}

#[test]
fn workspace_config_file_extends_constructors() {
    let temp = source_tree(&[
        ("agent.py", "triage = RouterAgent(name='triage')\n"),
        (
            "adkmap.toml",
            "[constructors]\nagents = [\"Agent\", \"RouterAgent\"]\n\n[tree]\ndefault_root = \"triage\"\n",
        ),
    ]);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();
    assert_eq!(cli.config().tree.default_root, "triage");

    let output = cli
        .execute(&Commands::Tree {
            root: None,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["id"], "triage");
    assert_eq!(parsed["constructor"], "RouterAgent");
}

#[test]
fn text_output_renders_tables_and_outline() {
    let temp = source_tree(PROJECT);
    let cli = CliContext::new(temp.path().to_path_buf(), None).unwrap();

    let registry = cli
        .execute(&Commands::Registry {
            format: "text".to_string(),
            report: true,
        })
        .unwrap();
    assert!(registry.contains("LlmAgent"));
    assert!(registry.contains("bad.py"));

    let tree = cli
        .execute(&Commands::Tree {
            root: Some("root_agent".to_string()),
            format: "text".to_string(),
        })
        .unwrap();
    assert!(tree.contains("sub_agents:"));
    assert!(tree.contains("search_fn (unresolved)"));
}
