use adkmap::config::{AnalyzerConfig, FallbackEncoding};
use adkmap::registry::{build_registry, RegistryBuilder, SkipReason};
use adkmap::{AnalysisError, EntityKind, Value};

use crate::integration::support::{source_tree, write_file};

const ROOT_AGENT: &str = r#"from google.adk.agents import Agent
from google.adk.tools.agent_tool import AgentTool

from .sub_agents.research import research_agent
from .tools import lookup


root_agent = Agent(
    name="coordinator",
    model="gemini-2.0-flash",
    instruction="Route the request.",
    sub_agents=[research_agent],
    tools=[AgentTool(agent=writer_agent), lookup, google_search],
)
"#;

const RESEARCH: &str = r#"research_agent = LlmAgent(
    name="research",
    model="gemini-2.0-flash",
    tools=[lookup],
    generate_content_config=types.GenerateContentConfig(temperature=0.2),
)

writer_agent = Agent(name="writer", output_key="draft")
"#;

const TOOLS: &str = "lookup = FunctionTool(func=lookup_record)\n";

fn project() -> tempfile::TempDir {
    source_tree(&[
        ("app/agent.py", ROOT_AGENT),
        ("app/sub_agents/research/agent.py", RESEARCH),
        ("app/tools.py", TOOLS),
    ])
}

#[test]
fn cross_file_references_resolve_globally() {
    let temp = project();
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();

    assert_eq!(
        registry.agents.keys().collect::<Vec<_>>(),
        vec!["research_agent", "root_agent", "writer_agent"]
    );
    assert_eq!(registry.tools.keys().collect::<Vec<_>>(), vec!["lookup"]);

    let root = registry.agent("root_agent").unwrap();
    assert_eq!(root.origin.line_start, 8);
    assert_eq!(root.origin.line_end, 14);
    assert!(root.origin.file.ends_with("agent.py"));

    let Value::Sequence(tools) = &root.arguments["tools"] else {
        panic!("tools should be a sequence");
    };
    let wrapped = tools[0].as_reference().unwrap();
    assert_eq!(wrapped.target, "writer_agent");
    assert!(wrapped.resolved);
    assert_eq!(wrapped.kind, Some(EntityKind::Agent));

    let lookup = tools[1].as_reference().unwrap();
    assert!(lookup.resolved);
    assert_eq!(lookup.kind, Some(EntityKind::Tool));

    let builtin = tools[2].as_reference().unwrap();
    assert!(!builtin.resolved);
    assert_eq!(builtin.kind, None);

    let research = registry.agent("research_agent").unwrap();
    assert_eq!(research.constructor, "LlmAgent");
    assert_eq!(
        research.arguments["generate_content_config"],
        Value::Call {
            call: "types.GenerateContentConfig".to_string()
        }
    );
}

#[test]
fn registry_json_shape() {
    let temp = project();
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    let json = serde_json::to_value(&registry).unwrap();

    let root = &json["agents"]["root_agent"];
    assert_eq!(root["kind"], "agent");
    assert_eq!(root["id"], "root_agent");
    assert_eq!(root["constructor"], "Agent");
    assert!(root["origin"]["file"].as_str().is_some());
    assert_eq!(root["origin"]["line_start"], 8);
    assert_eq!(root["arguments"]["name"], "coordinator");
    assert_eq!(
        root["arguments"]["sub_agents"][0],
        serde_json::json!({ "ref": "research_agent", "resolved": true, "kind": "agent" })
    );
    assert_eq!(
        root["arguments"]["tools"][0],
        serde_json::json!({
            "ref": "writer_agent",
            "resolved": true,
            "kind": "agent",
            "via": "AgentTool"
        })
    );
}

#[test]
fn resolution_is_idempotent_across_builds() {
    let temp = project();
    let config = AnalyzerConfig::default();
    let first = build_registry(temp.path(), &config).unwrap();
    let second = build_registry(temp.path(), &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn name_in_both_tables_resolves_to_agent() {
    let temp = source_tree(&[
        ("a_tools.py", "helper = Tool(name='helper_tool')\n"),
        ("b_agents.py", "helper = Agent(name='helper_agent')\nroot = Agent(tools=[helper])\n"),
    ]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    let Value::Sequence(tools) = &registry.agent("root").unwrap().arguments["tools"] else {
        panic!("tools should be a sequence");
    };
    assert_eq!(tools[0].as_reference().unwrap().kind, Some(EntityKind::Agent));
}

#[test]
fn malformed_file_does_not_abort_the_walk() {
    let temp = source_tree(&[
        ("broken.py", "root_agent = Agent(name='x',\n    tools=[\n"),
        ("good.py", "good = Agent(name='good')\n"),
    ]);
    let (registry, report) = RegistryBuilder::new(AnalyzerConfig::default())
        .build_with_report(temp.path())
        .unwrap();
    assert_eq!(registry.agents.keys().collect::<Vec<_>>(), vec!["good"]);
    assert!(registry.tools.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::Parse);
}

#[test]
fn non_utf8_file_uses_fallback_unless_disabled() {
    let temp = source_tree(&[]);
    write_file(
        temp.path(),
        "legacy.py",
        b"# -*- coding: latin-1 -*-\nold = Agent(name='caf\xe9')\n",
    );

    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    assert_eq!(
        registry.agent("old").unwrap().arguments["name"],
        Value::string("caf\u{e9}")
    );

    let mut config = AnalyzerConfig::default();
    config.scan.fallback_encoding = FallbackEncoding::Disabled;
    let (registry, report) = RegistryBuilder::new(config)
        .build_with_report(temp.path())
        .unwrap();
    assert!(registry.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::Decode);
}

#[test]
fn virtualenvs_and_hidden_files_are_ignored() {
    let temp = source_tree(&[
        ("agent.py", "root_agent = Agent()\n"),
        (".venv/lib/python3.12/site-packages/adk/x.py", "vendored = Agent()\n"),
        ("venv/lib/y.py", "vendored2 = Agent()\n"),
        (".scratch.py", "scratch = Agent()\n"),
        ("notes.md", "fake = Agent()\n"),
    ]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    assert_eq!(registry.agents.keys().collect::<Vec<_>>(), vec!["root_agent"]);
}

#[test]
fn empty_directory_and_missing_root() {
    let temp = source_tree(&[]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    assert!(registry.is_empty());

    let err = build_registry(&temp.path().join("absent"), &AnalyzerConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::RootNotFound(_)));
}

#[test]
fn custom_constructors_extend_recognition() {
    let temp = source_tree(&[(
        "agent.py",
        "triage = RouterAgent(name='triage')\nsearch = McpTool(name='search')\n",
    )]);
    let mut config = AnalyzerConfig::default();
    config.constructors.agents.push("RouterAgent".to_string());
    config.constructors.tools.push("McpTool".to_string());

    let registry = build_registry(temp.path(), &config).unwrap();
    assert!(registry.agent("triage").is_some());
    assert!(registry.tool("search").is_some());
}
