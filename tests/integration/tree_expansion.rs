use adkmap::config::AnalyzerConfig;
use adkmap::registry::build_registry;
use adkmap::tree::{expand, Expansion};
use serde_json::json;

use crate::integration::support::source_tree;

#[test]
fn cycle_across_files_terminates_with_marker() {
    let temp = source_tree(&[
        ("a.py", "a = Agent(name='a', sub_agents=[b])\n"),
        ("b.py", "b = Agent(name='b', sub_agents=[a])\n"),
    ]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    let tree = serde_json::to_value(expand(&registry, "a")).unwrap();

    assert_eq!(tree["id"], "a");
    assert_eq!(tree["arguments"]["sub_agents"][0]["id"], "b");
    assert_eq!(
        tree["arguments"]["sub_agents"][0]["arguments"]["sub_agents"][0],
        json!({ "ref": "a", "cycle": true })
    );
}

#[test]
fn diamond_expands_shared_entity_in_each_branch() {
    let temp = source_tree(&[(
        "agents.py",
        "\
a = SequentialAgent(sub_agents=[b, c])
b = Agent(sub_agents=[d])
c = Agent(sub_agents=[d])
d = Agent(tools=[t])
t = Tool(name='t')
",
    )]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();
    let expansion = expand(&registry, "a");
    assert_eq!(expansion.cycle_count(), 0);

    let tree = serde_json::to_value(&expansion).unwrap();
    for branch in 0..2 {
        let d = &tree["arguments"]["sub_agents"][branch]["arguments"]["sub_agents"][0];
        assert_eq!(d["id"], "d");
        assert_eq!(d["arguments"]["tools"][0]["id"], "t");
        assert_eq!(d["arguments"]["tools"][0]["arguments"]["name"], "t");
    }
}

#[test]
fn ghost_reference_and_unknown_root() {
    let temp = source_tree(&[("agents.py", "a = Agent(sub_agents=[ghost])\n")]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();

    let tree = serde_json::to_value(expand(&registry, "a")).unwrap();
    assert_eq!(
        tree["arguments"]["sub_agents"][0],
        json!({ "ref": "ghost", "resolved": false })
    );

    assert_eq!(
        expand(&registry, "ghost"),
        Expansion::Unresolved {
            target: "ghost".to_string()
        }
    );
}

#[test]
fn independent_expand_calls_do_not_share_state() {
    let temp = source_tree(&[(
        "agents.py",
        "a = Agent(sub_agents=[b])\nb = Agent(sub_agents=[c])\nc = Agent()\n",
    )]);
    let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();

    let b_first = expand(&registry, "b");
    let _ = expand(&registry, "a");
    let b_again = expand(&registry, "b");
    assert_eq!(b_first, b_again);
    assert!(!b_again.is_cycle());
}
