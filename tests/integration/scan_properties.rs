use adkmap::config::{AnalyzerConfig, ConstructorConfig};
use adkmap::registry::build_registry;
use adkmap::scan::scan_source;
use adkmap::tree::expand;
use adkmap::types::{Literal, Value};
use proptest::prelude::*;

use crate::integration::support::source_tree;

const AGENT_COUNT: usize = 6;

fn leading_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "# [a-z ]{0,16}".prop_map(String::from),
        "x_[a-z]{1,6} = [1-9][0-9]{0,3}".prop_map(String::from),
    ]
}

fn agents_source(edges: &[(usize, usize)]) -> String {
    let mut source = String::new();
    for i in 0..AGENT_COUNT {
        let children: Vec<String> = edges
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|(_, to)| format!("a{}", to))
            .collect();
        source.push_str(&format!(
            "a{} = Agent(name='a{}', sub_agents=[{}])\n",
            i,
            i,
            children.join(", ")
        ));
    }
    source
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn span_counts_every_physical_line(
        prefix in prop::collection::vec(leading_line(), 0..24),
        extra_lines in 0usize..4,
    ) {
        let mut source = String::new();
        for line in &prefix {
            source.push_str(line);
            source.push('\n');
        }
        if extra_lines == 0 {
            source.push_str("name = Agent(x=1, y=\"s\")\n");
        } else {
            source.push_str("name = Agent(\n    x=1,\n");
            for _ in 1..extra_lines {
                source.push_str("    # spacer\n");
            }
            source.push_str("    y=\"s\",\n)\n");
        }

        let scan = scan_source(&source, "prop.py", &ConstructorConfig::default()).unwrap();
        prop_assert_eq!(scan.agents.len(), 1);
        let agent = &scan.agents[0];
        prop_assert_eq!(agent.id.as_str(), "name");
        prop_assert_eq!(&agent.arguments["x"], &Value::Literal(Literal::Integer(1)));
        prop_assert_eq!(&agent.arguments["y"], &Value::string("s"));
        prop_assert_eq!(agent.origin.line_start, prefix.len() + 1);
        let expected_end = if extra_lines == 0 {
            prefix.len() + 1
        } else {
            prefix.len() + 3 + extra_lines
        };
        prop_assert_eq!(agent.origin.line_end, expected_end);
    }

    #[test]
    fn acyclic_registries_expand_without_cycle_markers(
        edges in prop::collection::vec((0usize..AGENT_COUNT, 0usize..AGENT_COUNT), 0..12)
    ) {
        let forward: Vec<(usize, usize)> = edges
            .into_iter()
            .filter(|(from, to)| from < to)
            .collect();
        let temp = source_tree(&[("agents.py", agents_source(&forward).as_str())]);
        let config = AnalyzerConfig::default();

        let first = build_registry(temp.path(), &config).unwrap();
        let second = build_registry(temp.path(), &config).unwrap();
        prop_assert_eq!(&first, &second);

        let tree = expand(&first, "a0");
        prop_assert_eq!(tree.cycle_count(), 0);
        prop_assert_eq!(tree, expand(&second, "a0"));
    }

    #[test]
    fn arbitrary_registries_expand_to_finite_trees(
        edges in prop::collection::vec((0usize..AGENT_COUNT, 0usize..AGENT_COUNT), 0..10)
    ) {
        let temp = source_tree(&[("agents.py", agents_source(&edges).as_str())]);
        let registry = build_registry(temp.path(), &AnalyzerConfig::default()).unwrap();

        for i in 0..AGENT_COUNT {
            let root = format!("a{}", i);
            let tree = expand(&registry, &root);
            prop_assert!(tree.as_node().is_some());
            prop_assert_eq!(&tree, &expand(&registry, &root));
            if edges.contains(&(i, i)) {
                prop_assert!(tree.cycle_count() > 0);
            }
        }
    }
}
