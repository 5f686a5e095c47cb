//! Format registries, trees, root candidates and file scans as text.

use crate::registry::{Registry, ScanReport};
use crate::roots::RootCandidate;
use crate::scan::FileScan;
use crate::tree::{Expansion, TreeNode, TreeValue};
use crate::types::{Entity, Literal, Origin, Value};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const INDENT: &str = "  ";

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// `file:start-end`, or `file:line` for one-line spans.
pub fn format_origin(origin: &Origin) -> String {
    if origin.line_start == origin.line_end {
        format!("{}:{}", origin.file, origin.line_start)
    } else {
        format!("{}:{}-{}", origin.file, origin.line_start, origin.line_end)
    }
}

/// Compact one-line rendering of an argument value.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Literal(Literal::String(s)) => format!("{:?}", s),
        Value::Literal(Literal::Integer(i)) => i.to_string(),
        Value::Literal(Literal::Float(f)) => f.to_string(),
        Value::Literal(Literal::Bool(true)) => "True".to_string(),
        Value::Literal(Literal::Bool(false)) => "False".to_string(),
        Value::Literal(Literal::None) => "None".to_string(),
        Value::Reference(r) => match (r.resolved, r.kind) {
            (true, Some(kind)) => format!("{} -> {}", r.target, kind),
            _ => format!("{} (unresolved)", r.target),
        },
        Value::Call { call } => format!("{}(...)", call),
        Value::Sequence(items) => format!(
            "[{}]",
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Opaque { opaque } => format!("<{}>", opaque),
    }
}

fn entity_table(entities: &mut dyn Iterator<Item = &Entity>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Constructor", "Origin", "Arguments"]);
    for entity in entities {
        let arguments = entity
            .arguments
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            entity.id.clone(),
            entity.constructor.clone(),
            format_origin(&entity.origin),
            arguments,
        ]);
    }
    table
}

/// Format the registry tables, plus scan diagnostics when a report is given.
pub fn format_registry_text(registry: &Registry, report: Option<&ScanReport>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Agents")));
    if registry.agents.is_empty() {
        out.push_str("No agents found.\n\n");
    } else {
        out.push_str(&format!(
            "{}\n\n",
            entity_table(&mut registry.agents.values())
        ));
    }

    out.push_str(&format!("{}\n\n", format_section_heading("Tools")));
    if registry.tools.is_empty() {
        out.push_str("No tools found.\n\n");
    } else {
        out.push_str(&format!(
            "{}\n\n",
            entity_table(&mut registry.tools.values())
        ));
    }

    if let Some(report) = report {
        if !report.skipped.is_empty() {
            out.push_str(&format!("{}\n\n", format_section_heading("Skipped files")));
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Path", "Reason", "Message"]);
            for skipped in &report.skipped {
                table.add_row(vec![
                    skipped.path.clone(),
                    format!("{:?}", skipped.reason).to_lowercase(),
                    skipped.message.clone(),
                ]);
            }
            out.push_str(&format!("{}\n\n", table));
        }
        if !report.collisions.is_empty() {
            out.push_str(&format!("{}\n\n", format_section_heading("Duplicate ids")));
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Kind", "Id", "Kept", "Replaced"]);
            for collision in &report.collisions {
                table.add_row(vec![
                    collision.kind.to_string(),
                    collision.id.clone(),
                    format_origin(&collision.kept),
                    format_origin(&collision.replaced),
                ]);
            }
            out.push_str(&format!("{}\n\n", table));
        }
        out.push_str(&format!(
            "Total: {} agents, {} tools from {} files ({} skipped).\n",
            registry.agents.len(),
            registry.tools.len(),
            report.files_scanned,
            report.skipped.len()
        ));
    } else {
        out.push_str(&format!(
            "Total: {} agents, {} tools.\n",
            registry.agents.len(),
            registry.tools.len()
        ));
    }
    out
}

/// Render an expansion as an indented outline.
pub fn format_tree_text(expansion: &Expansion) -> String {
    let mut out = String::new();
    write_expansion(&mut out, expansion, 0);
    out
}

fn node_heading(node: &TreeNode) -> String {
    format!(
        "{} ({} {}) {}",
        node.id.bold(),
        node.kind,
        node.constructor,
        format_origin(&node.origin)
    )
}

fn write_expansion(out: &mut String, expansion: &Expansion, depth: usize) {
    let indent = INDENT.repeat(depth);
    match expansion {
        Expansion::Node(node) => {
            out.push_str(&format!("{}{}\n", indent, node_heading(node)));
            for (name, value) in &node.arguments {
                write_argument(out, name, value, depth + 1);
            }
        }
        Expansion::Cycle { target } => {
            out.push_str(&format!("{}{} {}\n", indent, target, "(cycle)".yellow()));
        }
        Expansion::Unresolved { target } => {
            out.push_str(&format!("{}{} (unresolved)\n", indent, target));
        }
    }
}

fn write_argument(out: &mut String, name: &str, value: &TreeValue, depth: usize) {
    let indent = INDENT.repeat(depth);
    match value {
        TreeValue::Value(value) => {
            out.push_str(&format!("{}{}: {}\n", indent, name, format_value(value)));
        }
        TreeValue::Expanded(expansion) => {
            out.push_str(&format!("{}{}:\n", indent, name));
            write_expansion(out, expansion, depth + 1);
        }
        TreeValue::Sequence(items) => {
            out.push_str(&format!("{}{}:\n", indent, name));
            for item in items {
                write_item(out, item, depth + 1);
            }
        }
    }
}

fn write_item(out: &mut String, item: &TreeValue, depth: usize) {
    match item {
        TreeValue::Value(value) => {
            out.push_str(&format!("{}- {}\n", INDENT.repeat(depth), format_value(value)));
        }
        TreeValue::Expanded(expansion) => write_expansion(out, expansion, depth),
        TreeValue::Sequence(items) => {
            out.push_str(&format!("{}-\n", INDENT.repeat(depth)));
            for nested in items {
                write_item(out, nested, depth + 1);
            }
        }
    }
}

/// Format root candidates as a table.
pub fn format_roots_text(candidates: &[RootCandidate]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Root candidates")));
    if candidates.is_empty() {
        out.push_str("No root candidates found.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Reason", "Origin"]);
    for candidate in candidates {
        table.add_row(vec![
            candidate.id.clone(),
            format!("{:?}", candidate.reason).to_lowercase(),
            format_origin(&candidate.origin),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Format the entities of one file.
pub fn format_file_scan_text(scan: &FileScan) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(&scan.path)));
    if scan.entity_count() == 0 {
        out.push_str("No agents or tools found.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kind", "Id", "Constructor", "Lines"]);
    for entity in scan.agents.iter().chain(scan.tools.iter()) {
        table.add_row(vec![
            entity.kind.to_string(),
            entity.id.clone(),
            entity.constructor.clone(),
            format!("{}-{}", entity.origin.line_start, entity.origin.line_end),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}
