//! Diagram output.
//!
//! The nomnoml document is line oriented: style directives first, then
//! one node per class, then import edges, then relationship edges, each
//! section in graph order.

use crate::config::StyleConfig;
use crate::graph::ClassGraph;
use crate::types::{ClassRecord, Direction, short_name};

/// Render the class graph as a nomnoml document.
pub fn emit_nomnoml(graph: &ClassGraph, style: &StyleConfig) -> String {
    let mut lines: Vec<String> = style
        .directives()
        .into_iter()
        .map(|(option, value)| format!("#{}: {}", option, value))
        .collect();

    lines.extend(graph.iter().map(node_line));

    for record in graph.iter() {
        for target in &record.import_edges {
            lines.push(format!("[{}]<-[{}]", short_name(target), record.simple_name));
        }
    }

    for record in graph.iter() {
        for edge in &record.orm_edges {
            let target = short_name(&edge.target);
            let line = match edge.direction {
                Direction::To => format!("[{}] <- {} [{}]", target, edge.kind, record.simple_name),
                Direction::From => {
                    format!("[{}] {} -> [{}]", record.simple_name, edge.kind, target)
                }
            };
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// `[Name|prop;prop|method();method()]`, leaving out empty compartments.
fn node_line(record: &ClassRecord) -> String {
    let mut node = format!("[{}", record.simple_name);
    if !record.properties.is_empty() {
        node.push('|');
        node.push_str(&record.properties.join(";"));
    }
    if !record.methods.is_empty() {
        node.push('|');
        let methods: Vec<String> = record.methods.iter().map(|m| format!("{}()", m)).collect();
        node.push_str(&methods.join(";"));
    }
    node.push(']');
    node
}

/// Render the class graph as pretty-printed JSON, in graph order.
pub fn emit_json(graph: &ClassGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleValue;
    use crate::types::OrmEdge;

    #[test]
    fn test_node_compartments() {
        let mut record = ClassRecord::empty("App\\Models\\User");
        assert_eq!(node_line(&record), "[User]");

        record.methods = vec!["save".to_string()];
        assert_eq!(node_line(&record), "[User|save()]");

        record.properties = vec!["id".to_string(), "name".to_string()];
        assert_eq!(node_line(&record), "[User|id;name|save()]");

        record.methods.clear();
        assert_eq!(node_line(&record), "[User|id;name]");
    }

    #[test]
    fn test_empty_graph_emits_only_directives() {
        let graph = ClassGraph::default();
        assert_eq!(emit_nomnoml(&graph, &StyleConfig::default()), "");

        let style = StyleConfig {
            direction: Some("right".into()),
            zoom: Some(StyleValue::Integer(2)),
            ..StyleConfig::default()
        };
        assert_eq!(emit_nomnoml(&graph, &style), "#direction: right\n#zoom: 2");
    }

    fn edge(target: &str, kind: &str, direction: Direction) -> OrmEdge {
        OrmEdge {
            target: target.to_string(),
            kind: kind.to_string(),
            direction,
        }
    }

    fn sample_graph() -> ClassGraph {
        let mut user = ClassRecord::empty("App\\Models\\User");
        user.properties = vec!["id".to_string(), "name".to_string()];
        user.methods = vec!["posts".to_string()];
        user.orm_edges = vec![edge("App\\Models\\Post", "hasMany", Direction::To)];

        let mut post = ClassRecord::empty("App\\Models\\Post");
        post.import_edges = vec!["App\\Models\\User".to_string()];
        post.orm_edges = vec![edge("App\\Models\\User", "belongsTo", Direction::From)];

        vec![user, post].into_iter().collect()
    }

    #[test]
    fn test_document_sections_in_order() {
        let style = StyleConfig {
            stroke: Some("#fff".into()),
            ..StyleConfig::default()
        };
        let output = emit_nomnoml(&sample_graph(), &style);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "#stroke: #fff",
                "[User|id;name|posts()]",
                "[Post]",
                "[User]<-[Post]",
                "[Post] <- hasMany [User]",
                "[Post] belongsTo -> [User]",
            ]
        );
        assert!(!output.ends_with('\n'));
    }

    #[test]
    fn test_self_relationship() {
        let mut node = ClassRecord::empty("App\\Models\\Category");
        node.orm_edges = vec![
            edge("App\\Models\\Category", "hasMany", Direction::To),
            edge("App\\Models\\Category", "belongsTo", Direction::From),
        ];
        let graph: ClassGraph = std::iter::once(node).collect();
        let output = emit_nomnoml(&graph, &StyleConfig::default());
        assert_eq!(
            output,
            "[Category]\n[Category] <- hasMany [Category]\n[Category] belongsTo -> [Category]"
        );
    }

    #[test]
    fn test_json_keeps_graph_order() {
        let json = emit_json(&sample_graph()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["identifier"], "App\\Models\\User");
        assert_eq!(value[1]["orm_edges"][0]["direction"], "from");
        assert_eq!(value[1]["import_edges"][0], "App\\Models\\User");
    }
}
