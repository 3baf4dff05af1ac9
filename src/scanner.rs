//! Line-oriented relationship scanning.
//!
//! Two heuristics run over the raw text of a class file, one line at a
//! time:
//!
//! - **Imports**: a line starting with `use ` names one or more classes.
//!   Each imported class that is tracked (and is not the scanned class
//!   itself) becomes an import edge.
//! - **Eloquent relationships**: a line of the form
//!   `return $this-><kind>(<target>…` where `<kind>` is a known
//!   relationship method yields an ORM edge to `<target>`, pointing the
//!   way the relationship table says.
//!
//! Relationship calls split across several lines, or built from
//! variables, are not recognised.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RelationshipTable;
use crate::error::{Result, UmlError};
use crate::parser::resolve_name;
use crate::types::OrmEdge;

/// `use Foo\Bar;`, `use Foo\Bar as Baz, Qux;`, `use Foo\{Bar, Baz};`,
/// `use function foo;`. Must start at column 0 so trait uses inside a
/// class body never match.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^use\s+(?:(?P<kind>function|const)\s+)?(?P<body>[^;]+);")
        .expect("import pattern is valid")
});

/// A valid PHP class reference, optionally qualified.
static CLASS_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("class name pattern is valid")
});

/// Name-resolution context of the file being scanned.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Identifier of the class the file declares.
    pub identifier: &'a str,
    /// Path, used in diagnostics only.
    pub path: &'a Path,
    pub namespace: &'a Option<String>,
    pub use_map: &'a HashMap<String, String>,
}

/// Relationship edges found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipScan {
    /// Edges in first-seen order, without duplicates. Targets are
    /// fully-qualified but not yet checked against the tracked set.
    pub edges: Vec<OrmEdge>,
    /// 1-based numbers of lines that looked like relationship calls but
    /// yielded no usable target.
    pub malformed_lines: Vec<usize>,
}

/// Scans source text for import and relationship edges.
#[derive(Debug, Clone)]
pub struct RelationshipScanner {
    table: RelationshipTable,
    patterns: Option<RelationshipPatterns>,
}

#[derive(Debug, Clone)]
struct RelationshipPatterns {
    /// Recognises a relationship call, whatever its arguments.
    prefix: Regex,
    /// Captures a lone first argument: `hasMany(Post::class)`.
    primary: Regex,
    /// Captures the first of several arguments: `belongsToMany(Role::class, 'role_user')`.
    fallback: Regex,
}

impl RelationshipPatterns {
    fn new(table: &RelationshipTable) -> Result<Option<Self>> {
        if table.is_empty() {
            return Ok(None);
        }

        let mut kinds: Vec<&str> = table.kinds().collect();
        // Longest first so no kind shadows a longer one sharing its prefix.
        kinds.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternation = kinds
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let prefix = format!(r"^\s*return\s+\$this\s*->\s*(?P<kind>{})\s*\(", alternation);
        Ok(Some(Self {
            primary: Regex::new(&format!(r"{}\s*(?P<target>[^,()]+?)\s*\)", prefix))?,
            fallback: Regex::new(&format!(r"{}\s*(?P<target>[^,]+?)\s*,", prefix))?,
            prefix: Regex::new(&prefix)?,
        }))
    }
}

impl RelationshipScanner {
    /// Build a scanner for the given relationship table.
    ///
    /// Fails only if a configured kind produces an invalid pattern.
    pub fn new(table: RelationshipTable) -> Result<Self> {
        let patterns = RelationshipPatterns::new(&table)?;
        Ok(Self { table, patterns })
    }

    pub fn table(&self) -> &RelationshipTable {
        &self.table
    }

    /// Collect tracked classes imported by `use` statements.
    ///
    /// Self-imports and imports for which `is_tracked` is false are
    /// dropped. Function and constant imports are ignored.
    pub fn scan_imports(
        &self,
        source: &str,
        identifier: &str,
        is_tracked: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let mut imports: Vec<String> = Vec::new();

        for line in source.lines() {
            let Some(caps) = IMPORT_RE.captures(line) else {
                continue;
            };
            if caps.name("kind").is_some() {
                continue;
            }

            for imported in import_paths(&caps["body"]) {
                if imported == identifier {
                    continue;
                }
                if !is_tracked(&imported) {
                    tracing::trace!(%imported, "import of untracked class dropped");
                    continue;
                }
                if !imports.contains(&imported) {
                    imports.push(imported);
                }
            }
        }

        imports
    }

    /// Collect relationship edges declared by `return $this-><kind>(…)`
    /// lines, with targets resolved against the file's imports.
    pub fn scan_relationships(&self, source: &str, ctx: &ScanContext<'_>) -> RelationshipScan {
        let mut scan = RelationshipScan::default();
        let Some(patterns) = &self.patterns else {
            return scan;
        };

        for (idx, line) in source.lines().enumerate() {
            if !patterns.prefix.is_match(line) {
                continue;
            }

            let caps = patterns
                .primary
                .captures(line)
                .or_else(|| patterns.fallback.captures(line));

            let edge = caps.and_then(|caps| {
                let kind = caps.name("kind")?.as_str();
                let target = normalize_target(caps.name("target")?.as_str(), ctx)?;
                let direction = self.table.direction(kind)?;
                Some(OrmEdge {
                    target,
                    kind: kind.to_string(),
                    direction,
                })
            });

            match edge {
                Some(edge) => {
                    if !scan.edges.contains(&edge) {
                        scan.edges.push(edge);
                    }
                }
                None => {
                    let err = UmlError::MalformedRelationshipExpression {
                        path: ctx.path.to_path_buf(),
                        line: idx + 1,
                        text: line.trim().to_string(),
                    };
                    tracing::debug!(identifier = ctx.identifier, error = %err, "relationship dropped");
                    scan.malformed_lines.push(idx + 1);
                }
            }
        }

        scan
    }
}

/// Split the body of a `use` statement into fully-qualified class names.
fn import_paths(body: &str) -> Vec<String> {
    let body = body.trim();

    if let Some((prefix, rest)) = body.split_once('{') {
        let prefix = prefix.trim().trim_start_matches('\\').trim_end_matches('\\');
        let items = rest.trim_end_matches('}');
        return items
            .split(',')
            .filter_map(strip_alias)
            .map(|item| format!("{}\\{}", prefix, item))
            .collect();
    }

    body.split(',')
        .filter_map(strip_alias)
        .map(|item| item.trim_start_matches('\\').to_string())
        .collect()
}

/// `Foo\Bar as Baz` → `Foo\Bar`. Empty items yield `None`.
fn strip_alias(item: &str) -> Option<&str> {
    let name = item.split_whitespace().next()?;
    if name.is_empty() { None } else { Some(name) }
}

/// Turn a captured first argument into a fully-qualified identifier.
///
/// Quotes and a trailing `::class` are stripped. Quoted strings are
/// already fully qualified; class literals are resolved through the
/// file's `use` map and namespace. Anything that is not a plain class
/// name (a variable, a method call) yields `None`.
fn normalize_target(raw: &str, ctx: &ScanContext<'_>) -> Option<String> {
    let trimmed = raw.trim();
    let quoted = trimmed.starts_with(['\'', '"']);
    let unquoted = trimmed.trim_matches(|c| c == '\'' || c == '"');
    let name = unquoted.strip_suffix("::class").unwrap_or(unquoted).trim();
    let name = name.replace("\\\\", "\\");

    if !CLASS_NAME_RE.is_match(&name) {
        return None;
    }

    if quoted {
        Some(name.trim_start_matches('\\').to_string())
    } else {
        Some(resolve_name(&name, ctx.use_map, ctx.namespace))
    }
}
