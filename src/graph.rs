//! The class graph and the passes that build it.
//!
//! Building happens in two steps:
//!
//! 1. [`preload`] derives an identifier for every candidate file and
//!    seeds a [`SymbolTable`] with one placeholder per identifier, so a
//!    forward reference is recognised as tracked before its own file
//!    has been visited.
//! 2. [`ClassGraphBuilder`] resolves each placeholder in preload order,
//!    extracts its declared members, scans its source for import and
//!    relationship edges, and stores the finished record. References to
//!    project classes that were not preloaded (parameter types,
//!    relationship targets) are appended to the table and processed
//!    from an explicit worklist before the builder moves on.
//!
//! Every identifier enters the table once and is processed at most
//! once, which is what makes mutually referencing classes terminate.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::composer::Autoload;
use crate::error::UmlError;
use crate::members::extract_members;
use crate::resolver::TypeResolver;
use crate::scanner::{RelationshipScanner, ScanContext};
use crate::types::{ClassRecord, SourceFile, short_name};

/// Lifecycle of one identifier during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryState {
    /// Known, not processed yet (or being processed).
    Placeholder,
    Populated(Box<ClassRecord>),
    /// Processing failed; the identifier is left out of the graph.
    Skipped,
}

#[derive(Debug, Clone)]
struct Entry {
    identifier: String,
    state: EntryState,
}

/// The universe of known identifiers, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Add an empty placeholder. Returns `false` if the identifier was
    /// already known, in which case nothing changes.
    pub fn insert_placeholder(&mut self, identifier: &str) -> bool {
        if self.index.contains_key(identifier) {
            return false;
        }
        self.index.insert(identifier.to_string(), self.entries.len());
        self.entries.push(Entry {
            identifier: identifier.to_string(),
            state: EntryState::Placeholder,
        });
        true
    }

    pub fn is_known(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known identifiers in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    fn is_placeholder(&self, identifier: &str) -> bool {
        self.index
            .get(identifier)
            .is_some_and(|&i| self.entries[i].state == EntryState::Placeholder)
    }

    fn set_state(&mut self, identifier: &str, state: EntryState) {
        if let Some(&i) = self.index.get(identifier) {
            self.entries[i].state = state;
        }
    }

    /// Collect populated records, in insertion order, into a graph.
    /// Edges pointing at identifiers that were skipped are dropped.
    fn into_graph(self) -> ClassGraph {
        let mut records: Vec<ClassRecord> = self
            .entries
            .into_iter()
            .filter_map(|e| match e.state {
                EntryState::Populated(record) => Some(*record),
                _ => None,
            })
            .collect();

        let index: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.identifier.clone(), i))
            .collect();

        for record in &mut records {
            record.import_edges.retain(|t| index.contains_key(t));
            record.orm_edges.retain(|e| index.contains_key(&e.target));
        }
        ClassGraph { records, index }
    }
}

/// Result of the preload pass.
#[derive(Debug, Clone, Default)]
pub struct Preloaded {
    /// Candidate files with their identifiers, one per identifier.
    pub files: Vec<SourceFile>,
    pub table: SymbolTable,
}

/// Compute identifiers for the candidate files and seed the symbol
/// table. Files mapping to an identifier already seen are dropped, so
/// running this twice over the same paths yields the same table.
pub fn preload(autoload: &Autoload, paths: &[PathBuf]) -> Preloaded {
    let mut preloaded = Preloaded::default();
    for path in paths {
        let identifier = autoload.class_for_path(path);
        if preloaded.table.insert_placeholder(&identifier) {
            preloaded.files.push(SourceFile {
                path: path.clone(),
                identifier,
            });
        } else {
            tracing::debug!(path = %path.display(), %identifier, "duplicate identifier; file ignored");
        }
    }
    preloaded
}

/// The finished graph: identifier → record, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassGraph {
    records: Vec<ClassRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ClassGraph {
    pub fn get(&self, identifier: &str) -> Option<&ClassRecord> {
        self.index.get(identifier).map(|&i| &self.records[i])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    pub fn records(&self) -> &[ClassRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ClassRecord> for ClassGraph {
    /// Later records with an identifier already present are ignored.
    fn from_iter<I: IntoIterator<Item = ClassRecord>>(iter: I) -> Self {
        let mut graph = ClassGraph::default();
        for record in iter {
            if graph.index.contains_key(&record.identifier) {
                continue;
            }
            graph
                .index
                .insert(record.identifier.clone(), graph.records.len());
            graph.records.push(record);
        }
        graph
    }
}

/// Drives member extraction and relationship scanning for every known
/// identifier, expanding the universe as project classes are discovered.
pub struct ClassGraphBuilder<'a> {
    resolver: &'a mut dyn TypeResolver,
    scanner: &'a RelationshipScanner,
    table: SymbolTable,
}

impl<'a> ClassGraphBuilder<'a> {
    pub fn new(resolver: &'a mut dyn TypeResolver, scanner: &'a RelationshipScanner) -> Self {
        Self {
            resolver,
            scanner,
            table: SymbolTable::default(),
        }
    }

    /// Build the graph for a preloaded file set.
    pub fn build(mut self, preloaded: Preloaded) -> ClassGraph {
        let span = tracing::info_span!("build_class_graph", files = preloaded.files.len());
        let _enter = span.enter();

        for file in &preloaded.files {
            self.resolver.register(file);
        }
        self.table = preloaded.table;

        let order: Vec<String> = self.table.identifiers().map(str::to_string).collect();
        let mut worklist: Vec<String> = Vec::new();
        for identifier in order {
            if !self.table.is_placeholder(&identifier) {
                continue;
            }
            worklist.push(identifier);
            while let Some(next) = worklist.pop() {
                self.process(&next, &mut worklist);
            }
        }

        let graph = self.table.into_graph();
        tracing::info!(classes = graph.len(), "class graph built");
        graph
    }

    /// Resolve, extract and scan one identifier, then store its record.
    fn process(&mut self, identifier: &str, worklist: &mut Vec<String>) {
        let (info, members) = match extract_members(&mut *self.resolver, identifier) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(identifier, error = %e, "skipping class");
                self.table.set_state(identifier, EntryState::Skipped);
                return;
            }
        };
        tracing::debug!(identifier, path = %info.path.display(), "processing class");

        for ty in &members.parameter_types {
            self.discover(ty, worklist);
        }

        let table = &self.table;
        let import_edges =
            self.scanner
                .scan_imports(&info.source, identifier, |t| table.is_known(t));

        let ctx = ScanContext {
            identifier,
            path: &info.path,
            namespace: &info.namespace,
            use_map: &info.use_map,
        };
        let scan = self.scanner.scan_relationships(&info.source, &ctx);

        let mut orm_edges = Vec::new();
        for edge in scan.edges {
            if self.discover(&edge.target, worklist) {
                orm_edges.push(edge);
            }
        }

        let record = ClassRecord {
            identifier: identifier.to_string(),
            simple_name: short_name(identifier).to_string(),
            properties: members.properties,
            methods: members.methods,
            import_edges,
            orm_edges,
        };
        self.table
            .set_state(identifier, EntryState::Populated(Box::new(record)));
    }

    /// Make sure `identifier` is known, queueing it for processing when it
    /// is a newly discovered project class. Returns whether it is known.
    fn discover(&mut self, identifier: &str, worklist: &mut Vec<String>) -> bool {
        if self.table.is_known(identifier) {
            return true;
        }
        if !self.resolver.can_locate(identifier) {
            let err = UmlError::UntrackedReference {
                identifier: identifier.to_string(),
            };
            tracing::debug!(error = %err, "reference dropped");
            return false;
        }
        tracing::debug!(identifier, "discovered class outside the indexed set");
        self.table.insert_placeholder(identifier);
        worklist.push(identifier.to_string());
        true
    }
}
