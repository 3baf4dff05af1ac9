//! Class diagrams for Laravel applications.
//!
//! The pipeline lists candidate PHP files, derives a fully-qualified
//! identifier for each, resolves every identifier to its declared
//! members, scans its source for import and Eloquent relationship
//! edges, and renders the resulting [`ClassGraph`] as nomnoml text.
//!
//! ```no_run
//! use std::path::Path;
//! use laravel_uml::{Config, render_nomnoml};
//!
//! let root = Path::new("path/to/laravel");
//! let config = Config::discover(root)?;
//! println!("{}", render_nomnoml(root, &config)?);
//! # Ok::<(), laravel_uml::UmlError>(())
//! ```

pub mod composer;
pub mod config;
pub mod emitter;
pub mod error;
pub mod files;
pub mod graph;
pub mod logging;
pub mod members;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod types;

use std::path::Path;

pub use config::Config;
pub use error::{Result, UmlError};
pub use graph::ClassGraph;

use composer::Autoload;
use files::{FileProvider, WorkspaceFiles};
use graph::{ClassGraphBuilder, preload};
use resolver::SourceTypeResolver;
use scanner::RelationshipScanner;

/// Build the class graph for the Laravel project at `root`.
///
/// Per-class problems are logged and the class is left out; only an
/// invalid relationship table or a failing file listing is an error.
pub fn generate(root: &Path, config: &Config) -> Result<ClassGraph> {
    let files = WorkspaceFiles::new(root, config);
    build_graph(root, config, &files)
}

/// Build the class graph from an explicit file list.
pub fn build_graph(root: &Path, config: &Config, files: &dyn FileProvider) -> Result<ClassGraph> {
    let autoload = Autoload::load(root);
    let scanner = RelationshipScanner::new(config.relationship_table())?;
    let paths = files.list()?;

    let preloaded = preload(&autoload, &paths);
    let mut resolver = SourceTypeResolver::new(autoload);
    Ok(ClassGraphBuilder::new(&mut resolver, &scanner).build(preloaded))
}

/// Build the graph and render it as a nomnoml document.
pub fn render_nomnoml(root: &Path, config: &Config) -> Result<String> {
    let graph = generate(root, config)?;
    Ok(emitter::emit_nomnoml(&graph, &config.style))
}
