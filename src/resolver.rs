//! Type resolution.
//!
//! A [`TypeResolver`] turns a fully-qualified identifier into
//! [`TypeInfo`]: the declaring file, its name-resolution context, and
//! the complete member listing of the type (own, trait and inherited
//! members) with every member attributed to the type that declares it.
//!
//! [`SourceTypeResolver`] does this from PHP source alone. Files are
//! located through the identifiers registered during preload and then
//! through PSR-4, parsed once with mago-syntax, and cached for the
//! lifetime of the resolver (one diagram build).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::composer::Autoload;
use crate::error::{Result, UmlError};
use crate::parser;
use crate::parser::fully_qualify;
use crate::types::*;

/// Loads type metadata by fully-qualified identifier.
pub trait TypeResolver {
    /// Resolve an identifier to its type metadata.
    ///
    /// Fails with [`UmlError::UnresolvableType`] when no loadable
    /// definition exists and [`UmlError::FileReadFailure`] when the
    /// declaring file cannot be read.
    fn resolve(&mut self, identifier: &str) -> Result<TypeInfo>;

    /// Whether a definition for the identifier can be located at all.
    /// Used to decide if a newly discovered reference belongs to the
    /// project rather than to a vendor package.
    fn can_locate(&mut self, identifier: &str) -> bool;

    /// Hint where a preloaded identifier is declared.
    fn register(&mut self, _file: &SourceFile) {}
}

/// A parsed file together with its raw text.
#[derive(Debug)]
struct CachedFile {
    content: String,
    parsed: ParsedFile,
}

/// Resolves types by parsing the project's PHP sources.
#[derive(Debug)]
pub struct SourceTypeResolver {
    autoload: Autoload,
    /// Identifier → file, seeded from the preloaded file list.
    index: HashMap<String, PathBuf>,
    /// Path → parsed contents; `None` records a file that failed to load.
    files: HashMap<PathBuf, Option<CachedFile>>,
}

impl SourceTypeResolver {
    pub fn new(autoload: Autoload) -> Self {
        Self {
            autoload,
            index: HashMap::new(),
            files: HashMap::new(),
        }
    }

    fn locate(&self, identifier: &str) -> Option<PathBuf> {
        self.index
            .get(identifier)
            .cloned()
            .or_else(|| self.autoload.path_for_class(identifier))
    }

    /// Read and parse a file, caching the outcome.
    fn load_file(&mut self, path: &Path) -> Result<&CachedFile> {
        if !self.files.contains_key(path) {
            let loaded = match std::fs::read_to_string(path) {
                Ok(content) => match parser::parse_php(&content) {
                    Some(parsed) => Some(CachedFile { content, parsed }),
                    None => None,
                },
                Err(source) => {
                    self.files.insert(path.to_path_buf(), None);
                    return Err(UmlError::FileReadFailure {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };
            self.files.insert(path.to_path_buf(), loaded);
        }

        match self.files.get(path) {
            Some(Some(cached)) => Ok(cached),
            _ => Err(UmlError::unresolvable(
                &path.display().to_string(),
                "file could not be read or parsed",
            )),
        }
    }

    /// Find the class-like declaration of `identifier` in its file.
    fn find_class(&mut self, identifier: &str) -> Result<(PathBuf, &CachedFile, usize)> {
        let path = self
            .locate(identifier)
            .ok_or_else(|| UmlError::unresolvable(identifier, "no source file found"))?;

        let cached = self.load_file(&path)?;
        let position = cached
            .parsed
            .classes
            .iter()
            .position(|c| fully_qualify(&cached.parsed.namespace, &c.name) == identifier)
            .ok_or_else(|| {
                UmlError::unresolvable(
                    identifier,
                    format!("{} does not declare it", path.display()),
                )
            })?;
        Ok((path, cached, position))
    }

    /// Append `identifier`'s own members, then its traits' members, then
    /// its parent's, skipping names already present.
    fn collect_members(
        &mut self,
        identifier: &str,
        methods: &mut Vec<ResolvedMethod>,
        properties: &mut Vec<ResolvedProperty>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(identifier.to_string()) {
            return;
        }

        let (own_methods, own_properties, traits, parent) = match self.find_class(identifier) {
            Ok((_, cached, idx)) => {
                let class = &cached.parsed.classes[idx];
                (
                    class.methods.clone(),
                    class.properties.clone(),
                    class.used_traits.clone(),
                    class.parent_class.clone(),
                )
            }
            Err(e) => {
                tracing::debug!(identifier, error = %e, "supertype or trait not available; skipping its members");
                return;
            }
        };

        for method in own_methods {
            if !methods.iter().any(|m| m.name.eq_ignore_ascii_case(&method.name)) {
                methods.push(ResolvedMethod {
                    name: method.name,
                    declaring_type: identifier.to_string(),
                    parameters: method.parameters,
                });
            }
        }
        for property in own_properties {
            if !properties.iter().any(|p| p.name == property.name) {
                properties.push(ResolvedProperty {
                    name: property.name,
                    declaring_type: identifier.to_string(),
                });
            }
        }

        for trait_name in traits {
            self.collect_members(&trait_name, methods, properties, visited);
        }
        if let Some(parent) = parent {
            self.collect_members(&parent, methods, properties, visited);
        }
    }
}

impl TypeResolver for SourceTypeResolver {
    fn resolve(&mut self, identifier: &str) -> Result<TypeInfo> {
        let (path, cached, idx) = self.find_class(identifier)?;
        let class = &cached.parsed.classes[idx];

        if class.kind == ClassLikeKind::Interface {
            return Err(UmlError::unresolvable(
                identifier,
                "interfaces have no concrete implementation",
            ));
        }

        let kind = class.kind;
        let namespace = cached.parsed.namespace.clone();
        let use_map = cached.parsed.use_map.clone();
        let source = cached.content.clone();

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut visited = HashSet::new();
        self.collect_members(identifier, &mut methods, &mut properties, &mut visited);

        Ok(TypeInfo {
            identifier: identifier.to_string(),
            kind,
            path,
            namespace,
            use_map,
            source,
            methods,
            properties,
        })
    }

    fn can_locate(&mut self, identifier: &str) -> bool {
        self.find_class(identifier).is_ok()
    }

    /// Record where an identifier is expected to be declared.
    fn register(&mut self, file: &SourceFile) {
        self.index
            .entry(file.identifier.clone())
            .or_insert_with(|| file.path.clone());
    }
}
