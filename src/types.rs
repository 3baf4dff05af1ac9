//! Data types used throughout the diagram extractor.
//!
//! This module contains the "model" structs and enums: the owned symbol
//! table produced by the PHP parser (`ClassInfo`, `MethodInfo`, …), the
//! resolved, attribution-carrying view of a type (`TypeInfo`), and the
//! records that make up the final class graph (`ClassRecord`, `OrmEdge`).

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

/// A candidate source file together with its fully-qualified class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Fully-qualified identifier derived from the path, without a
    /// leading `\` (e.g. `App\Models\User`).
    pub identifier: String,
}

/// The kind of class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

/// Stores extracted parameter information from a parsed PHP method.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// The parameter name including the `$` prefix (e.g. "$user").
    pub name: String,
    /// Class names mentioned in the type hint. Nullable, union and
    /// intersection hints are flattened; scalar types are dropped.
    /// Fully-qualified after name resolution (e.g. "App\Models\User").
    pub class_types: Vec<String>,
}

/// Stores extracted method information from a parsed PHP class.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// The method name (e.g. "posts").
    pub name: String,
    /// The parameters of the method.
    pub parameters: Vec<ParameterInfo>,
}

/// Stores extracted property information from a parsed PHP class.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// The property name WITHOUT the `$` prefix (e.g. "fillable").
    pub name: String,
}

/// Stores extracted class information from a parsed PHP file.
/// All data is owned so we don't depend on the parser's arena lifetime.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Class, interface, trait or enum.
    pub kind: ClassLikeKind,
    /// The short name of the class (e.g. "User").
    pub name: String,
    /// The methods declared directly in this class body.
    pub methods: Vec<MethodInfo>,
    /// The properties declared directly in this class body, including
    /// constructor-promoted ones.
    pub properties: Vec<PropertyInfo>,
    /// The parent class from the `extends` clause, if any.
    pub parent_class: Option<String>,
    /// Traits pulled in with `use` inside the class body.
    pub used_traits: Vec<String>,
    /// Whether the class is declared `abstract`.
    pub is_abstract: bool,
}

/// Everything extracted from one PHP file in a single parse pass.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// The first declared namespace, if any.
    pub namespace: Option<String>,
    /// Short (imported) name → fully-qualified name.
    pub use_map: HashMap<String, String>,
    /// Class-likes declared in the file, with names in their type hints,
    /// parents and traits resolved to fully-qualified form.
    pub classes: Vec<ClassInfo>,
}

/// A method as seen through the resolver, attributed to the type that
/// declares it.
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub name: String,
    /// FQN of the class or trait whose body declares this method.
    pub declaring_type: String,
    pub parameters: Vec<ParameterInfo>,
}

/// A property as seen through the resolver, attributed to the type that
/// declares it.
#[derive(Debug, Clone)]
pub struct ResolvedProperty {
    pub name: String,
    /// FQN of the class or trait whose body declares this property.
    pub declaring_type: String,
}

/// Type metadata for one identifier, including inherited and trait
/// members, the way runtime reflection would list them.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Fully-qualified identifier of the type.
    pub identifier: String,
    pub kind: ClassLikeKind,
    /// The file that declares the type.
    pub path: PathBuf,
    /// Namespace of the declaring file.
    pub namespace: Option<String>,
    /// `use` map of the declaring file.
    pub use_map: HashMap<String, String>,
    /// Raw text of the declaring file.
    pub source: String,
    /// Own methods first, then trait methods, then inherited ones.
    pub methods: Vec<ResolvedMethod>,
    /// Own properties first, then trait properties, then inherited ones.
    pub properties: Vec<ResolvedProperty>,
}

/// Which way an ORM edge points when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The arrow runs from the target into the current class.
    To,
    /// The arrow runs from the current class into the target.
    From,
}

/// An ORM-style association inferred from a relationship-declaring call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OrmEdge {
    /// Fully-qualified identifier of the related class.
    pub target: String,
    /// The relationship method, e.g. "hasMany".
    pub kind: String,
    pub direction: Direction,
}

/// The unit of output: one class and everything the diagram says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRecord {
    /// Fully-qualified name; unique key in the class graph.
    pub identifier: String,
    /// Display name (last path segment).
    pub simple_name: String,
    /// Properties declared directly on this type.
    pub properties: Vec<String>,
    /// Methods declared directly on this type.
    pub methods: Vec<String>,
    /// Tracked identifiers this class imports, in first-seen order.
    pub import_edges: Vec<String>,
    /// Relationships inferred from method bodies, in first-seen order.
    pub orm_edges: Vec<OrmEdge>,
}

impl ClassRecord {
    /// Create an unpopulated record for an identifier.
    pub fn empty(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            simple_name: short_name(identifier).to_string(),
            properties: Vec::new(),
            methods: Vec::new(),
            import_edges: Vec::new(),
            orm_edges: Vec::new(),
        }
    }
}

/// Return the last `\`-separated segment of a (possibly qualified) name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}
