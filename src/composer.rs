//! Composer autoload support.
//!
//! This module parses `composer.json` to extract PSR-4 autoload
//! mappings and uses them in both directions: a fully-qualified class
//! name is turned into the file that should declare it, and a file on
//! disk is turned into the class name it is expected to declare.
//!
//! # PSR-4 Resolution
//!
//! Given a mapping like `"App\\" => "app/"`, a class name like
//! `App\Models\User` is resolved by:
//!   1. Stripping the matching prefix (`App\`) from the class name
//!   2. Converting remaining namespace separators to directory separators
//!   3. Appending `.php`
//!   4. Prepending the mapped base directory
//!
//! Result: `<root>/app/Models/User.php`
//!
//! Projects without a `composer.json` (or without a mapping that covers
//! a file) fall back to the stock Laravel layout, where `app/` holds the
//! `App\` namespace.

use std::path::{Component, Path, PathBuf};

/// A single PSR-4 namespace-to-directory mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psr4Mapping {
    /// The namespace prefix, always ending with `\` (e.g. `"App\"`),
    /// or empty for the root-namespace fallback.
    pub prefix: String,
    /// The base directory path relative to the project root (e.g. `"app/"`).
    pub base_path: String,
}

/// PSR-4 mappings bound to a project root.
#[derive(Debug, Clone)]
pub struct Autoload {
    root: PathBuf,
    mappings: Vec<Psr4Mapping>,
}

impl Autoload {
    /// Read `composer.json` from `root`. A missing or unreadable file
    /// yields an autoloader with no mappings.
    pub fn load(root: &Path) -> Self {
        Self::new(root, parse_composer_json(root))
    }

    pub fn new(root: &Path, mut mappings: Vec<Psr4Mapping>) -> Self {
        // Longest prefix first so the most specific mapping wins.
        mappings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            root: root.to_path_buf(),
            mappings,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mappings(&self) -> &[Psr4Mapping] {
        &self.mappings
    }

    /// Resolve a fully-qualified class name to an existing file.
    ///
    /// A leading `\` is stripped. Returns the first candidate that exists
    /// on disk, or `None` when no mapping matches or no file exists.
    pub fn path_for_class(&self, class_name: &str) -> Option<PathBuf> {
        let name = class_name.strip_prefix('\\').unwrap_or(class_name);
        if name.is_empty() || is_builtin_type(name) {
            return None;
        }

        for mapping in &self.mappings {
            let relative = if mapping.prefix.is_empty() {
                Some(name)
            } else {
                name.strip_prefix(&mapping.prefix)
            };

            if let Some(relative_class) = relative {
                let relative_path = relative_class.replace('\\', "/");
                let file_path = self
                    .root
                    .join(&mapping.base_path)
                    .join(format!("{}.php", relative_path));
                if file_path.is_file() {
                    return Some(file_path);
                }
            }
        }

        // Stock Laravel layout.
        if let Some(rest) = name.strip_prefix("App\\") {
            let file_path = self
                .root
                .join("app")
                .join(format!("{}.php", rest.replace('\\', "/")));
            if file_path.is_file() {
                return Some(file_path);
            }
        }

        None
    }

    /// Derive the fully-qualified class name a file is expected to
    /// declare, from its location relative to the project root.
    ///
    /// The mapping with the longest matching base directory wins. With no
    /// matching mapping, a leading `app/` becomes `App\` and the rest of
    /// the path is converted segment by segment.
    pub fn class_for_path(&self, path: &Path) -> String {
        let relative = relative_slash_path(&self.root, path);
        let stem = relative.strip_suffix(".php").unwrap_or(&relative);

        let best = self
            .mappings
            .iter()
            .filter(|m| stem.starts_with(&m.base_path))
            .max_by_key(|m| m.base_path.len());

        if let Some(mapping) = best {
            let rest = &stem[mapping.base_path.len()..];
            return format!("{}{}", mapping.prefix, rest.replace('/', "\\"));
        }

        if let Some(rest) = stem.strip_prefix("app/") {
            return format!("App\\{}", rest.replace('/', "\\"));
        }
        stem.replace('/', "\\")
    }
}

/// Express `path` relative to `root` with forward slashes. Paths outside
/// the root are used as given.
pub(crate) fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse a `composer.json` file at the given project root and extract all
/// PSR-4 autoload mappings from both `autoload` and `autoload-dev` sections.
///
/// Returns an empty `Vec` if the file doesn't exist, can't be read, or
/// contains no PSR-4 mappings.
pub fn parse_composer_json(root: &Path) -> Vec<Psr4Mapping> {
    let composer_path = root.join("composer.json");
    let content = match std::fs::read_to_string(&composer_path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %composer_path.display(), error = %e, "ignoring invalid composer.json");
            return Vec::new();
        }
    };

    let mut mappings = Vec::new();

    for section_key in &["autoload", "autoload-dev"] {
        if let Some(section) = json.get(section_key)
            && let Some(psr4) = section.get("psr-4")
            && let Some(psr4_obj) = psr4.as_object()
        {
            for (prefix, paths) in psr4_obj {
                extract_psr4_entries(prefix, paths, &mut mappings);
            }
        }
    }

    mappings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    mappings
}

/// Extract PSR-4 entries from a single prefix → path(s) pair.
///
/// The value can be either a string (`"app/"`) or an array of strings
/// (`["app/", "lib/"]`).
fn extract_psr4_entries(prefix: &str, paths: &serde_json::Value, mappings: &mut Vec<Psr4Mapping>) {
    let normalised_prefix = if prefix.ends_with('\\') || prefix.is_empty() {
        prefix.to_string()
    } else {
        format!("{}\\", prefix)
    };

    match paths {
        serde_json::Value::String(path) => {
            mappings.push(Psr4Mapping {
                prefix: normalised_prefix,
                base_path: normalise_path(path),
            });
        }
        serde_json::Value::Array(arr) => {
            for path in arr.iter().filter_map(|entry| entry.as_str()) {
                mappings.push(Psr4Mapping {
                    prefix: normalised_prefix.clone(),
                    base_path: normalise_path(path),
                });
            }
        }
        _ => {}
    }
}

/// Normalise a directory path: forward slashes, no leading `./`, and a
/// trailing `/` unless empty.
pub fn normalise_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    let p = p.strip_prefix("./").unwrap_or(&p);
    if p.ends_with('/') || p.is_empty() {
        p.to_string()
    } else {
        format!("{}/", p)
    }
}

/// Check if a name is a PHP built-in type (not a class).
pub fn is_builtin_type(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "self"
            | "static"
            | "parent"
            | "string"
            | "int"
            | "float"
            | "bool"
            | "array"
            | "object"
            | "mixed"
            | "void"
            | "never"
            | "null"
            | "true"
            | "false"
            | "callable"
            | "iterable"
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: a temporary project with a composer.json and optional
    /// PHP class files.
    struct TestProject {
        dir: tempfile::TempDir,
    }

    impl TestProject {
        fn new(composer_json: &str) -> Self {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            fs::write(dir.path().join("composer.json"), composer_json)
                .expect("failed to write composer.json");
            TestProject { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn create_php_file(&self, relative_path: &str, content: &str) {
            let full_path = self.dir.path().join(relative_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).expect("failed to create dirs");
            }
            fs::write(&full_path, content).expect("failed to write PHP file");
        }
    }

    const LARAVEL_COMPOSER: &str = r#"{
        "autoload": {
            "psr-4": {
                "App\\": "app/",
                "Database\\Factories\\": "database/factories/"
            }
        },
        "autoload-dev": {
            "psr-4": {
                "Tests\\": "tests/"
            }
        }
    }"#;

    #[test]
    fn test_parse_laravel_composer() {
        let project = TestProject::new(LARAVEL_COMPOSER);
        let mappings = parse_composer_json(project.root());
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[0].prefix, "Database\\Factories\\");
        assert_eq!(mappings[0].base_path, "database/factories/");
        assert!(mappings.iter().any(|m| m.prefix == "Tests\\" && m.base_path == "tests/"));
    }

    #[test]
    fn test_parse_array_paths_and_bare_prefix() {
        let project = TestProject::new(
            r#"{ "autoload": { "psr-4": { "Domain": ["src/", "./lib"] } } }"#,
        );
        let mappings = parse_composer_json(project.root());
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].prefix, "Domain\\");
        assert_eq!(mappings[0].base_path, "src/");
        assert_eq!(mappings[1].base_path, "lib/");
    }

    #[test]
    fn test_parse_missing_or_invalid_composer_json() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        assert!(parse_composer_json(dir.path()).is_empty());

        let project = TestProject::new("not valid json {{{");
        assert!(parse_composer_json(project.root()).is_empty());
    }

    #[test]
    fn test_path_for_class_uses_psr4() {
        let project = TestProject::new(LARAVEL_COMPOSER);
        project.create_php_file(
            "app/Models/User.php",
            "<?php\nnamespace App\\Models;\nclass User {}\n",
        );

        let autoload = Autoload::load(project.root());
        let path = autoload
            .path_for_class("\\App\\Models\\User")
            .expect("should resolve");
        assert!(path.ends_with("app/Models/User.php"));
        assert!(autoload.path_for_class("App\\Models\\Missing").is_none());
        assert!(autoload.path_for_class("Illuminate\\Database\\Eloquent\\Model").is_none());
    }

    #[test]
    fn test_path_for_class_without_composer_uses_laravel_layout() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("app/Models/Post.php");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "<?php\n").unwrap();

        let autoload = Autoload::load(dir.path());
        assert_eq!(autoload.path_for_class("App\\Models\\Post"), Some(file));
    }

    #[test]
    fn test_builtin_types_never_resolve() {
        let project = TestProject::new(r#"{ "autoload": { "psr-4": { "": "src/" } } }"#);
        project.create_php_file("src/string.php", "<?php\n");
        let autoload = Autoload::load(project.root());
        for builtin in &["self", "static", "string", "Int", "mixed", "iterable"] {
            assert!(
                autoload.path_for_class(builtin).is_none(),
                "builtin type '{}' should not resolve",
                builtin
            );
        }
    }

    #[test]
    fn test_class_for_path_uses_longest_base_path() {
        let project = TestProject::new(LARAVEL_COMPOSER);
        let autoload = Autoload::load(project.root());
        assert_eq!(
            autoload.class_for_path(&project.root().join("app/Http/Controllers/UserController.php")),
            "App\\Http\\Controllers\\UserController"
        );
        assert_eq!(
            autoload.class_for_path(&project.root().join("database/factories/UserFactory.php")),
            "Database\\Factories\\UserFactory"
        );
    }

    #[test]
    fn test_class_for_path_falls_back_to_laravel_convention() {
        let autoload = Autoload::new(Path::new("/srv/shop"), Vec::new());
        assert_eq!(
            autoload.class_for_path(Path::new("/srv/shop/app/Models/Order.php")),
            "App\\Models\\Order"
        );
        assert_eq!(
            autoload.class_for_path(Path::new("/srv/shop/modules/Billing/Invoice.php")),
            "modules\\Billing\\Invoice"
        );
    }

    #[test]
    fn test_normalise_path() {
        assert_eq!(normalise_path("src"), "src/");
        assert_eq!(normalise_path("src/"), "src/");
        assert_eq!(normalise_path(""), "");
        assert_eq!(normalise_path("app\\Domain\\"), "app/Domain/");
    }
}
