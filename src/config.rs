//! Project configuration.
//!
//! Settings live in an optional `laravel-uml.toml` at the project root
//! (or wherever `--config` points). Every key has a default that matches
//! a stock Laravel application, so an empty file and no file at all
//! behave the same.
//!
//! ```toml
//! app_path = "app"
//! exclude_files = ["Http/Kernel.php"]
//!
//! [categories]
//! jobs = true
//!
//! [directories]
//! models = "Domain/Models/"
//!
//! [style]
//! direction = "right"
//! fontSize = 14
//!
//! [relationships]
//! hasOneOfMany = "to"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, UmlError};
use crate::types::Direction;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "laravel-uml.toml";

/// A family of application classes living in one conventional directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Casts,
    Channels,
    Commands,
    Components,
    Controllers,
    Events,
    Exceptions,
    Jobs,
    Listeners,
    Mails,
    Middlewares,
    Models,
    Notifications,
    Observers,
    Policies,
    Providers,
    Requests,
    Resources,
    Rules,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Casts,
        Category::Channels,
        Category::Commands,
        Category::Components,
        Category::Controllers,
        Category::Events,
        Category::Exceptions,
        Category::Jobs,
        Category::Listeners,
        Category::Mails,
        Category::Middlewares,
        Category::Models,
        Category::Notifications,
        Category::Observers,
        Category::Policies,
        Category::Providers,
        Category::Requests,
        Category::Resources,
        Category::Rules,
    ];

    /// Key used in the `[categories]` and `[directories]` tables.
    pub fn key(self) -> &'static str {
        match self {
            Category::Casts => "casts",
            Category::Channels => "channels",
            Category::Commands => "commands",
            Category::Components => "components",
            Category::Controllers => "controllers",
            Category::Events => "events",
            Category::Exceptions => "exceptions",
            Category::Jobs => "jobs",
            Category::Listeners => "listeners",
            Category::Mails => "mails",
            Category::Middlewares => "middlewares",
            Category::Models => "models",
            Category::Notifications => "notifications",
            Category::Observers => "observers",
            Category::Policies => "policies",
            Category::Providers => "providers",
            Category::Requests => "requests",
            Category::Resources => "resources",
            Category::Rules => "rules",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Directory relative to the application path.
    pub fn default_directory(self) -> &'static str {
        match self {
            Category::Casts => "Casts/",
            Category::Channels => "Broadcasting/",
            Category::Commands => "Console/Commands/",
            Category::Components => "View/Components/",
            Category::Controllers => "Http/Controllers/",
            Category::Events => "Events/",
            Category::Exceptions => "Exceptions/",
            Category::Jobs => "Jobs/",
            Category::Listeners => "Listeners/",
            Category::Mails => "Mail/",
            Category::Middlewares => "Http/Middleware/",
            Category::Models => "Models/",
            Category::Notifications => "Notifications/",
            Category::Observers => "Observers/",
            Category::Policies => "Policies/",
            Category::Providers => "Providers/",
            Category::Requests => "Http/Requests/",
            Category::Resources => "Http/Resources/",
            Category::Rules => "Rules/",
        }
    }

    pub fn enabled_by_default(self) -> bool {
        matches!(
            self,
            Category::Controllers | Category::Models | Category::Requests
        )
    }
}

/// Laravel scaffold files that never make it into a diagram.
const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    "Http/Kernel.php",
    "Console/Kernel.php",
    "Exceptions/Handler.php",
    "Http/Controllers/Controller.php",
    "Http/Middleware/Authenticate.php",
    "Http/Middleware/EncryptCookies.php",
    "Http/Middleware/PreventRequestsDuringMaintenance.php",
    "Http/Middleware/RedirectIfAuthenticated.php",
    "Http/Middleware/TrimStrings.php",
    "Http/Middleware/TrustHosts.php",
    "Http/Middleware/TrustProxies.php",
    "Http/Middleware/VerifyCsrfToken.php",
    "Providers/AppServiceProvider.php",
    "Providers/AuthServiceProvider.php",
    "Providers/BroadcastServiceProvider.php",
    "Providers/EventServiceProvider.php",
    "Providers/RouteServiceProvider.php",
];

/// A single nomnoml directive value. Forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Bool(b) => write!(f, "{}", b),
            StyleValue::Integer(i) => write!(f, "{}", i),
            StyleValue::Float(x) => write!(f, "{}", x),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

/// The nomnoml styling block. Each option present becomes one
/// `#option: value` line, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleConfig {
    pub background: Option<StyleValue>,
    pub stroke: Option<StyleValue>,
    pub arrow_size: Option<StyleValue>,
    pub bend_size: Option<StyleValue>,
    pub direction: Option<StyleValue>,
    pub gutter: Option<StyleValue>,
    pub edge_margin: Option<StyleValue>,
    pub gravity: Option<StyleValue>,
    pub edges: Option<StyleValue>,
    pub fill: Option<StyleValue>,
    pub fill_arrows: Option<StyleValue>,
    pub font: Option<StyleValue>,
    pub font_size: Option<StyleValue>,
    pub leading: Option<StyleValue>,
    pub line_width: Option<StyleValue>,
    pub padding: Option<StyleValue>,
    pub spacing: Option<StyleValue>,
    pub title: Option<StyleValue>,
    pub zoom: Option<StyleValue>,
    pub acyclicer: Option<StyleValue>,
    pub ranker: Option<StyleValue>,
}

impl StyleConfig {
    /// The theme used when no `[style]` table is configured.
    pub fn dark_theme() -> Self {
        Self {
            background: Some("#071013".into()),
            stroke: Some("#EBEBEB".into()),
            arrow_size: Some(StyleValue::Integer(1)),
            bend_size: Some(StyleValue::Float(0.3)),
            direction: Some("down".into()),
            gutter: Some(StyleValue::Integer(5)),
            edge_margin: Some(StyleValue::Integer(0)),
            gravity: Some(StyleValue::Integer(1)),
            edges: Some("rounded".into()),
            fill: Some("#3A6EA5".into()),
            fill_arrows: Some(StyleValue::Bool(false)),
            font: Some("Calibri".into()),
            font_size: Some(StyleValue::Integer(12)),
            leading: Some(StyleValue::Float(1.25)),
            line_width: Some(StyleValue::Integer(3)),
            padding: Some(StyleValue::Integer(8)),
            spacing: Some(StyleValue::Integer(40)),
            title: Some("Filename".into()),
            zoom: Some(StyleValue::Integer(1)),
            acyclicer: Some("greedy".into()),
            ranker: Some("longest-path".into()),
        }
    }

    /// Present options as `(name, value)` pairs in the fixed option order.
    pub fn directives(&self) -> Vec<(&'static str, &StyleValue)> {
        let all: [(&'static str, &Option<StyleValue>); 21] = [
            ("background", &self.background),
            ("stroke", &self.stroke),
            ("arrowSize", &self.arrow_size),
            ("bendSize", &self.bend_size),
            ("direction", &self.direction),
            ("gutter", &self.gutter),
            ("edgeMargin", &self.edge_margin),
            ("gravity", &self.gravity),
            ("edges", &self.edges),
            ("fill", &self.fill),
            ("fillArrows", &self.fill_arrows),
            ("font", &self.font),
            ("fontSize", &self.font_size),
            ("leading", &self.leading),
            ("lineWidth", &self.line_width),
            ("padding", &self.padding),
            ("spacing", &self.spacing),
            ("title", &self.title),
            ("zoom", &self.zoom),
            ("acyclicer", &self.acyclicer),
            ("ranker", &self.ranker),
        ];
        all.into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name, v)))
            .collect()
    }
}

/// Relationship-declaring methods and the way each one's edge points.
///
/// Kept in insertion order so the scanner's pattern is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTable {
    kinds: Vec<(String, Direction)>,
}

impl Default for RelationshipTable {
    fn default() -> Self {
        let kinds = [
            ("hasOne", Direction::To),
            ("hasOneThrough", Direction::To),
            ("hasMany", Direction::To),
            ("hasManyThrough", Direction::To),
            ("morphOne", Direction::To),
            ("morphMany", Direction::To),
            ("morphToMany", Direction::To),
            ("belongsTo", Direction::From),
            ("belongsToMany", Direction::From),
            ("morphedByMany", Direction::From),
        ];
        Self {
            kinds: kinds
                .into_iter()
                .map(|(k, d)| (k.to_string(), d))
                .collect(),
        }
    }
}

impl RelationshipTable {
    /// A table with no kinds at all.
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Add a kind, or change the direction of one already present.
    pub fn insert(&mut self, kind: &str, direction: Direction) {
        if let Some(entry) = self.kinds.iter_mut().find(|(k, _)| k == kind) {
            entry.1 = direction;
        } else {
            self.kinds.push((kind.to_string(), direction));
        }
    }

    pub fn direction(&self, kind: &str) -> Option<Direction> {
        self.kinds
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, d)| *d)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Top-level configuration, as read from `laravel-uml.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Application source root, relative to the project root.
    pub app_path: String,
    /// Category key → whether it is indexed.
    pub categories: BTreeMap<String, bool>,
    /// Category key → directory relative to `app_path`.
    pub directories: BTreeMap<String, String>,
    /// Files relative to `app_path` that are never indexed.
    pub exclude_files: Vec<String>,
    pub style: StyleConfig,
    /// Extra or overriding relationship kinds.
    pub relationships: BTreeMap<String, Direction>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_path: "app".to_string(),
            categories: BTreeMap::new(),
            directories: BTreeMap::new(),
            exclude_files: DEFAULT_EXCLUDE_FILES.iter().map(|s| s.to_string()).collect(),
            style: StyleConfig::dark_theme(),
            relationships: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| UmlError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            UmlError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load `laravel-uml.toml` from the project root, falling back to
    /// defaults when the file does not exist.
    pub fn discover(root: &Path) -> Result<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading configuration");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        for key in self.categories.keys().chain(self.directories.keys()) {
            if Category::from_key(key).is_none() {
                return Err(UmlError::config(format!("unknown category `{}`", key)));
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories
            .get(category.key())
            .copied()
            .unwrap_or_else(|| category.enabled_by_default())
    }

    pub fn directory(&self, category: Category) -> &str {
        self.directories
            .get(category.key())
            .map(String::as_str)
            .unwrap_or_else(|| category.default_directory())
    }

    /// Categories to index, in their canonical order.
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// The default relationship table with `[relationships]` applied.
    pub fn relationship_table(&self) -> RelationshipTable {
        let mut table = RelationshipTable::default();
        for (kind, direction) in &self.relationships {
            table.insert(kind, *direction);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_laravel() {
        let config = Config::default();
        assert_eq!(config.app_path, "app");
        assert_eq!(
            config.enabled_categories(),
            vec![Category::Controllers, Category::Models, Category::Requests]
        );
        assert_eq!(config.directory(Category::Models), "Models/");
        assert!(
            config
                .exclude_files
                .contains(&"Http/Controllers/Controller.php".to_string())
        );
        assert_eq!(config.style.directives().len(), 21);
    }

    #[test]
    fn test_toml_overrides() {
        let config = Config::from_toml(
            r#"
            app_path = "src"
            exclude_files = []

            [categories]
            jobs = true
            requests = false

            [directories]
            models = "Domain/"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.app_path, "src");
        assert!(config.exclude_files.is_empty());
        assert!(config.is_enabled(Category::Jobs));
        assert!(!config.is_enabled(Category::Requests));
        assert!(config.is_enabled(Category::Models));
        assert_eq!(config.directory(Category::Models), "Domain/");
        assert_eq!(config.directory(Category::Jobs), "Jobs/");
    }

    #[test]
    fn test_style_table_replaces_default_theme() {
        let config = Config::from_toml(
            r#"
            [style]
            zoom = 2
            direction = "right"
            bendSize = 0.5
            fillArrows = true
            "#,
        )
        .expect("valid config");

        let rendered: Vec<String> = config
            .style
            .directives()
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        assert_eq!(
            rendered,
            vec!["bendSize=0.5", "direction=right", "fillArrows=true", "zoom=2"]
        );
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = Config::from_toml("[categories]\nwidgets = true\n").unwrap_err();
        assert!(matches!(err, UmlError::Config { .. }));
    }

    #[test]
    fn test_unknown_style_option_is_rejected() {
        assert!(Config::from_toml("[style]\ncolour = \"red\"\n").is_err());
    }

    #[test]
    fn test_relationship_overrides() {
        let config = Config::from_toml(
            r#"
            [relationships]
            hasOneOfMany = "to"
            belongsTo = "to"
            "#,
        )
        .expect("valid config");

        let table = config.relationship_table();
        assert_eq!(table.direction("hasOneOfMany"), Some(Direction::To));
        assert_eq!(table.direction("belongsTo"), Some(Direction::To));
        assert_eq!(table.direction("hasMany"), Some(Direction::To));
        assert_eq!(table.direction("morphedByMany"), Some(Direction::From));
        assert_eq!(table.direction("morphTo"), None);
    }
}
