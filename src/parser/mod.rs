//! PHP parsing and symbol extraction.
//!
//! This module parses PHP source text with the mago_syntax parser and
//! extracts an owned [`ParsedFile`]: the class-likes the file declares
//! (with their directly declared members, parent and traits), the
//! file's `use` statement map and its namespace. Names appearing in
//! parents, traits and parameter type hints are resolved to
//! fully-qualified form before the file is returned.
//!
//! Sub-modules:
//! - [`classes`]: Class, interface, trait, and enum extraction
//! - [`use_statements`]: `use` statement and namespace extraction
//! - [`names`]: PHP name resolution against a `use` map and namespace

mod classes;
mod names;
mod use_statements;

use std::panic;

use bumpalo::Bump;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::types::ParsedFile;

pub use names::{fully_qualify, resolve_name};

/// Parse PHP source text into a [`ParsedFile`].
///
/// The mago-syntax parser can panic on some malformed input (for
/// example half-written heredocs). The whole parse is wrapped in
/// `catch_unwind`; on panic `None` is returned and the caller treats
/// the file as unresolvable.
pub fn parse_php(content: &str) -> Option<ParsedFile> {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| parse_php_inner(content)));

    match result {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::error!("parser panicked; skipping file");
            None
        }
    }
}

fn parse_php_inner(content: &str) -> ParsedFile {
    let arena = Bump::new();
    let file_id = mago_database::file::FileId::new("input.php");
    let program = parse_file_content(&arena, file_id, content);

    let mut parsed = ParsedFile::default();
    collect_statements(program.statements.iter(), &mut parsed);

    names::resolve_class_names(&mut parsed.classes, &parsed.use_map, &parsed.namespace);
    parsed
}

/// Gather namespace, `use` map and class-likes in a single walk.
fn collect_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    parsed: &mut ParsedFile,
) {
    for statement in statements {
        match statement {
            Statement::Use(use_stmt) => {
                use_statements::extract_use_items(&use_stmt.items, &mut parsed.use_map);
            }
            Statement::Namespace(ns) => {
                if parsed.namespace.is_none()
                    && let Some(ident) = &ns.name
                {
                    let name = ident.value();
                    if !name.is_empty() {
                        parsed.namespace = Some(name.to_string());
                    }
                }
                collect_statements(ns.statements().iter(), parsed);
            }
            Statement::Class(_)
            | Statement::Interface(_)
            | Statement::Trait(_)
            | Statement::Enum(_) => {
                classes::extract_class_like(statement, &mut parsed.classes);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassLikeKind;

    #[test]
    fn test_extracts_class_members() {
        let php = concat!(
            "<?php\n",
            "namespace App\\Models;\n",
            "\n",
            "use Illuminate\\Database\\Eloquent\\Model;\n",
            "use Illuminate\\Database\\Eloquent\\Factories\\HasFactory;\n",
            "\n",
            "class User extends Model {\n",
            "    use HasFactory;\n",
            "    protected $fillable = ['name'];\n",
            "    public string $id, $email;\n",
            "    public function __construct(private Mailer $mailer, int $n = 0) {}\n",
            "    public function posts() { return $this->hasMany(Post::class); }\n",
            "}\n",
        );

        let parsed = parse_php(php).expect("should parse");
        assert_eq!(parsed.namespace.as_deref(), Some("App\\Models"));
        assert_eq!(parsed.classes.len(), 1);

        let user = &parsed.classes[0];
        assert_eq!(user.kind, ClassLikeKind::Class);
        assert_eq!(user.name, "User");
        assert_eq!(
            user.parent_class.as_deref(),
            Some("Illuminate\\Database\\Eloquent\\Model")
        );
        assert_eq!(
            user.used_traits,
            vec!["Illuminate\\Database\\Eloquent\\Factories\\HasFactory".to_string()]
        );

        let props: Vec<&str> = user.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, vec!["fillable", "id", "email", "mailer"]);

        let methods: Vec<&str> = user.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["__construct", "posts"]);

        let ctor = &user.methods[0];
        assert_eq!(ctor.parameters.len(), 2);
        assert_eq!(ctor.parameters[0].name, "$mailer");
        assert_eq!(
            ctor.parameters[0].class_types,
            vec!["App\\Models\\Mailer".to_string()]
        );
        assert!(ctor.parameters[1].class_types.is_empty());
    }

    #[test]
    fn test_parameter_types_are_resolved() {
        let php = concat!(
            "<?php\n",
            "namespace App\\Http\\Controllers;\n",
            "use App\\Models\\User;\n",
            "use App\\Http\\Requests\\StoreUserRequest as StoreRequest;\n",
            "class UserController {\n",
            "    public function store(StoreRequest $request, ?User $user, \\Carbon\\Carbon|string $at) {}\n",
            "    public function show(self $other, Support\\Thing $thing) {}\n",
            "}\n",
        );

        let parsed = parse_php(php).expect("should parse");
        let controller = &parsed.classes[0];
        let store = &controller.methods[0];
        assert_eq!(
            store.parameters[0].class_types,
            vec!["App\\Http\\Requests\\StoreUserRequest".to_string()]
        );
        assert_eq!(store.parameters[1].class_types, vec!["App\\Models\\User".to_string()]);
        assert_eq!(store.parameters[2].class_types, vec!["Carbon\\Carbon".to_string()]);

        let show = &controller.methods[1];
        assert_eq!(
            show.parameters[0].class_types,
            vec!["App\\Http\\Controllers\\UserController".to_string()]
        );
        assert_eq!(
            show.parameters[1].class_types,
            vec!["App\\Http\\Controllers\\Support\\Thing".to_string()]
        );
    }

    #[test]
    fn test_interfaces_traits_and_abstract_classes() {
        let php = concat!(
            "<?php\n",
            "namespace App\\Contracts;\n",
            "interface Billable { public function charge(int $amount); }\n",
            "trait Notifies { public $channel; public function notify() {} }\n",
            "abstract class Base { abstract public function handle(); }\n",
        );

        let parsed = parse_php(php).expect("should parse");
        let kinds: Vec<ClassLikeKind> = parsed.classes.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ClassLikeKind::Interface, ClassLikeKind::Trait, ClassLikeKind::Class]
        );
        assert!(parsed.classes[2].is_abstract);
        assert_eq!(parsed.classes[1].properties[0].name, "channel");
    }

    #[test]
    fn test_group_and_aliased_use_statements() {
        let php = concat!(
            "<?php\n",
            "namespace App;\n",
            "use App\\Models\\{User, Post as Article};\n",
            "use function App\\helpers\\money;\n",
            "use Illuminate\\Support\\Str;\n",
        );

        let use_map = parse_php(php).expect("should parse").use_map;
        assert_eq!(use_map.get("User").map(String::as_str), Some("App\\Models\\User"));
        assert_eq!(use_map.get("Article").map(String::as_str), Some("App\\Models\\Post"));
        assert_eq!(use_map.get("Str").map(String::as_str), Some("Illuminate\\Support\\Str"));
        assert!(!use_map.contains_key("money"));
    }

    #[test]
    fn test_file_without_classes() {
        let parsed = parse_php("<?php\nfunction helper() {}\n$x = 1;\n").expect("should parse");
        assert!(parsed.classes.is_empty());
        assert!(parsed.namespace.is_none());
    }
}
