//! PHP name resolution.
//!
//! Converts names as written in source (`User`, `Models\User`,
//! `\App\Models\User`) into fully-qualified identifiers without the
//! leading `\`, using the file's `use` map and namespace.

use std::collections::HashMap;

use crate::composer::is_builtin_type;
use crate::types::ClassInfo;

/// Resolve a class name to its fully-qualified form.
///
/// Rules (matching PHP name resolution):
///   1. Already fully-qualified (`\Foo\Bar`) → strip leading `\`
///   2. Qualified (`Foo\Bar`) → if first segment is in use_map, expand it;
///      otherwise prepend current namespace
///   3. Unqualified (`Bar`) → check use_map; otherwise prepend namespace
///   4. No namespace and not in use_map → keep as-is
pub fn resolve_name(
    name: &str,
    use_map: &HashMap<String, String>,
    namespace: &Option<String>,
) -> String {
    if let Some(stripped) = name.strip_prefix('\\') {
        return stripped.to_string();
    }

    if let Some(pos) = name.find('\\') {
        let first = &name[..pos];
        let rest = &name[pos..];
        if let Some(fqn) = use_map.get(first) {
            return format!("{}{}", fqn, rest);
        }
    } else if let Some(fqn) = use_map.get(name) {
        return fqn.clone();
    }

    match namespace {
        Some(ns) => format!("{}\\{}", ns, name),
        None => name.to_string(),
    }
}

/// Join a namespace and a short class name.
pub fn fully_qualify(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}\\{}", ns, name),
        None => name.to_string(),
    }
}

/// Resolve parent, trait and parameter type names of every class in a
/// file. `self`/`static` become the enclosing class; `parent` becomes the
/// parent class when there is one. Built-in type names are dropped.
pub(super) fn resolve_class_names(
    classes: &mut [ClassInfo],
    use_map: &HashMap<String, String>,
    namespace: &Option<String>,
) {
    for class in classes.iter_mut() {
        let own_fqn = fully_qualify(namespace, &class.name);

        if let Some(ref parent) = class.parent_class {
            class.parent_class = Some(resolve_name(parent, use_map, namespace));
        }

        class.used_traits = class
            .used_traits
            .iter()
            .map(|t| resolve_name(t, use_map, namespace))
            .collect();

        let parent_fqn = class.parent_class.clone();
        for method in &mut class.methods {
            for param in &mut method.parameters {
                param.class_types = param
                    .class_types
                    .iter()
                    .filter_map(|name| match name.to_ascii_lowercase().as_str() {
                        "self" | "static" => Some(own_fqn.clone()),
                        "parent" => parent_fqn.clone(),
                        _ if is_builtin_type(name) => None,
                        _ => Some(resolve_name(name, use_map, namespace)),
                    })
                    .collect();
            }
        }
    }
}
