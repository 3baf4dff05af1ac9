//! Declared-member extraction.
//!
//! Reflection-style listings include everything callable on a type.
//! The diagram only shows what a class declares itself, so members
//! whose declaring type is a parent class or a trait are filtered out
//! here.

use crate::error::Result;
use crate::resolver::TypeResolver;
use crate::types::TypeInfo;

/// Members a type declares itself, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredMembers {
    pub properties: Vec<String>,
    pub methods: Vec<String>,
    /// Class names used as parameter types of the declared methods,
    /// deduplicated, in first-seen order.
    pub parameter_types: Vec<String>,
}

/// Resolve `identifier` and keep only its own members.
///
/// Resolution failures are returned to the caller, which skips the
/// identifier.
pub fn extract_members(
    resolver: &mut dyn TypeResolver,
    identifier: &str,
) -> Result<(TypeInfo, DeclaredMembers)> {
    let info = resolver.resolve(identifier)?;
    let members = declared_members(&info);
    Ok((info, members))
}

/// Filter a resolved type's members down to those it declares.
pub fn declared_members(info: &TypeInfo) -> DeclaredMembers {
    let own = |declaring: &str| declaring == info.identifier;

    let properties = info
        .properties
        .iter()
        .filter(|p| own(p.declaring_type.as_str()))
        .map(|p| p.name.clone())
        .collect();

    let mut methods = Vec::new();
    let mut parameter_types: Vec<String> = Vec::new();
    for method in info.methods.iter().filter(|m| own(m.declaring_type.as_str())) {
        methods.push(method.name.clone());
        for ty in method.parameters.iter().flat_map(|p| p.class_types.iter()) {
            if !parameter_types.contains(ty) {
                parameter_types.push(ty.clone());
            }
        }
    }

    DeclaredMembers {
        properties,
        methods,
        parameter_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn method(name: &str, declaring: &str, types: &[&str]) -> ResolvedMethod {
        ResolvedMethod {
            name: name.to_string(),
            declaring_type: declaring.to_string(),
            parameters: vec![ParameterInfo {
                name: "$arg".to_string(),
                class_types: types.iter().map(|t| t.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn test_trait_and_inherited_members_are_excluded() {
        let info = TypeInfo {
            identifier: "App\\Models\\User".to_string(),
            kind: ClassLikeKind::Class,
            path: PathBuf::from("app/Models/User.php"),
            namespace: Some("App\\Models".to_string()),
            use_map: HashMap::new(),
            source: String::new(),
            methods: vec![
                method("posts", "App\\Models\\User", &["App\\Models\\Post"]),
                method("notify", "App\\Concerns\\Notifiable", &["App\\Models\\Channel"]),
                method("save", "App\\Models\\Base", &[]),
                method("follow", "App\\Models\\User", &["App\\Models\\User", "App\\Models\\Post"]),
            ],
            properties: vec![
                ResolvedProperty {
                    name: "id".to_string(),
                    declaring_type: "App\\Models\\User".to_string(),
                },
                ResolvedProperty {
                    name: "table".to_string(),
                    declaring_type: "App\\Models\\Base".to_string(),
                },
                ResolvedProperty {
                    name: "name".to_string(),
                    declaring_type: "App\\Models\\User".to_string(),
                },
            ],
        };

        let members = declared_members(&info);
        assert_eq!(members.properties, vec!["id", "name"]);
        assert_eq!(members.methods, vec!["posts", "follow"]);
        assert_eq!(
            members.parameter_types,
            vec!["App\\Models\\Post", "App\\Models\\User"]
        );
    }
}
