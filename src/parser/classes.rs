//! Class, interface, trait, and enum extraction.
//!
//! Each class-like declaration is tagged with a [`ClassLikeKind`] so the
//! resolver can tell concrete classes from abstract contracts and from
//! traits. Only members written in the declaration's own body are
//! collected here; inherited and trait members are merged later by the
//! resolver, attributed to the type that declares them.

use mago_syntax::ast::*;

use crate::types::*;

/// Members written directly in a class-like body, plus the traits it uses.
#[derive(Default)]
struct ExtractedMembers {
    methods: Vec<MethodInfo>,
    properties: Vec<PropertyInfo>,
    used_traits: Vec<String>,
}

/// Extract a single class-like statement into `classes`.
///
/// Names are kept as written; [`super::names::resolve_class_names`]
/// qualifies them once the whole file has been walked.
pub(super) fn extract_class_like(statement: &Statement<'_>, classes: &mut Vec<ClassInfo>) {
    match statement {
        Statement::Class(class) => {
            let parent_class = class
                .extends
                .as_ref()
                .and_then(|ext| ext.types.first().map(|ident| ident.value().to_string()));

            let members = extract_class_like_members(class.members.iter());

            classes.push(ClassInfo {
                kind: ClassLikeKind::Class,
                name: class.name.value.to_string(),
                methods: members.methods,
                properties: members.properties,
                parent_class,
                used_traits: members.used_traits,
                is_abstract: class.modifiers.contains_abstract(),
            });
        }
        Statement::Interface(iface) => {
            let members = extract_class_like_members(iface.members.iter());

            // Parent interfaces are not followed: an interface never
            // contributes concrete members.
            classes.push(ClassInfo {
                kind: ClassLikeKind::Interface,
                name: iface.name.value.to_string(),
                methods: members.methods,
                properties: members.properties,
                parent_class: None,
                used_traits: Vec::new(),
                is_abstract: true,
            });
        }
        Statement::Trait(trait_def) => {
            let members = extract_class_like_members(trait_def.members.iter());

            classes.push(ClassInfo {
                kind: ClassLikeKind::Trait,
                name: trait_def.name.value.to_string(),
                methods: members.methods,
                properties: members.properties,
                parent_class: None,
                used_traits: members.used_traits,
                is_abstract: false,
            });
        }
        Statement::Enum(enum_def) => {
            let members = extract_class_like_members(enum_def.members.iter());

            classes.push(ClassInfo {
                kind: ClassLikeKind::Enum,
                name: enum_def.name.value.to_string(),
                methods: members.methods,
                properties: members.properties,
                parent_class: None,
                used_traits: members.used_traits,
                is_abstract: false,
            });
        }
        _ => {}
    }
}

/// Walk class-like members and collect methods, properties (including
/// constructor-promoted ones) and used trait names, in source order.
fn extract_class_like_members<'a>(
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
) -> ExtractedMembers {
    let mut extracted = ExtractedMembers::default();

    for member in members {
        match member {
            ClassLikeMember::Method(method) => {
                let name = method.name.value.to_string();

                if name.eq_ignore_ascii_case("__construct") {
                    for param in method.parameter_list.parameters.iter() {
                        if param.is_promoted_property() {
                            extracted.properties.push(PropertyInfo {
                                name: strip_dollar(param.variable.name).to_string(),
                            });
                        }
                    }
                }

                extracted.methods.push(MethodInfo {
                    name,
                    parameters: extract_parameters(&method.parameter_list),
                });
            }
            ClassLikeMember::Property(property) => {
                for var in property.variables().iter() {
                    extracted.properties.push(PropertyInfo {
                        name: strip_dollar(var.name).to_string(),
                    });
                }
            }
            ClassLikeMember::TraitUse(trait_use) => {
                for trait_name_ident in trait_use.trait_names.iter() {
                    extracted
                        .used_traits
                        .push(trait_name_ident.value().to_string());
                }
            }
            _ => {}
        }
    }

    extracted
}

/// Extract parameter names and the class names in their type hints.
fn extract_parameters(parameter_list: &FunctionLikeParameterList) -> Vec<ParameterInfo> {
    parameter_list
        .parameters
        .iter()
        .map(|param| {
            let mut class_types = Vec::new();
            if let Some(hint) = param.hint.as_ref() {
                collect_hint_names(hint, &mut class_types);
            }
            ParameterInfo {
                name: param.variable.name.to_string(),
                class_types,
            }
        })
        .collect()
}

/// Collect the class-like names a type hint mentions.
///
/// `self` and `static` are kept so they can be resolved to the enclosing
/// class; every other keyword hint (scalars, `array`, `callable`, …) is
/// dropped.
fn collect_hint_names(hint: &Hint, out: &mut Vec<String>) {
    match hint {
        Hint::Identifier(ident) => out.push(ident.value().to_string()),
        Hint::Nullable(nullable) => collect_hint_names(nullable.hint, out),
        Hint::Union(union) => {
            collect_hint_names(union.left, out);
            collect_hint_names(union.right, out);
        }
        Hint::Intersection(intersection) => {
            collect_hint_names(intersection.left, out);
            collect_hint_names(intersection.right, out);
        }
        Hint::Parenthesized(paren) => collect_hint_names(paren.hint, out),
        Hint::Self_(keyword) | Hint::Static(keyword) => out.push(keyword.value.to_string()),
        _ => {}
    }
}

fn strip_dollar(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}
