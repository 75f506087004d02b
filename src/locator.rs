//! Locates the single version-constructor call in a parsed source unit and
//! rewrites its string argument in place.
//!
//! The search is a depth-first pre-order walk that stops at the first
//! qualifying call: a call whose callee is `<local>::parse` or
//! `<local>::must_parse`, where `<local>` is the name bound by the
//! `use sembump::version` import (or its `as` alias). Multiple version
//! expressions per file are out of scope, so everything after the first
//! match is never visited.

use std::borrow::Cow;
use std::ops::Range;

use tracing::{debug, trace};
use tree_sitter::{Node, Tree};

use crate::error::BumpError;
use crate::parser::parse_source;
use crate::version::{self, BumpKind, Version};

/// Import path target files must use to construct their embedded version.
pub const VERSION_IMPORT: &str = "sembump::version";

/// The recognized constructor names. `must_parse` is the strict form,
/// `parse` the fallible one; both are treated identically here because
/// only the argument matters.
const CONSTRUCTORS: [&str; 2] = ["parse", "must_parse"];

/// Result of one locate-and-bump invocation.
///
/// For show mode (`BumpKind::None`) `source` borrows the input unchanged;
/// for a bump it owns a copy that differs from the input only inside the
/// located literal.
#[derive(Debug)]
pub struct BumpOutcome<'a> {
    pub version: Version,
    pub source: Cow<'a, str>,
}

/// The syntactic slot holding the version string.
///
/// Both shapes carry the byte range of the string literal that will be
/// rewritten. In the aliased case that is the *initializer's* literal,
/// not the call argument, so other uses of the same name stay untouched.
#[derive(Debug, PartialEq, Eq)]
enum Located {
    Direct(Range<usize>),
    Aliased { name: String, literal: Range<usize> },
}

impl Located {
    fn literal_range(&self) -> Range<usize> {
        match self {
            Located::Direct(range) => range.clone(),
            Located::Aliased { literal, .. } => literal.clone(),
        }
    }
}

/// Parses `source` and applies `kind` to the single embedded version.
///
/// Any failure leaves the input untouched; on success the returned source
/// is byte-identical to the input outside the located literal.
pub fn bump_source(source: &str, kind: BumpKind) -> Result<BumpOutcome<'_>, BumpError> {
    let tree = parse_source(source)?;
    locate_and_bump(&tree, source, kind)
}

/// Locate-and-mutate over an already parsed tree.
pub fn locate_and_bump<'a>(
    tree: &Tree,
    source: &'a str,
    kind: BumpKind,
) -> Result<BumpOutcome<'a>, BumpError> {
    let located = locate(tree.root_node(), source)?;
    if let Located::Aliased { name, .. } = &located {
        debug!(%name, "version argument resolved through a declaration");
    }
    let range = located.literal_range();
    let current = version::parse(&unquote(&source[range.clone()])?)?;
    debug!(version = %current, "located embedded version");

    if kind == BumpKind::None {
        return Ok(BumpOutcome {
            version: current,
            source: Cow::Borrowed(source),
        });
    }

    let bumped = current.bump(kind)?;
    debug!(from = %current, to = %bumped, "rewriting version literal");
    let mut rewritten = String::with_capacity(source.len() + 2);
    rewritten.push_str(&source[..range.start]);
    rewritten.push_str(&format!("\"{bumped}\""));
    rewritten.push_str(&source[range.end..]);
    Ok(BumpOutcome {
        version: bumped,
        source: Cow::Owned(rewritten),
    })
}

fn locate(root: Node<'_>, source: &str) -> Result<Located, BumpError> {
    let local = import_local_name(root, source)?;
    debug!(%local, "version module import found");

    let call = find_qualifying_call(root, source, &local)
        .ok_or_else(|| BumpError::NoQualifyingCall { local: local.clone() })?;
    let callee = call
        .child_by_field_name("function")
        .map(|f| source[f.byte_range()].to_string())
        .unwrap_or_else(|| local.clone());
    trace!(%callee, "qualifying call found");

    let args = call_arguments(call);
    if args.len() != 1 {
        return Err(BumpError::Arity {
            call: callee,
            found: args.len(),
        });
    }

    resolve_argument(root, source, args[0])
}

/// Finds the local name bound by the `use sembump::version` import.
///
/// Handles the plain form (`use sembump::version;` binds `version`) and
/// the renaming form (`use sembump::version as ver;` binds `ver`).
fn import_local_name(node: Node<'_>, source: &str) -> Result<String, BumpError> {
    fn search(node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() == "use_declaration" {
            if let Some(arg) = node.child_by_field_name("argument") {
                match arg.kind() {
                    "scoped_identifier" if &source[arg.byte_range()] == VERSION_IMPORT => {
                        let name = arg.child_by_field_name("name")?;
                        return Some(source[name.byte_range()].to_string());
                    }
                    "use_as_clause" => {
                        let path = arg.child_by_field_name("path")?;
                        if &source[path.byte_range()] == VERSION_IMPORT {
                            let alias = arg.child_by_field_name("alias")?;
                            return Some(source[alias.byte_range()].to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = search(child, source) {
                return Some(found);
            }
        }
        None
    }

    search(node, source).ok_or(BumpError::ImportNotFound(VERSION_IMPORT))
}

/// Depth-first pre-order search for the first call to one of the
/// recognized constructors through the bound local name.
///
/// The early return on a match is the single-match discipline: the rest
/// of the tree is deliberately never visited.
fn find_qualifying_call<'t>(node: Node<'t>, source: &str, local: &str) -> Option<Node<'t>> {
    if node.kind() == "call_expression" && callee_qualifies(node, source, local) {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_qualifying_call(child, source, local) {
            return Some(found);
        }
    }
    None
}

fn callee_qualifies(call: Node<'_>, source: &str, local: &str) -> bool {
    let Some(function) = call.child_by_field_name("function") else {
        return false;
    };
    if function.kind() != "scoped_identifier" {
        return false;
    }
    let (Some(path), Some(name)) = (
        function.child_by_field_name("path"),
        function.child_by_field_name("name"),
    ) else {
        return false;
    };
    path.kind() == "identifier"
        && &source[path.byte_range()] == local
        && CONSTRUCTORS.contains(&&source[name.byte_range()])
}

/// The call's argument expressions, with comments filtered out (comments
/// are named extras in the grammar and would otherwise count as arguments).
fn call_arguments(call: Node<'_>) -> Vec<Node<'_>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "line_comment" && n.kind() != "block_comment")
        .collect()
}

/// Resolves the sole call argument to the string literal holding the
/// version, over the closed expression-kind set
/// {string literal, identifier, other}.
fn resolve_argument(root: Node<'_>, source: &str, arg: Node<'_>) -> Result<Located, BumpError> {
    match arg.kind() {
        "string_literal" => Ok(Located::Direct(arg.byte_range())),
        "identifier" => {
            let name = source[arg.byte_range()].to_string();
            trace!(%name, "resolving version argument through its declaration");
            let initializer = binding_initializer(root, source, &name)?;
            match initializer.kind() {
                "string_literal" => Ok(Located::Aliased {
                    name,
                    literal: initializer.byte_range(),
                }),
                // One level of resolution only; a name bound to another
                // name is out of scope.
                "identifier" => Err(BumpError::UnsupportedExpression(format!(
                    "`{name}` is bound to another name, aliases resolve one level only"
                ))),
                kind => Err(BumpError::UnsupportedExpression(format!(
                    "`{name}` is bound to a {kind}, expected a string literal"
                ))),
            }
        }
        kind => Err(BumpError::UnsupportedExpression(format!(
            "argument is a {kind}, expected a string literal or a plain name"
        ))),
    }
}

/// Finds the single `const`/`static`/`let` initializer bound to `name`.
fn binding_initializer<'t>(
    root: Node<'t>,
    source: &str,
    name: &str,
) -> Result<Node<'t>, BumpError> {
    let mut bindings = Vec::new();
    collect_bindings(root, source, name, &mut bindings);
    match bindings.as_slice() {
        [] => Err(BumpError::UnsupportedExpression(format!(
            "`{name}` is not bound by a const, static, or let in this file"
        ))),
        [initializer] => Ok(*initializer),
        _ => Err(BumpError::MultipleInitializers(name.to_string())),
    }
}

fn collect_bindings<'t>(node: Node<'t>, source: &str, name: &str, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "const_item" | "static_item" => {
            if let (Some(ident), Some(value)) = (
                node.child_by_field_name("name"),
                node.child_by_field_name("value"),
            ) && &source[ident.byte_range()] == name
            {
                out.push(value);
            }
        }
        "let_declaration" => {
            if let (Some(pattern), Some(value)) = (
                node.child_by_field_name("pattern"),
                node.child_by_field_name("value"),
            ) && pattern.kind() == "identifier"
                && &source[pattern.byte_range()] == name
            {
                out.push(value);
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_bindings(child, source, name, out);
    }
}

/// Strips the quotes from a plain double-quoted literal and undoes the
/// two escapes a version string could legally carry.
fn unquote(raw: &str) -> Result<String, BumpError> {
    let inner = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(|| {
            BumpError::UnsupportedExpression(format!(
                "expected a plain double-quoted literal, found {raw}"
            ))
        })?;
    Ok(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn locate_in(source: &str) -> Result<Located, BumpError> {
        let tree = parse_source(source).expect("fixture must parse");
        locate(tree.root_node(), source)
    }

    #[test]
    fn test_import_plain() {
        let source = indoc! {r#"
            use sembump::version;

            fn v() {
                version::must_parse("0.1.2");
            }
        "#};
        assert!(matches!(locate_in(source), Ok(Located::Direct(_))));
    }

    #[test]
    fn test_import_renamed() {
        let source = indoc! {r#"
            use sembump::version as ver;

            fn v() {
                ver::parse("0.1.2");
            }
        "#};
        assert!(matches!(locate_in(source), Ok(Located::Direct(_))));
    }

    #[test]
    fn test_unrelated_import_does_not_match() {
        let source = indoc! {r#"
            use std::fmt;

            fn v() {
                version::must_parse("0.1.2");
            }
        "#};
        assert_eq!(
            locate_in(source).unwrap_err(),
            BumpError::ImportNotFound(VERSION_IMPORT)
        );
    }

    #[test]
    fn test_original_name_ignored_when_renamed() {
        // The import binds `ver`, so a call through `version` is not ours.
        let source = indoc! {r#"
            use sembump::version as ver;

            fn v() {
                version::must_parse("0.1.2");
            }
        "#};
        assert!(matches!(
            locate_in(source),
            Err(BumpError::NoQualifyingCall { .. })
        ));
    }

    #[test]
    fn test_first_call_wins() {
        let source = indoc! {r#"
            use sembump::version;

            fn first() {
                version::parse("1.0.0");
            }

            fn second() {
                version::parse("2.0.0");
            }
        "#};
        let located = locate_in(source).unwrap();
        let range = located.literal_range();
        assert_eq!(&source[range], r#""1.0.0""#);
    }

    #[test]
    fn test_aliased_argument_points_at_initializer() {
        let source = indoc! {r#"
            use sembump::version;

            const V: &str = "0.1.2";

            fn v() {
                version::parse(V);
            }
        "#};
        match locate_in(source).unwrap() {
            Located::Aliased { name, literal } => {
                assert_eq!(name, "V");
                assert_eq!(&source[literal], r#""0.1.2""#);
            }
            other => panic!("expected Aliased, got {other:?}"),
        }
    }

    #[test]
    fn test_unbound_name_is_unsupported() {
        let source = indoc! {r#"
            use sembump::version;

            fn v() {
                version::parse(MISSING);
            }
        "#};
        assert!(matches!(
            locate_in(source),
            Err(BumpError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_rebound_name_is_rejected() {
        let source = indoc! {r#"
            use sembump::version;

            fn a() {
                let v = "0.1.2";
                version::parse(v);
            }

            fn b() {
                let v = "9.9.9";
            }
        "#};
        assert_eq!(
            locate_in(source).unwrap_err(),
            BumpError::MultipleInitializers("v".to_string())
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""0.1.2""#).unwrap(), "0.1.2");
        assert_eq!(unquote(r#""a\"b""#).unwrap(), "a\"b");
        assert!(matches!(
            unquote(r#"r"0.1.2""#),
            Err(BumpError::UnsupportedExpression(_))
        ));
    }
}
