//! # Path Files
//!
//! A path file describes search-path entries as an attribute set, in a small
//! subset of the Nix language:
//!
//! ```nix
//! # channels.nix
//! {
//!   nixpkgs = "https://github.com/NixOS/nixpkgs;rev=nixos-24.05";
//!   home-manager = "https://github.com/nix-community/home-manager";
//!   overlays = ./overlays;
//!   local = import ./local.nix;
//! }
//! ```
//!
//! Values are strings (parsed as targets), path literals, nested attribute
//! sets (flattened into dotted keys such as `local.foo`), or `import <path>`,
//! which evaluates another path file and yields its attribute set. Relative
//! paths, in literals and in strings, are resolved against the directory of
//! the file they are written in, at every level of an import chain.
//!
//! Evaluation is eager. `import` is a plain recursive call with no cycle
//! detection: a file that imports itself, directly or not, recurses until
//! the stack is exhausted.

mod lexer;
mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::entry::NixPathEntry;
use crate::error::{Error, Result};
use crate::target::{self, PathTarget};
use parser::{Binding, Expr};

/// File imported when `import` is given a directory.
pub const DEFAULT_FILE: &str = "default.nix";

/// An evaluated value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    /// A string together with the directory its relative targets refer to.
    Str { text: String, origin: PathBuf },
    /// An absolute, normalized path.
    Path(PathBuf),
    Attrs(Vec<(String, Value)>),
    /// A literal that is not a target, with the file it was written in.
    Other { kind: &'static str, file: PathBuf },
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Value::Str { .. } => "a string",
            Value::Path(_) => "a path",
            Value::Attrs(_) => "an attribute set",
            Value::Other { kind, .. } => kind,
        }
    }
}

/// Evaluate a path file into its ordered `(key, target)` mapping.
pub fn evaluate(file: &Path) -> Result<Vec<(String, PathTarget)>> {
    let file = std::path::absolute(file)?;
    let attrs = eval_file(&file)?;
    let mut mapping = Vec::new();
    flatten("", attrs, &mut mapping)?;
    Ok(mapping)
}

/// Evaluate `source` as if it had been read from `file`.
pub fn evaluate_source(source: &str, file: &Path) -> Result<Vec<(String, PathTarget)>> {
    let file = std::path::absolute(file)?;
    let attrs = eval_source(source, &file)?;
    let mut mapping = Vec::new();
    flatten("", attrs, &mut mapping)?;
    Ok(mapping)
}

/// Evaluate a path file straight into keyed search-path entries.
pub fn load_entries(file: &Path) -> Result<Vec<NixPathEntry>> {
    Ok(evaluate(file)?
        .into_iter()
        .map(|(key, target)| NixPathEntry::Keyed(key, target))
        .collect())
}

fn eval_file(file: &Path) -> Result<Vec<(String, Value)>> {
    debug!("evaluating path file {}", file.display());
    let source = fs::read_to_string(file).map_err(|source| Error::PathFileRead {
        path: file.to_path_buf(),
        source,
    })?;
    eval_source(&source, file)
}

/// Parse and evaluate one file, requiring an attribute set at the top.
fn eval_source(source: &str, file: &Path) -> Result<Vec<(String, Value)>> {
    let tokens = lexer::tokenize(source, file)?;
    let expr = parser::parse(tokens, file)?;
    let base = file.parent().unwrap_or_else(|| Path::new("/"));

    match eval(&expr, file, base)? {
        Value::Attrs(attrs) => Ok(attrs),
        other => Err(Error::InvalidPathFile {
            file: file.to_path_buf(),
            found: other.describe().to_string(),
        }),
    }
}

fn eval(expr: &Expr, file: &Path, base: &Path) -> Result<Value> {
    match expr {
        Expr::Attrs(bindings) => eval_attrs(bindings, file, base),
        Expr::Str(text) => Ok(Value::Str {
            text: text.clone(),
            origin: base.to_path_buf(),
        }),
        Expr::Path(path) => Ok(Value::Path(crate::path::resolve_against(
            base,
            Path::new(path),
        ))),
        Expr::Import(argument) => match eval(argument, file, base)? {
            Value::Path(path) => {
                let target = if path.is_dir() {
                    path.join(DEFAULT_FILE)
                } else {
                    path
                };
                Ok(Value::Attrs(eval_file(&target)?))
            }
            other => Err(Error::InvalidImportArgument {
                file: file.to_path_buf(),
                found: other.describe().to_string(),
            }),
        },
        Expr::Int(_) => Ok(other("an integer", file)),
        Expr::Bool(_) => Ok(other("a boolean", file)),
        Expr::Null => Ok(other("null", file)),
        Expr::List(_) => Ok(other("a list", file)),
    }
}

fn other(kind: &'static str, file: &Path) -> Value {
    Value::Other {
        kind,
        file: file.to_path_buf(),
    }
}

fn eval_attrs(bindings: &[Binding], file: &Path, base: &Path) -> Result<Value> {
    let mut attrs = Vec::new();
    for binding in bindings {
        let value = eval(&binding.value, file, base)?;
        insert(&mut attrs, &binding.attrpath, value, file, "")?;
    }
    Ok(Value::Attrs(attrs))
}

fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Insert `value` at `attrpath`, creating intermediate sets and merging into
/// existing ones.
fn insert(
    attrs: &mut Vec<(String, Value)>,
    attrpath: &[String],
    value: Value,
    file: &Path,
    prefix: &str,
) -> Result<()> {
    let Some((name, rest)) = attrpath.split_first() else {
        return Ok(());
    };
    let key = join_key(prefix, name);
    let duplicate = || Error::DuplicateAttribute {
        file: file.to_path_buf(),
        key: key.clone(),
    };

    let Some(position) = attrs.iter().position(|(existing, _)| existing == name) else {
        let value = if rest.is_empty() {
            value
        } else {
            let mut nested = Vec::new();
            insert(&mut nested, rest, value, file, &key)?;
            Value::Attrs(nested)
        };
        attrs.push((name.clone(), value));
        return Ok(());
    };

    match (&mut attrs[position].1, value) {
        (Value::Attrs(nested), value) if !rest.is_empty() => insert(nested, rest, value, file, &key),
        (Value::Attrs(nested), Value::Attrs(incoming)) => {
            for (child, child_value) in incoming {
                insert(nested, std::slice::from_ref(&child), child_value, file, &key)?;
            }
            Ok(())
        }
        _ => Err(duplicate()),
    }
}

/// Turn nested attribute sets into dotted keys, in source order.
fn flatten(
    prefix: &str,
    attrs: Vec<(String, Value)>,
    out: &mut Vec<(String, PathTarget)>,
) -> Result<()> {
    for (name, value) in attrs {
        let key = join_key(prefix, &name);
        match value {
            Value::Attrs(nested) => flatten(&key, nested, out)?,
            Value::Str { text, origin } => {
                out.push((key, target::parse(&text)?.relative_to(&origin)));
            }
            Value::Path(path) => {
                out.push((key, target::parse(&path.to_string_lossy())?));
            }
            Value::Other { kind, file } => {
                return Err(Error::InvalidPathElement {
                    file,
                    key,
                    found: kind.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Revision;
    use std::fs;
    use tempfile::TempDir;

    fn local(path: impl Into<PathBuf>) -> PathTarget {
        PathTarget::Local(path.into())
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_evaluate_strings_and_paths_relative_to_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let file = write(
            dir,
            "paths.nix",
            r#"{ a = "./x"; b = "repo.git;rev=deadbeef"; c = ./sub/../y; d = "/abs"; }"#,
        );

        let mapping = evaluate(&file).unwrap();
        assert_eq!(
            mapping,
            vec![
                ("a".to_string(), local(dir.join("x"))),
                (
                    "b".to_string(),
                    PathTarget::repository("repo.git", Revision::Symbolic("deadbeef".to_string()))
                ),
                ("c".to_string(), local(dir.join("y"))),
                ("d".to_string(), local("/abs")),
            ]
        );
    }

    #[test]
    fn test_evaluate_flattens_nested_sets_in_order() {
        let temp = TempDir::new().unwrap();
        let file = write(
            temp.path(),
            "paths.nix",
            "{ z = /z; a = { c = /c; b = /b; }; a.d = /d; m = /m; }",
        );

        let keys: Vec<String> = evaluate(&file).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a.c", "a.b", "a.d", "m"]);
    }

    #[test]
    fn test_import_resolves_against_imported_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(
            dir,
            "deep/nested/inner.nix",
            r#"{ leaf = ./leaf; str = "../sibling"; }"#,
        );
        write(dir, "deep/middle.nix", "{ inner = import ./nested/inner.nix; }");
        let top = write(dir, "top.nix", "import ./deep/middle.nix");

        let mapping = evaluate(&top).unwrap();
        assert_eq!(
            mapping,
            vec![
                (
                    "inner.leaf".to_string(),
                    local(dir.join("deep/nested/leaf"))
                ),
                ("inner.str".to_string(), local(dir.join("deep/sibling"))),
            ]
        );
    }

    #[test]
    fn test_import_directory_uses_default_nix() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "channels/default.nix", "{ nixpkgs = ./nixpkgs; }");
        let top = write(dir, "top.nix", "{ ch = import ./channels; }");

        assert_eq!(
            evaluate(&top).unwrap(),
            vec![(
                "ch.nixpkgs".to_string(),
                local(dir.join("channels/nixpkgs"))
            )]
        );
    }

    #[test]
    fn test_imported_set_merges_with_attrpath() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        write(dir, "other.nix", "{ x = /x; }");
        let top = write(dir, "top.nix", "{ g = import ./other.nix; g.y = /y; }");

        let keys: Vec<String> = evaluate(&top).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["g.x", "g.y"]);
    }

    #[test]
    fn test_top_level_must_be_attrs() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", r#""just a string""#);

        let err = evaluate(&file).unwrap_err();
        assert!(matches!(err, Error::InvalidPathFile { .. }));
        assert!(err.to_string().contains("a string"));
    }

    #[test]
    fn test_imported_file_must_be_attrs() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bad.nix", "./not-a-set");
        let top = write(temp.path(), "top.nix", "{ a = import ./bad.nix; }");

        match evaluate(&top).unwrap_err() {
            Error::InvalidPathFile { file, found } => {
                assert!(file.ends_with("bad.nix"));
                assert_eq!(found, "a path");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_path_element_names_key() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", "{ a = /a; b.c = 42; }");

        match evaluate(&file).unwrap_err() {
            Error::InvalidPathElement { key, found, .. } => {
                assert_eq!(key, "b.c");
                assert_eq!(found, "an integer");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_path_element_names_imported_file() {
        let temp = TempDir::new().unwrap();
        let imported = write(temp.path(), "b.nix", "{ y = 3; }");
        let file = write(temp.path(), "paths.nix", "{ x = import ./b.nix; }");

        match evaluate(&file).unwrap_err() {
            Error::InvalidPathElement {
                file: reported,
                key,
                found,
            } => {
                assert_eq!(reported, imported);
                assert_eq!(key, "x.y");
                assert_eq!(found, "an integer");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_other_literals_are_invalid_elements() {
        let temp = TempDir::new().unwrap();
        for (source, found) in [
            ("{ a = true; }", "a boolean"),
            ("{ a = null; }", "null"),
            ("{ a = [ /x ]; }", "a list"),
        ] {
            let file = write(temp.path(), "paths.nix", source);
            let err = evaluate(&file).unwrap_err();
            assert!(err.to_string().contains(found), "{}: {}", source, err);
        }
    }

    #[test]
    fn test_import_requires_literal_path() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "other.nix", "{ }");
        let file = write(temp.path(), "paths.nix", r#"{ a = import "./other.nix"; }"#);

        match evaluate(&file).unwrap_err() {
            Error::InvalidImportArgument { found, .. } => assert_eq!(found, "a string"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_import_missing_file() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", "{ a = import ./missing.nix; }");

        match evaluate(&file).unwrap_err() {
            Error::PathFileRead { path, .. } => assert!(path.ends_with("missing.nix")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_attribute() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", "{ a.b = /x; a.b = /y; }");

        match evaluate(&file).unwrap_err() {
            Error::DuplicateAttribute { key, .. } => assert_eq!(key, "a.b"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_target_string_is_reported() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", r#"{ a = "repo.git;tag=v1"; }"#);

        let err = evaluate(&file).unwrap_err();
        assert!(matches!(err, Error::TargetParse { .. }));
    }

    #[test]
    fn test_path_literal_to_git_repository_is_a_repository_target() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", "{ r = ./checkouts/nixpkgs.git; }");

        let mapping = evaluate(&file).unwrap();
        assert_eq!(
            mapping[0].1,
            PathTarget::repository(
                temp.path()
                    .join("checkouts/nixpkgs.git")
                    .to_string_lossy()
                    .to_string(),
                Revision::Symbolic("HEAD".to_string())
            )
        );
    }

    #[test]
    fn test_load_entries_are_keyed() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "paths.nix", "{ y = ./three; }");

        assert_eq!(
            load_entries(&file).unwrap(),
            vec![NixPathEntry::keyed("y", local(temp.path().join("three")))]
        );
    }

    #[test]
    fn test_evaluate_source_uses_file_directory() {
        let mapping = evaluate_source("{ a = ./x; }", Path::new("/etc/nix/paths.nix")).unwrap();
        assert_eq!(mapping, vec![("a".to_string(), local("/etc/nix/x"))]);
    }
}
