// ==============================================================================
// Namespace Resolution: Merging Documents into Per-Target Views
// ==============================================================================
//
// Every document names a namespace for zero or more targets and always has one
// for `default`. Resolution builds, for every target in use, the set of
// namespaces and the definitions each one exposes. A document without an
// explicit namespace for a target contributes to its `default` namespace
// there. Two documents that land in the same (target, namespace) pair share
// one identifier scope, so a name clash between them is an error even though
// each document is fine on its own.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::model::{DEFAULT_TARGET, Document, Target};

/// Build every target from the parsed documents.
///
/// Targets are processed in sorted name order and documents in lexicographic
/// name order, so the first declaration of a clashing name is always the same
/// one regardless of the order documents were added in.
pub(crate) fn resolve(
    documents: &IndexMap<String, Document>,
) -> Result<IndexMap<String, Target>, ModelError> {
    let target_names: BTreeSet<&str> = documents
        .values()
        .flat_map(|doc| doc.namespace_for_target.keys().map(String::as_str))
        .chain(std::iter::once(DEFAULT_TARGET))
        .collect();

    let mut sorted_documents: Vec<&Document> = documents.values().collect();
    sorted_documents.sort_by(|a, b| a.name.cmp(&b.name));

    let mut targets = IndexMap::with_capacity(target_names.len());
    for target_name in target_names {
        let mut target = Target::new(target_name);
        for document in &sorted_documents {
            let namespace_name = document.namespace_for(target_name).ok_or_else(|| {
                ModelError::internal(format!(
                    "document `{}` has no namespace for target `{target_name}` and no default",
                    document.name
                ))
            })?;
            let namespace = target.namespace_mut(namespace_name);
            for definition in &document.definitions {
                namespace
                    .register(&document.name, definition)
                    .map_err(|e| e.with_source(&document.lines))?;
            }
        }
        tracing::debug!(
            target_name,
            namespaces = target.namespaces.len(),
            "target resolved"
        );
        targets.insert(target_name.to_string(), target);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Scope, Warning};
    use crate::model::{DefinitionKind, DocLine};

    fn parsed(name: &str, src: &str) -> Document {
        let mut warnings: Vec<Warning> = Vec::new();
        crate::reader::read_document(&Document::new(name, src), &mut warnings)
            .expect("document parses")
    }

    fn documents(docs: &[(&str, &str)]) -> IndexMap<String, Document> {
        docs.iter()
            .map(|(name, src)| (name.to_string(), parsed(name, src)))
            .collect()
    }

    #[test]
    fn default_target_always_exists() {
        let targets = resolve(&documents(&[("a.thrift", "const i32 A = 1")]))
            .expect("resolution succeeds");
        assert_eq!(targets.keys().collect::<Vec<_>>(), vec!["default"]);
        let ns = &targets["default"].namespaces["a"];
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.references_of(DefinitionKind::Const)[0].identifier, "A");
    }

    #[test]
    fn targets_are_sorted_and_fall_back_to_default_namespace() {
        let targets = resolve(&documents(&[
            ("b.thrift", "namespace py pkg.b\nnamespace go gob\ntypedef i32 B"),
            ("a.thrift", "typedef i32 A"),
        ]))
        .expect("resolution succeeds");
        assert_eq!(
            targets.keys().collect::<Vec<_>>(),
            vec!["default", "go", "py"]
        );

        let go = &targets["go"];
        assert_eq!(go.namespaces.keys().collect::<Vec<_>>(), vec!["a", "gob"]);
        let py = &targets["py"];
        assert_eq!(py.namespaces.keys().collect::<Vec<_>>(), vec!["a", "pkg.b"]);
        assert_eq!(py.namespaces["pkg.b"].target, "py");
    }

    #[test]
    fn shared_namespace_merges_all_kinds() {
        let targets = resolve(&documents(&[
            ("x.thrift", "namespace go shared\nstruct S {}\nservice Svc {}"),
            ("y.thrift", "namespace go shared\nenum E { A }\nexception X {}"),
        ]))
        .expect("resolution succeeds");
        let ns = &targets["go"].namespaces["shared"];
        assert_eq!(ns.len(), 4);
        assert_eq!(ns.references_of(DefinitionKind::Struct)[0].document, "x.thrift");
        assert_eq!(ns.references_of(DefinitionKind::Enum)[0].document, "y.thrift");
        assert_eq!(ns.references_of(DefinitionKind::Exception).len(), 1);
        assert_eq!(ns.references_of(DefinitionKind::Service).len(), 1);

        // The default target keeps the documents apart.
        assert_eq!(targets["default"].namespaces.len(), 2);
    }

    #[test]
    fn clash_in_shared_namespace_cites_lexicographically_first_document() {
        let err = resolve(&documents(&[
            ("z.thrift", "namespace go shared\n\ntypedef i32 Id"),
            ("m.thrift", "namespace go shared\ntypedef i64 Id"),
        ]))
        .expect_err("Id clashes in go/shared");
        assert_eq!(
            err.kind,
            ErrorKind::DuplicateIdentifier {
                scope: Scope::Namespace,
                earlier: DocLine::new("m.thrift", 1),
            }
        );
        assert_eq!(err.doc_line, Some(DocLine::new("z.thrift", 2)));
        assert!(err.message.contains("namespace `shared` of target `go`"));
    }

    #[test]
    fn same_name_in_different_namespaces_is_fine() {
        let targets = resolve(&documents(&[
            ("a.thrift", "namespace go one\ntypedef i32 Id"),
            ("b.thrift", "namespace go two\ntypedef i32 Id"),
        ]))
        .expect("no clash");
        assert_eq!(targets["go"].namespaces.len(), 2);
    }

    #[test]
    fn no_documents_yields_empty_default_target() {
        let targets = resolve(&IndexMap::new()).expect("resolution succeeds");
        assert!(targets["default"].namespaces.is_empty());
    }
}
