// ==============================================================================
// The Interface Definition Model
// ==============================================================================
//
// The model owns every document and every target by name. Nothing holds a
// pointer back to its owner: operations that need "my model" or "my target"
// receive it explicitly. A namespace exposes definitions through `Reference`s
// (document name + identifier name) rather than copies, so one definition can
// be visible through many targets at once.

pub mod definition;
pub mod json;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use indexmap::IndexMap;
use miette::Context;

use crate::error::{ErrorKind, ModelError, Scope, Warning};

pub use definition::{
    Const, Definition, DefinitionKind, Enum, EnumValue, Field, Function, Requiredness, Senum,
    Service, Struct, Typedef,
};

/// Name of the target every document always has a namespace in.
pub const DEFAULT_TARGET: &str = "default";

/// A diagnostic coordinate: document name plus zero-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocLine {
    pub document: String,
    pub line: usize,
}

impl DocLine {
    pub fn new(document: impl Into<String>, line: usize) -> Self {
        DocLine {
            document: document.into(),
            line,
        }
    }
}

/// Displays as `document:line` with a one-based line number.
impl fmt::Display for DocLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document, self.line + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub doc_line: DocLine,
}

/// Where a definition lives: the document that declares it and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub document: String,
    pub identifier: String,
}

/// The default namespace name for a document: path separators become `.`
/// and the final extension is dropped (`dir/foo.thrift` -> `dir.foo`).
pub fn default_namespace_name(document: &str) -> String {
    let stem_end = match document.rfind('.') {
        Some(dot) if !document[dot..].contains(['/', '\\']) && dot > 0 => dot,
        _ => document.len(),
    };
    document[..stem_end].replace(['/', '\\'], ".")
}

// ==============================================================================
// Document
// ==============================================================================

/// One IDL source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub lines: Vec<String>,
    /// Namespace name per target. Always has an entry for [`DEFAULT_TARGET`].
    pub namespace_for_target: IndexMap<String, String>,
    /// Definitions in declaration order.
    pub definitions: Vec<Definition>,
    /// Identifier name -> index into `definitions`.
    identifiers: IndexMap<String, usize>,
}

impl Document {
    /// Create an unparsed document from its source text.
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        let name = name.into();
        let mut namespace_for_target = IndexMap::new();
        namespace_for_target.insert(DEFAULT_TARGET.to_string(), default_namespace_name(&name));
        Document {
            lines: source.lines().map(str::to_string).collect(),
            name,
            namespace_for_target,
            definitions: Vec::new(),
            identifiers: IndexMap::new(),
        }
    }

    /// Assemble an already-parsed document, rebuilding its identifier
    /// registry. Fails if two definitions share a name.
    pub fn from_parts(
        name: impl Into<String>,
        lines: Vec<String>,
        namespace_for_target: IndexMap<String, String>,
        definitions: Vec<Definition>,
    ) -> Result<Self, ModelError> {
        let mut doc = Document {
            name: name.into(),
            lines,
            namespace_for_target,
            definitions: Vec::with_capacity(definitions.len()),
            identifiers: IndexMap::with_capacity(definitions.len()),
        };
        for definition in definitions {
            doc.push_definition(definition)?;
        }
        Ok(doc)
    }

    /// Append a definition, enforcing document-scoped identifier uniqueness.
    pub(crate) fn push_definition(&mut self, definition: Definition) -> Result<(), ModelError> {
        if let Some(earlier) = self.lookup(definition.name()) {
            return Err(duplicate_in_document(
                definition.identifier(),
                earlier.doc_line(),
            )
            .with_source(&self.lines));
        }
        self.identifiers
            .insert(definition.name().to_string(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    /// Look up a definition by identifier name.
    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.identifiers
            .get(name)
            .and_then(|&idx| self.definitions.get(idx))
    }

    /// Identifier names in declaration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(Definition::name)
    }

    /// The namespace this document contributes to in `target`, falling back
    /// to its default-target namespace.
    pub fn namespace_for(&self, target: &str) -> Option<&str> {
        self.namespace_for_target
            .get(target)
            .or_else(|| self.namespace_for_target.get(DEFAULT_TARGET))
            .map(String::as_str)
    }
}

pub(crate) fn duplicate_in_document(identifier: &Identifier, earlier: &DocLine) -> ModelError {
    ModelError::new(
        ErrorKind::DuplicateIdentifier {
            scope: Scope::Document,
            earlier: earlier.clone(),
        },
        format!(
            "identifier `{}` has been declared before in this document (previous declaration at {earlier})",
            identifier.name
        ),
    )
    .at(identifier.doc_line.clone())
}

// ==============================================================================
// Targets and Namespaces
// ==============================================================================

/// A named output view (e.g. `go`, `html`, `default`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub namespaces: IndexMap<String, Namespace>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            namespaces: IndexMap::new(),
        }
    }

    /// Get or create the namespace `name` in this target.
    pub fn namespace_mut(&mut self, name: &str) -> &mut Namespace {
        let target = &self.name;
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(target.clone(), name))
    }
}

/// A uniqueness scope for identifiers within one (target, name) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub target: String,
    pub name: String,
    /// References grouped per definition kind, each list in merge order.
    pub references: BTreeMap<DefinitionKind, Vec<Reference>>,
    identifiers: IndexMap<String, DocLine>,
}

impl Namespace {
    pub fn new(target: impl Into<String>, name: impl Into<String>) -> Self {
        Namespace {
            target: target.into(),
            name: name.into(),
            references: BTreeMap::new(),
            identifiers: IndexMap::new(),
        }
    }

    /// Human readable name including the target.
    pub fn full_name(&self) -> String {
        format!("[target: {}, namespace: {}]", self.target, self.name)
    }

    /// Where `name` was first declared in this namespace, if anywhere.
    pub fn declared_at(&self, name: &str) -> Option<&DocLine> {
        self.identifiers.get(name)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// References of one kind, in merge order.
    pub fn references_of(&self, kind: DefinitionKind) -> &[Reference] {
        self.references
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Register `definition` (declared in `document`) in this namespace.
    pub(crate) fn register(
        &mut self,
        document: &str,
        definition: &Definition,
    ) -> Result<(), ModelError> {
        let identifier = definition.identifier();
        if let Some(earlier) = self.identifiers.get(&identifier.name) {
            return Err(ModelError::new(
                ErrorKind::DuplicateIdentifier {
                    scope: Scope::Namespace,
                    earlier: earlier.clone(),
                },
                format!(
                    "identifier `{}` is already declared in namespace `{}` of target `{}` (previous declaration at {earlier})",
                    identifier.name, self.name, self.target
                ),
            )
            .at(identifier.doc_line.clone()));
        }
        self.identifiers
            .insert(identifier.name.clone(), identifier.doc_line.clone());
        self.references
            .entry(definition.kind())
            .or_default()
            .push(Reference {
                document: document.to_string(),
                identifier: identifier.name.clone(),
            });
        Ok(())
    }
}

// ==============================================================================
// Model
// ==============================================================================

/// The root of the interface definition model.
///
/// Documents are added while the model is unparsed; [`Model::parse`] then
/// reads every document and resolves all targets exactly once.
#[derive(Debug, Clone, Default)]
pub struct Model {
    documents: IndexMap<String, Document>,
    targets: IndexMap<String, Target>,
    parsed: bool,
    warnings: Vec<Warning>,
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
            && self.documents == other.documents
            && self.targets == other.targets
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble an already-parsed model from its parts.
    pub(crate) fn from_parts(
        documents: IndexMap<String, Document>,
        targets: IndexMap<String, Target>,
        parsed: bool,
    ) -> Self {
        Model {
            documents,
            targets,
            parsed,
            warnings: Vec::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Add a document from its source text.
    pub fn add_document(&mut self, name: impl Into<String>, source: &str) -> Result<(), ModelError> {
        let name = name.into();
        if self.parsed {
            return Err(ModelError::new(
                ErrorKind::AlreadyParsed,
                format!("cannot add document `{name}`: the model has already been parsed"),
            ));
        }
        if self.documents.contains_key(&name) {
            return Err(ModelError::new(
                ErrorKind::DuplicateDocument,
                format!("a document named `{name}` already exists in this model"),
            ));
        }
        let document = Document::new(name.clone(), source);
        self.documents.insert(name, document);
        Ok(())
    }

    /// Add a document by reading all of `reader`.
    pub fn add_document_from_reader(
        &mut self,
        name: impl Into<String>,
        mut reader: impl Read,
    ) -> miette::Result<()> {
        let name = name.into();
        let mut source = String::new();
        reader
            .read_to_string(&mut source)
            .map_err(|e| miette::miette!("{e}"))
            .with_context(|| format!("read document `{name}`"))?;
        self.add_document(name, &source)?;
        Ok(())
    }

    /// Parse every document, then resolve all targets and namespaces.
    ///
    /// Fail-fast: the first error anywhere aborts the build. Documents are
    /// visited in lexicographic name order so error reporting is
    /// reproducible. On failure the model is left unparsed and unchanged
    /// apart from accumulated warnings.
    pub fn parse(&mut self) -> Result<(), ModelError> {
        if self.parsed {
            return Err(ModelError::new(
                ErrorKind::AlreadyParsed,
                "the model has already been parsed",
            ));
        }

        let mut names: Vec<String> = self.documents.keys().cloned().collect();
        names.sort();

        let mut parsed_documents = Vec::with_capacity(names.len());
        for name in &names {
            let document = self
                .documents
                .get(name)
                .ok_or_else(|| ModelError::internal(format!("document `{name}` vanished")))?;
            tracing::debug!(document = %name, "parsing document");
            parsed_documents.push(crate::reader::read_document(document, &mut self.warnings)?);
        }
        for parsed in parsed_documents {
            let name = parsed.name.clone();
            let document = self
                .documents
                .get_mut(&name)
                .ok_or_else(|| ModelError::internal(format!("document `{name}` vanished")))?;
            *document = parsed;
        }

        self.targets = crate::resolve::resolve(&self.documents)?;
        self.parsed = true;
        tracing::debug!(
            documents = self.documents.len(),
            targets = self.targets.len(),
            "model parsed"
        );
        Ok(())
    }

    /// Take the warnings collected by the most recent [`parse`](Self::parse)
    /// call, whether it succeeded or not.
    pub fn drain_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Follow a namespace reference to the definition it points at.
    pub fn resolve_reference(&self, reference: &Reference) -> Option<&Definition> {
        self.documents
            .get(&reference.document)?
            .lookup(&reference.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn const_def(name: &str, doc: &str, line: usize) -> Definition {
        Definition::Const(Const {
            identifier: Identifier {
                name: name.to_string(),
                doc_line: DocLine::new(doc, line),
            },
            field_type: "i32".to_string(),
            value: "1".to_string(),
        })
    }

    #[test]
    fn default_namespace_strips_extension_and_rewrites_separators() {
        assert_eq!(default_namespace_name("foo.thrift"), "foo");
        assert_eq!(default_namespace_name("shared/base.thrift"), "shared.base");
        assert_eq!(default_namespace_name("win\\path\\x.thrift"), "win.path.x");
        assert_eq!(default_namespace_name("noext"), "noext");
        assert_eq!(default_namespace_name("dir.v2/noext"), "dir.v2.noext");
    }

    #[test]
    fn new_document_has_default_namespace() {
        let doc = Document::new("foo.thrift", "const i32 A = 1\n");
        assert_eq!(doc.namespace_for(DEFAULT_TARGET), Some("foo"));
        assert_eq!(doc.namespace_for("go"), Some("foo"));
        assert_eq!(doc.lines, vec!["const i32 A = 1"]);
    }

    #[test]
    fn document_registry_rejects_duplicates() {
        let mut doc = Document::new("a.thrift", "");
        doc.push_definition(const_def("A", "a.thrift", 0))
            .expect("first declaration is accepted");
        let err = doc
            .push_definition(const_def("A", "a.thrift", 3))
            .expect_err("second declaration is rejected");
        assert_eq!(
            err.kind,
            ErrorKind::DuplicateIdentifier {
                scope: Scope::Document,
                earlier: DocLine::new("a.thrift", 0),
            }
        );
        assert_eq!(err.doc_line, Some(DocLine::new("a.thrift", 3)));
    }

    #[test]
    fn namespace_register_groups_by_kind_and_rejects_duplicates() {
        let mut ns = Namespace::new("default", "shared");
        ns.register("a.thrift", &const_def("A", "a.thrift", 0))
            .expect("A registers");
        ns.register("b.thrift", &const_def("B", "b.thrift", 0))
            .expect("B registers");
        assert_eq!(ns.len(), 2);
        assert_eq!(
            ns.references_of(DefinitionKind::Const)
                .iter()
                .map(|r| r.identifier.as_str())
                .collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert!(ns.references_of(DefinitionKind::Struct).is_empty());

        let err = ns
            .register("c.thrift", &const_def("A", "c.thrift", 4))
            .expect_err("A is taken");
        assert!(matches!(
            err.kind,
            ErrorKind::DuplicateIdentifier {
                scope: Scope::Namespace,
                ..
            }
        ));
        assert_eq!(ns.declared_at("A"), Some(&DocLine::new("a.thrift", 0)));
    }

    #[test]
    fn add_document_rejects_duplicate_names() {
        let mut model = Model::new();
        model
            .add_document("a.thrift", "const i32 A = 1")
            .expect("first add succeeds");
        let err = model
            .add_document("a.thrift", "const i32 B = 1")
            .expect_err("same name twice");
        assert_eq!(err.kind, ErrorKind::DuplicateDocument);
    }

    #[test]
    fn model_parses_once() {
        let mut model = Model::new();
        model
            .add_document("a.thrift", "const i32 A = 1")
            .expect("add succeeds");
        model.parse().expect("parse succeeds");
        assert!(model.is_parsed());

        let err = model.parse().expect_err("second parse fails");
        assert_eq!(err.kind, ErrorKind::AlreadyParsed);
        let err = model
            .add_document("b.thrift", "const i32 B = 1")
            .expect_err("add after parse fails");
        assert_eq!(err.kind, ErrorKind::AlreadyParsed);
    }

    #[test]
    fn failed_parse_leaves_model_unparsed() {
        let mut model = Model::new();
        model
            .add_document("a.thrift", "const i32 A = 1\nbogus")
            .expect("add succeeds");
        let err = model.parse().expect_err("bogus keyword");
        assert_eq!(err.kind, ErrorKind::UnexpectedKeyword);
        assert!(!model.is_parsed());
        assert!(model
            .document("a.thrift")
            .is_some_and(|d| d.definitions.is_empty()));
    }

    #[test]
    fn add_document_from_reader_reads_everything() {
        let mut model = Model::new();
        model
            .add_document_from_reader("r.thrift", "typedef i64 Id\n".as_bytes())
            .expect("reading from a byte slice succeeds");
        model.parse().expect("parse succeeds");
        let doc = model.document("r.thrift").expect("document exists");
        assert_eq!(doc.identifiers().collect::<Vec<_>>(), vec!["Id"]);
    }

    #[test]
    fn resolve_reference_finds_definition() {
        let mut model = Model::new();
        model
            .add_document("a.thrift", "const i32 A = 1")
            .expect("add succeeds");
        model.parse().expect("parse succeeds");
        let reference = Reference {
            document: "a.thrift".to_string(),
            identifier: "A".to_string(),
        };
        let def = model
            .resolve_reference(&reference)
            .expect("reference resolves");
        assert_eq!(def.kind(), DefinitionKind::Const);
    }
}
