// ==============================================================================
// Diagnostics: Model-Build Errors, Warnings, and Generator Faults
// ==============================================================================
//
// Model building is fail-fast: the first structural or uniqueness violation is
// returned as a `ModelError` carrying the offending `DocLine`. Non-fatal
// problems (ignored includes, malformed namespace headers) are collected as
// `Warning`s. Faults of the external generator process form a separate family,
// `GeneratorError`, so callers can tell "your IDL is wrong" apart from "the
// generator broke".

use std::fmt;
use std::io;
use std::process::ExitStatus;

use miette::{LabeledSpan, NamedSource, Severity, SourceSpan};

use crate::model::{DefinitionKind, DocLine};

/// The grammar construct an `InvalidDefinitionShape` or `DuplicateMember`
/// error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Definition(DefinitionKind),
    EnumValue,
    SenumValue,
    Field,
    Function,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Definition(kind) => write!(f, "{kind} definition"),
            Construct::EnumValue => f.write_str("enum value"),
            Construct::SenumValue => f.write_str("senum value"),
            Construct::Field => f.write_str("field"),
            Construct::Function => f.write_str("function"),
        }
    }
}

impl From<DefinitionKind> for Construct {
    fn from(kind: DefinitionKind) -> Self {
        Construct::Definition(kind)
    }
}

/// Which uniqueness scope a duplicate identifier violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Two declarations with the same name in one document.
    Document,
    /// Two documents contributing the same name to one (target, namespace).
    Namespace,
}

/// Classification of a model-build failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedKeyword,
    /// The model was already parsed; documents can no longer be added and
    /// parsing cannot be repeated.
    AlreadyParsed,
    NoDefinitionsFound,
    InvalidDefinitionShape(Construct),
    InvalidIdentifier,
    DuplicateIdentifier { scope: Scope, earlier: DocLine },
    /// A member inside one block (enum value, field id or name, function,
    /// parameter) is declared twice.
    DuplicateMember { construct: Construct, earlier: DocLine },
    DuplicateDocument,
    /// An invariant that should already have been enforced was violated.
    /// Always a defect in this crate, never caused by input.
    UnexpectedInternalError,
}

/// A fatal model-build error with the location that caused it.
///
/// When the offending document's text is attached (see
/// [`ModelError::with_source`]), rendering the error through `miette` shows
/// the offending line with a label.
#[derive(Debug)]
pub struct ModelError {
    pub kind: ErrorKind,
    pub doc_line: Option<DocLine>,
    pub message: String,
    pub help: Option<String>,
    src: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl ModelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ModelError {
            kind,
            doc_line: None,
            message: message.into(),
            help: None,
            src: None,
            span: None,
        }
    }

    #[must_use]
    pub fn at(mut self, doc_line: DocLine) -> Self {
        self.doc_line = Some(doc_line);
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach the text of the document the error points into. The label span
    /// covers the (trimmed) line named by `doc_line`.
    #[must_use]
    pub fn with_source(mut self, lines: &[String]) -> Self {
        if let Some(doc_line) = &self.doc_line {
            let (src, span) = line_source(doc_line, lines);
            self.src = Some(src);
            self.span = span;
        }
        self
    }

    /// Shorthand for an `UnexpectedInternalError`.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ModelError::new(ErrorKind::UnexpectedInternalError, message)
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.doc_line {
            Some(doc_line) => write!(f, "{doc_line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ModelError {}

impl miette::Diagnostic for ModelError {
    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h.as_str()) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = match &self.kind {
            ErrorKind::DuplicateIdentifier { earlier, .. }
            | ErrorKind::DuplicateMember { earlier, .. } => {
                format!("previously declared at {earlier}")
            }
            _ => "here".to_string(),
        };
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(label),
            span,
        ))))
    }
}

/// The document text plus a span over the trimmed line `doc_line` names.
///
/// The span never reaches past the end of the text; a blank line gets an
/// empty span at its start.
fn line_source(doc_line: &DocLine, lines: &[String]) -> (NamedSource<String>, Option<SourceSpan>) {
    let text = lines.join("\n");
    let span = lines.get(doc_line.line).map(|raw| {
        let line_start: usize = lines[..doc_line.line].iter().map(|l| l.len() + 1).sum();
        let indent = raw.len() - raw.trim_start().len();
        let start = (line_start + indent).min(text.len());
        let len = raw.trim().len().min(text.len() - start);
        SourceSpan::from((start, len))
    });
    (NamedSource::new(doc_line.document.clone(), text), span)
}

/// A non-fatal diagnostic produced while reading a document.
///
/// Two warnings are equal when they say the same thing about the same line,
/// whether or not the document text is attached.
#[derive(Debug, Clone)]
pub struct Warning {
    pub doc_line: DocLine,
    pub message: String,
    src: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl Warning {
    pub fn new(doc_line: DocLine, message: impl Into<String>) -> Self {
        Warning {
            doc_line,
            message: message.into(),
            src: None,
            span: None,
        }
    }

    /// Attach the text of the document, labelling the warned-about line.
    #[must_use]
    pub fn with_source(mut self, lines: &[String]) -> Self {
        let (src, span) = line_source(&self.doc_line, lines);
        self.src = Some(src);
        self.span = span;
        self
    }
}

impl PartialEq for Warning {
    fn eq(&self, other: &Self) -> bool {
        self.doc_line == other.doc_line && self.message == other.message
    }
}

impl Eq for Warning {}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.doc_line, self.message)
    }
}

impl std::error::Error for Warning {}

impl miette::Diagnostic for Warning {
    fn severity(&self) -> Option<Severity> {
        Some(Severity::Warning)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("ignored".to_string()),
            span,
        ))))
    }
}

/// Failure while handing the encoded model to the generator process.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to start generator `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("generator process has no piped stdin")]
    MissingStdin,

    #[error("failed to write the model to the generator")]
    Write(#[source] io::Error),

    #[error("failed to wait for the generator")]
    Wait(#[source] io::Error),

    #[error("the generator input writer panicked")]
    WriterPanicked,

    #[error("generator exited unsuccessfully ({status})")]
    Failed { status: ExitStatus },
}

impl miette::Diagnostic for GeneratorError {}
