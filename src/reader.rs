// ==============================================================================
// Definition Reader: Line-Driven Grammar for the Seven Definition Kinds
// ==============================================================================
//
// After the header phase, every logical line either starts a definition or is
// an error. The first token selects the definition kind. `const` and
// `typedef` are single-line; the block kinds (`enum`, `senum`, `struct`,
// `exception`, `service`) collect the tokens between their outermost braces,
// however many lines that takes, and then parse the members from that token
// stream. Line breaks inside a block carry no meaning beyond separating items.
//
// Reading is fail-fast: the first violation aborts the document with a
// `ModelError` that points at the offending line.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Construct, ErrorKind, ModelError, Warning};
use crate::header::{self, HEADER_KEYWORDS};
use crate::model::{
    Const, Definition, DefinitionKind, DocLine, Document, Enum, EnumValue, Field, Function,
    Identifier, Requiredness, Senum, Service, Struct, Typedef, duplicate_in_document,
};
use crate::scanner::{Scanner, Token, TokenKind, tokenize};
use crate::suggest::suggest_keyword;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-.]*$").expect("valid regex"));

/// Whether `name` is acceptable as a definition or member name.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Read an unparsed document into a parsed copy: header directives first,
/// then definitions. Non-fatal header problems are appended to `warnings`.
pub(crate) fn read_document(
    source: &Document,
    warnings: &mut Vec<Warning>,
) -> Result<Document, ModelError> {
    let parsed = Document::from_parts(
        source.name.clone(),
        source.lines.clone(),
        source.namespace_for_target.clone(),
        Vec::new(),
    )?;
    let mut reader = DocumentReader {
        document: &source.name,
        last_line: source
            .lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .unwrap_or(0),
        scanner: Scanner::new(&source.lines),
        parsed,
    };

    let mut header_warnings = Vec::new();
    header::read_headers(
        &mut reader.scanner,
        &source.name,
        &mut reader.parsed.namespace_for_target,
        &mut header_warnings,
    );
    warnings.extend(
        header_warnings
            .into_iter()
            .map(|w| w.with_source(&source.lines)),
    );
    reader
        .read_definitions()
        .map_err(|e| e.with_source(&source.lines))?;

    tracing::debug!(
        document = %source.name,
        definitions = reader.parsed.definitions.len(),
        "document read"
    );
    Ok(reader.parsed)
}

// ==============================================================================
// Token Cursor
// ==============================================================================

/// A cursor over the tokens of one line or one block body.
struct Tokens {
    tokens: Vec<Token>,
    pos: usize,
    /// Line reported once the cursor is exhausted.
    end_line: usize,
}

impl Tokens {
    fn new(tokens: Vec<Token>, end_line: usize) -> Self {
        Tokens {
            tokens,
            pos: 0,
            end_line,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    /// Line of the next token, or of the end of the cursor.
    fn line(&self) -> usize {
        self.peek().map_or(self.end_line, |t| t.line)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        let matched = self.peek().is_some_and(|t| t.is_punct(c));
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let matched = self.peek().is_some_and(|t| t.is_word() && t.text == word);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(Token::is_separator) {
            self.pos += 1;
        }
    }

    fn into_rest(mut self) -> Vec<Token> {
        self.tokens.split_off(self.pos)
    }
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }
}

/// Render a brace-delimited value (a map literal) back into one string.
fn join_group(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.text);
        if token.is_punct(':') || token.is_punct(',') {
            out.push(' ');
        }
    }
    out
}

/// Parse an enum value: decimal or `0x` hex, optionally signed.
fn parse_enum_value(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            digits.parse::<i64>().ok()?
        }
        None => return None,
    };
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

// ==============================================================================
// Document Reader
// ==============================================================================

struct DocumentReader<'a> {
    document: &'a str,
    /// Zero-based index of the document's last non-blank line.
    last_line: usize,
    scanner: Scanner<'a>,
    parsed: Document,
}

impl DocumentReader<'_> {
    fn read_definitions(&mut self) -> Result<(), ModelError> {
        while let Some(line) = self.scanner.next_meaningful_line() {
            let line_number = self.scanner.line_number();
            let mut tokens = Tokens::new(tokenize(line, line_number), line_number);
            let keyword = tokens
                .next()
                .ok_or_else(|| ModelError::internal("a meaningful line produced no tokens"))?;
            if !keyword.is_word() {
                return Err(self.unexpected_keyword(&keyword));
            }

            let definition = match keyword.text.as_str() {
                "const" => Definition::Const(self.read_const(tokens)?),
                "typedef" => Definition::Typedef(self.read_typedef(tokens)?),
                "enum" => Definition::Enum(self.read_enum(tokens)?),
                "senum" => Definition::Senum(self.read_senum(tokens)?),
                "struct" => Definition::Struct(self.read_struct(DefinitionKind::Struct, tokens)?),
                "exception" => {
                    Definition::Exception(self.read_struct(DefinitionKind::Exception, tokens)?)
                }
                "service" => Definition::Service(self.read_service(tokens)?),
                _ => return Err(self.unexpected_keyword(&keyword)),
            };
            tracing::trace!(
                at = %definition.doc_line(),
                kind = %definition.kind(),
                "read {}",
                definition.name()
            );
            self.parsed.push_definition(definition)?;
        }

        if self.parsed.definitions.is_empty() {
            return Err(ModelError::new(
                ErrorKind::NoDefinitionsFound,
                format!("no definitions found in document `{}`", self.document),
            )
            .at(self.doc_line(self.last_line))
            .with_help("a document needs at least one const, typedef, enum, senum, struct, exception or service"));
        }
        Ok(())
    }

    // ==========================================================================
    // Single-line definitions
    // ==========================================================================

    /// `const <type> <identifier> = <value>`
    fn read_const(&self, mut tokens: Tokens) -> Result<Const, ModelError> {
        let line = tokens.line();
        let shape = || {
            self.shape(
                DefinitionKind::Const,
                line,
                "expected `const <type> <identifier> = <value>`",
            )
        };

        let field_type = tokens.next().filter(Token::is_word).ok_or_else(shape)?;
        let name = tokens.next().filter(Token::is_word).ok_or_else(shape)?;
        if !tokens.eat_punct('=') {
            return Err(shape());
        }
        let value = self
            .read_value(DefinitionKind::Const.into(), &mut tokens)
            .map_err(|_| shape())?;
        if tokens.peek().is_some() {
            return Err(shape());
        }

        Ok(Const {
            identifier: self.claim_identifier(&name)?,
            field_type: field_type.text,
            value,
        })
    }

    /// `typedef <type> <identifier>`
    fn read_typedef(&self, mut tokens: Tokens) -> Result<Typedef, ModelError> {
        let line = tokens.line();
        let shape = || self.shape(DefinitionKind::Typedef, line, "expected `typedef <type> <identifier>`");

        let aliased = tokens.next().filter(Token::is_word).ok_or_else(shape)?;
        let name = tokens.next().filter(Token::is_word).ok_or_else(shape)?;
        if tokens.peek().is_some() {
            return Err(shape());
        }

        Ok(Typedef {
            identifier: self.claim_identifier(&name)?,
            aliased: aliased.text,
        })
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    /// Read the identifier that follows a block keyword.
    fn read_block_name(
        &self,
        kind: DefinitionKind,
        tokens: &mut Tokens,
    ) -> Result<Identifier, ModelError> {
        let line = tokens.line();
        let name = tokens.next().filter(Token::is_word).ok_or_else(|| {
            self.shape(kind, line, format!("expected `{kind} <identifier> {{`"))
        })?;
        self.claim_identifier(&name)
    }

    /// Collect the tokens between a block's outermost braces. The opening
    /// brace is either the next token of the header line or the first token
    /// of the following line.
    fn read_block(
        &mut self,
        kind: DefinitionKind,
        header: Tokens,
        start_line: usize,
    ) -> Result<Tokens, ModelError> {
        let mut line_tokens = header.into_rest();
        if line_tokens.is_empty() {
            let Some(line) = self.scanner.next_meaningful_line() else {
                return Err(self.shape(kind, start_line, "expected `{` to open the block"));
            };
            line_tokens = tokenize(line, self.scanner.line_number());
        }
        if let Some(first) = line_tokens.first().filter(|t| !t.is_punct('{')) {
            return Err(self.shape(
                kind,
                first.line,
                format!("expected `{{` but found `{}`", first.text),
            ));
        }

        let mut depth = 0usize;
        let mut body = Vec::new();
        let mut closed_at = None;
        loop {
            for token in line_tokens {
                if closed_at.is_some() {
                    return Err(self.shape(
                        kind,
                        token.line,
                        format!("unexpected `{}` after the end of the block", token.text),
                    ));
                }
                if token.is_punct('{') {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                } else if token.is_punct('}') {
                    depth -= 1;
                    if depth == 0 {
                        closed_at = Some(token.line);
                        continue;
                    }
                }
                body.push(token);
            }
            if let Some(end_line) = closed_at {
                return Ok(Tokens::new(body, end_line));
            }
            let Some(line) = self.scanner.next_meaningful_line() else {
                return Err(self.shape(kind, start_line, "block is never closed with `}`"));
            };
            line_tokens = tokenize(line, self.scanner.line_number());
        }
    }

    fn read_enum(&mut self, mut tokens: Tokens) -> Result<Enum, ModelError> {
        let start_line = tokens.line();
        let identifier = self.read_block_name(DefinitionKind::Enum, &mut tokens)?;
        let mut body = self.read_block(DefinitionKind::Enum, tokens, start_line)?;

        let mut values: Vec<EnumValue> = Vec::new();
        let mut next_value = Some(0i32);
        while let Some(token) = body.next() {
            if token.is_separator() {
                continue;
            }
            if !token.is_word() {
                return Err(self.shape(
                    Construct::EnumValue,
                    token.line,
                    format!("expected an enum value name but found `{}`", token.text),
                ));
            }
            self.check_identifier(&token)?;
            let doc_line = self.doc_line(token.line);

            let (value, explicit) = if body.eat_punct('=') {
                let literal = body.next().ok_or_else(|| {
                    self.shape(Construct::EnumValue, token.line, format!("missing value for `{}`", token.text))
                })?;
                let value = parse_enum_value(&literal.text).ok_or_else(|| {
                    self.shape(
                        Construct::EnumValue,
                        literal.line,
                        format!("`{}` is not a 32-bit integer", literal.text),
                    )
                })?;
                (value, true)
            } else {
                let value = next_value.ok_or_else(|| {
                    self.shape(
                        Construct::EnumValue,
                        token.line,
                        format!("implicit value of `{}` overflows a 32-bit integer", token.text),
                    )
                })?;
                (value, false)
            };

            if let Some(earlier) = values.iter().find(|v| v.name == token.text) {
                return Err(self.duplicate(
                    Construct::EnumValue,
                    doc_line,
                    &earlier.doc_line,
                    format!("enum value `{}` is already declared", token.text),
                ));
            }
            if let Some(earlier) = values.iter().find(|v| v.value == value) {
                return Err(self.duplicate(
                    Construct::EnumValue,
                    doc_line,
                    &earlier.doc_line,
                    format!(
                        "value {value} of `{}` is already used by `{}`",
                        token.text, earlier.name
                    ),
                ));
            }

            next_value = value.checked_add(1);
            values.push(EnumValue {
                name: token.text,
                value,
                explicit,
                doc_line,
            });
        }

        Ok(Enum { identifier, values })
    }

    fn read_senum(&mut self, mut tokens: Tokens) -> Result<Senum, ModelError> {
        let start_line = tokens.line();
        let identifier = self.read_block_name(DefinitionKind::Senum, &mut tokens)?;
        let body = self.read_block(DefinitionKind::Senum, tokens, start_line)?;

        let mut values: Vec<(String, DocLine)> = Vec::new();
        for token in body {
            if token.is_separator() {
                continue;
            }
            if token.kind != TokenKind::Literal {
                return Err(self.shape(
                    Construct::SenumValue,
                    token.line,
                    format!("expected a quoted string but found `{}`", token.text),
                ));
            }
            let value = unquote(&token.text).to_string();
            let doc_line = self.doc_line(token.line);
            if let Some((_, earlier)) = values.iter().find(|(v, _)| *v == value) {
                return Err(self.duplicate(
                    Construct::SenumValue,
                    doc_line,
                    earlier,
                    format!("senum value \"{value}\" is already declared"),
                ));
            }
            values.push((value, doc_line));
        }

        Ok(Senum {
            identifier,
            values: values.into_iter().map(|(v, _)| v).collect(),
        })
    }

    /// Shared by `struct` and `exception`.
    fn read_struct(&mut self, kind: DefinitionKind, mut tokens: Tokens) -> Result<Struct, ModelError> {
        let start_line = tokens.line();
        let identifier = self.read_block_name(kind, &mut tokens)?;
        let mut body = self.read_block(kind, tokens, start_line)?;

        let mut fields = Vec::new();
        loop {
            body.skip_separators();
            if body.peek().is_none() {
                break;
            }
            let field = self.read_field(&mut body)?;
            self.check_new_field(&fields, &field)?;
            fields.push(field);
        }

        Ok(Struct { identifier, fields })
    }

    fn read_service(&mut self, mut tokens: Tokens) -> Result<Service, ModelError> {
        let start_line = tokens.line();
        let identifier = self.read_block_name(DefinitionKind::Service, &mut tokens)?;
        let extends = if tokens.eat_word("extends") {
            let base = tokens.next().filter(Token::is_word).ok_or_else(|| {
                self.shape(
                    DefinitionKind::Service,
                    start_line,
                    "expected a service name after `extends`",
                )
            })?;
            self.check_identifier(&base)?;
            Some(base.text)
        } else {
            None
        };
        let mut body = self.read_block(DefinitionKind::Service, tokens, start_line)?;

        let mut functions: Vec<Function> = Vec::new();
        loop {
            body.skip_separators();
            if body.peek().is_none() {
                break;
            }
            let function = self.read_function(&mut body)?;
            if let Some(earlier) = functions.iter().find(|f| f.name == function.name) {
                return Err(self.duplicate(
                    Construct::Function,
                    function.doc_line.clone(),
                    &earlier.doc_line,
                    format!("function `{}` is already declared in this service", function.name),
                ));
            }
            functions.push(function);
        }

        Ok(Service {
            identifier,
            extends,
            functions,
        })
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    /// `<id>: [required|optional] <type> <name> [= <default>]`
    fn read_field(&self, tokens: &mut Tokens) -> Result<Field, ModelError> {
        let id_token = self.expect_word(Construct::Field, tokens, "a field id")?;
        let id: i16 = id_token.text.parse().map_err(|_| {
            self.shape(
                Construct::Field,
                id_token.line,
                format!("field id `{}` is not a 16-bit integer", id_token.text),
            )
        })?;
        if !tokens.eat_punct(':') {
            return Err(self.shape(
                Construct::Field,
                tokens.line(),
                format!("expected `:` after field id {id}"),
            ));
        }

        let mut field_type = self.expect_word(Construct::Field, tokens, "a field type")?;
        let requiredness = match field_type.text.as_str() {
            "required" => Requiredness::Required,
            "optional" => Requiredness::Optional,
            _ => Requiredness::Default,
        };
        if requiredness != Requiredness::Default {
            field_type = self.expect_word(Construct::Field, tokens, "a field type")?;
        }

        let name = self.expect_word(Construct::Field, tokens, "a field name")?;
        self.check_identifier(&name)?;
        let default = if tokens.eat_punct('=') {
            Some(self.read_value(Construct::Field, tokens)?)
        } else {
            None
        };

        Ok(Field {
            id,
            requiredness,
            field_type: field_type.text,
            name: name.text,
            default,
            doc_line: self.doc_line(id_token.line),
        })
    }

    /// `[oneway] <returnType|void> <name> ( <Field>, ... ) [throws ( ... )]`
    fn read_function(&self, tokens: &mut Tokens) -> Result<Function, ModelError> {
        let line = tokens.line();
        let oneway = tokens.eat_word("oneway");
        let return_type = self.expect_word(Construct::Function, tokens, "a return type")?;
        let name = self.expect_word(Construct::Function, tokens, "a function name")?;
        self.check_identifier(&name)?;

        if !tokens.eat_punct('(') {
            return Err(self.shape(
                Construct::Function,
                tokens.line(),
                format!("expected `(` after function name `{}`", name.text),
            ));
        }
        let params = self.read_field_list(tokens, false)?;

        let throws = if tokens.eat_word("throws") {
            if !tokens.eat_punct('(') {
                return Err(self.shape(
                    Construct::Function,
                    tokens.line(),
                    "expected `(` after `throws`",
                ));
            }
            self.read_field_list(tokens, true)?
        } else {
            Vec::new()
        };

        let return_type = (return_type.text != "void").then_some(return_type.text);
        if oneway && (return_type.is_some() || !throws.is_empty()) {
            return Err(self.shape(
                Construct::Function,
                line,
                format!(
                    "oneway function `{}` must return void and declare no exceptions",
                    name.text
                ),
            ));
        }

        Ok(Function {
            name: name.text,
            return_type,
            oneway,
            params,
            throws,
            doc_line: self.doc_line(line),
        })
    }

    /// Fields up to and including the closing `)`. With `bare_types`, an
    /// entry may be a lone type name; it gets the next positional id and its
    /// type as its name.
    fn read_field_list(&self, tokens: &mut Tokens, bare_types: bool) -> Result<Vec<Field>, ModelError> {
        let open_line = tokens.line();
        let mut fields: Vec<Field> = Vec::new();
        loop {
            tokens.skip_separators();
            let Some(next) = tokens.peek() else {
                return Err(self.shape(
                    Construct::Function,
                    open_line,
                    "unterminated parameter list, expected `)`",
                ));
            };
            if next.is_punct(')') {
                tokens.next();
                return Ok(fields);
            }

            let field = if bare_types && !tokens.peek_nth(1).is_some_and(|t| t.is_punct(':')) {
                let exception = self.expect_word(Construct::Field, tokens, "an exception type")?;
                Field {
                    id: fields.last().map_or(1, |f| f.id.saturating_add(1)),
                    requiredness: Requiredness::Default,
                    field_type: exception.text.clone(),
                    name: exception.text,
                    default: None,
                    doc_line: self.doc_line(exception.line),
                }
            } else {
                self.read_field(tokens)?
            };
            self.check_new_field(&fields, &field)?;
            fields.push(field);
        }
    }

    /// A literal value: a word, a quoted string or a brace-delimited map.
    fn read_value(&self, construct: Construct, tokens: &mut Tokens) -> Result<String, ModelError> {
        let line = tokens.line();
        match tokens.next() {
            Some(open) if open.is_punct('{') => {
                let mut group = vec![open];
                let mut depth = 1usize;
                while depth > 0 {
                    let token = tokens
                        .next()
                        .ok_or_else(|| self.shape(construct, line, "unterminated `{` in value"))?;
                    if token.is_punct('{') {
                        depth += 1;
                    } else if token.is_punct('}') {
                        depth -= 1;
                    }
                    group.push(token);
                }
                Ok(join_group(&group))
            }
            Some(token) if token.is_word() || token.kind == TokenKind::Literal => Ok(token.text),
            Some(token) => Err(self.shape(
                construct,
                token.line,
                format!("expected a value but found `{}`", token.text),
            )),
            None => Err(self.shape(construct, line, "expected a value")),
        }
    }

    // ==========================================================================
    // Checks and error construction
    // ==========================================================================

    fn doc_line(&self, line: usize) -> DocLine {
        DocLine::new(self.document, line)
    }

    fn expect_word(&self, construct: Construct, tokens: &mut Tokens, what: &str) -> Result<Token, ModelError> {
        let line = tokens.line();
        match tokens.next() {
            Some(token) if token.is_word() => Ok(token),
            Some(token) => Err(self.shape(
                construct,
                token.line,
                format!("expected {what} but found `{}`", token.text),
            )),
            None => Err(self.shape(construct, line, format!("expected {what}"))),
        }
    }

    fn check_identifier(&self, token: &Token) -> Result<(), ModelError> {
        if is_valid_identifier(&token.text) {
            return Ok(());
        }
        Err(ModelError::new(
            ErrorKind::InvalidIdentifier,
            format!("`{}` is not a valid identifier", token.text),
        )
        .at(self.doc_line(token.line))
        .with_help("identifiers start with a letter or `_` and continue with letters, digits, `_`, `-` or `.`"))
    }

    /// Validate a definition name and make sure the document has not used it.
    fn claim_identifier(&self, token: &Token) -> Result<Identifier, ModelError> {
        self.check_identifier(token)?;
        let identifier = Identifier {
            name: token.text.clone(),
            doc_line: self.doc_line(token.line),
        };
        if let Some(earlier) = self.parsed.lookup(&identifier.name) {
            return Err(duplicate_in_document(&identifier, earlier.doc_line()));
        }
        Ok(identifier)
    }

    fn check_new_field(&self, fields: &[Field], field: &Field) -> Result<(), ModelError> {
        if let Some(earlier) = fields.iter().find(|f| f.id == field.id) {
            return Err(self.duplicate(
                Construct::Field,
                field.doc_line.clone(),
                &earlier.doc_line,
                format!("field id {} is already used by `{}`", field.id, earlier.name),
            ));
        }
        if let Some(earlier) = fields.iter().find(|f| f.name == field.name) {
            return Err(self.duplicate(
                Construct::Field,
                field.doc_line.clone(),
                &earlier.doc_line,
                format!("field `{}` is already declared", field.name),
            ));
        }
        Ok(())
    }

    fn shape(&self, construct: impl Into<Construct>, line: usize, message: impl Into<String>) -> ModelError {
        let construct = construct.into();
        ModelError::new(
            ErrorKind::InvalidDefinitionShape(construct),
            format!("invalid {construct}: {}", message.into()),
        )
        .at(self.doc_line(line))
    }

    fn duplicate(
        &self,
        construct: Construct,
        at: DocLine,
        earlier: &DocLine,
        message: String,
    ) -> ModelError {
        ModelError::new(
            ErrorKind::DuplicateMember {
                construct,
                earlier: earlier.clone(),
            },
            format!("{message} (previous declaration at {earlier})"),
        )
        .at(at)
    }

    fn unexpected_keyword(&self, token: &Token) -> ModelError {
        let err = ModelError::new(
            ErrorKind::UnexpectedKeyword,
            format!("unexpected `{}`, expected a definition", token.text),
        )
        .at(self.doc_line(token.line));
        if HEADER_KEYWORDS.contains(&token.text.as_str()) {
            err.with_help("header directives must appear before the first definition")
        } else if let Some(keyword) = suggest_keyword(&token.text) {
            err.with_help(format!("did you mean `{keyword}`?"))
        } else {
            err
        }
    }
}

/// Strip the surrounding quotes of a string literal token.
fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let inner = chars.as_str();
            inner.strip_suffix(q).unwrap_or(inner)
        }
        _ => literal,
    }
}
