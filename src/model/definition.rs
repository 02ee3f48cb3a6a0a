use std::fmt;
use std::str::FromStr;

use super::{DocLine, Identifier};

/// The seven top-level declaration kinds. The ordering is the grouping order
/// used for namespace references in the encoded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DefinitionKind {
    Const,
    Typedef,
    Enum,
    Senum,
    Struct,
    Exception,
    Service,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 7] = [
        DefinitionKind::Const,
        DefinitionKind::Typedef,
        DefinitionKind::Enum,
        DefinitionKind::Senum,
        DefinitionKind::Struct,
        DefinitionKind::Exception,
        DefinitionKind::Service,
    ];

    /// The keyword that introduces this kind of definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Const => "const",
            DefinitionKind::Typedef => "typedef",
            DefinitionKind::Enum => "enum",
            DefinitionKind::Senum => "senum",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Exception => "exception",
            DefinitionKind::Service => "service",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefinitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DefinitionKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown definition kind `{s}`"))
    }
}

/// One parsed top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Const(Const),
    Typedef(Typedef),
    Enum(Enum),
    Senum(Senum),
    Struct(Struct),
    Exception(Struct),
    Service(Service),
}

impl Definition {
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Definition::Const(_) => DefinitionKind::Const,
            Definition::Typedef(_) => DefinitionKind::Typedef,
            Definition::Enum(_) => DefinitionKind::Enum,
            Definition::Senum(_) => DefinitionKind::Senum,
            Definition::Struct(_) => DefinitionKind::Struct,
            Definition::Exception(_) => DefinitionKind::Exception,
            Definition::Service(_) => DefinitionKind::Service,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            Definition::Const(c) => &c.identifier,
            Definition::Typedef(t) => &t.identifier,
            Definition::Enum(e) => &e.identifier,
            Definition::Senum(s) => &s.identifier,
            Definition::Struct(s) | Definition::Exception(s) => &s.identifier,
            Definition::Service(s) => &s.identifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.identifier().name
    }

    pub fn doc_line(&self) -> &DocLine {
        &self.identifier().doc_line
    }
}

/// `const <type> <identifier> = <value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    pub identifier: Identifier,
    pub field_type: String,
    /// The literal exactly as written (string literals keep their quotes).
    pub value: String,
}

/// `typedef <type> <identifier>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typedef {
    pub identifier: Identifier,
    pub aliased: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub identifier: Identifier,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: i32,
    /// Whether the value was written out (`NAME = 3`) or derived from the
    /// previous member.
    pub explicit: bool,
    pub doc_line: DocLine,
}

/// A string enum. Values are stored without their surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Senum {
    pub identifier: Identifier,
    pub values: Vec<String>,
}

/// Payload shared by `struct` and `exception`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub identifier: Identifier,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requiredness {
    Required,
    Optional,
    Default,
}

impl Requiredness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requiredness::Required => "required",
            Requiredness::Optional => "optional",
            Requiredness::Default => "default",
        }
    }
}

impl FromStr for Requiredness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Requiredness::Required),
            "optional" => Ok(Requiredness::Optional),
            "default" => Ok(Requiredness::Default),
            other => Err(format!("unknown requiredness `{other}`")),
        }
    }
}

/// `<id>: [<requiredness>] <type> <name> [= <default>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: i16,
    pub requiredness: Requiredness,
    pub field_type: String,
    pub name: String,
    pub default: Option<String>,
    pub doc_line: DocLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub identifier: Identifier,
    pub extends: Option<String>,
    pub functions: Vec<Function>,
}

/// `[oneway] <returnType|void> <name> (<Field>, ...) [throws (<Field>, ...)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// `None` for `void`.
    pub return_type: Option<String>,
    pub oneway: bool,
    pub params: Vec<Field>,
    pub throws: Vec<Field>,
    pub doc_line: DocLine,
}
