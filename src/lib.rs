//! Thrift IDL front-end: read `.thrift` documents and resolve them into a
//! per-target model that code generators consume.
//!
//! Documents are added to a [`Model`], which is then parsed exactly once.
//! Parsing reads every document (header directives, then definitions) and
//! merges the definitions into one namespace per (target, namespace name).
//! Documents that share a namespace for a target share its identifier scope.
//!
//! # Building a model from strings
//!
//! ```
//! use threft::Model;
//!
//! let mut model = Model::new();
//! model.add_document("users.thrift", "namespace go example\nstruct User {\n  1: i64 id\n}")?;
//! model.parse()?;
//!
//! let go = model.target("go").expect("declared by the namespace directive");
//! assert!(go.namespaces.contains_key("example"));
//! # Ok::<(), threft::ModelError>(())
//! ```
//!
//! # Handing the model to a generator
//!
//! ```no_run
//! use std::path::Path;
//! use threft::{Config, GeneratorSpec, Threft, encode, sink};
//!
//! let mut threft = Threft::new(Config::new().input("idl/"));
//! let model = threft.build()?;
//! let spec = GeneratorSpec::parse("go").expect("non-blank");
//! sink::run_generator(&spec, Path::new("gen"), encode(&model))?;
//! # Ok::<(), miette::Report>(())
//! ```
//!
//! # Error handling
//!
//! Model building fails fast with a [`ModelError`], a [`miette::Diagnostic`]
//! that points at the offending line when rendered. Non-fatal problems are
//! collected as [`Warning`]s. Generator faults are [`GeneratorError`]s.

pub(crate) mod compiler;
pub mod config;
pub mod error;
pub(crate) mod header;
pub mod model;
pub(crate) mod reader;
pub(crate) mod resolve;
pub(crate) mod scanner;
pub mod sink;
pub(crate) mod suggest;

pub use compiler::{SourceFile, THRIFT_EXTENSION, Threft, discover};
pub use config::{Config, GeneratorSpec};
pub use error::{Construct, ErrorKind, GeneratorError, ModelError, Scope, Warning};
pub use model::json::{decode, encode, write_model};
pub use model::{DEFAULT_TARGET, Definition, DefinitionKind, DocLine, Document, Model};
pub use reader::is_valid_identifier;
