// ==============================================================================
// JSON Encoding of the Model
// ==============================================================================
//
// The encoded model is what generators read on stdin. Layout:
//
//   {
//     "parsed": true,
//     "documents": {
//       "<name>": { "namespaces": {...}, "lines": [...], "definitions": [...] }
//     },
//     "targets": {
//       "<target>": { "<namespace>": { "<kind>": [{"document", "identifier"}] } }
//     }
//   }
//
// Object keys keep insertion order (`serde_json/preserve_order`), so encoding
// the same model always yields the same bytes. Definitions keep declaration
// order; namespace reference lists keep merge order grouped by kind.
//
// Decoding rebuilds documents through the same registries the parser uses,
// and rebuilds every namespace by registering its references again, so a
// decoded model satisfies the same uniqueness invariants as a parsed one.

use std::io;

use indexmap::IndexMap;
use miette::{Context, Result};
use serde_json::{Map, Value, json};

use super::{
    Const, Definition, DefinitionKind, DocLine, Document, Enum, EnumValue, Field, Function,
    Identifier, Model, Requiredness, Senum, Service, Struct, Target, Typedef,
};

/// Encoded form of a `void` return type.
const VOID: &str = "void";

/// Encode `model` as pretty-printed JSON.
pub fn encode(model: &Model) -> Vec<u8> {
    format!("{:#}", model_to_json(model)).into_bytes()
}

/// Write the encoded model followed by a newline.
pub fn write_model<W: io::Write>(model: &Model, mut writer: W) -> io::Result<()> {
    writer.write_all(&encode(model))?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Decode a model previously produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Model> {
    let json: Value =
        serde_json::from_slice(bytes).map_err(|e| miette::miette!("invalid model JSON: {e}"))?;
    model_from_json(&json)
}

// ==============================================================================
// Encoding
// ==============================================================================

pub fn model_to_json(model: &Model) -> Value {
    let documents: Map<String, Value> = model
        .documents()
        .map(|doc| (doc.name.clone(), document_to_json(doc)))
        .collect();
    let targets: Map<String, Value> = model
        .targets()
        .map(|target| (target.name.clone(), target_to_json(target)))
        .collect();

    json!({
        "parsed": model.is_parsed(),
        "documents": documents,
        "targets": targets,
    })
}

fn document_to_json(doc: &Document) -> Value {
    let namespaces: Map<String, Value> = doc
        .namespace_for_target
        .iter()
        .map(|(target, ns)| (target.clone(), Value::String(ns.clone())))
        .collect();
    let definitions: Vec<Value> = doc.definitions.iter().map(definition_to_json).collect();
    json!({
        "namespaces": namespaces,
        "lines": doc.lines,
        "definitions": definitions,
    })
}

fn definition_to_json(definition: &Definition) -> Value {
    let mut obj = Map::new();
    obj.insert("kind".to_string(), json!(definition.kind().as_str()));
    obj.insert("identifier".to_string(), json!(definition.name()));
    obj.insert("line".to_string(), json!(definition.doc_line().line));

    match definition {
        Definition::Const(c) => {
            obj.insert("type".to_string(), json!(c.field_type));
            obj.insert("value".to_string(), json!(c.value));
        }
        Definition::Typedef(t) => {
            obj.insert("type".to_string(), json!(t.aliased));
        }
        Definition::Enum(e) => {
            let values: Vec<Value> = e
                .values
                .iter()
                .map(|v| {
                    json!({
                        "name": v.name,
                        "value": v.value,
                        "explicit": v.explicit,
                        "line": v.doc_line.line,
                    })
                })
                .collect();
            obj.insert("values".to_string(), Value::Array(values));
        }
        Definition::Senum(s) => {
            obj.insert("values".to_string(), json!(s.values));
        }
        Definition::Struct(s) | Definition::Exception(s) => {
            obj.insert("fields".to_string(), fields_to_json(&s.fields));
        }
        Definition::Service(s) => {
            if let Some(extends) = &s.extends {
                obj.insert("extends".to_string(), json!(extends));
            }
            let functions: Vec<Value> = s.functions.iter().map(function_to_json).collect();
            obj.insert("functions".to_string(), Value::Array(functions));
        }
    }
    Value::Object(obj)
}

fn fields_to_json(fields: &[Field]) -> Value {
    Value::Array(fields.iter().map(field_to_json).collect())
}

fn field_to_json(field: &Field) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), json!(field.id));
    obj.insert(
        "requiredness".to_string(),
        json!(field.requiredness.as_str()),
    );
    obj.insert("type".to_string(), json!(field.field_type));
    obj.insert("name".to_string(), json!(field.name));
    if let Some(default) = &field.default {
        obj.insert("default".to_string(), json!(default));
    }
    obj.insert("line".to_string(), json!(field.doc_line.line));
    Value::Object(obj)
}

fn function_to_json(function: &Function) -> Value {
    json!({
        "name": function.name,
        "returnType": function.return_type.as_deref().unwrap_or(VOID),
        "oneway": function.oneway,
        "params": fields_to_json(&function.params),
        "throws": fields_to_json(&function.throws),
        "line": function.doc_line.line,
    })
}

fn target_to_json(target: &Target) -> Value {
    let namespaces: Map<String, Value> = target
        .namespaces
        .values()
        .map(|ns| {
            let kinds: Map<String, Value> = ns
                .references
                .iter()
                .map(|(kind, references)| {
                    let refs: Vec<Value> = references
                        .iter()
                        .map(|r| json!({"document": r.document, "identifier": r.identifier}))
                        .collect();
                    (kind.as_str().to_string(), Value::Array(refs))
                })
                .collect();
            (ns.name.clone(), Value::Object(kinds))
        })
        .collect();
    Value::Object(namespaces)
}

// ==============================================================================
// Decoding
// ==============================================================================

pub fn model_from_json(json: &Value) -> Result<Model> {
    let obj = as_object(json, "model")?;
    let parsed = get(obj, "parsed")?
        .as_bool()
        .ok_or_else(|| miette::miette!("`parsed` must be a boolean"))?;

    let mut documents = IndexMap::new();
    for (name, doc_json) in as_object(get(obj, "documents")?, "documents")? {
        let document = document_from_json(name, doc_json)
            .with_context(|| format!("decode document `{name}`"))?;
        documents.insert(name.clone(), document);
    }

    let mut targets = IndexMap::new();
    for (target_name, target_json) in as_object(get(obj, "targets")?, "targets")? {
        let target = target_from_json(target_name, target_json, &documents)
            .with_context(|| format!("decode target `{target_name}`"))?;
        targets.insert(target_name.clone(), target);
    }

    Ok(Model::from_parts(documents, targets, parsed))
}

fn document_from_json(name: &str, json: &Value) -> Result<Document> {
    let obj = as_object(json, "document")?;

    let mut namespaces = IndexMap::new();
    for (target, ns) in as_object(get(obj, "namespaces")?, "namespaces")? {
        namespaces.insert(target.clone(), as_str(ns, "namespace name")?.to_string());
    }

    let lines = as_array(get(obj, "lines")?, "lines")?
        .iter()
        .map(|l| as_str(l, "line").map(str::to_string))
        .collect::<Result<Vec<_>>>()?;

    let definitions = as_array(get(obj, "definitions")?, "definitions")?
        .iter()
        .enumerate()
        .map(|(i, d)| {
            definition_from_json(name, d).with_context(|| format!("decode definition at index {i}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Document::from_parts(name, lines, namespaces, definitions)?)
}

fn definition_from_json(document: &str, json: &Value) -> Result<Definition> {
    let obj = as_object(json, "definition")?;
    let kind: DefinitionKind = str_field(obj, "kind")?
        .parse()
        .map_err(|e: String| miette::miette!("{e}"))?;
    let identifier = Identifier {
        name: str_field(obj, "identifier")?.to_string(),
        doc_line: DocLine::new(document, line_field(obj)?),
    };

    let definition = match kind {
        DefinitionKind::Const => Definition::Const(Const {
            identifier,
            field_type: str_field(obj, "type")?.to_string(),
            value: str_field(obj, "value")?.to_string(),
        }),
        DefinitionKind::Typedef => Definition::Typedef(Typedef {
            identifier,
            aliased: str_field(obj, "type")?.to_string(),
        }),
        DefinitionKind::Enum => {
            let values = as_array(get(obj, "values")?, "values")?
                .iter()
                .map(|v| enum_value_from_json(document, v))
                .collect::<Result<Vec<_>>>()?;
            Definition::Enum(Enum { identifier, values })
        }
        DefinitionKind::Senum => {
            let values = as_array(get(obj, "values")?, "values")?
                .iter()
                .map(|v| as_str(v, "senum value").map(str::to_string))
                .collect::<Result<Vec<_>>>()?;
            Definition::Senum(Senum { identifier, values })
        }
        DefinitionKind::Struct => Definition::Struct(Struct {
            identifier,
            fields: fields_from_json(document, get(obj, "fields")?)?,
        }),
        DefinitionKind::Exception => Definition::Exception(Struct {
            identifier,
            fields: fields_from_json(document, get(obj, "fields")?)?,
        }),
        DefinitionKind::Service => {
            let extends = obj
                .get("extends")
                .map(|e| as_str(e, "extends").map(str::to_string))
                .transpose()?;
            let functions = as_array(get(obj, "functions")?, "functions")?
                .iter()
                .map(|f| function_from_json(document, f))
                .collect::<Result<Vec<_>>>()?;
            Definition::Service(Service {
                identifier,
                extends,
                functions,
            })
        }
    };
    Ok(definition)
}

fn enum_value_from_json(document: &str, json: &Value) -> Result<EnumValue> {
    let obj = as_object(json, "enum value")?;
    let value = get(obj, "value")?
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| miette::miette!("enum `value` must be a 32-bit integer"))?;
    Ok(EnumValue {
        name: str_field(obj, "name")?.to_string(),
        value,
        explicit: get(obj, "explicit")?
            .as_bool()
            .ok_or_else(|| miette::miette!("`explicit` must be a boolean"))?,
        doc_line: DocLine::new(document, line_field(obj)?),
    })
}

fn fields_from_json(document: &str, json: &Value) -> Result<Vec<Field>> {
    as_array(json, "fields")?
        .iter()
        .map(|f| field_from_json(document, f))
        .collect()
}

fn field_from_json(document: &str, json: &Value) -> Result<Field> {
    let obj = as_object(json, "field")?;
    let id = get(obj, "id")?
        .as_i64()
        .and_then(|v| i16::try_from(v).ok())
        .ok_or_else(|| miette::miette!("field `id` must be a 16-bit integer"))?;
    let requiredness: Requiredness = str_field(obj, "requiredness")?
        .parse()
        .map_err(|e: String| miette::miette!("{e}"))?;
    let default = obj
        .get("default")
        .map(|d| as_str(d, "default").map(str::to_string))
        .transpose()?;
    Ok(Field {
        id,
        requiredness,
        field_type: str_field(obj, "type")?.to_string(),
        name: str_field(obj, "name")?.to_string(),
        default,
        doc_line: DocLine::new(document, line_field(obj)?),
    })
}

fn function_from_json(document: &str, json: &Value) -> Result<Function> {
    let obj = as_object(json, "function")?;
    let return_type = str_field(obj, "returnType")?;
    Ok(Function {
        name: str_field(obj, "name")?.to_string(),
        return_type: (return_type != VOID).then(|| return_type.to_string()),
        oneway: get(obj, "oneway")?
            .as_bool()
            .ok_or_else(|| miette::miette!("`oneway` must be a boolean"))?,
        params: fields_from_json(document, get(obj, "params")?)?,
        throws: fields_from_json(document, get(obj, "throws")?)?,
        doc_line: DocLine::new(document, line_field(obj)?),
    })
}

fn target_from_json(
    name: &str,
    json: &Value,
    documents: &IndexMap<String, Document>,
) -> Result<Target> {
    let mut target = Target::new(name);
    for (ns_name, ns_json) in as_object(json, "target")? {
        let namespace = target.namespace_mut(ns_name);
        for (kind_name, refs) in as_object(ns_json, "namespace")? {
            let kind: DefinitionKind = kind_name
                .parse()
                .map_err(|e: String| miette::miette!("namespace `{ns_name}`: {e}"))?;
            for reference in as_array(refs, "references")? {
                let obj = as_object(reference, "reference")?;
                let document_name = str_field(obj, "document")?;
                let identifier = str_field(obj, "identifier")?;
                let definition = documents
                    .get(document_name)
                    .and_then(|doc| doc.lookup(identifier))
                    .ok_or_else(|| {
                        miette::miette!(
                            "namespace `{ns_name}` references unknown definition `{identifier}` in document `{document_name}`"
                        )
                    })?;
                if definition.kind() != kind {
                    return Err(miette::miette!(
                        "namespace `{ns_name}` lists {} `{identifier}` under `{kind}`",
                        definition.kind()
                    ));
                }
                namespace.register(document_name, definition)?;
            }
        }
    }
    Ok(target)
}

// ==============================================================================
// Value accessors
// ==============================================================================

fn get<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<&'v Value> {
    obj.get(key)
        .ok_or_else(|| miette::miette!("missing `{key}`"))
}

fn as_object<'v>(json: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    json.as_object()
        .ok_or_else(|| miette::miette!("{what} must be a JSON object"))
}

fn as_array<'v>(json: &'v Value, what: &str) -> Result<&'v Vec<Value>> {
    json.as_array()
        .ok_or_else(|| miette::miette!("{what} must be a JSON array"))
}

fn as_str<'v>(json: &'v Value, what: &str) -> Result<&'v str> {
    json.as_str()
        .ok_or_else(|| miette::miette!("{what} must be a string"))
}

fn str_field<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<&'v str> {
    as_str(get(obj, key)?, &format!("`{key}`"))
}

fn line_field(obj: &Map<String, Value>) -> Result<usize> {
    get(obj, "line")?
        .as_u64()
        .and_then(|l| usize::try_from(l).ok())
        .ok_or_else(|| miette::miette!("`line` must be a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const USERS: &str = r#"namespace go example.users
namespace default users
include "base.thrift"

const i32 MAX_USERS = 100
const map<string,i32> LIMITS = {"a": 1}
typedef i64 UserId
enum Role { ADMIN = 1, MEMBER }
senum Tier { "gold", "silver" }
struct User {
  1: required UserId id
  2: optional string name = "anon"
}
exception NotFound { 1: string message }
service Users extends base.Service {
  User get(1: UserId id) throws (NotFound)
  oneway void touch(1: UserId id)
}
"#;

    const BASE: &str = "namespace go example.users\nservice Service {\n  void ping()\n}\n";

    fn parsed_model() -> Model {
        let mut model = Model::new();
        model
            .add_document("users.thrift", USERS)
            .expect("users added");
        model.add_document("base.thrift", BASE).expect("base added");
        model.parse().expect("model parses");
        model
    }

    #[test]
    fn decode_restores_parsed_model() {
        let model = parsed_model();
        let decoded = decode(&encode(&model)).expect("decodes");
        assert_eq!(decoded, model);
        assert!(decoded.is_parsed());

        let ns = &decoded
            .target("go")
            .expect("go target")
            .namespaces["example.users"];
        assert_eq!(ns.len(), 9);
        assert_eq!(ns.declared_at("Service"), Some(&DocLine::new("base.thrift", 1)));
    }

    #[test]
    fn decode_restores_unparsed_model() {
        let mut model = Model::new();
        model
            .add_document("a.thrift", "namespace go a\nconst i32 A = 1")
            .expect("added");
        let decoded = decode(&encode(&model)).expect("decodes");
        assert_eq!(decoded, model);
        assert!(!decoded.is_parsed());
    }

    #[test]
    fn encoding_is_deterministic_and_ordered() {
        let model = parsed_model();
        assert_eq!(encode(&model), encode(&model));

        let json = model_to_json(&model);
        let top: Vec<_> = json
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(top, vec!["parsed", "documents", "targets"]);

        let definitions = json["documents"]["users.thrift"]["definitions"]
            .as_array()
            .expect("definitions array");
        let names: Vec<_> = definitions
            .iter()
            .map(|d| d["identifier"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(
            names,
            vec!["MAX_USERS", "LIMITS", "UserId", "Role", "Tier", "User", "NotFound", "Users"]
        );

        let kinds: Vec<_> = json["targets"]["go"]["example.users"]
            .as_object()
            .expect("namespace object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            kinds,
            vec!["const", "typedef", "enum", "senum", "struct", "exception", "service"]
        );
        assert_eq!(
            json["targets"]["go"]["example.users"]["service"],
            json!([
                {"document": "base.thrift", "identifier": "Service"},
                {"document": "users.thrift", "identifier": "Users"},
            ])
        );
    }

    #[test]
    fn encoded_definitions_carry_payloads() {
        let json = model_to_json(&parsed_model());
        let defs = &json["documents"]["users.thrift"]["definitions"];

        assert_eq!(
            defs[3]["values"],
            json!([
                {"name": "ADMIN", "value": 1, "explicit": true, "line": 7},
                {"name": "MEMBER", "value": 2, "explicit": false, "line": 7},
            ])
        );
        assert_eq!(defs[4]["values"], json!(["gold", "silver"]));
        assert_eq!(
            defs[5]["fields"][1],
            json!({
                "id": 2,
                "requiredness": "optional",
                "type": "string",
                "name": "name",
                "default": "\"anon\"",
                "line": 11,
            })
        );

        let service = &defs[7];
        assert_eq!(service["extends"], json!("base.Service"));
        assert_eq!(service["functions"][0]["returnType"], json!("User"));
        assert_eq!(service["functions"][0]["throws"][0]["name"], json!("NotFound"));
        assert_eq!(service["functions"][1]["returnType"], json!("void"));
        assert_eq!(service["functions"][1]["oneway"], json!(true));

        assert_eq!(
            json["documents"]["users.thrift"]["namespaces"],
            json!({"default": "users", "go": "example.users"})
        );
    }

    #[test]
    fn write_model_appends_newline() {
        let model = parsed_model();
        let mut out = Vec::new();
        write_model(&model, &mut out).expect("writes to a Vec");
        assert_eq!(out.last(), Some(&b'\n'));
        assert_eq!(&out[..out.len() - 1], encode(&model).as_slice());
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let err = decode(b"not json").expect_err("not JSON");
        assert!(err.to_string().starts_with("invalid model JSON"));

        let err = decode(br#"{"documents": {}, "targets": {}}"#).expect_err("no parsed flag");
        assert_eq!(err.to_string(), "missing `parsed`");
    }

    #[test]
    fn decode_rejects_dangling_references() {
        let mut json = model_to_json(&parsed_model());
        json["targets"]["default"]["base"]["service"][0]["identifier"] = json!("Missing");
        let err = decode(json.to_string().as_bytes()).expect_err("dangling reference");
        assert_eq!(err.to_string(), "decode target `default`");
        let causes: Vec<String> = err.chain().map(ToString::to_string).collect();
        assert!(
            causes
                .iter()
                .any(|c| c.contains("unknown definition `Missing` in document `base.thrift`")),
            "{causes:?}"
        );
    }

    #[test]
    fn decode_rejects_duplicate_definitions() {
        let mut json = model_to_json(&parsed_model());
        json["documents"]["base.thrift"]["definitions"][0]["identifier"] = json!("Other");
        let defs = json["documents"]["base.thrift"]["definitions"]
            .as_array_mut()
            .expect("definitions array");
        let copy = defs[0].clone();
        defs.push(copy);
        let err = decode(json.to_string().as_bytes()).expect_err("duplicate identifier");
        assert_eq!(err.to_string(), "decode document `base.thrift`");
    }
}
