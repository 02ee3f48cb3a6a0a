// ==============================================================================
// Header Directives
// ==============================================================================
//
// A document opens with zero or more directive lines: `namespace`, `include`
// and `cpp_include`. The header phase ends at the first line that starts with
// anything else; that line is handed back to the scanner for the definition
// reader.

use indexmap::IndexMap;

use crate::error::Warning;
use crate::model::DocLine;
use crate::scanner::Scanner;

/// Keywords only legal in the header phase.
pub(crate) const HEADER_KEYWORDS: [&str; 3] = ["namespace", "include", "cpp_include"];

/// Consume header lines, updating `namespaces` (target -> namespace name).
///
/// Malformed `namespace` lines and every include directive produce a warning
/// and are otherwise skipped. Running out of lines is not an error here; the
/// definition reader reports an empty document.
pub(crate) fn read_headers(
    scanner: &mut Scanner<'_>,
    document: &str,
    namespaces: &mut IndexMap<String, String>,
    warnings: &mut Vec<Warning>,
) {
    while let Some(line) = scanner.next_meaningful_line() {
        let doc_line = DocLine::new(document, scanner.line_number());
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.first().copied() {
            Some(keyword @ ("include" | "cpp_include")) => {
                tracing::debug!(at = %doc_line, "ignoring {keyword} directive");
                warnings.push(Warning::new(
                    doc_line,
                    format!("{keyword} directives are not supported and were ignored"),
                ));
            }
            Some("namespace") => {
                let &[_, target, name] = fields.as_slice() else {
                    tracing::debug!(at = %doc_line, "skipping malformed namespace directive");
                    warnings.push(Warning::new(
                        doc_line,
                        format!(
                            "expected `namespace <target> <name>` but found {} fields; directive skipped",
                            fields.len()
                        ),
                    ));
                    continue;
                };
                if let Some(previous) = namespaces.insert(target.to_string(), name.to_string()) {
                    tracing::debug!(
                        at = %doc_line,
                        "namespace for target `{target}` overridden: `{previous}` -> `{name}`"
                    );
                }
            }
            _ => {
                scanner.rewind();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> (IndexMap<String, String>, Vec<Warning>, Option<String>) {
        let lines: Vec<String> = src.lines().map(str::to_string).collect();
        let mut scanner = Scanner::new(&lines);
        let mut namespaces = IndexMap::new();
        namespaces.insert("default".to_string(), "doc".to_string());
        let mut warnings = Vec::new();
        read_headers(&mut scanner, "doc.thrift", &mut namespaces, &mut warnings);
        let rest = scanner.next_meaningful_line().map(str::to_string);
        (namespaces, warnings, rest)
    }

    #[test]
    fn namespaces_are_recorded_per_target() {
        let (ns, warnings, rest) = run(
            "namespace go com.example\nnamespace java org.example\n\nstruct S {\n}",
        );
        assert_eq!(ns.get("go").map(String::as_str), Some("com.example"));
        assert_eq!(ns.get("java").map(String::as_str), Some("org.example"));
        assert_eq!(ns.get("default").map(String::as_str), Some("doc"));
        assert!(warnings.is_empty());
        assert_eq!(rest.as_deref(), Some("struct S {"));
    }

    #[test]
    fn default_target_can_be_overridden_and_last_wins() {
        let (ns, _, _) = run("namespace default shared\nnamespace go a\nnamespace go b");
        assert_eq!(ns.get("default").map(String::as_str), Some("shared"));
        assert_eq!(ns.get("go").map(String::as_str), Some("b"));
    }

    #[test]
    fn includes_are_ignored_with_warnings() {
        let (ns, warnings, rest) = run(
            "include \"shared.thrift\"\ncpp_include \"<map>\"\nconst i32 A = 1",
        );
        assert_eq!(ns.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].doc_line, DocLine::new("doc.thrift", 0));
        assert!(warnings[1].message.starts_with("cpp_include"));
        assert_eq!(rest.as_deref(), Some("const i32 A = 1"));
    }

    #[test]
    fn malformed_namespace_is_skipped_with_warning() {
        let (ns, warnings, _) = run("namespace go\nnamespace go a b\ntypedef i32 X");
        assert_eq!(ns.get("go"), None);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1].doc_line.line, 1);
        assert!(warnings[0].message.contains("found 2 fields"));
    }

    #[test]
    fn end_of_document_in_header_mode_is_fine() {
        let (ns, warnings, rest) = run("// nothing\nnamespace py x\n");
        assert_eq!(ns.get("py").map(String::as_str), Some("x"));
        assert!(warnings.is_empty());
        assert_eq!(rest, None);
    }
}
