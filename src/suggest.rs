// ==============================================================================
// Keyword Typo Suggestions
// ==============================================================================
//
// An unknown leading keyword is a fatal error. When it is a near miss of a
// real keyword (`strcut`, `excepton`), the diagnostic offers a "did you mean"
// hint. Closeness is the number of single-character edits (insert, delete,
// replace) between the typed word and the keyword.

/// Every keyword that may start a line of a document.
pub(crate) const KEYWORDS: [&str; 10] = [
    "namespace",
    "include",
    "cpp_include",
    "const",
    "typedef",
    "enum",
    "senum",
    "struct",
    "exception",
    "service",
];

/// Number of single-character edits that turn `typed` into `keyword`.
pub(crate) fn edit_distance(typed: &str, keyword: &str) -> usize {
    let keyword: Vec<char> = keyword.chars().collect();
    // costs[j]: edits from the prefix of `typed` seen so far to keyword[..j].
    let mut costs: Vec<usize> = (0..=keyword.len()).collect();

    for (i, t) in typed.chars().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = i + 1;
        for (j, &k) in keyword.iter().enumerate() {
            let above = costs[j + 1];
            costs[j + 1] = if t == k {
                diagonal
            } else {
                1 + diagonal.min(above).min(costs[j])
            };
            diagonal = above;
        }
    }
    costs[keyword.len()]
}

/// How many edits a typed word of `len` characters may be away from a
/// keyword and still earn a suggestion.
pub(crate) fn edit_budget(len: usize) -> usize {
    if len <= 4 { 1 } else { 2 }
}

/// The closest keyword to `word`, ignoring case, if one is within budget.
pub(crate) fn suggest_keyword(word: &str) -> Option<&'static str> {
    let lowered = word.to_lowercase();
    let budget = edit_budget(word.chars().count());
    KEYWORDS
        .iter()
        .map(|&k| (k, edit_distance(&lowered, k)))
        .filter(|&(_, d)| d <= budget)
        .min_by_key(|&(_, d)| d)
        .map(|(k, _)| k)
}
