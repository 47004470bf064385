//! Constant substitution.
//!
//! Names match as raw substrings anywhere in the text, not only in
//! identifier position: with `const kMax = 10;` the text `kMaxLength`
//! becomes `10Length`. Generated output depends on this, so it stays.

use crate::table::ConstantTable;

/// Replace every occurrence of every `(name, replacement)` pair in a single
/// left-to-right scan. Inserted text is never re-scanned. Where several
/// names match at one position the longest wins; ties go to the pair that
/// comes first.
pub(crate) fn replace_literals(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut ordered: Vec<(&str, &str)> = pairs
        .iter()
        .copied()
        .filter(|(name, _)| !name.is_empty())
        .collect();
    if ordered.is_empty() {
        return text.to_string();
    }
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(text.len());
    let mut pos = 0usize;
    while pos < text.len() {
        let rest = &text[pos..];
        if let Some((name, replacement)) = ordered.iter().find(|(name, _)| rest.starts_with(name)) {
            out.push_str(replacement);
            pos += name.len();
            continue;
        }
        let ch_len = rest.chars().next().map_or(1, char::len_utf8);
        out.push_str(&rest[..ch_len]);
        pos += ch_len;
    }
    out
}

/// Substitute every constant in `table` into `text`.
///
/// Running this twice is a no-op only when no constant name occurs inside
/// another constant's replacement text.
pub fn substitute_constants(text: &str, table: &ConstantTable) -> String {
    let pairs: Vec<(&str, &str)> = table.iter().collect();
    replace_literals(text, &pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> ConstantTable {
        let mut t = ConstantTable::new();
        for (k, v) in pairs {
            t.insert(*k, *v);
        }
        t
    }

    #[test]
    fn test_simple_substitution() {
        let t = table(&[("FOO", "42")]);
        assert_eq!(substitute_constants("value = FOO;", &t), "value = 42;");
    }

    #[test]
    fn test_matches_inside_identifiers() {
        let t = table(&[("kMax", "10")]);
        assert_eq!(substitute_constants("kMaxLength", &t), "10Length");
    }

    #[test]
    fn test_case_sensitive() {
        let t = table(&[("FOO", "1")]);
        assert_eq!(substitute_constants("foo FOO", &t), "foo 1");
    }

    #[test]
    fn test_no_cascade_within_a_pass() {
        let t = table(&[("A", "B"), ("B", "C")]);
        assert_eq!(substitute_constants("A B", &t), "B C");
    }

    #[test]
    fn test_longest_name_wins() {
        let t = table(&[("kFoo", "1"), ("kFooBar", "2")]);
        assert_eq!(substitute_constants("kFooBar kFoo", &t), "2 1");
    }

    #[test]
    fn test_idempotent_when_replacements_are_inert() {
        let t = table(&[("FOO", "42"), ("BAR", "'bar'")]);
        let once = substitute_constants("FOO + BAR", &t);
        assert_eq!(substitute_constants(&once, &t), once);
    }

    #[test]
    fn test_not_idempotent_when_replacement_contains_a_name() {
        let t = table(&[("A", "B"), ("B", "C")]);
        let once = substitute_constants("A", &t);
        let twice = substitute_constants(&once, &t);
        assert_eq!(once, "B");
        assert_eq!(twice, "C");
    }

    #[test]
    fn test_non_ascii_text_passes_through() {
        let t = table(&[("X", "y")]);
        assert_eq!(substitute_constants("é X ü", &t), "é y ü");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(substitute_constants("unchanged", &ConstantTable::new()), "unchanged");
    }
}
