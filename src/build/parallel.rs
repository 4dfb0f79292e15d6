//! Parallel content.
//!
//! Authors write alternatives inline as `@{first||second||...}@`. Each match
//! becomes one `<span>` per variant, tagged `belbo_v<variant>-s<match>` so a
//! stylesheet can pick which variant of every snippet is visible.
//!
//! Everything is ASCII-delimited, so the scan runs over bytes: every offset
//! it yields is also a char boundary of the UTF-8 input.

const OPENER: &str = "@{";
const CLOSER: &str = "}@";
const SEPARATOR: &str = "||";
const CODE_OPEN: &str = "<code";
const CODE_CLOSE: &str = "</code>";

/// One `@{...}@` snippet found in the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaceable<'a> {
    /// Byte offset of the opener
    pub start: usize,
    /// Byte offset just past the closer (just past the opener if unclosed)
    pub end: usize,
    /// The snippet text, delimiters included
    pub original: &'a str,
    /// False for an opener without a closer
    pub closed: bool,
}

impl<'a> Replaceable<'a> {
    /// The text between the delimiters.
    pub fn inner(&self) -> &'a str {
        if self.closed {
            &self.original[OPENER.len()..self.original.len() - CLOSER.len()]
        } else {
            ""
        }
    }

    /// Variants in order of appearance.
    pub fn variants(&self) -> Vec<&'a str> {
        self.inner().split(SEPARATOR).collect()
    }
}

/// A byte range that is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    fn contains(&self, r: &Replaceable) -> bool {
        r.start >= self.start && r.end <= self.end
    }
}

/// Find every `@{` opener and the first `}@` after it.
///
/// Openers are not nesting-aware: an opener inside another snippet is a
/// snippet of its own, closing at the same closer.
pub fn find_replaceables(content: &str) -> Vec<Replaceable<'_>> {
    content
        .match_indices(OPENER)
        .map(|(start, _)| {
            let after_opener = start + OPENER.len();
            match content[after_opener..].find(CLOSER) {
                Some(offset) => {
                    let end = after_opener + offset + CLOSER.len();
                    Replaceable {
                        start,
                        end,
                        original: &content[start..end],
                        closed: true,
                    }
                }
                None => Replaceable {
                    start,
                    end: after_opener,
                    original: &content[start..after_opener],
                    closed: false,
                },
            }
        })
        .collect()
}

/// Ranges inside `<code ...>` ... `</code>` pairs.
///
/// A zone starts after the `>` closing the opening tag and ends at the next
/// `</code>`. Scanning stops at the first `<code` without a matching end.
pub fn exclusion_zones(content: &str) -> Vec<Location> {
    let mut zones = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = content[cursor..].find(CODE_OPEN) {
        let tag_start = cursor + offset;
        let Some(tag_len) = content[tag_start..].find('>') else {
            break;
        };
        let start = tag_start + tag_len + 1;
        let Some(close) = content[start..].find(CODE_CLOSE) else {
            break;
        };
        let end = start + close;

        zones.push(Location { start, end });
        cursor = end + CODE_CLOSE.len();
    }

    zones
}

/// Class prefix shared by every span of `variant`, in every snippet.
pub fn variant_prefix(variant: usize) -> String {
    format!("belbo_v{variant}-")
}

/// Class of the span holding `variant` of snippet number `snippet`.
pub fn span_class(variant: usize, snippet: usize) -> String {
    format!("{}s{snippet}", variant_prefix(variant))
}

/// Render a snippet's variants as spans. `index` is the 1-based match number.
fn to_spans(replaceable: &Replaceable, index: usize) -> String {
    replaceable
        .variants()
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            format!(
                r#"<span class="{}">{}</span>"#,
                span_class(i + 1, index),
                variant
            )
        })
        .collect()
}

/// Replace every parallel-content snippet outside code zones with spans.
///
/// Match numbers count every snippet found, including the ones left alone,
/// so numbering does not shift when a snippet moves into a code block. A
/// snippet overlapping one already replaced is kept as text.
pub fn rewrite(content: &str) -> String {
    let replaceables = find_replaceables(content);
    if replaceables.is_empty() {
        return content.to_string();
    }
    let zones = exclusion_zones(content);

    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;

    for (i, replaceable) in replaceables.iter().enumerate() {
        if !replaceable.closed
            || replaceable.start < cursor
            || zones.iter().any(|zone| zone.contains(replaceable))
        {
            continue;
        }

        output.push_str(&content[cursor..replaceable.start]);
        output.push_str(&to_spans(replaceable, i + 1));
        cursor = replaceable.end;
    }

    output.push_str(&content[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_single() {
        assert_eq!(
            rewrite("Hello @{there||here}@!"),
            r#"Hello <span class="belbo_v1-s1">there</span><span class="belbo_v2-s1">here</span>!"#
        );
    }

    #[test]
    fn test_rewrite_numbers_matches() {
        let input = "Hello @{there||here}@! It was nice to @{meet||see}@ you.";
        let expected = concat!(
            r#"Hello <span class="belbo_v1-s1">there</span><span class="belbo_v2-s1">here</span>! "#,
            r#"It was nice to <span class="belbo_v1-s2">meet</span><span class="belbo_v2-s2">see</span> you."#
        );
        assert_eq!(rewrite(input), expected);
    }

    #[test]
    fn test_rewrite_skips_code() {
        let input = r#"<p>Some <code class="foo">@{hi||bye}@</code></p><pre><code> @{hey||you}@ </code></pre>"#;
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_rewrite_numbering_counts_skipped_matches() {
        let input = "<code>@{a||b}@</code> @{c||d}@";
        assert_eq!(
            rewrite(input),
            r#"<code>@{a||b}@</code> <span class="belbo_v1-s2">c</span><span class="belbo_v2-s2">d</span>"#
        );
    }

    #[test]
    fn test_rewrite_identical_snippets_use_their_own_offsets() {
        let input = "<code>@{x||y}@</code> @{x||y}@";
        assert_eq!(
            rewrite(input),
            r#"<code>@{x||y}@</code> <span class="belbo_v1-s2">x</span><span class="belbo_v2-s2">y</span>"#
        );

        let input = "@{x}@ and @{x}@";
        assert_eq!(
            rewrite(input),
            r#"<span class="belbo_v1-s1">x</span> and <span class="belbo_v1-s2">x</span>"#
        );
    }

    #[test]
    fn test_rewrite_unmatched_opener_is_literal() {
        assert_eq!(rewrite("price: @{ unfinished"), "price: @{ unfinished");
        assert_eq!(rewrite("ends with @"), "ends with @");
        assert_eq!(rewrite("}@ @"), "}@ @");
    }

    #[test]
    fn test_rewrite_unmatched_opener_takes_a_number() {
        // the second opener finds no closer but still counts
        let input = "@{a||b}@ @{ @";
        assert_eq!(
            rewrite(input),
            r#"<span class="belbo_v1-s1">a</span><span class="belbo_v2-s1">b</span> @{ @"#
        );
    }

    #[test]
    fn test_rewrite_not_nesting_aware() {
        let input = "@{a @{b}@ c";
        assert_eq!(
            rewrite(input),
            r#"<span class="belbo_v1-s1">a @{b</span> c"#
        );
    }

    #[test]
    fn test_rewrite_multibyte_text() {
        assert_eq!(
            rewrite("Wörld @{grüß||ciào}@ ✓"),
            r#"Wörld <span class="belbo_v1-s1">grüß</span><span class="belbo_v2-s1">ciào</span> ✓"#
        );
    }

    #[test]
    fn test_rewrite_after_unmatched_code_tag() {
        // no zone is recorded once a <code> is never closed
        let input = "<code>open @{a||b}@";
        assert_eq!(
            rewrite(input),
            r#"<code>open <span class="belbo_v1-s1">a</span><span class="belbo_v2-s1">b</span>"#
        );
    }

    #[test]
    fn test_find_replaceables() {
        let found = find_replaceables("x @{a||b}@ y @{c");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start, 2);
        assert_eq!(found[0].end, 10);
        assert_eq!(found[0].original, "@{a||b}@");
        assert_eq!(found[0].variants(), vec!["a", "b"]);
        assert!(!found[1].closed);
        assert_eq!(found[1].original, "@{");
    }

    #[test]
    fn test_exclusion_zones() {
        let content = r#"a <code class="x">one</code> b <code>two</code> <code>never closed"#;
        let zones = exclusion_zones(content);

        assert_eq!(zones.len(), 2);
        assert_eq!(&content[zones[0].start..zones[0].end], "one");
        assert_eq!(&content[zones[1].start..zones[1].end], "two");
    }
}
