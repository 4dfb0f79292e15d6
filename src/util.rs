//! Shared utility functions.

/// Turn a page name into a display title.
///
/// Splits on `-` and `_` and capitalizes each word; empty words are dropped.
/// "hello-world" -> "Hello World"
/// "release_notes" -> "Release Notes"
pub fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("hello"), "Hello");
        assert_eq!(title_case("hello-world"), "Hello World");
        assert_eq!(title_case("release_notes"), "Release Notes");
        assert_eq!(title_case("index"), "Index");
        assert_eq!(title_case("README"), "README");
        assert_eq!(title_case("v1.2-notes"), "V1.2 Notes");
        assert_eq!(title_case("trailing--dash-"), "Trailing Dash");
    }
}
