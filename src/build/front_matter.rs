//! Front matter extraction.
//!
//! A front matter block is a TOML document surrounded by separator lines
//! (`---` by default) at the top of a content file:
//!
//! ```markdown
//! ---
//! title = "Hello"
//! layout = "post"
//! ---
//!
//! # Content starts here
//! ```

use crate::config::Config;

/// Raw text of a file, split at its separator lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitContent {
    /// Lines found between separator pairs (separators dropped)
    pub front_matter: String,
    /// Every other line, byte-identical and in order
    pub content: String,
}

/// Split `text` into front matter and content.
///
/// A line equal to `separator` (ignoring its line terminator) toggles between
/// front matter and content and is dropped. A block that is still open when
/// the input ends was never front matter: its lines go back to the content.
pub fn split_front_matter(text: &str, separator: &str) -> SplitContent {
    let mut front_matter = String::new();
    let mut content = String::new();
    // Lines of the block opened by the last separator
    let mut open_block = String::new();
    let mut inside = false;

    for line in text.split_inclusive('\n') {
        let bare = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);

        if bare == separator {
            if inside {
                front_matter.push_str(&open_block);
                open_block.clear();
            }
            inside = !inside;
            continue;
        }

        if inside {
            open_block.push_str(line);
        } else {
            content.push_str(line);
        }
    }

    // Nothing can follow an unterminated block, so appending keeps the order
    content.push_str(&open_block);

    SplitContent {
        front_matter,
        content,
    }
}

/// Result of parsing front matter from a content file.
#[derive(Debug)]
pub struct ParsedContent {
    /// The decoded front matter (empty if none found)
    pub front_matter: Config,
    /// The content without the front matter block
    pub content: String,
}

/// Split `text` and decode its front matter as TOML.
pub fn parse_front_matter(text: &str, separator: &str) -> Result<ParsedContent, toml::de::Error> {
    let split = split_front_matter(text, separator);
    let front_matter = Config::from_toml(&split.front_matter)?;

    Ok(ParsedContent {
        front_matter,
        content: split.content,
    })
}
