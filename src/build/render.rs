//! Template composition.
//!
//! Every page gets its own Tera instance holding the page's layout, the
//! configured partials, and the page content wrapped as a child template:
//!
//! ```text
//! <layout>.html          the layout named by the page's `layout` key
//! partials/<name>.html   one per configured partial
//! __content__.html       {% extends "<layout>.html" %}{% block content %}...{% endblock content %}
//! ```
//!
//! Layouts place the page content with `{% block content %}{% endblock content %}`.
//!
//! Content can use `{{ }}` and `{% %}` like any template. `{#` in content is
//! plain text, and `<code>` elements are emitted as they are.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera};

use crate::build::functions::FunctionRegistry;
use crate::build::page::Page;
use crate::build::parallel::exclusion_zones;
use crate::config::Config;

/// Name the content template is registered under.
const CONTENT_TEMPLATE: &str = "__content__.html";
/// Name of the layout used when a page names none.
const DEFAULT_LAYOUT: &str = "__default_layout__.html";
/// A layout that renders the content and nothing else.
const DEFAULT_LAYOUT_SOURCE: &str = "{% block content %}{% endblock content %}";

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to render {page}: {}", describe(.source))]
    Template {
        page: String,
        #[source]
        source: tera::Error,
    },

    #[error("layout '{name}' not found (looked for {})", .path.display())]
    LayoutNotFound { name: String, path: PathBuf },

    #[error("partial '{name}' not found (looked for {})", .path.display())]
    PartialNotFound { name: String, path: PathBuf },

    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Tera nests the useful part of an error in its sources.
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    message
}

// =============================================================================
// Template data
// =============================================================================

/// What templates see of a page.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub name: &'a str,
    pub relative_path: &'a str,
    pub created_at: Option<NaiveDate>,
    pub build_path: &'a [String],
    pub config: &'a Config,
}

impl<'a> From<&'a Page> for PageInfo<'a> {
    fn from(page: &'a Page) -> Self {
        Self {
            title: &page.title,
            url: &page.url,
            name: &page.name,
            relative_path: &page.relative_path,
            created_at: page.created_at,
            build_path: &page.build_path,
            config: &page.config,
        }
    }
}

/// The context a page is rendered with.
#[derive(Debug, Serialize)]
struct PageContext<'a> {
    page: &'a PageInfo<'a>,
    all_pages: &'a [PageInfo<'a>],
    config: &'a Config,
}

/// A named template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub source: String,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

// =============================================================================
// Composer
// =============================================================================

/// Layouts, partials and functions shared by every page of a build.
#[derive(Debug)]
pub struct Composer {
    templates_dir: PathBuf,
    layouts: HashMap<String, String>,
    partials: Vec<TemplateSource>,
    functions: FunctionRegistry,
}

impl Composer {
    /// Read the layouts in `templates_dir` and the named partials below
    /// `templates_dir/partials`.
    ///
    /// A missing templates directory means no layouts; a missing partial is
    /// an error.
    pub fn load(
        templates_dir: &Path,
        partial_names: &[String],
        functions: FunctionRegistry,
    ) -> Result<Self, RenderError> {
        let layouts = read_layouts(templates_dir)?;

        let partials = partial_names
            .iter()
            .map(|name| {
                let path = templates_dir.join("partials").join(format!("{name}.html"));
                if !path.is_file() {
                    return Err(RenderError::PartialNotFound {
                        name: name.clone(),
                        path,
                    });
                }
                let source = fs::read_to_string(&path)
                    .map_err(|source| RenderError::Io { path, source })?;
                Ok(TemplateSource::new(format!("partials/{name}.html"), source))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "loaded {} layout(s) and {} partial(s) from {}",
            layouts.len(),
            partials.len(),
            templates_dir.display()
        );

        Ok(Self {
            templates_dir: templates_dir.to_path_buf(),
            layouts,
            partials,
            functions,
        })
    }

    /// Render a page: its layout, the partials and `content_html` as the
    /// layout's `content` block.
    pub fn compose(
        &self,
        page: &Page,
        all_pages: &[PageInfo],
        content_html: &str,
    ) -> Result<String, RenderError> {
        let layout = match page.layout() {
            Some(name) => {
                let source =
                    self.layouts
                        .get(name)
                        .ok_or_else(|| RenderError::LayoutNotFound {
                            name: name.to_string(),
                            path: self.templates_dir.join(format!("{name}.html")),
                        })?;
                Some(TemplateSource::new(format!("{name}.html"), source.as_str()))
            }
            None => None,
        };

        let info = PageInfo::from(page);
        let context = Context::from_serialize(PageContext {
            page: &info,
            all_pages,
            config: &page.config,
        })
        .map_err(|source| RenderError::Template {
            page: page.relative_path.clone(),
            source,
        })?;

        compose_template(
            layout.as_ref(),
            &self.partials,
            content_html,
            &self.functions,
            &context,
        )
        .map_err(|source| RenderError::Template {
            page: page.relative_path.clone(),
            source,
        })
    }
}

/// Build one template set and render its content template.
pub fn compose_template(
    layout: Option<&TemplateSource>,
    partials: &[TemplateSource],
    content_html: &str,
    functions: &FunctionRegistry,
    context: &Context,
) -> tera::Result<String> {
    let mut tera = Tera::default();
    functions.install(&mut tera);

    let (layout_name, layout_source) = match layout {
        Some(layout) => (layout.name.as_str(), layout.source.as_str()),
        None => (DEFAULT_LAYOUT, DEFAULT_LAYOUT_SOURCE),
    };
    let content = format!(
        "{{% extends \"{layout_name}\" %}}{{% block content %}}{}{{% endblock content %}}",
        content_source(content_html)
    );

    let mut templates = vec![(layout_name, layout_source)];
    templates.extend(
        partials
            .iter()
            .map(|p| (p.name.as_str(), p.source.as_str())),
    );
    // Added last so it always fills the slot the layout defines
    templates.push((CONTENT_TEMPLATE, content.as_str()));

    tera.add_raw_templates(templates)?;
    tera.render(CONTENT_TEMPLATE, context)
}

/// Template source for page content: code zones are wrapped in `raw`
/// blocks and every other `{#` is printed instead of opening a comment.
fn content_source(html: &str) -> String {
    let literal_comments = |text: &str| text.replace("{#", r#"{{ "{#" }}"#);

    let mut source = String::with_capacity(html.len());
    let mut cursor = 0;
    for zone in exclusion_zones(html) {
        source.push_str(&literal_comments(&html[cursor..zone.start]));
        source.push_str("{% raw %}");
        source.push_str(&html[zone.start..zone.end]);
        source.push_str("{% endraw %}");
        cursor = zone.end;
    }
    source.push_str(&literal_comments(&html[cursor..]));
    source
}

/// Top-level `*.html` files of `dir`, keyed by file stem.
fn read_layouts(dir: &Path) -> Result<HashMap<String, String>, RenderError> {
    let mut layouts = HashMap::new();
    if !dir.is_dir() {
        tracing::debug!("no templates directory at {}", dir.display());
        return Ok(layouts);
    }

    let entries = fs::read_dir(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let path = entry
            .map_err(|source| RenderError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let source = fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        layouts.insert(stem.to_string(), source);
    }

    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::page::PageParser;
    use crate::build::paths::PathResolver;

    fn page(relative_path: &str, text: &str) -> Page {
        PageParser::new(Config::new(), PathResolver::new("public"), "---")
            .parse(relative_path, text)
            .unwrap()
    }

    impl Composer {
        fn new(functions: FunctionRegistry) -> Self {
            Self {
                templates_dir: PathBuf::new(),
                layouts: HashMap::new(),
                partials: Vec::new(),
                functions,
            }
        }

        fn with_layout(mut self, name: &str, source: &str) -> Self {
            self.layouts.insert(name.to_string(), source.to_string());
            self
        }

        fn with_partial(mut self, name: &str, source: &str) -> Self {
            self.partials
                .push(TemplateSource::new(format!("partials/{name}.html"), source));
            self
        }
    }

    fn compose(composer: &Composer, page: &Page, content: &str) -> Result<String, RenderError> {
        let infos = [PageInfo::from(page)];
        composer.compose(page, &infos, content)
    }

    #[test]
    fn test_compose_without_layout_is_content() {
        let output = compose_template(
            None,
            &[],
            "<p>x</p>",
            &FunctionRegistry::new(),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(output, "<p>x</p>");
    }

    #[test]
    fn test_compose_layout_and_partials() {
        let composer = Composer::new(FunctionRegistry::with_builtins())
            .with_layout(
                "post",
                r#"{% include "partials/header.html" %}<main>{% block content %}{% endblock content %}</main>"#,
            )
            .with_partial("header", "<h1>{{ page.title }}</h1>");
        let page = page(
            "posts/2020-09-03-hello.md",
            "---\nlayout = \"post\"\ntitle = \"Hi\"\n---\n",
        );

        let output = compose(&composer, &page, "<p>body</p>").unwrap();

        assert_eq!(output, "<h1>Hi</h1><main><p>body</p></main>");
    }

    #[test]
    fn test_compose_page_data() {
        let composer = Composer::new(FunctionRegistry::with_builtins()).with_layout(
            "post",
            "{{ page.created_at | simple_date }} {{ page.relative_path }} {{ config.author }} {{ page.config.layout }}",
        );
        let page = page(
            "2021-01-02-notes.md",
            "---\nlayout = \"post\"\nauthor = \"mo\"\n---\n",
        );

        let output = compose(&composer, &page, "").unwrap();

        assert_eq!(output, "2021-01-02 2021-01-02-notes.md mo post");
    }

    #[test]
    fn test_compose_content_sees_context() {
        let composer = Composer::new(FunctionRegistry::new());
        let page = page("about.md", "---\ntitle = \"About us\"\n---\n");

        let output = compose(&composer, &page, "<h1>{{ page.title }}</h1>").unwrap();

        assert_eq!(output, "<h1>About us</h1>");
    }

    #[test]
    fn test_compose_content_comment_marker_is_text() {
        let composer = Composer::new(FunctionRegistry::new());
        let page = page("about.md", "---\ntitle = \"About\"\n---\n");

        let output = compose(
            &composer,
            &page,
            "<h1>{{ page.title }} {#intro}</h1>\n<pre><code>{{ page.title }} {% if x %} {# note #}\n</code></pre>",
        )
        .unwrap();

        assert_eq!(
            output,
            "<h1>About {#intro}</h1>\n<pre><code>{{ page.title }} {% if x %} {# note #}\n</code></pre>"
        );
    }

    #[test]
    fn test_content_source() {
        assert_eq!(content_source("<p>plain</p>"), "<p>plain</p>");
        assert_eq!(
            content_source("a {# b <code class=\"x\">{#</code>"),
            r#"a {{ "{#" }} b <code class="x">{% raw %}{#{% endraw %}</code>"#
        );
    }

    #[test]
    fn test_compose_missing_layout() {
        let composer = Composer::new(FunctionRegistry::new());
        let page = page("about.md", "---\nlayout = \"nope\"\n---\n");

        let err = compose(&composer, &page, "").unwrap_err();

        assert!(matches!(err, RenderError::LayoutNotFound { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_compose_template_error_names_page() {
        let composer = Composer::new(FunctionRegistry::new())
            .with_layout("broken", "{% block content %}{% endblock content %}{{ missing_var }}");
        let page = page("about.md", "---\nlayout = \"broken\"\n---\n");

        let err = compose(&composer, &page, "").unwrap_err();

        assert!(matches!(err, RenderError::Template { .. }));
        assert!(err.to_string().contains("about.md"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(
            dir.path().join("post.html"),
            r#"<body>{% include "partials/footer.html" %}{% block content %}{% endblock content %}</body>"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("partials/footer.html"), "<footer></footer>").unwrap();

        let composer = Composer::load(
            dir.path(),
            &["footer".to_string()],
            FunctionRegistry::new(),
        )
        .unwrap();
        let page = page("about.md", "---\nlayout = \"post\"\n---\n");

        assert_eq!(composer.layouts.len(), 1);
        assert_eq!(
            compose(&composer, &page, "<p>x</p>").unwrap(),
            "<body><footer></footer><p>x</p></body>"
        );
    }

    #[test]
    fn test_load_missing_partial() {
        let dir = tempfile::tempdir().unwrap();

        let err = Composer::load(dir.path(), &["header".to_string()], FunctionRegistry::new())
            .unwrap_err();

        assert!(matches!(err, RenderError::PartialNotFound { ref name, .. } if name == "header"));
    }

    #[test]
    fn test_load_missing_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let composer =
            Composer::load(&dir.path().join("nothing"), &[], FunctionRegistry::new()).unwrap();

        assert!(composer.layouts.is_empty());
    }
}
