use comrak::{markdown_to_html, Options};
use domain::ports::{ContentFormatter, FormatError};

pub const MARKDOWN: &str = "markdown";
pub const TEXT: &str = "text";
pub const RAW_HTML: &str = "rawhtml";

/// Renders raw post content into HTML according to the post's formatter id.
pub struct FormatterPool {
    markdown: Options<'static>,
}

impl FormatterPool {
    pub fn new() -> Self {
        let mut markdown = Options::default();
        markdown.extension.strikethrough = true;
        markdown.extension.table = true;
        markdown.extension.autolink = true;
        markdown.extension.tasklist = true;
        Self { markdown }
    }
}

impl Default for FormatterPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFormatter for FormatterPool {
    fn render(&self, formatter_id: &str, raw_content: &str) -> Result<String, FormatError> {
        match formatter_id {
            MARKDOWN => Ok(markdown_to_html(raw_content, &self.markdown)),
            TEXT => Ok(text_to_html(raw_content)),
            RAW_HTML => Ok(raw_content.to_string()),
            other => Err(FormatError::UnknownFormatter(other.to_string())),
        }
    }

    fn formatter_ids(&self) -> Vec<String> {
        [MARKDOWN, TEXT, RAW_HTML]
            .iter()
            .map(|id| id.to_string())
            .collect()
    }
}

fn text_to_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br />\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown() {
        let pool = FormatterPool::new();
        let html = pool.render(MARKDOWN, "# Title\n\n~~old~~ *new*").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("<em>new</em>"));
    }

    #[test]
    fn markdown_does_not_pass_raw_html_through() {
        let pool = FormatterPool::new();
        let html = pool.render(MARKDOWN, "<script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn text_is_escaped_with_line_breaks() {
        let pool = FormatterPool::new();
        let html = pool.render(TEXT, "a < b\r\n\"c\"").unwrap();
        assert_eq!(html, "a &lt; b<br />\n&quot;c&quot;");
    }

    #[test]
    fn raw_html_passes_through() {
        let pool = FormatterPool::new();
        assert_eq!(pool.render(RAW_HTML, "<b>x</b>").unwrap(), "<b>x</b>");
    }

    #[test]
    fn unknown_formatter_is_an_error() {
        let pool = FormatterPool::new();
        assert_eq!(
            pool.render("bbcode", "[b]x[/b]"),
            Err(FormatError::UnknownFormatter("bbcode".into()))
        );
        assert_eq!(pool.formatter_ids(), vec!["markdown", "text", "rawhtml"]);
    }
}
