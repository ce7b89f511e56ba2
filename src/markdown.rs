use pulldown_cmark::{html, Options, Parser};

/// Converts a markdown post body to HTML, appending the result to `w`. Raw
/// HTML in the body is passed through untouched.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(w, Parser::new_ext(markdown, options));
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(markdown: &str) -> String {
        let mut out = String::new();
        to_html(&mut out, markdown);
        out
    }

    #[test]
    fn test_headings_and_paragraphs() {
        assert_eq!(
            "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n",
            render("# Title\n\nSome *text*.")
        );
    }

    #[test]
    fn test_inline_html_is_not_escaped() {
        assert!(render("<div class=\"x\">raw</div>\n").contains("<div class=\"x\">raw</div>"));
    }

    #[test]
    fn test_tables() {
        assert!(render("| a | b |\n|---|---|\n| 1 | 2 |\n").contains("<table>"));
    }
}
