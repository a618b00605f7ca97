//! Article body rendering.
//!
//! Articles are written in Markdown in the admin console and stored by the
//! backend. Raw HTML in the source is escaped rather than passed through.

use comrak::{Options, markdown_to_html};

/// Average reading speed used for the "N min read" hint.
const WORDS_PER_MINUTE: usize = 200;

/// Render GitHub-flavoured Markdown to HTML.
#[must_use]
pub fn render(content: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;
    options.render.escape = true;

    markdown_to_html(content, &options)
}

/// Estimated reading time in whole minutes, never less than one.
#[must_use]
pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_gfm() {
        let html = render("## Notes\n\n~~old~~ new\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("id=\"notes\""));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
    }
}
