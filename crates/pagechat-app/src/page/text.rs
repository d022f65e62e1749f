use std::sync::OnceLock;

use regex::Regex;

fn hidden_elements() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->")
            .expect("valid regex")
    })
}

fn block_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)</?(p|div|br|li|ul|ol|tr|h[1-6]|section|article|header|footer|blockquote|pre)\b[^>]*>")
            .expect("valid regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn spaces() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"))
}

/// Rough readable text from an HTML document: scripts and styles dropped,
/// block elements on their own lines, blank lines removed.
pub fn html_to_text(html: &str) -> String {
    let text = hidden_elements().replace_all(html, " ");
    let text = block_tags().replace_all(&text, "\n");
    let text = any_tag().replace_all(&text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| spaces().replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        // Last, so `&amp;lt;` stays `&lt;`
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup() {
        let html = "<html><head><title>T</title><style>p { color: red }</style></head>\
                    <body><h1>Rust</h1><p>A <b>systems</b> language.</p>\
                    <script>alert('x')</script></body></html>";
        assert_eq!(html_to_text(html), "T\nRust\nA systems language.");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(
            html_to_text("<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"),
            "1 < 2 && 3 > 2"
        );
        assert_eq!(html_to_text("a &amp;lt; b"), "a &lt; b");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(html_to_text("<div>  one \t two  </div>\n\n\n<div>three</div>"), "one two\nthree");
    }

    #[test]
    fn drops_comments() {
        assert_eq!(html_to_text("before<!-- <p>hidden</p> -->after"), "before after");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(html_to_text("just words"), "just words");
    }
}
