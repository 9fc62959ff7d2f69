use pulldown_cmark::{Event, Options as CmarkOptions, Parser, Tag, TagEnd};

// renders `**bold**` and `*italic*` spans of a single line as html, everything else is
// escaped text. block-level syntax is never honored here: the dialect owns line structure.
pub fn render_inline_html(text: &str) -> String {
    let parser = Parser::new_ext(text, CmarkOptions::empty());

    let mut html = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph) => {}
            Event::Start(Tag::Strong) => html.push_str("<strong>"),
            Event::End(TagEnd::Strong) => html.push_str("</strong>"),
            Event::Start(Tag::Emphasis) => html.push_str("<em>"),
            Event::End(TagEnd::Emphasis) => html.push_str("</em>"),
            Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) => {
                push_escaped(&mut html, &t)
            }
            Event::Code(code) => {
                html.push('`');
                push_escaped(&mut html, &code);
                html.push('`');
            }
            Event::SoftBreak | Event::HardBreak => html.push(' '),
            // a line cmark reads as a list, quote, heading or rule is shown verbatim
            Event::Start(_) | Event::Rule => return escape_html(text),
            _ => {}
        }
    }
    html
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
