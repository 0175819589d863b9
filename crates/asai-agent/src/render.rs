//! Conversation → HTML fragment.
//!
//! Newest turn first. Every turn becomes
//! `<div class="message {user|ai}"><p>…</p></div>` with its text escaped and
//! line breaks turned into `<br>`. Turn text is never trusted as markup;
//! render turns get their extra class and `<img>` from here instead.

use asai_core::types::{Conversation, Role, Turn};

/// Escape text for use in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
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
    out
}

/// Escape and convert `\r\n` / `\n` to `<br>`.
fn text_to_html(text: &str) -> String {
    escape_html(text).replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Only web and inline image URLs may reach an `src` attribute.
fn is_safe_image_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("data:image/")
}

fn render_turn(turn: &Turn, out: &mut String) {
    let class = match turn.role {
        Role::User => "user",
        Role::Model => "ai",
    };

    out.push_str("<div class=\"message ");
    out.push_str(class);
    if turn.synthesized {
        out.push_str(" render");
    }
    out.push_str("\"><p>");
    out.push_str(&text_to_html(&turn.text));
    out.push_str("</p>");

    if let Some(url) = turn.image_url.as_deref().filter(|u| is_safe_image_url(u)) {
        out.push_str("<img class=\"render-image\" src=\"");
        out.push_str(&escape_html(url));
        out.push_str("\" alt=\"Render\">");
    }

    out.push_str("</div>");
}

/// Render a conversation, newest turn first. Empty input yields `""`.
pub fn render_conversation(conversation: &Conversation) -> String {
    let mut out = String::new();
    for turn in conversation.iter().rev() {
        render_turn(turn, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_conversation() {
        assert_eq!(render_conversation(&Conversation::new()), "");
    }

    #[test]
    fn test_newest_first() {
        let conversation = Conversation::from(vec![Turn::user("hi"), Turn::model("hello")]);
        assert_eq!(
            render_conversation(&conversation),
            "<div class=\"message ai\"><p>hello</p></div>\
             <div class=\"message user\"><p>hi</p></div>"
        );
    }

    #[test]
    fn test_line_breaks() {
        let conversation = Conversation::from(vec![Turn::model("uno\ndos\r\ntres")]);
        assert_eq!(
            render_conversation(&conversation),
            "<div class=\"message ai\"><p>uno<br>dos<br>tres</p></div>"
        );
    }

    #[test]
    fn test_text_is_escaped_once() {
        let conversation = Conversation::from(vec![Turn::user("<script>alert('x')</script> & \"q\"")]);
        let html = render_conversation(&conversation);
        assert!(html.contains(
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;q&quot;"
        ));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn test_render_turn_gets_class() {
        let conversation = Conversation::from(vec![Turn::synthesized("[Simulated render]")]);
        let html = render_conversation(&conversation);
        assert!(html.starts_with("<div class=\"message ai render\">"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_render_turn_with_image() {
        let turn = Turn::synthesized("prompt").with_image("https://img.example.com/a.png?x=1&y=2");
        let html = render_conversation(&Conversation::from(vec![turn]));
        assert!(html.contains(
            "<img class=\"render-image\" src=\"https://img.example.com/a.png?x=1&amp;y=2\" alt=\"Render\">"
        ));
    }

    #[test]
    fn test_unsafe_image_url_dropped() {
        let turn = Turn::synthesized("prompt").with_image("javascript:alert(1)");
        let html = render_conversation(&Conversation::from(vec![turn]));
        assert!(!html.contains("<img"));
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn test_data_image_url_allowed() {
        let turn = Turn::synthesized("prompt").with_image("data:image/png;base64,AAAA");
        let html = render_conversation(&Conversation::from(vec![turn]));
        assert!(html.contains("src=\"data:image/png;base64,AAAA\""));
    }
}
