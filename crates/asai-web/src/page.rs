//! Full-page HTML.

use asai_agent::escape_html;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:760px;margin:2rem auto;padding:0 1rem;background:#faf8f5;color:#2b2b2b}\
header h1{font-weight:600;margin-bottom:.25rem}\
.welcome{background:#fff;border-left:4px solid #b08d57;padding:.75rem 1rem;margin:1rem 0}\
form{display:flex;gap:.5rem;margin:1rem 0}\
textarea{flex:1;min-height:3rem;padding:.5rem;font:inherit}\
button{padding:.5rem 1.25rem;font:inherit;cursor:pointer}\
.message{padding:.5rem 1rem;margin:.5rem 0;border-radius:8px}\
.message.user{background:#e8f0fe;margin-left:3rem}\
.message.ai{background:#fff;margin-right:3rem}\
.message.render{border:1px dashed #b08d57;font-style:italic}\
.render-image{max-width:100%;border-radius:6px}\
.error{background:#fdecea;border-left:4px solid #c0392b;padding:.75rem 1rem}";

/// The chat page: welcome message, input form, then the rendered history.
pub(crate) fn chat_page(welcome_message: &str, history_html: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>Asai</title>\n\
<style>{STYLE}</style>\n\
</head>\n\
<body>\n\
<header><h1>Asai</h1></header>\n\
<div class=\"welcome\"><p>{welcome}</p></div>\n\
<form method=\"post\" action=\"/send\">\n\
<textarea name=\"user_input\" placeholder=\"Describe your space...\" required autofocus></textarea>\n\
<button type=\"submit\">Send</button>\n\
</form>\n\
<div id=\"chat-history\">{history_html}</div>\n\
</body>\n\
</html>\n",
        welcome = escape_html(welcome_message).replace('\n', "<br>"),
    )
}

/// Page shown when the model call fails.
pub(crate) fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<title>Asai: error</title>\n\
<style>{STYLE}</style>\n\
</head>\n\
<body>\n\
<header><h1>Asai</h1></header>\n\
<div class=\"error\"><p>The design assistant could not answer: {message}</p>\
<p>Your conversation was kept. <a href=\"/\">Start over</a> or go back and resend.</p></div>\n\
</body>\n\
</html>\n",
        message = escape_html(message),
    )
}
