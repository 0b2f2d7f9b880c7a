//! HTML pages, rendered from plain format strings.
//!
//! Presentation only; nothing here touches tokens or state.

use crate::crm::Contact;

const STYLE: &str = "<style>\
    body { font-family: sans-serif; margin: 10px; padding: 10px; \
           background-color: #f0f0f0; display: flex; justify-content: center; \
           align-items: center; height: 100vh; }\
    .content { text-align: center; }\
    h2 { color: #333; }\
    p { color: #666; }\
    .install-btn { background-color: #4CAF50; border: none; color: white; \
                   padding: 15px 32px; text-align: center; text-decoration: none; \
                   display: inline-block; font-size: 16px; margin: 4px 2px; }\
</style>";

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">{STYLE}</head>\
         <body><div class=\"content\">{body}</div></body></html>"
    )
}

/// Landing page for a session that has not installed the app yet.
pub fn install_prompt() -> String {
    page(
        "<h2>OAuth 2.0 quickstart</h2>\
         <p>Install the app to let it read a sample contact from your CRM account.</p>\
         <a href=\"/install\" class=\"install-btn\">Install the app</a>",
    )
}

/// Landing page for an authorized session: the sample contact, or the
/// failure that stood in its way.
pub fn authorized_home(contact: &Result<Contact, String>) -> String {
    let detail = match contact {
        Ok(contact) => format!(
            "<p>Here's a sample contact from the account: <b>{}</b></p>",
            escape(&contact.display_name())
        ),
        Err(message) => format!(
            "<p>Unable to retrieve a contact. Error message: {}</p>",
            escape(message)
        ),
    };
    page(&format!(
        "<h2>Congratulations! You just installed the app.</h2>{detail}"
    ))
}

/// Standalone error page echoing a message from the query string.
pub fn error_page(msg: &str) -> String {
    page(&format!("<h4>Error: {}</h4>", escape(msg)))
}

/// Minimal HTML escaping for text interpolated into pages.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
