//! Verification message content.
//!
//! Fixed-language templates; both a plain-text and an HTML rendering are
//! produced for every message.

pub(crate) const SUBJECT: &str = "Your verification code";

pub(crate) fn text_body(username: &str, code: &str) -> String {
    format!(
        "Hi {username},\n\n\
         Your verification code is: {code}\n\n\
         Enter it within the next 15 minutes to confirm your address.\n\
         If you did not request this code, you can ignore this message.\n"
    )
}

pub(crate) fn html_body(username: &str, code: &str) -> String {
    let username = escape_html(username);
    let code = escape_html(code);

    format!(
        "<html><body>\
         <p>Hi {username},</p>\
         <p>Your verification code is: <strong style=\"font-size:1.4em\">{code}</strong></p>\
         <p>Enter it within the next 15 minutes to confirm your address.<br>\
         If you did not request this code, you can ignore this message.</p>\
         </body></html>"
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
