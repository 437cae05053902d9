//! Placeholder substitution for email templates

use super::types::{Address, MessageSpec, RenderContext, Template};

/// Substitute `{{key}}` and `{key}` placeholders in `content`.
///
/// Keys are applied in the context's insertion order, double-brace form
/// first. Matching is literal, so `{{names}}` is untouched by a `name`
/// key. Placeholders without a matching key are left as they are.
/// Each key is applied once; placeholders inside substituted values are
/// only replaced if a later key matches them.
pub fn render(content: &str, data: &RenderContext) -> String {
    let mut result = content.to_string();

    for (key, value) in data.iter() {
        let replacement = value.as_replacement();
        let double = format!("{{{{{}}}}}", key);
        let single = format!("{{{}}}", key);

        result = result.replace(&double, &replacement);
        result = result.replace(&single, &replacement);
    }

    result
}

/// Render a fetched template into a message for the mail system.
///
/// Sender and reply-to fields are passed through unrendered.
pub fn build_message(template: &Template, data: &RenderContext) -> MessageSpec {
    let from = template.from_email().map(|email| Address {
        email: email.to_string(),
        name: template.from_name().map(str::to_string),
    });

    MessageSpec {
        subject: template.subject().map(|subject| render(subject, data)),
        from,
        reply_to: template.reply_to().map(str::to_string),
        html: render(template.html(), data),
        text: template.text().map(|text| render(text, data)),
    }
}
