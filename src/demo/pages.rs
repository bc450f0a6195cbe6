//! Markup for the demo routes.
//!
//! The name list contains two injection payloads and is rendered without
//! escaping on purpose: the point of every page is to show which of them the
//! route's policy lets through.

/// Names shown on the list pages.
pub const NAMES: [&str; 3] = [
    "John",
    r#"Annie<img src="none" onerror="console.warn('evil 1')">"#,
    "Philippe<script>console.warn('evil 2')</script>",
];

/// Served at `/js/count.js`.
pub const COUNT_JS: &str = "function showCount() {
  var count = document.querySelectorAll('#names li').length;
  document.getElementById('count').textContent = count + ' names';
}
document.addEventListener('DOMContentLoaded', showCount);
";

/// Body of the inline counting script on `/hashes` and `/nonces`.
pub const COUNT_INLINE_SCRIPT: &str =
    "document.getElementById('count').textContent = document.querySelectorAll('#names li').length + ' names';";

/// Inline event handler on `/inlinehashes`.
pub const COUNT_HANDLER: &str = "showCount()";

/// Body of the inline script on the Twitter pages.
pub const TWITTER_INLINE_SCRIPT: &str =
    "document.getElementById('greeting').textContent = DOMPurify.sanitize('Hello from an inline script');";

pub const PURIFY_URL: &str = "https://cdn.jsdelivr.net/npm/dompurify@3.0.6/dist/purify.min.js";
pub const TWITTER_WIDGETS_URL: &str = "https://platform.twitter.com/widgets.js";

pub const WELCOME: &str = "Welcome to this CSP demo. Try one of the demo endpoints.";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        title, title, body
    )
}

fn name_list() -> String {
    let items: String = NAMES.iter().map(|n| format!("<li>{}</li>", n)).collect();
    format!("<ul id=\"names\">{}</ul>", items)
}

fn nonce_attr(nonce: Option<&str>) -> String {
    nonce.map(|n| format!(" nonce=\"{}\"", n)).unwrap_or_default()
}

pub fn list_names() -> String {
    layout("Names", &name_list())
}

pub fn list_names_with_count() -> String {
    let body = format!(
        "{}\n<p id=\"count\"></p>\n<script>{}</script>",
        name_list(),
        COUNT_INLINE_SCRIPT
    );
    layout("Names with count", &body)
}

pub fn list_names_with_sri(integrity: &str) -> String {
    let body = format!(
        "{}\n<p id=\"count\"></p>\n<script src=\"/js/count.js\" integrity=\"{}\"></script>",
        name_list(),
        integrity
    );
    layout("Names with subresource integrity", &body)
}

pub fn list_names_with_count_inline() -> String {
    let body = format!(
        "{}\n<p id=\"count\"></p>\n<button onclick=\"{}\">Count</button>\n<script src=\"/js/count.js\"></script>",
        name_list(),
        COUNT_HANDLER
    );
    layout("Names with inline handler", &body)
}

pub fn list_names_with_count_nonces(nonce: &str) -> String {
    let body = format!(
        "{}\n<p id=\"count\"></p>\n<script{}>{}</script>",
        name_list(),
        nonce_attr(Some(nonce)),
        COUNT_INLINE_SCRIPT
    );
    layout("Names with nonce", &body)
}

/// The embedded-tweet page. With a nonce every script element carries it.
pub fn twitter(nonce: Option<&str>) -> String {
    let attr = nonce_attr(nonce);
    let body = format!(
        "<p id=\"greeting\"></p>
<p id=\"count\"></p>
<ul id=\"names\"><li>Tweet</li></ul>
<script{attr} src=\"/js/count.js\"></script>
<script{attr} src=\"{purify}\"></script>
<script{attr}>{inline}</script>
<blockquote class=\"twitter-tweet\"><a href=\"https://twitter.com/Twitter/status/1445078208190291968\">Tweet</a></blockquote>
<script{attr} async src=\"{widgets}\"></script>",
        attr = attr,
        purify = PURIFY_URL,
        inline = TWITTER_INLINE_SCRIPT,
        widgets = TWITTER_WIDGETS_URL,
    );
    layout("Embedded tweet", &body)
}
