//! Server-rendered public page

use std::borrow::Cow;
use std::fmt::Write;

use axum::extract::State;
use axum::response::Html;

use super::handlers::{current_document, ApiError};
use super::AppState;
use crate::core::site::SiteConfiguration;

pub(crate) async fn site_page_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let config = current_document(&state).await?;
    Ok(Html(render_site(&config)))
}

/// Escape text for element content and quoted attributes
fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Render the document as a standalone HTML page
pub(crate) fn render_site(config: &SiteConfiguration) -> String {
    let title = escape(&config.header.title);
    let mut html = String::with_capacity(2048);

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<header>\n"
    );

    if !config.header.image_url.is_empty() {
        let _ = writeln!(
            html,
            "<img class=\"logo\" src=\"{}\" alt=\"{title}\">",
            escape(&config.header.image_url)
        );
    }
    let _ = writeln!(html, "<h1>{title}</h1>\n<nav>");
    for link in &config.navbar {
        // Only http(s) and site-relative targets become links
        if link.has_safe_url() {
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a>",
                escape(&link.url),
                escape(&link.label)
            );
        } else {
            let _ = writeln!(html, "<span>{}</span>", escape(&link.label));
        }
    }
    html.push_str("</nav>\n</header>\n");

    html.push_str(
        "<main>\n<h2>Welcome to Your Website</h2>\n\
         <p>Header, navbar and footer on this page are edited from the dashboard.</p>\n</main>\n",
    );

    let footer = &config.footer;
    let _ = write!(
        html,
        "<footer>\n<p>Email: <a href=\"mailto:{email}\">{email}</a></p>\n\
         <p>Phone: {}</p>\n<p>Address: {}</p>\n</footer>\n</body>\n</html>\n",
        escape(&footer.phone),
        escape(&footer.address),
        email = escape(&footer.email),
    );

    html
}

const STYLE: &str = "body{margin:0;font-family:system-ui,sans-serif;display:flex;flex-direction:column;min-height:100vh}\
header{background:#1e3a8a;color:#fff;padding:1rem 2rem;display:flex;align-items:center;gap:1rem;flex-wrap:wrap}\
header h1{margin:0;font-size:1.5rem}.logo{width:48px;height:48px;border-radius:8px;object-fit:cover}\
nav{margin-left:auto;display:flex;gap:1rem}nav a{color:#fff;text-decoration:none}\
main{flex:1;padding:2rem}footer{background:#111827;color:#d1d5db;padding:1rem 2rem}footer a{color:#93c5fd}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site::NavLink;

    #[test]
    fn test_escape() {
        assert!(matches!(escape("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_render_default_document() {
        let html = render_site(&SiteConfiguration::default());
        assert!(html.contains("<title>My Site</title>"));
        assert!(html.contains("<a href=\"/about\">About</a>"));
        assert!(html.contains("mailto:hello@example.com"));
        assert!(!html.contains("class=\"logo\""));
    }

    #[test]
    fn test_unsafe_link_rendered_as_text() {
        let mut config = SiteConfiguration::default();
        config.navbar[0] = NavLink::new("Click", "javascript:alert(1)");
        config.navbar[1] = NavLink::new("Data", "data:text/html,hi");
        let html = render_site(&config);
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:text"));
        assert!(html.contains("<span>Click</span>"));
        assert!(html.contains("<a href=\"/contact\">Contact</a>"));
    }

    #[test]
    fn test_render_header_image() {
        let mut config = SiteConfiguration::default();
        config.header.image_url = "https://cdn.example/a.png?w=1&h=2".to_string();
        let html = render_site(&config);
        assert!(html.contains("src=\"https://cdn.example/a.png?w=1&amp;h=2\""));
    }
}
