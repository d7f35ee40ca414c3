/// Replaces every standalone occurrence of `original` with `local_path`.
///
/// An occurrence only counts when it is not glued to other URL characters on
/// either side, so `a.png` inside `data.png` or `/x/a.png` is left untouched.
/// Quote characters, `(`, `)`, whitespace, tag brackets, `=`, `,` and the
/// `&quot;` entity all act as boundaries.
///
/// Returns the number of occurrences replaced. Nothing happens when the two
/// are equal, which is how unresolved resources keep their remote URL.
pub fn substitute(html_content: &mut String, original: &str, local_path: &str) -> usize {
    if original.is_empty() || original == local_path {
        return 0;
    }

    let mut rewritten = String::with_capacity(html_content.len());
    let mut last = 0;
    let mut count = 0;

    for (idx, _) in html_content.match_indices(original) {
        let end = idx + original.len();
        if !is_left_boundary(&html_content[..idx]) || !is_right_boundary(&html_content[end..]) {
            continue;
        }
        rewritten.push_str(&html_content[last..idx]);
        rewritten.push_str(local_path);
        last = end;
        count += 1;
    }

    if count > 0 {
        rewritten.push_str(&html_content[last..]);
        *html_content = rewritten;
    }
    count
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&*+;%".contains(c)
}

fn is_left_boundary(before: &str) -> bool {
    before.ends_with("&quot;") || before.chars().next_back().map_or(true, |c| !is_url_char(c))
}

fn is_right_boundary(after: &str) -> bool {
    after.starts_with("&quot;") || after.chars().next().map_or(true, |c| !is_url_char(c))
}

/// Inserts a stylesheet link right before the first `</head>`.
///
/// Returns false when the document has no closing head tag.
pub fn inject_stylesheet_link(html_content: &mut String, href: &str) -> bool {
    match html_content.find("</head>") {
        Some(idx) => {
            let link = format!("<link rel=\"stylesheet\" href=\"{}\">\n", href);
            html_content.insert_str(idx, &link);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_all_occurrences() {
        let mut html = r#"<img src="a.png"><img src="a.png">"#.to_string();
        assert_eq!(substitute(&mut html, "a.png", "assets/images/a.png"), 2);
        assert_eq!(html, r#"<img src="assets/images/a.png"><img src="assets/images/a.png">"#);
    }

    #[test]
    fn test_substitute_skips_longer_urls() {
        let mut html = r#"<img src="a.png"><img src="data.png"><img src="/img/a.png"><i>a.png?v=2</i>"#.to_string();
        assert_eq!(substitute(&mut html, "a.png", "assets/images/a.png"), 1);
        assert_eq!(
            html,
            r#"<img src="assets/images/a.png"><img src="data.png"><img src="/img/a.png"><i>a.png?v=2</i>"#
        );
    }

    #[test]
    fn test_substitute_absolute_path_inside_other_host() {
        let mut html = r#"<link rel="icon" href="/favicon.png"><meta content="https://framerusercontent.com/x/favicon.png">"#.to_string();
        assert_eq!(substitute(&mut html, "/favicon.png", "assets/images/favicon.png"), 1);
        assert_eq!(
            html,
            r#"<link rel="icon" href="assets/images/favicon.png"><meta content="https://framerusercontent.com/x/favicon.png">"#
        );
    }

    #[test]
    fn test_substitute_css_and_text_boundaries() {
        let mut html = "url(https://x.com/a.jpg) url('https://x.com/a.jpg') url(&quot;https://x.com/a.jpg&quot;) <p>https://x.com/a.jpg</p> https://x.com/a.jpg 1x, https://x.com/a.jpg.map".to_string();
        assert_eq!(substitute(&mut html, "https://x.com/a.jpg", "assets/images/a.jpg"), 5);
        assert_eq!(
            html,
            "url(assets/images/a.jpg) url('assets/images/a.jpg') url(&quot;assets/images/a.jpg&quot;) <p>assets/images/a.jpg</p> assets/images/a.jpg 1x, https://x.com/a.jpg.map"
        );
    }

    #[test]
    fn test_substitute_identity_is_noop() {
        let mut html = r#"<img src="https://x.com/a.png">"#.to_string();
        assert_eq!(substitute(&mut html, "https://x.com/a.png", "https://x.com/a.png"), 0);
        assert_eq!(html, r#"<img src="https://x.com/a.png">"#);
    }

    #[test]
    fn test_substitute_missing() {
        let mut html = "<p>nothing</p>".to_string();
        assert_eq!(substitute(&mut html, "a.png", "assets/images/a.png"), 0);
        assert_eq!(html, "<p>nothing</p>");
    }

    #[test]
    fn test_inject_stylesheet_link_once() {
        let mut html = "<html><head><title>t</title></head><body><svg><head></head></svg></body></html>".to_string();
        assert!(inject_stylesheet_link(&mut html, "assets/css/inline-styles.css"));
        assert_eq!(
            html,
            "<html><head><title>t</title><link rel=\"stylesheet\" href=\"assets/css/inline-styles.css\">\n</head><body><svg><head></head></svg></body></html>"
        );
        assert_eq!(html.matches("inline-styles.css").count(), 1);
    }

    #[test]
    fn test_inject_without_head() {
        let mut html = "<p>fragment</p>".to_string();
        assert!(!inject_stylesheet_link(&mut html, "assets/css/inline-styles.css"));
        assert_eq!(html, "<p>fragment</p>");
    }
}
