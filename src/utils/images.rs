use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Markdown `![alt](url)` or HTML `<img ... src="url" ...>`.
static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]]*\]\(([^)\s]+)(?:\s+"[^"]*")?\)|<img[^>]+src=["']([^"']+)["'][^>]*>"#)
        .unwrap()
});

/// Collects the distinct relative image URLs referenced by `content`.
/// Absolute URLs point at other hosts and are not ours to track.
pub fn extract_local_images(content: &str) -> BTreeSet<String> {
    IMAGE_REF
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty() && Url::parse(url).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_markdown_and_html_images() {
        let content = r#"
intro ![cover](/uploads/a.png) text
<img class="wide" src='/uploads/b.jpg' alt="b">
![dup](/uploads/a.png "title")
"#;
        let found: Vec<_> = extract_local_images(content).into_iter().collect();
        assert_eq!(found, vec!["/uploads/a.png", "/uploads/b.jpg"]);
    }

    #[test]
    fn skips_absolute_urls() {
        let content = "![x](https://cdn.example.com/x.png) <img src=\"http://a.b/c.gif\">";
        assert!(extract_local_images(content).is_empty());
    }

    #[test]
    fn plain_links_are_not_images() {
        assert!(extract_local_images("[docs](/docs/index.html)").is_empty());
    }
}
