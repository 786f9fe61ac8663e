use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags (like
/// <script>, <iframe>) and attributes (like onclick) are stripped.
/// Used for the rendered form of article bodies.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Escapes `& < > " '` and turns newlines into `<br>`.
/// Comments are shown as plain text, so nothing the user typed may become markup.
pub fn escape_with_line_breaks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}
