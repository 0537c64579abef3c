//! Sample document bodies for testing and demonstration.
//!
//! Each body exercises a different part of the markup vocabulary.

use crate::config::DocumentConfig;

/// Headers, emphasis and a link.
pub fn article_body() -> &'static str {
    r#"
<h1>Getting Started</h1>
<p>The <strong>first week</strong> is the hardest. Keep meals <em>simple</em>
and drink plenty of water.</p>
<h4>Shopping</h4>
<p>Read the labels, and see <a href="https://example.com/labels">this guide</a>
for what to look for.</p>
"#
}

/// Ordered and unordered lists with text around them.
pub fn list_body() -> &'static str {
    r#"
<p>Before you start:</p>
<ol>
  <li>Clear the pantry.</li>
  <li>Plan <strong>three</strong> days of meals.</li>
  <li>Buy a scale.</li>
</ol>
<ul>
  <li>Eggs</li>
  <li>Avocados</li>
  <li>Olive oil</li>
</ul>
<p>That is all you need.</p>
"#
}

/// Markup that breaks most rules: stray closes, unknown tags, no containers.
pub fn messy_body() -> &'static str {
    "</strong>loose text<blink>odd</blink><p>  </p><li>orphan item</li><a>no href</a><br>after"
}

/// A body long enough to cover several pages.
pub fn long_body(paragraphs: usize) -> String {
    let mut body = String::new();
    for n in 1..=paragraphs {
        if n % 10 == 1 {
            body.push_str(&format!("<h2>Section {}</h2>", n / 10 + 1));
        }
        body.push_str(&format!(
            "<p>Paragraph {n}. Low carbohydrate eating changes how the body \
             fuels itself, and most people notice the difference within a \
             few days of starting.</p>"
        ));
    }
    body
}

/// A complete config used by `press --demo`.
pub fn demo_config() -> DocumentConfig {
    DocumentConfig {
        title: "Keto for Beginners".to_string(),
        website: "example.com".to_string(),
        keywords: "keto, diet, beginners".to_string(),
        creator: "column-press".to_string(),
        sub_header1: "Everything you need for the first month".to_string(),
        sub_header2: "<p>Written by <strong>the editors</strong></p>".to_string(),
        body: format!("{}{}{}", article_body(), list_body(), long_body(40)),
        footer: "example.com".to_string(),
        output_file: "demo.pdf".to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{build_document, DocumentStyle};

    #[test]
    fn bodies_produce_elements() {
        let bodies: Vec<(&str, String)> = vec![
            ("article", article_body().to_string()),
            ("list", list_body().to_string()),
            ("messy", messy_body().to_string()),
            ("long", long_body(12)),
        ];

        for (name, body) in bodies {
            let elements = build_document(&body, &DocumentStyle::body());
            assert!(!elements.is_empty(), "Body '{name}' should produce elements");
        }
    }

    #[test]
    fn demo_config_is_complete() {
        let config = demo_config();
        assert!(!config.title.is_empty());
        assert!(!config.footer.is_empty());
        assert_eq!(config.keyword_list().len(), 3);
    }
}
