//! Markup tokenizer – splits a markup string into text spans and tags.
//!
//! The scanner recognises anything shaped like `<name ...>` or `</name ...>`
//! as a tag. Everything else, including stray `<` characters that do not start
//! a well-formed tag, is passed through verbatim as text. No entity decoding
//! is performed.

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// One event produced by [`Tokenizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw text between tags, exactly as it appears in the input.
    Text(&'a str),
    /// An opening tag. `name` is lower-cased; `attrs` is the raw text between
    /// the tag name and the closing `>`.
    Open {
        name: String,
        attrs: &'a str,
        self_closing: bool,
    },
    /// A closing tag (`</name>`), name lower-cased.
    Close { name: String },
}

impl Token<'_> {
    /// Tag name for `Open`/`Close`, `None` for text.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Token::Open { name, .. } | Token::Close { name } => Some(name.as_str()),
            Token::Text(_) => None,
        }
    }
}

/// Tags that never have a matching close tag.
pub fn is_void_tag(name: &str) -> bool {
    matches!(name, "br" | "img")
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Lazy tokenizer over a markup string.
///
/// The tokenizer is `Clone`, so a sequence can be restarted from any point by
/// cloning it, or from the beginning with [`Tokenizer::new`].
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

/// A tag located in the input: byte range plus its parsed parts.
struct TagMatch<'a> {
    end: usize,
    closing: bool,
    name: &'a str,
    attrs: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Find the first well-formed tag at or after `from`.
    fn find_tag(&self, from: usize) -> Option<(usize, TagMatch<'a>)> {
        let mut search = from;
        while let Some(rel) = self.input[search..].find('<') {
            let start = search + rel;
            if let Some(tag) = self.match_tag(start) {
                return Some((start, tag));
            }
            search = start + 1;
        }
        None
    }

    /// Try to read a tag starting at the `<` at byte offset `start`.
    fn match_tag(&self, start: usize) -> Option<TagMatch<'a>> {
        let mut pos = start + 1;
        let closing = self.input[pos..].starts_with('/');
        if closing {
            pos += 1;
        }

        // Whitespace is allowed between `<` (or `</`) and the name.
        let rest = &self.input[pos..];
        let skipped = rest.len() - rest.trim_start().len();
        pos += skipped;

        let name_start = pos;
        for c in self.input[pos..].chars() {
            if c.is_alphanumeric() || c == '_' {
                pos += c.len_utf8();
            } else {
                break;
            }
        }
        if pos == name_start {
            return None;
        }

        let gt = pos + self.input[pos..].find('>')?;
        Some(TagMatch {
            end: gt + 1,
            closing,
            name: &self.input[name_start..pos],
            attrs: &self.input[pos..gt],
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.input.len() {
            return None;
        }

        match self.find_tag(self.pos) {
            Some((start, _)) if start > self.pos => {
                // Emit the text first; the tag is re-matched on the next call.
                let text = &self.input[self.pos..start];
                self.pos = start;
                Some(Token::Text(text))
            }
            Some((_, tag)) => {
                self.pos = tag.end;
                let name = tag.name.to_lowercase();
                if tag.closing {
                    Some(Token::Close { name })
                } else {
                    let self_closing = tag.attrs.trim_end().ends_with('/') || is_void_tag(&name);
                    Some(Token::Open {
                        name,
                        attrs: tag.attrs,
                        self_closing,
                    })
                }
            }
            None => {
                let text = &self.input[self.pos..];
                self.pos = self.input.len();
                Some(Token::Text(text))
            }
        }
    }
}

/// Convenience: tokenize a whole string eagerly.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Tokenizer::new(input).collect()
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Extract the value of a double-quoted `href="..."` attribute.
///
/// The attribute name is matched case-insensitively. A missing closing quote
/// takes the value up to the end of the attribute blob; an empty value does
/// not count as a link.
pub fn href_attribute(attrs: &str) -> Option<&str> {
    const NEEDLE: &str = "href=\"";
    // ASCII lower-casing keeps byte offsets identical to `attrs`.
    let lower = attrs.to_ascii_lowercase();
    let mut search = 0;
    while let Some(rel) = lower[search..].find(NEEDLE) {
        let value_start = search + rel + NEEDLE.len();
        let value_end = attrs[value_start..]
            .find('"')
            .map(|i| value_start + i)
            .unwrap_or(attrs.len());
        if value_end > value_start {
            return Some(&attrs[value_start..value_end]);
        }
        search = value_start;
    }
    None
}
