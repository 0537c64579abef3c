//! Document builder – turns tokenizer events into an ordered sequence of
//! block elements (paragraphs and lists) made of styled text runs.
//!
//! Only a small tag vocabulary has any effect:
//! `p h1-h6 ol ul li pre address blockquote dl div br a strong em`.
//! Every other tag is tokenized but treated as an inert container.

use serde::{Deserialize, Serialize};

use crate::style::{Color, Emphasis, StyleDefaults, StyleStack, StyleState, TextAlign};
use crate::tokenizer::{href_attribute, Token, Tokenizer};

/// Space above a header paragraph, in points.
pub const HEADER_SPACING_BEFORE: f32 = 20.0;
/// Space above a minor header paragraph, in points.
pub const HEADER_MINOR_SPACING_BEFORE: f32 = 10.0;
/// Space above each list item, in points.
pub const LIST_ITEM_SPACING_BEFORE: f32 = 4.0;

// ---------------------------------------------------------------------------
// Element model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphKind {
    Body,
    Header,
    HeaderMinor,
}

/// A piece of text with the style that applied when it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub style: StyleState,
}

/// A hyperlink. Its runs are drawn underlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub href: String,
    /// Font size in effect when the anchor was opened.
    pub size: f32,
    pub runs: Vec<TextRun>,
}

/// Content of a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Run(TextRun),
    Anchor(Anchor),
}

impl Inline {
    pub fn text(&self) -> String {
        match self {
            Inline::Run(run) => run.text.clone(),
            Inline::Anchor(anchor) => anchor.runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Inline::Run(run) => run.text.is_empty(),
            Inline::Anchor(anchor) => anchor.runs.is_empty(),
        }
    }
}

fn joined_text(children: &[Inline]) -> String {
    children.iter().map(Inline::text).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub alignment: TextAlign,
    pub spacing_before: f32,
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new(kind: ParagraphKind, alignment: TextAlign) -> Self {
        let spacing_before = match kind {
            ParagraphKind::Body => 0.0,
            ParagraphKind::Header => HEADER_SPACING_BEFORE,
            ParagraphKind::HeaderMinor => HEADER_MINOR_SPACING_BEFORE,
        };
        Self {
            kind,
            alignment,
            spacing_before,
            children: Vec::new(),
        }
    }

    /// Combined text of every run, including runs inside anchors.
    pub fn text(&self) -> String {
        joined_text(&self.children)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub spacing_before: f32,
    pub children: Vec<Inline>,
}

impl ListItem {
    pub fn text(&self) -> String {
        joined_text(&self.children)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    /// Horizontal space reserved for the list symbol.
    pub symbol_indent: f32,
    pub items: Vec<ListItem>,
}

/// A top-level block. Document order is visual order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Paragraph(Paragraph),
    List(List),
}

impl Element {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Element::Paragraph(p) => Some(p),
            Element::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Element::List(l) => Some(l),
            Element::Paragraph(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Document style
// ---------------------------------------------------------------------------

/// Font sizes and alignment used while building one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentStyle {
    pub body_size: f32,
    pub header_size: f32,
    pub header_minor_size: f32,
    pub alignment: TextAlign,
    pub color: Color,
}

impl DocumentStyle {
    /// Main body text: 8 pt body, 12 pt headers, 10 pt minor headers.
    pub fn body() -> Self {
        Self {
            body_size: 8.0,
            header_size: 12.0,
            header_minor_size: 10.0,
            alignment: TextAlign::Left,
            color: Color::BLACK,
        }
    }

    /// Centered 8 pt text at every level, used for the info block under the
    /// title.
    pub fn info() -> Self {
        Self {
            body_size: 8.0,
            header_size: 8.0,
            header_minor_size: 8.0,
            alignment: TextAlign::Center,
            color: Color::BLACK,
        }
    }

    pub fn size_for(&self, kind: ParagraphKind) -> f32 {
        match kind {
            ParagraphKind::Body => self.body_size,
            ParagraphKind::Header => self.header_size,
            ParagraphKind::HeaderMinor => self.header_minor_size,
        }
    }

    pub fn list_symbol_indent(&self) -> f32 {
        self.body_size * 1.5
    }

    pub fn style_defaults(&self) -> StyleDefaults {
        StyleDefaults {
            emphasis: Emphasis::NONE,
            size: self.body_size,
            alignment: self.alignment,
            color: self.color,
        }
    }
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self::body()
    }
}

// ---------------------------------------------------------------------------
// Tag table
// ---------------------------------------------------------------------------

/// What a recognised tag does when it opens. The matching close tag undoes
/// whatever the open pushed or opened.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TagAction {
    PushEmphasis(Emphasis),
    OpenBlock(ParagraphKind),
    OpenList { ordered: bool },
    OpenListItem,
    OpenAnchor,
    LineBreak,
}

const TAG_ACTIONS: &[(&str, TagAction)] = &[
    ("strong", TagAction::PushEmphasis(Emphasis::BOLD)),
    ("em", TagAction::PushEmphasis(Emphasis::ITALIC)),
    ("a", TagAction::OpenAnchor),
    ("ul", TagAction::OpenList { ordered: false }),
    ("ol", TagAction::OpenList { ordered: true }),
    ("li", TagAction::OpenListItem),
    ("h1", TagAction::OpenBlock(ParagraphKind::Header)),
    ("h2", TagAction::OpenBlock(ParagraphKind::Header)),
    ("h3", TagAction::OpenBlock(ParagraphKind::Header)),
    ("h4", TagAction::OpenBlock(ParagraphKind::HeaderMinor)),
    ("h5", TagAction::OpenBlock(ParagraphKind::HeaderMinor)),
    ("h6", TagAction::OpenBlock(ParagraphKind::HeaderMinor)),
    ("p", TagAction::OpenBlock(ParagraphKind::Body)),
    ("pre", TagAction::OpenBlock(ParagraphKind::Body)),
    ("address", TagAction::OpenBlock(ParagraphKind::Body)),
    ("blockquote", TagAction::OpenBlock(ParagraphKind::Body)),
    ("dl", TagAction::OpenBlock(ParagraphKind::Body)),
    ("div", TagAction::OpenBlock(ParagraphKind::Body)),
    ("br", TagAction::LineBreak),
];

fn tag_action(name: &str) -> Option<TagAction> {
    TAG_ACTIONS
        .iter()
        .find(|(tag, _)| *tag == name)
        .map(|(_, action)| *action)
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

/// Replace every line ending with a space and collapse runs of spaces.
pub fn cleanup_paragraph(text: &str) -> String {
    let mut text = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }
    text
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// A paragraph or list item that can hold inline content.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Paragraph(usize),
    ListItem { list: usize, item: usize },
}

/// Where the next flushed run goes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum InsertionPoint {
    None,
    Container(Container),
    Anchor { parent: Container, index: usize },
}

/// Incremental builder fed one token at a time.
///
/// Open constructs are tracked as indices into the element list, never as
/// references, so the builder owns everything it produces.
pub struct DocumentBuilder {
    style: DocumentStyle,
    stack: StyleStack,
    elements: Vec<Element>,
    pending: String,
    paragraph: Option<usize>,
    list: Option<usize>,
    item: Option<usize>,
    anchor: Option<(Container, usize)>,
}

impl DocumentBuilder {
    pub fn new(style: DocumentStyle) -> Self {
        Self {
            style,
            stack: StyleStack::new(style.style_defaults()),
            elements: Vec::new(),
            pending: String::new(),
            paragraph: None,
            list: None,
            item: None,
            anchor: None,
        }
    }

    pub fn style_stack(&self) -> &StyleStack {
        &self.stack
    }

    pub fn feed(&mut self, token: Token<'_>) {
        match token {
            Token::Text(text) => self.pending.push_str(&cleanup_paragraph(text)),
            Token::Open { name, attrs, .. } => {
                self.flush();
                if let Some(action) = tag_action(&name) {
                    self.open(action, attrs);
                }
            }
            Token::Close { name } => {
                self.flush();
                if let Some(action) = tag_action(&name) {
                    self.close(action);
                }
            }
        }
    }

    /// Flush trailing text, prune empty blocks and return the elements.
    pub fn finish(mut self) -> Vec<Element> {
        self.flush();
        if !self.stack.is_balanced() {
            let (emphasis, sizes) = self.stack.depth();
            log::debug!(
                "Unbalanced markup: {emphasis} emphasis and {sizes} size entries left open"
            );
        }
        prune(self.elements)
    }

    fn open(&mut self, action: TagAction, attrs: &str) {
        match action {
            TagAction::PushEmphasis(emphasis) => self.stack.push_emphasis(emphasis),
            TagAction::OpenBlock(kind) => {
                self.open_paragraph(kind);
                self.stack.push_size(self.style.size_for(kind));
            }
            TagAction::OpenList { ordered } => {
                self.open_list(ordered);
            }
            TagAction::OpenListItem => {
                let list = match self.list {
                    Some(list) => list,
                    None => {
                        log::debug!("List item outside of a list; opening an unordered list");
                        self.open_list(false)
                    }
                };
                if let Some(Element::List(l)) = self.elements.get_mut(list) {
                    l.items.push(ListItem {
                        spacing_before: LIST_ITEM_SPACING_BEFORE,
                        children: Vec::new(),
                    });
                    self.item = Some(l.items.len() - 1);
                }
            }
            TagAction::OpenAnchor => match href_attribute(attrs) {
                Some(href) => self.open_anchor(href),
                None => log::debug!("Anchor without href; keeping its text as plain runs"),
            },
            TagAction::LineBreak => self.pending.push('\n'),
        }
    }

    fn close(&mut self, action: TagAction) {
        match action {
            TagAction::PushEmphasis(_) => self.stack.pop_emphasis(),
            TagAction::OpenBlock(_) => self.stack.pop_size(),
            TagAction::OpenListItem => self.item = None,
            TagAction::OpenList { .. } => {
                self.item = None;
                self.list = None;
                self.stack.pop_size();
            }
            TagAction::OpenAnchor => self.anchor = None,
            TagAction::LineBreak => {}
        }
    }

    fn open_paragraph(&mut self, kind: ParagraphKind) -> usize {
        self.elements
            .push(Element::Paragraph(Paragraph::new(kind, self.style.alignment)));
        let index = self.elements.len() - 1;
        self.paragraph = Some(index);
        index
    }

    fn open_list(&mut self, ordered: bool) -> usize {
        self.elements.push(Element::List(List {
            ordered,
            symbol_indent: self.style.list_symbol_indent(),
            items: Vec::new(),
        }));
        let index = self.elements.len() - 1;
        self.list = Some(index);
        self.item = None;
        // Text after the list starts a fresh paragraph below it.
        self.paragraph = None;
        index
    }

    fn open_anchor(&mut self, href: &str) {
        let parent = match self.container() {
            Some(container) => container,
            None => Container::Paragraph(self.open_paragraph(ParagraphKind::Body)),
        };
        let anchor = Anchor {
            href: href.to_string(),
            size: self.stack.size(),
            runs: Vec::new(),
        };
        let index = match self.children_mut(parent) {
            Some(children) => {
                children.push(Inline::Anchor(anchor));
                children.len() - 1
            }
            None => return,
        };
        self.anchor = Some((parent, index));
    }

    /// Innermost open paragraph or list item, ignoring anchors.
    fn container(&self) -> Option<Container> {
        match (self.list, self.item, self.paragraph) {
            (Some(list), Some(item), _) => Some(Container::ListItem { list, item }),
            (_, _, Some(p)) => Some(Container::Paragraph(p)),
            _ => None,
        }
    }

    fn insertion_point(&self) -> InsertionPoint {
        if let Some((parent, index)) = self.anchor {
            return InsertionPoint::Anchor { parent, index };
        }
        match self.container() {
            Some(container) => InsertionPoint::Container(container),
            None => InsertionPoint::None,
        }
    }

    fn children_mut(&mut self, container: Container) -> Option<&mut Vec<Inline>> {
        match container {
            Container::Paragraph(index) => match self.elements.get_mut(index) {
                Some(Element::Paragraph(p)) => Some(&mut p.children),
                _ => None,
            },
            Container::ListItem { list, item } => match self.elements.get_mut(list) {
                Some(Element::List(l)) => l.items.get_mut(item).map(|i| &mut i.children),
                _ => None,
            },
        }
    }

    /// Append pending text as a run at the current insertion point.
    fn flush(&mut self) {
        let text = std::mem::take(&mut self.pending);
        if text.trim().is_empty() {
            return;
        }
        let run = TextRun {
            text,
            style: self.stack.current(),
        };

        match self.insertion_point() {
            InsertionPoint::Anchor { parent, index } => {
                if let Some(Inline::Anchor(anchor)) =
                    self.children_mut(parent).and_then(|c| c.get_mut(index))
                {
                    anchor.runs.push(run);
                }
            }
            InsertionPoint::Container(container) => {
                if let Some(children) = self.children_mut(container) {
                    children.push(Inline::Run(run));
                }
            }
            InsertionPoint::None => {
                let index = self.open_paragraph(ParagraphKind::Body);
                if let Some(children) = self.children_mut(Container::Paragraph(index)) {
                    children.push(Inline::Run(run));
                }
            }
        }
    }
}

/// Drop paragraphs and list items with no visible text, and lists left with
/// no items.
fn prune(elements: Vec<Element>) -> Vec<Element> {
    let before = elements.len();
    let kept: Vec<Element> = elements
        .into_iter()
        .filter_map(|element| match element {
            Element::Paragraph(mut p) => {
                p.children.retain(|c| !c.is_empty());
                if p.text().trim().is_empty() {
                    None
                } else {
                    Some(Element::Paragraph(p))
                }
            }
            Element::List(mut list) => {
                for item in &mut list.items {
                    item.children.retain(|c| !c.is_empty());
                }
                list.items.retain(|item| !item.text().trim().is_empty());
                if list.items.is_empty() {
                    None
                } else {
                    Some(Element::List(list))
                }
            }
        })
        .collect();
    if kept.len() != before {
        log::debug!("Pruned {} empty block(s)", before - kept.len());
    }
    kept
}

/// Parse a markup string into its block elements.
pub fn build_document(markup: &str, style: &DocumentStyle) -> Vec<Element> {
    let mut builder = DocumentBuilder::new(*style);
    for token in Tokenizer::new(markup) {
        builder.feed(token);
    }
    builder.finish()
}
