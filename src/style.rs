//! Style stack – tracks nested emphasis and font sizes while markup is
//! being consumed, and answers "what style applies to text right now".

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Bold / italic flags applied to a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
}

impl Emphasis {
    pub const NONE: Self = Self {
        bold: false,
        italic: false,
    };
    pub const BOLD: Self = Self {
        bold: true,
        italic: false,
    };
    pub const ITALIC: Self = Self {
        bold: false,
        italic: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const DARK_GRAY: Self = Self {
        r: 0.25,
        g: 0.25,
        b: 0.25,
        a: 1.0,
    };
    pub const GRAY: Self = Self {
        r: 0.5,
        g: 0.5,
        b: 0.5,
        a: 1.0,
    };

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The style that applies to a piece of text at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleState {
    pub emphasis: Emphasis,
    pub size: f32,
    pub alignment: TextAlign,
    pub color: Color,
}

/// Values reported when a stack is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDefaults {
    pub emphasis: Emphasis,
    pub size: f32,
    pub alignment: TextAlign,
    pub color: Color,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            emphasis: Emphasis::NONE,
            size: 8.0,
            alignment: TextAlign::Left,
            color: Color::BLACK,
        }
    }
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

/// Two independent stacks: one of emphasis flags, one of font sizes.
///
/// The current emphasis is the top entry only, not the union of every open
/// emphasis tag. Popping an empty stack is a silent no-op.
#[derive(Debug, Clone)]
pub struct StyleStack {
    defaults: StyleDefaults,
    emphasis: Vec<Emphasis>,
    sizes: Vec<f32>,
}

impl StyleStack {
    pub fn new(defaults: StyleDefaults) -> Self {
        Self {
            defaults,
            emphasis: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    pub fn push_emphasis(&mut self, emphasis: Emphasis) {
        self.emphasis.push(emphasis);
    }

    pub fn pop_emphasis(&mut self) {
        if self.emphasis.pop().is_none() {
            log::debug!("Ignoring emphasis close with no open emphasis");
        }
    }

    pub fn push_size(&mut self, size: f32) {
        self.sizes.push(size);
    }

    pub fn pop_size(&mut self) {
        if self.sizes.pop().is_none() {
            log::debug!("Ignoring block close with no open font size");
        }
    }

    pub fn emphasis(&self) -> Emphasis {
        self.emphasis.last().copied().unwrap_or(self.defaults.emphasis)
    }

    pub fn size(&self) -> f32 {
        self.sizes.last().copied().unwrap_or(self.defaults.size)
    }

    /// Snapshot of the style that applies to text right now.
    pub fn current(&self) -> StyleState {
        StyleState {
            emphasis: self.emphasis(),
            size: self.size(),
            alignment: self.defaults.alignment,
            color: self.defaults.color,
        }
    }

    /// `(emphasis depth, size depth)`.
    pub fn depth(&self) -> (usize, usize) {
        (self.emphasis.len(), self.sizes.len())
    }

    pub fn is_balanced(&self) -> bool {
        self.emphasis.is_empty() && self.sizes.is_empty()
    }
}

impl Default for StyleStack {
    fn default() -> Self {
        Self::new(StyleDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_reports_defaults() {
        let stack = StyleStack::default();
        assert_eq!(stack.emphasis(), Emphasis::NONE);
        assert_eq!(stack.size(), 8.0);
        assert!(stack.is_balanced());
    }

    #[test]
    fn top_of_stack_wins() {
        let mut stack = StyleStack::default();
        stack.push_emphasis(Emphasis::BOLD);
        stack.push_emphasis(Emphasis::ITALIC);
        assert_eq!(stack.emphasis(), Emphasis::ITALIC);
        stack.pop_emphasis();
        assert_eq!(stack.emphasis(), Emphasis::BOLD);
    }

    #[test]
    fn sizes_nest_and_restore() {
        let mut stack = StyleStack::default();
        stack.push_size(12.0);
        stack.push_size(10.0);
        assert_eq!(stack.size(), 10.0);
        stack.pop_size();
        assert_eq!(stack.size(), 12.0);
        stack.pop_size();
        assert_eq!(stack.size(), 8.0);
    }

    #[test]
    fn popping_empty_stacks_is_a_no_op() {
        let mut stack = StyleStack::default();
        stack.pop_emphasis();
        stack.pop_size();
        assert_eq!(stack.depth(), (0, 0));
        assert_eq!(stack.current().emphasis, Emphasis::NONE);
    }

    #[test]
    fn current_uses_configured_alignment() {
        let stack = StyleStack::new(StyleDefaults {
            alignment: TextAlign::Center,
            ..StyleDefaults::default()
        });
        assert_eq!(stack.current().alignment, TextAlign::Center);
    }
}
