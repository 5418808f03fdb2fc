use foundation::text::capitalize;

/// Horizontal distance between the cursor and the popup, in pixels.
pub const HOVER_OFFSET_PX: f64 = 20.0;

/// Hover popup anchored next to the cursor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverLabel {
    /// Anchor in screen pixels, `None` while hidden.
    position: Option<[f64; 2]>,
    text: String,
}

impl HoverLabel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `text` (capitalized) to the right of `cursor_px`.
    pub fn show_at(&mut self, cursor_px: [f64; 2], text: &str) {
        self.position = Some([cursor_px[0] + HOVER_OFFSET_PX, cursor_px[1]]);
        self.text = capitalize(text);
    }

    pub fn hide(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<[f64; 2]> {
        self.position
    }

    /// Text of a visible label.
    pub fn text(&self) -> Option<&str> {
        self.position.map(|_| self.text.as_str())
    }

    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::HoverLabel;

    #[test]
    fn offsets_and_capitalizes() {
        let mut label = HoverLabel::new();
        assert!(!label.is_visible());

        label.show_at([100.0, 50.0], "speed bump");
        assert_eq!(label.position(), Some([120.0, 50.0]));
        assert_eq!(label.text(), Some("Speed bump"));

        label.hide();
        assert_eq!(label.text(), None);
    }
}
