/// Text shown over the viewport while a model is loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
    visible: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            visible: true,
        }
    }

    /// Replaces the text; visibility is left alone.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}
