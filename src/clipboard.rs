use arboard::Clipboard;

/// Lazy clipboard handle for snippet copying. Initialization can fail in
/// headless environments; errors surface in the status line, never fatally.
pub struct ClipboardProvider {
    clipboard: Option<Clipboard>,
}

impl ClipboardProvider {
    pub fn new() -> Self {
        Self {
            clipboard: Clipboard::new().ok(),
        }
    }

    pub fn set_text(&mut self, text: String) -> Result<(), String> {
        if self.clipboard.is_none() {
            self.clipboard =
                Some(Clipboard::new().map_err(|e| format!("clipboard init failed: {}", e))?);
        }
        self.clipboard
            .as_mut()
            .expect("clipboard must be initialized")
            .set_text(text)
            .map_err(|e| format!("clipboard write failed: {}", e))
    }
}
