use crate::core::error::GemtermError;

/// Where image mode looks for a path when the user enters an empty line.
pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<String, GemtermError>;
}

/// The desktop clipboard. The handle is opened per read so a missing
/// clipboard (headless session, no display server) only fails that read.
#[derive(Default)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<String, GemtermError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| GemtermError::Clipboard(e.to_string()))?;
        let text = clipboard
            .get_text()
            .map_err(|e| GemtermError::Clipboard(e.to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GemtermError::Clipboard("clipboard is empty".to_string()));
        }
        Ok(text.to_string())
    }
}
