use arboard::Clipboard;

/// Copies the given text (a generated query or a result payload) to the
/// system clipboard. Failures are logged and reported, never fatal.
pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard =
        Clipboard::new().map_err(|e| format!("Failed to initialize clipboard: {}", e))?;
    clipboard.set_text(text).map_err(|e| {
        let msg = format!("Failed to set clipboard text: {}", e);
        tracing::error!("{}", msg);
        msg
    })
}
