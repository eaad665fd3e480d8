use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Modifiers that turn a keypress into a shortcut rather than a symbol.
/// Shift is left out because most targets need it.
const CHORD_MODIFIERS: KeyModifiers = KeyModifiers::ALT
    .union(KeyModifiers::CONTROL)
    .union(KeyModifiers::META)
    .union(KeyModifiers::SUPER);

/// The single printable character a key event types, or None for chords,
/// releases and non-character keys.
pub fn printable_char(key: &KeyEvent) -> Option<char> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.intersects(CHORD_MODIFIERS) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(c),
        _ => None,
    }
}
