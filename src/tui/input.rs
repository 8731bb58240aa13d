//! Board cursor movement for keyboard navigation.

use crossterm::event::KeyCode;

/// Moves the board cursor (0..9, row-major) for an arrow key. Other keys and
/// edge-of-board moves leave the cursor where it is.
pub fn move_cursor(cursor: usize, key: KeyCode) -> usize {
    let (row, col) = (cursor / 3, cursor % 3);
    let (row, col) = match key {
        KeyCode::Left if col > 0 => (row, col - 1),
        KeyCode::Right if col < 2 => (row, col + 1),
        KeyCode::Up if row > 0 => (row - 1, col),
        KeyCode::Down if row < 2 => (row + 1, col),
        _ => (row, col),
    };
    row * 3 + col
}
