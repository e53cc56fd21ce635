//! Editing support: caret positions and their translation across re-renders

mod cursor;

pub use cursor::{capture, resolve, Affinity, CursorPosition, TreeCaret};
