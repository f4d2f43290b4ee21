//! Helpers shared by the renderer and the parser.

pub mod delimiters;
pub mod escape;
pub mod utf16;
