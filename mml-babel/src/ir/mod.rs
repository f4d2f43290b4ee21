//! Document tree shared by both conversion directions.
//!
//! [`nodes`] holds the generic structure (text, emphasis, lists, links,
//! code); [`markers`] holds the closed set of platform markers and the
//! transient [`markers::EncodedNode`] the parser decodes from the
//! intermediate encoding.

pub mod markers;
pub mod nodes;
