//! Legacy markdown/entity codec for MessageML documents
//!
//!     This crate converts between a structured document tree (mentions, hashtags, links,
//!     tables, form controls, styled text) and the flat legacy representation older clients
//!     consume: Markdown-flavoured text plus a side-channel index of entities with exact
//!     character offsets.
//!
//!     TLDR:
//!         - render: Document → (text, entities). Total, no error path.
//!         - parse: (text, entities JSON, media JSON) → Document. Structural problems in the
//!           input are errors; content that can't be interpreted degrades to plain text and
//!           is reported alongside the document.
//!         - User lookup and link policy are injected through IdentityProvider.
//!
//!     This is a pure lib: no printing, no env vars, no files. The mml-cli crate is the shell.
//!
//! Architecture
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ParseError, Degradation
//!     ├── entities.rs             # Entity records (wire shape of the side channel)
//!     ├── resolver.rs             # IdentityProvider, link checks, StaticDirectory
//!     ├── formats
//!     │   └── markdown
//!     │       ├── descriptors.rs  # Entity/media JSON collection and validation
//!     │       ├── enrich.rs       # Marker splicing over UTF-16 offsets
//!     │       ├── tokenizer.rs    # Slot shielding and comrak
//!     │       ├── parser.rs       # comrak AST → tree
//!     │       ├── serializer.rs   # tree → text + entities
//!     │       └── mod.rs
//!     ├── lib.rs
//!     ├── ir                      # Document tree: nodes and markers
//!     └── common                  # Delimiter codec, escaping, UTF-16 helpers
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common                  # Shared builders
//!     └── markdown
//!         ├── export.rs
//!         ├── import.rs
//!         ├── round_trip.rs
//!         └── sentinels.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     included from tests/lib.rs.
//!
//! Core Algorithms
//!
//!     Entities can't go through a Markdown tokenizer as offsets: the tokenizer rewrites the
//!     text. Instead the parser splices each entity into the text as a marker built from four
//!     reserved control characters (see common/delimiters.rs), then swaps every marker for a
//!     numbered slot so ids and cell text never meet Markdown syntax. The walk over comrak's
//!     tree expands slots back into entity and table nodes.
//!
//!     The renderer walks the tree once, tracking the emitted length in UTF-16 units, and
//!     records each entity against that length as it writes it.

pub mod common;
pub mod entities;
pub mod error;
pub mod formats;
pub mod ir;
pub mod resolver;

pub use entities::{Entities, EntityRecord};
pub use error::{Degradation, ParseError};
pub use formats::markdown::{
    parse, render, render_with_options, MarkdownParser, ParseOptions, Parsed, RenderOptions,
    Rendered,
};
pub use ir::markers::Marker;
pub use ir::nodes::{Document, Node};
pub use resolver::{IdentityProvider, LinkRejection, StaticDirectory, UserIdentity};
