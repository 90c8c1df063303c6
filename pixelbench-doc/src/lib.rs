//! Document envelopes, version migration, and soft reference resolution.
//!
//! A document on disk is an envelope
//! `{ "name", "kind", "version", "root": EntityNode }`. Loading dispatches on
//! `version`: the current format restores directly, older formats pass
//! through the pure upgrade chain in [`migrate`], and anything newer or
//! unrecognizable is refused. Saving always stamps [`CURRENT_VERSION`].
//!
//! The live [`Document`] also resolves soft references: a `Ref` field or
//! tile-layer cell pointing at an id no longer in the document logs a warning
//! and resolves as absent — it never aborts a load or a render.

mod document;
mod error;
pub mod migrate;

pub use document::{Document, load_document};
pub use error::{DocError, DocResult};
pub use migrate::CURRENT_VERSION;
