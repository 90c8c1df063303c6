//! Entity/property model for Pixelbench.
//!
//! Everything editable in a document — tile, sheet, map, actor, layer,
//! play-test, the document itself — is an [`Entity`]: a schema-driven object
//! with stable identity, typed properties, and change notification. This
//! crate provides:
//!
//! - [`PropDef`] / [`Schema`] — per-field contracts (kind, default factory,
//!   codec, editor metadata) declared once per concrete type
//! - [`Entity`] — value storage, mutation, per-field and wildcard watching,
//!   and hierarchical child→parent change propagation
//! - [`append_to_list`] / [`remove_from_list`] — copy-on-write list mutation
//! - [`ClassRegistry`] — the string-keyed catalog enabling polymorphic
//!   reconstruction
//! - [`to_json`] / [`restore_entity`] — the recursive tree walk between
//!   entity graphs and their JSON encoding
//!
//! The model is single-threaded, synchronous, and cooperative; handles are
//! `Rc`-based and deliberately not `Send`. Document envelopes and version
//! migration live in `pixelbench-doc`.

mod entity;
mod error;
mod list;
mod prop;
mod registry;
mod serialize;
mod value;

pub use entity::{Callback, ChangeEvent, Entity, WatchHandle};
pub use error::{LoadError, ModelError, ModelResult, NodePath, PathStep};
pub use list::{append_to_list, remove_from_list};
pub use prop::{Codec, DecodeFn, DefaultFn, EncodeFn, FormatFn, NumericSettings, PropDef, Schema};
pub use registry::{ClassRegistry, Constructor, RegistryEntry};
pub use serialize::{restore_entity, to_json};
pub use value::{PropKind, PropMap, PropValue, props};
