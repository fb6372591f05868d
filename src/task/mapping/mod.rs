//! Mapping between repository records and task domain values.
//!
//! [`fields`] is the single table pairing each task attribute with its
//! external field identifier; [`link`] implements the tolerant-read,
//! strict-write rule for reference fields; [`codec`] converts whole records.

pub mod codec;
pub mod fields;
pub mod link;

pub use codec::{
    FieldMappingError, decode_staff, decode_task, encode_attributes, encode_new_task,
};
pub use fields::{FieldKind, FieldSpec, TASK_FIELDS, spec};
