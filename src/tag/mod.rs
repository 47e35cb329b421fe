//! Struct tag micro-grammar.
//!
//! A struct tag like `` `gorm:"column:id;type:bigint" json:"id"` `` holds
//! quoted values per key, and some keys (`gorm` style) nest a
//! `field:value;` list inside their value. This module reads and rewrites
//! both levels with exact byte offsets.

pub mod errors;
pub mod extract;
pub mod set;

pub use errors::TagError;
pub use extract::{
    extract_equals_value_index, extract_field, extract_field_index, extract_keyed_value,
    extract_keyed_value_index, extract_presence_only_field_index, FieldMode, TagMatch,
};
pub use set::{rewrite_struct_tag, set_tag_field_value, InsertLocation};
