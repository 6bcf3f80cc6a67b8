//! PolicySage Compare: prompt composition, response decoding and the
//! comparison pipeline.
//!
//! `Comparator::compare` runs Composer → Invoker → Decoder → Validator on
//! already-normalized fragments.

pub mod decode;
pub mod pipeline;
pub mod prompt;
pub mod validate;

pub use decode::{decode_response, find_string_field, recover_fields, unescape_recovered};
pub use pipeline::{Comparator, MIN_FRAGMENTS};
pub use prompt::{compose_prompt, compose_with_branch, Branch, TargetInsurer, CHECKLIST};
pub use validate::validate_result;
