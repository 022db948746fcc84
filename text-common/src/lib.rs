//! Text helpers shared by the platform services
//!
//! Small string and slice utilities, the cardholder name formatter used for
//! embossing and the character checks applied before a name is sent to a
//! personalization center.
//!
//! # Example
//!
//! ```rust
//! use text_common::{abbreviate, camel_to_snake};
//!
//! assert_eq!(abbreviate("Hello, World!", 8), "He [...]");
//! assert_eq!(camel_to_snake("PersonID"), "person_id");
//! ```

pub mod allowed_characters;
pub mod full_name;
pub mod strings;
pub mod unique;

pub use allowed_characters::{
    validate_personalization_center_characters, UnallowedCharacter, CLIENT_NAME_RESTRICTED_CHARACTERS,
    PERSONALIZATION_CENTER_ALLOWED_CHARACTERS, PRODUCT_CODE_RESTRICTED_CHARACTERS,
};
pub use full_name::{format_full_name, FullNameFormatter};
pub use strings::*;
pub use unique::UniqueStrings;
