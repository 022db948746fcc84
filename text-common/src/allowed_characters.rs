use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::strings::compile;

/// Characters a personalization center accepts in embossed names, in
/// lowercase. Uppercase input is lowered before the check.
pub const PERSONALIZATION_CENTER_ALLOWED_CHARACTERS: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w',
    'x', 'y', 'z',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'æ', 'ä', 'å', 'á', 'é', 'í', 'ø', 'ö', 'ó', 'õ', 'š', 'ü', 'ú', 'ž',
    'à', 'è', 'ì', 'ò', 'ù', 'â', 'ê', 'î', 'ô', 'û', 'ã', 'ñ', 'ë', 'ï', 'ÿ', 'ė', 'ç',
    'ć', 'ń', 'ś', 'ź', 'ā', 'ē', 'ī', 'ō', 'ū', 'ą', 'ę', 'į', 'ų', 'č', 'ģ', 'ķ', 'ļ', 'ņ', 'ŗ',
    'ỳ', 'ǹ', 'ẁ', 'ý', 'ǵ', 'ḱ', 'ĺ', 'ḿ', 'ṕ', 'ŕ', 'ẃ', 'ŷ', 'ĉ', 'ĝ', 'ĥ', 'ĵ', 'ŝ', 'ŵ', 'ẑ', 'ẽ', 'ĩ', 'ũ', 'ỹ',
    'ṽ', 'ḧ', 'ẅ', 'ẍ', 'ẗ', 'ẘ', 'ẙ', 'ȳ', 'ḡ', 'ă', 'ĕ', 'ĭ', 'ŏ', 'ŭ', 'ğ', 'ǫ', 'ǎ', 'ě', 'ǐ', 'ǒ', 'ǔ', 'ď', 'ǧ', 'ȟ',
    'ǰ', 'ǩ', 'ľ', 'ň', 'ř', 'ť', 'ȩ', 'ḑ', 'ḩ', 'ş', 'ţ', 'ő', 'ű', 'ů', 'ǖ', 'ǘ', 'ǚ', 'ǜ',
    '\'', '-', '/', '.', ',', '&', ' ',
];

lazy_static! {
    /// Characters not allowed in client names.
    pub static ref CLIENT_NAME_RESTRICTED_CHARACTERS: Regex = compile(r"[\\?/*\[\]]+");
    /// Characters not allowed in product codes.
    pub static ref PRODUCT_CODE_RESTRICTED_CHARACTERS: Regex = compile(r"[\\?/*\[\]]+");
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unallowed character found: {character:?} at position {position} of {value:?}")]
pub struct UnallowedCharacter {
    pub value: String,
    pub character: char,
    /// Character offset, not byte offset.
    pub position: usize,
}

/// Check that every character of `value` can be embossed.
///
/// # Errors
///
/// Returns the first character outside
/// [`PERSONALIZATION_CENTER_ALLOWED_CHARACTERS`].
pub fn validate_personalization_center_characters(value: &str) -> Result<(), UnallowedCharacter> {
    let lowered = value.to_lowercase();

    match lowered
        .chars()
        .enumerate()
        .find(|(_, character)| !PERSONALIZATION_CENTER_ALLOWED_CHARACTERS.contains(character))
    {
        Some((position, character)) => Err(UnallowedCharacter {
            value: lowered,
            character,
            position,
        }),
        None => Ok(()),
    }
}
