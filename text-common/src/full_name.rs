//! Cardholder name formatting
//!
//! Embossed names hold at most [`FULL_NAME_ALLOWED_CHARS`] characters. The
//! longest form that fits is chosen: full names first, then initials for the
//! middle and first names, then the last name alone, cut at a word boundary
//! when even that is too long. The layout of each form is up to the
//! [`FullNameFormatter`].

pub const FULL_NAME_ALLOWED_CHARS: usize = 26;
pub const FULL_NAME_ALLOWED_CHARS_ONE_RESERVED: usize = 25;
pub const FULL_NAME_ALLOWED_CHARS_TWO_RESERVED: usize = 24;
pub const FULL_NAME_ALLOWED_CHARS_THREE_RESERVED: usize = 23;

/// Layouts for each shortened form of a name.
pub trait FullNameFormatter {
    fn format_first_name_initial_last_name(&self, first_name_initial: char, last_name: &str) -> String;
    fn format_first_name_initial_middle_name_initial_last_name(
        &self,
        first_name_initial: char,
        middle_name_initial: char,
        last_name: &str,
    ) -> String;
    fn format_first_name_last_name(&self, first_name: &str, last_name: &str) -> String;
    fn format_first_name_middle_name_initial_last_name(
        &self,
        first_name: &str,
        middle_name_initial: char,
        last_name: &str,
    ) -> String;
    fn format_first_name_middle_name_last_name(&self, first_name: &str, middle_name: &str, last_name: &str) -> String;
    fn format_last_name(&self, last_name: &str) -> String;
    /// Last name exactly [`FULL_NAME_ALLOWED_CHARS`] long.
    fn format_last_name_equal_full_name_allowed_chars(&self, last_name: &str) -> String;
}

/// Pick the longest form of the name that fits and return it uppercased and
/// trimmed. Lengths are counted in characters.
pub fn format_full_name<F>(formatter: &F, first_name: &str, middle_name: &str, last_name: &str) -> String
where
    F: FullNameFormatter + ?Sized,
{
    let full_name = if middle_name.is_empty() {
        first_name_last_name(formatter, first_name, last_name)
    } else {
        first_name_middle_name_last_name(formatter, first_name, middle_name, last_name)
    };

    full_name.to_uppercase().trim().to_string()
}

fn length(s: &str) -> usize {
    s.chars().count()
}

fn initial(s: &str) -> Option<char> {
    s.chars().next()
}

fn first_name_last_name<F>(formatter: &F, first_name: &str, last_name: &str) -> String
where
    F: FullNameFormatter + ?Sized,
{
    if length(first_name) + length(last_name) < FULL_NAME_ALLOWED_CHARS {
        return formatter.format_first_name_last_name(first_name, last_name);
    }

    match length(last_name) {
        len if len < FULL_NAME_ALLOWED_CHARS_ONE_RESERVED => first_initial_last_name(formatter, first_name, last_name),
        len if len > FULL_NAME_ALLOWED_CHARS => long_last_name(formatter, last_name),
        FULL_NAME_ALLOWED_CHARS => formatter.format_last_name_equal_full_name_allowed_chars(last_name),
        _ => formatter.format_last_name(last_name),
    }
}

fn first_name_middle_name_last_name<F>(formatter: &F, first_name: &str, middle_name: &str, last_name: &str) -> String
where
    F: FullNameFormatter + ?Sized,
{
    if length(first_name) + length(middle_name) + length(last_name) < FULL_NAME_ALLOWED_CHARS_ONE_RESERVED {
        return formatter.format_first_name_middle_name_last_name(first_name, middle_name, last_name);
    }

    if let Some(middle_initial) = initial(middle_name) {
        if length(first_name) + length(last_name) < FULL_NAME_ALLOWED_CHARS_TWO_RESERVED {
            return formatter.format_first_name_middle_name_initial_last_name(first_name, middle_initial, last_name);
        }
    }

    match length(last_name) {
        len if len < FULL_NAME_ALLOWED_CHARS_THREE_RESERVED => match (initial(first_name), initial(middle_name)) {
            (Some(first_initial), Some(middle_initial)) => formatter
                .format_first_name_initial_middle_name_initial_last_name(first_initial, middle_initial, last_name),
            _ => first_initial_last_name(formatter, first_name, last_name),
        },
        FULL_NAME_ALLOWED_CHARS_THREE_RESERVED | FULL_NAME_ALLOWED_CHARS_TWO_RESERVED => {
            first_initial_last_name(formatter, first_name, last_name)
        }
        len if len > FULL_NAME_ALLOWED_CHARS => long_last_name(formatter, last_name),
        FULL_NAME_ALLOWED_CHARS => formatter.format_last_name_equal_full_name_allowed_chars(last_name),
        _ => formatter.format_last_name(last_name),
    }
}

// Without a first name there is no initial to print, so the last name stands
// alone.
fn first_initial_last_name<F>(formatter: &F, first_name: &str, last_name: &str) -> String
where
    F: FullNameFormatter + ?Sized,
{
    match initial(first_name) {
        Some(first_initial) => formatter.format_first_name_initial_last_name(first_initial, last_name),
        None => formatter.format_last_name(last_name),
    }
}

/// Cut at the 24th character when a word ends there, else at the 25th.
fn long_last_name<F>(formatter: &F, last_name: &str) -> String
where
    F: FullNameFormatter + ?Sized,
{
    let boundary = last_name.chars().nth(FULL_NAME_ALLOWED_CHARS_TWO_RESERVED);
    let keep = if matches!(boundary, Some(' ' | '-')) {
        FULL_NAME_ALLOWED_CHARS_TWO_RESERVED
    } else {
        FULL_NAME_ALLOWED_CHARS_ONE_RESERVED
    };

    let cut: String = last_name.chars().take(keep).collect();
    formatter.format_last_name(&cut)
}
