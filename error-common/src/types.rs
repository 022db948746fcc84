use std::error::Error as StdError;
use std::fmt;

use serde_json::{Map, Value};

use crate::context::CustomData;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error message, optionally annotating an underlying cause.
///
/// `Display` prints only the message; the cause is reachable through
/// [`StdError::source`], so [`error_chain`] renders `"message: cause"`.
#[derive(Debug)]
pub struct Annotated {
    message: String,
    source: Option<BoxError>,
}

impl Annotated {
    pub fn msg<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn new<E: Into<BoxError>, M: Into<String>>(source: E, message: M) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for Annotated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Annotated {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Error carrying [`CustomData`] alongside the error it wraps.
///
/// It is transparent: `Display` and `source()` are those of the wrapped
/// error, so wrapping never changes the rendered message. Use
/// [`custom_data_fields`] to collect the data of every layer in a chain.
#[derive(Debug)]
pub struct CustomDataError {
    custom_data: CustomData,
    source: BoxError,
}

impl CustomDataError {
    /// New error from a message with custom data attached.
    pub fn new<M: Into<String>>(message: M, custom_data: CustomData) -> Self {
        Self {
            custom_data,
            source: Box::new(Annotated::msg(message)),
        }
    }

    /// Attach custom data to an existing error.
    pub fn wrap<E: Into<BoxError>>(err: E, custom_data: CustomData) -> Self {
        Self {
            custom_data,
            source: err.into(),
        }
    }

    /// Annotate `other` with a message and custom data. When `other` already
    /// carries custom data, both sets are merged and the new values win.
    pub fn annotate<E, M>(other: E, message: M, custom_data: CustomData) -> Self
    where
        E: Into<BoxError>,
        M: Into<String>,
    {
        let other = other.into();
        let custom_data = match other.downcast_ref::<CustomDataError>() {
            Some(existing) => existing.custom_data.clone().merge(custom_data),
            None => custom_data,
        };

        Self {
            custom_data,
            source: Box::new(Annotated::new(other, message)),
        }
    }

    pub fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    /// The wrapped error itself (not its cause).
    pub fn inner(&self) -> &(dyn StdError + 'static) {
        &*self.source
    }
}

impl fmt::Display for CustomDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl StdError for CustomDataError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.source()
    }
}

/// Merge the custom data of every [`CustomDataError`] found in the chain of
/// `err` into `fields`. Values already present win, so explicit fields beat
/// outer layers and outer layers beat inner ones.
pub fn custom_data_fields(
    err: &(dyn StdError + 'static),
    mut fields: Map<String, Value>,
) -> Map<String, Value> {
    let mut current = Some(err);
    while let Some(e) = current {
        match e.downcast_ref::<CustomDataError>() {
            Some(with_data) => {
                for (name, value) in with_data.custom_data().fields() {
                    if !fields.contains_key(name) {
                        fields.insert(name.clone(), value.clone());
                    }
                }
                current = Some(with_data.inner());
            }
            None => current = e.source(),
        }
    }

    fields
}

/// Render `err` and all its causes as `"outer: inner: root"`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let message = cause.to_string();
        if !message.is_empty() && !rendered.ends_with(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        current = cause.source();
    }

    rendered
}
