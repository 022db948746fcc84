// Logging macros

/// Build an [`Event`](crate::Event) field map from `key => value` pairs.
/// Values can be anything serializable.
///
/// ```rust
/// let fields = logger_redacted::fields! {
///     "account-id" => "acc-1",
///     "attempt" => 2,
/// };
/// assert_eq!(fields["attempt"], 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Event::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Event::new();
        $(
            fields.insert(::std::string::String::from($key), $crate::__private::serde_json::json!($value));
        )+
        fields
    }};
}
