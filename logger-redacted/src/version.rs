use lazy_static::lazy_static;

lazy_static! {
    static ref GIT_VERSION: String = resolve(option_env!("GIT_VERSION"), std::env::var("CODE_VERSION").ok());
}

/// Code version written to every record as `git-version` and reported to the
/// error monitor.
///
/// Taken from `GIT_VERSION` at build time, falling back to the `CODE_VERSION`
/// environment variable at runtime.
pub fn git_version() -> &'static str {
    GIT_VERSION.as_str()
}

fn resolve(build: Option<&str>, runtime: Option<String>) -> String {
    build
        .filter(|version| !version.is_empty())
        .map(str::to_string)
        .or(runtime)
        .unwrap_or_default()
}
