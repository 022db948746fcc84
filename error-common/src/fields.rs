// Field names shared by log records, custom data and error monitoring

pub const TIME: &str = "time";
pub const LEVEL: &str = "level";
pub const LEVEL_STRING: &str = "level-string";
pub const MSG: &str = "msg";
pub const ERROR: &str = "error";
pub const CALLER: &str = "caller";
pub const LOGGER_NAME: &str = "logger-name";
pub const GIT_VERSION: &str = "git-version";
pub const ORIGINAL_TRACE: &str = "original-trace";
pub const SPAN_ID: &str = "span-id";
pub const TRACE_ID: &str = "trace-id";

pub const REQUEST_ID: &str = "request-id";
pub const REQUEST_HEADERS: &str = "request-headers";
pub const REQUEST_BODY: &str = "request-body";

pub const ACCOUNT_ID: &str = "account-id";
pub const PERSON_ID: &str = "person-id";
pub const USER_ID: &str = "user-id";
pub const SERVICE_NAME: &str = "service-name";
