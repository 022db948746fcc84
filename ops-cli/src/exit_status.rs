use crate::error::DevenvError;

/// Whether `err`, or any error it annotates, is a command that exited with
/// `status`.
pub fn is_exit_status(err: &DevenvError, status: i32) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if let DevenvError::CommandFailed { status: exit, .. } = err {
            return exit.code() == Some(status);
        }
        current = err.cause();
    }

    false
}
