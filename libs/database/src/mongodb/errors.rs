use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for a unique index violation (E11000).
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Returns `true` when the server rejected a write because it would break a
/// unique index.
///
/// Repositories use this to turn the store's own uniqueness signal into the
/// same domain error a read-before-write check would have produced.
pub fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

