use thiserror::Error;

/// Errors returned by [`AvlMap`](crate::AvlMap) lookups and cursor movement.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested key is not in the map.
    #[error("key not found")]
    NotFound,
    /// A cursor was advanced past the end of the map.
    #[error("iterator out of range")]
    IteratorOutOfRange,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Error::NotFound.to_string(), "key not found");
        assert_eq!(Error::IteratorOutOfRange.to_string(), "iterator out of range");
    }
}
