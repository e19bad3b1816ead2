//! Error type shared by the table engine and the container facade.

/// Failures a caller is expected to handle.
///
/// Contract violations (zero buckets, bad thresholds, stale cursors) are not
/// represented here; they panic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Memory for the bucket array or a new entry could not be obtained.
    /// The table is left exactly as it was before the call.
    Allocation,

    /// The container kind does not provide this operation.
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation => f.write_str("allocation failed"),
            Self::Unsupported { operation } => {
                write!(f, "operation `{operation}` is not supported by this container")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_names_operation() {
        let e = Error::Unsupported { operation: "clone" };
        assert_eq!(
            e.to_string(),
            "operation `clone` is not supported by this container"
        );
        assert_eq!(Error::Allocation.to_string(), "allocation failed");
    }
}
