use thiserror::Error;

/// A problem found while resolving raw chat text into a command.
///
/// Resolution itself never fails; problems accumulate on the command body
/// and the acknowledgement formatter renders them back to the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown command `{word}`")]
    UnknownCommand { word: String },
    #[error("unknown argument `{key}`")]
    UnknownArgument { key: String },
    #[error("invalid value `{value}` for `{key}` (expected {expected})")]
    InvalidValue { key: String, value: String, expected: &'static str },
}

#[cfg(test)]
mod tests {
    use crate::errors::ResolveError;

    #[test]
    fn display_names_the_offending_token() {
        let err = ResolveError::UnknownArgument { key: "colour".to_owned() };
        assert_eq!(err.to_string(), "unknown argument `colour`");

        let err = ResolveError::InvalidValue {
            key: "dryrun".to_owned(),
            value: "maybe".to_owned(),
            expected: "true or false",
        };
        assert_eq!(err.to_string(), "invalid value `maybe` for `dryrun` (expected true or false)");
    }
}
