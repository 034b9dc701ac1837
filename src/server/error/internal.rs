use thiserror::Error;

/// Internal issues indicating unexpected stored data or possible bugs.
#[derive(Error, Debug)]
pub enum InternalError {
    /// A Discord id column holds something that is not a decimal snowflake.
    #[error("Stored value '{value}' in column {column} is not a valid Discord id")]
    InvalidStoredId {
        /// Column the value was read from
        column: &'static str,
        /// The offending value
        value: String,
    },

    /// A timestamp could not be converted into Discord's representation.
    #[error("Failed to convert timestamp {timestamp} for Discord: {reason}")]
    InvalidDiscordTimestamp { timestamp: i64, reason: String },
}
