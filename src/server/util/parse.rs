use sea_orm::DbErr;

use crate::server::error::{internal::InternalError, AppError};

/// Parses a Discord id read back from the database.
///
/// Ids are stored as decimal strings, so a failure here means the row was written by
/// something other than this application.
///
/// # Arguments
/// - `column` - Column name, used in the error message
/// - `value` - Stored string
///
/// # Returns
/// - `Ok(u64)` - Parsed id
/// - `Err(DbErr::Custom)` - Value is not a decimal `u64`
pub fn parse_stored_id(column: &'static str, value: &str) -> Result<u64, DbErr> {
    value.parse::<u64>().map_err(|_| {
        DbErr::Custom(
            InternalError::InvalidStoredId {
                column,
                value: value.to_string(),
            }
            .to_string(),
        )
    })
}

/// Optional variant of [`parse_stored_id`].
pub fn parse_optional_stored_id(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<u64>, DbErr> {
    value.map(|v| parse_stored_id(column, v)).transpose()
}

/// Parses an id typed by a user, such as a message id passed as a string command option.
///
/// Accepts surrounding whitespace and the `<#...>`, `<@...>`, `<@!...>` and `<@&...>`
/// mention forms Discord clients produce when an id is pasted.
///
/// # Returns
/// - `Ok(u64)` - Parsed id
/// - `Err(AppError::InvalidArgument)` - Input is not an id
pub fn parse_user_supplied_id(label: &str, input: &str) -> Result<u64, AppError> {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches(['#', '@', '!', '&']))
        .unwrap_or(trimmed);

    bare.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| AppError::InvalidArgument(format!("`{}` is not a valid {}.", input, label)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_mention_forms() {
        assert_eq!(parse_user_supplied_id("message id", " 123 ").unwrap(), 123);
        assert_eq!(parse_user_supplied_id("channel", "<#456>").unwrap(), 456);
        assert_eq!(parse_user_supplied_id("user", "<@!789>").unwrap(), 789);
    }

    #[test]
    fn rejects_garbage_as_invalid_argument() {
        let result = parse_user_supplied_id("message id", "hello");

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn stored_id_failure_names_column() {
        let err = parse_stored_id("role_id", "abc").unwrap_err();

        assert!(err.to_string().contains("role_id"));
    }
}
