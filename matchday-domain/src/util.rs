use crate::{ServiceError, ServiceResult};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 20;

/// Validate a username and return it trimmed.
pub fn validate_username(username: &str) -> ServiceResult<&str> {
    let username = username.trim();
    if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
        return ServiceError::bad_request(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LEN, MAX_USERNAME_LEN
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return ServiceError::bad_request(
            "Username may only contain letters, digits, '_' and '-'",
        );
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("admin").unwrap(), "admin");
        assert_eq!(validate_username("  coach_1 ").unwrap(), "coach_1");
        assert!(validate_username("ab").is_err());
        assert!(validate_username("name with spaces").is_err());
        assert!(validate_username("waaaaaaaaaaaaaaaaaaaaaaay-too-long").is_err());
    }
}
