//! Registry credential parsing.

use skiff_common::error::{Result, SkiffError};

use crate::context::RegistryAuth;

/// Splits a `USERNAME[:PASSWORD]` string into its components.
///
/// The split happens on the first colon only, so the password may itself
/// contain colons. A missing colon yields an empty password.
///
/// # Errors
///
/// Returns `SkiffError::Credentials` if the input is empty or the username
/// before the colon is empty.
pub fn parse_creds(creds: &str) -> Result<(String, String)> {
    if creds.is_empty() {
        return Err(SkiffError::Credentials {
            message: "credentials can't be empty".into(),
        });
    }
    match creds.split_once(':') {
        None => Ok((creds.to_owned(), String::new())),
        Some(("", _)) => Err(SkiffError::Credentials {
            message: "username can't be empty".into(),
        }),
        Some((username, password)) => Ok((username.to_owned(), password.to_owned())),
    }
}

/// Parses a `USERNAME[:PASSWORD]` string into a [`RegistryAuth`] record.
///
/// # Errors
///
/// Returns `SkiffError::Credentials` for the same inputs as [`parse_creds`].
pub fn registry_auth(creds: &str) -> Result<RegistryAuth> {
    let (username, password) = parse_creds(creds)?;
    Ok(RegistryAuth { username, password })
}
