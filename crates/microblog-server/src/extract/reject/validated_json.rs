//! JSON extractor that also runs `validator` rules.

use std::borrow::Cow;
use std::collections::HashMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// [`Json`] followed by [`Validate::validate`].
///
/// Field failures are reported in a single `400 bad_request` body with the
/// resource set to `request`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

fn format_length_error(field: &str, params: &HashMap<Cow<'static, str>, serde_json::Value>) -> String {
    let number = |key: &str| params.get(key).and_then(serde_json::Value::as_u64);

    match (number("min"), number("max")) {
        (Some(min), Some(max)) => format!(
            "Field '{}' must be between {} and {} characters long",
            field, min, max
        ),
        (Some(min), None) => format!("Field '{}' must be at least {} characters long", field, min),
        (None, Some(max)) => format!("Field '{}' must be at most {} characters long", field, max),
        _ => format!("Field '{}' has invalid length", field),
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(custom_message) = &error.message {
        return format!("Field '{}': {}", field, custom_message);
    }

    match error.code.as_ref() {
        "length" => format_length_error(field, &error.params),
        "email" => format!("Field '{}' must be a valid email address", field),
        "url" => format!("Field '{}' must be a valid URL", field),
        "required" => format!("Field '{}' is required", field),
        code => format!("Field '{}' failed validation: {}", field, code),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        let error_messages: Vec<String> = field_errors
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();

        let user_message = match error_messages.as_slice() {
            [] => "Validation failed".to_string(),
            [single_error] => single_error.clone(),
            multiple => multiple.join(". "),
        };

        tracing::debug!(
            target: "microblog_server::extract::validate",
            errors = %user_message,
            "request validation failed"
        );

        ErrorKind::BadRequest
            .with_message(user_message)
            .with_resource("request")
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 1, max = 32))]
        username: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn reports_every_field_in_order() {
        let signup = Signup {
            username: String::new(),
            email: "not-an-email".into(),
        };

        let error = Error::from(signup.validate().unwrap_err());
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("request"));
        assert_eq!(
            error.message(),
            Some(
                "Field 'email' must be a valid email address. \
                 Field 'username' must be between 1 and 32 characters long"
            )
        );
    }

    #[test]
    fn valid_payload_passes() {
        let signup = Signup {
            username: "ada".into(),
            email: "ada@example.com".into(),
        };
        assert!(signup.validate().is_ok());
    }
}
