//! Validation Utilities

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    #[test]
    fn first_field_error_becomes_message() {
        let err = Probe {
            name: "ab".into(),
        }
        .validate()
        .unwrap_err();

        let app_err = validation_error(err);
        match app_err {
            AppError::Validation(msg) => assert_eq!(msg, "name: too short"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
