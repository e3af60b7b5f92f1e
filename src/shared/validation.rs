//! Validation Utilities

use validator::ValidationErrors;

use super::error::AppError;

/// Convert validator errors into a single `AppError::Validation`.
///
/// All field messages are joined so a caller fixing a request sees every
/// problem at once instead of one per round trip.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let detail = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {detail}")
            })
        })
        .collect();
    messages.sort();

    if messages.is_empty() {
        AppError::Validation("Validation failed".into())
    } else {
        AppError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(range(min = 1, message = "must be positive"))]
        count: i32,
    }

    #[test]
    fn all_field_messages_are_reported() {
        let probe = Probe {
            name: String::new(),
            count: 0,
        };
        let err = validation_error(probe.validate().unwrap_err());
        match err {
            AppError::Validation(message) => {
                assert!(message.contains("name: must not be empty"));
                assert!(message.contains("count: must be positive"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
