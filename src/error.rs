use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a boolean, found {:?}", name, found))]
    ParseFlag { name: &'static str, found: String },
    #[snafu(display("Unable to parse query string"))]
    ParseQuery { source: serde_html_form::de::Error },
    #[snafu(display("Missing required fields"))]
    MissingRequiredFields,
    #[snafu(display("Student not found"))]
    StudentNotFound { id: i64 },
    #[snafu(display("No changes made or student not found"))]
    NoChangesMade { id: i64 },
    #[snafu(display("No ID provided"))]
    NoIdProvided,
}

impl StudentsError {
    /// The text a client sees in the `message` field.
    ///
    /// Database failures surface the driver's own wording rather than our context message.
    pub fn client_message(&self) -> String {
        match self {
            Self::OpenDatabase { source }
            | Self::GetDatabaseConnection { source }
            | Self::MakeQuery { source } => source.to_string(),
            Self::Migrate { source } => source.to_string(),
            _ => self.to_string(),
        }
    }

    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ParseQuery { .. }
                | Self::MissingRequiredFields
                | Self::StudentNotFound { .. }
                | Self::NoChangesMade { .. }
                | Self::NoIdProvided
        )
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for StudentsError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            warn!(?self, "Rejected request");
        } else {
            error!(?self, "Error!");
        }

        //errors are signalled in the body only, the status line stays 200
        let body = ErrorBody {
            status: "error",
            message: self.client_message(),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_exact_wording() {
        assert_eq!(
            StudentsError::MissingRequiredFields.client_message(),
            "Missing required fields"
        );
        assert_eq!(
            StudentsError::StudentNotFound { id: 4 }.client_message(),
            "Student not found"
        );
        assert_eq!(
            StudentsError::NoChangesMade { id: 4 }.client_message(),
            "No changes made or student not found"
        );
        assert_eq!(StudentsError::NoIdProvided.client_message(), "No ID provided");
    }

    #[test]
    fn storage_errors_expose_driver_text() {
        let error = StudentsError::MakeQuery {
            source: sqlx::Error::PoolTimedOut,
        };
        assert!(!error.is_client_error());
        assert_eq!(
            error.client_message(),
            sqlx::Error::PoolTimedOut.to_string()
        );
    }
}
