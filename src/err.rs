#![allow(non_snake_case)]

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;
use uuid::Uuid;

use crate::validation::ValidationError;

pub async fn handler404(path: Uri) -> (StatusCode, Json<Error>) {
    (
        StatusCode::NOT_FOUND,
        Json(Error::NotFound {
            message: format!("Invalid path: {}", path),
        }),
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Maybe<T> {
    Nothing(Error),
    Fine(Success<T>),
}

pub fn Fine<V>(v: V) -> Maybe<V>
where
    V: Serialize,
{
    Maybe::Fine(Success::of(v))
}

pub fn Nothing<V>(err: Error) -> Maybe<V> {
    Maybe::Nothing(err)
}

#[derive(Debug, Clone, Serialize)]
pub struct Success<V> {
    success: bool,
    #[serde(flatten)]
    value: V,
}

impl<T> IntoResponse for Maybe<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match self {
            Maybe::Nothing(err) => err.into_response(),
            Maybe::Fine(success) => Json::into_response(Json(success)),
        }
    }
}

impl<V: Serialize> Success<V> {
    pub fn of(value: V) -> Self {
        Self {
            success: true,
            value,
        }
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "error")]
pub enum Error {
    NotFound { message: String },
    StudentNotFound { message: String },
    ValidationFailed { message: String },
    InvalidPayload { message: String },
    InternalError { kind: &'static str, message: String },
}

impl Error {
    pub fn student_not_found(id: Uuid) -> Error {
        Error::StudentNotFound {
            message: format!("Student with id `{}` does not exist!", id),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } | Error::StudentNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::ValidationFailed {
            message: err.to_string(),
        }
    }
}

impl From<uuid::Error> for Error {
    fn from(id: uuid::Error) -> Self {
        Self::InvalidPayload {
            message: format!("Invalid student id: {}", id),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload {
            message: rejection.to_string(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::InternalError {
            kind: "DatabaseError",
            message: err.to_string(),
        }
    }
}
