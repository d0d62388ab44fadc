//! Shared response envelope for API handlers.
//!
//! Every success body is `{ "ok": true, "message": ..., "data": ... }`; error
//! bodies are produced by [`crate::error::AppError`] with `ok: false`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data,
        }
    }
}
