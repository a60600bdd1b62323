// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod health;
pub mod http_server;
pub mod ocr;

pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, test_handler, HealthResponse, TestResponse};
pub use http_server::{
    bind_first_available, create_app, create_app_with_body_limit, serve, start_server, AppState,
    ServeError,
};
pub use ocr::{ocr_handler, LineDetail, OcrRequest, OcrResponse};
