use crate::{error::PopArtError, models::ErrorBody};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

impl ResponseError for PopArtError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.public_message()))
    }
}
