use crate::Error;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;
use log::*;
use serde::de::DeserializeOwned;

/// `Json` whose rejection uses the service's `{"error": ...}` body and a 400.
pub(crate) struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!("Rejected request body: {rejection}");
                Err(reject(rejection))
            }
        }
    }
}

fn reject(rejection: JsonRejection) -> Error {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            Error::input("Expected request with `Content-Type: application/json`")
        }
        _ => Error::input("Invalid JSON body"),
    }
}
