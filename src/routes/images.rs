use crate::config::Config;
use crate::forms::query_error::FieldErrors;
use crate::openapi::ProfileQuery;
use crate::processing::ProcessingError;
use crate::routes::responses::{ApiError, RedirectResponse, api_error};
use axum::extract::State;
use http::StatusCode;
use log::{debug, error, info};
use std::sync::Arc;

/// Redirect to the image described by the query, generating it on first request
pub(crate) async fn get_image(
    State(state): State<Arc<Config>>,
    ProfileQuery(params): ProfileQuery,
) -> Result<RedirectResponse, ApiError<FieldErrors>> {
    match state.processor.get(&params).await {
        Ok(location) => {
            info!("Serving image {}", location.url());
            Ok(RedirectResponse(location.into_url()))
        }
        Err(ProcessingError::Query(err)) => {
            debug!("Rejected image query: {:?}", err.messages());
            Err(api_error(StatusCode::BAD_REQUEST, Some(err.into_messages())))
        }
        Err(err) => {
            error!("Failed to serve image: {}", err);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, None))
        }
    }
}
