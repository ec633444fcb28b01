use aide::OperationOutput;
use aide::generate::GenContext;
use aide::openapi::{MediaType, Operation, Response as OpenApiResponse, SchemaObject};
use axum::Json;
use axum::response::IntoResponse;
use http::{StatusCode, header};
use indexmap::IndexMap;
use schemars::json_schema;
use serde::Serialize;

/// Error answer: status plus an optional JSON payload
pub(crate) struct ApiError<T> {
    status: StatusCode,
    payload: Option<T>,
}

impl<T: Serialize> IntoResponse for ApiError<T> {
    fn into_response(self) -> axum::response::Response {
        match self.payload {
            Some(payload) => (self.status, Json(payload)).into_response(),
            None => self.status.into_response(),
        }
    }
}

impl<T> OperationOutput for ApiError<T> {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        None
    }

    fn inferred_responses(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        let field_errors = json_schema!({
            "type": "object",
            "additionalProperties": {
                "type": "array",
                "items": { "type": "string" }
            }
        });
        vec![
            (
                Some(400),
                OpenApiResponse {
                    description: "Invalid query, messages keyed by field name.".to_string(),
                    content: IndexMap::from_iter([(
                        "application/json".to_string(),
                        MediaType {
                            schema: Some(SchemaObject {
                                json_schema: field_errors,
                                example: None,
                                external_docs: None,
                            }),
                            ..Default::default()
                        },
                    )]),
                    ..Default::default()
                },
            ),
            (
                Some(500),
                OpenApiResponse {
                    description: "Image could not be generated or stored.".to_string(),
                    ..Default::default()
                },
            ),
        ]
    }
}

/// 302 answer pointing at a stored image
pub(crate) struct RedirectResponse(pub String);

impl IntoResponse for RedirectResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

impl OperationOutput for RedirectResponse {
    type Inner = ();

    fn operation_response(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        Some(redirect_response())
    }

    fn inferred_responses(
        _ctx: &mut GenContext,
        _operation: &mut Operation,
    ) -> Vec<(Option<u16>, OpenApiResponse)> {
        vec![(Some(302), redirect_response())]
    }
}

fn redirect_response() -> OpenApiResponse {
    OpenApiResponse {
        description: "Redirect to the stored image, url in the Location header.".to_string(),
        ..Default::default()
    }
}

pub fn api_error<T>(status: StatusCode, payload: Option<T>) -> ApiError<T> {
    ApiError { status, payload }
}
