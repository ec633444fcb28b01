use crate::forms::fields::{FieldKind, FieldSpec};
use crate::forms::profile_forms::{PROFILE_FORMS, QueryParams};
use crate::forms::router::PROFILE_TYPE_KEY;
use aide::generate::GenContext;
use aide::openapi::{
    Parameter, ParameterData, ParameterSchemaOrContent, QueryStyle, SchemaObject,
};
use aide::operation::{OperationInput, add_parameters};
use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query};
use http::request::Parts;
use indexmap::IndexMap;
use schemars::{Schema, json_schema};

/// Raw query parameters of the image endpoint.
///
/// Which parameters apply depends on `profile_type`, so the documented
/// parameters are the union of every registered form's fields.
pub struct ProfileQuery(pub QueryParams);

impl<S> FromRequestParts<S> for ProfileQuery
where
    S: Send + Sync,
{
    type Rejection = QueryRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<QueryParams>::from_request_parts(parts, state).await?;
        Ok(ProfileQuery(params))
    }
}

impl OperationInput for ProfileQuery {
    fn operation_input(ctx: &mut GenContext, operation: &mut aide::openapi::Operation) {
        let profile_types: Vec<&str> = PROFILE_FORMS
            .iter()
            .map(|form| form.profile_type)
            .collect();

        let mut parameters = vec![query_parameter(
            PROFILE_TYPE_KEY,
            "Profile of the requested image, selects which other parameters apply.",
            true,
            json_schema!({ "type": "string", "enum": profile_types }),
        )];

        let mut documented: Vec<&str> = Vec::new();
        for form in PROFILE_FORMS.iter() {
            for field in form.fields.iter() {
                if documented.contains(&field.name) {
                    continue;
                }
                documented.push(field.name);
                parameters.push(query_parameter(
                    field.name,
                    &field_description(field),
                    false,
                    field_schema(field),
                ));
            }
        }

        add_parameters(ctx, operation, parameters);
    }
}

fn field_description(field: &FieldSpec) -> String {
    let profile_types: Vec<&str> = PROFILE_FORMS
        .iter()
        .filter(|form| form.fields.iter().any(|f| f.name == field.name))
        .map(|form| form.profile_type)
        .collect();
    format!("{}. Used by: {}.", field.help_text, profile_types.join(", "))
}

fn field_schema(field: &FieldSpec) -> Schema {
    match field.kind {
        FieldKind::Integer { min, max } => json_schema!({
            "type": "integer",
            "minimum": min,
            "maximum": max,
            "default": field.initial.parse::<i64>().ok(),
        }),
        FieldKind::HexColor => json_schema!({
            "type": "string",
            "pattern": "^([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$",
            "default": field.initial,
        }),
    }
}

fn query_parameter(name: &str, description: &str, required: bool, schema: Schema) -> Parameter {
    Parameter::Query {
        parameter_data: ParameterData {
            name: name.to_string(),
            description: Some(description.to_string()),
            required,
            format: ParameterSchemaOrContent::Schema(SchemaObject {
                json_schema: schema,
                example: None,
                external_docs: None,
            }),
            extensions: Default::default(),
            deprecated: None,
            example: None,
            examples: IndexMap::default(),
            explode: None,
        },
        allow_reserved: false,
        style: QueryStyle::Form,
        allow_empty_value: None,
    }
}
