use crate::config::Config;
use crate::forms::fields::{FieldKind, FieldKindName, FieldSpec};
use crate::forms::profile_forms::ProfileForm;
use axum::Json;
use axum::extract::State;
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;

const IMAGE_ENDPOINT: &str = "/api/get";

#[derive(Debug, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FieldDescription {
    pub name: String,
    pub kind: FieldKindName,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    pub initial: String,
    pub help_text: String,
}

impl From<&FieldSpec> for FieldDescription {
    fn from(field: &FieldSpec) -> Self {
        let (min, max) = match field.kind {
            FieldKind::Integer { min, max } => (Some(min), Some(max)),
            FieldKind::HexColor => (None, None),
        };
        FieldDescription {
            name: field.name.to_string(),
            kind: field.kind_name(),
            required: field.required,
            min,
            max,
            initial: field.initial.to_string(),
            help_text: field.help_text.to_string(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ProfileDescription {
    pub profile_type: String,
    pub description: String,
    pub fields: Vec<FieldDescription>,
    /// Image request built from the initial field values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_url: Option<String>,
}

impl From<&ProfileForm> for ProfileDescription {
    fn from(form: &ProfileForm) -> Self {
        ProfileDescription {
            profile_type: form.profile_type.to_string(),
            description: form.description.to_string(),
            fields: form.fields.iter().map(FieldDescription::from).collect(),
            example_url: form
                .example_profile()
                .map(|profile| format!("{}?{}", IMAGE_ENDPOINT, profile.query_string())),
        }
    }
}

/// Registered image profiles and their query parameters
pub(crate) async fn list_profiles(
    State(state): State<Arc<Config>>,
) -> Json<Vec<ProfileDescription>> {
    let forms = state.processor.router().forms();
    Json(forms.iter().map(|form| ProfileDescription::from(*form)).collect())
}
