use crate::forms::fields::REQUIRED_MESSAGE;
use crate::forms::profile_forms::{PROFILE_FORMS, ProfileForm, QueryParams};
use crate::forms::query_error::QueryError;
use crate::image_ops::profiles::ImageProfile;

/// Query key selecting the profile form
pub const PROFILE_TYPE_KEY: &str = "profile_type";

/// Picks the profile form named by the `profile_type` parameter
pub struct ProfileRouter {
    forms: Vec<&'static ProfileForm>,
}

impl ProfileRouter {
    pub fn new(forms: Vec<&'static ProfileForm>) -> Self {
        ProfileRouter { forms }
    }

    pub fn forms(&self) -> &[&'static ProfileForm] {
        &self.forms
    }

    pub fn route(&self, params: &QueryParams) -> Result<&'static ProfileForm, QueryError> {
        let profile_type = match params.get(PROFILE_TYPE_KEY).map(|v| v.trim()) {
            Some(profile_type) if !profile_type.is_empty() => profile_type,
            _ => {
                return Err(QueryError::single(
                    PROFILE_TYPE_KEY,
                    REQUIRED_MESSAGE.to_string(),
                ));
            }
        };

        self.forms
            .iter()
            .find(|form| form.profile_type == profile_type)
            .copied()
            .ok_or_else(|| QueryError::single(PROFILE_TYPE_KEY, self.unknown_type_message()))
    }

    pub fn create_profile(&self, params: &QueryParams) -> Result<ImageProfile, QueryError> {
        self.route(params)?.clean(params)
    }

    fn unknown_type_message(&self) -> String {
        let accepted: Vec<String> = self
            .forms
            .iter()
            .map(|form| format!("\"{}\"", form.profile_type))
            .collect();
        format!("Select one of the following values: {}.", accepted.join(", "))
    }
}

impl Default for ProfileRouter {
    fn default() -> Self {
        ProfileRouter::new(PROFILE_FORMS.to_vec())
    }
}
