use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Field name -> every message produced for it
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Invalid client input, keyed by the offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryError {
    messages: FieldErrors,
}

impl QueryError {
    pub fn new(messages: FieldErrors) -> Self {
        QueryError { messages }
    }

    pub fn single(field: &str, message: String) -> Self {
        QueryError {
            messages: IndexMap::from([(field.to_string(), vec![message])]),
        }
    }

    pub fn messages(&self) -> &FieldErrors {
        &self.messages
    }

    pub fn into_messages(self) -> FieldErrors {
        self.messages
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        write!(f, "invalid query fields: {}", fields.join(", "))
    }
}

impl std::error::Error for QueryError {}
