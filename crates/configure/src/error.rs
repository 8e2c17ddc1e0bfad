use crate::flags::FlagError;
use crate::types::Kind;
use thiserror::Error;

/// A malformed `#[config("...")]` tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("config fields must have a `config` tag value")]
    NoTagValue,

    #[error("config tag `{0}` can only have a key and an optional `required` option")]
    TooManyTagValues(String),

    #[error("`{0}` is not a config tag option; only `required` is allowed")]
    InvalidTagOption(String),
}

/// The top-level error type for binding a config struct.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigureError {
    #[error("invalid config tag on field `{field}`: {source}")]
    Tag {
        field: &'static str,
        source: TagError,
    },

    #[error("field `{field}` cannot be written through its accessor")]
    NotAReference { field: &'static str },

    #[error("field `{field}` has type `{type_name}`; only String, bool and f64 fields are allowed")]
    UnsupportedFieldType {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("boolean field `{field}` cannot be required")]
    BooleanCannotBeRequired { field: &'static str },

    #[error("process arguments were already parsed; use `configure_from` to bind again")]
    FlagAlreadyParsed,

    /// Flag parser errors are surfaced with their own message.
    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error("invalid JSON found in arguments")]
    InvalidJson,

    #[error("JSON value for `{field}` must be a {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: Kind,
        found: &'static str,
    },

    #[error("Missing required fields: {}", render_list(.0))]
    MissingRequiredFields(Vec<String>),

    #[error("help requested")]
    HelpPrinted,
}

impl ConfigureError {
    /// Parameter names reported missing, in field declaration order.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ConfigureError::MissingRequiredFields(names) => names,
            _ => &[],
        }
    }
}

/// `[a b c]`
fn render_list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}
