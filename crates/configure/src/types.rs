use crate::error::TagError;
use std::fmt;

/// Option accepted after the comma in a binding tag.
const REQUIRED_OPTION: &str = "required";

/// Kind of value a config field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Bool,
    Float,
    /// A field type the binder cannot populate, carrying the type as written.
    Unsupported(&'static str),
}

impl Kind {
    /// Value placeholder shown after the flag in help output.
    /// Boolean flags take no placeholder.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Kind::String => Some("string"),
            Kind::Float => Some("float"),
            Kind::Bool | Kind::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => write!(f, "string"),
            Kind::Bool => write!(f, "boolean"),
            Kind::Float => write!(f, "number"),
            Kind::Unsupported(ty) => write!(f, "{ty}"),
        }
    }
}

/// Specification of a config field, in declaration order.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name in the struct
    pub name: &'static str,
    /// Raw binding tag, e.g. `district_id,required`. Empty when the field
    /// carries no `#[config(...)]` attribute.
    pub tag: &'static str,
    /// Kind of value exposed by this field.
    pub kind: Kind,
    /// Combined doc comments extracted from the field.
    pub doc: Option<&'static str>,
}

impl FieldSpec {
    /// Parse this field's binding tag.
    pub fn binding(&self) -> Result<Tag<'static>, TagError> {
        parse_tag(self.tag)
    }
}

/// Mutable view of one field of a config struct.
#[derive(Debug)]
pub enum FieldMut<'a> {
    String(&'a mut String),
    Bool(&'a mut bool),
    Float(&'a mut f64),
}

impl FieldMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            FieldMut::String(_) => Kind::String,
            FieldMut::Bool(_) => Kind::Bool,
            FieldMut::Float(_) => Kind::Float,
        }
    }

    /// Whether the field still holds the zero value of its kind.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldMut::String(s) => s.is_empty(),
            FieldMut::Bool(b) => !**b,
            FieldMut::Float(f) => **f == 0.0,
        }
    }
}

/// Binding metadata parsed from a field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// External flag / JSON key the field is bound to.
    pub name: &'a str,
    pub required: bool,
}

/// Parse a binding tag of the form `name` or `name,required`.
///
/// ```rust
/// use configure::{parse_tag, Tag, TagError};
///
/// assert_eq!(
///     parse_tag("district_id,required"),
///     Ok(Tag { name: "district_id", required: true })
/// );
/// assert_eq!(parse_tag(""), Err(TagError::NoTagValue));
/// ```
pub fn parse_tag(tag: &str) -> Result<Tag<'_>, TagError> {
    if tag.is_empty() {
        return Err(TagError::NoTagValue);
    }

    let parts: Vec<&str> = tag.split(',').collect();
    let parsed = match parts.as_slice() {
        [name] => Tag {
            name: *name,
            required: false,
        },
        [name, option] if *option == REQUIRED_OPTION => Tag {
            name: *name,
            required: true,
        },
        [_, option] => return Err(TagError::InvalidTagOption((*option).to_string())),
        _ => return Err(TagError::TooManyTagValues(tag.to_string())),
    };

    if parsed.name.is_empty() {
        return Err(TagError::NoTagValue);
    }
    Ok(parsed)
}

/// Trait that all bindable config structs implement, normally through
/// `#[derive(Configure)]`.
///
/// `fields()` and `field_mut()` must agree: index `i` of `fields()` describes
/// the value `field_mut(i)` hands out. Fields of an unsupported kind have no
/// accessor and return `None`.
pub trait Configure {
    /// Metadata about all fields in the struct.
    fn fields() -> &'static [FieldSpec];

    /// Mutable access to the field at `index`.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    /// Aggregated documentation for the struct (from `///` comments).
    fn doc() -> Option<&'static str> {
        None
    }
}
