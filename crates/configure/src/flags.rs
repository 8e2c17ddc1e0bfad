//! A small command-line flag parser.
//!
//! Accepts `-name=value`, `--name=value`, `-name value` and bare `-name` for
//! boolean flags. Parsing stops at the first argument that is not a flag, or
//! after a `--` terminator; everything from there on is positional.
//!
//! A [`FlagSet`] is an ordinary value. Build one per parse; nothing is shared
//! between calls.

use crate::types::Kind;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors produced while defining or parsing flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid boolean value {value:?} for -{name}: parse error")]
    InvalidBool { name: String, value: String },

    #[error("invalid value {value:?} for flag -{name}: parse error")]
    InvalidValue { name: String, value: String },

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    #[error("flag redefined: {0}")]
    Redefined(String),

    /// `-h`, `-help` or `--help` was given and no flag of that name exists.
    #[error("help requested")]
    HelpRequested,
}

/// A typed flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    String(String),
    Bool(bool),
    Float(f64),
}

impl FlagValue {
    pub fn kind(&self) -> Kind {
        match self {
            FlagValue::String(_) => Kind::String,
            FlagValue::Bool(_) => Kind::Bool,
            FlagValue::Float(_) => Kind::Float,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            FlagValue::String(s) => s.is_empty(),
            FlagValue::Bool(b) => !b,
            FlagValue::Float(f) => *f == 0.0,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::String(s) => write!(f, "{s:?}"),
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A defined flag. The kind of `default` decides how values are parsed.
#[derive(Debug, Clone)]
pub struct Flag {
    pub name: String,
    pub usage: String,
    pub default: FlagValue,
}

/// An ordered set of flag definitions.
#[derive(Debug, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Define a flag. Names must be unique within the set.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        default: FlagValue,
        usage: impl Into<String>,
    ) -> Result<(), FlagError> {
        let name = name.into();
        if self.lookup(&name).is_some() {
            return Err(FlagError::Redefined(name));
        }
        self.flags.push(Flag {
            name,
            usage: usage.into(),
            default,
        });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Flags in definition order.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Parse `args` (program name excluded) against the defined flags.
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedFlags, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut parsed = ParsedFlags::default();

        while let Some(arg) = args.next() {
            if arg.len() < 2 || !arg.starts_with('-') {
                parsed.args.push(arg);
                break;
            }
            if arg == "--" {
                break;
            }

            let Some((name, inline)) = split_flag(&arg) else {
                return Err(FlagError::BadSyntax(arg.clone()));
            };

            let Some(flag) = self.lookup(name) else {
                if name == "help" || name == "h" {
                    return Err(FlagError::HelpRequested);
                }
                return Err(FlagError::Undefined(name.to_string()));
            };

            let value = match flag.default {
                FlagValue::Bool(_) => {
                    let raw = inline.unwrap_or("true");
                    let b = parse_bool(raw).ok_or_else(|| FlagError::InvalidBool {
                        name: name.to_string(),
                        value: raw.to_string(),
                    })?;
                    FlagValue::Bool(b)
                }
                FlagValue::String(_) | FlagValue::Float(_) => {
                    let raw = match inline {
                        Some(v) => v.to_string(),
                        None => args
                            .next()
                            .ok_or_else(|| FlagError::MissingValue(name.to_string()))?,
                    };
                    if let FlagValue::Float(_) = flag.default {
                        let v = raw.parse::<f64>().map_err(|_| FlagError::InvalidValue {
                            name: name.to_string(),
                            value: raw.clone(),
                        })?;
                        FlagValue::Float(v)
                    } else {
                        FlagValue::String(raw)
                    }
                }
            };

            // repeated flags: last one wins
            parsed.actual.insert(flag.name.clone(), value);
        }

        parsed.args.extend(args);
        Ok(parsed)
    }
}

/// The outcome of [`FlagSet::parse`]: explicitly supplied flag values and the
/// positional arguments that followed them.
#[derive(Debug, Default)]
pub struct ParsedFlags {
    actual: BTreeMap<String, FlagValue>,
    args: Vec<String>,
}

impl ParsedFlags {
    /// Value of a flag that appeared on the command line.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.actual.get(name)
    }

    /// Whether any flag at all was supplied.
    pub fn any_set(&self) -> bool {
        !self.actual.is_empty()
    }

    /// Names of the supplied flags, sorted.
    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.actual.keys().map(String::as_str)
    }

    /// Positional arguments remaining after flag parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The `i`th positional argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }
}

/// Split `-name`, `--name` or `-name=value` into its name and inline value.
/// `None` means bad syntax (`---x`, `-=x`).
fn split_flag(arg: &str) -> Option<(&str, Option<&str>)> {
    let body = match arg.strip_prefix("--") {
        Some(rest) => rest,
        None => arg.strip_prefix('-')?,
    };
    if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
        return None;
    }
    Some(match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district_flags() -> FlagSet {
        let mut set = FlagSet::new();
        set.define("district_id", FlagValue::String(String::new()), "generated field")
            .expect("define district_id");
        set.define("dry", FlagValue::Bool(false), "generated field")
            .expect("define dry");
        set.define("ratio", FlagValue::Float(0.0), "generated field")
            .expect("define ratio");
        set
    }

    #[test]
    fn accepts_single_and_double_dash() {
        let parsed = district_flags()
            .parse(["-district_id=abc123", "--ratio=0.5"])
            .expect("parse");
        assert_eq!(
            parsed.get("district_id"),
            Some(&FlagValue::String("abc123".into()))
        );
        assert_eq!(parsed.get("ratio"), Some(&FlagValue::Float(0.5)));
        assert_eq!(parsed.get("dry"), None);
    }

    #[test]
    fn takes_value_from_next_argument() {
        let parsed = district_flags()
            .parse(["-district_id", "abc123", "-dry"])
            .expect("parse");
        assert_eq!(
            parsed.get("district_id"),
            Some(&FlagValue::String("abc123".into()))
        );
        assert_eq!(parsed.get("dry"), Some(&FlagValue::Bool(true)));
    }

    #[test]
    fn stops_at_first_positional() {
        let parsed = district_flags()
            .parse(["-dry", "{}", "-district_id=abc123"])
            .expect("parse");
        assert_eq!(parsed.args(), ["{}", "-district_id=abc123"]);
        assert_eq!(parsed.get("district_id"), None);
    }

    #[test]
    fn double_dash_terminates_flags() {
        let parsed = district_flags()
            .parse(["--", "-dry"])
            .expect("parse");
        assert!(!parsed.any_set());
        assert_eq!(parsed.arg(0), Some("-dry"));
    }

    #[test]
    fn last_repeated_flag_wins() {
        let parsed = district_flags()
            .parse(["-district_id=one", "-district_id=two"])
            .expect("parse");
        assert_eq!(
            parsed.get("district_id"),
            Some(&FlagValue::String("two".into()))
        );
    }

    #[test]
    fn reports_parse_errors() {
        let set = district_flags();
        assert_eq!(
            set.parse(["-nope=1"]).unwrap_err().to_string(),
            "flag provided but not defined: -nope"
        );
        assert_eq!(
            set.parse(["-district_id"]).unwrap_err(),
            FlagError::MissingValue("district_id".into())
        );
        assert_eq!(
            set.parse(["-dry=maybe"]).unwrap_err().to_string(),
            "invalid boolean value \"maybe\" for -dry: parse error"
        );
        assert_eq!(
            set.parse(["-ratio=lots"]).unwrap_err().to_string(),
            "invalid value \"lots\" for flag -ratio: parse error"
        );
        assert_eq!(
            set.parse(["---dry"]).unwrap_err(),
            FlagError::BadSyntax("---dry".into())
        );
        assert_eq!(
            set.parse(["-=x"]).unwrap_err(),
            FlagError::BadSyntax("-=x".into())
        );
    }

    #[test]
    fn help_is_reported_when_undefined() {
        let set = district_flags();
        for arg in ["-h", "-help", "--help"] {
            assert_eq!(set.parse([arg]).unwrap_err(), FlagError::HelpRequested);
        }
    }

    #[test]
    fn rejects_duplicate_definitions() {
        let mut set = district_flags();
        assert_eq!(
            set.define("dry", FlagValue::Bool(true), "again"),
            Err(FlagError::Redefined("dry".into()))
        );
    }

    #[test]
    fn bool_spellings() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
        assert_eq!(parse_bool("yes"), None);
    }
}
