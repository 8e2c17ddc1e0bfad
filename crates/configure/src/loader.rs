use crate::error::ConfigureError;
use crate::flags::{FlagError, FlagSet, FlagValue, ParsedFlags};
use crate::types::{Configure, FieldMut, Kind};
use crate::util::render_help;
use serde_json::{Deserializer, Map, Value};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Usage text for fields without a doc comment.
const GENERATED_USAGE: &str = "generated field";

/// Program name shown in help when none is known.
const DEFAULT_PROGRAM: &str = "<binary>";

/// Set once the process arguments have been consumed by [`configure`].
static PROCESS_ARGS_PARSED: AtomicBool = AtomicBool::new(false);

/// Bind `config` from the process arguments.
///
/// Flags (`-name=value`) are applied first. Only when no flag was given at all
/// is the first positional argument decoded as a JSON object and its matching
/// keys applied. Required fields are checked last.
///
/// The process arguments can be consumed once; a second call fails with
/// [`ConfigureError::FlagAlreadyParsed`]. Use [`configure_from`] to bind from
/// an explicit argument list as often as needed.
pub fn configure<T: Configure>(config: &mut T) -> Result<(), ConfigureError> {
    if PROCESS_ARGS_PARSED.swap(true, Ordering::SeqCst) {
        return Err(ConfigureError::FlagAlreadyParsed);
    }

    let mut args = env::args();
    let program = args
        .next()
        .as_deref()
        .and_then(|p| Path::new(p).file_name())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
    bind(config, &program, args)
}

/// Bind `config` from `args` (program name excluded), with the same rules as
/// [`configure`]. Every call parses with its own flag set.
pub fn configure_from<T, I, S>(config: &mut T, args: I) -> Result<(), ConfigureError>
where
    T: Configure,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    bind(config, DEFAULT_PROGRAM, args)
}

/// Render the generated help text for `T`.
pub fn usage<T: Configure>() -> Result<String, ConfigureError> {
    let bindings = describe::<T>()?;
    let mut flags = FlagSet::new();
    for binding in &bindings {
        flags.define(binding.param, binding.zero.clone(), binding.usage)?;
    }
    Ok(help_text::<T>(DEFAULT_PROGRAM, &flags, &bindings))
}

/// A field whose kind and tag have been checked.
struct Binding {
    index: usize,
    field: &'static str,
    param: &'static str,
    required: bool,
    usage: &'static str,
    /// Zero value of the field's kind.
    zero: FlagValue,
}

impl Binding {
    fn kind(&self) -> Kind {
        self.zero.kind()
    }
}

fn bind<T, I, S>(config: &mut T, program: &str, args: I) -> Result<(), ConfigureError>
where
    T: Configure,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let bindings = describe::<T>()?;
    let flags = register(config, &bindings)?;
    debug!(flags = bindings.len(), "registered config flags");

    let parsed = match flags.parse(args) {
        Ok(parsed) => parsed,
        Err(FlagError::HelpRequested) => {
            eprintln!("{}", help_text::<T>(program, &flags, &bindings));
            return Err(ConfigureError::HelpPrinted);
        }
        Err(err) => return Err(err.into()),
    };
    debug!(
        supplied = ?parsed.set_names().collect::<Vec<_>>(),
        positional = parsed.args().len(),
        "parsed arguments"
    );

    let flag_found = apply_flags(config, &bindings, &parsed);
    match parsed.arg(0).filter(|raw| !raw.is_empty()) {
        Some(raw) if !flag_found => {
            debug!("no flags supplied, reading config from JSON argument");
            apply_json(config, &bindings, raw)?;
        }
        Some(_) => debug!("flags supplied, ignoring positional JSON argument"),
        None => {}
    }

    check_required(config, &bindings)
}

/// Walk the field descriptors, rejecting unsupported kinds and bad tags.
fn describe<T: Configure>() -> Result<Vec<Binding>, ConfigureError> {
    T::fields()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let zero = match spec.kind {
                Kind::String => FlagValue::String(String::new()),
                Kind::Bool => FlagValue::Bool(false),
                Kind::Float => FlagValue::Float(0.0),
                Kind::Unsupported(type_name) => {
                    return Err(ConfigureError::UnsupportedFieldType {
                        field: spec.name,
                        type_name,
                    });
                }
            };
            let tag = spec.binding().map_err(|source| ConfigureError::Tag {
                field: spec.name,
                source,
            })?;
            Ok(Binding {
                index,
                field: spec.name,
                param: tag.name,
                required: tag.required,
                usage: spec.doc.unwrap_or(GENERATED_USAGE),
                zero,
            })
        })
        .collect()
}

/// Define one flag per field. Boolean flags default to the field's current
/// value; string and float flags default to zero.
fn register<T: Configure>(config: &mut T, bindings: &[Binding]) -> Result<FlagSet, ConfigureError> {
    let mut flags = FlagSet::new();
    for binding in bindings {
        let default = match config.field_mut(binding.index) {
            Some(FieldMut::Bool(current)) if binding.kind() == Kind::Bool => {
                FlagValue::Bool(*current)
            }
            Some(field) if field.kind() == binding.kind() => binding.zero.clone(),
            _ => {
                return Err(ConfigureError::NotAReference {
                    field: binding.field,
                });
            }
        };
        flags.define(binding.param, default, binding.usage)?;
    }
    Ok(flags)
}

/// Apply supplied flag values. Returns whether any flag was supplied.
///
/// Empty strings and zero floats never overwrite the field, so values set
/// before the call survive.
fn apply_flags<T: Configure>(config: &mut T, bindings: &[Binding], parsed: &ParsedFlags) -> bool {
    for binding in bindings {
        let Some(value) = parsed.get(binding.param) else {
            continue;
        };
        trace!(flag = binding.param, %value, "flag supplied");
        match (config.field_mut(binding.index), value) {
            (Some(FieldMut::String(slot)), FlagValue::String(v)) if !v.is_empty() => {
                *slot = v.clone();
            }
            (Some(FieldMut::Bool(slot)), FlagValue::Bool(v)) => *slot = *v,
            (Some(FieldMut::Float(slot)), FlagValue::Float(v)) if *v != 0.0 => *slot = *v,
            _ => {}
        }
    }
    // Presence alone counts: `-collection=` or `-ratio=0` still disables the
    // JSON fallback even though neither overwrites its field.
    parsed.any_set()
}

fn apply_json<T: Configure>(
    config: &mut T,
    bindings: &[Binding],
    raw: &str,
) -> Result<(), ConfigureError> {
    // Only the first JSON value is read; anything after it is ignored.
    // A top-level `null` binds nothing.
    let values: Map<String, Value> = Deserializer::from_str(raw)
        .into_iter::<Option<Map<String, Value>>>()
        .next()
        .and_then(Result::ok)
        .ok_or(ConfigureError::InvalidJson)?
        .unwrap_or_default();

    for binding in bindings {
        let Some(value) = values.get(binding.param) else {
            continue;
        };
        let mismatch = || ConfigureError::TypeMismatch {
            field: binding.param.to_string(),
            expected: binding.kind(),
            found: json_type(value),
        };
        match config.field_mut(binding.index) {
            Some(FieldMut::String(slot)) => *slot = value.as_str().ok_or_else(mismatch)?.to_string(),
            Some(FieldMut::Bool(slot)) => *slot = value.as_bool().ok_or_else(mismatch)?,
            Some(FieldMut::Float(slot)) => *slot = value.as_f64().ok_or_else(mismatch)?,
            None => {
                return Err(ConfigureError::NotAReference {
                    field: binding.field,
                });
            }
        }
        trace!(field = binding.param, "bound from JSON");
    }
    Ok(())
}

fn check_required<T: Configure>(config: &mut T, bindings: &[Binding]) -> Result<(), ConfigureError> {
    let mut missing = Vec::new();
    for binding in bindings.iter().filter(|b| b.required) {
        if binding.kind() == Kind::Bool {
            return Err(ConfigureError::BooleanCannotBeRequired {
                field: binding.field,
            });
        }
        match config.field_mut(binding.index) {
            Some(field) => {
                if field.is_zero() {
                    missing.push(binding.param.to_string());
                }
            }
            None => {
                return Err(ConfigureError::NotAReference {
                    field: binding.field,
                });
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigureError::MissingRequiredFields(missing))
    }
}

fn help_text<T: Configure>(program: &str, flags: &FlagSet, bindings: &[Binding]) -> String {
    let required: Vec<&str> = bindings
        .iter()
        .filter(|b| b.required)
        .map(|b| b.param)
        .collect();
    render_help(program, T::doc(), flags.flags(), &required)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
