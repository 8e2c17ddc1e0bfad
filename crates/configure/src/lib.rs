//! configure – bind a config struct to command-line flags, falling back to a
//! JSON object passed as the first positional argument.
//!
//! ```rust
//! use configure::Configure;
//!
//! #[derive(Debug, Default, Configure)]
//! struct Config {
//!     #[config("district_id,required")]
//!     district_id: String,
//!     #[config("collection")]
//!     collection: String,
//! }
//!
//! let mut config = Config::default();
//! config
//!     .configure_from([r#"{"district_id":"abc123","collection":"schools"}"#])
//!     .unwrap();
//! assert_eq!(config.district_id, "abc123");
//! assert_eq!(config.collection, "schools");
//! ```

pub mod error;
pub mod flags;
pub mod loader;
pub mod types;
pub mod util;

pub use configure_derive::Configure;
pub use error::{ConfigureError, TagError};
pub use flags::{FlagError, FlagSet, FlagValue, ParsedFlags};
pub use loader::{configure, configure_from, usage};
pub use types::{Configure, FieldMut, FieldSpec, Kind, Tag, parse_tag};
