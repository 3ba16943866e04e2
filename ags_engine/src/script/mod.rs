//! Script-facing object model: capability-tagged handles, raw-offset field
//! access, fixed-stride object arrays and the native function registry.

pub mod capability;
pub mod fields;
pub mod object;
pub mod registry;
pub mod table;
pub mod value;

use thiserror::Error;

use crate::audio::AudioError;

pub use capability::{Capabilities, Capability};
pub use object::{ChannelRef, ScriptEntity, ScriptObject, SpriteInfo, SurfaceState};
pub use registry::{FunctionRegistry, FunctionSpec, RegistryBuilder};
pub use table::ObjectTable;
pub use value::{ParamKind, ScriptValue};

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Failure of a single script operation. None of these leave the object
/// graph or the registry in a modified state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("{type_name} has no field at offset {offset}")]
    InvalidOffset { type_name: &'static str, offset: u32 },

    #[error("{type_name}.{field} (offset {offset}) cannot be written")]
    ReadOnlyField {
        type_name: &'static str,
        field: &'static str,
        offset: u32,
    },

    #[error("{table}: no object at offset {offset}")]
    NoObject { table: &'static str, offset: u32 },

    #[error("{field}: no element {index}")]
    NoSuchElement { field: &'static str, index: usize },

    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{field}: value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: i32 },

    #[error("{field}: {len} bytes do not fit in {capacity}")]
    StringTooLong {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("{function} needs a {expected} receiver, got {actual}")]
    CapabilityMismatch {
        function: String,
        expected: Capability,
        actual: &'static str,
    },

    #[error("{function} called without a receiver")]
    MissingReceiver { function: String },

    #[error("{function} is not a method but was called on {actual}")]
    UnexpectedReceiver {
        function: String,
        actual: &'static str,
    },

    #[error("{function} takes {expected} arguments, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: argument {index} should be {expected}, got {actual}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: String,
        actual: &'static str,
    },

    #[error("unknown function {0}")]
    UnknownFunction(String),

    #[error("{0} is registered twice")]
    DuplicateFunction(String),

    #[error(transparent)]
    Audio(#[from] AudioError),
}
