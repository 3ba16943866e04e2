use std::fmt;

use super::capability::Capability;
use super::object::ScriptObject;
use super::{Result, ScriptError};

/// A value crossing the boundary between the interpreter and native code.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Void,
    Int(i32),
    Float(f32),
    Str(String),
    Object(ScriptObject),
}

impl ScriptValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Void => "void",
            ScriptValue::Int(_) => "int",
            ScriptValue::Float(_) => "float",
            ScriptValue::Str(_) => "string",
            ScriptValue::Object(object) => object.type_name(),
        }
    }

    pub fn as_int(&self) -> Result<i32> {
        match self {
            ScriptValue::Int(value) => Ok(*value),
            other => Err(ScriptError::TypeMismatch {
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            ScriptValue::Str(value) => Ok(value),
            other => Err(ScriptError::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    pub fn as_object(&self) -> Result<&ScriptObject> {
        match self {
            ScriptValue::Object(object) => Ok(object),
            other => Err(ScriptError::TypeMismatch {
                expected: "object",
                actual: other.type_name(),
            }),
        }
    }

    /// Integer narrowed to a 16-bit field.
    pub(crate) fn as_short(&self, field: &'static str) -> Result<i16> {
        let value = self.as_int()?;
        i16::try_from(value).map_err(|_| ScriptError::ValueOutOfRange { field, value })
    }

    pub(crate) fn as_byte(&self, field: &'static str) -> Result<u8> {
        let value = self.as_int()?;
        u8::try_from(value).map_err(|_| ScriptError::ValueOutOfRange { field, value })
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Int(value)
    }
}

impl From<i16> for ScriptValue {
    fn from(value: i16) -> Self {
        ScriptValue::Int(value.into())
    }
}

impl From<u8> for ScriptValue {
    fn from(value: u8) -> Self {
        ScriptValue::Int(value.into())
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Int(value as i32)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::Str(value.to_string())
    }
}

impl From<ScriptObject> for ScriptValue {
    fn from(object: ScriptObject) -> Self {
        ScriptValue::Object(object)
    }
}

/// Declared kind of a native function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Str,
    Object(Capability),
}

impl ParamKind {
    pub fn accepts(self, value: &ScriptValue) -> bool {
        match (self, value) {
            (ParamKind::Int, ScriptValue::Int(_)) => true,
            (ParamKind::Float, ScriptValue::Float(_)) => true,
            (ParamKind::Str, ScriptValue::Str(_)) => true,
            (ParamKind::Object(capability), ScriptValue::Object(object)) => {
                object.has_capability(capability)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Int => f.write_str("int"),
            ParamKind::Float => f.write_str("float"),
            ParamKind::Str => f.write_str("string"),
            ParamKind::Object(capability) => write!(f, "{capability}*"),
        }
    }
}
