//! Native functions exposed to scripts, grouped by the subsystem that owns
//! them. [`standard_registry`] is the single place they are combined.

mod audio;
mod character;
mod dialog;
mod game;
mod gui;

use crate::script::{
    Capability, FunctionRegistry, FunctionSpec, ParamKind, RegistryBuilder, Result, ScriptError,
    ScriptObject, ScriptValue,
};

pub fn standard_registry() -> Result<FunctionRegistry> {
    RegistryBuilder::new()
        .subsystem("audio", audio::functions())
        .subsystem("character", character::functions())
        .subsystem("dialog", dialog::functions())
        .subsystem("gui", gui::functions())
        .subsystem("game", game::functions())
        .build()
}

/// Property getter backed by the receiver's field table.
fn getter(name: &str, receiver: Capability, offset: u32) -> FunctionSpec {
    FunctionSpec::method(name, receiver, &[], move |_, object, _| {
        object.read_field(offset)
    })
}

/// Property setter backed by the receiver's field table.
fn setter(name: &str, receiver: Capability, offset: u32, kind: ParamKind) -> FunctionSpec {
    FunctionSpec::method(name, receiver, &[kind], move |_, object, args| {
        object.write_field(offset, &args[0])?;
        Ok(ScriptValue::Void)
    })
}

fn index_arg(value: &ScriptValue, field: &'static str) -> Result<usize> {
    let raw = value.as_int()?;
    usize::try_from(raw).map_err(|_| ScriptError::ValueOutOfRange { field, value: raw })
}

fn object_or_void(object: Option<ScriptObject>) -> ScriptValue {
    object.map(ScriptValue::Object).unwrap_or(ScriptValue::Void)
}
