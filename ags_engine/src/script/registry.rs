use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::capability::Capability;
use super::object::ScriptObject;
use super::value::{ParamKind, ScriptValue};
use super::{Result, ScriptError};
use crate::runtime::Runtime;

pub type NativeFn =
    Box<dyn Fn(&mut Runtime, Option<&ScriptObject>, &[ScriptValue]) -> Result<ScriptValue>>;

/// A native function as the interpreter sees it: qualified name, the
/// capability its receiver must have (if it is a method) and its parameters.
pub struct FunctionSpec {
    name: String,
    receiver: Option<Capability>,
    params: Vec<ParamKind>,
    native: NativeFn,
}

impl FunctionSpec {
    pub fn function<F>(name: &str, params: &[ParamKind], native: F) -> Self
    where
        F: Fn(&mut Runtime, &[ScriptValue]) -> Result<ScriptValue> + 'static,
    {
        Self {
            name: name.to_string(),
            receiver: None,
            params: params.to_vec(),
            native: Box::new(move |runtime, _, args| native(runtime, args)),
        }
    }

    /// `native` only runs once the receiver has been checked against
    /// `receiver`, so it may rely on the entity variant.
    pub fn method<F>(name: &str, receiver: Capability, params: &[ParamKind], native: F) -> Self
    where
        F: Fn(&mut Runtime, &ScriptObject, &[ScriptValue]) -> Result<ScriptValue> + 'static,
    {
        let qualified = name.to_string();
        Self {
            name: name.to_string(),
            receiver: Some(receiver),
            params: params.to_vec(),
            native: Box::new(move |runtime, object, args| {
                let object = object.ok_or_else(|| ScriptError::MissingReceiver {
                    function: qualified.clone(),
                })?;
                native(runtime, object, args)
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Option<Capability> {
        self.receiver
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    fn check(&self, receiver: Option<&ScriptObject>, args: &[ScriptValue]) -> Result<()> {
        match (self.receiver, receiver) {
            (Some(_), None) => {
                return Err(ScriptError::MissingReceiver {
                    function: self.name.clone(),
                })
            }
            (Some(expected), Some(object)) => {
                object.require(expected, &self.name)?;
            }
            (None, Some(object)) => {
                return Err(ScriptError::UnexpectedReceiver {
                    function: self.name.clone(),
                    actual: object.type_name(),
                })
            }
            (None, None) => {}
        }
        if args.len() != self.params.len() {
            return Err(ScriptError::ArgumentCount {
                function: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        for (index, (kind, value)) in self.params.iter().zip(args).enumerate() {
            if !kind.accepts(value) {
                return Err(ScriptError::ArgumentType {
                    function: self.name.clone(),
                    index,
                    expected: kind.to_string(),
                    actual: value.type_name(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("params", &self.params)
            .finish()
    }
}

/// Collects each subsystem's function list at startup.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    functions: Vec<FunctionSpec>,
    subsystems: Vec<(&'static str, usize)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subsystem(mut self, name: &'static str, functions: Vec<FunctionSpec>) -> Self {
        self.subsystems.push((name, functions.len()));
        self.functions.extend(functions);
        self
    }

    pub fn build(self) -> Result<FunctionRegistry> {
        let mut functions = HashMap::with_capacity(self.functions.len());
        for spec in self.functions {
            if functions.contains_key(&spec.name) {
                return Err(ScriptError::DuplicateFunction(spec.name));
            }
            functions.insert(spec.name.clone(), spec);
        }
        for (name, count) in &self.subsystems {
            debug!("registered {count} {name} functions");
        }
        Ok(FunctionRegistry { functions })
    }
}

/// Frozen name → native function table. There is no way to add or remove
/// entries once built.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionSpec>,
}

impl FunctionRegistry {
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn call(
        &self,
        runtime: &mut Runtime,
        name: &str,
        receiver: Option<&ScriptObject>,
        args: &[ScriptValue],
    ) -> Result<ScriptValue> {
        let spec = self
            .functions
            .get(name)
            .ok_or_else(|| ScriptError::UnknownFunction(name.to_string()))?;
        spec.check(receiver, args)?;
        (spec.native)(runtime, receiver, args)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ags_formats::game::{CharacterInfo, GameDataVersion, GameModel};

    use super::*;
    use crate::audio::RecordingBackend;
    use crate::script::ScriptEntity;

    fn runtime() -> Runtime {
        let mut model = GameModel::new(GameDataVersion::V350);
        model.characters = vec![CharacterInfo {
            script_name: "cEgo".into(),
            x: 5,
            ..CharacterInfo::default()
        }];
        Runtime::new(Rc::new(model), Box::new(RecordingBackend::new()))
    }

    fn registry() -> FunctionRegistry {
        RegistryBuilder::new()
            .subsystem(
                "test",
                vec![
                    FunctionSpec::function("Add", &[ParamKind::Int, ParamKind::Int], |_, args| {
                        Ok(ScriptValue::Int(args[0].as_int()? + args[1].as_int()?))
                    }),
                    FunctionSpec::method(
                        "Character::get_X",
                        Capability::Character,
                        &[],
                        |_, object, _| {
                            let x = object.character().map(|c| c.x).unwrap_or_default();
                            Ok(ScriptValue::Int(x))
                        },
                    ),
                ],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn calls_reach_the_native_function() {
        let registry = registry();
        let mut runtime = runtime();
        let result = registry
            .call(
                &mut runtime,
                "Add",
                None,
                &[ScriptValue::Int(2), ScriptValue::Int(3)],
            )
            .unwrap();
        assert_eq!(result, ScriptValue::Int(5));

        let character = runtime.objects.characters.get(0).cloned().unwrap();
        let x = registry
            .call(&mut runtime, "Character::get_X", Some(&character), &[])
            .unwrap();
        assert_eq!(x, ScriptValue::Int(5));
    }

    #[test]
    fn receiver_capability_is_checked_before_dispatch() {
        let registry = registry();
        let mut runtime = runtime();
        let frame = ScriptObject::new(
            0,
            ScriptEntity::ViewFrame(RefCell::new(Default::default())),
        );
        let err = registry
            .call(&mut runtime, "Character::get_X", Some(&frame), &[])
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::CapabilityMismatch {
                function: "Character::get_X".into(),
                expected: Capability::Character,
                actual: "ViewFrame",
            }
        );
        let err = registry
            .call(&mut runtime, "Character::get_X", None, &[])
            .unwrap_err();
        assert!(matches!(err, ScriptError::MissingReceiver { .. }));

        // the failed calls leave the table usable
        assert_eq!(registry.len(), 2);
        assert!(registry
            .call(&mut runtime, "Add", None, &[ScriptValue::Int(1), ScriptValue::Int(1)])
            .is_ok());
    }

    #[test]
    fn arity_and_parameter_kinds_are_checked() {
        let registry = registry();
        let mut runtime = runtime();
        let err = registry
            .call(&mut runtime, "Add", None, &[ScriptValue::Int(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ArgumentCount {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        let err = registry
            .call(&mut runtime, "Add", None, &[ScriptValue::Int(1), ScriptValue::Str("two".into())])
            .unwrap_err();
        assert!(matches!(err, ScriptError::ArgumentType { index: 1, .. }));
        let err = registry
            .call(&mut runtime, "Subtract", None, &[])
            .unwrap_err();
        assert_eq!(err, ScriptError::UnknownFunction("Subtract".into()));
    }

    #[test]
    fn duplicate_names_are_rejected_at_build_time() {
        let noop = || FunctionSpec::function("Wait", &[ParamKind::Int], |_, _| Ok(ScriptValue::Void));
        let err = RegistryBuilder::new()
            .subsystem("first", vec![noop()])
            .subsystem("second", vec![noop()])
            .build()
            .unwrap_err();
        assert_eq!(err, ScriptError::DuplicateFunction("Wait".into()));
    }
}
