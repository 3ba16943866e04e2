use ags_formats::game::dialog::{OPTION_CHOSEN, OPTION_OFF_FOR_GOOD, OPTION_ON};
use ags_formats::game::DialogOption;

use super::{index_arg, object_or_void};
use crate::script::{
    Capability, FunctionSpec, ParamKind, Result, ScriptError, ScriptObject, ScriptValue,
};

use Capability::Dialog;
use ParamKind::Int;

/// Option states as scripts name them.
const STATE_OFF: i32 = 0;
const STATE_ON: i32 = 1;
const STATE_OFF_FOR_GOOD: i32 = 2;

/// Run `f` on option `number` (1-based) of the dialog behind `object`.
fn with_option<R>(
    object: &ScriptObject,
    number: &ScriptValue,
    f: impl FnOnce(&mut DialogOption) -> Result<R>,
) -> Result<R> {
    let number = index_arg(number, "option")?;
    let mut dialog = object.dialog_mut().ok_or(ScriptError::TypeMismatch {
        expected: "Dialog",
        actual: object.type_name(),
    })?;
    let missing = ScriptError::NoSuchElement {
        field: "option",
        index: number,
    };
    let Some(index) = number.checked_sub(1) else {
        return Err(missing);
    };
    let option = dialog.options.get_mut(index).ok_or(missing)?;
    f(option)
}

fn option_state(flags: i32) -> i32 {
    if flags & OPTION_OFF_FOR_GOOD != 0 {
        STATE_OFF_FOR_GOOD
    } else if flags & OPTION_ON != 0 {
        STATE_ON
    } else {
        STATE_OFF
    }
}

pub(super) fn functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::method("Dialog::get_ID", Dialog, &[], |_, object, _| {
            Ok(ScriptValue::Int(object.id() as i32))
        }),
        FunctionSpec::method("Dialog::get_OptionCount", Dialog, &[], |_, object, _| {
            let count = object.dialog().map_or(0, |dialog| dialog.options.len());
            Ok(ScriptValue::Int(count as i32))
        }),
        FunctionSpec::method("Dialog::GetOptionState", Dialog, &[Int], |_, object, args| {
            let state = with_option(object, &args[0], |option| Ok(option_state(option.flags)))?;
            Ok(ScriptValue::Int(state))
        }),
        FunctionSpec::method(
            "Dialog::SetOptionState",
            Dialog,
            &[Int, Int],
            |_, object, args| {
                let state = args[1].as_int()?;
                with_option(object, &args[0], |option| {
                    match state {
                        STATE_OFF => option.flags &= !OPTION_ON,
                        // an option turned off for good stays off
                        STATE_ON if option.flags & OPTION_OFF_FOR_GOOD == 0 => {
                            option.flags |= OPTION_ON
                        }
                        STATE_ON => {}
                        STATE_OFF_FOR_GOOD => {
                            option.flags = (option.flags & !OPTION_ON) | OPTION_OFF_FOR_GOOD
                        }
                        value => {
                            return Err(ScriptError::ValueOutOfRange {
                                field: "state",
                                value,
                            })
                        }
                    }
                    Ok(())
                })?;
                Ok(ScriptValue::Void)
            },
        ),
        FunctionSpec::method("Dialog::GetOptionText", Dialog, &[Int], |_, object, args| {
            let text = with_option(object, &args[0], |option| Ok(option.text.clone()))?;
            Ok(ScriptValue::Str(text))
        }),
        FunctionSpec::method(
            "Dialog::HasOptionBeenChosen",
            Dialog,
            &[Int],
            |_, object, args| {
                let chosen =
                    with_option(object, &args[0], |option| Ok(option.flags & OPTION_CHOSEN != 0))?;
                Ok(chosen.into())
            },
        ),
        FunctionSpec::function("Game::get_DialogCount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.objects.dialogs.len() as i32))
        }),
        FunctionSpec::function("GetDialog", &[Int], |rt, args| {
            let dialog = usize::try_from(args[0].as_int()?)
                .ok()
                .and_then(|index| rt.objects.dialogs.get(index).cloned());
            Ok(object_or_void(dialog))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ags_formats::game::{DialogTopic, GameDataVersion, GameModel};

    use super::*;
    use crate::api::standard_registry;
    use crate::audio::RecordingBackend;
    use crate::runtime::Runtime;
    use crate::script::FunctionRegistry;

    fn runtime() -> (Runtime, FunctionRegistry) {
        let mut model = GameModel::new(GameDataVersion::V341);
        model.dialogs = vec![DialogTopic {
            options: vec![
                DialogOption {
                    text: "Hello".into(),
                    flags: OPTION_ON,
                    entry_point: 0,
                },
                DialogOption {
                    text: "Goodbye".into(),
                    flags: OPTION_ON | OPTION_CHOSEN,
                    entry_point: 0,
                },
            ],
            ..DialogTopic::default()
        }];
        let runtime = Runtime::new(Rc::new(model), Box::new(RecordingBackend::new()));
        (runtime, standard_registry().unwrap())
    }

    fn state(rt: &mut Runtime, registry: &FunctionRegistry, dialog: &ScriptObject) -> ScriptValue {
        registry
            .call(rt, "Dialog::GetOptionState", Some(dialog), &[ScriptValue::Int(1)])
            .unwrap()
    }

    fn set_state(
        rt: &mut Runtime,
        registry: &FunctionRegistry,
        dialog: &ScriptObject,
        value: i32,
    ) -> Result<ScriptValue> {
        registry.call(
            rt,
            "Dialog::SetOptionState",
            Some(dialog),
            &[ScriptValue::Int(1), ScriptValue::Int(value)],
        )
    }

    #[test]
    fn options_are_numbered_from_one() {
        let (mut rt, registry) = runtime();
        let dialog = rt.objects.dialogs.get(0).unwrap().clone();
        assert_eq!(
            registry
                .call(&mut rt, "Dialog::GetOptionText", Some(&dialog), &[ScriptValue::Int(2)])
                .unwrap(),
            ScriptValue::Str("Goodbye".into())
        );
        assert_eq!(
            registry
                .call(
                    &mut rt,
                    "Dialog::HasOptionBeenChosen",
                    Some(&dialog),
                    &[ScriptValue::Int(2)]
                )
                .unwrap(),
            ScriptValue::Int(1)
        );
        for missing in [0, 3] {
            assert_eq!(
                registry
                    .call(
                        &mut rt,
                        "Dialog::GetOptionText",
                        Some(&dialog),
                        &[ScriptValue::Int(missing)]
                    )
                    .unwrap_err(),
                ScriptError::NoSuchElement {
                    field: "option",
                    index: missing as usize
                }
            );
        }
        assert_eq!(
            registry
                .call(&mut rt, "Dialog::get_OptionCount", Some(&dialog), &[])
                .unwrap(),
            ScriptValue::Int(2)
        );
    }

    #[test]
    fn off_for_good_is_permanent() {
        let (mut rt, registry) = runtime();
        let dialog = rt.objects.dialogs.get(0).unwrap().clone();
        assert_eq!(state(&mut rt, &registry, &dialog), ScriptValue::Int(STATE_ON));
        set_state(&mut rt, &registry, &dialog, STATE_OFF).unwrap();
        assert_eq!(state(&mut rt, &registry, &dialog), ScriptValue::Int(STATE_OFF));
        set_state(&mut rt, &registry, &dialog, STATE_OFF_FOR_GOOD).unwrap();
        set_state(&mut rt, &registry, &dialog, STATE_ON).unwrap();
        assert_eq!(
            state(&mut rt, &registry, &dialog),
            ScriptValue::Int(STATE_OFF_FOR_GOOD)
        );
        assert!(matches!(
            set_state(&mut rt, &registry, &dialog, 7),
            Err(ScriptError::ValueOutOfRange { field: "state", value: 7 })
        ));
        // the raw flag array sees the same state
        let flags = dialog
            .read_field(ags_formats::game::dialog::offsets::OPTION_FLAGS)
            .unwrap();
        assert_eq!(flags, ScriptValue::Int(OPTION_OFF_FOR_GOOD));
    }
}
