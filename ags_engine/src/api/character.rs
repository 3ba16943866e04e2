use ags_formats::game::character::{offsets, MAX_INVENTORY};
use ags_formats::game::items::inventory_offsets;
use ags_formats::game::CharacterInfo;

use super::{getter, object_or_void, setter};
use crate::script::{
    Capability, FunctionSpec, ParamKind, Result, ScriptError, ScriptObject, ScriptValue,
};

use Capability::Character;
use ParamKind::{Int, Str};

const ITEM: ParamKind = ParamKind::Object(Capability::InventoryItem);

/// Inventory slot of `item`, with the character's slot vector grown to
/// cover it.
fn inventory_slot<'a>(
    character: &'a mut CharacterInfo,
    item: &ScriptObject,
) -> Result<&'a mut i16> {
    let index = item.id();
    if index >= MAX_INVENTORY {
        return Err(ScriptError::NoSuchElement {
            field: "inv",
            index,
        });
    }
    if character.inventory.len() <= index {
        character.inventory.resize(index + 1, 0);
    }
    Ok(&mut character.inventory[index])
}

fn with_character<R>(
    object: &ScriptObject,
    f: impl FnOnce(&mut CharacterInfo) -> Result<R>,
) -> Result<R> {
    let mut character = object.character_mut().ok_or(ScriptError::TypeMismatch {
        expected: "Character",
        actual: object.type_name(),
    })?;
    f(&mut character)
}

pub(super) fn functions() -> Vec<FunctionSpec> {
    vec![
        getter("Character::get_X", Character, offsets::X),
        setter("Character::set_X", Character, offsets::X, Int),
        getter("Character::get_Y", Character, offsets::Y),
        setter("Character::set_Y", Character, offsets::Y, Int),
        getter("Character::get_Z", Character, offsets::Z),
        setter("Character::set_Z", Character, offsets::Z, Int),
        getter("Character::get_Room", Character, offsets::ROOM),
        getter("Character::get_PreviousRoom", Character, offsets::PREVIOUS_ROOM),
        getter("Character::get_View", Character, offsets::VIEW),
        getter("Character::get_Baseline", Character, offsets::BASELINE),
        setter("Character::set_Baseline", Character, offsets::BASELINE, Int),
        getter("Character::get_Transparency", Character, offsets::TRANSPARENCY),
        setter(
            "Character::set_Transparency",
            Character,
            offsets::TRANSPARENCY,
            Int,
        ),
        getter("Character::get_SpeechColor", Character, offsets::TALK_COLOR),
        setter("Character::set_SpeechColor", Character, offsets::TALK_COLOR, Int),
        getter("Character::get_Name", Character, offsets::NAME),
        setter("Character::set_Name", Character, offsets::NAME, Str),
        getter("Character::get_ScriptName", Character, offsets::SCRIPT_NAME),
        getter("Character::get_ID", Character, offsets::INDEX),
        FunctionSpec::method("Character::get_ActiveInventory", Character, &[], |rt, object, _| {
            let active = with_character(object, |c| Ok(c.active_inventory))?;
            let item = usize::try_from(active)
                .ok()
                .and_then(|index| rt.objects.inventory.get(index).cloned());
            Ok(object_or_void(item))
        }),
        FunctionSpec::method(
            "Character::set_ActiveInventory",
            Character,
            &[ITEM],
            |_, object, args| {
                let item = args[0].as_object()?;
                with_character(object, |c| {
                    if c.inventory_count(item.id()) == 0 {
                        return Err(ScriptError::ValueOutOfRange {
                            field: "activeinv",
                            value: item.id() as i32,
                        });
                    }
                    c.active_inventory = item.id() as i32;
                    Ok(())
                })?;
                Ok(ScriptValue::Void)
            },
        ),
        FunctionSpec::method("Character::AddInventory", Character, &[ITEM], |_, object, args| {
            let item = args[0].as_object()?;
            with_character(object, |c| {
                let slot = inventory_slot(c, item)?;
                *slot = slot.saturating_add(1);
                Ok(())
            })?;
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::method("Character::LoseInventory", Character, &[ITEM], |_, object, args| {
            let item = args[0].as_object()?;
            with_character(object, |c| {
                let slot = inventory_slot(c, item)?;
                if *slot > 0 {
                    *slot -= 1;
                }
                if *slot == 0 && c.active_inventory == item.id() as i32 {
                    c.active_inventory = -1;
                }
                Ok(())
            })?;
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::method("Character::HasInventory", Character, &[ITEM], |_, object, args| {
            let item = args[0].as_object()?;
            let count = with_character(object, |c| Ok(c.inventory_count(item.id())))?;
            Ok((count > 0).into())
        }),
        FunctionSpec::method(
            "Character::get_InventoryQuantity",
            Character,
            &[ITEM],
            |_, object, args| {
                let item = args[0].as_object()?;
                let count = with_character(object, |c| Ok(c.inventory_count(item.id())))?;
                Ok(count.into())
            },
        ),
        FunctionSpec::function("GetPlayerCharacter", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.model().header.player_character))
        }),
        FunctionSpec::function("Game::get_CharacterCount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.objects.characters.len() as i32))
        }),
        FunctionSpec::function("GetCharacter", &[Int], |rt, args| {
            let index = args[0].as_int()?;
            let character = usize::try_from(index)
                .ok()
                .and_then(|index| rt.objects.characters.get(index).cloned());
            Ok(object_or_void(character))
        }),
        getter(
            "InventoryItem::get_Graphic",
            Capability::InventoryItem,
            inventory_offsets::PIC,
        ),
        setter(
            "InventoryItem::set_Graphic",
            Capability::InventoryItem,
            inventory_offsets::PIC,
            Int,
        ),
        getter(
            "InventoryItem::get_Name",
            Capability::InventoryItem,
            inventory_offsets::NAME,
        ),
        setter(
            "InventoryItem::set_Name",
            Capability::InventoryItem,
            inventory_offsets::NAME,
            Str,
        ),
    ]
}
