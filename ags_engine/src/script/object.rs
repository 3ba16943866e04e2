use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use ags_formats::game::gui::{
    GuiButton, GuiInvWindow, GuiLabel, GuiListBox, GuiSlider, GuiTextBox,
};
use ags_formats::game::{
    AudioClipInfo, CharacterInfo, DialogTopic, GuiGroup, InventoryItem, MouseCursor, ViewFrame,
};
use serde::Serialize;

use super::capability::{Capabilities, Capability};
use super::fields::{self, control_offsets, FieldTable, GuiControlState};
use super::value::ScriptValue;
use super::{Result, ScriptError};

/// Non-owning reference to a slot of the audio channel pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelRef {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteInfo {
    pub slot: i32,
    pub width: i32,
    pub height: i32,
    pub color_depth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceState {
    /// Sprite slot drawn on, -1 for the room background.
    pub sprite: i32,
    pub width: i32,
    pub height: i32,
    pub draw_color: i32,
}

/// Every kind of engine entity a script can hold a handle to.
#[derive(Debug)]
pub enum ScriptEntity {
    AudioChannel(RefCell<ChannelRef>),
    AudioClip(RefCell<AudioClipInfo>),
    Character(RefCell<CharacterInfo>),
    Dialog(RefCell<DialogTopic>),
    DrawingSurface(RefCell<SurfaceState>),
    DynamicSprite(RefCell<SpriteInfo>),
    Gui(RefCell<GuiGroup>),
    Button(RefCell<GuiButton>),
    Label(RefCell<GuiLabel>),
    InvWindow(RefCell<GuiInvWindow>),
    Slider(RefCell<GuiSlider>),
    TextBox(RefCell<GuiTextBox>),
    ListBox(RefCell<GuiListBox>),
    InventoryItem(RefCell<InventoryItem>),
    MouseCursor(RefCell<MouseCursor>),
    ViewFrame(RefCell<ViewFrame>),
}

impl ScriptEntity {
    fn capabilities(&self) -> Capabilities {
        match self {
            ScriptEntity::AudioChannel(_) => Capabilities::AUDIO_CHANNEL,
            ScriptEntity::AudioClip(_) => Capabilities::AUDIO_CLIP,
            ScriptEntity::Character(_) => Capabilities::CHARACTER,
            ScriptEntity::Dialog(_) => Capabilities::DIALOG,
            ScriptEntity::DrawingSurface(_) => Capabilities::DRAWING_SURFACE,
            ScriptEntity::DynamicSprite(_) => Capabilities::DYNAMIC_SPRITE,
            ScriptEntity::Gui(_) => Capabilities::GUI,
            ScriptEntity::Button(_) => Capabilities::GUI_CONTROL | Capabilities::GUI_BUTTON,
            ScriptEntity::Label(_) => Capabilities::GUI_CONTROL | Capabilities::GUI_LABEL,
            ScriptEntity::InvWindow(_) => {
                Capabilities::GUI_CONTROL | Capabilities::GUI_INV_WINDOW
            }
            ScriptEntity::Slider(_) => Capabilities::GUI_CONTROL | Capabilities::GUI_SLIDER,
            ScriptEntity::TextBox(_) => Capabilities::GUI_CONTROL | Capabilities::GUI_TEXT_BOX,
            ScriptEntity::ListBox(_) => Capabilities::GUI_CONTROL | Capabilities::GUI_LIST_BOX,
            ScriptEntity::InventoryItem(_) => Capabilities::INVENTORY_ITEM,
            ScriptEntity::MouseCursor(_) => Capabilities::MOUSE_CURSOR,
            ScriptEntity::ViewFrame(_) => Capabilities::VIEW_FRAME,
        }
    }

    /// Most specific capability, used for type names in diagnostics.
    pub fn primary(&self) -> Capability {
        match self {
            ScriptEntity::AudioChannel(_) => Capability::AudioChannel,
            ScriptEntity::AudioClip(_) => Capability::AudioClip,
            ScriptEntity::Character(_) => Capability::Character,
            ScriptEntity::Dialog(_) => Capability::Dialog,
            ScriptEntity::DrawingSurface(_) => Capability::DrawingSurface,
            ScriptEntity::DynamicSprite(_) => Capability::DynamicSprite,
            ScriptEntity::Gui(_) => Capability::Gui,
            ScriptEntity::Button(_) => Capability::GuiButton,
            ScriptEntity::Label(_) => Capability::GuiLabel,
            ScriptEntity::InvWindow(_) => Capability::GuiInvWindow,
            ScriptEntity::Slider(_) => Capability::GuiSlider,
            ScriptEntity::TextBox(_) => Capability::GuiTextBox,
            ScriptEntity::ListBox(_) => Capability::GuiListBox,
            ScriptEntity::InventoryItem(_) => Capability::InventoryItem,
            ScriptEntity::MouseCursor(_) => Capability::MouseCursor,
            ScriptEntity::ViewFrame(_) => Capability::ViewFrame,
        }
    }

    /// Size of the legacy struct, i.e. the stride of arrays of this type.
    pub fn stride(&self) -> u32 {
        match self {
            ScriptEntity::AudioChannel(_) => fields::AUDIO_CHANNEL_FIELDS.size,
            ScriptEntity::AudioClip(_) => fields::AUDIO_CLIP_FIELDS.size,
            ScriptEntity::Character(_) => fields::CHARACTER_FIELDS.size,
            ScriptEntity::Dialog(_) => fields::DIALOG_FIELDS.size,
            ScriptEntity::DrawingSurface(_) => fields::DRAWING_SURFACE_FIELDS.size,
            ScriptEntity::DynamicSprite(_) => fields::DYNAMIC_SPRITE_FIELDS.size,
            ScriptEntity::Gui(_) => fields::GUI_FIELDS.size,
            ScriptEntity::Button(_) => fields::BUTTON_FIELDS.size,
            ScriptEntity::Label(_) => fields::LABEL_FIELDS.size,
            ScriptEntity::InvWindow(_) => fields::INV_WINDOW_FIELDS.size,
            ScriptEntity::Slider(_) => fields::SLIDER_FIELDS.size,
            ScriptEntity::TextBox(_) => fields::TEXT_BOX_FIELDS.size,
            ScriptEntity::ListBox(_) => fields::LIST_BOX_FIELDS.size,
            ScriptEntity::InventoryItem(_) => fields::INVENTORY_FIELDS.size,
            ScriptEntity::MouseCursor(_) => fields::CURSOR_FIELDS.size,
            ScriptEntity::ViewFrame(_) => fields::VIEW_FRAME_FIELDS.size,
        }
    }

    fn read_field(&self, offset: u32) -> Result<ScriptValue> {
        match self {
            ScriptEntity::AudioChannel(cell) => read(&fields::AUDIO_CHANNEL_FIELDS, cell, offset),
            ScriptEntity::AudioClip(cell) => read(&fields::AUDIO_CLIP_FIELDS, cell, offset),
            ScriptEntity::Character(cell) => read(&fields::CHARACTER_FIELDS, cell, offset),
            ScriptEntity::Dialog(cell) => read(&fields::DIALOG_FIELDS, cell, offset),
            ScriptEntity::DrawingSurface(cell) => {
                read(&fields::DRAWING_SURFACE_FIELDS, cell, offset)
            }
            ScriptEntity::DynamicSprite(cell) => read(&fields::DYNAMIC_SPRITE_FIELDS, cell, offset),
            ScriptEntity::Gui(cell) => read(&fields::GUI_FIELDS, cell, offset),
            ScriptEntity::Button(cell) => read_control(&fields::BUTTON_FIELDS, cell, offset),
            ScriptEntity::Label(cell) => read_control(&fields::LABEL_FIELDS, cell, offset),
            ScriptEntity::InvWindow(cell) => read_control(&fields::INV_WINDOW_FIELDS, cell, offset),
            ScriptEntity::Slider(cell) => read_control(&fields::SLIDER_FIELDS, cell, offset),
            ScriptEntity::TextBox(cell) => read_control(&fields::TEXT_BOX_FIELDS, cell, offset),
            ScriptEntity::ListBox(cell) => read_control(&fields::LIST_BOX_FIELDS, cell, offset),
            ScriptEntity::InventoryItem(cell) => read(&fields::INVENTORY_FIELDS, cell, offset),
            ScriptEntity::MouseCursor(cell) => read(&fields::CURSOR_FIELDS, cell, offset),
            ScriptEntity::ViewFrame(cell) => read(&fields::VIEW_FRAME_FIELDS, cell, offset),
        }
    }

    fn write_field(&self, offset: u32, value: &ScriptValue) -> Result<()> {
        match self {
            ScriptEntity::AudioChannel(cell) => {
                write(&fields::AUDIO_CHANNEL_FIELDS, cell, offset, value)
            }
            ScriptEntity::AudioClip(cell) => write(&fields::AUDIO_CLIP_FIELDS, cell, offset, value),
            ScriptEntity::Character(cell) => write(&fields::CHARACTER_FIELDS, cell, offset, value),
            ScriptEntity::Dialog(cell) => write(&fields::DIALOG_FIELDS, cell, offset, value),
            ScriptEntity::DrawingSurface(cell) => {
                write(&fields::DRAWING_SURFACE_FIELDS, cell, offset, value)
            }
            ScriptEntity::DynamicSprite(cell) => {
                write(&fields::DYNAMIC_SPRITE_FIELDS, cell, offset, value)
            }
            ScriptEntity::Gui(cell) => write(&fields::GUI_FIELDS, cell, offset, value),
            ScriptEntity::Button(cell) => {
                write_control(&fields::BUTTON_FIELDS, cell, offset, value)
            }
            ScriptEntity::Label(cell) => write_control(&fields::LABEL_FIELDS, cell, offset, value),
            ScriptEntity::InvWindow(cell) => {
                write_control(&fields::INV_WINDOW_FIELDS, cell, offset, value)
            }
            ScriptEntity::Slider(cell) => {
                write_control(&fields::SLIDER_FIELDS, cell, offset, value)
            }
            ScriptEntity::TextBox(cell) => {
                write_control(&fields::TEXT_BOX_FIELDS, cell, offset, value)
            }
            ScriptEntity::ListBox(cell) => {
                write_control(&fields::LIST_BOX_FIELDS, cell, offset, value)
            }
            ScriptEntity::InventoryItem(cell) => {
                write(&fields::INVENTORY_FIELDS, cell, offset, value)
            }
            ScriptEntity::MouseCursor(cell) => write(&fields::CURSOR_FIELDS, cell, offset, value),
            ScriptEntity::ViewFrame(cell) => write(&fields::VIEW_FRAME_FIELDS, cell, offset, value),
        }
    }
}

fn read<T>(table: &FieldTable<T>, cell: &RefCell<T>, offset: u32) -> Result<ScriptValue> {
    table.read(&cell.borrow(), offset)
}

fn write<T>(
    table: &FieldTable<T>,
    cell: &RefCell<T>,
    offset: u32,
    value: &ScriptValue,
) -> Result<()> {
    table.write(&mut cell.borrow_mut(), offset, value)
}

fn read_control<T: GuiControlState>(
    table: &FieldTable<T>,
    cell: &RefCell<T>,
    offset: u32,
) -> Result<ScriptValue> {
    let control = cell.borrow();
    if offset < control_offsets::BASE_SIZE {
        fields::CONTROL_FIELDS
            .read(control.base(), offset)
            .map_err(|err| retag(err, table.type_name))
    } else {
        table.read(&control, offset)
    }
}

fn write_control<T: GuiControlState>(
    table: &FieldTable<T>,
    cell: &RefCell<T>,
    offset: u32,
    value: &ScriptValue,
) -> Result<()> {
    let mut control = cell.borrow_mut();
    if offset < control_offsets::BASE_SIZE {
        fields::CONTROL_FIELDS
            .write(control.base_mut(), offset, value)
            .map_err(|err| retag(err, table.type_name))
    } else {
        table.write(&mut control, offset, value)
    }
}

/// Report base-field failures under the concrete control type.
fn retag(err: ScriptError, type_name: &'static str) -> ScriptError {
    match err {
        ScriptError::InvalidOffset { offset, .. } => ScriptError::InvalidOffset { type_name, offset },
        ScriptError::ReadOnlyField { field, offset, .. } => ScriptError::ReadOnlyField {
            type_name,
            field,
            offset,
        },
        other => other,
    }
}

struct ObjectCell {
    id: usize,
    capabilities: Capabilities,
    entity: ScriptEntity,
}

/// Shared handle to a script-visible entity.
///
/// Cloning shares the same entity; it is released when the last handle is
/// dropped. Equality is identity.
#[derive(Clone)]
pub struct ScriptObject(Rc<ObjectCell>);

impl ScriptObject {
    /// `id` is the entity's index within its own kind (character number,
    /// channel number, sprite slot, ...).
    pub fn new(id: usize, entity: ScriptEntity) -> Self {
        let capabilities = entity.capabilities();
        Self(Rc::new(ObjectCell {
            id,
            capabilities,
            entity,
        }))
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn capabilities(&self) -> Capabilities {
        self.0.capabilities
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.0.capabilities.has(capability)
    }

    pub fn entity(&self) -> &ScriptEntity {
        &self.0.entity
    }

    pub fn type_name(&self) -> &'static str {
        self.0.entity.primary().script_name()
    }

    pub fn read_field(&self, offset: u32) -> Result<ScriptValue> {
        self.0.entity.read_field(offset)
    }

    pub fn write_field(&self, offset: u32, value: &ScriptValue) -> Result<()> {
        self.0.entity.write_field(offset, value)
    }

    pub fn ptr_eq(&self, other: &ScriptObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Fail with [`ScriptError::CapabilityMismatch`] unless the object has
    /// `capability`.
    pub fn require(&self, capability: Capability, function: &str) -> Result<&Self> {
        if self.has_capability(capability) {
            Ok(self)
        } else {
            Err(ScriptError::CapabilityMismatch {
                function: function.to_string(),
                expected: capability,
                actual: self.type_name(),
            })
        }
    }
}

impl PartialEq for ScriptObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name(), self.0.id)
    }
}

macro_rules! entity_accessors {
    ($($variant:ident => $get:ident, $get_mut:ident, $ty:ty;)*) => {
        impl ScriptObject {
            $(
                pub fn $get(&self) -> Option<Ref<'_, $ty>> {
                    match &self.0.entity {
                        ScriptEntity::$variant(cell) => Some(cell.borrow()),
                        _ => None,
                    }
                }

                pub fn $get_mut(&self) -> Option<RefMut<'_, $ty>> {
                    match &self.0.entity {
                        ScriptEntity::$variant(cell) => Some(cell.borrow_mut()),
                        _ => None,
                    }
                }
            )*
        }
    };
}

entity_accessors! {
    AudioChannel => channel, channel_mut, ChannelRef;
    AudioClip => clip, clip_mut, AudioClipInfo;
    Character => character, character_mut, CharacterInfo;
    Dialog => dialog, dialog_mut, DialogTopic;
    DrawingSurface => surface, surface_mut, SurfaceState;
    DynamicSprite => sprite, sprite_mut, SpriteInfo;
    Gui => gui, gui_mut, GuiGroup;
    Button => button, button_mut, GuiButton;
    Label => label, label_mut, GuiLabel;
    InvWindow => inv_window, inv_window_mut, GuiInvWindow;
    Slider => slider, slider_mut, GuiSlider;
    TextBox => text_box, text_box_mut, GuiTextBox;
    ListBox => list_box, list_box_mut, GuiListBox;
    InventoryItem => inventory_item, inventory_item_mut, InventoryItem;
    MouseCursor => cursor, cursor_mut, MouseCursor;
    ViewFrame => view_frame, view_frame_mut, ViewFrame;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> ScriptObject {
        ScriptObject::new(
            0,
            ScriptEntity::Button(RefCell::new(GuiButton {
                text: "OK".into(),
                ..GuiButton::default()
            })),
        )
    }

    #[test]
    fn buttons_are_also_gui_controls() {
        let object = button();
        assert!(object.has_capability(Capability::GuiButton));
        assert!(object.has_capability(Capability::GuiControl));
        assert!(!object.has_capability(Capability::GuiLabel));
        assert!(!object.has_capability(Capability::Character));
        assert_eq!(object.type_name(), "Button");
    }

    #[test]
    fn every_entity_answers_for_its_own_capability() {
        let objects = [
            ScriptEntity::AudioChannel(RefCell::new(ChannelRef { index: 3 })),
            ScriptEntity::Character(RefCell::new(CharacterInfo::default())),
            ScriptEntity::Dialog(RefCell::new(DialogTopic::default())),
            ScriptEntity::Gui(RefCell::new(GuiGroup::default())),
            ScriptEntity::Slider(RefCell::new(GuiSlider::default())),
            ScriptEntity::InventoryItem(RefCell::new(InventoryItem::default())),
            ScriptEntity::ViewFrame(RefCell::new(ViewFrame::default())),
        ];
        for entity in objects {
            let primary = entity.primary();
            let object = ScriptObject::new(0, entity);
            assert!(object.has_capability(primary), "{primary}");
            assert_eq!(
                object.capabilities().capabilities().count(),
                if object.has_capability(Capability::GuiControl) { 2 } else { 1 }
            );
        }
    }

    #[test]
    fn control_base_fields_come_first() {
        let object = button();
        object
            .write_field(control_offsets::WIDTH, &ScriptValue::Int(80))
            .unwrap();
        assert_eq!(object.button().map(|b| b.base.width), Some(80));
        assert_eq!(
            object.read_field(control_offsets::BASE_SIZE + 24).unwrap(),
            ScriptValue::Str("OK".into())
        );
        let err = object.write_field(control_offsets::FLAGS, &ScriptValue::Int(1));
        assert_eq!(
            err,
            Err(ScriptError::ReadOnlyField {
                type_name: "Button",
                field: "flags",
                offset: control_offsets::FLAGS
            })
        );
        let err = object.read_field(control_offsets::BASE_SIZE + 200);
        assert_eq!(
            err,
            Err(ScriptError::InvalidOffset {
                type_name: "Button",
                offset: control_offsets::BASE_SIZE + 200
            })
        );
    }

    #[test]
    fn handles_share_one_entity() {
        let first = button();
        let second = first.clone();
        assert_eq!(first.handle_count(), 2);
        first
            .write_field(control_offsets::X, &ScriptValue::Int(12))
            .unwrap();
        assert_eq!(
            second.read_field(control_offsets::X).unwrap(),
            ScriptValue::Int(12)
        );
        assert_eq!(first, second);
        assert_ne!(first, button());
        drop(second);
        assert_eq!(first.handle_count(), 1);
    }

    #[test]
    fn accessors_check_the_variant() {
        let object = button();
        assert!(object.character().is_none());
        assert!(object.button().is_some());
        assert!(object.require(Capability::GuiControl, "GUIControl::get_X").is_ok());
        let err = object
            .require(Capability::Character, "Character::Say")
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::CapabilityMismatch {
                expected: Capability::Character,
                actual: "Button",
                ..
            }
        ));
    }
}
