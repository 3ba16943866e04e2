use super::{getter, index_arg, object_or_void, setter};
use crate::script::fields::{control_offsets, gui_offsets};
use crate::script::{Capability, FunctionSpec, ParamKind, ScriptError, ScriptValue};

use ParamKind::{Int, Str};

const B: u32 = control_offsets::BASE_SIZE;

/// Rows a list box keeps before `AddItem` starts refusing.
const LIST_BOX_CAPACITY: usize = 200;

fn gui_functions() -> Vec<FunctionSpec> {
    use Capability::Gui;
    vec![
        getter("GUI::get_X", Gui, gui_offsets::X),
        setter("GUI::set_X", Gui, gui_offsets::X, Int),
        getter("GUI::get_Y", Gui, gui_offsets::Y),
        setter("GUI::set_Y", Gui, gui_offsets::Y, Int),
        getter("GUI::get_Width", Gui, gui_offsets::WIDTH),
        getter("GUI::get_Height", Gui, gui_offsets::HEIGHT),
        getter("GUI::get_ZOrder", Gui, gui_offsets::Z_ORDER),
        setter("GUI::set_ZOrder", Gui, gui_offsets::Z_ORDER, Int),
        getter("GUI::get_ID", Gui, gui_offsets::ID),
        FunctionSpec::method("GUI::get_Visible", Gui, &[], |_, object, _| {
            let visible = object.gui().map_or(false, |gui| gui.visibility != 0);
            Ok(visible.into())
        }),
        FunctionSpec::method("GUI::set_Visible", Gui, &[Int], |_, object, args| {
            let visible = args[0].as_int()? != 0;
            object.write_field(gui_offsets::VISIBILITY, &ScriptValue::from(visible))?;
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::method("GUI::get_ControlCount", Gui, &[], |_, object, _| {
            let count = object.gui().map_or(0, |gui| gui.controls.len());
            Ok(ScriptValue::Int(count as i32))
        }),
        FunctionSpec::method("GUI::geti_Controls", Gui, &[Int], |rt, object, args| {
            let index = index_arg(&args[0], "Controls")?;
            let control = object
                .gui()
                .and_then(|gui| gui.controls.get(index).copied())
                .and_then(|control| rt.objects.control(control.kind, control.index).cloned());
            Ok(object_or_void(control))
        }),
        FunctionSpec::function("Game::get_GUICount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.objects.guis.len() as i32))
        }),
    ]
}

fn control_functions() -> Vec<FunctionSpec> {
    use Capability::GuiControl;
    vec![
        getter("GUIControl::get_X", GuiControl, control_offsets::X),
        setter("GUIControl::set_X", GuiControl, control_offsets::X, Int),
        getter("GUIControl::get_Y", GuiControl, control_offsets::Y),
        setter("GUIControl::set_Y", GuiControl, control_offsets::Y, Int),
        getter("GUIControl::get_Width", GuiControl, control_offsets::WIDTH),
        setter("GUIControl::set_Width", GuiControl, control_offsets::WIDTH, Int),
        getter("GUIControl::get_Height", GuiControl, control_offsets::HEIGHT),
        setter("GUIControl::set_Height", GuiControl, control_offsets::HEIGHT, Int),
        getter("GUIControl::get_ZOrder", GuiControl, control_offsets::Z_ORDER),
        getter("GUIControl::get_ScriptName", GuiControl, control_offsets::NAME),
    ]
}

fn typed_control_functions() -> Vec<FunctionSpec> {
    use Capability::{GuiButton, GuiLabel, GuiListBox, GuiSlider, GuiTextBox};
    vec![
        getter("Button::get_Text", GuiButton, B + 24),
        setter("Button::set_Text", GuiButton, B + 24, Str),
        getter("Button::get_NormalGraphic", GuiButton, B),
        setter("Button::set_NormalGraphic", GuiButton, B, Int),
        getter("Button::get_TextColor", GuiButton, B + 16),
        setter("Button::set_TextColor", GuiButton, B + 16, Int),
        getter("Label::get_Text", GuiLabel, B + 12),
        setter("Label::set_Text", GuiLabel, B + 12, Str),
        getter("Label::get_TextColor", GuiLabel, B + 4),
        setter("Label::set_TextColor", GuiLabel, B + 4, Int),
        getter("TextBox::get_Text", GuiTextBox, B + 12),
        setter("TextBox::set_Text", GuiTextBox, B + 12, Str),
        getter("Slider::get_Min", GuiSlider, B),
        getter("Slider::get_Max", GuiSlider, B + 4),
        getter("Slider::get_Value", GuiSlider, B + 8),
        setter("Slider::set_Value", GuiSlider, B + 8, Int),
        getter("ListBox::get_SelectedIndex", GuiListBox, B),
        setter("ListBox::set_SelectedIndex", GuiListBox, B, Int),
        getter("ListBox::get_ItemCount", GuiListBox, B + 32),
        FunctionSpec::method("ListBox::AddItem", GuiListBox, &[Str], |_, object, args| {
            let text = args[0].as_str()?;
            let Some(mut list) = object.list_box_mut() else {
                return Ok(false.into());
            };
            if list.items.len() >= LIST_BOX_CAPACITY {
                return Ok(false.into());
            }
            list.items.push(text.to_string());
            Ok(true.into())
        }),
        FunctionSpec::method("ListBox::Clear", GuiListBox, &[], |_, object, _| {
            if let Some(mut list) = object.list_box_mut() {
                list.items.clear();
                list.selected = -1;
                list.top_item = 0;
            }
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::method("ListBox::geti_Items", GuiListBox, &[Int], |_, object, args| {
            let index = index_arg(&args[0], "Items")?;
            let list = object.list_box();
            let item = list.as_ref().and_then(|list| list.items.get(index));
            match item {
                Some(text) => Ok(text.as_str().into()),
                None => Err(ScriptError::NoSuchElement {
                    field: "Items",
                    index,
                }),
            }
        }),
    ]
}

pub(super) fn functions() -> Vec<FunctionSpec> {
    let mut functions = gui_functions();
    functions.extend(control_functions());
    functions.extend(typed_control_functions());
    functions
}
