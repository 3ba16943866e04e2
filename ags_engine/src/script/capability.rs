use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

/// Closed set of script-visible types. An object may satisfy several of
/// them, e.g. every button is also a GUI control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    AudioChannel,
    AudioClip,
    Character,
    Dialog,
    DrawingSurface,
    DynamicSprite,
    Gui,
    GuiControl,
    GuiButton,
    GuiLabel,
    GuiInvWindow,
    GuiSlider,
    GuiTextBox,
    GuiListBox,
    InventoryItem,
    MouseCursor,
    ViewFrame,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Capabilities: u32 {
        const AUDIO_CHANNEL = 1 << 0;
        const AUDIO_CLIP = 1 << 1;
        const CHARACTER = 1 << 2;
        const DIALOG = 1 << 3;
        const DRAWING_SURFACE = 1 << 4;
        const DYNAMIC_SPRITE = 1 << 5;
        const GUI = 1 << 6;
        const GUI_CONTROL = 1 << 7;
        const GUI_BUTTON = 1 << 8;
        const GUI_LABEL = 1 << 9;
        const GUI_INV_WINDOW = 1 << 10;
        const GUI_SLIDER = 1 << 11;
        const GUI_TEXT_BOX = 1 << 12;
        const GUI_LIST_BOX = 1 << 13;
        const INVENTORY_ITEM = 1 << 14;
        const MOUSE_CURSOR = 1 << 15;
        const VIEW_FRAME = 1 << 16;
    }
}

impl Capability {
    pub const ALL: [Capability; 17] = [
        Capability::AudioChannel,
        Capability::AudioClip,
        Capability::Character,
        Capability::Dialog,
        Capability::DrawingSurface,
        Capability::DynamicSprite,
        Capability::Gui,
        Capability::GuiControl,
        Capability::GuiButton,
        Capability::GuiLabel,
        Capability::GuiInvWindow,
        Capability::GuiSlider,
        Capability::GuiTextBox,
        Capability::GuiListBox,
        Capability::InventoryItem,
        Capability::MouseCursor,
        Capability::ViewFrame,
    ];

    pub fn flag(self) -> Capabilities {
        match self {
            Capability::AudioChannel => Capabilities::AUDIO_CHANNEL,
            Capability::AudioClip => Capabilities::AUDIO_CLIP,
            Capability::Character => Capabilities::CHARACTER,
            Capability::Dialog => Capabilities::DIALOG,
            Capability::DrawingSurface => Capabilities::DRAWING_SURFACE,
            Capability::DynamicSprite => Capabilities::DYNAMIC_SPRITE,
            Capability::Gui => Capabilities::GUI,
            Capability::GuiControl => Capabilities::GUI_CONTROL,
            Capability::GuiButton => Capabilities::GUI_BUTTON,
            Capability::GuiLabel => Capabilities::GUI_LABEL,
            Capability::GuiInvWindow => Capabilities::GUI_INV_WINDOW,
            Capability::GuiSlider => Capabilities::GUI_SLIDER,
            Capability::GuiTextBox => Capabilities::GUI_TEXT_BOX,
            Capability::GuiListBox => Capabilities::GUI_LIST_BOX,
            Capability::InventoryItem => Capabilities::INVENTORY_ITEM,
            Capability::MouseCursor => Capabilities::MOUSE_CURSOR,
            Capability::ViewFrame => Capabilities::VIEW_FRAME,
        }
    }

    /// Type name as scripts spell it.
    pub fn script_name(self) -> &'static str {
        match self {
            Capability::AudioChannel => "AudioChannel",
            Capability::AudioClip => "AudioClip",
            Capability::Character => "Character",
            Capability::Dialog => "Dialog",
            Capability::DrawingSurface => "DrawingSurface",
            Capability::DynamicSprite => "DynamicSprite",
            Capability::Gui => "GUI",
            Capability::GuiControl => "GUIControl",
            Capability::GuiButton => "Button",
            Capability::GuiLabel => "Label",
            Capability::GuiInvWindow => "InvWindow",
            Capability::GuiSlider => "Slider",
            Capability::GuiTextBox => "TextBox",
            Capability::GuiListBox => "ListBox",
            Capability::InventoryItem => "InventoryItem",
            Capability::MouseCursor => "MouseCursor",
            Capability::ViewFrame => "ViewFrame",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.script_name())
    }
}

impl From<Capability> for Capabilities {
    fn from(capability: Capability) -> Self {
        capability.flag()
    }
}

impl Capabilities {
    pub fn has(self, capability: Capability) -> bool {
        self.contains(capability.flag())
    }

    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.has(*capability))
    }
}
