//! GUI section: groups (screens) and the six typed control tables they
//! reference. The section carries its own version, independent of the game
//! descriptor version.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

use super::version::{GuiFeatures, GuiVersion};

pub const GUI_MAGIC: u32 = 0xCAFE_BEEF;
pub const GUI_GROUP_SIZE: usize = 388;
pub const MAX_GROUP_CONTROLS: usize = 30;
const CONTROL_BASE_SIZE: usize = 28;
const CONTROL_NAME_MAX_LEN: usize = 200;
const LIST_ITEM_MAX_LEN: usize = 300;
const BUTTON_TEXT_LEN: usize = 50;
const FIXED_TEXT_LEN: usize = 200;

pub const BUTTON_ALIGN_TOP_CENTER: i32 = 0;
pub const LIST_SAVE_INDEX_FLAG: i32 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Button,
    Label,
    InvWindow,
    Slider,
    TextBox,
    ListBox,
}

impl ControlKind {
    fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            1 => ControlKind::Button,
            2 => ControlKind::Label,
            3 => ControlKind::InvWindow,
            4 => ControlKind::Slider,
            5 => ControlKind::TextBox,
            6 => ControlKind::ListBox,
            _ => return None,
        })
    }

    fn raw(self) -> u32 {
        match self {
            ControlKind::Button => 1,
            ControlKind::Label => 2,
            ControlKind::InvWindow => 3,
            ControlKind::Slider => 4,
            ControlKind::TextBox => 5,
            ControlKind::ListBox => 6,
        }
    }

    /// Number of script event slots the control type exposes.
    pub fn event_capacity(self) -> usize {
        match self {
            ControlKind::Label | ControlKind::InvWindow => 0,
            _ => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Button => "button",
            ControlKind::Label => "label",
            ControlKind::InvWindow => "inventory window",
            ControlKind::Slider => "slider",
            ControlKind::TextBox => "text box",
            ControlKind::ListBox => "list box",
        }
    }
}

/// Group-local reference into one of the typed control tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ControlRef {
    pub kind: ControlKind,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiGroup {
    pub name: String,
    pub on_click: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub focus: i32,
    pub popup_style: i32,
    pub popup_y: i32,
    pub bg_color: i32,
    pub bg_image: i32,
    pub fg_color: i32,
    pub mouse_over: i32,
    pub mouse_was_x: i32,
    pub mouse_was_y: i32,
    pub mouse_down: i32,
    pub highlight: i32,
    pub flags: i32,
    pub transparency: i32,
    pub z_order: i32,
    pub id: i32,
    pub visibility: i32,
    pub controls: Vec<ControlRef>,
}

/// Group record as stored: the control references are still raw words.
struct RawGroup {
    group: GuiGroup,
    refs: Vec<u32>,
}

impl GuiGroup {
    fn read(cursor: &mut Cursor<'_>) -> Result<RawGroup> {
        cursor.skip(4)?;
        let name = cursor.read_fixed_string(16)?;
        let on_click = cursor.read_fixed_string(20)?;
        let x = cursor.read_i32()?;
        let y = cursor.read_i32()?;
        let width = cursor.read_i32()?;
        let height = cursor.read_i32()?;
        let focus = cursor.read_i32()?;
        let control_count = cursor.read_count()?;
        if control_count > MAX_GROUP_CONTROLS {
            return Err(Error::InvalidCount {
                section: cursor.section(),
                count: control_count as i64,
            });
        }
        let popup_style = cursor.read_i32()?;
        let popup_y = cursor.read_i32()?;
        let bg_color = cursor.read_i32()?;
        let bg_image = cursor.read_i32()?;
        let fg_color = cursor.read_i32()?;
        let mouse_over = cursor.read_i32()?;
        let mouse_was_x = cursor.read_i32()?;
        let mouse_was_y = cursor.read_i32()?;
        let mouse_down = cursor.read_i32()?;
        let highlight = cursor.read_i32()?;
        let flags = cursor.read_i32()?;
        let transparency = cursor.read_i32()?;
        let z_order = cursor.read_i32()?;
        let id = cursor.read_i32()?;
        let _padding = cursor.read_i32()?;
        cursor.skip(5 * 4)?;
        let visibility = cursor.read_i32()?;
        let mut refs = Vec::with_capacity(control_count);
        for slot in 0..MAX_GROUP_CONTROLS {
            let raw = cursor.read_u32()?;
            if slot < control_count {
                refs.push(raw);
            }
        }
        cursor.skip(MAX_GROUP_CONTROLS * 4)?;

        Ok(RawGroup {
            group: GuiGroup {
                name,
                on_click,
                x,
                y,
                width,
                height,
                focus,
                popup_style,
                popup_y,
                bg_color,
                bg_image,
                fg_color,
                mouse_over,
                mouse_was_x,
                mouse_was_y,
                mouse_down,
                highlight,
                flags,
                transparency,
                z_order,
                id,
                visibility,
                controls: Vec::new(),
            },
            refs,
        })
    }

    fn write(&self, out: &mut Writer) {
        out.zeros(4)
            .fixed_str(&self.name, 16)
            .fixed_str(&self.on_click, 20)
            .i32(self.x)
            .i32(self.y)
            .i32(self.width)
            .i32(self.height)
            .i32(self.focus)
            .i32(self.controls.len().min(MAX_GROUP_CONTROLS) as i32)
            .i32(self.popup_style)
            .i32(self.popup_y)
            .i32(self.bg_color)
            .i32(self.bg_image)
            .i32(self.fg_color)
            .i32(self.mouse_over)
            .i32(self.mouse_was_x)
            .i32(self.mouse_was_y)
            .i32(self.mouse_down)
            .i32(self.highlight)
            .i32(self.flags)
            .i32(self.transparency)
            .i32(self.z_order)
            .i32(self.id)
            .i32(0)
            .zeros(5 * 4)
            .i32(self.visibility);
        for slot in 0..MAX_GROUP_CONTROLS {
            let raw = self
                .controls
                .get(slot)
                .map(|control| (control.kind.raw() << 16) | control.index as u32)
                .unwrap_or(0);
            out.u32(raw);
        }
        out.zeros(MAX_GROUP_CONTROLS * 4);
    }
}

/// Fields shared by every control type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiControlBase {
    pub flags: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub z_order: i32,
    pub activated: i32,
    pub name: String,
    pub event_handlers: Vec<String>,
}

impl GuiControlBase {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures, kind: ControlKind) -> Result<Self> {
        let mut base = Self {
            flags: cursor.read_i32()?,
            x: cursor.read_i32()?,
            y: cursor.read_i32()?,
            width: cursor.read_i32()?,
            height: cursor.read_i32()?,
            z_order: cursor.read_i32()?,
            activated: cursor.read_i32()?,
            ..Self::default()
        };
        if features.contains(GuiFeatures::CONTROL_NAMES) {
            base.name = cursor.read_c_string(CONTROL_NAME_MAX_LEN)?;
        }
        if features.contains(GuiFeatures::EVENT_HANDLERS) {
            let count = cursor.read_count()?;
            let limit = kind.event_capacity();
            if count > limit {
                return Err(Error::TooManyEvents {
                    section: cursor.section(),
                    control: kind.name(),
                    count,
                    limit,
                });
            }
            for _ in 0..count {
                base.event_handlers
                    .push(cursor.read_c_string(CONTROL_NAME_MAX_LEN)?);
            }
        }
        Ok(base)
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        out.i32(self.flags)
            .i32(self.x)
            .i32(self.y)
            .i32(self.width)
            .i32(self.height)
            .i32(self.z_order)
            .i32(self.activated);
        if features.contains(GuiFeatures::CONTROL_NAMES) {
            out.c_str(&self.name);
        }
        if features.contains(GuiFeatures::EVENT_HANDLERS) {
            out.i32(self.event_handlers.len() as i32);
            for handler in &self.event_handlers {
                out.c_str(handler);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiButton {
    pub base: GuiControlBase,
    pub image: i32,
    pub mouse_over_image: i32,
    pub pushed_image: i32,
    pub current_image: i32,
    pub pushed: i32,
    pub over: i32,
    pub font: i32,
    pub text_color: i32,
    pub left_click: i32,
    pub right_click: i32,
    pub left_click_data: i32,
    pub right_click_data: i32,
    pub text: String,
    pub alignment: i32,
}

impl GuiButton {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::Button)?;
        let mut button = Self {
            base,
            image: cursor.read_i32()?,
            mouse_over_image: cursor.read_i32()?,
            pushed_image: cursor.read_i32()?,
            current_image: cursor.read_i32()?,
            pushed: cursor.read_i32()?,
            over: cursor.read_i32()?,
            font: cursor.read_i32()?,
            text_color: cursor.read_i32()?,
            left_click: cursor.read_i32()?,
            right_click: cursor.read_i32()?,
            left_click_data: cursor.read_i32()?,
            right_click_data: cursor.read_i32()?,
            text: cursor.read_fixed_string(BUTTON_TEXT_LEN)?,
            alignment: BUTTON_ALIGN_TOP_CENTER,
        };
        if features.contains(GuiFeatures::BUTTON_ALIGNMENT) {
            button.alignment = cursor.read_i32()?;
            let _reserved = cursor.read_i32()?;
        }
        Ok(button)
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        out.i32(self.image)
            .i32(self.mouse_over_image)
            .i32(self.pushed_image)
            .i32(self.current_image)
            .i32(self.pushed)
            .i32(self.over)
            .i32(self.font)
            .i32(self.text_color)
            .i32(self.left_click)
            .i32(self.right_click)
            .i32(self.left_click_data)
            .i32(self.right_click_data)
            .fixed_str(&self.text, BUTTON_TEXT_LEN);
        if features.contains(GuiFeatures::BUTTON_ALIGNMENT) {
            out.i32(self.alignment).i32(0);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiLabel {
    pub base: GuiControlBase,
    pub text: String,
    pub font: i32,
    pub text_color: i32,
    pub alignment: i32,
}

impl GuiLabel {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::Label)?;
        let text = if features.contains(GuiFeatures::LABEL_PREFIXED_TEXT) {
            cursor.read_prefixed_string()?
        } else {
            cursor.read_fixed_string(FIXED_TEXT_LEN)?
        };
        Ok(Self {
            base,
            text,
            font: cursor.read_i32()?,
            text_color: cursor.read_i32()?,
            alignment: cursor.read_i32()?,
        })
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        if features.contains(GuiFeatures::LABEL_PREFIXED_TEXT) {
            out.prefixed_str(&self.text);
        } else {
            out.fixed_str(&self.text, FIXED_TEXT_LEN);
        }
        out.i32(self.font).i32(self.text_color).i32(self.alignment);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuiInvWindow {
    pub base: GuiControlBase,
    /// Character whose inventory is shown, -1 for the player.
    pub character: i32,
    pub item_width: i32,
    pub item_height: i32,
    pub top_index: i32,
}

impl Default for GuiInvWindow {
    fn default() -> Self {
        Self {
            base: GuiControlBase::default(),
            character: -1,
            item_width: 40,
            item_height: 22,
            top_index: 0,
        }
    }
}

impl GuiInvWindow {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::InvWindow)?;
        if !features.contains(GuiFeatures::INV_WINDOW_LAYOUT) {
            return Ok(Self {
                base,
                ..Self::default()
            });
        }
        Ok(Self {
            base,
            character: cursor.read_i32()?,
            item_width: cursor.read_i32()?,
            item_height: cursor.read_i32()?,
            top_index: cursor.read_i32()?,
        })
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        if features.contains(GuiFeatures::INV_WINDOW_LAYOUT) {
            out.i32(self.character)
                .i32(self.item_width)
                .i32(self.item_height)
                .i32(self.top_index);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuiSlider {
    pub base: GuiControlBase,
    pub min: i32,
    pub max: i32,
    pub value: i32,
    pub mouse_pressed: i32,
    /// -1 when the slider has no handle image.
    pub handle_image: i32,
    pub handle_offset: i32,
    pub background_image: i32,
}

impl Default for GuiSlider {
    fn default() -> Self {
        Self {
            base: GuiControlBase::default(),
            min: 0,
            max: 10,
            value: 0,
            mouse_pressed: 0,
            handle_image: -1,
            handle_offset: 0,
            background_image: 0,
        }
    }
}

impl GuiSlider {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::Slider)?;
        let mut slider = Self {
            base,
            min: cursor.read_i32()?,
            max: cursor.read_i32()?,
            value: cursor.read_i32()?,
            mouse_pressed: cursor.read_i32()?,
            handle_image: -1,
            handle_offset: 0,
            background_image: 0,
        };
        if features.contains(GuiFeatures::SLIDER_IMAGES) {
            slider.handle_image = cursor.read_i32()?;
            slider.handle_offset = cursor.read_i32()?;
            slider.background_image = cursor.read_i32()?;
        }
        Ok(slider)
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        out.i32(self.min)
            .i32(self.max)
            .i32(self.value)
            .i32(self.mouse_pressed);
        if features.contains(GuiFeatures::SLIDER_IMAGES) {
            out.i32(self.handle_image)
                .i32(self.handle_offset)
                .i32(self.background_image);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiTextBox {
    pub base: GuiControlBase,
    pub text: String,
    pub font: i32,
    pub text_color: i32,
    pub ex_flags: i32,
}

impl GuiTextBox {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::TextBox)?;
        Ok(Self {
            base,
            text: cursor.read_fixed_string(FIXED_TEXT_LEN)?,
            font: cursor.read_i32()?,
            text_color: cursor.read_i32()?,
            ex_flags: cursor.read_i32()?,
        })
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        out.fixed_str(&self.text, FIXED_TEXT_LEN)
            .i32(self.font)
            .i32(self.text_color)
            .i32(self.ex_flags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuiListBox {
    pub base: GuiControlBase,
    pub selected: i32,
    pub top_item: i32,
    pub mouse_x: i32,
    pub mouse_y: i32,
    pub row_height: i32,
    pub visible_count: i32,
    pub font: i32,
    pub text_color: i32,
    pub selected_text_color: i32,
    pub ex_flags: i32,
    pub alignment: i32,
    pub selected_bg_color: i32,
    pub items: Vec<String>,
    pub save_indices: Vec<i16>,
}

impl GuiListBox {
    fn read(cursor: &mut Cursor<'_>, features: GuiFeatures) -> Result<Self> {
        let base = GuiControlBase::read(cursor, features, ControlKind::ListBox)?;
        let item_count = cursor.read_count()?;
        let mut list = Self {
            base,
            selected: cursor.read_i32()?,
            top_item: cursor.read_i32()?,
            mouse_x: cursor.read_i32()?,
            mouse_y: cursor.read_i32()?,
            row_height: cursor.read_i32()?,
            visible_count: cursor.read_i32()?,
            font: cursor.read_i32()?,
            text_color: cursor.read_i32()?,
            selected_text_color: cursor.read_i32()?,
            ex_flags: cursor.read_i32()?,
            ..Self::default()
        };
        if features.contains(GuiFeatures::LIST_ALIGNMENT) {
            list.alignment = cursor.read_i32()?;
            let _reserved = cursor.read_i32()?;
        }
        list.selected_bg_color = if features.contains(GuiFeatures::LIST_SELECTED_BG) {
            cursor.read_i32()?
        } else {
            list.selected_text_color
        };
        cursor.expect_records(item_count, 1)?;
        list.items = (0..item_count)
            .map(|_| cursor.read_c_string(LIST_ITEM_MAX_LEN))
            .collect::<Result<_>>()?;
        if list.stores_save_indices(features) {
            list.save_indices = cursor.read_i16_vec(item_count)?;
        }
        Ok(list)
    }

    fn write(&self, out: &mut Writer, features: GuiFeatures) {
        self.base.write(out, features);
        out.i32(self.items.len() as i32)
            .i32(self.selected)
            .i32(self.top_item)
            .i32(self.mouse_x)
            .i32(self.mouse_y)
            .i32(self.row_height)
            .i32(self.visible_count)
            .i32(self.font)
            .i32(self.text_color)
            .i32(self.selected_text_color)
            .i32(self.ex_flags);
        if features.contains(GuiFeatures::LIST_ALIGNMENT) {
            out.i32(self.alignment).i32(0);
        }
        if features.contains(GuiFeatures::LIST_SELECTED_BG) {
            out.i32(self.selected_bg_color);
        }
        for item in &self.items {
            out.c_str(item);
        }
        if self.stores_save_indices(features) {
            for index in 0..self.items.len() {
                out.i16(self.save_indices.get(index).copied().unwrap_or(0));
            }
        }
    }

    fn stores_save_indices(&self, features: GuiFeatures) -> bool {
        features.contains(GuiFeatures::LIST_SAVE_INDEX) && self.ex_flags & LIST_SAVE_INDEX_FLAG != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuiCollection {
    pub version: GuiVersion,
    pub groups: Vec<GuiGroup>,
    pub buttons: Vec<GuiButton>,
    pub labels: Vec<GuiLabel>,
    pub inv_windows: Vec<GuiInvWindow>,
    pub sliders: Vec<GuiSlider>,
    pub text_boxes: Vec<GuiTextBox>,
    pub list_boxes: Vec<GuiListBox>,
}

impl Default for GuiCollection {
    fn default() -> Self {
        Self {
            version: GuiVersion::CURRENT,
            groups: Vec::new(),
            buttons: Vec::new(),
            labels: Vec::new(),
            inv_windows: Vec::new(),
            sliders: Vec::new(),
            text_boxes: Vec::new(),
            list_boxes: Vec::new(),
        }
    }
}

fn read_table<T>(
    cursor: &mut Cursor<'_>,
    section: &'static str,
    read: impl Fn(&mut Cursor<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    cursor.enter(section);
    let count = cursor.read_count()?;
    cursor.expect_records(count, CONTROL_BASE_SIZE)?;
    (0..count).map(|_| read(cursor)).collect()
}

impl GuiCollection {
    pub fn features(&self) -> GuiFeatures {
        GuiFeatures::for_version(self.version)
    }

    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.enter("gui header");
        let start = cursor.position();
        if cursor.read_u32()? != GUI_MAGIC {
            return Err(Error::BadMagic {
                expected: "GUI section",
                offset: start as u64,
            });
        }
        let raw = cursor.read_i32()?;
        let (version, group_count) = if (0..GuiVersion::V214.0 as i32).contains(&raw) {
            (GuiVersion::INITIAL, raw as usize)
        } else if raw < 0 || raw as u32 > GuiVersion::CURRENT.0 {
            return Err(Error::UnsupportedVersion {
                format: "GUI",
                version: raw as u32,
            });
        } else {
            (GuiVersion(raw as u32), cursor.read_count()?)
        };
        let features = GuiFeatures::for_version(version);

        cursor.enter("gui groups");
        cursor.expect_records(group_count, GUI_GROUP_SIZE)?;
        let raw_groups = (0..group_count)
            .map(|_| GuiGroup::read(cursor))
            .collect::<Result<Vec<_>>>()?;

        let buttons = read_table(cursor, "gui buttons", |c| GuiButton::read(c, features))?;
        let labels = read_table(cursor, "gui labels", |c| GuiLabel::read(c, features))?;
        let inv_windows = read_table(cursor, "gui inventory windows", |c| {
            GuiInvWindow::read(c, features)
        })?;
        let sliders = if features.contains(GuiFeatures::SLIDERS) {
            read_table(cursor, "gui sliders", |c| GuiSlider::read(c, features))?
        } else {
            Vec::new()
        };
        let text_boxes = if features.contains(GuiFeatures::TEXT_BOXES) {
            read_table(cursor, "gui text boxes", |c| GuiTextBox::read(c, features))?
        } else {
            Vec::new()
        };
        let list_boxes = if features.contains(GuiFeatures::LIST_BOXES) {
            read_table(cursor, "gui list boxes", |c| GuiListBox::read(c, features))?
        } else {
            Vec::new()
        };

        let mut collection = Self {
            version,
            groups: Vec::with_capacity(group_count),
            buttons,
            labels,
            inv_windows,
            sliders,
            text_boxes,
            list_boxes,
        };
        for (group_index, raw_group) in raw_groups.into_iter().enumerate() {
            let mut group = raw_group.group;
            for raw_ref in raw_group.refs {
                group
                    .controls
                    .push(collection.resolve_ref(group_index, raw_ref)?);
            }
            collection.groups.push(group);
        }
        Ok(collection)
    }

    fn resolve_ref(&self, group: usize, raw: u32) -> Result<ControlRef> {
        let kind = ControlKind::from_raw(raw >> 16).ok_or_else(|| {
            Error::corrupt(
                "gui groups",
                format!("group {group} references unknown control type {}", raw >> 16),
            )
        })?;
        let index = (raw & 0xFFFF) as usize;
        let len = self.control_count(kind);
        if index >= len {
            return Err(Error::corrupt(
                "gui groups",
                format!(
                    "group {group} references {} {index} but only {len} exist",
                    kind.name()
                ),
            ));
        }
        Ok(ControlRef { kind, index })
    }

    pub fn control_count(&self, kind: ControlKind) -> usize {
        match kind {
            ControlKind::Button => self.buttons.len(),
            ControlKind::Label => self.labels.len(),
            ControlKind::InvWindow => self.inv_windows.len(),
            ControlKind::Slider => self.sliders.len(),
            ControlKind::TextBox => self.text_boxes.len(),
            ControlKind::ListBox => self.list_boxes.len(),
        }
    }

    /// Shared base fields of any referenced control.
    pub fn control_base(&self, control: ControlRef) -> Option<&GuiControlBase> {
        match control.kind {
            ControlKind::Button => self.buttons.get(control.index).map(|c| &c.base),
            ControlKind::Label => self.labels.get(control.index).map(|c| &c.base),
            ControlKind::InvWindow => self.inv_windows.get(control.index).map(|c| &c.base),
            ControlKind::Slider => self.sliders.get(control.index).map(|c| &c.base),
            ControlKind::TextBox => self.text_boxes.get(control.index).map(|c| &c.base),
            ControlKind::ListBox => self.list_boxes.get(control.index).map(|c| &c.base),
        }
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        let features = self.features();
        out.u32(GUI_MAGIC);
        if self.version == GuiVersion::INITIAL {
            out.i32(self.groups.len() as i32);
        } else {
            out.i32(self.version.0 as i32).i32(self.groups.len() as i32);
        }
        for group in &self.groups {
            group.write(out);
        }

        out.i32(self.buttons.len() as i32);
        for button in &self.buttons {
            button.write(out, features);
        }
        out.i32(self.labels.len() as i32);
        for label in &self.labels {
            label.write(out, features);
        }
        out.i32(self.inv_windows.len() as i32);
        for window in &self.inv_windows {
            window.write(out, features);
        }
        if features.contains(GuiFeatures::SLIDERS) {
            out.i32(self.sliders.len() as i32);
            for slider in &self.sliders {
                slider.write(out, features);
            }
        }
        if features.contains(GuiFeatures::TEXT_BOXES) {
            out.i32(self.text_boxes.len() as i32);
            for text_box in &self.text_boxes {
                text_box.write(out, features);
            }
        }
        if features.contains(GuiFeatures::LIST_BOXES) {
            out.i32(self.list_boxes.len() as i32);
            for list in &self.list_boxes {
                list.write(out, features);
            }
        }
    }
}
