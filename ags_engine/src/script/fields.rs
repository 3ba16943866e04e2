//! Raw-offset field tables.
//!
//! Compiled scripts address struct members by byte offset into the legacy
//! in-memory layout. Every script-visible type has one static table mapping
//! those offsets to accessors; an offset that lands outside every entry (or
//! in the middle of one) is rejected with [`ScriptError::InvalidOffset`].
//! Fields without a setter reject writes with [`ScriptError::ReadOnlyField`].

use ags_formats::game::audio::{offsets as clip, AUDIO_CLIP_SIZE};
use ags_formats::game::character::{offsets as chr, CHARACTER_SIZE, MAX_INVENTORY};
use ags_formats::game::dialog::{offsets as dlg, DIALOG_SIZE, MAX_DIALOG_OPTIONS};
use ags_formats::game::gui::{
    GuiButton, GuiControlBase, GuiInvWindow, GuiLabel, GuiListBox, GuiSlider, GuiTextBox,
};
use ags_formats::game::items::{cursor_offsets as cur, inventory_offsets as inv};
use ags_formats::game::items::{CURSOR_SIZE, INVENTORY_ITEM_SIZE};
use ags_formats::game::view::{frame_offsets as frm, VIEW_FRAME_SIZE};
use ags_formats::game::{
    AudioClipInfo, CharacterInfo, DialogTopic, GuiGroup, InventoryItem, MouseCursor, ViewFrame,
};

use super::object::{ChannelRef, SpriteInfo, SurfaceState};
use super::value::ScriptValue;
use super::{Result, ScriptError};

pub type Getter<T> = fn(&T, usize) -> ScriptValue;
pub type Setter<T> = fn(&mut T, usize, &ScriptValue) -> Result<()>;

/// One field (or fixed-length array of fields) at a byte offset.
pub struct FieldDef<T: 'static> {
    pub name: &'static str,
    pub offset: u32,
    /// Size of one element in bytes.
    pub width: u32,
    pub count: u32,
    pub get: Getter<T>,
    pub set: Option<Setter<T>>,
}

impl<T> Clone for FieldDef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDef<T> {}

impl<T> FieldDef<T> {
    pub const fn ro(name: &'static str, offset: u32, width: u32, get: Getter<T>) -> Self {
        Self {
            name,
            offset,
            width,
            count: 1,
            get,
            set: None,
        }
    }

    pub const fn rw(
        name: &'static str,
        offset: u32,
        width: u32,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            offset,
            width,
            count: 1,
            get,
            set: Some(set),
        }
    }

    pub const fn ro_array(
        name: &'static str,
        offset: u32,
        width: u32,
        count: u32,
        get: Getter<T>,
    ) -> Self {
        Self {
            name,
            offset,
            width,
            count,
            get,
            set: None,
        }
    }

    pub const fn rw_array(
        name: &'static str,
        offset: u32,
        width: u32,
        count: u32,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            offset,
            width,
            count,
            get,
            set: Some(set),
        }
    }

    pub fn end(&self) -> u32 {
        self.offset + self.width * self.count
    }

    fn element(&self, offset: u32) -> Option<usize> {
        let relative = offset.checked_sub(self.offset)?;
        if relative >= self.width * self.count || relative % self.width != 0 {
            return None;
        }
        Some((relative / self.width) as usize)
    }
}

pub struct FieldTable<T: 'static> {
    pub type_name: &'static str,
    /// Stride of one element when these objects are laid out in an array.
    pub size: u32,
    pub fields: &'static [FieldDef<T>],
}

impl<T> FieldTable<T> {
    fn locate(&self, offset: u32) -> Result<(&FieldDef<T>, usize)> {
        self.fields
            .iter()
            .find_map(|field| field.element(offset).map(|index| (field, index)))
            .ok_or(ScriptError::InvalidOffset {
                type_name: self.type_name,
                offset,
            })
    }

    pub fn read(&self, value: &T, offset: u32) -> Result<ScriptValue> {
        let (field, index) = self.locate(offset)?;
        Ok((field.get)(value, index))
    }

    pub fn write(&self, value: &mut T, offset: u32, new_value: &ScriptValue) -> Result<()> {
        let (field, index) = self.locate(offset)?;
        let set = field.set.ok_or(ScriptError::ReadOnlyField {
            type_name: self.type_name,
            field: field.name,
            offset,
        })?;
        set(value, index, new_value)
    }

    pub fn field_name(&self, offset: u32) -> Option<&'static str> {
        self.locate(offset).ok().map(|(field, _)| field.name)
    }

    pub fn is_writable(&self, offset: u32) -> bool {
        matches!(self.locate(offset), Ok((field, _)) if field.set.is_some())
    }
}

fn store_string(
    slot: &mut String,
    value: &ScriptValue,
    field: &'static str,
    capacity: u32,
) -> Result<()> {
    let text = value.as_str()?;
    // room for the terminator
    if text.len() >= capacity as usize {
        return Err(ScriptError::StringTooLong {
            field,
            len: text.len(),
            capacity: capacity as usize,
        });
    }
    *slot = text.to_string();
    Ok(())
}

pub static CHARACTER_FIELDS: FieldTable<CharacterInfo> = FieldTable {
    type_name: "Character",
    size: CHARACTER_SIZE as u32,
    fields: &[
        FieldDef::ro("defview", chr::DEFAULT_VIEW, 4, |c, _| c.default_view.into()),
        FieldDef::ro("talkview", chr::TALK_VIEW, 4, |c, _| c.talk_view.into()),
        FieldDef::ro("view", chr::VIEW, 4, |c, _| c.view.into()),
        FieldDef::ro("room", chr::ROOM, 4, |c, _| c.room.into()),
        FieldDef::ro("prevroom", chr::PREVIOUS_ROOM, 4, |c, _| c.previous_room.into()),
        FieldDef::rw(
            "x",
            chr::X,
            4,
            |c, _| c.x.into(),
            |c, _, v| {
                c.x = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "y",
            chr::Y,
            4,
            |c, _| c.y.into(),
            |c, _, v| {
                c.y = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("wait", chr::WAIT, 4, |c, _| c.wait.into()),
        FieldDef::rw(
            "flags",
            chr::FLAGS,
            4,
            |c, _| c.flags.into(),
            |c, _, v| {
                c.flags = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("following", chr::FOLLOWING, 2, |c, _| c.following.into()),
        FieldDef::ro("followinfo", chr::FOLLOW_INFO, 2, |c, _| c.follow_info.into()),
        FieldDef::ro("idleview", chr::IDLE_VIEW, 4, |c, _| c.idle_view.into()),
        FieldDef::ro("idletime", chr::IDLE_TIME, 2, |c, _| c.idle_time.into()),
        FieldDef::ro("idleleft", chr::IDLE_LEFT, 2, |c, _| c.idle_left.into()),
        FieldDef::rw(
            "transparency",
            chr::TRANSPARENCY,
            2,
            |c, _| c.transparency.into(),
            |c, _, v| {
                c.transparency = v.as_short("transparency")?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "baseline",
            chr::BASELINE,
            2,
            |c, _| c.baseline.into(),
            |c, _, v| {
                c.baseline = v.as_short("baseline")?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "activeinv",
            chr::ACTIVE_INVENTORY,
            4,
            |c, _| c.active_inventory.into(),
            |c, _, v| {
                c.active_inventory = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "talkcolor",
            chr::TALK_COLOR,
            4,
            |c, _| c.talk_color.into(),
            |c, _, v| {
                c.talk_color = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("thinkview", chr::THINK_VIEW, 4, |c, _| c.think_view.into()),
        FieldDef::ro("blinkview", chr::BLINK_VIEW, 2, |c, _| c.blink_view.into()),
        FieldDef::rw(
            "blinkinterval",
            chr::BLINK_INTERVAL,
            2,
            |c, _| c.blink_interval.into(),
            |c, _, v| {
                c.blink_interval = v.as_short("blinkinterval")?;
                Ok(())
            },
        ),
        FieldDef::ro("blinktimer", chr::BLINK_TIMER, 2, |c, _| c.blink_timer.into()),
        FieldDef::ro("blinkframe", chr::BLINK_FRAME, 2, |c, _| c.blink_frame.into()),
        FieldDef::ro("walkspeed_y", chr::WALK_SPEED_Y, 2, |c, _| c.walk_speed_y.into()),
        FieldDef::ro("pic_yoffs", chr::PIC_Y_OFFSET, 2, |c, _| c.pic_y_offset.into()),
        FieldDef::rw(
            "z",
            chr::Z,
            4,
            |c, _| c.z.into(),
            |c, _, v| {
                c.z = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("walkwait", chr::WALK_WAIT, 4, |c, _| c.walk_wait.into()),
        FieldDef::rw(
            "speech_anim_speed",
            chr::SPEECH_ANIM_SPEED,
            2,
            |c, _| c.speech_anim_speed.into(),
            |c, _, v| {
                c.speech_anim_speed = v.as_short("speech_anim_speed")?;
                Ok(())
            },
        ),
        FieldDef::ro("blocking_width", chr::BLOCKING_WIDTH, 2, |c, _| {
            c.blocking_width.into()
        }),
        FieldDef::ro("blocking_height", chr::BLOCKING_HEIGHT, 2, |c, _| {
            c.blocking_height.into()
        }),
        FieldDef::ro("index_id", chr::INDEX, 4, |c, _| c.index.into()),
        FieldDef::ro("pic_xoffs", chr::PIC_X_OFFSET, 2, |c, _| c.pic_x_offset.into()),
        FieldDef::ro("walkwaitcounter", chr::WALK_WAIT_COUNTER, 2, |c, _| {
            c.walk_wait_counter.into()
        }),
        FieldDef::ro("loop", chr::LOOP, 2, |c, _| c.loop_index.into()),
        FieldDef::ro("frame", chr::FRAME, 2, |c, _| c.frame.into()),
        FieldDef::ro("walking", chr::WALKING, 2, |c, _| c.walking.into()),
        FieldDef::ro("animating", chr::ANIMATING, 2, |c, _| c.animating.into()),
        FieldDef::ro("walkspeed", chr::WALK_SPEED, 2, |c, _| c.walk_speed.into()),
        FieldDef::rw(
            "animspeed",
            chr::ANIM_SPEED,
            2,
            |c, _| c.anim_speed.into(),
            |c, _, v| {
                c.anim_speed = v.as_short("animspeed")?;
                Ok(())
            },
        ),
        FieldDef::rw_array(
            "inv",
            chr::INVENTORY,
            2,
            MAX_INVENTORY as u32,
            |c, i| c.inventory_count(i).into(),
            |c, i, v| {
                let count = v.as_short("inv")?;
                if c.inventory.len() <= i {
                    c.inventory.resize(i + 1, 0);
                }
                c.inventory[i] = count;
                Ok(())
            },
        ),
        FieldDef::ro("actx", chr::ACTIVITY_X, 2, |c, _| c.activity_x.into()),
        FieldDef::ro("acty", chr::ACTIVITY_Y, 2, |c, _| c.activity_y.into()),
        FieldDef::rw(
            "name",
            chr::NAME,
            40,
            |c, _| c.name.as_str().into(),
            |c, _, v| store_string(&mut c.name, v, "name", 40),
        ),
        FieldDef::ro("scrname", chr::SCRIPT_NAME, 20, |c, _| {
            c.script_name.as_str().into()
        }),
        FieldDef::rw(
            "on",
            chr::ON,
            1,
            |c, _| c.on.into(),
            |c, _, v| {
                c.on = v.as_byte("on")?;
                Ok(())
            },
        ),
    ],
};

pub static INVENTORY_FIELDS: FieldTable<InventoryItem> = FieldTable {
    type_name: "InventoryItem",
    size: INVENTORY_ITEM_SIZE as u32,
    fields: &[
        FieldDef::rw(
            "name",
            inv::NAME,
            25,
            |item, _| item.name.as_str().into(),
            |item, _, v| store_string(&mut item.name, v, "name", 25),
        ),
        FieldDef::rw(
            "pic",
            inv::PIC,
            4,
            |item, _| item.pic.into(),
            |item, _, v| {
                item.pic = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "cursorPic",
            inv::CURSOR_PIC,
            4,
            |item, _| item.cursor_pic.into(),
            |item, _, v| {
                item.cursor_pic = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "hotx",
            inv::HOTSPOT_X,
            4,
            |item, _| item.hotspot_x.into(),
            |item, _, v| {
                item.hotspot_x = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "hoty",
            inv::HOTSPOT_Y,
            4,
            |item, _| item.hotspot_y.into(),
            |item, _, v| {
                item.hotspot_y = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("flags", inv::FLAGS, 1, |item, _| item.flags.into()),
    ],
};

pub static CURSOR_FIELDS: FieldTable<MouseCursor> = FieldTable {
    type_name: "MouseCursor",
    size: CURSOR_SIZE as u32,
    fields: &[
        FieldDef::rw(
            "pic",
            cur::PIC,
            4,
            |cursor, _| cursor.pic.into(),
            |cursor, _, v| {
                cursor.pic = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "hotx",
            cur::HOTSPOT_X,
            2,
            |cursor, _| cursor.hotspot_x.into(),
            |cursor, _, v| {
                cursor.hotspot_x = v.as_short("hotx")?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "hoty",
            cur::HOTSPOT_Y,
            2,
            |cursor, _| cursor.hotspot_y.into(),
            |cursor, _, v| {
                cursor.hotspot_y = v.as_short("hoty")?;
                Ok(())
            },
        ),
        FieldDef::rw(
            "view",
            cur::VIEW,
            2,
            |cursor, _| cursor.view.into(),
            |cursor, _, v| {
                cursor.view = v.as_short("view")?;
                Ok(())
            },
        ),
        FieldDef::ro("name", cur::NAME, 10, |cursor, _| cursor.name.as_str().into()),
        FieldDef::ro("flags", cur::FLAGS, 1, |cursor, _| cursor.flags.into()),
    ],
};

pub static VIEW_FRAME_FIELDS: FieldTable<ViewFrame> = FieldTable {
    type_name: "ViewFrame",
    size: VIEW_FRAME_SIZE as u32,
    fields: &[
        FieldDef::rw(
            "pic",
            frm::PIC,
            4,
            |frame, _| frame.pic.into(),
            |frame, _, v| {
                frame.pic = v.as_int()?;
                Ok(())
            },
        ),
        FieldDef::ro("xoffs", frm::X_OFFSET, 2, |frame, _| frame.x_offset.into()),
        FieldDef::ro("yoffs", frm::Y_OFFSET, 2, |frame, _| frame.y_offset.into()),
        FieldDef::ro("speed", frm::SPEED, 2, |frame, _| frame.speed.into()),
        FieldDef::ro("flags", frm::FLAGS, 4, |frame, _| frame.flags.into()),
        FieldDef::rw(
            "sound",
            frm::SOUND,
            4,
            |frame, _| frame.sound.into(),
            |frame, _, v| {
                frame.sound = v.as_int()?;
                Ok(())
            },
        ),
    ],
};

pub static AUDIO_CLIP_FIELDS: FieldTable<AudioClipInfo> = FieldTable {
    type_name: "AudioClip",
    size: AUDIO_CLIP_SIZE as u32,
    fields: &[
        FieldDef::ro("id", clip::ID, 4, |c, _| c.id.into()),
        FieldDef::ro("scriptName", clip::SCRIPT_NAME, 30, |c, _| {
            c.script_name.as_str().into()
        }),
        FieldDef::ro("fileName", clip::FILE_NAME, 15, |c, _| c.file_name.as_str().into()),
        FieldDef::ro("bundlingType", clip::BUNDLING, 1, |c, _| c.bundling.raw().into()),
        FieldDef::ro("type", clip::TYPE, 1, |c, _| c.clip_type.into()),
        FieldDef::ro("fileType", clip::FILE_TYPE, 1, |c, _| c.file_type.raw().into()),
        FieldDef::ro("defaultRepeat", clip::REPEAT, 1, |c, _| c.repeat.into()),
        FieldDef::ro("defaultPriority", clip::PRIORITY, 2, |c, _| c.priority.into()),
        FieldDef::ro("defaultVolume", clip::VOLUME, 2, |c, _| c.volume.into()),
    ],
};

pub static DIALOG_FIELDS: FieldTable<DialogTopic> = FieldTable {
    type_name: "Dialog",
    size: DIALOG_SIZE as u32,
    fields: &[
        FieldDef::ro_array(
            "optionnames",
            dlg::OPTION_NAMES,
            150,
            MAX_DIALOG_OPTIONS as u32,
            |d, i| {
                d.options
                    .get(i)
                    .map(|option| option.text.as_str())
                    .unwrap_or_default()
                    .into()
            },
        ),
        FieldDef::rw_array(
            "optionflags",
            dlg::OPTION_FLAGS,
            4,
            MAX_DIALOG_OPTIONS as u32,
            |d, i| d.options.get(i).map(|option| option.flags).unwrap_or(0).into(),
            |d, i, v| {
                let flags = v.as_int()?;
                let option = d
                    .options
                    .get_mut(i)
                    .ok_or(ScriptError::NoSuchElement {
                        field: "optionflags",
                        index: i,
                    })?;
                option.flags = flags;
                Ok(())
            },
        ),
        FieldDef::ro_array(
            "entrypoints",
            dlg::ENTRY_POINTS,
            2,
            MAX_DIALOG_OPTIONS as u32,
            |d, i| {
                d.options
                    .get(i)
                    .map(|option| option.entry_point)
                    .unwrap_or(0)
                    .into()
            },
        ),
        FieldDef::ro("startupentrypoint", dlg::STARTUP_ENTRY_POINT, 2, |d, _| {
            d.startup_entry_point.into()
        }),
        FieldDef::ro("codesize", dlg::CODE_SIZE, 2, |d, _| d.code_size.into()),
        FieldDef::ro("numoptions", dlg::OPTION_COUNT, 4, |d, _| {
            (d.options.len() as i32).into()
        }),
        FieldDef::rw(
            "topicFlags",
            dlg::TOPIC_FLAGS,
            4,
            |d, _| d.topic_flags.into(),
            |d, _, v| {
                d.topic_flags = v.as_int()?;
                Ok(())
            },
        ),
    ],
};

/// Script-side layout of a GUI group.
pub mod gui_offsets {
    pub const X: u32 = 0;
    pub const Y: u32 = 4;
    pub const WIDTH: u32 = 8;
    pub const HEIGHT: u32 = 12;
    pub const BG_COLOR: u32 = 16;
    pub const BG_IMAGE: u32 = 20;
    pub const FG_COLOR: u32 = 24;
    pub const TRANSPARENCY: u32 = 28;
    pub const Z_ORDER: u32 = 32;
    pub const VISIBILITY: u32 = 36;
    pub const POPUP_STYLE: u32 = 40;
    pub const FLAGS: u32 = 44;
    pub const ID: u32 = 48;
    pub const NAME: u32 = 52;
    pub const SIZE: u32 = 68;
}

macro_rules! int_field {
    ($name:literal, $offset:expr, $field:ident) => {
        FieldDef::rw(
            $name,
            $offset,
            4,
            |value, _| value.$field.into(),
            |value, _, v| {
                value.$field = v.as_int()?;
                Ok(())
            },
        )
    };
}

pub static GUI_FIELDS: FieldTable<GuiGroup> = FieldTable {
    type_name: "GUI",
    size: gui_offsets::SIZE,
    fields: &[
        int_field!("x", gui_offsets::X, x),
        int_field!("y", gui_offsets::Y, y),
        int_field!("wid", gui_offsets::WIDTH, width),
        int_field!("hit", gui_offsets::HEIGHT, height),
        int_field!("bgcol", gui_offsets::BG_COLOR, bg_color),
        int_field!("bgpic", gui_offsets::BG_IMAGE, bg_image),
        int_field!("fgcol", gui_offsets::FG_COLOR, fg_color),
        int_field!("transparency", gui_offsets::TRANSPARENCY, transparency),
        int_field!("zorder", gui_offsets::Z_ORDER, z_order),
        int_field!("on", gui_offsets::VISIBILITY, visibility),
        FieldDef::ro("popup", gui_offsets::POPUP_STYLE, 4, |g, _| g.popup_style.into()),
        FieldDef::ro("flags", gui_offsets::FLAGS, 4, |g, _| g.flags.into()),
        FieldDef::ro("id", gui_offsets::ID, 4, |g, _| g.id.into()),
        FieldDef::ro("name", gui_offsets::NAME, 16, |g, _| g.name.as_str().into()),
    ],
};

/// Script-side layout shared by every GUI control; type-specific fields
/// start at [`control_offsets::BASE_SIZE`].
pub mod control_offsets {
    pub const X: u32 = 0;
    pub const Y: u32 = 4;
    pub const WIDTH: u32 = 8;
    pub const HEIGHT: u32 = 12;
    pub const Z_ORDER: u32 = 16;
    pub const FLAGS: u32 = 20;
    pub const ACTIVATED: u32 = 24;
    pub const NAME: u32 = 28;
    pub const BASE_SIZE: u32 = 48;
}

pub static CONTROL_FIELDS: FieldTable<GuiControlBase> = FieldTable {
    type_name: "GUIControl",
    size: control_offsets::BASE_SIZE,
    fields: &[
        int_field!("x", control_offsets::X, x),
        int_field!("y", control_offsets::Y, y),
        int_field!("wid", control_offsets::WIDTH, width),
        int_field!("hit", control_offsets::HEIGHT, height),
        int_field!("zorder", control_offsets::Z_ORDER, z_order),
        FieldDef::ro("flags", control_offsets::FLAGS, 4, |c, _| c.flags.into()),
        FieldDef::ro("activated", control_offsets::ACTIVATED, 4, |c, _| {
            c.activated.into()
        }),
        FieldDef::ro("scriptName", control_offsets::NAME, 20, |c, _| {
            c.name.as_str().into()
        }),
    ],
};

/// Access to the common part of a typed control.
pub trait GuiControlState {
    fn base(&self) -> &GuiControlBase;
    fn base_mut(&mut self) -> &mut GuiControlBase;
}

macro_rules! control_state {
    ($($ty:ty),*) => {
        $(impl GuiControlState for $ty {
            fn base(&self) -> &GuiControlBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut GuiControlBase {
                &mut self.base
            }
        })*
    };
}

control_state!(GuiButton, GuiLabel, GuiInvWindow, GuiSlider, GuiTextBox, GuiListBox);

const B: u32 = control_offsets::BASE_SIZE;

pub static BUTTON_FIELDS: FieldTable<GuiButton> = FieldTable {
    type_name: "Button",
    size: B + 76,
    fields: &[
        int_field!("pic", B, image),
        int_field!("overpic", B + 4, mouse_over_image),
        int_field!("pushedpic", B + 8, pushed_image),
        int_field!("font", B + 12, font),
        int_field!("textcol", B + 16, text_color),
        FieldDef::ro("textAlignment", B + 20, 4, |b, _| b.alignment.into()),
        FieldDef::rw(
            "text",
            B + 24,
            50,
            |b, _| b.text.as_str().into(),
            |b, _, v| store_string(&mut b.text, v, "text", 50),
        ),
    ],
};

pub static LABEL_FIELDS: FieldTable<GuiLabel> = FieldTable {
    type_name: "Label",
    size: B + 212,
    fields: &[
        int_field!("font", B, font),
        int_field!("textcol", B + 4, text_color),
        FieldDef::ro("textAlignment", B + 8, 4, |l, _| l.alignment.into()),
        FieldDef::rw(
            "text",
            B + 12,
            200,
            |l, _| l.text.as_str().into(),
            |l, _, v| store_string(&mut l.text, v, "text", 200),
        ),
    ],
};

pub static INV_WINDOW_FIELDS: FieldTable<GuiInvWindow> = FieldTable {
    type_name: "InvWindow",
    size: B + 16,
    fields: &[
        int_field!("charId", B, character),
        int_field!("itemWidth", B + 4, item_width),
        int_field!("itemHeight", B + 8, item_height),
        int_field!("topIndex", B + 12, top_index),
    ],
};

pub static SLIDER_FIELDS: FieldTable<GuiSlider> = FieldTable {
    type_name: "Slider",
    size: B + 24,
    fields: &[
        FieldDef::ro("min", B, 4, |s, _| s.min.into()),
        FieldDef::ro("max", B + 4, 4, |s, _| s.max.into()),
        FieldDef::rw(
            "value",
            B + 8,
            4,
            |s, _| s.value.into(),
            |s, _, v| {
                let value = v.as_int()?;
                if value < s.min || value > s.max {
                    return Err(ScriptError::ValueOutOfRange {
                        field: "value",
                        value,
                    });
                }
                s.value = value;
                Ok(())
            },
        ),
        int_field!("handlepic", B + 12, handle_image),
        int_field!("handleoffset", B + 16, handle_offset),
        int_field!("bgimage", B + 20, background_image),
    ],
};

pub static TEXT_BOX_FIELDS: FieldTable<GuiTextBox> = FieldTable {
    type_name: "TextBox",
    size: B + 212,
    fields: &[
        int_field!("font", B, font),
        int_field!("textcol", B + 4, text_color),
        FieldDef::ro("exflags", B + 8, 4, |t, _| t.ex_flags.into()),
        FieldDef::rw(
            "text",
            B + 12,
            200,
            |t, _| t.text.as_str().into(),
            |t, _, v| store_string(&mut t.text, v, "text", 200),
        ),
    ],
};

pub static LIST_BOX_FIELDS: FieldTable<GuiListBox> = FieldTable {
    type_name: "ListBox",
    size: B + 36,
    fields: &[
        FieldDef::rw(
            "selected",
            B,
            4,
            |l, _| l.selected.into(),
            |l, _, v| {
                let value = v.as_int()?;
                if value < -1 || value >= l.items.len() as i32 {
                    return Err(ScriptError::ValueOutOfRange {
                        field: "selected",
                        value,
                    });
                }
                l.selected = value;
                Ok(())
            },
        ),
        int_field!("topItem", B + 4, top_item),
        FieldDef::ro("rowheight", B + 8, 4, |l, _| l.row_height.into()),
        FieldDef::ro("num_items_fit", B + 12, 4, |l, _| l.visible_count.into()),
        int_field!("font", B + 16, font),
        int_field!("textcol", B + 20, text_color),
        int_field!("selectedtextcol", B + 24, selected_text_color),
        int_field!("selectedbgcol", B + 28, selected_bg_color),
        FieldDef::ro("numItems", B + 32, 4, |l, _| (l.items.len() as i32).into()),
    ],
};

pub static AUDIO_CHANNEL_FIELDS: FieldTable<ChannelRef> = FieldTable {
    type_name: "AudioChannel",
    size: 4,
    fields: &[FieldDef::ro("id", 0, 4, |c, _| (c.index as i32).into())],
};

pub static DYNAMIC_SPRITE_FIELDS: FieldTable<SpriteInfo> = FieldTable {
    type_name: "DynamicSprite",
    size: 16,
    fields: &[
        FieldDef::ro("slot", 0, 4, |s, _| s.slot.into()),
        FieldDef::ro("width", 4, 4, |s, _| s.width.into()),
        FieldDef::ro("height", 8, 4, |s, _| s.height.into()),
        FieldDef::ro("colorDepth", 12, 4, |s, _| s.color_depth.into()),
    ],
};

pub static DRAWING_SURFACE_FIELDS: FieldTable<SurfaceState> = FieldTable {
    type_name: "DrawingSurface",
    size: 12,
    fields: &[
        int_field!("currentColour", 0, draw_color),
        FieldDef::ro("width", 4, 4, |s, _| s.width.into()),
        FieldDef::ro("height", 8, 4, |s, _| s.height.into()),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_layout<T>(table: &FieldTable<T>) {
        let mut previous_end = 0;
        for field in table.fields {
            assert!(
                field.offset >= previous_end,
                "{}.{} overlaps the field before it",
                table.type_name,
                field.name
            );
            assert!(
                field.end() <= table.size,
                "{}.{} runs past the end of the struct",
                table.type_name,
                field.name
            );
            previous_end = field.end();
        }
    }

    #[test]
    fn tables_are_ordered_and_fit_their_struct() {
        assert_layout(&CHARACTER_FIELDS);
        assert_layout(&INVENTORY_FIELDS);
        assert_layout(&CURSOR_FIELDS);
        assert_layout(&VIEW_FRAME_FIELDS);
        assert_layout(&AUDIO_CLIP_FIELDS);
        assert_layout(&DIALOG_FIELDS);
        assert_layout(&GUI_FIELDS);
        assert_layout(&CONTROL_FIELDS);
        assert_layout(&BUTTON_FIELDS);
        assert_layout(&LABEL_FIELDS);
        assert_layout(&INV_WINDOW_FIELDS);
        assert_layout(&SLIDER_FIELDS);
        assert_layout(&TEXT_BOX_FIELDS);
        assert_layout(&LIST_BOX_FIELDS);
        assert_layout(&AUDIO_CHANNEL_FIELDS);
        assert_layout(&DYNAMIC_SPRITE_FIELDS);
        assert_layout(&DRAWING_SURFACE_FIELDS);
    }

    #[test]
    fn character_fields_follow_the_record_layout() {
        let mut character = CharacterInfo {
            x: 160,
            name: "Roger".into(),
            ..CharacterInfo::default()
        };
        assert_eq!(
            CHARACTER_FIELDS.read(&character, chr::X).unwrap(),
            ScriptValue::Int(160)
        );
        assert_eq!(
            CHARACTER_FIELDS.read(&character, chr::NAME).unwrap(),
            ScriptValue::Str("Roger".into())
        );
        assert_eq!(CHARACTER_FIELDS.field_name(chr::INVENTORY + 2 * 7), Some("inv"));

        CHARACTER_FIELDS
            .write(&mut character, chr::INVENTORY + 2 * 7, &ScriptValue::Int(2))
            .unwrap();
        assert_eq!(character.inventory_count(7), 2);
        assert_eq!(
            CHARACTER_FIELDS
                .read(&character, chr::INVENTORY + 2 * 7)
                .unwrap(),
            ScriptValue::Int(2)
        );
    }

    #[test]
    fn unmapped_offsets_name_the_type_and_offset() {
        let character = CharacterInfo::default();
        // inside the 4-byte x field
        let err = CHARACTER_FIELDS.read(&character, chr::X + 1).unwrap_err();
        assert_eq!(
            err,
            ScriptError::InvalidOffset {
                type_name: "Character",
                offset: chr::X + 1
            }
        );
        // padding after the `on` byte
        assert!(CHARACTER_FIELDS.read(&character, chr::ON + 1).is_err());
        assert!(INVENTORY_FIELDS
            .read(&InventoryItem::default(), 44)
            .is_err());
    }

    #[test]
    fn read_only_fields_refuse_writes() {
        let mut character = CharacterInfo::default();
        let err = CHARACTER_FIELDS
            .write(&mut character, chr::ROOM, &ScriptValue::Int(3))
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::ReadOnlyField {
                type_name: "Character",
                field: "room",
                offset: chr::ROOM
            }
        );
        assert!(!CHARACTER_FIELDS.is_writable(chr::ROOM));
        assert!(CHARACTER_FIELDS.is_writable(chr::X));
    }

    #[test]
    fn writes_are_checked_against_the_field_width() {
        let mut character = CharacterInfo::default();
        let err = CHARACTER_FIELDS
            .write(&mut character, chr::BASELINE, &ScriptValue::Int(70_000))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ValueOutOfRange {
                field: "baseline",
                ..
            }
        ));
        let long_name = "x".repeat(40);
        let err = CHARACTER_FIELDS
            .write(&mut character, chr::NAME, &ScriptValue::Str(long_name))
            .unwrap_err();
        assert!(matches!(err, ScriptError::StringTooLong { capacity: 40, .. }));
        let err = CHARACTER_FIELDS
            .write(&mut character, chr::X, &ScriptValue::Str("ten".into()))
            .unwrap_err();
        assert!(matches!(err, ScriptError::TypeMismatch { expected: "int", .. }));
    }

    #[test]
    fn dialog_option_flags_are_per_option() {
        let mut topic = DialogTopic {
            options: vec![
                ags_formats::game::DialogOption {
                    text: "Hi".into(),
                    flags: 1,
                    entry_point: 0,
                },
                ags_formats::game::DialogOption {
                    text: "Bye".into(),
                    flags: 0,
                    entry_point: 0,
                },
            ],
            ..DialogTopic::default()
        };
        DIALOG_FIELDS
            .write(&mut topic, dlg::OPTION_FLAGS + 4, &ScriptValue::Int(3))
            .unwrap();
        assert_eq!(topic.options[1].flags, 3);
        assert_eq!(
            DIALOG_FIELDS.read(&topic, dlg::OPTION_NAMES + 150).unwrap(),
            ScriptValue::Str("Bye".into())
        );
        assert_eq!(
            DIALOG_FIELDS.read(&topic, dlg::OPTION_COUNT).unwrap(),
            ScriptValue::Int(2)
        );
        let err = DIALOG_FIELDS
            .write(&mut topic, dlg::OPTION_FLAGS + 4 * 5, &ScriptValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, ScriptError::NoSuchElement { index: 5, .. }));
    }

    #[test]
    fn slider_value_stays_within_bounds() {
        let mut slider = GuiSlider {
            min: 0,
            max: 10,
            ..GuiSlider::default()
        };
        SLIDER_FIELDS
            .write(&mut slider, B + 8, &ScriptValue::Int(7))
            .unwrap();
        assert_eq!(slider.value, 7);
        assert!(SLIDER_FIELDS
            .write(&mut slider, B + 8, &ScriptValue::Int(11))
            .is_err());
        assert_eq!(
            SLIDER_FIELDS.read(&slider, B + 12).unwrap(),
            ScriptValue::Int(-1)
        );
    }
}
