use serde::Serialize;

use crate::error::Result;
use crate::reader::Cursor;
use crate::writer::Writer;

use super::version::GameFeatures;

pub const INVENTORY_ITEM_SIZE: usize = 68;
pub const CURSOR_SIZE: usize = 24;
const INVENTORY_NAME_LEN: usize = 25;
const CURSOR_NAME_LEN: usize = 10;

pub mod inventory_offsets {
    pub const NAME: u32 = 0;
    pub const PIC: u32 = 28;
    pub const CURSOR_PIC: u32 = 32;
    pub const HOTSPOT_X: u32 = 36;
    pub const HOTSPOT_Y: u32 = 40;
    pub const FLAGS: u32 = 64;
}

pub mod cursor_offsets {
    pub const PIC: u32 = 0;
    pub const HOTSPOT_X: u32 = 4;
    pub const HOTSPOT_Y: u32 = 6;
    pub const VIEW: u32 = 8;
    pub const NAME: u32 = 10;
    pub const FLAGS: u32 = 20;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub name: String,
    pub pic: i32,
    pub cursor_pic: i32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
    pub flags: u8,
}

impl InventoryItem {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let name = cursor.read_fixed_string(INVENTORY_NAME_LEN)?;
        cursor.skip(3)?;
        let pic = cursor.read_i32()?;
        let cursor_pic = cursor.read_i32()?;
        let hotspot_x = cursor.read_i32()?;
        let hotspot_y = cursor.read_i32()?;
        cursor.skip(5 * 4)?;
        let flags = cursor.read_u8()?;
        cursor.skip(3)?;
        Ok(Self {
            name,
            pic,
            cursor_pic,
            hotspot_x,
            hotspot_y,
            flags,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.fixed_str(&self.name, INVENTORY_NAME_LEN)
            .zeros(3)
            .i32(self.pic)
            .i32(self.cursor_pic)
            .i32(self.hotspot_x)
            .i32(self.hotspot_y)
            .zeros(5 * 4)
            .u8(self.flags)
            .zeros(3);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MouseCursor {
    pub pic: i32,
    pub hotspot_x: i16,
    pub hotspot_y: i16,
    /// Animation view, -1 when the cursor is static.
    pub view: i16,
    pub name: String,
    pub flags: u8,
}

impl MouseCursor {
    pub(crate) fn read(cursor: &mut Cursor<'_>, features: GameFeatures) -> Result<Self> {
        let pic = cursor.read_i32()?;
        let hotspot_x = cursor.read_i16()?;
        let hotspot_y = cursor.read_i16()?;
        let stored_view = cursor.read_i16()?;
        let name = cursor.read_fixed_string(CURSOR_NAME_LEN)?;
        let flags = cursor.read_u8()?;
        cursor.skip(3)?;
        let view = if features.contains(GameFeatures::CURSOR_VIEWS) {
            stored_view
        } else {
            -1
        };
        Ok(Self {
            pic,
            hotspot_x,
            hotspot_y,
            view,
            name,
            flags,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.pic)
            .i16(self.hotspot_x)
            .i16(self.hotspot_y)
            .i16(self.view)
            .fixed_str(&self.name, CURSOR_NAME_LEN)
            .u8(self.flags)
            .zeros(3);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FontInfo {
    pub flags: u8,
    pub outline: i8,
}
