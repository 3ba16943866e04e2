use serde::Serialize;

use crate::error::Result;
use crate::reader::Cursor;
use crate::writer::Writer;

pub const CHARACTER_SIZE: usize = 780;
pub const MAX_INVENTORY: usize = 301;
const NAME_LEN: usize = 40;
const SCRIPT_NAME_LEN: usize = 20;

/// Byte offsets of the character record. Bytecode addresses character
/// fields by these offsets, so they double as the script field layout.
pub mod offsets {
    pub const DEFAULT_VIEW: u32 = 0;
    pub const TALK_VIEW: u32 = 4;
    pub const VIEW: u32 = 8;
    pub const ROOM: u32 = 12;
    pub const PREVIOUS_ROOM: u32 = 16;
    pub const X: u32 = 20;
    pub const Y: u32 = 24;
    pub const WAIT: u32 = 28;
    pub const FLAGS: u32 = 32;
    pub const FOLLOWING: u32 = 36;
    pub const FOLLOW_INFO: u32 = 38;
    pub const IDLE_VIEW: u32 = 40;
    pub const IDLE_TIME: u32 = 44;
    pub const IDLE_LEFT: u32 = 46;
    pub const TRANSPARENCY: u32 = 48;
    pub const BASELINE: u32 = 50;
    pub const ACTIVE_INVENTORY: u32 = 52;
    pub const TALK_COLOR: u32 = 56;
    pub const THINK_VIEW: u32 = 60;
    pub const BLINK_VIEW: u32 = 64;
    pub const BLINK_INTERVAL: u32 = 66;
    pub const BLINK_TIMER: u32 = 68;
    pub const BLINK_FRAME: u32 = 70;
    pub const WALK_SPEED_Y: u32 = 72;
    pub const PIC_Y_OFFSET: u32 = 74;
    pub const Z: u32 = 76;
    pub const WALK_WAIT: u32 = 80;
    pub const SPEECH_ANIM_SPEED: u32 = 84;
    pub const BLOCKING_WIDTH: u32 = 88;
    pub const BLOCKING_HEIGHT: u32 = 90;
    pub const INDEX: u32 = 92;
    pub const PIC_X_OFFSET: u32 = 96;
    pub const WALK_WAIT_COUNTER: u32 = 98;
    pub const LOOP: u32 = 100;
    pub const FRAME: u32 = 102;
    pub const WALKING: u32 = 104;
    pub const ANIMATING: u32 = 106;
    pub const WALK_SPEED: u32 = 108;
    pub const ANIM_SPEED: u32 = 110;
    pub const INVENTORY: u32 = 112;
    pub const ACTIVITY_X: u32 = 714;
    pub const ACTIVITY_Y: u32 = 716;
    pub const NAME: u32 = 718;
    pub const SCRIPT_NAME: u32 = 758;
    pub const ON: u32 = 778;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterInfo {
    pub default_view: i32,
    pub talk_view: i32,
    pub view: i32,
    pub room: i32,
    pub previous_room: i32,
    pub x: i32,
    pub y: i32,
    pub wait: i32,
    pub flags: i32,
    pub following: i16,
    pub follow_info: i16,
    pub idle_view: i32,
    pub idle_time: i16,
    pub idle_left: i16,
    pub transparency: i16,
    pub baseline: i16,
    pub active_inventory: i32,
    pub talk_color: i32,
    pub think_view: i32,
    pub blink_view: i16,
    pub blink_interval: i16,
    pub blink_timer: i16,
    pub blink_frame: i16,
    pub walk_speed_y: i16,
    pub pic_y_offset: i16,
    pub z: i32,
    pub walk_wait: i32,
    pub speech_anim_speed: i16,
    pub blocking_width: i16,
    pub blocking_height: i16,
    pub index: i32,
    pub pic_x_offset: i16,
    pub walk_wait_counter: i16,
    pub loop_index: i16,
    pub frame: i16,
    pub walking: i16,
    pub animating: i16,
    pub walk_speed: i16,
    pub anim_speed: i16,
    /// Quantity held of each inventory item, indexed by item number.
    #[serde(skip)]
    pub inventory: Vec<i16>,
    pub activity_x: i16,
    pub activity_y: i16,
    pub name: String,
    pub script_name: String,
    pub on: u8,
}

impl Default for CharacterInfo {
    fn default() -> Self {
        Self {
            default_view: 0,
            talk_view: -1,
            view: 0,
            room: 0,
            previous_room: -1,
            x: 0,
            y: 0,
            wait: 0,
            flags: 0,
            following: -1,
            follow_info: 0,
            idle_view: -1,
            idle_time: 20,
            idle_left: 0,
            transparency: 0,
            baseline: -1,
            active_inventory: -1,
            talk_color: 0,
            think_view: -1,
            blink_view: -1,
            blink_interval: 140,
            blink_timer: 0,
            blink_frame: 0,
            walk_speed_y: 3,
            pic_y_offset: 0,
            z: 0,
            walk_wait: 0,
            speech_anim_speed: 5,
            blocking_width: 0,
            blocking_height: 0,
            index: 0,
            pic_x_offset: 0,
            walk_wait_counter: 0,
            loop_index: 0,
            frame: 0,
            walking: 0,
            animating: 0,
            walk_speed: 3,
            anim_speed: 5,
            inventory: vec![0; MAX_INVENTORY],
            activity_x: 0,
            activity_y: 0,
            name: String::new(),
            script_name: String::new(),
            on: 1,
        }
    }
}

impl CharacterInfo {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let default_view = cursor.read_i32()?;
        let talk_view = cursor.read_i32()?;
        let view = cursor.read_i32()?;
        let room = cursor.read_i32()?;
        let previous_room = cursor.read_i32()?;
        let x = cursor.read_i32()?;
        let y = cursor.read_i32()?;
        let wait = cursor.read_i32()?;
        let flags = cursor.read_i32()?;
        let following = cursor.read_i16()?;
        let follow_info = cursor.read_i16()?;
        let idle_view = cursor.read_i32()?;
        let idle_time = cursor.read_i16()?;
        let idle_left = cursor.read_i16()?;
        let transparency = cursor.read_i16()?;
        let baseline = cursor.read_i16()?;
        let active_inventory = cursor.read_i32()?;
        let talk_color = cursor.read_i32()?;
        let think_view = cursor.read_i32()?;
        let blink_view = cursor.read_i16()?;
        let blink_interval = cursor.read_i16()?;
        let blink_timer = cursor.read_i16()?;
        let blink_frame = cursor.read_i16()?;
        let walk_speed_y = cursor.read_i16()?;
        let pic_y_offset = cursor.read_i16()?;
        let z = cursor.read_i32()?;
        let walk_wait = cursor.read_i32()?;
        let speech_anim_speed = cursor.read_i16()?;
        cursor.skip(2)?;
        let blocking_width = cursor.read_i16()?;
        let blocking_height = cursor.read_i16()?;
        let index = cursor.read_i32()?;
        let pic_x_offset = cursor.read_i16()?;
        let walk_wait_counter = cursor.read_i16()?;
        let loop_index = cursor.read_i16()?;
        let frame = cursor.read_i16()?;
        let walking = cursor.read_i16()?;
        let animating = cursor.read_i16()?;
        let walk_speed = cursor.read_i16()?;
        let anim_speed = cursor.read_i16()?;
        let inventory = cursor.read_i16_vec(MAX_INVENTORY)?;
        let activity_x = cursor.read_i16()?;
        let activity_y = cursor.read_i16()?;
        let name = cursor.read_fixed_string(NAME_LEN)?;
        let script_name = cursor.read_fixed_string(SCRIPT_NAME_LEN)?;
        let on = cursor.read_u8()?;
        cursor.skip(1)?;

        Ok(Self {
            default_view,
            talk_view,
            view,
            room,
            previous_room,
            x,
            y,
            wait,
            flags,
            following,
            follow_info,
            idle_view,
            idle_time,
            idle_left,
            transparency,
            baseline,
            active_inventory,
            talk_color,
            think_view,
            blink_view,
            blink_interval,
            blink_timer,
            blink_frame,
            walk_speed_y,
            pic_y_offset,
            z,
            walk_wait,
            speech_anim_speed,
            blocking_width,
            blocking_height,
            index,
            pic_x_offset,
            walk_wait_counter,
            loop_index,
            frame,
            walking,
            animating,
            walk_speed,
            anim_speed,
            inventory,
            activity_x,
            activity_y,
            name,
            script_name,
            on,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.default_view)
            .i32(self.talk_view)
            .i32(self.view)
            .i32(self.room)
            .i32(self.previous_room)
            .i32(self.x)
            .i32(self.y)
            .i32(self.wait)
            .i32(self.flags)
            .i16(self.following)
            .i16(self.follow_info)
            .i32(self.idle_view)
            .i16(self.idle_time)
            .i16(self.idle_left)
            .i16(self.transparency)
            .i16(self.baseline)
            .i32(self.active_inventory)
            .i32(self.talk_color)
            .i32(self.think_view)
            .i16(self.blink_view)
            .i16(self.blink_interval)
            .i16(self.blink_timer)
            .i16(self.blink_frame)
            .i16(self.walk_speed_y)
            .i16(self.pic_y_offset)
            .i32(self.z)
            .i32(self.walk_wait)
            .i16(self.speech_anim_speed)
            .zeros(2)
            .i16(self.blocking_width)
            .i16(self.blocking_height)
            .i32(self.index)
            .i16(self.pic_x_offset)
            .i16(self.walk_wait_counter)
            .i16(self.loop_index)
            .i16(self.frame)
            .i16(self.walking)
            .i16(self.animating)
            .i16(self.walk_speed)
            .i16(self.anim_speed);
        for slot in 0..MAX_INVENTORY {
            out.i16(self.inventory.get(slot).copied().unwrap_or(0));
        }
        out.i16(self.activity_x)
            .i16(self.activity_y)
            .fixed_str(&self.name, NAME_LEN)
            .fixed_str(&self.script_name, SCRIPT_NAME_LEN)
            .u8(self.on)
            .zeros(1);
    }

    pub fn inventory_count(&self, item: usize) -> i16 {
        self.inventory.get(item).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_layout_matches_field_offsets() {
        let mut character = CharacterInfo {
            x: 160,
            room: 4,
            name: "Roger".into(),
            script_name: "cRoger".into(),
            ..CharacterInfo::default()
        };
        character.inventory[3] = 2;

        let mut out = Writer::new();
        character.write(&mut out);
        assert_eq!(out.position(), CHARACTER_SIZE);

        let bytes = out.as_slice();
        let at = |offset: u32| offset as usize;
        assert_eq!(&bytes[at(offsets::X)..at(offsets::X) + 4], &160i32.to_le_bytes());
        assert_eq!(&bytes[at(offsets::ROOM)..at(offsets::ROOM) + 4], &4i32.to_le_bytes());
        assert_eq!(bytes[at(offsets::INVENTORY) + 6], 2);
        assert_eq!(&bytes[at(offsets::NAME)..at(offsets::NAME) + 5], b"Roger");
        assert_eq!(bytes[at(offsets::ON)], 1);

        let decoded = CharacterInfo::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded, character);
        assert_eq!(decoded.inventory_count(3), 2);
    }
}
