use serde::Serialize;

use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

pub const VIEW_FRAME_SIZE: usize = 28;
pub const LEGACY_VIEW_SIZE: usize = 9060;
pub const LEGACY_MAX_LOOPS: usize = 16;
pub const LEGACY_MAX_FRAMES: usize = 20;

pub mod frame_offsets {
    pub const PIC: u32 = 0;
    pub const X_OFFSET: u32 = 4;
    pub const Y_OFFSET: u32 = 6;
    pub const SPEED: u32 = 8;
    pub const FLAGS: u32 = 12;
    pub const SOUND: u32 = 16;
}

pub const FRAME_FLIPPED: i32 = 1;
pub const LOOP_RUNS_NEXT: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewFrame {
    pub pic: i32,
    pub x_offset: i16,
    pub y_offset: i16,
    pub speed: i16,
    pub flags: i32,
    pub sound: i32,
}

impl ViewFrame {
    fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let pic = cursor.read_i32()?;
        let x_offset = cursor.read_i16()?;
        let y_offset = cursor.read_i16()?;
        let speed = cursor.read_i16()?;
        cursor.skip(2)?;
        let flags = cursor.read_i32()?;
        let sound = cursor.read_i32()?;
        cursor.skip(2 * 4)?;
        Ok(Self {
            pic,
            x_offset,
            y_offset,
            speed,
            flags,
            sound,
        })
    }

    fn write(&self, out: &mut Writer) {
        out.i32(self.pic)
            .i16(self.x_offset)
            .i16(self.y_offset)
            .i16(self.speed)
            .zeros(2)
            .i32(self.flags)
            .i32(self.sound)
            .zeros(2 * 4);
    }

    pub fn is_flipped(&self) -> bool {
        self.flags & FRAME_FLIPPED != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewLoop {
    pub flags: i32,
    pub frames: Vec<ViewFrame>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
    pub loops: Vec<ViewLoop>,
}

impl View {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let loop_count = read_short_count(cursor)?;
        let mut loops = Vec::with_capacity(loop_count);
        for _ in 0..loop_count {
            let frame_count = read_short_count(cursor)?;
            let flags = cursor.read_i32()?;
            cursor.expect_records(frame_count, VIEW_FRAME_SIZE)?;
            let frames = (0..frame_count)
                .map(|_| ViewFrame::read(cursor))
                .collect::<Result<_>>()?;
            loops.push(ViewLoop { flags, frames });
        }
        Ok(Self { loops })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i16(self.loops.len() as i16);
        for view_loop in &self.loops {
            out.i16(view_loop.frames.len() as i16).i32(view_loop.flags);
            for frame in &view_loop.frames {
                frame.write(out);
            }
        }
    }

    /// Fixed 16 loop by 20 frame layout of pre-2.72 games.
    pub(crate) fn read_legacy(cursor: &mut Cursor<'_>) -> Result<Self> {
        let loop_count = read_short_count(cursor)?;
        if loop_count > LEGACY_MAX_LOOPS {
            return Err(Error::InvalidCount {
                section: cursor.section(),
                count: loop_count as i64,
            });
        }
        let frame_counts = cursor.read_i16_vec(LEGACY_MAX_LOOPS)?;
        cursor.skip(2)?;
        let loop_flags = cursor.read_i32_vec(LEGACY_MAX_LOOPS)?;
        let mut all_frames = Vec::with_capacity(LEGACY_MAX_LOOPS);
        for _ in 0..LEGACY_MAX_LOOPS {
            let frames = (0..LEGACY_MAX_FRAMES)
                .map(|_| ViewFrame::read(cursor))
                .collect::<Result<Vec<_>>>()?;
            all_frames.push(frames);
        }

        let mut loops = Vec::with_capacity(loop_count);
        for (index, mut frames) in all_frames.into_iter().take(loop_count).enumerate() {
            let count = usize::try_from(frame_counts[index])
                .unwrap_or(0)
                .min(LEGACY_MAX_FRAMES);
            frames.truncate(count);
            loops.push(ViewLoop {
                flags: loop_flags[index],
                frames,
            });
        }
        Ok(Self { loops })
    }

    pub(crate) fn write_legacy(&self, out: &mut Writer) {
        out.i16(self.loops.len().min(LEGACY_MAX_LOOPS) as i16);
        for index in 0..LEGACY_MAX_LOOPS {
            let count = self
                .loops
                .get(index)
                .map(|view_loop| view_loop.frames.len().min(LEGACY_MAX_FRAMES))
                .unwrap_or(0);
            out.i16(count as i16);
        }
        out.zeros(2);
        for index in 0..LEGACY_MAX_LOOPS {
            out.i32(self.loops.get(index).map(|l| l.flags).unwrap_or(0));
        }
        let blank = ViewFrame::default();
        for loop_index in 0..LEGACY_MAX_LOOPS {
            for frame_index in 0..LEGACY_MAX_FRAMES {
                self.loops
                    .get(loop_index)
                    .and_then(|view_loop| view_loop.frames.get(frame_index))
                    .unwrap_or(&blank)
                    .write(out);
            }
        }
    }

    pub fn frame(&self, loop_index: usize, frame_index: usize) -> Option<&ViewFrame> {
        self.loops.get(loop_index)?.frames.get(frame_index)
    }
}

fn read_short_count(cursor: &mut Cursor<'_>) -> Result<usize> {
    let raw = cursor.read_i16()?;
    usize::try_from(raw).map_err(|_| Error::InvalidCount {
        section: cursor.section(),
        count: raw as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_view() -> View {
        View {
            loops: vec![
                ViewLoop {
                    flags: 0,
                    frames: vec![
                        ViewFrame {
                            pic: 10,
                            speed: 2,
                            ..ViewFrame::default()
                        },
                        ViewFrame {
                            pic: 11,
                            flags: FRAME_FLIPPED,
                            sound: -1,
                            ..ViewFrame::default()
                        },
                    ],
                },
                ViewLoop {
                    flags: LOOP_RUNS_NEXT,
                    frames: vec![ViewFrame::default()],
                },
            ],
        }
    }

    #[test]
    fn legacy_layout_is_fixed_size() {
        let view = walk_view();
        let mut out = Writer::new();
        view.write_legacy(&mut out);
        assert_eq!(out.position(), LEGACY_VIEW_SIZE);

        let decoded = View::read_legacy(&mut Cursor::new(out.as_slice())).unwrap();
        assert_eq!(decoded, view);
        assert!(decoded.frame(0, 1).unwrap().is_flipped());
        assert!(decoded.frame(0, 2).is_none());
    }

    #[test]
    fn frame_counts_are_checked_against_the_stream() {
        let mut out = Writer::new();
        out.i16(1).i16(500).i32(0);
        let mut cursor = Cursor::new(out.as_slice());
        cursor.enter("views");
        let err = View::read(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            Error::SectionOverrun {
                section: "views",
                count: 500,
                ..
            }
        ));
    }
}
