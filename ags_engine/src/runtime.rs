use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ags_formats::game::gui::ControlKind;
use ags_formats::game::GameModel;
use log::debug;

use crate::audio::{AudioBackend, AudioSystem, ClipTable, CHANNEL_COUNT};
use crate::script::fields;
use crate::script::{
    Capability, ChannelRef, ObjectTable, ScriptEntity, ScriptObject, SpriteInfo, SurfaceState,
};

/// Script objects wrapping the entities of a loaded game, one table per
/// script array.
#[derive(Debug, Default)]
pub struct ScriptObjects {
    pub characters: ObjectTable,
    pub inventory: ObjectTable,
    pub cursors: ObjectTable,
    pub dialogs: ObjectTable,
    pub guis: ObjectTable,
    pub buttons: ObjectTable,
    pub labels: ObjectTable,
    pub inv_windows: ObjectTable,
    pub sliders: ObjectTable,
    pub text_boxes: ObjectTable,
    pub list_boxes: ObjectTable,
    pub audio_clips: ObjectTable,
    pub audio_channels: ObjectTable,
}

fn wrap<T: Clone>(
    items: &[T],
    stride: u32,
    entity: impl Fn(RefCell<T>) -> ScriptEntity,
) -> ObjectTable {
    let objects = items
        .iter()
        .enumerate()
        .map(|(index, item)| ScriptObject::new(index, entity(RefCell::new(item.clone()))))
        .collect();
    ObjectTable::new(stride, objects)
}

impl ScriptObjects {
    pub fn from_model(model: &GameModel, clips: &ClipTable) -> Self {
        let gui = &model.gui;
        let channels = (0..CHANNEL_COUNT)
            .map(|index| ChannelRef { index })
            .collect::<Vec<_>>();
        Self {
            characters: wrap(
                &model.characters,
                fields::CHARACTER_FIELDS.size,
                ScriptEntity::Character,
            ),
            inventory: wrap(
                &model.inventory_items,
                fields::INVENTORY_FIELDS.size,
                ScriptEntity::InventoryItem,
            ),
            cursors: wrap(
                &model.cursors,
                fields::CURSOR_FIELDS.size,
                ScriptEntity::MouseCursor,
            ),
            dialogs: wrap(&model.dialogs, fields::DIALOG_FIELDS.size, ScriptEntity::Dialog),
            guis: wrap(&gui.groups, fields::GUI_FIELDS.size, ScriptEntity::Gui),
            buttons: wrap(&gui.buttons, fields::BUTTON_FIELDS.size, ScriptEntity::Button),
            labels: wrap(&gui.labels, fields::LABEL_FIELDS.size, ScriptEntity::Label),
            inv_windows: wrap(
                &gui.inv_windows,
                fields::INV_WINDOW_FIELDS.size,
                ScriptEntity::InvWindow,
            ),
            sliders: wrap(&gui.sliders, fields::SLIDER_FIELDS.size, ScriptEntity::Slider),
            text_boxes: wrap(
                &gui.text_boxes,
                fields::TEXT_BOX_FIELDS.size,
                ScriptEntity::TextBox,
            ),
            list_boxes: wrap(
                &gui.list_boxes,
                fields::LIST_BOX_FIELDS.size,
                ScriptEntity::ListBox,
            ),
            audio_clips: wrap(
                clips.clips(),
                fields::AUDIO_CLIP_FIELDS.size,
                ScriptEntity::AudioClip,
            ),
            audio_channels: wrap(
                &channels,
                fields::AUDIO_CHANNEL_FIELDS.size,
                ScriptEntity::AudioChannel,
            ),
        }
    }

    /// The array a legacy script indexes for objects of `capability`.
    pub fn table(&self, capability: Capability) -> Option<&ObjectTable> {
        Some(match capability {
            Capability::Character => &self.characters,
            Capability::InventoryItem => &self.inventory,
            Capability::MouseCursor => &self.cursors,
            Capability::Dialog => &self.dialogs,
            Capability::Gui => &self.guis,
            Capability::GuiButton => &self.buttons,
            Capability::GuiLabel => &self.labels,
            Capability::GuiInvWindow => &self.inv_windows,
            Capability::GuiSlider => &self.sliders,
            Capability::GuiTextBox => &self.text_boxes,
            Capability::GuiListBox => &self.list_boxes,
            Capability::AudioClip => &self.audio_clips,
            Capability::AudioChannel => &self.audio_channels,
            Capability::GuiControl
            | Capability::DrawingSurface
            | Capability::DynamicSprite
            | Capability::ViewFrame => return None,
        })
    }

    pub fn control(&self, kind: ControlKind, index: usize) -> Option<&ScriptObject> {
        let table = match kind {
            ControlKind::Button => &self.buttons,
            ControlKind::Label => &self.labels,
            ControlKind::InvWindow => &self.inv_windows,
            ControlKind::Slider => &self.sliders,
            ControlKind::TextBox => &self.text_boxes,
            ControlKind::ListBox => &self.list_boxes,
        };
        table.get(index)
    }

    pub fn len(&self) -> usize {
        [
            &self.characters,
            &self.inventory,
            &self.cursors,
            &self.dialogs,
            &self.guis,
            &self.buttons,
            &self.labels,
            &self.inv_windows,
            &self.sliders,
            &self.text_boxes,
            &self.list_boxes,
            &self.audio_clips,
            &self.audio_channels,
        ]
        .iter()
        .map(|table| table.len())
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable state native functions operate on.
#[derive(Debug)]
pub struct Runtime {
    model: Rc<GameModel>,
    pub audio: AudioSystem,
    pub objects: ScriptObjects,
    frames: HashMap<(usize, usize, usize), ScriptObject>,
    next_sprite_slot: i32,
}

impl Runtime {
    /// Runtime whose clips come from the model's clip table (empty for games
    /// that have none).
    pub fn new(model: Rc<GameModel>, backend: Box<dyn AudioBackend>) -> Self {
        let clips = model
            .audio
            .as_ref()
            .map(ClipTable::from_tables)
            .unwrap_or_default();
        Self::with_clips(model, clips, backend)
    }

    pub fn with_clips(
        model: Rc<GameModel>,
        clips: ClipTable,
        backend: Box<dyn AudioBackend>,
    ) -> Self {
        let objects = ScriptObjects::from_model(&model, &clips);
        debug!(
            "wrapped {} script objects, {} audio clips",
            objects.len(),
            clips.len()
        );
        let next_sprite_slot = model.sprite_flags.len().max(1) as i32;
        Self {
            model,
            audio: AudioSystem::new(clips, backend),
            objects,
            frames: HashMap::new(),
            next_sprite_slot,
        }
    }

    pub fn model(&self) -> &GameModel {
        &self.model
    }

    pub fn shared_model(&self) -> Rc<GameModel> {
        Rc::clone(&self.model)
    }

    /// Resolve a byte offset into the script array of `capability`.
    pub fn resolve(&self, capability: Capability, offset: u32) -> Option<(ScriptObject, u32)> {
        self.objects.table(capability)?.resolve(offset)
    }

    /// Handle to one frame of a view. Repeated calls return the same object.
    pub fn view_frame(
        &mut self,
        view: usize,
        loop_index: usize,
        frame: usize,
    ) -> Option<ScriptObject> {
        let key = (view, loop_index, frame);
        if let Some(object) = self.frames.get(&key) {
            return Some(object.clone());
        }
        let data = self.model.views.get(view)?.frame(loop_index, frame)?.clone();
        let object = ScriptObject::new(frame, ScriptEntity::ViewFrame(RefCell::new(data)));
        self.frames.insert(key, object.clone());
        Some(object)
    }

    /// New script-owned sprite. It is released with its last handle.
    pub fn create_dynamic_sprite(&mut self, width: i32, height: i32) -> ScriptObject {
        let slot = self.next_sprite_slot;
        self.next_sprite_slot += 1;
        let color_depth = self.model.header.color_depth * 8;
        ScriptObject::new(
            slot as usize,
            ScriptEntity::DynamicSprite(RefCell::new(SpriteInfo {
                slot,
                width,
                height,
                color_depth,
            })),
        )
    }

    pub fn drawing_surface(&self, sprite: &SpriteInfo) -> ScriptObject {
        ScriptObject::new(
            sprite.slot as usize,
            ScriptEntity::DrawingSurface(RefCell::new(SurfaceState {
                sprite: sprite.slot,
                width: sprite.width,
                height: sprite.height,
                draw_color: 0,
            })),
        )
    }
}
