use ags_formats::game::items::cursor_offsets;
use ags_formats::game::view::frame_offsets;

use super::{getter, index_arg, object_or_void, setter};
use crate::script::{Capability, FunctionSpec, ParamKind, ScriptError, ScriptValue};

use ParamKind::Int;

fn game_functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::function("Game::get_Name", &[], |rt, _| {
            Ok(rt.model().header.name.as_str().into())
        }),
        FunctionSpec::function("Game::get_InventoryItemCount", &[], |rt, _| {
            // item 0 is a placeholder no script can hold
            let count = rt.objects.inventory.len().saturating_sub(1);
            Ok(ScriptValue::Int(count as i32))
        }),
        FunctionSpec::function("Game::get_MouseCursorCount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.objects.cursors.len() as i32))
        }),
        FunctionSpec::function("Game::get_SpriteCount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.model().sprite_flags.len() as i32))
        }),
        FunctionSpec::function("Game::get_TotalScore", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.model().header.total_score))
        }),
        FunctionSpec::function("GetMessageText", &[Int], |rt, args| {
            let index = index_arg(&args[0], "message")?;
            Ok(match rt.model().message(index) {
                Some(text) => text.into(),
                None => ScriptValue::Void,
            })
        }),
        FunctionSpec::function("Game::GetViewFrame", &[Int, Int, Int], |rt, args| {
            // views are numbered from 1
            let view = index_arg(&args[0], "view")?;
            let loop_index = index_arg(&args[1], "loop")?;
            let frame = index_arg(&args[2], "frame")?;
            let object = view
                .checked_sub(1)
                .and_then(|view| rt.view_frame(view, loop_index, frame));
            object.map(ScriptValue::Object).ok_or(ScriptError::NoSuchElement {
                field: "frame",
                index: frame,
            })
        }),
        FunctionSpec::function("GetInventoryItem", &[Int], |rt, args| {
            let index = index_arg(&args[0], "item")?;
            Ok(object_or_void(rt.objects.inventory.get(index).cloned()))
        }),
        getter("ViewFrame::get_Graphic", Capability::ViewFrame, frame_offsets::PIC),
        setter(
            "ViewFrame::set_Graphic",
            Capability::ViewFrame,
            frame_offsets::PIC,
            Int,
        ),
        getter("ViewFrame::get_Sound", Capability::ViewFrame, frame_offsets::SOUND),
        setter(
            "ViewFrame::set_Sound",
            Capability::ViewFrame,
            frame_offsets::SOUND,
            Int,
        ),
        getter("ViewFrame::get_Speed", Capability::ViewFrame, frame_offsets::SPEED),
        FunctionSpec::method(
            "ViewFrame::get_Flipped",
            Capability::ViewFrame,
            &[],
            |_, frame, _| {
                let flipped = frame.view_frame().map_or(false, |frame| {
                    frame.flags & ags_formats::game::view::FRAME_FLIPPED != 0
                });
                Ok(flipped.into())
            },
        ),
        getter(
            "MouseCursor::get_Graphic",
            Capability::MouseCursor,
            cursor_offsets::PIC,
        ),
        getter("MouseCursor::get_View", Capability::MouseCursor, cursor_offsets::VIEW),
    ]
}

fn sprite_functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::function("DynamicSprite::Create", &[Int, Int], |rt, args| {
            let width = args[0].as_int()?;
            let height = args[1].as_int()?;
            for (field, value) in [("width", width), ("height", height)] {
                if value <= 0 {
                    return Err(ScriptError::ValueOutOfRange { field, value });
                }
            }
            Ok(rt.create_dynamic_sprite(width, height).into())
        }),
        getter("DynamicSprite::get_Graphic", Capability::DynamicSprite, 0),
        getter("DynamicSprite::get_Width", Capability::DynamicSprite, 4),
        getter("DynamicSprite::get_Height", Capability::DynamicSprite, 8),
        getter("DynamicSprite::get_ColorDepth", Capability::DynamicSprite, 12),
        FunctionSpec::method(
            "DynamicSprite::GetDrawingSurface",
            Capability::DynamicSprite,
            &[],
            |rt, sprite, _| {
                let surface = sprite.sprite().map(|info| rt.drawing_surface(&info));
                Ok(object_or_void(surface))
            },
        ),
        getter("DrawingSurface::get_DrawingColor", Capability::DrawingSurface, 0),
        setter(
            "DrawingSurface::set_DrawingColor",
            Capability::DrawingSurface,
            0,
            Int,
        ),
        getter("DrawingSurface::get_Width", Capability::DrawingSurface, 4),
        getter("DrawingSurface::get_Height", Capability::DrawingSurface, 8),
    ]
}

pub(super) fn functions() -> Vec<FunctionSpec> {
    let mut functions = game_functions();
    functions.extend(sprite_functions());
    functions
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ags_formats::game::{GameDataVersion, GameModel, View, ViewFrame, ViewLoop};

    use crate::api::standard_registry;
    use crate::audio::RecordingBackend;
    use crate::runtime::Runtime;
    use crate::script::{Capability, FunctionRegistry, ScriptError, ScriptValue};

    fn runtime() -> (Runtime, FunctionRegistry) {
        let mut model = GameModel::new(GameDataVersion::V341);
        model.header.name = "Sample Quest".into();
        model.header.color_depth = 2;
        model.messages = vec![None, Some("Welcome back.".into())];
        model.views = vec![View {
            loops: vec![ViewLoop {
                flags: 0,
                frames: vec![
                    ViewFrame {
                        pic: 5,
                        ..ViewFrame::default()
                    },
                    ViewFrame {
                        pic: 6,
                        flags: ags_formats::game::view::FRAME_FLIPPED,
                        ..ViewFrame::default()
                    },
                ],
            }],
        }];
        let runtime = Runtime::new(Rc::new(model), Box::new(RecordingBackend::new()));
        (runtime, standard_registry().unwrap())
    }

    #[test]
    fn game_level_queries() {
        let (mut rt, registry) = runtime();
        assert_eq!(
            registry.call(&mut rt, "Game::get_Name", None, &[]).unwrap(),
            ScriptValue::Str("Sample Quest".into())
        );
        assert_eq!(
            registry
                .call(&mut rt, "GetMessageText", None, &[ScriptValue::Int(1)])
                .unwrap(),
            ScriptValue::Str("Welcome back.".into())
        );
        assert_eq!(
            registry
                .call(&mut rt, "GetMessageText", None, &[ScriptValue::Int(0)])
                .unwrap(),
            ScriptValue::Void
        );
    }

    #[test]
    fn view_frames_are_shared_handles() {
        let (mut rt, registry) = runtime();
        let args = [ScriptValue::Int(1), ScriptValue::Int(0), ScriptValue::Int(1)];
        let first = registry.call(&mut rt, "Game::GetViewFrame", None, &args).unwrap();
        let frame = first.as_object().unwrap().clone();
        assert_eq!(
            registry
                .call(&mut rt, "ViewFrame::get_Flipped", Some(&frame), &[])
                .unwrap(),
            ScriptValue::Int(1)
        );
        registry
            .call(&mut rt, "ViewFrame::set_Graphic", Some(&frame), &[ScriptValue::Int(77)])
            .unwrap();
        let again = registry.call(&mut rt, "Game::GetViewFrame", None, &args).unwrap();
        assert!(again.as_object().unwrap().ptr_eq(&frame));
        assert_eq!(
            registry
                .call(&mut rt, "ViewFrame::get_Graphic", Some(&frame), &[])
                .unwrap(),
            ScriptValue::Int(77)
        );
        let view_zero = [ScriptValue::Int(0), ScriptValue::Int(0), ScriptValue::Int(0)];
        assert!(matches!(
            registry.call(&mut rt, "Game::GetViewFrame", None, &view_zero),
            Err(ScriptError::NoSuchElement { .. })
        ));
    }

    #[test]
    fn dynamic_sprites_and_their_surfaces() {
        let (mut rt, registry) = runtime();
        let sprite = registry
            .call(
                &mut rt,
                "DynamicSprite::Create",
                None,
                &[ScriptValue::Int(64), ScriptValue::Int(48)],
            )
            .unwrap();
        let sprite = sprite.as_object().unwrap().clone();
        assert!(sprite.has_capability(Capability::DynamicSprite));
        assert_eq!(
            registry
                .call(&mut rt, "DynamicSprite::get_ColorDepth", Some(&sprite), &[])
                .unwrap(),
            ScriptValue::Int(16)
        );
        let surface = registry
            .call(&mut rt, "DynamicSprite::GetDrawingSurface", Some(&sprite), &[])
            .unwrap();
        let surface = surface.as_object().unwrap().clone();
        assert_eq!(
            registry
                .call(&mut rt, "DrawingSurface::get_Width", Some(&surface), &[])
                .unwrap(),
            ScriptValue::Int(64)
        );
        registry
            .call(
                &mut rt,
                "DrawingSurface::set_DrawingColor",
                Some(&surface),
                &[ScriptValue::Int(15)],
            )
            .unwrap();
        assert_eq!(surface.surface().unwrap().draw_color, 15);

        // a surface is not a sprite
        assert!(matches!(
            registry.call(&mut rt, "DynamicSprite::get_Width", Some(&surface), &[]),
            Err(ScriptError::CapabilityMismatch { .. })
        ));
        assert!(matches!(
            registry.call(
                &mut rt,
                "DynamicSprite::Create",
                None,
                &[ScriptValue::Int(0), ScriptValue::Int(10)]
            ),
            Err(ScriptError::ValueOutOfRange { field: "width", .. })
        ));
    }
}
