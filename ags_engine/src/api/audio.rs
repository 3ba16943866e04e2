use super::{getter, index_arg, object_or_void};
use crate::audio::{ChannelState, CHANNEL_COUNT};
use crate::runtime::Runtime;
use crate::script::{Capability, FunctionSpec, ParamKind, ScriptValue};

use ParamKind::Int;

/// Priority used when a legacy sound number has no clip behind it.
const FALLBACK_PRIORITY: i32 = 10;

fn sound_priority(runtime: &Runtime, sound: i32) -> i32 {
    let clips = runtime.audio.clips();
    clips
        .sound(sound)
        .and_then(|index| clips.get(index))
        .map_or(FALLBACK_PRIORITY, |clip| clip.priority.into())
}

/// Legacy channel results: the channel number, or -1 when nothing plays.
fn channel_number(channel: Option<usize>) -> ScriptValue {
    ScriptValue::Int(channel.map_or(-1, |channel| channel as i32))
}

pub(super) fn functions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::function("PlaySound", &[Int], |rt, args| {
            let sound = args[0].as_int()?;
            let priority = sound_priority(rt, sound);
            Ok(channel_number(rt.audio.play_sound(sound, priority)))
        }),
        FunctionSpec::function("PlaySoundEx", &[Int, Int], |rt, args| {
            let sound = args[0].as_int()?;
            let channel = index_arg(&args[1], "channel")?;
            Ok(channel_number(rt.audio.play_on_channel(sound, channel)?))
        }),
        FunctionSpec::function("StopChannel", &[Int], |rt, args| {
            let channel = index_arg(&args[0], "channel")?;
            rt.audio.stop_channel(channel)?;
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::function("IsChannelPlaying", &[Int], |rt, args| {
            let channel = index_arg(&args[0], "channel")?;
            Ok(rt.audio.is_playing(channel).into())
        }),
        FunctionSpec::function("PlayMusic", &[Int], |rt, args| {
            let music = args[0].as_int()?;
            Ok(channel_number(rt.audio.play_music(music)))
        }),
        FunctionSpec::function("StopMusic", &[], |rt, _| {
            rt.audio.stop_music();
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::function(
            "PlayAmbientSound",
            &[Int, Int, Int, Int, Int],
            |rt, args| {
                let channel = index_arg(&args[0], "channel")?;
                let sound = args[1].as_int()?;
                let volume = args[2].as_int()?;
                let x = args[3].as_int()?;
                let y = args[4].as_int()?;
                rt.audio.play_ambient(channel, sound, volume, x, y)?;
                Ok(ScriptValue::Void)
            },
        ),
        FunctionSpec::function("StopAmbientSound", &[Int], |rt, args| {
            let channel = index_arg(&args[0], "channel")?;
            rt.audio.stop_ambient(channel)?;
            Ok(ScriptValue::Void)
        }),
        FunctionSpec::function("System::get_AudioChannelCount", &[], |_, _| {
            Ok(ScriptValue::Int(CHANNEL_COUNT as i32))
        }),
        FunctionSpec::function("Game::get_AudioClipCount", &[], |rt, _| {
            Ok(ScriptValue::Int(rt.audio.clips().len() as i32))
        }),
        FunctionSpec::method(
            "AudioClip::Play",
            Capability::AudioClip,
            &[Int],
            |rt, clip, args| {
                let priority = args[0].as_int()?;
                let channel = rt.audio.play_clip(clip.id(), priority);
                Ok(object_or_void(
                    channel.and_then(|channel| rt.objects.audio_channels.get(channel).cloned()),
                ))
            },
        ),
        FunctionSpec::method(
            "AudioClip::get_FileType",
            Capability::AudioClip,
            &[],
            |_, clip, _| {
                let file_type = clip.clip().map_or(0, |clip| clip.file_type.raw());
                Ok(ScriptValue::Int(file_type.into()))
            },
        ),
        getter("AudioClip::get_ID", Capability::AudioClip, 0),
        getter("AudioChannel::get_ID", Capability::AudioChannel, 0),
        FunctionSpec::method(
            "AudioChannel::get_IsPlaying",
            Capability::AudioChannel,
            &[],
            |rt, channel, _| Ok(rt.audio.is_playing(channel.id()).into()),
        ),
        FunctionSpec::method(
            "AudioChannel::get_PlayingClip",
            Capability::AudioChannel,
            &[],
            |rt, channel, _| {
                let clip = match rt.audio.channel_state(channel.id()) {
                    Some(ChannelState::Playing { clip, .. }) if rt.audio.is_playing(channel.id()) => {
                        rt.objects.audio_clips.get(clip).cloned()
                    }
                    _ => None,
                };
                Ok(object_or_void(clip))
            },
        ),
        FunctionSpec::method(
            "AudioChannel::Stop",
            Capability::AudioChannel,
            &[],
            |rt, channel, _| {
                rt.audio.stop_channel(channel.id())?;
                Ok(ScriptValue::Void)
            },
        ),
    ]
}
