//! Voice name extraction from bulk dump bytes

use super::name::decode_name;
use super::variant::InstrumentVariant;
use super::PatchRecord;

/// Reads every voice name the data holds for the given variant.
///
/// The 6 byte header is skipped and each 128 byte voice record contributes
/// its last 10 bytes as name. A buffer shorter than the variant's full
/// length yields only the voices whose complete record is present.
/// `Unknown` yields nothing.
pub fn read_patches(data: &[u8], variant: InstrumentVariant) -> Vec<PatchRecord> {
    let Some(layout) = variant.layout() else {
        return Vec::new();
    };

    let mut patches = Vec::with_capacity(layout.voice_count);

    for idx in 0..layout.voice_count {
        let voice = layout.voice_range(idx);
        if voice.end > data.len() {
            log::debug!(
                "{} data truncated: {} of {} voices present",
                variant,
                idx,
                layout.voice_count
            );
            break;
        }

        let name = decode_name(&data[layout.name_range(idx)]);
        patches.push(PatchRecord {
            number: idx + 1,
            name,
        });
    }

    patches
}

/// A decoded bank of voices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceBank {
    /// Variant the data was decoded as
    pub variant: InstrumentVariant,
    /// Voices in file order, numbered from 1.
    pub patches: Vec<PatchRecord>,
}

impl VoiceBank {
    /// Decodes `data` as `variant`, regardless of its length.
    pub fn new(data: &[u8], variant: InstrumentVariant) -> VoiceBank {
        VoiceBank {
            variant,
            patches: read_patches(data, variant),
        }
    }

    /// Classifies the data by its length and decodes it.
    pub fn from_bytes(data: &[u8]) -> VoiceBank {
        VoiceBank::new(data, InstrumentVariant::from_file_len(data.len() as u64))
    }

    /// True when fewer voices could be read than the variant holds.
    pub fn is_truncated(&self) -> bool {
        self.patches.len() < self.variant.voice_count()
    }
}
