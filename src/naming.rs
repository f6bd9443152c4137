//! Output naming and input checks
//!
//! The output file name describes the effects applied, e.g.
//! `song.wav` slowed with reverb becomes `song_slowed_reverb.mp3`.
//! The output container is always MP3 regardless of the input format.

use crate::params::EffectParameters;

/// Extension of every output file
pub const OUTPUT_EXTENSION: &str = "mp3";

/// MIME type of every output artifact
pub const OUTPUT_MIME_TYPE: &str = "audio/mp3";

/// Input extensions the CLI accepts (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a"];

/// Input MIME types the original uploader accepted
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/wave",
    "audio/ogg",
    "audio/flac",
    "audio/aac",
    "audio/mp4",
    "audio/x-m4a",
];

const STAGED_INPUT_STEM: &str = "input_audio";
const STAGED_OUTPUT_NAME: &str = "output_audio.mp3";

/// Descriptive suffix for the applied effects, e.g. `_slowed_pitch_down_reverb`
///
/// Returns `_processed` when no effect applies.
pub fn suffix(params: &EffectParameters) -> String {
    let mut parts = Vec::with_capacity(3);

    if params.tempo() < 1.0 {
        parts.push("slowed");
    } else if params.tempo() > 1.0 {
        parts.push("sped");
    }

    if params.pitch_semitones() > 0 {
        parts.push("pitch_up");
    } else if params.pitch_semitones() < 0 {
        parts.push("pitch_down");
    }

    if params.has_reverb() {
        parts.push("reverb");
    }

    if parts.is_empty() {
        "_processed".to_string()
    } else {
        format!("_{}", parts.join("_"))
    }
}

/// Split off a trailing `.ext` segment (the extension must be non-empty)
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() => (&file_name[..dot], Some(&file_name[dot + 1..])),
        _ => (file_name, None),
    }
}

/// Output file name for `original` processed with `params`
///
/// # Example
/// ```
/// use slowverb::naming::file_name;
/// use slowverb::params::EffectParameters;
///
/// let params = EffectParameters::new(0.8, 0, 50).unwrap();
/// assert_eq!(file_name("song.wav", &params), "song_slowed_reverb.mp3");
/// ```
pub fn file_name(original: &str, params: &EffectParameters) -> String {
    let (stem, _) = split_extension(original);
    format!("{}{}.{}", stem, suffix(params), OUTPUT_EXTENSION)
}

/// Lower-cased extension of `file_name`, if it has one
pub fn extension(file_name: &str) -> Option<String> {
    split_extension(file_name).1.map(str::to_ascii_lowercase)
}

/// Engine-side name for a staged input, keeping the original extension
pub fn staged_input_name(original: &str) -> String {
    match extension(original) {
        Some(ext) => format!("{}.{}", STAGED_INPUT_STEM, ext),
        None => STAGED_INPUT_STEM.to_string(),
    }
}

/// Engine-side name of the output resource
pub fn staged_output_name() -> &'static str {
    STAGED_OUTPUT_NAME
}

/// True if the file's extension is one of `SUPPORTED_EXTENSIONS`
pub fn is_supported_input(file_name: &str) -> bool {
    extension(file_name)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// True if the MIME type names a supported audio subtype
pub fn is_supported_mime_type(mime_type: &str) -> bool {
    let mime_type = mime_type.to_ascii_lowercase();
    SUPPORTED_MIME_TYPES.iter().any(|t| *t == mime_type)
}
