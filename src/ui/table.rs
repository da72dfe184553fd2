use crate::extractor::FormatDescriptor;
use crate::utils::{number_or_dash, text_or_dash};

pub const HEADER: &str = "ID   EXT RESOLUTION  FPS  CH │   FILESIZE    TBR  PROTO │ VCODEC         VBR  ACODEC       ABR  ASR  MORE INFO";

pub const SEPARATOR: &str = "────────────────────────────────────────────────────────────────────────────────────────────────────────────────";

pub const AUDIO_ONLY: &str = "audio only";

/// Channel and file size are not reported reliably, so those columns stay empty.
const PLACEHOLDER: &str = "-";

/// One fixed-width line of the format table.
pub fn render_row(format: &FormatDescriptor) -> String {
    let resolution = format
        .resolution
        .as_deref()
        .filter(|resolution| !resolution.is_empty())
        .unwrap_or(AUDIO_ONLY);

    format!(
        "{:<4} {:<4} {:<10} {:<5} {:<4}│ {:<12} {:<5} {:<6}│ {:<15} {:<5} {:<10} {:<5} {:<5} {}",
        text_or_dash(Some(&format.id)),
        text_or_dash(format.ext.as_deref()),
        resolution,
        number_or_dash(format.fps),
        PLACEHOLDER,
        PLACEHOLDER,
        number_or_dash(format.tbr),
        text_or_dash(format.protocol.as_deref()),
        text_or_dash(format.vcodec.as_deref()),
        number_or_dash(format.vbr),
        text_or_dash(format.acodec.as_deref()),
        number_or_dash(format.abr),
        number_or_dash(format.asr),
        text_or_dash(format.note.as_deref()),
    )
}

/// Header, separator and one row per format, in the order given.
pub fn render_table(formats: &[FormatDescriptor]) -> Vec<String> {
    let mut lines = Vec::with_capacity(formats.len() + 2);
    lines.push(HEADER.to_string());
    lines.push(SEPARATOR.to_string());
    lines.extend(formats.iter().map(render_row));
    lines
}
