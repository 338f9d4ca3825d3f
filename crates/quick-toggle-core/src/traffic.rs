//! Decoding of the control service's packed traffic counter.
//!
//! The counter is one 64-bit value: upload in the high half, download in the
//! low half. Each half is scaled: bits 30..31 pick the unit, bits 0..29 hold
//! the magnitude, in hundredths of the unit for anything above bytes.

const UNIT_SHIFT: u64 = 30;
const MAGNITUDE_MASK: u64 = 0x3FFF_FFFF;
const HALF_MASK: u64 = 0xFFFF_FFFF;

/// Display text for the upload half of a packed counter.
pub fn upload_text(total: u64) -> String {
    scaled_text(total >> 32)
}

/// Display text for the download half of a packed counter.
pub fn download_text(total: u64) -> String {
    scaled_text(total & HALF_MASK)
}

fn scaled_text(scaled: u64) -> String {
    let magnitude = scaled & MAGNITUDE_MASK;
    let unit = match (scaled >> UNIT_SHIFT) & 0x3 {
        0 => return format!("{magnitude} Bytes"),
        1 => "KiB",
        2 => "MiB",
        _ => "GiB",
    };

    format!("{}.{:02} {unit}", magnitude / 100, magnitude % 100)
}
