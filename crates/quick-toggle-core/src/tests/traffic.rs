use crate::{tests::fakes::packed, traffic};

const KIB: u64 = 1 << 30;
const MIB: u64 = 2 << 30;
const GIB: u64 = 3 << 30;

/// WHAT: Unscaled halves render as plain byte counts
/// WHY: Small counters must not be shown with a fractional unit
#[test]
fn given_byte_scaled_counter_when_formatting_then_plain_bytes() {
    // Given: 512 bytes up, nothing down
    let total = packed(512, 0);

    // When: Formatting both halves
    let upload = traffic::upload_text(total);
    let download = traffic::download_text(total);

    // Then: Both read as bytes
    assert_eq!(upload, "512 Bytes");
    assert_eq!(download, "0 Bytes");
}

/// WHAT: Scaled halves render with two decimals in their unit
/// WHY: The magnitude is stored in hundredths of the unit
#[test]
fn given_unit_scaled_counter_when_formatting_then_two_decimal_units() {
    // Given: 1.50 KiB up and 12.34 MiB down
    let total = packed(KIB | 150, MIB | 1234);

    // When/Then: Each half picks its own unit
    assert_eq!(traffic::upload_text(total), "1.50 KiB");
    assert_eq!(traffic::download_text(total), "12.34 MiB");
}

/// WHAT: Fractions below ten hundredths keep their leading zero
/// WHY: "0.5 GiB" for five hundredths would misreport the value tenfold
#[test]
fn given_small_fraction_when_formatting_then_fraction_zero_padded() {
    // Given: 0.05 GiB down
    let total = packed(0, GIB | 5);

    // When: Formatting the download half
    let download = traffic::download_text(total);

    // Then: The fraction is padded
    assert_eq!(download, "0.05 GiB");
}
