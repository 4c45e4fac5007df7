//! Register value codecs
//!
//! The controller stores fractional parameters as scaled integers:
//!
//! - PI gains: signed 16-bit, value × 100, range -327.68 to 327.67
//! - Trimpot scale: signed 8-bit, value × 10, range -12.8 to 12.7
//!
//! Inputs outside a range are clamped, never rejected. Scaling truncates
//! toward zero, so 1.239 is sent as 123. NaN encodes as zero.

/// Smallest gain the gain registers can hold
pub const GAIN_MIN: f32 = -327.68;

/// Largest gain the gain registers can hold
pub const GAIN_MAX: f32 = 327.67;

/// Fixed-point factor of the gain registers
pub const GAIN_SCALE: f32 = 100.0;

/// Smallest trimpot scale
pub const TRIM_MIN: f32 = -12.8;

/// Largest trimpot scale
pub const TRIM_MAX: f32 = 12.7;

/// Fixed-point factor of the trimpot scale register
pub const TRIM_SCALE: f32 = 10.0;

/// Encode an unsigned 16-bit field (MSB first)
#[inline]
pub const fn encode_u16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Decode an unsigned 16-bit field (MSB first)
///
/// # Example
/// ```
/// use pcfan_core::codec::decode_u16;
/// assert_eq!(decode_u16([0x09, 0x60]), 2400);
/// ```
#[inline]
pub const fn decode_u16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Convert a gain to its register value
///
/// # Example
/// ```
/// use pcfan_core::codec::encode_gain;
/// assert_eq!(encode_gain(1.5), 150);
/// assert_eq!(encode_gain(500.0), i16::MAX);
/// assert_eq!(encode_gain(-500.0), i16::MIN);
/// ```
#[inline]
pub fn encode_gain(gain: f32) -> i16 {
    // `as` truncates toward zero and maps NaN to 0
    (gain.clamp(GAIN_MIN, GAIN_MAX) * GAIN_SCALE) as i16
}

/// Convert a gain register value back to a gain
///
/// The register is two's-complement; negative gains survive the trip.
#[inline]
pub fn decode_gain(raw: i16) -> f32 {
    raw as f32 / GAIN_SCALE
}

/// Bytes for a Kp/Ki pair, written from the Kp register onward
pub fn encode_gains(kp: f32, ki: f32) -> [u8; 4] {
    let [kp_hi, kp_lo] = encode_gain(kp).to_be_bytes();
    let [ki_hi, ki_lo] = encode_gain(ki).to_be_bytes();
    [kp_hi, kp_lo, ki_hi, ki_lo]
}

/// Decode a gain from its two register bytes (MSB first)
#[inline]
pub fn decode_gain_bytes(bytes: [u8; 2]) -> f32 {
    decode_gain(i16::from_be_bytes(bytes))
}

/// Convert a trimpot scale to its register value
///
/// # Example
/// ```
/// use pcfan_core::codec::encode_trim_scale;
/// assert_eq!(encode_trim_scale(2.0), 20);
/// assert_eq!(encode_trim_scale(15.0), 127);
/// ```
#[inline]
pub fn encode_trim_scale(scale: f32) -> i8 {
    (scale.clamp(TRIM_MIN, TRIM_MAX) * TRIM_SCALE) as i8
}

/// Convert a trimpot scale register byte back to a scale
#[inline]
pub fn decode_trim_scale(raw: u8) -> f32 {
    raw as i8 as f32 / TRIM_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_u16_big_endian() {
        assert_eq!(encode_u16(2400), [0x09, 0x60]);
        assert_eq!(decode_u16([0x09, 0x60]), 2400);
        assert_eq!(decode_u16([0xFF, 0xFF]), u16::MAX);
    }

    #[test]
    fn test_gain_clamp_boundaries() {
        assert_eq!(encode_gain(500.0), 32767);
        assert_eq!(encode_gain(-500.0), -32768);
        assert_eq!(encode_gains(500.0, -500.0), [0x7F, 0xFF, 0x80, 0x00]);
    }

    #[test]
    fn test_gain_truncates_toward_zero() {
        assert_eq!(encode_gain(1.239), 123);
        assert_eq!(encode_gain(-1.239), -123);
        assert_eq!(encode_gain(f32::NAN), 0);
    }

    #[test]
    fn test_negative_gain_decodes_signed() {
        // -1.00 is 0xFF9C on the wire
        assert_eq!(encode_gain(-1.0).to_be_bytes(), [0xFF, 0x9C]);
        assert!((decode_gain_bytes([0xFF, 0x9C]) + 1.0).abs() < 1e-6);
        assert!((decode_gain_bytes([0x80, 0x00]) - GAIN_MIN).abs() < 1e-3);
    }

    #[test]
    fn test_trim_scale() {
        assert_eq!(encode_trim_scale(15.0), 127);
        assert_eq!(encode_trim_scale(-15.0), -128);
        assert_eq!(encode_trim_scale(-0.55), -5);
        assert!((decode_trim_scale(20) - 2.0).abs() < 1e-6);
        assert!((decode_trim_scale(0xEC) + 2.0).abs() < 1e-6);
        assert!((decode_trim_scale(0x80) - TRIM_MIN).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn gain_round_trip_within_resolution(gain in GAIN_MIN..=GAIN_MAX) {
            let back = decode_gain(encode_gain(gain));
            prop_assert!((back - gain).abs() <= 0.0101, "{} -> {}", gain, back);
            // Truncation never moves away from zero
            prop_assert!(back.abs() <= gain.abs() + 1e-4);
        }

        #[test]
        fn gain_out_of_range_pins_to_limit(gain in 327.7f32..1.0e6) {
            prop_assert_eq!(encode_gain(gain), i16::MAX);
            prop_assert_eq!(encode_gain(-gain), i16::MIN);
        }

        #[test]
        fn trim_round_trip_within_resolution(scale in TRIM_MIN..=TRIM_MAX) {
            let back = decode_trim_scale(encode_trim_scale(scale) as u8);
            prop_assert!((back - scale).abs() <= 0.101, "{} -> {}", scale, back);
        }

        #[test]
        fn u16_bytes_msb_first(value in any::<u16>()) {
            let bytes = encode_u16(value);
            prop_assert_eq!(bytes[0], (value >> 8) as u8);
            prop_assert_eq!(decode_u16(bytes), value);
        }
    }
}
