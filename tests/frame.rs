//! Host-level tests for the frame encoder.

use nixie_clock::Frame;
use nixie_clock::clock::TimeSample;
use nixie_clock::effects::steady_time_frame;
use nixie_clock::frame::{DigitSlot, SEPARATOR_BITS};
use nixie_clock::time_format::TimeFormat;
use proptest::prelude::*;

fn slot_digits(frame: Frame) -> [Option<u8>; 6] {
    DigitSlot::ALL.map(|slot| frame.digit(slot))
}

#[test]
fn blank_frame_has_no_bits() {
    assert_eq!(Frame::BLANK.bits(), 0);
    assert_eq!(slot_digits(Frame::BLANK), [None; 6]);
    assert!(!Frame::BLANK.separator());
}

#[test]
fn fourteen_oh_five_oh_nine() {
    let frame = Frame::encode(14, 5, 9, false);
    assert_eq!(
        slot_digits(frame),
        [Some(1), Some(4), Some(0), Some(5), Some(0), Some(9)]
    );
    assert_eq!(frame.bits().count_ones(), 6);

    let expected = [
        DigitSlot::HourTens.bit_for(1),
        DigitSlot::HourUnits.bit_for(4),
        DigitSlot::MinuteTens.bit_for(0),
        DigitSlot::MinuteUnits.bit_for(5),
        DigitSlot::SecondTens.bit_for(0),
        DigitSlot::SecondUnits.bit_for(9),
    ]
    .into_iter()
    .map(|bit| 1_u64 << bit.expect("digit in range"))
    .fold(0, |bits, bit| bits | bit);
    assert_eq!(frame.bits(), expected);
}

#[test]
fn wiring_matches_board() {
    // Hour tens: numeral 0 is wiring position 7, numeral 9 is 14.
    assert_eq!(DigitSlot::HourTens.bit_for(0), Some(56));
    assert_eq!(DigitSlot::HourTens.bit_for(9), Some(49));
    // Second units: numeral 2 is wiring position 63, so frame bit 0 (shifted out last).
    assert_eq!(DigitSlot::SecondUnits.bit_for(2), Some(0));
    assert_eq!(DigitSlot::SecondUnits.bit_for(10), None);
}

#[test]
fn separator_sets_exactly_four_bits() {
    let plain = Frame::encode(12, 34, 56, false);
    let lit = Frame::encode(12, 34, 56, true);
    assert_eq!(lit.bits() ^ plain.bits(), SEPARATOR_BITS.iter().map(|b| 1_u64 << b).sum::<u64>());
    assert!(lit.separator());
    assert_eq!(slot_digits(lit), slot_digits(plain));
}

#[test]
fn slots_and_separators_partition_all_bits() {
    let separators: u64 = SEPARATOR_BITS.iter().map(|b| 1_u64 << b).sum();
    let mut seen = separators;
    for slot in DigitSlot::ALL {
        assert_eq!(slot.mask().count_ones(), 10);
        assert_eq!(seen & slot.mask(), 0, "{slot:?} overlaps an earlier slot");
        seen |= slot.mask();
    }
    assert_eq!(seen, u64::MAX);
}

#[test]
fn out_of_range_digit_blanks_slot() {
    let frame = Frame::from_digits([1, 2, 11, 4, 5, 6], false);
    assert_eq!(frame.digit(DigitSlot::MinuteTens), None);
    assert_eq!(frame.digit(DigitSlot::MinuteUnits), Some(4));
    assert_eq!(frame.bits().count_ones(), 5);
}

#[test]
fn with_digit_replaces_previous_numeral() {
    let frame = Frame::encode(10, 0, 0, false).with_digit(DigitSlot::HourUnits, 7);
    assert_eq!(frame.digit(DigitSlot::HourUnits), Some(7));
    assert_eq!(frame.bits().count_ones(), 6);
}

#[test]
fn twelve_hour_boundaries() {
    let twelve = |hours| TimeFormat::Twelve.display_hours(hours);
    assert_eq!(twelve(0), 12);
    assert_eq!(twelve(1), 1);
    assert_eq!(twelve(11), 11);
    assert_eq!(twelve(12), 12);
    assert_eq!(twelve(13), 1);
    assert_eq!(twelve(23), 11);
    for hours in 0..24 {
        assert_eq!(TimeFormat::TwentyFour.display_hours(hours), hours);
    }
}

#[test]
fn midnight_in_twelve_hour_shows_twelve() {
    let frame = steady_time_frame(TimeSample::new(0, 0, 0), TimeFormat::Twelve, true);
    assert_eq!(frame.digit(DigitSlot::HourTens), Some(1));
    assert_eq!(frame.digit(DigitSlot::HourUnits), Some(2));
}

#[test]
fn separator_follows_even_seconds_only_when_enabled() {
    let at = |seconds, enabled| {
        steady_time_frame(TimeSample::new(8, 30, seconds), TimeFormat::TwentyFour, enabled)
            .separator()
    };
    assert!(at(0, true));
    assert!(!at(1, true));
    assert!(at(58, true));
    assert!(!at(59, true));
    assert!(!at(0, false));
    assert!(!at(1, false));
}

#[test]
fn time_format_setting_is_strict() {
    assert_eq!(TimeFormat::from_setting("0").ok(), Some(TimeFormat::Twelve));
    assert_eq!(TimeFormat::from_setting("1").ok(), Some(TimeFormat::TwentyFour));
    assert!(TimeFormat::from_setting("12").is_err());
    assert!(TimeFormat::from_setting("").is_err());
    assert_eq!(TimeFormat::Twelve.as_setting(), "0");
}

proptest! {
    #[test]
    fn encode_is_deterministic_and_decodes(
        hours in 0_u8..24,
        minutes in 0_u8..60,
        seconds in 0_u8..60,
        show_separator in any::<bool>(),
    ) {
        let frame = Frame::encode(hours, minutes, seconds, show_separator);
        prop_assert_eq!(frame, Frame::encode(hours, minutes, seconds, show_separator));
        prop_assert_eq!(
            slot_digits(frame),
            [
                Some(hours / 10),
                Some(hours % 10),
                Some(minutes / 10),
                Some(minutes % 10),
                Some(seconds / 10),
                Some(seconds % 10),
            ]
        );
        prop_assert_eq!(frame.separator(), show_separator);
        let expected_ones = if show_separator { 10 } else { 6 };
        prop_assert_eq!(frame.bits().count_ones(), expected_ones);
    }

    #[test]
    fn each_slot_lights_exactly_one_bit(digits in proptest::array::uniform6(0_u8..10)) {
        let frame = Frame::from_digits(digits, false);
        for (slot, digit) in DigitSlot::ALL.into_iter().zip(digits) {
            prop_assert_eq!((frame.bits() & slot.mask()).count_ones(), 1);
            prop_assert_eq!(frame.digit(slot), Some(digit));
        }
    }
}
