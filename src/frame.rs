//! The 64-bit frame shifted into the display's register chain, and the encoder that builds it.
//!
//! Every bit of a [`Frame`] drives one physical element. Each of the six digit positions owns
//! ten bits (one per numeral, not BCD) and four further bits light the separators. The bit
//! assignment is a fact of the board's wiring, captured in [`WIRING`] and [`SEPARATOR_BITS`].
//!
//! See [`Frame::encode`] for the usual entry point.

/// Number of digit positions on the display.
pub const DIGIT_SLOT_COUNT: usize = 6;

/// Number of numerals each digit position can show.
pub const DIGIT_VALUES: usize = 10;

/// Wiring position of numeral `d` in each slot. The frame bit for it is `63 - WIRING[slot][d]`.
///
/// Rows follow [`DigitSlot`] order.
const WIRING: [[u8; DIGIT_VALUES]; DIGIT_SLOT_COUNT] = [
    [7, 6, 5, 4, 3, 2, 1, 0, 15, 14],
    [13, 12, 11, 10, 9, 8, 23, 22, 21, 20],
    [17, 16, 31, 30, 29, 28, 27, 26, 25, 24],
    [39, 38, 37, 36, 35, 34, 33, 32, 47, 46],
    [43, 42, 41, 40, 55, 54, 53, 52, 51, 50],
    [49, 48, 63, 62, 61, 60, 59, 58, 57, 56],
];

/// Frame bits that light the separators between hours, minutes and seconds.
pub const SEPARATOR_BITS: [u8; 4] = [18, 19, 44, 45];

/// One of the six digit positions on the display, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitSlot {
    HourTens,
    HourUnits,
    MinuteTens,
    MinuteUnits,
    SecondTens,
    SecondUnits,
}

impl DigitSlot {
    /// All slots in display order.
    pub const ALL: [Self; DIGIT_SLOT_COUNT] = [
        Self::HourTens,
        Self::HourUnits,
        Self::MinuteTens,
        Self::MinuteUnits,
        Self::SecondTens,
        Self::SecondUnits,
    ];

    const fn wiring(self) -> &'static [u8; DIGIT_VALUES] {
        match self {
            Self::HourTens => &WIRING[0],
            Self::HourUnits => &WIRING[1],
            Self::MinuteTens => &WIRING[2],
            Self::MinuteUnits => &WIRING[3],
            Self::SecondTens => &WIRING[4],
            Self::SecondUnits => &WIRING[5],
        }
    }

    /// The frame bit that shows `digit` in this slot, or `None` for digits above 9.
    #[must_use]
    pub fn bit_for(self, digit: u8) -> Option<u8> {
        self.wiring()
            .get(usize::from(digit))
            .map(|position| 63 - position)
    }

    /// Mask of all ten bits this slot owns.
    #[must_use]
    pub fn mask(self) -> u64 {
        self.wiring()
            .iter()
            .fold(0, |mask, position| mask | (1 << (63 - position)))
    }
}

/// A complete snapshot of the display, ready to be shifted out most-significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame(u64);

impl Frame {
    /// Every digit dark and the separators off. Shown at boot before the first real render.
    pub const BLANK: Self = Self(0);

    /// Encodes a time of day.
    ///
    /// Each value is split into tens and units; callers supply `hours < 24`,
    /// `minutes < 60` and `seconds < 60`. `show_separator` is taken as given; the frame
    /// carries no memory of earlier calls.
    ///
    /// ```
    /// use nixie_clock::frame::{DigitSlot, Frame};
    ///
    /// let frame = Frame::encode(14, 5, 9, false);
    /// assert_eq!(frame.digit(DigitSlot::HourTens), Some(1));
    /// assert_eq!(frame.digit(DigitSlot::SecondUnits), Some(9));
    /// assert!(!frame.separator());
    /// ```
    #[must_use]
    pub fn encode(hours: u8, minutes: u8, seconds: u8, show_separator: bool) -> Self {
        Self::from_digits(
            [
                hours / 10,
                hours % 10,
                minutes / 10,
                minutes % 10,
                seconds / 10,
                seconds % 10,
            ],
            show_separator,
        )
    }

    /// Encodes six arbitrary digits, one per slot in display order.
    ///
    /// A digit above 9 leaves its slot blank rather than failing.
    #[must_use]
    pub fn from_digits(digits: [u8; DIGIT_SLOT_COUNT], show_separator: bool) -> Self {
        DigitSlot::ALL
            .into_iter()
            .zip(digits)
            .fold(Self::BLANK, |frame, (slot, digit)| frame.with_digit(slot, digit))
            .with_separator(show_separator)
    }

    /// Returns this frame with `slot` showing `digit` (blank if `digit > 9`).
    ///
    /// Any numeral the slot was showing before is cleared first.
    #[must_use]
    pub fn with_digit(self, slot: DigitSlot, digit: u8) -> Self {
        let cleared = self.0 & !slot.mask();
        match slot.bit_for(digit) {
            Some(bit) => Self(cleared | (1 << bit)),
            None => Self(cleared),
        }
    }

    /// Returns this frame with the separators lit or dark.
    #[must_use]
    pub const fn with_separator(self, show_separator: bool) -> Self {
        if show_separator {
            Self(self.0 | separator_mask())
        } else {
            Self(self.0 & !separator_mask())
        }
    }

    /// Decodes the numeral shown in `slot`, or `None` if the slot is blank or malformed.
    #[must_use]
    pub fn digit(self, slot: DigitSlot) -> Option<u8> {
        let bits = self.0 & slot.mask();
        if bits.count_ones() != 1 {
            return None;
        }
        let bit = bits.trailing_zeros();
        slot.wiring()
            .iter()
            .position(|&position| u32::from(63 - position) == bit)
            .and_then(|digit| u8::try_from(digit).ok())
    }

    /// Whether all four separator bits are lit.
    #[must_use]
    pub const fn separator(self) -> bool {
        self.0 & separator_mask() == separator_mask()
    }

    /// The raw register contents.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

const fn separator_mask() -> u64 {
    (1 << SEPARATOR_BITS[0])
        | (1 << SEPARATOR_BITS[1])
        | (1 << SEPARATOR_BITS[2])
        | (1 << SEPARATOR_BITS[3])
}
