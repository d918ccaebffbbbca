/// Number of fine-tune rows in the DSS period table
pub const FINE_TUNES: usize = 16;
/// Notes per fine-tune row (four octaves)
pub const DSS_NOTES: usize = 48;
/// DSS period meaning "stop the voice"
pub const MUTE_PERIOD: u16 = 0x7ff;

/// PAL Paula clock divided by two, period to Hz numerator
pub const AMIGA_CLOCK: u32 = 3_546_895;

// Three octaves per tuning, fine-tunes 0..7 then -8..-1
#[rustfmt::skip]
const PT_PERIODS: [[u16; 36]; FINE_TUNES] = [
    [856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480, 453,
     428, 404, 381, 360, 339, 320, 302, 285, 269, 254, 240, 226,
     214, 202, 190, 180, 170, 160, 151, 143, 135, 127, 120, 113],
    [850, 802, 757, 715, 674, 637, 601, 567, 535, 505, 477, 450,
     425, 401, 379, 357, 337, 318, 300, 284, 268, 253, 239, 225,
     213, 201, 189, 179, 169, 159, 150, 142, 134, 126, 119, 113],
    [844, 796, 752, 709, 670, 632, 597, 563, 532, 502, 474, 447,
     422, 398, 376, 355, 335, 316, 298, 282, 266, 251, 237, 224,
     211, 199, 188, 177, 167, 158, 149, 141, 133, 125, 118, 112],
    [838, 791, 746, 704, 665, 628, 592, 559, 528, 498, 470, 444,
     419, 395, 373, 352, 332, 314, 296, 280, 264, 249, 235, 222,
     209, 198, 187, 176, 166, 157, 148, 140, 132, 125, 118, 111],
    [832, 785, 741, 699, 660, 623, 588, 555, 524, 495, 467, 441,
     416, 392, 370, 350, 330, 312, 294, 278, 262, 247, 233, 220,
     208, 196, 185, 175, 165, 156, 147, 139, 131, 124, 117, 110],
    [826, 779, 736, 694, 655, 619, 584, 551, 520, 491, 463, 437,
     413, 390, 368, 347, 328, 309, 292, 276, 260, 245, 232, 219,
     206, 195, 184, 174, 164, 155, 146, 138, 130, 123, 116, 109],
    [820, 774, 730, 689, 651, 614, 580, 547, 516, 487, 460, 434,
     410, 387, 365, 345, 325, 307, 290, 274, 258, 244, 230, 217,
     205, 193, 183, 172, 163, 154, 145, 137, 129, 122, 115, 109],
    [814, 768, 725, 684, 646, 610, 575, 543, 513, 484, 457, 431,
     407, 384, 363, 342, 323, 305, 288, 272, 256, 242, 228, 216,
     204, 192, 181, 171, 161, 152, 144, 136, 128, 121, 114, 108],
    [907, 856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480,
     453, 428, 404, 381, 360, 339, 320, 302, 285, 269, 254, 240,
     226, 214, 202, 190, 180, 170, 160, 151, 143, 135, 127, 120],
    [900, 850, 802, 757, 715, 675, 636, 601, 567, 535, 505, 477,
     450, 425, 401, 379, 357, 337, 318, 300, 284, 268, 253, 238,
     225, 212, 200, 189, 179, 169, 159, 150, 142, 134, 126, 119],
    [894, 844, 796, 752, 709, 670, 632, 597, 563, 532, 502, 474,
     447, 422, 398, 376, 355, 335, 316, 298, 282, 266, 251, 237,
     223, 211, 199, 188, 177, 167, 158, 149, 141, 133, 125, 118],
    [887, 838, 791, 746, 704, 665, 628, 592, 559, 528, 498, 470,
     444, 419, 395, 373, 352, 332, 314, 296, 280, 264, 249, 235,
     222, 209, 198, 187, 176, 166, 157, 148, 140, 132, 125, 118],
    [881, 832, 785, 741, 699, 660, 623, 588, 555, 524, 494, 467,
     441, 416, 392, 370, 350, 330, 312, 294, 278, 262, 247, 233,
     220, 208, 196, 185, 175, 165, 156, 147, 139, 131, 123, 117],
    [875, 826, 779, 736, 694, 655, 619, 584, 551, 520, 491, 463,
     437, 413, 390, 368, 347, 328, 309, 292, 276, 260, 245, 232,
     219, 206, 195, 184, 174, 164, 155, 146, 138, 130, 123, 116],
    [868, 820, 774, 730, 689, 651, 614, 580, 547, 516, 487, 460,
     434, 410, 387, 365, 345, 325, 307, 290, 274, 258, 244, 230,
     217, 205, 193, 183, 172, 163, 154, 145, 137, 129, 122, 115],
    [862, 814, 768, 725, 684, 646, 610, 575, 543, 513, 484, 457,
     431, 407, 384, 363, 342, 323, 305, 288, 272, 256, 242, 228,
     216, 203, 192, 181, 171, 161, 152, 144, 136, 128, 121, 114],
];

const fn build_dss_periods() -> [[u16; DSS_NOTES]; FINE_TUNES] {
    let mut table = [[0u16; DSS_NOTES]; FINE_TUNES];
    let mut tune = 0;
    while tune < FINE_TUNES {
        let mut note = 0;
        while note < 12 {
            table[tune][note] = PT_PERIODS[tune][note] * 2;
            note += 1;
        }
        while note < DSS_NOTES {
            table[tune][note] = PT_PERIODS[tune][note - 12];
            note += 1;
        }
        tune += 1;
    }
    table
}

/// DSS note periods, one row per fine-tune, lowest pitch first
pub static DSS_PERIODS: [[u16; DSS_NOTES]; FINE_TUNES] = build_dss_periods();

/// Future Composer note periods, indexed by (transposed) note
#[rustfmt::skip]
pub static FC_PERIODS: [u16; 132] = [
    1712, 1616, 1524, 1440, 1356, 1280, 1208, 1140, 1076, 1016,  960,  906,
     856,  808,  762,  720,  678,  640,  604,  570,  538,  508,  480,  453,
     428,  404,  381,  360,  339,  320,  302,  285,  269,  254,  240,  226,
     214,  202,  190,  180,  170,  160,  151,  143,  135,  127,  120,  113,
     113,  113,  113,  113,  113,  113,  113,  113,  113,  113,  113,  113,
    3424, 3232, 3048, 2880, 2712, 2560, 2416, 2280, 2152, 2032, 1920, 1812,
    1712, 1616, 1524, 1440, 1356, 1280, 1208, 1140, 1076, 1016,  960,  906,
     856,  808,  762,  720,  678,  640,  604,  570,  538,  508,  480,  453,
     428,  404,  381,  360,  339,  320,  302,  285,  269,  254,  240,  226,
     214,  202,  190,  180,  170,  160,  151,  143,  135,  127,  120,  113,
     113,  113,  113,  113,  113,  113,  113,  113,  113,  113,  113,  113,
];

/// Lowest and highest period the Future Composer engine outputs
pub const FC_PERIOD_MIN: u16 = 113;
pub const FC_PERIOD_MAX: u16 = 3424;

#[inline(always)]
fn tuning(fine_tune: u8) -> &'static [u16; DSS_NOTES] {
    &DSS_PERIODS[fine_tune as usize & (FINE_TUNES - 1)]
}

/// Highest period (lowest pitch) reachable with `fine_tune`
#[inline(always)]
pub fn max_period(fine_tune: u8) -> u16 {
    tuning(fine_tune)[0]
}

/// Lowest period (highest pitch) reachable with `fine_tune`
#[inline(always)]
pub fn min_period(fine_tune: u8) -> u16 {
    tuning(fine_tune)[DSS_NOTES - 1]
}

/// Re-read the slot holding `period` in the untuned row from the row of `fine_tune`.
/// A period missing from the untuned row resolves to the last slot.
pub fn adjust_fine_tune(period: u16, fine_tune: u8) -> u16 {
    if fine_tune == 0 {
        return period;
    }
    let slot = DSS_PERIODS[0]
        .iter()
        .position(|&p| p == period)
        .unwrap_or(DSS_NOTES - 1);
    tuning(fine_tune)[slot]
}

/// Round `period` to the nearest table note at or above its pitch
pub fn adjust_for_tone_portamento(period: u16, fine_tune: u8) -> u16 {
    let table = tuning(fine_tune);
    table
        .iter()
        .copied()
        .find(|&p| period >= p)
        .unwrap_or(table[DSS_NOTES - 1])
}

/// Period `offset` semitones above the note closest to `period`
pub fn arpeggio_period(period: u16, fine_tune: u8, offset: u8) -> u16 {
    let table = tuning(fine_tune);
    let slot = table
        .iter()
        .position(|&p| period >= p)
        .unwrap_or(DSS_NOTES - 1);
    table[(slot + offset as usize).min(DSS_NOTES - 1)]
}

/// Convert an Amiga period to a playback rate in Hz, 0 for a silent period
#[inline(always)]
pub fn period_to_frequency(period: u16) -> u32 {
    if period == 0 {
        0
    } else {
        AMIGA_CLOCK / period as u32
    }
}
