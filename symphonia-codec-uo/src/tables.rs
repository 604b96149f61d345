// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static tables consumed by the frame decoder.
//!
//! All reals here are pre-scaled at their point of definition, so the decoder never repeats a
//! scale-and-round step per frame. See each table for its original fixed-point scale.

pub(crate) const SUBFRAME_LAG_COEFFICIENTS: [[f32; 3]; 64] = [
    [0.0_f32, 0.0_f32, 0.5_f32],
    [0.00012597632_f32, 0.031242126_f32, 0.48425296_f32],
    [0.00050390527_f32, 0.061476442_f32, 0.46875787_f32],
    [0.0011337868_f32, 0.090702948_f32, 0.45351474_f32],
    [0.0020156211_f32, 0.11892164_f32, 0.43852356_f32],
    [0.0031494079_f32, 0.14613253_f32, 0.42378433_f32],
    [0.0045351474_f32, 0.1723356_f32, 0.40929705_f32],
    [0.0061728395_f32, 0.19753086_f32, 0.39506173_f32],
    [0.0080624843_f32, 0.22171832_f32, 0.38107836_f32],
    [0.010204082_f32, 0.24489796_f32, 0.36734694_f32],
    [0.012597632_f32, 0.26706979_f32, 0.35386747_f32],
    [0.015243134_f32, 0.28823381_f32, 0.34063996_f32],
    [0.01814059_f32, 0.30839002_f32, 0.3276644_f32],
    [0.021289997_f32, 0.32753842_f32, 0.31494079_f32],
    [0.024691358_f32, 0.34567901_f32, 0.30246914_f32],
    [0.028344671_f32, 0.36281179_f32, 0.29024943_f32],
    [0.032249937_f32, 0.37893676_f32, 0.27828168_f32],
    [0.036407155_f32, 0.39405392_f32, 0.26656589_f32],
    [0.040816327_f32, 0.40816327_f32, 0.25510204_f32],
    [0.04547745_f32, 0.4212648_f32, 0.24389015_f32],
    [0.050390527_f32, 0.43335853_f32, 0.23293021_f32],
    [0.055555556_f32, 0.44444444_f32, 0.22222222_f32],
    [0.060972537_f32, 0.45452255_f32, 0.21176619_f32],
    [0.066641471_f32, 0.46359284_f32, 0.20156211_f32],
    [0.072562358_f32, 0.47165533_f32, 0.19160998_f32],
    [0.078735198_f32, 0.47871_f32, 0.1819098_f32],
    [0.08515999_f32, 0.48475687_f32, 0.17246158_f32],
    [0.091836735_f32, 0.48979592_f32, 0.16326531_f32],
    [0.098765432_f32, 0.49382716_f32, 0.15432099_f32],
    [0.10594608_f32, 0.49685059_f32, 0.14562862_f32],
    [0.11337868_f32, 0.49886621_f32, 0.13718821_f32],
    [0.12106324_f32, 0.49987402_f32, 0.12899975_f32],
    [0.12899975_f32, 0.49987402_f32, 0.12106324_f32],
    [0.13718821_f32, 0.49886621_f32, 0.11337868_f32],
    [0.14562862_f32, 0.49685059_f32, 0.10594608_f32],
    [0.15432099_f32, 0.49382716_f32, 0.098765432_f32],
    [0.16326531_f32, 0.48979592_f32, 0.091836735_f32],
    [0.17246158_f32, 0.48475687_f32, 0.08515999_f32],
    [0.1819098_f32, 0.47871_f32, 0.078735198_f32],
    [0.19160998_f32, 0.47165533_f32, 0.072562358_f32],
    [0.20156211_f32, 0.46359284_f32, 0.066641471_f32],
    [0.21176619_f32, 0.45452255_f32, 0.060972537_f32],
    [0.22222222_f32, 0.44444444_f32, 0.055555556_f32],
    [0.23293021_f32, 0.43335853_f32, 0.050390527_f32],
    [0.24389015_f32, 0.4212648_f32, 0.04547745_f32],
    [0.25510204_f32, 0.40816327_f32, 0.040816327_f32],
    [0.26656589_f32, 0.39405392_f32, 0.036407155_f32],
    [0.27828168_f32, 0.37893676_f32, 0.032249937_f32],
    [0.29024943_f32, 0.36281179_f32, 0.028344671_f32],
    [0.30246914_f32, 0.34567901_f32, 0.024691358_f32],
    [0.31494079_f32, 0.32753842_f32, 0.021289997_f32],
    [0.3276644_f32, 0.30839002_f32, 0.01814059_f32],
    [0.34063996_f32, 0.28823381_f32, 0.015243134_f32],
    [0.35386747_f32, 0.26706979_f32, 0.012597632_f32],
    [0.36734694_f32, 0.24489796_f32, 0.010204082_f32],
    [0.38107836_f32, 0.22171832_f32, 0.0080624843_f32],
    [0.39506173_f32, 0.19753086_f32, 0.0061728395_f32],
    [0.40929705_f32, 0.1723356_f32, 0.0045351474_f32],
    [0.42378433_f32, 0.14613253_f32, 0.0031494079_f32],
    [0.43852356_f32, 0.11892164_f32, 0.0020156211_f32],
    [0.45351474_f32, 0.090702948_f32, 0.0011337868_f32],
    [0.46875787_f32, 0.061476442_f32, 0.00050390527_f32],
    [0.48425296_f32, 0.031242126_f32, 0.00012597632_f32],
    [0.5_f32, 0.0_f32, 0.0_f32],
];

pub(crate) const LSF_INDEX_BITS: [u32; 10] = [6, 6, 5, 5, 4, 4, 4, 4, 3, 3];

pub(crate) const LSF_TABLE: [&[f32]; 10] = [
    &[-0.92_f32, -0.89079365_f32, -0.8615873_f32, -0.83238095_f32, -0.8031746_f32, -0.77396825_f32, -0.7447619_f32, -0.71555556_f32, -0.68634921_f32, -0.65714286_f32, -0.62793651_f32, -0.59873016_f32, -0.56952381_f32, -0.54031746_f32, -0.51111111_f32, -0.48190476_f32, -0.45269841_f32, -0.42349206_f32, -0.39428571_f32, -0.36507937_f32, -0.33587302_f32, -0.30666667_f32, -0.27746032_f32, -0.24825397_f32, -0.21904762_f32, -0.18984127_f32, -0.16063492_f32, -0.13142857_f32, -0.10222222_f32, -0.073015873_f32, -0.043809524_f32, -0.014603175_f32, 0.014603175_f32, 0.043809524_f32, 0.073015873_f32, 0.10222222_f32, 0.13142857_f32, 0.16063492_f32, 0.18984127_f32, 0.21904762_f32, 0.24825397_f32, 0.27746032_f32, 0.30666667_f32, 0.33587302_f32, 0.36507937_f32, 0.39428571_f32, 0.42349206_f32, 0.45269841_f32, 0.48190476_f32, 0.51111111_f32, 0.54031746_f32, 0.56952381_f32, 0.59873016_f32, 0.62793651_f32, 0.65714286_f32, 0.68634921_f32, 0.71555556_f32, 0.7447619_f32, 0.77396825_f32, 0.8031746_f32, 0.83238095_f32, 0.8615873_f32, 0.89079365_f32, 0.92_f32],
    &[-0.87_f32, -0.84190476_f32, -0.81380952_f32, -0.78571429_f32, -0.75761905_f32, -0.72952381_f32, -0.70142857_f32, -0.67333333_f32, -0.6452381_f32, -0.61714286_f32, -0.58904762_f32, -0.56095238_f32, -0.53285714_f32, -0.5047619_f32, -0.47666667_f32, -0.44857143_f32, -0.42047619_f32, -0.39238095_f32, -0.36428571_f32, -0.33619048_f32, -0.30809524_f32, -0.28_f32, -0.25190476_f32, -0.22380952_f32, -0.19571429_f32, -0.16761905_f32, -0.13952381_f32, -0.11142857_f32, -0.083333333_f32, -0.055238095_f32, -0.027142857_f32, 0.00095238095_f32, 0.029047619_f32, 0.057142857_f32, 0.085238095_f32, 0.11333333_f32, 0.14142857_f32, 0.16952381_f32, 0.19761905_f32, 0.22571429_f32, 0.25380952_f32, 0.28190476_f32, 0.31_f32, 0.33809524_f32, 0.36619048_f32, 0.39428571_f32, 0.42238095_f32, 0.45047619_f32, 0.47857143_f32, 0.50666667_f32, 0.5347619_f32, 0.56285714_f32, 0.59095238_f32, 0.61904762_f32, 0.64714286_f32, 0.6752381_f32, 0.70333333_f32, 0.73142857_f32, 0.75952381_f32, 0.78761905_f32, 0.81571429_f32, 0.84380952_f32, 0.87190476_f32, 0.9_f32],
    &[-0.82_f32, -0.76516129_f32, -0.71032258_f32, -0.65548387_f32, -0.60064516_f32, -0.54580645_f32, -0.49096774_f32, -0.43612903_f32, -0.38129032_f32, -0.32645161_f32, -0.2716129_f32, -0.21677419_f32, -0.16193548_f32, -0.10709677_f32, -0.052258065_f32, 0.0025806452_f32, 0.057419355_f32, 0.11225806_f32, 0.16709677_f32, 0.22193548_f32, 0.27677419_f32, 0.3316129_f32, 0.38645161_f32, 0.44129032_f32, 0.49612903_f32, 0.55096774_f32, 0.60580645_f32, 0.66064516_f32, 0.71548387_f32, 0.77032258_f32, 0.82516129_f32, 0.88_f32],
    &[-0.77_f32, -0.71741935_f32, -0.66483871_f32, -0.61225806_f32, -0.55967742_f32, -0.50709677_f32, -0.45451613_f32, -0.40193548_f32, -0.34935484_f32, -0.29677419_f32, -0.24419355_f32, -0.1916129_f32, -0.13903226_f32, -0.086451613_f32, -0.033870968_f32, 0.018709677_f32, 0.071290323_f32, 0.12387097_f32, 0.17645161_f32, 0.22903226_f32, 0.2816129_f32, 0.33419355_f32, 0.38677419_f32, 0.43935484_f32, 0.49193548_f32, 0.54451613_f32, 0.59709677_f32, 0.64967742_f32, 0.70225806_f32, 0.75483871_f32, 0.80741935_f32, 0.86_f32],
    &[-0.72_f32, -0.616_f32, -0.512_f32, -0.408_f32, -0.304_f32, -0.2_f32, -0.096_f32, 0.008_f32, 0.112_f32, 0.216_f32, 0.32_f32, 0.424_f32, 0.528_f32, 0.632_f32, 0.736_f32, 0.84_f32],
    &[-0.67_f32, -0.57066667_f32, -0.47133333_f32, -0.372_f32, -0.27266667_f32, -0.17333333_f32, -0.074_f32, 0.025333333_f32, 0.12466667_f32, 0.224_f32, 0.32333333_f32, 0.42266667_f32, 0.522_f32, 0.62133333_f32, 0.72066667_f32, 0.82_f32],
    &[-0.62_f32, -0.52533333_f32, -0.43066667_f32, -0.336_f32, -0.24133333_f32, -0.14666667_f32, -0.052_f32, 0.042666667_f32, 0.13733333_f32, 0.232_f32, 0.32666667_f32, 0.42133333_f32, 0.516_f32, 0.61066667_f32, 0.70533333_f32, 0.8_f32],
    &[-0.57_f32, -0.48_f32, -0.39_f32, -0.3_f32, -0.21_f32, -0.12_f32, -0.03_f32, 0.06_f32, 0.15_f32, 0.24_f32, 0.33_f32, 0.42_f32, 0.51_f32, 0.6_f32, 0.69_f32, 0.78_f32],
    &[-0.52_f32, -0.33714286_f32, -0.15428571_f32, 0.028571429_f32, 0.21142857_f32, 0.39428571_f32, 0.57714286_f32, 0.76_f32],
    &[-0.47_f32, -0.29714286_f32, -0.12428571_f32, 0.048571429_f32, 0.22142857_f32, 0.39428571_f32, 0.56714286_f32, 0.74_f32],
];

pub(crate) const CODEBOOK_GAIN_POWER_RATIOS_AND_VALUES: [(f32, f32); 15] = [
    (0.98236084_f32, 0.92_f32),
    (0.90833827_f32, 0.9_f32),
    (0.83431571_f32, 0.88_f32),
    (0.76029314_f32, 0.86_f32),
    (0.68627058_f32, 0.83_f32),
    (0.61224801_f32, 0.8_f32),
    (0.53822545_f32, 0.75_f32),
    (0.46420288_f32, 0.7_f32),
    (0.39018032_f32, 0.65_f32),
    (0.31615775_f32, 0.6_f32),
    (0.24213518_f32, 0.5_f32),
    (0.16811262_f32, 0.4_f32),
    (0.094090053_f32, 0.3_f32),
    (0.020067487_f32, 0.15_f32),
    (-0.053955078_f32, 0.0_f32),
];

pub(crate) const FALLBACK_CODEBOOK_GAIN_POWER: f32 = -0.10;

pub(crate) const CODEBOOK_VECTOR_TABLE: [[f32; 4]; 32] = [
    [-0.43017578_f32, 1.1791992_f32, -0.69970703_f32, 0.93115234_f32],
    [1.190918_f32, -0.9128418_f32, -0.97265625_f32, -0.046875_f32],
    [0.22973633_f32, 0.65600586_f32, -0.63671875_f32, 0.25805664_f32],
    [0.59326172_f32, -0.80761719_f32, -1.1269531_f32, -0.14794922_f32],
    [-0.30810547_f32, 0.41772461_f32, 0.59033203_f32, 0.58691406_f32],
    [1.0544434_f32, 0.66943359_f32, 0.083740234_f32, 0.38623047_f32],
    [-0.51928711_f32, 0.40283203_f32, -1.1467285_f32, 0.47412109_f32],
    [-0.49291992_f32, -0.75488281_f32, -0.11938477_f32, -0.58618164_f32],
    [-0.87817383_f32, -0.35449219_f32, 0.76000977_f32, -1.1494141_f32],
    [-0.92138672_f32, 0.60205078_f32, 0.037109375_f32, 0.48486328_f32],
    [0.98291016_f32, -0.93701172_f32, 1.1943359_f32, 0.80004883_f32],
    [0.51733398_f32, 0.19946289_f32, 0.049316406_f32, 0.59423828_f32],
    [0.90551758_f32, 0.9375_f32, -0.051025391_f32, -1.0187988_f32],
    [-0.75097656_f32, -1.1547852_f32, 0.96850586_f32, -0.82592773_f32],
    [-0.12695312_f32, 1.019043_f32, 0.69750977_f32, -0.3515625_f32],
    [0.24414062_f32, -0.37817383_f32, -0.71191406_f32, 0.45849609_f32],
    [0.61499023_f32, -0.17260742_f32, -0.54516602_f32, -0.18530273_f32],
    [0.66870117_f32, 0.59594727_f32, 0.11450195_f32, -0.85644531_f32],
    [-0.93432617_f32, 0.40551758_f32, 0.57055664_f32, 0.48120117_f32],
    [-1.1157227_f32, 0.0031738281_f32, 1.1791992_f32, 0.42651367_f32],
    [-1.059082_f32, 1.0085449_f32, -0.022949219_f32, -1.1533203_f32],
    [-0.20581055_f32, 0.88500977_f32, 0.36401367_f32, -0.32373047_f32],
    [1.0310059_f32, 0.36254883_f32, 0.33789062_f32, -1.0065918_f32],
    [0.66064453_f32, 0.93237305_f32, 1.0275879_f32, 0.66308594_f32],
    [-1.0251465_f32, -0.6784668_f32, -0.82641602_f32, -0.88305664_f32],
    [0.24584961_f32, -0.49633789_f32, -0.031005859_f32, 0.66455078_f32],
    [0.92041016_f32, 0.92993164_f32, -0.5546875_f32, -0.60400391_f32],
    [0.85986328_f32, -1.1875_f32, -0.97851562_f32, 0.29785156_f32],
    [0.95166016_f32, -0.86889648_f32, -1.0341797_f32, 1.184082_f32],
    [0.20922852_f32, -1.0134277_f32, -0.92749023_f32, -0.050292969_f32],
    [0.82446289_f32, -0.75561523_f32, 1.126709_f32, -0.7800293_f32],
    [0.65332031_f32, -0.87304688_f32, 0.58959961_f32, 0.95410156_f32],
];

pub(crate) const CODEBOOK_DELTA_GAIN: [f32; 32] = [
    3.8554688_f32,
    -5.5657959_f32,
    -5.3833008_f32,
    -5.9987793_f32,
    3.7371826_f32,
    -3.9597168_f32,
    0.49755859_f32,
    3.8997803_f32,
    2.0251465_f32,
    -0.4934082_f32,
    4.0391846_f32,
    -1.5213623_f32,
    -1.737915_f32,
    -3.1660156_f32,
    4.5478516_f32,
    0.29162598_f32,
    -2.0715332_f32,
    4.7730713_f32,
    1.7141113_f32,
    -2.3735352_f32,
    0.30578613_f32,
    1.8444824_f32,
    4.4367676_f32,
    0.59228516_f32,
    1.7546387_f32,
    5.7584229_f32,
    -3.8216553_f32,
    -3.0483398_f32,
    0.30114746_f32,
    -3.3168945_f32,
    -5.256958_f32,
    -1.3129883_f32,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsf_table_row_sizes_match_index_bits() {
        for (row, &bits) in LSF_TABLE.iter().zip(LSF_INDEX_BITS.iter()) {
            assert_eq!(row.len(), 1usize << bits);
        }
    }

    #[test]
    fn lsf_table_rows_are_ascending() {
        for row in LSF_TABLE.iter() {
            for pair in row.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn lsf_index_bits_sum_to_46() {
        assert_eq!(LSF_INDEX_BITS.iter().sum::<u32>(), 46);
    }

    #[test]
    fn gain_power_ratios_descend_monotonically() {
        for pair in CODEBOOK_GAIN_POWER_RATIOS_AND_VALUES.windows(2) {
            assert!(pair[0].0 > pair[1].0);
        }
    }

    #[test]
    fn gain_power_values_match_spec_ladder() {
        let expected = [
            0.92, 0.90, 0.88, 0.86, 0.83, 0.80, 0.75, 0.70, 0.65, 0.60, 0.50, 0.40, 0.30, 0.15,
            0.00,
        ];
        for (entry, &want) in CODEBOOK_GAIN_POWER_RATIOS_AND_VALUES.iter().zip(expected.iter()) {
            assert!((entry.1 - want).abs() < 1e-6);
        }
    }

    #[test]
    fn subframe_lag_coefficients_are_pre_halved() {
        for row in SUBFRAME_LAG_COEFFICIENTS.iter() {
            let sum: f32 = row.iter().sum();
            assert!(sum <= 0.5001);
        }
    }
}
