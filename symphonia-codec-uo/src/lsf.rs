// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line Spectral Frequency interpolation and LSF-to-LPC conversion.

/// Number of Line Spectral Frequencies per frame.
pub const LSF_ORDER: usize = 10;

/// Number of linear prediction coefficients, including the implicit `lpc[0] = 1`.
pub const LPC_ORDER: usize = LSF_ORDER + 1;

/// Converts a 10-vector of quantized LSF values to 11 LPC coefficients (`lpc[0]` is always 1).
///
/// This is a symmetric polynomial expansion: each LSF term folds the running coefficient vector
/// in on itself from both ends. The order in which `lpc[a]` and `lpc[b]` are updated is
/// significant only in that both must be derived from the values captured before either is
/// written.
pub fn lsf_to_lpc(lsf: &[f32; LSF_ORDER]) -> [f32; LPC_ORDER] {
    let mut lpc = [0.0f32; LPC_ORDER];
    lpc[0] = 1.0;

    for i in 1..=LSF_ORDER {
        let f = lsf[i - 1];
        lpc[i] = f;

        let mut a = 1isize;
        let mut b = (i - 1) as isize;

        while b >= a {
            let (ua, ub) = (a as usize, b as usize);
            let fa = lpc[ua];
            let fb = lpc[ub];
            lpc[ua] = f * fb + fa;
            lpc[ub] = f * fa + fb;

            a += 1;
            b -= 1;
        }
    }

    lpc
}

/// Blends `prev` and `cur` LSF vectors for subframe `s` (0..4) per the quarter-frame ramp.
///
/// When `prev` is absent (post-reset or first frame), the current frame's LSFs are used directly
/// for every subframe and interpolation is bypassed.
pub fn interpolate_lsf(
    prev: Option<&[f32; LSF_ORDER]>,
    cur: &[f32; LSF_ORDER],
    subframe: usize,
) -> [f32; LSF_ORDER] {
    match prev {
        None => *cur,
        Some(prev) => {
            let new_ratio = 0.25 * (subframe as f32 + 1.0);
            let old_ratio = 1.0 - new_ratio;

            let mut out = [0.0f32; LSF_ORDER];
            for i in 0..LSF_ORDER {
                out[i] = old_ratio * prev[i] + new_ratio * cur[i];
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lpc_zero_is_always_one() {
        let lsf = [0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7, -0.8, 0.9, -0.95];
        let lpc = lsf_to_lpc(&lsf);
        assert_eq!(lpc[0], 1.0);
    }

    #[test]
    fn lpc_conversion_is_deterministic() {
        let lsf = [0.05; LSF_ORDER];
        let a = lsf_to_lpc(&lsf);
        let b = lsf_to_lpc(&lsf);
        assert_eq!(a, b);
    }

    #[test]
    fn lpc_conversion_with_all_zero_lsf() {
        let lsf = [0.0; LSF_ORDER];
        let lpc = lsf_to_lpc(&lsf);
        assert_eq!(lpc, [1.0; LPC_ORDER]);
    }

    #[test]
    fn interpolation_bypassed_without_previous_lsf() {
        let cur = [0.1; LSF_ORDER];
        for s in 0..4 {
            assert_eq!(interpolate_lsf(None, &cur, s), cur);
        }
    }

    #[test]
    fn interpolation_weights_ramp_from_quarter_to_full() {
        let prev = [0.0; LSF_ORDER];
        let cur = [1.0; LSF_ORDER];

        let s0 = interpolate_lsf(Some(&prev), &cur, 0);
        let s3 = interpolate_lsf(Some(&prev), &cur, 3);

        assert!((s0[0] - 0.25).abs() < 1e-6);
        assert!((s3[0] - 1.0).abs() < 1e-6);
    }
}
