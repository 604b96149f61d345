// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decaying-accumulator gain energy tracking and per-subframe gain-power selection.

use crate::tables::{CODEBOOK_GAIN_POWER_RATIOS_AND_VALUES, FALLBACK_CODEBOOK_GAIN_POWER};

/// 0.94 squared: the per-tap decay applied to each of the three cascaded energy accumulators.
pub const GAIN_ENERGY_FACTOR: f32 = 0.8836;

/// Runs one cascaded multiply-accumulate update of a 3-tap energy accumulator.
///
/// `g1 * g2` seeds the accumulator, then each of the three taps (in order) adds in its own
/// decayed history and becomes the new value for the next tap. Returns the updated top
/// (`energy[2]`).
pub fn update_gain_energy(g1: f32, g2: f32, energy: &mut [f32; 3]) -> f32 {
    let mut acc = g1 * g2;

    for e in energy.iter_mut() {
        acc += GAIN_ENERGY_FACTOR * *e;
        *e = acc;
    }

    energy[2]
}

/// Selects the new `codebookGainPower` at the start of subframes 1-3.
///
/// `initial_energy2` is `currentGainEnergy[2]` as it stood immediately before this step's two
/// energy updates; `current_energy2`/`previous_energy2` are the post-update values of
/// `currentGainEnergy[2]`/`previousGainEnergy[2]`.
pub fn select_gain_power(initial_energy2: f32, current_energy2: f32, previous_energy2: f32) -> f32 {
    let current_energy = initial_energy2 * GAIN_ENERGY_FACTOR + current_energy2;
    let previous_energy = previous_energy2 * 1.88;

    for &(ratio, power) in CODEBOOK_GAIN_POWER_RATIOS_AND_VALUES.iter() {
        if current_energy * ratio < previous_energy {
            return power;
        }
    }

    FALLBACK_CODEBOOK_GAIN_POWER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_update_is_monotone_non_decreasing_for_non_negative_inputs() {
        let mut energy = [0.0f32; 3];
        let mut last = 0.0;

        for _ in 0..16 {
            let top = update_gain_energy(1.0, 1.0, &mut energy);
            assert!(top >= last);
            last = top;
        }
    }

    #[test]
    fn energy_update_returns_top_of_accumulator() {
        let mut energy = [0.0f32; 3];
        let top = update_gain_energy(2.0, 3.0, &mut energy);
        assert_eq!(top, energy[2]);
    }

    #[test]
    fn gain_power_falls_back_when_no_ratio_matches() {
        // previous_energy2 = 0 makes previous_energy = 0, which no positive current_energy*ratio
        // can ever be less than, so the loop exhausts and the fallback applies.
        let power = select_gain_power(0.0, 1.0, 0.0);
        assert_eq!(power, FALLBACK_CODEBOOK_GAIN_POWER);
    }

    #[test]
    fn gain_power_selects_a_value_from_the_documented_ladder() {
        let allowed = [
            -0.10, 0.00, 0.15, 0.30, 0.40, 0.50, 0.60, 0.65, 0.70, 0.75, 0.80, 0.83, 0.86, 0.88,
            0.90, 0.92,
        ];

        for previous in [0.0f32, 0.5, 1.0, 5.0, 50.0] {
            let power = select_gain_power(1.0, 1.0, previous);
            assert!(allowed.iter().any(|&a| (a - power).abs() < 1e-6));
        }
    }
}
