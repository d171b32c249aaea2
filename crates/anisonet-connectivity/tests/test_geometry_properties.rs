// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Property tests for toroidal geometry and landscape bounds.
use anisonet_connectivity::spatial::{coordinates_of, indices_of, wrap};
use anisonet_connectivity::{
    coordinate_of, generate, index_of, minimal_displacement, seeded_rng, LandscapeMethod,
};
use proptest::prelude::*;

fn grid_and_index() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|gs| (Just(gs), 0..gs * gs))
}

fn any_coord() -> impl Strategy<Value = (i64, i64)> {
    (-1_000i64..1_000, -1_000i64..1_000)
}

proptest! {
    #[test]
    fn index_coordinate_round_trip((gs, index) in grid_and_index()) {
        prop_assert_eq!(index_of(coordinate_of(index, gs), gs), index);
    }

    #[test]
    fn wrapped_coordinates_stay_on_grid(c in any_coord(), gs in 1usize..64) {
        let (x, y) = wrap(c, gs);
        prop_assert!((0..gs as i64).contains(&x));
        prop_assert!((0..gs as i64).contains(&y));
    }

    #[test]
    fn displacement_is_folded(a in any_coord(), b in any_coord(), gs in 1usize..64) {
        let (dx, dy) = minimal_displacement(a, b, gs);
        let half = gs as f64 / 2.0;
        for d in [dx as f64, dy as f64] {
            prop_assert!(d > -half && d <= half, "{} outside (-{}, {}]", d, half, half);
        }
    }

    #[test]
    fn displacement_is_antisymmetric_on_odd_grids(
        a in any_coord(),
        b in any_coord(),
        half in 0usize..32,
    ) {
        // Odd grids have no half-grid tie
        let gs = 2 * half + 1;
        let (dx, dy) = minimal_displacement(a, b, gs);
        prop_assert_eq!(minimal_displacement(b, a, gs), (-dx, -dy));
    }

    #[test]
    fn batch_transforms_round_trip(gs in 1usize..32, raw in prop::collection::vec(0usize..1024, 0..50)) {
        let indices: Vec<usize> = raw.into_iter().map(|i| i % (gs * gs)).collect();
        let coords = coordinates_of(&indices, gs);
        prop_assert_eq!(indices_of(&coords, gs).unwrap(), indices);
    }

    #[test]
    fn random_landscape_respects_bounds(seed in any::<u64>(), lo in -10.0f64..10.0, span in 0.0f64..5.0) {
        let hi = lo + span;
        let field = generate(8, lo, hi, &LandscapeMethod::Random, &mut seeded_rng(Some(seed))).unwrap();
        prop_assert!(field.min() >= lo && field.max() <= hi);
    }

    #[test]
    fn perlin_landscape_is_seamless(seed in any::<u64>(), scale in prop::sample::select(vec![1usize, 2, 3, 4, 6])) {
        let field = generate(
            12,
            -1.0,
            1.0,
            &LandscapeMethod::Perlin { scale, seamless: true },
            &mut seeded_rng(Some(seed)),
        )
        .unwrap();
        let v = field.values();
        for i in 0..12 {
            prop_assert!((v[[0, i]] - v[[11, i]]).abs() < 1e-9);
            prop_assert!((v[[i, 0]] - v[[i, 11]]).abs() < 1e-9);
        }
        prop_assert!(field.min() >= -1.0 && field.max() <= 1.0);
    }
}
