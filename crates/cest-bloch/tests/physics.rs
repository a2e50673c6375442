//! Physical behaviour of the two- and three-pool models.

use cest_bloch::{
    BlochError, Irradiation, ThirdPoolOffset, ThreePoolPartial, TwoPool, Vector6, Vector9,
};
use cest_core::Species;
use std::f64::consts::TAU;

const W0_3T: f64 = TAU * 128e6;

fn water() -> Species {
    Species::new(1.0, 0.1, 0.0, 1.0).unwrap()
}

fn solute() -> Species {
    Species::new(1.0, 0.01, -3.0, 0.001).unwrap()
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn relaxes_to_equilibrium_from_any_state() {
    let model = TwoPool::new(water(), solute(), 0.0).unwrap();
    let irr = Irradiation::new(W0_3T, 2.0);
    let mut m = Vector6::new(0.3, -0.4, -0.8, 0.0005, 0.0002, -0.001);
    for _ in 0..12 {
        m = model.evolve(&irr, 0.0, 2.0, &m).unwrap();
    }
    let eq = model.equilibrium();
    for i in 0..6 {
        assert!((m[i] - eq[i]).abs() < 1e-8, "component {i}: {}", m[i]);
    }
}

#[test]
fn exchange_without_rf_keeps_equilibrium_populations() {
    let model = TwoPool::new(water(), solute(), 500.0).unwrap();
    let irr = Irradiation::new(W0_3T, 0.0);

    let ss = model.steady_state(&irr, 0.0).unwrap();
    assert!(close(ss[2], 1.0, 1e-12));
    assert!(close(ss[5], 0.001, 1e-12));
    assert!(close(ss[2] / ss[5], water().m0() / solute().m0(), 1e-9));

    // Long-duration limit from a perturbed start matches the same ratio.
    let start = Vector6::new(0.0, 0.0, 0.2, 0.0, 0.0, 0.0);
    let m = model.evolve(&irr, 0.0, 40.0, &start).unwrap();
    assert!(close(m[2] / m[5], 1000.0, 1e-6));
}

#[test]
fn zero_duration_is_identity() {
    let model = TwoPool::new(water(), solute(), 20.0).unwrap();
    let irr = Irradiation::new(W0_3T, -3.0);
    let m = Vector6::new(0.1, 0.2, 0.9, 0.0001, -0.0003, 0.0007);
    let after = model.evolve(&irr, TAU * 20.0, 0.0, &m).unwrap();
    assert!((after - m).amax() < 1e-12);

    let p = model.build_propagator(&irr, TAU * 20.0, 0.0).unwrap();
    assert!((p - cest_bloch::Matrix7::identity()).amax() < 1e-12);
}

#[test]
fn saturation_transfer_attenuates_bulk_magnetization() {
    let irr = Irradiation::new(W0_3T, -3.0);
    let w1 = TAU * 20.0;
    let start = Vector6::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);

    let exchanging = TwoPool::new(water(), solute(), 20.0).unwrap();
    let isolated = TwoPool::new(water(), solute(), 0.0).unwrap();

    let with_exchange = exchanging.evolve(&irr, w1, 2.0, &start).unwrap();
    let without_exchange = isolated.evolve(&irr, w1, 2.0, &start).unwrap();

    let cest_effect = without_exchange[2] - with_exchange[2];
    assert!(cest_effect > 5e-3, "CEST effect too small: {cest_effect}");
    assert!(with_exchange[2] > 0.0 && with_exchange[2] < 1.0);
}

#[test]
fn saturation_is_strongest_on_solute_resonance() {
    let model = TwoPool::new(water(), solute(), 200.0).unwrap();
    let w1 = TAU * 50.0;
    let on = model
        .evolve(&Irradiation::new(W0_3T, -3.0), w1, 2.0, &model.equilibrium())
        .unwrap();
    let mirror = model
        .evolve(&Irradiation::new(W0_3T, 3.0), w1, 2.0, &model.equilibrium())
        .unwrap();
    assert!(on[2] < mirror[2]);
}

#[test]
fn three_pool_with_decoupled_third_pool_matches_two_pool() {
    let c = Species::new(0.8, 0.02, 2.0, 0.003).unwrap();
    let two = TwoPool::new(water(), solute(), 20.0).unwrap();
    let three = ThreePoolPartial::new(water(), solute(), c, 20.0, 0.0).unwrap();
    let irr = Irradiation::new(W0_3T, -3.0);

    let start2 = Vector6::new(0.05, 0.0, 0.95, 0.0, 0.0, 0.0009);
    let mut start3 = three.equilibrium();
    start3.rows_mut(0, 6).copy_from(&start2);

    // Without RF, the decoupled pool stays at its initial (equilibrium) state.
    let r2 = two.evolve(&irr, 0.0, 1.5, &start2).unwrap();
    let r3 = three.evolve(&irr, 0.0, 1.5, &start3).unwrap();
    for i in 0..6 {
        assert!(close(r2[i], r3[i], 1e-9));
    }
    for i in 6..9 {
        assert!(close(r3[i], start3[i], 1e-12));
    }

    // With RF, pools A and B still match the two-pool result.
    let r2 = two.evolve(&irr, TAU * 20.0, 1.5, &start2).unwrap();
    let r3 = three.evolve(&irr, TAU * 20.0, 1.5, &start3).unwrap();
    for i in 0..6 {
        assert!(close(r2[i], r3[i], 1e-9));
    }
}

#[test]
fn third_pool_offset_regression() {
    // Carrier on pool C (3.5 ppm); pool B sits at 2.0 ppm.
    let model = ThreePoolPartial::new(
        Species::new(1.2, 0.04, 0.0, 1.0).unwrap(),
        Species::new(1.2, 0.007, 2.0, 0.002).unwrap(),
        Species::new(1.2, 0.01, 3.5, 0.001).unwrap(),
        810.0,
        22.0,
    )
    .unwrap();
    let irr = Irradiation::new(TAU * 300e6, 3.5);
    let w1 = TAU * 30.0;

    let own = model.evolve(&irr, w1, 2.0, &model.equilibrium()).unwrap();
    let legacy = model
        .with_c_offset(ThirdPoolOffset::SecondPool)
        .evolve(&irr, w1, 2.0, &model.equilibrium())
        .unwrap();

    // Own offset: C is irradiated on resonance and saturates.
    assert!(own[8] / 0.001 < 0.5, "Mzc/M0c = {}", own[8] / 0.001);
    // Legacy offset: C precesses 1.5 ppm away from the carrier and barely saturates.
    assert!(legacy[8] / 0.001 > 0.9, "Mzc/M0c = {}", legacy[8] / 0.001);
}

#[test]
fn shaped_pulse_of_one_sample_matches_single_step() {
    let model = TwoPool::new(water(), solute(), 20.0).unwrap();
    let irr = Irradiation::new(W0_3T, -3.0);
    let w1 = TAU * 20.0;

    let reduced = model.evolve_shaped(&irr, &[w1], 0.25, &model.equilibrium()).unwrap();
    let single = model.evolve(&irr, w1, 0.25, &model.equilibrium()).unwrap();
    assert!((reduced - single).amax() < 1e-12);

    let projective = model
        .evolve_shaped_projective(&irr, &[w1], 0.25, &model.equilibrium_projective())
        .unwrap();
    let direct = model.build_propagator(&irr, w1, 0.25).unwrap() * model.equilibrium_projective();
    assert!((projective - direct).amax() < 1e-12);
}

#[test]
fn three_pool_shaped_forms_agree() {
    let model = ThreePoolPartial::new(
        water(),
        solute(),
        Species::new(1.0, 0.02, 2.0, 0.002).unwrap(),
        20.0,
        300.0,
    )
    .unwrap();
    let irr = Irradiation::new(W0_3T, 2.0);
    let pulse = [0.0, TAU * 10.0, TAU * 40.0, TAU * 10.0, 0.0];

    let reduced = model.evolve_shaped(&irr, &pulse, 0.05, &model.equilibrium()).unwrap();
    let projective = model
        .evolve_shaped_projective(&irr, &pulse, 0.05, &model.equilibrium_projective())
        .unwrap();
    for i in 0..9 {
        assert!(close(reduced[i], projective[i], 1e-9));
    }
    assert!(reduced[2] < 1.0);
    assert_eq!(
        model.evolve_shaped(&irr, &[], 0.05, &Vector9::zeros()),
        Err(BlochError::EmptyPulse)
    );
}

#[test]
fn concurrent_calls_are_independent() {
    let model = TwoPool::new(water(), solute(), 20.0).unwrap();
    let offsets: Vec<f64> = (-5..=5).map(f64::from).collect();

    let serial: Vec<f64> = offsets
        .iter()
        .map(|&ppm| {
            model
                .evolve(&Irradiation::new(W0_3T, ppm), TAU * 20.0, 1.0, &model.equilibrium())
                .unwrap()[2]
        })
        .collect();

    let threaded: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = offsets
            .iter()
            .map(|&ppm| {
                scope.spawn(move || {
                    model
                        .evolve(&Irradiation::new(W0_3T, ppm), TAU * 20.0, 1.0, &model.equilibrium())
                        .map(|m| m[2])
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(serial, threaded);
}
