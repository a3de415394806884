//! Algebraic properties of single qubits, gates and entangled pairs

use std::f64::consts::{PI, TAU};

use proptest::prelude::*;
use qaboom::core::rng::seeded;
use qaboom::core::{EntangledPair, Gate, Half, MeasurementBasis, Qubit};
use qaboom::types::Axis;

fn axis() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)]
}

fn qubit() -> impl Strategy<Value = Qubit> {
    (0.0..=PI, 0.0..TAU).prop_map(|(theta, phi)| Qubit::from_bloch(theta, phi))
}

proptest! {
    #[test]
    fn gates_preserve_norm(q in qubit(), axis in axis(), angle in -TAU..TAU) {
        let rotated = q.apply_gate(&Gate::rotation(axis, angle));
        prop_assert!(rotated.is_normalized());
    }

    #[test]
    fn same_axis_rotations_compose(q in qubit(), axis in axis(), a in -PI..PI, b in -PI..PI) {
        let stepwise = q
            .apply_gate(&Gate::rotation(axis, a))
            .apply_gate(&Gate::rotation(axis, b));
        let direct = q.apply_gate(&Gate::rotation(axis, a + b));
        prop_assert!(stepwise.approx_eq(&direct));
    }

    #[test]
    fn basis_probabilities_sum_to_one(q in qubit(), base in qubit()) {
        let basis = MeasurementBasis::new(base);
        let total = q.measure_probability(&basis.base()) + q.measure_probability(&basis.ortho());
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collapse_lands_on_basis_state(q in qubit(), base in qubit(), sample in 0.0..1.0f64) {
        let basis = MeasurementBasis::new(base);
        let (collapsed, matched) = basis.collapse_with(&q, sample);
        let expected = if matched { basis.base() } else { basis.ortho() };
        prop_assert!(collapsed.approx_eq(&expected));
    }

    #[test]
    fn random_qubits_are_normalized(seed in any::<u64>()) {
        let mut rng = seeded(seed);
        for _ in 0..16 {
            prop_assert!(Qubit::random(&mut rng).is_normalized());
        }
    }

    #[test]
    fn double_ortho_is_identity(q in qubit()) {
        prop_assert!(q.ortho().ortho().approx_eq(&q));
    }

    #[test]
    fn half_turn_twice_is_identity(q in qubit(), axis in axis()) {
        let half_turn = Gate::rotation(axis, PI);
        let back = q.apply_gate(&half_turn).apply_gate(&half_turn);
        let (a, b) = (back.bloch(), q.bloch());
        prop_assert!(back.approx_eq(&q));
        prop_assert!((a.theta - b.theta).abs() < 1e-6);
    }

    #[test]
    fn fidelity_is_symmetric(a in qubit(), b in qubit()) {
        prop_assert!((a.fidelity(&b) - b.fidelity(&a)).abs() < 1e-9);
    }

    #[test]
    fn bloch_angles_stay_in_range(q in qubit()) {
        let coords = q.bloch();
        prop_assert!((0.0..=PI + 1e-9).contains(&coords.theta));
        prop_assert!((0.0..TAU).contains(&coords.phi));
    }

    #[test]
    fn entangled_gates_keep_unit_norm(ops in prop::collection::vec((axis(), -PI..PI, any::<bool>()), 0..8)) {
        let mut pair = EntangledPair::bell();
        for (axis, angle, first) in ops {
            let half = if first { Half::First } else { Half::Second };
            pair.apply_gate(half, &Gate::rotation(axis, angle));
        }
        prop_assert!((pair.norm_sqr() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn ortho_is_orthogonal_for_basis_states() {
    for q in Qubit::BASIS {
        assert!(q.fidelity(&q.ortho()) < 1e-12);
    }
}
