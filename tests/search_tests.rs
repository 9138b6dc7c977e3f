// tests/search_tests.rs

use kqbit::{
    BitOrder, GroverSearch, KqbitError, OracleRepresentation, SimulatorConfig, optimal_iterations,
};

const SHOTS: usize = 1000;

#[test]
fn test_three_qubit_two_marked_search() -> Result<(), KqbitError> {
    assert_eq!(optimal_iterations(2, 3)?, 1);

    let config = SimulatorConfig::new().with_seed(42);
    let outcome = GroverSearch::with_config(&["110", "111"], config)?.measure(SHOTS)?;

    assert_eq!(outcome.iterations(), 1);
    assert_eq!(outcome.counts().total(), SHOTS);
    assert!(outcome.marked_frequency() > 0.90, "{}", outcome.counts());
    for unmarked in ["000", "001", "010", "011", "100", "101"] {
        assert!(outcome.counts().frequency(unmarked) < 0.03, "{}", unmarked);
    }
    assert!((outcome.success_probability() - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_search_works_in_both_bit_orders() -> Result<(), KqbitError> {
    for order in [BitOrder::BigEndian, BitOrder::LittleEndian] {
        let config = SimulatorConfig::new().with_seed(3).with_bit_order(order);
        let outcome = GroverSearch::with_config(&["0110"], config)?.measure(SHOTS)?;
        assert_eq!(outcome.iterations(), 3);
        assert_eq!(outcome.best(), Some("0110"), "{:?}", order);
        assert!(outcome.success_probability() > 0.95);
    }
    Ok(())
}

#[test]
fn test_oracle_representations_agree() -> Result<(), KqbitError> {
    let config = SimulatorConfig::new().with_seed(11);
    let marked = ["00101", "11000", "01111"];
    let dense = GroverSearch::with_qubits(5, &marked, config)?.measure(SHOTS)?;
    let diagonal = GroverSearch::with_qubits(5, &marked, config)?
        .with_oracle_representation(OracleRepresentation::Diagonal)
        .measure(SHOTS)?;
    assert_eq!(dense.iterations(), diagonal.iterations());
    assert!((dense.success_probability() - diagonal.success_probability()).abs() < 1e-12);
    assert_eq!(dense.counts(), diagonal.counts());
    Ok(())
}

#[test]
fn test_validation_mode_accepts_search_operators() -> Result<(), KqbitError> {
    let config = SimulatorConfig::new()
        .with_seed(1)
        .with_unitarity_validation(true);
    let outcome = GroverSearch::with_config(&["1010"], config)?.measure(100)?;
    assert!(outcome.success_probability() > 0.9);
    Ok(())
}

#[test]
fn test_invalid_marked_sets_are_rejected() {
    let config = SimulatorConfig::default();
    assert!(matches!(
        GroverSearch::with_config(&["110", "11"], config),
        Err(KqbitError::InvalidMarkedState { .. })
    ));
    assert!(matches!(
        GroverSearch::with_qubits(4, &["110"], config),
        Err(KqbitError::InvalidMarkedState { .. })
    ));
    assert!(matches!(
        GroverSearch::with_config(&["1x0"], config),
        Err(KqbitError::InvalidMarkedState { .. })
    ));
    assert!(matches!(
        GroverSearch::with_config(&["00", "01", "10", "11"], config),
        Err(KqbitError::InvalidMarkedState { .. })
    ));
    assert!(matches!(
        GroverSearch::with_config(&[""], config),
        Err(KqbitError::InvalidQubitCount(0))
    ));
}

#[test]
fn test_probabilities_report_marked_support() -> Result<(), KqbitError> {
    let outcome = GroverSearch::new(&["01"])?.measure(10)?;
    let probabilities = outcome.probabilities();
    assert!((probabilities["01"] - 1.0).abs() < 1e-9);
    assert_eq!(outcome.marked(), ["01".to_string()]);
    Ok(())
}
