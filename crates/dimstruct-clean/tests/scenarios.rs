use dimstruct_clean::{
    CleanError,
    outlier::OutlierTrimmer,
    prune::CorrelationPruner,
    select::VariableSelector,
    skew::SkewCorrector,
    table::{Column, NumericTable},
};

fn table(columns: Vec<Column>) -> NumericTable {
    let rows = columns.first().map_or(0, |c| c.values().len());
    let index = (0..rows).map(|i| format!("sub{i:03}")).collect();
    NumericTable::new(index, columns).unwrap()
}

fn names(table: &NumericTable) -> Vec<&str> {
    table.column_names().collect()
}

#[test]
fn extreme_value_is_trimmed() {
    let input = table(vec![Column::from_values(
        "task.x",
        [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
    )]);
    let (trimmed, report) = OutlierTrimmer::new(2.5).unwrap().trim(&input).unwrap();

    let values = trimmed.column("task.x").unwrap().values();
    assert_eq!(
        values,
        [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), None]
    );
    assert_eq!(report.total_trimmed(), 1);
    assert!(report.insufficient.is_empty());
}

#[test]
fn positively_skewed_column_is_log_transformed() {
    let input = table(vec![Column::from_values(
        "task.x",
        [1.0, 1.0, 1.0, 1.0, 1.0, 50.0],
    )]);
    let (corrected, report) = SkewCorrector::new(1.0).unwrap().correct(&input).unwrap();

    assert_eq!(names(&corrected), ["task.x.logTr"]);
    assert!(corrected.column("task.x").is_none());
    assert_eq!(report.positive.transformed, ["task.x"]);
    // min is 1, so no shift: ln(1) = 0
    let column = corrected.column("task.x.logTr").unwrap();
    assert_eq!(column.values()[0], Some(0.0));
    assert!((column.values()[5].unwrap() - 50.0_f64.ln()).abs() < 1e-12);
}

#[test]
fn first_of_correlated_pair_survives_in_input_order() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let y = [1.1, 1.9, 3.2, 3.9, 5.1, 6.0];
    let pruner = CorrelationPruner::new(0.85).unwrap();

    let xy = table(vec![
        Column::from_values("taskA.x", x),
        Column::from_values("taskA.y", y),
    ]);
    let (pruned, report) = pruner.prune(&xy).unwrap();
    assert_eq!(names(&pruned), ["taskA.x"]);
    assert_eq!(report.removed, ["taskA.y"]);

    let yx = table(vec![
        Column::from_values("taskA.y", y),
        Column::from_values("taskA.x", x),
    ]);
    let (pruned, report) = pruner.prune(&yx).unwrap();
    assert_eq!(names(&pruned), ["taskA.y"]);
    assert_eq!(report.removed, ["taskA.x"]);
}

#[test]
fn saved_pattern_beats_drop_pattern() {
    let input = table(vec![
        Column::from_values("foo", [1.0]),
        Column::from_values("foobar", [2.0]),
        Column::from_values("baz", [3.0]),
    ]);
    let selector = VariableSelector::from_patterns(&["foo"], &["foobar"]).unwrap();
    let (selected, _) = selector.select(&input).unwrap();
    assert_eq!(names(&selected), ["baz", "foobar"]);
}

#[test]
fn sparse_column_is_reported_or_rejected() {
    let sparse = Column::new(
        "task.sparse",
        vec![Some(1.0), None, None, None, Some(500.0), None],
    );
    let input = table(vec![
        sparse.clone(),
        Column::from_values("task.dense", [1.0, 2.0, 3.0, 4.0, 5.0, 100.0]),
    ]);

    let (trimmed, report) = OutlierTrimmer::default().trim(&input).unwrap();
    assert_eq!(trimmed.column("task.sparse"), Some(&sparse));
    assert_eq!(report.insufficient.len(), 1);
    assert_eq!(report.insufficient[0].column, "task.sparse");
    assert_eq!(report.insufficient[0].observed, 2);
    assert_eq!(trimmed.get("sub005", "task.dense"), None);

    let err = OutlierTrimmer::default()
        .strict(true)
        .trim(&input)
        .unwrap_err();
    assert_eq!(err.column, "task.sparse");

    let strict_corrector =
        SkewCorrector::default().with_trimmer(OutlierTrimmer::default().strict(true));
    assert!(matches!(
        strict_corrector.correct(&input),
        Err(CleanError::InsufficientData(_))
    ));
}
