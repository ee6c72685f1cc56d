use std::collections::BTreeSet;

use dimstruct_clean::{
    outlier::OutlierTrimmer,
    patterns::PatternSet,
    prune::CorrelationPruner,
    select::VariableSelector,
    skew::SkewCorrector,
    table::{Column, NumericTable},
};
use dimstruct_stats::correlation::pearson;
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.9, -1000.0..1000.0_f64)
}

/// Tables of 1 to 5 columns spread over two tasks, 3 to 40 rows.
fn arb_table() -> impl Strategy<Value = NumericTable> {
    (3_usize..40)
        .prop_flat_map(|rows| prop::collection::vec(prop::collection::vec(cell(), rows), 1..6))
        .prop_map(|columns| {
            let rows = columns[0].len();
            let index = (0..rows).map(|i| format!("s{i}")).collect();
            let columns = columns
                .into_iter()
                .enumerate()
                .map(|(i, values)| Column::new(format!("task{}.m{i}", i % 2), values))
                .collect();
            NumericTable::new(index, columns).unwrap()
        })
}

proptest! {
    #[test]
    fn trimming_a_stable_table_changes_nothing(table in arb_table(), k in 0.5..4.0_f64) {
        let trimmer = OutlierTrimmer::new(k).unwrap();
        let (stable, _) = trimmer.trim_until_stable(&table).unwrap();
        let (again, report) = trimmer.trim(&stable).unwrap();
        prop_assert_eq!(report.total_trimmed(), 0);
        prop_assert_eq!(again, stable);
    }

    #[test]
    fn skew_classes_are_disjoint(table in arb_table(), threshold in 0.1..2.0_f64) {
        let corrector = SkewCorrector::new(threshold).unwrap();
        let (classes, _) = corrector.classify(&table).unwrap();
        for name in table.column_names() {
            let memberships = [&classes.positive, &classes.negative, &classes.untouched]
                .iter()
                .filter(|class| class.iter().any(|n| n == name))
                .count();
            prop_assert_eq!(memberships, 1, "{} is in {} classes", name, memberships);
        }
    }

    #[test]
    fn saved_columns_always_survive(
        names in prop::collection::btree_set("[a-c]{1,3}\\.[a-c]{1,3}", 1..12),
        drop in prop::collection::vec("[a-c]{1,2}", 0..4),
        saved in prop::collection::vec("[a-c]{1,2}", 0..4),
    ) {
        let index = vec!["s0".to_owned()];
        let columns = names.iter().map(|n| Column::from_values(n.clone(), [1.0])).collect();
        let table = NumericTable::new(index, columns).unwrap();
        let saved_set = PatternSet::compile(&saved).unwrap();
        let drop_set = PatternSet::compile(&drop).unwrap();
        let selector = VariableSelector::new(drop_set.clone(), saved_set.clone());

        let (selected, _) = selector.select(&table).unwrap();
        let kept = selected.column_names().collect::<BTreeSet<_>>();
        for name in &names {
            if saved_set.is_match(name) {
                prop_assert!(kept.contains(name.as_str()), "{} was dropped", name);
            } else {
                prop_assert_eq!(kept.contains(name.as_str()), !drop_set.is_match(name));
            }
        }
    }

    #[test]
    fn survivors_within_a_task_are_below_threshold(
        table in arb_table(),
        threshold in 0.2..0.99_f64,
    ) {
        let (pruned, _) = CorrelationPruner::new(threshold).unwrap().prune(&table).unwrap();
        for (_, positions) in pruned.task_groups() {
            for (i, &a) in positions.iter().enumerate() {
                for &b in &positions[i + 1..] {
                    let (a, b) = (&pruned.columns()[a], &pruned.columns()[b]);
                    if let Some(r) = pearson(a.values(), b.values()) {
                        prop_assert!(
                            r.abs() < threshold,
                            "{} and {} survived with r = {}", a.name(), b.name(), r
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn row_index_is_preserved(table in arb_table()) {
        let (trimmed, _) = OutlierTrimmer::default().trim(&table).unwrap();
        prop_assert_eq!(trimmed.index(), table.index());
        let (corrected, _) = SkewCorrector::default().correct(&table).unwrap();
        prop_assert_eq!(corrected.index(), table.index());
    }
}
