//! Composition of the cleaning stages
//!
//! Stages run in a fixed order: pattern selection, skew correction (which
//! trims outliers internally), then correlation pruning. Adequacy gates are
//! evaluated on the result.

use serde::Serialize;

use crate::{
    adequacy::{AdequacyGate, AdequacyVerdict, BoxedAdequacyGate, SampleSizeGate},
    config::CleaningConfig,
    error::{CleanError, ConfigurationError},
    handoff::{DistanceMetric, EfaHandoff, RunId},
    outlier::OutlierTrimmer,
    prune::{CorrelationPruner, PruneReport},
    select::{SelectionReport, VariableSelector},
    skew::{SkewCorrector, SkewReport},
    table::NumericTable,
};

/// Every decision taken by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub selection: SelectionReport,
    pub skew: SkewReport,
    pub prune: PruneReport,
    pub adequacy: Vec<AdequacyVerdict>,
}

/// Output of [`CleaningPipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    pub table: NumericTable,
    pub report: CleaningReport,
}

impl CleanedTable {
    /// Whether every adequacy gate passed.
    #[must_use]
    pub fn is_adequate(&self) -> bool {
        self.report.adequacy.iter().all(|v| v.passed)
    }
}

/// Select, skew-correct and prune a table.
///
/// # Examples
///
/// ```
/// use dimstruct_clean::{
///     config::CleaningConfig,
///     pipeline::CleaningPipeline,
///     table::{Column, NumericTable},
/// };
///
/// let index = (0..6).map(|i| format!("s{i}")).collect();
/// let table = NumericTable::new(
///     index,
///     vec![
///         Column::from_values("stroop.acc", [0.9, 0.8, 0.95, 0.85, 0.9, 0.7]),
///         Column::from_values("stroop.stroop_rt", [1.0, 1.0, 1.0, 1.0, 1.0, 50.0]),
///     ],
/// )
/// .unwrap();
///
/// let pipeline = CleaningPipeline::from_config(&CleaningConfig::default()).unwrap();
/// let cleaned = pipeline.run(&table).unwrap();
/// assert_eq!(
///     cleaned.table.column_names().collect::<Vec<_>>(),
///     ["stroop.stroop_rt.logTr"],
/// );
/// assert_eq!(cleaned.report.selection.dropped, ["stroop.acc"]);
/// ```
#[derive(Debug, Clone)]
pub struct CleaningPipeline {
    selector: VariableSelector,
    corrector: SkewCorrector,
    pruner: CorrelationPruner,
    gates: Vec<BoxedAdequacyGate>,
    dist_metric: DistanceMetric,
    boot_iter: usize,
}

impl CleaningPipeline {
    pub fn from_config(config: &CleaningConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let trimmer = OutlierTrimmer::new(config.quantile_multiplier)?.strict(config.strict);
        let selector = VariableSelector::from_patterns(&config.drop_patterns, &config.saved_patterns)?
            .strict(config.strict)
            .verbose(config.verbose);
        let corrector = SkewCorrector::new(config.skew_threshold)?
            .with_trimmer(trimmer)
            .with_override(config.positive_skew.clone(), config.negative_skew.clone())?
            .verbose(config.verbose);
        let pruner = CorrelationPruner::new(config.correlation_threshold)?.verbose(config.verbose);
        let sample_size = SampleSizeGate::new(config.min_rows, config.min_rows_per_column);
        Ok(Self {
            selector,
            corrector,
            pruner,
            gates: vec![Box::new(sample_size)],
            dist_metric: config.dist_metric,
            boot_iter: config.boot_iter,
        })
    }

    /// Adds a gate evaluated after cleaning.
    #[must_use]
    pub fn with_gate<G>(mut self, gate: G) -> Self
    where
        G: AdequacyGate + 'static,
    {
        self.gates.push(Box::new(gate));
        self
    }

    /// Removes every gate, including the built-in sample-size gate.
    #[must_use]
    pub fn without_gates(self) -> Self {
        Self {
            gates: vec![],
            ..self
        }
    }

    #[must_use]
    pub fn selector(&self) -> &VariableSelector {
        &self.selector
    }

    #[must_use]
    pub fn corrector(&self) -> &SkewCorrector {
        &self.corrector
    }

    #[must_use]
    pub fn pruner(&self) -> &CorrelationPruner {
        &self.pruner
    }

    pub fn run(&self, table: &NumericTable) -> Result<CleanedTable, CleanError> {
        let (selected, selection) = self.selector.select(table)?;
        log::debug!(
            "selection kept {} of {} columns",
            selected.n_columns(),
            table.n_columns()
        );
        let (corrected, skew) = self.corrector.correct(&selected)?;
        let (pruned, prune) = self.pruner.prune(&corrected)?;
        let adequacy = self.check_gates(&pruned);
        Ok(CleanedTable {
            table: pruned,
            report: CleaningReport {
                selection,
                skew,
                prune,
                adequacy,
            },
        })
    }

    /// Cleans another variant of the same data, typically the non-imputed
    /// one, with the decisions recorded in `cleaned` instead of its own.
    ///
    /// The result carries the same columns as `cleaned.table`: skewness and
    /// correlations are not measured again. Adequacy gates are evaluated on
    /// the new table.
    pub fn replay(
        &self,
        cleaned: &CleanedTable,
        table: &NumericTable,
    ) -> Result<CleanedTable, CleanError> {
        let corrected = cleaned.report.skew.apply(table)?;
        let pruned = cleaned.report.prune.apply(&corrected);
        let adequacy = self.check_gates(&pruned);
        Ok(CleanedTable {
            table: pruned,
            report: CleaningReport {
                adequacy,
                ..cleaned.report.clone()
            },
        })
    }

    fn check_gates(&self, table: &NumericTable) -> Vec<AdequacyVerdict> {
        let adequacy = self
            .gates
            .iter()
            .map(|gate| gate.check(table))
            .collect::<Vec<_>>();
        for verdict in adequacy.iter().filter(|v| !v.passed) {
            log::warn!("adequacy gate '{}' failed: {}", verdict.gate, verdict.detail);
        }
        adequacy
    }

    /// Packages cleaned tables for factor analysis with this pipeline's
    /// metric and bootstrap settings.
    pub fn handoff(
        &self,
        data: CleanedTable,
        unimputed: Option<CleanedTable>,
        run_id: RunId,
    ) -> Result<EfaHandoff, CleanError> {
        let mut handoff = EfaHandoff::new(data.table)
            .dist_metric(self.dist_metric)
            .boot_iter(self.boot_iter)
            .run_id(run_id);
        if let Some(unimputed) = unimputed {
            handoff = handoff.with_unimputed(unimputed.table)?;
        }
        Ok(handoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DataShapeError, table::Column};

    #[derive(Debug, Clone, Copy)]
    struct AlwaysFails;

    impl AdequacyGate for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn clone_boxed(&self) -> BoxedAdequacyGate {
            Box::new(*self)
        }

        fn check(&self, _table: &NumericTable) -> AdequacyVerdict {
            AdequacyVerdict {
                gate: self.name().to_owned(),
                passed: false,
                detail: "rejected".to_owned(),
            }
        }
    }

    fn table() -> NumericTable {
        let index = (0..8).map(|i| format!("s{i}")).collect();
        NumericTable::new(
            index,
            vec![
                Column::from_values("stroop.rt_a", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                Column::from_values("stroop.rt_b", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.5]),
                Column::from_values("grit_survey.total", [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_stages_compose() {
        let config = CleaningConfig {
            drop_patterns: vec!["survey".to_owned()],
            min_rows: 1,
            min_rows_per_column: 1.0,
            ..CleaningConfig::default()
        };
        let cleaned = CleaningPipeline::from_config(&config)
            .unwrap()
            .run(&table())
            .unwrap();
        assert_eq!(
            cleaned.table.column_names().collect::<Vec<_>>(),
            ["stroop.rt_a"]
        );
        assert_eq!(cleaned.report.selection.dropped, ["grit_survey.total"]);
        assert_eq!(cleaned.report.prune.removed, ["stroop.rt_b"]);
        assert!(cleaned.is_adequate());
        assert_eq!(cleaned.table.index(), table().index());
    }

    #[test]
    fn test_custom_gate_reported() {
        let config = CleaningConfig {
            drop_patterns: vec!["survey".to_owned()],
            ..CleaningConfig::default()
        };
        let cleaned = CleaningPipeline::from_config(&config)
            .unwrap()
            .without_gates()
            .with_gate(AlwaysFails)
            .run(&table())
            .unwrap();
        assert_eq!(cleaned.report.adequacy.len(), 1);
        assert!(!cleaned.is_adequate());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CleaningConfig {
            skew_threshold: 0.0,
            ..CleaningConfig::default()
        };
        assert!(CleaningPipeline::from_config(&config).is_err());
    }

    #[test]
    fn test_replay_keeps_imputed_columns() {
        let index = (0..8).map(|i| format!("s{i}")).collect::<Vec<_>>();
        let rt_a = Column::from_values("stroop.rt_a", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let imputed = NumericTable::new(
            index.clone(),
            vec![
                rt_a.clone(),
                Column::from_values("stroop.rt_b", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.5]),
                Column::from_values("stroop.spike", [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0]),
            ],
        )
        .unwrap();
        let unimputed = NumericTable::new(
            index,
            vec![
                rt_a,
                Column::new(
                    "stroop.rt_b",
                    vec![Some(1.0), None, Some(1.0), Some(1.0), None, Some(1.0), Some(1.0), Some(40.0)],
                ),
                Column::new(
                    "stroop.spike",
                    vec![Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(50.0)],
                ),
            ],
        )
        .unwrap();
        let config = CleaningConfig {
            drop_patterns: vec!["survey".to_owned()],
            min_rows: 1,
            min_rows_per_column: 1.0,
            ..CleaningConfig::default()
        };
        let pipeline = CleaningPipeline::from_config(&config).unwrap();
        let cleaned = pipeline.run(&imputed).unwrap();
        let expected = ["stroop.rt_a", "stroop.spike.logTr"];
        assert_eq!(cleaned.table.column_names().collect::<Vec<_>>(), expected);

        // Cleaned on its own, the sparse variant would keep a different column.
        let independent = pipeline.run(&unimputed).unwrap();
        assert_eq!(
            independent.table.column_names().collect::<Vec<_>>(),
            ["stroop.rt_a", "stroop.rt_b.logTr"]
        );
        let handoff = pipeline.handoff(cleaned.clone(), Some(independent), RunId(1));
        assert!(matches!(
            handoff,
            Err(CleanError::DataShape(DataShapeError::ColumnMismatch { .. }))
        ));

        let replayed = pipeline.replay(&cleaned, &unimputed).unwrap();
        assert_eq!(replayed.table.column_names().collect::<Vec<_>>(), expected);
        assert_eq!(replayed.table.get("s1", "stroop.spike.logTr"), None);
        assert_eq!(replayed.table.get("s0", "stroop.spike.logTr"), Some(0.0));
        assert_eq!(replayed.report.skew, cleaned.report.skew);
        let handoff = pipeline
            .handoff(cleaned, Some(replayed), RunId(1))
            .unwrap();
        let manifest = handoff.manifest();
        assert_eq!(manifest.unimputed_columns, Some(manifest.columns));
    }

    #[test]
    fn test_handoff_carries_settings() {
        let config = CleaningConfig {
            drop_patterns: vec!["survey".to_owned()],
            dist_metric: DistanceMetric::Euclidean,
            boot_iter: 50,
            ..CleaningConfig::default()
        };
        let pipeline = CleaningPipeline::from_config(&config).unwrap();
        let imputed = pipeline.run(&table()).unwrap();
        let unimputed = pipeline.run(&table()).unwrap();
        let handoff = pipeline
            .handoff(imputed, Some(unimputed), RunId(1))
            .unwrap();
        assert_eq!(handoff.dist_metric, DistanceMetric::Euclidean);
        assert_eq!(handoff.boot_iter, 50);
        assert!(handoff.data_no_impute.is_some());
    }
}
