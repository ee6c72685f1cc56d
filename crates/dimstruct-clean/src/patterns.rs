//! Curated column-pattern tables and their compiled form
//!
//! The default drop set is configuration data, not logic: each
//! [`PatternGroup`] names one reason a variable is excluded from the
//! second-stage analysis. Editing any pattern changes which variables reach
//! factor analysis, so the tables are versioned by
//! [`DEFAULT_PATTERNS_VERSION`].
//!
//! Patterns are regular expressions searched anywhere in a column name (not
//! anchored unless the pattern says so). [`PatternSet::compile`] validates
//! every pattern up front and reports the first malformed one.

use regex::{Regex, RegexSet};

use crate::error::ConfigurationError;

/// Version of the curated default tables below.
pub const DEFAULT_PATTERNS_VERSION: u32 = 1;

/// A named list of patterns sharing one exclusion reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternGroup {
    pub name: &'static str,
    pub description: &'static str,
    pub patterns: &'static [&'static str],
}

/// Metrics computed for every task regardless of their interest.
pub const BASIC_DERIVED: PatternGroup = PatternGroup {
    name: "basic_derived",
    description: "generic per-task metrics computed without regard to their interest",
    patterns: &[
        r"\.missed_percent$",
        r"\.acc$",
        r"\.avg_rt_error$",
        r"\.std_rt_error$",
        r"\.avg_rt$",
        r"\.std_rt$",
    ],
};

/// Metrics of theoretical interest that are not yet trusted for the second stage.
pub const EXPLORATORY: PatternGroup = PatternGroup {
    name: "exploratory",
    description: "metrics of theoretical interest not certain enough for second-stage analysis",
    patterns: &[r"\.congruency_seq", r"\.post_error_slowing$"],
};

/// Task variables that duplicate other dependent variables or are of no interest.
pub const TASK_REDUNDANT: PatternGroup = PatternGroup {
    name: "task_redundant",
    description: "task variables correlated with other dependent variables or of no interest",
    patterns: &[
        // demographics
        "demographics",
        // angling risk task
        "(keep|release)_loss_percent",
        // bis11
        ".first_order",
        "bis11_survey.total",
        "bis_bas_survey.BAS_total",
        // dietary decision
        "dietary_decision.prop_healthy_choice",
        // dot pattern expectancy
        "dot_pattern_expectancy.*errors",
        "eating_survey.total",
        "five_facet_mindfulness_survey.total",
        // holt and laury
        r"\.risky_choices$",
        r"\.number_of_switches",
        // information sampling task
        "boxes_opened$",
        "_total_points$",
        // go/no-go
        r"\.go_acc$",
        r"\.nogo_acc$",
        r"\.go_rt$",
        "go_nogo.*error.*",
        // delay discounting; the second entry is a single joined pattern,
        // kept verbatim so selections match earlier runs
        "discount_titrate.hyp_discount_rate",
        "discount_titrate.hyp_discount_rate_(glm|nm)kirby.percent_patient",
        "kirby.hyp_discount_rate$",
        "kirby.exp_discount.*",
        r"\.warnings$",
        "_notnow$",
        "_now$",
        // bickel
        "auc",
        "local_global_letter.*error.*",
        "PRP_slowing",
        // shape matching
        "shape_matching.*prim.*",
        "sensation_seeking_survey.total",
        "DDS",
        "DNN",
        "DSD",
        "SDD",
        "SSS",
        "DDD",
        "stimulus_interference_rt",
        // shift task
        "shift_task.*errors",
        "shift_task.model_fit",
        "shift_task.conceptual_responses",
        "shift_task.fail_to_maintain_set",
        "shift_task.perseverative_responses",
        // stop signal
        "go_acc",
        "stop_acc",
        "go_rt_error",
        "go_rt_std_error",
        "go_rt",
        "go_rt_std",
        "stop_rt_error",
        "stop_rt_error_std",
        "SS_delay",
        "^stop_signal.SSRT$",
        "stop_signal.*errors",
        "inhibition_slope",
        "stroop.*errors",
        "threebytwo.*inhibition",
        // tower of london
        "num_correct",
        "weighted_performance_score",
        // writing task
        "sentiment_label",
        // trial counts
        "num_trials",
        "num_stop_trials",
    ],
};

/// Goodness-of-fit indices reported next to fitted task parameters.
pub const MODEL_FIT: PatternGroup = PatternGroup {
    name: "model_fit",
    description: "model fit indices",
    patterns: &["log_ll", "match_pct", "min_rss"],
};

/// Drift-diffusion parameters that duplicate the retained DDM estimates.
pub const DDM_NUISANCE: PatternGroup = PatternGroup {
    name: "ddm_nuisance",
    description: "unnecessary EZ/HDDM drift-diffusion parameters",
    patterns: &[r".*\.(EZ|hddm)_(drift|thresh|non_decision).+$"],
};

/// The groups unioned into the default drop set.
pub const DEFAULT_PATTERN_GROUPS: &[PatternGroup] =
    &[BASIC_DERIVED, EXPLORATORY, TASK_REDUNDANT, MODEL_FIT, DDM_NUISANCE];

/// Iterates over every pattern of the default drop set.
pub fn default_drop_patterns() -> impl Iterator<Item = &'static str> {
    DEFAULT_PATTERN_GROUPS
        .iter()
        .flat_map(|group| group.patterns.iter().copied())
}

/// A named pair of drop and saved pattern lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub drop: &'static [&'static str],
    pub saved: &'static [&'static str],
}

/// Behavioral tasks only: drops surveys but keeps the two survey-like
/// instruments scored as tasks.
pub const TASK_BATTERY: Preset = Preset {
    name: "task",
    drop: &["survey"],
    saved: &["holt", "cognitive_reflection"],
};

pub const PRESETS: &[Preset] = &[TASK_BATTERY];

/// Looks up a preset by name.
#[must_use]
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// A validated, compiled list of column patterns.
///
/// # Examples
///
/// ```
/// use dimstruct_clean::patterns::PatternSet;
///
/// let set = PatternSet::compile(["\\.acc$", "survey"]).unwrap();
/// assert!(set.is_match("stroop.acc"));
/// assert!(set.is_match("grit_survey.total"));
/// assert!(!set.is_match("stroop.acc_diff"));
///
/// assert!(PatternSet::compile(["(unclosed"]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<String>,
    set: RegexSet,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternSet {
    /// Compiles `patterns`, failing on the first malformed one.
    pub fn compile<I, S>(patterns: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<Vec<_>>();
        for pattern in &patterns {
            Regex::new(pattern).map_err(|source| ConfigurationError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        let set = RegexSet::new(&patterns).map_err(|source| ConfigurationError::InvalidPattern {
            pattern: patterns.join("|"),
            source,
        })?;
        Ok(Self { patterns, set })
    }

    /// The curated default drop set.
    pub fn default_drop() -> Result<Self, ConfigurationError> {
        Self::compile(default_drop_patterns())
    }

    /// Patterns matching exactly the given names and nothing else.
    ///
    /// ```
    /// use dimstruct_clean::patterns::PatternSet;
    ///
    /// let set = PatternSet::exact(["stroop.rt"]).unwrap();
    /// assert!(set.is_match("stroop.rt"));
    /// assert!(!set.is_match("stroopXrt"));
    /// assert!(!set.is_match("stroop.rt.logTr"));
    /// ```
    pub fn exact<I, S>(names: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile(
            names
                .into_iter()
                .map(|name| format!("^{}$", regex::escape(name.as_ref()))),
        )
    }

    /// A set that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: vec![],
            set: RegexSet::empty(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether any pattern matches somewhere in `name`.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// The patterns that match `name`.
    pub fn matching<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.set
            .matches(name)
            .into_iter()
            .map(|i| self.patterns[i].as_str())
    }
}
