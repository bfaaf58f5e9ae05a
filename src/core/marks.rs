//! Module and semester mark aggregation.

use crate::core::classification::Classification;
use crate::core::weights::normalize_weights;
use crate::state::{Assessment, Module, clamp_number, finite_or_zero};

/// Aggregated mark of one module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleMark {
    /// `None` when the module has no active assessment.
    pub mark: Option<f64>,
    /// Raw sum of active assessment weights, before any normalization.
    pub weight_sum: f64,
}

/// Weighted mark over the active assessments, clamped into [0, 100].
///
/// A zero weight sum falls back to a denominator of 100 so untouched
/// assessments produce 0 rather than a division by zero.
pub fn module_mark(assessments: &[Assessment]) -> ModuleMark {
    let active: Vec<&Assessment> = assessments.iter().filter(|a| a.is_active()).collect();
    if active.is_empty() {
        return ModuleMark {
            mark: None,
            weight_sum: 0.0,
        };
    }

    let weight_sum: f64 = active.iter().map(|a| finite_or_zero(a.weight)).sum();
    let denom = if weight_sum > 0.0 { weight_sum } else { 100.0 };
    let weighted: f64 = active
        .iter()
        .map(|a| finite_or_zero(a.mark) * (finite_or_zero(a.weight) / denom))
        .sum();

    ModuleMark {
        mark: Some(clamp_number(weighted, 0.0, 100.0)),
        weight_sum,
    }
}

/// A counted module together with its derived figures.
#[derive(Debug, Clone, Copy)]
pub struct ModuleResult<'a> {
    pub module: &'a Module,
    /// Position in the original module list.
    pub index: usize,
    pub mark: Option<f64>,
    pub assessment_weight_sum: f64,
    /// Share of the semester after normalizing module weights.
    pub semester_share: f64,
}

/// Derived semester figures; recomputed from the state on every read.
#[derive(Debug, Clone)]
pub struct SemesterStats<'a> {
    /// `None` when no module counts.
    pub average: Option<f64>,
    pub classification: Classification,
    /// Counted modules in original order.
    pub modules: Vec<ModuleResult<'a>>,
    /// Counted modules by descending mark, ties kept in original order.
    pub ranked: Vec<ModuleResult<'a>>,
    pub best: Option<ModuleResult<'a>>,
    pub count: usize,
}

impl SemesterStats<'_> {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Aggregate every counted module into a semester average.
pub fn semester_stats(modules: &[Module]) -> SemesterStats<'_> {
    let counted: Vec<(usize, &Module)> = modules
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_counted())
        .collect();

    if counted.is_empty() {
        return SemesterStats {
            average: None,
            classification: Classification::Unclassified,
            modules: Vec::new(),
            ranked: Vec::new(),
            best: None,
            count: 0,
        };
    }

    let shares = normalize_weights(&counted, |(_, m)| m.weight);
    let results: Vec<ModuleResult<'_>> = shares
        .iter()
        .map(|share| {
            let (index, module) = *share.item;
            let computed = module_mark(&module.assessments);
            ModuleResult {
                module,
                index,
                mark: computed.mark,
                assessment_weight_sum: computed.weight_sum,
                semester_share: share.percent,
            }
        })
        .collect();

    let weighted: f64 = results
        .iter()
        .map(|r| r.mark.unwrap_or(0.0) * (r.semester_share / 100.0))
        .sum();
    let average = clamp_number(weighted, 0.0, 100.0);

    let mut ranked = results.clone();
    // sort_by is stable, so equal marks keep their input order.
    ranked.sort_by(|a, b| b.mark.unwrap_or(0.0).total_cmp(&a.mark.unwrap_or(0.0)));
    let best = ranked.iter().find(|r| r.mark.is_some()).copied();

    tracing::trace!(count = results.len(), average, "aggregated semester");

    SemesterStats {
        average: Some(average),
        classification: Classification::from_average(Some(average)),
        count: results.len(),
        modules: results,
        ranked,
        best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::weights::even_split;
    use crate::state::AssessmentKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn assessment(weight: f64, mark: f64) -> Assessment {
        let mut a = Assessment::new(AssessmentKind::Coursework, weight);
        a.mark = mark;
        a
    }

    fn module(code: &str, weight: f64, assessments: Vec<Assessment>) -> Module {
        Module {
            code: code.to_string(),
            weight,
            auto_component_weights: false,
            assessments,
            ..Module::empty()
        }
    }

    #[test]
    fn weighted_module_mark() {
        let result = module_mark(&[assessment(40.0, 70.0), assessment(60.0, 50.0)]);
        assert_eq!(result.weight_sum, 100.0);
        assert!((result.mark.unwrap() - 58.0).abs() < 1e-9);
    }

    #[test]
    fn partial_weights_are_renormalized() {
        let result = module_mark(&[assessment(20.0, 80.0), assessment(20.0, 40.0)]);
        assert_eq!(result.weight_sum, 40.0);
        assert!((result.mark.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_weight_sum_falls_back_to_hundred() {
        let result = module_mark(&[assessment(0.0, 90.0), assessment(0.0, 10.0)]);
        assert_eq!(result, ModuleMark { mark: Some(0.0), weight_sum: 0.0 });
    }

    #[test]
    fn inactive_assessments_are_excluded_entirely() {
        let mut blank = assessment(50.0, 0.0);
        blank.kind = None;
        blank.name.clear();
        let result = module_mark(&[assessment(50.0, 80.0), blank.clone()]);
        assert_eq!(result.weight_sum, 50.0);
        assert_eq!(result.mark, Some(80.0));

        let none_active = module_mark(&[blank]);
        assert_eq!(none_active, ModuleMark { mark: None, weight_sum: 0.0 });
    }

    #[test]
    fn non_finite_marks_count_as_zero() {
        let mut broken = assessment(50.0, 0.0);
        broken.mark = f64::NAN;
        let result = module_mark(&[broken, assessment(50.0, 60.0)]);
        assert_eq!(result.mark, Some(30.0));
    }

    #[test]
    fn semester_average_uses_normalized_module_weights() {
        let modules = vec![
            module("A", 40.0, vec![Assessment { mark: 80.0, ..Assessment::overall() }]),
            module("B", 60.0, vec![Assessment { mark: 60.0, ..Assessment::overall() }]),
        ];
        let stats = semester_stats(&modules);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.modules[0].mark, Some(80.0));
        assert_eq!(stats.modules[1].mark, Some(60.0));
        assert!((stats.average.unwrap() - 68.0).abs() < 1e-9);
        assert_eq!(stats.classification, Classification::UpperSecond);
        assert_eq!(stats.best.unwrap().module.code, "A");
    }

    #[test]
    fn no_modules_means_undefined_average() {
        let stats = semester_stats(&[]);
        assert_eq!(stats.average, None);
        assert_eq!(stats.count, 0);
        assert!(stats.best.is_none());
        assert_eq!(stats.classification, Classification::Unclassified);
    }

    #[test]
    fn uncounted_modules_are_skipped() {
        let hollow = Module {
            code: String::new(),
            title: String::new(),
            assessments: Vec::new(),
            ..Module::empty()
        };
        let modules = vec![
            hollow,
            module("A", 100.0, vec![assessment(100.0, 72.0)]),
        ];
        let stats = semester_stats(&modules);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.modules[0].index, 1);
        assert_eq!(stats.average, Some(72.0));
    }

    #[test]
    fn ranking_is_stable_and_best_skips_undefined_marks() {
        let mut blank = assessment(100.0, 0.0);
        blank.kind = None;
        blank.name.clear();
        let modules = vec![
            module("UNDEF", 25.0, vec![blank]),
            module("TIE1", 25.0, vec![assessment(100.0, 55.0)]),
            module("TOP", 25.0, vec![assessment(100.0, 90.0)]),
            module("TIE2", 25.0, vec![assessment(100.0, 55.0)]),
        ];
        let stats = semester_stats(&modules);
        let order: Vec<&str> = stats.ranked.iter().map(|r| r.module.code.as_str()).collect();
        assert_eq!(order, vec!["TOP", "TIE1", "TIE2", "UNDEF"]);
        assert_eq!(stats.best.unwrap().module.code, "TOP");
    }

    #[test]
    fn best_is_none_when_every_mark_is_undefined() {
        let mut blank = assessment(100.0, 0.0);
        blank.kind = None;
        blank.name.clear();
        let modules = vec![module("X", 100.0, vec![blank])];
        let stats = semester_stats(&modules);
        assert_eq!(stats.count, 1);
        assert!(stats.best.is_none());
        assert_eq!(stats.average, Some(0.0));
    }

    fn full_mark_modules(count: usize) -> Vec<Module> {
        even_split(count)
            .into_iter()
            .enumerate()
            .map(|(i, w)| module(&format!("M{i}"), w, vec![assessment(100.0, 100.0)]))
            .collect()
    }

    #[test]
    fn full_marks_never_average_above_hundred() {
        let modules = full_mark_modules(15);
        let stats = semester_stats(&modules);
        assert_eq!(stats.average, Some(100.0));
        for count in 1..60 {
            let avg = semester_stats(&full_mark_modules(count)).average.unwrap();
            assert!(avg <= 100.0 && avg > 100.0 - 1e-9, "{count} modules: {avg}");
        }
    }

    fn arb_assessment() -> impl Strategy<Value = Assessment> {
        (any::<bool>(), 0.0f64..=100.0, prop_oneof![0.0f64..=100.0, Just(f64::NAN)]).prop_map(
            |(active, weight, mark)| {
                let mut a = assessment(weight, 0.0);
                a.mark = mark;
                if !active {
                    a.kind = None;
                    a.name.clear();
                }
                a
            },
        )
    }

    proptest! {
        #[test]
        fn module_mark_stays_in_range(list in prop::collection::vec(arb_assessment(), 0..12)) {
            let result = module_mark(&list);
            match result.mark {
                Some(mark) => prop_assert!((0.0..=100.0).contains(&mark)),
                None => prop_assert!(list.iter().all(|a| !a.is_active())),
            }
        }

        #[test]
        fn semester_average_stays_in_range(
            cases in prop::collection::vec(
                (0.0f64..=100.0, prop::collection::vec(arb_assessment(), 0..6)),
                1..10,
            )
        ) {
            let modules: Vec<Module> = cases
                .into_iter()
                .enumerate()
                .map(|(i, (w, list))| module(&format!("M{i}"), w, list))
                .collect();
            let stats = semester_stats(&modules);
            let avg = stats.average.unwrap();
            prop_assert!((0.0..=100.0).contains(&avg));
        }
    }
}
