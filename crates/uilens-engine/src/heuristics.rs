//! Deterministic, non-AI checks over detected regions. An empty region list
//! is a normal "nothing detected" input.

use uilens_contracts::regions::Region;
use uilens_contracts::reports::{
    ClickTarget, Feasibility, FocusEntry, InteractiveElement, KeyboardReport, PassOrWarn,
    SizingReport,
};

use crate::error::HeuristicInputError;

pub const MIN_TARGET_PX: f64 = 44.0;
pub const ROW_TOLERANCE_PX: f64 = 50.0;
pub const MIN_GAP_PX: f64 = 8.0;
pub const GAP_DEVIATION_PX: f64 = 8.0;
pub const MAX_PROBLEM_AREAS: usize = 10;
/// Above this many regions the density heuristics kick in.
pub const DENSE_REGION_COUNT: usize = 5;

const MISSING_FOCUS_INDICATOR: &str = "Focus indicators not detected on some interactive elements";

pub fn validate_regions(regions: &[Region]) -> Result<(), HeuristicInputError> {
    for (index, region) in regions.iter().enumerate() {
        if region.element.trim().is_empty() {
            return Err(HeuristicInputError::BlankLabel { index });
        }
        if !region.bbox.is_finite() {
            return Err(HeuristicInputError::NonFinite {
                index,
                element: region.element.clone(),
            });
        }
        if region.bbox.width() < 0.0 || region.bbox.height() < 0.0 {
            return Err(HeuristicInputError::Inverted {
                index,
                element: region.element.clone(),
            });
        }
    }
    Ok(())
}

pub fn analyze_sizing(regions: &[Region]) -> Result<SizingReport, HeuristicInputError> {
    validate_regions(regions)?;

    let mut problem_areas = Vec::new();
    let click_targets = regions
        .iter()
        .map(|region| {
            let size = region.bbox.min_side();
            let meets_44px = size >= MIN_TARGET_PX;
            if !meets_44px {
                problem_areas.push(format!(
                    "\"{}\" is too small ({}px)",
                    region.element,
                    size.round() as i64
                ));
            }
            ClickTarget {
                element: region.element.clone(),
                size: size.round() as i64,
                meets_44px,
            }
        })
        .collect::<Vec<_>>();

    let gaps = row_gaps(regions);
    let mut padding_issues = Vec::new();
    let crowded = gaps.iter().filter(|gap| **gap < MIN_GAP_PX).count();
    if crowded > 0 {
        padding_issues.push(format!(
            "Consider reviewing spacing between {crowded} element groups"
        ));
    }
    if regions.len() > DENSE_REGION_COUNT {
        let inconsistent = inconsistent_gap_count(&gaps);
        if inconsistent > 0 {
            problem_areas.push(format!(
                "{inconsistent} elements with inconsistent spacing detected"
            ));
        }
    }

    let undersized = click_targets.iter().filter(|target| !target.meets_44px).count();
    let feasibility = if undersized == 0 && problem_areas.len() < 3 {
        Feasibility::Possible
    } else {
        Feasibility::NeedsAdjustments
    };
    problem_areas.truncate(MAX_PROBLEM_AREAS);

    Ok(SizingReport {
        click_targets,
        font_sizes: Vec::new(),
        padding_issues,
        feasibility,
        problem_areas,
    })
}

pub fn analyze_keyboard(regions: &[Region]) -> Result<KeyboardReport, HeuristicInputError> {
    validate_regions(regions)?;

    let focus_order = group_rows(regions)
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(idx, region)| FocusEntry {
            element: region.element.clone(),
            tab_index: idx + 1,
        })
        .collect::<Vec<_>>();

    let missing_labels = if regions.len() > DENSE_REGION_COUNT {
        vec![MISSING_FOCUS_INDICATOR.to_string()]
    } else {
        Vec::new()
    };

    let interactive_elements = regions
        .iter()
        .map(|region| InteractiveElement {
            element: region.element.clone(),
            accessible: true,
        })
        .collect();

    let pass_or_warn = if missing_labels.is_empty() && !focus_order.is_empty() {
        PassOrWarn::Pass
    } else {
        PassOrWarn::Warn
    };

    Ok(KeyboardReport {
        focus_order,
        focus_visibility: missing_labels.is_empty(),
        interactive_elements,
        missing_labels,
        pass_or_warn,
    })
}

/// Reading-order rows: sorted by `y0`, a region joins the current row while
/// its `y0` is within [`ROW_TOLERANCE_PX`] of the region above it. Each row is
/// ordered by `x0`. Both sorts are stable.
pub fn group_rows(regions: &[Region]) -> Vec<Vec<&Region>> {
    let mut by_top = regions.iter().collect::<Vec<_>>();
    by_top.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));

    let mut rows: Vec<Vec<&Region>> = Vec::new();
    for region in by_top {
        let same_row = rows
            .last()
            .and_then(|row| row.last())
            .is_some_and(|above| region.bbox.y0 - above.bbox.y0 <= ROW_TOLERANCE_PX);
        match rows.last_mut() {
            Some(row) if same_row => row.push(region),
            _ => rows.push(vec![region]),
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    rows
}

/// Horizontal gaps between neighbours in the same row. Overlaps are negative.
fn row_gaps(regions: &[Region]) -> Vec<f64> {
    group_rows(regions)
        .iter()
        .flat_map(|row| row.windows(2).map(|pair| pair[1].bbox.x0 - pair[0].bbox.x1))
        .collect()
}

fn inconsistent_gap_count(gaps: &[f64]) -> usize {
    if gaps.len() < 2 {
        return 0;
    }
    let mut sorted = gaps.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    gaps.iter()
        .filter(|gap| (**gap - median).abs() > GAP_DEVIATION_PX)
        .count()
}

#[cfg(test)]
mod tests {
    use uilens_contracts::regions::BoundingBox;

    use super::*;

    fn region(element: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::new(element, BoundingBox::new(x0, y0, x1, y1))
    }

    fn elements(report: &KeyboardReport) -> Vec<&str> {
        report
            .focus_order
            .iter()
            .map(|entry| entry.element.as_str())
            .collect()
    }

    #[test]
    fn empty_regions_are_feasible_and_quiet() -> anyhow::Result<()> {
        let report = analyze_sizing(&[])?;
        assert_eq!(report.feasibility, Feasibility::Possible);
        assert!(report.problem_areas.is_empty());
        assert!(report.click_targets.is_empty());
        assert!(report.padding_issues.is_empty());
        assert!(report.font_sizes.is_empty());
        Ok(())
    }

    #[test]
    fn undersized_target_is_named_with_rounded_size() -> anyhow::Result<()> {
        let report = analyze_sizing(&[region("Close", 10.0, 10.0, 40.0, 60.0)])?;
        assert_eq!(report.click_targets[0].size, 30);
        assert!(!report.click_targets[0].meets_44px);
        assert_eq!(report.problem_areas, vec!["\"Close\" is too small (30px)".to_string()]);
        assert_eq!(report.feasibility, Feasibility::NeedsAdjustments);
        Ok(())
    }

    #[test]
    fn exactly_44px_meets_threshold() -> anyhow::Result<()> {
        let report = analyze_sizing(&[region("OK", 0.0, 0.0, 44.0, 44.0)])?;
        assert!(report.click_targets[0].meets_44px);
        assert_eq!(report.feasibility, Feasibility::Possible);
        Ok(())
    }

    #[test]
    fn problem_areas_are_capped_at_ten() -> anyhow::Result<()> {
        let regions = (0..14)
            .map(|idx| {
                let y = idx as f64 * 100.0;
                region(&format!("icon-{idx}"), 0.0, y, 20.0, y + 20.0)
            })
            .collect::<Vec<_>>();
        let report = analyze_sizing(&regions)?;
        assert_eq!(report.click_targets.len(), 14);
        assert_eq!(report.problem_areas.len(), MAX_PROBLEM_AREAS);
        assert_eq!(report.problem_areas[0], "\"icon-0\" is too small (20px)");
        Ok(())
    }

    #[test]
    fn spacing_signal_is_measured_and_repeatable() -> anyhow::Result<()> {
        // One row of six 48px buttons: four 16px gaps and one 60px gap.
        let xs = [0.0, 64.0, 128.0, 192.0, 256.0, 364.0];
        let regions = xs
            .iter()
            .enumerate()
            .map(|(idx, x)| region(&format!("tab-{idx}"), *x, 0.0, x + 48.0, 48.0))
            .collect::<Vec<_>>();

        let first = analyze_sizing(&regions)?;
        let second = analyze_sizing(&regions)?;
        assert_eq!(first, second);
        assert_eq!(
            first.problem_areas,
            vec!["1 elements with inconsistent spacing detected".to_string()]
        );
        assert!(first.padding_issues.is_empty());
        assert_eq!(first.feasibility, Feasibility::Possible);
        Ok(())
    }

    #[test]
    fn crowded_neighbours_raise_padding_issue() -> anyhow::Result<()> {
        let regions = [
            region("Yes", 0.0, 0.0, 48.0, 48.0),
            region("No", 50.0, 0.0, 98.0, 48.0),
        ];
        let report = analyze_sizing(&regions)?;
        assert_eq!(
            report.padding_issues,
            vec!["Consider reviewing spacing between 1 element groups".to_string()]
        );
        assert!(report.problem_areas.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_regions_are_rejected() {
        assert_eq!(
            analyze_sizing(&[region("  ", 0.0, 0.0, 10.0, 10.0)]),
            Err(HeuristicInputError::BlankLabel { index: 0 })
        );
        assert_eq!(
            analyze_keyboard(&[
                region("ok", 0.0, 0.0, 50.0, 50.0),
                region("nan", f64::NAN, 0.0, 10.0, 10.0)
            ]),
            Err(HeuristicInputError::NonFinite {
                index: 1,
                element: "nan".to_string()
            })
        );
        assert!(matches!(
            analyze_sizing(&[region("flipped", 50.0, 0.0, 10.0, 10.0)]),
            Err(HeuristicInputError::Inverted { index: 0, .. })
        ));
    }

    #[test]
    fn validate_regions_accepts_empty_and_degenerate_boxes() {
        assert_eq!(validate_regions(&[]), Ok(()));
        assert_eq!(
            validate_regions(&[region("Divider", 0.0, 10.0, 300.0, 10.0)]),
            Ok(())
        );
        assert!(matches!(
            validate_regions(&[region("Tall", 0.0, 90.0, 10.0, 20.0)]),
            Err(HeuristicInputError::Inverted { index: 0, .. })
        ));
    }

    #[test]
    fn focus_order_reads_rows_then_columns() -> anyhow::Result<()> {
        let regions = [
            region("Footer", 0.0, 400.0, 100.0, 450.0),
            region("Search", 300.0, 20.0, 400.0, 60.0),
            region("Logo", 10.0, 0.0, 60.0, 50.0),
            region("Menu", 150.0, 45.0, 250.0, 90.0),
        ];
        let report = analyze_keyboard(&regions)?;
        assert_eq!(elements(&report), vec!["Logo", "Menu", "Search", "Footer"]);
        assert_eq!(
            report.focus_order.iter().map(|entry| entry.tab_index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(report.pass_or_warn, PassOrWarn::Pass);
        assert!(report.focus_visibility);
        Ok(())
    }

    #[test]
    fn rows_chain_through_neighbouring_regions() -> anyhow::Result<()> {
        // B sits 45px below A and C 15px below B, so all three share a row.
        let regions = [
            region("A", 0.0, 0.0, 48.0, 48.0),
            region("B", 100.0, 45.0, 148.0, 93.0),
            region("C", 50.0, 60.0, 98.0, 108.0),
        ];
        let report = analyze_keyboard(&regions)?;
        assert_eq!(elements(&report), vec!["A", "C", "B"]);

        let rows = group_rows(&regions);
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[test]
    fn gap_larger_than_tolerance_starts_new_row() -> anyhow::Result<()> {
        let regions = [
            region("Lower", 0.0, 51.0, 48.0, 99.0),
            region("Upper", 200.0, 0.0, 248.0, 48.0),
        ];
        let report = analyze_keyboard(&regions)?;
        assert_eq!(elements(&report), vec!["Upper", "Lower"]);
        Ok(())
    }

    #[test]
    fn empty_keyboard_report_warns() -> anyhow::Result<()> {
        let report = analyze_keyboard(&[])?;
        assert!(report.focus_order.is_empty());
        assert!(report.missing_labels.is_empty());
        assert!(report.focus_visibility);
        assert_eq!(report.pass_or_warn, PassOrWarn::Warn);
        Ok(())
    }

    #[test]
    fn dense_screens_flag_missing_focus_indicators() -> anyhow::Result<()> {
        let regions = (0..6)
            .map(|idx| {
                let y = idx as f64 * 80.0;
                region(&format!("link-{idx}"), 0.0, y, 120.0, y + 48.0)
            })
            .collect::<Vec<_>>();
        let report = analyze_keyboard(&regions)?;
        assert_eq!(report.missing_labels.len(), 1);
        assert!(!report.focus_visibility);
        assert_eq!(report.pass_or_warn, PassOrWarn::Warn);
        assert_eq!(report.interactive_elements.len(), 6);
        assert!(report.interactive_elements.iter().all(|item| item.accessible));
        Ok(())
    }
}
