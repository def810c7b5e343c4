//! Builds the `summary.json`/`summary.md` dashboard pair regenerated on
//! every mutation: current totals and, per axis, each bucket's count
//! against its configured target share.

use corpus_core::{AxisId, AxisShares, Counters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

fn axis_label(axis: AxisId) -> &'static str {
    match axis {
        AxisId::Persona => "persona",
        AxisId::NarrativeVoice => "narrative_voice",
        AxisId::Format => "format",
        AxisId::LengthBand => "length_band",
        AxisId::Noise => "noise",
        AxisId::NumericDensity => "numeric_density",
        AxisId::DatePrecision => "date_precision",
        AxisId::Complexity => "complexity",
        AxisId::PrimaryTopic => "primary_topic",
        AxisId::SecondaryTopic => "secondary_topic",
        AxisId::HardNegativeMode => "hard_negative_mode",
        AxisId::HardNegativeIntensity => "hard_negative_intensity",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketCoverage {
    pub count: u64,
    pub target_share: f64,
    pub actual_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub issued: u64,
    pub submitted: u64,
    pub target_total: u64,
    pub generation_target: u64,
    pub remaining: u64,
    pub axis_coverage: BTreeMap<AxisId, BTreeMap<String, BucketCoverage>>,
}

pub fn build_snapshot(
    counters: &Counters,
    target_total: u64,
    generation_target: u64,
    shares: &AxisShares,
) -> DashboardSnapshot {
    let mut axis_coverage = BTreeMap::new();
    for (axis, buckets) in shares {
        let axis_total: u64 = counters.axis_buckets.get(axis).map(|b| b.values().sum()).unwrap_or(0);
        let mut coverage = BTreeMap::new();
        for (bucket, target_share) in buckets {
            let count = counters.bucket_count(*axis, bucket);
            let actual_share = if axis_total == 0 { 0.0 } else { count as f64 / axis_total as f64 };
            coverage.insert(
                bucket.clone(),
                BucketCoverage {
                    count,
                    target_share: *target_share,
                    actual_share,
                },
            );
        }
        axis_coverage.insert(*axis, coverage);
    }

    DashboardSnapshot {
        issued: counters.issued,
        submitted: counters.submitted,
        target_total,
        generation_target,
        remaining: counters.remaining(generation_target),
        axis_coverage,
    }
}

pub fn render_markdown(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    writeln!(out, "# Corpus Generation Dashboard").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "- Issued: {}", snapshot.issued).unwrap();
    writeln!(out, "- Submitted: {}", snapshot.submitted).unwrap();
    writeln!(out, "- Generation target: {}", snapshot.generation_target).unwrap();
    writeln!(out, "- Remaining: {}", snapshot.remaining).unwrap();
    writeln!(out).unwrap();
    for (axis, buckets) in &snapshot.axis_coverage {
        writeln!(out, "## {}", axis_label(*axis)).unwrap();
        writeln!(out, "| bucket | count | target share | actual share |").unwrap();
        writeln!(out, "|---|---|---|---|").unwrap();
        for (bucket, coverage) in buckets {
            writeln!(
                out,
                "| {bucket} | {} | {:.3} | {:.3} |",
                coverage.count, coverage.target_share, coverage.actual_share
            )
            .unwrap();
        }
        writeln!(out).unwrap();
    }
    out
}
