//! Typed value generation for schema leaves. Heuristics based on the
//! leaf's local key name guide plausibility (amounts, ages, ratios,
//! dates, names); everything else falls back to a concrete catalog
//! entry rather than a generic placeholder.

use crate::names::{random_full_name, ASSET_LABELS, CITIES};
use chrono::{Duration, NaiveDate};
use corpus_core::{LeafSpec, ScalarType};
use rand::Rng;

fn local_key(spec: &LeafSpec) -> &str {
    spec.path.local_key().unwrap_or("")
}

fn is_amount_key(key: &str) -> bool {
    ["montant", "solde", "capital", "valeur", "prix", "somme"]
        .iter()
        .any(|kw| key.contains(kw))
}

fn is_ratio_key(key: &str) -> bool {
    ["ratio", "taux", "quote_part", "quotite", "pourcentage"]
        .iter()
        .any(|kw| key.contains(kw))
}

fn is_name_key(key: &str) -> bool {
    key == "nom" || key.ends_with("_nom") || key.ends_with("_noms")
}

fn is_city_key(key: &str) -> bool {
    ["ville", "commune", "lieu"].iter().any(|kw| key.contains(kw))
}

fn is_asset_label_key(key: &str) -> bool {
    ["bien", "actif", "libelle", "designation"].iter().any(|kw| key.contains(kw))
}

/// Generates a value for `spec`. `reference_date` anchors date leaves
/// that are plausible relative to the decedent's death (most schema
/// dates should fall before it; `date_naissance`-like keys fall well
/// before it).
pub fn generate_value(spec: &LeafSpec, reference_date: NaiveDate, rng: &mut impl Rng) -> corpus_core::TargetValue {
    use corpus_core::TargetValue;

    if let Some(allowed) = &spec.allowed_values {
        let idx = rng.gen_range(0..allowed.len());
        return TargetValue::String(allowed[idx].clone());
    }

    let key = local_key(spec);

    match spec.scalar_type {
        ScalarType::Boolean => TargetValue::Boolean(rng.gen_bool(0.5)),
        ScalarType::Integer => {
            if key.contains("age") {
                TargetValue::Integer(rng.gen_range(0..=110))
            } else if is_amount_key(key) {
                TargetValue::Integer(rng.gen_range(500..=2_000_000))
            } else {
                TargetValue::Integer(rng.gen_range(1..=9999))
            }
        }
        ScalarType::Number => {
            if is_ratio_key(key) {
                TargetValue::Number(rng.gen_range(0..=100) as f64 / 100.0)
            } else if is_amount_key(key) {
                TargetValue::Number(rng.gen_range(50_000..=200_000_000) as f64 / 100.0)
            } else {
                TargetValue::Number(rng.gen_range(0..=100_000) as f64 / 100.0)
            }
        }
        ScalarType::Date => TargetValue::Date(plausible_date(key, reference_date, rng)),
        ScalarType::String | ScalarType::Enum => TargetValue::String(generate_string(key, rng)),
    }
}

fn plausible_date(key: &str, reference_date: NaiveDate, rng: &mut impl Rng) -> NaiveDate {
    if key.contains("naissance") {
        reference_date - Duration::days(rng.gen_range(20 * 365..=95 * 365))
    } else if key.contains("deces") {
        reference_date
    } else {
        reference_date - Duration::days(rng.gen_range(0..=15 * 365))
    }
}

fn generate_string(key: &str, rng: &mut impl Rng) -> String {
    if is_name_key(key) {
        random_full_name(rng)
    } else if is_city_key(key) {
        CITIES[rng.gen_range(0..CITIES.len())].to_string()
    } else if is_asset_label_key(key) {
        ASSET_LABELS[rng.gen_range(0..ASSET_LABELS.len())].to_string()
    } else {
        format!("precision-{:04}", rng.gen_range(0..10_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::SchemaPath;

    fn spec(local: &str, ty: ScalarType) -> LeafSpec {
        LeafSpec {
            path: SchemaPath::root().child_key(local),
            scalar_type: ty,
            allowed_values: None,
        }
    }

    #[test]
    fn age_key_generates_integer_in_plausible_range() {
        let mut rng = rand::thread_rng();
        let v = generate_value(&spec("age", ScalarType::Integer), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &mut rng);
        match v {
            corpus_core::TargetValue::Integer(i) => assert!((0..=110).contains(&i)),
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn enum_spec_always_returns_an_allowed_value() {
        let mut rng = rand::thread_rng();
        let mut s = spec("statut", ScalarType::Enum);
        s.allowed_values = Some(vec!["a".to_string(), "b".to_string()]);
        let v = generate_value(&s, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &mut rng);
        match v {
            corpus_core::TargetValue::String(s) => assert!(["a", "b"].contains(&s.as_str())),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn birth_date_falls_well_before_reference_date() {
        let mut rng = rand::thread_rng();
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let v = generate_value(&spec("date_naissance", ScalarType::Date), reference, &mut rng);
        match v {
            corpus_core::TargetValue::Date(d) => assert!(d < reference),
            other => panic!("expected date, got {other:?}"),
        }
    }
}
