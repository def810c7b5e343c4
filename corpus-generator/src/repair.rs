//! Business-invariant repair pass: normalizes or drops leaves so the
//! generated payload is internally coherent, then relies on
//! [`corpus_core::TargetNode::prune_empty`] to remove whatever a repair
//! left empty.

use chrono::{Datelike, NaiveDate};
use corpus_core::{TargetNode, TargetValue};
use rand::Rng;

/// Visits every leaf in `node`, giving the mutator its local key name
/// (the last path segment) and a mutable reference to its value.
pub fn for_each_leaf_mut(node: &mut TargetNode, visit: &mut dyn FnMut(&str, &mut TargetValue)) {
    match node {
        TargetNode::Leaf(_) => {}
        TargetNode::Object(map) => {
            for (key, child) in map.iter_mut() {
                if let TargetNode::Leaf(value) = child {
                    visit(key, value);
                } else {
                    for_each_leaf_mut(child, visit);
                }
            }
        }
        TargetNode::List(items) => {
            for item in items.iter_mut() {
                for_each_leaf_mut(item, visit);
            }
        }
    }
}

/// Read-only counterpart of [`for_each_leaf_mut`].
fn for_each_leaf(node: &TargetNode, visit: &mut dyn FnMut(&str, &TargetValue)) {
    match node {
        TargetNode::Leaf(_) => {}
        TargetNode::Object(map) => {
            for (key, child) in map {
                if let TargetNode::Leaf(value) = child {
                    visit(key, value);
                } else {
                    for_each_leaf(child, visit);
                }
            }
        }
        TargetNode::List(items) => {
            for item in items {
                for_each_leaf(item, visit);
            }
        }
    }
}

fn find_date(node: &TargetNode, key_substr: &str) -> Option<NaiveDate> {
    let mut found = None;
    for_each_leaf(node, &mut |key, value| {
        if found.is_none() && key.contains(key_substr) {
            if let TargetValue::Date(d) = value {
                found = Some(*d);
            }
        }
    });
    found
}

/// Ensures the decedent's birth date precedes the death date within
/// `identity`, and recomputes any co-located "age" leaf from the gap
/// (tolerating +/-1 year as the spec allows).
pub fn repair_identity_dates(identity: &mut TargetNode, reference_death_date: NaiveDate) {
    let birth = find_date(identity, "naissance");
    let death = find_date(identity, "deces").unwrap_or(reference_death_date);

    if let Some(birth) = birth {
        if birth >= death {
            let corrected = death - chrono::Duration::days(365 * 40);
            set_date(identity, "naissance", corrected);
        }
    }

    let birth = find_date(identity, "naissance").unwrap_or(death - chrono::Duration::days(365 * 40));
    let age_years = (death.year() - birth.year()) as i64;
    for_each_leaf_mut(identity, &mut |key, value| {
        if key.contains("age") {
            if let TargetValue::Integer(_) = value {
                *value = TargetValue::Integer(age_years);
            }
        }
    });
}

fn set_date(node: &mut TargetNode, key_substr: &str, new_value: NaiveDate) {
    for_each_leaf_mut(node, &mut |key, value| {
        if key.contains(key_substr) {
            if let TargetValue::Date(_) = value {
                *value = TargetValue::Date(new_value);
            }
        }
    });
}

/// Removes `partner` (the surviving-spouse/partner subtree, if present)
/// when the decedent's marital status is widowed and there is no one
/// left to survive them.
pub fn repair_widowed_has_no_partner(root: &mut TargetNode, partner_key: &str, is_widowed: bool) {
    if !is_widowed {
        return;
    }
    if let TargetNode::Object(map) = root {
        map.remove(partner_key);
    }
}

/// Sets every "insured name" leaf under a life-insurance contract list
/// to the decedent's own name, per the invariant that a contract's
/// insured person is the decedent.
pub fn repair_insured_name_matches_decedent(contracts: &mut TargetNode, decedent_name: &str) {
    for_each_leaf_mut(contracts, &mut |key, value| {
        if (key.contains("assure") && key.contains("nom")) || key == "assure_nom" {
            *value = TargetValue::String(decedent_name.to_string());
        }
    });
}

/// Ensures a donation's donor and beneficiary names differ; if a
/// generated pair collided, regenerates the beneficiary.
pub fn repair_donor_beneficiary_distinct(donations: &mut TargetNode, rng: &mut impl Rng) {
    if let TargetNode::List(items) = donations {
        for item in items {
            let mut donor = None;
            let mut beneficiary_key_present = false;
            for_each_leaf_mut(item, &mut |key, value| {
                if key.contains("donateur") {
                    if let TargetValue::String(s) = value {
                        donor = Some(s.clone());
                    }
                }
                if key.contains("beneficiaire") && key.contains("nom") {
                    beneficiary_key_present = true;
                }
            });
            if let Some(donor_name) = donor {
                if beneficiary_key_present {
                    for_each_leaf_mut(item, &mut |key, value| {
                        if key.contains("beneficiaire") && key.contains("nom") {
                            if let TargetValue::String(s) = value {
                                if *s == donor_name {
                                    *s = crate::names::random_full_name(rng);
                                }
                            }
                        }
                    });
                }
            }
        }
    }
}
