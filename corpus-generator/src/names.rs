//! Built-in fallback name/label catalogs, used when no external
//! random-name provider is configured. Kept deliberately small and
//! concrete — string fallbacks must read as real values, never
//! generic placeholders.

pub const GIVEN_NAMES: &[&str] = &[
    "Marie", "Jean", "Sophie", "Pierre", "Claire", "Louis", "Camille", "Antoine", "Isabelle",
    "Nicolas", "Julie", "Thomas", "Celine", "Francois", "Laurence", "Mathieu",
];

pub const FAMILY_NAMES: &[&str] = &[
    "Dubois", "Moreau", "Lefebvre", "Girard", "Bonnet", "Lambert", "Fontaine", "Rousseau",
    "Vincent", "Muller", "Faure", "Andre", "Mercier", "Blanc", "Guerin", "Boyer",
];

pub const CITIES: &[&str] = &[
    "Lyon", "Bordeaux", "Nantes", "Strasbourg", "Toulouse", "Reims", "Dijon", "Angers", "Grenoble",
    "Rennes", "Clermont-Ferrand", "Le Mans",
];

pub const ASSET_LABELS: &[&str] = &[
    "appartement rue des Lilas",
    "maison de famille a Sainte-Foy",
    "portefeuille-titres Societe Generale",
    "local commercial avenue Jean-Jaures",
    "terrain agricole a Mirepoix",
    "parts de SCI Les Tilleuls",
];

pub fn random_full_name(rng: &mut impl rand::Rng) -> String {
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    let family = FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())];
    format!("{given} {family}")
}
