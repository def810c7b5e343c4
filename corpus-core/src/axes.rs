//! Diversity axes and their closed bucket sets.
//!
//! The quota scheduler draws one bucket per axis for every issued
//! instruction. Axes and buckets are modeled as closed enumerated types
//! rather than stringly-typed dictionaries, per the project's
//! re-architecture notes: compatibility rules become predicates over
//! axis-tuple prefixes instead of ad hoc dictionary lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a bucket string does not belong to its axis's
/// enumerated set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketParseError {
    pub axis: &'static str,
    pub value: String,
}

impl fmt::Display for BucketParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {} bucket", self.value, self.axis)
    }
}

impl std::error::Error for BucketParseError {}

/// Generates a closed bucket enum with `ALL`, `as_str`, `Display`, and
/// `FromStr`, keeping the wire representation (serde) and the runtime
/// string representation as a single source of truth.
macro_rules! bucket_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $str:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every bucket in this axis, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = BucketParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($str => Ok($name::$variant),)+
                    other => Err(BucketParseError {
                        axis: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

bucket_enum! {
    /// The narrator's relationship to the decedent.
    pub enum Persona {
        Enfant => "enfant",
        ConjointSurvivant => "conjoint_survivant",
        PartenairePacs => "partenaire_pacs",
        Concubin => "concubin",
        PetitEnfant => "petit_enfant",
        BeauEnfant => "beau_enfant",
        Notaire => "notaire",
        AssocieProfessionnel => "associe_professionnel",
    }
}

bucket_enum! {
    pub enum NarrativeVoice {
        PremierePersonne => "premiere_personne",
        TroisiemePersonne => "troisieme_personne",
        RecitNotarial => "recit_notarial",
    }
}

bucket_enum! {
    pub enum Format {
        RecitLibre => "recit_libre",
        ListeAPuces => "liste_a_puces",
        Courriel => "courriel",
        NoteInterne => "note_interne",
    }
}

bucket_enum! {
    pub enum LengthBand {
        Court => "court",
        Moyen => "moyen",
        Long => "long",
    }
}

bucket_enum! {
    pub enum Noise {
        Aucun => "aucun",
        Leger => "leger",
        Important => "important",
    }
}

bucket_enum! {
    pub enum NumericDensity {
        Faible => "faible",
        Moderee => "moderee",
        MontantsEtDates => "montants_et_dates",
    }
}

bucket_enum! {
    pub enum DatePrecision {
        Absente => "absente",
        Approx => "approx",
        Exacte => "exacte",
    }
}

bucket_enum! {
    pub enum Complexity {
        Simple => "simple",
        Complexe => "complexe",
        HardNegative => "hard_negative",
    }
}

bucket_enum! {
    /// Primary and secondary topics share the same bucket set; a
    /// non-empty secondary topic must differ from the primary one.
    pub enum Topic {
        RegimesMatrimoniaux => "regimes_matrimoniaux",
        AssuranceVie => "assurance_vie",
        Donation => "donation",
        PacteDutreil => "pacte_dutreil",
        Indivision => "indivision",
        Legs => "legs",
        Usufruit => "usufruit",
    }
}

bucket_enum! {
    /// Only meaningful when `Complexity::HardNegative` is drawn.
    pub enum HardNegativeMode {
        Ambiguite => "ambiguite",
        Contradiction => "contradiction",
        IndicesManquants => "indices_manquants",
    }
}

bucket_enum! {
    pub enum HardNegativeIntensity {
        Leger => "leger",
        Modere => "modere",
        Fort => "fort",
    }
}

/// Identifies one of the twelve diversity axes without carrying its
/// bucket value; used as a map key and in compatibility-rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    Persona,
    NarrativeVoice,
    Format,
    LengthBand,
    Noise,
    NumericDensity,
    DatePrecision,
    Complexity,
    PrimaryTopic,
    SecondaryTopic,
    HardNegativeMode,
    HardNegativeIntensity,
}

impl AxisId {
    pub const ALL: [AxisId; 12] = [
        AxisId::Persona,
        AxisId::NarrativeVoice,
        AxisId::Format,
        AxisId::LengthBand,
        AxisId::Noise,
        AxisId::NumericDensity,
        AxisId::DatePrecision,
        AxisId::Complexity,
        AxisId::PrimaryTopic,
        AxisId::SecondaryTopic,
        AxisId::HardNegativeMode,
        AxisId::HardNegativeIntensity,
    ];

    /// Every bucket string available to this axis, used to build the
    /// default target-share tables and to validate configuration overrides.
    pub fn bucket_strs(&self) -> Vec<&'static str> {
        match self {
            AxisId::Persona => Persona::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::NarrativeVoice => NarrativeVoice::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::Format => Format::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::LengthBand => LengthBand::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::Noise => Noise::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::NumericDensity => NumericDensity::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::DatePrecision => DatePrecision::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::Complexity => Complexity::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::PrimaryTopic | AxisId::SecondaryTopic => {
                Topic::ALL.iter().map(|b| b.as_str()).collect()
            }
            AxisId::HardNegativeMode => HardNegativeMode::ALL.iter().map(|b| b.as_str()).collect(),
            AxisId::HardNegativeIntensity => {
                HardNegativeIntensity::ALL.iter().map(|b| b.as_str()).collect()
            }
        }
    }
}

/// One bucket selection, type-erased across axes. Used in-memory only
/// (the scheduler's per-axis counter maps and compatibility-rule
/// lookups); persisted forms key on the bucket's `as_str()` instead, so
/// this type deliberately does not derive `Serialize`/`Deserialize` —
/// an untagged encoding would be ambiguous between axes that share a
/// bucket spelling (e.g. "leger" is valid for both `Noise` and
/// `HardNegativeIntensity`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Persona(Persona),
    NarrativeVoice(NarrativeVoice),
    Format(Format),
    LengthBand(LengthBand),
    Noise(Noise),
    NumericDensity(NumericDensity),
    DatePrecision(DatePrecision),
    Complexity(Complexity),
    Topic(Topic),
    HardNegativeMode(HardNegativeMode),
    HardNegativeIntensity(HardNegativeIntensity),
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Persona(b) => b.as_str(),
            Bucket::NarrativeVoice(b) => b.as_str(),
            Bucket::Format(b) => b.as_str(),
            Bucket::LengthBand(b) => b.as_str(),
            Bucket::Noise(b) => b.as_str(),
            Bucket::NumericDensity(b) => b.as_str(),
            Bucket::DatePrecision(b) => b.as_str(),
            Bucket::Complexity(b) => b.as_str(),
            Bucket::Topic(b) => b.as_str(),
            Bucket::HardNegativeMode(b) => b.as_str(),
            Bucket::HardNegativeIntensity(b) => b.as_str(),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered tuple of selected buckets across every axis for one
/// instruction. `secondary_topic` is absent unless the generator drew
/// one. Used as the short-range de-duplication key by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub persona: Persona,
    pub narrative_voice: NarrativeVoice,
    pub format: Format,
    pub length_band: LengthBand,
    pub noise: Noise,
    pub numeric_density: NumericDensity,
    pub date_precision: DatePrecision,
    pub complexity: Complexity,
    pub primary_topic: Topic,
    pub secondary_topic: Option<Topic>,
    pub hard_negative_mode: Option<HardNegativeMode>,
    pub hard_negative_intensity: Option<HardNegativeIntensity>,
}

impl Signature {
    /// Returns the bucket drawn for a given axis, or `None` for an
    /// optional axis that was left unset (secondary topic, hard-negative
    /// mode/intensity outside of `Complexity::HardNegative`).
    pub fn bucket(&self, axis: AxisId) -> Option<Bucket> {
        match axis {
            AxisId::Persona => Some(Bucket::Persona(self.persona)),
            AxisId::NarrativeVoice => Some(Bucket::NarrativeVoice(self.narrative_voice)),
            AxisId::Format => Some(Bucket::Format(self.format)),
            AxisId::LengthBand => Some(Bucket::LengthBand(self.length_band)),
            AxisId::Noise => Some(Bucket::Noise(self.noise)),
            AxisId::NumericDensity => Some(Bucket::NumericDensity(self.numeric_density)),
            AxisId::DatePrecision => Some(Bucket::DatePrecision(self.date_precision)),
            AxisId::Complexity => Some(Bucket::Complexity(self.complexity)),
            AxisId::PrimaryTopic => Some(Bucket::Topic(self.primary_topic)),
            AxisId::SecondaryTopic => self.secondary_topic.map(Bucket::Topic),
            AxisId::HardNegativeMode => self.hard_negative_mode.map(Bucket::HardNegativeMode),
            AxisId::HardNegativeIntensity => {
                self.hard_negative_intensity.map(Bucket::HardNegativeIntensity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_round_trips_through_display_and_from_str() {
        for p in Persona::ALL {
            let s = p.to_string();
            assert_eq!(Persona::from_str(&s).unwrap(), *p);
        }
    }

    #[test]
    fn unknown_bucket_string_is_rejected() {
        assert!(Persona::from_str("not_a_bucket").is_err());
    }

    #[test]
    fn axis_id_bucket_strs_match_enum_variant_count() {
        assert_eq!(AxisId::Persona.bucket_strs().len(), Persona::ALL.len());
        assert_eq!(AxisId::PrimaryTopic.bucket_strs().len(), Topic::ALL.len());
    }

    #[test]
    fn signature_bucket_lookup_respects_optional_axes() {
        let sig = Signature {
            persona: Persona::Enfant,
            narrative_voice: NarrativeVoice::PremierePersonne,
            format: Format::RecitLibre,
            length_band: LengthBand::Moyen,
            noise: Noise::Aucun,
            numeric_density: NumericDensity::Faible,
            date_precision: DatePrecision::Exacte,
            complexity: Complexity::Simple,
            primary_topic: Topic::Donation,
            secondary_topic: None,
            hard_negative_mode: None,
            hard_negative_intensity: None,
        };
        assert!(sig.bucket(AxisId::SecondaryTopic).is_none());
        assert!(sig.bucket(AxisId::PrimaryTopic).is_some());
    }
}
