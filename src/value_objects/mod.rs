//! Argument graph value objects
//!
//! Value objects are immutable types that represent concepts in the argument domain.
//! They are compared by value rather than identity and encapsulate domain validation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form key/value metadata attached to nodes and graphs
pub type Metadata = IndexMap<String, serde_json::Value>;

/// The relation a scheme node establishes between its premises and conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemeType {
    /// The premises give a reason for the conclusion
    Support,
    /// The premises conflict with the conclusion
    Attack,
    /// The premise restates the conclusion
    Rephrase,
    /// The premise is preferred over the conclusion
    Preference,
    /// Not yet classified
    #[default]
    Unknown,
}

impl SchemeType {
    /// Get the string representation of the scheme type
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeType::Support => "Support",
            SchemeType::Attack => "Attack",
            SchemeType::Rephrase => "Rephrase",
            SchemeType::Preference => "Preference",
            SchemeType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! argumentation_schemes {
    ($($variant:ident => $label:literal, $code:literal;)+) => {
        /// Named argumentation schemes (Walton-style taxonomy)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum ArgumentationScheme {
            $(
                #[doc = $label]
                $variant,
            )+
            /// No scheme has been chosen
            #[default]
            Unknown,
        }

        impl ArgumentationScheme {
            /// Every named scheme, excluding `Unknown`
            pub const ALL: &'static [ArgumentationScheme] = &[$(ArgumentationScheme::$variant),+];

            /// Human readable name
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ArgumentationScheme::$variant => $label,)+
                    ArgumentationScheme::Unknown => "Unknown",
                }
            }

            /// Enum suffix used by the Arguebuf schema (`SUPPORT_<code>`)
            pub fn code(&self) -> Option<&'static str> {
                match self {
                    $(ArgumentationScheme::$variant => Some($code),)+
                    ArgumentationScheme::Unknown => None,
                }
            }

            /// Parse a human readable name, ignoring case
            pub fn from_name(name: &str) -> Option<Self> {
                let needle = name.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|scheme| scheme.as_str().eq_ignore_ascii_case(needle))
            }

            /// Parse an Arguebuf enum suffix
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(ArgumentationScheme::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

argumentation_schemes! {
    PositionToKnow => "Position to Know", "POSITION_TO_KNOW";
    ExpertOpinion => "Expert Opinion", "EXPERT_OPINION";
    WitnessTestimony => "Witness Testimony", "WITNESS_TESTIMONY";
    PopularOpinion => "Popular Opinion", "POPULAR_OPINION";
    PopularPractice => "Popular Practice", "POPULAR_PRACTICE";
    Example => "Example", "EXAMPLE";
    Analogy => "Analogy", "ANALOGY";
    PracticalReasoningFromAnalogy =>
        "Practical Reasoning From Analogy", "PRACTICAL_REASONING_FROM_ANALOGY";
    Composition => "Composition", "COMPOSITION";
    Division => "Division", "DIVISION";
    Oppositions => "Oppositions", "OPPOSITIONS";
    RhetoricalOppositions => "Rhetorical Oppositions", "RHETORICAL_OPPOSITIONS";
    Alternatives => "Alternatives", "ALTERNATIVES";
    VerbalClassification => "Verbal Classification", "VERBAL_CLASSIFICATION";
    VerbalClassificationDefinition =>
        "Definition to Verbal Classification", "VERBAL_CLASSIFICATION_DEFINITION";
    VerbalClassificationVagueness =>
        "Vagueness of a Verbal Classification", "VERBAL_CLASSIFICATION_VAGUENESS";
    VerbalClassificationArbitrariness =>
        "Arbitrariness of a Verbal Classification", "VERBAL_CLASSIFICATION_ARBITRARINESS";
    InteractionOfActAndPerson => "Interaction of Act and Person", "INTERACTION_OF_ACT_AND_PERSON";
    Values => "Values", "VALUES";
    PositiveValues => "Positive Values", "POSITIVE_VALUES";
    NegativeValues => "Negative Values", "NEGATIVE_VALUES";
    Sacrifice => "Sacrifice", "SACRIFICE";
    TheGroupAndItsMembers => "The Group and its Members", "THE_GROUP_AND_ITS_MEMBERS";
    PracticalReasoning => "Practical Reasoning", "PRACTICAL_REASONING";
    TwoPersonPracticalReasoning =>
        "Two-Person Practical Reasoning", "TWO_PERSON_PRACTICAL_REASONING";
    Waste => "Waste", "WASTE";
    SunkCosts => "Sunk Costs", "SUNK_COSTS";
    Ignorance => "Ignorance", "IGNORANCE";
    EpistemicIgnorance => "Epistemic Ignorance", "EPISTEMIC_IGNORANCE";
    CauseToEffect => "Cause to Effect", "CAUSE_TO_EFFECT";
    CorrelationToCause => "Correlation to Cause", "CORRELATION_TO_CAUSE";
    Sign => "Sign", "SIGN";
    Abductive => "Abductive", "ABDUCTIVE";
    EvidenceToHypothesis => "Evidence to Hypothesis", "EVIDENCE_TO_HYPOTHESIS";
    Consequences => "Consequences", "CONSEQUENCES";
    PositiveConsequences => "Positive Consequences", "POSITIVE_CONSEQUENCES";
    NegativeConsequences => "Negative Consequences", "NEGATIVE_CONSEQUENCES";
    PragmaticAlternatives => "Pragmatic Alternatives", "PRAGMATIC_ALTERNATIVES";
    Threat => "Threat", "THREAT";
    FearAppeal => "Fear Appeal", "FEAR_APPEAL";
    DangerAppeal => "Danger Appeal", "DANGER_APPEAL";
    NeedForHelp => "Need for Help", "NEED_FOR_HELP";
    Distress => "Distress", "DISTRESS";
    Commitment => "Commitment", "COMMITMENT";
    Ethotic => "Ethotic", "ETHOTIC";
    GenericAdHominem => "Generic ad Hominem", "GENERIC_AD_HOMINEM";
    PragmaticInconsistency => "Pragmatic Inconsistency", "PRAGMATIC_INCONSISTENCY";
    InconsistentCommitment => "Inconsistent Commitment", "INCONSISTENT_COMMITMENT";
    CircumstantialAdHominem => "Circumstantial ad Hominem", "CIRCUMSTANTIAL_AD_HOMINEM";
    Bias => "Bias", "BIAS";
    BiasAdHominem => "Bias ad Hominem", "BIAS_AD_HOMINEM";
    Gradualism => "Gradualism", "GRADUALISM";
    SlipperySlope => "Slippery Slope", "SLIPPERY_SLOPE";
    PrecedentSlipperySlope => "Precedent Slippery Slope", "PRECEDENT_SLIPPERY_SLOPE";
    SoritesSlipperySlope => "Sorites Slippery Slope", "SORITES_SLIPPERY_SLOPE";
    VerbalSlipperySlope => "Verbal Slippery Slope", "VERBAL_SLIPPERY_SLOPE";
    FullSlipperySlope => "Full Slippery Slope", "FULL_SLIPPERY_SLOPE";
    ConstitutiveRuleClaims => "Constitutive Rule Claims", "CONSTITUTIVE_RULE_CLAIMS";
    Rules => "Rules", "RULES";
    ExceptionalCase => "Exceptional Case", "EXCEPTIONAL_CASE";
    Precedent => "Precedent", "PRECEDENT";
    PleaForExcuse => "Plea for Excuse", "PLEA_FOR_EXCUSE";
    Perception => "Perception", "PERCEPTION";
    Memory => "Memory", "MEMORY";
}

impl fmt::Display for ArgumentationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the position of a node in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between two positions
    pub fn midpoint(&self, other: &Position2D) -> Position2D {
        Position2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Default for Position2D {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Where an atom's claim was taken from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// The original wording in the source
    pub text: String,
    /// Key of the source resource in the graph's resource table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Character offset of `text` inside the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl Reference {
    /// A reference carrying only the original text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            resource: None,
            offset: None,
        }
    }
}

/// A source document the graph was built from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Creation and modification times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Timestamps {
    /// Both timestamps set to the current time
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            updated: now,
        }
    }

    /// Both timestamps set to `at`
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            created: at,
            updated: at,
        }
    }

    /// Mark as modified now
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}
