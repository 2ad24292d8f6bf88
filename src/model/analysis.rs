//! Typed view of the analysis JSON returned by the model.
//!
//! The shape is a contract with the remote model. Core fields must be present;
//! every extended section is optional and lenient about missing members.
//! Unknown fields are ignored.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    #[serde(default)]
    pub key_likelihood: Vec<KeyLikelihood>,
    #[serde(default)]
    pub note_distribution: Vec<NoteCount>,
    #[serde(default)]
    pub interval_jumps: Vec<IntervalCount>,
    pub musical_attributes: MusicalAttributes,
    pub genre_fit: String,
    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_ranges: Option<Vec<InstrumentRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zed_clef_data: Option<ZedClefAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistical_analysis: Option<StatisticalAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_benchmarks: Option<DatasetBenchmarks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_analysis: Option<DeepAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_trait_modeling: Option<AdvancedTraitModeling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comprehensive_lexicon_analysis: Option<LexiconAnalysis>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct KeyLikelihood {
    pub key: String,
    pub confidence: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct NoteCount {
    pub note: String,
    pub count: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct IntervalCount {
    pub interval: String,
    pub count: f64,
}

/// Scores in `0.0..=1.0`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MusicalAttributes {
    pub complexity: f64,
    pub dissonance: f64,
    pub rhythmic_variety: f64,
    pub melodic_contour: f64,
    pub tonal_stability: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangeRating {
    Perfect,
    #[default]
    Good,
    Strained,
    Impossible,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct InstrumentRange {
    pub instrument: String,
    /// 0-100
    pub percent_in_range: f64,
    /// 0-100, comfortable professional range
    pub percent_professional: f64,
    pub issues: Vec<String>,
    pub overall_rating: RangeRating,
}

/// Tessitural balance check across the ensemble.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ZedClefAnalysis {
    pub is_compliant: bool,
    pub balance_score: f64,
    pub interval_spread: String,
    pub issues: Vec<String>,
    pub rectification_plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abc_visualization: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StatisticalAnalysis {
    pub chi_squared: String,
    pub correlation: String,
    pub anova: String,
    pub variance: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetBenchmarks {
    pub tegridy_similarity: f64,
    pub million_song_similarity: f64,
    pub structural_rarity: f64,
    pub closest_tegridy_match: String,
    pub maestro_expressivity: f64,
    pub lakh_midi_correlation: f64,
    pub gtzan_genre_match: String,
    pub music_net_complexity: f64,
    pub weimar_jazz_improv_rating: f64,
    pub magna_tag_a_tune_labels: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DeepAnalysis {
    pub emotional_profile: EmotionalProfile,
    pub theoretical_frameworks: TheoreticalFrameworks,
    pub implied_audio_features: ImpliedAudioFeatures,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct EmotionalProfile {
    /// -1.0 to 1.0
    pub valence: f64,
    /// 0.0 to 1.0
    pub arousal: f64,
    pub dominant_emotion: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TheoreticalFrameworks {
    pub schenkerian: String,
    pub gttm: String,
    pub neo_riemannian: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ImpliedAudioFeatures {
    pub estimated_tempo: f64,
    pub spectral_centroid: String,
    pub onset_density: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedTraitModeling {
    pub j_symbolic: JSymbolicFeatures,
    pub stylistic_fingerprint: StylisticFingerprint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct JSymbolicFeatures {
    pub melodic_interval_histogram: Vec<f64>,
    pub vertical_interval_histogram: Vec<f64>,
    pub chord_density: f64,
    pub rhythmic_syncopation: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StylisticFingerprint {
    pub harmonic_entropy: f64,
    pub voice_leading_smoothness: f64,
    pub chromaticism_index: f64,
    pub orchestral_texture: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LexiconAnalysis {
    pub expert_commentary: String,
    pub actionable_feedback: String,
    pub core_elements: CoreElements,
    pub sound_sources_and_techniques: SoundSources,
    pub cultural_context: CulturalContext,
    pub theoretical_framework: TheoreticalFramework,
    pub technology_and_innovation: TechnologyAndInnovation,
    pub analytical_perspectives: AnalyticalPerspectives,
    pub illustrative_abc_snippets: Vec<AbcSnippet>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreElements {
    pub rhythm_and_metre: String,
    pub melody_and_harmony: String,
    pub timbre_and_texture: String,
    pub structure_and_form: String,
    pub dynamics_and_tonality: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundSources {
    pub instrumentation_and_organology: String,
    pub techniques_and_improvisation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CulturalContext {
    pub historical_background: String,
    pub social_function: String,
    pub performance_practice: String,
    pub economics_and_patronage: String,
    pub key_influences: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TheoreticalFramework {
    pub key_terminology: Vec<String>,
    pub theoretical_system: String,
    pub notation_and_oral_tradition: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TechnologyAndInnovation {
    pub production_and_distribution: String,
    pub hybridization_and_tech: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticalPerspectives {
    pub genre_and_aesthetics: String,
    pub social_political_context: String,
    pub audience_and_reception: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AbcSnippet {
    pub concept: String,
    pub explanation: String,
    pub abc_code: String,
}

impl AnalysisData {
    /// Expert commentary, when the lexicon section was returned.
    pub fn expert_commentary(&self) -> Option<&str> {
        self.comprehensive_lexicon_analysis
            .as_ref()
            .map(|lexicon| lexicon.expert_commentary.as_str())
    }

    /// Values outside their documented ranges. The model is not trusted to
    /// respect them; callers log these rather than reject the analysis.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut check = |name: &str, value: f64, min: f64, max: f64| {
            if !(min..=max).contains(&value) {
                warnings.push(format!(
                    "{} = {} is outside {}..={}",
                    name, value, min, max
                ));
            }
        };

        let attrs = &self.musical_attributes;
        check("musicalAttributes.complexity", attrs.complexity, 0.0, 1.0);
        check("musicalAttributes.dissonance", attrs.dissonance, 0.0, 1.0);
        check("musicalAttributes.rhythmicVariety", attrs.rhythmic_variety, 0.0, 1.0);
        check("musicalAttributes.melodicContour", attrs.melodic_contour, 0.0, 1.0);
        check("musicalAttributes.tonalStability", attrs.tonal_stability, 0.0, 1.0);

        for range in self.instrument_ranges.iter().flatten() {
            check(
                &format!("instrumentRanges[{}].percentInRange", range.instrument),
                range.percent_in_range,
                0.0,
                100.0,
            );
            check(
                &format!("instrumentRanges[{}].percentProfessional", range.instrument),
                range.percent_professional,
                0.0,
                100.0,
            );
        }

        if let Some(zed) = &self.zed_clef_data {
            check("zedClefData.balanceScore", zed.balance_score, 0.0, 100.0);
        }

        if let Some(deep) = &self.deep_analysis {
            let profile = &deep.emotional_profile;
            check("deepAnalysis.emotionalProfile.valence", profile.valence, -1.0, 1.0);
            check("deepAnalysis.emotionalProfile.arousal", profile.arousal, 0.0, 1.0);
        }

        warnings
    }
}
