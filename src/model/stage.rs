use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static ORDER: [WorkflowStage; 11] = WorkflowStage::ALL;

/// One phase of the staged composition workflow.
///
/// The order is fixed; the only transition is moving to the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    #[default]
    Planning,
    Foundation,
    Motif,
    Chords,
    Rhythm,
    Harmony,
    Form,
    Texture,
    Dynamics,
    Refinement,
    FinalCheck,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 11] = [
        WorkflowStage::Planning,
        WorkflowStage::Foundation,
        WorkflowStage::Motif,
        WorkflowStage::Chords,
        WorkflowStage::Rhythm,
        WorkflowStage::Harmony,
        WorkflowStage::Form,
        WorkflowStage::Texture,
        WorkflowStage::Dynamics,
        WorkflowStage::Refinement,
        WorkflowStage::FinalCheck,
    ];

    /// Position in the workflow, starting at 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following stage, or `None` at the end of the workflow.
    pub fn next(self) -> Option<WorkflowStage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Stable identifier, e.g. `FINAL_CHECK`.
    pub fn id(self) -> &'static str {
        match self {
            WorkflowStage::Planning => "PLANNING",
            WorkflowStage::Foundation => "FOUNDATION",
            WorkflowStage::Motif => "MOTIF",
            WorkflowStage::Chords => "CHORDS",
            WorkflowStage::Rhythm => "RHYTHM",
            WorkflowStage::Harmony => "HARMONY",
            WorkflowStage::Form => "FORM",
            WorkflowStage::Texture => "TEXTURE",
            WorkflowStage::Dynamics => "DYNAMICS",
            WorkflowStage::Refinement => "REFINEMENT",
            WorkflowStage::FinalCheck => "FINAL_CHECK",
        }
    }

    /// Short display name.
    pub fn label(self) -> &'static str {
        match self {
            WorkflowStage::Planning => "Planning",
            WorkflowStage::Foundation => "Sketch",
            WorkflowStage::Motif => "Themes",
            WorkflowStage::Chords => "Chords",
            WorkflowStage::Rhythm => "Rhythm",
            WorkflowStage::Harmony => "Voicing",
            WorkflowStage::Form => "Form",
            WorkflowStage::Texture => "Sections",
            WorkflowStage::Dynamics => "Full Orch",
            WorkflowStage::Refinement => "Detailing",
            WorkflowStage::FinalCheck => "Final",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WorkflowStage::Planning => "Strategy & Dataset Selection",
            WorkflowStage::Foundation => "Piano Reduction (Grand Staff)",
            WorkflowStage::Motif => "Melody & Counterpoint Definition",
            WorkflowStage::Chords => "Harmonic Structure & Progression",
            WorkflowStage::Rhythm => "Rhythmic Identity",
            WorkflowStage::Harmony => "Voice Leading & Counterpoint",
            WorkflowStage::Form => "Structure & Thematic Return",
            WorkflowStage::Texture => "Expand to WW/Brass/Str Sections",
            WorkflowStage::Dynamics => "Explode to Individual Insts",
            WorkflowStage::Refinement => "Dynamics, Articulations, Ornaments",
            WorkflowStage::FinalCheck => "Theory & Syntax Check",
        }
    }

    /// Suffix written into the score title after the stage runs.
    pub fn title_label(self) -> String {
        let name = match self {
            WorkflowStage::Planning => "Planning",
            WorkflowStage::Foundation => "Piano Sketch",
            WorkflowStage::Motif => "Thematic Definition",
            WorkflowStage::Chords => "Harmonic Structure",
            WorkflowStage::Rhythm => "Rhythm Dev",
            WorkflowStage::Harmony => "Voice Leading",
            WorkflowStage::Form => "Form Expansion",
            WorkflowStage::Texture => "Sectional Expansion",
            WorkflowStage::Dynamics => "Full Orchestration",
            WorkflowStage::Refinement => "Detailing",
            WorkflowStage::FinalCheck => "Final Check",
        };
        format!("(Stage {}: {})", self.index(), name)
    }

    /// Stages from `from` through `to`, inclusive, in workflow order.
    pub fn range(from: WorkflowStage, to: WorkflowStage) -> &'static [WorkflowStage] {
        if from.index() > to.index() {
            return &[];
        }
        &ORDER[from.index()..=to.index()]
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for WorkflowStage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.id() == wanted || stage.label().to_uppercase() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown workflow stage: {}. Run `opus stages` to list them.",
                    s
                )
            })
    }
}
