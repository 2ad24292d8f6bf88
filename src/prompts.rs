//! Instruction text sent to the model.
//!
//! These strings are domain content. Functions take the pieces that vary per
//! call (prompt, score, dataset list) and return the finished text.

use crate::model::WorkflowStage;

/// Composer credited in every generated score unless configured otherwise.
pub const DEFAULT_COMPOSER: &str = "Antony Leedale";

pub const DRUM_MAP: &str = "\
%%drummap BD   C2   36   % Bass Drum
%%drummap SN   D2   38   % Snare
%%drummap CH   F#2  42   % Closed Hi-Hat
%%drummap OH   A#2  46   % Open Hi-Hat
%%drummap CC   C#3  49   % Crash Cymbal
%%drummap RC   D#3  51   % Ride Cymbal
%%drummap TM   D3   47   % High Tom
%%drummap FT   F2   41   % Floor Tom
%%drummap PH   G#2  44   % Pedal Hi-Hat
%%drummap CS   C#2  37   % Cross-stick
%%drummap RB   F3   53   % Ride Bell
%%drummap SB   A6   91   % Snare Brush
%%drummap ST   G#6  92   % Snare Brush Stir";

/// ABC+ command dictionary: machine-friendly marks that map onto MusicXML.
pub const ABC_PLUS_DICTIONARY: &str = "\
# ABC+ Command Dictionary

## Articulations
| ABC+ | Musical Meaning | MusicXML Target |
|---|---|---|
| !staccato! | Light, detached playing | <staccato/> |
| !tenuto! | Smooth, full-value emphasis | <tenuto/> |
| !accent! | Strong attack | <accent/> |
| !marcato! | Very forceful attack | <strong-accent/> |
| !pizz! | Plucked string sound | <pizzicato/> |
| !arco! | Return to bowing | <arco/> |

## Dynamics
| ABC+ | Musical Meaning | MusicXML Target |
|---|---|---|
| !p! | Soft (Piano) | <p/> |
| !mp! | Moderately soft | <mp/> |
| !mf! | Moderately loud | <mf/> |
| !f! | Loud (Forte) | <f/> |
| !ff! | Very loud | <ff/> |
| !cresc(start)! | Gradually louder | <wedge type=\"crescendo\"/> |
| !cresc(end)! | End of swell | <wedge type=\"stop\"/> |
| !dim(start)! | Gradually softer | <wedge type=\"diminuendo\"/> |
| !dim(end)! | End of fade | <wedge type=\"stop\"/> |

## Slurs
| ABC+ | Function |
|---|---|
| (1slur-start | Start phrase |
| (1slur-end | End phrase |

## Layout
| ABC+ | Function |
|---|---|
| %%system-break | New line of music |
| %%page-break | Page turn |
| %%measure-numbering on | Show bar numbers |

## Instrument Metadata
| ABC+ | Function |
|---|---|
| %%instrument V1 violin | Set instrument timbre |
| %%midi-program V1 41 | Set MIDI playback sound |

## Expressive Text
| ABC+ | Function |
|---|---|
| !dolce! | Sweetly |
| !espressivo! | With expression |
| !rit.! | Slow down (Ritardando) |";

/// Instrument names accepted by the notation software downstream.
pub const INSTRUMENTS: &str = "\
STRINGS: Violin 1 (Solo), Violin 2 (Solo), Viola (Solo), Violoncello (Solo), Violins 1, Violins 2, Violas, Violoncellos, Contrabasses
BRASS: Horn in F, Horns a6, Trumpet, Trumpets a4, Trombone, Trombones a3, Bass Trombone, Cimbasso, Tuba
WOODWINDS: Flute 1, Flute 2, Piccolo, Alto Flute, Oboe, English Horn, Bassoon, Contrabassoon, Clarinet in Eb, Clarinet in Bb, Bass Clarinet, Soprano Sax, Alto Sax, Tenor Sax, Baritone Sax
PERCUSSION (UNPITCHED): Drum Kit, GM Drum Kit, Mixed Percussion, Bass Drum, Snare Drum, Toms, Timbales, Congas, Bongos, Suspended Cymbal, Tam-tam, Triangle, Tambourine, Wood Blocks
PERCUSSION (PITCHED): Glockenspiel, Xylophone, Marimba, Vibraphone, Tubular Bells, Crotales
KEYBOARDS: Grand Piano, Upright Piano, Celesta, Harpsichord, Hammond Organ
GUITARS & BASSES: Acoustic Nylon, Acoustic Steel, Electric Bass, Electric LP (Clean/Heavy), Electric SC (Clean/Heavy)
CHOIR: Sopranos, Altos, Tenors, Basses, Full Choir, Women, Men";

const PERCUSSION_KEY_MAP: &str = "\
D#1=Closed Hi-Hat, E1=Pedal Hi-Hat, F1=Open Hi-Hat, F#1=Ride Cymbal, G1=Stick Click, \
C2=Bass Drum, C#2=Snare Rim, D2=Snare, F2=Low Tom, G2=Mid Tom, A2=High Tom, \
E3=Tam-Tam, F#3=Tambourine, G3=Splash Cymbal, G#3=Cowbell, A3=Suspended Cymbal, \
C4=Hi Bongo, C#4=Lo Bongo, D4=Mute Hi Conga, D#4=Hi Conga, E4=Lo Conga, \
A5=Triangle, A#5=Shaker, B5=Sleigh Bells, C6=Mark Tree, C#6=Castanets";

const ABC_PLUS_RULES: &str = "\
STRICT ABC+ COMPLIANCE:
1. Dynamics MUST use the !...! syntax (e.g. !mf!, !cresc(start)!). Never quoted text like \"mf\".
2. Articulations MUST use the !...! syntax (e.g. !staccato!).
3. Use the ABC+ Command Dictionary below for the exact codes.";

const CONCERT_PITCH: &str =
    "CRITICAL: ALL OUTPUT MUST BE IN CONCERT PITCH (C SCORE). Do not transpose parts.";

pub const UPGRADE_INSTRUCTION: &str = "Iteratively UPGRADE this piece. Analyze its current state and apply the next logical improvement (e.g. enhanced harmony, counterpoint, richer texture, or expressive dynamics). Make it better and more professional, building upon the existing structure.";

pub const FIX_INSTRUCTION: &str =
    "Fix any rhythm errors, check bar lines, and ensure the key signature matches the notes.";

pub const EXTEND_INSTRUCTION: &str = "Extend this piece by adding another section (B part) or variation that complements the original melody.";

pub const VARIATION_INSTRUCTION: &str = "Introduce a variation of the main melodic theme in a new section or as a development of an existing theme, complementing the original while offering contrast. Retain the core identity but explore new harmonic or rhythmic territory.";

pub const ANNOTATE_INSTRUCTION: &str = "TRANSFORM THIS INTO A STUDY SCORE: Add detailed educational annotations throughout the score. 1. Mark sections (Theme A, Bridge, etc.) using boxed text ('^Boxed Text'). 2. Add harmonic analysis comments or chord symbols if missing. 3. Add performance notes as text annotations ('^Play lightly'). 4. Explain interesting theoretical moments using comments (%) or text.";

pub const RECTIFY_INSTRUCTION: &str = "PERFORM RIGOROUS RANGE CHECK: Check every single note for every instrument against professional ranges. If out of range, transpose to the nearest valid octave. Document EVERY change with a comment (e.g. % RECTIFIED: Flute C8 -> C7).";

pub fn generation(composer: &str) -> String {
    format!(
        "You are an expert AI Composer. Generate valid ABC Notation based on the user's prompt.
Adhere to strict music theory rules. Output ONLY the ABC notation.
Include metadata headers (T:, C: {composer}, M:, L:, K:).
{CONCERT_PITCH}

FOR JAZZ DRUMS, USE THIS MAPPING:
{DRUM_MAP}

{ABC_PLUS_RULES}

{ABC_PLUS_DICTIONARY}"
    )
}

pub fn generation_prompt(prompt: &str, datasets: &str) -> String {
    format!("Compose a piece based on this prompt: \"{prompt}\". \nContextual Datasets: {datasets}")
}

pub const ANALYSIS: &str = r#"You are a computational musicologist. Analyze the provided ABC notation.
Return a valid JSON object matching the following structure exactly.
Do not return Markdown formatting. Just the JSON string.

{
  "keyLikelihood": [{"key": string, "confidence": number}],
  "noteDistribution": [{"note": string, "count": number}],
  "intervalJumps": [{"interval": string, "count": number}],
  "musicalAttributes": {"complexity": 0-1, "dissonance": 0-1, "rhythmicVariety": 0-1, "melodicContour": 0-1, "tonalStability": 0-1},
  "genreFit": string,
  "suggestions": string[],
  "instrumentRanges": [{"instrument": string, "percentInRange": number, "percentProfessional": number, "issues": string[], "overallRating": "PERFECT"|"GOOD"|"STRAINED"|"IMPOSSIBLE"}],
  "zedClefData": {"isCompliant": boolean, "balanceScore": number, "intervalSpread": string, "issues": string[], "rectificationPlan": string},
  "datasetBenchmarks": {"tegridySimilarity": number, "millionSongSimilarity": number, "structuralRarity": number, "closestTegridyMatch": string, "maestroExpressivity": number, "lakhMidiCorrelation": number, "gtzanGenreMatch": string, "musicNetComplexity": number, "weimarJazzImprovRating": number, "magnaTagATuneLabels": string[]},
  "deepAnalysis": {
    "emotionalProfile": {"valence": number, "arousal": number, "dominantEmotion": string},
    "theoreticalFrameworks": {"schenkerian": string, "gttm": string, "neoRiemannian": string},
    "impliedAudioFeatures": {"estimatedTempo": number, "spectralCentroid": string, "onsetDensity": number}
  },
  "advancedTraitModeling": {
    "jSymbolic": {"melodicIntervalHistogram": number[], "verticalIntervalHistogram": number[], "chordDensity": number, "rhythmicSyncopation": number},
    "stylisticFingerprint": {"harmonicEntropy": number, "voiceLeadingSmoothness": number, "chromaticismIndex": number, "orchestralTexture": string}
  },
  "comprehensiveLexiconAnalysis": {
    "expertCommentary": string,
    "actionableFeedback": string,
    "coreElements": {"rhythmAndMetre": string, "melodyAndHarmony": string, "timbreAndTexture": string, "structureAndForm": string, "dynamicsAndTonality": string},
    "soundSourcesAndTechniques": {"instrumentationAndOrganology": string, "techniquesAndImprovisation": string},
    "culturalContext": {"historicalBackground": string, "socialFunction": string, "performancePractice": string, "economicsAndPatronage": string, "keyInfluences": string},
    "theoreticalFramework": {"keyTerminology": string[], "theoreticalSystem": string, "notationAndOralTradition": string},
    "technologyAndInnovation": {"productionAndDistribution": string, "hybridizationAndTech": string},
    "analyticalPerspectives": {"genreAndAesthetics": string, "socialPoliticalContext": string, "audienceAndReception": string},
    "illustrativeAbcSnippets": [{"concept": string, "abcCode": string, "explanation": string}]
  }
}"#;

pub fn analysis_prompt(abc: &str) -> String {
    format!("Analyze this ABC notation:\n{abc}")
}

pub fn enhancement() -> String {
    format!(
        "You are an expert Composer/Arranger.
Modify the provided ABC notation based on the user's instruction.
Preserve the original musical intent unless asked to change it.
Ensure valid ABC syntax. If asked to fix ranges, check strict instrument ranges.
{CONCERT_PITCH}

FOR JAZZ DRUMS, USE THIS MAPPING:
{DRUM_MAP}

{ABC_PLUS_RULES}

{ABC_PLUS_DICTIONARY}"
    )
}

pub fn enhancement_prompt(original_prompt: &str, instruction: &str, abc: &str) -> String {
    format!("Original Request: {original_prompt}\nInstruction: {instruction}\n\nCurrent ABC:\n{abc}")
}

pub fn orchestration() -> String {
    format!(
        "You are an expert Orchestrator.
Add the requested instruments to the existing ABC score.
Write parts for these instruments that complement the existing music.
Maintain the same Key and Meter.
Use standard instrument names from this list:
{INSTRUMENTS}
{CONCERT_PITCH}

FOR JAZZ DRUMS, USE THIS MAPPING:
{DRUM_MAP}"
    )
}

pub fn orchestration_prompt(original_prompt: &str, instruments: &str, abc: &str) -> String {
    format!("Original Request: {original_prompt}\nAdd Instruments: {instruments}\n\nCurrent ABC:\n{abc}")
}

pub const MUSIC_XML: &str =
    "Convert the provided ABC notation to valid MusicXML 3.0 format.\nReturn ONLY the XML code.";

pub const REPORT: &str = "You are a world-renowned musicologist.
Write a comprehensive, deep-dive Markdown report on the provided piece of music.
Cover:
1. Structural Analysis (Form, Phrasing)
2. Harmonic Analysis (Progressions, Modulations, Schenkerian overview)
3. Texture & Orchestration
4. Historical Stylistic Context
5. Measure-by-measure commentary for key moments.

Format as clear Markdown.";

pub fn report_prompt(title: &str, abc: &str) -> String {
    format!("Title: {title}\n\nScore:\n{abc}")
}

/// System instruction for one workflow stage: the shared preamble followed
/// by the stage's own directions.
pub fn workflow_stage(stage: WorkflowStage, prompt: &str, datasets: &str, composer: &str) -> String {
    format!(
        "{}\n\n{}",
        workflow_preamble(prompt, datasets, composer),
        stage_directions(stage, prompt, datasets)
    )
}

fn workflow_preamble(prompt: &str, datasets: &str, composer: &str) -> String {
    format!(
        "You are an expert AI Composer running a strict \"Orchestral Reduction-to-Expansion\" Workflow.
Your output must be valid ABC Notation only.

CONTEXTUAL DATASETS ACTIVE: {datasets}.

ANTI-DRIFT PROTOCOL
ORIGINAL USER PROMPT: \"{prompt}\"
1. RE-READ THE ORIGINAL PROMPT ABOVE.
2. COMPARE the current music to it.
3. CHECK FOR DRIFT in mood, genre or instrumentation.
4. CORRECTION: if the current state has drifted, FIX IT IN THIS STAGE.
5. ALIGNMENT: every new note, chord or instrument must serve the original mission: \"{prompt}\".

GLOBAL RULES:
1. COMPOSER: Always set 'C: {composer}'.
2. HISTORY PRESERVATION: Keep every existing '%' comment. Append this stage's decisions as new '%' comments.
3. SYNTAX: All ABC must be valid and engraving-safe.
4. THEORY: Respect voice leading, form and the playable range of every instrument.
5. SPACING: No blank lines. Use '%' for spacers.
6. SCORE LAYOUT: '%%score' groups use SQUARE BRACKETS, e.g. %%score [V1 V2] [V3 V4]. Never parentheses.
7. PERCUSSION: Drums use '%%midi channel 10' and 'clef=perc'. Never use voice IDs 'V:HvyPerc' or 'V:AuxPerc'; use 'V:Percussion', 'V:Drums' or 'V:Perc1'.
   JAZZ DRUM MAPPING:
{DRUM_MAP}
   MIXED PERCUSSION KEY MAP: {PERCUSSION_KEY_MAP}
8. CHORD SYMBOLS: Explicit chord symbols in double quotes for every bar or harmonic change.
9. CONCERT PITCH: All output in concert pitch (C score).

{ABC_PLUS_RULES}

{ABC_PLUS_DICTIONARY}"
    )
}

fn stage_directions(stage: WorkflowStage, prompt: &str, datasets: &str) -> String {
    match stage {
        WorkflowStage::Planning => format!(
            "STAGE 0: DEEP THOUGHT PLANNING.
- Do not write music notes yet.
- Analyze the request using your knowledge of: {datasets}.
- Plan the form, key, instrumentation and texture. Strategize rhythm and motif.
- If a duration was given, calculate the total bars needed.
- OUTPUT: a block of '%' comments, e.g. \"% STAGE PLANNING: Selected C Minor for gravitas...\""
        ),
        WorkflowStage::Foundation => format!(
            "STAGE 1: FOUNDATION (Piano Reduction / Sketch).
- Create a GRAND STAFF (V:1 Treble, V:2 Bass) piano short score. No full orchestra yet.
- Set Key (K:), Meter (M:), Default Length (L:), Title (T:).
- Define the main themes and harmonic skeleton with chord symbols.
- Check against the original prompt (\"{prompt}\").
- COMMENTARY: Append '% STAGE FOUNDATION: Created Piano Short Score'."
        ),
        WorkflowStage::Motif => "STAGE 2: THEMATIC DEFINITION.
- Within the piano reduction, write Theme A and a distinct counter-melody or Theme B.
- Give them distinct rhythmic profiles.
- COMMENTARY: Append '% STAGE MOTIF: Defined Theme A and Counter-Melody'."
            .to_string(),
        WorkflowStage::Chords => "STAGE 3: HARMONIC STRUCTURE.
- Harmonize the melody with genre-appropriate progressions, not just I-IV-V-I.
- Write chord symbols (\"Cm7\", \"F9\") explicitly in double quotes.
- Plan later key areas in comments, e.g. \"% PLAN: Section B will modulate to Eb Major\".
- COMMENTARY: Append '% STAGE CHORDS: Defined harmonic progression'."
            .to_string(),
        WorkflowStage::Rhythm => "STAGE 4: RHYTHMIC DEVELOPMENT.
- Within the piano reduction, add accompaniment patterns and rhythmic motifs.
- Keep all chord symbols.
- COMMENTARY: Append '% STAGE RHYTHM: Refined motivic rhythm in sketch'."
            .to_string(),
        WorkflowStage::Harmony => "STAGE 5: VOICE LEADING & COUNTERPOINT.
- Fill in the full harmony of the piano reduction with smooth voice leading (no parallel fifths).
- Chord symbols must be present for every bar.
- COMMENTARY: Append '% STAGE HARMONY: Completed harmonic framework'."
            .to_string(),
        WorkflowStage::Form => "STAGE 6: FORM EXPANSION.
- Expand the short score into a full-length piece (e.g. Intro, A, B, A', Outro).
- A returning 'A' section MUST bring back the original Theme A.
- Section B MUST use a different chord progression; modulate to a related key.
- Stay a piano reduction. Do not orchestrate yet.
- COMMENTARY: Append '% STAGE FORM: Expanded sketch to full length structure'."
            .to_string(),
        WorkflowStage::Texture => "STAGE 7: SECTIONAL EXPANSION.
- Expand the piano reduction into V:Woodwinds, V:Brass and V:Strings.
- Share the melody between sections and give every section movement.
- Keep the chord symbols on the top staff.
- OUTPUT: sectional staves, e.g. %%score [Woodwinds] [Brass] [Strings].
- COMMENTARY: Append '% STAGE TEXTURE: Expanded to Sectional Staves'."
            .to_string(),
        WorkflowStage::Dynamics => format!(
            "STAGE 8: FULL ORCHESTRATION.
- Explode the sectional staves into individual instruments named from this list only:
{INSTRUMENTS}
- Add percussion on channel 10, using the mixed percussion key map where needed.
- Every instrument stays within its concert-pitch range. Inner voices get real parts.
- COMMENTARY: Append '% STAGE FULL_ORCH: Exploded to full instrumentation'."
        ),
        WorkflowStage::Refinement => "STAGE 9: DETAILING & POLISH.
- Add expression with ABC+ commands only: tempo text (\"^rit.\", \"^a tempo\"), dynamics (!pp!, !cresc(start)!),
  articulations (!staccato!, !accent!, !marcato!), ornaments (!trill!, !mordent!), bowings (!upbow!, !downbow!, !pizz!, !arco!), breath marks (!breath!).
- Convert legacy quoted dynamics and staccato dots to ABC+.
- COMMENTARY: Append '% STAGE DETAILING: Added dynamics, articulations, and tempo changes'."
            .to_string(),
        WorkflowStage::FinalCheck => format!(
            "STAGE 10: FINAL CHECK.
- Validate theory, concert-pitch ranges, tessitural balance, channel 10 percussion and chord symbols.
- Verify the main theme returns if the form requires it.
- Final drift check against the original prompt (\"{prompt}\").
- All dynamics use !...! syntax.
- COMMENTARY: Append '% STAGE FINAL CHECK: Confirmed orchestral validity'."
        ),
    }
}

/// User turn for one workflow stage.
pub fn workflow_stage_prompt(stage: WorkflowStage, prompt: &str, abc: &str) -> String {
    match stage {
        WorkflowStage::Planning => format!(
            "Create a deep strategic plan for: {prompt}. Output ONLY ABC comments (starting with %) describing this plan."
        ),
        WorkflowStage::Foundation => format!(
            "Create the foundational Piano Reduction (Short Score) for: {prompt}. Preserve existing % comments."
        ),
        WorkflowStage::Motif => format!(
            "Define the Main Melody (Theme A) and a Counter-Melody for this sketch. Make them distinct: \n{abc}"
        ),
        WorkflowStage::Chords => format!(
            "Harmonize this melody with a sophisticated Chord Progression. Write explicit Chord Symbols (\"Dm7\") above the staff: \n{abc}"
        ),
        WorkflowStage::Rhythm => format!("Apply rhythmic structure to this Piano Reduction: \n{abc}"),
        WorkflowStage::Harmony => {
            format!("Complete the harmony and counterpoint for this Piano Reduction: \n{abc}")
        }
        WorkflowStage::Form => format!(
            "Expand the structure of this Piano Reduction into a full-length piece. Section B uses a NEW Chord Progression and Theme A RETURNS at the end: \n{abc}"
        ),
        WorkflowStage::Texture => format!(
            "Orchestrate this Piano Reduction into Sections (Woodwinds, Brass, Strings) with independent movement: \n{abc}"
        ),
        WorkflowStage::Dynamics => format!(
            "Explode these sections into a Full Orchestral Score using the instrument list provided: \n{abc}"
        ),
        WorkflowStage::Refinement => format!(
            "Add dynamics, articulations (!staccato!, !accent!) and ornaments (!trill!) using ABC+ syntax to this full score: \n{abc}"
        ),
        WorkflowStage::FinalCheck => format!(
            "Perform final theory, syntax (ABC+), and range validation on this orchestral score: \n{abc}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_credits_composer() {
        let text = generation("Jane Doe");
        assert!(text.contains("C: Jane Doe"));
        assert!(text.contains("%%drummap BD"));
        assert!(text.contains("!cresc(start)!"));
    }

    #[test]
    fn test_workflow_stage_carries_prompt_and_datasets() {
        let text = workflow_stage(
            WorkflowStage::Planning,
            "A brooding string quartet",
            "Tegridy MIDI (Structural Patterns)",
            DEFAULT_COMPOSER,
        );
        assert!(text.contains("ORIGINAL USER PROMPT: \"A brooding string quartet\""));
        assert!(text.contains("CONTEXTUAL DATASETS ACTIVE: Tegridy MIDI (Structural Patterns)."));
        assert!(text.contains("C: Antony Leedale"));
        assert!(text.contains("STAGE 0: DEEP THOUGHT PLANNING."));
    }

    #[test]
    fn test_every_stage_has_directions() {
        for stage in WorkflowStage::ALL {
            let text = stage_directions(stage, "p", "d");
            assert!(
                text.starts_with(&format!("STAGE {}:", stage.index())),
                "{stage} directions start with its number"
            );
        }
    }

    #[test]
    fn test_stage_prompts_embed_score_after_planning() {
        assert!(!workflow_stage_prompt(WorkflowStage::Planning, "p", "X:1").contains("X:1"));
        assert!(!workflow_stage_prompt(WorkflowStage::Foundation, "p", "X:1").contains("X:1"));
        for stage in &WorkflowStage::ALL[2..] {
            assert!(workflow_stage_prompt(*stage, "p", "X:1").ends_with("\nX:1"));
        }
    }

    #[test]
    fn test_orchestration_lists_instruments() {
        assert!(orchestration().contains("Violoncellos"));
        assert_eq!(
            orchestration_prompt("waltz", "Harp, Celesta", "X:1"),
            "Original Request: waltz\nAdd Instruments: Harp, Celesta\n\nCurrent ABC:\nX:1"
        );
    }
}
