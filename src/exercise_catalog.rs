// ABOUTME: Static exercise catalog, search-term resolution, and GIF matching heuristics
// ABOUTME: Seed data, accent folding, muscle-group aliases, and cascading media matchers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # Exercise Catalog
//!
//! The catalog is static configuration compiled into the binary and seeded into
//! the `exercises` table at startup. Search terms resolve either to a curated
//! muscle-group alias set (when the normalized term is exactly an alias key) or
//! to an accent-insensitive substring pattern.
//!
//! GIF back-fill uses four matchers of decreasing specificity, applied in order
//! to rows that still lack media:
//!
//! 1. [`exact_name_gif`]: the name is exactly a title in the media library
//! 2. [`seed_name_gif`]: the name matches a seed entry once accents, case, and
//!    punctuation are ignored
//! 3. [`keyword_gif`]: the name contains a known movement keyword
//! 4. [`muscle_group_default_gif`]: a generic clip for the muscle group

use fitcoach_core::constants::media::GIF_CDN_BASE;

/// Catalog entry
#[derive(Debug, Clone, Copy)]
pub struct SeedExercise {
    /// English name
    pub name: &'static str,
    /// Spanish name
    pub name_es: &'static str,
    /// Canonical muscle group
    pub muscle_group: &'static str,
    /// Required equipment
    pub equipment: &'static str,
    /// beginner / intermediate / advanced
    pub difficulty: &'static str,
    /// Short execution cue
    pub instructions: &'static str,
    /// Media file name on the CDN (without extension)
    pub gif: &'static str,
}

impl SeedExercise {
    /// Full media URL
    #[must_use]
    pub fn gif_url(&self) -> String {
        gif_url(self.gif)
    }
}

/// Build the CDN URL for a media file name
#[must_use]
pub fn gif_url(file: &str) -> String {
    format!("{GIF_CDN_BASE}/{file}.gif")
}

macro_rules! seed {
    ($name:literal, $es:literal, $group:literal, $equipment:literal, $difficulty:literal, $gif:literal, $cue:literal) => {
        SeedExercise {
            name: $name,
            name_es: $es,
            muscle_group: $group,
            equipment: $equipment,
            difficulty: $difficulty,
            instructions: $cue,
            gif: $gif,
        }
    };
}

/// Static exercise catalog
pub const SEED_EXERCISES: &[SeedExercise] = &[
    // Chest
    seed!("Barbell Bench Press", "Press de banca con barra", "chest", "barbell", "intermediate", "barbell-bench-press", "Lower the bar to mid-chest and press up with elbows at about 45 degrees."),
    seed!("Incline Dumbbell Press", "Press inclinado con mancuernas", "chest", "dumbbells", "intermediate", "incline-dumbbell-press", "On a 30 degree bench, press the dumbbells up and slightly together."),
    seed!("Push-Up", "Flexiones", "chest", "bodyweight", "beginner", "push-up", "Keep a straight line from head to heels and lower until the chest nearly touches the floor."),
    seed!("Dumbbell Fly", "Aperturas con mancuernas", "chest", "dumbbells", "beginner", "dumbbell-fly", "With a soft bend in the elbows, open the arms wide and squeeze back together."),
    seed!("Cable Crossover", "Cruce de poleas", "chest", "cable", "intermediate", "cable-crossover", "Step forward and bring the handles together in front of the hips."),
    // Back
    seed!("Pull-Up", "Dominadas", "back", "pull-up bar", "intermediate", "pull-up", "Pull the chest toward the bar and lower under control to full extension."),
    seed!("Lat Pulldown", "Jalón al pecho", "back", "cable", "beginner", "lat-pulldown", "Pull the bar to the upper chest while keeping the torso tall."),
    seed!("Barbell Row", "Remo con barra", "back", "barbell", "intermediate", "barbell-row", "Hinge forward with a flat back and row the bar to the lower ribs."),
    seed!("Seated Cable Row", "Remo sentado en polea", "back", "cable", "beginner", "seated-cable-row", "Row the handle to the stomach and squeeze the shoulder blades together."),
    seed!("Deadlift", "Peso muerto", "back", "barbell", "advanced", "deadlift", "Push the floor away with a neutral spine and lock out with the hips."),
    seed!("Single-Arm Dumbbell Row", "Remo con mancuerna a una mano", "back", "dumbbells", "beginner", "dumbbell-row", "Support on a bench and row the dumbbell toward the hip."),
    // Shoulders
    seed!("Overhead Press", "Press militar", "shoulders", "barbell", "intermediate", "overhead-press", "Press the bar overhead and finish with the biceps beside the ears."),
    seed!("Dumbbell Shoulder Press", "Press de hombros con mancuernas", "shoulders", "dumbbells", "beginner", "dumbbell-shoulder-press", "Press the dumbbells overhead from shoulder height without arching the back."),
    seed!("Lateral Raise", "Elevaciones laterales", "shoulders", "dumbbells", "beginner", "lateral-raise", "Raise the dumbbells to shoulder height leading with the elbows."),
    seed!("Face Pull", "Face pull en polea", "shoulders", "cable", "beginner", "face-pull", "Pull the rope toward the face, separating the hands at the end."),
    // Arms
    seed!("Barbell Curl", "Curl de bíceps con barra", "biceps", "barbell", "beginner", "barbell-curl", "Curl the bar without swinging and keep the elbows pinned to the sides."),
    seed!("Hammer Curl", "Curl martillo", "biceps", "dumbbells", "beginner", "hammer-curl", "Curl with palms facing each other."),
    seed!("Tricep Pushdown", "Extensión de tríceps en polea", "triceps", "cable", "beginner", "tricep-pushdown", "Extend the elbows fully while keeping the upper arms still."),
    seed!("Bench Dip", "Fondos en banco", "triceps", "bench", "beginner", "bench-dip", "Lower the hips by bending the elbows to about 90 degrees."),
    seed!("Skull Crusher", "Press francés", "triceps", "barbell", "intermediate", "skull-crusher", "Lower the bar toward the forehead by bending only at the elbows."),
    seed!("Wrist Curl", "Curl de muñeca", "forearms", "dumbbells", "beginner", "wrist-curl", "Rest the forearms on the thighs and curl the wrists up."),
    // Legs
    seed!("Barbell Back Squat", "Sentadilla con barra", "quadriceps", "barbell", "intermediate", "barbell-squat", "Sit between the hips with the chest up and drive through the whole foot."),
    seed!("Goblet Squat", "Sentadilla goblet", "quadriceps", "dumbbells", "beginner", "goblet-squat", "Hold a dumbbell at the chest and squat to depth."),
    seed!("Leg Press", "Prensa de piernas", "quadriceps", "machine", "beginner", "leg-press", "Lower the sled until the knees reach 90 degrees and press back."),
    seed!("Walking Lunge", "Zancadas", "quadriceps", "bodyweight", "beginner", "walking-lunge", "Step forward and lower the back knee toward the floor."),
    seed!("Leg Extension", "Extensión de cuádriceps", "quadriceps", "machine", "beginner", "leg-extension", "Extend the knees fully and lower slowly."),
    seed!("Romanian Deadlift", "Peso muerto rumano", "hamstrings", "barbell", "intermediate", "romanian-deadlift", "Push the hips back with soft knees until a hamstring stretch is felt."),
    seed!("Lying Leg Curl", "Curl femoral tumbado", "hamstrings", "machine", "beginner", "leg-curl", "Curl the heels toward the glutes without lifting the hips."),
    seed!("Hip Thrust", "Hip thrust", "glutes", "barbell", "intermediate", "hip-thrust", "Drive the hips up until the torso is parallel to the floor and squeeze."),
    seed!("Glute Bridge", "Puente de glúteos", "glutes", "bodyweight", "beginner", "glute-bridge", "Lift the hips from the floor by squeezing the glutes."),
    seed!("Bulgarian Split Squat", "Sentadilla búlgara", "glutes", "dumbbells", "intermediate", "bulgarian-split-squat", "Rear foot on a bench, lower straight down on the front leg."),
    seed!("Standing Calf Raise", "Elevación de gemelos de pie", "calves", "machine", "beginner", "calf-raise", "Rise onto the toes and lower below the step for a full stretch."),
    // Core
    seed!("Plank", "Plancha", "abs", "bodyweight", "beginner", "plank", "Hold a straight line on the forearms while bracing the stomach."),
    seed!("Crunch", "Abdominales crunch", "abs", "bodyweight", "beginner", "crunch", "Curl the ribs toward the pelvis without pulling on the neck."),
    seed!("Hanging Leg Raise", "Elevación de piernas colgado", "abs", "pull-up bar", "advanced", "hanging-leg-raise", "Hang from the bar and raise the legs without swinging."),
    seed!("Russian Twist", "Giro ruso", "abs", "bodyweight", "beginner", "russian-twist", "Lean back slightly and rotate the torso side to side."),
    seed!("Mountain Climber", "Escaladores", "abs", "bodyweight", "beginner", "mountain-climber", "From a high plank, drive the knees toward the chest alternately."),
    // Cardio / full body
    seed!("Jumping Jacks", "Saltos de tijera", "cardio", "bodyweight", "beginner", "jumping-jacks", "Jump the feet out while raising the arms overhead, then return."),
    seed!("Burpee", "Burpees", "full_body", "bodyweight", "intermediate", "burpee", "Squat, jump the feet back to a plank, return, and jump up."),
    seed!("Kettlebell Swing", "Swing con kettlebell", "full_body", "kettlebell", "intermediate", "kettlebell-swing", "Hinge and snap the hips to swing the kettlebell to chest height."),
    seed!("Rowing Machine", "Remo ergómetro", "cardio", "machine", "beginner", "rowing-machine", "Drive with the legs, then lean back and pull the handle to the ribs."),
    seed!("Treadmill Run", "Carrera en cinta", "cardio", "machine", "beginner", "treadmill-run", "Run at a conversational pace with a slight forward lean."),
    seed!("Jump Rope", "Saltar la cuerda", "cardio", "jump rope", "beginner", "jump-rope", "Turn the rope with the wrists and land softly on the balls of the feet."),
];

/// Extra media library titles that are not catalog names: `(title, media file)`
const GIF_LIBRARY_ALIASES: &[(&str, &str)] = &[
    ("Bench Press", "barbell-bench-press"),
    ("Flat Bench Press", "barbell-bench-press"),
    ("Squat", "barbell-squat"),
    ("Back Squat", "barbell-squat"),
    ("Military Press", "overhead-press"),
    ("Bent Over Row", "barbell-row"),
    ("Chin-Up", "pull-up"),
    ("Bicep Curl", "barbell-curl"),
    ("Dumbbell Curl", "hammer-curl"),
    ("Triceps Pushdown", "tricep-pushdown"),
    ("Lunge", "walking-lunge"),
    ("Leg Curl", "leg-curl"),
    ("Calf Raise", "calf-raise"),
    ("Sit-Up", "crunch"),
    ("Side Plank", "plank"),
    ("Rowing", "rowing-machine"),
    ("Running", "treadmill-run"),
];

/// Movement keywords (folded) and the clip shown for them; more specific first
const KEYWORD_GIFS: &[(&str, &str)] = &[
    ("romanian", "romanian-deadlift"),
    ("rumano", "romanian-deadlift"),
    ("deadlift", "deadlift"),
    ("peso muerto", "deadlift"),
    ("bulgarian", "bulgarian-split-squat"),
    ("bulgara", "bulgarian-split-squat"),
    ("goblet", "goblet-squat"),
    ("squat", "barbell-squat"),
    ("sentadilla", "barbell-squat"),
    ("leg press", "leg-press"),
    ("prensa", "leg-press"),
    ("lunge", "walking-lunge"),
    ("zancada", "walking-lunge"),
    ("hip thrust", "hip-thrust"),
    ("bridge", "glute-bridge"),
    ("puente", "glute-bridge"),
    ("calf", "calf-raise"),
    ("gemelo", "calf-raise"),
    ("incline", "incline-dumbbell-press"),
    ("inclinado", "incline-dumbbell-press"),
    ("bench", "barbell-bench-press"),
    ("banca", "barbell-bench-press"),
    ("push-up", "push-up"),
    ("push up", "push-up"),
    ("pushup", "push-up"),
    ("flexion", "push-up"),
    ("fly", "dumbbell-fly"),
    ("apertura", "dumbbell-fly"),
    ("pull-up", "pull-up"),
    ("pull up", "pull-up"),
    ("chin", "pull-up"),
    ("dominada", "pull-up"),
    ("pulldown", "lat-pulldown"),
    ("jalon", "lat-pulldown"),
    ("row", "barbell-row"),
    ("remo", "barbell-row"),
    ("overhead", "overhead-press"),
    ("militar", "overhead-press"),
    ("shoulder press", "dumbbell-shoulder-press"),
    ("lateral", "lateral-raise"),
    ("face pull", "face-pull"),
    ("hammer", "hammer-curl"),
    ("martillo", "hammer-curl"),
    ("curl", "barbell-curl"),
    ("pushdown", "tricep-pushdown"),
    ("dip", "bench-dip"),
    ("fondo", "bench-dip"),
    ("skull", "skull-crusher"),
    ("plank", "plank"),
    ("plancha", "plank"),
    ("crunch", "crunch"),
    ("leg raise", "hanging-leg-raise"),
    ("twist", "russian-twist"),
    ("climber", "mountain-climber"),
    ("escalador", "mountain-climber"),
    ("burpee", "burpee"),
    ("swing", "kettlebell-swing"),
    ("jumping jack", "jumping-jacks"),
    ("rope", "jump-rope"),
    ("cuerda", "jump-rope"),
    ("run", "treadmill-run"),
    ("carrera", "treadmill-run"),
];

/// Generic clip per canonical muscle group
const MUSCLE_GROUP_GIFS: &[(&str, &str)] = &[
    ("chest", "push-up"),
    ("back", "lat-pulldown"),
    ("shoulders", "dumbbell-shoulder-press"),
    ("biceps", "barbell-curl"),
    ("triceps", "tricep-pushdown"),
    ("forearms", "wrist-curl"),
    ("quadriceps", "goblet-squat"),
    ("hamstrings", "romanian-deadlift"),
    ("glutes", "glute-bridge"),
    ("calves", "calf-raise"),
    ("abs", "plank"),
    ("cardio", "jumping-jacks"),
    ("full_body", "burpee"),
];

/// Fallback clip for unknown muscle groups
const DEFAULT_GIF: &str = "burpee";

/// Accented characters and their folded form; shared with the SQL-side folding
pub const ACCENT_FOLDS: &[(char, char)] = &[
    ('á', 'a'),
    ('à', 'a'),
    ('ä', 'a'),
    ('â', 'a'),
    ('Á', 'a'),
    ('À', 'a'),
    ('Ä', 'a'),
    ('Â', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ë', 'e'),
    ('ê', 'e'),
    ('É', 'e'),
    ('È', 'e'),
    ('Ë', 'e'),
    ('Ê', 'e'),
    ('í', 'i'),
    ('ì', 'i'),
    ('ï', 'i'),
    ('î', 'i'),
    ('Í', 'i'),
    ('Ì', 'i'),
    ('Ï', 'i'),
    ('Î', 'i'),
    ('ó', 'o'),
    ('ò', 'o'),
    ('ö', 'o'),
    ('ô', 'o'),
    ('Ó', 'o'),
    ('Ò', 'o'),
    ('Ö', 'o'),
    ('Ô', 'o'),
    ('ú', 'u'),
    ('ù', 'u'),
    ('ü', 'u'),
    ('û', 'u'),
    ('Ú', 'u'),
    ('Ù', 'u'),
    ('Ü', 'u'),
    ('Û', 'u'),
    ('ñ', 'n'),
    ('Ñ', 'n'),
    ('ç', 'c'),
    ('Ç', 'c'),
];

/// Curated synonyms (already folded) mapping to canonical muscle groups
const MUSCLE_GROUP_ALIASES: &[(&str, &[&str])] = &[
    ("pierna", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("piernas", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("leg", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("legs", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("tren inferior", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("lower body", &["quadriceps", "hamstrings", "glutes", "calves"]),
    ("pecho", &["chest"]),
    ("pectoral", &["chest"]),
    ("pectorales", &["chest"]),
    ("chest", &["chest"]),
    ("espalda", &["back"]),
    ("back", &["back"]),
    ("dorsales", &["back"]),
    ("hombro", &["shoulders"]),
    ("hombros", &["shoulders"]),
    ("shoulder", &["shoulders"]),
    ("shoulders", &["shoulders"]),
    ("brazo", &["biceps", "triceps", "forearms"]),
    ("brazos", &["biceps", "triceps", "forearms"]),
    ("arms", &["biceps", "triceps", "forearms"]),
    ("biceps", &["biceps"]),
    ("triceps", &["triceps"]),
    ("antebrazo", &["forearms"]),
    ("antebrazos", &["forearms"]),
    ("forearms", &["forearms"]),
    ("cuadriceps", &["quadriceps"]),
    ("quads", &["quadriceps"]),
    ("quadriceps", &["quadriceps"]),
    ("isquiotibiales", &["hamstrings"]),
    ("femoral", &["hamstrings"]),
    ("femorales", &["hamstrings"]),
    ("hamstrings", &["hamstrings"]),
    ("gluteo", &["glutes"]),
    ("gluteos", &["glutes"]),
    ("glutes", &["glutes"]),
    ("gemelos", &["calves"]),
    ("pantorrillas", &["calves"]),
    ("calves", &["calves"]),
    ("abdomen", &["abs"]),
    ("abdominales", &["abs"]),
    ("abs", &["abs"]),
    ("core", &["abs"]),
    ("cardio", &["cardio"]),
    ("cuerpo completo", &["full_body"]),
    ("full body", &["full_body"]),
];

/// How a search term filters the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    /// Exact alias hit: `muscle_group IN (...)`
    MuscleGroups(&'static [&'static str]),
    /// Folded substring matched against name, Spanish name, and muscle group
    Pattern(String),
}

/// Lowercase and strip diacritics
#[must_use]
pub fn fold_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            ACCENT_FOLDS
                .iter()
                .find(|(accented, _)| *accented == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fold accents, trim, and collapse internal whitespace
#[must_use]
pub fn normalize_query(input: &str) -> String {
    fold_accents(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a free-text term; `None` for a blank term
///
/// An alias wins only when the normalized term is exactly an alias key;
/// anything else becomes a substring pattern.
#[must_use]
pub fn resolve_search(term: &str) -> Option<SearchFilter> {
    let normalized = normalize_query(term);
    if normalized.is_empty() {
        return None;
    }
    let filter = MUSCLE_GROUP_ALIASES
        .iter()
        .find(|(key, _)| *key == normalized)
        .map_or_else(
            || SearchFilter::Pattern(normalized.clone()),
            |(_, groups)| SearchFilter::MuscleGroups(*groups),
        );
    Some(filter)
}

/// Folded, punctuation-free comparison key
fn loose_key(input: &str) -> String {
    fold_accents(input)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Pass 1: the name is exactly a media library title (case-insensitive)
#[must_use]
pub fn exact_name_gif(name: &str) -> Option<String> {
    let name = name.trim();
    SEED_EXERCISES
        .iter()
        .map(|seed| (seed.name, seed.gif))
        .chain(GIF_LIBRARY_ALIASES.iter().copied())
        .find(|(title, _)| title.eq_ignore_ascii_case(name))
        .map(|(_, gif)| gif_url(gif))
}

/// Pass 2: the name matches a seed entry (English or Spanish) ignoring accents,
/// case, and punctuation
#[must_use]
pub fn seed_name_gif(name: &str) -> Option<String> {
    let key = loose_key(name);
    if key.is_empty() {
        return None;
    }
    SEED_EXERCISES
        .iter()
        .find(|seed| loose_key(seed.name) == key || loose_key(seed.name_es) == key)
        .map(SeedExercise::gif_url)
}

/// Alphanumeric runs of the folded input
fn words(input: &str) -> Vec<String> {
    fold_accents(input)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Keyword words appear consecutively in `name_words`; the last one may be a
/// prefix so plurals match ("squats", "flexiones") but "machine" is not "chin"
fn has_keyword(name_words: &[String], keyword: &str) -> bool {
    let keyword_words = words(keyword);
    let Some((last, leading)) = keyword_words.split_last() else {
        return false;
    };
    name_words.windows(keyword_words.len()).any(|window| {
        window[..leading.len()] == *leading && window[leading.len()].starts_with(last.as_str())
    })
}

/// First keyword entry matching the name, as a media file stem
fn keyword_file(name: &str) -> Option<&'static str> {
    let name_words = words(name);
    KEYWORD_GIFS
        .iter()
        .find(|(keyword, _)| has_keyword(&name_words, keyword))
        .map(|(_, gif)| *gif)
}

/// Pass 3: the name contains a movement keyword as whole words
#[must_use]
pub fn keyword_gif(name: &str) -> Option<String> {
    keyword_file(name).map(gif_url)
}

/// Pass 4: generic clip for the muscle group (always assigns something)
#[must_use]
pub fn muscle_group_default_gif(muscle_group: &str) -> String {
    let group = normalize_query(muscle_group).replace(' ', "_");
    let file = MUSCLE_GROUP_GIFS
        .iter()
        .find(|(known, _)| *known == group)
        .map_or(DEFAULT_GIF, |(_, gif)| *gif);
    gif_url(file)
}

/// Best-effort muscle group for an exercise name outside the catalog
#[must_use]
pub fn guess_muscle_group(name: &str) -> &'static str {
    let key = loose_key(name);
    if let Some(seed) = SEED_EXERCISES
        .iter()
        .find(|seed| loose_key(seed.name) == key || loose_key(seed.name_es) == key)
    {
        return seed.muscle_group;
    }
    keyword_file(name)
        .and_then(|gif| SEED_EXERCISES.iter().find(|seed| seed.gif == gif))
        .map_or("full_body", |seed| seed.muscle_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcoach_core::models::MUSCLE_GROUPS;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Jalón al PECHO"), "jalon al pecho");
        assert_eq!(fold_accents("Glúteos Ñandú"), "gluteos nandu");
        assert_eq!(normalize_query("  Cuerpo   Completo "), "cuerpo completo");
    }

    #[test]
    fn test_alias_requires_exact_key() {
        assert_eq!(
            resolve_search("Pierna"),
            Some(SearchFilter::MuscleGroups(&[
                "quadriceps",
                "hamstrings",
                "glutes",
                "calves"
            ]))
        );
        assert_eq!(
            resolve_search("GLÚTEOS"),
            Some(SearchFilter::MuscleGroups(&["glutes"]))
        );
        // Not an exact key: substring search instead
        assert_eq!(
            resolve_search("prensa de pierna"),
            Some(SearchFilter::Pattern("prensa de pierna".into()))
        );
        assert_eq!(resolve_search("   "), None);
    }

    #[test]
    fn test_catalog_is_consistent() {
        let mut names = std::collections::HashSet::new();
        for seed in SEED_EXERCISES {
            assert!(names.insert(seed.name), "duplicate seed {}", seed.name);
            assert!(
                MUSCLE_GROUPS.contains(&seed.muscle_group),
                "unknown group {}",
                seed.muscle_group
            );
        }
        for (_, groups) in MUSCLE_GROUP_ALIASES {
            assert!(groups.iter().all(|g| MUSCLE_GROUPS.contains(g)));
        }
        for (group, _) in MUSCLE_GROUP_GIFS {
            assert!(MUSCLE_GROUPS.contains(group));
        }
    }

    #[test]
    fn test_gif_passes() {
        assert_eq!(
            exact_name_gif("bench press").as_deref(),
            Some("https://cdn.fitcoach.app/exercises/barbell-bench-press.gif")
        );
        assert!(exact_name_gif("Bench-Press").is_none());

        assert_eq!(
            seed_name_gif("Sentadilla Búlgara").as_deref(),
            Some("https://cdn.fitcoach.app/exercises/bulgarian-split-squat.gif")
        );
        assert_eq!(
            seed_name_gif("push up").as_deref(),
            Some("https://cdn.fitcoach.app/exercises/push-up.gif")
        );

        assert_eq!(
            keyword_gif("Paused Front Squat").as_deref(),
            Some("https://cdn.fitcoach.app/exercises/barbell-squat.gif")
        );
        assert!(keyword_gif("Turkish get-up").is_none());

        assert_eq!(
            muscle_group_default_gif("Full Body"),
            "https://cdn.fitcoach.app/exercises/burpee.gif"
        );
        assert_eq!(
            muscle_group_default_gif("neck"),
            "https://cdn.fitcoach.app/exercises/burpee.gif"
        );
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let gif = |file: &str| Some(gif_url(file));

        assert_eq!(keyword_gif("Chest Press Machine"), None);
        assert_eq!(keyword_gif("Weighted Chin-Up"), gif("pull-up"));
        assert_eq!(keyword_gif("Arrow Drill"), None);
        assert_eq!(keyword_gif("Seated Cable Rows"), gif("barbell-row"));
        assert_eq!(keyword_gif("Bicycle Crunch"), gif("crunch"));
        assert_eq!(keyword_gif("Brunch Walk"), None);
        assert_eq!(keyword_gif("Interval Running"), gif("treadmill-run"));
        assert_eq!(keyword_gif("Reverse Lunges"), gif("walking-lunge"));
        assert_eq!(keyword_gif("Peso Muerto Sumo"), gif("deadlift"));
        assert_eq!(keyword_gif("Diamond Push-ups"), gif("push-up"));
    }

    #[test]
    fn test_guess_muscle_group() {
        assert_eq!(guess_muscle_group("Flexiones"), "chest");
        assert_eq!(guess_muscle_group("Cable Lateral Raise"), "shoulders");
        assert_eq!(guess_muscle_group("Turkish get-up"), "full_body");
    }
}
