use serde::Serialize;

/// Number of steps in one prayer cycle.
pub const STEP_COUNT: usize = 12;

/// Index of the final step.
pub const LAST_STEP_INDEX: usize = STEP_COUNT - 1;

/// Default duration of every step in seconds (12 x 5 min = 60 min).
pub const DEFAULT_STEP_DURATION_SECS: u32 = 300;

/// One fixed segment of the prayer cycle.
///
/// Text lives in the host's translation tables; `name_key` and
/// `description_key` index into them. `label` is the English fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrayerStep {
    pub id: u8,
    pub name_key: &'static str,
    pub description_key: &'static str,
    pub label: &'static str,
    pub duration_secs: u32,
}

const fn step(
    id: u8,
    name_key: &'static str,
    description_key: &'static str,
    label: &'static str,
) -> PrayerStep {
    PrayerStep {
        id,
        name_key,
        description_key,
        label,
        duration_secs: DEFAULT_STEP_DURATION_SECS,
    }
}

/// The cycle, in order. Steps 0 and 11 share their text keys but are
/// distinct entries; never reorder.
pub const PRAYER_STEPS: [PrayerStep; STEP_COUNT] = [
    step(0, "steps.praise.name", "steps.praise.description", "Praise"),
    step(1, "steps.waiting.name", "steps.waiting.description", "Waiting"),
    step(2, "steps.confession.name", "steps.confession.description", "Confession"),
    step(3, "steps.scripture.name", "steps.scripture.description", "Scripture Praying"),
    step(4, "steps.watching.name", "steps.watching.description", "Watching"),
    step(5, "steps.intercession.name", "steps.intercession.description", "Intercession"),
    step(6, "steps.petition.name", "steps.petition.description", "Petition"),
    step(7, "steps.thanksgiving.name", "steps.thanksgiving.description", "Thanksgiving"),
    step(8, "steps.singing.name", "steps.singing.description", "Singing"),
    step(9, "steps.meditation.name", "steps.meditation.description", "Meditation"),
    step(10, "steps.listening.name", "steps.listening.description", "Listening"),
    step(11, "steps.praise.name", "steps.praise.description", "Praise"),
];

/// Look up a step by index, clamping out-of-range indices to the last step.
pub fn step_at(index: usize) -> &'static PrayerStep {
    &PRAYER_STEPS[index.min(LAST_STEP_INDEX)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_has_12_steps_in_id_order() {
        assert_eq!(PRAYER_STEPS.len(), 12);
        for (i, s) in PRAYER_STEPS.iter().enumerate() {
            assert_eq!(s.id as usize, i);
        }
    }

    #[test]
    fn first_and_last_steps_are_both_praise() {
        assert_eq!(PRAYER_STEPS[0].name_key, PRAYER_STEPS[11].name_key);
        assert_ne!(PRAYER_STEPS[0].id, PRAYER_STEPS[11].id);
    }

    #[test]
    fn step_at_clamps() {
        assert_eq!(step_at(40).id, 11);
    }
}
