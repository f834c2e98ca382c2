use serde::Serialize;

use crate::blanketing::BlanketCategory;
use crate::housing::HousingStatus;

/// What stable hands should put on each animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareInstructions {
    pub title: &'static str,
    pub emoji: &'static str,
    pub horses: &'static str,
    pub donkeys: &'static str,
    pub care_notes: Vec<&'static str>,
}

/// A care note that may read differently for horses outside and in the barn
#[derive(Debug, Clone, Copy)]
enum Note {
    Always(&'static str),
    ByHousing {
        out: &'static str,
        inside: &'static str,
    },
}

impl Note {
    fn text(&self, housing: HousingStatus) -> &'static str {
        match (*self, housing) {
            (Self::Always(text), _) => text,
            (Self::ByHousing { out, .. }, HousingStatus::Out) => out,
            (Self::ByHousing { inside, .. }, HousingStatus::In) => inside,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    title: &'static str,
    emoji: &'static str,
    horses: &'static str,
    donkeys: &'static str,
    notes: &'static [Note],
}

const NONE: Entry = Entry {
    title: "No Blanket Needed",
    emoji: "☀️",
    horses: "No blanketing required",
    donkeys: "No blanketing required",
    notes: &[Note::ByHousing {
        out: "Ensure adequate shade and water",
        inside: "Ensure adequate ventilation in barn",
    }],
};

const LIGHT: Entry = Entry {
    title: "Light Blanketing",
    emoji: "🧸",
    horses: "Turnout sheet without neck piece",
    donkeys: "No blanketing required",
    notes: &[Note::Always("Monitor for comfort and proper fit")],
};

const MEDIUM: Entry = Entry {
    title: "Medium Blanketing",
    emoji: "🧥",
    horses: "Fleece sheet + turnout sheet with neck piece over it",
    donkeys: "No blanketing required",
    notes: &[Note::Always("Check layering is secure and comfortable")],
};

const HEAVY: Entry = Entry {
    title: "Heavy Blanketing",
    emoji: "🥶",
    horses: "Weighted blanket with neck piece + turnout sheet without neck piece over it",
    donkeys: "Weighted blanket",
    notes: &[
        Note::Always("Check animals hourly for signs of cold stress"),
        Note::ByHousing {
            out: "Ensure adequate shelter and windbreak",
            inside: "Monitor closely even in barn environment",
        },
    ],
};

impl CareInstructions {
    pub fn for_category(category: BlanketCategory, housing: HousingStatus) -> Self {
        let entry = match category {
            BlanketCategory::None => &NONE,
            BlanketCategory::Light => &LIGHT,
            BlanketCategory::Medium => &MEDIUM,
            BlanketCategory::Heavy => &HEAVY,
        };
        Self {
            title: entry.title,
            emoji: entry.emoji,
            horses: entry.horses,
            donkeys: entry.donkeys,
            care_notes: entry.notes.iter().map(|note| note.text(housing)).collect(),
        }
    }
}

/// Instructions for a category name; unknown names get the no-blanket entry
pub fn care_instructions_for(category: &str, housing: HousingStatus) -> CareInstructions {
    let category = category.parse().unwrap_or(BlanketCategory::None);
    CareInstructions::for_category(category, housing)
}
