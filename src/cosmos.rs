//! Decorative content for the chat page

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

pub const SPACE_FACTS: &[&str] = &[
    "A year on Venus is shorter than its day.",
    "Neutron stars can spin at a rate of 600 rotations per second.",
    "There is a planet made of diamonds twice the size of Earth.",
    "The footprints on the Moon will last for 100 million years.",
    "The largest known star, UY Scuti, is 1,700 times wider than the Sun.",
];

pub const GUIDE_STEPS: &[&str] = &[
    "Ask your question to the AI in the cosmic input field.",
    "Adjust the AI's cosmic temperature and stardust tokens in the sidebar.",
    "Explore the universe of knowledge with Gemini!",
];

pub const EASTER_EGG: &str =
    "*whispers of the cosmos* You've discovered a hidden message in the stars! 🌟";

const EASTER_EGG_CHANCE: f64 = 0.1;

pub const ANIMATION_URL: &str =
    "https://assets9.lottiefiles.com/private_files/lf30_jtkhrafm.json";

/// Everything the page shows around the transcript
#[derive(Debug, Serialize)]
pub struct CosmicDecor {
    pub deep_space_time: String,
    pub guide: &'static [&'static str],
    pub animation_url: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easter_egg: Option<&'static str>,
}

impl CosmicDecor {
    pub fn roll(rng: &mut impl Rng, now: DateTime<Utc>) -> Self {
        Self {
            deep_space_time: deep_space_time(now),
            guide: GUIDE_STEPS,
            animation_url: ANIMATION_URL,
            easter_egg: rng.gen_bool(EASTER_EGG_CHANCE).then_some(EASTER_EGG),
        }
    }
}

pub fn random_space_fact(rng: &mut impl Rng) -> &'static str {
    SPACE_FACTS.choose(rng).copied().unwrap_or(SPACE_FACTS[0])
}

pub fn deep_space_time(now: DateTime<Utc>) -> String {
    format!("{} UTC", now.format("%Y-%m-%d %H:%M:%S"))
}
