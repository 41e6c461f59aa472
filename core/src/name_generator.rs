//! Deterministic elf names from curated lists.

use crate::rng::RosterRng;

pub struct NameGenerator;

impl NameGenerator {
    /// "Given Family", e.g. "Pepper Minstix".
    pub fn full_name(rng: &mut RosterRng) -> String {
        format!("{} {}", Self::given_name(rng), Self::family_name(rng))
    }

    pub fn given_name(rng: &mut RosterRng) -> &'static str {
        rng.pick(GIVEN_NAMES).copied().unwrap_or("Jingle")
    }

    pub fn family_name(rng: &mut RosterRng) -> &'static str {
        rng.pick(FAMILY_NAMES).copied().unwrap_or("Bells")
    }
}

const GIVEN_NAMES: &[&str] = &[
    "Buddy", "Jingle", "Sparkle", "Twinkle", "Snowflake", "Holly", "Pepper", "Sugarplum",
    "Tinsel", "Cocoa", "Ginger", "Noel", "Frost", "Bushy", "Shinny", "Wunorse", "Alabaster",
    "Pippin", "Clove", "Nutmeg", "Juniper", "Merry", "Sprig", "Bramble", "Candy", "Flurry",
    "Glitter", "Hazel", "Ivy", "Marzipan", "Mistle", "Poinsettia", "Ribbon", "Sleigh",
    "Sprinkle", "Toffee", "Tumble", "Wren", "Yule", "Zephyr",
];

const FAMILY_NAMES: &[&str] = &[
    "Bells", "Evergreen", "Sparkles", "Snowball", "Minstix", "Upatree", "Hollyberry",
    "Candycane", "Gumdrop", "Frostbite", "Tinseltoes", "Winterbottom", "Mittens",
    "Pinecone", "Icicle", "Cranberry", "Stocking", "Chimney", "Garland", "Sugarsnap",
    "Lanternwick", "Peppermint", "Toyspinner", "Ribbonwrap", "Nutcracker",
];
