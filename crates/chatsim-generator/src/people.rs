//! Deterministic synthetic sender directory.
//!
//! Builds a list of senders from curated name lists. The first two entries
//! are always the fixed admin/mod accounts; the rest are drawn from a single
//! [`XorShift32`] stream seeded with `seedBase`.

use crate::hash::content_hash;
use crate::rng::XorShift32;
use crate::vocab::SPECIAL_SENDERS;
use chatsim_core::{Role, Sender, SenderDirectory};
use tracing::debug;

const MALE: &[&str] = &[
    "Trader Joe", "Rex", "Omar", "Kofi", "Noah", "Liam", "Zed", "Ethan", "Daniel", "Samuel",
    "Ahmed", "Ibrahim", "Mike", "Carlos", "David",
];

const FEMALE: &[&str] = &[
    "Luna", "Maya", "Nina", "Ava", "Olivia", "Zara", "Amara", "Sophie", "Yara", "Mia", "Chloe",
    "Lola", "Aisha", "Hana", "Leah",
];

const NEUTRAL: &[&str] = &[
    "Sage", "Sky", "River", "Jules", "Rowan", "Casey", "Alex", "Kai", "Chris", "Sam",
];

const AVATAR_PROVIDERS: &[&str] = &[
    "https://api.dicebear.com/8.x/thumbs/svg?seed={seed}",
    "https://api.dicebear.com/8.x/identicon/svg?seed={seed}",
    "https://api.multiavatar.com/{seed}.png",
    "https://ui-avatars.com/api/?name={seed}&background=111827&color=ffffff&bold=true",
    "https://robohash.org/{seed}.png?set=set4",
];

/// The name pool always holds at least this many candidates.
const MIN_NAME_POOL: usize = 120;

/// Probability a regular member is promoted to MOD.
const MOD_PROMOTION_CHANCE: f64 = 0.008;

/// Directory generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeopleConfig {
    /// Number of senders, at least 10
    pub size: usize,
    pub seed_base: u32,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            size: 4872,
            seed_base: 2026,
        }
    }
}

/// Generated sender directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticPeople {
    people: Vec<Sender>,
}

impl SyntheticPeople {
    /// Generate the directory for `config`.
    pub fn generate(config: PeopleConfig) -> Self {
        let size = config.size.max(10);
        let mut rng = XorShift32::new(config.seed_base);

        let name_pool = build_name_pool(&mut rng, size.max(MIN_NAME_POOL));

        let mut people = Vec::with_capacity(size);
        for idx in 0..size {
            let base = rng.pick(&name_pool).cloned().unwrap_or_else(|| {
                Candidate {
                    display_name: format!("Member {idx}"),
                    role: Role::Verified,
                }
            });

            let mut display_name = base.display_name;
            let suffix_roll = rng.index(1000);
            if idx >= SPECIAL_SENDERS.len() {
                if suffix_roll < 6 {
                    display_name = format!("{display_name} #{}", idx / 100 + 1);
                } else if suffix_roll > 995 {
                    display_name = format!("{display_name} Jr");
                }
            }

            let mut role = base.role;
            if role == Role::Verified && rng.chance(MOD_PROMOTION_CHANCE) {
                role = Role::Mod;
            }

            let avatar = build_avatar(&display_name, idx);
            people.push(Sender {
                name: lowercase_key(&display_name),
                display_name,
                role,
                avatar_ref: avatar,
            });
        }

        for (pos, (name, display, role)) in SPECIAL_SENDERS.iter().enumerate() {
            if let Some(slot) = people.get_mut(pos) {
                *slot = Sender::new(*name, *display, *role).with_avatar(build_avatar(
                    &format!("{display}_{}", config.seed_base),
                    pos,
                ));
            }
        }

        debug!("Generated {} synthetic senders", people.len());
        Self { people }
    }

    pub fn people(&self) -> &[Sender] {
        &self.people
    }

    pub fn into_inner(self) -> Vec<Sender> {
        self.people
    }
}

impl SenderDirectory for SyntheticPeople {
    fn len(&self) -> usize {
        self.people.len()
    }

    fn sender(&self, index: usize) -> Option<&Sender> {
        self.people.get(index)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    display_name: String,
    role: Role,
}

/// Specials first, then names cycled from the three lists, with a `#n`
/// suffix once a list wraps around.
fn build_name_pool(rng: &mut XorShift32, target: usize) -> Vec<Candidate> {
    let mut pool: Vec<Candidate> = SPECIAL_SENDERS
        .iter()
        .map(|(_, display, role)| Candidate {
            display_name: display.to_string(),
            role: *role,
        })
        .collect();

    let mut i = 0;
    while pool.len() < target {
        let list = match rng.index(3) {
            0 => MALE,
            1 => FEMALE,
            _ => NEUTRAL,
        };
        let cycle = i / list.len();
        let name = list[i % list.len()];
        let display_name = if cycle > 0 {
            format!("{name} #{}", cycle + 1)
        } else {
            name.to_string()
        };
        pool.push(Candidate {
            display_name,
            role: Role::Verified,
        });
        i += 1;
    }
    pool
}

/// Avatar URL from one of the providers, chosen by name hash and index.
fn build_avatar(name: &str, idx: usize) -> String {
    let provider = (content_hash(name) as usize).wrapping_add(idx) % AVATAR_PROVIDERS.len();
    AVATAR_PROVIDERS[provider].replace("{seed}", &encode_seed(name))
}

/// Percent-encode everything outside the URL unreserved set.
fn encode_seed(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `Trader Joe #2` -> `trader_joe_#2`
fn lowercase_key(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
