use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Static allow/deny lists consulted by the entity classifier.
///
/// `vip_allow` may overlap `banned_exact`; the denylist wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub banned_exact: HashSet<String>,
    /// Literal suffixes such as `_(series)`; the tag must end with one to be rejected.
    pub banned_suffixes: Vec<String>,
    pub vip_allow: HashSet<String>,
}

const BANNED_EXACT: &[&str] = &[
    "star_(symbol)", "star_(sky)", "pom_pom_(clothes)", "shrug_(clothing)",
    "poke_ball_(basic)", "vision_(genshin_impact)", "sensei_(blue_archive)",
    "idolmaster_(classic)", "mahou_shoujo_madoka_magica_(anime)",
    "admiral_(kancolle)", "producer_(idolmaster)", "commander_(azur_lane)",
    "doctor_(arknights)", "traveler_(genshin_impact)", "trainer_(pokemon)",
    "summoner_(fire_emblem)", "gudako_(fate/grand_order)", "unknown_(series)",
    "check_commentary_(request)", "translation_(request)", "original_(character)",
    "spot_the_difference", "comic", "monochrome", "heart", "exclamation_point",
];

const BANNED_SUFFIXES: &[&str] = &[
    "_(series)", "_(medium)", "_(style)", "_(source)",
    "_(cosplay)", "_(object)", "_(group)", "_(production)",
    "_(creature)", "_(game)", "_(request)", "_(event)",
    "_(art_style)", "_(artist)", "_(lore)", "_(meta)",
    "_(costume)", "_(parody)",
];

const VIP_ALLOW: &[&str] = &[
    "hatsune_miku", "hakurei_reimu", "kirisame_marisa",
    "remilia_scarlet", "flandre_scarlet", "kochiya_sanae",
    "izayoi_sakuya", "konpaku_youmu", "cirno", "kagamine_rin",
];

static DEFAULT_RULES: Lazy<RuleSet> = Lazy::new(|| RuleSet {
    banned_exact: BANNED_EXACT.iter().map(|s| s.to_string()).collect(),
    banned_suffixes: BANNED_SUFFIXES.iter().map(|s| s.to_string()).collect(),
    vip_allow: VIP_ALLOW.iter().map(|s| s.to_string()).collect(),
});

impl Default for RuleSet {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl RuleSet {
    pub fn new<I, J, K, S>(banned_exact: I, banned_suffixes: J, vip_allow: K) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            banned_exact: banned_exact.into_iter().map(Into::into).collect(),
            banned_suffixes: banned_suffixes.into_iter().map(Into::into).collect(),
            vip_allow: vip_allow.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a rule set from a JSON file with the same field names as this struct.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading rule set {}", path.display()))?;
        serde_json::from_str(&text).context("parsing rule set JSON")
    }

    pub fn is_banned(&self, tag: &str) -> bool {
        self.banned_exact.contains(tag)
    }

    pub fn is_vip(&self, tag: &str) -> bool {
        self.vip_allow.contains(tag)
    }

    pub fn has_banned_suffix(&self, tag: &str) -> bool {
        self.banned_suffixes.iter().any(|s| tag.ends_with(s.as_str()))
    }
}
