use crate::rules::RuleSet;

/// Outcome of running a tag through the classification rules, in the order they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Listed in `banned_exact`; beats every other rule.
    Denied,
    /// Neither allowlisted nor shaped like `name_(qualifier)`.
    NotEntityShaped,
    /// Shaped like an entity but the qualifier is a meta/series/style suffix.
    BannedSuffix,
    /// Allowlisted, and either unshaped or carrying an acceptable qualifier.
    Vip,
    Entity,
}

impl Verdict {
    pub fn is_entity(self) -> bool {
        matches!(self, Verdict::Vip | Verdict::Entity)
    }
}

/// `name_(qualifier)`: contains `_(` and ends with `)`.
pub fn has_entity_shape(tag: &str) -> bool {
    tag.contains("_(") && tag.ends_with(')')
}

#[derive(Debug, Clone, Default)]
pub struct EntityClassifier {
    rules: RuleSet,
}

impl EntityClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn verdict(&self, tag: &str) -> Verdict {
        if self.rules.is_banned(tag) {
            return Verdict::Denied;
        }
        let vip = self.rules.is_vip(tag);
        if !has_entity_shape(tag) {
            // a bare VIP has no qualifier for the suffix rule to inspect
            return if vip { Verdict::Vip } else { Verdict::NotEntityShaped };
        }
        if self.rules.has_banned_suffix(tag) {
            return Verdict::BannedSuffix;
        }
        if vip { Verdict::Vip } else { Verdict::Entity }
    }

    pub fn classify(&self, tag: &str) -> bool {
        self.verdict(tag).is_entity()
    }
}
