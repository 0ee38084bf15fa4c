#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenefitKind {
    Medicare,
    Debt,
    Auto,
    Mva,
}

impl BenefitKind {
    pub const ALL: [BenefitKind; 4] = [
        BenefitKind::Medicare,
        BenefitKind::Debt,
        BenefitKind::Auto,
        BenefitKind::Mva,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|kind| kind.key().eq_ignore_ascii_case(tag))
    }

    pub fn key(self) -> &'static str {
        match self {
            BenefitKind::Medicare => "Medicare",
            BenefitKind::Debt => "Debt",
            BenefitKind::Auto => "Auto",
            BenefitKind::Mva => "MVA",
        }
    }

    fn record(self) -> Benefit {
        match self {
            BenefitKind::Medicare => Benefit {
                kind: self,
                title: "Grocery Allowance Card",
                description: "Medicare Advantage plans in your area include a monthly allowance for groceries, utilities and over-the-counter items.",
                image: "/assets/benefits/medicare.png",
                badge: "Up to $3,000/yr",
                contact: "+18885550143",
                call_label: "Call to claim",
            },
            BenefitKind::Debt => Benefit {
                kind: self,
                title: "Debt Relief Program",
                description: "Consolidate credit card and medical debt into one lower monthly payment with no upfront fees.",
                image: "/assets/benefits/debt.png",
                badge: "Cut debt up to 50%",
                contact: "+18885550178",
                call_label: "Call to qualify",
            },
            BenefitKind::Auto => Benefit {
                kind: self,
                title: "Auto Insurance Savings",
                description: "Drivers with a clean record in your zip code are eligible for reduced premiums.",
                image: "/assets/benefits/auto.png",
                badge: "Save $500+",
                contact: "https://quotes.example-auto-savings.com/start",
                call_label: "Check my rate",
            },
            BenefitKind::Mva => Benefit {
                kind: self,
                title: "Accident Claim Review",
                description: "If you were injured in a motor vehicle accident in the last two years you may be owed compensation.",
                image: "/assets/benefits/mva.png",
                badge: "Free case review",
                contact: "+18885550112",
                call_label: "Call for review",
            },
        }
    }
}

/// Display record for one claimable benefit.
#[derive(Debug, Clone, PartialEq)]
pub struct Benefit {
    pub kind: BenefitKind,
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub badge: &'static str,
    /// Phone number to dial, or an http(s) link to open.
    pub contact: &'static str,
    pub call_label: &'static str,
}

impl Benefit {
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }
}

/// Maps offer tags to benefits, keeping tag order. Unknown and repeated tags are dropped.
pub fn benefits_for_tags<S: AsRef<str>>(tags: &[S]) -> Vec<Benefit> {
    let mut seen = Vec::new();
    tags.iter()
        .filter_map(|tag| BenefitKind::from_tag(tag.as_ref()))
        .filter(|kind| {
            if seen.contains(kind) {
                false
            } else {
                seen.push(*kind);
                true
            }
        })
        .map(BenefitKind::record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_tag_order_and_drops_unknown_tags() {
        let benefits = benefits_for_tags(&["Auto", "Solar", "Medicare", "MVA"]);
        let keys: Vec<_> = benefits.iter().map(Benefit::key).collect();
        assert_eq!(keys, vec!["Auto", "Medicare", "MVA"]);
    }

    #[test]
    fn tag_matching_ignores_case_and_whitespace() {
        assert_eq!(BenefitKind::from_tag(" mva "), Some(BenefitKind::Mva));
        assert_eq!(BenefitKind::from_tag("debt"), Some(BenefitKind::Debt));
        assert_eq!(BenefitKind::from_tag("Pets"), None);
    }

    #[test]
    fn repeated_tags_yield_one_benefit() {
        let benefits = benefits_for_tags(&["Debt", "Debt", "debt"]);
        assert_eq!(benefits.len(), 1);
    }

    #[test]
    fn empty_tags_yield_no_benefits() {
        let tags: Vec<String> = Vec::new();
        assert!(benefits_for_tags(&tags).is_empty());
    }
}
