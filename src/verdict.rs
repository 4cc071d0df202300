use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Negative,
    Neutral,
}

/// Severity band of the message shown alongside a verdict. Positive uses
/// A..C, negative uses A..D, neutral is always A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MessageTier {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub verdict: Verdict,
    pub tier: MessageTier,
}

impl Classification {
    /// Copy key used by the renderers, e.g. `negative_c`.
    pub fn token(&self) -> String {
        let verdict = match self.verdict {
            Verdict::Positive => "positive",
            Verdict::Negative => "negative",
            Verdict::Neutral => "neutral",
        };
        let tier = match self.tier {
            MessageTier::A => "a",
            MessageTier::B => "b",
            MessageTier::C => "c",
            MessageTier::D => "d",
        };
        format!("{verdict}_{tier}")
    }
}

pub fn classify(positive: f64, negative: f64) -> Classification {
    if positive > negative {
        let tier = match positive {
            p if p < 30.0 => MessageTier::A,
            p if p < 60.0 => MessageTier::B,
            _ => MessageTier::C,
        };
        Classification {
            verdict: Verdict::Positive,
            tier,
        }
    } else if positive < negative {
        // Negative bands are wider than the positive ones.
        let tier = match negative {
            n if n < 30.0 => MessageTier::A,
            n if n < 70.0 => MessageTier::B,
            n if n < 90.0 => MessageTier::C,
            _ => MessageTier::D,
        };
        Classification {
            verdict: Verdict::Negative,
            tier,
        }
    } else {
        Classification {
            verdict: Verdict::Neutral,
            tier: MessageTier::A,
        }
    }
}

/// Copy and icon for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Narration {
    pub headline: &'static str,
    pub icon: &'static str,
}

pub fn narration(classification: &Classification) -> Narration {
    let (headline, icon) = match (classification.verdict, classification.tier) {
        (Verdict::Positive, MessageTier::A) => (
            "There were a few bright spots in this period. Keep noticing what helped.",
            "positive_low.png",
        ),
        (Verdict::Positive, MessageTier::B) => (
            "Your check-ins leaned positive. Keep building on what is working.",
            "positive_mid.png",
        ),
        (Verdict::Positive, _) => (
            "You have been feeling good most of the time. Well done looking after yourself.",
            "positive_high.png",
        ),
        (Verdict::Negative, MessageTier::A) => (
            "Things were slightly harder than usual. Small routines can help.",
            "negative_low.png",
        ),
        (Verdict::Negative, MessageTier::B) => (
            "This period has been challenging. Try to make time for what restores you.",
            "negative_mid.png",
        ),
        (Verdict::Negative, MessageTier::C) => (
            "Most of your check-ins were difficult. Consider reaching out to someone you trust.",
            "negative_high.png",
        ),
        (Verdict::Negative, MessageTier::D) => (
            "You have been struggling a lot lately. Please consider speaking to a professional.",
            "negative_severe.png",
        ),
        (Verdict::Neutral, _) => (
            "Your mood has been balanced between positive and negative.",
            "neutral.png",
        ),
    };
    Narration { headline, icon }
}
