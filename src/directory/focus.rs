use crate::directory::model::InvestorDto;
use std::str::FromStr;

/// 三个关注领域。过滤一律以存储的布尔标记为准，不看 sectors 文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ai,
    Fintech,
    Music,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Ai, Focus::Fintech, Focus::Music];

    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Ai => "ai",
            Focus::Fintech => "fintech",
            Focus::Music => "music",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Focus::Ai => "AI/ML",
            Focus::Fintech => "Fintech",
            Focus::Music => "Music Tech",
        }
    }

    pub fn matches(&self, investor: &InvestorDto) -> bool {
        match self {
            Focus::Ai => investor.has_ai_focus,
            Focus::Fintech => investor.has_fintech_focus,
            Focus::Music => investor.has_music_focus,
        }
    }
}

impl FromStr for Focus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ai" | "ml" | "ai/ml" => Ok(Focus::Ai),
            "fintech" => Ok(Focus::Fintech),
            "music" => Ok(Focus::Music),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusFlags {
    pub ai: bool,
    pub fintech: bool,
    pub music: bool,
}

const AI_TERMS: [&str; 4] = ["ai", "ml", "machine learning", "artificial intelligence"];
const MUSIC_TERMS: [&str; 2] = ["music", "entertainment"];
const FINTECH_TERMS: [&str; 3] = ["fintech", "finance", "banking"];

/// 由 sectors + investment_focus 文本推导关注标记（子串匹配，不分大小写）
pub fn derive_focus_flags(sectors: Option<&str>, investment_focus: Option<&str>) -> FocusFlags {
    let combined = format!(
        "{} {}",
        sectors.unwrap_or_default(),
        investment_focus.unwrap_or_default()
    )
    .to_lowercase();
    let any = |terms: &[&str]| terms.iter().any(|t| combined.contains(t));

    FocusFlags {
        ai: any(&AI_TERMS[..]),
        fintech: any(&FINTECH_TERMS[..]),
        music: any(&MUSIC_TERMS[..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_sectors_and_focus_text() {
        let flags = derive_focus_flags(Some("Fintech, AI/ML, Enterprise Software"), None);
        assert_eq!(
            flags,
            FocusFlags {
                ai: true,
                fintech: true,
                music: false
            }
        );

        let flags = derive_focus_flags(Some("Consumer"), Some("Music & Entertainment"));
        assert!(flags.music);
        assert!(!flags.fintech);
    }

    #[test]
    fn empty_text_sets_nothing() {
        assert_eq!(derive_focus_flags(None, None), FocusFlags::default());
        assert_eq!(derive_focus_flags(Some(""), Some("")), FocusFlags::default());
    }

    #[test]
    fn parse_focus_names() {
        assert_eq!("AI".parse::<Focus>(), Ok(Focus::Ai));
        assert_eq!(" fintech ".parse::<Focus>(), Ok(Focus::Fintech));
        assert_eq!("music".parse::<Focus>(), Ok(Focus::Music));
        assert!("crypto".parse::<Focus>().is_err());
    }

    #[test]
    fn focus_match_uses_flag_not_sector_text() {
        let mut inv = InvestorDto::named(1, "Flagless AI Fund");
        inv.sectors = Some("AI, Machine Learning".to_string());
        assert!(!Focus::Ai.matches(&inv));

        inv.has_ai_focus = true;
        inv.sectors = Some("Real Estate".to_string());
        assert!(Focus::Ai.matches(&inv));
    }
}
