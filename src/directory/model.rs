use crate::storage::entity::investor::Model as InvestorModel;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_LIMIT: u64 = 100;
pub const DEFAULT_OFFSET: u64 = 0;
pub const TOP_STATES: u64 = 10;

/// 对外的投资机构记录，字段原样透传
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvestorDto {
    pub id: i32,
    pub cik: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub investor_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub aum_estimate: Option<String>,
    pub aum_min: Option<f64>,
    pub aum_max: Option<f64>,
    pub investment_focus: Option<String>,
    pub stage_preference: Option<String>,
    pub sectors: Option<String>,
    pub geography: Option<String>,
    pub check_size_min: Option<f64>,
    pub check_size_max: Option<f64>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub notable_investments: Option<String>,
    pub decision_makers: Option<String>,
    pub investment_thesis: Option<String>,
    pub recent_activity: Option<String>,
    pub sec_url: Option<String>,
    pub crunchbase_url: Option<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
    pub data_quality_score: Option<f64>,
    #[serde(default)]
    pub has_ai_focus: bool,
    #[serde(default)]
    pub has_fintech_focus: bool,
    #[serde(default)]
    pub has_music_focus: bool,
    pub last_updated: Option<String>,
    pub scraped_at: Option<String>,
}

impl From<InvestorModel> for InvestorDto {
    fn from(model: InvestorModel) -> Self {
        Self {
            id: model.id,
            cik: model.cik,
            name: model.name,
            investor_type: model.investor_type,
            address: model.address,
            city: model.city,
            state: model.state,
            country: model.country,
            aum_estimate: model.aum_estimate,
            aum_min: model.aum_min,
            aum_max: model.aum_max,
            investment_focus: model.investment_focus,
            stage_preference: model.stage_preference,
            sectors: model.sectors,
            geography: model.geography,
            check_size_min: model.check_size_min,
            check_size_max: model.check_size_max,
            website: model.website,
            contact_email: model.contact_email,
            phone: model.phone,
            linkedin_url: model.linkedin_url,
            notable_investments: model.notable_investments,
            decision_makers: model.decision_makers,
            investment_thesis: model.investment_thesis,
            recent_activity: model.recent_activity,
            sec_url: model.sec_url,
            crunchbase_url: model.crunchbase_url,
            data_sources: serde_json::from_str(&model.data_sources_json).unwrap_or_default(),
            data_quality_score: model.data_quality_score,
            has_ai_focus: model.has_ai_focus,
            has_fintech_focus: model.has_fintech_focus,
            has_music_focus: model.has_music_focus,
            last_updated: model.last_updated,
            scraped_at: model.scraped_at,
        }
    }
}

#[cfg(test)]
impl InvestorDto {
    pub(crate) fn named(id: i32, name: &str) -> Self {
        Self {
            id,
            cik: None,
            name: name.to_string(),
            investor_type: None,
            address: None,
            city: None,
            state: None,
            country: None,
            aum_estimate: None,
            aum_min: None,
            aum_max: None,
            investment_focus: None,
            stage_preference: None,
            sectors: None,
            geography: None,
            check_size_min: None,
            check_size_max: None,
            website: None,
            contact_email: None,
            phone: None,
            linkedin_url: None,
            notable_investments: None,
            decision_makers: None,
            investment_thesis: None,
            recent_activity: None,
            sec_url: None,
            crunchbase_url: None,
            data_sources: Vec::new(),
            data_quality_score: None,
            has_ai_focus: false,
            has_fintech_focus: false,
            has_music_focus: false,
            last_updated: None,
            scraped_at: None,
        }
    }
}

/// 新建/批量写入的请求体。除 name 外都可省略；省略的关注标记由文本推导。
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NewInvestor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default)]
    pub cik: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub investor_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub aum_estimate: Option<String>,
    #[serde(default)]
    pub aum_min: Option<f64>,
    #[serde(default)]
    pub aum_max: Option<f64>,
    #[serde(default)]
    pub investment_focus: Option<String>,
    #[serde(default)]
    pub stage_preference: Option<String>,
    #[serde(default)]
    pub sectors: Option<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub check_size_min: Option<f64>,
    #[serde(default)]
    pub check_size_max: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub notable_investments: Option<String>,
    #[serde(default)]
    pub decision_makers: Option<String>,
    #[serde(default)]
    pub investment_thesis: Option<String>,
    #[serde(default)]
    pub recent_activity: Option<String>,
    #[serde(default)]
    pub sec_url: Option<String>,
    #[serde(default)]
    pub crunchbase_url: Option<String>,
    #[serde(default)]
    pub data_sources: Option<Vec<String>>,
    #[serde(default)]
    pub data_quality_score: Option<f64>,
    #[serde(default)]
    pub has_ai_focus: Option<bool>,
    #[serde(default)]
    pub has_fintech_focus: Option<bool>,
    #[serde(default)]
    pub has_music_focus: Option<bool>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<String>,
}

/// GET /investors 的原始查询串。全部按字符串接收，解析失败不报错。
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub investor_type: Option<String>,
    pub state: Option<String>,
    pub has_ai_focus: Option<String>,
    pub has_fintech_focus: Option<String>,
    pub has_music_focus: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// 解析后的列表参数
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub investor_type: Option<String>,
    pub state: Option<String>,
    pub ai_only: bool,
    pub fintech_only: bool,
    pub music_only: bool,
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            investor_type: None,
            state: None,
            ai_only: false,
            fintech_only: false,
            music_only: false,
            search: None,
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        Self {
            investor_type: non_empty(q.investor_type),
            state: non_empty(q.state),
            // 只认字面量 "true"，无法显式查询“没有该标记”
            ai_only: q.has_ai_focus.as_deref() == Some("true"),
            fintech_only: q.has_fintech_focus.as_deref() == Some("true"),
            music_only: q.has_music_focus.as_deref() == Some("true"),
            search: non_empty(q.search),
            limit: parse_page_number(q.limit.as_deref(), DEFAULT_LIMIT),
            offset: parse_page_number(q.offset.as_deref(), DEFAULT_OFFSET),
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// 存储层按 i64 绑定，超过的一律截到这里
pub const MAX_PAGE_NUMBER: u64 = i64::MAX as u64;

/// 取开头的整数部分（"25abc" -> 25）；无法解析时用默认值，负数截为 0，过大截为 MAX_PAGE_NUMBER
pub fn parse_page_number(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    let s = raw.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return default;
    }
    if negative {
        return 0;
    }
    // 只剩全数字，解析失败只可能是溢出
    digits[..end]
        .parse::<u64>()
        .map_or(MAX_PAGE_NUMBER, |n| n.min(MAX_PAGE_NUMBER))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvestorPage {
    pub investors: Vec<InvestorDto>,
    /// 满足过滤条件的总行数（不是当前页长度）
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// 有序的 (key, count) 列表，序列化为保持顺序的 JSON 对象
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCounts(pub Vec<(String, u64)>);

impl RankedCounts {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, u64)> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| *c)
    }
}

impl Serialize for RankedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RankedCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RankedVisitor;

        impl<'de> Visitor<'de> for RankedVisitor {
            type Value = RankedCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of key -> count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, u64>()? {
                    out.push((k, v));
                }
                Ok(RankedCounts(out))
            }
        }

        deserializer.deserialize_map(RankedVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DirectoryStats {
    pub total_investors: u64,
    pub by_type: BTreeMap<String, u64>,
    pub top_states: RankedCounts,
    pub ai_investors: u64,
    pub fintech_investors: u64,
    pub music_investors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_fall_back_silently() {
        assert_eq!(parse_page_number(None, 100), 100);
        assert_eq!(parse_page_number(Some("abc"), 100), 100);
        assert_eq!(parse_page_number(Some(""), 0), 0);
        assert_eq!(parse_page_number(Some("25"), 100), 25);
        assert_eq!(parse_page_number(Some(" 25abc"), 100), 25);
        assert_eq!(parse_page_number(Some("-5"), 100), 0);
        assert_eq!(parse_page_number(Some("+7"), 100), 7);
    }

    #[test]
    fn page_numbers_saturate_at_store_range() {
        assert_eq!(parse_page_number(Some("0"), 100), 0);
        assert_eq!(
            parse_page_number(Some("9223372036854775807"), 100),
            MAX_PAGE_NUMBER
        );
        assert_eq!(
            parse_page_number(Some("9223372036854775808"), 100),
            MAX_PAGE_NUMBER
        );
        assert_eq!(
            parse_page_number(Some("18446744073709551615"), 100),
            MAX_PAGE_NUMBER
        );
        assert_eq!(
            parse_page_number(Some("99999999999999999999999"), 100),
            MAX_PAGE_NUMBER
        );
    }

    #[test]
    fn focus_params_only_accept_literal_true() {
        let q = ListQuery {
            has_ai_focus: Some("true".into()),
            has_fintech_focus: Some("TRUE".into()),
            has_music_focus: Some("1".into()),
            ..Default::default()
        };
        let p = ListParams::from(q);
        assert!(p.ai_only);
        assert!(!p.fintech_only);
        assert!(!p.music_only);
    }

    #[test]
    fn empty_strings_are_not_filters() {
        let q = ListQuery {
            investor_type: Some(String::new()),
            state: Some(String::new()),
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(ListParams::from(q), ListParams::default());
    }

    #[test]
    fn ranked_counts_keep_rank_order_in_json() {
        let ranked = RankedCounts(vec![
            ("NY".to_string(), 5),
            ("CA".to_string(), 3),
            ("MA".to_string(), 3),
        ]);
        let json = serde_json::to_string(&ranked).unwrap();
        assert_eq!(json, r#"{"NY":5,"CA":3,"MA":3}"#);

        let back: RankedCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ranked);
    }

    #[test]
    fn dto_uses_wire_field_names() {
        let mut dto = InvestorDto::named(3, "Acme Ventures");
        dto.data_sources = vec!["sec_adv".into()];
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["type"], serde_json::Value::Null);
        assert_eq!(json["data_sources"][0], "sec_adv");
    }
}
