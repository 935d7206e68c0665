use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The writing tasks the backend knows how to perform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    WeeklyReport,
    XhsStyle,
    EmailPolish,
    MeetingMinutes,
}

impl TaskKind {
    pub const ALL: [Self; 4] = [
        Self::WeeklyReport,
        Self::XhsStyle,
        Self::EmailPolish,
        Self::MeetingMinutes,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::WeeklyReport => "AI周报助手",
            Self::XhsStyle => "小红书文案工坊",
            Self::EmailPolish => "邮件润色专家",
            Self::MeetingMinutes => "会议纪要提炼",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::WeeklyReport => "输入你的工作碎片，例如：联调支付接口、重构登录逻辑...",
            Self::XhsStyle => "输入文案关键词，例如：#咖啡店 #打卡圣地 #秋天第一杯奶茶...",
            Self::EmailPolish => "输入草稿，例如：明天下午两点开会，讨论下个季度的计划...",
            Self::MeetingMinutes => "输入会议笔记片段...",
        }
    }
}

/// Request body for the streaming generation endpoint.
/// Field names follow the backend's wire contract.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub task_type: TaskKind,
    pub raw_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl GenerateRequest {
    /// The role hint only applies to weekly reports; any other task ignores it
    /// server-side, so it is not sent at all.
    pub fn new(task_type: TaskKind, raw_content: String, role: Option<String>) -> Self {
        let role = match task_type {
            TaskKind::WeeklyReport => role.filter(|r| !r.trim().is_empty()),
            _ => None,
        };
        Self {
            task_type,
            raw_content,
            role,
        }
    }
}

/// One past generation as returned by the history endpoint. Read-only.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub task_type: TaskKind,
    /// Either a plain string or a parsed section document, depending on what
    /// the backend stored.
    pub generated_result: Value,
    /// Naive UTC timestamp; the backend serializes without an offset.
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersaConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_role")]
    pub default_role: String,
}

const fn default_timeout() -> u64 {
    600
}

fn default_role() -> String {
    "高级产品经理".to_string()
}

impl Default for VersaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: default_timeout(),
            default_role: default_role(),
        }
    }
}
