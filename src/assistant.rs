//! AI assistant conversation.
//!
//! Replies come from `POST /chat/message` when the backend is reachable and
//! from a keyword matcher over canned answers otherwise. The conversation
//! keeps the full transcript locally and sends the most recent messages as
//! context with every request.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ChatRequest, ChatResponse, ContextMessage, Fetched};
use crate::error::{Error, Result};
use crate::role::{Capabilities, Role};

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const CONTEXT_MESSAGES: usize = 10;

const GREETING: &str = "Hello! I am the AI assistant of InsureTech AI-PMS. How can I help you manage the project?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedPrompt {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const SUGGESTED_PROMPTS: [SuggestedPrompt; 4] = [
    SuggestedPrompt {
        label: "Generate WBS",
        prompt: "Generate a WBS for phase 3 AI modeling",
    },
    SuggestedPrompt {
        label: "Risk analysis",
        prompt: "Analyse the main risks of the current project",
    },
    SuggestedPrompt {
        label: "Weekly report",
        prompt: "Summarise this week's project progress",
    },
    SuggestedPrompt {
        label: "Schedule forecast",
        prompt: "Can we achieve the sprint goal at the current pace?",
    },
];

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    session_id: Option<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                id: 1,
                role: ChatRole::Assistant,
                content: GREETING.to_string(),
                timestamp: Utc::now(),
            }],
            session_id: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Suggested prompts are offered until the user has said something.
    pub fn show_suggestions(&self) -> bool {
        self.messages.len() == 1
    }

    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        let id = self.messages.last().map(|msg| msg.id).unwrap_or(0) + 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    /// The last `CONTEXT_MESSAGES` messages in wire form.
    pub fn context(&self) -> Vec<ContextMessage> {
        let start = self.messages.len().saturating_sub(CONTEXT_MESSAGES);
        self.messages[start..]
            .iter()
            .map(|msg| ContextMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }

    /// Record the user's message and build the request for it.
    pub fn begin_turn(&mut self, text: &str) -> Result<ChatRequest> {
        let message = validate_message(text)?;
        self.push(ChatRole::User, message.clone());
        Ok(ChatRequest {
            session_id: self.session_id.clone(),
            message,
            context: self.context(),
        })
    }

    pub fn finish_turn(&mut self, response: ChatResponse) -> &ChatMessage {
        if !response.session_id.is_empty() {
            self.session_id = Some(response.session_id);
        }
        self.push(ChatRole::Assistant, response.reply)
    }

    /// Send one message and append the reply, live or canned.
    pub async fn send(
        &mut self,
        client: &mut ApiClient,
        text: &str,
        typing_delay: Duration,
    ) -> Result<Fetched<ChatMessage>> {
        let request = self.begin_turn(text)?;
        let fallback = ChatResponse {
            session_id: self.session_id.clone().unwrap_or_default(),
            reply: simulate_reply(&request.message).to_string(),
        };
        let fetched = client.send_chat(&request, fallback, typing_delay).await;
        let source = fetched.source;
        let message = self.finish_turn(fetched.value).clone();
        Ok(Fetched {
            value: message,
            source,
        })
    }
}

pub fn validate_message(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("message cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::InvalidArgument(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn require_assistant(role: Role) -> Result<()> {
    if Capabilities::for_role(role).use_assistant {
        Ok(())
    } else {
        Err(Error::access_denied(role, "use the AI assistant"))
    }
}

const WBS_KEYWORDS: &[&str] = &["wbs", "task", "작업"];
const RISK_KEYWORDS: &[&str] = &["risk", "리스크", "위험"];
const REPORT_KEYWORDS: &[&str] = &["report", "summary", "summarise", "progress", "보고서", "요약", "진행"];
const FORECAST_KEYWORDS: &[&str] = &[
    "sprint", "forecast", "predict", "achieve", "달성", "예측", "스프린트",
];

/// Canned answer for a message. Keyword groups are checked in order and the
/// first match wins.
pub fn simulate_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|kw| lower.contains(kw));

    if hit(WBS_KEYWORDS) {
        WBS_REPLY
    } else if hit(RISK_KEYWORDS) {
        RISK_REPLY
    } else if hit(REPORT_KEYWORDS) {
        REPORT_REPLY
    } else if hit(FORECAST_KEYWORDS) {
        FORECAST_REPLY
    } else {
        HELP_REPLY
    }
}

const WBS_REPLY: &str = "\
WBS for the AI modeling phase:

Phase 3: AI modeling and training

1. Data cleansing and augmentation (5 days, data team)
   - Validate quality of the de-identified data
   - Apply data augmentation techniques
   - Split train / validation / test sets

2. Feature engineering (3 days, AI team)
   - Build the receipt image preprocessing pipeline
   - Develop text feature extraction
   - Generate metadata features

3. OCR model training and tuning (10 days, AI team)
   - Train baseline models (compare Tesseract and EasyOCR)
   - Fine-tune a custom model for Korean diagnosis forms
   - Optimise hyperparameters (learning rate, batch size)

4. Classification model (7 days, AI team)
   - Train the treatment item classifier (BERT based)
   - Implement policy clause matching
   - Apply ensemble techniques

5. Evaluation and reporting (3 days, PM + AI team)
   - Measure accuracy, precision and recall
   - Analyse the confusion matrix
   - Identify improvement points

Estimated effort: 28 story points
Risks: data quality issues, low recognition on specific form layouts";

const RISK_REPLY: &str = "\
Main risks of the current project:

HIGH (act now)
1. OCR recognition below target (probability 75%)
   - Currently 93.5%, target 95%
   - Diagnosis forms from two major hospitals recognised at about 85%
   - Action: collect 500 more samples from those hospitals and fine-tune

MEDIUM (monitor)
2. Data labeling delay (probability 60%)
   - Not enough business reviewers to validate labels
   - Action: consider an external labeling vendor
3. Legacy system integration complexity (probability 50%)
   - The existing review system's API documentation is incomplete
   - Action: hold a technical review with the IT infrastructure team

LOW (keep watching)
4. Team member reassignment (probability 20%)
   - One key developer may move to another project
   - Action: strengthen knowledge transfer documentation";

const REPORT_REPLY: &str = "\
Weekly progress summary (11 Aug 2025 to 15 Aug 2025)

Overall progress: 62% (+2%p against plan)

Highlights:
- OCR model v2.1 trained (recognition 93.5% -> 94.2%)
- Data pipeline optimised (30% faster processing)
- Model performance monitoring dashboard delivered

Issues:
- Low recognition on specific hospital diagnosis forms persists (about 85%)
- Data labeling two days behind schedule

Next week:
- Apply data augmentation (rotation, added noise)
- Hyperparameter tuning experiments (grid search)
- Incorporate business reviewer feedback

Team: 5 people (3 dev, 1 QA, 1 PM)";

const FORECAST_REPLY: &str = "\
Sprint goal forecast:

Sprint 5 status (day 10 of 14):
- Remaining work: 8 story points
- Remaining time: 4 days
- Current velocity: 40 SP per sprint (average of the last 3 sprints)
- Daily throughput: about 3 SP per day

Forecast:
- Probability of meeting the goal: 85%
- Expected completion: 18 Aug (deadline holds)

Recommendations:
1. Keeping the current pace meets the goal
2. One urgent item (diagnosis form data collection) is the bottleneck
3. Add capacity to that item (Younghee Lee to support Minsu Park)

Watch out:
- Two items waiting for code review need a quick turnaround";

const HELP_REPLY: &str = "\
I am analysing your request. Ask something more specific about the project data and I can help, for example:
- \"Generate a WBS for phase 3 modeling\"
- \"Analyse the risks of the current project\"
- \"Summarise this week's progress\"";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting_and_suggestions() {
        let conv = Conversation::new();
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role, ChatRole::Assistant);
        assert!(conv.show_suggestions());
    }

    #[test]
    fn keyword_rules_first_match_wins() {
        assert_eq!(simulate_reply("Build the WBS please"), WBS_REPLY);
        // "task" beats "risk" because WBS rules are checked first
        assert_eq!(simulate_reply("task risk"), WBS_REPLY);
        assert_eq!(simulate_reply("현재 프로젝트의 주요 리스크를 분석해줘"), RISK_REPLY);
        assert_eq!(simulate_reply("Weekly REPORT"), REPORT_REPLY);
        assert_eq!(simulate_reply("스프린트 목표를 달성할 수 있을까?"), FORECAST_REPLY);
        assert_eq!(simulate_reply("hello"), HELP_REPLY);
    }

    #[test]
    fn suggested_prompts_hit_their_rules() {
        let replies: Vec<&str> = SUGGESTED_PROMPTS
            .iter()
            .map(|p| simulate_reply(p.prompt))
            .collect();
        assert_eq!(replies, vec![WBS_REPLY, RISK_REPLY, REPORT_REPLY, FORECAST_REPLY]);
    }

    #[test]
    fn rejects_blank_and_oversized_messages() {
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
        assert_eq!(validate_message(" hi ").expect("valid"), "hi");
    }

    #[test]
    fn ids_increase_and_context_is_bounded() {
        let mut conv = Conversation::new();
        for n in 0..7 {
            conv.begin_turn(&format!("question {n}")).expect("turn");
            conv.finish_turn(ChatResponse {
                session_id: "s-1".to_string(),
                reply: format!("answer {n}"),
            });
        }
        let ids: Vec<u64> = conv.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<u64>>());
        assert!(!conv.show_suggestions());
        assert_eq!(conv.session_id(), Some("s-1"));

        let request = conv.begin_turn("last one").expect("turn");
        assert_eq!(request.context.len(), CONTEXT_MESSAGES);
        assert_eq!(request.context.last().map(|c| c.content.as_str()), Some("last one"));
        assert_eq!(request.session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn only_assistant_roles_chat() {
        assert!(require_assistant(Role::Qa).is_ok());
        assert!(require_assistant(Role::Admin).is_err());
        assert!(require_assistant(Role::Auditor).is_err());
    }
}
