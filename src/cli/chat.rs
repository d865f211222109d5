//! pms chat

use crate::api::DataSource;
use crate::assistant::{self, ChatMessage, Conversation};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct ChatReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    question: String,
    reply: ChatMessage,
    source: DataSource,
}

pub async fn run(ctx: &mut Context, message: String) -> Result<()> {
    assistant::require_assistant(ctx.role)?;
    let question = assistant::validate_message(&message)?;
    let typing_delay = ctx.config.assistant.reply_delay();

    let mut conversation = Conversation::new();
    let client = ctx.client().await?;
    let fetched = conversation.send(client, &question, typing_delay).await?;

    let mut human = HumanOutput::new("AI assistant");
    human.push_section("Reply", fetched.value.content.lines().map(str::to_string).collect());
    human.note_source(fetched.source);
    if fetched.source.is_mock() {
        human.push_detail("reply generated locally from canned answers");
    }

    emit_success(
        ctx.output,
        "chat",
        &ChatReport {
            session_id: conversation.session_id().map(str::to_string),
            question,
            reply: fetched.value,
            source: fetched.source,
        },
        Some(&human),
    )
}
