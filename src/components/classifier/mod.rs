mod openai;

pub use openai::OpenAiClassifier;

use crate::error::BotResult;
use async_trait::async_trait;

/// Instructions given to the model before the user's command
pub const SYSTEM_PROMPT: &str = r#"You are a virtual assistant. Interpret the following commands and provide a response in JSON format with the intent and details.

Commands:
1. Create an event: "Create an event titled 'Meeting' on June 5th at 10 AM for 1 hour."
2. Send a reminder: "Send a reminder to +1234567890 for the 'Meeting' event."
3. Query schedule: "What is on my schedule for June 5th?"
4. Schedule text reminder: "Schedule a text reminder for the 'Meeting' event 10 minutes before."
5. Create reminder: "Remind me to 'Call the doctor' on June 12th."

Use these intents and detail fields:
- create_event: summary, description, start, end
- send_reminder: to, event { summary, start { dateTime } }
- query_schedule: date (YYYY-MM-DD)
- schedule_text_reminder: summary, reminder_time (an ISO date-time or "<amount> <unit>"), datetime
- create_reminder: title, date

Format:
{
    "intent": "create_event",
    "details": {
        "summary": "Meeting",
        "description": "Discuss project",
        "start": "2024-06-05T10:00:00-07:00",
        "end": "2024-06-05T11:00:00-07:00"
    }
}

Respond with the JSON object only. Now, interpret the following command:"#;

/// Turns free text into the raw `{intent, details}` JSON answer of a language model.
///
/// The returned text is not validated; callers must tolerate malformed JSON.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, user_text: &str, system_prompt: &str) -> BotResult<String>;
}

/// Pull the JSON object out of a model answer, dropping any code fence or
/// prose around it. Text without a `{...}` span is returned trimmed.
pub fn extract_json_object(response: &str) -> &str {
    let trimmed = response.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
