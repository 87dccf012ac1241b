pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_PROVIDER_ID: &str = "openai";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_MAX_TURNS: usize = 16;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;

/// Placeholder replaced with the configured channel name.
pub const CHANNEL_PLACEHOLDER: &str = "{{channel}}";

pub const DEFAULT_QUERY_TEMPLATE: &str = r#"Summarize today's Slack activity in {{channel}} with the following details:

1. **Total Message Count:** Provide the total number of messages sent across all channels and direct messages today.

2. **Dominant Tone:** Identify the most prevalent tone expressed in the messages. Options could include (but are not limited to): positive, negative, neutral, inquisitive, urgent, humorous, or collaborative. Briefly explain why you identified this as the dominant tone, perhaps by mentioning recurring sentiment or types of language used.

3. **Topic Summary by Time Grouping:** Summarize the main topics discussed throughout the day. Group these summaries chronologically. For each time block where a distinct topic or set of related topics emerged, provide a concise summary of the discussion. For example, if there was a discussion about "project alpha" around 9:00 AM and then a separate discussion about "marketing campaign updates" around 11:00 AM, these should be summarized separately under their approximate timeframes. Be sure to capture the essence of each conversation without going into excessive detail.
"#;
