use crate::email::truncate_chars;

pub const SYSTEM_PROMPT: &str =
    "You are a travel email parser. Extract trip details and return ONLY valid JSON.";

/// User message for one email. Only the first `body_limit` characters of the
/// body are included.
pub fn build_prompt(subject: &str, body: &str, body_limit: usize) -> String {
    format!(
        r#"Extract travel details from this email. Return ONLY valid JSON, no markdown or explanations.

Email Subject: {subject}

Email Body:
{body}

Return JSON with exactly these keys:
{{
  "destination": "city, country (e.g. 'Tokyo, Japan')",
  "start_date": "YYYY-MM-DD or null",
  "end_date": "YYYY-MM-DD or null",
  "description": "short description or null",
  "trip_type": "flight|hotel|rental|train|other or null",
  "confirmation_number": "booking reference or null",
  "confidence_score": 0.0 to 1.0
}}

Rules:
- destination is REQUIRED; give your best guess when unclear
- set any other field you cannot determine confidently to null
- dates must use the YYYY-MM-DD format
- confidence_score is how sure you are overall (0.0 = guessing, 1.0 = certain)
- return the JSON object and nothing else"#,
        subject = subject,
        body = truncate_chars(body, body_limit),
    )
}
