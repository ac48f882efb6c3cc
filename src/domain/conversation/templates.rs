//! Fixed prompts and user-facing messages.

use super::Language;

/// System prompt for the profile collection phase.
pub const COLLECTION_SYSTEM_PROMPT: &str = r#"You are a friendly assistant for the medical services of Israeli health funds (HMOs: Maccabi, Meuhedet, Clalit).

Before answering any questions you must collect the following details from the user, one or two at a time:
1. Full name
2. ID number (exactly 9 digits)
3. Gender (male, female or other)
4. Age (a whole number between 0 and 120)
5. HMO name (מכבי, מאוחדת or כללית)
6. HMO card number (exactly 9 digits)
7. Insurance membership tier (זהב, כסף or ארד)
8. Preferred language for the rest of the conversation (Hebrew or English)

Reply in the language the user writes in. Politely point out any value that does not meet its constraint and ask for it again.
When every detail has been collected, read them back to the user and ask for confirmation.
Only after the user confirms, call the function `complete_data_collection` with all eight fields. Do not answer questions about medical services during this phase."#;

/// Builds the system prompt for the question answering phase.
///
/// `context` is the retrieved passage text the answer must be grounded in.
pub fn qa_system_prompt(hmo: Option<&str>, tier: Option<&str>, context: &str) -> String {
    format!(
        "You are a helpful assistant answering questions about the medical services offered by Israeli health funds.\n\n\
        The user is a member of HMO: {hmo}\n\
        Membership tier: {tier}\n\n\
        Answer only from the reference information below, focusing on the benefits that apply to the user's HMO and tier. \
        If the information does not cover the question, say so instead of guessing. \
        Reply in the language of the user's question.\n\n\
        Reference information:\n{context}",
        hmo = hmo.unwrap_or("unknown"),
        tier = tier.unwrap_or("unknown"),
        context = context,
    )
}

/// Joins retrieved passage texts into one context block.
pub fn join_context<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join("\n\n")
}

/// Shown when the model's structured payload fails validation.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "אירעה שגיאה בעיבוד הפרטים שמסרת. אנא בדוק את הנתונים ונסה שוב.";

const COMPLETED_HE: &str =
    "תודה! כל הפרטים שלך נקלטו בהצלחה. כעת אפשר לשאול כל שאלה על השירותים הרפואיים של קופת החולים שלך.";

const COMPLETED_EN: &str =
    "Thank you! All your details have been recorded. You can now ask any question about your HMO's medical services.";

/// Confirmation sent when the profile is complete, in the chosen language.
pub fn collection_complete_message(language: Language) -> &'static str {
    match language {
        Language::He => COMPLETED_HE,
        Language::En => COMPLETED_EN,
    }
}
