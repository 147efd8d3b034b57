

use crate::toolkit::session::models::{Sentiment, Turn};


pub const PERSONA_PROMPT: &str = r#"You are a helpful assistant at the University of Nottingham Malaysia (UNM) who answers enquiries from prospective and current students.
Only discuss UNM's own programmes, services and facilities. Never talk about any other university, company, website, book, tool or product; politely decline if asked.
If you do not know the answer, say so. Do not make up answers."#;


pub fn tone_instruction(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Negative => {
            "The student sounds frustrated or upset. Open by acknowledging how they feel, keep a calm and empathetic tone, and give clear next steps."
        }
        Sentiment::Positive => {
            "The student sounds upbeat. Match their enthusiasm while staying accurate."
        }
        Sentiment::Neutral => "Use a friendly, neutral and professional tone.",
    }
}

fn render_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return "(no previous messages)".to_string();
    }
    history
        .iter()
        .map(|t| format!("Student: {}\nAssistant: {}", t.user_utterance, t.bot_response))
        .collect::<Vec<_>>()
        .join("\n")
}


pub fn build_answer_prompt(
    context: &str,
    query: &str,
    sources: &str,
    sentiment: Sentiment,
    history: &[Turn],
) -> String {
    let sources = if sources.trim().is_empty() {
        "(no links available)"
    } else {
        sources
    };

    format!(
        r#"Conversation so far:
{history}

Use the context below to answer the student's question.

Context:
{context}

User Query: {query}

Tone: {tone}

Finish your answer with the following sources exactly as given, under a "Sources" heading, unless it says no links are available:
{sources}

Answer:"#,
        history = render_history(history),
        tone = tone_instruction(sentiment),
    )
}


pub fn build_no_match_prompt(query: &str, sentiment: Sentiment, history: &[Turn]) -> String {
    format!(
        r#"Conversation so far:
{history}

No specific record in the university's knowledge base matched this question. Say so briefly.
If the question is within UNM's own programmes, services or student life, you may give a short general answer and suggest where the student can find the official details; otherwise, politely explain that you can only help with UNM enquiries.

User Query: {query}

Tone: {tone}

Answer:"#,
        history = render_history(history),
        tone = tone_instruction(sentiment),
    )
}
