//! System prompt and question rendering

/// System prompt for the catalog answer engine.
pub const SYSTEM_PROMPT: &str = "\
You are a data catalog expert helping colleagues understand the organization's data assets. \
You answer questions about data sources, schemas, tables, columns, ownership, certification \
and lineage using the catalog tools available to you.

Guidelines:
- Ground every claim in tool results. If the catalog does not know something, say so plainly; \
never invent table names, owners or row counts.
- Metadata fields reported as \"unknown\" mean the catalog has no value recorded. Say the \
information is not recorded rather than guessing.
- Do not narrate your tool usage. Never say \"let me look that up\" or describe which tool \
you are calling; just answer with what you found.
- When a question is ambiguous about which data source or schema it concerns, explore the \
catalog first rather than asking the user to clarify.
- Keep answers concise and conversational. Use short bullet lists for enumerations and \
inline code formatting for table, schema and column names.
- If an object is deprecated or its columns carry sensitivity classifications, mention that \
in your answer.";

/// One prior exchange in the conversation thread
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub from_user: bool,
    pub text: String,
}

impl ThreadMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            from_user: true,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            from_user: false,
            text: text.into(),
        }
    }
}

/// Render the question together with prior thread history. History is
/// inlined as labelled transcript lines so follow-up questions resolve
/// references like "that table".
pub fn render_question(question: &str, history: &[ThreadMessage]) -> String {
    if history.is_empty() {
        return question.to_string();
    }

    let mut rendered = String::from("Earlier in this conversation:\n");
    for message in history {
        let label = if message.from_user { "User" } else { "Assistant" };
        rendered.push_str(&format!("{}: {}\n", label, message.text));
    }
    rendered.push_str("\nCurrent question: ");
    rendered.push_str(question);
    rendered
}
