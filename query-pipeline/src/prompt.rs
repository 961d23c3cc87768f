//! Prompt template with `{context}`, `{chat_history}` and `{question}` slots.

use crate::error::PipelineError;

/// Default instructions: answer from the review context only, otherwise
/// decline politely.
pub const DEFAULT_TEMPLATE: &str = "Answer the user's questions based only on the following context. \
If the answer is not in the context, reply politely that you do not have that information available.:
==============================
Context: {context}
==============================
Current conversation: {chat_history}

user: {question}
assistant:";

/// Values substituted into the template for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub context: String,
    pub chat_history: String,
    pub question: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Context,
    ChatHistory,
    Question,
}

impl Slot {
    const ALL: [Slot; 3] = [Slot::Context, Slot::ChatHistory, Slot::Question];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "context" => Some(Slot::Context),
            "chat_history" => Some(Slot::ChatHistory),
            "question" => Some(Slot::Question),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Slot::Context => "context",
            Slot::ChatHistory => "chat_history",
            Slot::Question => "question",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// Parsed template. Rendering is a single pass over the parsed segments, so
/// braces inside substituted values are copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            segments: parse(DEFAULT_TEMPLATE),
        }
    }
}

impl PromptTemplate {
    /// Parses `text`. `{{` and `}}` stand for literal braces; any other
    /// `{name}` that is not a known slot is kept literally.
    ///
    /// # Errors
    /// [`PipelineError::InvalidTemplate`] if one of the three slots is absent.
    pub fn new(text: &str) -> Result<Self, PipelineError> {
        let segments = parse(text);
        for slot in Slot::ALL {
            if !segments.contains(&Segment::Slot(slot)) {
                return Err(PipelineError::InvalidTemplate(format!(
                    "missing {{{}}} placeholder",
                    slot.name()
                )));
            }
        }
        Ok(Self { segments })
    }

    pub fn render(&self, ctx: &PromptContext) -> String {
        let mut out = String::with_capacity(
            ctx.context.len() + ctx.chat_history.len() + ctx.question.len() + 512,
        );
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Slot(Slot::Context) => out.push_str(&ctx.context),
                Segment::Slot(Slot::ChatHistory) => out.push_str(&ctx.chat_history),
                Segment::Slot(Slot::Question) => out.push_str(&ctx.question),
            }
        }
        out
    }
}

fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find(['{', '}']) {
        literal.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            literal.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                if let Some(slot) = Slot::from_name(&tail[1..end]) {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        literal.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
