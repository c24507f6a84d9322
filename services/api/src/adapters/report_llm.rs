//! services/api/src/adapters/report_llm.rs
//!
//! This module contains the adapter for the report-writing LLM.
//! It implements the `ReportTextService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use campify_core::generation::{
    syllabus_not_found, AttendanceReportInput, GenerationKind, GenerationRequest,
    GradeReportInput, HelpdeskInput, StudentSummaryInput,
};
use campify_core::ports::{EntityStore, PortError, PortResult, ReportTextService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on syllabus look-ups within one helpdesk answer.
const MAX_TOOL_ROUNDS: usize = 3;

const SYLLABUS_TOOL: &str = "getCourseSyllabus";

const GRADE_REPORT_SYSTEM: &str = r#"You write grade reports for teachers. Be formal, encouraging and constructive.

Structure the report with clear headings and bullet points:
- Header: student name, class name, teacher name, date.
- Overall Summary: one paragraph on overall performance.
- Areas of Strength: where the grades show the student doing well.
- Areas for Improvement: gently, and mention attendance if it is a concern.
- Suggested Next Steps: two or three concrete recommendations.

Respond with ONLY a JSON object of the form {"report": "<the full report text>"}."#;

const ATTENDANCE_REPORT_SYSTEM: &str = r#"You write student attendance reports to be shared with teachers and parents.

Summarise the days present, absent and late, and point out any patterns or concerns.
Include the student's name and the class name. Keep it well formatted and easy to read.

Respond with ONLY a JSON object of the form {"report": "<the full report text>"}."#;

const STUDENT_SUMMARY_SYSTEM: &str = r#"You write short performance summaries for school administrators.

Write a single objective, professional paragraph covering academic performance and attendance,
noting both strengths and anything that needs attention.

Respond with ONLY a JSON object of the form {"summary": "<the paragraph>"}."#;

const HELPDESK_SYSTEM: &str = r#"You are the friendly helpdesk assistant for Campify, a student management application.
Answer questions about how to use the application, tailored to the user's role.

Features:
- Dashboard: a summary view for every role.
- Students (Admin/Teacher): the student roster. Admins can open a student's profile and generate an AI summary.
- Teachers (Admin): the list of teachers.
- Courses (Admin/Teacher/Student): teachers see what they teach, students what they are enrolled in.
- Timetable (Student/Parent): the weekly class schedule.
- Grades (Student/Parent): assignment and course grades.
- Payments (Admin/Parent): admins track all fees; parents see their child's fee status and can pay.
- Reports (Admin/Teacher/Parent): admins and teachers generate AI grade and attendance reports and share them with parents, who can read and comment on them.
- Profile and Settings: every user can update their details and preferences.

Do not invent features. Be concise and conversational.

You have one tool. If the question is about the syllabus, curriculum or topics of a course, you MUST call it
by responding with ONLY {"tool": "getCourseSyllabus", "courseName": "<exact course name>"}.
The tool result will be sent back to you. Otherwise respond with ONLY {"response": "<your answer>"}."#;

//=========================================================================================
// Chat Completion Seam
//=========================================================================================

/// One chat-completion round trip: messages in, the first choice's text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> PortResult<String>;
}

/// `ChatModel` backed by the OpenAI chat completions endpoint.
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAiChat {
    pub fn new(client: Client<OpenAIConfig>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let chat = self.client.chat();
        let response = tokio::time::timeout(self.timeout, chat.create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "Report LLM did not answer within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        first_choice_text(response)
    }
}

fn first_choice_text(response: CreateChatCompletionResponse) -> PortResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            PortError::Unexpected("Report LLM response contained no text content.".to_string())
        })
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ReportTextService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiReportAdapter {
    chat: Arc<dyn ChatModel>,
    report_model: String,
    helpdesk_model: String,
    store: Arc<dyn EntityStore>,
}

impl OpenAiReportAdapter {
    /// Creates a new `OpenAiReportAdapter`. The store backs the syllabus tool.
    pub fn new(
        client: Client<OpenAIConfig>,
        report_model: String,
        helpdesk_model: String,
        timeout: Duration,
        store: Arc<dyn EntityStore>,
    ) -> Self {
        Self::with_chat(
            Arc::new(OpenAiChat::new(client, timeout)),
            report_model,
            helpdesk_model,
            store,
        )
    }

    pub fn with_chat(
        chat: Arc<dyn ChatModel>,
        report_model: String,
        helpdesk_model: String,
        store: Arc<dyn EntityStore>,
    ) -> Self {
        Self {
            chat,
            report_model,
            helpdesk_model,
            store,
        }
    }

    async fn answer_helpdesk(&self, input: &HelpdeskInput) -> PortResult<String> {
        let mut messages = vec![system(HELPDESK_SYSTEM)?, user(&render_helpdesk(input))?];

        for round in 0..=MAX_TOOL_ROUNDS {
            let raw = self.chat.complete(&self.helpdesk_model, messages.clone()).await?;
            match parse_helpdesk_turn(&raw)? {
                HelpdeskTurn::Answer(text) => return Ok(text),
                HelpdeskTurn::SyllabusLookup(_) if round == MAX_TOOL_ROUNDS => break,
                HelpdeskTurn::SyllabusLookup(course_name) => {
                    debug!("Helpdesk requested the syllabus for '{}'", course_name);
                    let syllabus = self
                        .store
                        .syllabus_for_course(&course_name)
                        .await?
                        .unwrap_or_else(|| syllabus_not_found(&course_name));
                    messages.push(assistant(&raw)?);
                    messages.push(user(&format!(
                        "Result of {SYLLABUS_TOOL}(\"{course_name}\"):\n{syllabus}\n\nNow answer the user's question."
                    ))?);
                }
            }
        }

        Err(PortError::Unexpected(
            "Helpdesk LLM kept requesting tools without answering.".to_string(),
        ))
    }
}

//=========================================================================================
// `ReportTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReportTextService for OpenAiReportAdapter {
    async fn generate(&self, request: &GenerationRequest) -> PortResult<String> {
        let kind = request.kind();
        info!("Generating {}", kind.as_str());

        let (system_prompt, user_prompt) = match request {
            GenerationRequest::GradeReport(input) => (GRADE_REPORT_SYSTEM, render_grade_report(input)),
            GenerationRequest::AttendanceReport(input) => {
                (ATTENDANCE_REPORT_SYSTEM, render_attendance_report(input))
            }
            GenerationRequest::StudentSummary(input) => {
                (STUDENT_SUMMARY_SYSTEM, render_student_summary(input))
            }
            GenerationRequest::Helpdesk(input) => return self.answer_helpdesk(input).await,
        };

        let messages = vec![system(system_prompt)?, user(&user_prompt)?];
        let raw = self.chat.complete(&self.report_model, messages).await?;
        parse_output(&raw, kind).map_err(|e| {
            warn!("Discarding malformed {} output", kind.as_str());
            e
        })
    }
}

//=========================================================================================
// Message Builders
//=========================================================================================

fn system(content: &str) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

fn user(content: &str) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

fn assistant(content: &str) -> PortResult<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestAssistantMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .into())
}

//=========================================================================================
// Prompt Rendering
//=========================================================================================

fn render_grade_report(input: &GradeReportInput) -> String {
    format!(
        "Student Name: {}\nClass Name: {}\nTeacher Name: {}\nGrades Summary: {}\nAttendance Summary: {}\n\nPlease generate the report now.",
        input.student_name, input.class_name, input.teacher_name, input.grades, input.attendance
    )
}

fn render_attendance_report(input: &AttendanceReportInput) -> String {
    let records = input
        .attendance_records
        .iter()
        .map(|r| format!("- Date: {}, Status: {}", r.date, r.status.as_str()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Student Name: {}\nClass Name: {}\nAttendance Records:\n{}",
        input.student_name, input.class_name, records
    )
}

fn render_student_summary(input: &StudentSummaryInput) -> String {
    let courses = input
        .courses
        .iter()
        .map(|c| format!("- {}: {:.1}%", c.name, c.average_grade))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Name: {}\n\nCourse Performance:\n{}\n\nAttendance Record (last {} days):\n- Absences: {}\n- Lates: {}\n\nGenerate the summary paragraph now.",
        input.student_name,
        courses,
        input.attendance.total_days,
        input.attendance.absences,
        input.attendance.lates
    )
}

fn render_helpdesk(input: &HelpdeskInput) -> String {
    let history = input
        .history
        .iter()
        .map(|m| format!("- {}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "The user's role is: {}\n\nConversation History:\n{}\n\nUser's Current Question:\n\"{}\"",
        input.user_role,
        if history.is_empty() { "(none)".to_string() } else { history },
        input.query
    )
}

//=========================================================================================
// Output Validation
//=========================================================================================

/// Removes a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Checks the model output against the kind's `{field: string}` schema.
fn parse_output(raw: &str, kind: GenerationKind) -> PortResult<String> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        PortError::Unexpected(format!("{} output is not valid JSON: {}", kind.as_str(), e))
    })?;
    let field = kind.output_field();
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            PortError::Unexpected(format!(
                "{} output is missing a non-empty '{}' string",
                kind.as_str(),
                field
            ))
        })
}

#[derive(Debug, PartialEq)]
enum HelpdeskTurn {
    Answer(String),
    SyllabusLookup(String),
}

fn parse_helpdesk_turn(raw: &str) -> PortResult<HelpdeskTurn> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PortError::Unexpected(format!("Helpdesk output is not valid JSON: {}", e)))?;

    if value.get("tool").and_then(|t| t.as_str()) == Some(SYLLABUS_TOOL) {
        let course_name = value
            .get("courseName")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(HelpdeskTurn::SyllabusLookup(course_name));
    }

    parse_output(raw, GenerationKind::HelpdeskResponse).map(HelpdeskTurn::Answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campify_core::derive::AttendanceSummary;
    use campify_core::generation::{CourseAverageInput, HelpdeskMessage, HistoryRole};
    use crate::adapters::store::MemoryStore;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned model outputs in order and records every conversation it was sent.
    struct ScriptedChat {
        replies: Mutex<VecDeque<String>>,
        conversations: Mutex<Vec<String>>,
    }

    impl ScriptedChat {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                conversations: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.conversations.lock().unwrap().len()
        }

        fn last_conversation(&self) -> String {
            self.conversations.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn complete(
            &self,
            _model: &str,
            messages: Vec<ChatCompletionRequestMessage>,
        ) -> PortResult<String> {
            self.conversations
                .lock()
                .unwrap()
                .push(serde_json::to_string(&messages).unwrap());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PortError::Unexpected("script exhausted".to_string()))
        }
    }

    fn adapter(chat: Arc<ScriptedChat>) -> OpenAiReportAdapter {
        OpenAiReportAdapter::with_chat(
            chat,
            "report-model".into(),
            "helpdesk-model".into(),
            Arc::new(MemoryStore::seeded(42, Utc::now())),
        )
    }

    fn helpdesk(query: &str) -> GenerationRequest {
        GenerationRequest::Helpdesk(HelpdeskInput {
            query: query.into(),
            user_role: "Student".into(),
            history: vec![],
        })
    }

    const CALCULUS_LOOKUP: &str = r#"{"tool": "getCourseSyllabus", "courseName": "Calculus"}"#;

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"report\": \"All good.\"}\n```";
        assert_eq!(parse_output(raw, GenerationKind::GradeReport).unwrap(), "All good.");
    }

    #[test]
    fn wrong_or_empty_field_is_rejected() {
        assert!(parse_output("{\"summary\": \"x\"}", GenerationKind::GradeReport).is_err());
        assert!(parse_output("{\"summary\": \"  \"}", GenerationKind::StudentSummary).is_err());
        assert!(parse_output("not json", GenerationKind::StudentSummary).is_err());
    }

    #[test]
    fn helpdesk_turns_are_told_apart() {
        assert_eq!(
            parse_helpdesk_turn("{\"tool\": \"getCourseSyllabus\", \"courseName\": \"Calculus\"}").unwrap(),
            HelpdeskTurn::SyllabusLookup("Calculus".into())
        );
        assert_eq!(
            parse_helpdesk_turn("{\"response\": \"Open the Grades page.\"}").unwrap(),
            HelpdeskTurn::Answer("Open the Grades page.".into())
        );
    }

    #[test]
    fn summary_prompt_lists_courses_and_attendance() {
        let prompt = render_student_summary(&StudentSummaryInput {
            student_name: "Emily Davis".into(),
            courses: vec![CourseAverageInput {
                name: "Calculus".into(),
                average_grade: 87.5,
            }],
            attendance: AttendanceSummary {
                absences: 1,
                lates: 2,
                total_days: 10.0,
            },
        });
        assert!(prompt.contains("- Calculus: 87.5%"));
        assert!(prompt.contains("(last 10 days)"));
        assert!(prompt.contains("- Lates: 2"));
    }

    #[test]
    fn helpdesk_prompt_carries_the_history() {
        let prompt = render_helpdesk(&HelpdeskInput {
            query: "How do I pay?".into(),
            user_role: "Parent".into(),
            history: vec![HelpdeskMessage {
                role: HistoryRole::Model,
                content: "Hi! How can I help?".into(),
            }],
        });
        assert!(prompt.contains("- model: Hi! How can I help?"));
        assert!(prompt.contains("role is: Parent"));
    }

    #[tokio::test]
    async fn direct_helpdesk_answer_needs_one_call() {
        let chat = ScriptedChat::new(&[r#"{"response": "Open the Grades page."}"#]);
        let answer = adapter(chat.clone()).generate(&helpdesk("Where are my grades?")).await.unwrap();
        assert_eq!(answer, "Open the Grades page.");
        assert_eq!(chat.calls(), 1);
    }

    #[tokio::test]
    async fn syllabus_lookup_feeds_the_stored_syllabus_back() {
        let chat = ScriptedChat::new(&[CALCULUS_LOOKUP, r#"{"response": "It covers limits."}"#]);
        let answer = adapter(chat.clone()).generate(&helpdesk("What is in Calculus?")).await.unwrap();
        assert_eq!(answer, "It covers limits.");
        assert_eq!(chat.calls(), 2);
        let conversation = chat.last_conversation();
        assert!(conversation.contains("Result of getCourseSyllabus"));
        assert!(!conversation.contains("could not find a syllabus"));
    }

    #[tokio::test]
    async fn unknown_course_gets_the_not_found_message() {
        let chat = ScriptedChat::new(&[
            r#"{"tool": "getCourseSyllabus", "courseName": "Astrology"}"#,
            r#"{"response": "There is no such course."}"#,
        ]);
        let answer = adapter(chat.clone()).generate(&helpdesk("What is in Astrology?")).await.unwrap();
        assert_eq!(answer, "There is no such course.");
        assert!(chat
            .last_conversation()
            .contains("Sorry, I could not find a syllabus for the course"));
    }

    #[tokio::test]
    async fn endless_tool_requests_stop_after_the_round_limit() {
        let script = [CALCULUS_LOOKUP; MAX_TOOL_ROUNDS + 2];
        let chat = ScriptedChat::new(&script);
        let err = adapter(chat.clone()).generate(&helpdesk("Syllabus?")).await.unwrap_err();
        assert!(err.to_string().contains("kept requesting tools"));
        assert_eq!(chat.calls(), MAX_TOOL_ROUNDS + 1);
    }

    #[tokio::test]
    async fn malformed_report_output_is_an_error() {
        let chat = ScriptedChat::new(&["Here is your report!"]);
        let request = GenerationRequest::GradeReport(GradeReportInput {
            student_name: "Emily Davis".into(),
            class_name: "Calculus".into(),
            teacher_name: "Evelyn Reed".into(),
            grades: "Mid-Term: 90/100".into(),
            attendance: "0 absences, 0 lates".into(),
        });
        assert!(adapter(chat).generate(&request).await.is_err());
    }

    fn response_with(content: serde_json::Value) -> CreateChatCompletionResponse {
        serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "report-model",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn response_without_text_is_an_error() {
        assert!(first_choice_text(response_with(serde_json::Value::Null)).is_err());
        assert_eq!(
            first_choice_text(response_with(serde_json::json!("{\"report\": \"ok\"}"))).unwrap(),
            "{\"report\": \"ok\"}"
        );
    }
}
