use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{Backend, EmailSubmission};
use crate::effects::Intent;
use crate::error::{AnswerError, ApiError};
use crate::phone::{is_international, sanitize_phone};
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    Name,
    Age,
    Zip,
    Phone,
    Email,
    YesNo,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    /// Pre-recorded clip played when the question is asked.
    pub audio: Option<&'static str>,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaggingRule {
    AnswerIs {
        question: &'static str,
        value: &'static str,
        tag: &'static str,
    },
    AgeAtLeast {
        min: u32,
        tag: &'static str,
    },
}

/// One funnel flavour: what to ask, how to tag, and where to send the results.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelVariant {
    pub slug: &'static str,
    pub title: &'static str,
    pub questions: &'static [Question],
    pub rules: &'static [TaggingRule],
    pub email_endpoint: &'static str,
    pub checkout_variant: &'static str,
}

const NAME: Question = Question {
    id: "name",
    prompt: "Hi there! I'm Emily. What's your first and last name?",
    audio: Some("/assets/audio/intro.mp3"),
    kind: QuestionKind::Name,
};

const AGE: Question = Question {
    id: "age",
    prompt: "Nice to meet you! How old are you?",
    audio: Some("/assets/audio/age.mp3"),
    kind: QuestionKind::Age,
};

const ZIP: Question = Question {
    id: "zip",
    prompt: "What's your zip code? Programs differ by area.",
    audio: Some("/assets/audio/zip.mp3"),
    kind: QuestionKind::Zip,
};

const PHONE: Question = Question {
    id: "phone",
    prompt: "What's the best phone number to text your results to?",
    audio: Some("/assets/audio/phone.mp3"),
    kind: QuestionKind::Phone,
};

const EMAIL: Question = Question {
    id: "email",
    prompt: "And your email, so we can send you a copy?",
    audio: Some("/assets/audio/email.mp3"),
    kind: QuestionKind::Email,
};

const DEBT: Question = Question {
    id: "debt",
    prompt: "Do you have more than $10,000 in credit card or medical debt?",
    audio: Some("/assets/audio/debt.mp3"),
    kind: QuestionKind::YesNo,
};

const CAR: Question = Question {
    id: "car",
    prompt: "Do you own or lease a car?",
    audio: Some("/assets/audio/car.mp3"),
    kind: QuestionKind::YesNo,
};

const ACCIDENT: Question = Question {
    id: "accident",
    prompt: "Have you been in a car accident in the last two years?",
    audio: Some("/assets/audio/accident.mp3"),
    kind: QuestionKind::YesNo,
};

const COVERAGE: Question = Question {
    id: "coverage",
    prompt: "What health coverage do you have today?",
    audio: Some("/assets/audio/coverage.mp3"),
    kind: QuestionKind::Choice(&["Medicare", "Medicaid", "Private", "None"]),
};

const GENERAL_QUESTIONS: &[Question] = &[NAME, AGE, ZIP, COVERAGE, DEBT, CAR, ACCIDENT, PHONE, EMAIL];
const SENIOR_QUESTIONS: &[Question] = &[NAME, AGE, ZIP, COVERAGE, PHONE];

const GENERAL_RULES: &[TaggingRule] = &[
    TaggingRule::AgeAtLeast { min: 65, tag: "Medicare" },
    TaggingRule::AnswerIs { question: "coverage", value: "Medicare", tag: "Medicare" },
    TaggingRule::AnswerIs { question: "debt", value: "yes", tag: "Debt" },
    TaggingRule::AnswerIs { question: "car", value: "yes", tag: "Auto" },
    TaggingRule::AnswerIs { question: "accident", value: "yes", tag: "MVA" },
];

const SENIOR_RULES: &[TaggingRule] = &[
    TaggingRule::AgeAtLeast { min: 64, tag: "Medicare" },
    TaggingRule::AnswerIs { question: "coverage", value: "Medicare", tag: "Medicare" },
];

pub const VARIANTS: &[FunnelVariant] = &[
    FunnelVariant {
        slug: "benefits",
        title: "See which benefits you qualify for",
        questions: GENERAL_QUESTIONS,
        rules: GENERAL_RULES,
        email_endpoint: "/email/submit",
        checkout_variant: crate::config::DEFAULT_CHECKOUT_VARIANT,
    },
    FunnelVariant {
        slug: "seniors",
        title: "Seniors: claim your grocery allowance",
        questions: SENIOR_QUESTIONS,
        rules: SENIOR_RULES,
        email_endpoint: "/email/submit2",
        checkout_variant: crate::config::DEFAULT_CHECKOUT_VARIANT,
    },
];

pub fn default_variant() -> &'static FunnelVariant {
    &VARIANTS[0]
}

/// Looks up a variant by slug, falling back to the default one.
pub fn variant(slug: &str) -> &'static FunnelVariant {
    VARIANTS
        .iter()
        .find(|v| v.slug.eq_ignore_ascii_case(slug))
        .unwrap_or_else(default_variant)
}

/// Checks one answer and returns its canonical form.
pub fn validate_answer(kind: &QuestionKind, input: &str) -> Result<String, AnswerError> {
    let input = input.trim();
    match kind {
        QuestionKind::Name => {
            let name = input.split_whitespace().collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                Err(AnswerError::EmptyName)
            } else {
                Ok(name)
            }
        }
        QuestionKind::Age => match input.parse::<u32>() {
            Ok(age) if (18..=120).contains(&age) => Ok(age.to_string()),
            _ => Err(AnswerError::Age),
        },
        QuestionKind::Zip => {
            if input.len() == 5 && input.chars().all(|c| c.is_ascii_digit()) {
                Ok(input.to_string())
            } else {
                Err(AnswerError::Zip)
            }
        }
        QuestionKind::Phone => {
            let phone = sanitize_phone(input);
            if is_international(&phone) {
                Ok(phone)
            } else {
                Err(AnswerError::Phone)
            }
        }
        QuestionKind::Email => {
            let email = input.to_ascii_lowercase();
            match email.split_once('@') {
                Some((local, domain))
                    if !local.is_empty()
                        && !domain.contains('@')
                        && domain.contains('.')
                        && !domain.starts_with('.')
                        && !domain.ends_with('.') =>
                {
                    Ok(email)
                }
                _ => Err(AnswerError::Email),
            }
        }
        QuestionKind::YesNo => match input.to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok("yes".to_string()),
            "no" | "n" => Ok("no".to_string()),
            _ => Err(AnswerError::YesNo),
        },
        QuestionKind::Choice(options) => options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(input))
            .map(|o| o.to_string())
            .ok_or_else(|| AnswerError::Choice(options.join(", "))),
    }
}

/// Tags earned by a set of answers, each at most once, in rule order.
pub fn evaluate_tags(rules: &[TaggingRule], answers: &BTreeMap<String, String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for rule in rules {
        let (matched, tag) = match rule {
            TaggingRule::AnswerIs { question, value, tag } => (
                answers
                    .get(*question)
                    .map_or(false, |a| a.eq_ignore_ascii_case(value)),
                tag,
            ),
            TaggingRule::AgeAtLeast { min, tag } => (
                answers
                    .get("age")
                    .and_then(|a| a.parse::<u32>().ok())
                    .map_or(false, |age| age >= *min),
                tag,
            ),
        };
        if matched && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

/// The scripted chat: one question at a time, answers validated before moving on.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    variant: &'static FunnelVariant,
    step: usize,
    answers: BTreeMap<String, String>,
    transcript: Vec<ChatMessage>,
}

impl Conversation {
    pub fn start(variant: &'static FunnelVariant) -> Self {
        let mut conversation = Self {
            variant,
            step: 0,
            answers: BTreeMap::new(),
            transcript: Vec::new(),
        };
        conversation.ask_current();
        conversation
    }

    fn ask_current(&mut self) {
        if let Some(question) = self.current_question() {
            self.transcript.push(ChatMessage {
                speaker: Speaker::Bot,
                text: question.prompt.to_string(),
            });
        }
    }

    pub fn variant(&self) -> &'static FunnelVariant {
        self.variant
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        self.variant.questions.get(self.step)
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    pub fn answer(&self, id: &str) -> Option<&str> {
        self.answers.get(id).map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.step >= self.variant.questions.len()
    }

    /// Records the answer to the current question. A rejected answer is echoed with
    /// the correction and the question stays open.
    pub fn respond(&mut self, input: &str) -> Result<(), AnswerError> {
        let question = self.current_question().ok_or(AnswerError::Finished)?;
        self.transcript.push(ChatMessage {
            speaker: Speaker::User,
            text: input.trim().to_string(),
        });
        match validate_answer(&question.kind, input) {
            Ok(value) => {
                self.answers.insert(question.id.to_string(), value);
                self.step += 1;
                self.ask_current();
                Ok(())
            }
            Err(e) => {
                self.transcript.push(ChatMessage {
                    speaker: Speaker::Bot,
                    text: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn tags(&self) -> Vec<String> {
        evaluate_tags(self.variant.rules, &self.answers)
    }
}

/// Everything posted to `/response/create` when the chat finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub variant: &'static str,
    pub answers: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub consent: bool,
    pub trusted_form_cert_url: Option<String>,
    pub session_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn from_conversation(
        conversation: &Conversation,
        consent: bool,
        trusted_form_cert_url: Option<String>,
        session_id: String,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            variant: conversation.variant().slug,
            answers: conversation.answers().clone(),
            tags: conversation.tags(),
            consent,
            trusted_form_cert_url,
            session_id,
            submitted_at,
        }
    }

    pub fn to_payload(&self) -> Value {
        json!({
            "variant": self.variant,
            "answers": self.answers,
            "tags": self.tags,
            "consent": self.consent,
            "trustedFormCertUrl": self.trusted_form_cert_url,
            "sessionId": self.session_id,
            "submittedAt": self.submitted_at.to_rfc3339(),
        })
    }
}

/// Query string handed to the congrats page.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CongratsQuery {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finished {
    pub query: CongratsQuery,
    /// Present when the user left an email address.
    pub email: Option<Intent>,
}

/// Stores the answers and remembers the resulting identity for the pages that follow.
pub async fn finish<B: Backend + ?Sized>(
    backend: &B,
    session: &SessionContext,
    submission: &Submission,
) -> Result<Finished, ApiError> {
    let user_id = backend.create_response(&submission.to_payload()).await?;
    info!("Response stored as {}", user_id);

    let phone = submission.answers.get("phone").cloned();
    session.set_last_user(&user_id);
    if let Some(phone) = &phone {
        session.set_last_phone(phone);
    }

    let email = submission.answers.get("email").map(|email| Intent::SubmitEmail {
        endpoint: variant(submission.variant).email_endpoint,
        submission: EmailSubmission {
            email: email.clone(),
            name: submission.answers.get("name").cloned().unwrap_or_default(),
            user_id: user_id.clone(),
        },
    });

    Ok(Finished {
        query: CongratsQuery { user_id, phone },
        email,
    })
}
