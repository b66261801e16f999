//! Turns a persisted schema into a fillable application form.
//!
//! [`render_fields`] maps each field kind to a [`Control`]; [`ApplyForm`]
//! holds what the candidate has entered and moves through
//! editing → submitting → submitted (terminal) or failed (retryable).

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::answers::{AnswerValue, Answers};
use crate::contact::{is_valid_email, normalize_email};
use crate::posting::JobPosting;
use crate::resume::{check_resume, ResumeError, ResumeFormat};
use crate::schema::{FieldDefinition, FieldId, FieldKind, FormSchema};

pub const NAME_LABEL: &str = "Full Name";
pub const EMAIL_LABEL: &str = "Email Address";
pub const RESUME_LABEL: &str = "Resume/CV";
pub const SELECT_PROMPT: &str = "Select an option";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit application. Please try again.";

/// Semantic kind of a single-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Email,
    Tel,
    Number,
    Date,
}

impl InputType {
    pub fn html_type(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Tel => "tel",
            InputType::Number => "number",
            InputType::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Input {
        input_type: InputType,
        placeholder: String,
    },
    TextArea {
        placeholder: String,
        rows: u8,
    },
    /// The first option is always the empty "Select an option" sentinel.
    Select {
        options: Vec<ChoiceOption>,
    },
    RadioGroup {
        name: String,
        options: Vec<String>,
    },
    /// Captioned by the field's placeholder, not its label.
    Checkbox {
        caption: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub field_id: FieldId,
    /// Key the answer is stored under.
    pub key: String,
    pub label: String,
    pub required: bool,
    pub control: Control,
}

/// Renders one field, or nothing for kinds the apply page has no control for.
pub fn render_field(field: &FieldDefinition) -> Option<RenderedField> {
    let input = |input_type| Control::Input {
        input_type,
        placeholder: field.placeholder.clone(),
    };

    let control = match field.kind {
        FieldKind::Text => input(InputType::Text),
        FieldKind::Email => input(InputType::Email),
        FieldKind::Phone => input(InputType::Tel),
        FieldKind::Number => input(InputType::Number),
        FieldKind::Date => input(InputType::Date),
        FieldKind::Textarea => Control::TextArea {
            placeholder: field.placeholder.clone(),
            rows: 4,
        },
        FieldKind::Select => {
            let sentinel = ChoiceOption {
                value: String::new(),
                text: SELECT_PROMPT.to_string(),
            };
            let options = std::iter::once(sentinel)
                .chain(field.options.iter().map(|o| ChoiceOption {
                    value: o.clone(),
                    text: o.clone(),
                }))
                .collect();
            Control::Select { options }
        }
        FieldKind::Radio => Control::RadioGroup {
            name: field.label.clone(),
            options: field.options.clone(),
        },
        FieldKind::Checkbox => Control::Checkbox {
            caption: field.placeholder.clone(),
        },
        FieldKind::File | FieldKind::Unsupported => return None,
    };

    Some(RenderedField {
        field_id: field.id.clone(),
        key: field.label.clone(),
        label: field.label.clone(),
        required: field.required,
        control,
    })
}

pub fn render_fields(schema: &FormSchema) -> Vec<RenderedField> {
    schema.iter().filter_map(render_field).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(String),
    #[error("{0} must be a valid email address")]
    InvalidEmail(String),
    #[error("{0} must be a number")]
    InvalidNumber(String),
    #[error("{label}: {value:?} is not one of the options")]
    InvalidChoice { label: String, value: String },
    #[error(transparent)]
    Resume(#[from] ResumeError),
    #[error("The application can no longer be edited")]
    NotEditable,
}

impl RenderedField {
    /// Applies the constraints the control enforces natively.
    pub fn check(&self, answer: Option<&AnswerValue>) -> Result<(), FormError> {
        let filled = answer.is_some_and(AnswerValue::is_filled);
        if self.required && !filled {
            return Err(FormError::Required(self.label.clone()));
        }
        let Some(text) = answer.and_then(AnswerValue::as_text).map(str::trim) else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        match &self.control {
            Control::Input {
                input_type: InputType::Email,
                ..
            } if !is_valid_email(text) => Err(FormError::InvalidEmail(self.label.clone())),
            Control::Input {
                input_type: InputType::Number,
                ..
            } if text.parse::<f64>().is_err() => Err(FormError::InvalidNumber(self.label.clone())),
            Control::Select { options } if !options.iter().any(|o| o.value == text) => {
                Err(FormError::InvalidChoice {
                    label: self.label.clone(),
                    value: text.to_string(),
                })
            }
            Control::RadioGroup { options, .. } if !options.iter().any(|o| o == text) => {
                Err(FormError::InvalidChoice {
                    label: self.label.clone(),
                    value: text.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Submitted,
    Failed { message: String },
}

/// A candidate's in-progress application for one job.
#[derive(Debug, Clone)]
pub struct ApplyForm {
    job: JobPosting,
    fields: Vec<RenderedField>,
    candidate_name: String,
    candidate_email: String,
    answers: Answers,
    resume: Option<ResumeFile>,
    nonce: Uuid,
    phase: FormPhase,
}

/// Everything the apply endpoint receives, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub answers: Answers,
    pub resume: ResumeFile,
    pub resume_format: ResumeFormat,
    pub idempotency_key: String,
}

impl ApplyForm {
    pub fn new(job: JobPosting) -> Self {
        let fields = render_fields(&job.form_schema);
        Self {
            job,
            fields,
            candidate_name: String::new(),
            candidate_email: String::new(),
            answers: Answers::new(),
            resume: None,
            nonce: Uuid::new_v4(),
            phase: FormPhase::Editing,
        }
    }

    pub fn job(&self) -> &JobPosting {
        &self.job
    }

    pub fn fields(&self) -> &[RenderedField] {
        &self.fields
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn candidate_email(&self) -> &str {
        &self.candidate_email
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    fn accepts_input(&self) -> bool {
        matches!(self.phase, FormPhase::Editing | FormPhase::Failed { .. })
    }

    pub fn set_candidate_name(&mut self, name: impl Into<String>) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.candidate_name = name.into();
        true
    }

    pub fn set_candidate_email(&mut self, email: impl Into<String>) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.candidate_email = email.into();
        true
    }

    /// Records an answer for a rendered field, keyed by its label.
    /// Unknown keys are ignored.
    pub fn set_answer(&mut self, key: &str, value: impl Into<AnswerValue>) -> bool {
        if !self.accepts_input() || !self.fields.iter().any(|f| f.key == key) {
            return false;
        }
        self.answers.insert(key.to_string(), value.into());
        true
    }

    pub fn attach_resume(&mut self, file_name: impl Into<String>, bytes: impl Into<Bytes>) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.resume = Some(ResumeFile {
            file_name: file_name.into(),
            bytes: bytes.into(),
        });
        true
    }

    /// Every constraint the form enforces before it lets a submission go out.
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();

        if self.candidate_name.trim().is_empty() {
            errors.push(FormError::Required(NAME_LABEL.to_string()));
        }
        if self.candidate_email.trim().is_empty() {
            errors.push(FormError::Required(EMAIL_LABEL.to_string()));
        } else if !is_valid_email(&self.candidate_email) {
            errors.push(FormError::InvalidEmail(EMAIL_LABEL.to_string()));
        }
        match &self.resume {
            None => errors.push(FormError::Resume(ResumeError::Missing)),
            Some(resume) => {
                if let Err(e) = check_resume(&resume.file_name, resume.bytes.len()) {
                    errors.push(e.into());
                }
            }
        }

        errors.extend(
            self.fields
                .iter()
                .filter_map(|field| field.check(self.answers.get(&field.key)).err()),
        );
        errors
    }

    /// Validates and moves to `Submitting`. On errors the phase is unchanged.
    pub fn begin_submit(&mut self) -> Result<Submission, Vec<FormError>> {
        if !self.accepts_input() {
            return Err(vec![FormError::NotEditable]);
        }
        let errors = self.validate();
        if !errors.is_empty() {
            debug!(job_id = %self.job.id, errors = errors.len(), "application blocked by validation");
            return Err(errors);
        }
        let Some(resume) = self.resume.clone() else {
            return Err(vec![FormError::Resume(ResumeError::Missing)]);
        };
        let resume_format = check_resume(&resume.file_name, resume.bytes.len())
            .map_err(|e| vec![FormError::from(e)])?;

        self.phase = FormPhase::Submitting;
        Ok(Submission {
            job_id: self.job.id,
            candidate_name: self.candidate_name.trim().to_string(),
            candidate_email: self.candidate_email.trim().to_string(),
            answers: self.answers.clone(),
            resume,
            resume_format,
            idempotency_key: idempotency_key(self.job.id, &self.candidate_email, self.nonce),
        })
    }

    pub fn mark_submitted(&mut self) {
        self.phase = FormPhase::Submitted;
    }

    /// Keeps every entered value so the candidate can retry.
    pub fn mark_failed(&mut self) {
        self.phase = FormPhase::Failed {
            message: SUBMIT_FAILED_MESSAGE.to_string(),
        };
    }

    pub fn cancel_submission(&mut self) {
        if self.phase == FormPhase::Submitting {
            self.phase = FormPhase::Editing;
        }
    }
}

/// Stable key for one form instance: retrying the same form reuses it, a
/// new visit to the page gets a new nonce.
pub fn idempotency_key(job_id: Uuid, email: &str, nonce: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job_id.as_bytes());
    hasher.update(b"|");
    hasher.update(normalize_email(email).as_bytes());
    hasher.update(b"|");
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}

impl Submission {
    pub fn answers_json(&self) -> String {
        serde_json::to_string(&self.answers).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let answers = self.answers_json();
        let resume = reqwest::multipart::Part::bytes(self.resume.bytes.to_vec())
            .file_name(self.resume.file_name)
            .mime_str(self.resume_format.content_type())?;
        Ok(reqwest::multipart::Form::new()
            .text("candidateName", self.candidate_name)
            .text("candidateEmail", self.candidate_email)
            .text("answers", answers)
            .text("idempotencyKey", self.idempotency_key)
            .part("resume", resume))
    }
}
