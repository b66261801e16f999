//! Schema-driven application forms.
//!
//! - [`schema`]: the persisted form model and its validation rules
//! - [`builder`]: the operator-facing editor
//! - [`renderer`]: the candidate-facing form and its submission
//! - [`client`]: HTTP access to the public job and apply endpoints
//! - [`scoring`]: the completeness score stored with each application

pub mod answers;
pub mod builder;
pub mod client;
pub mod contact;
pub mod posting;
pub mod renderer;
pub mod resume;
pub mod schema;
pub mod scoring;

pub use answers::{parse_answers, AnswerValue, Answers, AnswersError};
pub use builder::{DragSession, FieldPatch, FormBuilder, PaletteEntry, PALETTE};
pub use client::{ApplyClient, ClientError, SubmittedApplication};
pub use posting::{JobPosting, JobStatus};
pub use renderer::{render_fields, ApplyForm, Control, FormError, FormPhase, RenderedField};
pub use resume::{check_resume, ResumeError, ResumeFormat, MAX_RESUME_BYTES};
pub use schema::{FieldDefinition, FieldId, FieldKind, FormSchema, SchemaError, SchemaViolation};
pub use scoring::completeness_score;
