//! Resume upload rules shared by the apply form and the server.
//!
//! The form checks them for fast feedback; the server repeats the check and
//! is the authority.

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Accepted resume formats, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
}

impl ResumeFormat {
    pub const ALL: [ResumeFormat; 3] = [ResumeFormat::Pdf, ResumeFormat::Doc, ResumeFormat::Docx];

    pub fn extension(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Doc => "doc",
            ResumeFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Doc => "application/msword",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResumeError {
    #[error("Resume is required")]
    Missing,
    #[error("Only PDF, DOC and DOCX files are allowed")]
    UnsupportedType,
    #[error("Resume file is empty")]
    Empty,
    #[error("File too large. Maximum size is 5MB.")]
    TooLarge { size: usize },
}

/// Checks a resume's file name and size against the upload rules.
pub fn check_resume(file_name: &str, size: usize) -> Result<ResumeFormat, ResumeError> {
    let format = ResumeFormat::from_file_name(file_name).ok_or(ResumeError::UnsupportedType)?;
    if size == 0 {
        return Err(ResumeError::Empty);
    }
    if size > MAX_RESUME_BYTES {
        return Err(ResumeError::TooLarge { size });
    }
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_extensions() {
        assert_eq!(check_resume("cv.pdf", 10), Ok(ResumeFormat::Pdf));
        assert_eq!(check_resume("CV.DOCX", 10), Ok(ResumeFormat::Docx));
        assert_eq!(check_resume("my.resume.doc", 10), Ok(ResumeFormat::Doc));
    }

    #[test]
    fn test_rejects_other_types() {
        assert_eq!(check_resume("cv.exe", 10), Err(ResumeError::UnsupportedType));
        assert_eq!(check_resume("pdf", 10), Err(ResumeError::UnsupportedType));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(check_resume("cv.pdf", MAX_RESUME_BYTES).is_ok());
        assert_eq!(
            check_resume("cv.pdf", MAX_RESUME_BYTES + 1),
            Err(ResumeError::TooLarge {
                size: MAX_RESUME_BYTES + 1
            })
        );
        assert_eq!(check_resume("cv.pdf", 0), Err(ResumeError::Empty));
    }
}
