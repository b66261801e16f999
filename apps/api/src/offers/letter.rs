use chrono::NaiveDate;

use crate::notify::templates::{escape_html, format_salary};

pub struct LetterDetails<'a> {
    pub company: &'a str,
    pub candidate_name: &'a str,
    pub position: &'a str,
    pub salary: f64,
    pub date: NaiveDate,
}

/// Renders the printable offer letter page.
pub fn render_offer_letter(details: &LetterDetails<'_>) -> String {
    let company = escape_html(details.company);
    let position = escape_html(details.position);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Job Offer Letter</title>
  <style>
    body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 40px auto; padding: 20px; }}
    h1 {{ color: #333; }}
    .details {{ margin: 20px 0; }}
    .signature {{ margin-top: 60px; }}
  </style>
</head>
<body>
  <h1>Job Offer Letter</h1>
  <p>Date: {date}</p>
  <p>Dear {name},</p>
  <p>We are pleased to offer you the position of <strong>{position}</strong> at {company}.</p>
  <div class="details">
    <h3>Offer Details:</h3>
    <ul>
      <li><strong>Position:</strong> {position}</li>
      <li><strong>Salary:</strong> {salary}</li>
      <li><strong>Start Date:</strong> To be determined</li>
    </ul>
  </div>
  <p>We look forward to having you join our team!</p>
  <div class="signature">
    <p>Sincerely,</p>
    <p><strong>{company}</strong><br>Human Resources Department</p>
  </div>
</body>
</html>
"#,
        date = details.date.format("%B %-d, %Y"),
        name = escape_html(details.candidate_name),
        salary = format_salary(details.salary),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_escapes_and_formats() {
        let html = render_offer_letter(&LetterDetails {
            company: "Acme",
            candidate_name: "<b>Ada</b>",
            position: "Engineer",
            salary: 100000.0,
            date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
        });
        assert!(html.contains("Date: January 9, 2025"));
        assert!(html.contains("Dear &lt;b&gt;Ada&lt;/b&gt;,"));
        assert!(html.contains("<strong>Salary:</strong> $100,000.00"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
