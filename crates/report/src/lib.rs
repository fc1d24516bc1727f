use chrono::NaiveDateTime;
use extract::{StructuredReport, NOT_MENTIONED};
use serde::{Deserialize, Serialize};

/// Column width of the summary paragraph.
pub const SUMMARY_WIDTH: usize = 70;

const RULE: &str = "==============================================";
const SECTION_RULE: &str = "-------";

/// Fixed identity lines printed at the top of every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    pub hospital_name: String,
    pub physician_name: String,
}

impl Default for ReportHeader {
    fn default() -> Self {
        Self {
            hospital_name: "[Hospital Name/Clinic Name]".to_string(),
            physician_name: "[Physician Name]".to_string(),
        }
    }
}

/// Render the consultation report as plain text.
pub fn render_report(
    report: &StructuredReport,
    summary: &str,
    header: &ReportHeader,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("{RULE}\n         MEDICAL CONSULTATION REPORT\n{RULE}\n\n"));
    out.push_str(&format!("Hospital/Clinic: {}\n", header.hospital_name));
    out.push_str(&format!("Date: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Physician: {}\n\n", header.physician_name));

    section(&mut out, "PATIENT INFORMATION");
    out.push_str(&format!("Patient Name: {}\n\n", report.patient_name));

    section(&mut out, "SUMMARY OF CONSULTATION");
    out.push_str(&wrap(summary, SUMMARY_WIDTH));
    out.push_str("\n\n");

    section(&mut out, "CLINICAL FINDINGS");
    out.push_str(&format!("Diagnosis:\n{}\n\n", report.diagnosis));
    out.push_str(&format!("Symptoms Reported:\n{}\n\n", bullets(&report.symptoms)));
    out.push_str(&format!("Current Status:\n{}\n\n", report.current_status));

    section(&mut out, "TREATMENT & PROGNOSIS");
    out.push_str(&format!(
        "Treatment Provided/Recommended:\n{}\n\n",
        bullets(&report.treatments)
    ));
    out.push_str(&format!("Prognosis:\n{}\n\n", report.prognosis));

    out.push_str(&format!("{RULE}\n                END OF REPORT\n{RULE}\n"));

    out.trim().to_string()
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("{SECTION_RULE}\n{title}\n{SECTION_RULE}\n"));
}

fn bullets(values: &[String]) -> String {
    if StructuredReport::is_placeholder(values) {
        NOT_MENTIONED.to_string()
    } else {
        format!("- {}", values.join("\n- "))
    }
}

/// Greedy word wrap. Words longer than `width` are split; a zero width wraps at one char.
pub fn wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        if line_len > 0 && line_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line_len += word.len();
        line.extend(word);
    }
    if line_len > 0 {
        lines.push(line);
    }

    lines.join("\n")
}
