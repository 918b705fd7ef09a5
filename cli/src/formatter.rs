use mathmend::{CorruptionReport, PipelineResult};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_result(&self, result: &PipelineResult, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("markup:  {}\n", result.clean_markup));
        if !result.human_readable.is_empty() {
            output.push_str(&format!("text:    {}\n", result.human_readable));
        }
        output.push_str(&format!(
            "valid:   {} (confidence {:.2}{})\n",
            result.is_valid,
            result.confidence,
            if result.used_escalation {
                ", escalated"
            } else {
                ""
            }
        ));

        if !result.corruption.is_empty() {
            output.push_str("corruption:\n");
            for violation in result.corruption.iter() {
                output.push_str(&format!(
                    "  {} at {}..{}\n",
                    violation.name, violation.span.start, violation.span.end
                ));
            }
        }

        if verbose {
            output.push_str("log:\n");
            for entry in &result.log {
                output.push_str(&format!("  {}\n", entry));
            }
        }

        output
    }

    pub fn format_violations(&self, report: &CorruptionReport) -> String {
        if report.is_empty() {
            return "clean\n".to_string();
        }
        let mut output = String::new();
        for violation in report.iter() {
            output.push_str(&format!(
                "{} at {}..{}\n",
                violation.name, violation.span.start, violation.span.end
            ));
        }
        output
    }
}
