//! Prompt construction for grant qualification

use serde::{Deserialize, Serialize};
use std::fmt;

const SYSTEM_PREAMBLE: &str = "You are an expert grant-qualification assistant. \
Given a company profile and exactly one grant proposal, ";

/// Response shape the language model is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptTemplate {
    /// `{"qualifies": "yes"/"no", "reason": "..."}`
    Verdict,
    /// `[{"section": ..., "score": 0-10, "reason": ...}, ...]`
    Rubric,
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptTemplate::Verdict => write!(f, "verdict"),
            PromptTemplate::Rubric => write!(f, "rubric"),
        }
    }
}

impl PromptTemplate {
    fn instructions(&self) -> &'static str {
        match self {
            PromptTemplate::Verdict => {
                "for the proposal answer: Does the company qualify? Output JSON with keys \
\"qualifies\":\"yes\"/\"no\",\"reason\":\"...\".\n\n"
            }
            PromptTemplate::Rubric => {
                "evaluate the proposal based on its alignment with the company's profile. \
For each section of the proposal, assign a score from 0 to 10 based on how well it matches \
the company profile, and provide reasoning for the score.\n\n\
Output the results in the following format:\n\
[\n  {\"section\": \"section_name\", \"score\": score, \"reason\": \"reasoning for score\"},\n  ...\n]\n\n"
            }
        }
    }

    /// Render the full prompt for one proposal
    pub fn render(&self, company_text: &str, filename: &str, proposal_text: &str) -> String {
        format!(
            "SYSTEM:\n{preamble}{instructions}CONTEXT:\nCompany Profile:\n{company}\n\n\
Proposal ({filename}):\n{proposal}\n\nASSISTANT (JSON only):",
            preamble = SYSTEM_PREAMBLE,
            instructions = self.instructions(),
            company = company_text,
            filename = filename,
            proposal = proposal_text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_prompt_layout() {
        let prompt = PromptTemplate::Verdict.render("Acme builds robots.", "a.pdf", "Robotics grant.");

        assert!(prompt.starts_with("SYSTEM:\nYou are an expert grant-qualification assistant."));
        assert!(prompt.contains("\"qualifies\":\"yes\"/\"no\",\"reason\":\"...\".\n\nCONTEXT:"));
        assert!(prompt.contains("Company Profile:\nAcme builds robots.\n\n"));
        assert!(prompt.contains("Proposal (a.pdf):\nRobotics grant.\n\n"));
        assert!(prompt.ends_with("ASSISTANT (JSON only):"));
    }

    #[test]
    fn test_rubric_prompt_asks_for_sections() {
        let prompt = PromptTemplate::Rubric.render("profile", "b.pdf", "text");

        assert!(prompt.contains("assign a score from 0 to 10"));
        assert!(prompt.contains("{\"section\": \"section_name\""));
        assert!(!prompt.contains("\"qualifies\""));
        assert!(prompt.ends_with("ASSISTANT (JSON only):"));
    }

    #[test]
    fn test_template_serde_names() {
        let json = serde_json::to_string(&PromptTemplate::Rubric).unwrap();
        assert_eq!(json, "\"rubric\"");
        assert_eq!(PromptTemplate::Verdict.to_string(), "verdict");
    }
}
