//! Negotiation email drafting.

use serde_json::json;

use super::prompts::{negotiation_email_prompt, NO_NEGOTIATION_NEEDED};
use super::AnalysisError;
use crate::llm::TextGenerator;
use crate::models::{AnalysisOutcome, Clause};

/// At most this many concerning clauses go into the prompt.
const MAX_CONCERNS: usize = 5;

pub(super) async fn negotiation_email(
    generator: &dyn TextGenerator,
    outcome: &AnalysisOutcome,
) -> Result<String, AnalysisError> {
    let Some(analysis) = outcome.as_contract() else {
        return Ok(NO_NEGOTIATION_NEEDED.to_string());
    };

    let concerns: Vec<&Clause> = analysis.concerning_clauses().take(MAX_CONCERNS).collect();
    if concerns.is_empty() {
        return Ok(NO_NEGOTIATION_NEEDED.to_string());
    }

    let context = json!({
        "summary": analysis.summary,
        "concerning_clauses": concerns,
        "next_steps": analysis.next_steps,
    });
    let context = serde_json::to_string_pretty(&context)
        .map_err(|e| AnalysisError::Parse(e.to_string()))?;

    tracing::info!(
        filename = %analysis.filename,
        concerns = concerns.len(),
        "Drafting negotiation email"
    );
    let reply = generator.generate(&negotiation_email_prompt(&context)).await?;
    Ok(reply.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;
    use crate::models::{ContractAnalysis, Rejection, RiskLevel, Summary};

    fn clause(n: usize, level: RiskLevel) -> Clause {
        Clause {
            clause_type: "revisions".to_string(),
            risk_level: level,
            original_text: format!("clause-{n}"),
            explanation: "x".to_string(),
            push_back: None,
            suggested_alternative: None,
        }
    }

    fn contract(clauses: Vec<Clause>) -> AnalysisOutcome {
        AnalysisOutcome::Contract(ContractAnalysis {
            summary: Summary::tally(&clauses),
            clauses,
            next_steps: vec!["Ask for a kill fee".to_string()],
            filename: "deal.pdf".to_string(),
            country: "United States".to_string(),
            contract_text_preview: String::new(),
        })
    }

    #[tokio::test]
    async fn test_all_green_skips_model() {
        let generator = ScriptedGenerator::new().with_reply("should not be used");
        let outcome = contract(vec![clause(0, RiskLevel::Green), clause(1, RiskLevel::Green)]);
        let email = negotiation_email(&generator, &outcome).await.unwrap();
        assert_eq!(email, NO_NEGOTIATION_NEEDED);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejection_skips_model() {
        let generator = ScriptedGenerator::new();
        let outcome = AnalysisOutcome::Rejected(Rejection {
            not_a_contract: true,
            prank_detected: true,
            document_type: "poem".to_string(),
            message: "Bruh".to_string(),
            filename: "poem.txt".to_string(),
            suggestion: "Upload a contract".to_string(),
        });
        let email = negotiation_email(&generator, &outcome).await.unwrap();
        assert_eq!(email, NO_NEGOTIATION_NEEDED);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_prompt_holds_first_five_concerns_in_order() {
        let generator = ScriptedGenerator::new().with_reply("\n  Hi Brand team,\nThanks!  \n");
        let mut clauses = vec![clause(0, RiskLevel::Green)];
        clauses.extend((1..=7).map(|n| {
            let level = if n % 2 == 0 { RiskLevel::Red } else { RiskLevel::Yellow };
            clause(n, level)
        }));

        let email = negotiation_email(&generator, &contract(clauses)).await.unwrap();
        assert_eq!(email, "Hi Brand team,\nThanks!");
        assert_eq!(generator.calls(), 1);

        let prompt = &generator.prompts()[0];
        assert!(!prompt.contains("clause-0"));
        assert!(!prompt.contains("clause-6"));
        assert!(!prompt.contains("clause-7"));
        let positions: Vec<usize> = (1..=5)
            .map(|n| prompt.find(&format!("clause-{n}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("Ask for a kill fee"));
        assert!(prompt.contains("\"summary\""));
    }
}
