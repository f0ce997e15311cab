//! Prompt templates for contract analysis.
//!
//! Only the named placeholders are substituted, so literal JSON braces in
//! the templates need no escaping.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ANALYSIS_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(country|contract_text)\}").unwrap());

/// Main analysis prompt. Uses `{country}` and `{contract_text}`.
pub const ANALYSIS_PROMPT: &str = r#"You are a contract analysis expert helping content creators understand influencer/brand collaboration contracts.

FIRST: Decide whether this document is actually a contract, deal, agreement, or business proposal. A contract or deal usually contains:
- Legal terms, obligations, or agreements between parties
- Payment terms, deliverables, timelines
- Rights, licenses, exclusivity clauses
- Signatures or signature blocks
- Business collaboration terms

If this document is NOT a contract, deal, agreement, or business proposal (for example: a random article, homework, a recipe, a resume, memes, lyrics, personal notes), respond with exactly this JSON:
{
  "not_a_contract": true,
  "document_type": "<what type of document this appears to be>"
}

If it IS a contract or deal, identify its risky clauses. For each clause, determine:
1. The clause type (exclusivity, usage_rights, ip_ownership, payment_terms, revisions, termination, auto_renewal, deliverables)
2. Risk level: "green" (safe/standard), "yellow" (vague/negotiable), or "red" (high-risk)
3. A plain English explanation (talk like you're explaining to a friend, not a lawyer)
4. What to push back on (if yellow or red)
5. Suggested alternative wording (if yellow or red)

Focus on the high-risk areas common in creator contracts:
- Exclusivity: How long? How broad? Does it block similar brand work?
- Usage Rights: Can they use your content in paid ads? For how long? Forever?
- IP Ownership: Are you transferring ownership or just licensing?
- Payment Terms: When do you get paid? Based on approval? Net 30? Net 60?
- Revisions: Unlimited revisions = unpaid work. Look for limits.
- Termination: Is there a kill fee? What if they cancel?
- Auto-Renewal: Does it auto-renew? How do you opt out?
- Deliverables: Are they specific or vague?

Country context for legal nuances: {country}

CONTRACT TEXT:
{contract_text}

Respond in exactly this JSON format:
{
  "summary": {
    "total_clauses": <number>,
    "green_count": <number>,
    "yellow_count": <number>,
    "red_count": <number>,
    "biggest_risk": "<brief description of the single biggest long-term risk>"
  },
  "clauses": [
    {
      "type": "<clause type>",
      "risk_level": "green|yellow|red",
      "original_text": "<relevant text from contract>",
      "explanation": "<plain English explanation>",
      "push_back": "<what to ask/push back on, or null if green>",
      "suggested_alternative": "<suggested wording, or null if green>"
    }
  ],
  "next_steps": [
    "<ranked action item 1>",
    "<ranked action item 2>",
    "<ranked action item 3>"
  ]
}

Only return valid JSON, no markdown formatting or code blocks."#;

/// Negotiation email prompt. Uses `{analysis_json}`.
pub const NEGOTIATION_EMAIL_PROMPT: &str = r#"You are helping a content creator write a professional but friendly email to negotiate contract terms with a brand.

Based on this contract analysis, write a concise negotiation email that:
1. Thanks them for the opportunity
2. Addresses the top concerns (red flags first, then yellow)
3. Proposes specific alternatives for each concern
4. Keeps a collaborative, not adversarial tone
5. Is ready to copy/paste and send

Analysis:
{analysis_json}

Write ONLY the email body (no subject line). Keep it under 200 words. Be professional but warm."#;

/// Returned instead of an email when nothing needs negotiating.
pub const NO_NEGOTIATION_NEEDED: &str = "Great news! This contract looks pretty standard and doesn't have major red flags. You may not need to negotiate, but always feel free to ask clarifying questions!";

/// Rejection messages, parameterized by `{doc_type}`.
pub const REJECTION_TEMPLATES: [&str; 5] = [
    "Nice try! 🎭 You uploaded a {doc_type}... try pranking me next time. Pls give me an actual contract, bestie!",
    "Uhh... this looks like a {doc_type}? I'm a contract analyzer, not a fortune teller! 🔮 Send me a real deal!",
    "Lmao you really thought I wouldn't notice this is just a {doc_type}? 😂 Give me a contract or go home!",
    "Bruh. This is a {doc_type}. I analyze CONTRACTS. You know, the legal stuff? Try again! 📜",
    "Error 404: Contract not found. Found: {doc_type}. Try pranking me next time! 🤡",
];

/// Fixed suggestion attached to every rejection.
pub const REJECTION_SUGGESTION: &str =
    "Upload a real contract, deal, or agreement and I'll help you spot the red flags! 🚩";

/// Document type used when the model does not name one.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "random document";

/// Fill the analysis prompt.
///
/// Both placeholders are filled in one pass; user input is never rescanned.
pub fn analysis_prompt(contract_text: &str, country: &str) -> String {
    ANALYSIS_PLACEHOLDER
        .replace_all(ANALYSIS_PROMPT, |caps: &Captures| match &caps[1] {
            "country" => country,
            _ => contract_text,
        })
        .into_owned()
}

/// Fill the negotiation email prompt.
pub fn negotiation_email_prompt(analysis_json: &str) -> String {
    NEGOTIATION_EMAIL_PROMPT.replace("{analysis_json}", analysis_json)
}
