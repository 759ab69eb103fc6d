//! Sharingan (§4.4.2): ambiguity scoring, code/text classification, and the
//! prompt-injection guard.

use once_cell::sync::Lazy;
use overseer_core::{RequestEnvelope, ResponseEnvelope, StatusCode};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::harness::{example_envelope, respond, run, settings_f64};

const TAG: &str = "[EYE/SHARINGAN]";

const VAGUE_WORDS: &[&str] = &["some", "stuff", "thing", "things", "various"];
const UNSPECIFIED_WORDS: &[&str] = &["asap", "urgent", "improve", "better", "nice", "quickly"];
const IMPERATIVE_HINTS: &[&str] = &[
    "write", "summarize", "explain", "create", "draft", "analyze", "plan", "design", "fix", "build",
    "generate", "compare", "investigate", "update", "improve",
];

const TOOLING_KEYWORDS: &[&str] = &["repo", "pr", "pull request", "commit", "branch", "ci", "cd", "lint", "build", "pipeline"];
const ARTIFACT_KEYWORDS: &[&str] = &["function", "class", "module", "package", "api", "endpoint", "schema", "migration", "dockerfile"];
const TECH_KEYWORDS: &[&str] = &[
    "react", "next.js", "vue", "svelte", "angular", "django", "flask", "fastapi", "spring", "rails",
    "laravel", "node", "express", "nest", "prisma",
];
const CODE_EXTENSIONS: &[&str] = &[
    ".py", ".ts", ".tsx", ".js", ".jsx", ".java", ".rb", ".go", ".rs", ".cpp", ".c", ".h", ".css", ".scss", ".html",
];
const STRONG_ACTION_KEYWORDS: &[&str] = &[
    "modify", "refactor", "fix", "bug", "feature", "optimize", "improve", "diff", "patch", "change",
    "tests", "test", "docs", "documentation",
];
const ACTION_KEYWORDS: &[&str] = &[
    "write", "modify", "refactor", "review", "fix", "bug", "feature", "optimize", "improve", "diff",
    "patch", "change", "tests", "test", "docs", "documentation",
];

const INJECTION_PATTERNS: &[&str] = &[
    "ignore previous instructions",
    "forget the previous",
    "disregard all prior",
    "system prompt",
    "developer prompt",
    "begin_system_prompt",
    "end_system_prompt",
];

const CLARIFYING_QUESTION_BANK: &[&str] = &[
    "What outcome should the host deliver?",
    "Who is the target audience and their expertise level?",
    "What constraints (tone, tools, scope) must be honored?",
    "Are there mandatory sources or datasets to consult?",
    "What does success look like for the requester?",
    "Are there sections or deliverables that must be avoided?",
];

const POLICY_MD: &str = "### Policy\nIf ambiguous=true, the host must ask these questions before drafting. \
If is_code_related=true, follow the Code branch: Prompt Helper → Jōgan → Rinnegan plan → Mangekyō phases. \
Otherwise follow the Text branch: Prompt Helper → Jōgan → Tenseigan → Byakugan.";

static VERB_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]+ing$").expect("static pattern"));
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9_./+-]+").expect("static pattern"));
static EXAMPLE: Lazy<Value> = Lazy::new(|| example_envelope(json!({"prompt": "Refactor the billing module to fix the rounding bug", "lang": "en"}), false));

#[derive(Debug, Deserialize)]
struct Payload {
    prompt: String,
    #[serde(default)]
    #[allow(dead_code)]
    lang: Option<String>,
}

fn normalize_tokens(prompt: &str) -> HashSet<String> {
    TOKEN_PATTERN.find_iter(&prompt.to_lowercase()).map(|m| m.as_str().to_string()).collect()
}

fn ambiguity_score(prompt: &str, threshold: f64) -> (f64, bool, i64) {
    let stripped = prompt.trim();
    let raw_tokens: Vec<&str> = stripped.split_whitespace().collect();
    let tokens: Vec<String> = raw_tokens
        .iter()
        .map(|t| t.trim_matches(|c: char| ".,:;?!".contains(c)).to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let token_count = tokens.len();

    let mut score = 0.0;
    if token_count < 8 {
        score += 0.4;
    } else if token_count < 15 {
        score += 0.25;
    } else if token_count < 40 {
        score += 0.1;
    }

    let question_marks = stripped.matches('?').count();
    if question_marks == 0 {
        score += 0.05;
    }

    let vague_hits = tokens.iter().filter(|t| VAGUE_WORDS.contains(&t.to_lowercase().as_str())).count();
    let unspecified_hits = tokens.iter().filter(|t| UNSPECIFIED_WORDS.contains(&t.to_lowercase().as_str())).count();
    score += 0.12 * vague_hits as f64;
    score += 0.1 * unspecified_hits as f64;

    let verb_count = tokens
        .iter()
        .filter(|t| VERB_SUFFIX.is_match(&t.to_lowercase()) || IMPERATIVE_HINTS.contains(&t.to_lowercase().as_str()))
        .count();
    if verb_count == 0 {
        score += 0.1;
    }

    let score = score.clamp(0.0, 1.0);
    let ambiguous = score >= threshold.clamp(0.0, 1.0);
    let target = (score * 5.0).ceil() as i64;
    let x = target.clamp(2, 6);
    ((score * 100.0).round() / 100.0, ambiguous, x)
}

fn keyword_matches(prompt_lower: &str, tokens: &HashSet<String>, keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|kw| {
            if kw.contains(' ') || kw.contains('.') {
                prompt_lower.contains(*kw)
            } else {
                tokens.contains(**kw)
            }
        })
        .map(|kw| (*kw).to_string())
        .collect()
}

fn detect_code_features(prompt: &str) -> (bool, Vec<String>) {
    let prompt_lower = prompt.to_lowercase();
    let tokens = normalize_tokens(prompt);
    let mut features = Vec::new();

    for kw in keyword_matches(&prompt_lower, &tokens, TOOLING_KEYWORDS) {
        features.push(format!("Tooling reference '{kw}'"));
    }
    for kw in keyword_matches(&prompt_lower, &tokens, ARTIFACT_KEYWORDS) {
        features.push(format!("Implementation artifact '{kw}'"));
    }
    for kw in keyword_matches(&prompt_lower, &tokens, TECH_KEYWORDS) {
        features.push(format!("Tech keyword '{kw}'"));
    }
    for ext in CODE_EXTENSIONS.iter().filter(|e| prompt_lower.contains(**e)) {
        features.push(format!("File extension '{ext}'"));
    }
    if prompt.contains("```") {
        features.push("Code fence detected".to_string());
    }

    let action_hits = keyword_matches(&prompt_lower, &tokens, ACTION_KEYWORDS);
    let (strong, weak): (Vec<_>, Vec<_>) = action_hits.into_iter().partition(|kw| STRONG_ACTION_KEYWORDS.contains(&kw.as_str()));
    for kw in &strong {
        features.push(format!("Action keyword '{kw}'"));
    }

    let code_word_present = ["code", "codes", "coding"].iter().any(|w| tokens.contains(*w));
    if !features.is_empty() || code_word_present {
        for kw in &weak {
            features.push(format!("Action keyword '{kw}'"));
        }
    }

    let mut seen = HashSet::new();
    features.retain(|f| seen.insert(f.clone()));

    (!features.is_empty(), features)
}

fn prompt_injection_hit(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    INJECTION_PATTERNS.iter().any(|p| lower.contains(p))
}

fn build_questions_md(x: i64) -> String {
    let x = x as usize;
    let mut questions = Vec::with_capacity(x);
    while questions.len() < x {
        let remaining = x - questions.len();
        questions.extend(CLARIFYING_QUESTION_BANK.iter().take(remaining));
    }
    let bullets: Vec<String> = questions.iter().map(|q| format!("- {q}")).collect();
    format!("### Clarifying Questions\n{}", bullets.join("\n"))
}

/// Run Sharingan's classification and ambiguity scoring.
#[must_use]
pub fn run_eye(env: &RequestEnvelope) -> ResponseEnvelope {
    run::<Payload, _>(TAG, &EXAMPLE, env, None, |payload, env| {
        if prompt_injection_hit(&payload.prompt) {
            return respond(
                TAG,
                false,
                StatusCode::EPromptGuard,
                "### Prompt Guard\nThe prompt matched a prompt-injection pattern.",
                Map::new(),
                "Rewrite the request to remove unsafe or meta-instructions, then resubmit.",
            );
        }

        let threshold = settings_f64(env, "ambiguity_threshold", 0.35);
        let (score, ambiguous, x) = ambiguity_score(&payload.prompt, threshold);
        let (is_code_related, code_features) = detect_code_features(&payload.prompt);

        let mut reasoning_lines = vec![
            "### Reasoning".to_string(),
            format!("- Ambiguity score {score:.2} (threshold {threshold:.2})."),
        ];
        if ambiguous {
            reasoning_lines.push("- Prompt remains underspecified; clarification required before drafting.".to_string());
        }
        if is_code_related {
            reasoning_lines.extend(code_features.iter().map(|f| format!("- Detected {f}.")));
        } else {
            reasoning_lines.push("- No explicit code indicators detected; treating as text/analysis request.".to_string());
        }
        let reasoning_md = reasoning_lines.join("\n");

        let md = if ambiguous {
            "### Ambiguity\nThe prompt is ambiguous; clarification is required before proceeding.".to_string()
        } else if is_code_related {
            "### Classification\nCode-related task detected.".to_string()
        } else {
            "### Classification\nNon-code request detected.".to_string()
        };

        let next = if ambiguous {
            "Ask these questions to the user and resubmit answers to Prompt Helper."
        } else if is_code_related {
            "Proceed to helper/rewrite_prompt, then follow the Code branch (Jōgan -> Rinnegan plan -> Mangekyō phases)."
        } else {
            "Proceed to helper/rewrite_prompt, then follow the Text branch (Jōgan -> Tenseigan -> Byakugan)."
        };

        let mut data = Map::new();
        data.insert("score".into(), json!(score));
        data.insert("ambiguous".into(), json!(ambiguous));
        data.insert("x".into(), json!(x));
        data.insert("is_code_related".into(), json!(is_code_related));
        data.insert("reasoning_md".into(), json!(reasoning_md));
        data.insert("questions_md".into(), json!(build_questions_md(x)));
        data.insert("policy_md".into(), json!(POLICY_MD));

        respond(
            TAG,
            !ambiguous,
            if ambiguous { StatusCode::ENeedsClarification } else { StatusCode::OkNoClarificationNeeded },
            md,
            data,
            next,
        )
    })
}
