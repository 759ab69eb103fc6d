//! The request/response envelope shapes shared by every Eye (§3, §6.2).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::status::StatusCode;
use crate::types::{Lang, SessionId, TenantId};

/// `context` block of a request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The session this call belongs to.
    pub session_id: SessionId,
    /// Caller-supplied user identifier, opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Tenant the caller claims to belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantId>,
    /// Language hint.
    #[serde(default)]
    pub lang: Lang,
    /// Tokens the caller is prepared to spend on this call. Must be `>= 0`
    /// for the request to be well-formed; a negative value is the mid-Eye
    /// budget error path (§7 kind 5).
    pub budget_tokens: i64,
    /// Caller-supplied request id, opaque to the core, echoed in audit records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Effective settings, populated by the settings resolver before the Eye
    /// runs. Absent/empty on the wire when the caller submits a request; the
    /// harness always overwrites this field.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

/// Full request envelope passed to an Eye.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Request context.
    pub context: RequestContext,
    /// Eye-specific payload, validated against that Eye's schema.
    #[serde(default)]
    pub payload: Value,
    /// Required for review-style Eyes; optional for static/informational ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_md: Option<String>,
}

impl RequestEnvelope {
    /// `reasoning_md`, treating absent and empty-after-trim as equally missing.
    #[must_use]
    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning_md
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The closed per-Eye registry of `data` keys a response may carry.
///
/// Enforced by [`ResponseEnvelope::build`] so a validator cannot silently
/// grow the wire contract by adding an ad hoc field.
#[must_use]
pub fn allowed_data_keys(tag: &str) -> &'static [&'static str] {
    match tag {
        "[EYE/OVERSEER]" => &[
            "summary_md",
            "instructions_md",
            "schema_md",
            "example_md",
            "contract_json",
            "next_action_md",
        ],
        "[EYE/SHARINGAN]" => &[
            "score",
            "ambiguous",
            "x",
            "is_code_related",
            "reasoning_md",
            "questions_md",
            "policy_md",
        ],
        "[EYE/HELPER]" => &["prompt_md", "instructions_md", "next_action_md"],
        "[EYE/JOGAN]" => &["missing_sections", "issues_md"],
        "[EYE/RINNEGAN]" => &[
            "schema_md",
            "example_md",
            "acceptance_criteria_md",
            "approved",
            "issues_md",
            "summary_md",
            "phases",
        ],
        "[EYE/MANGEKYO]" => &["approved", "issues_md", "checklist_md", "coverage"],
        "[EYE/TENSEIGAN]" => &["approved", "issues_md", "weak_citations"],
        "[EYE/BYAKUGAN]" => &["consistency_score", "issues_md"],
        _ => &[],
    }
}

/// Response envelope returned by every Eye, invariant in shape (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Fixed per-Eye tag, e.g. `"[EYE/SHARINGAN]"`.
    pub tag: String,
    /// Whether the Eye's predicate passed.
    pub ok: bool,
    /// Closed-set status code.
    pub code: StatusCode,
    /// Non-empty markdown summary for a human or host-agent reader.
    pub md: String,
    /// Eye-specific structured data, keys drawn from [`allowed_data_keys`].
    pub data: Map<String, Value>,
    /// Directive for the host's next move.
    pub next: String,
}

impl ResponseEnvelope {
    /// Construct a response, validating the invariants in §3 and §8:
    /// `md`/`next` non-empty, `data` keys within the per-tag registry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnregisteredDataKey`] if `data` carries a key
    /// outside the tag's registry. Panics in debug builds (via `debug_assert`)
    /// if `md` or `next` is empty — that is always a bug in the calling Eye,
    /// never a reachable runtime condition.
    pub fn build(
        tag: impl Into<String>,
        ok: bool,
        code: StatusCode,
        md: impl Into<String>,
        data: Map<String, Value>,
        next: impl Into<String>,
    ) -> CoreResult<Self> {
        let tag = tag.into();
        let md = md.into();
        let next = next.into();
        debug_assert!(!md.is_empty(), "md must be non-empty");
        debug_assert!(!next.is_empty(), "next must be non-empty");

        let allowed = allowed_data_keys(&tag);
        for key in data.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(CoreError::UnregisteredDataKey {
                    key: key.clone(),
                    tag,
                });
            }
        }

        Ok(Self {
            tag,
            ok,
            code,
            md,
            data,
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_unregistered_data_key() {
        let mut data = Map::new();
        data.insert("not_a_real_key".into(), json!(true));
        let err = ResponseEnvelope::build(
            "[EYE/SHARINGAN]",
            true,
            StatusCode::OkNoClarificationNeeded,
            "ok",
            data,
            "proceed",
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnregisteredDataKey { .. }));
    }

    #[test]
    fn accepts_registered_keys() {
        let mut data = Map::new();
        data.insert("score".into(), json!(0.1));
        data.insert("ambiguous".into(), json!(false));
        let env = ResponseEnvelope::build(
            "[EYE/SHARINGAN]",
            true,
            StatusCode::OkNoClarificationNeeded,
            "ok",
            data,
            "proceed",
        )
        .unwrap();
        assert_eq!(env.tag, "[EYE/SHARINGAN]");
    }

    #[test]
    fn reasoning_treats_blank_as_missing() {
        let req = RequestEnvelope {
            context: RequestContext {
                session_id: SessionId::new(),
                user_id: None,
                tenant: None,
                lang: Lang::En,
                budget_tokens: 0,
                request_id: None,
                settings: Map::new(),
            },
            payload: Value::Null,
            reasoning_md: Some("   ".to_string()),
        };
        assert_eq!(req.reasoning(), None);
    }
}
