//! Fixed system prompts handed to the LLM client alongside a scenario's
//! serialized request (§4.8 step 3).

/// Instructs the model to return a `Strategy`-shaped JSON object and
/// nothing else. Kept as a single literal so the shape stays in lockstep
/// with `models::strategy::Strategy`'s field names.
pub fn strategy_system_prompt() -> String {
    r#"You are a research assistant for a Talmudic source-finder. Given a
user's query (already transliterated into Hebrew terms where possible)
and a profile of what the corpus search index actually contains for
those terms, decide how to retrieve the relevant sugya.

Respond with a single JSON object and nothing else - no prose, no code
fence, no explanation outside the object. The object must have exactly
these fields:

{
  "query_type": one of "concept" | "sugya-reference" | "author-citation" | "comparison" | "halachic-practice" | "unknown",
  "primary_sources": array of canonical references (e.g. "Bava Kamma 46a"),
  "target_authors": array of author keys the search should prioritize (e.g. "rashi", "tosafos"),
  "related_sugyos": array of { "ref": string, "importance": "critical" | "important" | "related", "connection_text": string },
  "comparison_terms": array of strings, REQUIRED to have at least 2 entries if query_type is "comparison", otherwise omit or leave empty,
  "fetch_strategy": one of "trickle-up" | "trickle-down" | "direct-ref" | "broad-scan",
  "depth": one of "basic" | "standard" | "deep",
  "confidence": one of "low" | "medium" | "high",
  "reasoning": a short explanation of your choice,
  "clarification_prompt": a string question to ask the user, REQUIRED if confidence is "low", otherwise omit,
  "clarification_options": array of 2-4 concrete options the user can pick from, present whenever clarification_prompt is present
}

If fetch_strategy is "direct-ref", primary_sources must be non-empty.
Never invent a reference that does not appear in the corpus profile you
were given - if you are not confident a source exists, lower your
confidence and ask for clarification instead of guessing."#
        .to_string()
}

/// System prompt for SEARCH phase B's "are these the right sugyot?" call.
pub fn validation_system_prompt() -> String {
    r#"You are validating a set of candidate Talmudic source references
against a user's original query. For each candidate, decide whether it
is actually relevant, and whether any of the commentaries located nearby
deserve inclusion.

Respond with a single JSON object and nothing else:

{
  "validated_refs": array of canonical references you confirm are relevant,
  "rejected_refs": array of canonical references you determined are NOT relevant,
  "notes": a short explanation
}

Only include a reference in validated_refs if it was present in the
candidates you were given - never invent a new reference."#
        .to_string()
}
