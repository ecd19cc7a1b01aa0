//! Few-shot prompt sent to every text-generation model.

/// Instructions and worked examples preceding the user's query.
pub const SYSTEM_PROMPT: &str = r#"You extract structured filters from a natural-language query about buildings.
Always return ONLY a compact JSON object with a 'filters' array, no prose.

Allowed attributes: height_m, levels, zoning, assessed_value, address, use
Allowed operators: >, <, >=, <=, =, contains, in

Examples:
Input: highlight buildings over 100 feet
Output: {"filters":[{"attribute":"height_m","operator":">","value":30.48}]}

Input: show buildings less than $500,000 in value
Output: {"filters":[{"attribute":"assessed_value","operator":"<","value":500000}]}

Input: show buildings in RC-G zoning
Output: {"filters":[{"attribute":"zoning","operator":"=","value":"RC-G"}]}
"#;

/// Builds the full prompt for `query`.
#[must_use]
pub fn build_prompt(query: &str) -> String {
    format!("{SYSTEM_PROMPT}\nInput: {query}\nOutput:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_query_slot() {
        let prompt = build_prompt("show tall buildings");
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("\nInput: show tall buildings\nOutput:"));
    }
}
