/// Strips markup from free text an admin typed into the console.
///
/// Summaries and recommendations end up rendered in the end-user report, so
/// only ammonia's whitelist of harmless tags survives. `<script>` elements are
/// dropped together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Cleans an optional field, dropping it entirely when nothing is left.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(clean_html)
        .map(|cleaned| cleaned.trim().to_string())
        .filter(|cleaned| !cleaned.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_removed_and_text_kept() {
        let cleaned = clean_html("Great <b>focus</b><script>alert(1)</script>");
        assert_eq!(cleaned, "Great <b>focus</b>");
    }

    #[test]
    fn optional_blank_after_cleaning_is_none() {
        assert_eq!(clean_optional(Some("<script>x</script>  ")), None);
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some(" Read daily ")).as_deref(), Some("Read daily"));
    }
}
