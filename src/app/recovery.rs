#[must_use]
pub fn get_suggestions(msg: &str) -> Vec<String> {
    let mut suggestions = Vec::new();
    let msg_lower = msg.to_lowercase();

    if msg_lower.contains("permission denied") || msg_lower.contains("read-only") {
        suggestions.push("Check that the data file and its folder are writable".to_string());
    }

    if msg_lower.contains("no space left") {
        suggestions.push("Free some disk space; the next change will retry the write".to_string());
    }

    if msg_lower.contains("failed to write") {
        suggestions.push(
            "Your shortcuts are kept in memory and saved again on the next change".to_string(),
        );
    }

    if msg_lower.contains("unreadable") {
        suggestions.push(
            "The saved shortcut list was ignored; fix or delete the data file to recover it"
                .to_string(),
        );
    }

    suggestions
}
