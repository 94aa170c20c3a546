pub fn extract_current_section(text: &str) -> Vec<&str> {
    let mut current = Vec::new();

    for line in text.lines() {
        if line.starts_with('#') {
            current.clear();
        }
        current.push(line);
    }

    current
}
