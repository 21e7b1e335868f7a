/// Converts a dotted declaration name into the identifier the backend stores
/// it under: dots become `_` and the first character is lower-cased.
pub fn variable_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_lowercase()
            .chain(chars)
            .map(|c| if c == '.' { '_' } else { c })
            .collect(),
        None => String::new(),
    }
}
