/// Split a command message into `(name, args)`.
///
/// Accepts `/cmd`, `\cmd` and `/cmd@botname`; the name is lowercased. Returns `None`
/// for text that is not a command.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let body = text
        .strip_prefix('/')
        .or_else(|| text.strip_prefix('\\'))?;

    let mut parts = body.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let name = first.split('@').next().unwrap_or("").to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some((name, rest))
}

pub fn is_command(text: &str, name: &str) -> bool {
    parse_command(text).is_some_and(|(cmd, _)| cmd == name)
}
