/// 把一行文本按单词边界切分为若干段，每段不超过 `max_chars` 个字符
///
/// 所有段拼接后与输入完全一致：空白保留在前一段的末尾，
/// 超长单词按字符硬切。空行返回一个空段。
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in split_keep_whitespace(line) {
        let token_len = token.chars().count();
        let is_space = token.chars().all(char::is_whitespace);

        if current_len + token_len <= max_chars || (is_space && current_len > 0) {
            current.push_str(token);
            current_len += token_len;
            continue;
        }

        if current_len > 0 {
            segments.push(std::mem::take(&mut current));
            current_len = 0;
        }

        for ch in token.chars() {
            if current_len == max_chars {
                segments.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += 1;
        }
    }

    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }

    segments
}

/// 交替产出单词与空白片段
fn split_keep_whitespace(line: &str) -> impl Iterator<Item = &str> {
    let mut rest = line;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != space)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}
